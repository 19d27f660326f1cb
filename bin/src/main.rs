use clap::{Parser, Subcommand};
use std::error::Error;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use wordle_engine::*;

/// Plays Wordle in the terminal, the way a chat community plays it through a bot.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Path to a word frequency list, with one "word count" pair on each line.
    #[arg(short = 'f', long)]
    words_file: PathBuf,

    /// Keeps games and stats in this RON file. Without it, nothing outlives the process.
    #[arg(short = 's', long)]
    store_file: Option<PathBuf>,

    /// The community whose game is played.
    #[arg(long, default_value = "local")]
    scope: String,

    /// Overrides `WORDLE_MAX_GUESSES`.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    max_guesses: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start or join the scope's game, then read guesses from stdin, one per line.
    Play {
        /// Length of the solution, if a new game is started.
        #[arg(short, long)]
        length: Option<usize>,
        /// Words to guess as soon as a new game starts, separated by spaces.
        #[arg(long, default_value = "")]
        starter_words: String,
        /// Name recorded against each guess.
        #[arg(long, default_value = "player")]
        player: String,
    },
    /// Recompute and print the scope's stats.
    Stats,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("wordle_engine=info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = Args::parse();
    let mut config = EngineConfig::from_env()?;
    if let Some(max_guesses) = args.max_guesses {
        config.max_guesses = usize::try_from(max_guesses)?;
    }

    let words_reader = io::BufReader::new(File::open(&args.words_file)?);
    let words = FrequencyWordList::from_reader(words_reader)?;
    tracing::info!(
        path = %args.words_file.display(),
        words = words.len(),
        "loaded word list"
    );

    let scope = ScopeId::new(args.scope);
    match args.store_file {
        Some(path) => {
            let store = RonFileGameStore::open(path).await?;
            run(config, words, store, &scope, args.command).await
        }
        None => run(config, words, InMemoryGameStore::new(), &scope, args.command).await,
    }
}

async fn run<S: GameStore>(
    config: EngineConfig,
    words: FrequencyWordList,
    store: S,
    scope: &ScopeId,
    command: Command,
) -> Result<(), Box<dyn Error>> {
    let coordinator = GameCoordinator::new(config, words, store)?;
    match command {
        Command::Play {
            length,
            starter_words,
            player,
        } => play(&coordinator, scope, length, &starter_words, &player).await,
        Command::Stats => {
            print_stats(&coordinator.recompute_stats(scope).await?);
            Ok(())
        }
    }
}

async fn play<S: GameStore>(
    coordinator: &GameCoordinator<FrequencyWordList, S>,
    scope: &ScopeId,
    length: Option<usize>,
    starter_words: &str,
    player: &str,
) -> Result<(), Box<dyn Error>> {
    let seeds: Vec<String> = starter_words
        .split_whitespace()
        .map(str::to_string)
        .collect();
    let started = coordinator
        .start_or_get_game(scope, length, &seeds, player)
        .await?;
    let game = &started.game;
    if started.created {
        println!(
            "Started a {}-letter game. You have {} guesses.",
            game.solution().chars().count(),
            game.rules().max_guesses
        );
    } else {
        println!("Joined the game in progress.");
    }
    for (word, result) in &started.seed_results {
        if *result != WordGuessResult::Accepted {
            println!("Skipped starter word {}: {}", word, describe(*result));
        }
    }
    for (guess, feedback) in game.guesses().iter().zip(game.feedback()) {
        print_guess(guess, feedback);
    }
    if game.state().is_finished() {
        print_finish(game, started.stats.as_ref());
        return Ok(());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let outcome = match coordinator.submit_guess(scope, &line, player).await {
            Ok(outcome) => outcome,
            Err(error) if error.is_retryable() => {
                eprintln!("{}. Try again later.", error);
                continue;
            }
            Err(error) => return Err(error.into()),
        };
        if outcome.result != WordGuessResult::Accepted {
            println!("{}", describe(outcome.result));
            continue;
        }

        let game = &outcome.game;
        if let (Some(guess), Some(feedback)) = (game.guesses().last(), game.feedback().last()) {
            print_guess(guess, feedback);
        }
        if game.state().is_finished() {
            print_finish(game, outcome.stats.as_ref());
            return Ok(());
        }
        println!("{} guesses left.", game.remaining_guesses());
    }
    Ok(())
}

fn describe(result: WordGuessResult) -> &'static str {
    match result {
        WordGuessResult::Accepted => "accepted",
        WordGuessResult::BadState => "the game is already over",
        WordGuessResult::BadLength => "wrong number of letters",
        WordGuessResult::AlreadyGuessed => "that word was already guessed",
        WordGuessResult::NotAWord => "not in the word list",
    }
}

/// Prints the guess above its feedback, as:
///
///   * '.' = this letter is not in the word
///   * 'y' = this letter is in the word, but not in this location
///   * 'g' = this letter is in the word and in the right location
fn print_guess(guess: &str, feedback: &[LetterStatus]) {
    let code: String = feedback
        .iter()
        .map(|status| match status {
            LetterStatus::Correct => 'g',
            LetterStatus::Elsewhere => 'y',
            LetterStatus::Absent => '.',
        })
        .collect();
    println!("{}\n{}", guess, code);
}

fn print_finish(game: &Game, stats: Option<&GuildStats>) {
    match game.state() {
        GameState::Won => println!(
            "Solved it in {} guesses ({:.1}s).",
            game.guesses().len(),
            game.elapsed_ms() as f64 / 1000.0
        ),
        _ => println!("Out of guesses. The word was {}.", game.solution()),
    }
    if let Some(stats) = stats {
        print_stats(stats);
    }
}

fn print_stats(stats: &GuildStats) {
    println!(
        "\n**Played:** {} **Won:** {} ({:.0}%)",
        stats.total_played, stats.total_won, stats.win_pct
    );
    println!(
        "**Current streak:** {} **Best streak:** {}",
        stats.current_streak, stats.best_streak
    );
    if let (Some(best_guess), Some(best_time_ms)) = (stats.best_guess, stats.best_time_ms) {
        println!(
            "**Average guesses:** {:.2} **Best:** {} guesses, {:.1}s",
            stats.avg_guesses,
            best_guess,
            best_time_ms as f64 / 1000.0
        );
    }

    println!("\n|Num guesses|Num wins|");
    println!("|-----------|--------|");
    for (index, wins) in stats.guess_distribution.iter().enumerate() {
        println!("|{}|{}|", index + 1, wins);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn args_are_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn max_guesses_must_be_positive() {
        let parse = |max_guesses: &str| {
            Args::try_parse_from([
                "wordle-engine-main",
                "--words-file",
                "words.txt",
                "--max-guesses",
                max_guesses,
                "stats",
            ])
        };

        assert!(parse("0").is_err());
        assert!(parse("-1").is_err());
        assert_eq!(parse("3").unwrap().max_guesses, Some(3));
    }
}

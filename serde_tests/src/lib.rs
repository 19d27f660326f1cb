#[cfg(test)]
mod tests {

    use std::error::Error;

    use chrono::{TimeZone, Utc};
    use ron;
    use wordle_engine::*;

    fn record(state: GameState) -> GameRecord {
        let started_at = Utc.with_ymd_and_hms(2024, 3, 1, 18, 30, 0).unwrap();
        GameRecord {
            id: Some(GameId(42)),
            scope: ScopeId::from("guild-1"),
            solution: "allot".to_string(),
            guesses: vec!["lolly".to_string(), "alpha".to_string()],
            participants: vec!["alice".to_string(), "bob".to_string()],
            state,
            started_at,
            elapsed_ms: 0,
            updated_at: started_at + chrono::Duration::seconds(40),
        }
    }

    #[test]
    fn game_state_is_encoded_by_name() -> Result<(), Box<dyn Error>> {
        assert_eq!(ron::to_string(&GameState::InProgress)?, "InProgress");
        assert_eq!(ron::to_string(&GameState::Won)?, "Won");
        assert_eq!(ron::from_str::<GameState>("Lost")?, GameState::Lost);
        assert!(ron::from_str::<GameState>("2").is_err());
        Ok(())
    }

    #[test]
    fn game_record_serde() -> Result<(), Box<dyn Error>> {
        let record = record(GameState::InProgress);

        let ser = ron::to_string(&record)?;
        assert!(ser.contains("state:InProgress"));
        assert!(ser.contains("scope:\"guild-1\""));
        assert!(!ser.contains("feedback"));

        let deser = ron::from_str::<GameRecord>(&ser)?;
        assert_eq!(deser, record);
        Ok(())
    }

    #[test]
    fn resumed_game_from_decoded_record() -> Result<(), Box<dyn Error>> {
        let ser = ron::to_string(&record(GameState::InProgress))?;
        let deser = ron::from_str::<GameRecord>(&ser)?;

        let game = Game::resume(GameRules::default(), &deser);

        assert_eq!(game.id(), Some(GameId(42)));
        assert_eq!(game.state(), GameState::InProgress);
        assert_eq!(game.feedback().len(), 2);
        assert_eq!(
            game.feedback()[0],
            get_result_for_guess("allot", "lolly")?.results
        );
        Ok(())
    }

    #[test]
    fn guild_stats_serde() -> Result<(), Box<dyn Error>> {
        let history = vec![record(GameState::Won), record(GameState::Lost)];
        let stats = GuildStats::from_history(ScopeId::from("guild-1"), &history, 6);

        let ser = ron::to_string(&stats)?;
        let deser = ron::from_str::<GuildStats>(&ser)?;

        assert_eq!(deser, stats);
        assert_eq!(deser.best_guess, Some(2));
        assert_eq!(deser.best_time_ms, Some(0));
        Ok(())
    }
}

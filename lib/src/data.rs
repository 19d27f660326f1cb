use rand::seq::SliceRandom;
use std::collections::HashMap;
use std::future::Future;
use std::io::BufRead;
use std::result::Result;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Indicates that the dictionary's backing store could not answer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DictionaryError {
    #[error("dictionary lookup timed out after {0:?}")]
    Timeout(Duration),
    #[error("{0}")]
    Unavailable(String),
}

/// Supplies solution words and validates guesses against a frequency-ranked word list.
///
/// Words are lowercase ASCII. A word's rarity threshold is compared against its frequency: only
/// words seen strictly more often than `min_rarity` qualify.
pub trait Dictionary: Send + Sync {
    /// Selects a word of exactly `length` letters uniformly at random among those more frequent
    /// than `min_rarity`. Returns `Ok(None)` if there are no such words.
    fn random_word(
        &self,
        length: usize,
        min_rarity: u64,
    ) -> impl Future<Output = Result<Option<Arc<str>>, DictionaryError>> + Send;

    /// Returns whether `word` is in the dictionary with a frequency above `min_rarity`.
    fn exists(
        &self,
        word: &str,
        min_rarity: u64,
    ) -> impl Future<Output = Result<bool, DictionaryError>> + Send;
}

/// A word along with how often it occurs in the source corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedWord {
    pub word: Arc<str>,
    pub frequency: u64,
}

/// An in-process [`Dictionary`] built from a word frequency list.
#[derive(Debug, Clone, Default)]
pub struct FrequencyWordList {
    /// Words of each length, most frequent first.
    by_length: HashMap<usize, Vec<RankedWord>>,
    frequencies: HashMap<Arc<str>, u64>,
}

impl FrequencyWordList {
    /// Constructs a new `FrequencyWordList` by reading lines of the form `word count`.
    ///
    /// Lines that aren't a single alphabetic word followed by a count are skipped. Each word
    /// will be converted to lower case.
    pub fn from_reader<R: BufRead>(reader: R) -> std::io::Result<Self> {
        let mut entries = Vec::new();
        for line in reader.lines() {
            if let Some(entry) = parse_frequency_line(&line?) {
                entries.push(entry);
            }
        }
        Ok(Self::from_iterator(entries))
    }

    /// Constructs a new `FrequencyWordList` from `(word, frequency)` pairs.
    ///
    /// Words are trimmed and converted to lower case; empty or non-alphabetic words are skipped.
    /// If a word appears more than once, its highest frequency is kept.
    pub fn from_iterator<S, I>(entries: I) -> Self
    where
        S: AsRef<str>,
        I: IntoIterator<Item = (S, u64)>,
    {
        let mut frequencies: HashMap<Arc<str>, u64> = HashMap::new();
        for (word, frequency) in entries {
            let word = word.as_ref().trim().to_ascii_lowercase();
            if word.is_empty() || !word.bytes().all(|letter| letter.is_ascii_lowercase()) {
                continue;
            }
            let entry = frequencies.entry(Arc::from(word.as_str())).or_insert(0);
            if *entry < frequency {
                *entry = frequency;
            }
        }

        let mut by_length: HashMap<usize, Vec<RankedWord>> = HashMap::new();
        for (word, frequency) in &frequencies {
            by_length.entry(word.len()).or_default().push(RankedWord {
                word: Arc::clone(word),
                frequency: *frequency,
            });
        }
        for words in by_length.values_mut() {
            words.sort_unstable_by(|a, b| {
                b.frequency
                    .cmp(&a.frequency)
                    .then_with(|| a.word.cmp(&b.word))
            });
        }

        FrequencyWordList {
            by_length,
            frequencies,
        }
    }

    /// Returns the number of words.
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    /// Returns the frequency recorded for `word`, if it is in the list.
    pub fn frequency(&self, word: &str) -> Option<u64> {
        self.frequencies.get(word).copied()
    }

    /// Returns every word of the given length that is more frequent than `min_rarity`, most
    /// frequent first.
    pub fn candidates(&self, length: usize, min_rarity: u64) -> &[RankedWord] {
        match self.by_length.get(&length) {
            Some(words) => {
                let end = words.partition_point(|ranked| ranked.frequency > min_rarity);
                &words[..end]
            }
            None => &[],
        }
    }

    fn pick_random(&self, length: usize, min_rarity: u64) -> Option<Arc<str>> {
        self.candidates(length, min_rarity)
            .choose(&mut rand::thread_rng())
            .map(|ranked| Arc::clone(&ranked.word))
    }
}

impl Dictionary for FrequencyWordList {
    async fn random_word(
        &self,
        length: usize,
        min_rarity: u64,
    ) -> Result<Option<Arc<str>>, DictionaryError> {
        Ok(self.pick_random(length, min_rarity))
    }

    async fn exists(&self, word: &str, min_rarity: u64) -> Result<bool, DictionaryError> {
        Ok(self
            .frequency(&word.to_ascii_lowercase())
            .is_some_and(|frequency| frequency > min_rarity))
    }
}

impl<D: Dictionary> Dictionary for Arc<D> {
    fn random_word(
        &self,
        length: usize,
        min_rarity: u64,
    ) -> impl Future<Output = Result<Option<Arc<str>>, DictionaryError>> + Send {
        self.as_ref().random_word(length, min_rarity)
    }

    fn exists(
        &self,
        word: &str,
        min_rarity: u64,
    ) -> impl Future<Output = Result<bool, DictionaryError>> + Send {
        self.as_ref().exists(word, min_rarity)
    }
}

fn parse_frequency_line(line: &str) -> Option<(String, u64)> {
    let mut parts = line.split_whitespace();
    let word = parts.next()?;
    let frequency = parts.next()?.parse::<u64>().ok()?;
    if parts.next().is_some() || !word.chars().all(|letter| letter.is_ascii_alphabetic()) {
        return None;
    }
    Some((word.to_string(), frequency))
}

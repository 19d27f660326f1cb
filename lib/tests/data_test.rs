#[macro_use]
extern crate assert_matches;

use wordle_engine::*;

use std::io::Cursor;
use std::sync::Arc;

fn word_list() -> FrequencyWordList {
    FrequencyWordList::from_iterator([
        ("allot", 2_000_000),
        ("begot", 1_500_000),
        ("lolly", 200_000),
        ("ingot", 100),
        ("below", 1_000_000),
        ("abide", 3_000_000),
        ("bridge", 5_000_000),
    ])
}

#[tokio::test]
async fn random_word_respects_length_and_rarity() -> Result<(), DictionaryError> {
    let words = word_list();

    for _ in 0..50 {
        let word = words.random_word(5, 1_000_000).await?.unwrap();
        assert_matches!(&*word, "allot" | "begot" | "abide");
    }
    assert_eq!(
        words.random_word(6, 1_000_000).await?.as_deref(),
        Some("bridge")
    );
    Ok(())
}

#[tokio::test]
async fn random_word_not_found() -> Result<(), DictionaryError> {
    let words = word_list();

    assert_eq!(words.random_word(5, 3_000_000).await?, None);
    assert_eq!(words.random_word(0, 0).await?, None);
    assert_eq!(words.random_word(42, 0).await?, None);
    Ok(())
}

#[tokio::test]
async fn exists_uses_strict_threshold() -> Result<(), DictionaryError> {
    let words = word_list();

    assert!(words.exists("lolly", 150_000).await?);
    assert!(words.exists("LOLLY", 150_000).await?);
    assert!(!words.exists("lolly", 200_000).await?);
    assert!(!words.exists("ingot", 150_000).await?);
    assert!(!words.exists("zzzzz", 0).await?);
    Ok(())
}

#[tokio::test]
async fn shared_word_list_is_a_dictionary() -> Result<(), DictionaryError> {
    async fn knows<D: Dictionary>(dictionary: &D, word: &str) -> Result<bool, DictionaryError> {
        dictionary.exists(word, 0).await
    }
    let words = Arc::new(word_list());

    assert!(knows(&words, "allot").await?);
    assert!(!knows(&words, "other").await?);
    Ok(())
}

#[test]
fn from_reader_succeeds() -> std::io::Result<()> {
    let cursor = Cursor::new(String::from("\n\nallot 2000000\nLolly 200000\n viru-ses 12\n"));

    let words = FrequencyWordList::from_reader(cursor)?;

    assert_eq!(words.len(), 2);
    assert_eq!(words.frequency("lolly"), Some(200_000));
    assert_eq!(words.candidates(5, 0).len(), 2);
    assert_eq!(words.candidates(5, 0)[0].word.as_ref(), "allot");
    Ok(())
}

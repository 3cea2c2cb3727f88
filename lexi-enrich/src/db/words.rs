//! Word database operations

use crate::types::{Example, Interpretation, Transcription, Translation, Word};
use crate::utils::begin_monitored;
use lexi_common::{Error, Result};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Load a word with its authored facets, in authored order
pub async fn load_word(pool: &SqlitePool, id: Uuid) -> Result<Option<Word>> {
    let id_str = id.to_string();

    let row = sqlx::query("SELECT id, user_id, value FROM words WHERE id = ?")
        .bind(&id_str)
        .fetch_optional(pool)
        .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let user_id_str: String = row.try_get("user_id")?;
    let user_id = Uuid::parse_str(&user_id_str)
        .map_err(|e| Error::InvalidInput(format!("word {} has invalid user_id: {}", id, e)))?;

    let transcriptions = sqlx::query(
        "SELECT value, note FROM word_transcriptions WHERE word_id = ? ORDER BY position",
    )
    .bind(&id_str)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(|r| -> Result<Transcription> {
        Ok(Transcription {
            value: r.try_get("value")?,
            note: r.try_get("note")?,
        })
    })
    .collect::<Result<Vec<_>>>()?;

    let interpretations = sqlx::query(
        "SELECT value FROM word_interpretations WHERE word_id = ? ORDER BY position",
    )
    .bind(&id_str)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(|r| -> Result<Interpretation> {
        Ok(Interpretation {
            value: r.try_get("value")?,
        })
    })
    .collect::<Result<Vec<_>>>()?;

    let translations = sqlx::query(
        "SELECT value, note FROM word_translations WHERE word_id = ? ORDER BY position",
    )
    .bind(&id_str)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(|r| -> Result<Translation> {
        Ok(Translation {
            value: r.try_get("value")?,
            note: r.try_get("note")?,
        })
    })
    .collect::<Result<Vec<_>>>()?;

    let examples = sqlx::query(
        "SELECT origin, translate, note FROM word_examples WHERE word_id = ? ORDER BY position",
    )
    .bind(&id_str)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(|r| -> Result<Example> {
        Ok(Example {
            origin: r.try_get("origin")?,
            translate: r.try_get("translate")?,
            note: r.try_get("note")?,
        })
    })
    .collect::<Result<Vec<_>>>()?;

    Ok(Some(Word {
        id,
        user_id,
        value: row.try_get("value")?,
        transcriptions,
        interpretations,
        translations,
        examples,
    }))
}

/// Insert a word and its authored facets in one transaction
pub async fn insert_word(pool: &SqlitePool, word: &Word) -> Result<()> {
    let id = word.id.to_string();
    let mut tx = begin_monitored(pool, "words::insert_word").await?;

    sqlx::query("INSERT INTO words (id, user_id, value) VALUES (?, ?, ?)")
        .bind(&id)
        .bind(word.user_id.to_string())
        .bind(&word.value)
        .execute(tx.conn()?)
        .await?;

    for (position, t) in word.transcriptions.iter().enumerate() {
        sqlx::query(
            "INSERT INTO word_transcriptions (word_id, position, value, note) VALUES (?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(position as i64)
        .bind(&t.value)
        .bind(&t.note)
        .execute(tx.conn()?)
        .await?;
    }

    for (position, i) in word.interpretations.iter().enumerate() {
        sqlx::query("INSERT INTO word_interpretations (word_id, position, value) VALUES (?, ?, ?)")
            .bind(&id)
            .bind(position as i64)
            .bind(&i.value)
            .execute(tx.conn()?)
            .await?;
    }

    for (position, t) in word.translations.iter().enumerate() {
        sqlx::query(
            "INSERT INTO word_translations (word_id, position, value, note) VALUES (?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(position as i64)
        .bind(&t.value)
        .bind(&t.note)
        .execute(tx.conn()?)
        .await?;
    }

    for (position, e) in word.examples.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO word_examples (word_id, position, origin, translate, note)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(position as i64)
        .bind(&e.origin)
        .bind(&e.translate)
        .bind(&e.note)
        .execute(tx.conn()?)
        .await?;
    }

    tx.commit().await
}

/// Delete the word's example with `origin` (case-insensitive)
///
/// Returns `true` if an example was removed. Cached translations for it stay
/// until the cleanup pass runs.
pub async fn remove_example(pool: &SqlitePool, word_id: Uuid, origin: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM word_examples WHERE word_id = ? AND origin = ?")
        .bind(word_id.to_string())
        .bind(origin.trim())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexi_common::db::init_in_memory;

    fn sample_word() -> Word {
        let mut word = Word::new(Uuid::new_v4(), "run");
        word.transcriptions.push(Transcription::with_note("/rʌn/", "UK"));
        word.interpretations.push(Interpretation::new("to move fast"));
        word.translations.push(Translation::new("бежать"));
        word.examples.push(Example::new("I run every day"));
        word.examples
            .push(Example::translated("She runs a shop", "Она управляет магазином"));
        word
    }

    #[tokio::test]
    async fn test_insert_and_load_word() {
        let pool = init_in_memory().await.unwrap();
        let word = sample_word();

        insert_word(&pool, &word).await.unwrap();
        let loaded = load_word(&pool, word.id).await.unwrap().expect("word not found");

        assert_eq!(loaded.user_id, word.user_id);
        assert_eq!(loaded.value, "run");
        assert_eq!(loaded.transcriptions[0].note.as_deref(), Some("UK"));
        assert_eq!(loaded.examples.len(), 2);
        assert_eq!(loaded.examples[0].origin, "I run every day");
        assert!(loaded.examples[0].translate.is_none());
        assert_eq!(
            loaded.examples[1].translate.as_deref(),
            Some("Она управляет магазином")
        );
    }

    #[tokio::test]
    async fn test_load_word_with_undecodable_value_is_an_error() {
        let pool = init_in_memory().await.unwrap();
        let id = Uuid::new_v4();
        sqlx::query("INSERT INTO words (id, user_id, value) VALUES (?, ?, ?)")
            .bind(id.to_string())
            .bind(Uuid::new_v4().to_string())
            .bind(vec![0xffu8, 0xfe])
            .execute(&pool)
            .await
            .unwrap();

        assert!(load_word(&pool, id).await.is_err());
    }

    #[tokio::test]
    async fn test_load_missing_word() {
        let pool = init_in_memory().await.unwrap();
        assert!(load_word(&pool, Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remove_example_ignores_case() {
        let pool = init_in_memory().await.unwrap();
        let word = sample_word();
        insert_word(&pool, &word).await.unwrap();

        assert!(remove_example(&pool, word.id, "i RUN every day").await.unwrap());
        assert!(!remove_example(&pool, word.id, "I run every day").await.unwrap());

        let loaded = load_word(&pool, word.id).await.unwrap().unwrap();
        assert_eq!(loaded.examples.len(), 1);
    }
}

//! Per-word example translation cache rows
//!
//! Unlike the shared facets, example sentences belong to one user's word,
//! so rows are keyed by word id and written back by upsert.

use crate::merge::CanonicalEnrichment;
use crate::types::ExampleProvenance;
use chrono::{DateTime, Utc};
use lexi_common::Result;
use sqlx::{Row, SqliteConnection};
use std::collections::BTreeMap;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct ExampleRow {
    pub origin: String,
    pub source_name: String,
    pub translate: String,
    pub source_url: String,
    pub recent_update_date: DateTime<Utc>,
}

pub async fn load_rows(conn: &mut SqliteConnection, word_id: Uuid) -> Result<Vec<ExampleRow>> {
    let rows = sqlx::query(
        r#"
        SELECT origin, source_name, translate, source_url, recent_update_date
        FROM outer_source_examples
        WHERE word_id = ?
        ORDER BY origin, source_name, recent_update_date
        "#,
    )
    .bind(word_id.to_string())
    .fetch_all(&mut *conn)
    .await?;

    rows.into_iter()
        .map(|row| -> Result<ExampleRow> {
            Ok(ExampleRow {
                origin: row.try_get("origin")?,
                source_name: row.try_get("source_name")?,
                translate: row.try_get("translate")?,
                source_url: row.try_get("source_url")?,
                recent_update_date: row.try_get("recent_update_date")?,
            })
        })
        .collect()
}

/// Insert or refresh one row per (example, source)
pub async fn upsert_rows(
    conn: &mut SqliteConnection,
    word_id: Uuid,
    rows: &[ExampleRow],
) -> Result<()> {
    let word_id = word_id.to_string();

    for row in rows {
        sqlx::query(
            r#"
            INSERT INTO outer_source_examples (
                word_id, origin, source_name, translate, source_url, recent_update_date
            ) VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(word_id, origin, source_name) DO UPDATE SET
                translate = excluded.translate,
                source_url = excluded.source_url,
                recent_update_date = excluded.recent_update_date
            "#,
        )
        .bind(&word_id)
        .bind(&row.origin)
        .bind(&row.source_name)
        .bind(&row.translate)
        .bind(&row.source_url)
        .bind(row.recent_update_date)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

/// Remove rows whose origin matches no example of any word
pub async fn delete_unused(conn: &mut SqliteConnection) -> Result<u64> {
    let result = sqlx::query(
        r#"
        DELETE FROM outer_source_examples
        WHERE NOT EXISTS (
            SELECT 1 FROM word_examples e
            WHERE e.origin = outer_source_examples.origin
        )
        "#,
    )
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}

/// Attach cached translations to matching examples
///
/// Returns the number of rows whose origin matched no example of the word.
pub fn hydrate(enrichment: &mut CanonicalEnrichment, rows: Vec<ExampleRow>) -> usize {
    let mut unmatched = 0;
    for row in rows {
        let origin = row.origin;
        let provenance = ExampleProvenance {
            source_name: row.source_name,
            url: row.source_url,
            recent_update_date: row.recent_update_date,
            translate: row.translate,
        };
        if !enrichment.merge_example_translation(&origin, provenance) {
            unmatched += 1;
        }
    }
    unmatched
}

/// Latest entry per (example, source) in the canonical view
pub fn rows_for(enrichment: &CanonicalEnrichment) -> Vec<ExampleRow> {
    let mut rows = Vec::new();
    for (example, provenance) in enrichment.examples().entries() {
        let mut latest: BTreeMap<String, &ExampleProvenance> = BTreeMap::new();
        for p in provenance {
            latest
                .entry(p.source_name.trim().to_lowercase())
                .and_modify(|current| {
                    if p.recent_update_date >= current.recent_update_date {
                        *current = p;
                    }
                })
                .or_insert(p);
        }

        rows.extend(latest.into_values().map(|p| ExampleRow {
            origin: example.origin.clone(),
            source_name: p.source_name.clone(),
            translate: p.translate.clone(),
            source_url: p.url.clone(),
            recent_update_date: p.recent_update_date,
        }));
    }
    rows
}

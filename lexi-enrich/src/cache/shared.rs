//! Shared facet cache rows (transcriptions, interpretations, translations)
//!
//! Keyed by normalized word value: these are properties of the English word,
//! shared by every user who owns it.

use crate::merge::{CanonicalEnrichment, FacetLedger};
use crate::types::{
    Interpretation, NormalizedKey, SourceProvenance, Transcription, Translation,
};
use chrono::{DateTime, Utc};
use lexi_common::Result;
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection};
use std::collections::BTreeMap;

/// Rows per multi-row INSERT, well under SQLite's bound parameter limit
const INSERT_CHUNK: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SharedFacetTable {
    Transcriptions,
    Interpretations,
    Translations,
}

impl SharedFacetTable {
    pub const ALL: [SharedFacetTable; 3] = [
        SharedFacetTable::Transcriptions,
        SharedFacetTable::Interpretations,
        SharedFacetTable::Translations,
    ];

    pub fn table_name(&self) -> &'static str {
        match self {
            SharedFacetTable::Transcriptions => "outer_source_transcriptions",
            SharedFacetTable::Interpretations => "outer_source_interpretations",
            SharedFacetTable::Translations => "outer_source_translations",
        }
    }

    fn has_note(&self) -> bool {
        !matches!(self, SharedFacetTable::Interpretations)
    }
}

/// One cached (value, source) pair for a word value
#[derive(Debug, Clone, PartialEq)]
pub struct SharedFacetRow {
    pub value: String,
    pub note: Option<String>,
    pub source_name: String,
    pub source_url: String,
    pub recent_update_date: DateTime<Utc>,
}

impl SharedFacetRow {
    fn provenance(&self) -> SourceProvenance {
        SourceProvenance::new(
            self.source_name.clone(),
            self.source_url.clone(),
            self.recent_update_date,
        )
    }
}

/// All rows for `word_value`, grouped by value then source
pub async fn load_rows(
    conn: &mut SqliteConnection,
    table: SharedFacetTable,
    word_value: &str,
) -> Result<Vec<SharedFacetRow>> {
    let note_column = if table.has_note() { "note" } else { "NULL AS note" };
    let sql = format!(
        r#"
        SELECT value, {note_column}, source_name, source_url, recent_update_date
        FROM {table}
        WHERE word_value = ?
        ORDER BY value, source_name, recent_update_date
        "#,
        note_column = note_column,
        table = table.table_name(),
    );

    let rows = sqlx::query(&sql)
        .bind(word_value)
        .fetch_all(&mut *conn)
        .await?;

    rows.into_iter()
        .map(|row| -> Result<SharedFacetRow> {
            Ok(SharedFacetRow {
                value: row.try_get("value")?,
                note: row.try_get("note")?,
                source_name: row.try_get("source_name")?,
                source_url: row.try_get("source_url")?,
                recent_update_date: row.try_get("recent_update_date")?,
            })
        })
        .collect()
}

/// Replace every row for `word_value` with `rows`
///
/// Full replace: delete, then multi-row insert. Must run inside the
/// caller's write transaction so readers never see the gap.
pub async fn replace_rows(
    conn: &mut SqliteConnection,
    table: SharedFacetTable,
    word_value: &str,
    rows: &[SharedFacetRow],
) -> Result<()> {
    let delete_sql = format!("DELETE FROM {} WHERE word_value = ?", table.table_name());
    sqlx::query(&delete_sql)
        .bind(word_value)
        .execute(&mut *conn)
        .await?;

    for chunk in rows.chunks(INSERT_CHUNK) {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "INSERT INTO {} (word_value, value, {}source_name, source_url, recent_update_date) ",
            table.table_name(),
            if table.has_note() { "note, " } else { "" },
        ));

        builder.push_values(chunk, |mut b, row| {
            b.push_bind(word_value).push_bind(&row.value);
            if table.has_note() {
                b.push_bind(&row.note);
            }
            b.push_bind(&row.source_name)
                .push_bind(&row.source_url)
                .push_bind(row.recent_update_date);
        });

        builder.build().execute(&mut *conn).await?;
    }

    Ok(())
}

/// Feed cached rows into the canonical view; returns rows applied
pub fn hydrate(
    enrichment: &mut CanonicalEnrichment,
    table: SharedFacetTable,
    rows: Vec<SharedFacetRow>,
) -> usize {
    let count = rows.len();
    for row in rows {
        let provenance = row.provenance();
        match table {
            SharedFacetTable::Transcriptions => {
                enrichment.merge_transcription(
                    Transcription {
                        value: row.value,
                        note: row.note,
                    },
                    provenance,
                );
            }
            SharedFacetTable::Interpretations => {
                enrichment.merge_interpretation(Interpretation { value: row.value }, provenance);
            }
            SharedFacetTable::Translations => {
                enrichment.merge_translation(
                    Translation {
                        value: row.value,
                        note: row.note,
                    },
                    provenance,
                );
            }
        }
    }
    count
}

/// Rows to persist for `table`: the most recent entry per (value, source)
///
/// Provenance lists may repeat a source; the cache key does not allow it.
/// Row text comes from what the source returned, never from the user's
/// canonical value, since rows are shared by every owner of the word.
/// User-authored values without provenance produce no rows.
pub fn rows_for(enrichment: &CanonicalEnrichment, table: SharedFacetTable) -> Vec<SharedFacetRow> {
    match table {
        SharedFacetTable::Transcriptions => collapse(enrichment.transcriptions()),
        SharedFacetTable::Interpretations => collapse(enrichment.interpretations()),
        SharedFacetTable::Translations => collapse(enrichment.translations()),
    }
}

fn collapse<F: NormalizedKey>(ledger: &FacetLedger<F, SourceProvenance>) -> Vec<SharedFacetRow> {
    let mut rows = Vec::new();
    for (_, provenance) in ledger.entries() {
        let mut latest: BTreeMap<String, &SourceProvenance> = BTreeMap::new();
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

        rows.extend(latest.into_values().map(|p| SharedFacetRow {
            value: p.source_value.clone(),
            note: p.source_note.clone(),
            source_name: p.source_name.clone(),
            source_url: p.url.clone(),
            recent_update_date: p.recent_update_date,
        }));
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Word;
    use chrono::{Duration, TimeZone};
    use uuid::Uuid;

    fn provenance(source: &str, days_ago: i64) -> SourceProvenance {
        SourceProvenance::new(
            source,
            format!("https://{}.example/run?d={}", source.to_lowercase(), days_ago),
            Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap() - Duration::days(days_ago),
        )
    }

    #[test]
    fn test_rows_collapse_repeated_source_to_latest() {
        let mut enrichment = CanonicalEnrichment::new(Word::new(Uuid::new_v4(), "run"));
        enrichment.merge_interpretation(Interpretation::new("to move fast"), provenance("Oxford", 30));
        enrichment.merge_interpretation(Interpretation::new("to move fast"), provenance("oxford", 2));
        enrichment.merge_interpretation(Interpretation::new("to move fast"), provenance("Reverso", 5));

        let rows = rows_for(&enrichment, SharedFacetTable::Interpretations);

        assert_eq!(rows.len(), 2);
        let oxford = rows.iter().find(|r| r.source_name.eq_ignore_ascii_case("oxford")).unwrap();
        assert_eq!(oxford.recent_update_date, provenance("Oxford", 2).recent_update_date);
    }

    #[test]
    fn test_user_authored_values_produce_no_rows() {
        let mut word = Word::new(Uuid::new_v4(), "run");
        word.translations.push(Translation::new("бежать"));
        let enrichment = CanonicalEnrichment::new(word);

        assert!(rows_for(&enrichment, SharedFacetTable::Translations).is_empty());
    }

    #[test]
    fn test_rows_use_source_text_not_user_value() {
        let mut word = Word::new(Uuid::new_v4(), "run");
        word.translations
            .push(Translation::with_note("БЕЖАТЬ", "private note"));
        let mut enrichment = CanonicalEnrichment::new(word);
        enrichment.merge_translation(Translation::new("бежать"), provenance("Oxford", 0));

        let rows = rows_for(&enrichment, SharedFacetTable::Translations);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].value, "бежать");
        assert_eq!(rows[0].note, None);
    }

    #[test]
    fn test_hydrate_dedups_into_canonical_list() {
        let mut enrichment = CanonicalEnrichment::new(Word::new(Uuid::new_v4(), "run"));
        let rows = vec![
            SharedFacetRow {
                value: "/rʌn/".to_string(),
                note: None,
                source_name: "Oxford".to_string(),
                source_url: "https://oxford".to_string(),
                recent_update_date: provenance("Oxford", 3).recent_update_date,
            },
            SharedFacetRow {
                value: "/RʌN/".to_string(),
                note: Some("US".to_string()),
                source_name: "Cambridge".to_string(),
                source_url: "https://cambridge".to_string(),
                recent_update_date: provenance("Cambridge", 1).recent_update_date,
            },
        ];

        assert_eq!(hydrate(&mut enrichment, SharedFacetTable::Transcriptions, rows), 2);
        assert_eq!(enrichment.transcriptions().len(), 1);
        assert_eq!(
            enrichment
                .transcription_sources(&Transcription::new("/rʌn/"))
                .len(),
            2
        );
    }
}

//! Core Types and Trait Definitions for Lexi enrichment
//!
//! - Facet value types with case-insensitive identity (`NormalizedKey`)
//! - Provenance records for each fetch event
//! - The `Word` being enriched
//! - The `EnrichmentSource` capability implemented per external provider

use crate::contribution::SourceContribution;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// Facet Values
// ============================================================================

/// Normalize a facet value or word value for comparison
pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Identity of a facet value under its equality rule
///
/// Two values of the same facet type are the same facet when their
/// normalized keys are equal.
pub trait NormalizedKey {
    fn normalized_key(&self) -> String;
}

/// Implements `PartialEq`/`Eq`/`Hash` in terms of `NormalizedKey`
macro_rules! normalized_identity {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl PartialEq for $ty {
                fn eq(&self, other: &Self) -> bool {
                    self.normalized_key() == other.normalized_key()
                }
            }

            impl Eq for $ty {}

            impl Hash for $ty {
                fn hash<H: Hasher>(&self, state: &mut H) {
                    self.normalized_key().hash(state);
                }
            }
        )+
    };
}

/// Phonetic rendering of a word
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcription {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Transcription {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            note: None,
        }
    }

    pub fn with_note(value: impl Into<String>, note: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            note: Some(note.into()),
        }
    }
}

impl NormalizedKey for Transcription {
    fn normalized_key(&self) -> String {
        normalize(&self.value)
    }
}

/// A definition or sense of a word
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interpretation {
    pub value: String,
}

impl Interpretation {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

impl NormalizedKey for Interpretation {
    fn normalized_key(&self) -> String {
        normalize(&self.value)
    }
}

/// A translated word form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Translation {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Translation {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            note: None,
        }
    }

    pub fn with_note(value: impl Into<String>, note: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            note: Some(note.into()),
        }
    }
}

impl NormalizedKey for Translation {
    fn normalized_key(&self) -> String {
        normalize(&self.value)
    }
}

/// Usage sentence with its translation
///
/// Example sentences are authored by the user; sources only supply
/// translations for them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Example {
    pub origin: String,
    #[serde(default)]
    pub translate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Example {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            translate: None,
            note: None,
        }
    }

    pub fn translated(origin: impl Into<String>, translate: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            translate: Some(translate.into()),
            note: None,
        }
    }
}

impl NormalizedKey for Example {
    fn normalized_key(&self) -> String {
        normalize(&self.origin)
    }
}

normalized_identity!(Transcription, Interpretation, Translation, Example);

/// Facet type attached to a word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacetKind {
    Transcription,
    Interpretation,
    Translation,
    Example,
}

impl FacetKind {
    pub const ALL: [FacetKind; 4] = [
        FacetKind::Transcription,
        FacetKind::Interpretation,
        FacetKind::Translation,
        FacetKind::Example,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FacetKind::Transcription => "transcription",
            FacetKind::Interpretation => "interpretation",
            FacetKind::Translation => "translation",
            FacetKind::Example => "example",
        }
    }
}

impl fmt::Display for FacetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FacetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "transcription" | "transcriptions" => Ok(FacetKind::Transcription),
            "interpretation" | "interpretations" => Ok(FacetKind::Interpretation),
            "translation" | "translations" => Ok(FacetKind::Translation),
            "example" | "examples" => Ok(FacetKind::Example),
            other => Err(format!("unknown facet kind '{}'", other)),
        }
    }
}

// ============================================================================
// Provenance
// ============================================================================

/// Common view over provenance records, used for staleness checks
pub trait Provenance {
    fn source_name(&self) -> &str;
    fn recent_update_date(&self) -> DateTime<Utc>;

    fn is_from(&self, source_name: &str) -> bool {
        source_names_match(self.source_name(), source_name)
    }
}

/// Case-insensitive source name comparison
pub fn source_names_match(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

/// One fetch event for a transcription, interpretation or translation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceProvenance {
    pub source_name: String,
    pub url: String,
    pub recent_update_date: DateTime<Utc>,
    /// Value text exactly as the source returned it
    #[serde(default)]
    pub source_value: String,
    #[serde(default)]
    pub source_note: Option<String>,
}

impl SourceProvenance {
    /// Fetch event without a payload; the merge engine fills `source_value`
    /// and `source_note` from the value being confirmed
    pub fn new(
        source_name: impl Into<String>,
        url: impl Into<String>,
        recent_update_date: DateTime<Utc>,
    ) -> Self {
        Self {
            source_name: source_name.into(),
            url: url.into(),
            recent_update_date,
            source_value: String::new(),
            source_note: None,
        }
    }
}

impl Provenance for SourceProvenance {
    fn source_name(&self) -> &str {
        &self.source_name
    }

    fn recent_update_date(&self) -> DateTime<Utc> {
        self.recent_update_date
    }
}

/// One fetch event for an example's translation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExampleProvenance {
    pub source_name: String,
    pub url: String,
    pub recent_update_date: DateTime<Utc>,
    /// Translated text returned by the source
    pub translate: String,
}

impl Provenance for ExampleProvenance {
    fn source_name(&self) -> &str {
        &self.source_name
    }

    fn recent_update_date(&self) -> DateTime<Utc> {
        self.recent_update_date
    }
}

// ============================================================================
// Word
// ============================================================================

/// A user's English word with its authored facets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Word {
    pub id: Uuid,
    pub user_id: Uuid,
    pub value: String,
    #[serde(default)]
    pub transcriptions: Vec<Transcription>,
    #[serde(default)]
    pub interpretations: Vec<Interpretation>,
    #[serde(default)]
    pub translations: Vec<Translation>,
    #[serde(default)]
    pub examples: Vec<Example>,
}

impl Word {
    pub fn new(user_id: Uuid, value: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            value: value.into(),
            transcriptions: Vec::new(),
            interpretations: Vec::new(),
            translations: Vec::new(),
            examples: Vec::new(),
        }
    }

    /// Key for the shared-facet cache rows of this word
    pub fn normalized_value(&self) -> String {
        normalize(&self.value)
    }
}

// ============================================================================
// External Sources
// ============================================================================

/// External provider of facet values for a word
///
/// Implementations are called sequentially in configured order. Any error
/// is isolated to that source for the current request.
///
/// # Example
/// ```rust,ignore
/// struct Dictionary;
///
/// #[async_trait::async_trait]
/// impl EnrichmentSource for Dictionary {
///     fn name(&self) -> &str { "Dictionary" }
///     fn facets(&self) -> &[FacetKind] { &[FacetKind::Transcription] }
///
///     async fn supplement(&self, word: &Word) -> Result<SourceContribution, SourceError> {
///         let mut contribution = SourceContribution::new(word, "Dictionary", "https://dict", Utc::now());
///         contribution.add_transcription(Transcription::new("/rʌn/"));
///         Ok(contribution)
///     }
/// }
/// ```
#[async_trait::async_trait]
pub trait EnrichmentSource: Send + Sync {
    /// Source name recorded in provenance and cache rows
    fn name(&self) -> &str;

    /// Facet kinds this source can supply; drives staleness checks
    fn facets(&self) -> &[FacetKind] {
        &FacetKind::ALL
    }

    /// Fetch this source's facets for `word`
    async fn supplement(&self, word: &Word) -> Result<SourceContribution, SourceError>;
}

/// A single source failed for this request (`SourceUnavailable`)
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Rate limited")]
    RateLimited,

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_facet_equality_ignores_case_and_whitespace() {
        assert_eq!(Transcription::new("/rʌn/"), Transcription::new(" /RʌN/ "));
        assert_eq!(Interpretation::new("To move fast"), Interpretation::new("to move fast"));
        assert_ne!(Translation::new("бежать"), Translation::new("бегать"));
    }

    #[test]
    fn test_translation_note_does_not_affect_identity() {
        assert_eq!(
            Translation::with_note("бежать", "verb"),
            Translation::new("БЕЖАТЬ")
        );
    }

    #[test]
    fn test_example_identity_is_origin() {
        let a = Example::translated("I run every day", "Я бегаю каждый день");
        let b = Example::new("i run every day");
        assert_eq!(a, b);

        let set: HashSet<Example> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_facet_kind_round_trip_from_config_strings() {
        for kind in FacetKind::ALL {
            assert_eq!(kind.as_str().parse::<FacetKind>().unwrap(), kind);
        }
        assert_eq!("Examples".parse::<FacetKind>().unwrap(), FacetKind::Example);
        assert!("synonym".parse::<FacetKind>().is_err());
    }

    #[test]
    fn test_source_name_match_is_case_insensitive() {
        let provenance = SourceProvenance::new("Oxford", "https://oxford", Utc::now());
        assert!(provenance.is_from("oxford"));
        assert!(!provenance.is_from("Reverso"));
    }

    #[test]
    fn test_word_normalized_value() {
        let word = Word::new(Uuid::new_v4(), "  Run ");
        assert_eq!(word.normalized_value(), "run");
    }
}

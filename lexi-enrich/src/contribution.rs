//! Source contribution
//!
//! The facet values one external source returned for one word at one point
//! in time. Values are deduplicated on insertion under each facet type's
//! equality rule, so a contribution never holds two equal values.

use crate::freshness::{days_between, months_between};
use crate::types::{
    normalize, source_names_match, Example, Interpretation, NormalizedKey, Transcription,
    Translation, Word,
};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct SourceContribution {
    word_value: String,
    /// Owner of the word, needed because examples are private content
    user_id: Uuid,
    source_name: String,
    source_url: String,
    recent_update_date: DateTime<Utc>,
    transcriptions: Vec<Transcription>,
    interpretations: Vec<Interpretation>,
    translations: Vec<Translation>,
    examples: Vec<Example>,
}

impl SourceContribution {
    pub fn new(
        word: &Word,
        source_name: impl Into<String>,
        source_url: impl Into<String>,
        recent_update_date: DateTime<Utc>,
    ) -> Self {
        Self {
            word_value: word.value.clone(),
            user_id: word.user_id,
            source_name: source_name.into(),
            source_url: source_url.into(),
            recent_update_date,
            transcriptions: Vec::new(),
            interpretations: Vec::new(),
            translations: Vec::new(),
            examples: Vec::new(),
        }
    }

    /// Returns `false` if an equal transcription is already present
    pub fn add_transcription(&mut self, transcription: Transcription) -> bool {
        push_unique(&mut self.transcriptions, transcription)
    }

    /// Returns `false` if an equal interpretation is already present
    pub fn add_interpretation(&mut self, interpretation: Interpretation) -> bool {
        push_unique(&mut self.interpretations, interpretation)
    }

    /// Returns `false` if an equal translation is already present
    pub fn add_translation(&mut self, translation: Translation) -> bool {
        push_unique(&mut self.translations, translation)
    }

    /// Add an example translation
    ///
    /// Returns `false` if an example with the same origin is already present
    /// or the example carries no translation.
    pub fn add_example(&mut self, example: Example) -> bool {
        let has_translation = example
            .translate
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty());
        if !has_translation {
            return false;
        }
        push_unique(&mut self.examples, example)
    }

    /// Candidates whose origin this contribution does not translate yet
    pub fn missing_examples(&self, candidates: &[Example]) -> Vec<Example> {
        let present: HashSet<String> = self.examples.iter().map(|e| e.normalized_key()).collect();
        candidates
            .iter()
            .filter(|candidate| !present.contains(&candidate.normalized_key()))
            .cloned()
            .collect()
    }

    /// Null-safe, case-insensitive source name check
    pub fn source_name_is(&self, name: Option<&str>) -> bool {
        name.is_some_and(|name| source_names_match(&self.source_name, name))
    }

    pub fn days_after_recent_update(&self, now: DateTime<Utc>) -> i64 {
        days_between(self.recent_update_date, now)
    }

    pub fn months_after_recent_update(&self, now: DateTime<Utc>) -> i64 {
        months_between(self.recent_update_date, now)
    }

    pub fn word_value(&self) -> &str {
        &self.word_value
    }

    pub fn normalized_word_value(&self) -> String {
        normalize(&self.word_value)
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn recent_update_date(&self) -> DateTime<Utc> {
        self.recent_update_date
    }

    pub fn transcriptions(&self) -> &[Transcription] {
        &self.transcriptions
    }

    pub fn interpretations(&self) -> &[Interpretation] {
        &self.interpretations
    }

    pub fn translations(&self) -> &[Translation] {
        &self.translations
    }

    pub fn examples(&self) -> &[Example] {
        &self.examples
    }

    /// Total number of facet values across all types
    pub fn len(&self) -> usize {
        self.transcriptions.len()
            + self.interpretations.len()
            + self.translations.len()
            + self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn push_unique<T: NormalizedKey>(values: &mut Vec<T>, value: T) -> bool {
    let key = value.normalized_key();
    if key.is_empty() || values.iter().any(|v| v.normalized_key() == key) {
        return false;
    }
    values.push(value);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn contribution() -> SourceContribution {
        let word = Word::new(Uuid::new_v4(), "run");
        SourceContribution::new(
            &word,
            "Oxford",
            "https://oxford.example/run",
            Utc.with_ymd_and_hms(2026, 1, 10, 0, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_duplicate_transcription_is_ignored() {
        let mut c = contribution();
        assert!(c.add_transcription(Transcription::new("/rʌn/")));
        assert!(!c.add_transcription(Transcription::new("/rʌn/")));
        assert_eq!(c.transcriptions().len(), 1);
    }

    #[test]
    fn test_dedup_is_case_insensitive() {
        let mut c = contribution();
        assert!(c.add_interpretation(Interpretation::new("To move fast")));
        assert!(!c.add_interpretation(Interpretation::new("to MOVE fast")));
        assert!(c.add_translation(Translation::new("бежать")));
        assert!(!c.add_translation(Translation::with_note("Бежать", "verb")));
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn test_blank_values_are_rejected() {
        let mut c = contribution();
        assert!(!c.add_interpretation(Interpretation::new("   ")));
        assert!(!c.add_example(Example::new("I run every day")));
        assert!(!c.add_example(Example::translated("I run every day", " ")));
        assert!(c.is_empty());
    }

    #[test]
    fn test_examples_dedup_by_origin() {
        let mut c = contribution();
        assert!(c.add_example(Example::translated("I run every day", "Я бегаю каждый день")));
        assert!(!c.add_example(Example::translated("I RUN every day", "Я бегаю ежедневно")));
        assert_eq!(c.examples()[0].translate.as_deref(), Some("Я бегаю каждый день"));
    }

    #[test]
    fn test_missing_examples() {
        let mut c = contribution();
        c.add_example(Example::translated("I run every day", "Я бегаю каждый день"));

        let candidates = vec![
            Example::new("i run every day"),
            Example::new("Run, Forest, run!"),
        ];
        let missing = c.missing_examples(&candidates);

        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].origin, "Run, Forest, run!");
    }

    #[test]
    fn test_source_name_is() {
        let c = contribution();
        assert!(c.source_name_is(Some("oxford")));
        assert!(c.source_name_is(Some(" OXFORD ")));
        assert!(!c.source_name_is(Some("Reverso")));
        assert!(!c.source_name_is(None));
    }

    #[test]
    fn test_age_since_recent_update() {
        let c = contribution();
        let now = c.recent_update_date() + Duration::days(100);
        assert_eq!(c.days_after_recent_update(now), 100);
        assert_eq!(c.months_after_recent_update(now), 3);
    }

    #[test]
    fn test_carries_word_identity() {
        let c = contribution();
        assert_eq!(c.word_value(), "run");
        assert_eq!(c.normalized_word_value(), "run");
        assert_eq!(c.source_url(), "https://oxford.example/run");
    }
}

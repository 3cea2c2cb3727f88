//! Mock enrichment sources
//!
//! - `StaticSource`: returns fixed facet values and counts calls
//! - `FailingSource`: always unavailable
//! - `SlowSource`: sleeps past any reasonable timeout
//! - `DefinitionSource`: keeps the default facets, only ever returns one
//!   interpretation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lexi_enrich::contribution::SourceContribution;
use lexi_enrich::types::{
    EnrichmentSource, Example, FacetKind, Interpretation, SourceError, Transcription,
    Translation, Word,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub struct StaticSource {
    name: String,
    facets: Vec<FacetKind>,
    transcriptions: Vec<String>,
    interpretations: Vec<String>,
    translations: Vec<String>,
    /// (origin, translate)
    examples: Vec<(String, String)>,
    fetched_at: Option<DateTime<Utc>>,
    calls: AtomicUsize,
}

impl StaticSource {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            facets: Vec::new(),
            transcriptions: Vec::new(),
            interpretations: Vec::new(),
            translations: Vec::new(),
            examples: Vec::new(),
            fetched_at: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn transcription(mut self, value: &str) -> Self {
        self.declare(FacetKind::Transcription);
        self.transcriptions.push(value.to_string());
        self
    }

    pub fn interpretation(mut self, value: &str) -> Self {
        self.declare(FacetKind::Interpretation);
        self.interpretations.push(value.to_string());
        self
    }

    pub fn translation(mut self, value: &str) -> Self {
        self.declare(FacetKind::Translation);
        self.translations.push(value.to_string());
        self
    }

    pub fn example(mut self, origin: &str, translate: &str) -> Self {
        self.declare(FacetKind::Example);
        self.examples.push((origin.to_string(), translate.to_string()));
        self
    }

    /// Stamp contributions with `date` instead of the wall clock
    pub fn fetched_at(mut self, date: DateTime<Utc>) -> Self {
        self.fetched_at = Some(date);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn declare(&mut self, kind: FacetKind) {
        if !self.facets.contains(&kind) {
            self.facets.push(kind);
        }
    }
}

#[async_trait]
impl EnrichmentSource for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn facets(&self) -> &[FacetKind] {
        &self.facets
    }

    async fn supplement(&self, word: &Word) -> Result<SourceContribution, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let url = format!("https://{}.example/{}", self.name.to_lowercase(), word.value);
        let mut contribution = SourceContribution::new(
            word,
            self.name.clone(),
            url,
            self.fetched_at.unwrap_or_else(Utc::now),
        );
        for value in &self.transcriptions {
            contribution.add_transcription(Transcription::new(value.as_str()));
        }
        for value in &self.interpretations {
            contribution.add_interpretation(Interpretation::new(value.as_str()));
        }
        for value in &self.translations {
            contribution.add_translation(Translation::new(value.as_str()));
        }
        for (origin, translate) in &self.examples {
            contribution.add_example(Example::translated(origin.as_str(), translate.as_str()));
        }
        Ok(contribution)
    }
}

pub struct FailingSource {
    name: String,
    calls: AtomicUsize,
}

impl FailingSource {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EnrichmentSource for FailingSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn supplement(&self, _word: &Word) -> Result<SourceContribution, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(SourceError::Network("connection refused".to_string()))
    }
}

pub struct SlowSource {
    name: String,
    delay: Duration,
}

impl SlowSource {
    pub fn new(name: &str, delay: Duration) -> Self {
        Self {
            name: name.to_string(),
            delay,
        }
    }
}

#[async_trait]
impl EnrichmentSource for SlowSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn facets(&self) -> &[FacetKind] {
        &[FacetKind::Translation]
    }

    async fn supplement(&self, word: &Word) -> Result<SourceContribution, SourceError> {
        tokio::time::sleep(self.delay).await;
        let mut contribution =
            SourceContribution::new(word, self.name.clone(), "https://slow.example", Utc::now());
        contribution.add_translation(Translation::new("слишком поздно"));
        Ok(contribution)
    }
}

pub struct DefinitionSource {
    name: String,
    definition: String,
    fetched_at: DateTime<Utc>,
    calls: AtomicUsize,
}

impl DefinitionSource {
    pub fn new(name: &str, definition: &str, fetched_at: DateTime<Utc>) -> Self {
        Self {
            name: name.to_string(),
            definition: definition.to_string(),
            fetched_at,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EnrichmentSource for DefinitionSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn supplement(&self, word: &Word) -> Result<SourceContribution, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let url = format!("https://{}.example/{}", self.name.to_lowercase(), word.value);
        let mut contribution =
            SourceContribution::new(word, self.name.clone(), url, self.fetched_at);
        contribution.add_interpretation(Interpretation::new(self.definition.as_str()));
        Ok(contribution)
    }
}

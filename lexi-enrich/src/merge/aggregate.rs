//! Canonical enrichment for one word
//!
//! Seeded from the word's authored facets, grown by cached rows and fresh
//! source contributions, then turned back into a `Word` for the caller.
//! It is never persisted itself; the cache stores its provenance rows.

use crate::contribution::SourceContribution;
use crate::freshness::Freshness;
use crate::merge::ledger::FacetLedger;
use crate::types::{
    normalize, Example, ExampleProvenance, FacetKind, Interpretation, SourceProvenance,
    Transcription, Translation, Word,
};
use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

/// Counts of canonical changes made by one merge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    /// Facet values that were not canonical before
    pub new_values: usize,
    /// Provenance entries appended (including re-confirmations)
    pub confirmations: usize,
    /// Example translations dropped because the word has no such example
    pub unmatched_examples: usize,
}

#[derive(Debug, Clone)]
pub struct CanonicalEnrichment {
    word_id: Uuid,
    user_id: Uuid,
    word_value: String,
    transcriptions: FacetLedger<Transcription, SourceProvenance>,
    interpretations: FacetLedger<Interpretation, SourceProvenance>,
    translations: FacetLedger<Translation, SourceProvenance>,
    examples: FacetLedger<Example, ExampleProvenance>,
}

impl CanonicalEnrichment {
    /// Seed the canonical lists from the word's own facets
    pub fn new(word: Word) -> Self {
        Self {
            word_id: word.id,
            user_id: word.user_id,
            word_value: word.value,
            transcriptions: FacetLedger::seeded(word.transcriptions),
            interpretations: FacetLedger::seeded(word.interpretations),
            translations: FacetLedger::seeded(word.translations),
            examples: FacetLedger::seeded(word.examples),
        }
    }

    /// Fold one source's contribution into the canonical view
    pub fn merge(&mut self, contribution: &SourceContribution) -> MergeSummary {
        let mut summary = MergeSummary::default();
        let provenance = SourceProvenance::new(
            contribution.source_name(),
            contribution.source_url(),
            contribution.recent_update_date(),
        );

        for transcription in contribution.transcriptions() {
            summary.record(self.merge_transcription(transcription.clone(), provenance.clone()));
        }
        for interpretation in contribution.interpretations() {
            summary.record(self.merge_interpretation(interpretation.clone(), provenance.clone()));
        }
        for translation in contribution.translations() {
            summary.record(self.merge_translation(translation.clone(), provenance.clone()));
        }
        for example in contribution.examples() {
            let Some(translate) = example.translate.clone() else {
                continue;
            };
            let example_provenance = ExampleProvenance {
                source_name: provenance.source_name.clone(),
                url: provenance.url.clone(),
                recent_update_date: provenance.recent_update_date,
                translate,
            };
            if self.merge_example_translation(&example.origin, example_provenance) {
                summary.confirmations += 1;
            } else {
                summary.unmatched_examples += 1;
            }
        }

        debug!(
            word = %self.word_value,
            source = contribution.source_name(),
            new_values = summary.new_values,
            confirmations = summary.confirmations,
            unmatched_examples = summary.unmatched_examples,
            "Merged source contribution"
        );

        summary
    }

    /// Returns `true` if the transcription was not canonical before
    ///
    /// The provenance entry records the value as the source returned it,
    /// even when the canonical value is the user's own.
    pub fn merge_transcription(
        &mut self,
        transcription: Transcription,
        mut provenance: SourceProvenance,
    ) -> bool {
        provenance.source_value = transcription.value.clone();
        provenance.source_note = transcription.note.clone();
        self.transcriptions.confirm(transcription, provenance)
    }

    /// Returns `true` if the interpretation was not canonical before
    pub fn merge_interpretation(
        &mut self,
        interpretation: Interpretation,
        mut provenance: SourceProvenance,
    ) -> bool {
        provenance.source_value = interpretation.value.clone();
        provenance.source_note = None;
        self.interpretations.confirm(interpretation, provenance)
    }

    /// Returns `true` if the translation was not canonical before
    pub fn merge_translation(
        &mut self,
        translation: Translation,
        mut provenance: SourceProvenance,
    ) -> bool {
        provenance.source_value = translation.value.clone();
        provenance.source_note = translation.note.clone();
        self.translations.confirm(translation, provenance)
    }

    /// Attach a source's translation to the word's example with `origin`
    ///
    /// Never introduces a new example sentence. The example's own
    /// `translate` is filled only when it was empty. Returns `false` if the
    /// word has no example with that origin.
    pub fn merge_example_translation(&mut self, origin: &str, provenance: ExampleProvenance) -> bool {
        let key = normalize(origin);
        if !self.examples.contains_key(&key) {
            return false;
        }

        if let Some(example) = self.examples.value_mut(&key) {
            if example.translate.is_none() {
                example.translate = Some(provenance.translate.clone());
            }
        }
        self.examples.attach(&key, provenance)
    }

    pub fn transcription_sources(&self, transcription: &Transcription) -> &[SourceProvenance] {
        self.transcriptions.provenance(transcription)
    }

    pub fn interpretation_sources(&self, interpretation: &Interpretation) -> &[SourceProvenance] {
        self.interpretations.provenance(interpretation)
    }

    pub fn translation_sources(&self, translation: &Translation) -> &[SourceProvenance] {
        self.translations.provenance(translation)
    }

    pub fn example_sources(&self, example: &Example) -> &[ExampleProvenance] {
        self.examples.provenance(example)
    }

    pub fn transcriptions(&self) -> &FacetLedger<Transcription, SourceProvenance> {
        &self.transcriptions
    }

    pub fn interpretations(&self) -> &FacetLedger<Interpretation, SourceProvenance> {
        &self.interpretations
    }

    pub fn translations(&self) -> &FacetLedger<Translation, SourceProvenance> {
        &self.translations
    }

    pub fn examples(&self) -> &FacetLedger<Example, ExampleProvenance> {
        &self.examples
    }

    /// Number of canonical values of `kind`
    pub fn facet_len(&self, kind: FacetKind) -> usize {
        match kind {
            FacetKind::Transcription => self.transcriptions.len(),
            FacetKind::Interpretation => self.interpretations.len(),
            FacetKind::Translation => self.translations.len(),
            FacetKind::Example => self.examples.len(),
        }
    }

    /// Freshness of what `source_name` contributed to `kind`
    ///
    /// `None` when the source has no entry of this kind: it never returned
    /// one, or (for examples) the word has none. Shared facets use the
    /// source's most recent fetch of that kind. Examples, once the source
    /// translated any, require an entry on every example (`Absent`
    /// otherwise); the oldest of those decides.
    pub fn freshness(
        &self,
        kind: FacetKind,
        source_name: &str,
        now: DateTime<Utc>,
        staleness_days: i64,
    ) -> Option<Freshness> {
        let recent_update = match kind {
            FacetKind::Transcription => Some(self.transcriptions.recent_update_from(source_name)?),
            FacetKind::Interpretation => {
                Some(self.interpretations.recent_update_from(source_name)?)
            }
            FacetKind::Translation => Some(self.translations.recent_update_from(source_name)?),
            FacetKind::Example => {
                if !self.examples.has_provenance_from(source_name) {
                    return None;
                }
                self.examples.oldest_coverage_from(source_name)?
            }
        };
        Some(Freshness::classify(recent_update, now, staleness_days))
    }

    pub fn word_id(&self) -> Uuid {
        self.word_id
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn word_value(&self) -> &str {
        &self.word_value
    }

    /// Cache key for shared facets
    pub fn normalized_word_value(&self) -> String {
        normalize(&self.word_value)
    }

    /// Current canonical view as a `Word`
    pub fn to_word(&self) -> Word {
        Word {
            id: self.word_id,
            user_id: self.user_id,
            value: self.word_value.clone(),
            transcriptions: self.transcriptions.values().to_vec(),
            interpretations: self.interpretations.values().to_vec(),
            translations: self.translations.values().to_vec(),
            examples: self.examples.values().to_vec(),
        }
    }

    pub fn into_word(self) -> Word {
        Word {
            id: self.word_id,
            user_id: self.user_id,
            value: self.word_value,
            transcriptions: self.transcriptions.into_values(),
            interpretations: self.interpretations.into_values(),
            translations: self.translations.into_values(),
            examples: self.examples.into_values(),
        }
    }
}

impl MergeSummary {
    fn record(&mut self, is_new: bool) {
        self.confirmations += 1;
        if is_new {
            self.new_values += 1;
        }
    }
}

//! Word Validator
//!
//! Checks the domain invariants a merged word must satisfy:
//! - the word value and every facet value are non-blank
//! - each facet list is unique by normalized key
//! - an example translation, when present, is non-blank

use crate::types::{NormalizedKey, Word};
use std::collections::HashSet;
use std::fmt;
use tracing::debug;

/// One violated invariant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Facet list or field the issue was found in
    pub field: &'static str,
    /// Position in that list, if any
    pub index: Option<usize>,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(index) => write!(f, "{}[{}]: {}", self.field, index, self.message),
            None => write!(f, "{}: {}", self.field, self.message),
        }
    }
}

/// Validate a merged word; empty result means valid
pub fn validate_word(word: &Word) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if word.value.trim().is_empty() {
        issues.push(ValidationIssue {
            field: "value",
            index: None,
            message: "word value is empty".to_string(),
        });
    }

    check_list(&mut issues, "transcriptions", &word.transcriptions);
    check_list(&mut issues, "interpretations", &word.interpretations);
    check_list(&mut issues, "translations", &word.translations);
    check_list(&mut issues, "examples", &word.examples);

    for (index, example) in word.examples.iter().enumerate() {
        if matches!(&example.translate, Some(t) if t.trim().is_empty()) {
            issues.push(ValidationIssue {
                field: "examples",
                index: Some(index),
                message: "translate is present but empty".to_string(),
            });
        }
    }

    if !issues.is_empty() {
        debug!(word = %word.value, issues = issues.len(), "Word failed validation");
    }

    issues
}

fn check_list<T: NormalizedKey>(issues: &mut Vec<ValidationIssue>, field: &'static str, values: &[T]) {
    let mut seen = HashSet::new();
    for (index, value) in values.iter().enumerate() {
        let key = value.normalized_key();
        if key.is_empty() {
            issues.push(ValidationIssue {
                field,
                index: Some(index),
                message: "value is empty".to_string(),
            });
        } else if !seen.insert(key.clone()) {
            issues.push(ValidationIssue {
                field,
                index: Some(index),
                message: format!("duplicate value '{}'", key),
            });
        }
    }
}

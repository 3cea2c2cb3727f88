//! Configured enrichment sources
//!
//! Vendor-specific scrapers live outside this crate. What ships here is a
//! generic HTTP source speaking a provider-neutral JSON document, built
//! from the `[[sources]]` entries of the TOML config.

pub mod http_json;

pub use http_json::HttpJsonSource;

use crate::freshness::Clock;
use crate::types::{EnrichmentSource, FacetKind};
use lexi_common::config::{SourceSection, TomlConfig};
use lexi_common::{Error, Result};
use std::sync::Arc;
use tracing::info;

/// Build every configured source, in configured order
///
/// `clock` should be the orchestrator's, so fetch dates and staleness
/// checks agree.
pub fn build_sources(
    config: &TomlConfig,
    clock: Arc<dyn Clock>,
) -> Result<Vec<Arc<dyn EnrichmentSource>>> {
    let mut sources: Vec<Arc<dyn EnrichmentSource>> = Vec::with_capacity(config.sources.len());

    for section in &config.sources {
        let facets = parse_facets(section)?;
        let source = HttpJsonSource::new(
            section.name.clone(),
            section.url_template.clone(),
            facets,
            section.requests_per_second,
        )?
        .with_clock(clock.clone());
        info!(
            source = %section.name,
            facets = ?source.facets(),
            rps = section.requests_per_second,
            "Enrichment source configured"
        );
        sources.push(Arc::new(source));
    }

    Ok(sources)
}

fn parse_facets(section: &SourceSection) -> Result<Vec<FacetKind>> {
    if section.facets.is_empty() {
        return Ok(FacetKind::ALL.to_vec());
    }

    let mut facets = Vec::with_capacity(section.facets.len());
    for raw in &section.facets {
        let kind: FacetKind = raw
            .parse()
            .map_err(|e| Error::Config(format!("source '{}': {}", section.name, e)))?;
        if !facets.contains(&kind) {
            facets.push(kind);
        }
    }
    Ok(facets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::freshness::SystemClock;

    fn section(facets: &[&str]) -> SourceSection {
        SourceSection {
            name: "Oxford".to_string(),
            url_template: "https://dict.example/{word}".to_string(),
            facets: facets.iter().map(|f| f.to_string()).collect(),
            requests_per_second: 2,
        }
    }

    #[test]
    fn test_empty_facets_means_all() {
        assert_eq!(parse_facets(&section(&[])).unwrap(), FacetKind::ALL.to_vec());
    }

    #[test]
    fn test_facets_parsed_and_deduplicated() {
        let facets = parse_facets(&section(&["transcriptions", "Translation", "translations"])).unwrap();
        assert_eq!(facets, vec![FacetKind::Transcription, FacetKind::Translation]);
    }

    #[test]
    fn test_unknown_facet_rejected() {
        let err = parse_facets(&section(&["pictures"])).unwrap_err();
        assert!(err.to_string().contains("Oxford"));
    }

    #[test]
    fn test_build_sources_keeps_order() {
        let mut config = TomlConfig::default();
        config.sources.push(section(&["transcription"]));
        let mut second = section(&["example"]);
        second.name = "Reverso".to_string();
        config.sources.push(second);

        let sources = build_sources(&config, Arc::new(SystemClock)).unwrap();

        let names: Vec<&str> = sources.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["Oxford", "Reverso"]);
        assert_eq!(sources[1].facets(), &[FacetKind::Example]);
    }
}

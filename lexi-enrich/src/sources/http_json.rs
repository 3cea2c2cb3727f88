//! Generic HTTP enrichment source
//!
//! GETs `url_template` with `{word}` percent-encoded and expects:
//!
//! ```json
//! {
//!   "transcriptions":  [{"value": "/rʌn/", "note": "UK"}],
//!   "interpretations": [{"value": "move at a speed faster than a walk"}],
//!   "translations":    [{"value": "бежать", "note": null}],
//!   "examples":        [{"origin": "I run every day", "translate": "Я бегаю каждый день"}]
//! }
//! ```
//!
//! Every list is optional. Requests are rate limited per source.

use crate::contribution::SourceContribution;
use crate::types::{
    EnrichmentSource, Example, FacetKind, Interpretation, SourceError, Transcription,
    Translation, Word,
};
use crate::freshness::{Clock, SystemClock};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use lexi_common::{Error, Result};
use serde::Deserialize;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = concat!("lexi-enrich/", env!("CARGO_PKG_VERSION"));
const WORD_PLACEHOLDER: &str = "{word}";

/// Client-side bound; the orchestrator applies its own per-call timeout
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Default, Deserialize)]
pub struct SourceDocument {
    #[serde(default)]
    pub transcriptions: Vec<NotedValue>,
    #[serde(default)]
    pub interpretations: Vec<PlainValue>,
    #[serde(default)]
    pub translations: Vec<NotedValue>,
    #[serde(default)]
    pub examples: Vec<ExampleValue>,
}

#[derive(Debug, Deserialize)]
pub struct NotedValue {
    pub value: String,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PlainValue {
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct ExampleValue {
    pub origin: String,
    pub translate: String,
}

impl SourceDocument {
    /// Convert into a contribution for `word`
    ///
    /// Facets outside `facets` are ignored. Example translations are kept
    /// only for origins the word already has.
    pub fn into_contribution(
        self,
        word: &Word,
        source_name: &str,
        url: &str,
        facets: &[FacetKind],
        fetched_at: DateTime<Utc>,
    ) -> SourceContribution {
        let mut contribution = SourceContribution::new(word, source_name, url, fetched_at);

        if facets.contains(&FacetKind::Transcription) {
            for t in self.transcriptions {
                contribution.add_transcription(Transcription {
                    value: t.value,
                    note: t.note,
                });
            }
        }
        if facets.contains(&FacetKind::Interpretation) {
            for i in self.interpretations {
                contribution.add_interpretation(Interpretation { value: i.value });
            }
        }
        if facets.contains(&FacetKind::Translation) {
            for t in self.translations {
                contribution.add_translation(Translation {
                    value: t.value,
                    note: t.note,
                });
            }
        }
        if facets.contains(&FacetKind::Example) {
            let wanted = contribution.missing_examples(&word.examples);
            for e in self.examples {
                let candidate = Example::translated(e.origin, e.translate);
                if wanted.contains(&candidate) {
                    contribution.add_example(candidate);
                }
            }

            let untranslated = contribution.missing_examples(&word.examples).len();
            if untranslated > 0 {
                debug!(
                    word = %word.value,
                    source = source_name,
                    untranslated,
                    "Source did not translate every example"
                );
            }
        }

        contribution
    }
}

/// `EnrichmentSource` over a JSON HTTP endpoint
pub struct HttpJsonSource {
    name: String,
    url_template: String,
    facets: Vec<FacetKind>,
    http_client: reqwest::Client,
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    /// Stamps contributions with their fetch date
    clock: Arc<dyn Clock>,
}

impl HttpJsonSource {
    pub fn new(
        name: impl Into<String>,
        url_template: impl Into<String>,
        facets: Vec<FacetKind>,
        requests_per_second: u32,
    ) -> Result<Self> {
        let name = name.into();
        let url_template = url_template.into();

        if !url_template.contains(WORD_PLACEHOLDER) {
            return Err(Error::Config(format!(
                "source '{}': url_template must contain {}",
                name, WORD_PLACEHOLDER
            )));
        }
        let rps = NonZeroU32::new(requests_per_second).ok_or_else(|| {
            Error::Config(format!("source '{}': requests_per_second must be positive", name))
        })?;

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::Internal(format!("HTTP client for '{}': {}", name, e)))?;

        Ok(Self {
            name,
            url_template,
            facets,
            http_client,
            rate_limiter: RateLimiter::direct(Quota::per_second(rps)),
            clock: Arc::new(SystemClock),
        })
    }

    /// Use the orchestrator's clock for fetch dates
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Request URL for `word`
    pub fn url_for(&self, word: &str) -> String {
        self.url_template
            .replace(WORD_PLACEHOLDER, &urlencoding::encode(word.trim()))
    }
}

#[async_trait]
impl EnrichmentSource for HttpJsonSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn facets(&self) -> &[FacetKind] {
        &self.facets
    }

    async fn supplement(&self, word: &Word) -> std::result::Result<SourceContribution, SourceError> {
        self.rate_limiter.until_ready().await;

        let url = self.url_for(&word.value);
        debug!(source = %self.name, word = %word.value, url = %url, "Querying source");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(SourceError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Api(status.as_u16(), body));
        }

        let document: SourceDocument = response
            .json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        Ok(document.into_contribution(
            word,
            &self.name,
            &url,
            &self.facets,
            self.clock.now(),
        ))
    }
}

//! Search Router
//!
//! Classifies a query (for telemetry only), picks a provider chain for the
//! strategy, and walks the chain until a provider answers with at least one
//! item. Each provider attempt goes through the retry executor with the
//! search retry policy, so transient failures are retried with jittered
//! backoff before the router falls back.
//!
//! | Strategy        | Chain                                      |
//! |-----------------|--------------------------------------------|
//! | `Smart`         | primary → secondary                        |
//! | `DuckDuckGo`    | secondary                                  |
//! | `Tavily`        | premium, or the `Smart` chain without one  |
//! | `McpWebSearch`  | primary → secondary                        |

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use super::classifier::{Classification, QueryClassifier};
use super::provider::SearchProvider;
use super::types::{QueryCategory, SearchItem, SearchResult, SearchStats, SearchStrategy};
use crate::error::SearchError;
use crate::llm::ModelClient;
use crate::retry::{with_retry_if, RetryPolicy};

/// Routes queries across primary, secondary and optional premium providers
#[derive(Clone)]
pub struct SearchRouter {
    primary: Arc<dyn SearchProvider>,
    secondary: Arc<dyn SearchProvider>,
    premium: Option<Arc<dyn SearchProvider>>,
    classifier: Option<QueryClassifier>,
    retry: RetryPolicy,
    default_strategy: SearchStrategy,
}

impl SearchRouter {
    pub fn new(primary: Arc<dyn SearchProvider>, secondary: Arc<dyn SearchProvider>) -> Self {
        Self {
            primary,
            secondary,
            premium: None,
            classifier: None,
            retry: RetryPolicy::new(1)
                .with_backoff_base(Duration::from_millis(500))
                .with_jitter(Duration::from_millis(500)),
            default_strategy: SearchStrategy::Smart,
        }
    }

    /// Enable the premium chain
    pub fn with_premium(mut self, premium: Arc<dyn SearchProvider>) -> Self {
        self.premium = Some(premium);
        self
    }

    /// Classify with the model instead of keyword rules
    pub fn with_classifier(mut self, classifier: QueryClassifier) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Same providers and policy, with model classification (when enabled)
    /// sent to `model`
    pub fn with_classifier_model(&self, model: Arc<dyn ModelClient>) -> Self {
        let mut router = self.clone();
        if router.classifier.is_some() {
            router.classifier = Some(QueryClassifier::new(model));
        }
        router
    }

    pub fn has_classifier(&self) -> bool {
        self.classifier.is_some()
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_default_strategy(mut self, strategy: SearchStrategy) -> Self {
        self.default_strategy = strategy;
        self
    }

    pub fn default_strategy(&self) -> SearchStrategy {
        self.default_strategy
    }

    pub fn has_premium(&self) -> bool {
        self.premium.is_some()
    }

    /// Providers tried for `strategy`, in order
    pub fn chain(&self, strategy: SearchStrategy) -> Vec<Arc<dyn SearchProvider>> {
        match strategy {
            SearchStrategy::Smart | SearchStrategy::McpWebSearch => {
                vec![self.primary.clone(), self.secondary.clone()]
            }
            SearchStrategy::DuckDuckGo => vec![self.secondary.clone()],
            SearchStrategy::Tavily => match &self.premium {
                Some(premium) => vec![premium.clone()],
                None => {
                    warn!("Premium search not configured, using smart chain");
                    self.chain(SearchStrategy::Smart)
                }
            },
        }
    }

    async fn classify(&self, query: &str, explicit: Option<QueryCategory>) -> Classification {
        match (explicit, &self.classifier) {
            (Some(category), _) => Classification::explicit(category),
            (None, Some(classifier)) => classifier.classify(query).await,
            (None, None) => Classification::quick(query),
        }
    }

    /// Route one query through the chain for `strategy` (default when `None`)
    pub async fn route(
        &self,
        query: &str,
        strategy: Option<SearchStrategy>,
        explicit_category: Option<QueryCategory>,
    ) -> SearchResult {
        let strategy = strategy.unwrap_or(self.default_strategy);
        let classification = self.classify(query, explicit_category).await;
        info!(query = %query, %strategy, category = %classification.category, "Routing search");

        let chain = self.chain(strategy);
        let mut notes: Vec<String> = Vec::new();
        // error reflects the provider that had the last word
        let mut last_failed = false;
        let mut last = self.secondary.id();

        for (index, provider) in chain.iter().enumerate() {
            let id = provider.id();
            last = id;

            let outcome = with_retry_if(
                &self.retry,
                || provider.search(query),
                SearchError::is_retryable,
            )
            .await;

            match outcome {
                Ok(items) if !items.is_empty() => {
                    let fallback = if index > 0 { " (fallback)" } else { "" };
                    let mut reasoning = format!(
                        "[{}] {}. {}{}: {} results via {}",
                        classification.category,
                        classification.reasoning,
                        id,
                        fallback,
                        items.len(),
                        strategy
                    );
                    if !notes.is_empty() {
                        reasoning.push_str(&format!(" ({})", notes.join("; ")));
                    }
                    info!(query = %query, provider = %id, count = items.len(), "Search served");
                    return SearchResult {
                        query: query.to_string(),
                        provider: id,
                        items: SearchItem::from_raw(items),
                        reasoning,
                        error: false,
                        category: classification.category,
                        strategy,
                        timestamp: Utc::now(),
                    };
                }
                Ok(_) => {
                    last_failed = false;
                    warn!(query = %query, provider = %id, "Provider returned no results");
                    notes.push(format!("{} returned no results", id));
                }
                Err(e) => {
                    last_failed = true;
                    warn!(query = %query, provider = %id, error = %e, "Provider failed");
                    notes.push(format!("{} failed: {}", id, e.last_error()));
                }
            }
        }

        let outcome = if last_failed { "all providers failed" } else { "no results" };
        SearchResult {
            query: query.to_string(),
            provider: last,
            items: Vec::new(),
            reasoning: format!(
                "[{}] {}. {}: 0 results via {} ({})",
                classification.category,
                classification.reasoning,
                last,
                strategy,
                if notes.is_empty() { outcome.to_string() } else { notes.join("; ") }
            ),
            error: last_failed,
            category: classification.category,
            strategy,
            timestamp: Utc::now(),
        }
    }

    /// Route several queries sequentially, pausing `delay` between them
    pub async fn batch(
        &self,
        queries: &[String],
        strategy: Option<SearchStrategy>,
        delay: Duration,
    ) -> Vec<SearchResult> {
        info!(count = queries.len(), "Starting batch search");
        let mut results = Vec::with_capacity(queries.len());
        for (index, query) in queries.iter().enumerate() {
            if index > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            results.push(self.route(query, strategy, None).await);
        }

        let stats = SearchStats::from_results(&results);
        info!(
            total = stats.total,
            total_results = stats.total_results,
            errors = stats.errors,
            "Batch search completed"
        );
        results
    }
}

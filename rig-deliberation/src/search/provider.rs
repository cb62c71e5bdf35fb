//! Search provider trait
//!
//! A provider is a stateless lookup from a query to raw items. Transport and
//! HTTP failures surface as [`SearchError`]; the router decides whether to
//! retry or fall back.

use async_trait::async_trait;
use std::time::Duration;

use super::types::{ProviderId, RawSearchItem};
use crate::error::SearchError;

/// Default request timeout for provider HTTP calls
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(30);

#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Which backend this is
    fn id(&self) -> ProviderId;

    /// Run one query
    async fn search(&self, query: &str) -> Result<Vec<RawSearchItem>, SearchError>;
}

/// Map a non-success HTTP status to a typed error
pub(crate) fn status_error(status: u16, body: String) -> SearchError {
    match status {
        401 | 403 => SearchError::Unauthorized,
        429 => SearchError::RateLimited,
        500..=599 => SearchError::ServerError(status, body),
        _ => SearchError::HttpError(status, body),
    }
}

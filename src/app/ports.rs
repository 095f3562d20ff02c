use async_trait::async_trait;

use crate::error::Result;

/// Fetches the raw HTML of a source page.
///
/// The orchestrator only depends on this port, so pipelines can be exercised
/// against canned pages without network access.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

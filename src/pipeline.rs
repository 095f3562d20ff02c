use scraper::Html;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, info_span, instrument, warn, Instrument};

use crate::apis::create_source;
use crate::app::ports::DocumentFetcher;
use crate::config::Config;
use crate::constants::SOURCE_ORDER;
use crate::error::{Result, ScraperError};
use crate::metrics;
use crate::names::NameLookup;
use crate::snapshot;
use crate::types::{PriceRecord, PriceSource};

/// What one source pipeline produced. A failed source carries its error and no records.
#[derive(Debug, Clone)]
pub struct SourceOutcome {
    pub source_id: &'static str,
    pub records: Vec<PriceRecord>,
    pub error: Option<String>,
    pub elapsed_ms: u128,
}

impl SourceOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Per-source line of a [`RunReport`].
#[derive(Debug, Clone, Serialize)]
pub struct SourceSummary {
    pub source_id: &'static str,
    pub records: usize,
    pub error: Option<String>,
    pub elapsed_ms: u128,
}

/// Result of a complete snapshot run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub sources: Vec<SourceSummary>,
    pub total_records: usize,
    pub output_path: PathBuf,
    pub generated_at: String,
}

struct SourceJob {
    source: Arc<dyn PriceSource>,
    url: String,
}

/// Fans out one task per source and joins them all.
///
/// Every task runs to completion or to its own failure; one source failing never
/// cancels or discards the others.
pub struct Orchestrator {
    fetcher: Arc<dyn DocumentFetcher>,
    names: Arc<NameLookup>,
    fetch_timeout: Option<Duration>,
    jobs: Vec<SourceJob>,
}

impl Orchestrator {
    pub fn new(fetcher: Arc<dyn DocumentFetcher>, names: Arc<NameLookup>) -> Self {
        Self {
            fetcher,
            names,
            fetch_timeout: None,
            jobs: Vec::new(),
        }
    }

    /// Bound each source's fetch. `None` leaves it to the transport.
    pub fn with_fetch_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_source(mut self, source: Arc<dyn PriceSource>, url: impl Into<String>) -> Self {
        self.jobs.push(SourceJob {
            source,
            url: url.into(),
        });
        self
    }

    /// Register the built-in sources named in `selected` (all of them when empty),
    /// always in snapshot order. Unknown names are logged and ignored.
    pub fn with_config_sources(mut self, config: &Config, selected: &[String]) -> Self {
        for name in selected {
            if !crate::constants::is_known_source(name) {
                warn!("Unknown source '{}' ignored", name);
            }
        }
        for source_id in SOURCE_ORDER {
            if !selected.is_empty() && !selected.iter().any(|s| s == source_id) {
                continue;
            }
            let source = create_source(source_id);
            if let (Some(source), Some(url)) = (source, config.source_url(source_id)) {
                self = self.with_source(source, url);
            }
        }
        self
    }

    pub fn source_ids(&self) -> Vec<&'static str> {
        self.jobs.iter().map(|j| j.source.source_id()).collect()
    }

    /// Run every registered source concurrently and return outcomes in registration order.
    pub async fn run(&self) -> Vec<SourceOutcome> {
        let handles: Vec<_> = self
            .jobs
            .iter()
            .map(|job| {
                let source_id = job.source.source_id();
                let fetcher = Arc::clone(&self.fetcher);
                let names = Arc::clone(&self.names);
                let source = Arc::clone(&job.source);
                let url = job.url.clone();
                let timeout = self.fetch_timeout;
                let span = info_span!("source", source = source_id);

                let handle = tokio::spawn(
                    async move {
                        let started = Instant::now();
                        info!(%url, "Fetching");
                        let result =
                            run_source(fetcher.as_ref(), source.as_ref(), &names, &url, timeout)
                                .await;
                        (result, started.elapsed())
                    }
                    .instrument(span),
                );
                (source_id, handle)
            })
            .collect();

        let mut outcomes = Vec::with_capacity(handles.len());
        for (source_id, handle) in handles {
            let outcome = match handle.await {
                Ok((Ok(records), elapsed)) => {
                    info!(source = source_id, "Extracted {} records", records.len());
                    metrics::record_fetch_success(source_id, elapsed.as_secs_f64(), records.len());
                    SourceOutcome {
                        source_id,
                        records,
                        error: None,
                        elapsed_ms: elapsed.as_millis(),
                    }
                }
                Ok((Err(e), elapsed)) => {
                    error!(source = source_id, "Source failed, contributing no records: {}", e);
                    metrics::record_fetch_error(source_id, elapsed.as_secs_f64());
                    SourceOutcome {
                        source_id,
                        records: Vec::new(),
                        error: Some(e.to_string()),
                        elapsed_ms: elapsed.as_millis(),
                    }
                }
                Err(join_err) => {
                    error!(source = source_id, "Source task aborted: {}", join_err);
                    metrics::record_fetch_error(source_id, 0.0);
                    SourceOutcome {
                        source_id,
                        records: Vec::new(),
                        error: Some(
                            ScraperError::Source {
                                source_id: source_id.to_string(),
                                message: join_err.to_string(),
                            }
                            .to_string(),
                        ),
                        elapsed_ms: 0,
                    }
                }
            };
            outcomes.push(outcome);
        }
        outcomes
    }
}

async fn run_source(
    fetcher: &dyn DocumentFetcher,
    source: &dyn PriceSource,
    names: &NameLookup,
    url: &str,
    timeout: Option<Duration>,
) -> Result<Vec<PriceRecord>> {
    let body = match timeout {
        Some(limit) => tokio::time::timeout(limit, fetcher.fetch(url))
            .await
            .map_err(|_| ScraperError::Timeout(limit))??,
        None => fetcher.fetch(url).await?,
    };
    Ok(extract_document(source, &body, names))
}

/// Parse a page and run an extractor over it.
pub fn extract_document(
    source: &dyn PriceSource,
    body: &str,
    names: &NameLookup,
) -> Vec<PriceRecord> {
    let document = Html::parse_document(body);
    source.extract(&document, names)
}

pub struct Pipeline;

impl Pipeline {
    /// Fetch every source, assemble the snapshot, write it to `output_path`.
    ///
    /// Source failures are folded into the report; only a write failure is an error.
    #[instrument(skip_all, fields(output = %output_path.display()))]
    pub async fn run(orchestrator: &Orchestrator, output_path: &Path) -> Result<RunReport> {
        info!("🚀 Starting snapshot run for {:?}", orchestrator.source_ids());
        let outcomes = orchestrator.run().await;

        let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
        if failed > 0 {
            warn!("{} of {} sources failed", failed, outcomes.len());
        }

        let generated_at = crate::calendar::timestamp_now()?;
        let snapshot = snapshot::assemble(generated_at, &outcomes);
        snapshot::write_snapshot(output_path, &snapshot)?;
        metrics::record_snapshot(snapshot.records.len());
        info!("💾 Saved {} records to {}", snapshot.records.len(), output_path.display());

        Ok(RunReport {
            sources: outcomes
                .into_iter()
                .map(|o| SourceSummary {
                    source_id: o.source_id,
                    records: o.records.len(),
                    error: o.error,
                    elapsed_ms: o.elapsed_ms,
                })
                .collect(),
            total_records: snapshot.records.len(),
            output_path: output_path.to_path_buf(),
            generated_at: snapshot.generated_at,
        })
    }
}

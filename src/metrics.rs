//! Run metrics.
//!
//! Counters and histograms go through the `metrics` facade into a Prometheus recorder
//! installed by [`init_metrics`]. When a Pushgateway is configured the recorded values,
//! plus a per-source summary of the run, are pushed after the snapshot is written.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use tracing::{info, warn};

use crate::pipeline::RunReport;

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the global Prometheus recorder. Idempotent; a failure is logged and
/// leaves the `metrics` macros as no-ops.
pub fn init_metrics() {
    if HANDLE.get().is_some() {
        return;
    }
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            if HANDLE.set(handle).is_err() {
                warn!("Prometheus recorder handle was already stored");
            }
            info!("Prometheus recorder installed");
        }
        Err(e) => warn!("Failed to install Prometheus recorder: {}", e),
    }
}

/// Text exposition of everything recorded so far, if a recorder is installed.
pub fn render_recorded() -> Option<String> {
    HANDLE.get().map(PrometheusHandle::render)
}

pub fn record_fetch_success(source_id: &'static str, duration_secs: f64, records: usize) {
    counter!("arz_source_fetch_success_total", "source" => source_id).increment(1);
    counter!("arz_source_records_total", "source" => source_id).increment(records as u64);
    histogram!("arz_source_fetch_duration_seconds", "source" => source_id).record(duration_secs);
}

pub fn record_fetch_error(source_id: &'static str, duration_secs: f64) {
    counter!("arz_source_fetch_error_total", "source" => source_id).increment(1);
    histogram!("arz_source_fetch_duration_seconds", "source" => source_id).record(duration_secs);
}

pub fn record_snapshot(records: usize) {
    gauge!("arz_snapshot_records").set(records as f64);
}

/// Prometheus text exposition of a finished run.
///
/// Only series the recorder does not already hold; both are pushed in one body.
pub fn render_summary(report: &RunReport, timestamp_secs: i64) -> String {
    let mut body = String::new();
    body.push_str("# TYPE arz_source_records gauge\n");
    for source in &report.sources {
        body.push_str(&format!(
            "arz_source_records{{source=\"{}\"}} {}\n",
            source.source_id, source.records
        ));
    }
    body.push_str("# TYPE arz_source_up gauge\n");
    for source in &report.sources {
        body.push_str(&format!(
            "arz_source_up{{source=\"{}\"}} {}\n",
            source.source_id,
            u8::from(source.error.is_none())
        ));
    }
    body.push_str("# TYPE arz_last_run_timestamp_seconds gauge\n");
    body.push_str(&format!("arz_last_run_timestamp_seconds {}\n", timestamp_secs));
    body
}

/// Push the run summary. Failures are logged and never abort the run.
pub async fn push_summary(base_url: &str, report: &RunReport) {
    let push_url = format!("{}/metrics/job/arz_scraper", base_url.trim_end_matches('/'));
    let mut body = render_recorded().unwrap_or_default();
    if !body.is_empty() && !body.ends_with('\n') {
        body.push('\n');
    }
    body.push_str(&render_summary(report, chrono::Utc::now().timestamp()));

    let push_res = reqwest::Client::new()
        .post(&push_url)
        .header("Content-Type", "text/plain; version=0.0.4")
        .body(body)
        .send()
        .await;

    match push_res {
        Ok(r) if r.status().is_success() => info!("Pushed run metrics to Pushgateway"),
        Ok(r) => warn!("Pushgateway responded with status {}", r.status().as_u16()),
        Err(e) => warn!("Failed to push metrics to Pushgateway: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::SourceSummary;
    use std::path::PathBuf;

    #[test]
    fn test_render_summary() {
        let report = RunReport {
            sources: vec![
                SourceSummary {
                    source_id: "currency",
                    records: 40,
                    error: None,
                    elapsed_ms: 120,
                },
                SourceSummary {
                    source_id: "crypto",
                    records: 0,
                    error: Some("HTTP 503 from https://alanchand.com/crypto-price".into()),
                    elapsed_ms: 80,
                },
            ],
            total_records: 40,
            output_path: PathBuf::from("arz.json"),
            generated_at: "1405/07/26, 08:37".into(),
        };

        let body = render_summary(&report, 1_700_000_000);
        assert!(!body.contains("arz_snapshot_records"));
        assert!(body.contains("arz_source_records{source=\"currency\"} 40\n"));
        assert!(body.contains("arz_source_up{source=\"currency\"} 1\n"));
        assert!(body.contains("arz_source_up{source=\"crypto\"} 0\n"));
        assert!(body.ends_with("arz_last_run_timestamp_seconds 1700000000\n"));
    }

    #[test]
    fn test_recorded_values_reach_the_recorder() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            record_fetch_success("gold", 0.2, 9);
            record_fetch_success("gold", 0.3, 4);
            record_fetch_error("crypto", 1.5);
            record_snapshot(13);
        });

        let rendered = handle.render();
        assert!(rendered.contains("arz_source_fetch_success_total{source=\"gold\"} 2"));
        assert!(rendered.contains("arz_source_records_total{source=\"gold\"} 13"));
        assert!(rendered.contains("arz_source_fetch_error_total{source=\"crypto\"} 1"));
        assert!(rendered.contains("arz_snapshot_records 13"));
        assert!(rendered.contains("arz_source_fetch_duration_seconds"));
    }

    #[test]
    fn test_init_metrics_installs_recorder_once() {
        init_metrics();
        init_metrics();
        let handle = HANDLE.get().expect("recorder handle stored");

        metrics::counter!("arz_init_check_total").increment(1);
        // the global recorder is now taken
        assert!(metrics::set_global_recorder(metrics::NoopRecorder).is_err());
        assert!(handle.render().contains("arz_init_check_total 1"));
        assert!(render_recorded().is_some());
    }
}

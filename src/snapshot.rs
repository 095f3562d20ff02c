//! Snapshot assembly and persistence.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

use crate::constants::SOURCE_ORDER;
use crate::error::Result;
use crate::pipeline::SourceOutcome;
use crate::types::{PriceRecord, Snapshot};

fn source_rank(source_id: &str) -> usize {
    SOURCE_ORDER
        .iter()
        .position(|s| *s == source_id)
        .unwrap_or(SOURCE_ORDER.len())
}

/// Merge per-source records in fixed source order (currency, gold, crypto).
/// Failed sources contribute nothing.
pub fn assemble(generated_at: String, outcomes: &[SourceOutcome]) -> Snapshot {
    let mut ordered: Vec<&SourceOutcome> = outcomes.iter().collect();
    ordered.sort_by_key(|o| source_rank(o.source_id));

    let records: Vec<PriceRecord> = ordered
        .into_iter()
        .flat_map(|o| o.records.iter().cloned())
        .collect();

    Snapshot {
        generated_at,
        records,
    }
}

/// Pretty-printed JSON of the snapshot.
pub fn to_json(snapshot: &Snapshot) -> Result<String> {
    Ok(serde_json::to_string_pretty(snapshot)?)
}

fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "snapshot".to_string());
    path.with_file_name(format!(".{}.tmp", name))
}

/// Write the snapshot to `path`, replacing any previous one.
///
/// The document is fully serialized and written to a sibling temp file before it
/// is renamed over `path`; on failure the previous snapshot is left untouched.
pub fn write_snapshot(path: &Path, snapshot: &Snapshot) -> Result<()> {
    let json = to_json(snapshot)?;
    let tmp = temp_path_for(path);

    if let Err(e) = fs::write(&tmp, json.as_bytes()).and_then(|_| fs::rename(&tmp, path)) {
        error!("Failed to write snapshot to {}: {}", path.display(), e);
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }

    debug!(
        "Wrote {} records ({} bytes) to {}",
        snapshot.records.len(),
        json.len(),
        path.display()
    );
    Ok(())
}

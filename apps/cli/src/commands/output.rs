//! Writing results to disk.

use anyhow::Context;
use serde::Serialize;
use std::path::{Path, PathBuf};
use visulearn_abstraction::Asset;
use visulearn_core::BatchResult;

/// Name of the JSON report inside the output directory.
pub const RESULT_FILE: &str = "result.json";

/// Writes `result.json` and one file per generated asset.
///
/// An asset that cannot be decoded or written is logged and skipped; the
/// report and the other assets are still written. Returns the paths written,
/// report first.
pub fn write_result<T: Serialize>(dir: &Path, output: &T, batch: &BatchResult) -> anyhow::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;

    let report = dir.join(RESULT_FILE);
    let json = serde_json::to_string_pretty(output).context("Failed to serialize result")?;
    std::fs::write(&report, json).with_context(|| format!("Failed to write {}", report.display()))?;

    let mut written = vec![report];
    for unit in &batch.units {
        for asset in [&unit.image_result, &unit.audio_result].into_iter().flatten() {
            match write_asset(dir, unit.id, asset) {
                Ok(path) => written.push(path),
                Err(e) => {
                    let error = format!("{:#}", e);
                    tracing::warn!(unit_id = unit.id, error = %error, "Skipping asset that could not be saved");
                }
            }
        }
    }
    Ok(written)
}

fn write_asset(dir: &Path, unit_id: u32, asset: &Asset) -> anyhow::Result<PathBuf> {
    let path = dir.join(format!("unit-{}.{}", unit_id, asset.file_extension()));
    let bytes = asset.to_bytes().with_context(|| format!("Failed to decode asset for unit {}", unit_id))?;
    std::fs::write(&path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

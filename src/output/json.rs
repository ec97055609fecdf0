//! JSON output formatting
//!
//! Serializes the per-rank records and the global reduction to a single JSON
//! document. The console report stays authoritative; this exists for scripts
//! that want the numbers without scraping stdout.

use crate::aggregate::GlobalResult;
use crate::scanner::{PrimeGap, SubrangeResult};
use crate::Result;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// Gap with its size spelled out
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct JsonGap {
    pub start: u64,
    pub end: u64,
    pub size: u64,
}

impl From<PrimeGap> for JsonGap {
    fn from(gap: PrimeGap) -> Self {
        Self {
            start: gap.start,
            end: gap.end,
            size: gap.size(),
        }
    }
}

/// Complete run report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonReport {
    pub version: String,
    pub workers: Vec<SubrangeResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub largest_internal: Option<JsonGap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub largest_edge: Option<JsonGap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<JsonGap>,
}

impl JsonReport {
    pub fn new(results: &[SubrangeResult], global: &GlobalResult) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            workers: results.to_vec(),
            largest_internal: global.largest_internal.map(JsonGap::from),
            largest_edge: global.largest_edge.map(JsonGap::from),
            winner: global.winner().map(JsonGap::from),
        }
    }
}

/// Write the run report as pretty-printed JSON.
pub fn write_json(path: &Path, results: &[SubrangeResult], global: &GlobalResult) -> Result<()> {
    let report = JsonReport::new(results, global);
    let file = File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(file, &report).context("Failed to serialize JSON report")?;
    Ok(())
}

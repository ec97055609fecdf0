//! Result reporting
//!
//! Console lines mirror the per-rank and final summaries the computation has
//! always printed; JSON output is opt-in via `--output-json`.

pub mod json;

pub use json::write_json;

use crate::aggregate::GlobalResult;
use crate::scanner::{PrimeGap, SubrangeResult};

fn format_gap(gap: Option<PrimeGap>) -> String {
    match gap {
        Some(gap) => gap.to_string(),
        None => "none".to_string(),
    }
}

/// One line per received worker result.
pub fn print_subrange_result(result: &SubrangeResult, node_id: &str) {
    println!(
        "Rank: {} ({}) || Range: {} - {} || Prime gap: {}",
        result.rank,
        node_id,
        result.range_start,
        result.range_end,
        format_gap(result.largest_gap)
    );
}

/// Final three-line summary: internal maximum, edge maximum, overall winner.
pub fn print_global_result(global: &GlobalResult) {
    println!("Largest internal gap: {}", format_gap(global.largest_internal));
    println!("Largest edge gap: {}", format_gap(global.largest_edge));
    println!("Largest gap: {}", format_gap(global.winner()));
}

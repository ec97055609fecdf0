//! Result aggregation
//!
//! The coordinator receives one `SubrangeResult` per worker and reduces them
//! to a single winning gap. Worker-local maxima alone are not enough: a gap
//! whose endpoints lie in two different workers' subranges is invisible to
//! both, so the reduction also pairs each subrange's last prime with the next
//! subrange's first prime ("edge gaps") and takes the overall maximum.
//!
//! Results are keyed by rank, not arrival order; the caller sorts by rank
//! before aggregating. A missing or duplicate rank fails the reduction
//! outright - a lost worker must never be coerced into "no gap".

use crate::scanner::{PrimeGap, SubrangeResult};
use anyhow::Result;

/// Outcome of the global reduction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalResult {
    /// Largest gap fully contained in a single subrange
    pub largest_internal: Option<PrimeGap>,
    /// Largest gap between adjacent subranges' edge primes
    pub largest_edge: Option<PrimeGap>,
}

impl GlobalResult {
    /// The overall winning gap.
    ///
    /// When internal and edge maxima are equal in size the internal one wins;
    /// the choice is a don't-care, fixed here so the output is well defined.
    pub fn winner(&self) -> Option<PrimeGap> {
        match (self.largest_internal, self.largest_edge) {
            (Some(internal), Some(edge)) => {
                if internal.size() >= edge.size() {
                    Some(internal)
                } else {
                    Some(edge)
                }
            }
            (Some(internal), None) => Some(internal),
            (None, Some(edge)) => Some(edge),
            (None, None) => None,
        }
    }
}

/// Reduce per-worker results to the global maximum gap.
///
/// `results` must be sorted by rank, hold exactly ranks `1..=n`, and tile a
/// contiguous range: each record's `range_start` must equal its predecessor's
/// `range_end`. Every record is validated before it contributes to the
/// reduction; a per-record-valid set whose ranges overlap or run backwards
/// would otherwise yield an inverted edge pair and a wrapped gap size.
///
/// Edge gaps are computed by carrying the most recent `last_prime` forward
/// across subranges: a subrange that holds no prime at all does not break the
/// chain, it just widens the candidate gap between its neighbours.
pub fn aggregate(results: &[SubrangeResult]) -> Result<GlobalResult> {
    if results.is_empty() {
        anyhow::bail!("no worker results to aggregate");
    }
    let mut prev_end: Option<u64> = None;
    for (i, result) in results.iter().enumerate() {
        let expected_rank = i + 1;
        if result.rank != expected_rank {
            anyhow::bail!(
                "results out of order: expected rank {}, found rank {}",
                expected_rank,
                result.rank
            );
        }
        result.validate()?;
        if let Some(prev_end) = prev_end {
            if result.range_start != prev_end {
                anyhow::bail!(
                    "rank {}: range starts at {} but rank {} ended at {}",
                    result.rank,
                    result.range_start,
                    result.rank - 1,
                    prev_end
                );
            }
        }
        prev_end = Some(result.range_end);
    }

    let mut largest_internal: Option<PrimeGap> = None;
    let mut largest_edge: Option<PrimeGap> = None;
    let mut carried_last: Option<u64> = None;

    for result in results {
        if let Some(gap) = result.largest_gap {
            if largest_internal.map_or(true, |best| gap.size() > best.size()) {
                largest_internal = Some(gap);
            }
        }

        if let (Some(prev_last), Some(first)) = (carried_last, result.first_prime) {
            let edge = PrimeGap::new(prev_last, first);
            if largest_edge.map_or(true, |best| edge.size() > best.size()) {
                largest_edge = Some(edge);
            }
        }
        if result.last_prime.is_some() {
            carried_last = result.last_prime;
        }
    }

    Ok(GlobalResult {
        largest_internal,
        largest_edge,
    })
}

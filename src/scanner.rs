//! Range scanner
//!
//! Each worker owns one equal-width subrange of `[0, ceiling)` and walks the
//! primes inside it with repeated next-prime queries, tracking:
//!
//! - the largest *internal* gap (both endpoints inside the subrange)
//! - the subrange's *edge primes* (first and last prime), which the
//!   aggregator needs to detect gaps that straddle partition boundaries
//!
//! The scan is a pure function of `(rank, num_workers, ceiling)` and the
//! primality oracle. Workers share nothing and never interfere.

use crate::primality::{next_prime, PrimalityOracle};
use crate::progress::ProgressSink;
use serde::{Deserialize, Serialize};

/// Default search ceiling (10^12)
pub const DEFAULT_CEILING: u64 = 1_000_000_000_000;

/// Default number of integers between progress updates
pub const DEFAULT_REPORT_INTERVAL: u64 = 10_000_000;

/// A gap between two consecutive primes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimeGap {
    pub start: u64,
    pub end: u64,
}

impl PrimeGap {
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Gap size, always `end - start`.
    pub fn size(&self) -> u64 {
        self.end - self.start
    }
}

impl std::fmt::Display for PrimeGap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {} || Gap: {}", self.start, self.end, self.size())
    }
}

/// Result of scanning one worker's subrange
///
/// Produced by exactly one worker, transmitted once, and read-only input to
/// the aggregation afterwards. A subrange with fewer than two primes carries
/// `largest_gap: None`; the aggregator must skip it, never treat it as zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubrangeResult {
    /// 1-based worker rank; rank 0 is the coordinator and scans nothing
    pub rank: usize,
    /// Inclusive start of the assigned subrange
    pub range_start: u64,
    /// Exclusive end of the assigned subrange
    pub range_end: u64,
    /// First prime at or above `range_start` (edge prime), if any
    pub first_prime: Option<u64>,
    /// Last prime strictly below `range_end` (edge prime), if any
    pub last_prime: Option<u64>,
    /// Largest gap with both endpoints inside the subrange, if any
    pub largest_gap: Option<PrimeGap>,
}

impl SubrangeResult {
    /// Empty result for a subrange in which no prime was found.
    fn empty(rank: usize, range_start: u64, range_end: u64) -> Self {
        Self {
            rank,
            range_start,
            range_end,
            first_prime: None,
            last_prime: None,
            largest_gap: None,
        }
    }

    /// Check internal consistency of a (possibly remote) result record.
    ///
    /// The coordinator runs this on every received record; a malformed record
    /// must fail aggregation rather than silently corrupt the global maximum.
    pub fn validate(&self) -> crate::Result<()> {
        if self.rank == 0 {
            anyhow::bail!("result carries rank 0, which is reserved for the coordinator");
        }
        if self.range_start > self.range_end {
            anyhow::bail!(
                "rank {}: inverted range {} - {}",
                self.rank,
                self.range_start,
                self.range_end
            );
        }
        if self.first_prime.is_some() != self.last_prime.is_some() {
            anyhow::bail!("rank {}: only one edge prime set", self.rank);
        }
        if let (Some(first), Some(last)) = (self.first_prime, self.last_prime) {
            if first > last || first < self.range_start || last >= self.range_end {
                anyhow::bail!(
                    "rank {}: edge primes {} / {} outside range {} - {}",
                    self.rank,
                    first,
                    last,
                    self.range_start,
                    self.range_end
                );
            }
        }
        if let Some(gap) = self.largest_gap {
            let (first, last) = match (self.first_prime, self.last_prime) {
                (Some(f), Some(l)) => (f, l),
                _ => anyhow::bail!("rank {}: gap reported without edge primes", self.rank),
            };
            if gap.start >= gap.end {
                anyhow::bail!("rank {}: degenerate gap {} - {}", self.rank, gap.start, gap.end);
            }
            if gap.start < first || gap.end > last {
                anyhow::bail!(
                    "rank {}: gap {} - {} outside observed primes {} - {}",
                    self.rank,
                    gap.start,
                    gap.end,
                    first,
                    last
                );
            }
        }
        Ok(())
    }
}

/// Compute the subrange owned by `rank` (1-indexed, `1..=num_workers`).
///
/// The ceiling is divided into `num_workers` equal-width subranges; the last
/// worker absorbs the division remainder so the union of all subranges tiles
/// `[0, ceiling)` exactly.
pub fn subrange(rank: usize, num_workers: usize, ceiling: u64) -> (u64, u64) {
    debug_assert!(rank >= 1 && rank <= num_workers);
    let width = ceiling / num_workers as u64;
    let start = (rank as u64 - 1) * width;
    let end = if rank == num_workers {
        ceiling
    } else {
        rank as u64 * width
    };
    (start, end)
}

/// Scan one worker's subrange for its largest internal prime gap.
///
/// Walks consecutive primes from the first prime at or above the subrange
/// start until the next prime would fall at or beyond the subrange end. A gap
/// must *strictly* exceed the best-so-far to replace it, so the earliest
/// occurrence wins among equals. Every `report_interval` integers of forward
/// movement one status line goes to the progress sink.
pub fn scan(
    rank: usize,
    num_workers: usize,
    ceiling: u64,
    oracle: &dyn PrimalityOracle,
    progress: &dyn ProgressSink,
    report_interval: u64,
) -> SubrangeResult {
    let (range_start, range_end) = subrange(rank, num_workers, ceiling);
    if range_start >= range_end {
        return SubrangeResult::empty(rank, range_start, range_end);
    }

    // First prime at or above range_start. The oracle rejects 0 and 1, so a
    // subrange starting at 0 begins at 2.
    let first = if range_start >= 2 && oracle.is_prime(range_start) {
        range_start
    } else {
        next_prime(oracle, range_start)
    };
    if first >= range_end {
        return SubrangeResult::empty(rank, range_start, range_end);
    }

    let mut result = SubrangeResult {
        rank,
        range_start,
        range_end,
        first_prime: Some(first),
        last_prime: Some(first),
        largest_gap: None,
    };

    let mut prev = first;
    let mut last_report = first;
    loop {
        let next = next_prime(oracle, prev);
        if next >= range_end {
            break;
        }
        result.last_prime = Some(next);

        let gap = next - prev;
        if result.largest_gap.map_or(true, |best| gap > best.size()) {
            result.largest_gap = Some(PrimeGap::new(prev, next));
        }

        if next - last_report >= report_interval {
            last_report = next;
            progress.report(rank, next, result.largest_gap);
        }
        prev = next;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primality::TrialDivision;
    use crate::progress::NullProgress;

    fn scan_range(rank: usize, workers: usize, ceiling: u64) -> SubrangeResult {
        scan(
            rank,
            workers,
            ceiling,
            &TrialDivision,
            &NullProgress,
            DEFAULT_REPORT_INTERVAL,
        )
    }

    #[test]
    fn test_partition_covers_range_exactly() {
        for workers in [1usize, 2, 3, 7, 16] {
            for ceiling in [30u64, 100, 101, 997] {
                let mut expected_start = 0u64;
                for rank in 1..=workers {
                    let (start, end) = subrange(rank, workers, ceiling);
                    assert_eq!(start, expected_start, "workers={} ceiling={}", workers, ceiling);
                    assert!(end >= start);
                    expected_start = end;
                }
                assert_eq!(expected_start, ceiling, "workers={} ceiling={}", workers, ceiling);
            }
        }
    }

    #[test]
    fn test_last_worker_absorbs_remainder() {
        // 100 / 3 = 33, so rank 3 owns [66, 100)
        assert_eq!(subrange(1, 3, 100), (0, 33));
        assert_eq!(subrange(2, 3, 100), (33, 66));
        assert_eq!(subrange(3, 3, 100), (66, 100));
    }

    #[test]
    fn test_scan_known_sequence() {
        // Primes below 30: 2 3 5 7 11 13 17 19 23 29; largest gap is 23 -> 29
        let result = scan_range(1, 1, 30);
        assert_eq!(result.range_start, 0);
        assert_eq!(result.range_end, 30);
        assert_eq!(result.first_prime, Some(2));
        assert_eq!(result.last_prime, Some(29));
        assert_eq!(result.largest_gap, Some(PrimeGap::new(23, 29)));
        assert_eq!(result.largest_gap.unwrap().size(), 6);
        result.validate().unwrap();
    }

    #[test]
    fn test_scan_is_deterministic() {
        let a = scan_range(2, 4, 1000);
        let b = scan_range(2, 4, 1000);
        assert_eq!(a, b);
    }

    #[test]
    fn test_scan_range_start_prime_is_included() {
        // Rank 2 of [0, 14) in 2 workers owns [7, 14); 7 itself is prime
        let result = scan_range(2, 2, 14);
        assert_eq!(result.range_start, 7);
        assert_eq!(result.first_prime, Some(7));
        assert_eq!(result.last_prime, Some(13));
        assert_eq!(result.largest_gap, Some(PrimeGap::new(7, 11)));
    }

    #[test]
    fn test_scan_single_prime_has_no_gap() {
        // Rank 6 of 6 over [0, 30) owns [25, 30), which holds only 29
        let result = scan_range(6, 6, 30);
        assert_eq!((result.range_start, result.range_end), (25, 30));
        assert_eq!(result.first_prime, Some(29));
        assert_eq!(result.last_prime, Some(29));
        assert_eq!(result.largest_gap, None);
        result.validate().unwrap();
    }

    #[test]
    fn test_scan_empty_subrange() {
        // Rank 16 of 16 over [0, 96) owns [90, 96), which holds no prime
        let result = scan_range(16, 16, 96);
        assert_eq!((result.range_start, result.range_end), (90, 96));
        assert_eq!(result.first_prime, None);
        assert_eq!(result.last_prime, None);
        assert_eq!(result.largest_gap, None);
        result.validate().unwrap();
    }

    #[test]
    fn test_scan_tie_keeps_first_gap() {
        // Primes in [0, 8): 2 3 5 7 with gaps 1, 2, 2; the equal-size pair
        // must resolve to the earlier occurrence (3, 5)
        let result = scan(1, 1, 8, &TrialDivision, &NullProgress, 1_000_000);
        assert_eq!(result.largest_gap, Some(PrimeGap::new(3, 5)));
    }

    #[test]
    fn test_validate_rejects_out_of_range_gap() {
        let mut result = scan_range(1, 1, 30);
        result.largest_gap = Some(PrimeGap::new(29, 37));
        assert!(result.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_lone_edge_prime() {
        let mut result = scan_range(1, 1, 30);
        result.last_prime = None;
        assert!(result.validate().is_err());
    }
}

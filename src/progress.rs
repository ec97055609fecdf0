//! Progress reporting
//!
//! Scans over wide subranges run for a long time, so workers emit periodic
//! status lines. Reporting is strictly best-effort: the sink contract is
//! infallible and a sink must never abort a scan.

use crate::scanner::PrimeGap;

/// Best-effort progress sink
///
/// `report` is called periodically during a scan with the current position
/// and the running best gap. Implementations must not panic and must not
/// block the scan for long.
pub trait ProgressSink: Send + Sync {
    fn report(&self, rank: usize, position: u64, best: Option<PrimeGap>);
}

/// Console progress sink
///
/// One status line per report, in the same shape as the per-rank result
/// lines printed by the coordinator.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleProgress;

impl ProgressSink for ConsoleProgress {
    fn report(&self, rank: usize, position: u64, best: Option<PrimeGap>) {
        match best {
            Some(gap) => println!(
                "Rank: {} || Current prime: {} || Largest gap: {} - {} || Gap: {}",
                rank,
                position,
                gap.start,
                gap.end,
                gap.size()
            ),
            None => println!("Rank: {} || Current prime: {} || No gap yet", rank, position),
        }
    }
}

/// Silent sink for tests and benchmarks
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn report(&self, _rank: usize, _position: u64, _best: Option<PrimeGap>) {}
}

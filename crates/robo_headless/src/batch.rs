//! Compute ceiling sweeps.
//!
//! Runs the same scenario under several per-round compute ceilings in
//! parallel using rayon. Each match builds its own world on the worker
//! thread, so nothing single-threaded crosses a thread boundary.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::driver::HostDriver;
use crate::metrics::{BatchSummary, MatchMetrics};
use crate::scenario::Scenario;

/// Results from a sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Scenario name.
    pub scenario: String,
    /// One entry per ceiling, in the order requested.
    pub matches: Vec<MatchMetrics>,
    /// Aggregate summary.
    pub summary: BatchSummary,
}

impl BatchResults {
    /// Save results to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}

/// Evenly spaced ceilings: `start`, `start + step`, ... (`count` values).
#[must_use]
pub fn ceiling_steps(start: u32, step: u32, count: u32) -> Vec<u32> {
    (0..count)
        .map(|i| start.saturating_add(step.saturating_mul(i)))
        .collect()
}

/// Run `scenario` once per ceiling.
pub fn run_sweep(scenario: &Scenario, ceilings: &[u32]) -> BatchResults {
    info!(scenario = %scenario.name, runs = ceilings.len(), "starting ceiling sweep");
    let matches: Vec<MatchMetrics> = ceilings
        .par_iter()
        .map(|&ceiling| {
            let run = Scenario {
                compute_ceiling: ceiling,
                ..scenario.clone()
            };
            let metrics = HostDriver::new(&run).run();
            debug!(
                ceiling,
                terminations = metrics.terminations.len(),
                faults = metrics.total_faults(),
                "sweep run finished"
            );
            metrics
        })
        .collect();
    let summary = BatchSummary::from_matches(&matches);
    BatchResults {
        scenario: scenario.name.clone(),
        matches,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ceiling_steps() {
        assert_eq!(ceiling_steps(100, 50, 3), vec![100, 150, 200]);
        assert!(ceiling_steps(100, 50, 0).is_empty());
    }

    #[test]
    fn test_sweep_preserves_order() {
        let scenario = Scenario {
            rounds: 5,
            ..Scenario::skirmish()
        };
        let results = run_sweep(&scenario, &[500, 1_000, 2_000]);
        let ceilings: Vec<_> = results.matches.iter().map(|m| m.compute_ceiling).collect();
        assert_eq!(ceilings, vec![500, 1_000, 2_000]);
        assert_eq!(results.summary.matches, 3);
        assert_eq!(results.summary.yield_violations, 0);
    }
}

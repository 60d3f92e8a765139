use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Work done by one adjacency tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierStats {
    pub pass: &'static str,
    pub depth: usize,
    /// Edges examined in this tier.
    pub edges_tested: usize,
    pub removed: usize,
}

/// Counters shared by the search phases. Safe to bump from rayon workers.
#[derive(Debug)]
pub struct SearchTelemetry {
    started: Instant,
    independence_tests: AtomicU64,
    local_failures: AtomicU64,
    collider_conflicts: AtomicU64,
    closure_orientations: AtomicU64,
    tiers: Mutex<Vec<TierStats>>,
}

impl Default for SearchTelemetry {
    fn default() -> Self {
        Self {
            started: Instant::now(),
            independence_tests: AtomicU64::new(0),
            local_failures: AtomicU64::new(0),
            collider_conflicts: AtomicU64::new(0),
            closure_orientations: AtomicU64::new(0),
            tiers: Mutex::new(Vec::new()),
        }
    }
}

impl SearchTelemetry {
    pub fn new() -> Self { Self::default() }

    #[inline]
    pub fn record_test(&self) {
        self.independence_tests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_local_failure(&self) {
        self.local_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_collider_conflict(&self) {
        self.collider_conflicts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_closure_orientations(&self, count: usize) {
        self.closure_orientations.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_tier(&self, stats: TierStats) {
        self.tiers.lock().unwrap_or_else(|e| e.into_inner()).push(stats);
    }

    pub fn independence_tests(&self) -> u64 {
        self.independence_tests.load(Ordering::Relaxed)
    }

    pub fn report(&self) -> TelemetryReport {
        TelemetryReport {
            independence_tests: self.independence_tests(),
            local_failures: self.local_failures.load(Ordering::Relaxed),
            collider_conflicts: self.collider_conflicts.load(Ordering::Relaxed),
            closure_orientations: self.closure_orientations.load(Ordering::Relaxed),
            tiers: self.tiers.lock().unwrap_or_else(|e| e.into_inner()).clone(),
            elapsed: self.started.elapsed(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TelemetryReport {
    pub independence_tests: u64,
    pub local_failures: u64,
    /// Collider verdicts left unapplied because an edge already pointed the other way.
    pub collider_conflicts: u64,
    pub closure_orientations: u64,
    pub tiers: Vec<TierStats>,
    pub elapsed: Duration,
}

impl TelemetryReport {
    pub fn edges_removed(&self) -> usize {
        self.tiers.iter().map(|t| t.removed).sum()
    }

    /// Deepest tier that ran, if any did.
    pub fn max_depth_reached(&self) -> Option<usize> {
        self.tiers.iter().map(|t| t.depth).max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;

    #[test]
    fn test_counters_survive_parallel_updates() {
        let t = SearchTelemetry::new();
        (0..1000).into_par_iter().for_each(|_| t.record_test());
        assert_eq!(t.independence_tests(), 1000);
    }

    #[test]
    fn test_report_aggregates_tiers() {
        let t = SearchTelemetry::new();
        t.record_tier(TierStats { pass: "stable", depth: 0, edges_tested: 6, removed: 2 });
        t.record_tier(TierStats { pass: "stable", depth: 1, edges_tested: 4, removed: 1 });
        let r = t.report();
        assert_eq!(r.edges_removed(), 3);
        assert_eq!(r.max_depth_reached(), Some(1));
        assert_eq!(r.local_failures, 0);
    }
}

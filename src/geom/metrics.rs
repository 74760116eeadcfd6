//! Opt-in timing hooks for the partitioner.
//!
//! Timing is only collected when the `split_metrics` feature is enabled and the
//! target is not WASM (`std::time::Instant` is unavailable there). Otherwise
//! every call compiles down to running the closure.
//!
//! ```ignore
//! let mut metrics = SplitMetrics::default();
//! metrics.begin();
//! let parts = metrics.time(TimingBucket::Traversal, || walk(&edges));
//! if let Some(report) = metrics.end() {
//!     println!("traversal: {} ns", report.traversal_ns);
//! }
//! ```

use serde::Serialize;

/// Phases of a split call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimingBucket {
    /// Index expansion into a triangle soup.
    Expansion,
    /// Attribute storage and length checks.
    Validation,
    /// Building the directed-edge map.
    Adjacency,
    /// Flood fill over triangles.
    Traversal,
    /// Copying attributes into per-part buffers.
    Materialization,
    /// Triangle-normal overlay generation.
    Normals,
}

/// Cumulative nanoseconds per bucket.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitTimingReport {
    pub expansion_ns: u64,
    pub validation_ns: u64,
    pub adjacency_ns: u64,
    pub traversal_ns: u64,
    pub materialization_ns: u64,
    pub normals_ns: u64,
}

impl SplitTimingReport {
    #[must_use]
    pub fn total_ns(&self) -> u64 {
        self.expansion_ns
            .saturating_add(self.validation_ns)
            .saturating_add(self.adjacency_ns)
            .saturating_add(self.traversal_ns)
            .saturating_add(self.materialization_ns)
            .saturating_add(self.normals_ns)
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn total_ms(&self) -> f64 {
        self.total_ns() as f64 / 1_000_000.0
    }
}

/// Accumulator for phase timings. All methods are no-ops when metrics are disabled.
#[derive(Debug, Default)]
pub struct SplitMetrics {
    #[cfg(all(feature = "split_metrics", not(target_arch = "wasm32")))]
    report: SplitTimingReport,
}

impl SplitMetrics {
    /// Resets all counters.
    pub fn begin(&mut self) {
        #[cfg(all(feature = "split_metrics", not(target_arch = "wasm32")))]
        {
            self.report = SplitTimingReport::default();
        }
    }

    /// Returns the accumulated report, or `None` when metrics are disabled.
    #[must_use]
    pub fn end(&self) -> Option<SplitTimingReport> {
        #[cfg(all(feature = "split_metrics", not(target_arch = "wasm32")))]
        {
            Some(self.report.clone())
        }
        #[cfg(not(all(feature = "split_metrics", not(target_arch = "wasm32"))))]
        {
            None
        }
    }

    /// Runs `f`, adding its wall time to `bucket`.
    pub fn time<R>(&mut self, bucket: TimingBucket, f: impl FnOnce() -> R) -> R {
        #[cfg(all(feature = "split_metrics", not(target_arch = "wasm32")))]
        {
            let start = std::time::Instant::now();
            let result = f();
            let nanos = u64::try_from(start.elapsed().as_nanos()).unwrap_or(u64::MAX);
            self.add_to_bucket(bucket, nanos);
            result
        }

        #[cfg(not(all(feature = "split_metrics", not(target_arch = "wasm32"))))]
        {
            let _ = bucket;
            f()
        }
    }

    #[cfg(all(feature = "split_metrics", not(target_arch = "wasm32")))]
    fn add_to_bucket(&mut self, bucket: TimingBucket, nanos: u64) {
        let slot = match bucket {
            TimingBucket::Expansion => &mut self.report.expansion_ns,
            TimingBucket::Validation => &mut self.report.validation_ns,
            TimingBucket::Adjacency => &mut self.report.adjacency_ns,
            TimingBucket::Traversal => &mut self.report.traversal_ns,
            TimingBucket::Materialization => &mut self.report.materialization_ns,
            TimingBucket::Normals => &mut self.report.normals_ns,
        };
        *slot = slot.saturating_add(nanos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timing_report_total() {
        let report = SplitTimingReport {
            adjacency_ns: 1000,
            traversal_ns: 2000,
            materialization_ns: 3000,
            ..SplitTimingReport::default()
        };
        assert_eq!(report.total_ns(), 6000);
        assert!((report.total_ms() - 0.006).abs() < 1e-9);
    }

    #[test]
    fn time_returns_closure_result() {
        let mut metrics = SplitMetrics::default();
        metrics.begin();
        assert_eq!(metrics.time(TimingBucket::Traversal, || 42), 42);
        let report = metrics.end();
        if cfg!(all(feature = "split_metrics", not(target_arch = "wasm32"))) {
            assert!(report.is_some());
        } else {
            assert!(report.is_none());
        }
    }

    #[test]
    fn saturating_total_does_not_overflow() {
        let report = SplitTimingReport {
            expansion_ns: u64::MAX,
            normals_ns: 5,
            ..SplitTimingReport::default()
        };
        assert_eq!(report.total_ns(), u64::MAX);
    }
}

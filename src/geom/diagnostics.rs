//! Diagnostics for mesh partitioning.
//!
//! Returned next to the parts by
//! [`split_disjoint_geometry_with_context`](super::split_disjoint_geometry_with_context).
//! The partitioner never repairs its input; these counts describe what the
//! geometry implies so callers can decide whether the result is trustworthy.
//!
//! ```ignore
//! let (parts, diag) = split_disjoint_geometry_with_context(&mesh, &mut ctx)?;
//! if !diag.is_manifold() {
//!     eprintln!("{} non-manifold edges resolved by angle", diag.non_manifold_edge_count);
//! }
//! ```

use std::fmt::Write as _;

use serde::Serialize;

use super::metrics::SplitTimingReport;
use super::split::TraversalOrder;

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitDiagnostics {
    /// Triangles in the (expanded) input.
    pub triangle_count: usize,

    /// Number of parts returned.
    pub part_count: usize,

    /// Triangle count of the biggest part.
    pub largest_part_triangle_count: usize,

    /// Distinct directed edge keys.
    pub directed_edge_count: usize,

    /// Directed edges whose reverse edge no triangle provides.
    ///
    /// Zero for closed, consistently wound bodies. Boundary edges are never an
    /// error; traversal simply stops there.
    pub open_edge_count: usize,

    /// Directed edges provided by more than one triangle.
    ///
    /// These are the junctions where the angle comparator picks the neighbor,
    /// e.g. two cubes touching along an edge.
    pub non_manifold_edge_count: usize,

    /// Triangles with a zero-length face normal (collinear or repeated corners).
    pub degenerate_triangle_count: usize,

    /// Edge lookups that had several candidates and went through the comparator.
    pub ambiguous_edge_visits: usize,

    /// Candidates folded back against the current face and demoted to `-PI`.
    pub folded_back_candidates: usize,

    /// Traversal discipline used for the work list.
    pub traversal: TraversalOrder,

    /// Phase timings, when the `split_metrics` feature is enabled.
    pub timing: Option<SplitTimingReport>,

    pub warnings: Vec<String>,
}

impl SplitDiagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// No oriented edge is shared by more than one triangle.
    #[must_use]
    pub fn is_manifold(&self) -> bool {
        self.non_manifold_edge_count == 0
    }

    /// Every directed edge has a reverse partner.
    #[must_use]
    pub fn is_watertight(&self) -> bool {
        self.open_edge_count == 0
    }

    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// One-line summary for logs and CLI output.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut out = format!(
            "parts={} triangles={} largest={} edges={} open={} non_manifold={} degenerate={} ambiguous={} folded={} traversal={:?}",
            self.part_count,
            self.triangle_count,
            self.largest_part_triangle_count,
            self.directed_edge_count,
            self.open_edge_count,
            self.non_manifold_edge_count,
            self.degenerate_triangle_count,
            self.ambiguous_edge_visits,
            self.folded_back_candidates,
            self.traversal,
        );
        if let Some(timing) = &self.timing {
            let _ = write!(out, " total_ms={:.3}", timing.total_ms());
        }
        if self.has_warnings() {
            let _ = write!(out, " warnings={}", self.warnings.len());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_manifold_and_watertight() {
        let diag = SplitDiagnostics::new();
        assert!(diag.is_manifold());
        assert!(diag.is_watertight());
        assert!(!diag.has_warnings());
        assert_eq!(diag.traversal, TraversalOrder::DepthFirst);
    }

    #[test]
    fn summary_lists_counts() {
        let mut diag = SplitDiagnostics {
            triangle_count: 24,
            part_count: 2,
            largest_part_triangle_count: 12,
            non_manifold_edge_count: 3,
            ..SplitDiagnostics::default()
        };
        diag.add_warning("mesh has non-manifold edges");
        let summary = diag.summary();
        assert!(summary.starts_with("parts=2 triangles=24 largest=12"));
        assert!(summary.contains("non_manifold=3"));
        assert!(summary.ends_with("warnings=1"));
        assert!(!diag.is_manifold());
    }
}

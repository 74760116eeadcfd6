//! Splitting a triangle soup into its disjoint bodies.
//!
//! Triangles are neighbors when they share an edge with opposite winding: if
//! triangle 1 is `v1-v2-v3`, a neighbor must be one of `v2-v1-x`, `v3-v2-x` or
//! `v1-v3-x`. Vertices are matched by exact coordinates; nothing is welded.
//!
//! The tricky case is an edge shared by more than two triangles, for example
//! two equal cubes touching along an edge. Assuming every body has outward
//! facing normals, the neighbor that continues the current body is the one
//! reached by sweeping around the shared edge on the convex side, which is the
//! candidate with the largest signed angle between face normals. Candidates
//! folded back onto the current face are taken to belong to another body.

use std::collections::{HashMap, VecDeque};
use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use super::angle::not_atan2;
use super::buffer::{
    AttributeArray, BufferAttribute, BufferError, GeometryAttribute, MeshBuffers, POSITION,
};
use super::core::{Vec3, cross, dot, face_normal, length, length_squared, sub};
use super::diagnostics::SplitDiagnostics;
use super::metrics::{SplitMetrics, TimingBucket};

/// Order in which the work list hands out triangles.
///
/// Part membership does not depend on it; only the triangle order inside each
/// part does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TraversalOrder {
    /// Last in, first out.
    #[default]
    DepthFirst,
    /// First in, first out.
    BreadthFirst,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SplitOptions {
    pub traversal: TraversalOrder,
    /// A candidate whose angle exceeds `PI - fold_back_ratio * edge_length` is
    /// treated as folded back and ranked last.
    pub fold_back_ratio: f64,
}

impl SplitOptions {
    pub const DEFAULT_FOLD_BACK_RATIO: f64 = 1e-3;

    #[must_use]
    pub const fn new(traversal: TraversalOrder) -> Self {
        Self {
            traversal,
            fold_back_ratio: Self::DEFAULT_FOLD_BACK_RATIO,
        }
    }
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self::new(TraversalOrder::DepthFirst)
    }
}

/// Per-call state: options plus the timing accumulator.
#[derive(Debug, Default)]
pub struct SplitContext {
    pub options: SplitOptions,
    pub metrics: SplitMetrics,
}

impl SplitContext {
    #[must_use]
    pub fn new(options: SplitOptions) -> Self {
        Self {
            options,
            metrics: SplitMetrics::default(),
        }
    }
}

/// Exact key of a directed edge: the bit patterns of both endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeKey([u64; 6]);

impl EdgeKey {
    #[must_use]
    pub fn new(from: Vec3, to: Vec3) -> Self {
        Self([
            coordinate_bits(from[0]),
            coordinate_bits(from[1]),
            coordinate_bits(from[2]),
            coordinate_bits(to[0]),
            coordinate_bits(to[1]),
            coordinate_bits(to[2]),
        ])
    }

    #[must_use]
    pub fn reversed(self) -> Self {
        let [a, b, c, d, e, f] = self.0;
        Self([d, e, f, a, b, c])
    }
}

// -0.0 + 0.0 == +0.0, so both zeros share a key like they compare equal.
fn coordinate_bits(value: f64) -> u64 {
    (value + 0.0).to_bits()
}

#[derive(Debug, Clone, Copy)]
struct TriangleInfo {
    triangle: usize,
    normal: Vec3,
}

/// Triangle index lists, one per disjoint body.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrianglePartition {
    pub parts: Vec<Vec<usize>>,
}

impl TrianglePartition {
    #[must_use]
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.parts.iter().map(Vec::len).sum()
    }

    /// Part index of every triangle, indexed by triangle.
    #[must_use]
    pub fn part_of_triangle(&self) -> Vec<usize> {
        let mut owner = vec![0; self.triangle_count()];
        for (part_idx, part) in self.parts.iter().enumerate() {
            for &tri in part {
                owner[tri] = part_idx;
            }
        }
        owner
    }
}

#[derive(Debug, Default)]
struct TraversalStats {
    ambiguous_edge_visits: usize,
    folded_back_candidates: usize,
}

struct Adjacency {
    normals: Vec<Vec3>,
    edges: HashMap<EdgeKey, Vec<TriangleInfo>>,
}

impl Adjacency {
    fn build(points: &[Vec3]) -> Self {
        let triangle_count = points.len() / 3;
        let mut normals = Vec::with_capacity(triangle_count);
        let mut edges: HashMap<EdgeKey, Vec<TriangleInfo>> =
            HashMap::with_capacity(triangle_count * 3);

        for (triangle, corners) in points.chunks_exact(3).enumerate() {
            let [v1, v2, v3] = [corners[0], corners[1], corners[2]];
            let normal = face_normal(v1, v2, v3);
            normals.push(normal);

            let info = TriangleInfo { triangle, normal };
            edges.entry(EdgeKey::new(v1, v2)).or_default().push(info);
            edges.entry(EdgeKey::new(v2, v3)).or_default().push(info);
            edges.entry(EdgeKey::new(v3, v1)).or_default().push(info);
        }

        Self { normals, edges }
    }

    fn record_topology(&self, diag: &mut SplitDiagnostics) {
        diag.directed_edge_count = self.edges.len();
        diag.open_edge_count = self
            .edges
            .keys()
            .filter(|key| !self.edges.contains_key(&key.reversed()))
            .count();
        diag.non_manifold_edge_count = self.edges.values().filter(|tris| tris.len() > 1).count();
        diag.degenerate_triangle_count = self
            .normals
            .iter()
            .filter(|n| length_squared(**n) == 0.0)
            .count();
    }
}

/// Picks the triangle that continues the body of `v1-v2-v3` across edge `v1-v2`.
///
/// Every candidate exposes the reversed edge `v2-v1`. Among several candidates
/// the one with the largest signed angle from `normal` around the edge wins;
/// the angle itself is never computed, only [`not_atan2`] of its sine and
/// cosine terms. The search is quadratic over an edge bucket, which is fine
/// while few triangles meet at any one edge.
fn find_next_triangle(
    v1: Vec3,
    v2: Vec3,
    normal: Vec3,
    candidates: &[TriangleInfo],
    fold_back_ratio: f64,
    stats: &mut TraversalStats,
) -> usize {
    if let [only] = candidates {
        return only.triangle;
    }
    stats.ambiguous_edge_visits += 1;

    let edge = sub(v2, v1);
    let epsilon = fold_back_ratio * length(edge);

    let mut best_triangle = candidates[0].triangle;
    let mut best_angle = f64::NEG_INFINITY;
    for candidate in candidates {
        let cos_term = dot(normal, candidate.normal);
        let sin_term = dot(cross(normal, candidate.normal), edge);
        let mut angle = not_atan2(sin_term, cos_term);
        if angle > PI - epsilon {
            stats.folded_back_candidates += 1;
            angle = -PI;
        }
        if angle > best_angle {
            best_angle = angle;
            best_triangle = candidate.triangle;
        }
    }
    best_triangle
}

fn traverse(
    points: &[Vec3],
    adjacency: &Adjacency,
    options: SplitOptions,
    stats: &mut TraversalStats,
) -> TrianglePartition {
    let triangle_count = adjacency.normals.len();
    let mut visited = vec![false; triangle_count];
    let mut work: VecDeque<usize> = VecDeque::new();
    let mut parts = Vec::new();
    let pop: fn(&mut VecDeque<usize>) -> Option<usize> = match options.traversal {
        TraversalOrder::DepthFirst => VecDeque::pop_back,
        TraversalOrder::BreadthFirst => VecDeque::pop_front,
    };

    for seed in 0..triangle_count {
        if visited[seed] {
            continue;
        }
        visited[seed] = true;
        work.push_back(seed);

        let mut part = Vec::new();
        while let Some(triangle) = pop(&mut work) {
            part.push(triangle);

            let off = triangle * 3;
            let corners = [points[off], points[off + 1], points[off + 2]];
            let normal = adjacency.normals[triangle];
            for k in 0..3 {
                let v1 = corners[k];
                let v2 = corners[(k + 1) % 3];
                // A neighbor has to expose this edge in the opposite direction.
                let Some(candidates) = adjacency.edges.get(&EdgeKey::new(v2, v1)) else {
                    continue;
                };
                let next =
                    find_next_triangle(v1, v2, normal, candidates, options.fold_back_ratio, stats);
                if !visited[next] {
                    visited[next] = true;
                    work.push_back(next);
                }
            }
        }
        parts.push(part);
    }

    TrianglePartition { parts }
}

/// Groups the triangles of a flat corner list (3 points per triangle) into
/// connected bodies. A trailing partial triangle is ignored.
///
/// Parts come out in order of their lowest triangle index.
#[must_use]
pub fn partition_triangles(points: &[Vec3], options: SplitOptions) -> TrianglePartition {
    let adjacency = Adjacency::build(points);
    let mut stats = TraversalStats::default();
    traverse(points, &adjacency, options, &mut stats)
}

/// Splits a mesh into one mesh per disjoint body. Assumes T-junctions are
/// accidental and every body has outward-facing normals.
///
/// Indexed input is expanded on a private copy. Every output mesh carries the
/// input's attribute names, item sizes, element types and normalization flags.
pub fn split_disjoint_geometry(mesh: &MeshBuffers) -> Result<Vec<MeshBuffers>, BufferError> {
    split_disjoint_geometry_with_options(mesh, SplitOptions::default())
}

pub fn split_disjoint_geometry_with_options(
    mesh: &MeshBuffers,
    options: SplitOptions,
) -> Result<Vec<MeshBuffers>, BufferError> {
    let mut ctx = SplitContext::new(options);
    split_disjoint_geometry_with_context(mesh, &mut ctx).map(|(parts, _)| parts)
}

pub fn split_disjoint_geometry_with_context(
    mesh: &MeshBuffers,
    ctx: &mut SplitContext,
) -> Result<(Vec<MeshBuffers>, SplitDiagnostics), BufferError> {
    ctx.metrics.begin();
    let options = ctx.options;
    let mut diag = SplitDiagnostics {
        traversal: options.traversal,
        ..SplitDiagnostics::default()
    };

    if mesh.position().is_none() {
        return Err(BufferError::MissingPositionAttribute);
    }
    let expanded;
    let soup = if mesh.is_indexed() {
        expanded = ctx
            .metrics
            .time(TimingBucket::Expansion, || mesh.to_non_indexed())?;
        &expanded
    } else {
        mesh
    };

    let points = ctx.metrics.time(TimingBucket::Validation, || {
        soup.validate_triangle_soup()
            .map(|position| position.array.to_triples())
    })?;
    let triangle_count = points.len() / 3;
    diag.triangle_count = triangle_count;
    if triangle_count == 0 {
        diag.timing = ctx.metrics.end();
        return Ok((Vec::new(), diag));
    }
    log::debug!("splitting {triangle_count} triangles");

    let adjacency = ctx
        .metrics
        .time(TimingBucket::Adjacency, || Adjacency::build(&points));
    adjacency.record_topology(&mut diag);
    log::debug!(
        "edge map: {} directed edges, {} open, {} non-manifold",
        diag.directed_edge_count,
        diag.open_edge_count,
        diag.non_manifold_edge_count
    );

    let mut stats = TraversalStats::default();
    let partition = ctx.metrics.time(TimingBucket::Traversal, || {
        traverse(&points, &adjacency, options, &mut stats)
    });
    diag.ambiguous_edge_visits = stats.ambiguous_edge_visits;
    diag.folded_back_candidates = stats.folded_back_candidates;
    diag.part_count = partition.part_count();
    diag.largest_part_triangle_count = partition.parts.iter().map(Vec::len).max().unwrap_or(0);

    let parts = ctx.metrics.time(TimingBucket::Materialization, || {
        partition
            .parts
            .iter()
            .map(|part| soup.gather_triangles(part))
            .collect::<Result<Vec<_>, _>>()
    })?;

    if diag.non_manifold_edge_count > 0 {
        log::warn!(
            "{} non-manifold edges resolved by face angle",
            diag.non_manifold_edge_count
        );
        diag.add_warning("mesh has non-manifold edges");
    }
    if diag.degenerate_triangle_count > 0 {
        log::warn!("{} degenerate triangles", diag.degenerate_triangle_count);
        diag.add_warning("mesh has degenerate triangles");
    }
    log::debug!("found {} parts", diag.part_count);

    diag.timing = ctx.metrics.end();
    Ok((parts, diag))
}

/// Position-only variant: `pos` holds x, y, z of 3 vertices (9 floats) per
/// triangle; each returned part is laid out the same way.
pub fn split_positions(pos: &[f32]) -> Result<Vec<Vec<f32>>, BufferError> {
    let mut mesh = MeshBuffers::new();
    mesh.set_attribute(
        POSITION,
        BufferAttribute::new(AttributeArray::Float32(pos.to_vec()), 3, false),
    );
    split_disjoint_geometry(&mesh)?
        .into_iter()
        .map(take_float32_positions)
        .collect()
}

fn take_float32_positions(mut part: MeshBuffers) -> Result<Vec<f32>, BufferError> {
    match part.remove_attribute(POSITION) {
        Some(GeometryAttribute::Buffer(BufferAttribute {
            array: AttributeArray::Float32(data),
            ..
        })) => Ok(data),
        Some(GeometryAttribute::Interleaved(_)) => Err(BufferError::UnsupportedAttributeStorage {
            name: POSITION.to_string(),
        }),
        // Parts keep the input's element type, and the input is built as Float32.
        Some(GeometryAttribute::Buffer(_)) | None => Err(BufferError::MissingPositionAttribute),
    }
}

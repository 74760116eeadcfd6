mod angle;
mod buffer;
mod core;
mod diagnostics;
mod metrics;
mod normals;
mod primitives;
mod split;

pub use angle::{not_atan2, not_atan2_f32};
pub use buffer::{
    AttributeArray, AttributeMap, BufferAttribute, BufferError, GeometryAttribute, InterleavedBuffer,
    InterleavedBufferAttribute, MeshBuffers, NORMAL, POSITION,
};
pub use core::{
    BBox, Transform, Vec3, add, cross, dot, face_normal, length, length_squared, normalized,
    scale, sub,
};
pub use diagnostics::SplitDiagnostics;
pub use metrics::{SplitMetrics, SplitTimingReport, TimingBucket};
pub use normals::{compute_triangle_normals, compute_triangle_normals_with_metrics};
pub use primitives::{all_point_triangles, box_geometry, cylinder_ring_points};
pub use split::{
    EdgeKey, SplitContext, SplitOptions, TraversalOrder, TrianglePartition, partition_triangles,
    split_disjoint_geometry, split_disjoint_geometry_with_context,
    split_disjoint_geometry_with_options, split_positions,
};

#[cfg(test)]
mod tests;

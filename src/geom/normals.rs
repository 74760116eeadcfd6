//! Face-normal overlay for viewers.
//!
//! For every triangle one short segment starts at the centroid and follows the
//! face normal outward; a second set points inward. Segment length is a
//! twenty-fifth of the bounding-sphere radius, so the overlay scales with the
//! model.

use super::buffer::{BufferError, MeshBuffers, POSITION};
use super::core::{BBox, Vec3, ZERO, add, face_normal, length, normalized, scale, sub};
use super::metrics::{SplitMetrics, TimingBucket};

const SEGMENT_RADIUS_DIVISOR: f64 = 25.0;

/// Returns `(outward, inward)` line-segment geometries, two points per triangle.
pub fn compute_triangle_normals(mesh: &MeshBuffers) -> Result<(MeshBuffers, MeshBuffers), BufferError> {
    let mut metrics = SplitMetrics::default();
    compute_triangle_normals_with_metrics(mesh, &mut metrics)
}

pub fn compute_triangle_normals_with_metrics(
    mesh: &MeshBuffers,
    metrics: &mut SplitMetrics,
) -> Result<(MeshBuffers, MeshBuffers), BufferError> {
    metrics.time(TimingBucket::Normals, || {
        if mesh.position().is_none() {
            return Err(BufferError::MissingPositionAttribute);
        }
        let expanded;
        let soup = if mesh.is_indexed() {
            expanded = mesh.to_non_indexed()?;
            &expanded
        } else {
            mesh
        };

        let position = soup
            .position()
            .ok_or(BufferError::MissingPositionAttribute)?
            .as_buffer()
            .ok_or_else(|| BufferError::UnsupportedAttributeStorage {
                name: POSITION.to_string(),
            })?;
        if position.item_size != 3 {
            return Err(BufferError::MalformedAttributeLength {
                name: POSITION.to_string(),
                len: position.array.len(),
                item_size: position.item_size,
            });
        }

        let points = position.array.to_triples();
        let segment_length = bounding_radius(&points) / SEGMENT_RADIUS_DIVISOR;

        let triangle_count = points.len() / 3;
        let mut outward = Vec::with_capacity(triangle_count * 2);
        let mut inward = Vec::with_capacity(triangle_count * 2);
        for tri in points.chunks_exact(3) {
            let centroid = scale(add(add(tri[0], tri[1]), tri[2]), 1.0 / 3.0);
            let offset = normalized(face_normal(tri[0], tri[1], tri[2]))
                .map_or(ZERO, |n| scale(n, segment_length));

            outward.push(centroid);
            outward.push(add(centroid, offset));
            inward.push(centroid);
            inward.push(sub(centroid, offset));
        }
        log::debug!("normal overlay for {triangle_count} triangles, segment length {segment_length}");

        Ok((MeshBuffers::from_points(&outward), MeshBuffers::from_points(&inward)))
    })
}

/// Radius of the sphere centered on the bounding box that contains every point.
fn bounding_radius(points: &[Vec3]) -> f64 {
    let Some(bbox) = BBox::from_points(points.iter().copied()) else {
        return 0.0;
    };
    let center = bbox.center();
    points
        .iter()
        .map(|&p| length(sub(p, center)))
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radius_of_unit_cube_corners() {
        let points = [[0.0, 0.0, 0.0], [1.0, 1.0, 1.0], [1.0, 0.0, 0.0]];
        assert!((bounding_radius(&points) - 0.75_f64.sqrt()).abs() < 1e-12);
        assert_eq!(bounding_radius(&[]), 0.0);
    }
}

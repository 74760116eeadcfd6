//! Procedural fixtures: a segmented box and a cylinder ring point set.

use super::buffer::{AttributeArray, BufferAttribute, MeshBuffers, NORMAL, POSITION};
use super::core::Vec3;

/// One box face: the axis it faces along, the direction, and the in-plane axes
/// ordered so that `u × v` points outward.
struct BoxFace {
    axis: usize,
    sign: f64,
    u: usize,
    v: usize,
}

const BOX_FACES: [BoxFace; 6] = [
    BoxFace { axis: 0, sign: 1.0, u: 1, v: 2 },
    BoxFace { axis: 0, sign: -1.0, u: 2, v: 1 },
    BoxFace { axis: 1, sign: 1.0, u: 2, v: 0 },
    BoxFace { axis: 1, sign: -1.0, u: 0, v: 2 },
    BoxFace { axis: 2, sign: 1.0, u: 0, v: 1 },
    BoxFace { axis: 2, sign: -1.0, u: 1, v: 0 },
];

/// Grid coordinate `i` of `segments` along an axis of length `size`, centered on 0.
///
/// Every face derives its border vertices from this function, so faces meeting
/// at a box edge produce bit-identical positions.
#[allow(clippy::cast_precision_loss)]
fn grid_coordinate(size: f64, segments: usize, i: usize) -> f64 {
    let half = size * 0.5;
    if i == segments {
        half
    } else {
        -half + size * i as f64 / segments as f64
    }
}

/// Indexed, axis-aligned box centered on the origin with outward winding.
///
/// `size` and `segments` are given per axis (x, y, z); a segment count of zero
/// is treated as one. Each face has its own vertices carrying `position`,
/// `normal` and `uv` (all `Float32`).
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn box_geometry(size: Vec3, segments: [usize; 3]) -> MeshBuffers {
    let segments = segments.map(|s| s.max(1));
    let mut positions: Vec<f32> = Vec::new();
    let mut normals: Vec<f32> = Vec::new();
    let mut uvs: Vec<f32> = Vec::new();
    let mut index: Vec<u32> = Vec::new();

    for face in &BOX_FACES {
        let (su, sv) = (segments[face.u], segments[face.v]);
        let base = (positions.len() / 3) as u32;
        let row = (su + 1) as u32;

        for j in 0..=sv {
            for i in 0..=su {
                let mut p = [0.0; 3];
                p[face.axis] = face.sign * size[face.axis] * 0.5;
                p[face.u] = grid_coordinate(size[face.u], su, i);
                p[face.v] = grid_coordinate(size[face.v], sv, j);
                positions.extend(p.map(|c| c as f32));

                let mut n = [0.0_f32; 3];
                n[face.axis] = face.sign as f32;
                normals.extend(n);

                uvs.push(i as f32 / su as f32);
                uvs.push(j as f32 / sv as f32);
            }
        }

        for j in 0..sv as u32 {
            for i in 0..su as u32 {
                let a = base + j * row + i;
                let b = a + 1;
                let c = b + row;
                let d = a + row;
                index.extend([a, b, c, a, c, d]);
            }
        }
    }

    let mut mesh = MeshBuffers::new();
    mesh.set_attribute(
        POSITION,
        BufferAttribute::new(AttributeArray::Float32(positions), 3, false),
    );
    mesh.set_attribute(
        NORMAL,
        BufferAttribute::new(AttributeArray::Float32(normals), 3, false),
    );
    mesh.set_attribute("uv", BufferAttribute::new(AttributeArray::Float32(uvs), 2, false));
    mesh.set_index(Some(index));
    mesh
}

/// Points on the rims of an open cylinder around the z axis: for each of
/// `segments` angles, the bottom point (z = 0) followed by the top point.
///
/// Angles and trigonometry run in `f32`, so the points survive a round trip
/// through a `Float32` attribute unchanged.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn cylinder_ring_points(segments: usize, radius: f32, height: f32) -> Vec<Vec3> {
    let mut points = Vec::with_capacity(segments * 2);
    for i in 0..segments {
        let angle = 2.0 * std::f32::consts::PI * i as f32 / segments as f32;
        let x = f64::from(radius * angle.cos());
        let y = f64::from(radius * angle.sin());
        points.push([x, y, 0.0]);
        points.push([x, y, f64::from(height)]);
    }
    points
}

/// Every ordered triple of distinct points as a triangle corner list.
///
/// Produces `n * (n - 1) * (n - 2)` triangles, each in both windings and all
/// rotations, which makes nearly every edge non-manifold.
#[must_use]
pub fn all_point_triangles(points: &[Vec3]) -> Vec<Vec3> {
    let n = points.len();
    let mut corners = Vec::with_capacity(n * n.saturating_sub(1) * n.saturating_sub(2) * 3);
    for i in 0..n {
        for j in (0..n).filter(|&j| j != i) {
            for k in (0..n).filter(|&k| k != i && k != j) {
                corners.extend([points[i], points[j], points[k]]);
            }
        }
    }
    corners
}

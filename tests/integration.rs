use stl_viewer_engine::geom::{
    MeshBuffers, SplitContext, SplitOptions, TraversalOrder, all_point_triangles, box_geometry,
    compute_triangle_normals, cylinder_ring_points, split_disjoint_geometry,
    split_disjoint_geometry_with_context, split_positions,
};

fn cube_at(offset: [f64; 3]) -> MeshBuffers {
    let mut cube = box_geometry([1.0, 1.0, 1.0], [2, 2, 2]);
    cube.translate(offset);
    cube
}

#[test]
fn not_atan2_export_matches_geom() {
    assert_eq!(stl_viewer_engine::not_atan2(1.0, -1.0), stl_viewer_engine::geom::not_atan2(1.0, -1.0));
    assert_eq!(stl_viewer_engine::not_atan2(0.0, 0.0), 0.0);
}

#[test]
fn row_of_touching_cubes_splits_into_cubes() {
    let cubes: Vec<MeshBuffers> = (0..4).map(|i| cube_at([f64::from(i), 0.0, 0.0])).collect();
    let scene = MeshBuffers::merge(&cubes).expect("merge");

    let mut ctx = SplitContext::default();
    let (parts, diag) = split_disjoint_geometry_with_context(&scene, &mut ctx).expect("split");

    assert_eq!(parts.len(), 4);
    for part in &parts {
        assert_eq!(part.triangle_count(), cubes[0].triangle_count());
        assert!(part.attribute("normal").is_some());
        assert!(part.attribute("uv").is_some());
    }
    assert_eq!(diag.part_count, 4);
    assert!(diag.is_watertight());
    assert!(!diag.is_manifold());
    assert!(diag.summary().starts_with("parts=4 "));
}

#[test]
fn cubes_sharing_only_an_edge_stay_apart() {
    let scene =
        MeshBuffers::merge(&[cube_at([0.0, 0.0, 0.0]), cube_at([1.0, 1.0, 0.0])]).expect("merge");
    let parts = split_disjoint_geometry(&scene).expect("split");
    assert_eq!(parts.len(), 2);
    assert_eq!(parts[0].triangle_count(), parts[1].triangle_count());
}

#[test]
fn split_parts_merge_back_to_every_triangle() {
    let corners = all_point_triangles(&cylinder_ring_points(5, 2.0, 0.5));
    let soup = MeshBuffers::from_points(&corners);
    let options = SplitOptions {
        traversal: TraversalOrder::BreadthFirst,
        ..SplitOptions::default()
    };
    let mut ctx = SplitContext::new(options);
    let (parts, diag) = split_disjoint_geometry_with_context(&soup, &mut ctx).expect("split");

    assert_eq!(diag.traversal, TraversalOrder::BreadthFirst);
    let merged = MeshBuffers::merge(&parts).expect("merge parts");
    assert_eq!(merged.triangle_count(), soup.triangle_count());
}

#[test]
fn flat_positions_follow_mesh_split() {
    let mut flat = Vec::new();
    for offset in [0.0_f32, 5.0] {
        flat.extend_from_slice(&[offset, 0.0, 0.0, offset + 1.0, 0.0, 0.0, offset, 1.0, 0.0]);
    }
    let parts = split_positions(&flat).expect("split");
    assert_eq!(parts.len(), 2);
    assert!(parts.iter().all(|p| p.len() == 9));
}

#[test]
fn normals_overlay_has_two_points_per_triangle() {
    let cube = cube_at([0.0, 0.0, 0.0]);
    let (outward, inward) = compute_triangle_normals(&cube).expect("normals");
    assert_eq!(outward.vertex_count(), cube.triangle_count() * 2);
    assert_eq!(inward.vertex_count(), cube.triangle_count() * 2);
}

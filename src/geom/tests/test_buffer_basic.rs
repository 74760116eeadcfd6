use std::sync::Arc;

use crate::geom::{
    AttributeArray, BufferAttribute, BufferError, GeometryAttribute, InterleavedBuffer,
    InterleavedBufferAttribute, MeshBuffers, NORMAL, POSITION, Transform, box_geometry,
};

fn quad() -> MeshBuffers {
    let mut mesh = MeshBuffers::new();
    mesh.set_attribute(
        POSITION,
        BufferAttribute::new(
            AttributeArray::Float32(vec![
                0.0, 0.0, 0.0, //
                1.0, 0.0, 0.0, //
                1.0, 1.0, 0.0, //
                0.0, 1.0, 0.0,
            ]),
            3,
            false,
        ),
    );
    mesh.set_attribute(
        "id",
        BufferAttribute::new(AttributeArray::Uint16(vec![10, 11, 12, 13]), 1, false),
    );
    mesh.set_index(Some(vec![0, 1, 2, 0, 2, 3]));
    mesh
}

fn float_data(mesh: &MeshBuffers, name: &str) -> Vec<f32> {
    match mesh.attribute(name).and_then(GeometryAttribute::as_buffer) {
        Some(BufferAttribute {
            array: AttributeArray::Float32(data),
            ..
        }) => data.clone(),
        other => panic!("unexpected attribute {name}: {other:?}"),
    }
}

#[test]
fn counts_follow_index_or_positions() {
    let mesh = quad();
    assert!(mesh.is_indexed());
    assert_eq!(mesh.vertex_count(), 4);
    assert_eq!(mesh.triangle_count(), 2);
    assert_eq!(MeshBuffers::new().triangle_count(), 0);
}

#[test]
fn to_non_indexed_expands_every_attribute() {
    let mesh = quad();
    let soup = mesh.to_non_indexed().unwrap();

    assert!(!soup.is_indexed());
    assert!(mesh.is_indexed(), "source keeps its index");
    assert_eq!(soup.vertex_count(), 6);
    assert_eq!(
        soup.attribute("id").and_then(GeometryAttribute::as_buffer).map(|a| &a.array),
        Some(&AttributeArray::Uint16(vec![10, 11, 12, 10, 12, 13]))
    );
    assert_eq!(&float_data(&soup, POSITION)[9..12], &[0.0, 0.0, 0.0]);
    assert!(soup.validate_triangle_soup().is_ok());
}

#[test]
fn to_non_indexed_without_index_is_a_copy() {
    let mesh = MeshBuffers::from_points(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
    assert_eq!(mesh.to_non_indexed().unwrap(), mesh);
}

#[test]
fn malformed_index_length_is_rejected() {
    let mut mesh = quad();
    mesh.set_index(Some(vec![0, 1, 2, 3]));
    assert_eq!(
        mesh.to_non_indexed(),
        Err(BufferError::MalformedIndexLength { len: 4 })
    );
}

#[test]
fn index_past_shortest_attribute_is_rejected() {
    let mut mesh = quad();
    mesh.set_attribute(
        "id",
        BufferAttribute::new(AttributeArray::Uint16(vec![10, 11, 12]), 1, false),
    );
    assert_eq!(
        mesh.to_non_indexed(),
        Err(BufferError::IndexOutOfBounds { index: 3, count: 3 })
    );
}

#[test]
fn validation_reports_missing_position_before_storage() {
    let mut mesh = MeshBuffers::new();
    let data = Arc::new(InterleavedBuffer {
        array: AttributeArray::Float32(vec![0.0; 9]),
        stride: 3,
    });
    mesh.set_attribute(
        NORMAL,
        InterleavedBufferAttribute {
            data,
            item_size: 3,
            offset: 0,
            normalized: false,
        },
    );
    assert_eq!(
        mesh.validate_triangle_soup(),
        Err(BufferError::MissingPositionAttribute)
    );
}

#[test]
fn validation_rejects_wrong_position_item_size() {
    let mut mesh = MeshBuffers::new();
    mesh.set_attribute(
        POSITION,
        BufferAttribute::new(AttributeArray::Float32(vec![0.0; 12]), 2, false),
    );
    assert_eq!(
        mesh.validate_triangle_soup(),
        Err(BufferError::MalformedAttributeLength {
            name: POSITION.to_string(),
            len: 12,
            item_size: 2,
        })
    );
}

#[test]
fn validation_rejects_partial_triangles_in_any_attribute() {
    let mut mesh = MeshBuffers::from_points(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
    mesh.set_attribute(
        "uv",
        BufferAttribute::new(AttributeArray::Float32(vec![0.0; 5]), 2, false),
    );
    assert!(matches!(
        mesh.validate_triangle_soup(),
        Err(BufferError::MalformedAttributeLength { ref name, len: 5, item_size: 2 }) if name == "uv"
    ));
}

#[test]
fn merge_concatenates_matching_layouts() {
    let a = MeshBuffers::from_points(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
    let b = quad();
    let mut b_positions_only = b.clone();
    b_positions_only.remove_attribute("id");

    let merged = MeshBuffers::merge(&[a.clone(), b_positions_only]).unwrap();
    assert!(!merged.is_indexed());
    assert_eq!(merged.triangle_count(), 3);
    assert_eq!(&float_data(&merged, POSITION)[..9], &float_data(&a, POSITION)[..]);

    assert_eq!(MeshBuffers::merge(&[]).unwrap(), MeshBuffers::new());
}

#[test]
fn merge_rejects_different_attribute_sets() {
    let a = MeshBuffers::from_points(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
    assert_eq!(
        MeshBuffers::merge(&[a.clone(), quad()]),
        Err(BufferError::IncompatibleAttributes { name: "id".to_string() })
    );
    assert_eq!(
        MeshBuffers::merge(&[quad(), a]),
        Err(BufferError::IncompatibleAttributes { name: "id".to_string() })
    );
}

#[test]
fn merge_rejects_different_element_types() {
    let a = MeshBuffers::from_points(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
    let mut b = MeshBuffers::new();
    b.set_attribute(
        POSITION,
        BufferAttribute::new(AttributeArray::Float64(vec![0.0; 9]), 3, false),
    );
    assert_eq!(
        MeshBuffers::merge(&[a, b]),
        Err(BufferError::IncompatibleAttributes { name: POSITION.to_string() })
    );
}

#[test]
fn gather_copies_whole_items_in_order() {
    let array = AttributeArray::Int8(vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(array.gather(2, [2, 0, 2]), AttributeArray::Int8(vec![5, 6, 1, 2, 5, 6]));
    assert_eq!(array.gather(3, []), AttributeArray::Int8(vec![]));
}

#[test]
fn translate_moves_positions_only() {
    let mut cube = box_geometry([1.0, 1.0, 1.0], [1, 1, 1]);
    let normals_before = float_data(&cube, NORMAL);
    cube.translate([1.0, -2.0, 0.5]);

    let positions = float_data(&cube, POSITION);
    assert_eq!(&positions[..3], &[1.5, -2.5, 0.0]);
    assert_eq!(float_data(&cube, NORMAL), normals_before);
}

#[test]
fn rotation_turns_normals_with_positions() {
    let mut cube = box_geometry([1.0, 1.0, 1.0], [1, 1, 1]);
    cube.apply_transform(Transform::rotate_z(std::f64::consts::FRAC_PI_2));

    // The first face faces +X; after a quarter turn about Z it faces +Y.
    let normals = float_data(&cube, NORMAL);
    assert!(normals[0].abs() < 1e-6);
    assert!((normals[1] - 1.0).abs() < 1e-6);
    assert!(normals[2].abs() < 1e-6);
}

#[test]
fn typed_arrays_widen_exactly() {
    let array = AttributeArray::Int32(vec![-7, 8, i32::MAX]);
    assert_eq!(array.get(2), f64::from(i32::MAX));
    assert_eq!(array.to_triples(), vec![[-7.0, 8.0, f64::from(i32::MAX)]]);
    assert_eq!(array.type_name(), "Int32");
    assert_eq!(array.len(), 3);
}

#[test]
fn attributes_keep_insertion_order() {
    let mut mesh = MeshBuffers::new();
    mesh.set_attribute(
        "uv",
        BufferAttribute::new(AttributeArray::Float32(vec![0.0; 6]), 2, false),
    );
    mesh.set_attribute(
        POSITION,
        BufferAttribute::new(AttributeArray::Float32(vec![0.0; 9]), 3, false),
    );
    mesh.set_attribute(
        "color",
        BufferAttribute::new(AttributeArray::Uint8(vec![0; 9]), 3, true),
    );
    // Replacing an attribute keeps its slot.
    mesh.set_attribute(
        "uv",
        BufferAttribute::new(AttributeArray::Float32(vec![1.0; 6]), 2, false),
    );
    assert_eq!(mesh.attributes().keys().collect::<Vec<_>>(), ["uv", "position", "color"]);

    mesh.set_index(Some(vec![2, 1, 0]));
    let soup = mesh.to_non_indexed().unwrap();
    assert_eq!(soup.attributes().keys().collect::<Vec<_>>(), ["uv", "position", "color"]);
    assert_eq!(float_data(&soup, "uv"), vec![1.0; 6]);

    mesh.remove_attribute(POSITION);
    assert_eq!(mesh.attributes().keys().collect::<Vec<_>>(), ["uv", "color"]);
    assert_eq!(mesh.attributes().len(), 2);
}

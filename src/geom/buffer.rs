//! Attribute buffers for flat triangle lists.
//!
//! [`MeshBuffers`] mirrors the layout renderers consume: a set of named
//! per-vertex attributes plus an optional index. Operations in this crate work
//! on the non-indexed form ("triangle soup"), where vertex `3 * t + k` is corner
//! `k` of triangle `t` in every attribute.

use std::fmt;
use std::sync::Arc;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::core::{Transform, Vec3, normalized};

pub const POSITION: &str = "position";
pub const NORMAL: &str = "normal";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BufferError {
    #[error("geometry does not have a position attribute")]
    MissingPositionAttribute,
    #[error("attribute `{name}` uses interleaved storage, which is not supported")]
    UnsupportedAttributeStorage { name: String },
    #[error("attribute `{name}` has {len} values, not a whole number of triangles at item size {item_size}")]
    MalformedAttributeLength {
        name: String,
        len: usize,
        item_size: usize,
    },
    #[error("attribute `{name}` has {count} vertices but position has {expected}")]
    AttributeCountMismatch {
        name: String,
        count: usize,
        expected: usize,
    },
    #[error("index length {len} is not a multiple of 3")]
    MalformedIndexLength { len: usize },
    #[error("index {index} is out of bounds for {count} vertices")]
    IndexOutOfBounds { index: u32, count: usize },
    #[error("attribute `{name}` differs between merged geometries")]
    IncompatibleAttributes { name: String },
}

/// Typed backing array of an attribute. Element types match the JS typed arrays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum AttributeArray {
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    Int8(Vec<i8>),
    Uint8(Vec<u8>),
    Int16(Vec<i16>),
    Uint16(Vec<u16>),
    Int32(Vec<i32>),
    Uint32(Vec<u32>),
}

macro_rules! for_each_array {
    ($array:expr, $data:ident => $body:expr) => {
        match $array {
            AttributeArray::Float32($data) => $body,
            AttributeArray::Float64($data) => $body,
            AttributeArray::Int8($data) => $body,
            AttributeArray::Uint8($data) => $body,
            AttributeArray::Int16($data) => $body,
            AttributeArray::Uint16($data) => $body,
            AttributeArray::Int32($data) => $body,
            AttributeArray::Uint32($data) => $body,
        }
    };
}

macro_rules! map_array {
    ($array:expr, $data:ident => $body:expr) => {
        match $array {
            AttributeArray::Float32($data) => AttributeArray::Float32($body),
            AttributeArray::Float64($data) => AttributeArray::Float64($body),
            AttributeArray::Int8($data) => AttributeArray::Int8($body),
            AttributeArray::Uint8($data) => AttributeArray::Uint8($body),
            AttributeArray::Int16($data) => AttributeArray::Int16($body),
            AttributeArray::Uint16($data) => AttributeArray::Uint16($body),
            AttributeArray::Int32($data) => AttributeArray::Int32($body),
            AttributeArray::Uint32($data) => AttributeArray::Uint32($body),
        }
    };
}

impl AttributeArray {
    #[must_use]
    pub fn len(&self) -> usize {
        for_each_array!(self, data => data.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Float32(_) => "Float32",
            Self::Float64(_) => "Float64",
            Self::Int8(_) => "Int8",
            Self::Uint8(_) => "Uint8",
            Self::Int16(_) => "Int16",
            Self::Uint16(_) => "Uint16",
            Self::Int32(_) => "Int32",
            Self::Uint32(_) => "Uint32",
        }
    }

    /// Reads element `i` widened to `f64` (exact for every supported type).
    #[must_use]
    pub fn get(&self, i: usize) -> f64 {
        for_each_array!(self, data => f64::from(data[i]))
    }

    /// Writes element `i`, converting with `as` semantics for integer arrays.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn set(&mut self, i: usize, value: f64) {
        match self {
            Self::Float32(data) => data[i] = value as f32,
            Self::Float64(data) => data[i] = value,
            Self::Int8(data) => data[i] = value as i8,
            Self::Uint8(data) => data[i] = value as u8,
            Self::Int16(data) => data[i] = value as i16,
            Self::Uint16(data) => data[i] = value as u16,
            Self::Int32(data) => data[i] = value as i32,
            Self::Uint32(data) => data[i] = value as u32,
        }
    }

    /// Groups consecutive elements into triples, widened to `f64`.
    ///
    /// A trailing partial triple is ignored; callers validate lengths first.
    #[must_use]
    pub fn to_triples(&self) -> Vec<Vec3> {
        for_each_array!(self, data => data
            .chunks_exact(3)
            .map(|c| [f64::from(c[0]), f64::from(c[1]), f64::from(c[2])])
            .collect())
    }

    /// Copies whole items (runs of `item_size` elements) into a new array of
    /// the same element type, in the order given by `items`.
    #[must_use]
    pub fn gather(&self, item_size: usize, items: impl IntoIterator<Item = usize>) -> Self {
        let items = items.into_iter();
        map_array!(self, data => gather_items(data, item_size, items))
    }

    #[must_use]
    pub fn same_type(&self, other: &Self) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    fn append(&mut self, other: &Self) -> bool {
        match (self, other) {
            (Self::Float32(a), Self::Float32(b)) => a.extend_from_slice(b),
            (Self::Float64(a), Self::Float64(b)) => a.extend_from_slice(b),
            (Self::Int8(a), Self::Int8(b)) => a.extend_from_slice(b),
            (Self::Uint8(a), Self::Uint8(b)) => a.extend_from_slice(b),
            (Self::Int16(a), Self::Int16(b)) => a.extend_from_slice(b),
            (Self::Uint16(a), Self::Uint16(b)) => a.extend_from_slice(b),
            (Self::Int32(a), Self::Int32(b)) => a.extend_from_slice(b),
            (Self::Uint32(a), Self::Uint32(b)) => a.extend_from_slice(b),
            _ => return false,
        }
        true
    }
}

fn gather_items<T: Copy>(src: &[T], item_size: usize, items: impl Iterator<Item = usize>) -> Vec<T> {
    let (lower, _) = items.size_hint();
    let mut out = Vec::with_capacity(lower.saturating_mul(item_size));
    for item in items {
        let start = item * item_size;
        out.extend_from_slice(&src[start..start + item_size]);
    }
    out
}

/// An attribute that owns its array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferAttribute {
    pub array: AttributeArray,
    pub item_size: usize,
    #[serde(default)]
    pub normalized: bool,
}

impl BufferAttribute {
    #[must_use]
    pub fn new(array: AttributeArray, item_size: usize, normalized: bool) -> Self {
        Self {
            array,
            item_size,
            normalized,
        }
    }

    /// Number of vertices (items) stored.
    #[must_use]
    pub fn count(&self) -> usize {
        if self.item_size == 0 {
            0
        } else {
            self.array.len() / self.item_size
        }
    }

    fn same_layout(&self, other: &Self) -> bool {
        self.item_size == other.item_size
            && self.normalized == other.normalized
            && self.array.same_type(&other.array)
    }
}

/// Storage shared by several interleaved attributes; `stride` elements per vertex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterleavedBuffer {
    pub array: AttributeArray,
    pub stride: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterleavedBufferAttribute {
    pub data: Arc<InterleavedBuffer>,
    pub item_size: usize,
    pub offset: usize,
    #[serde(default)]
    pub normalized: bool,
}

impl InterleavedBufferAttribute {
    #[must_use]
    pub fn count(&self) -> usize {
        if self.data.stride == 0 {
            0
        } else {
            self.data.array.len() / self.data.stride
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "storage", rename_all = "camelCase")]
pub enum GeometryAttribute {
    Buffer(BufferAttribute),
    Interleaved(InterleavedBufferAttribute),
}

impl GeometryAttribute {
    #[must_use]
    pub fn item_size(&self) -> usize {
        match self {
            Self::Buffer(attr) => attr.item_size,
            Self::Interleaved(attr) => attr.item_size,
        }
    }

    #[must_use]
    pub fn normalized(&self) -> bool {
        match self {
            Self::Buffer(attr) => attr.normalized,
            Self::Interleaved(attr) => attr.normalized,
        }
    }

    #[must_use]
    pub fn count(&self) -> usize {
        match self {
            Self::Buffer(attr) => attr.count(),
            Self::Interleaved(attr) => attr.count(),
        }
    }

    #[must_use]
    pub fn as_buffer(&self) -> Option<&BufferAttribute> {
        match self {
            Self::Buffer(attr) => Some(attr),
            Self::Interleaved(_) => None,
        }
    }

    fn owned(&self, name: &str) -> Result<&BufferAttribute, BufferError> {
        self.as_buffer()
            .ok_or_else(|| BufferError::UnsupportedAttributeStorage {
                name: name.to_string(),
            })
    }
}

impl From<BufferAttribute> for GeometryAttribute {
    fn from(attr: BufferAttribute) -> Self {
        Self::Buffer(attr)
    }
}

impl From<InterleavedBufferAttribute> for GeometryAttribute {
    fn from(attr: InterleavedBufferAttribute) -> Self {
        Self::Interleaved(attr)
    }
}

/// Attributes keyed by name, in insertion order. Serializes as a map.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AttributeMap {
    entries: Vec<(String, GeometryAttribute)>,
}

impl AttributeMap {
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&GeometryAttribute> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, a)| a)
    }

    fn get_mut(&mut self, name: &str) -> Option<&mut GeometryAttribute> {
        self.entries.iter_mut().find(|(n, _)| n == name).map(|(_, a)| a)
    }

    #[must_use]
    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Replaces an existing attribute in place; new names go last.
    pub fn insert(&mut self, name: String, attribute: GeometryAttribute) {
        match self.get_mut(&name) {
            Some(slot) => *slot = attribute,
            None => self.entries.push((name, attribute)),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<GeometryAttribute> {
        let at = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(at).1)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &GeometryAttribute)> {
        self.entries.iter().map(|(n, a)| (n, a))
    }

    fn iter_mut(&mut self) -> impl Iterator<Item = (&String, &mut GeometryAttribute)> {
        self.entries.iter_mut().map(|(n, a)| (&*n, a))
    }
}

impl Serialize for AttributeMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

impl<'de> Deserialize<'de> for AttributeMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AttributeMapVisitor;

        impl<'de> Visitor<'de> for AttributeMapVisitor {
            type Value = AttributeMap;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of attribute names to attributes")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<AttributeMap, A::Error> {
                let mut map = AttributeMap::default();
                while let Some((name, attribute)) = access.next_entry::<String, GeometryAttribute>()? {
                    map.insert(name, attribute);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(AttributeMapVisitor)
    }
}

/// Named vertex attributes with an optional triangle index.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MeshBuffers {
    attributes: AttributeMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    index: Option<Vec<u32>>,
}

impl MeshBuffers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Non-indexed geometry with a single `Float32` position attribute.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_points(points: &[Vec3]) -> Self {
        let data = points
            .iter()
            .flat_map(|p| [p[0] as f32, p[1] as f32, p[2] as f32])
            .collect();
        let mut mesh = Self::new();
        mesh.set_attribute(
            POSITION,
            BufferAttribute::new(AttributeArray::Float32(data), 3, false),
        );
        mesh
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, attribute: impl Into<GeometryAttribute>) {
        self.attributes.insert(name.into(), attribute.into());
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<GeometryAttribute> {
        self.attributes.remove(name)
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&GeometryAttribute> {
        self.attributes.get(name)
    }

    #[must_use]
    pub fn attributes(&self) -> &AttributeMap {
        &self.attributes
    }

    #[must_use]
    pub fn position(&self) -> Option<&GeometryAttribute> {
        self.attribute(POSITION)
    }

    pub fn set_index(&mut self, index: Option<Vec<u32>>) {
        self.index = index;
    }

    #[must_use]
    pub fn index(&self) -> Option<&[u32]> {
        self.index.as_deref()
    }

    #[must_use]
    pub fn is_indexed(&self) -> bool {
        self.index.is_some()
    }

    /// Vertex count of the position attribute (0 without one).
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.position().map_or(0, GeometryAttribute::count)
    }

    /// Triangles described by the index, or by the position attribute when non-indexed.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        match &self.index {
            Some(index) => index.len() / 3,
            None => self.vertex_count() / 3,
        }
    }

    /// Returns an expanded, non-indexed copy. `self` is left untouched, and a
    /// mesh without an index is simply cloned.
    pub fn to_non_indexed(&self) -> Result<Self, BufferError> {
        let Some(index) = self.index.as_deref() else {
            return Ok(self.clone());
        };
        if index.len() % 3 != 0 {
            return Err(BufferError::MalformedIndexLength { len: index.len() });
        }

        let mut attributes = AttributeMap::default();
        for (name, attr) in self.attributes.iter() {
            let attr = attr.owned(name)?;
            let count = attr.count();
            if let Some(&bad) = index.iter().find(|&&i| i as usize >= count) {
                return Err(BufferError::IndexOutOfBounds { index: bad, count });
            }
            let array = attr
                .array
                .gather(attr.item_size, index.iter().map(|&i| i as usize));
            attributes.insert(
                name.clone(),
                GeometryAttribute::Buffer(BufferAttribute::new(array, attr.item_size, attr.normalized)),
            );
        }

        Ok(Self {
            attributes,
            index: None,
        })
    }

    /// Checks that this mesh is a well-formed triangle soup and returns its
    /// position attribute.
    ///
    /// The index is ignored; expand first with [`to_non_indexed`](Self::to_non_indexed).
    pub fn validate_triangle_soup(&self) -> Result<&BufferAttribute, BufferError> {
        let position = self
            .position()
            .ok_or(BufferError::MissingPositionAttribute)?;

        for (name, attr) in self.attributes.iter() {
            attr.owned(name)?;
        }

        let position = position.owned(POSITION)?;
        if position.item_size != 3 {
            return Err(malformed(POSITION, position));
        }
        for (name, attr) in self.attributes.iter() {
            let attr = attr.owned(name)?;
            let triangle_stride = attr.item_size * 3;
            if triangle_stride == 0 || attr.array.len() % triangle_stride != 0 {
                return Err(malformed(name, attr));
            }
        }

        let expected = position.count();
        for (name, attr) in self.attributes.iter() {
            let count = attr.count();
            if count != expected {
                return Err(BufferError::AttributeCountMismatch {
                    name: name.clone(),
                    count,
                    expected,
                });
            }
        }

        Ok(position)
    }

    /// Builds a non-indexed mesh holding the given triangles of `self`, in order,
    /// for every attribute. `self` must be a validated triangle soup.
    pub(crate) fn gather_triangles(&self, triangles: &[usize]) -> Result<Self, BufferError> {
        let mut attributes = AttributeMap::default();
        for (name, attr) in self.attributes.iter() {
            let attr = attr.owned(name)?;
            let array = attr
                .array
                .gather(attr.item_size * 3, triangles.iter().copied());
            attributes.insert(
                name.clone(),
                GeometryAttribute::Buffer(BufferAttribute::new(array, attr.item_size, attr.normalized)),
            );
        }
        Ok(Self {
            attributes,
            index: None,
        })
    }

    /// Translates positions in place.
    pub fn translate(&mut self, offset: Vec3) {
        self.apply_transform(Transform::translate(offset));
    }

    /// Transforms positions as points and a 3-component `normal` attribute as
    /// directions (re-normalized). Interleaved attributes are left untouched.
    pub fn apply_transform(&mut self, transform: Transform) {
        if let Some(GeometryAttribute::Buffer(position)) = self.attributes.get_mut(POSITION) {
            if position.item_size == 3 {
                map_triples(&mut position.array, |p| transform.apply_point(p));
            }
        }
        if let Some(GeometryAttribute::Buffer(normal)) = self.attributes.get_mut(NORMAL) {
            if normal.item_size == 3 {
                map_triples(&mut normal.array, |n| {
                    let n = transform.apply_vec(n);
                    normalized(n).unwrap_or(n)
                });
            }
        }
    }

    /// Concatenates geometries that share one attribute layout. Indexed inputs
    /// are expanded first, so the result is always non-indexed.
    pub fn merge(meshes: &[Self]) -> Result<Self, BufferError> {
        let mut iter = meshes.iter();
        let Some(first) = iter.next() else {
            return Ok(Self::new());
        };
        let mut merged = first.to_non_indexed()?;
        for (name, attr) in merged.attributes.iter() {
            attr.owned(name)?;
        }

        for mesh in iter {
            let mesh = mesh.to_non_indexed()?;
            if let Some(name) = mesh
                .attributes
                .keys()
                .find(|name| !merged.attributes.contains_key(name))
            {
                return Err(BufferError::IncompatibleAttributes { name: name.to_string() });
            }
            for (name, target) in merged.attributes.iter_mut() {
                let incompatible = || BufferError::IncompatibleAttributes { name: name.clone() };
                let source = mesh
                    .attributes
                    .get(name)
                    .ok_or_else(incompatible)?
                    .owned(name)?;
                let GeometryAttribute::Buffer(target) = target else {
                    return Err(BufferError::UnsupportedAttributeStorage { name: name.clone() });
                };
                if !target.same_layout(source) || !target.array.append(&source.array) {
                    return Err(incompatible());
                }
            }
        }

        Ok(merged)
    }
}

fn malformed(name: &str, attr: &BufferAttribute) -> BufferError {
    BufferError::MalformedAttributeLength {
        name: name.to_string(),
        len: attr.array.len(),
        item_size: attr.item_size,
    }
}

fn map_triples(array: &mut AttributeArray, f: impl Fn(Vec3) -> Vec3) {
    let vertex_count = array.len() / 3;
    for v in 0..vertex_count {
        let base = v * 3;
        let p = [array.get(base), array.get(base + 1), array.get(base + 2)];
        let q = f(p);
        for (axis, value) in q.into_iter().enumerate() {
            array.set(base + axis, value);
        }
    }
}

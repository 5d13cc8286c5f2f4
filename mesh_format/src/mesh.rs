use std::mem::size_of;
use std::path::Path;

use gfx_maths::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
    /// Aligned with increasing texture-u; zero until a tangent pass fills it.
    pub tangent: Vec3,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Face {
    pub indices: [u32; 3],
}

/// How the index data is to be interpreted. The pipeline only ever emits
/// triangle lists, but the variant is stored so consumers don't have to
/// assume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrimitiveTopology {
    TriangleList,
}

impl Default for PrimitiveTopology {
    fn default() -> Self {
        PrimitiveTopology::TriangleList
    }
}

/// Axis-aligned bounding box.
///
/// A box containing no points is in the explicit empty state (min above max
/// on every axis); check `is_empty` before reading `min`/`max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn empty() -> Self {
        Self {
            min: Vec3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            max: Vec3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x
    }

    pub fn grow(&mut self, point: Vec3) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.min.z = self.min.z.min(point.z);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
        self.max.z = self.max.z.max(point.z);
    }

    pub fn contains(&self, point: Vec3) -> bool {
        self.min.x <= point.x
            && self.min.y <= point.y
            && self.min.z <= point.z
            && point.x <= self.max.x
            && point.y <= self.max.y
            && point.z <= self.max.z
    }

    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = Vec3>,
    {
        let mut aabb = Self::empty();
        for point in points {
            aabb.grow(point);
        }
        aabb
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshData {
    pub name: Option<String>,
    pub vertices: Vec<Vertex>,
    pub faces: Vec<Face>,
    pub topology: PrimitiveTopology,
    pub bounds: Aabb,
}

impl MeshData {
    pub fn vertex_stride(&self) -> u32 {
        size_of::<Vertex>() as u32
    }

    pub fn index_count(&self) -> u32 {
        self.faces.len() as u32 * 3
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        Ok(bincode::deserialize::<MeshData>(&bytes)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        MeshData::from_bytes(data)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(&self)?)
    }
}

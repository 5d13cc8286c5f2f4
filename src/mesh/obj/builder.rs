use gfx_maths::*;
use log::debug;
use mesh_format::mesh::{Aabb, Face, MeshData, PrimitiveTopology, Vertex};

use super::meta::ObjMeta;
use crate::mesh::{tangent, weld::VertexWelder};

/// Zero-based indices into the attribute tables, one triple per polygon
/// corner.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub(crate) struct ObjCorner {
    pub(crate) pos_i: usize,
    pub(crate) uv_i: usize,
    pub(crate) normal_i: usize,
}

#[derive(Debug, Default, PartialEq)]
pub(crate) struct ObjFace {
    pub(crate) corners: Vec<ObjCorner>,
}

/// A corner index survived parsing but points past the end of its attribute
/// table. Reported with the 1-based index as written in the file.
#[derive(thiserror::Error, Debug)]
pub(crate) enum BuildError {
    #[error("Face references position {index}, but only {len} positions were defined.")]
    PositionOutOfRange { index: usize, len: usize },
    #[error("Face references texture coordinate {index}, but only {len} were defined.")]
    UvOutOfRange { index: usize, len: usize },
    #[error("Face references normal {index}, but only {len} normals were defined.")]
    NormalOutOfRange { index: usize, len: usize },
}

/// Accumulates the attribute tables and the face list while the parser walks
/// the file; consumed by `build_mesh`.
#[derive(Debug, Default)]
pub(crate) struct ObjMeshBuilder {
    pub(crate) name: Option<String>,
    pub(crate) positions: Vec<[f32; 3]>,
    pub(crate) uvs: Vec<[f32; 2]>,
    pub(crate) normals: Vec<[f32; 3]>,
    pub(crate) faces: Vec<ObjFace>,
    meta: ObjMeta,
}

impl ObjMeshBuilder {
    pub(crate) fn new(meta: ObjMeta) -> Self {
        Self {
            meta,
            ..Self::default()
        }
    }

    pub(crate) fn set_name(&mut self, name: &str) {
        self.name = if name.is_empty() {
            None
        } else {
            Some(name.into())
        };
    }

    pub(crate) fn push_position(&mut self, mut position: [f32; 3]) {
        // mirror along the axes marked in the meta file
        for n in 0..3 {
            if self.meta.flip_axis[n] {
                position[n] = -position[n];
            }
        }

        self.positions.push(position);
    }

    pub(crate) fn push_uv(&mut self, uv: [f32; 2]) {
        // obj stores uvs with a bottom-left origin; flip to top-left
        self.uvs.push([uv[0], 1.0 - uv[1]]);
    }

    pub(crate) fn push_normal(&mut self, mut normal: [f32; 3]) {
        // invert normals if necessary
        for n in 0..3 {
            if self.meta.flip_axis[n] {
                normal[n] = -normal[n];
            }
        }

        self.normals.push(normal);
    }

    pub(crate) fn push_face(&mut self, face: ObjFace) {
        self.faces.push(face);
    }

    pub(crate) fn build_mesh(self) -> Result<MeshData, BuildError> {
        // every parsed position counts toward the bounds, referenced or not
        let mut bounds = Aabb::empty();
        for position in &self.positions {
            bounds.grow((*position).into());
        }

        let mut welder = VertexWelder::new();
        let mut faces: Vec<Face> = Vec::new();

        for face in &self.faces {
            let mut fan: Vec<u32> = Vec::with_capacity(face.corners.len());

            for (i, corner) in face.corners.iter().enumerate() {
                let index = welder.weld(self.resolve(corner)?);

                // fan triangulation from the first corner; correct for
                // convex planar polygons only, concave input triangulates
                // without complaint but wrong
                if i > 1 {
                    debug!("Create triangle between {}, {}, {}", fan[0], fan[i - 1], index);
                    faces.push(Face {
                        indices: [fan[0], fan[i - 1], index],
                    });
                }

                fan.push(index);
            }
        }

        let mut mesh = MeshData {
            name: self.name,
            vertices: welder.into_vertices(),
            faces,
            topology: PrimitiveTopology::TriangleList,
            bounds,
        };

        if self.meta.calculate_tangents {
            tangent::generate_tangents(&mut mesh);
        }

        Ok(mesh)
    }

    // gathers one fully resolved vertex from the attribute tables; indices
    // are validated here so malformed files fail instead of panicking
    fn resolve(&self, corner: &ObjCorner) -> Result<Vertex, BuildError> {
        let position = self
            .positions
            .get(corner.pos_i)
            .ok_or_else(|| BuildError::PositionOutOfRange {
                index: corner.pos_i + 1,
                len: self.positions.len(),
            })?;
        let uv = self
            .uvs
            .get(corner.uv_i)
            .ok_or_else(|| BuildError::UvOutOfRange {
                index: corner.uv_i + 1,
                len: self.uvs.len(),
            })?;
        let normal = self
            .normals
            .get(corner.normal_i)
            .ok_or_else(|| BuildError::NormalOutOfRange {
                index: corner.normal_i + 1,
                len: self.normals.len(),
            })?;

        Ok(Vertex {
            position: (*position).into(),
            normal: (*normal).into(),
            uv: (*uv).into(),
            tangent: Vec3::zero(),
        })
    }
}

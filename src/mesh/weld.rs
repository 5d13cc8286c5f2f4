use std::collections::HashMap;

use mesh_format::mesh::Vertex;

/// Lookup key for exact-value vertex comparison. Floats are compared and
/// hashed by bit pattern, so two vertices only merge when every component
/// matches exactly; the whole tuple goes through the map's seeded hasher
/// instead of folding components together by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct VertexKey([u32; 11]);

impl From<&Vertex> for VertexKey {
    fn from(vertex: &Vertex) -> Self {
        Self([
            vertex.position.x.to_bits(),
            vertex.position.y.to_bits(),
            vertex.position.z.to_bits(),
            vertex.normal.x.to_bits(),
            vertex.normal.y.to_bits(),
            vertex.normal.z.to_bits(),
            vertex.uv.x.to_bits(),
            vertex.uv.y.to_bits(),
            vertex.tangent.x.to_bits(),
            vertex.tangent.y.to_bits(),
            vertex.tangent.z.to_bits(),
        ])
    }
}

/// Collapses identical vertex records into one shared entry.
///
/// Every `weld` call corresponds to one raw corner; the returned index points
/// into the unique vertex list, which keeps first-occurrence order.
#[derive(Debug, Default)]
pub(crate) struct VertexWelder {
    lookup: HashMap<VertexKey, u32>,
    vertices: Vec<Vertex>,
}

impl VertexWelder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn weld(&mut self, vertex: Vertex) -> u32 {
        let key = VertexKey::from(&vertex);

        if let Some(&index) = self.lookup.get(&key) {
            return index;
        }

        let index = self.vertices.len() as u32;
        self.vertices.push(vertex);
        self.lookup.insert(key, index);
        index
    }

    pub(crate) fn into_vertices(self) -> Vec<Vertex> {
        self.vertices
    }
}

#[cfg(test)]
mod test {
    use gfx_maths::*;
    use mesh_format::mesh::Vertex;

    use super::VertexWelder;

    fn vertex(x: f32) -> Vertex {
        Vertex {
            position: Vec3::new(x, 0.0, 0.0),
            normal: Vec3::new(0.0, 0.0, 1.0),
            uv: Vec2::new(x, 0.0),
            ..Vertex::default()
        }
    }

    #[test]
    fn equal_vertices_share_one_entry() {
        let mut welder = VertexWelder::new();

        assert_eq!(welder.weld(vertex(1.0)), 0);
        assert_eq!(welder.weld(vertex(2.0)), 1);
        assert_eq!(welder.weld(vertex(1.0)), 0);

        assert_eq!(welder.into_vertices().len(), 2);
    }

    #[test]
    fn unique_entries_keep_first_occurrence_order() {
        let mut welder = VertexWelder::new();
        for x in [3.0, 1.0, 3.0, 2.0, 1.0] {
            welder.weld(vertex(x));
        }

        let vertices = welder.into_vertices();
        let xs: Vec<f32> = vertices.iter().map(|v| v.position.x).collect();

        assert_eq!(xs, vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn welding_is_idempotent_on_unique_output() {
        let mut welder = VertexWelder::new();
        for x in [1.0, 2.0, 1.0, 3.0, 2.0] {
            welder.weld(vertex(x));
        }
        let unique = welder.into_vertices();

        // feeding the already-unique list through a fresh welder must map
        // every vertex onto itself
        let mut second = VertexWelder::new();
        for (index, v) in unique.iter().enumerate() {
            assert_eq!(second.weld(*v), index as u32);
        }

        assert_eq!(second.into_vertices(), unique);
    }

    #[test]
    fn comparison_is_bit_exact() {
        let mut welder = VertexWelder::new();

        let mut a = vertex(0.0);
        let mut b = vertex(0.0);
        a.uv = Vec2::new(0.0, 0.0);
        b.uv = Vec2::new(-0.0, 0.0);

        // -0.0 == 0.0 numerically, but the bit patterns differ, so no weld
        assert_eq!(welder.weld(a), 0);
        assert_eq!(welder.weld(b), 1);
    }

    #[test]
    fn permuted_components_do_not_collide() {
        let mut welder = VertexWelder::new();

        let mut a = vertex(0.0);
        a.position = Vec3::new(1.0, 2.0, 3.0);
        let mut b = vertex(0.0);
        b.position = Vec3::new(3.0, 2.0, 1.0);

        assert_eq!(welder.weld(a), 0);
        assert_eq!(welder.weld(b), 1);
    }
}

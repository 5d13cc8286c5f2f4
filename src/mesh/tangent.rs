use gfx_maths::*;
use log::debug;
use mesh_format::mesh::MeshData;

/// Derives per-vertex tangents from the triangle uv layout.
///
/// Runs over the welded, triangulated mesh: each triangle's tangent is the
/// image of the texture-u axis under its uv-to-position map, and the
/// per-vertex result is the normalized sum over all triangles sharing the
/// vertex. Triangles with a degenerate uv or position layout contribute
/// nothing; a vertex touched by no usable triangle keeps the zero tangent.
pub(crate) fn generate_tangents(mesh: &mut MeshData) {
    for vertex in &mut mesh.vertices {
        vertex.tangent = Vec3::zero();
    }

    for face in &mesh.faces {
        let [i0, i1, i2] = face.indices;
        let v0 = mesh.vertices[i0 as usize];
        let v1 = mesh.vertices[i1 as usize];
        let v2 = mesh.vertices[i2 as usize];

        // unit triangle to position space
        let edge0 = v1.position - v0.position;
        let edge1 = v2.position - v0.position;
        let normal = edge0.cross(edge1);
        let unit_to_position = Mat3::from_rows(edge0, edge1, normal);

        // unit triangle to uv space, padded with a synthetic z axis
        let uv_edge0 = v1.uv - v0.uv;
        let uv_edge1 = v2.uv - v0.uv;
        let unit_to_uv = Mat3::from_rows(
            Vec3::new(uv_edge0.x, uv_edge0.y, 0.0),
            Vec3::new(uv_edge1.x, uv_edge1.y, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
        );

        // a zero-area uv triangle has no invertible mapping and simply does
        // not contribute
        let uv_to_position = match unit_to_uv.inverse() {
            Some(inverse) => inverse.mul(&unit_to_position),
            None => {
                debug!(
                    "No tangent for triangle {:?}: degenerate uv layout",
                    face.indices
                );
                continue;
            }
        };

        // the image of the texture-u axis is the tangent
        let mut tangent = uv_to_position.rows[0];
        if tangent.sqr_magnitude() <= f32::EPSILON {
            debug!(
                "No tangent for triangle {:?}: degenerate positions",
                face.indices
            );
            continue;
        }
        tangent.normalize();

        mesh.vertices[i0 as usize].tangent += tangent;
        mesh.vertices[i1 as usize].tangent += tangent;
        mesh.vertices[i2 as usize].tangent += tangent;
    }

    // average the per-triangle contributions
    for vertex in &mut mesh.vertices {
        if vertex.tangent.sqr_magnitude() > 0.0 {
            vertex.tangent.normalize();
        }
    }
}

/// Row-major 3x3 matrix for the tangent basis solve; gfx-maths only ships a
/// 4x4 type.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Mat3 {
    rows: [Vec3; 3],
}

impl Mat3 {
    fn from_rows(r0: Vec3, r1: Vec3, r2: Vec3) -> Self {
        Self { rows: [r0, r1, r2] }
    }

    fn determinant(&self) -> f32 {
        self.rows[0].dot(self.rows[1].cross(self.rows[2]))
    }

    // adjugate inverse; None when the matrix is singular
    fn inverse(&self) -> Option<Mat3> {
        let det = self.determinant();
        if det.abs() <= f32::EPSILON {
            return None;
        }
        let inv_det = 1.0 / det;

        let [r0, r1, r2] = self.rows;
        // the columns of the inverse are the row cross products over the
        // determinant
        let c0 = r1.cross(r2) * inv_det;
        let c1 = r2.cross(r0) * inv_det;
        let c2 = r0.cross(r1) * inv_det;

        Some(Mat3::from_rows(
            Vec3::new(c0.x, c1.x, c2.x),
            Vec3::new(c0.y, c1.y, c2.y),
            Vec3::new(c0.z, c1.z, c2.z),
        ))
    }

    fn mul(&self, other: &Mat3) -> Mat3 {
        let [o0, o1, o2] = other.rows;
        let row = |r: Vec3| o0 * r.x + o1 * r.y + o2 * r.z;

        Mat3::from_rows(row(self.rows[0]), row(self.rows[1]), row(self.rows[2]))
    }
}

#[cfg(test)]
mod test {
    use gfx_maths::*;
    use mesh_format::mesh::{Aabb, Face, MeshData, PrimitiveTopology, Vertex};

    use super::{generate_tangents, Mat3};

    fn vertex(position: Vec3, uv: Vec2) -> Vertex {
        Vertex {
            position,
            normal: Vec3::new(0.0, 0.0, 1.0),
            uv,
            ..Vertex::default()
        }
    }

    fn quad(uvs: [Vec2; 4]) -> MeshData {
        let positions = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];

        MeshData {
            name: None,
            vertices: positions
                .iter()
                .zip(uvs.iter())
                .map(|(&p, &uv)| vertex(p, uv))
                .collect(),
            faces: vec![
                Face { indices: [0, 1, 2] },
                Face { indices: [0, 2, 3] },
            ],
            topology: PrimitiveTopology::TriangleList,
            bounds: Aabb::from_points(positions.iter().copied()),
        }
    }

    fn assert_close(a: Vec3, b: Vec3) {
        assert!(
            (a - b).sqr_magnitude() < 1e-10,
            "expected {:?}, got {:?}",
            b,
            a
        );
    }

    #[test]
    fn mat3_inverse_times_self_is_identity() {
        let m = Mat3::from_rows(
            Vec3::new(2.0, 0.0, 1.0),
            Vec3::new(0.0, 3.0, 0.0),
            Vec3::new(1.0, 0.0, 1.0),
        );
        let product = m.inverse().unwrap().mul(&m);

        assert_close(product.rows[0], Vec3::new(1.0, 0.0, 0.0));
        assert_close(product.rows[1], Vec3::new(0.0, 1.0, 0.0));
        assert_close(product.rows[2], Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn mat3_singular_has_no_inverse() {
        // second row is a multiple of the first
        let m = Mat3::from_rows(
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(2.0, 4.0, 6.0),
            Vec3::new(0.0, 0.0, 1.0),
        );

        assert!(m.inverse().is_none());
    }

    #[test]
    fn axis_aligned_quad_gets_x_tangents() {
        // uvs follow the xy layout of the quad, so increasing u is +x
        let mut mesh = quad([
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ]);

        generate_tangents(&mut mesh);

        for vertex in &mesh.vertices {
            assert_close(vertex.tangent, Vec3::new(1.0, 0.0, 0.0));
        }
    }

    #[test]
    fn rotated_uvs_rotate_the_tangent() {
        // u and v are swapped, so increasing u runs along +y
        let mut mesh = quad([
            Vec2::new(0.0, 0.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, 0.0),
        ]);

        generate_tangents(&mut mesh);

        for vertex in &mesh.vertices {
            assert_close(vertex.tangent, Vec3::new(0.0, 1.0, 0.0));
        }
    }

    #[test]
    fn degenerate_uvs_leave_zero_tangents() {
        // every corner maps to the same uv; no triangle contributes
        let uv = Vec2::new(0.5, 0.5);
        let mut mesh = quad([uv, uv, uv, uv]);

        generate_tangents(&mut mesh);

        for vertex in &mesh.vertices {
            assert_eq!(vertex.tangent, Vec3::zero());
        }
    }

    #[test]
    fn degenerate_triangle_does_not_poison_shared_vertices() {
        // first triangle has a proper uv layout, second collapses to a point
        let mut mesh = quad([
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, 1.0),
        ]);

        generate_tangents(&mut mesh);

        // vertices of the good triangle keep a finite, normalized tangent
        for index in [0usize, 1, 2] {
            let tangent = mesh.vertices[index].tangent;
            assert!(tangent.x.is_finite());
            assert_close(tangent, Vec3::new(1.0, 0.0, 0.0));
        }
        // the vertex only touched by the degenerate triangle stays zero
        assert_eq!(mesh.vertices[3].tangent, Vec3::zero());
    }
}

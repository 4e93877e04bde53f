use glam::Vec3;

use super::IoError;
use crate::render::Vertex;

/// Imported mesh attributes, one entry per vertex.
///
/// Normals and texture coordinates may be empty; missing attributes are
/// zero-filled when interleaving.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub name: String,
    pub vertices: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uv0: Vec<[f32; 2]>,
    pub indices: Vec<u16>,
}

impl MeshData {
    /// Interleaves the attributes into GPU vertices.
    pub fn to_vertices(&self) -> Result<Vec<Vertex>, IoError> {
        let n = self.vertices.len();
        self.check_len("normals", self.normals.len())?;
        self.check_len("uv0", self.uv0.len())?;

        if let Some(&index) = self.indices.iter().find(|&&i| i as usize >= n) {
            return Err(IoError::IndexOutOfRange {
                name: self.name.clone(),
                index,
                vertices: n,
            });
        }

        Ok((0..n)
            .map(|i| Vertex {
                position: self.vertices[i],
                normal: self.normals.get(i).copied().unwrap_or_default(),
                uv: self.uv0.get(i).copied().unwrap_or_default(),
            })
            .collect())
    }

    fn check_len(&self, attribute: &'static str, found: usize) -> Result<(), IoError> {
        if found != 0 && found != self.vertices.len() {
            return Err(IoError::AttributeMismatch {
                name: self.name.clone(),
                attribute,
                expected: self.vertices.len(),
                found,
            });
        }
        Ok(())
    }

    /// Appends one planar face given its corners in counter-clockwise order.
    fn push_face(&mut self, corners: &[Vec3], uvs: &[[f32; 2]]) {
        let base = self.vertices.len() as u16;
        let normal = (corners[1] - corners[0])
            .cross(corners[2] - corners[0])
            .normalize_or_zero();

        for (c, uv) in corners.iter().zip(uvs) {
            self.vertices.push(c.to_array());
            self.normals.push(normal.to_array());
            self.uv0.push(*uv);
        }
        for i in 1..corners.len() as u16 - 1 {
            self.indices.extend_from_slice(&[base, base + i, base + i + 1]);
        }
    }

    /// Unit quad in the XY plane facing +Z.
    pub fn quad(name: impl Into<String>, half_extent: f32) -> Self {
        let h = half_extent;
        let mut mesh = Self {
            name: name.into(),
            ..Self::default()
        };
        mesh.push_face(
            &[
                Vec3::new(-h, -h, 0.0),
                Vec3::new(h, -h, 0.0),
                Vec3::new(h, h, 0.0),
                Vec3::new(-h, h, 0.0),
            ],
            &QUAD_UV,
        );
        mesh
    }

    /// Axis-aligned cube centered on the origin with flat-shaded faces.
    pub fn cube(name: impl Into<String>, half_extent: f32) -> Self {
        let h = half_extent;
        let p = |x: f32, y: f32, z: f32| Vec3::new(x * h, y * h, z * h);
        let mut mesh = Self {
            name: name.into(),
            ..Self::default()
        };

        let faces = [
            [p(-1., -1., 1.), p(1., -1., 1.), p(1., 1., 1.), p(-1., 1., 1.)],
            [p(1., -1., -1.), p(-1., -1., -1.), p(-1., 1., -1.), p(1., 1., -1.)],
            [p(1., -1., 1.), p(1., -1., -1.), p(1., 1., -1.), p(1., 1., 1.)],
            [p(-1., -1., -1.), p(-1., -1., 1.), p(-1., 1., 1.), p(-1., 1., -1.)],
            [p(-1., 1., 1.), p(1., 1., 1.), p(1., 1., -1.), p(-1., 1., -1.)],
            [p(-1., -1., -1.), p(1., -1., -1.), p(1., -1., 1.), p(-1., -1., 1.)],
        ];
        for face in &faces {
            mesh.push_face(face, &QUAD_UV);
        }
        mesh
    }

    /// Square pyramid with its base on z = -h and apex on +Z.
    pub fn pyramid(name: impl Into<String>, half_extent: f32) -> Self {
        let h = half_extent;
        let apex = Vec3::new(0.0, 0.0, h);
        let b = [
            Vec3::new(-h, -h, -h),
            Vec3::new(h, -h, -h),
            Vec3::new(h, h, -h),
            Vec3::new(-h, h, -h),
        ];
        let mut mesh = Self {
            name: name.into(),
            ..Self::default()
        };

        mesh.push_face(&[b[3], b[2], b[1], b[0]], &QUAD_UV);
        for i in 0..4 {
            let (a, c) = (b[i], b[(i + 1) % 4]);
            mesh.push_face(&[a, c, apex], &[[0.0, 1.0], [1.0, 1.0], [0.5, 0.0]]);
        }
        mesh
    }
}

const QUAD_UV: [[f32; 2]; 4] = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];

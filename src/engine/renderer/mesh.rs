// Geometry for the built-in primitives

use glam::Vec3;

use super::Vertex;

/// Slices and stacks of the generated sphere
pub const SPHERE_SEGMENTS: u16 = 18;

/// Indexed triangle list
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u16>,
}

impl MeshData {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Corner positions of each triangle
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).map(move |t| {
            [
                self.vertices[t[0] as usize].position(),
                self.vertices[t[1] as usize].position(),
                self.vertices[t[2] as usize].position(),
            ]
        })
    }
}

/// Unit normal of the triangle `p1, p2, p3` (counter-clockwise front face)
///
/// Degenerate triangles give the zero vector.
pub fn face_normal(p1: Vec3, p2: Vec3, p3: Vec3) -> Vec3 {
    (p2 - p1).cross(p3 - p1).normalize_or_zero()
}

/// Unit cube centered on the origin, flat-shaded
pub fn cube() -> MeshData {
    // Face normal with two edge directions whose cross product is the normal
    let faces = [
        (Vec3::X, Vec3::Y, Vec3::Z),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::Z, Vec3::X),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::Y, Vec3::X),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, u, v) in faces {
        let center = normal * 0.5;
        let corners = [
            center - u * 0.5 - v * 0.5,
            center + u * 0.5 - v * 0.5,
            center + u * 0.5 + v * 0.5,
            center - u * 0.5 + v * 0.5,
        ];
        let shading = face_normal(corners[0], corners[1], corners[2]);

        let base = vertices.len() as u16;
        vertices.extend(corners.iter().map(|c| Vertex::new(*c, shading)));
        indices.extend([base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    MeshData { vertices, indices }
}

/// Sphere of radius 0.5 centered on the origin, smooth-shaded
pub fn sphere(segments: u16) -> MeshData {
    let segments = segments.max(3);
    let radius = 0.5;
    let ring = segments + 1;

    let mut vertices = Vec::with_capacity(ring as usize * ring as usize);
    for stack in 0..=segments {
        let phi = std::f32::consts::PI * stack as f32 / segments as f32;
        // Keep both poles exact so their rings collapse to a single point
        let sin_phi = phi.sin().max(0.0);
        for slice in 0..=segments {
            let theta = std::f32::consts::TAU * slice as f32 / segments as f32;
            let normal = Vec3::new(sin_phi * theta.cos(), phi.cos(), sin_phi * theta.sin());
            vertices.push(Vertex::new(normal * radius, normal));
        }
    }

    let mut indices = Vec::with_capacity(segments as usize * segments as usize * 6);
    for stack in 0..segments {
        for slice in 0..segments {
            let a = stack * ring + slice;
            let b = a + ring;
            indices.extend([a, a + 1, b, a + 1, b + 1, b]);
        }
    }

    MeshData { vertices, indices }
}

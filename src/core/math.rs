// Conversions between glam and the physics backend's nalgebra types

use glam::{Mat3, Quat, Vec3};
use rapier3d::math::{Real, Rotation, Vector};
use rapier3d::na;

/// Convert a glam vector into a physics vector
pub fn to_physics_vector(v: Vec3) -> Vector<Real> {
    Vector::new(v.x, v.y, v.z)
}

/// Convert a physics vector into a glam vector
pub fn from_physics_vector(v: &Vector<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

/// Convert a rotation matrix into the physics backend's unit quaternion
pub fn to_physics_rotation(m: Mat3) -> Rotation<Real> {
    let q = Quat::from_mat3(&m).normalize();
    na::UnitQuaternion::from_quaternion(na::Quaternion::new(q.w, q.x, q.y, q.z))
}

/// Convert the physics backend's unit quaternion into a rotation matrix
pub fn from_physics_rotation(r: &Rotation<Real>) -> Mat3 {
    let c = r.quaternion().coords;
    Mat3::from_quat(Quat::from_xyzw(c[0], c[1], c[2], c[3]))
}

/// Build a rotation matrix from 9 scalars in row-major order
pub fn mat3_from_rows(rows: [f32; 9]) -> Mat3 {
    Mat3::from_cols_array(&rows).transpose()
}

/// Flatten a rotation matrix into 9 scalars in row-major order
pub fn mat3_to_rows(m: Mat3) -> [f32; 9] {
    m.transpose().to_cols_array()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rotation_survives_physics_conversion() {
        let m = Mat3::from_rotation_y(0.7) * Mat3::from_rotation_x(-0.3);
        let back = from_physics_rotation(&to_physics_rotation(m));
        for (a, b) in m.to_cols_array().iter().zip(back.to_cols_array().iter()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_row_major_layout() {
        let rows = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0];
        let m = mat3_from_rows(rows);
        // First row is (1, 2, 3), so the first column starts with 1, 4, 7
        assert_eq!(m.x_axis, Vec3::new(1.0, 4.0, 7.0));
        assert_eq!(mat3_to_rows(m), rows);
    }
}

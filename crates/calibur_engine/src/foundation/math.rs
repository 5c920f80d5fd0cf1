//! Math utilities and types
//!
//! Provides fundamental math types for 3D graphics. All projection helpers use
//! the conventional (non-reversed) depth range: near maps to -1, far to +1.

pub use nalgebra::{Matrix4, Quaternion, Unit, Vector3, Vector4};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Column-major matrix layout as uploaded to uniform blocks
pub type GpuMat4 = [[f32; 4]; 4];

/// Transform representing position, rotation, and scale
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Position in 3D space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Builder-style scale override
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Builder-style rotation override
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Convert to a transformation matrix
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }
}

/// Convert a matrix into the column-major array layout shaders expect
pub fn to_gpu(matrix: &Mat4) -> GpuMat4 {
    (*matrix).into()
}

/// Pack a vector and a fourth component into a `vec4` slot
pub fn pack_vec4(v: &Vec3, w: f32) -> [f32; 4] {
    [v.x, v.y, v.z, w]
}

/// Pick an up vector that is not parallel to `direction`
pub fn stable_up(direction: &Vec3) -> Vec3 {
    let up = Vec3::y();
    if direction.normalize().dot(&up).abs() > 0.999 {
        Vec3::z()
    } else {
        up
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_transform_matrix_applies_translation_and_scale() {
        let transform = Transform::from_position(Vec3::new(1.0, 2.0, 3.0))
            .with_scale(Vec3::new(2.0, 2.0, 2.0));
        let p = transform.to_matrix().transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p, Point3::new(3.0, 2.0, 3.0), epsilon = 1e-6);
    }

    #[test]
    fn test_gpu_layout_is_column_major() {
        let m = Mat4::new_translation(&Vec3::new(4.0, 5.0, 6.0));
        let gpu = to_gpu(&m);
        assert_eq!(gpu[3][0], 4.0);
        assert_eq!(gpu[3][1], 5.0);
        assert_eq!(gpu[3][2], 6.0);
    }

    #[test]
    fn test_stable_up_avoids_parallel_direction() {
        assert_eq!(stable_up(&Vec3::new(0.0, -1.0, 0.0)), Vec3::z());
        assert_eq!(stable_up(&Vec3::new(1.0, -1.0, 0.0)), Vec3::y());
    }
}

//! Math utilities and types
//!
//! Thin aliases over nalgebra plus the handful of matrix builders the renderer
//! needs for a right-handed, Y-up world rendered through Vulkan clip space.

pub use nalgebra::{Matrix3, Matrix4, Vector2, Vector3, Vector4};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Math utility functions
pub mod utils {
    use super::Vec3;

    /// Convert degrees to radians
    #[must_use]
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees.to_radians()
    }

    /// Linear interpolation between two colors or positions
    #[must_use]
    pub fn lerp_vec3(a: &Vec3, b: &Vec3, t: f32) -> Vec3 {
        a * (1.0 - t) + b * t
    }
}

/// Extension trait for Mat4 with additional convenience methods
pub trait Mat4Ext {
    /// Create a rotation matrix around the Y axis
    fn rotation_y(angle: f32) -> Mat4;

    /// Right-handed look-at view matrix (camera looks down -Z in view space)
    fn look_at(eye: &Vec3, target: &Vec3, up: &Vec3) -> Mat4;

    /// Perspective projection into Vulkan clip space
    ///
    /// Depth maps to `[0, 1]` and the Y axis is flipped so that +Y in view
    /// space ends up at the top of the framebuffer.
    fn perspective_vulkan(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4;

    /// Inverse-transpose of the upper 3x3, widened back to 4x4 for std140 upload
    fn normal_matrix(&self) -> Mat4;

    /// Column-major array layout expected by GLSL uniform blocks
    fn to_cols_array(&self) -> [[f32; 4]; 4];
}

impl Mat4Ext for Mat4 {
    fn rotation_y(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::y_axis(), angle)
    }

    fn look_at(eye: &Vec3, target: &Vec3, up: &Vec3) -> Mat4 {
        let forward = (target - eye).normalize();
        let right = forward.cross(up).normalize();
        let camera_up = right.cross(&forward);

        let translation = Mat4::new(
            1.0, 0.0, 0.0, -eye.x,
            0.0, 1.0, 0.0, -eye.y,
            0.0, 0.0, 1.0, -eye.z,
            0.0, 0.0, 0.0, 1.0,
        );

        let rotation = Mat4::new(
            right.x, right.y, right.z, 0.0,
            camera_up.x, camera_up.y, camera_up.z, 0.0,
            -forward.x, -forward.y, -forward.z, 0.0,
            0.0, 0.0, 0.0, 1.0,
        );

        rotation * translation
    }

    fn perspective_vulkan(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        let focal = 1.0 / (fov_y * 0.5).tan();

        let mut result = Mat4::zeros();
        result[(0, 0)] = focal / aspect;
        result[(1, 1)] = -focal;
        result[(2, 2)] = far / (near - far);
        result[(2, 3)] = (near * far) / (near - far);
        result[(3, 2)] = -1.0;
        result
    }

    fn normal_matrix(&self) -> Mat4 {
        let upper: Mat3 = self.fixed_view::<3, 3>(0, 0).into_owned();
        let inverse_transpose = upper.try_inverse().unwrap_or_else(Mat3::identity).transpose();
        inverse_transpose.to_homogeneous()
    }

    fn to_cols_array(&self) -> [[f32; 4]; 4] {
        (*self).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn project(m: &Mat4, p: Vec3) -> Vec3 {
        let clip = m * Vec4::new(p.x, p.y, p.z, 1.0);
        Vec3::new(clip.x / clip.w, clip.y / clip.w, clip.z / clip.w)
    }

    #[test]
    fn test_perspective_maps_near_and_far_to_unit_depth() {
        let proj = Mat4::perspective_vulkan(utils::deg_to_rad(45.0), 16.0 / 9.0, 0.1, 100.0);

        assert_relative_eq!(project(&proj, Vec3::new(0.0, 0.0, -0.1)).z, 0.0, epsilon = 1e-5);
        assert_relative_eq!(project(&proj, Vec3::new(0.0, 0.0, -100.0)).z, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_perspective_flips_y_for_vulkan() {
        let proj = Mat4::perspective_vulkan(utils::deg_to_rad(90.0), 1.0, 0.1, 10.0);
        let above = project(&proj, Vec3::new(0.0, 1.0, -2.0));
        assert!(above.y < 0.0, "view-space up should land in negative NDC y");
    }

    #[test]
    fn test_look_at_moves_eye_to_origin_and_target_down_negative_z() {
        let eye = Vec3::new(2.0, 1.5, 4.0);
        let target = Vec3::zeros();
        let view = Mat4::look_at(&eye, &target, &Vec3::y());

        let eye_view = view.transform_point(&eye.into());
        assert_relative_eq!(eye_view.coords, Vec3::zeros(), epsilon = 1e-5);

        let target_view = view.transform_point(&target.into());
        assert_relative_eq!(target_view.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(target_view.y, 0.0, epsilon = 1e-5);
        assert_relative_eq!(target_view.z, -eye.norm(), epsilon = 1e-5);
    }

    #[test]
    fn test_normal_matrix_of_rotation_is_rotation() {
        let model = Mat4::rotation_y(utils::deg_to_rad(-90.0));
        assert_relative_eq!(model.normal_matrix(), model, epsilon = 1e-5);
    }

    #[test]
    fn test_normal_matrix_undoes_non_uniform_scale() {
        let model = Mat4::new_nonuniform_scaling(&Vec3::new(2.0, 1.0, 1.0));
        let normal = model.normal_matrix();
        assert_relative_eq!(normal[(0, 0)], 0.5, epsilon = 1e-6);
        assert_relative_eq!(normal[(1, 1)], 1.0, epsilon = 1e-6);
    }
}

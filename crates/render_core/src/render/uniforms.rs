//! Uniform blocks shared with the shaders
//!
//! Layouts follow std140: every `vec3` is padded to 16 bytes and matrices are
//! column-major `[[f32; 4]; 4]`.

use ash::vk;
use bytemuck::{Pod, Zeroable};
use std::marker::PhantomData;
use std::mem::size_of;

use crate::config::{LightConfig, MaterialConfig};
use crate::foundation::math::{Mat4, Mat4Ext, Vec3};
use crate::render::vulkan::{Buffer, VulkanContext, VulkanResult};

/// Per-frame transforms for the mesh pipeline (binding 0)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SceneUniforms {
    /// Object to world
    pub model: [[f32; 4]; 4],
    /// World to camera
    pub view: [[f32; 4]; 4],
    /// Camera to clip, Vulkan conventions
    pub proj: [[f32; 4]; 4],
    /// Inverse-transpose of the model matrix
    pub normal_matrix: [[f32; 4]; 4],
    /// World-space eye position
    pub camera_pos: [f32; 3],
    _pad: f32,
}

impl SceneUniforms {
    /// Assemble from matrices; the normal matrix is derived from `model`
    #[must_use]
    pub fn new(model: &Mat4, view: &Mat4, proj: &Mat4, camera_pos: &Vec3) -> Self {
        Self {
            model: model.to_cols_array(),
            view: view.to_cols_array(),
            proj: proj.to_cols_array(),
            normal_matrix: model.normal_matrix().to_cols_array(),
            camera_pos: [camera_pos.x, camera_pos.y, camera_pos.z],
            _pad: 0.0,
        }
    }
}

impl Default for SceneUniforms {
    fn default() -> Self {
        let identity = Mat4::identity();
        Self::new(&identity, &identity, &identity, &Vec3::zeros())
    }
}

/// Metallic-roughness material parameters (binding 1)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PbrParams {
    /// Base color multiplier
    pub albedo: [f32; 3],
    /// 0 = dielectric, 1 = metal
    pub metallic: f32,
    /// Perceptual roughness
    pub roughness: f32,
    /// Ambient occlusion factor
    pub ao: f32,
    _pad: [f32; 2],
}

impl PbrParams {
    /// Build from explicit values
    #[must_use]
    pub const fn new(albedo: [f32; 3], metallic: f32, roughness: f32, ao: f32) -> Self {
        Self {
            albedo,
            metallic,
            roughness,
            ao,
            _pad: [0.0; 2],
        }
    }
}

impl Default for PbrParams {
    fn default() -> Self {
        Self::from(&MaterialConfig::default())
    }
}

impl From<&MaterialConfig> for PbrParams {
    fn from(config: &MaterialConfig) -> Self {
        Self::new(config.albedo, config.metallic, config.roughness, config.ao)
    }
}

/// Single point light (binding 2)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LightUniforms {
    /// World-space position
    pub position: [f32; 3],
    _pad0: f32,
    /// Radiant intensity per channel
    pub color: [f32; 3],
    _pad1: f32,
}

impl LightUniforms {
    /// Light at `position` with `color`
    #[must_use]
    pub const fn new(position: [f32; 3], color: [f32; 3]) -> Self {
        Self {
            position,
            _pad0: 0.0,
            color,
            _pad1: 0.0,
        }
    }
}

impl Default for LightUniforms {
    fn default() -> Self {
        Self::from(&LightConfig::default())
    }
}

impl From<&LightConfig> for LightUniforms {
    fn from(config: &LightConfig) -> Self {
        Self::new(config.position, config.color)
    }
}

/// Camera matrices for the skybox pass
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SkyboxUniforms {
    /// World to camera; the shader drops the translation
    pub view: [[f32; 4]; 4],
    /// Camera to clip
    pub projection: [[f32; 4]; 4],
}

impl SkyboxUniforms {
    /// Assemble from camera matrices
    #[must_use]
    pub fn new(view: &Mat4, projection: &Mat4) -> Self {
        Self {
            view: view.to_cols_array(),
            projection: projection.to_cols_array(),
        }
    }
}

/// Host-visible uniform buffer holding one `T`
///
/// Each update maps, copies and unmaps.
pub struct UniformBuffer<T: Pod> {
    buffer: Buffer,
    _marker: PhantomData<T>,
}

impl<T: Pod> UniformBuffer<T> {
    /// Allocate and fill with `initial`
    ///
    /// # Errors
    ///
    /// Propagates buffer creation failures.
    pub fn new(context: &VulkanContext, initial: &T) -> VulkanResult<Self> {
        let buffer = Buffer::new(
            context,
            size_of::<T>() as vk::DeviceSize,
            vk::BufferUsageFlags::UNIFORM_BUFFER,
            vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT,
        )?;
        let uniform = Self {
            buffer,
            _marker: PhantomData,
        };
        uniform.update(initial)?;
        Ok(uniform)
    }

    /// Overwrite the contents
    ///
    /// # Errors
    ///
    /// Propagates mapping failures.
    pub fn update(&self, value: &T) -> VulkanResult<()> {
        self.buffer.write(0, bytemuck::bytes_of(value))
    }

    /// Descriptor info covering the whole block
    #[must_use]
    pub fn descriptor_info(&self) -> vk::DescriptorBufferInfo {
        vk::DescriptorBufferInfo {
            buffer: self.buffer.handle(),
            offset: 0,
            range: size_of::<T>() as vk::DeviceSize,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::mem::offset_of;

    #[test]
    fn test_std140_sizes_and_offsets() {
        assert_eq!(size_of::<SceneUniforms>(), 272);
        assert_eq!(offset_of!(SceneUniforms, normal_matrix), 192);
        assert_eq!(offset_of!(SceneUniforms, camera_pos), 256);

        assert_eq!(size_of::<PbrParams>(), 32);
        assert_eq!(offset_of!(PbrParams, metallic), 12);
        assert_eq!(offset_of!(PbrParams, roughness), 16);
        assert_eq!(offset_of!(PbrParams, ao), 20);

        assert_eq!(size_of::<LightUniforms>(), 32);
        assert_eq!(offset_of!(LightUniforms, color), 16);

        assert_eq!(size_of::<SkyboxUniforms>(), 128);
    }

    #[test]
    fn test_scene_uniforms_normal_matrix_for_rotation_is_rotation() {
        let model = Mat4::rotation_y(-90.0_f32.to_radians());
        let identity = Mat4::identity();
        let uniforms = SceneUniforms::new(&model, &identity, &identity, &Vec3::new(1.0, 2.0, 3.0));

        for (col_n, col_m) in uniforms.normal_matrix.iter().zip(uniforms.model.iter()) {
            for (n, m) in col_n.iter().zip(col_m.iter()) {
                assert_relative_eq!(n, m, epsilon = 1e-5);
            }
        }
        assert_eq!(uniforms.camera_pos, [1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_scene_uniforms_normal_matrix_undoes_nonuniform_scale() {
        let model = Mat4::new_nonuniform_scaling(&Vec3::new(2.0, 1.0, 1.0));
        let identity = Mat4::identity();
        let uniforms = SceneUniforms::new(&model, &identity, &identity, &Vec3::zeros());

        assert_relative_eq!(uniforms.normal_matrix[0][0], 0.5, epsilon = 1e-6);
        assert_relative_eq!(uniforms.normal_matrix[1][1], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_config_conversions() {
        let pbr = PbrParams::default();
        assert_eq!(pbr.albedo, [1.0, 1.0, 1.0]);
        assert_relative_eq!(pbr.roughness, 0.5);
        assert_relative_eq!(pbr.ao, 1.0);

        let light = LightUniforms::default();
        assert_eq!(light.position, [10.0, 10.0, 10.0]);
        assert_eq!(light.color, [300.0, 300.0, 300.0]);
    }
}

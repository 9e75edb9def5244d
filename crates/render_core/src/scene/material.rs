//! PBR material: uniforms, albedo texture and their descriptor sets
//!
//! Set layout:
//!
//! | binding | contents          | stages            |
//! |---------|-------------------|-------------------|
//! | 0       | `SceneUniforms`   | vertex + fragment |
//! | 1       | `PbrParams`       | fragment          |
//! | 2       | `LightUniforms`   | fragment          |
//! | 3       | albedo sampler    | fragment          |
//!
//! The scene block changes every frame, so each frame-in-flight slot has its
//! own buffer and descriptor set. Material and light blocks are shared.

use ash::{vk, Device};

use crate::render::descriptors::{DescriptorPool, DescriptorSetLayout, DescriptorSetLayoutBuilder, DescriptorWriter};
use crate::render::uniforms::{LightUniforms, PbrParams, SceneUniforms, UniformBuffer};
use crate::render::vulkan::{ActiveRenderPass, VulkanContext, VulkanError, VulkanResult};
use crate::scene::texture::Texture;

/// Bindings of the material set
#[must_use]
pub fn layout_builder() -> DescriptorSetLayoutBuilder {
    DescriptorSetLayoutBuilder::new()
        .uniform_buffer(0, vk::ShaderStageFlags::VERTEX | vk::ShaderStageFlags::FRAGMENT)
        .uniform_buffer(1, vk::ShaderStageFlags::FRAGMENT)
        .uniform_buffer(2, vk::ShaderStageFlags::FRAGMENT)
        .combined_image_sampler(3, vk::ShaderStageFlags::FRAGMENT)
}

/// Create the material set layout
///
/// # Errors
///
/// Propagates layout creation failures.
pub fn create_layout(device: &Device) -> VulkanResult<DescriptorSetLayout> {
    layout_builder().build(device)
}

/// Material state bound before drawing a mesh
pub struct Material {
    pool: DescriptorPool,
    sets: Vec<vk::DescriptorSet>,
    scene: Vec<UniformBuffer<SceneUniforms>>,
    pbr: UniformBuffer<PbrParams>,
    light: UniformBuffer<LightUniforms>,
    texture: Texture,
    pbr_params: PbrParams,
    light_params: LightUniforms,
}

impl Material {
    /// Allocate uniforms and one descriptor set per frame slot
    ///
    /// # Errors
    ///
    /// Fails on allocation or pool exhaustion.
    pub fn new(
        context: &VulkanContext,
        layout: &DescriptorSetLayout,
        texture: Texture,
        frames_in_flight: usize,
        pbr_params: PbrParams,
        light_params: LightUniforms,
    ) -> VulkanResult<Self> {
        if frames_in_flight == 0 {
            return Err(VulkanError::invalid("material needs at least one frame slot"));
        }

        let scene = (0..frames_in_flight)
            .map(|_| UniformBuffer::new(context, &SceneUniforms::default()))
            .collect::<VulkanResult<Vec<_>>>()?;
        let pbr = UniformBuffer::new(context, &pbr_params)?;
        let light = UniformBuffer::new(context, &light_params)?;

        let pool = DescriptorPool::for_layout(context.device(), layout, frames_in_flight as u32)?;
        let sets = pool.allocate(layout, frames_in_flight)?;

        for (set, scene_buffer) in sets.iter().zip(&scene) {
            DescriptorWriter::new(*set)
                .buffer(0, scene_buffer.descriptor_info())
                .buffer(1, pbr.descriptor_info())
                .buffer(2, light.descriptor_info())
                .image(3, texture.view(), texture.sampler())
                .update(context.device());
        }

        log::info!("Material initialized with {frames_in_flight} descriptor sets");
        Ok(Self {
            pool,
            sets,
            scene,
            pbr,
            light,
            texture,
            pbr_params,
            light_params,
        })
    }

    /// Replace the PBR parameters
    ///
    /// # Errors
    ///
    /// Propagates mapping failures.
    pub fn set_pbr(&mut self, params: PbrParams) -> VulkanResult<()> {
        self.pbr.update(&params)?;
        self.pbr_params = params;
        Ok(())
    }

    /// Replace the light
    ///
    /// # Errors
    ///
    /// Propagates mapping failures.
    pub fn set_light(&mut self, light: LightUniforms) -> VulkanResult<()> {
        self.light.update(&light)?;
        self.light_params = light;
        Ok(())
    }

    /// Write this frame's transforms into the slot's scene block
    ///
    /// # Errors
    ///
    /// `InvalidOperation` for an unknown slot, or a mapping failure.
    pub fn update_scene(&self, slot: usize, uniforms: &SceneUniforms) -> VulkanResult<()> {
        self.scene
            .get(slot)
            .ok_or_else(|| VulkanError::invalid(format!("material has no slot {slot}")))?
            .update(uniforms)
    }

    /// Bind the slot's descriptor set at set 0
    ///
    /// # Errors
    ///
    /// `InvalidOperation` for an unknown slot.
    pub fn bind(
        &self,
        pass: &mut ActiveRenderPass<'_, '_>,
        pipeline_layout: vk::PipelineLayout,
        slot: usize,
    ) -> VulkanResult<()> {
        let set = self
            .sets
            .get(slot)
            .copied()
            .ok_or_else(|| VulkanError::invalid(format!("material has no slot {slot}")))?;
        pass.bind_descriptor_set(pipeline_layout, set);
        Ok(())
    }

    /// Current PBR parameters
    #[must_use]
    pub const fn pbr(&self) -> &PbrParams {
        &self.pbr_params
    }

    /// Current light
    #[must_use]
    pub const fn light(&self) -> &LightUniforms {
        &self.light_params
    }

    /// Albedo texture
    #[must_use]
    pub const fn texture(&self) -> &Texture {
        &self.texture
    }

    /// Descriptor pool the sets come from
    #[must_use]
    pub const fn pool(&self) -> &DescriptorPool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_bindings() {
        let builder = layout_builder();
        let bindings = builder.bindings();
        assert_eq!(bindings.len(), 4);

        assert_eq!(bindings[0].descriptor_type, vk::DescriptorType::UNIFORM_BUFFER);
        assert_eq!(
            bindings[0].stage_flags,
            vk::ShaderStageFlags::VERTEX | vk::ShaderStageFlags::FRAGMENT
        );
        for binding in &bindings[1..3] {
            assert_eq!(binding.descriptor_type, vk::DescriptorType::UNIFORM_BUFFER);
            assert_eq!(binding.stage_flags, vk::ShaderStageFlags::FRAGMENT);
        }
        assert_eq!(bindings[3].descriptor_type, vk::DescriptorType::COMBINED_IMAGE_SAMPLER);
        assert_eq!(bindings[3].stage_flags, vk::ShaderStageFlags::FRAGMENT);
    }
}

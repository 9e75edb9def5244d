//! Procedural gradient skybox
//!
//! Six cube faces are generated on the CPU by blending a bottom color into a
//! top color along the world Y axis, then uploaded as one cube-compatible
//! image. The cube is drawn behind everything with depth writes off.

use ash::{vk, Device};

use crate::config::SkyboxConfig;
use crate::foundation::math::{utils::lerp_vec3, Mat4, Vec3};
use crate::render::descriptors::{DescriptorPool, DescriptorSetLayout, DescriptorSetLayoutBuilder, DescriptorWriter};
use crate::render::uniforms::{SkyboxUniforms, UniformBuffer};
use crate::render::vertex::SkyboxVertex;
use crate::render::vulkan::{
    ActiveRenderPass, Buffer, Image, ImageDesc, ImageView, Sampler, SamplerDesc, VulkanContext, VulkanError,
    VulkanResult,
};

/// Cubemap texel format
pub const CUBEMAP_FORMAT: vk::Format = vk::Format::R8G8B8A8_SRGB;

/// Direction through texel `(u, v)` of cube face `face`
///
/// `u` and `v` are in `[0, 1]`. Faces follow the Vulkan cube order +X, -X,
/// +Y, -Y, +Z, -Z. The result is normalized.
#[must_use]
pub fn uv_to_direction(u: f32, v: f32, face: usize) -> Vec3 {
    let x = u * 2.0 - 1.0;
    let y = v * 2.0 - 1.0;

    let direction = match face {
        0 => Vec3::new(1.0, -y, -x),
        1 => Vec3::new(-1.0, -y, x),
        2 => Vec3::new(x, 1.0, y),
        3 => Vec3::new(x, -1.0, -y),
        4 => Vec3::new(x, -y, 1.0),
        5 => Vec3::new(-x, -y, -1.0),
        _ => Vec3::new(0.0, 1.0, 0.0),
    };
    direction.normalize()
}

/// RGBA8 texels for one face, rows top to bottom
#[must_use]
pub fn generate_face(face: usize, resolution: u32, top: &Vec3, bottom: &Vec3) -> Vec<u8> {
    let size = resolution as usize;
    let mut data = Vec::with_capacity(size * size * 4);

    for y in 0..resolution {
        for x in 0..resolution {
            let u = (x as f32 + 0.5) / resolution as f32;
            let v = (y as f32 + 0.5) / resolution as f32;

            let direction = uv_to_direction(u, v, face);
            let t = ((direction.y + 1.0) * 0.5).clamp(0.0, 1.0);
            let color = lerp_vec3(bottom, top, t);

            data.extend_from_slice(&[to_byte(color.x), to_byte(color.y), to_byte(color.z), 255]);
        }
    }
    data
}

fn to_byte(channel: f32) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0) as u8
}

/// All six faces for a gradient sky
#[must_use]
pub fn generate_gradient_faces(config: &SkyboxConfig) -> [Vec<u8>; 6] {
    let top = Vec3::from(config.top_color);
    let bottom = Vec3::from(config.bottom_color);
    std::array::from_fn(|face| generate_face(face, config.resolution, &top, &bottom))
}

/// 36 vertices of a unit cube, two triangles per side
#[must_use]
pub fn cube_vertices() -> [SkyboxVertex; 36] {
    const CORNERS: [[f32; 3]; 36] = [
        // -Z
        [-1.0, 1.0, -1.0], [-1.0, -1.0, -1.0], [1.0, -1.0, -1.0],
        [1.0, -1.0, -1.0], [1.0, 1.0, -1.0], [-1.0, 1.0, -1.0],
        // -X
        [-1.0, -1.0, 1.0], [-1.0, -1.0, -1.0], [-1.0, 1.0, -1.0],
        [-1.0, 1.0, -1.0], [-1.0, 1.0, 1.0], [-1.0, -1.0, 1.0],
        // +X
        [1.0, -1.0, -1.0], [1.0, -1.0, 1.0], [1.0, 1.0, 1.0],
        [1.0, 1.0, 1.0], [1.0, 1.0, -1.0], [1.0, -1.0, -1.0],
        // +Z
        [-1.0, -1.0, 1.0], [-1.0, 1.0, 1.0], [1.0, 1.0, 1.0],
        [1.0, 1.0, 1.0], [1.0, -1.0, 1.0], [-1.0, -1.0, 1.0],
        // +Y
        [-1.0, 1.0, -1.0], [1.0, 1.0, -1.0], [1.0, 1.0, 1.0],
        [1.0, 1.0, 1.0], [-1.0, 1.0, 1.0], [-1.0, 1.0, -1.0],
        // -Y
        [-1.0, -1.0, -1.0], [-1.0, -1.0, 1.0], [1.0, -1.0, -1.0],
        [1.0, -1.0, -1.0], [-1.0, -1.0, 1.0], [1.0, -1.0, 1.0],
    ];
    CORNERS.map(|position| SkyboxVertex { position })
}

/// Bindings of the skybox set: camera block and cubemap sampler
#[must_use]
pub fn layout_builder() -> DescriptorSetLayoutBuilder {
    DescriptorSetLayoutBuilder::new()
        .uniform_buffer(0, vk::ShaderStageFlags::VERTEX)
        .combined_image_sampler(1, vk::ShaderStageFlags::FRAGMENT)
}

/// Create the skybox set layout
///
/// # Errors
///
/// Propagates layout creation failures.
pub fn create_layout(device: &Device) -> VulkanResult<DescriptorSetLayout> {
    layout_builder().build(device)
}

/// GPU resources for the sky
pub struct Skybox {
    pool: DescriptorPool,
    sets: Vec<vk::DescriptorSet>,
    uniforms: Vec<UniformBuffer<SkyboxUniforms>>,
    sampler: Sampler,
    view: ImageView,
    cubemap: Image,
    vertex_buffer: Buffer,
    vertex_count: u32,
}

impl Skybox {
    /// Generate and upload the cubemap, cube and per-slot descriptor sets
    ///
    /// # Errors
    ///
    /// `InvalidOperation` for a zero resolution, otherwise GPU failures.
    pub fn new(
        context: &VulkanContext,
        layout: &DescriptorSetLayout,
        config: &SkyboxConfig,
        frames_in_flight: usize,
    ) -> VulkanResult<Self> {
        if config.resolution == 0 {
            return Err(VulkanError::invalid("skybox resolution must be greater than zero"));
        }
        if frames_in_flight == 0 {
            return Err(VulkanError::invalid("skybox needs at least one frame slot"));
        }
        log::info!("Creating gradient skybox at {}x{} per face", config.resolution, config.resolution);

        let faces = generate_gradient_faces(config);
        let layers: Vec<&[u8]> = faces.iter().map(Vec::as_slice).collect();
        let cubemap = Image::with_layers(context, &ImageDesc::cubemap(config.resolution, CUBEMAP_FORMAT), &layers)?;
        let view = cubemap.create_view()?;
        let sampler = Sampler::new(
            context,
            &SamplerDesc::clamp_to_edge().with_anisotropy(16.0, context.max_anisotropy()),
        )?;

        let vertices = cube_vertices();
        let vertex_buffer = Buffer::device_local_with_data(
            context,
            bytemuck::cast_slice(&vertices),
            vk::BufferUsageFlags::VERTEX_BUFFER,
        )?;

        let uniforms = (0..frames_in_flight)
            .map(|_| UniformBuffer::new(context, &SkyboxUniforms::new(&Mat4::identity(), &Mat4::identity())))
            .collect::<VulkanResult<Vec<_>>>()?;

        let pool = DescriptorPool::for_layout(context.device(), layout, frames_in_flight as u32)?;
        let sets = pool.allocate(layout, frames_in_flight)?;
        for (set, uniform) in sets.iter().zip(&uniforms) {
            DescriptorWriter::new(*set)
                .buffer(0, uniform.descriptor_info())
                .image(1, view.handle(), sampler.handle())
                .update(context.device());
        }

        Ok(Self {
            pool,
            sets,
            uniforms,
            sampler,
            view,
            cubemap,
            vertex_buffer,
            vertex_count: vertices.len() as u32,
        })
    }

    /// Write this frame's camera matrices
    ///
    /// # Errors
    ///
    /// `InvalidOperation` for an unknown slot, or a mapping failure.
    pub fn update(&self, slot: usize, uniforms: &SkyboxUniforms) -> VulkanResult<()> {
        self.uniforms
            .get(slot)
            .ok_or_else(|| VulkanError::invalid(format!("skybox has no slot {slot}")))?
            .update(uniforms)
    }

    /// Bind the slot's set and draw the cube
    ///
    /// The skybox pipeline must already be bound.
    ///
    /// # Errors
    ///
    /// `InvalidOperation` for an unknown slot.
    pub fn draw(
        &self,
        pass: &mut ActiveRenderPass<'_, '_>,
        pipeline_layout: vk::PipelineLayout,
        slot: usize,
    ) -> VulkanResult<()> {
        let set = self
            .sets
            .get(slot)
            .copied()
            .ok_or_else(|| VulkanError::invalid(format!("skybox has no slot {slot}")))?;
        pass.bind_descriptor_set(pipeline_layout, set);
        pass.bind_vertex_buffer(self.vertex_buffer.handle());
        pass.draw(self.vertex_count);
        Ok(())
    }

    /// Cube image
    #[must_use]
    pub const fn cubemap(&self) -> &Image {
        &self.cubemap
    }

    /// Descriptor pool the sets come from
    #[must_use]
    pub const fn pool(&self) -> &DescriptorPool {
        &self.pool
    }
}

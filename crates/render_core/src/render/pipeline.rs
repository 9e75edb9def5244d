//! Shader modules and graphics pipelines
//!
//! SPIR-V is loaded from the compiled shader directory. Pipelines use dynamic
//! viewport and scissor, so they survive swapchain resizes unless the render
//! pass changes.

use ash::{vk, Device};
use std::ffi::CStr;
use std::io::Cursor;
use std::path::Path;

use crate::render::vertex::VertexLayout;
use crate::render::vulkan::{VulkanError, VulkanResult};

const ENTRY_POINT: &CStr = c"main";
const SPIRV_MAGIC: u32 = 0x0723_0203;

/// Decode SPIR-V bytes into words, checking alignment and the magic number
///
/// # Errors
///
/// `InitializationFailed` when the bytes are not a SPIR-V module.
pub fn spirv_words(bytes: &[u8]) -> VulkanResult<Vec<u32>> {
    let words = ash::util::read_spv(&mut Cursor::new(bytes))
        .map_err(|e| VulkanError::InitializationFailed(format!("Invalid SPIR-V: {e}")))?;
    match words.first() {
        Some(&SPIRV_MAGIC) => Ok(words),
        _ => Err(VulkanError::InitializationFailed(
            "Invalid SPIR-V: missing magic number".to_string(),
        )),
    }
}

/// Shader module wrapper with RAII cleanup
pub struct ShaderModule {
    device: Device,
    module: vk::ShaderModule,
}

impl ShaderModule {
    /// Create shader module from SPIR-V bytecode
    ///
    /// # Errors
    ///
    /// Fails on malformed SPIR-V or a driver error.
    pub fn from_bytes(device: &Device, bytes: &[u8]) -> VulkanResult<Self> {
        let code = spirv_words(bytes)?;
        let create_info = vk::ShaderModuleCreateInfo::builder().code(&code);

        let module = unsafe {
            device
                .create_shader_module(&create_info, None)
                .map_err(VulkanError::Api)?
        };

        Ok(Self {
            device: device.clone(),
            module,
        })
    }

    /// Load shader from SPIR-V file
    ///
    /// # Errors
    ///
    /// `Io` when the file cannot be read, otherwise see
    /// [`from_bytes`](Self::from_bytes).
    pub fn from_file(device: &Device, path: impl AsRef<Path>) -> VulkanResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| VulkanError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loaded shader {} ({} bytes)", path.display(), bytes.len());
        Self::from_bytes(device, &bytes)
    }

    /// Get shader module handle
    #[must_use]
    pub const fn handle(&self) -> vk::ShaderModule {
        self.module
    }

    fn stage_info(&self, stage: vk::ShaderStageFlags) -> vk::PipelineShaderStageCreateInfo {
        vk::PipelineShaderStageCreateInfo::builder()
            .stage(stage)
            .module(self.module)
            .name(ENTRY_POINT)
            .build()
    }
}

impl Drop for ShaderModule {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_shader_module(self.module, None);
        }
    }
}

/// Fixed-function state and shaders for one pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineDesc {
    /// Compiled vertex shader file name inside the shader directory
    pub vertex_shader: &'static str,
    /// Compiled fragment shader file name inside the shader directory
    pub fragment_shader: &'static str,
    /// Face culling
    pub cull_mode: vk::CullModeFlags,
    /// Winding of front faces
    pub front_face: vk::FrontFace,
    /// Whether fragments write depth
    pub depth_write: bool,
    /// Depth comparison
    pub depth_compare: vk::CompareOp,
    /// Standard alpha blending
    pub alpha_blend: bool,
}

impl PipelineDesc {
    /// Lit, textured meshes
    #[must_use]
    pub const fn opaque() -> Self {
        Self {
            vertex_shader: "default.vert.spv",
            fragment_shader: "default.frag.spv",
            cull_mode: vk::CullModeFlags::BACK,
            front_face: vk::FrontFace::COUNTER_CLOCKWISE,
            depth_write: true,
            depth_compare: vk::CompareOp::LESS,
            alpha_blend: false,
        }
    }

    /// Background cube drawn at the far plane
    #[must_use]
    pub const fn skybox() -> Self {
        Self {
            vertex_shader: "skybox.vert.spv",
            fragment_shader: "skybox.frag.spv",
            cull_mode: vk::CullModeFlags::NONE,
            front_face: vk::FrontFace::COUNTER_CLOCKWISE,
            depth_write: false,
            depth_compare: vk::CompareOp::LESS_OR_EQUAL,
            alpha_blend: true,
        }
    }

    fn color_blend_attachment(&self) -> vk::PipelineColorBlendAttachmentState {
        let state = vk::PipelineColorBlendAttachmentState::builder().color_write_mask(vk::ColorComponentFlags::RGBA);
        if self.alpha_blend {
            state
                .blend_enable(true)
                .src_color_blend_factor(vk::BlendFactor::SRC_ALPHA)
                .dst_color_blend_factor(vk::BlendFactor::ONE_MINUS_SRC_ALPHA)
                .color_blend_op(vk::BlendOp::ADD)
                .src_alpha_blend_factor(vk::BlendFactor::ONE)
                .dst_alpha_blend_factor(vk::BlendFactor::ZERO)
                .alpha_blend_op(vk::BlendOp::ADD)
                .build()
        } else {
            state.blend_enable(false).build()
        }
    }
}

/// Graphics pipeline wrapper with RAII cleanup
pub struct GraphicsPipeline {
    device: Device,
    pipeline: vk::Pipeline,
    layout: vk::PipelineLayout,
}

impl GraphicsPipeline {
    /// Build a pipeline for vertex type `V` against subpass 0 of `render_pass`
    ///
    /// # Errors
    ///
    /// Fails when a shader cannot be loaded or the driver rejects the
    /// pipeline; anything created so far is destroyed.
    pub fn new<V: VertexLayout>(
        device: &Device,
        render_pass: vk::RenderPass,
        shader_dir: &Path,
        desc: &PipelineDesc,
        set_layouts: &[vk::DescriptorSetLayout],
    ) -> VulkanResult<Self> {
        let vertex_shader = ShaderModule::from_file(device, shader_dir.join(desc.vertex_shader))?;
        let fragment_shader = ShaderModule::from_file(device, shader_dir.join(desc.fragment_shader))?;

        let layout_info = vk::PipelineLayoutCreateInfo::builder().set_layouts(set_layouts);
        let layout = unsafe {
            device
                .create_pipeline_layout(&layout_info, None)
                .map_err(VulkanError::Api)?
        };

        // A null pipeline is valid to destroy, so Drop covers a failed create
        let mut result = Self {
            device: device.clone(),
            pipeline: vk::Pipeline::null(),
            layout,
        };

        let shader_stages = [
            vertex_shader.stage_info(vk::ShaderStageFlags::VERTEX),
            fragment_shader.stage_info(vk::ShaderStageFlags::FRAGMENT),
        ];

        let binding_descriptions = [V::binding_description()];
        let attribute_descriptions = V::attribute_descriptions();
        let vertex_input = vk::PipelineVertexInputStateCreateInfo::builder()
            .vertex_binding_descriptions(&binding_descriptions)
            .vertex_attribute_descriptions(&attribute_descriptions);

        let input_assembly = vk::PipelineInputAssemblyStateCreateInfo::builder()
            .topology(vk::PrimitiveTopology::TRIANGLE_LIST)
            .primitive_restart_enable(false);

        let viewport_state = vk::PipelineViewportStateCreateInfo::builder()
            .viewport_count(1)
            .scissor_count(1);

        let rasterizer = vk::PipelineRasterizationStateCreateInfo::builder()
            .depth_clamp_enable(false)
            .rasterizer_discard_enable(false)
            .polygon_mode(vk::PolygonMode::FILL)
            .line_width(1.0)
            .cull_mode(desc.cull_mode)
            .front_face(desc.front_face)
            .depth_bias_enable(false);

        let multisampling = vk::PipelineMultisampleStateCreateInfo::builder()
            .sample_shading_enable(false)
            .rasterization_samples(vk::SampleCountFlags::TYPE_1);

        let depth_stencil = vk::PipelineDepthStencilStateCreateInfo::builder()
            .depth_test_enable(true)
            .depth_write_enable(desc.depth_write)
            .depth_compare_op(desc.depth_compare)
            .depth_bounds_test_enable(false)
            .stencil_test_enable(false);

        let color_blend_attachments = [desc.color_blend_attachment()];
        let color_blending = vk::PipelineColorBlendStateCreateInfo::builder()
            .logic_op_enable(false)
            .attachments(&color_blend_attachments);

        let dynamic_states = [vk::DynamicState::VIEWPORT, vk::DynamicState::SCISSOR];
        let dynamic_state = vk::PipelineDynamicStateCreateInfo::builder().dynamic_states(&dynamic_states);

        let pipeline_info = vk::GraphicsPipelineCreateInfo::builder()
            .stages(&shader_stages)
            .vertex_input_state(&vertex_input)
            .input_assembly_state(&input_assembly)
            .viewport_state(&viewport_state)
            .rasterization_state(&rasterizer)
            .multisample_state(&multisampling)
            .depth_stencil_state(&depth_stencil)
            .color_blend_state(&color_blending)
            .dynamic_state(&dynamic_state)
            .layout(layout)
            .render_pass(render_pass)
            .subpass(0);

        let pipelines = unsafe {
            device
                .create_graphics_pipelines(vk::PipelineCache::null(), &[pipeline_info.build()], None)
                .map_err(|(_, err)| VulkanError::Api(err))?
        };
        result.pipeline = pipelines
            .into_iter()
            .next()
            .ok_or_else(|| VulkanError::InitializationFailed("Driver returned no pipeline".to_string()))?;

        log::debug!(
            "Created pipeline {} + {} (cull {:?}, depth write {})",
            desc.vertex_shader,
            desc.fragment_shader,
            desc.cull_mode,
            desc.depth_write
        );
        Ok(result)
    }

    /// Get pipeline handle
    #[must_use]
    pub const fn handle(&self) -> vk::Pipeline {
        self.pipeline
    }

    /// Get layout handle
    #[must_use]
    pub const fn layout(&self) -> vk::PipelineLayout {
        self.layout
    }
}

impl Drop for GraphicsPipeline {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_pipeline(self.pipeline, None);
            self.device.destroy_pipeline_layout(self.layout, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opaque_state() {
        let desc = PipelineDesc::opaque();
        assert_eq!(desc.cull_mode, vk::CullModeFlags::BACK);
        assert_eq!(desc.front_face, vk::FrontFace::COUNTER_CLOCKWISE);
        assert!(desc.depth_write);
        assert_eq!(desc.depth_compare, vk::CompareOp::LESS);
        assert_eq!(desc.color_blend_attachment().blend_enable, vk::FALSE);
    }

    #[test]
    fn test_skybox_state() {
        let desc = PipelineDesc::skybox();
        assert_eq!(desc.cull_mode, vk::CullModeFlags::NONE);
        assert!(!desc.depth_write);
        assert_eq!(desc.depth_compare, vk::CompareOp::LESS_OR_EQUAL);

        let blend = desc.color_blend_attachment();
        assert_eq!(blend.blend_enable, vk::TRUE);
        assert_eq!(blend.src_color_blend_factor, vk::BlendFactor::SRC_ALPHA);
        assert_eq!(blend.dst_color_blend_factor, vk::BlendFactor::ONE_MINUS_SRC_ALPHA);
    }

    #[test]
    fn test_spirv_words_accepts_valid_header() {
        let mut bytes = SPIRV_MAGIC.to_le_bytes().to_vec();
        bytes.extend_from_slice(&0x0001_0000_u32.to_le_bytes());
        let words = spirv_words(&bytes).unwrap();
        assert_eq!(words, vec![SPIRV_MAGIC, 0x0001_0000]);
    }

    #[test]
    fn test_spirv_words_rejects_garbage() {
        assert!(spirv_words(&[1, 2, 3]).is_err());
        assert!(spirv_words(&[0, 0, 0, 0]).is_err());
        assert!(spirv_words(&[]).is_err());
    }

    #[test]
    fn test_shader_file_paths() {
        let dir = Path::new("target/shaders");
        assert_eq!(
            dir.join(PipelineDesc::opaque().fragment_shader),
            Path::new("target/shaders/default.frag.spv")
        );
    }
}

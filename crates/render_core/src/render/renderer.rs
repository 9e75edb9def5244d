//! Forward renderer
//!
//! Ties the device context, the frame scheduler and the scene objects
//! together. One frame is: update the slot's uniforms, clear, draw the sky
//! with depth writes off, then bind the material and draw the model.
//!
//! Swapchain-dependent objects live in [`ScenePasses`], which the frame
//! backend notifies after every swapchain rebuild.

use ash::vk;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::assets::{AssetError, ObjLoader};
use crate::config::{RendererConfig, SceneConfig};
use crate::foundation::math::{utils, Mat4, Mat4Ext};
use crate::render::descriptors::DescriptorSetLayout;
use crate::render::pipeline::{GraphicsPipeline, PipelineDesc};
use crate::render::targets::{clear_values, RenderTargets};
use crate::render::uniforms::{LightUniforms, PbrParams, SceneUniforms, SkyboxUniforms};
use crate::render::vertex::{SkyboxVertex, Vertex};
use crate::render::vulkan::{
    ContextConfig, FrameResources, FrameScheduler, FrameStatus, SwapchainObserver, VulkanContext, VulkanError,
    VulkanFrameBackend, VulkanResult, Window,
};
use crate::scene::{material, skybox, Camera, Material, Mesh, Skybox, Texture};

/// Failure while loading the scene
#[derive(Error, Debug)]
pub enum SceneLoadError {
    /// Model or image could not be read or parsed
    #[error(transparent)]
    Asset(#[from] AssetError),

    /// GPU upload or object creation failed
    #[error(transparent)]
    Vulkan(#[from] VulkanError),
}

/// Yaw applied to the model so imported assets face the default camera
const MODEL_YAW_DEGREES: f32 = -90.0;

/// Render pass, depth, framebuffers and the pipelines built against them
pub struct ScenePasses {
    opaque: GraphicsPipeline,
    skybox: GraphicsPipeline,
    targets: RenderTargets,
    shader_dir: PathBuf,
    mesh_set_layout: vk::DescriptorSetLayout,
    skybox_set_layout: vk::DescriptorSetLayout,
}

impl ScenePasses {
    /// Build targets and both pipelines for the current swapchain
    ///
    /// # Errors
    ///
    /// Fails on missing shaders or any object creation failure.
    pub fn new(
        context: &VulkanContext,
        shader_dir: &Path,
        mesh_set_layout: vk::DescriptorSetLayout,
        skybox_set_layout: vk::DescriptorSetLayout,
    ) -> VulkanResult<Self> {
        let targets = RenderTargets::new(context)?;
        let (opaque, skybox) =
            Self::build_pipelines(context, &targets, shader_dir, mesh_set_layout, skybox_set_layout)?;
        Ok(Self {
            opaque,
            skybox,
            targets,
            shader_dir: shader_dir.to_path_buf(),
            mesh_set_layout,
            skybox_set_layout,
        })
    }

    fn build_pipelines(
        context: &VulkanContext,
        targets: &RenderTargets,
        shader_dir: &Path,
        mesh_set_layout: vk::DescriptorSetLayout,
        skybox_set_layout: vk::DescriptorSetLayout,
    ) -> VulkanResult<(GraphicsPipeline, GraphicsPipeline)> {
        let render_pass = targets.render_pass().handle();
        let opaque = GraphicsPipeline::new::<Vertex>(
            context.device(),
            render_pass,
            shader_dir,
            &PipelineDesc::opaque(),
            &[mesh_set_layout],
        )?;
        let skybox = GraphicsPipeline::new::<SkyboxVertex>(
            context.device(),
            render_pass,
            shader_dir,
            &PipelineDesc::skybox(),
            &[skybox_set_layout],
        )?;
        log::debug!("Pipelines built from {}", shader_dir.display());
        Ok((opaque, skybox))
    }

    /// Render targets
    #[must_use]
    pub const fn targets(&self) -> &RenderTargets {
        &self.targets
    }

    /// Pipeline for lit, textured meshes
    #[must_use]
    pub const fn opaque_pipeline(&self) -> &GraphicsPipeline {
        &self.opaque
    }

    /// Pipeline for the sky cube
    #[must_use]
    pub const fn skybox_pipeline(&self) -> &GraphicsPipeline {
        &self.skybox
    }
}

impl SwapchainObserver for ScenePasses {
    fn on_swapchain_recreated(&mut self, context: &VulkanContext) -> VulkanResult<()> {
        let previous_pass = self.targets.render_pass().handle();
        self.targets.on_swapchain_recreated(context)?;

        // Viewport and scissor are dynamic, so pipelines only follow the render pass
        if self.targets.render_pass().handle() != previous_pass {
            let (opaque, skybox) = Self::build_pipelines(
                context,
                &self.targets,
                &self.shader_dir,
                self.mesh_set_layout,
                self.skybox_set_layout,
            )?;
            self.opaque = opaque;
            self.skybox = skybox;
        }
        Ok(())
    }
}

struct SceneObjects {
    mesh: Mesh,
    material: Material,
    skybox: Skybox,
}

/// Single-model forward renderer with a skybox
pub struct ForwardRenderer {
    // Field order is drop order: everything above `context` holds device objects
    scene: Option<SceneObjects>,
    passes: ScenePasses,
    skybox_set_layout: DescriptorSetLayout,
    mesh_set_layout: DescriptorSetLayout,
    frames: FrameResources,
    scheduler: FrameScheduler,
    clear_color: [f32; 4],
    context: VulkanContext,
}

impl ForwardRenderer {
    /// Create the context, frame resources, layouts and pipelines
    ///
    /// # Errors
    ///
    /// Any initialization failure, including missing compiled shaders.
    pub fn new(window: &mut Window, config: &RendererConfig) -> VulkanResult<Self> {
        log::info!("Creating forward renderer with {} frames in flight", config.frames_in_flight);

        let context = VulkanContext::new(window, &ContextConfig::from(config))?;
        let scheduler = FrameScheduler::new(config.frames_in_flight)?;
        let frames = FrameResources::new(&context, config.frames_in_flight)?;

        let mesh_set_layout = material::create_layout(context.device())?;
        let skybox_set_layout = skybox::create_layout(context.device())?;
        let passes = ScenePasses::new(
            &context,
            Path::new(&config.shader_dir),
            mesh_set_layout.handle(),
            skybox_set_layout.handle(),
        )?;

        Ok(Self {
            scene: None,
            passes,
            skybox_set_layout,
            mesh_set_layout,
            frames,
            scheduler,
            clear_color: config.clear_color,
            context,
        })
    }

    /// Load the model, texture, material and skybox described by `config`
    ///
    /// Replaces any previously loaded scene.
    ///
    /// # Errors
    ///
    /// Model loading and GPU failures. A missing texture is not an error;
    /// the fallback chain ends in a generated checkerboard.
    pub fn load_scene(&mut self, config: &SceneConfig) -> Result<(), SceneLoadError> {
        let model = ObjLoader::load_obj(&config.model_path)?;
        let mesh = Mesh::from_model(&self.context, &model)?;

        let texture = Texture::load_with_fallback(
            &self.context,
            Path::new(&config.texture_path),
            Path::new(&config.fallback_texture_path),
        )?;
        let material = Material::new(
            &self.context,
            &self.mesh_set_layout,
            texture,
            self.scheduler.frames_in_flight(),
            PbrParams::from(&config.material),
            LightUniforms::from(&config.light),
        )?;

        let skybox = Skybox::new(
            &self.context,
            &self.skybox_set_layout,
            &config.skybox,
            self.scheduler.frames_in_flight(),
        )?;

        if self.scene.is_some() {
            self.context.wait_idle()?;
        }
        self.scene = Some(SceneObjects { mesh, material, skybox });
        log::info!("Scene loaded: {} ({} triangles)", config.model_path, model.triangle_count());
        Ok(())
    }

    /// Ask for a swapchain rebuild after the next present
    pub fn request_resize(&mut self) {
        self.scheduler.request_resize();
    }

    /// Render and present one frame seen through `camera`
    ///
    /// # Errors
    ///
    /// `InvalidOperation` before [`ForwardRenderer::load_scene`], otherwise
    /// fatal GPU failures. Out-of-date swapchains are handled internally and
    /// reported as [`FrameStatus::Skipped`] or a non-`Presented` outcome.
    pub fn draw_frame(&mut self, window: &mut Window, camera: &Camera) -> VulkanResult<FrameStatus> {
        let scene = self
            .scene
            .as_ref()
            .ok_or_else(|| VulkanError::invalid("draw_frame called before load_scene"))?;
        let clears = clear_values(self.clear_color);

        let mut backend = VulkanFrameBackend::new(&mut self.context, window, &self.frames, &mut self.passes);
        self.scheduler.draw_frame(&mut backend, |backend, token| {
            let passes = backend.observer();
            let extent = passes.targets().extent();
            let aspect = extent.width as f32 / extent.height.max(1) as f32;

            let view = camera.view_matrix();
            let projection = camera.projection_matrix(aspect);
            let model = Mat4::rotation_y(utils::deg_to_rad(MODEL_YAW_DEGREES));
            scene
                .material
                .update_scene(token.slot, &SceneUniforms::new(&model, &view, &projection, &camera.position))?;
            scene.skybox.update(token.slot, &SkyboxUniforms::new(&view, &projection))?;

            let framebuffer = passes.targets().framebuffer(token.image_index)?;
            let mut recorder = backend.begin_commands(token)?;
            {
                let mut pass = recorder.begin_render_pass(
                    passes.targets().render_pass().handle(),
                    framebuffer,
                    extent,
                    &clears,
                );
                pass.set_viewport_and_scissor(extent);

                pass.bind_pipeline(passes.skybox_pipeline().handle());
                scene.skybox.draw(&mut pass, passes.skybox_pipeline().layout(), token.slot)?;

                pass.bind_pipeline(passes.opaque_pipeline().handle());
                scene.material.bind(&mut pass, passes.opaque_pipeline().layout(), token.slot)?;
                scene.mesh.draw(&mut pass);
            }
            recorder.finish()
        })
    }

    /// Block until the GPU has finished all submitted work
    ///
    /// # Errors
    ///
    /// Propagates `vkDeviceWaitIdle` failures.
    pub fn wait_idle(&self) -> VulkanResult<()> {
        self.context.wait_idle()
    }

    /// Device context
    #[must_use]
    pub const fn context(&self) -> &VulkanContext {
        &self.context
    }

    /// Current frame-in-flight slot
    #[must_use]
    pub const fn current_slot(&self) -> usize {
        self.scheduler.current_slot()
    }

    /// Whether a scene has been loaded
    #[must_use]
    pub const fn has_scene(&self) -> bool {
        self.scene.is_some()
    }
}

impl Drop for ForwardRenderer {
    fn drop(&mut self) {
        if let Err(e) = self.context.wait_idle() {
            log::error!("Device wait failed during renderer shutdown: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ViewerConfig, WindowConfig};
    use crate::render::vulkan::PresentOutcome;

    #[test]
    fn test_scene_load_error_wraps_both_layers() {
        let asset: SceneLoadError = AssetError::Invalid("empty model".to_string()).into();
        assert!(matches!(asset, SceneLoadError::Asset(_)));
        assert!(asset.to_string().contains("empty model"));

        let gpu: SceneLoadError = VulkanError::DeviceLost.into();
        assert!(matches!(gpu, SceneLoadError::Vulkan(VulkanError::DeviceLost)));
    }

    #[test]
    #[ignore = "requires a Vulkan device and a display"]
    fn test_draw_before_load_scene_is_rejected() {
        let config = ViewerConfig::default();
        let mut window = Window::new(&WindowConfig::default().with_cursor_capture(false)).unwrap();
        let mut renderer = ForwardRenderer::new(&mut window, &config.renderer).unwrap();
        let result = renderer.draw_frame(&mut window, &Camera::default());
        assert!(matches!(result, Err(VulkanError::InvalidOperation { .. })));
    }

    #[test]
    #[ignore = "requires a Vulkan device and a display"]
    fn test_triangle_frames_present_and_cycle_slots() {
        let dir = tempfile::tempdir().unwrap();
        let model_path = dir.path().join("triangle.obj");
        std::fs::write(&model_path, "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvt 1 0\nvt 0 1\nf 1/1 2/2 3/3\n").unwrap();

        let config = ViewerConfig::default();
        let mut window = Window::new(&WindowConfig::default().with_cursor_capture(false)).unwrap();
        let mut renderer = ForwardRenderer::new(&mut window, &config.renderer).unwrap();
        renderer
            .load_scene(&config.scene.clone().with_model(model_path.to_string_lossy()))
            .unwrap();

        let camera = Camera::default();
        for frame in 0..4 {
            assert_eq!(renderer.current_slot(), frame % config.renderer.frames_in_flight);
            let status = renderer.draw_frame(&mut window, &camera).unwrap();
            assert!(matches!(
                status,
                FrameStatus::Presented(PresentOutcome::Presented | PresentOutcome::Suboptimal)
            ));
        }
        renderer.wait_idle().unwrap();
    }

    #[test]
    #[ignore = "requires a Vulkan device and a display"]
    fn test_stepped_triangle_frames_use_valid_image_indices() {
        use crate::render::vulkan::Buffer;

        let config = RendererConfig::default();
        let mut window = Window::new(&WindowConfig::default().with_cursor_capture(false)).unwrap();
        let mut context = VulkanContext::new(&mut window, &ContextConfig::from(&config)).unwrap();

        let positions: [f32; 9] = [0.0, -0.5, 0.0, 0.5, 0.5, 0.0, -0.5, 0.5, 0.0];
        let indices: [u32; 3] = [0, 1, 2];
        let vertex_buffer = Buffer::device_local_with_data(
            &context,
            bytemuck::cast_slice(&positions),
            vk::BufferUsageFlags::VERTEX_BUFFER,
        )
        .unwrap();
        let index_buffer = Buffer::device_local_with_data(
            &context,
            bytemuck::cast_slice(&indices),
            vk::BufferUsageFlags::INDEX_BUFFER,
        )
        .unwrap();
        assert_eq!(vertex_buffer.size(), 36);
        assert_eq!(index_buffer.size(), 12);

        let frames = FrameResources::new(&context, config.frames_in_flight).unwrap();
        let mut scheduler = FrameScheduler::new(config.frames_in_flight).unwrap();
        let mut targets = RenderTargets::new(&context).unwrap();
        let image_count = context.swapchain().unwrap().image_count();
        assert_eq!(targets.framebuffer_count(), image_count as usize);

        let clears = clear_values(config.clear_color);
        for frame in 0..4 {
            let mut backend = VulkanFrameBackend::new(&mut context, &mut window, &frames, &mut targets);
            let token = scheduler
                .begin_frame(&mut backend)
                .unwrap()
                .expect("swapchain went out of date on acquire");
            assert_eq!(token.slot, frame % config.frames_in_flight);
            let image_count = backend.context().swapchain().unwrap().image_count();
            assert!(token.image_index < image_count);

            {
                let targets = backend.observer();
                let extent = targets.extent();
                let mut recorder = backend.begin_commands(&token).unwrap();
                {
                    let mut pass = recorder.begin_render_pass(
                        targets.render_pass().handle(),
                        targets.framebuffer(token.image_index).unwrap(),
                        extent,
                        &clears,
                    );
                    pass.set_viewport_and_scissor(extent);
                    pass.bind_vertex_buffer(vertex_buffer.handle());
                    pass.bind_index_buffer(index_buffer.handle());
                }
                recorder.finish().unwrap();
            }

            scheduler.submit(&mut backend, &token).unwrap();
            let outcome = scheduler.present(&mut backend, &token).unwrap();
            assert!(matches!(outcome, PresentOutcome::Presented | PresentOutcome::Suboptimal));
        }
        context.wait_idle().unwrap();
    }
}

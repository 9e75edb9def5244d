//! Forward render pass, depth buffer and per-image framebuffers
//!
//! Everything here is sized after the swapchain and rebuilt through
//! [`SwapchainObserver`] when it is recreated.

use ash::{vk, Device};

use crate::render::vulkan::{DepthBuffer, SwapchainObserver, VulkanContext, VulkanError, VulkanResult};

/// Color and depth attachments of the forward pass
///
/// Color is cleared and ends in `PRESENT_SRC_KHR`; depth is cleared and
/// discarded.
#[must_use]
pub fn forward_attachments(color_format: vk::Format) -> [vk::AttachmentDescription; 2] {
    let color = vk::AttachmentDescription::builder()
        .format(color_format)
        .samples(vk::SampleCountFlags::TYPE_1)
        .load_op(vk::AttachmentLoadOp::CLEAR)
        .store_op(vk::AttachmentStoreOp::STORE)
        .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
        .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
        .initial_layout(vk::ImageLayout::UNDEFINED)
        .final_layout(vk::ImageLayout::PRESENT_SRC_KHR)
        .build();

    let depth = vk::AttachmentDescription::builder()
        .format(DepthBuffer::FORMAT)
        .samples(vk::SampleCountFlags::TYPE_1)
        .load_op(vk::AttachmentLoadOp::CLEAR)
        .store_op(vk::AttachmentStoreOp::DONT_CARE)
        .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
        .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
        .initial_layout(vk::ImageLayout::UNDEFINED)
        .final_layout(vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL)
        .build();

    [color, depth]
}

/// External dependency that orders attachment writes after the previous
/// frame's use of the same image
#[must_use]
pub fn forward_dependency() -> vk::SubpassDependency {
    let stages = vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT | vk::PipelineStageFlags::EARLY_FRAGMENT_TESTS;
    vk::SubpassDependency::builder()
        .src_subpass(vk::SUBPASS_EXTERNAL)
        .dst_subpass(0)
        .src_stage_mask(stages)
        .src_access_mask(vk::AccessFlags::empty())
        .dst_stage_mask(stages)
        .dst_access_mask(vk::AccessFlags::COLOR_ATTACHMENT_WRITE | vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE)
        .build()
}

/// Clear values matching [`forward_attachments`]
#[must_use]
pub fn clear_values(color: [f32; 4]) -> [vk::ClearValue; 2] {
    [
        vk::ClearValue {
            color: vk::ClearColorValue { float32: color },
        },
        vk::ClearValue {
            depth_stencil: vk::ClearDepthStencilValue { depth: 1.0, stencil: 0 },
        },
    ]
}

/// Render pass wrapper with RAII cleanup
pub struct RenderPass {
    device: Device,
    render_pass: vk::RenderPass,
    color_format: vk::Format,
}

impl RenderPass {
    /// Single-subpass forward pass with color and depth
    ///
    /// # Errors
    ///
    /// Propagates `vkCreateRenderPass` failures.
    pub fn new_forward(device: &Device, color_format: vk::Format) -> VulkanResult<Self> {
        let attachments = forward_attachments(color_format);

        let color_refs = [vk::AttachmentReference {
            attachment: 0,
            layout: vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
        }];
        let depth_ref = vk::AttachmentReference {
            attachment: 1,
            layout: vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL,
        };

        let subpasses = [vk::SubpassDescription::builder()
            .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
            .color_attachments(&color_refs)
            .depth_stencil_attachment(&depth_ref)
            .build()];
        let dependencies = [forward_dependency()];

        let create_info = vk::RenderPassCreateInfo::builder()
            .attachments(&attachments)
            .subpasses(&subpasses)
            .dependencies(&dependencies);

        let render_pass = unsafe {
            device
                .create_render_pass(&create_info, None)
                .map_err(VulkanError::Api)?
        };

        Ok(Self {
            device: device.clone(),
            render_pass,
            color_format,
        })
    }

    /// Get the render pass handle
    #[must_use]
    pub const fn handle(&self) -> vk::RenderPass {
        self.render_pass
    }

    /// Color format the pass was built for
    #[must_use]
    pub const fn color_format(&self) -> vk::Format {
        self.color_format
    }
}

impl Drop for RenderPass {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_render_pass(self.render_pass, None);
        }
    }
}

/// Framebuffer wrapper with RAII cleanup
pub struct Framebuffer {
    device: Device,
    framebuffer: vk::Framebuffer,
}

impl Framebuffer {
    /// Create a framebuffer over `attachments`
    ///
    /// # Errors
    ///
    /// Propagates `vkCreateFramebuffer` failures.
    pub fn new(
        device: &Device,
        render_pass: vk::RenderPass,
        attachments: &[vk::ImageView],
        extent: vk::Extent2D,
    ) -> VulkanResult<Self> {
        let create_info = vk::FramebufferCreateInfo::builder()
            .render_pass(render_pass)
            .attachments(attachments)
            .width(extent.width)
            .height(extent.height)
            .layers(1);

        let framebuffer = unsafe {
            device
                .create_framebuffer(&create_info, None)
                .map_err(VulkanError::Api)?
        };

        Ok(Self {
            device: device.clone(),
            framebuffer,
        })
    }

    /// Get the framebuffer handle
    #[must_use]
    pub const fn handle(&self) -> vk::Framebuffer {
        self.framebuffer
    }
}

impl Drop for Framebuffer {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_framebuffer(self.framebuffer, None);
        }
    }
}

/// Render pass plus the swapchain-sized attachments it draws into
pub struct RenderTargets {
    framebuffers: Vec<Framebuffer>,
    depth: DepthBuffer,
    render_pass: RenderPass,
}

impl RenderTargets {
    /// Build for the context's current swapchain
    ///
    /// # Errors
    ///
    /// Fails if there is no swapchain or any object cannot be created.
    pub fn new(context: &VulkanContext) -> VulkanResult<Self> {
        let render_pass = RenderPass::new_forward(context.device(), context.swapchain_format()?)?;
        let depth = DepthBuffer::new(context, context.swapchain_extent()?)?;
        let framebuffers = Self::create_framebuffers(context, &render_pass, &depth)?;
        Ok(Self {
            framebuffers,
            depth,
            render_pass,
        })
    }

    fn create_framebuffers(
        context: &VulkanContext,
        render_pass: &RenderPass,
        depth: &DepthBuffer,
    ) -> VulkanResult<Vec<Framebuffer>> {
        let swapchain = context.swapchain()?;
        swapchain
            .image_views()
            .iter()
            .map(|&color_view| {
                Framebuffer::new(
                    context.device(),
                    render_pass.handle(),
                    &[color_view, depth.view()],
                    swapchain.extent(),
                )
            })
            .collect()
    }

    /// Forward render pass
    #[must_use]
    pub const fn render_pass(&self) -> &RenderPass {
        &self.render_pass
    }

    /// Attachment size
    #[must_use]
    pub const fn extent(&self) -> vk::Extent2D {
        self.depth.extent()
    }

    /// Framebuffer for swapchain image `image_index`
    ///
    /// # Errors
    ///
    /// `InvalidOperation` for an index the swapchain never returned.
    pub fn framebuffer(&self, image_index: u32) -> VulkanResult<vk::Framebuffer> {
        self.framebuffers
            .get(image_index as usize)
            .map(Framebuffer::handle)
            .ok_or_else(|| {
                VulkanError::invalid(format!(
                    "no framebuffer for swapchain image {image_index} ({} images)",
                    self.framebuffers.len()
                ))
            })
    }

    /// Number of framebuffers, one per swapchain image
    #[must_use]
    pub fn framebuffer_count(&self) -> usize {
        self.framebuffers.len()
    }
}

impl SwapchainObserver for RenderTargets {
    fn on_swapchain_recreated(&mut self, context: &VulkanContext) -> VulkanResult<()> {
        self.framebuffers.clear();

        let format = context.swapchain_format()?;
        if format != self.render_pass.color_format() {
            log::info!("Swapchain format changed to {format:?}, rebuilding render pass");
            self.render_pass = RenderPass::new_forward(context.device(), format)?;
        }

        self.depth = DepthBuffer::new(context, context.swapchain_extent()?)?;
        self.framebuffers = Self::create_framebuffers(context, &self.render_pass, &self.depth)?;

        log::debug!(
            "Rebuilt {} framebuffers at {}x{}",
            self.framebuffers.len(),
            self.extent().width,
            self.extent().height
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_attachment_is_cleared_and_presented() {
        let [color, _] = forward_attachments(vk::Format::B8G8R8A8_SRGB);
        assert_eq!(color.format, vk::Format::B8G8R8A8_SRGB);
        assert_eq!(color.load_op, vk::AttachmentLoadOp::CLEAR);
        assert_eq!(color.store_op, vk::AttachmentStoreOp::STORE);
        assert_eq!(color.initial_layout, vk::ImageLayout::UNDEFINED);
        assert_eq!(color.final_layout, vk::ImageLayout::PRESENT_SRC_KHR);
    }

    #[test]
    fn test_depth_attachment_is_cleared_and_discarded() {
        let [_, depth] = forward_attachments(vk::Format::B8G8R8A8_SRGB);
        assert_eq!(depth.format, vk::Format::D32_SFLOAT);
        assert_eq!(depth.load_op, vk::AttachmentLoadOp::CLEAR);
        assert_eq!(depth.store_op, vk::AttachmentStoreOp::DONT_CARE);
    }

    #[test]
    fn test_dependency_covers_color_and_depth_writes() {
        let dependency = forward_dependency();
        assert_eq!(dependency.src_subpass, vk::SUBPASS_EXTERNAL);
        assert!(dependency
            .dst_stage_mask
            .contains(vk::PipelineStageFlags::EARLY_FRAGMENT_TESTS));
        assert!(dependency
            .dst_access_mask
            .contains(vk::AccessFlags::COLOR_ATTACHMENT_WRITE | vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE));
    }

    #[test]
    fn test_clear_values() {
        let clears = clear_values([0.0, 0.0, 0.0, 1.0]);
        unsafe {
            assert_eq!(clears[0].color.float32, [0.0, 0.0, 0.0, 1.0]);
            assert_eq!(clears[1].depth_stencil.depth, 1.0);
        }
    }
}

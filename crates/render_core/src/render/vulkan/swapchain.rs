//! Vulkan swapchain management
//!
//! Surface queries, the format/present-mode/extent choices, and the RAII
//! swapchain that owns its image views. The choice functions are pure so they
//! can be tested without a device.

use ash::extensions::khr::{Surface, Swapchain as SwapchainLoader};
use ash::{vk, Device, Instance};

use crate::render::vulkan::{QueueFamilyIndices, VulkanError, VulkanResult};

/// Anything that can report a framebuffer size and block for OS events
///
/// Implemented by [`Window`](crate::render::vulkan::Window); swapchain
/// recreation uses it to park while the window is minimized.
pub trait FramebufferSource {
    /// Current framebuffer size in pixels
    fn framebuffer_size(&self) -> (u32, u32);

    /// Block until at least one OS event arrives
    fn wait_events(&mut self);
}

/// Block until the framebuffer has a non-zero area and return its size
///
/// A minimized window reports `(0, 0)`; building a swapchain with a zero
/// extent is invalid, so this parks on [`FramebufferSource::wait_events`]
/// until the window is restored.
pub fn wait_for_nonzero_framebuffer<S: FramebufferSource + ?Sized>(source: &mut S) -> (u32, u32) {
    let mut size = source.framebuffer_size();
    if size.0 == 0 || size.1 == 0 {
        log::debug!("Framebuffer is {}x{}, waiting for restore", size.0, size.1);
    }
    while size.0 == 0 || size.1 == 0 {
        source.wait_events();
        size = source.framebuffer_size();
    }
    size
}

/// Surface capabilities, formats and present modes of one physical device
#[derive(Debug, Clone)]
pub struct SwapchainSupport {
    /// Image count and extent limits
    pub capabilities: vk::SurfaceCapabilitiesKHR,
    /// Supported surface formats
    pub formats: Vec<vk::SurfaceFormatKHR>,
    /// Supported presentation modes
    pub present_modes: Vec<vk::PresentModeKHR>,
}

impl SwapchainSupport {
    /// Query the surface support of a physical device
    ///
    /// # Errors
    ///
    /// Propagates driver errors from the surface queries.
    pub fn query(
        surface_loader: &Surface,
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> VulkanResult<Self> {
        unsafe {
            Ok(Self {
                capabilities: surface_loader
                    .get_physical_device_surface_capabilities(physical_device, surface)
                    .map_err(VulkanError::Api)?,
                formats: surface_loader
                    .get_physical_device_surface_formats(physical_device, surface)
                    .map_err(VulkanError::Api)?,
                present_modes: surface_loader
                    .get_physical_device_surface_present_modes(physical_device, surface)
                    .map_err(VulkanError::Api)?,
            })
        }
    }

    /// At least one format and one present mode
    #[must_use]
    pub fn is_adequate(&self) -> bool {
        !self.formats.is_empty() && !self.present_modes.is_empty()
    }
}

/// Prefer 8-bit BGRA sRGB with a non-linear sRGB color space, else the first
#[must_use]
pub fn choose_surface_format(formats: &[vk::SurfaceFormatKHR]) -> Option<vk::SurfaceFormatKHR> {
    formats
        .iter()
        .find(|sf| {
            sf.format == vk::Format::B8G8R8A8_SRGB
                && sf.color_space == vk::ColorSpaceKHR::SRGB_NONLINEAR
        })
        .or_else(|| formats.first())
        .copied()
}

/// Prefer MAILBOX (low-latency triple buffering), else FIFO which is always available
#[must_use]
pub fn choose_present_mode(present_modes: &[vk::PresentModeKHR]) -> vk::PresentModeKHR {
    present_modes
        .iter()
        .copied()
        .find(|&mode| mode == vk::PresentModeKHR::MAILBOX)
        .unwrap_or(vk::PresentModeKHR::FIFO)
}

/// The surface's current extent, or the framebuffer size clamped to the
/// surface limits when the surface leaves it undefined (`u32::MAX`)
#[must_use]
pub fn choose_extent(
    capabilities: &vk::SurfaceCapabilitiesKHR,
    framebuffer_size: (u32, u32),
) -> vk::Extent2D {
    if capabilities.current_extent.width != u32::MAX {
        return capabilities.current_extent;
    }

    vk::Extent2D {
        width: framebuffer_size.0.clamp(
            capabilities.min_image_extent.width,
            capabilities.max_image_extent.width,
        ),
        height: framebuffer_size.1.clamp(
            capabilities.min_image_extent.height,
            capabilities.max_image_extent.height,
        ),
    }
}

/// One more than the minimum, capped by the maximum when it is non-zero
#[must_use]
pub fn choose_image_count(capabilities: &vk::SurfaceCapabilitiesKHR) -> u32 {
    let desired = capabilities.min_image_count + 1;
    if capabilities.max_image_count > 0 {
        desired.min(capabilities.max_image_count)
    } else {
        desired
    }
}

/// Swapchain management wrapper with RAII cleanup
pub struct Swapchain {
    device: Device,
    swapchain_loader: SwapchainLoader,
    swapchain: vk::SwapchainKHR,
    images: Vec<vk::Image>,
    image_views: Vec<vk::ImageView>,
    format: vk::SurfaceFormatKHR,
    extent: vk::Extent2D,
    present_mode: vk::PresentModeKHR,
}

impl Swapchain {
    /// Create a swapchain and one color view per image
    ///
    /// On failure every object created so far is destroyed before returning.
    ///
    /// # Errors
    ///
    /// Fails if the surface reports no formats or any creation call fails.
    pub fn new(
        instance: &Instance,
        device: &Device,
        surface_loader: &Surface,
        surface: vk::SurfaceKHR,
        physical_device: vk::PhysicalDevice,
        queue_families: &QueueFamilyIndices,
        framebuffer_size: (u32, u32),
    ) -> VulkanResult<Self> {
        let support = SwapchainSupport::query(surface_loader, physical_device, surface)?;
        let format = choose_surface_format(&support.formats).ok_or_else(|| {
            VulkanError::InitializationFailed("Surface reports no formats".to_string())
        })?;
        let present_mode = choose_present_mode(&support.present_modes);
        let extent = choose_extent(&support.capabilities, framebuffer_size);
        let image_count = choose_image_count(&support.capabilities);

        let (graphics, present) = queue_families.require()?;
        let family_indices = [graphics, present];
        let (sharing_mode, shared_families): (_, &[u32]) = if graphics == present {
            (vk::SharingMode::EXCLUSIVE, &[])
        } else {
            (vk::SharingMode::CONCURRENT, &family_indices)
        };

        let create_info = vk::SwapchainCreateInfoKHR::builder()
            .surface(surface)
            .min_image_count(image_count)
            .image_format(format.format)
            .image_color_space(format.color_space)
            .image_extent(extent)
            .image_array_layers(1)
            .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
            .image_sharing_mode(sharing_mode)
            .queue_family_indices(shared_families)
            .pre_transform(support.capabilities.current_transform)
            .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
            .present_mode(present_mode)
            .clipped(true)
            .old_swapchain(vk::SwapchainKHR::null());

        let swapchain_loader = SwapchainLoader::new(instance, device);
        let swapchain = unsafe {
            swapchain_loader
                .create_swapchain(&create_info, None)
                .map_err(VulkanError::Api)?
        };

        // Owned from here on so an early return cleans up through Drop
        let mut result = Self {
            device: device.clone(),
            swapchain_loader,
            swapchain,
            images: Vec::new(),
            image_views: Vec::new(),
            format,
            extent,
            present_mode,
        };

        result.images = unsafe {
            result
                .swapchain_loader
                .get_swapchain_images(swapchain)
                .map_err(VulkanError::Api)?
        };

        for &image in &result.images {
            let view_info = vk::ImageViewCreateInfo::builder()
                .image(image)
                .view_type(vk::ImageViewType::TYPE_2D)
                .format(format.format)
                .components(vk::ComponentMapping::default())
                .subresource_range(vk::ImageSubresourceRange {
                    aspect_mask: vk::ImageAspectFlags::COLOR,
                    base_mip_level: 0,
                    level_count: 1,
                    base_array_layer: 0,
                    layer_count: 1,
                });

            let view = unsafe {
                device
                    .create_image_view(&view_info, None)
                    .map_err(VulkanError::Api)?
            };
            result.image_views.push(view);
        }

        log::info!(
            "Created swapchain: {}x{}, {:?}/{:?}, {:?}, {} images",
            extent.width,
            extent.height,
            format.format,
            format.color_space,
            present_mode,
            result.images.len()
        );

        Ok(result)
    }

    /// Get swapchain extent
    #[must_use]
    pub const fn extent(&self) -> vk::Extent2D {
        self.extent
    }

    /// Get surface format
    #[must_use]
    pub const fn format(&self) -> vk::SurfaceFormatKHR {
        self.format
    }

    /// Selected presentation mode
    #[must_use]
    pub const fn present_mode(&self) -> vk::PresentModeKHR {
        self.present_mode
    }

    /// Get image views, one per swapchain image
    #[must_use]
    pub fn image_views(&self) -> &[vk::ImageView] {
        &self.image_views
    }

    /// Get swapchain handle
    #[must_use]
    pub const fn handle(&self) -> vk::SwapchainKHR {
        self.swapchain
    }

    /// Get swapchain loader
    #[must_use]
    pub const fn loader(&self) -> &SwapchainLoader {
        &self.swapchain_loader
    }

    /// Number of images the driver actually created
    #[must_use]
    pub fn image_count(&self) -> u32 {
        self.images.len() as u32
    }
}

impl Drop for Swapchain {
    fn drop(&mut self) {
        unsafe {
            for &image_view in &self.image_views {
                self.device.destroy_image_view(image_view, None);
            }
            self.swapchain_loader.destroy_swapchain(self.swapchain, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(format: vk::Format, color_space: vk::ColorSpaceKHR) -> vk::SurfaceFormatKHR {
        vk::SurfaceFormatKHR { format, color_space }
    }

    fn capabilities(min: u32, max: u32) -> vk::SurfaceCapabilitiesKHR {
        vk::SurfaceCapabilitiesKHR {
            min_image_count: min,
            max_image_count: max,
            current_extent: vk::Extent2D {
                width: u32::MAX,
                height: u32::MAX,
            },
            min_image_extent: vk::Extent2D {
                width: 1,
                height: 1,
            },
            max_image_extent: vk::Extent2D {
                width: 4096,
                height: 2048,
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_surface_format_prefers_bgra_srgb() {
        let formats = [
            format(vk::Format::R8G8B8A8_UNORM, vk::ColorSpaceKHR::SRGB_NONLINEAR),
            format(vk::Format::B8G8R8A8_SRGB, vk::ColorSpaceKHR::SRGB_NONLINEAR),
        ];
        assert_eq!(choose_surface_format(&formats), Some(formats[1]));
    }

    #[test]
    fn test_surface_format_falls_back_to_first() {
        let formats = [
            format(vk::Format::R8G8B8A8_UNORM, vk::ColorSpaceKHR::SRGB_NONLINEAR),
            format(vk::Format::B8G8R8A8_SRGB, vk::ColorSpaceKHR::EXTENDED_SRGB_LINEAR_EXT),
        ];
        assert_eq!(choose_surface_format(&formats), Some(formats[0]));
        assert_eq!(choose_surface_format(&[]), None);
    }

    #[test]
    fn test_present_mode_preference() {
        assert_eq!(
            choose_present_mode(&[vk::PresentModeKHR::FIFO, vk::PresentModeKHR::MAILBOX]),
            vk::PresentModeKHR::MAILBOX
        );
        assert_eq!(
            choose_present_mode(&[vk::PresentModeKHR::IMMEDIATE, vk::PresentModeKHR::FIFO]),
            vk::PresentModeKHR::FIFO
        );
    }

    #[test]
    fn test_extent_uses_current_when_defined() {
        let mut caps = capabilities(2, 3);
        caps.current_extent = vk::Extent2D {
            width: 800,
            height: 600,
        };
        assert_eq!(choose_extent(&caps, (1920, 1080)), caps.current_extent);
    }

    #[test]
    fn test_extent_clamps_framebuffer_when_undefined() {
        let caps = capabilities(2, 3);
        assert_eq!(
            choose_extent(&caps, (1280, 720)),
            vk::Extent2D {
                width: 1280,
                height: 720
            }
        );
        assert_eq!(
            choose_extent(&caps, (8000, 0)),
            vk::Extent2D {
                width: 4096,
                height: 1
            }
        );
    }

    #[test]
    fn test_image_count() {
        assert_eq!(choose_image_count(&capabilities(2, 0)), 3);
        assert_eq!(choose_image_count(&capabilities(2, 8)), 3);
        assert_eq!(choose_image_count(&capabilities(3, 3)), 3);
    }

    #[test]
    fn test_support_adequacy() {
        let mut support = SwapchainSupport {
            capabilities: capabilities(2, 3),
            formats: vec![format(vk::Format::B8G8R8A8_SRGB, vk::ColorSpaceKHR::SRGB_NONLINEAR)],
            present_modes: vec![],
        };
        assert!(!support.is_adequate());
        support.present_modes.push(vk::PresentModeKHR::FIFO);
        assert!(support.is_adequate());
    }

    struct MinimizedWindow {
        sizes: Vec<(u32, u32)>,
        waits: usize,
    }

    impl FramebufferSource for MinimizedWindow {
        fn framebuffer_size(&self) -> (u32, u32) {
            self.sizes[self.waits.min(self.sizes.len() - 1)]
        }

        fn wait_events(&mut self) {
            self.waits += 1;
        }
    }

    #[test]
    fn test_wait_blocks_until_nonzero_size() {
        let mut window = MinimizedWindow {
            sizes: vec![(0, 0), (0, 0), (640, 0), (640, 480)],
            waits: 0,
        };
        assert_eq!(wait_for_nonzero_framebuffer(&mut window), (640, 480));
        assert_eq!(window.waits, 3);
    }

    #[test]
    fn test_wait_returns_immediately_when_visible() {
        let mut window = MinimizedWindow {
            sizes: vec![(1280, 720)],
            waits: 0,
        };
        assert_eq!(wait_for_nonzero_framebuffer(&mut window), (1280, 720));
        assert_eq!(window.waits, 0);
    }
}

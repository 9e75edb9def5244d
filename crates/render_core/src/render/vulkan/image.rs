//! GPU images, views, samplers and layout transitions
//!
//! Sampled images go through one fixed path: created `UNDEFINED`, moved to
//! `TRANSFER_DST_OPTIMAL`, filled from a staging buffer, then moved to
//! `SHADER_READ_ONLY_OPTIMAL`. [`LayoutTransition`] knows only those two
//! steps.

use ash::{vk, Device};

use crate::render::vulkan::buffer::Buffer;
use crate::render::vulkan::memory;
use crate::render::vulkan::{VulkanContext, VulkanError, VulkanResult};

/// Parameters for [`Image::new`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDesc {
    /// Width and height in texels
    pub extent: vk::Extent2D,
    /// Texel format
    pub format: vk::Format,
    /// Optimal or linear tiling
    pub tiling: vk::ImageTiling,
    /// Usage flags
    pub usage: vk::ImageUsageFlags,
    /// Number of array layers (6 for a cubemap)
    pub array_layers: u32,
    /// Create with `CUBE_COMPATIBLE` and view as a cube
    pub cube_compatible: bool,
    /// Aspect used for views and barriers
    pub aspect: vk::ImageAspectFlags,
}

impl ImageDesc {
    /// Sampled 2D color image filled by transfer
    #[must_use]
    pub const fn texture_2d(width: u32, height: u32, format: vk::Format) -> Self {
        Self {
            extent: vk::Extent2D { width, height },
            format,
            tiling: vk::ImageTiling::OPTIMAL,
            usage: vk::ImageUsageFlags::from_raw(
                vk::ImageUsageFlags::TRANSFER_DST.as_raw() | vk::ImageUsageFlags::SAMPLED.as_raw(),
            ),
            array_layers: 1,
            cube_compatible: false,
            aspect: vk::ImageAspectFlags::COLOR,
        }
    }

    /// Sampled six-layer cube image with square faces
    #[must_use]
    pub const fn cubemap(size: u32, format: vk::Format) -> Self {
        let mut desc = Self::texture_2d(size, size, format);
        desc.array_layers = 6;
        desc.cube_compatible = true;
        desc
    }

    /// Depth attachment
    #[must_use]
    pub const fn depth(extent: vk::Extent2D, format: vk::Format) -> Self {
        Self {
            extent,
            format,
            tiling: vk::ImageTiling::OPTIMAL,
            usage: vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT,
            array_layers: 1,
            cube_compatible: false,
            aspect: vk::ImageAspectFlags::DEPTH,
        }
    }

    /// View type implied by the description
    #[must_use]
    pub fn view_type(&self) -> vk::ImageViewType {
        if self.cube_compatible {
            vk::ImageViewType::CUBE
        } else {
            vk::ImageViewType::TYPE_2D
        }
    }

    /// Tightly packed byte size of one array layer
    ///
    /// # Errors
    ///
    /// `InvalidOperation` for formats without a known texel size.
    pub fn layer_size(&self) -> VulkanResult<u64> {
        let texel = texel_size(self.format)
            .ok_or_else(|| VulkanError::invalid(format!("no texel size known for {:?}", self.format)))?;
        Ok(u64::from(self.extent.width) * u64::from(self.extent.height) * texel)
    }

    /// Check staged layer data against the image before any copy is recorded
    ///
    /// # Errors
    ///
    /// `InvalidOperation` when the layer count differs from `array_layers`
    /// or any layer is not exactly [`ImageDesc::layer_size`] bytes.
    pub fn validate_layers(&self, layers: &[&[u8]]) -> VulkanResult<u64> {
        if layers.len() != self.array_layers as usize {
            return Err(VulkanError::invalid(format!(
                "expected {} layers, got {}",
                self.array_layers,
                layers.len()
            )));
        }
        let expected = self.layer_size()?;
        if let Some(bad) = layers.iter().position(|layer| layer.len() as u64 != expected) {
            return Err(VulkanError::invalid(format!(
                "layer {bad} is {} bytes, expected {expected} for {}x{} {:?}",
                layers[bad].len(),
                self.extent.width,
                self.extent.height,
                self.format
            )));
        }
        Ok(expected)
    }

    fn subresource_range(&self) -> vk::ImageSubresourceRange {
        vk::ImageSubresourceRange {
            aspect_mask: self.aspect,
            base_mip_level: 0,
            level_count: 1,
            base_array_layer: 0,
            layer_count: self.array_layers,
        }
    }
}

/// Bytes per texel for the uncompressed formats uploaded from the host
#[must_use]
pub const fn texel_size(format: vk::Format) -> Option<u64> {
    match format {
        vk::Format::R8_UNORM | vk::Format::R8_SRGB => Some(1),
        vk::Format::R8G8_UNORM | vk::Format::R8G8_SRGB => Some(2),
        vk::Format::R8G8B8A8_UNORM
        | vk::Format::R8G8B8A8_SRGB
        | vk::Format::B8G8R8A8_UNORM
        | vk::Format::B8G8R8A8_SRGB
        | vk::Format::R32_SFLOAT
        | vk::Format::D32_SFLOAT => Some(4),
        vk::Format::R16G16B16A16_SFLOAT => Some(8),
        vk::Format::R32G32B32A32_SFLOAT => Some(16),
        _ => None,
    }
}

/// Access masks and stages for one supported layout change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutTransition {
    /// Layout before the barrier
    pub old_layout: vk::ImageLayout,
    /// Layout after the barrier
    pub new_layout: vk::ImageLayout,
    /// Accesses that must complete first
    pub src_access: vk::AccessFlags,
    /// Accesses that wait
    pub dst_access: vk::AccessFlags,
    /// Stage producing `src_access`
    pub src_stage: vk::PipelineStageFlags,
    /// Stage consuming `dst_access`
    pub dst_stage: vk::PipelineStageFlags,
}

impl LayoutTransition {
    /// Look up the barrier parameters for `old -> new`
    ///
    /// # Errors
    ///
    /// Any pair other than `UNDEFINED -> TRANSFER_DST_OPTIMAL` and
    /// `TRANSFER_DST_OPTIMAL -> SHADER_READ_ONLY_OPTIMAL` is a programming
    /// error reported as [`VulkanError::UnsupportedLayoutTransition`].
    pub fn between(old: vk::ImageLayout, new: vk::ImageLayout) -> VulkanResult<Self> {
        match (old, new) {
            (vk::ImageLayout::UNDEFINED, vk::ImageLayout::TRANSFER_DST_OPTIMAL) => Ok(Self {
                old_layout: old,
                new_layout: new,
                src_access: vk::AccessFlags::empty(),
                dst_access: vk::AccessFlags::TRANSFER_WRITE,
                src_stage: vk::PipelineStageFlags::TOP_OF_PIPE,
                dst_stage: vk::PipelineStageFlags::TRANSFER,
            }),
            (vk::ImageLayout::TRANSFER_DST_OPTIMAL, vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL) => {
                Ok(Self {
                    old_layout: old,
                    new_layout: new,
                    src_access: vk::AccessFlags::TRANSFER_WRITE,
                    dst_access: vk::AccessFlags::SHADER_READ,
                    src_stage: vk::PipelineStageFlags::TRANSFER,
                    dst_stage: vk::PipelineStageFlags::FRAGMENT_SHADER,
                })
            }
            (from, to) => Err(VulkanError::UnsupportedLayoutTransition { from, to }),
        }
    }

    /// Record the image memory barrier
    pub fn record(
        &self,
        device: &Device,
        command_buffer: vk::CommandBuffer,
        image: vk::Image,
        range: vk::ImageSubresourceRange,
    ) {
        let barrier = vk::ImageMemoryBarrier::builder()
            .old_layout(self.old_layout)
            .new_layout(self.new_layout)
            .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
            .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
            .image(image)
            .subresource_range(range)
            .src_access_mask(self.src_access)
            .dst_access_mask(self.dst_access)
            .build();

        unsafe {
            device.cmd_pipeline_barrier(
                command_buffer,
                self.src_stage,
                self.dst_stage,
                vk::DependencyFlags::empty(),
                &[],
                &[],
                &[barrier],
            );
        }
    }
}

/// Image and its memory, created and destroyed together
pub struct Image {
    device: Device,
    image: vk::Image,
    memory: vk::DeviceMemory,
    desc: ImageDesc,
    layout: vk::ImageLayout,
}

impl Image {
    /// Create a device-local image in `UNDEFINED` layout
    ///
    /// # Errors
    ///
    /// `InvalidOperation` for zero extent or layer count; otherwise memory
    /// selection or driver errors. Partial objects are destroyed.
    pub fn new(context: &VulkanContext, desc: &ImageDesc) -> VulkanResult<Self> {
        if desc.extent.width == 0 || desc.extent.height == 0 || desc.array_layers == 0 {
            return Err(VulkanError::invalid(format!(
                "image extent {}x{} with {} layers is empty",
                desc.extent.width, desc.extent.height, desc.array_layers
            )));
        }

        let flags = if desc.cube_compatible {
            vk::ImageCreateFlags::CUBE_COMPATIBLE
        } else {
            vk::ImageCreateFlags::empty()
        };

        let image_info = vk::ImageCreateInfo::builder()
            .flags(flags)
            .image_type(vk::ImageType::TYPE_2D)
            .extent(vk::Extent3D {
                width: desc.extent.width,
                height: desc.extent.height,
                depth: 1,
            })
            .mip_levels(1)
            .array_layers(desc.array_layers)
            .format(desc.format)
            .tiling(desc.tiling)
            .initial_layout(vk::ImageLayout::UNDEFINED)
            .usage(desc.usage)
            .samples(vk::SampleCountFlags::TYPE_1)
            .sharing_mode(vk::SharingMode::EXCLUSIVE);

        let device = context.device();
        let image = unsafe {
            device
                .create_image(&image_info, None)
                .map_err(VulkanError::Api)?
        };

        let mut result = Self {
            device: device.clone(),
            image,
            memory: vk::DeviceMemory::null(),
            desc: *desc,
            layout: vk::ImageLayout::UNDEFINED,
        };

        let requirements = unsafe { device.get_image_memory_requirements(image) };
        result.memory = memory::allocate(context, requirements, vk::MemoryPropertyFlags::DEVICE_LOCAL)?;

        unsafe {
            device
                .bind_image_memory(image, result.memory, 0)
                .map_err(VulkanError::Api)?;
        }

        Ok(result)
    }

    /// Create an image and fill every layer through the staging path
    ///
    /// # Errors
    ///
    /// See [`Image::new`] and [`Image::upload_layers`].
    pub fn with_layers(context: &VulkanContext, desc: &ImageDesc, layers: &[&[u8]]) -> VulkanResult<Self> {
        let mut image = Self::new(context, desc)?;
        image.upload_layers(context, layers)?;
        Ok(image)
    }

    /// Upload one tightly packed byte slice per array layer
    ///
    /// Stages all layers in one host-visible buffer, transitions the image to
    /// `TRANSFER_DST_OPTIMAL`, copies one region per layer, then transitions
    /// to `SHADER_READ_ONLY_OPTIMAL`, all in a single one-shot submission.
    /// The staging buffer is released when this returns.
    ///
    /// # Errors
    ///
    /// `InvalidOperation` when the layer count or sizes do not match the
    /// image, `UnsupportedLayoutTransition` if the image was already filled.
    pub fn upload_layers(&mut self, context: &VulkanContext, layers: &[&[u8]]) -> VulkanResult<()> {
        let layer_size = self.desc.validate_layers(layers)?;

        let to_transfer = LayoutTransition::between(self.layout, vk::ImageLayout::TRANSFER_DST_OPTIMAL)?;
        let to_shader = LayoutTransition::between(
            vk::ImageLayout::TRANSFER_DST_OPTIMAL,
            vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
        )?;

        let staging = Buffer::staging_with_data(context, &layers.concat())?;

        let regions: Vec<vk::BufferImageCopy> = (0..self.desc.array_layers)
            .map(|layer| vk::BufferImageCopy {
                buffer_offset: u64::from(layer) * layer_size,
                buffer_row_length: 0,
                buffer_image_height: 0,
                image_subresource: vk::ImageSubresourceLayers {
                    aspect_mask: self.desc.aspect,
                    mip_level: 0,
                    base_array_layer: layer,
                    layer_count: 1,
                },
                image_offset: vk::Offset3D { x: 0, y: 0, z: 0 },
                image_extent: vk::Extent3D {
                    width: self.desc.extent.width,
                    height: self.desc.extent.height,
                    depth: 1,
                },
            })
            .collect();

        let range = self.desc.subresource_range();
        let image = self.image;
        context.one_shot(|device, cmd| {
            to_transfer.record(device, cmd, image, range);
            unsafe {
                device.cmd_copy_buffer_to_image(
                    cmd,
                    staging.handle(),
                    image,
                    vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                    &regions,
                );
            }
            to_shader.record(device, cmd, image, range);
            Ok(())
        })?;

        self.layout = vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL;
        log::debug!(
            "Uploaded {} layer(s) of {}x{} {:?}",
            layers.len(),
            self.desc.extent.width,
            self.desc.extent.height,
            self.desc.format
        );
        Ok(())
    }

    /// Create a view covering every layer
    ///
    /// # Errors
    ///
    /// Propagates `vkCreateImageView` failures.
    pub fn create_view(&self) -> VulkanResult<ImageView> {
        ImageView::new(&self.device, self.image, &self.desc)
    }

    /// Image handle
    #[must_use]
    pub const fn handle(&self) -> vk::Image {
        self.image
    }

    /// Layout the image is known to be in
    #[must_use]
    pub const fn layout(&self) -> vk::ImageLayout {
        self.layout
    }

    /// Creation parameters
    #[must_use]
    pub const fn desc(&self) -> &ImageDesc {
        &self.desc
    }
}

impl Drop for Image {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_image(self.image, None);
            self.device.free_memory(self.memory, None);
        }
    }
}

/// Image view wrapper with RAII cleanup
pub struct ImageView {
    device: Device,
    view: vk::ImageView,
}

impl ImageView {
    fn new(device: &Device, image: vk::Image, desc: &ImageDesc) -> VulkanResult<Self> {
        let view_info = vk::ImageViewCreateInfo::builder()
            .image(image)
            .view_type(desc.view_type())
            .format(desc.format)
            .components(vk::ComponentMapping::default())
            .subresource_range(desc.subresource_range());

        let view = unsafe {
            device
                .create_image_view(&view_info, None)
                .map_err(VulkanError::Api)?
        };
        Ok(Self {
            device: device.clone(),
            view,
        })
    }

    /// View handle
    #[must_use]
    pub const fn handle(&self) -> vk::ImageView {
        self.view
    }
}

impl Drop for ImageView {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_image_view(self.view, None);
        }
    }
}

/// Parameters for [`Sampler::new`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerDesc {
    /// Address mode on all three axes
    pub address_mode: vk::SamplerAddressMode,
    /// Requested anisotropy; `None` disables it
    pub max_anisotropy: Option<f32>,
}

impl SamplerDesc {
    /// Linear filtering, wrapping coordinates
    #[must_use]
    pub const fn repeat() -> Self {
        Self {
            address_mode: vk::SamplerAddressMode::REPEAT,
            max_anisotropy: None,
        }
    }

    /// Linear filtering, clamped coordinates (cubemaps)
    #[must_use]
    pub const fn clamp_to_edge() -> Self {
        Self {
            address_mode: vk::SamplerAddressMode::CLAMP_TO_EDGE,
            max_anisotropy: None,
        }
    }

    /// Request `requested` anisotropy, limited by the device maximum
    ///
    /// `device_max` is `None` when the feature is not enabled, which turns
    /// anisotropy off.
    #[must_use]
    pub fn with_anisotropy(mut self, requested: f32, device_max: Option<f32>) -> Self {
        self.max_anisotropy = device_max.map(|max| requested.min(max));
        self
    }
}

/// Sampler wrapper with RAII cleanup
pub struct Sampler {
    device: Device,
    sampler: vk::Sampler,
}

impl Sampler {
    /// Create a linear-filtered sampler
    ///
    /// # Errors
    ///
    /// Propagates `vkCreateSampler` failures.
    pub fn new(context: &VulkanContext, desc: &SamplerDesc) -> VulkanResult<Self> {
        let sampler_info = vk::SamplerCreateInfo::builder()
            .mag_filter(vk::Filter::LINEAR)
            .min_filter(vk::Filter::LINEAR)
            .address_mode_u(desc.address_mode)
            .address_mode_v(desc.address_mode)
            .address_mode_w(desc.address_mode)
            .anisotropy_enable(desc.max_anisotropy.is_some())
            .max_anisotropy(desc.max_anisotropy.unwrap_or(1.0))
            .border_color(vk::BorderColor::INT_OPAQUE_BLACK)
            .unnormalized_coordinates(false)
            .compare_enable(false)
            .compare_op(vk::CompareOp::ALWAYS)
            .mipmap_mode(vk::SamplerMipmapMode::LINEAR)
            .mip_lod_bias(0.0)
            .min_lod(0.0)
            .max_lod(0.0);

        let device = context.device();
        let sampler = unsafe {
            device
                .create_sampler(&sampler_info, None)
                .map_err(VulkanError::Api)?
        };
        Ok(Self {
            device: device.clone(),
            sampler,
        })
    }

    /// Sampler handle
    #[must_use]
    pub const fn handle(&self) -> vk::Sampler {
        self.sampler
    }
}

impl Drop for Sampler {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_sampler(self.sampler, None);
        }
    }
}

/// Depth attachment sized to the swapchain
pub struct DepthBuffer {
    view: ImageView,
    image: Image,
}

impl DepthBuffer {
    /// Depth format used by the render pass
    pub const FORMAT: vk::Format = vk::Format::D32_SFLOAT;

    /// Create a device-local depth image and view
    ///
    /// # Errors
    ///
    /// See [`Image::new`].
    pub fn new(context: &VulkanContext, extent: vk::Extent2D) -> VulkanResult<Self> {
        let image = Image::new(context, &ImageDesc::depth(extent, Self::FORMAT))?;
        let view = image.create_view()?;
        Ok(Self { view, image })
    }

    /// View for framebuffer attachment
    #[must_use]
    pub const fn view(&self) -> vk::ImageView {
        self.view.handle()
    }

    /// Extent the buffer was created with
    #[must_use]
    pub const fn extent(&self) -> vk::Extent2D {
        self.image.desc.extent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undefined_to_transfer_dst() {
        let t = LayoutTransition::between(
            vk::ImageLayout::UNDEFINED,
            vk::ImageLayout::TRANSFER_DST_OPTIMAL,
        )
        .unwrap();
        assert_eq!(t.src_access, vk::AccessFlags::empty());
        assert_eq!(t.dst_access, vk::AccessFlags::TRANSFER_WRITE);
        assert_eq!(t.src_stage, vk::PipelineStageFlags::TOP_OF_PIPE);
        assert_eq!(t.dst_stage, vk::PipelineStageFlags::TRANSFER);
    }

    #[test]
    fn test_transfer_dst_to_shader_read() {
        let t = LayoutTransition::between(
            vk::ImageLayout::TRANSFER_DST_OPTIMAL,
            vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
        )
        .unwrap();
        assert_eq!(t.src_access, vk::AccessFlags::TRANSFER_WRITE);
        assert_eq!(t.dst_access, vk::AccessFlags::SHADER_READ);
        assert_eq!(t.src_stage, vk::PipelineStageFlags::TRANSFER);
        assert_eq!(t.dst_stage, vk::PipelineStageFlags::FRAGMENT_SHADER);
    }

    #[test]
    fn test_every_other_pair_is_rejected() {
        let layouts = [
            vk::ImageLayout::UNDEFINED,
            vk::ImageLayout::GENERAL,
            vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
            vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL,
            vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
            vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
            vk::ImageLayout::TRANSFER_DST_OPTIMAL,
            vk::ImageLayout::PRESENT_SRC_KHR,
        ];
        let supported = [
            (vk::ImageLayout::UNDEFINED, vk::ImageLayout::TRANSFER_DST_OPTIMAL),
            (
                vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
            ),
        ];

        for old in layouts {
            for new in layouts {
                let result = LayoutTransition::between(old, new);
                if supported.contains(&(old, new)) {
                    assert!(result.is_ok());
                } else {
                    assert!(matches!(
                        result,
                        Err(VulkanError::UnsupportedLayoutTransition { from, to }) if from == old && to == new
                    ));
                }
            }
        }
    }

    #[test]
    fn test_cubemap_desc() {
        let desc = ImageDesc::cubemap(256, vk::Format::R8G8B8A8_SRGB);
        assert_eq!(desc.array_layers, 6);
        assert!(desc.cube_compatible);
        assert_eq!(desc.view_type(), vk::ImageViewType::CUBE);
        assert_eq!(desc.subresource_range().layer_count, 6);
        assert!(desc.usage.contains(vk::ImageUsageFlags::SAMPLED | vk::ImageUsageFlags::TRANSFER_DST));
    }

    #[test]
    fn test_layer_size_follows_extent_and_format() {
        let desc = ImageDesc::texture_2d(2, 2, vk::Format::R8G8B8A8_SRGB);
        assert_eq!(desc.layer_size().unwrap(), 16);
        assert_eq!(ImageDesc::cubemap(8, vk::Format::R8G8B8A8_UNORM).layer_size().unwrap(), 256);
        assert!(ImageDesc::texture_2d(2, 2, vk::Format::BC1_RGB_UNORM_BLOCK).layer_size().is_err());
    }

    #[test]
    fn test_undersized_layer_is_rejected() {
        let desc = ImageDesc::texture_2d(2, 2, vk::Format::R8G8B8A8_SRGB);
        let short = [0u8; 4];
        assert!(matches!(
            desc.validate_layers(&[&short[..]]),
            Err(VulkanError::InvalidOperation { .. })
        ));

        let exact = [0u8; 16];
        assert_eq!(desc.validate_layers(&[&exact[..]]).unwrap(), 16);

        let long = [0u8; 20];
        assert!(desc.validate_layers(&[&long[..]]).is_err());
        assert!(desc.validate_layers(&[]).is_err());
    }

    #[test]
    fn test_cubemap_layers_checked_individually() {
        let desc = ImageDesc::cubemap(2, vk::Format::R8G8B8A8_SRGB);
        let face = [0u8; 16];
        let bad = [0u8; 12];
        let mut layers: Vec<&[u8]> = vec![&face[..]; 6];
        assert_eq!(desc.validate_layers(&layers).unwrap(), 16);

        layers[4] = &bad[..];
        assert!(desc.validate_layers(&layers).is_err());
        assert!(desc.validate_layers(&layers[..5]).is_err());
    }

    #[test]
    fn test_depth_desc_uses_depth_aspect() {
        let desc = ImageDesc::depth(vk::Extent2D { width: 4, height: 4 }, DepthBuffer::FORMAT);
        assert_eq!(desc.aspect, vk::ImageAspectFlags::DEPTH);
        assert_eq!(desc.view_type(), vk::ImageViewType::TYPE_2D);
    }

    #[test]
    fn test_anisotropy_clamped_to_device_limit() {
        let desc = SamplerDesc::repeat().with_anisotropy(16.0, Some(8.0));
        assert_eq!(desc.max_anisotropy, Some(8.0));

        let desc = SamplerDesc::repeat().with_anisotropy(16.0, Some(16.0));
        assert_eq!(desc.max_anisotropy, Some(16.0));

        let desc = SamplerDesc::clamp_to_edge().with_anisotropy(16.0, None);
        assert_eq!(desc.max_anisotropy, None);
    }
}

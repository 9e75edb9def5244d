//! Sampled 2D textures
//!
//! Textures are RGBA8 sRGB, uploaded once through the staging path and
//! sampled with linear filtering, repeat addressing and anisotropy when the
//! device supports it.

use ash::vk;
use std::path::{Path, PathBuf};

use crate::assets::ImageData;
use crate::render::vulkan::{
    Image, ImageDesc, ImageView, Sampler, SamplerDesc, VulkanContext, VulkanError, VulkanResult,
};

/// Where a texture's pixels came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextureSource {
    /// Decoded from this file
    File(PathBuf),
    /// Generated checkerboard after every file failed
    Checkerboard,
}

/// Decode the first path that loads, or fall back to a checkerboard
///
/// Each failure is logged at `warn!`.
#[must_use]
pub fn load_image_with_fallback(paths: &[&Path]) -> (ImageData, TextureSource) {
    for path in paths {
        match ImageData::from_file(path) {
            Ok(image) => return (image, TextureSource::File(path.to_path_buf())),
            Err(e) => log::warn!("Texture {} unavailable: {e}", path.display()),
        }
    }
    log::warn!("No texture could be loaded, using generated checkerboard");
    (ImageData::checkerboard(64, 8), TextureSource::Checkerboard)
}

/// Image, view and sampler for one texture
pub struct Texture {
    sampler: Sampler,
    view: ImageView,
    image: Image,
    source: TextureSource,
}

impl Texture {
    /// Texel format of every texture
    pub const FORMAT: vk::Format = vk::Format::R8G8B8A8_SRGB;
    /// Requested anisotropy, clamped to the device limit
    pub const MAX_ANISOTROPY: f32 = 16.0;

    /// Upload decoded pixels
    ///
    /// # Errors
    ///
    /// `InvalidOperation` for an empty image, or any allocation or
    /// submission failure.
    pub fn from_image_data(context: &VulkanContext, data: &ImageData, source: TextureSource) -> VulkanResult<Self> {
        if data.width == 0 || data.height == 0 {
            return Err(VulkanError::invalid("texture has zero size"));
        }

        let desc = ImageDesc::texture_2d(data.width, data.height, Self::FORMAT);
        let image = Image::with_layers(context, &desc, &[&data.data])?;
        let view = image.create_view()?;
        let sampler = Sampler::new(
            context,
            &SamplerDesc::repeat().with_anisotropy(Self::MAX_ANISOTROPY, context.max_anisotropy()),
        )?;

        log::info!("Texture uploaded: {}x{} from {source:?}", data.width, data.height);
        Ok(Self {
            sampler,
            view,
            image,
            source,
        })
    }

    /// Load `path`, then `fallback`, then a generated checkerboard
    ///
    /// # Errors
    ///
    /// Only GPU failures; missing or broken files fall through the chain.
    pub fn load_with_fallback(context: &VulkanContext, path: &Path, fallback: &Path) -> VulkanResult<Self> {
        let (data, source) = load_image_with_fallback(&[path, fallback]);
        Self::from_image_data(context, &data, source)
    }

    /// View handle for descriptors
    #[must_use]
    pub const fn view(&self) -> vk::ImageView {
        self.view.handle()
    }

    /// Sampler handle for descriptors
    #[must_use]
    pub const fn sampler(&self) -> vk::Sampler {
        self.sampler.handle()
    }

    /// Pixel size
    #[must_use]
    pub const fn extent(&self) -> vk::Extent2D {
        self.image.desc().extent
    }

    /// Where the pixels came from
    #[must_use]
    pub const fn source(&self) -> &TextureSource {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_png(dir: &Path, name: &str, color: [u8; 4]) -> PathBuf {
        let path = dir.join(name);
        image::RgbaImage::from_pixel(2, 2, image::Rgba(color)).save(&path).unwrap();
        path
    }

    #[test]
    fn test_primary_texture_wins() {
        let dir = tempfile::tempdir().unwrap();
        let primary = write_png(dir.path(), "primary.png", [10, 20, 30, 255]);
        let fallback = write_png(dir.path(), "fallback.png", [1, 1, 1, 255]);

        let (data, source) = load_image_with_fallback(&[&primary, &fallback]);
        assert_eq!(source, TextureSource::File(primary));
        assert_eq!(&data.data[0..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn test_falls_back_to_second_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.png");
        let fallback = write_png(dir.path(), "fallback.png", [1, 2, 3, 255]);

        let (data, source) = load_image_with_fallback(&[&missing, &fallback]);
        assert_eq!(source, TextureSource::File(fallback));
        assert_eq!(&data.data[0..4], &[1, 2, 3, 255]);
    }

    #[test]
    fn test_falls_back_to_checkerboard() {
        let dir = tempfile::tempdir().unwrap();
        let corrupt = dir.path().join("corrupt.png");
        std::fs::write(&corrupt, b"not a png").unwrap();

        let (data, source) = load_image_with_fallback(&[&corrupt, &dir.path().join("missing.png")]);
        assert_eq!(source, TextureSource::Checkerboard);
        assert_eq!(data.size_bytes(), 64 * 64 * 4);
    }
}

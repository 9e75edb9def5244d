//! Image loading utilities for texture data
//!
//! Decodes PNG and JPEG through the `image` crate into tightly packed RGBA8.

use std::path::Path;

use crate::assets::AssetError;

/// Loaded image data ready for GPU upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    /// RGBA8 pixels, row-major, no padding
    pub data: Vec<u8>,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
}

impl ImageData {
    /// Load an image from a file path
    ///
    /// # Errors
    ///
    /// `LoadFailed` when the file is missing or cannot be decoded.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AssetError> {
        let path = path.as_ref();
        log::debug!("Loading image from: {}", path.display());

        let img = image::open(path)
            .map_err(|e| AssetError::LoadFailed(format!("{}: {e}", path.display())))?;
        let image = Self::from_rgba(img.to_rgba8());

        log::info!("Loaded image {}x{} from {}", image.width, image.height, path.display());
        Ok(image)
    }

    /// Decode an in-memory encoded image
    ///
    /// # Errors
    ///
    /// `LoadFailed` when the bytes cannot be decoded.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AssetError> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| AssetError::LoadFailed(format!("Failed to load image from bytes: {e}")))?;
        Ok(Self::from_rgba(img.to_rgba8()))
    }

    fn from_rgba(rgba: image::RgbaImage) -> Self {
        let (width, height) = rgba.dimensions();
        Self {
            data: rgba.into_raw(),
            width,
            height,
        }
    }

    /// Create a solid color image
    #[must_use]
    pub fn solid_color(width: u32, height: u32, color: [u8; 4]) -> Self {
        let pixel_count = width as usize * height as usize;
        Self {
            data: color.repeat(pixel_count),
            width,
            height,
        }
    }

    /// Magenta/black checkerboard used when no texture can be loaded
    #[must_use]
    pub fn checkerboard(size: u32, cell: u32) -> Self {
        let cell = cell.max(1);
        let mut data = Vec::with_capacity(size as usize * size as usize * 4);
        for y in 0..size {
            for x in 0..size {
                let on = ((x / cell) + (y / cell)) % 2 == 0;
                data.extend_from_slice(if on { &[255, 0, 255, 255] } else { &[0, 0, 0, 255] });
            }
        }
        Self {
            data,
            width: size,
            height: size,
        }
    }

    /// Get the size of the image data in bytes
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solid_color_image() {
        let img = ImageData::solid_color(4, 4, [255, 0, 0, 255]);
        assert_eq!(img.width, 4);
        assert_eq!(img.height, 4);
        assert_eq!(img.size_bytes(), 4 * 4 * 4);
        assert_eq!(&img.data[0..4], &[255, 0, 0, 255]);
    }

    #[test]
    fn test_checkerboard_alternates() {
        let img = ImageData::checkerboard(4, 2);
        let pixel = |x: usize, y: usize| &img.data[(y * 4 + x) * 4..(y * 4 + x) * 4 + 4];
        assert_eq!(pixel(0, 0), &[255, 0, 255, 255]);
        assert_eq!(pixel(2, 0), &[0, 0, 0, 255]);
        assert_eq!(pixel(2, 2), &[255, 0, 255, 255]);
        assert_eq!(img.size_bytes(), 64);
    }

    #[test]
    fn test_png_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("red.png");
        image::RgbaImage::from_pixel(3, 2, image::Rgba([200, 10, 20, 255]))
            .save(&path)
            .unwrap();

        let loaded = ImageData::from_file(&path).unwrap();
        assert_eq!((loaded.width, loaded.height), (3, 2));
        assert_eq!(&loaded.data[0..4], &[200, 10, 20, 255]);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = ImageData::from_file("does/not/exist.png");
        assert!(matches!(result, Err(AssetError::LoadFailed(_))));
    }
}

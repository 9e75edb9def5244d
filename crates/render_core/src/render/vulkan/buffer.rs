//! GPU buffers
//!
//! A [`Buffer`] always owns its buffer handle and its memory together.
//! Device-local buffers are filled through a transient staging buffer.

use ash::{vk, Device};

use crate::render::vulkan::memory::{self, read_mapped, write_mapped};
use crate::render::vulkan::{VulkanContext, VulkanError, VulkanResult};

const STAGING_PROPERTIES: vk::MemoryPropertyFlags = vk::MemoryPropertyFlags::from_raw(
    vk::MemoryPropertyFlags::HOST_VISIBLE.as_raw() | vk::MemoryPropertyFlags::HOST_COHERENT.as_raw(),
);

/// Buffer wrapper with memory management
pub struct Buffer {
    device: Device,
    buffer: vk::Buffer,
    memory: vk::DeviceMemory,
    size: vk::DeviceSize,
    usage: vk::BufferUsageFlags,
    properties: vk::MemoryPropertyFlags,
}

impl Buffer {
    /// Create a buffer of exactly `size` bytes bound to new memory at offset 0
    ///
    /// If memory selection, allocation or binding fails, the buffer handle
    /// created so far is destroyed before the error is returned.
    ///
    /// # Errors
    ///
    /// `InvalidOperation` for a zero size, `NoSuitableMemoryType` when the
    /// properties cannot be met, or the driver's error.
    pub fn new(
        context: &VulkanContext,
        size: vk::DeviceSize,
        usage: vk::BufferUsageFlags,
        properties: vk::MemoryPropertyFlags,
    ) -> VulkanResult<Self> {
        if size == 0 {
            return Err(VulkanError::invalid("buffer size must be greater than zero"));
        }

        let device = context.device();
        let buffer_info = vk::BufferCreateInfo::builder()
            .size(size)
            .usage(usage)
            .sharing_mode(vk::SharingMode::EXCLUSIVE);

        let buffer = unsafe {
            device
                .create_buffer(&buffer_info, None)
                .map_err(VulkanError::Api)?
        };

        // Null memory is valid to free, so Drop covers every failure below
        let mut result = Self {
            device: device.clone(),
            buffer,
            memory: vk::DeviceMemory::null(),
            size,
            usage,
            properties,
        };

        let requirements = unsafe { device.get_buffer_memory_requirements(buffer) };
        result.memory = memory::allocate(context, requirements, properties)?;

        unsafe {
            device
                .bind_buffer_memory(buffer, result.memory, 0)
                .map_err(VulkanError::Api)?;
        }

        Ok(result)
    }

    /// Create a host-visible, host-coherent staging buffer holding `bytes`
    ///
    /// # Errors
    ///
    /// See [`Buffer::new`].
    pub fn staging_with_data(context: &VulkanContext, bytes: &[u8]) -> VulkanResult<Self> {
        let staging = Self::new(
            context,
            bytes.len() as vk::DeviceSize,
            vk::BufferUsageFlags::TRANSFER_SRC,
            STAGING_PROPERTIES,
        )?;
        staging.write(0, bytes)?;
        Ok(staging)
    }

    /// Upload `bytes` into a new device-local buffer
    ///
    /// Creates a staging buffer, copies the data into it, creates the
    /// destination with `usage | TRANSFER_DST`, records a buffer copy on a
    /// one-shot command buffer and waits for it. The staging buffer is
    /// destroyed when this returns, on success or failure.
    ///
    /// # Errors
    ///
    /// Fails on empty data, allocation failure or a failed submission.
    pub fn device_local_with_data(
        context: &VulkanContext,
        bytes: &[u8],
        usage: vk::BufferUsageFlags,
    ) -> VulkanResult<Self> {
        let staging = Self::staging_with_data(context, bytes)?;
        let destination = Self::new(
            context,
            staging.size,
            usage | vk::BufferUsageFlags::TRANSFER_DST,
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
        )?;

        copy_buffer(context, &staging, &destination)?;
        log::debug!("Uploaded {} bytes to device-local buffer ({usage:?})", bytes.len());
        Ok(destination)
    }

    /// Copy the contents of this buffer back to the host
    ///
    /// Host-visible buffers are mapped directly; device-local ones are copied
    /// into a transient host-visible buffer first, which requires
    /// `TRANSFER_SRC` usage.
    ///
    /// # Errors
    ///
    /// `InvalidOperation` if the buffer can be neither mapped nor copied from.
    pub fn read_back(&self, context: &VulkanContext) -> VulkanResult<Vec<u8>> {
        if self.is_host_visible() {
            return self.read();
        }
        if !self.usage.contains(vk::BufferUsageFlags::TRANSFER_SRC) {
            return Err(VulkanError::invalid(
                "read back requires TRANSFER_SRC usage on device-local buffers",
            ));
        }

        let readback = Self::new(
            context,
            self.size,
            vk::BufferUsageFlags::TRANSFER_DST,
            STAGING_PROPERTIES,
        )?;
        copy_buffer(context, self, &readback)?;
        readback.read()
    }

    /// Write `bytes` at `offset` (map, copy, unmap)
    ///
    /// # Errors
    ///
    /// `InvalidOperation` if the memory is not host-visible or the write
    /// would run past the end of the buffer.
    pub fn write(&self, offset: vk::DeviceSize, bytes: &[u8]) -> VulkanResult<()> {
        if !self.is_host_visible() {
            return Err(VulkanError::invalid("cannot map device-local buffer"));
        }
        let end = offset.checked_add(bytes.len() as vk::DeviceSize);
        if end.map_or(true, |end| end > self.size) {
            return Err(VulkanError::invalid(format!(
                "write of {} bytes at offset {offset} exceeds buffer size {}",
                bytes.len(),
                self.size
            )));
        }
        if bytes.is_empty() {
            return Ok(());
        }
        write_mapped(&self.device, self.memory, offset, bytes)
    }

    /// Write a slice of plain-old-data values at offset 0
    ///
    /// # Errors
    ///
    /// See [`write`](Self::write).
    pub fn write_pod<T: bytemuck::Pod>(&self, data: &[T]) -> VulkanResult<()> {
        self.write(0, bytemuck::cast_slice(data))
    }

    /// Read the whole buffer through a mapping
    ///
    /// # Errors
    ///
    /// `InvalidOperation` if the memory is not host-visible.
    pub fn read(&self) -> VulkanResult<Vec<u8>> {
        if !self.is_host_visible() {
            return Err(VulkanError::invalid("cannot map device-local buffer"));
        }
        read_mapped(&self.device, self.memory, self.size as usize)
    }

    fn is_host_visible(&self) -> bool {
        self.properties.contains(vk::MemoryPropertyFlags::HOST_VISIBLE)
    }

    /// Get buffer handle
    #[must_use]
    pub const fn handle(&self) -> vk::Buffer {
        self.buffer
    }

    /// Requested size in bytes
    #[must_use]
    pub const fn size(&self) -> vk::DeviceSize {
        self.size
    }

    /// Usage flags the buffer was created with
    #[must_use]
    pub const fn usage(&self) -> vk::BufferUsageFlags {
        self.usage
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_buffer(self.buffer, None);
            self.device.free_memory(self.memory, None);
        }
    }
}

/// Copy all of `src` into `dst` on a one-shot command buffer
fn copy_buffer(context: &VulkanContext, src: &Buffer, dst: &Buffer) -> VulkanResult<()> {
    let region = vk::BufferCopy {
        src_offset: 0,
        dst_offset: 0,
        size: src.size.min(dst.size),
    };
    context.one_shot(|device, cmd| {
        unsafe {
            device.cmd_copy_buffer(cmd, src.buffer, dst.buffer, &[region]);
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DebugMessengerConfig, WindowConfig};
    use crate::render::vulkan::{ContextConfig, Window};

    fn headless_context() -> (Window, VulkanContext) {
        let mut window = Window::new(&WindowConfig::default().with_size(320, 240).with_cursor_capture(false)).unwrap();
        let config = ContextConfig {
            application_name: "buffer tests".to_string(),
            validation: DebugMessengerConfig::default().with_enabled(false),
        };
        let context = VulkanContext::new(&mut window, &config).unwrap();
        (window, context)
    }

    #[test]
    fn test_staging_properties_are_host_visible_and_coherent() {
        assert!(STAGING_PROPERTIES.contains(vk::MemoryPropertyFlags::HOST_VISIBLE));
        assert!(STAGING_PROPERTIES.contains(vk::MemoryPropertyFlags::HOST_COHERENT));
        assert!(!STAGING_PROPERTIES.contains(vk::MemoryPropertyFlags::DEVICE_LOCAL));
    }

    #[test]
    #[ignore = "requires a Vulkan device and a display"]
    fn test_zero_size_rejected() {
        let (_window, context) = headless_context();
        let result = Buffer::new(
            &context,
            0,
            vk::BufferUsageFlags::VERTEX_BUFFER,
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
        );
        assert!(matches!(result, Err(VulkanError::InvalidOperation { .. })));
    }

    #[test]
    #[ignore = "requires a Vulkan device and a display"]
    fn test_upload_read_back_round_trip() {
        let (_window, context) = headless_context();
        let pattern: Vec<u8> = (0..4096_u32).map(|i| (i * 31 % 251) as u8).collect();

        let buffer = Buffer::device_local_with_data(
            &context,
            &pattern,
            vk::BufferUsageFlags::VERTEX_BUFFER | vk::BufferUsageFlags::TRANSFER_SRC,
        )
        .unwrap();

        assert_eq!(buffer.size(), pattern.len() as u64);
        assert_eq!(buffer.read_back(&context).unwrap(), pattern);
    }

    #[test]
    #[ignore = "requires a Vulkan device and a display"]
    fn test_impossible_memory_type_fails_cleanly() {
        let (_window, context) = headless_context();
        let impossible = vk::MemoryPropertyFlags::from_raw(0x8000_0000);

        let result = Buffer::new(&context, 256, vk::BufferUsageFlags::UNIFORM_BUFFER, impossible);
        assert!(matches!(result, Err(VulkanError::NoSuitableMemoryType { .. })));

        // The partially built buffer was destroyed; the device is still usable
        let ok = Buffer::new(
            &context,
            256,
            vk::BufferUsageFlags::UNIFORM_BUFFER,
            STAGING_PROPERTIES,
        );
        assert!(ok.is_ok());
    }

    #[test]
    #[ignore = "requires a Vulkan device and a display"]
    fn test_out_of_bounds_write_rejected() {
        let (_window, context) = headless_context();
        let buffer = Buffer::new(
            &context,
            16,
            vk::BufferUsageFlags::UNIFORM_BUFFER,
            STAGING_PROPERTIES,
        )
        .unwrap();

        assert!(buffer.write(8, &[0u8; 8]).is_ok());
        assert!(buffer.write(9, &[0u8; 8]).is_err());
        assert!(buffer.write(u64::MAX, &[0u8; 1]).is_err());
    }
}

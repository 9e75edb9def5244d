//! Vulkan synchronization primitives for GPU/CPU coordination
//!
//! RAII wrappers for semaphores and fences, and the per-slot bundle used by
//! the frame scheduler:
//!
//! ```text
//! acquire ──signal──▶ image_available ──wait@COLOR_OUTPUT──▶ submit
//! submit  ──signal──▶ render_finished ──wait──▶ present
//! submit  ──signal──▶ in_flight (fence) ──wait on CPU──▶ next use of this slot
//! ```

use ash::{vk, Device};

use crate::render::vulkan::{VulkanError, VulkanResult};

/// GPU-GPU synchronization primitive with automatic resource management
///
/// Signaled by one queue operation and waited on by another, without CPU
/// involvement.
pub struct Semaphore {
    device: Device,
    semaphore: vk::Semaphore,
}

impl Semaphore {
    /// Create a new binary semaphore
    ///
    /// # Errors
    ///
    /// Propagates `vkCreateSemaphore` failures.
    pub fn new(device: Device) -> VulkanResult<Self> {
        let create_info = vk::SemaphoreCreateInfo::builder();

        let semaphore = unsafe {
            device
                .create_semaphore(&create_info, None)
                .map_err(VulkanError::Api)?
        };

        Ok(Self { device, semaphore })
    }

    /// Get the semaphore handle
    #[must_use]
    pub const fn handle(&self) -> vk::Semaphore {
        self.semaphore
    }
}

impl Drop for Semaphore {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_semaphore(self.semaphore, None);
        }
    }
}

/// Fence wrapper with RAII cleanup
pub struct Fence {
    device: Device,
    fence: vk::Fence,
}

impl Fence {
    /// Create a fence, optionally already signaled
    ///
    /// # Errors
    ///
    /// Propagates `vkCreateFence` failures.
    pub fn new(device: Device, signaled: bool) -> VulkanResult<Self> {
        let flags = if signaled {
            vk::FenceCreateFlags::SIGNALED
        } else {
            vk::FenceCreateFlags::empty()
        };

        let create_info = vk::FenceCreateInfo::builder().flags(flags);

        let fence = unsafe {
            device
                .create_fence(&create_info, None)
                .map_err(VulkanError::Api)?
        };

        Ok(Self { device, fence })
    }

    /// Block until signaled, with no timeout
    ///
    /// # Errors
    ///
    /// Device loss is reported as [`VulkanError::DeviceLost`].
    pub fn wait(&self) -> VulkanResult<()> {
        unsafe {
            self.device
                .wait_for_fences(&[self.fence], true, u64::MAX)
                .map_err(|e| VulkanError::from_frame_result(e, "wait_for_fences"))
        }
    }

    /// Reset to unsignaled
    ///
    /// # Errors
    ///
    /// Propagates `vkResetFences` failures.
    pub fn reset(&self) -> VulkanResult<()> {
        unsafe {
            self.device
                .reset_fences(&[self.fence])
                .map_err(VulkanError::Api)
        }
    }

    /// Non-blocking status query
    ///
    /// # Errors
    ///
    /// Device loss is reported as [`VulkanError::DeviceLost`].
    pub fn is_signaled(&self) -> VulkanResult<bool> {
        unsafe {
            self.device
                .get_fence_status(self.fence)
                .map_err(|e| VulkanError::from_frame_result(e, "get_fence_status"))
        }
    }

    /// Get the fence handle
    #[must_use]
    pub const fn handle(&self) -> vk::Fence {
        self.fence
    }
}

impl Drop for Fence {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_fence(self.fence, None);
        }
    }
}

/// Synchronization objects for one frame-in-flight slot
pub struct FrameSync {
    /// Signaled by acquire, waited on by submit
    pub image_available: Semaphore,
    /// Signaled by submit, waited on by present
    pub render_finished: Semaphore,
    /// Signaled when the slot's submission completes; created signaled so the
    /// first wait returns immediately
    pub in_flight: Fence,
}

impl FrameSync {
    /// Create frame synchronization objects
    ///
    /// # Errors
    ///
    /// Propagates creation failures; objects created so far are destroyed.
    pub fn new(device: &Device) -> VulkanResult<Self> {
        Ok(Self {
            image_available: Semaphore::new(device.clone())?,
            render_finished: Semaphore::new(device.clone())?,
            in_flight: Fence::new(device.clone(), true)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RendererConfig, WindowConfig};
    use crate::render::vulkan::{ContextConfig, VulkanContext, Window};

    #[test]
    #[ignore = "requires a Vulkan device and a display"]
    fn test_fence_signal_state_follows_reset() {
        let mut window = Window::new(&WindowConfig::default().with_cursor_capture(false)).unwrap();
        let context = VulkanContext::new(&mut window, &ContextConfig::from(&RendererConfig::default())).unwrap();

        let sync = FrameSync::new(context.device()).unwrap();
        assert!(sync.in_flight.is_signaled().unwrap());
        sync.in_flight.wait().unwrap();

        sync.in_flight.reset().unwrap();
        assert!(!sync.in_flight.is_signaled().unwrap());

        let unsignaled = Fence::new(context.device().clone(), false).unwrap();
        assert!(!unsignaled.is_signaled().unwrap());
    }
}

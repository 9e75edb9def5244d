//! Vulkan backend
//!
//! Device and swapchain ownership, GPU memory, and frame scheduling. Every
//! wrapper here owns its handles and destroys them on drop.

/// Buffers with staged uploads
pub mod buffer;
/// Command pools and recording
pub mod commands;
/// Instance, device and swapchain ownership
pub mod context;
/// Frames-in-flight scheduling
pub mod frame;
/// Images, views, samplers and layout transitions
pub mod image;
/// Memory type selection
pub mod memory;
/// Swapchain creation and selection rules
pub mod swapchain;
/// Semaphores and fences
pub mod sync;
/// GLFW window
pub mod window;

pub use buffer::Buffer;
pub use commands::{ActiveRenderPass, CommandPool, CommandRecorder, OneShotCommands};
pub use context::{
    ContextConfig, LogicalDevice, PhysicalDeviceInfo, QueueFamilyIndices, VulkanContext, VulkanError,
    VulkanInstance, VulkanResult,
};
pub use frame::{
    AcquireOutcome, FrameBackend, FramePhase, FrameResources, FrameScheduler, FrameStatus, FrameToken,
    PresentOutcome, SwapchainObserver, VulkanFrameBackend,
};
pub use image::{DepthBuffer, Image, ImageDesc, ImageView, LayoutTransition, Sampler, SamplerDesc};
pub use memory::select_memory_type;
pub use swapchain::{FramebufferSource, Swapchain};
pub use sync::{Fence, FrameSync, Semaphore};
pub use window::{Window, WindowError};

//! # Render Core
//!
//! Vulkan rendering core for a real-time PBR model viewer.
//!
//! ## Features
//!
//! - **Device/Swapchain Context**: instance, device selection, surface and swapchain
//!   ownership, one-shot command submission, swapchain recreation
//! - **Resource Allocator**: buffers and images backed by manually selected memory
//!   types, with a staging upload protocol and explicit layout transitions
//! - **Frame Pipeline Scheduler**: frames in flight, acquire → record → submit →
//!   present, invalidation handling
//! - **Scene collaborators**: meshes, PBR material, gradient skybox, textures, camera
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use render_core::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ViewerConfig::default();
//!     let mut window = Window::new(&config.window)?;
//!     let mut renderer = ForwardRenderer::new(&mut window, &config.renderer)?;
//!     renderer.load_scene(&config.scene)?;
//!
//!     let camera = Camera::default();
//!     while !window.should_close() {
//!         window.poll_events();
//!         let mut sink = ResizeOnly::default();
//!         window.dispatch_events(&mut sink);
//!         if sink.resized {
//!             renderer.request_resize();
//!         }
//!         renderer.draw_frame(&mut window, &camera)?;
//!     }
//!     renderer.wait_idle()?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod assets;
pub mod config;
pub mod events;
pub mod foundation;
pub mod render;
pub mod scene;

/// Common imports for renderer users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, RendererConfig, SceneConfig, ViewerConfig, WindowConfig},
        events::{ResizeOnly, WindowEvent, WindowEventSink},
        foundation::{
            math::{Mat4, Vec3},
            time::FrameTimer,
        },
        render::{
            renderer::ForwardRenderer,
            vulkan::{VulkanContext, VulkanError, VulkanResult, Window, WindowError},
        },
        scene::camera::Camera,
    };
}

//! # Rendering System
//!
//! Layered from the bottom up:
//! - **vulkan**: device context, resource allocation and the frame scheduler
//! - **vertex / uniforms / descriptors / pipeline / targets**: the fixed
//!   function state and GPU data layouts the forward pass uses
//! - **renderer**: `ForwardRenderer`, which ties the layers to the scene

pub mod descriptors;
pub mod pipeline;
pub mod renderer;
pub mod targets;
pub mod uniforms;
pub mod vertex;
pub mod vulkan;

pub use renderer::ForwardRenderer;

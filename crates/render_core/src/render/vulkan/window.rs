//! Window management using GLFW
//!
//! Provides window creation, Vulkan surface creation and typed event dispatch

use ash::vk;
use thiserror::Error;

use crate::config::WindowConfig;
use crate::events::{WindowEvent, WindowEventSink};
use crate::render::vulkan::swapchain::FramebufferSource;

/// Window management errors
#[derive(Error, Debug)]
pub enum WindowError {
    /// GLFW could not be initialized
    #[error("GLFW initialization failed: {0}")]
    InitializationFailed(String),

    /// The window itself could not be created
    #[error("Window creation failed")]
    CreationFailed,

    /// GLFW reports no Vulkan loader or no presentation support
    #[error("Vulkan is not supported by this GLFW build or system")]
    VulkanUnsupported,

    /// Surface creation returned an error code
    #[error("Failed to create Vulkan surface: {0}")]
    SurfaceCreation(vk::Result),
}

/// Result type for window operations
pub type WindowResult<T> = Result<T, WindowError>;

/// GLFW window wrapper with proper resource management
pub struct Window {
    glfw: glfw::Glfw,
    window: glfw::PWindow,
    events: glfw::GlfwReceiver<(f64, glfw::WindowEvent)>,
}

impl Window {
    /// Create a window configured for Vulkan (no client API)
    ///
    /// # Errors
    ///
    /// Fails if GLFW cannot initialize, Vulkan is unavailable, or window
    /// creation fails.
    pub fn new(config: &WindowConfig) -> WindowResult<Self> {
        let mut glfw = glfw::init(glfw::fail_on_errors)
            .map_err(|e| WindowError::InitializationFailed(format!("{e:?}")))?;

        if !glfw.vulkan_supported() {
            return Err(WindowError::VulkanUnsupported);
        }

        glfw.window_hint(glfw::WindowHint::ClientApi(glfw::ClientApiHint::NoApi));
        glfw.window_hint(glfw::WindowHint::Resizable(config.resizable));

        let (mut window, events) = glfw
            .create_window(config.width, config.height, &config.title, glfw::WindowMode::Windowed)
            .ok_or(WindowError::CreationFailed)?;

        window.set_key_polling(true);
        window.set_close_polling(true);
        window.set_framebuffer_size_polling(true);
        window.set_cursor_pos_polling(true);
        window.set_scroll_polling(true);

        if config.capture_cursor {
            window.set_cursor_mode(glfw::CursorMode::Disabled);
        }

        log::info!(
            "Created window \"{}\" ({}x{})",
            config.title,
            config.width,
            config.height
        );

        Ok(Self {
            glfw,
            window,
            events,
        })
    }

    /// Whether the window has been asked to close
    #[must_use]
    pub fn should_close(&self) -> bool {
        self.window.should_close()
    }

    /// Request or cancel closing
    pub fn set_should_close(&mut self, should_close: bool) {
        self.window.set_should_close(should_close);
    }

    /// Process pending OS events without blocking
    pub fn poll_events(&mut self) {
        self.glfw.poll_events();
    }

    /// Drain queued events into `sink`
    ///
    /// Replaces GLFW's pointer-based callbacks: each event is converted to a
    /// [`WindowEvent`] and delivered on the calling thread.
    pub fn dispatch_events<S: WindowEventSink + ?Sized>(&mut self, sink: &mut S) {
        for (_, event) in glfw::flush_messages(&self.events) {
            if let Some(event) = WindowEvent::from_glfw(&event) {
                event.dispatch(sink);
            }
        }
    }

    /// Current key state, for continuous input such as movement
    #[must_use]
    pub fn is_key_pressed(&self, key: glfw::Key) -> bool {
        self.window.get_key(key) == glfw::Action::Press
    }

    /// Framebuffer size in pixels
    #[must_use]
    pub fn get_framebuffer_size(&self) -> (u32, u32) {
        let (width, height) = self.window.get_framebuffer_size();
        (width.max(0) as u32, height.max(0) as u32)
    }

    /// Get required Vulkan instance extensions from GLFW
    ///
    /// # Errors
    ///
    /// Fails when GLFW cannot report the surface extensions.
    pub fn required_instance_extensions(&self) -> WindowResult<Vec<String>> {
        self.glfw
            .get_required_instance_extensions()
            .ok_or(WindowError::VulkanUnsupported)
    }

    /// Create a Vulkan surface for this window
    ///
    /// # Errors
    ///
    /// Returns the driver's error code if surface creation fails.
    pub fn create_vulkan_surface(&self, instance: vk::Instance) -> WindowResult<vk::SurfaceKHR> {
        let mut surface = vk::SurfaceKHR::null();
        let result = self
            .window
            .create_window_surface(instance, std::ptr::null(), &mut surface);

        if result == vk::Result::SUCCESS {
            Ok(surface)
        } else {
            Err(WindowError::SurfaceCreation(result))
        }
    }
}

impl FramebufferSource for Window {
    fn framebuffer_size(&self) -> (u32, u32) {
        self.get_framebuffer_size()
    }

    fn wait_events(&mut self) {
        self.glfw.wait_events();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[ignore = "requires a Vulkan device and a display"]
    fn test_window_reports_framebuffer_and_extensions() {
        let config = WindowConfig::default().with_size(320, 240).with_cursor_capture(false);
        let window = Window::new(&config).unwrap();

        let (width, height) = window.framebuffer_size();
        assert!(width > 0 && height > 0);
        assert!(!window.required_instance_extensions().unwrap().is_empty());
    }
}

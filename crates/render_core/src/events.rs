//! Typed window events
//!
//! GLFW delivers events through a channel; [`Window::dispatch_events`] drains
//! it, converts each message into a [`WindowEvent`] and hands it to a
//! [`WindowEventSink`] supplied by the caller. Consumers never see GLFW
//! callbacks or user pointers.
//!
//! [`Window::dispatch_events`]: crate::render::vulkan::Window::dispatch_events

pub use glfw::{Action, Key};

/// Events the viewer reacts to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WindowEvent {
    /// Framebuffer size changed (pixels, may be zero while minimized)
    FramebufferResized {
        /// New width
        width: u32,
        /// New height
        height: u32,
    },
    /// Cursor moved to a new position in screen coordinates
    CursorMoved {
        /// Horizontal position
        x: f64,
        /// Vertical position
        y: f64,
    },
    /// Mouse wheel or trackpad scroll
    Scrolled {
        /// Horizontal offset
        dx: f64,
        /// Vertical offset
        dy: f64,
    },
    /// Key state change
    Key {
        /// Key that changed
        key: Key,
        /// Press, release or repeat
        action: Action,
    },
    /// The user asked to close the window
    CloseRequested,
}

impl WindowEvent {
    /// Convert a raw GLFW event, dropping the kinds the viewer ignores
    #[must_use]
    pub fn from_glfw(event: &glfw::WindowEvent) -> Option<Self> {
        match *event {
            glfw::WindowEvent::FramebufferSize(width, height) => Some(Self::FramebufferResized {
                width: width.max(0) as u32,
                height: height.max(0) as u32,
            }),
            glfw::WindowEvent::CursorPos(x, y) => Some(Self::CursorMoved { x, y }),
            glfw::WindowEvent::Scroll(dx, dy) => Some(Self::Scrolled { dx, dy }),
            glfw::WindowEvent::Key(key, _, action, _) => Some(Self::Key { key, action }),
            glfw::WindowEvent::Close => Some(Self::CloseRequested),
            _ => None,
        }
    }

    /// Route this event to the matching sink method
    pub fn dispatch<S: WindowEventSink + ?Sized>(self, sink: &mut S) {
        match self {
            Self::FramebufferResized { width, height } => sink.on_framebuffer_resized(width, height),
            Self::CursorMoved { x, y } => sink.on_cursor_moved(x, y),
            Self::Scrolled { dx, dy } => sink.on_scroll(dx, dy),
            Self::Key { key, action } => sink.on_key(key, action),
            Self::CloseRequested => sink.on_close_requested(),
        }
    }
}

/// Receiver for window events
///
/// Every method defaults to a no-op so implementors only override what
/// they care about.
pub trait WindowEventSink {
    /// Framebuffer resized; implementations should only record the fact
    fn on_framebuffer_resized(&mut self, _width: u32, _height: u32) {}

    /// Cursor moved
    fn on_cursor_moved(&mut self, _x: f64, _y: f64) {}

    /// Scroll wheel moved
    fn on_scroll(&mut self, _dx: f64, _dy: f64) {}

    /// Key pressed, released or repeated
    fn on_key(&mut self, _key: Key, _action: Action) {}

    /// Close requested
    fn on_close_requested(&mut self) {}
}

/// Sink that only records whether a resize happened
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ResizeOnly {
    /// Set once any resize event was seen
    pub resized: bool,
}

impl WindowEventSink for ResizeOnly {
    fn on_framebuffer_resized(&mut self, _width: u32, _height: u32) {
        self.resized = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        events: Vec<WindowEvent>,
    }

    impl WindowEventSink for Recorder {
        fn on_framebuffer_resized(&mut self, width: u32, height: u32) {
            self.events.push(WindowEvent::FramebufferResized { width, height });
        }

        fn on_scroll(&mut self, dx: f64, dy: f64) {
            self.events.push(WindowEvent::Scrolled { dx, dy });
        }

        fn on_key(&mut self, key: Key, action: Action) {
            self.events.push(WindowEvent::Key { key, action });
        }
    }

    #[test]
    fn test_glfw_conversion() {
        assert_eq!(
            WindowEvent::from_glfw(&glfw::WindowEvent::FramebufferSize(800, 600)),
            Some(WindowEvent::FramebufferResized { width: 800, height: 600 })
        );
        assert_eq!(
            WindowEvent::from_glfw(&glfw::WindowEvent::Scroll(0.0, -1.0)),
            Some(WindowEvent::Scrolled { dx: 0.0, dy: -1.0 })
        );
        assert_eq!(
            WindowEvent::from_glfw(&glfw::WindowEvent::Close),
            Some(WindowEvent::CloseRequested)
        );
        assert_eq!(WindowEvent::from_glfw(&glfw::WindowEvent::Focus(true)), None);
    }

    #[test]
    fn test_negative_framebuffer_size_clamps_to_zero() {
        assert_eq!(
            WindowEvent::from_glfw(&glfw::WindowEvent::FramebufferSize(-1, 0)),
            Some(WindowEvent::FramebufferResized { width: 0, height: 0 })
        );
    }

    #[test]
    fn test_dispatch_reaches_overridden_methods_only() {
        let mut recorder = Recorder::default();
        WindowEvent::Scrolled { dx: 0.0, dy: 2.0 }.dispatch(&mut recorder);
        WindowEvent::CursorMoved { x: 1.0, y: 1.0 }.dispatch(&mut recorder);
        WindowEvent::Key { key: Key::W, action: Action::Press }.dispatch(&mut recorder);

        assert_eq!(
            recorder.events,
            vec![
                WindowEvent::Scrolled { dx: 0.0, dy: 2.0 },
                WindowEvent::Key { key: Key::W, action: Action::Press },
            ]
        );
    }

    #[test]
    fn test_resize_only_sink() {
        let mut sink = ResizeOnly::default();
        WindowEvent::CursorMoved { x: 3.0, y: 4.0 }.dispatch(&mut sink);
        assert!(!sink.resized);
        WindowEvent::FramebufferResized { width: 0, height: 0 }.dispatch(&mut sink);
        assert!(sink.resized);
    }
}

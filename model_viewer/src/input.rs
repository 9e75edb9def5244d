//! Mouse, scroll and keyboard mapping for the fly camera

use render_core::events::{Action, Key, WindowEventSink};
use render_core::scene::{Camera, CameraMovement};

/// Keys polled every frame for continuous movement
pub const MOVEMENT_KEYS: [(Key, CameraMovement); 4] = [
    (Key::W, CameraMovement::Forward),
    (Key::S, CameraMovement::Backward),
    (Key::A, CameraMovement::Left),
    (Key::D, CameraMovement::Right),
];

/// Translates window events into camera motion
///
/// Borrowed for one dispatch; resize and quit requests are latched so the
/// main loop can act on them after the events are drained.
pub struct CameraController<'a> {
    camera: &'a mut Camera,
    state: &'a mut InputState,
}

/// Input state that persists between frames
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct InputState {
    last_cursor: Option<(f64, f64)>,
    /// Framebuffer changed size since the flag was last cleared
    pub resized: bool,
    /// Escape or window close was requested
    pub quit: bool,
}

impl<'a> CameraController<'a> {
    /// Route events into `camera` and `state`
    pub fn new(camera: &'a mut Camera, state: &'a mut InputState) -> Self {
        Self { camera, state }
    }
}

impl WindowEventSink for CameraController<'_> {
    fn on_framebuffer_resized(&mut self, _width: u32, _height: u32) {
        self.state.resized = true;
    }

    fn on_cursor_moved(&mut self, x: f64, y: f64) {
        // First sample only seeds the position so the view does not jump
        let Some((last_x, last_y)) = self.state.last_cursor.replace((x, y)) else {
            return;
        };
        // Screen y grows downward
        let x_offset = (x - last_x) as f32;
        let y_offset = (last_y - y) as f32;
        self.camera.process_mouse(x_offset, y_offset);
    }

    fn on_scroll(&mut self, _dx: f64, dy: f64) {
        self.camera.process_scroll(dy as f32);
    }

    fn on_key(&mut self, key: Key, action: Action) {
        if key == Key::Escape && action == Action::Press {
            self.state.quit = true;
        }
    }

    fn on_close_requested(&mut self) {
        self.state.quit = true;
    }
}

/// Apply held movement keys for one frame of `delta_time` seconds
pub fn apply_movement(camera: &mut Camera, delta_time: f32, is_pressed: impl Fn(Key) -> bool) {
    for (key, direction) in MOVEMENT_KEYS {
        if is_pressed(key) {
            camera.process_keyboard(direction, delta_time);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use render_core::events::WindowEvent;
    use render_core::foundation::math::Vec3;

    fn camera() -> Camera {
        Camera::new(Vec3::zeros(), -90.0, 0.0)
    }

    #[test]
    fn test_first_cursor_sample_does_not_turn() {
        let mut camera = camera();
        let mut state = InputState::default();
        let mut controller = CameraController::new(&mut camera, &mut state);

        WindowEvent::CursorMoved { x: 500.0, y: 300.0 }.dispatch(&mut controller);
        assert!((camera.yaw + 90.0).abs() < f32::EPSILON);
        assert!(camera.pitch.abs() < f32::EPSILON);
        assert_eq!(state.last_cursor, Some((500.0, 300.0)));
    }

    #[test]
    fn test_cursor_motion_turns_camera() {
        let mut camera = camera();
        let mut state = InputState::default();
        {
            let mut controller = CameraController::new(&mut camera, &mut state);
            WindowEvent::CursorMoved { x: 100.0, y: 100.0 }.dispatch(&mut controller);
            // Right and up
            WindowEvent::CursorMoved { x: 150.0, y: 80.0 }.dispatch(&mut controller);
        }
        assert!((camera.yaw - (-85.0)).abs() < 1e-4);
        assert!((camera.pitch - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_scroll_zooms() {
        let mut camera = camera();
        let mut state = InputState::default();
        WindowEvent::Scrolled { dx: 0.0, dy: 3.0 }.dispatch(&mut CameraController::new(&mut camera, &mut state));
        assert!((camera.zoom - 42.0).abs() < 1e-5);
    }

    #[test]
    fn test_resize_and_escape_are_latched() {
        let mut camera = camera();
        let mut state = InputState::default();
        {
            let mut controller = CameraController::new(&mut camera, &mut state);
            WindowEvent::Key { key: Key::Escape, action: Action::Release }.dispatch(&mut controller);
            WindowEvent::FramebufferResized { width: 0, height: 0 }.dispatch(&mut controller);
        }
        assert!(state.resized);
        assert!(!state.quit);

        WindowEvent::Key { key: Key::Escape, action: Action::Press }
            .dispatch(&mut CameraController::new(&mut camera, &mut state));
        assert!(state.quit);
    }

    #[test]
    fn test_held_keys_move_camera() {
        let mut camera = camera();
        apply_movement(&mut camera, 0.5, |key| key == Key::W || key == Key::D);
        assert!((camera.position - Vec3::new(1.25, 0.0, -1.25)).norm() < 1e-5);
    }
}

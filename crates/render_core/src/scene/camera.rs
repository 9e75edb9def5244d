//! # Fly Camera
//!
//! Yaw/pitch camera driven by keyboard and mouse.
//!
//! ## Coordinate System
//! Right-handed, Y-up world. With yaw -90° and pitch 0° the camera looks
//! down -Z. The projection maps into Vulkan clip space (depth `[0, 1]`,
//! Y flipped) so no extra correction matrix is needed downstream.

use crate::foundation::math::{utils, Mat4, Mat4Ext, Vec3};

/// Movement directions for keyboard input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMovement {
    /// Along the view direction
    Forward,
    /// Against the view direction
    Backward,
    /// Against the right vector
    Left,
    /// Along the right vector
    Right,
}

/// First-person camera with Euler angles in degrees
#[derive(Debug, Clone)]
pub struct Camera {
    /// Camera position in world space
    pub position: Vec3,
    /// World up, used to derive the right vector
    pub world_up: Vec3,
    /// Heading in degrees
    pub yaw: f32,
    /// Elevation in degrees, kept within ±[`Camera::PITCH_LIMIT`]
    pub pitch: f32,
    /// Units per second
    pub movement_speed: f32,
    /// Degrees per pixel of mouse motion
    pub mouse_sensitivity: f32,
    /// Vertical field of view in degrees
    pub zoom: f32,
    /// Near clip distance
    pub near: f32,
    /// Far clip distance
    pub far: f32,
    front: Vec3,
    right: Vec3,
    up: Vec3,
}

impl Camera {
    /// Largest pitch magnitude in degrees
    pub const PITCH_LIMIT: f32 = 89.0;
    /// Narrowest field of view in degrees
    pub const MIN_ZOOM: f32 = 1.0;
    /// Widest field of view in degrees
    pub const MAX_ZOOM: f32 = 45.0;

    /// Camera at `position` facing along `yaw`/`pitch`
    #[must_use]
    pub fn new(position: Vec3, yaw: f32, pitch: f32) -> Self {
        let mut camera = Self {
            position,
            world_up: Vec3::new(0.0, 1.0, 0.0),
            yaw,
            pitch: pitch.clamp(-Self::PITCH_LIMIT, Self::PITCH_LIMIT),
            movement_speed: 2.5,
            mouse_sensitivity: 0.1,
            zoom: Self::MAX_ZOOM,
            near: 0.1,
            far: 100.0,
            front: Vec3::new(0.0, 0.0, -1.0),
            right: Vec3::new(1.0, 0.0, 0.0),
            up: Vec3::new(0.0, 1.0, 0.0),
        };
        camera.update_vectors();
        camera
    }

    /// Move for `delta_time` seconds in `direction`
    pub fn process_keyboard(&mut self, direction: CameraMovement, delta_time: f32) {
        let velocity = self.movement_speed * delta_time;
        match direction {
            CameraMovement::Forward => self.position += self.front * velocity,
            CameraMovement::Backward => self.position -= self.front * velocity,
            CameraMovement::Left => self.position -= self.right * velocity,
            CameraMovement::Right => self.position += self.right * velocity,
        }
    }

    /// Turn by a mouse offset in pixels; positive `y_offset` looks up
    pub fn process_mouse(&mut self, x_offset: f32, y_offset: f32) {
        self.yaw += x_offset * self.mouse_sensitivity;
        self.pitch = (self.pitch + y_offset * self.mouse_sensitivity).clamp(-Self::PITCH_LIMIT, Self::PITCH_LIMIT);
        self.update_vectors();
    }

    /// Narrow or widen the field of view by a scroll offset
    pub fn process_scroll(&mut self, y_offset: f32) {
        self.zoom = (self.zoom - y_offset).clamp(Self::MIN_ZOOM, Self::MAX_ZOOM);
    }

    /// World-to-view transform
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at(&self.position, &(self.position + self.front), &self.up)
    }

    /// View-to-clip transform for `aspect` (width / height)
    #[must_use]
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_vulkan(utils::deg_to_rad(self.zoom), aspect, self.near, self.far)
    }

    /// Unit view direction
    #[must_use]
    pub const fn front(&self) -> Vec3 {
        self.front
    }

    /// Unit right vector
    #[must_use]
    pub const fn right(&self) -> Vec3 {
        self.right
    }

    /// Unit camera up vector
    #[must_use]
    pub const fn up(&self) -> Vec3 {
        self.up
    }

    fn update_vectors(&mut self) {
        let yaw = utils::deg_to_rad(self.yaw);
        let pitch = utils::deg_to_rad(self.pitch);
        self.front = Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos()).normalize();
        self.right = self.front.cross(&self.world_up).normalize();
        self.up = self.right.cross(&self.front).normalize();
    }
}

impl Default for Camera {
    /// Slightly above and to the right of the origin, looking back at it
    fn default() -> Self {
        Self::new(Vec3::new(2.0, 1.5, 4.0), -105.0, -15.0)
    }
}

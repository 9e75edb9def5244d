//! # Viewer Configuration
//!
//! Every setting the model viewer reads at startup, grouped by subsystem:
//!
//! - **Window**: title, size, resizability, cursor capture
//! - **Renderer**: frames in flight, validation messenger, shader directory, clear color
//! - **Scene**: model and texture paths, skybox gradient, material and light
//!
//! All structs use `#[serde(default)]`, so a config file only needs the keys
//! it wants to override.

use serde::{Deserialize, Serialize};

pub use crate::config::{Config, ConfigError};

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(message.into())
}

/// # Window Configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window title
    pub title: String,
    /// Initial width in screen coordinates
    pub width: u32,
    /// Initial height in screen coordinates
    pub height: u32,
    /// Whether the user may resize the window
    pub resizable: bool,
    /// Hide and lock the cursor for mouse-look
    pub capture_cursor: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Vulkan PBR Renderer".to_string(),
            width: 1280,
            height: 720,
            resizable: true,
            capture_cursor: true,
        }
    }
}

impl WindowConfig {
    /// Set the window title
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the initial window size
    #[must_use]
    pub const fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Enable or disable cursor capture
    #[must_use]
    pub const fn with_cursor_capture(mut self, capture: bool) -> Self {
        self.capture_cursor = capture;
        self
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Rejects a zero width or height.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(invalid(format!(
                "window size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

/// Lowest severity the validation messenger forwards to the log
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Diagnostic chatter
    Verbose,
    /// Informational messages
    Info,
    /// Likely misuse
    Warning,
    /// Invalid API usage
    Error,
}

/// # Validation Messenger Configuration
///
/// Injected into context construction. `enabled: None` follows the build
/// type (on in debug builds, off in release).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugMessengerConfig {
    /// Explicit on/off, or `None` to follow `debug_assertions`
    pub enabled: Option<bool>,
    /// Messages below this severity are not requested from the driver
    pub min_severity: Severity,
}

impl Default for DebugMessengerConfig {
    fn default() -> Self {
        Self {
            enabled: None,
            min_severity: Severity::Warning,
        }
    }
}

impl DebugMessengerConfig {
    /// Resolve the `Option` against the build type
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(cfg!(debug_assertions))
    }

    /// Force validation on or off
    #[must_use]
    pub const fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    /// Set the minimum forwarded severity
    #[must_use]
    pub const fn with_min_severity(mut self, severity: Severity) -> Self {
        self.min_severity = severity;
        self
    }
}

/// # Renderer Configuration
///
/// Settings for the Vulkan context and the frame scheduler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Application name reported to the Vulkan instance
    pub application_name: String,
    /// Frames the CPU may prepare ahead of the GPU
    pub frames_in_flight: usize,
    /// Validation layer and debug messenger settings
    pub validation: DebugMessengerConfig,
    /// Directory holding the compiled `*.spv` shaders
    pub shader_dir: String,
    /// Color attachment clear value (RGBA)
    pub clear_color: [f32; 4],
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            application_name: "Vulkan PBR Renderer".to_string(),
            frames_in_flight: 2,
            validation: DebugMessengerConfig::default(),
            shader_dir: "target/shaders".to_string(),
            clear_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

impl RendererConfig {
    /// Maximum supported frames in flight
    pub const MAX_FRAMES_IN_FLIGHT: usize = 4;

    /// Set frames in flight
    #[must_use]
    pub const fn with_frames_in_flight(mut self, frames: usize) -> Self {
        self.frames_in_flight = frames;
        self
    }

    /// Set validation settings
    #[must_use]
    pub const fn with_validation(mut self, validation: DebugMessengerConfig) -> Self {
        self.validation = validation;
        self
    }

    /// Set the compiled shader directory
    #[must_use]
    pub fn with_shader_dir(mut self, dir: impl Into<String>) -> Self {
        self.shader_dir = dir.into();
        self
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Rejects an empty application name, frames in flight outside
    /// `1..=4` or an empty shader directory.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.application_name.is_empty() {
            return Err(invalid("application name cannot be empty"));
        }
        if !(1..=Self::MAX_FRAMES_IN_FLIGHT).contains(&self.frames_in_flight) {
            return Err(invalid(format!(
                "frames in flight must be in 1..={}, got {}",
                Self::MAX_FRAMES_IN_FLIGHT,
                self.frames_in_flight
            )));
        }
        if self.shader_dir.is_empty() {
            return Err(invalid("shader directory cannot be empty"));
        }
        Ok(())
    }
}

/// Gradient skybox settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkyboxConfig {
    /// Color at the zenith
    pub top_color: [f32; 3],
    /// Color at the nadir
    pub bottom_color: [f32; 3],
    /// Edge length of each cube face in texels
    pub resolution: u32,
}

impl Default for SkyboxConfig {
    fn default() -> Self {
        Self {
            top_color: [0.5, 0.7, 1.0],
            bottom_color: [0.9, 0.9, 0.8],
            resolution: 256,
        }
    }
}

/// PBR surface parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialConfig {
    /// Base color multiplier
    pub albedo: [f32; 3],
    /// Metalness in `[0, 1]`
    pub metallic: f32,
    /// Roughness in `[0, 1]`
    pub roughness: f32,
    /// Ambient occlusion factor
    pub ao: f32,
}

impl Default for MaterialConfig {
    fn default() -> Self {
        Self {
            albedo: [1.0, 1.0, 1.0],
            metallic: 0.0,
            roughness: 0.5,
            ao: 1.0,
        }
    }
}

/// Single point light
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    /// World-space position
    pub position: [f32; 3],
    /// Radiant intensity per channel
    pub color: [f32; 3],
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            position: [10.0, 10.0, 10.0],
            color: [300.0, 300.0, 300.0],
        }
    }
}

/// # Scene Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Wavefront OBJ model to display
    pub model_path: String,
    /// Albedo texture for the model
    pub texture_path: String,
    /// Texture tried when `texture_path` fails to load
    pub fallback_texture_path: String,
    /// Background gradient
    pub skybox: SkyboxConfig,
    /// Surface parameters
    pub material: MaterialConfig,
    /// Scene light
    pub light: LightConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            model_path: "resources/models/Chair/Chair.obj".to_string(),
            texture_path: "resources/models/Chair/Texture/Chair/Chair_Base_color.png".to_string(),
            fallback_texture_path: "resources/models/default_texture.png".to_string(),
            skybox: SkyboxConfig::default(),
            material: MaterialConfig::default(),
            light: LightConfig::default(),
        }
    }
}

impl SceneConfig {
    /// Set the model path
    #[must_use]
    pub fn with_model(mut self, path: impl Into<String>) -> Self {
        self.model_path = path.into();
        self
    }

    /// Set the albedo texture path
    #[must_use]
    pub fn with_texture(mut self, path: impl Into<String>) -> Self {
        self.texture_path = path.into();
        self
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Rejects an empty model path, a zero skybox resolution and PBR
    /// factors outside `[0, 1]`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model_path.is_empty() {
            return Err(invalid("model path cannot be empty"));
        }
        if self.skybox.resolution == 0 {
            return Err(invalid("skybox resolution must be at least 1"));
        }
        let unit = 0.0..=1.0;
        for (name, value) in [
            ("metallic", self.material.metallic),
            ("roughness", self.material.roughness),
            ("ao", self.material.ao),
        ] {
            if !unit.contains(&value) {
                return Err(invalid(format!("{name} must be in [0, 1], got {value}")));
            }
        }
        Ok(())
    }
}

/// # Complete Viewer Configuration
///
/// Top-level structure loaded from `viewer.toml` (or the path given on the
/// command line).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Default `env_logger` filter, overridden by `RUST_LOG`
    pub log_level: String,
    /// Window settings
    pub window: WindowConfig,
    /// Renderer settings
    pub renderer: RendererConfig,
    /// Scene settings
    pub scene: SceneConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            window: WindowConfig::default(),
            renderer: RendererConfig::default(),
            scene: SceneConfig::default(),
        }
    }
}

impl ViewerConfig {
    /// Validate the entire configuration
    ///
    /// # Errors
    ///
    /// Returns the first section that fails validation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.window.validate()?;
        self.renderer.validate()?;
        self.scene.validate()?;
        Ok(())
    }
}

impl Config for ViewerConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ViewerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.renderer.frames_in_flight, 2);
        assert_eq!(config.scene.skybox.resolution, 256);
        assert_eq!(config.scene.light.position, [10.0, 10.0, 10.0]);
    }

    #[test]
    fn test_frames_in_flight_bounds() {
        assert!(RendererConfig::default().with_frames_in_flight(0).validate().is_err());
        assert!(RendererConfig::default().with_frames_in_flight(1).validate().is_ok());
        assert!(RendererConfig::default().with_frames_in_flight(4).validate().is_ok());
        assert!(RendererConfig::default().with_frames_in_flight(5).validate().is_err());
    }

    #[test]
    fn test_zero_window_size_rejected() {
        let err = WindowConfig::default().with_size(0, 720).validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_zero_skybox_resolution_rejected() {
        let mut scene = SceneConfig::default();
        scene.skybox.resolution = 0;
        assert!(scene.validate().is_err());
    }

    #[test]
    fn test_roughness_out_of_range_rejected() {
        let mut scene = SceneConfig::default();
        scene.material.roughness = 1.5;
        assert!(scene.validate().is_err());
    }

    #[test]
    fn test_validation_follows_build_type_when_unset() {
        let config = DebugMessengerConfig::default();
        assert_eq!(config.is_enabled(), cfg!(debug_assertions));
        assert!(config.with_enabled(true).is_enabled());
    }

    #[test]
    fn test_toml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("viewer.toml");

        let mut config = ViewerConfig::default();
        config.window = config.window.with_title("Round Trip").with_size(800, 600);
        config.renderer.validation = DebugMessengerConfig::default()
            .with_enabled(false)
            .with_min_severity(Severity::Error);
        config.save_to_file(&path).unwrap();

        let loaded = ViewerConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_ron_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("viewer.ron");

        let config = ViewerConfig {
            scene: SceneConfig::default().with_model("models/cube.obj"),
            ..ViewerConfig::default()
        };
        config.save_to_file(&path).unwrap();

        assert_eq!(ViewerConfig::load_from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("viewer.toml");
        std::fs::write(
            &path,
            "log_level = \"debug\"\n\n[window]\nwidth = 1920\n\n[renderer.validation]\nmin_severity = \"info\"\n",
        )
        .unwrap();

        let config = ViewerConfig::load_from_file(&path).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.window.width, 1920);
        assert_eq!(config.window.height, 720);
        assert_eq!(config.renderer.validation.min_severity, Severity::Info);
        assert_eq!(config.renderer.frames_in_flight, 2);
    }
}

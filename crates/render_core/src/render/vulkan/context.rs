//! Vulkan context management
//!
//! Owns the instance, optional debug messenger, surface, physical and logical
//! device, swapchain and the graphics command pool. Resource objects borrow the
//! context; only the renderer owns it.

use ash::extensions::ext::DebugUtils;
use ash::extensions::khr::{Surface, Swapchain as SwapchainLoader};
use ash::{vk, Device, Entry, Instance};
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::path::PathBuf;
use thiserror::Error;

use crate::config::{DebugMessengerConfig, RendererConfig, Severity};
use crate::render::vulkan::commands::{CommandPool, OneShotCommands};
use crate::render::vulkan::memory::select_memory_type;
use crate::render::vulkan::swapchain::{wait_for_nonzero_framebuffer, FramebufferSource, Swapchain, SwapchainSupport};
use crate::render::vulkan::window::{Window, WindowError};

const VALIDATION_LAYER: &str = "VK_LAYER_KHRONOS_validation";

/// Vulkan-specific error types
#[derive(Error, Debug)]
pub enum VulkanError {
    /// General Vulkan API error with result code
    #[error("Vulkan API error: {0:?}")]
    Api(vk::Result),

    /// Vulkan context initialization failed
    #[error("Initialization failed: {0}")]
    InitializationFailed(String),

    /// No memory type matches the filter and property flags
    #[error("No suitable memory type (filter {type_filter:#b}, required {required:?})")]
    NoSuitableMemoryType {
        /// Bitmask of acceptable memory type indices
        type_filter: u32,
        /// Property flags the memory type must include
        required: vk::MemoryPropertyFlags,
    },

    /// Layout transition outside the supported pairs
    #[error("Unsupported layout transition: {from:?} -> {to:?}")]
    UnsupportedLayoutTransition {
        /// Current layout
        from: vk::ImageLayout,
        /// Requested layout
        to: vk::ImageLayout,
    },

    /// Invalid operation attempted
    #[error("Invalid operation: {reason}")]
    InvalidOperation {
        /// Description of why the operation is invalid
        reason: String,
    },

    /// The presentation surface went away
    #[error("Surface lost: {0}")]
    SurfaceLost(String),

    /// The logical device was lost
    #[error("Device lost")]
    DeviceLost,

    /// Window layer failure
    #[error(transparent)]
    Window(#[from] WindowError),

    /// Failed to read a shader or asset file
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File that could not be read
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },
}

impl VulkanError {
    /// Map a result from an acquire, submit or present call
    ///
    /// Device and surface loss get their own variants; everything else is
    /// reported as a plain API error.
    #[must_use]
    pub fn from_frame_result(result: vk::Result, operation: &str) -> Self {
        match result {
            vk::Result::ERROR_DEVICE_LOST => Self::DeviceLost,
            vk::Result::ERROR_SURFACE_LOST_KHR => Self::SurfaceLost(operation.to_string()),
            other => Self::Api(other),
        }
    }

    /// Out-of-date and suboptimal surfaces never become errors, so nothing
    /// that reaches the caller can be retried.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::Api(_)
            | Self::InitializationFailed(_)
            | Self::NoSuitableMemoryType { .. }
            | Self::UnsupportedLayoutTransition { .. }
            | Self::InvalidOperation { .. }
            | Self::SurfaceLost(_)
            | Self::DeviceLost
            | Self::Window(_)
            | Self::Io { .. } => false,
        }
    }

    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidOperation {
            reason: reason.into(),
        }
    }
}

/// Result type for Vulkan operations
pub type VulkanResult<T> = Result<T, VulkanError>;

fn c_string(value: &str) -> VulkanResult<CString> {
    CString::new(value)
        .map_err(|_| VulkanError::InitializationFailed(format!("String contains a NUL byte: {value:?}")))
}

/// Settings consumed by [`VulkanContext::new`]
#[derive(Debug, Clone)]
pub struct ContextConfig {
    /// Application name reported to the driver
    pub application_name: String,
    /// Validation layer and debug messenger
    pub validation: DebugMessengerConfig,
}

impl From<&RendererConfig> for ContextConfig {
    fn from(config: &RendererConfig) -> Self {
        Self {
            application_name: config.application_name.clone(),
            validation: config.validation.clone(),
        }
    }
}

/// Severity flags at or above `min`
#[must_use]
pub fn severity_flags(min: Severity) -> vk::DebugUtilsMessageSeverityFlagsEXT {
    [
        (Severity::Verbose, vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE),
        (Severity::Info, vk::DebugUtilsMessageSeverityFlagsEXT::INFO),
        (Severity::Warning, vk::DebugUtilsMessageSeverityFlagsEXT::WARNING),
        (Severity::Error, vk::DebugUtilsMessageSeverityFlagsEXT::ERROR),
    ]
    .into_iter()
    .filter(|(severity, _)| *severity >= min)
    .fold(vk::DebugUtilsMessageSeverityFlagsEXT::empty(), |acc, (_, flag)| acc | flag)
}

/// Log level a driver message is forwarded at
#[must_use]
pub fn log_level_for(severity: vk::DebugUtilsMessageSeverityFlagsEXT) -> log::Level {
    if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR) {
        log::Level::Error
    } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING) {
        log::Level::Warn
    } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::INFO) {
        log::Level::Info
    } else {
        log::Level::Trace
    }
}

/// Debug callback for validation layers
unsafe extern "system" fn debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT,
    _user_data: *mut std::ffi::c_void,
) -> vk::Bool32 {
    if callback_data.is_null() || (*callback_data).p_message.is_null() {
        return vk::FALSE;
    }
    let message = CStr::from_ptr((*callback_data).p_message).to_string_lossy();
    log::log!(log_level_for(message_severity), "[Vulkan] {:?} - {}", message_type, message);

    vk::FALSE
}

/// Debug messenger tied to the instance lifetime
struct DebugMessenger {
    loader: DebugUtils,
    messenger: vk::DebugUtilsMessengerEXT,
}

/// Vulkan instance wrapper with RAII cleanup
pub struct VulkanInstance {
    /// Vulkan entry point
    pub entry: Entry,
    /// Vulkan instance handle
    pub instance: Instance,
    debug: Option<DebugMessenger>,
}

impl VulkanInstance {
    /// Create the instance and, when enabled, the validation layer and messenger
    ///
    /// # Errors
    ///
    /// Fails when the loader is missing or instance creation fails.
    pub fn new(window: &Window, config: &ContextConfig) -> VulkanResult<Self> {
        let entry = unsafe { Entry::load() }
            .map_err(|e| VulkanError::InitializationFailed(format!("Failed to load Vulkan: {e}")))?;

        let app_name = c_string(&config.application_name)?;
        let engine_name = c_string("render_core")?;
        let app_info = vk::ApplicationInfo::builder()
            .application_name(&app_name)
            .application_version(vk::make_api_version(0, 1, 0, 0))
            .engine_name(&engine_name)
            .engine_version(vk::make_api_version(0, 1, 0, 0))
            .api_version(vk::API_VERSION_1_0);

        let mut enable_validation = config.validation.is_enabled();
        if enable_validation && !Self::validation_layer_available(&entry)? {
            log::warn!("{VALIDATION_LAYER} requested but not installed, continuing without it");
            enable_validation = false;
        }

        let required_extensions = window.required_instance_extensions()?;
        let mut extension_names = required_extensions
            .iter()
            .map(|ext| c_string(ext))
            .collect::<VulkanResult<Vec<_>>>()?;
        if enable_validation {
            extension_names.push(DebugUtils::name().to_owned());
        }
        let extension_ptrs: Vec<*const c_char> =
            extension_names.iter().map(|ext| ext.as_ptr()).collect();

        let layer_names = if enable_validation {
            vec![c_string(VALIDATION_LAYER)?]
        } else {
            Vec::new()
        };
        let layer_ptrs: Vec<*const c_char> = layer_names.iter().map(|name| name.as_ptr()).collect();

        let create_info = vk::InstanceCreateInfo::builder()
            .application_info(&app_info)
            .enabled_extension_names(&extension_ptrs)
            .enabled_layer_names(&layer_ptrs);

        let instance = unsafe {
            entry
                .create_instance(&create_info, None)
                .map_err(VulkanError::Api)?
        };

        let mut result = Self {
            entry,
            instance,
            debug: None,
        };

        if enable_validation {
            result.debug = Some(result.create_debug_messenger(config.validation.min_severity)?);
            log::info!("Validation enabled (min severity {:?})", config.validation.min_severity);
        }

        Ok(result)
    }

    fn validation_layer_available(entry: &Entry) -> VulkanResult<bool> {
        let layers = entry
            .enumerate_instance_layer_properties()
            .map_err(VulkanError::Api)?;
        Ok(layers.iter().any(|layer| {
            let name = unsafe { CStr::from_ptr(layer.layer_name.as_ptr()) };
            name.to_bytes() == VALIDATION_LAYER.as_bytes()
        }))
    }

    fn create_debug_messenger(&self, min_severity: Severity) -> VulkanResult<DebugMessenger> {
        let loader = DebugUtils::new(&self.entry, &self.instance);
        let create_info = vk::DebugUtilsMessengerCreateInfoEXT::builder()
            .message_severity(severity_flags(min_severity))
            .message_type(
                vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                    | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                    | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
            )
            .pfn_user_callback(Some(debug_callback));

        let messenger = unsafe {
            loader
                .create_debug_utils_messenger(&create_info, None)
                .map_err(VulkanError::Api)?
        };
        Ok(DebugMessenger { loader, messenger })
    }
}

impl Drop for VulkanInstance {
    fn drop(&mut self) {
        unsafe {
            if let Some(debug) = self.debug.take() {
                debug.loader.destroy_debug_utils_messenger(debug.messenger, None);
            }
            self.instance.destroy_instance(None);
        }
    }
}

/// Presentation surface with RAII cleanup
pub struct PresentationSurface {
    /// Surface extension loader
    pub loader: Surface,
    /// Surface handle
    pub surface: vk::SurfaceKHR,
}

impl PresentationSurface {
    fn new(instance: &VulkanInstance, window: &Window) -> VulkanResult<Self> {
        let loader = Surface::new(&instance.entry, &instance.instance);
        let surface = window.create_vulkan_surface(instance.instance.handle())?;
        Ok(Self { loader, surface })
    }
}

impl Drop for PresentationSurface {
    fn drop(&mut self) {
        unsafe {
            self.loader.destroy_surface(self.surface, None);
        }
    }
}

/// Graphics and present queue family assignment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueFamilyIndices {
    /// Family with graphics capability
    pub graphics: Option<u32>,
    /// Family that can present to the surface
    pub present: Option<u32>,
}

impl QueueFamilyIndices {
    /// Scan queue families, stopping at the first complete assignment
    ///
    /// `supports_present` is asked for each family index; it wraps the
    /// surface support query on a real device.
    ///
    /// # Errors
    ///
    /// Propagates errors from `supports_present`.
    pub fn find<F>(families: &[vk::QueueFamilyProperties], mut supports_present: F) -> VulkanResult<Self>
    where
        F: FnMut(u32) -> VulkanResult<bool>,
    {
        let mut indices = Self::default();
        for (index, family) in families.iter().enumerate() {
            let index = index as u32;

            if indices.graphics.is_none() && family.queue_flags.contains(vk::QueueFlags::GRAPHICS) {
                indices.graphics = Some(index);
            }
            if indices.present.is_none() && supports_present(index)? {
                indices.present = Some(index);
            }
            if indices.is_complete() {
                break;
            }
        }
        Ok(indices)
    }

    /// Both families found
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.graphics.is_some() && self.present.is_some()
    }

    /// Graphics and present family, or an error if either is missing
    ///
    /// # Errors
    ///
    /// Fails when the assignment is incomplete.
    pub fn require(&self) -> VulkanResult<(u32, u32)> {
        match (self.graphics, self.present) {
            (Some(graphics), Some(present)) => Ok((graphics, present)),
            _ => Err(VulkanError::InitializationFailed(
                "Queue family assignment is incomplete".to_string(),
            )),
        }
    }

    /// Distinct family indices, graphics first
    #[must_use]
    pub fn unique(&self) -> Vec<u32> {
        let mut families: Vec<u32> = self.graphics.into_iter().chain(self.present).collect();
        families.dedup();
        families
    }
}

/// Physical device selection and capabilities
pub struct PhysicalDeviceInfo {
    /// Vulkan physical device handle
    pub device: vk::PhysicalDevice,
    /// Device properties and limits
    pub properties: vk::PhysicalDeviceProperties,
    /// Supported device features
    pub features: vk::PhysicalDeviceFeatures,
    /// Memory heaps and types
    pub memory_properties: vk::PhysicalDeviceMemoryProperties,
    /// Graphics and present families
    pub queue_families: QueueFamilyIndices,
}

impl PhysicalDeviceInfo {
    /// Select the first device that can render and present to `surface`
    ///
    /// # Errors
    ///
    /// Returns `InitializationFailed("No suitable GPU found")` when no device
    /// qualifies.
    pub fn select(instance: &Instance, surface: &PresentationSurface) -> VulkanResult<Self> {
        let devices = unsafe {
            instance
                .enumerate_physical_devices()
                .map_err(VulkanError::Api)?
        };

        for device in devices {
            if let Some(info) = Self::evaluate(instance, device, surface)? {
                log::info!("Selected GPU: {}", info.name());
                return Ok(info);
            }
        }

        Err(VulkanError::InitializationFailed(
            "No suitable GPU found".to_string(),
        ))
    }

    fn evaluate(
        instance: &Instance,
        device: vk::PhysicalDevice,
        surface: &PresentationSurface,
    ) -> VulkanResult<Option<Self>> {
        let properties = unsafe { instance.get_physical_device_properties(device) };
        let families = unsafe { instance.get_physical_device_queue_family_properties(device) };

        let queue_families = QueueFamilyIndices::find(&families, |index| unsafe {
            surface
                .loader
                .get_physical_device_surface_support(device, index, surface.surface)
                .map_err(VulkanError::Api)
        })?;

        let name = unsafe { CStr::from_ptr(properties.device_name.as_ptr()) }.to_string_lossy();
        if !queue_families.is_complete() {
            log::debug!("Skipping {name}: missing graphics or present queue");
            return Ok(None);
        }

        if !Self::supports_swapchain_extension(instance, device)? {
            log::debug!("Skipping {name}: no {:?}", SwapchainLoader::name());
            return Ok(None);
        }

        if !SwapchainSupport::query(&surface.loader, device, surface.surface)?.is_adequate() {
            log::debug!("Skipping {name}: no surface formats or present modes");
            return Ok(None);
        }

        Ok(Some(Self {
            device,
            properties,
            features: unsafe { instance.get_physical_device_features(device) },
            memory_properties: unsafe { instance.get_physical_device_memory_properties(device) },
            queue_families,
        }))
    }

    fn supports_swapchain_extension(instance: &Instance, device: vk::PhysicalDevice) -> VulkanResult<bool> {
        let extensions = unsafe {
            instance
                .enumerate_device_extension_properties(device)
                .map_err(VulkanError::Api)?
        };
        Ok(extensions.iter().any(|available| {
            let name = unsafe { CStr::from_ptr(available.extension_name.as_ptr()) };
            name == SwapchainLoader::name()
        }))
    }

    /// Device name as reported by the driver
    #[must_use]
    pub fn name(&self) -> String {
        unsafe { CStr::from_ptr(self.properties.device_name.as_ptr()) }
            .to_string_lossy()
            .into_owned()
    }

    /// Whether anisotropic filtering can be enabled
    #[must_use]
    pub fn supports_anisotropy(&self) -> bool {
        self.features.sampler_anisotropy == vk::TRUE
    }
}

/// Logical device wrapper with RAII cleanup
pub struct LogicalDevice {
    /// Vulkan logical device handle
    pub device: Device,
    /// Graphics operations queue
    pub graphics_queue: vk::Queue,
    /// Surface presentation queue
    pub present_queue: vk::Queue,
}

impl LogicalDevice {
    /// Create a logical device with one queue per unique family
    ///
    /// # Errors
    ///
    /// Fails when the queue assignment is incomplete or device creation fails.
    pub fn new(instance: &Instance, physical_device: &PhysicalDeviceInfo) -> VulkanResult<Self> {
        let (graphics_family, present_family) = physical_device.queue_families.require()?;

        let priorities = [1.0_f32];
        let queue_infos: Vec<vk::DeviceQueueCreateInfo> = physical_device
            .queue_families
            .unique()
            .into_iter()
            .map(|family| {
                vk::DeviceQueueCreateInfo::builder()
                    .queue_family_index(family)
                    .queue_priorities(&priorities)
                    .build()
            })
            .collect();

        let extensions = [SwapchainLoader::name().as_ptr()];
        let features = vk::PhysicalDeviceFeatures::builder()
            .sampler_anisotropy(physical_device.supports_anisotropy())
            .build();

        let create_info = vk::DeviceCreateInfo::builder()
            .queue_create_infos(&queue_infos)
            .enabled_extension_names(&extensions)
            .enabled_features(&features);

        let device = unsafe {
            instance
                .create_device(physical_device.device, &create_info, None)
                .map_err(VulkanError::Api)?
        };

        let graphics_queue = unsafe { device.get_device_queue(graphics_family, 0) };
        let present_queue = unsafe { device.get_device_queue(present_family, 0) };

        Ok(Self {
            device,
            graphics_queue,
            present_queue,
        })
    }
}

impl Drop for LogicalDevice {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_device(None);
        }
    }
}

/// Main Vulkan context that owns all core Vulkan resources
///
/// Fields drop in declaration order: swapchain, command pool, device,
/// surface, then the instance (which removes the debug messenger first).
pub struct VulkanContext {
    swapchain: Option<Swapchain>,
    command_pool: CommandPool,
    device: LogicalDevice,
    surface: PresentationSurface,
    physical_device: PhysicalDeviceInfo,
    instance: VulkanInstance,
}

impl VulkanContext {
    /// Create a new Vulkan context for the window
    ///
    /// # Errors
    ///
    /// Any failing creation step aborts with a structured error; objects
    /// created before the failure are released on the way out.
    pub fn new(window: &mut Window, config: &ContextConfig) -> VulkanResult<Self> {
        let instance = VulkanInstance::new(window, config)?;
        let surface = PresentationSurface::new(&instance, window)?;
        let physical_device = PhysicalDeviceInfo::select(&instance.instance, &surface)?;
        let device = LogicalDevice::new(&instance.instance, &physical_device)?;

        let swapchain = Swapchain::new(
            &instance.instance,
            &device.device,
            &surface.loader,
            surface.surface,
            physical_device.device,
            &physical_device.queue_families,
            wait_for_nonzero_framebuffer(window),
        )?;

        let (graphics_family, _) = physical_device.queue_families.require()?;
        let command_pool = CommandPool::new(device.device.clone(), graphics_family)?;

        Ok(Self {
            swapchain: Some(swapchain),
            command_pool,
            device,
            surface,
            physical_device,
            instance,
        })
    }

    /// Get a reference to the Vulkan instance
    #[must_use]
    pub const fn instance(&self) -> &Instance {
        &self.instance.instance
    }

    /// Get the physical device info
    #[must_use]
    pub const fn physical_device(&self) -> &PhysicalDeviceInfo {
        &self.physical_device
    }

    /// Get the raw Device handle
    #[must_use]
    pub const fn device(&self) -> &Device {
        &self.device.device
    }

    /// Get the graphics queue
    #[must_use]
    pub const fn graphics_queue(&self) -> vk::Queue {
        self.device.graphics_queue
    }

    /// Get the present queue
    #[must_use]
    pub const fn present_queue(&self) -> vk::Queue {
        self.device.present_queue
    }

    /// Get the graphics command pool
    #[must_use]
    pub const fn command_pool(&self) -> &CommandPool {
        &self.command_pool
    }

    /// Memory heaps and types of the selected device
    #[must_use]
    pub const fn memory_properties(&self) -> &vk::PhysicalDeviceMemoryProperties {
        &self.physical_device.memory_properties
    }

    /// Current swapchain
    ///
    /// # Errors
    ///
    /// Only fails if a previous recreation failed part-way.
    pub fn swapchain(&self) -> VulkanResult<&Swapchain> {
        self.swapchain
            .as_ref()
            .ok_or_else(|| VulkanError::invalid("swapchain is not available"))
    }

    /// Extent of the current swapchain images
    ///
    /// # Errors
    ///
    /// See [`swapchain`](Self::swapchain).
    pub fn swapchain_extent(&self) -> VulkanResult<vk::Extent2D> {
        Ok(self.swapchain()?.extent())
    }

    /// Color format of the current swapchain images
    ///
    /// # Errors
    ///
    /// See [`swapchain`](Self::swapchain).
    pub fn swapchain_format(&self) -> VulkanResult<vk::Format> {
        Ok(self.swapchain()?.format().format)
    }

    /// First memory type allowed by `type_filter` that has all `required` flags
    ///
    /// # Errors
    ///
    /// Returns `NoSuitableMemoryType` when nothing qualifies.
    pub fn find_memory_type(&self, type_filter: u32, required: vk::MemoryPropertyFlags) -> VulkanResult<u32> {
        select_memory_type(self.memory_properties(), type_filter, required)
    }

    /// Maximum sampler anisotropy, or `None` if the feature is unavailable
    #[must_use]
    pub fn max_anisotropy(&self) -> Option<f32> {
        self.physical_device
            .supports_anisotropy()
            .then_some(self.physical_device.properties.limits.max_sampler_anisotropy)
    }

    /// Start a short-lived command buffer on the graphics queue
    ///
    /// # Errors
    ///
    /// Fails if allocation or `vkBeginCommandBuffer` fails.
    pub fn begin_one_shot(&self) -> VulkanResult<OneShotCommands<'_>> {
        OneShotCommands::begin(&self.device.device, &self.command_pool, self.device.graphics_queue)
    }

    /// Record with `record`, submit, and block until the queue is idle
    ///
    /// The command buffer is freed on every path.
    ///
    /// # Errors
    ///
    /// Returns the first error from recording, submission or the wait.
    pub fn one_shot<F>(&self, record: F) -> VulkanResult<()>
    where
        F: FnOnce(&Device, vk::CommandBuffer) -> VulkanResult<()>,
    {
        let commands = self.begin_one_shot()?;
        record(commands.device(), commands.handle())?;
        commands.submit_and_wait()
    }

    /// Block until the device has finished all submitted work
    ///
    /// # Errors
    ///
    /// Fails on device loss.
    pub fn wait_idle(&self) -> VulkanResult<()> {
        unsafe {
            self.device
                .device
                .device_wait_idle()
                .map_err(|e| VulkanError::from_frame_result(e, "device_wait_idle"))
        }
    }

    /// Rebuild the swapchain after the surface changed
    ///
    /// Waits for the device to go idle, destroys the old swapchain and its
    /// views, parks until the framebuffer is non-zero, then builds a new one.
    /// Calling it repeatedly is safe.
    ///
    /// # Errors
    ///
    /// Propagates creation failures; the context is then left without a
    /// swapchain.
    pub fn recreate_swapchain<S: FramebufferSource + ?Sized>(&mut self, source: &mut S) -> VulkanResult<()> {
        self.wait_idle()?;
        self.swapchain = None;

        let framebuffer_size = wait_for_nonzero_framebuffer(source);
        let swapchain = Swapchain::new(
            &self.instance.instance,
            &self.device.device,
            &self.surface.loader,
            self.surface.surface,
            self.physical_device.device,
            &self.physical_device.queue_families,
            framebuffer_size,
        )?;

        log::info!(
            "Recreated swapchain at {}x{}",
            swapchain.extent().width,
            swapchain.extent().height
        );
        self.swapchain = Some(swapchain);
        Ok(())
    }
}

impl Drop for VulkanContext {
    fn drop(&mut self) {
        if let Err(e) = self.wait_idle() {
            log::error!("device_wait_idle failed during shutdown: {e}");
        }
    }
}

//! Frame pipeline scheduling
//!
//! [`FrameScheduler`] drives acquire → record → submit → present for N
//! frames in flight. It talks to the GPU only through [`FrameBackend`], so the
//! ordering rules can be exercised against a simulated device in tests.
//!
//! Per slot the cycle is `Idle → Acquiring → Recording → Submitted →
//! Presenting → Idle`. Two counters are kept apart: the frame-in-flight slot
//! (owned here, advances by one per submitted frame) and the swapchain image
//! index (chosen by the driver on every acquire).

use ash::{vk, Device};

use crate::render::vulkan::commands::CommandRecorder;
use crate::render::vulkan::swapchain::FramebufferSource;
use crate::render::vulkan::sync::FrameSync;
use crate::render::vulkan::{VulkanContext, VulkanError, VulkanResult};

/// Result of asking the swapchain for the next image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// An image is ready to be rendered into
    Acquired {
        /// Swapchain image index
        image_index: u32,
        /// The surface still works but no longer matches exactly
        suboptimal: bool,
    },
    /// The swapchain must be rebuilt before anything can be presented
    OutOfDate,
}

/// Result of presenting a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentOutcome {
    /// Presented normally
    Presented,
    /// Presented, but the swapchain should be rebuilt
    Suboptimal,
    /// Not presented; the swapchain must be rebuilt
    OutOfDate,
}

/// What happened to a frame passed through [`FrameScheduler::draw_frame`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// The frame was submitted and handed to the presentation engine
    Presented(PresentOutcome),
    /// Acquire reported an out-of-date swapchain; it was rebuilt and nothing
    /// was recorded
    Skipped,
}

/// Where the scheduler is within the current frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramePhase {
    /// Between frames
    Idle,
    /// Waiting on the slot fence or the swapchain
    Acquiring,
    /// The caller owns the slot's command buffer
    Recording,
    /// Work is queued; present is next
    Submitted,
    /// Handing the image to the presentation engine
    Presenting,
}

/// Handle for one frame between acquire and present
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameToken {
    /// Frame-in-flight slot
    pub slot: usize,
    /// Swapchain image acquired for this frame
    pub image_index: u32,
}

/// GPU operations the scheduler sequences
pub trait FrameBackend {
    /// Block until the slot's previous submission has finished
    fn wait_for_slot(&mut self, slot: usize) -> VulkanResult<()>;

    /// Acquire the next swapchain image, signaling the slot's
    /// image-available semaphore
    fn acquire_image(&mut self, slot: usize) -> VulkanResult<AcquireOutcome>;

    /// Reset the slot fence and submit the slot's command buffer
    fn submit(&mut self, slot: usize, image_index: u32) -> VulkanResult<()>;

    /// Present `image_index` once the slot's rendering has finished
    fn present(&mut self, slot: usize, image_index: u32) -> VulkanResult<PresentOutcome>;

    /// Rebuild the swapchain and everything that depends on it
    fn recreate_swapchain(&mut self) -> VulkanResult<()>;
}

/// Rebuild hook for objects sized or formatted after the swapchain
pub trait SwapchainObserver {
    /// Called after the context has a new swapchain
    fn on_swapchain_recreated(&mut self, context: &VulkanContext) -> VulkanResult<()>;
}

/// Frames-in-flight state machine
#[derive(Debug)]
pub struct FrameScheduler {
    frames_in_flight: usize,
    current_slot: usize,
    phase: FramePhase,
    resize_requested: bool,
}

impl FrameScheduler {
    /// Create a scheduler for `frames_in_flight` slots
    ///
    /// # Errors
    ///
    /// `InvalidOperation` when `frames_in_flight` is zero.
    pub fn new(frames_in_flight: usize) -> VulkanResult<Self> {
        if frames_in_flight == 0 {
            return Err(VulkanError::invalid("frames in flight must be at least 1"));
        }
        Ok(Self {
            frames_in_flight,
            current_slot: 0,
            phase: FramePhase::Idle,
            resize_requested: false,
        })
    }

    /// Slot the next frame will use
    #[must_use]
    pub const fn current_slot(&self) -> usize {
        self.current_slot
    }

    /// Number of slots
    #[must_use]
    pub const fn frames_in_flight(&self) -> usize {
        self.frames_in_flight
    }

    /// Current phase
    #[must_use]
    pub const fn phase(&self) -> FramePhase {
        self.phase
    }

    /// Ask for a swapchain rebuild at the next present
    ///
    /// Only sets a flag; window callbacks never touch the device.
    pub fn request_resize(&mut self) {
        self.resize_requested = true;
    }

    /// Whether a resize is pending
    #[must_use]
    pub const fn resize_requested(&self) -> bool {
        self.resize_requested
    }

    fn expect_phase(&self, expected: FramePhase, operation: &str) -> VulkanResult<()> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(VulkanError::invalid(format!(
                "{operation} called in phase {:?}, expected {expected:?}",
                self.phase
            )))
        }
    }

    fn expect_token(&self, token: &FrameToken) -> VulkanResult<()> {
        if token.slot == self.current_slot {
            Ok(())
        } else {
            Err(VulkanError::invalid(format!(
                "frame token for slot {} used while slot {} is active",
                token.slot, self.current_slot
            )))
        }
    }

    /// Wait for the current slot and acquire a swapchain image
    ///
    /// Returns `None` when the swapchain was out of date: it has been rebuilt,
    /// the slot is unchanged, and the caller should skip this frame.
    ///
    /// # Errors
    ///
    /// `InvalidOperation` outside the idle phase, or any fatal backend error.
    pub fn begin_frame<B: FrameBackend + ?Sized>(&mut self, backend: &mut B) -> VulkanResult<Option<FrameToken>> {
        self.expect_phase(FramePhase::Idle, "begin_frame")?;
        self.phase = FramePhase::Acquiring;

        let slot = self.current_slot;
        let acquired = backend
            .wait_for_slot(slot)
            .and_then(|()| backend.acquire_image(slot));

        match acquired {
            Ok(AcquireOutcome::Acquired {
                image_index,
                suboptimal,
            }) => {
                if suboptimal {
                    log::debug!("Acquired image {image_index} from a suboptimal swapchain");
                }
                self.phase = FramePhase::Recording;
                Ok(Some(FrameToken { slot, image_index }))
            }
            Ok(AcquireOutcome::OutOfDate) => {
                log::warn!("Swapchain out of date on acquire, recreating");
                self.phase = FramePhase::Idle;
                self.resize_requested = false;
                backend.recreate_swapchain()?;
                Ok(None)
            }
            Err(e) => {
                self.phase = FramePhase::Idle;
                Err(e)
            }
        }
    }

    /// Submit the recorded command buffer for `token`
    ///
    /// # Errors
    ///
    /// `InvalidOperation` unless called right after recording, or a fatal
    /// backend error.
    pub fn submit<B: FrameBackend + ?Sized>(&mut self, backend: &mut B, token: &FrameToken) -> VulkanResult<()> {
        self.expect_phase(FramePhase::Recording, "submit")?;
        self.expect_token(token)?;

        if let Err(e) = backend.submit(token.slot, token.image_index) {
            self.phase = FramePhase::Idle;
            return Err(e);
        }
        self.phase = FramePhase::Submitted;
        Ok(())
    }

    /// Present `token` and rebuild the swapchain if needed
    ///
    /// The slot advances before any outcome is acted on. Recreation happens
    /// only after presenting, when the result is out of date or suboptimal
    /// or a resize was requested.
    ///
    /// # Errors
    ///
    /// `InvalidOperation` unless called right after submit; fatal present or
    /// recreation errors.
    pub fn present<B: FrameBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        token: &FrameToken,
    ) -> VulkanResult<PresentOutcome> {
        self.expect_phase(FramePhase::Submitted, "present")?;
        self.expect_token(token)?;
        self.phase = FramePhase::Presenting;

        let result = backend.present(token.slot, token.image_index);

        self.current_slot = (token.slot + 1) % self.frames_in_flight;
        self.phase = FramePhase::Idle;

        let outcome = result?;
        if outcome != PresentOutcome::Presented || self.resize_requested {
            log::debug!(
                "Recreating swapchain after present ({outcome:?}, resize requested: {})",
                self.resize_requested
            );
            self.resize_requested = false;
            backend.recreate_swapchain()?;
        }
        Ok(outcome)
    }

    /// Run one complete frame, calling `record` between acquire and submit
    ///
    /// `record` must leave the slot's command buffer fully recorded.
    ///
    /// # Errors
    ///
    /// Errors from `record` abort the frame before submission; the scheduler
    /// returns to idle. The acquired image is never presented and the slot's
    /// image-available semaphore stays signaled, so the caller must treat the
    /// error as fatal and stop drawing.
    pub fn draw_frame<B, F>(&mut self, backend: &mut B, record: F) -> VulkanResult<FrameStatus>
    where
        B: FrameBackend + ?Sized,
        F: FnOnce(&mut B, &FrameToken) -> VulkanResult<()>,
    {
        let Some(token) = self.begin_frame(backend)? else {
            return Ok(FrameStatus::Skipped);
        };

        if let Err(e) = record(backend, &token) {
            // Acquired image is abandoned; no further frames may follow
            self.phase = FramePhase::Idle;
            return Err(e);
        }

        self.submit(backend, &token)?;
        self.present(backend, &token).map(FrameStatus::Presented)
    }
}

/// Per-slot synchronization objects and command buffers
///
/// Everything is allocated once; command buffers are reset before each
/// recording.
pub struct FrameResources {
    device: Device,
    command_pool: vk::CommandPool,
    command_buffers: Vec<vk::CommandBuffer>,
    syncs: Vec<FrameSync>,
}

impl FrameResources {
    /// Allocate `frames_in_flight` command buffers and sync bundles
    ///
    /// # Errors
    ///
    /// Propagates allocation failures.
    pub fn new(context: &VulkanContext, frames_in_flight: usize) -> VulkanResult<Self> {
        let command_buffers = context
            .command_pool()
            .allocate_command_buffers(frames_in_flight as u32)?;

        let mut resources = Self {
            device: context.device().clone(),
            command_pool: context.command_pool().handle(),
            command_buffers,
            syncs: Vec::with_capacity(frames_in_flight),
        };
        for _ in 0..frames_in_flight {
            resources.syncs.push(FrameSync::new(context.device())?);
        }

        log::debug!("Allocated resources for {frames_in_flight} frames in flight");
        Ok(resources)
    }

    /// Number of slots
    #[must_use]
    pub fn len(&self) -> usize {
        self.syncs.len()
    }

    /// Whether there are no slots
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.syncs.is_empty()
    }

    fn sync(&self, slot: usize) -> VulkanResult<&FrameSync> {
        self.syncs
            .get(slot)
            .ok_or_else(|| VulkanError::invalid(format!("frame slot {slot} out of range")))
    }

    fn command_buffer(&self, slot: usize) -> VulkanResult<vk::CommandBuffer> {
        self.command_buffers
            .get(slot)
            .copied()
            .ok_or_else(|| VulkanError::invalid(format!("frame slot {slot} out of range")))
    }
}

impl Drop for FrameResources {
    fn drop(&mut self) {
        unsafe {
            let _ = self.device.device_wait_idle();
            self.device
                .free_command_buffers(self.command_pool, &self.command_buffers);
        }
    }
}

/// [`FrameBackend`] over a real device and swapchain
///
/// Borrows everything it needs for one frame. The observer is told about
/// every swapchain rebuild.
pub struct VulkanFrameBackend<'a, W: FramebufferSource + ?Sized, O: SwapchainObserver> {
    context: &'a mut VulkanContext,
    window: &'a mut W,
    resources: &'a FrameResources,
    observer: &'a mut O,
}

impl<'a, W: FramebufferSource + ?Sized, O: SwapchainObserver> VulkanFrameBackend<'a, W, O> {
    /// Bundle the borrows for one frame
    pub fn new(
        context: &'a mut VulkanContext,
        window: &'a mut W,
        resources: &'a FrameResources,
        observer: &'a mut O,
    ) -> Self {
        Self {
            context,
            window,
            resources,
            observer,
        }
    }

    /// Context for recording
    #[must_use]
    pub fn context(&self) -> &VulkanContext {
        self.context
    }

    /// Swapchain-dependent objects
    #[must_use]
    pub fn observer(&self) -> &O {
        self.observer
    }

    /// Reset the slot's command buffer and begin recording into it
    ///
    /// # Errors
    ///
    /// Fails on an out-of-range slot or a driver error.
    pub fn begin_commands(&self, token: &FrameToken) -> VulkanResult<CommandRecorder<'_>> {
        let command_buffer = self.resources.command_buffer(token.slot)?;
        let device = self.context.device();
        unsafe {
            device
                .reset_command_buffer(command_buffer, vk::CommandBufferResetFlags::empty())
                .map_err(VulkanError::Api)?;
        }
        CommandRecorder::begin(device, command_buffer)
    }
}

impl<W: FramebufferSource + ?Sized, O: SwapchainObserver> FrameBackend for VulkanFrameBackend<'_, W, O> {
    fn wait_for_slot(&mut self, slot: usize) -> VulkanResult<()> {
        self.resources.sync(slot)?.in_flight.wait()
    }

    fn acquire_image(&mut self, slot: usize) -> VulkanResult<AcquireOutcome> {
        let sync = self.resources.sync(slot)?;
        let swapchain = self.context.swapchain()?;

        let result = unsafe {
            swapchain.loader().acquire_next_image(
                swapchain.handle(),
                u64::MAX,
                sync.image_available.handle(),
                vk::Fence::null(),
            )
        };

        match result {
            Ok((image_index, suboptimal)) => Ok(AcquireOutcome::Acquired {
                image_index,
                suboptimal,
            }),
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(AcquireOutcome::OutOfDate),
            Err(e) => Err(VulkanError::from_frame_result(e, "acquire_next_image")),
        }
    }

    fn submit(&mut self, slot: usize, _image_index: u32) -> VulkanResult<()> {
        let sync = self.resources.sync(slot)?;
        let command_buffers = [self.resources.command_buffer(slot)?];
        let wait_semaphores = [sync.image_available.handle()];
        let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
        let signal_semaphores = [sync.render_finished.handle()];

        let submit_info = vk::SubmitInfo::builder()
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&wait_stages)
            .command_buffers(&command_buffers)
            .signal_semaphores(&signal_semaphores)
            .build();

        sync.in_flight.reset()?;
        unsafe {
            self.context
                .device()
                .queue_submit(self.context.graphics_queue(), &[submit_info], sync.in_flight.handle())
                .map_err(|e| VulkanError::from_frame_result(e, "queue_submit"))
        }
    }

    fn present(&mut self, slot: usize, image_index: u32) -> VulkanResult<PresentOutcome> {
        let sync = self.resources.sync(slot)?;
        let swapchain = self.context.swapchain()?;
        let wait_semaphores = [sync.render_finished.handle()];
        let swapchains = [swapchain.handle()];
        let image_indices = [image_index];

        let present_info = vk::PresentInfoKHR::builder()
            .wait_semaphores(&wait_semaphores)
            .swapchains(&swapchains)
            .image_indices(&image_indices);

        let result = unsafe {
            swapchain
                .loader()
                .queue_present(self.context.present_queue(), &present_info)
        };

        match result {
            Ok(false) => Ok(PresentOutcome::Presented),
            Ok(true) => Ok(PresentOutcome::Suboptimal),
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(PresentOutcome::OutOfDate),
            Err(e) => Err(VulkanError::from_frame_result(e, "queue_present")),
        }
    }

    fn recreate_swapchain(&mut self) -> VulkanResult<()> {
        self.context.recreate_swapchain(self.window)?;
        self.observer.on_swapchain_recreated(self.context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Simulated device: each submission completes `latency` ticks later
    struct SlowGpu {
        clock: u64,
        latency: u64,
        frames_in_flight: usize,
        image_count: u32,
        next_image: u32,
        completes_at: Vec<Option<u64>>,
        acquire_script: VecDeque<AcquireOutcome>,
        present_script: VecDeque<VulkanResult<PresentOutcome>>,
        calls: Vec<String>,
        recorded_while_busy: usize,
        recreations: usize,
        recorded_slots: Vec<usize>,
        acquired_images: Vec<u32>,
    }

    impl SlowGpu {
        fn new(frames_in_flight: usize, image_count: u32, latency: u64) -> Self {
            Self {
                clock: 0,
                latency,
                frames_in_flight,
                image_count,
                next_image: 0,
                completes_at: vec![None; frames_in_flight],
                acquire_script: VecDeque::new(),
                present_script: VecDeque::new(),
                calls: Vec::new(),
                recorded_while_busy: 0,
                recreations: 0,
                recorded_slots: Vec::new(),
                acquired_images: Vec::new(),
            }
        }

        fn slot_busy(&self, slot: usize) -> bool {
            self.completes_at[slot].map_or(false, |done| done > self.clock)
        }

        fn record(&mut self, token: &FrameToken) -> VulkanResult<()> {
            if self.slot_busy(token.slot) {
                self.recorded_while_busy += 1;
            }
            self.recorded_slots.push(token.slot);
            self.calls.push(format!("record {}", token.slot));
            Ok(())
        }

        fn outstanding(&self) -> usize {
            (0..self.frames_in_flight).filter(|&slot| self.slot_busy(slot)).count()
        }
    }

    impl FrameBackend for SlowGpu {
        fn wait_for_slot(&mut self, slot: usize) -> VulkanResult<()> {
            if let Some(done) = self.completes_at[slot] {
                self.clock = self.clock.max(done);
            }
            self.calls.push(format!("wait {slot}"));
            Ok(())
        }

        fn acquire_image(&mut self, slot: usize) -> VulkanResult<AcquireOutcome> {
            self.calls.push(format!("acquire {slot}"));
            let outcome = self.acquire_script.pop_front().unwrap_or_else(|| {
                let image_index = self.next_image;
                self.next_image = (self.next_image + 1) % self.image_count;
                AcquireOutcome::Acquired {
                    image_index,
                    suboptimal: false,
                }
            });
            if let AcquireOutcome::Acquired { image_index, .. } = outcome {
                self.acquired_images.push(image_index);
            }
            Ok(outcome)
        }

        fn submit(&mut self, slot: usize, _image_index: u32) -> VulkanResult<()> {
            assert!(!self.slot_busy(slot), "submitted slot {slot} while its fence was unsignaled");
            self.completes_at[slot] = Some(self.clock + self.latency);
            self.clock += 1;
            self.calls.push(format!("submit {slot}"));
            Ok(())
        }

        fn present(&mut self, slot: usize, _image_index: u32) -> VulkanResult<PresentOutcome> {
            self.calls.push(format!("present {slot}"));
            self.present_script
                .pop_front()
                .unwrap_or(Ok(PresentOutcome::Presented))
        }

        fn recreate_swapchain(&mut self) -> VulkanResult<()> {
            self.recreations += 1;
            self.calls.push("recreate".to_string());
            Ok(())
        }
    }

    fn run_frame(scheduler: &mut FrameScheduler, gpu: &mut SlowGpu) -> VulkanResult<FrameStatus> {
        scheduler.draw_frame(gpu, |gpu, token| gpu.record(token))
    }

    #[test]
    fn test_zero_frames_in_flight_rejected() {
        assert!(matches!(
            FrameScheduler::new(0),
            Err(VulkanError::InvalidOperation { .. })
        ));
    }

    #[test]
    fn test_never_records_while_slot_is_in_flight() {
        let mut scheduler = FrameScheduler::new(2).unwrap();
        let mut gpu = SlowGpu::new(2, 3, 7);

        for _ in 0..100 {
            let status = run_frame(&mut scheduler, &mut gpu).unwrap();
            assert_eq!(status, FrameStatus::Presented(PresentOutcome::Presented));
            assert!(gpu.outstanding() <= 2);
        }

        assert_eq!(gpu.recorded_while_busy, 0);
        assert_eq!(gpu.recorded_slots.len(), 100);
    }

    #[test]
    fn test_slots_cycle_independently_of_image_indices() {
        let mut scheduler = FrameScheduler::new(2).unwrap();
        let mut gpu = SlowGpu::new(2, 3, 1);

        for _ in 0..6 {
            run_frame(&mut scheduler, &mut gpu).unwrap();
        }

        assert_eq!(gpu.recorded_slots, vec![0, 1, 0, 1, 0, 1]);
        assert_eq!(gpu.acquired_images, vec![0, 1, 2, 0, 1, 2]);
    }

    #[test]
    fn test_frame_step_order() {
        let mut scheduler = FrameScheduler::new(2).unwrap();
        let mut gpu = SlowGpu::new(2, 2, 1);

        run_frame(&mut scheduler, &mut gpu).unwrap();

        assert_eq!(gpu.calls, vec!["wait 0", "acquire 0", "record 0", "submit 0", "present 0"]);
        assert_eq!(scheduler.current_slot(), 1);
        assert_eq!(scheduler.phase(), FramePhase::Idle);
    }

    #[test]
    fn test_out_of_date_acquire_skips_frame_without_advancing() {
        let mut scheduler = FrameScheduler::new(2).unwrap();
        let mut gpu = SlowGpu::new(2, 2, 1);
        gpu.acquire_script.push_back(AcquireOutcome::OutOfDate);

        let status = run_frame(&mut scheduler, &mut gpu).unwrap();

        assert_eq!(status, FrameStatus::Skipped);
        assert_eq!(scheduler.current_slot(), 0);
        assert_eq!(gpu.recreations, 1);
        assert!(gpu.recorded_slots.is_empty());
        assert_eq!(gpu.calls, vec!["wait 0", "acquire 0", "recreate"]);

        // The next frame proceeds normally on the same slot
        run_frame(&mut scheduler, &mut gpu).unwrap();
        assert_eq!(gpu.recorded_slots, vec![0]);
        assert_eq!(scheduler.current_slot(), 1);
    }

    #[test]
    fn test_suboptimal_acquire_still_renders() {
        let mut scheduler = FrameScheduler::new(2).unwrap();
        let mut gpu = SlowGpu::new(2, 2, 1);
        gpu.acquire_script.push_back(AcquireOutcome::Acquired {
            image_index: 1,
            suboptimal: true,
        });

        let status = run_frame(&mut scheduler, &mut gpu).unwrap();
        assert_eq!(status, FrameStatus::Presented(PresentOutcome::Presented));
        assert_eq!(gpu.recreations, 0);
    }

    #[test]
    fn test_recreation_happens_after_present() {
        for outcome in [PresentOutcome::Suboptimal, PresentOutcome::OutOfDate] {
            let mut scheduler = FrameScheduler::new(2).unwrap();
            let mut gpu = SlowGpu::new(2, 2, 1);
            gpu.present_script.push_back(Ok(outcome));

            let status = run_frame(&mut scheduler, &mut gpu).unwrap();

            assert_eq!(status, FrameStatus::Presented(outcome));
            assert_eq!(gpu.calls.last().map(String::as_str), Some("recreate"));
            assert_eq!(gpu.calls[gpu.calls.len() - 2], "present 0");
            assert_eq!(scheduler.current_slot(), 1, "slot advances regardless of outcome");
        }
    }

    #[test]
    fn test_resize_request_recreates_once_after_present() {
        let mut scheduler = FrameScheduler::new(2).unwrap();
        let mut gpu = SlowGpu::new(2, 2, 1);

        scheduler.request_resize();
        assert!(scheduler.resize_requested());
        run_frame(&mut scheduler, &mut gpu).unwrap();
        assert_eq!(gpu.recreations, 1);
        assert!(!scheduler.resize_requested());

        run_frame(&mut scheduler, &mut gpu).unwrap();
        assert_eq!(gpu.recreations, 1);
    }

    #[test]
    fn test_present_failure_is_fatal_but_slot_advances() {
        let mut scheduler = FrameScheduler::new(2).unwrap();
        let mut gpu = SlowGpu::new(2, 2, 1);
        gpu.present_script.push_back(Err(VulkanError::DeviceLost));

        let result = run_frame(&mut scheduler, &mut gpu);

        assert!(matches!(result, Err(VulkanError::DeviceLost)));
        assert_eq!(scheduler.current_slot(), 1);
        assert_eq!(scheduler.phase(), FramePhase::Idle);
        assert_eq!(gpu.recreations, 0);
    }

    #[test]
    fn test_record_error_aborts_before_submit() {
        let mut scheduler = FrameScheduler::new(2).unwrap();
        let mut gpu = SlowGpu::new(2, 2, 1);

        let result = scheduler.draw_frame(&mut gpu, |_, _| Err(VulkanError::invalid("boom")));

        assert!(result.is_err());
        assert!(!gpu.calls.iter().any(|call| call.starts_with("submit")));
        assert_eq!(scheduler.phase(), FramePhase::Idle);
        assert_eq!(scheduler.current_slot(), 0);
    }

    #[test]
    fn test_out_of_order_calls_are_rejected() {
        let mut scheduler = FrameScheduler::new(2).unwrap();
        let mut gpu = SlowGpu::new(2, 2, 1);
        let stray = FrameToken {
            slot: 0,
            image_index: 0,
        };

        assert!(matches!(
            scheduler.submit(&mut gpu, &stray),
            Err(VulkanError::InvalidOperation { .. })
        ));
        assert!(matches!(
            scheduler.present(&mut gpu, &stray),
            Err(VulkanError::InvalidOperation { .. })
        ));

        let token = scheduler.begin_frame(&mut gpu).unwrap().unwrap();
        assert!(scheduler.begin_frame(&mut gpu).is_err(), "no second acquire while recording");
        assert!(scheduler.present(&mut gpu, &token).is_err(), "present before submit");

        let wrong_slot = FrameToken {
            slot: 1,
            ..token
        };
        assert!(scheduler.submit(&mut gpu, &wrong_slot).is_err());

        scheduler.submit(&mut gpu, &token).unwrap();
        assert_eq!(scheduler.phase(), FramePhase::Submitted);
        assert_eq!(scheduler.present(&mut gpu, &token).unwrap(), PresentOutcome::Presented);
    }

    #[test]
    fn test_single_frame_in_flight_waits_every_frame() {
        let mut scheduler = FrameScheduler::new(1).unwrap();
        let mut gpu = SlowGpu::new(1, 2, 5);

        for _ in 0..10 {
            run_frame(&mut scheduler, &mut gpu).unwrap();
            assert_eq!(scheduler.current_slot(), 0);
        }
        assert_eq!(gpu.recorded_while_busy, 0);
    }
}

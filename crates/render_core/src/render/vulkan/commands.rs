//! Command buffer management
//!
//! Command pool ownership, scoped one-shot submission, and a small recorder
//! with a render-pass guard used by per-frame recording.

use ash::{vk, Device};

use crate::render::vulkan::{VulkanError, VulkanResult};

/// Command pool wrapper with RAII cleanup
pub struct CommandPool {
    device: Device,
    command_pool: vk::CommandPool,
}

impl CommandPool {
    /// Create a pool whose buffers can be reset individually
    ///
    /// # Errors
    ///
    /// Propagates `vkCreateCommandPool` failures.
    pub fn new(device: Device, queue_family_index: u32) -> VulkanResult<Self> {
        let pool_create_info = vk::CommandPoolCreateInfo::builder()
            .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER)
            .queue_family_index(queue_family_index);

        let command_pool = unsafe {
            device
                .create_command_pool(&pool_create_info, None)
                .map_err(VulkanError::Api)?
        };

        Ok(Self {
            device,
            command_pool,
        })
    }

    /// Allocate primary command buffers
    ///
    /// # Errors
    ///
    /// Propagates allocation failures.
    pub fn allocate_command_buffers(&self, count: u32) -> VulkanResult<Vec<vk::CommandBuffer>> {
        let alloc_info = vk::CommandBufferAllocateInfo::builder()
            .command_pool(self.command_pool)
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(count);

        unsafe {
            self.device
                .allocate_command_buffers(&alloc_info)
                .map_err(VulkanError::Api)
        }
    }

    /// Return command buffers to the pool
    pub fn free_command_buffers(&self, command_buffers: &[vk::CommandBuffer]) {
        if command_buffers.is_empty() {
            return;
        }
        unsafe {
            self.device
                .free_command_buffers(self.command_pool, command_buffers);
        }
    }

    /// Get the command pool handle
    #[must_use]
    pub const fn handle(&self) -> vk::CommandPool {
        self.command_pool
    }
}

impl Drop for CommandPool {
    fn drop(&mut self) {
        unsafe {
            // Buffers may still be pending on the queue
            let _ = self.device.device_wait_idle();
            self.device.destroy_command_pool(self.command_pool, None);
        }
    }
}

/// Scoped one-shot command buffer
///
/// Created already in the recording state. [`submit_and_wait`] ends it,
/// submits it to the queue and blocks until the queue is idle. The buffer is
/// returned to the pool when the guard drops, whether or not it was
/// submitted and whether or not the GPU work succeeded.
///
/// [`submit_and_wait`]: OneShotCommands::submit_and_wait
pub struct OneShotCommands<'a> {
    device: &'a Device,
    pool: &'a CommandPool,
    queue: vk::Queue,
    command_buffer: vk::CommandBuffer,
}

impl<'a> OneShotCommands<'a> {
    pub(crate) fn begin(device: &'a Device, pool: &'a CommandPool, queue: vk::Queue) -> VulkanResult<Self> {
        let command_buffer = pool
            .allocate_command_buffers(1)?
            .into_iter()
            .next()
            .ok_or_else(|| VulkanError::invalid("driver returned no command buffer"))?;

        let commands = Self {
            device,
            pool,
            queue,
            command_buffer,
        };

        let begin_info = vk::CommandBufferBeginInfo::builder()
            .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);
        unsafe {
            device
                .begin_command_buffer(command_buffer, &begin_info)
                .map_err(VulkanError::Api)?;
        }

        Ok(commands)
    }

    /// Command buffer to record into
    #[must_use]
    pub const fn handle(&self) -> vk::CommandBuffer {
        self.command_buffer
    }

    /// Device the buffer belongs to
    #[must_use]
    pub const fn device(&self) -> &Device {
        self.device
    }

    /// End, submit and wait for the queue to drain
    ///
    /// # Errors
    ///
    /// Any failure here means the upload did not complete; callers treat it
    /// as fatal.
    pub fn submit_and_wait(self) -> VulkanResult<()> {
        let command_buffers = [self.command_buffer];
        let submit_info = vk::SubmitInfo::builder().command_buffers(&command_buffers);

        unsafe {
            self.device
                .end_command_buffer(self.command_buffer)
                .map_err(VulkanError::Api)?;
            self.device
                .queue_submit(self.queue, &[submit_info.build()], vk::Fence::null())
                .map_err(|e| VulkanError::from_frame_result(e, "one-shot submit"))?;
            self.device
                .queue_wait_idle(self.queue)
                .map_err(|e| VulkanError::from_frame_result(e, "one-shot wait"))?;
        }
        Ok(())
    }
}

impl Drop for OneShotCommands<'_> {
    fn drop(&mut self) {
        self.pool.free_command_buffers(&[self.command_buffer]);
    }
}

/// Recorder for a per-frame command buffer
///
/// The buffer must already be reset; [`begin`](Self::begin) starts recording
/// and [`finish`](Self::finish) ends it.
pub struct CommandRecorder<'a> {
    device: &'a Device,
    command_buffer: vk::CommandBuffer,
}

impl<'a> CommandRecorder<'a> {
    /// Begin recording into `command_buffer`
    ///
    /// # Errors
    ///
    /// Propagates `vkBeginCommandBuffer` failures.
    pub fn begin(device: &'a Device, command_buffer: vk::CommandBuffer) -> VulkanResult<Self> {
        let begin_info = vk::CommandBufferBeginInfo::builder();
        unsafe {
            device
                .begin_command_buffer(command_buffer, &begin_info)
                .map_err(VulkanError::Api)?;
        }
        Ok(Self {
            device,
            command_buffer,
        })
    }

    /// Raw handle
    #[must_use]
    pub const fn handle(&self) -> vk::CommandBuffer {
        self.command_buffer
    }

    /// Begin an inline render pass; it ends when the guard drops
    pub fn begin_render_pass(
        &mut self,
        render_pass: vk::RenderPass,
        framebuffer: vk::Framebuffer,
        extent: vk::Extent2D,
        clear_values: &[vk::ClearValue],
    ) -> ActiveRenderPass<'_, 'a> {
        let render_pass_begin = vk::RenderPassBeginInfo::builder()
            .render_pass(render_pass)
            .framebuffer(framebuffer)
            .render_area(vk::Rect2D {
                offset: vk::Offset2D { x: 0, y: 0 },
                extent,
            })
            .clear_values(clear_values);

        unsafe {
            self.device.cmd_begin_render_pass(
                self.command_buffer,
                &render_pass_begin,
                vk::SubpassContents::INLINE,
            );
        }

        ActiveRenderPass { recorder: self }
    }

    /// End recording
    ///
    /// # Errors
    ///
    /// Propagates `vkEndCommandBuffer` failures.
    pub fn finish(self) -> VulkanResult<()> {
        unsafe {
            self.device
                .end_command_buffer(self.command_buffer)
                .map_err(VulkanError::Api)
        }
    }
}

/// Active render pass, ended on drop
pub struct ActiveRenderPass<'r, 'a> {
    recorder: &'r mut CommandRecorder<'a>,
}

impl ActiveRenderPass<'_, '_> {
    fn cmd(&self) -> (&Device, vk::CommandBuffer) {
        (self.recorder.device, self.recorder.command_buffer)
    }

    /// Full-extent viewport (depth 0..1) and scissor
    pub fn set_viewport_and_scissor(&mut self, extent: vk::Extent2D) {
        let (device, cb) = self.cmd();
        let viewport = vk::Viewport {
            x: 0.0,
            y: 0.0,
            width: extent.width as f32,
            height: extent.height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        };
        let scissor = vk::Rect2D {
            offset: vk::Offset2D { x: 0, y: 0 },
            extent,
        };
        unsafe {
            device.cmd_set_viewport(cb, 0, &[viewport]);
            device.cmd_set_scissor(cb, 0, &[scissor]);
        }
    }

    /// Bind graphics pipeline
    pub fn bind_pipeline(&mut self, pipeline: vk::Pipeline) {
        let (device, cb) = self.cmd();
        unsafe {
            device.cmd_bind_pipeline(cb, vk::PipelineBindPoint::GRAPHICS, pipeline);
        }
    }

    /// Bind a single descriptor set at set index 0
    pub fn bind_descriptor_set(&mut self, layout: vk::PipelineLayout, set: vk::DescriptorSet) {
        let (device, cb) = self.cmd();
        unsafe {
            device.cmd_bind_descriptor_sets(cb, vk::PipelineBindPoint::GRAPHICS, layout, 0, &[set], &[]);
        }
    }

    /// Bind a vertex buffer at binding 0
    pub fn bind_vertex_buffer(&mut self, buffer: vk::Buffer) {
        let (device, cb) = self.cmd();
        unsafe {
            device.cmd_bind_vertex_buffers(cb, 0, &[buffer], &[0]);
        }
    }

    /// Bind a `u32` index buffer
    pub fn bind_index_buffer(&mut self, buffer: vk::Buffer) {
        let (device, cb) = self.cmd();
        unsafe {
            device.cmd_bind_index_buffer(cb, buffer, 0, vk::IndexType::UINT32);
        }
    }

    /// Non-indexed draw
    pub fn draw(&mut self, vertex_count: u32) {
        let (device, cb) = self.cmd();
        unsafe {
            device.cmd_draw(cb, vertex_count, 1, 0, 0);
        }
    }

    /// Indexed draw
    pub fn draw_indexed(&mut self, index_count: u32) {
        let (device, cb) = self.cmd();
        unsafe {
            device.cmd_draw_indexed(cb, index_count, 1, 0, 0, 0);
        }
    }
}

impl Drop for ActiveRenderPass<'_, '_> {
    fn drop(&mut self) {
        unsafe {
            self.recorder
                .device
                .cmd_end_render_pass(self.recorder.command_buffer);
        }
    }
}

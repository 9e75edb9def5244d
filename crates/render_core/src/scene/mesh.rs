//! GPU-resident indexed meshes

use ash::vk;

use crate::assets::LoadedModel;
use crate::render::vertex::Vertex;
use crate::render::vulkan::{ActiveRenderPass, Buffer, VulkanContext, VulkanError, VulkanResult};

/// Vertex and `u32` index buffers in device-local memory
pub struct Mesh {
    vertex_buffer: Buffer,
    index_buffer: Buffer,
    index_count: u32,
    vertex_count: usize,
}

impl Mesh {
    /// Upload `vertices` and `indices` through staging buffers
    ///
    /// # Errors
    ///
    /// `InvalidOperation` for empty geometry, otherwise allocation or
    /// submission failures.
    pub fn new(context: &VulkanContext, vertices: &[Vertex], indices: &[u32]) -> VulkanResult<Self> {
        if vertices.is_empty() || indices.is_empty() {
            return Err(VulkanError::invalid("mesh needs at least one vertex and one index"));
        }
        let index_count = u32::try_from(indices.len())
            .map_err(|_| VulkanError::invalid("mesh has more than u32::MAX indices"))?;

        let vertex_buffer = Buffer::device_local_with_data(
            context,
            bytemuck::cast_slice(vertices),
            vk::BufferUsageFlags::VERTEX_BUFFER,
        )?;
        let index_buffer = Buffer::device_local_with_data(
            context,
            bytemuck::cast_slice(indices),
            vk::BufferUsageFlags::INDEX_BUFFER,
        )?;

        log::info!("Uploaded mesh: {} vertices, {} indices", vertices.len(), indices.len());
        Ok(Self {
            vertex_buffer,
            index_buffer,
            index_count,
            vertex_count: vertices.len(),
        })
    }

    /// Upload a loaded model
    ///
    /// # Errors
    ///
    /// See [`Mesh::new`].
    pub fn from_model(context: &VulkanContext, model: &LoadedModel) -> VulkanResult<Self> {
        Self::new(context, &model.vertices, &model.indices)
    }

    /// Bind both buffers and issue one indexed draw
    pub fn draw(&self, pass: &mut ActiveRenderPass<'_, '_>) {
        pass.bind_vertex_buffer(self.vertex_buffer.handle());
        pass.bind_index_buffer(self.index_buffer.handle());
        pass.draw_indexed(self.index_count);
    }

    /// Number of indices
    #[must_use]
    pub const fn index_count(&self) -> u32 {
        self.index_count
    }

    /// Number of vertices
    #[must_use]
    pub const fn vertex_count(&self) -> usize {
        self.vertex_count
    }
}

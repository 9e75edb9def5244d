//! Descriptor set layouts, pools and writes
//!
//! Materials and the skybox describe their bindings with
//! [`DescriptorSetLayoutBuilder`], allocate from a [`DescriptorPool`] and fill
//! sets with [`DescriptorWriter`].

use ash::{vk, Device};

use crate::render::vulkan::{VulkanError, VulkanResult};

/// Descriptor set layout builder for creating reusable layouts
#[derive(Debug, Default)]
pub struct DescriptorSetLayoutBuilder {
    bindings: Vec<vk::DescriptorSetLayoutBinding>,
}

impl DescriptorSetLayoutBuilder {
    /// Create an empty builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn add(mut self, binding: u32, descriptor_type: vk::DescriptorType, stage_flags: vk::ShaderStageFlags) -> Self {
        self.bindings.push(
            vk::DescriptorSetLayoutBinding::builder()
                .binding(binding)
                .descriptor_type(descriptor_type)
                .descriptor_count(1)
                .stage_flags(stage_flags)
                .build(),
        );
        self
    }

    /// Add a uniform buffer binding
    #[must_use]
    pub fn uniform_buffer(self, binding: u32, stage_flags: vk::ShaderStageFlags) -> Self {
        self.add(binding, vk::DescriptorType::UNIFORM_BUFFER, stage_flags)
    }

    /// Add a combined image sampler binding
    #[must_use]
    pub fn combined_image_sampler(self, binding: u32, stage_flags: vk::ShaderStageFlags) -> Self {
        self.add(binding, vk::DescriptorType::COMBINED_IMAGE_SAMPLER, stage_flags)
    }

    /// Bindings added so far
    #[must_use]
    pub fn bindings(&self) -> &[vk::DescriptorSetLayoutBinding] {
        &self.bindings
    }

    /// Create the layout
    ///
    /// # Errors
    ///
    /// Propagates `vkCreateDescriptorSetLayout` failures.
    pub fn build(self, device: &Device) -> VulkanResult<DescriptorSetLayout> {
        let layout_info = vk::DescriptorSetLayoutCreateInfo::builder().bindings(&self.bindings);

        let layout = unsafe { device.create_descriptor_set_layout(&layout_info, None) }
            .map_err(VulkanError::Api)?;

        Ok(DescriptorSetLayout {
            device: device.clone(),
            layout,
            bindings: self.bindings,
        })
    }
}

/// Descriptor set layout wrapper with automatic cleanup
pub struct DescriptorSetLayout {
    device: Device,
    layout: vk::DescriptorSetLayout,
    bindings: Vec<vk::DescriptorSetLayoutBinding>,
}

impl DescriptorSetLayout {
    /// Get the Vulkan descriptor set layout handle
    #[must_use]
    pub const fn handle(&self) -> vk::DescriptorSetLayout {
        self.layout
    }

    /// Get the bindings used in this layout
    #[must_use]
    pub fn bindings(&self) -> &[vk::DescriptorSetLayoutBinding] {
        &self.bindings
    }

    /// Pool sizes needed for `sets` copies of this layout
    #[must_use]
    pub fn pool_sizes(&self, sets: u32) -> Vec<vk::DescriptorPoolSize> {
        pool_sizes_for(&self.bindings, sets)
    }
}

impl Drop for DescriptorSetLayout {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_descriptor_set_layout(self.layout, None);
        }
    }
}

/// Per-type descriptor counts for `sets` sets with these bindings
fn pool_sizes_for(bindings: &[vk::DescriptorSetLayoutBinding], sets: u32) -> Vec<vk::DescriptorPoolSize> {
    let mut sizes: Vec<vk::DescriptorPoolSize> = Vec::new();
    for binding in bindings {
        let count = binding.descriptor_count * sets;
        match sizes.iter_mut().find(|size| size.ty == binding.descriptor_type) {
            Some(size) => size.descriptor_count += count,
            None => sizes.push(vk::DescriptorPoolSize {
                ty: binding.descriptor_type,
                descriptor_count: count,
            }),
        }
    }
    sizes
}

/// Descriptor pool for allocating descriptor sets
pub struct DescriptorPool {
    device: Device,
    pool: vk::DescriptorPool,
}

impl DescriptorPool {
    /// Create a pool whose sets can be freed individually
    ///
    /// # Errors
    ///
    /// Propagates `vkCreateDescriptorPool` failures.
    pub fn new(device: &Device, max_sets: u32, pool_sizes: &[vk::DescriptorPoolSize]) -> VulkanResult<Self> {
        let pool_info = vk::DescriptorPoolCreateInfo::builder()
            .flags(vk::DescriptorPoolCreateFlags::FREE_DESCRIPTOR_SET)
            .max_sets(max_sets)
            .pool_sizes(pool_sizes);

        let pool = unsafe { device.create_descriptor_pool(&pool_info, None) }.map_err(VulkanError::Api)?;

        Ok(Self {
            device: device.clone(),
            pool,
        })
    }

    /// Pool sized for `sets` sets of `layout`
    ///
    /// # Errors
    ///
    /// See [`DescriptorPool::new`].
    pub fn for_layout(device: &Device, layout: &DescriptorSetLayout, sets: u32) -> VulkanResult<Self> {
        Self::new(device, sets, &layout.pool_sizes(sets))
    }

    /// Allocate `count` sets of `layout`
    ///
    /// # Errors
    ///
    /// Fails when the pool is exhausted.
    pub fn allocate(&self, layout: &DescriptorSetLayout, count: usize) -> VulkanResult<Vec<vk::DescriptorSet>> {
        let layouts = vec![layout.handle(); count];
        let alloc_info = vk::DescriptorSetAllocateInfo::builder()
            .descriptor_pool(self.pool)
            .set_layouts(&layouts);

        unsafe { self.device.allocate_descriptor_sets(&alloc_info) }.map_err(VulkanError::Api)
    }

    /// Get the pool handle
    #[must_use]
    pub const fn handle(&self) -> vk::DescriptorPool {
        self.pool
    }
}

impl Drop for DescriptorPool {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_descriptor_pool(self.pool, None);
        }
    }
}

enum PendingWrite {
    Buffer {
        binding: u32,
        info: vk::DescriptorBufferInfo,
    },
    Image {
        binding: u32,
        info: vk::DescriptorImageInfo,
    },
}

/// Collects writes for one descriptor set and applies them together
///
/// Infos are stored by value; the `vk::WriteDescriptorSet` structs that point
/// at them are built only inside [`update`](Self::update).
pub struct DescriptorWriter {
    set: vk::DescriptorSet,
    writes: Vec<PendingWrite>,
}

impl DescriptorWriter {
    /// Start writing into `set`
    #[must_use]
    pub const fn new(set: vk::DescriptorSet) -> Self {
        Self {
            set,
            writes: Vec::new(),
        }
    }

    /// Write a uniform buffer
    #[must_use]
    pub fn buffer(mut self, binding: u32, info: vk::DescriptorBufferInfo) -> Self {
        self.writes.push(PendingWrite::Buffer { binding, info });
        self
    }

    /// Write a combined image sampler in `SHADER_READ_ONLY_OPTIMAL`
    #[must_use]
    pub fn image(mut self, binding: u32, view: vk::ImageView, sampler: vk::Sampler) -> Self {
        self.writes.push(PendingWrite::Image {
            binding,
            info: vk::DescriptorImageInfo {
                sampler,
                image_view: view,
                image_layout: vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
            },
        });
        self
    }

    /// Number of queued writes
    #[must_use]
    pub fn len(&self) -> usize {
        self.writes.len()
    }

    /// Whether nothing is queued
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Apply all queued writes
    pub fn update(self, device: &Device) {
        let writes: Vec<vk::WriteDescriptorSet> = self
            .writes
            .iter()
            .map(|write| match write {
                PendingWrite::Buffer { binding, info } => vk::WriteDescriptorSet::builder()
                    .dst_set(self.set)
                    .dst_binding(*binding)
                    .descriptor_type(vk::DescriptorType::UNIFORM_BUFFER)
                    .buffer_info(std::slice::from_ref(info))
                    .build(),
                PendingWrite::Image { binding, info } => vk::WriteDescriptorSet::builder()
                    .dst_set(self.set)
                    .dst_binding(*binding)
                    .descriptor_type(vk::DescriptorType::COMBINED_IMAGE_SAMPLER)
                    .image_info(std::slice::from_ref(info))
                    .build(),
            })
            .collect();

        unsafe {
            device.update_descriptor_sets(&writes, &[]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_records_bindings() {
        let builder = DescriptorSetLayoutBuilder::new()
            .uniform_buffer(0, vk::ShaderStageFlags::VERTEX | vk::ShaderStageFlags::FRAGMENT)
            .combined_image_sampler(1, vk::ShaderStageFlags::FRAGMENT);

        let bindings = builder.bindings();
        assert_eq!(bindings.len(), 2);
        assert_eq!(bindings[0].descriptor_type, vk::DescriptorType::UNIFORM_BUFFER);
        assert_eq!(bindings[1].binding, 1);
        assert_eq!(bindings[1].stage_flags, vk::ShaderStageFlags::FRAGMENT);
    }

    #[test]
    fn test_pool_sizes_group_by_type() {
        let builder = DescriptorSetLayoutBuilder::new()
            .uniform_buffer(0, vk::ShaderStageFlags::VERTEX)
            .uniform_buffer(1, vk::ShaderStageFlags::FRAGMENT)
            .uniform_buffer(2, vk::ShaderStageFlags::FRAGMENT)
            .combined_image_sampler(3, vk::ShaderStageFlags::FRAGMENT);

        let sizes = pool_sizes_for(builder.bindings(), 2);
        assert_eq!(sizes.len(), 2);
        assert_eq!(sizes[0].ty, vk::DescriptorType::UNIFORM_BUFFER);
        assert_eq!(sizes[0].descriptor_count, 6);
        assert_eq!(sizes[1].descriptor_count, 2);
    }

    #[test]
    fn test_writer_queues_writes() {
        let writer = DescriptorWriter::new(vk::DescriptorSet::null())
            .buffer(0, vk::DescriptorBufferInfo::default())
            .image(1, vk::ImageView::null(), vk::Sampler::null());
        assert_eq!(writer.len(), 2);
        assert!(!writer.is_empty());
    }
}

//! Device memory type selection and allocation

use ash::{vk, Device};

use crate::render::vulkan::{VulkanContext, VulkanError, VulkanResult};

/// First memory type allowed by `type_filter` whose flags include `required`
///
/// `type_filter` is the `memory_type_bits` mask from a resource's memory
/// requirements: bit `i` set means type `i` is acceptable.
///
/// # Errors
///
/// Returns [`VulkanError::NoSuitableMemoryType`] when no type qualifies.
pub fn select_memory_type(
    properties: &vk::PhysicalDeviceMemoryProperties,
    type_filter: u32,
    required: vk::MemoryPropertyFlags,
) -> VulkanResult<u32> {
    let count = properties.memory_type_count.min(vk::MAX_MEMORY_TYPES as u32);
    (0..count)
        .find(|&index| {
            type_filter & (1 << index) != 0
                && properties.memory_types[index as usize]
                    .property_flags
                    .contains(required)
        })
        .ok_or(VulkanError::NoSuitableMemoryType {
            type_filter,
            required,
        })
}

/// Allocate memory satisfying `requirements` with the given properties
///
/// # Errors
///
/// Fails on memory type selection or `vkAllocateMemory`.
pub(crate) fn allocate(
    context: &VulkanContext,
    requirements: vk::MemoryRequirements,
    properties: vk::MemoryPropertyFlags,
) -> VulkanResult<vk::DeviceMemory> {
    let memory_type_index = context.find_memory_type(requirements.memory_type_bits, properties)?;

    let alloc_info = vk::MemoryAllocateInfo::builder()
        .allocation_size(requirements.size)
        .memory_type_index(memory_type_index);

    unsafe {
        context
            .device()
            .allocate_memory(&alloc_info, None)
            .map_err(VulkanError::Api)
    }
}

/// Copy `bytes` into host-visible memory at `offset` (map, copy, unmap)
pub(crate) fn write_mapped(
    device: &Device,
    memory: vk::DeviceMemory,
    offset: vk::DeviceSize,
    bytes: &[u8],
) -> VulkanResult<()> {
    unsafe {
        let ptr = device
            .map_memory(memory, offset, bytes.len() as vk::DeviceSize, vk::MemoryMapFlags::empty())
            .map_err(VulkanError::Api)?;
        std::ptr::copy_nonoverlapping(bytes.as_ptr(), ptr.cast::<u8>(), bytes.len());
        device.unmap_memory(memory);
    }
    Ok(())
}

/// Copy `len` bytes out of host-visible memory
pub(crate) fn read_mapped(device: &Device, memory: vk::DeviceMemory, len: usize) -> VulkanResult<Vec<u8>> {
    let mut out = vec![0u8; len];
    unsafe {
        let ptr = device
            .map_memory(memory, 0, len as vk::DeviceSize, vk::MemoryMapFlags::empty())
            .map_err(VulkanError::Api)?;
        std::ptr::copy_nonoverlapping(ptr.cast::<u8>(), out.as_mut_ptr(), len);
        device.unmap_memory(memory);
    }
    Ok(out)
}

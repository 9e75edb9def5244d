//! Vertex formats and their Vulkan input layouts

use ash::vk;
use bytemuck::{Pod, Zeroable};
use std::mem::{offset_of, size_of};

/// Describes how a vertex type is fed to the vertex shader at binding 0
pub trait VertexLayout: Pod {
    /// Per-vertex binding at binding 0
    fn binding_description() -> vk::VertexInputBindingDescription {
        vk::VertexInputBindingDescription {
            binding: 0,
            stride: size_of::<Self>() as u32,
            input_rate: vk::VertexInputRate::VERTEX,
        }
    }

    /// Attribute locations, formats and offsets
    fn attribute_descriptions() -> Vec<vk::VertexInputAttributeDescription>;
}

/// Mesh vertex used by the PBR pipeline
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Object-space position
    pub position: [f32; 3],
    /// Unit normal
    pub normal: [f32; 3],
    /// Texture coordinate
    pub tex_coord: [f32; 2],
    /// Unit tangent along +U
    pub tangent: [f32; 3],
}

impl Vertex {
    /// Vertex with a zero tangent, filled in later by tangent generation
    #[must_use]
    pub const fn new(position: [f32; 3], normal: [f32; 3], tex_coord: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            tex_coord,
            tangent: [0.0; 3],
        }
    }
}

impl VertexLayout for Vertex {
    fn attribute_descriptions() -> Vec<vk::VertexInputAttributeDescription> {
        vec![
            attribute(0, vk::Format::R32G32B32_SFLOAT, offset_of!(Self, position)),
            attribute(1, vk::Format::R32G32B32_SFLOAT, offset_of!(Self, normal)),
            attribute(2, vk::Format::R32G32_SFLOAT, offset_of!(Self, tex_coord)),
            attribute(3, vk::Format::R32G32B32_SFLOAT, offset_of!(Self, tangent)),
        ]
    }
}

/// Position-only vertex for the skybox cube
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct SkyboxVertex {
    /// Cube corner, also used as the cubemap lookup direction
    pub position: [f32; 3],
}

impl VertexLayout for SkyboxVertex {
    fn attribute_descriptions() -> Vec<vk::VertexInputAttributeDescription> {
        vec![attribute(0, vk::Format::R32G32B32_SFLOAT, offset_of!(Self, position))]
    }
}

fn attribute(location: u32, format: vk::Format, offset: usize) -> vk::VertexInputAttributeDescription {
    vk::VertexInputAttributeDescription {
        binding: 0,
        location,
        format,
        offset: offset as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_layout_is_tightly_packed() {
        assert_eq!(size_of::<Vertex>(), 44);
        assert_eq!(Vertex::binding_description().stride, 44);

        let offsets: Vec<u32> = Vertex::attribute_descriptions().iter().map(|a| a.offset).collect();
        assert_eq!(offsets, vec![0, 12, 24, 32]);

        let locations: Vec<u32> = Vertex::attribute_descriptions()
            .iter()
            .map(|a| a.location)
            .collect();
        assert_eq!(locations, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_skybox_vertex_layout() {
        assert_eq!(SkyboxVertex::binding_description().stride, 12);
        let attributes = SkyboxVertex::attribute_descriptions();
        assert_eq!(attributes.len(), 1);
        assert_eq!(attributes[0].format, vk::Format::R32G32B32_SFLOAT);
    }

    #[test]
    fn test_vertex_bytes_cast() {
        let vertices = [Vertex::new([1.0, 2.0, 3.0], [0.0, 1.0, 0.0], [0.5, 0.25])];
        let bytes: &[u8] = bytemuck::cast_slice(&vertices);
        assert_eq!(bytes.len(), 44);
        assert_eq!(&bytes[0..4], &1.0_f32.to_ne_bytes());
    }
}

//! # Scene Objects
//!
//! GPU-backed things the forward renderer draws: the model mesh, its PBR
//! material and albedo texture, the gradient skybox, and the fly camera that
//! looks at them.

pub mod camera;
pub mod material;
pub mod mesh;
pub mod skybox;
pub mod texture;

pub use camera::{Camera, CameraMovement};
pub use material::Material;
pub use mesh::Mesh;
pub use skybox::Skybox;
pub use texture::{Texture, TextureSource};

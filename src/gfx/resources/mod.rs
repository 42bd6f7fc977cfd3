//! GPU resource management
//!
//! Materials, global uniforms and depth/shadow textures.

pub mod global_bindings;
pub mod material;
pub mod texture_resource;

// Re-export main types
pub use global_bindings::{GlobalBindings, GlobalsUniform, ShadowBindings};
pub use material::{Material, MaterialId, MaterialManager};
pub use texture_resource::TextureResource;

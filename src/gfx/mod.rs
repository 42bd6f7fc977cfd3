//! # Graphics Module
//!
//! Everything between the viewer state and the GPU.
//!
//! ## Architecture Overview
//!
//! - **Camera System** ([`camera`]) - Orbit camera, damped orbit controls and
//!   the auto-rotation animator
//! - **Geometry** ([`geometry`]) - Procedural boxes, cylinders and planes
//! - **Lighting** ([`lighting`]) - Ambient, key, fill and hemisphere lights
//!   plus the shadow-receiving ground
//! - **Picking** ([`picking`]) - Screen-space rays against node bounding boxes
//! - **Rendering Pipeline** ([`rendering`]) - Shadow-mapped lit pass on wgpu
//! - **Scene Management** ([`scene`]) - Node hierarchy, meshes and materials
//! - **Resource Management** ([`resources`]) - Materials and GPU bindings
//!
//! Only [`rendering`] and parts of [`resources`] touch the GPU; the rest is
//! plain data that the tests drive directly.

pub mod camera;
pub mod geometry;
pub mod lighting;
pub mod picking;
pub mod rendering;
pub mod resources;
pub mod scene;

// Re-export commonly used types
pub use camera::orbit_camera::OrbitCamera;
pub use rendering::render_engine::RenderEngine;

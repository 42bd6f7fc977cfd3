//! # Procedural Geometry Generation
//!
//! This module provides functions to generate the primitive shapes the viewer
//! assembles its product from, so no external model files are needed.
//!
//! ## Supported Primitives
//!
//! - **Box**: Axis-aligned box with independent width, height and depth
//! - **Cylinder**: Y-axis cylinder with separate top and bottom radii
//! - **Plane**: Horizontal XZ plane facing +Y
//!
//! ## Usage
//!
//! ```rust
//! use showroom::gfx::geometry::{generate_box, generate_cylinder, generate_plane};
//!
//! let seat = generate_box(1.0, 0.1, 1.0);
//! let leg = generate_cylinder(0.04, 0.04, 0.5, 16);
//! let ground = generate_plane(20.0, 20.0, 1, 1);
//! assert_eq!(seat.triangle_count(), 12);
//! ```

pub mod primitives;

pub use primitives::*;

use crate::gfx::scene::vertex::Vertex3D;

/// Represents generated geometry data ready for GPU upload
#[derive(Debug, Clone, Default)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
    /// Normal vectors (x, y, z)
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices (counter-clockwise winding)
    pub indices: Vec<u32>,
}

impl GeometryData {
    /// Create a new empty geometry data structure
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of vertices in this geometry
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of triangles in this geometry
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Convert to the interleaved vertex format used by the renderer
    pub fn to_vertices(&self) -> Vec<Vertex3D> {
        self.vertices
            .iter()
            .enumerate()
            .map(|(i, position)| Vertex3D {
                position: *position,
                normal: self.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
            })
            .collect()
    }
}

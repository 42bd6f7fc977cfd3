use crate::gfx::{geometry::GeometryData, picking::Aabb};

use super::vertex::Vertex3D;

/// CPU-side mesh; GPU buffers are owned by the renderer
#[derive(Debug, Clone)]
pub struct Mesh {
    vertices: Vec<Vertex3D>,
    indices: Vec<u32>,
    bounds: Aabb,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex3D>, indices: Vec<u32>) -> Self {
        let positions: Vec<[f32; 3]> = vertices.iter().map(|v| v.position).collect();
        let bounds = Aabb::from_vertices(&positions);
        Self {
            vertices,
            indices,
            bounds,
        }
    }

    pub fn vertices(&self) -> &[Vertex3D] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    /// Mesh-local bounding box used for picking
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }
}

impl From<GeometryData> for Mesh {
    fn from(data: GeometryData) -> Self {
        let vertices = data.to_vertices();
        Mesh::new(vertices, data.indices)
    }
}

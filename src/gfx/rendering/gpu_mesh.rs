//! GPU-side mesh buffers and per-node transform uniforms

use cgmath::{Matrix, Matrix4, SquareMatrix};
use wgpu::util::DeviceExt;

use crate::{
    gfx::scene::{Mesh, SceneNode},
    wgpu_utils::{binding_types, uniform_buffer::UniformBuffer},
};

/// Vertex and index buffers uploaded once per [`Mesh`]
pub struct MeshBuffers {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

impl MeshBuffers {
    pub fn new(device: &wgpu::Device, mesh: &Mesh, label: &str) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertex Buffer", label)),
            contents: bytemuck::cast_slice(mesh.vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Index Buffer", label)),
            contents: bytemuck::cast_slice(mesh.indices()),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.index_count(),
        }
    }
}

/// Per-node uniform. MUST match `Node` in the WGSL shaders.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct NodeUniform {
    pub model: [[f32; 4]; 4],
    /// Inverse-transpose of `model`, for normals under non-uniform scale
    pub normal: [[f32; 4]; 4],
    /// x: 1 when the node receives shadows
    pub flags: [f32; 4],
}

impl NodeUniform {
    pub fn from_node(node: &SceneNode) -> Self {
        let model = node.world_matrix();
        let normal = model.invert().map(|m| m.transpose()).unwrap_or(model);
        Self {
            model: model.into(),
            normal: normal.into(),
            flags: [if node.receive_shadow { 1.0 } else { 0.0 }, 0.0, 0.0, 0.0],
        }
    }
}

impl Default for NodeUniform {
    fn default() -> Self {
        let identity: [[f32; 4]; 4] = Matrix4::identity().into();
        Self {
            model: identity,
            normal: identity,
            flags: [0.0; 4],
        }
    }
}

/// Transform buffer and bind group for one scene node
pub struct NodeBindings {
    ubo: UniformBuffer<NodeUniform>,
    bind_group: wgpu::BindGroup,
}

impl NodeBindings {
    pub fn create_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Node Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: binding_types::uniform(),
                count: None,
            }],
        })
    }

    pub fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, node: &SceneNode) -> Self {
        let ubo = UniformBuffer::new_with_data(device, &NodeUniform::from_node(node));
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("Node Bind Group: {}", node.name)),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: ubo.binding_resource(),
            }],
        });

        Self { ubo, bind_group }
    }

    pub fn update(&mut self, queue: &wgpu::Queue, node: &SceneNode) {
        self.ubo.update_content(queue, NodeUniform::from_node(node));
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

pub trait DrawMesh {
    fn draw_mesh(&mut self, mesh: &MeshBuffers);
}

impl DrawMesh for wgpu::RenderPass<'_> {
    fn draw_mesh(&mut self, mesh: &MeshBuffers) {
        self.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        self.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.draw_indexed(0..mesh.index_count, 0, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::scene::MeshId;

    #[test]
    fn test_node_uniform_layout() {
        assert_eq!(std::mem::size_of::<NodeUniform>(), 144);
    }

    #[test]
    fn test_node_uniform_flags_and_normal_matrix() {
        let mut node = SceneNode::mesh("leg", MeshId(0), "wood".into()).with_shadows(true, false);
        node.world = Matrix4::from_nonuniform_scale(2.0, 1.0, 4.0);

        let uniform = NodeUniform::from_node(&node);
        assert_eq!(uniform.flags[0], 0.0);
        assert_eq!(uniform.model[0][0], 2.0);
        assert_eq!(uniform.normal[0][0], 0.5);
        assert_eq!(uniform.normal[2][2], 0.25);

        let receiver = SceneNode::mesh("ground", MeshId(1), "ground".into()).with_shadows(false, true);
        assert_eq!(NodeUniform::from_node(&receiver).flags[0], 1.0);
    }
}

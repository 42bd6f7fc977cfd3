//! Material system for PBR rendering
//!
//! Materials are plain data stored centrally in [`MaterialManager`]; scene
//! nodes reference them by [`MaterialId`]. The renderer owns the matching GPU
//! uniform buffers and bind groups and re-uploads them when the manager's
//! revision changes.

use std::collections::HashMap;

use crate::wgpu_utils::{binding_types, uniform_buffer::UniformBuffer};

/// Material ID for referencing materials
pub type MaterialId = String;

/// Converts a `0xRRGGBB` literal into an RGB triple in `0.0..=1.0`.
pub fn hex_color(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}

/// GPU uniform data for materials
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub base_color: [f32; 4],
    pub emissive: [f32; 3],
    pub metallic: f32,
    pub roughness: f32,
    _padding: [f32; 3],
}

/// Material definition with PBR properties
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub base_color: [f32; 4],
    pub metallic: f32,
    pub roughness: f32,
    pub emissive: [f32; 3],
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            base_color: [0.8, 0.8, 0.8, 1.0],
            metallic: 0.0,
            roughness: 0.5,
            emissive: [0.0, 0.0, 0.0],
        }
    }
}

impl Material {
    /// Creates a new material with basic PBR properties
    ///
    /// # Arguments
    /// * `name` - Unique name for this material
    /// * `base_color` - RGBA base color
    /// * `metallic` - Metallic factor (0.0 = dielectric, 1.0 = metallic)
    /// * `roughness` - Surface roughness (0.0 = mirror, 1.0 = rough)
    pub fn new(name: &str, base_color: [f32; 4], metallic: f32, roughness: f32) -> Self {
        Self {
            name: name.to_string(),
            base_color,
            metallic: metallic.clamp(0.0, 1.0),
            roughness: roughness.clamp(0.0, 1.0),
            emissive: [0.0, 0.0, 0.0],
        }
    }

    /// Opaque material from a `0xRRGGBB` color
    pub fn from_hex(name: &str, hex: u32, metallic: f32, roughness: f32) -> Self {
        let [r, g, b] = hex_color(hex);
        Self::new(name, [r, g, b, 1.0], metallic, roughness)
    }

    /// Builder pattern: Set emissive color
    pub fn with_emission(mut self, emissive: [f32; 3]) -> Self {
        self.emissive = emissive;
        self
    }

    /// Packs the material for upload
    pub fn uniform(&self) -> MaterialUniform {
        MaterialUniform {
            base_color: self.base_color,
            emissive: self.emissive,
            metallic: self.metallic,
            roughness: self.roughness,
            _padding: [0.0; 3],
        }
    }
}

/// Manages all materials in the viewer
///
/// Every mutation bumps [`MaterialManager::revision`] so the renderer only
/// re-uploads when something changed.
pub struct MaterialManager {
    materials: HashMap<MaterialId, Material>,
    default_material_id: MaterialId,
    revision: u64,
}

impl Default for MaterialManager {
    fn default() -> Self {
        Self::new()
    }
}

impl MaterialManager {
    /// Creates a new material manager with a default material
    pub fn new() -> Self {
        let default_material = Material::default();
        let default_material_id = default_material.name.clone();

        let mut materials = HashMap::new();
        materials.insert(default_material_id.clone(), default_material);

        Self {
            materials,
            default_material_id,
            revision: 0,
        }
    }

    /// Adds (or replaces) a material, returning its id
    pub fn add_material(&mut self, material: Material) -> MaterialId {
        let id = material.name.clone();
        self.materials.insert(id.clone(), material);
        self.revision += 1;
        id
    }

    /// Copies `source` under a new name so it can be tinted independently.
    ///
    /// Returns `None` if `source` does not exist.
    pub fn clone_material(&mut self, source: &str, new_name: &str) -> Option<MaterialId> {
        let mut copy = self.materials.get(source)?.clone();
        copy.name = new_name.to_string();
        Some(self.add_material(copy))
    }

    pub fn get_material(&self, id: &str) -> Option<&Material> {
        self.materials.get(id)
    }

    /// Mutable access; counts as a modification
    pub fn get_material_mut(&mut self, id: &str) -> Option<&mut Material> {
        let material = self.materials.get_mut(id)?;
        self.revision += 1;
        Some(material)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.materials.contains_key(id)
    }

    /// Gets the default material
    pub fn get_default_material(&self) -> &Material {
        &self.materials[&self.default_material_id]
    }

    /// Gets material for an object with fallback to default
    pub fn get_material_for_object(&self, material_id: Option<&MaterialId>) -> &Material {
        material_id
            .and_then(|id| self.get_material(id))
            .unwrap_or_else(|| self.get_default_material())
    }

    /// Iterates over every material
    pub fn iter(&self) -> impl Iterator<Item = (&MaterialId, &Material)> {
        self.materials.iter()
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// Changes whenever any material is added or mutated
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

type MaterialUBO = UniformBuffer<MaterialUniform>;

/// GPU resources for one material
pub struct MaterialBindings {
    ubo: MaterialUBO,
    bind_group: wgpu::BindGroup,
}

impl MaterialBindings {
    /// Fragment-visible layout shared by every material bind group
    pub fn create_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Material Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: binding_types::uniform(),
                count: None,
            }],
        })
    }

    pub fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, material: &Material) -> Self {
        let ubo = MaterialUBO::new_with_data(device, &material.uniform());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("Material Bind Group: {}", material.name)),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: ubo.binding_resource(),
            }],
        });

        Self { ubo, bind_group }
    }

    /// Uploads the material if its content changed
    pub fn update(&mut self, queue: &wgpu::Queue, material: &Material) {
        self.ubo.update_content(queue, material.uniform());
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

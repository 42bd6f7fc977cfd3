//! Scene graph nodes
//!
//! A [`SceneNode`] is a transformable entry in the scene hierarchy. Nodes with a
//! mesh are drawn; nodes without one act as groups.

use cgmath::{Matrix4, One, Quaternion, Vector3};

use crate::gfx::resources::material::MaterialId;

/// Index of a node inside its [`Scene`](super::Scene)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Index of a mesh inside its [`Scene`](super::Scene)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub(crate) usize);

impl MeshId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Local translation, rotation and scale of a node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    pub scale: Vector3<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Quaternion::one(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Local matrix, composed as T * R * S
    pub fn matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * Matrix4::from(self.rotation)
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }
}

/// Free-form tags attached to a node
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeMetadata {
    /// Name shown to the user (info panel)
    pub display_name: Option<String>,
    /// Part classification tag, e.g. `"leg"`
    pub part_type: Option<String>,
    /// Transient: pointer is over this node
    pub hovered: bool,
    /// Transient: node is the current selection
    pub selected: bool,
}

/// One entry of the scene graph
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,
    pub transform: Transform,
    pub mesh: Option<MeshId>,
    pub material: Option<MaterialId>,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
    pub visible: bool,
    pub metadata: NodeMetadata,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) world: Matrix4<f32>,
}

impl SceneNode {
    /// A node without geometry, used to group children
    pub fn group(name: &str) -> Self {
        Self {
            name: name.to_string(),
            transform: Transform::default(),
            mesh: None,
            material: None,
            cast_shadow: false,
            receive_shadow: false,
            visible: true,
            metadata: NodeMetadata::default(),
            parent: None,
            children: Vec::new(),
            world: Matrix4::one(),
        }
    }

    /// A drawable node
    pub fn mesh(name: &str, mesh: MeshId, material: MaterialId) -> Self {
        Self {
            mesh: Some(mesh),
            material: Some(material),
            ..Self::group(name)
        }
    }

    pub fn with_position(mut self, x: f32, y: f32, z: f32) -> Self {
        self.transform.position = Vector3::new(x, y, z);
        self
    }

    pub fn with_rotation(mut self, rotation: Quaternion<f32>) -> Self {
        self.transform.rotation = rotation;
        self
    }

    pub fn with_shadows(mut self, cast: bool, receive: bool) -> Self {
        self.cast_shadow = cast;
        self.receive_shadow = receive;
        self
    }

    pub fn with_display_name(mut self, display_name: &str) -> Self {
        self.metadata.display_name = Some(display_name.to_string());
        self
    }

    pub fn with_part_type(mut self, part_type: &str) -> Self {
        self.metadata.part_type = Some(part_type.to_string());
        self
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// World matrix as of the last [`Scene::update`](super::Scene::update)
    pub fn world_matrix(&self) -> Matrix4<f32> {
        self.world
    }

    /// Display name, falling back to the node name
    pub fn label(&self) -> &str {
        self.metadata
            .display_name
            .as_deref()
            .unwrap_or(self.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Deg, Rotation3, Vector4};

    #[test]
    fn test_transform_order_is_trs() {
        let transform = Transform {
            position: Vector3::new(1.0, 0.0, 0.0),
            rotation: Quaternion::from_angle_y(Deg(90.0)),
            scale: Vector3::new(2.0, 2.0, 2.0),
        };

        // Scale first, then rotate +X onto -Z, then translate
        let p = transform.matrix() * Vector4::new(1.0, 0.0, 0.0, 1.0);
        assert!((p.x - 1.0).abs() < 1e-5);
        assert!(p.y.abs() < 1e-5);
        assert!((p.z + 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_label_falls_back_to_name() {
        let node = SceneNode::group("chair");
        assert_eq!(node.label(), "chair");
        let node = node.with_display_name("Lounge Chair");
        assert_eq!(node.label(), "Lounge Chair");
    }
}

use cgmath::{Matrix4, One};

use crate::gfx::{
    camera::camera_utils::CameraManager,
    geometry::GeometryData,
    resources::material::{Material, MaterialManager},
};

use super::{
    mesh::Mesh,
    node::{MeshId, NodeId, SceneNode},
};

/// Main scene containing the node hierarchy, meshes, materials and camera
pub struct Scene {
    pub camera_manager: CameraManager,
    pub material_manager: MaterialManager,
    nodes: Vec<SceneNode>,
    meshes: Vec<Mesh>,
    root: NodeId,
}

impl Scene {
    /// Creates a scene holding only an empty root group
    pub fn new(camera_manager: CameraManager) -> Self {
        Self {
            camera_manager,
            material_manager: MaterialManager::new(),
            nodes: vec![SceneNode::group("scene")],
            meshes: Vec::new(),
            root: NodeId(0),
        }
    }

    /// Updates world matrices and the camera uniform
    pub fn update(&mut self) {
        self.update_world_matrices();
        self.camera_manager.camera.update_view_proj();
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Registers mesh data and returns its handle
    pub fn add_mesh(&mut self, geometry: GeometryData) -> MeshId {
        self.meshes.push(Mesh::from(geometry));
        MeshId(self.meshes.len() - 1)
    }

    /// Convenience wrapper around [`MaterialManager::add_material`]
    pub fn add_material(&mut self, material: Material) -> String {
        self.material_manager.add_material(material)
    }

    /// Inserts `node` as the last child of `parent`
    ///
    /// An unknown parent attaches the node to the root instead.
    pub fn add_node(&mut self, mut node: SceneNode, parent: NodeId) -> NodeId {
        let parent = if parent.0 < self.nodes.len() {
            parent
        } else {
            log::warn!("Unknown parent {:?} for '{}', attaching to root", parent, node.name);
            self.root
        };

        let id = NodeId(self.nodes.len());
        node.parent = Some(parent);
        node.children.clear();
        self.nodes.push(node);
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id.0)
    }

    pub fn mesh(&self, id: MeshId) -> Option<&Mesh> {
        self.meshes.get(id.0)
    }

    pub fn meshes(&self) -> impl Iterator<Item = (MeshId, &Mesh)> {
        self.meshes.iter().enumerate().map(|(i, m)| (MeshId(i), m))
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// First node with the given name
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.nodes().find(|(_, n)| n.name == name).map(|(id, _)| id)
    }

    /// Recomputes every node's world matrix from the hierarchy
    pub fn update_world_matrices(&mut self) {
        let mut stack = vec![(self.root, Matrix4::one())];

        while let Some((id, parent_world)) = stack.pop() {
            let node = &mut self.nodes[id.0];
            node.world = parent_world * node.transform.matrix();
            let world = node.world;
            stack.extend(node.children.iter().map(|child| (*child, world)));
        }
    }

    /// True if the node and all its ancestors are visible
    pub fn is_effectively_visible(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            match self.node(node_id) {
                Some(node) if node.visible => current = node.parent,
                _ => return false,
            }
        }
        true
    }

    /// Visible nodes that carry a mesh, in insertion order
    pub fn drawables(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.nodes()
            .filter(move |(id, node)| node.mesh.is_some() && self.is_effectively_visible(*id))
    }

    /// Gets statistics about the scene
    pub fn get_statistics(&self) -> SceneStatistics {
        let drawable: Vec<&Mesh> = self
            .drawables()
            .filter_map(|(_, node)| node.mesh.and_then(|m| self.mesh(m)))
            .collect();

        SceneStatistics {
            node_count: self.nodes.len(),
            mesh_count: self.meshes.len(),
            material_count: self.material_manager.len(),
            total_triangles: drawable.iter().map(|m| m.index_count() / 3).sum(),
            total_vertices: drawable.iter().map(|m| m.vertices().len() as u32).sum(),
        }
    }
}

/// Scene statistics for debugging and UI display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneStatistics {
    pub node_count: usize,
    pub mesh_count: usize,
    pub material_count: usize,
    pub total_triangles: u32,
    pub total_vertices: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewerConfig;
    use crate::gfx::geometry::generate_box;
    use cgmath::{Vector3, Vector4};

    fn scene() -> Scene {
        Scene::new(CameraManager::from_config(&ViewerConfig::default()))
    }

    #[test]
    fn test_world_matrices_follow_hierarchy() {
        let mut scene = scene();
        let root = scene.root();
        let group = scene.add_node(SceneNode::group("group").with_position(0.0, 2.0, 0.0), root);
        let mesh = scene.add_mesh(generate_box(1.0, 1.0, 1.0));
        let child = scene.add_node(
            SceneNode::mesh("child", mesh, "default".into()).with_position(1.0, 0.0, 0.0),
            group,
        );

        scene.update_world_matrices();

        let origin = scene.node(child).unwrap().world_matrix() * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert_eq!(Vector3::new(origin.x, origin.y, origin.z), Vector3::new(1.0, 2.0, 0.0));

        scene.node_mut(group).unwrap().transform.position.y = 3.0;
        scene.update_world_matrices();
        let origin = scene.node(child).unwrap().world_matrix() * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert_eq!(origin.y, 3.0);
    }

    #[test]
    fn test_parent_child_links() {
        let mut scene = scene();
        let root = scene.root();
        let group = scene.add_node(SceneNode::group("group"), root);
        let a = scene.add_node(SceneNode::group("a"), group);
        let b = scene.add_node(SceneNode::group("b"), group);

        assert_eq!(scene.node(group).unwrap().children(), &[a, b]);
        assert_eq!(scene.node(a).unwrap().parent(), Some(group));
        assert_eq!(scene.find_by_name("b"), Some(b));
    }

    #[test]
    fn test_unknown_parent_attaches_to_root() {
        let mut scene = scene();
        let id = scene.add_node(SceneNode::group("orphan"), NodeId(42));
        assert_eq!(scene.node(id).unwrap().parent(), Some(scene.root()));
    }

    #[test]
    fn test_hidden_group_hides_children() {
        let mut scene = scene();
        let root = scene.root();
        let mesh = scene.add_mesh(generate_box(1.0, 1.0, 1.0));
        let group = scene.add_node(SceneNode::group("group"), root);
        scene.add_node(SceneNode::mesh("a", mesh, "default".into()), group);
        scene.add_node(SceneNode::mesh("b", mesh, "default".into()), root);

        assert_eq!(scene.drawables().count(), 2);
        scene.node_mut(group).unwrap().visible = false;
        let names: Vec<&str> = scene.drawables().map(|(_, n)| n.name.as_str()).collect();
        assert_eq!(names, vec!["b"]);
    }

    #[test]
    fn test_statistics() {
        let mut scene = scene();
        let root = scene.root();
        let mesh = scene.add_mesh(generate_box(1.0, 1.0, 1.0));
        scene.add_node(SceneNode::mesh("a", mesh, "default".into()), root);
        scene.add_node(SceneNode::mesh("b", mesh, "default".into()), root);

        let stats = scene.get_statistics();
        assert_eq!(stats.node_count, 3);
        assert_eq!(stats.mesh_count, 1);
        assert_eq!(stats.total_triangles, 24);
        assert_eq!(stats.total_vertices, 48);
    }
}

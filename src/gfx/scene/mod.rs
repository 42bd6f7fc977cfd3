//! # Scene Management Module
//!
//! The scene graph: a hierarchy of [`SceneNode`]s stored in an arena inside
//! [`Scene`], the CPU-side [`Mesh`]es they reference, the material library and
//! the camera.
//!
//! ## Usage
//!
//! ```no_run
//! use showroom::config::ViewerConfig;
//! use showroom::gfx::camera::CameraManager;
//! use showroom::gfx::geometry::generate_box;
//! use showroom::gfx::scene::{Scene, SceneNode};
//!
//! let mut scene = Scene::new(CameraManager::from_config(&ViewerConfig::default()));
//! let mesh = scene.add_mesh(generate_box(1.0, 1.0, 1.0));
//! let root = scene.root();
//! scene.add_node(SceneNode::mesh("crate", mesh, "default".into()), root);
//! scene.update();
//! ```

pub mod mesh;
pub mod node;
pub mod scene;
pub mod vertex;

// Re-export main types
pub use mesh::Mesh;
pub use node::{MeshId, NodeId, NodeMetadata, SceneNode, Transform};
pub use scene::{Scene, SceneStatistics};
pub use vertex::Vertex3D;

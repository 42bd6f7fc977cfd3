//! # Showroom Prelude
//!
//! Commonly used types in one import:
//!
//! ```rust
//! use showroom::prelude::*;
//!
//! let mut viewer = Viewer::new(ViewerConfig::default());
//! viewer.frame(1.0 / 60.0);
//! assert_eq!(viewer.status().mode, RotationMode::AutoRotating);
//! ```

// Core application types
pub use crate::app::{ShowroomApp, ViewerCommand};
pub use crate::error::{ViewerError, ViewerResult};
pub use crate::viewer::{Viewer, ViewerStatus};

// Configuration
pub use crate::config::{
    AutoRotateConfig, CameraConfig, ControlsConfig, FloatConfig, InteractionConfig, ViewerConfig,
};
pub use crate::gfx::lighting::{LightKind, LightingConfig, LightingRig};

// Scene and camera
pub use crate::gfx::camera::{CameraAnimator, CameraManager, OrbitCamera, RotationMode};
pub use crate::gfx::geometry::{generate_box, generate_cylinder, generate_plane, GeometryData};
pub use crate::gfx::picking::Ray;
pub use crate::gfx::resources::material::{Material, MaterialId};
pub use crate::gfx::scene::{NodeId, Scene, SceneNode};

// Product and interaction
pub use crate::interaction::{InfoPanel, InteractionManager};
pub use crate::product::{PartType, Product};
pub use crate::ui::UiAction;

// Math
pub use cgmath::{InnerSpace, Vector3};

pub mod animator;
pub mod camera_utils;
pub mod orbit_camera;
pub mod orbit_controls;

// Re-export main types
pub use animator::{CameraAnimator, RotationMode};
pub use camera_utils::{CameraManager, CameraUniform};
pub use orbit_camera::OrbitCamera;
pub use orbit_controls::{ControlEvent, OrbitControls};

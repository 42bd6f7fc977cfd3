use cgmath::{Matrix4, SquareMatrix, Vector3};

use crate::config::ViewerConfig;

use super::{
    orbit_camera::{OrbitCamera, OrbitCameraBounds},
    orbit_controls::OrbitControls,
};

/// Camera plus the input scheme that drives it
pub struct CameraManager {
    pub camera: OrbitCamera,
    pub controls: OrbitControls,
}

impl CameraManager {
    pub fn new(camera: OrbitCamera, controls: OrbitControls) -> Self {
        Self { camera, controls }
    }

    /// Camera at the configured position with controls bounded by the config
    pub fn from_config(config: &ViewerConfig) -> Self {
        let camera_config = &config.camera;
        let (width, height) = config.window_size;

        let mut camera = OrbitCamera::looking_at(
            Vector3::from(camera_config.position),
            Vector3::from(camera_config.target),
            width as f32 / height.max(1) as f32,
        );
        camera.fovy = cgmath::Deg(camera_config.fov_degrees).into();
        camera.znear = camera_config.znear;
        camera.zfar = camera_config.zfar;

        let controls_config = &config.controls;
        camera.bounds = OrbitCameraBounds::from_polar(
            controls_config.min_distance,
            controls_config.max_distance,
            controls_config.min_polar_angle,
            controls_config.max_polar_angle,
        );

        Self::new(camera, OrbitControls::new(controls_config))
    }

    /// Advances the damped controls; true if the camera moved
    pub fn update(&mut self) -> bool {
        self.controls.update(&mut self.camera)
    }
}

pub trait Camera: Sized {
    fn build_view_projection_matrix(&self) -> Matrix4<f32>;
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Debug, PartialEq)]
pub struct CameraUniform {
    /// The eye position of the camera in homogenous coordinates.
    ///
    /// Homogenous coordinates are used to fullfill the 16 byte alignment requirement.
    pub view_position: [f32; 4],

    /// Contains the view projection matrix.
    pub view_proj: [[f32; 4]; 4],
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self {
            view_position: [0.0; 4],
            view_proj: convert_matrix4_to_array(Matrix4::identity()),
        }
    }
}

pub fn convert_matrix4_to_array(matrix4: Matrix4<f32>) -> [[f32; 4]; 4] {
    matrix4.into()
}

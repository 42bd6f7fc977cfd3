use super::camera_utils::{convert_matrix4_to_array, Camera, CameraUniform};
use cgmath::*;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

/// Y-up perspective camera orbiting a target.
///
/// The eye is derived from `yaw` (around +Y, 0 looks down -Z from +Z),
/// `pitch` (elevation above the target's horizontal plane) and `distance`.
#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    pub distance: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub eye: Vector3<f32>,
    pub target: Vector3<f32>,
    pub up: Vector3<f32>,
    pub bounds: OrbitCameraBounds,
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
    pub uniform: CameraUniform,
}

impl Camera for OrbitCamera {
    fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * self.projection_matrix() * self.view_matrix()
    }
}

impl OrbitCamera {
    pub fn new(distance: f32, pitch: f32, yaw: f32, target: Vector3<f32>, aspect: f32) -> Self {
        let mut camera = Self {
            distance,
            pitch,
            yaw,
            eye: Vector3::zero(), // Recomputed in `update()`
            target,
            up: Vector3::unit_y(),
            bounds: OrbitCameraBounds::default(),
            aspect,
            fovy: Rad(std::f32::consts::FRAC_PI_4),
            znear: 0.1,
            zfar: 1000.0,
            uniform: CameraUniform::default(),
        };
        camera.update();
        camera
    }

    /// Camera placed at `eye` looking at `target`
    pub fn looking_at(eye: Vector3<f32>, target: Vector3<f32>, aspect: f32) -> Self {
        let mut camera = Self::new(1.0, 0.0, 0.0, target, aspect);
        camera.set_eye(eye);
        camera
    }

    /// Moves the eye to an explicit position without applying bounds.
    ///
    /// Yaw, pitch and distance are re-derived so later orbiting continues
    /// from here.
    pub fn set_eye(&mut self, eye: Vector3<f32>) {
        let offset = eye - self.target;
        let distance = offset.magnitude();
        if distance > f32::EPSILON {
            self.distance = distance;
            self.pitch = (offset.y / distance).clamp(-1.0, 1.0).asin();
            self.yaw = offset.x.atan2(offset.z);
        }
        self.eye = eye;
    }

    /// Moves the orbit target, keeping yaw, pitch and distance
    pub fn set_target(&mut self, target: Vector3<f32>) {
        self.target = target;
        self.update();
    }

    pub fn set_distance(&mut self, distance: f32) {
        self.distance = distance.clamp(
            self.bounds.min_distance.unwrap_or(f32::EPSILON),
            self.bounds.max_distance.unwrap_or(f32::MAX),
        );
        self.update();
    }

    pub fn set_pitch(&mut self, pitch: f32) {
        self.pitch = pitch.clamp(self.bounds.min_pitch, self.bounds.max_pitch);
        self.update();
    }

    pub fn add_pitch(&mut self, delta: f32) {
        self.set_pitch(self.pitch + delta);
    }

    pub fn set_yaw(&mut self, yaw: f32) {
        let mut bounded_yaw = yaw;
        if let Some(min_yaw) = self.bounds.min_yaw {
            bounded_yaw = bounded_yaw.max(min_yaw);
        }
        if let Some(max_yaw) = self.bounds.max_yaw {
            bounded_yaw = bounded_yaw.min(max_yaw);
        }
        self.yaw = bounded_yaw;
        self.update();
    }

    pub fn add_yaw(&mut self, delta: f32) {
        self.set_yaw(self.yaw + delta);
    }

    /// Updates the camera after changing `distance`, `pitch` or `yaw`.
    fn update(&mut self) {
        self.eye =
            calculate_cartesian_eye_position(self.pitch, self.yaw, self.distance, self.target);
    }

    pub fn resize_projection(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.aspect = width as f32 / height as f32;
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(
            Point3::from_vec(self.eye),
            Point3::from_vec(self.target),
            self.up,
        )
    }

    /// OpenGL-convention projection (depth in -1..1), used for picking
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }

    pub fn update_view_proj(&mut self) {
        self.uniform.view_position = [self.eye.x, self.eye.y, self.eye.z, 1.0];
        self.uniform.view_proj = convert_matrix4_to_array(self.build_view_projection_matrix());
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OrbitCameraBounds {
    pub min_distance: Option<f32>,
    pub max_distance: Option<f32>,
    pub min_pitch: f32,
    pub max_pitch: f32,
    pub min_yaw: Option<f32>,
    pub max_yaw: Option<f32>,
}

impl Default for OrbitCameraBounds {
    fn default() -> Self {
        Self {
            min_distance: None,
            max_distance: None,
            min_pitch: -std::f32::consts::FRAC_PI_2 + 0.001,
            max_pitch: std::f32::consts::FRAC_PI_2 - 0.001,
            min_yaw: None,
            max_yaw: None,
        }
    }
}

impl OrbitCameraBounds {
    /// Bounds from a distance range and a polar-angle range measured from +Y
    pub fn from_polar(
        min_distance: f32,
        max_distance: f32,
        min_polar_angle: f32,
        max_polar_angle: f32,
    ) -> Self {
        let defaults = Self::default();
        let to_pitch = |polar: f32| std::f32::consts::FRAC_PI_2 - polar;
        Self {
            min_distance: Some(min_distance),
            max_distance: Some(max_distance),
            min_pitch: to_pitch(max_polar_angle).max(defaults.min_pitch),
            max_pitch: to_pitch(min_polar_angle).min(defaults.max_pitch),
            min_yaw: None,
            max_yaw: None,
        }
    }
}

fn calculate_cartesian_eye_position(
    pitch: f32,
    yaw: f32,
    distance: f32,
    target: Vector3<f32>,
) -> Vector3<f32> {
    Vector3::new(
        distance * yaw.sin() * pitch.cos(),
        distance * pitch.sin(),
        distance * yaw.cos() * pitch.cos(),
    ) + target
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_set_eye_round_trips_through_angles() {
        let target = Vector3::new(0.0, 0.7, 0.0);
        let eye = Vector3::new(3.0, 2.0, 3.0);
        let mut camera = OrbitCamera::looking_at(eye, target, 1.5);

        assert_relative_eq!(camera.eye, eye);
        // Nudging yaw by zero recomputes the eye from the derived angles
        camera.add_yaw(0.0);
        assert_relative_eq!(camera.eye, eye, epsilon = 1e-5);
    }

    #[test]
    fn test_distance_is_clamped() {
        let mut camera = OrbitCamera::new(5.0, 0.3, 0.0, Vector3::zero(), 1.0);
        camera.bounds = OrbitCameraBounds::from_polar(2.0, 10.0, 0.0, std::f32::consts::FRAC_PI_2);

        camera.set_distance(50.0);
        assert_eq!(camera.distance, 10.0);
        camera.set_distance(0.5);
        assert_eq!(camera.distance, 2.0);
    }

    #[test]
    fn test_polar_bounds_keep_camera_above_ground() {
        let mut camera = OrbitCamera::new(5.0, 0.3, 0.0, Vector3::zero(), 1.0);
        camera.bounds = OrbitCameraBounds::from_polar(1.0, 10.0, 0.0, std::f32::consts::FRAC_PI_2);

        camera.set_pitch(-1.0);
        assert_eq!(camera.pitch, 0.0);
        camera.set_pitch(3.0);
        assert!(camera.pitch < std::f32::consts::FRAC_PI_2);
    }

    #[test]
    fn test_resize_updates_aspect() {
        let mut camera = OrbitCamera::new(5.0, 0.3, 0.0, Vector3::zero(), 1.0);
        camera.resize_projection(1920, 1080);
        assert_relative_eq!(camera.aspect, 1920.0 / 1080.0);

        camera.resize_projection(800, 0);
        assert_relative_eq!(camera.aspect, 1920.0 / 1080.0);
    }

    #[test]
    fn test_target_projects_to_screen_center() {
        let camera = OrbitCamera::new(5.0, 0.4, 0.7, Vector3::new(1.0, 0.5, -2.0), 1.6);
        let clip = camera.build_view_projection_matrix() * camera.target.extend(1.0);
        assert_relative_eq!(clip.x / clip.w, 0.0, epsilon = 1e-5);
        assert_relative_eq!(clip.y / clip.w, 0.0, epsilon = 1e-5);
    }
}

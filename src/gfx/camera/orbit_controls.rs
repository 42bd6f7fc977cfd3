use crate::config::ControlsConfig;

use super::orbit_camera::OrbitCamera;

const MIN_DELTA: f32 = 1e-5;

/// Lifecycle notifications emitted while the user drives the controls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    Start,
    Change,
    End,
}

/// Damped rotate/zoom controls for an [`OrbitCamera`].
///
/// Pointer input only accumulates deltas; [`OrbitControls::update`] applies a
/// `damping_factor` share of them each frame so motion eases out after the
/// pointer is released.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    enabled: bool,
    is_dragging: bool,
    last_pointer: Option<(f32, f32)>,
    yaw_delta: f32,
    pitch_delta: f32,
    zoom_scale: f32,
}

impl OrbitControls {
    pub fn new(config: &ControlsConfig) -> Self {
        Self {
            damping_factor: config.damping_factor,
            rotate_speed: config.rotate_speed,
            zoom_speed: config.zoom_speed,
            enabled: true,
            is_dragging: false,
            last_pointer: None,
            yaw_delta: 0.0,
            pitch_delta: 0.0,
            zoom_scale: 1.0,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Disabling drops any residual damping velocity and ends a drag
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;
        if !enabled {
            self.stop();
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.is_dragging
    }

    /// True while damping still has motion left to apply
    pub fn is_settling(&self) -> bool {
        self.yaw_delta != 0.0 || self.pitch_delta != 0.0 || self.zoom_scale != 1.0
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) -> Option<ControlEvent> {
        if !self.enabled {
            return None;
        }
        self.is_dragging = true;
        self.last_pointer = Some((x, y));
        Some(ControlEvent::Start)
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) -> Option<ControlEvent> {
        if !self.enabled || !self.is_dragging {
            return None;
        }
        let (last_x, last_y) = self.last_pointer.replace((x, y))?;
        let (dx, dy) = (x - last_x, y - last_y);
        if dx == 0.0 && dy == 0.0 {
            return None;
        }

        // Dragging right swings the camera left around the target
        self.yaw_delta -= dx * self.rotate_speed;
        self.pitch_delta += dy * self.rotate_speed;
        Some(ControlEvent::Change)
    }

    pub fn pointer_up(&mut self) -> Option<ControlEvent> {
        if !self.is_dragging {
            return None;
        }
        self.is_dragging = false;
        self.last_pointer = None;
        Some(ControlEvent::End)
    }

    /// Zooms by wheel lines, positive lines move the camera closer
    pub fn wheel(&mut self, lines: f32) -> Option<ControlEvent> {
        if !self.enabled || lines == 0.0 {
            return None;
        }
        let base = (1.0 - self.zoom_speed).clamp(0.01, 0.99);
        self.zoom_scale *= base.powf(lines);
        Some(ControlEvent::Change)
    }

    /// Applies one frame of accumulated input; true if the camera moved
    pub fn update(&mut self, camera: &mut OrbitCamera) -> bool {
        if !self.enabled {
            return false;
        }

        let damping = if self.damping_factor > 0.0 {
            self.damping_factor.min(1.0)
        } else {
            1.0
        };
        let mut changed = false;

        if self.yaw_delta != 0.0 || self.pitch_delta != 0.0 {
            camera.add_yaw(self.yaw_delta * damping);
            camera.add_pitch(self.pitch_delta * damping);
            self.yaw_delta = decay(self.yaw_delta, damping);
            self.pitch_delta = decay(self.pitch_delta, damping);
            changed = true;
        }

        if self.zoom_scale != 1.0 {
            camera.set_distance(camera.distance * self.zoom_scale);
            self.zoom_scale = 1.0;
            changed = true;
        }

        changed
    }

    fn stop(&mut self) {
        self.is_dragging = false;
        self.last_pointer = None;
        self.yaw_delta = 0.0;
        self.pitch_delta = 0.0;
        self.zoom_scale = 1.0;
    }
}

fn decay(delta: f32, damping: f32) -> f32 {
    let next = delta * (1.0 - damping);
    if next.abs() < MIN_DELTA {
        0.0
    } else {
        next
    }
}

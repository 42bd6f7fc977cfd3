//! Viewer configuration
//!
//! Every tunable of the viewer lives in a typed struct with a sensible
//! [`Default`] and `with_*` builder methods. Native builds can override a few
//! values through `SHOWROOM_*` environment variables, see
//! [`ViewerConfig::from_env`].

use crate::gfx::lighting::LightingConfig;

/// Camera placement and projection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraConfig {
    /// Initial eye position, also the reset destination
    pub position: [f32; 3],
    /// Point the camera orbits and looks at
    pub target: [f32; 3],
    pub fov_degrees: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [3.0, 2.0, 3.0],
            target: [0.0, 0.7, 0.0],
            fov_degrees: 45.0,
            znear: 0.1,
            zfar: 1000.0,
        }
    }
}

/// Damped orbit controls
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlsConfig {
    /// Fraction of the remaining rotation applied per frame
    pub damping_factor: f32,
    /// Radians per pixel of pointer drag
    pub rotate_speed: f32,
    /// Zoom factor per wheel line
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Polar angle limits, measured from +Y
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            damping_factor: 0.05,
            rotate_speed: 0.005,
            zoom_speed: 0.1,
            min_distance: 2.0,
            max_distance: 10.0,
            min_polar_angle: 0.0,
            max_polar_angle: std::f32::consts::FRAC_PI_2,
        }
    }
}

/// Idle camera rotation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutoRotateConfig {
    pub enabled: bool,
    pub speed_degrees_per_second: f32,
    /// Seconds of inactivity before rotation resumes
    pub resume_delay: f32,
    /// Seconds the reset animation takes
    pub reset_duration: f32,
}

impl Default for AutoRotateConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            speed_degrees_per_second: 15.0,
            resume_delay: 3.0,
            reset_duration: 1.0,
        }
    }
}

impl AutoRotateConfig {
    /// Seconds for one full turn, `None` when the speed is zero
    pub fn period(&self) -> Option<f32> {
        (self.speed_degrees_per_second.abs() > f32::EPSILON)
            .then(|| 360.0 / self.speed_degrees_per_second.abs())
    }
}

/// Hover and selection feedback
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionConfig {
    pub hover_emissive: [f32; 3],
    pub hover_scale: f32,
    pub selected_emissive: [f32; 3],
    /// Relative scale swing of the selection pulse
    pub pulse_amplitude: f32,
    /// Pulse oscillations per second
    pub pulse_frequency: f32,
    pub pulse_cycles: u32,
    /// Max pointer travel in pixels for a press/release to count as a click
    pub click_threshold: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            hover_emissive: [0.2, 0.2, 0.2],
            hover_scale: 1.05,
            selected_emissive: [0.45, 0.3, 0.1],
            pulse_amplitude: 0.05,
            pulse_frequency: 2.0,
            pulse_cycles: 3,
            click_threshold: 5.0,
        }
    }
}

impl InteractionConfig {
    /// Seconds the selection pulse lasts
    pub fn pulse_duration(&self) -> f32 {
        if self.pulse_frequency <= 0.0 {
            0.0
        } else {
            self.pulse_cycles as f32 / self.pulse_frequency
        }
    }
}

/// Vertical bobbing of the product
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatConfig {
    pub enabled: bool,
    pub amplitude: f32,
    /// Angular speed of the sine in radians per second
    pub speed: f32,
}

impl Default for FloatConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            amplitude: 0.05,
            speed: 1.0,
        }
    }
}

/// Top-level viewer configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    /// Id of the canvas element the viewer renders into (web)
    pub canvas_id: String,
    /// Initial window size in logical pixels (native)
    pub window_size: (u32, u32),
    pub camera: CameraConfig,
    pub controls: ControlsConfig,
    pub auto_rotate: AutoRotateConfig,
    pub interaction: InteractionConfig,
    pub float: FloatConfig,
    pub lighting: LightingConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            canvas_id: "viewer-canvas".to_string(),
            window_size: (1200, 800),
            camera: CameraConfig::default(),
            controls: ControlsConfig::default(),
            auto_rotate: AutoRotateConfig::default(),
            interaction: InteractionConfig::default(),
            float: FloatConfig::default(),
            lighting: LightingConfig::default(),
        }
    }
}

impl ViewerConfig {
    /// Defaults plus `SHOWROOM_*` environment overrides
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Applies overrides from a key lookup
    ///
    /// Recognised keys: `SHOWROOM_ROTATE_SPEED` (degrees/second),
    /// `SHOWROOM_RESUME_DELAY` (seconds), `SHOWROOM_FLOAT` and
    /// `SHOWROOM_SHADOWS` (booleans). Unparsable values are logged and ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(speed) = parse_override::<f32>(&lookup, "SHOWROOM_ROTATE_SPEED") {
            self.auto_rotate.speed_degrees_per_second = speed;
        }
        if let Some(delay) = parse_override::<f32>(&lookup, "SHOWROOM_RESUME_DELAY") {
            self.auto_rotate.resume_delay = delay.max(0.0);
        }
        if let Some(enabled) = parse_flag(&lookup, "SHOWROOM_FLOAT") {
            self.float.enabled = enabled;
        }
        if let Some(enabled) = parse_flag(&lookup, "SHOWROOM_SHADOWS") {
            self.lighting.shadows_enabled = enabled;
        }
    }

    pub fn with_canvas_id(mut self, canvas_id: &str) -> Self {
        self.canvas_id = canvas_id.to_string();
        self
    }

    pub fn with_camera(mut self, camera: CameraConfig) -> Self {
        self.camera = camera;
        self
    }

    pub fn with_controls(mut self, controls: ControlsConfig) -> Self {
        self.controls = controls;
        self
    }

    pub fn with_auto_rotate(mut self, auto_rotate: AutoRotateConfig) -> Self {
        self.auto_rotate = auto_rotate;
        self
    }

    pub fn with_interaction(mut self, interaction: InteractionConfig) -> Self {
        self.interaction = interaction;
        self
    }

    pub fn with_float(mut self, float: FloatConfig) -> Self {
        self.float = float;
        self
    }

    pub fn with_lighting(mut self, lighting: LightingConfig) -> Self {
        self.lighting = lighting;
        self
    }
}

fn parse_override<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("Ignoring {}={:?}: not a valid value", key, raw);
            None
        }
    }
}

fn parse_flag(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<bool> {
    let raw = lookup(key)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => {
            log::warn!("Ignoring {}={:?}: expected a boolean", key, raw);
            None
        }
    }
}

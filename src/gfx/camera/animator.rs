//! Idle auto-rotation and the reset animation.
//!
//! While auto-rotating the camera travels a fixed-radius circle around the
//! target at a fixed height. Any user interaction hands the camera over to the
//! orbit controls; once the interaction ends a single resume deadline is armed
//! on the animator clock, and when it passes without further input rotation
//! continues from wherever the user left the camera.

use std::f64::consts::TAU;

use cgmath::{Vector3, VectorSpace};

use crate::config::AutoRotateConfig;

use super::{orbit_camera::OrbitCamera, orbit_controls::OrbitControls};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResetAnimation {
    from_eye: Vector3<f32>,
    from_target: Vector3<f32>,
    started_at: f64,
    duration: f64,
}

impl ResetAnimation {
    /// Eased progress in `0..=1` at `clock`
    pub fn progress(&self, clock: f64) -> f32 {
        let t = ((clock - self.started_at) / self.duration).clamp(0.0, 1.0) as f32;
        ease_out_cubic(t)
    }

    fn is_finished(&self, clock: f64) -> bool {
        clock - self.started_at >= self.duration
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RotationMode {
    AutoRotating,
    UserInteracting,
    /// Interaction ended, rotation resumes once the clock reaches `resume_at`
    Resuming { resume_at: f64 },
    /// Auto-rotation switched off by the user
    Manual,
    Resetting(ResetAnimation),
}

pub struct CameraAnimator {
    mode: RotationMode,
    auto_rotate_enabled: bool,
    /// Radians per second
    speed: f64,
    resume_delay: f64,
    reset_duration: f64,
    angle: f32,
    radius: f32,
    height: f32,
    anchor_angle: f64,
    anchor_time: f64,
    initial_eye: Vector3<f32>,
    initial_target: Vector3<f32>,
    clock: f64,
}

impl CameraAnimator {
    /// Starts from the camera's current placement, which is also the reset destination
    pub fn new(
        config: &AutoRotateConfig,
        camera: &OrbitCamera,
        controls: &mut OrbitControls,
    ) -> Self {
        let mut animator = Self {
            mode: RotationMode::Manual,
            auto_rotate_enabled: config.enabled,
            speed: (config.speed_degrees_per_second as f64).to_radians(),
            resume_delay: config.resume_delay.max(0.0) as f64,
            reset_duration: config.reset_duration.max(0.0) as f64,
            angle: 0.0,
            radius: 0.0,
            height: 0.0,
            anchor_angle: 0.0,
            anchor_time: 0.0,
            initial_eye: camera.eye,
            initial_target: camera.target,
            clock: 0.0,
        };
        animator.sync_from_camera(camera);
        if config.enabled {
            animator.mode = RotationMode::AutoRotating;
            controls.set_enabled(false);
        }
        animator
    }

    pub fn mode(&self) -> RotationMode {
        self.mode
    }

    pub fn is_auto_rotating(&self) -> bool {
        self.mode == RotationMode::AutoRotating
    }

    pub fn auto_rotate_enabled(&self) -> bool {
        self.auto_rotate_enabled
    }

    pub fn is_resetting(&self) -> bool {
        matches!(self.mode, RotationMode::Resetting(_))
    }

    /// Pending resume deadline on the animator clock
    pub fn resume_deadline(&self) -> Option<f64> {
        match self.mode {
            RotationMode::Resuming { resume_at } => Some(resume_at),
            _ => None,
        }
    }

    /// Angle in the horizontal plane, measured from +X towards +Z
    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn initial_eye(&self) -> Vector3<f32> {
        self.initial_eye
    }

    pub fn initial_target(&self) -> Vector3<f32> {
        self.initial_target
    }

    /// Advances the clock by `dt` seconds and moves the camera if animating
    pub fn update(&mut self, dt: f64, camera: &mut OrbitCamera, controls: &mut OrbitControls) {
        self.clock += dt.max(0.0);

        match self.mode {
            RotationMode::AutoRotating => {
                let elapsed = self.clock - self.anchor_time;
                self.angle = (self.anchor_angle + self.speed * elapsed).rem_euclid(TAU) as f32;
                self.apply_orbit(camera);
            }
            RotationMode::Resuming { resume_at } if self.clock >= resume_at => {
                log::debug!("Idle for {:.1}s, resuming auto-rotation", self.resume_delay);
                self.sync_from_camera(camera);
                self.mode = RotationMode::AutoRotating;
                controls.set_enabled(false);
            }
            RotationMode::Resetting(animation) => {
                if animation.is_finished(self.clock) {
                    self.finish_reset(camera, controls);
                } else {
                    let t = animation.progress(self.clock);
                    camera.set_target(animation.from_target.lerp(self.initial_target, t));
                    camera.set_eye(animation.from_eye.lerp(self.initial_eye, t));
                }
            }
            _ => {}
        }
    }

    /// Pointer pressed on the canvas, wheel zoom, or controls started.
    ///
    /// Cancels a pending resume or a running reset and hands the camera to
    /// the controls.
    pub fn on_interaction_start(&mut self, camera: &OrbitCamera, controls: &mut OrbitControls) {
        if self.mode == RotationMode::AutoRotating {
            log::debug!("User interaction, pausing auto-rotation");
        }
        self.sync_from_camera(camera);
        self.mode = if self.auto_rotate_enabled {
            RotationMode::UserInteracting
        } else {
            RotationMode::Manual
        };
        controls.set_enabled(true);
    }

    /// Controls moved the camera; only matters while auto-rotating
    pub fn on_controls_change(&mut self, camera: &OrbitCamera, controls: &mut OrbitControls) {
        if self.mode == RotationMode::AutoRotating {
            self.on_interaction_start(camera, controls);
        }
    }

    /// Pointer released or left the canvas, or controls ended
    pub fn on_interaction_end(&mut self) {
        if self.mode == RotationMode::UserInteracting && self.auto_rotate_enabled {
            self.mode = RotationMode::Resuming {
                resume_at: self.clock + self.resume_delay,
            };
        }
    }

    /// Flips auto-rotation and returns the new setting
    pub fn toggle_auto_rotate(
        &mut self,
        camera: &OrbitCamera,
        controls: &mut OrbitControls,
    ) -> bool {
        self.set_auto_rotate(!self.auto_rotate_enabled, camera, controls);
        self.auto_rotate_enabled
    }

    /// Forces auto-rotation on or off, ignoring any pending resume.
    ///
    /// A running reset keeps going and honours the new setting when it ends.
    pub fn set_auto_rotate(
        &mut self,
        enabled: bool,
        camera: &OrbitCamera,
        controls: &mut OrbitControls,
    ) {
        self.auto_rotate_enabled = enabled;
        log::info!("Auto-rotation {}", if enabled { "on" } else { "off" });
        if self.is_resetting() {
            return;
        }
        if enabled {
            self.sync_from_camera(camera);
            self.mode = RotationMode::AutoRotating;
            controls.set_enabled(false);
        } else {
            self.mode = RotationMode::Manual;
            controls.set_enabled(true);
        }
    }

    /// Animates the camera back to its initial eye and target
    pub fn reset(&mut self, camera: &mut OrbitCamera, controls: &mut OrbitControls) {
        controls.set_enabled(false);
        if self.reset_duration <= 0.0 {
            self.finish_reset(camera, controls);
            return;
        }
        self.mode = RotationMode::Resetting(ResetAnimation {
            from_eye: camera.eye,
            from_target: camera.target,
            started_at: self.clock,
            duration: self.reset_duration,
        });
    }

    /// Drops a pending resume deadline
    pub fn cancel(&mut self) {
        if let RotationMode::Resuming { .. } = self.mode {
            self.mode = RotationMode::UserInteracting;
        }
    }

    fn finish_reset(&mut self, camera: &mut OrbitCamera, controls: &mut OrbitControls) {
        camera.set_target(self.initial_target);
        camera.set_eye(self.initial_eye);
        self.sync_from_camera(camera);
        if self.auto_rotate_enabled {
            self.mode = RotationMode::AutoRotating;
            controls.set_enabled(false);
        } else {
            self.mode = RotationMode::Manual;
            controls.set_enabled(true);
        }
        log::debug!("Camera reset complete");
    }

    fn sync_from_camera(&mut self, camera: &OrbitCamera) {
        let offset = camera.eye - camera.target;
        self.angle = offset.z.atan2(offset.x);
        self.radius = (offset.x * offset.x + offset.z * offset.z).sqrt();
        self.height = camera.eye.y;
        self.anchor_angle = self.angle as f64;
        self.anchor_time = self.clock;
    }

    fn apply_orbit(&self, camera: &mut OrbitCamera) {
        let target = camera.target;
        camera.set_eye(Vector3::new(
            target.x + self.radius * self.angle.cos(),
            self.height,
            target.z + self.radius * self.angle.sin(),
        ));
    }
}

fn ease_out_cubic(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ControlsConfig;
    use approx::assert_relative_eq;

    const FRAME: f64 = 1.0 / 60.0;

    fn setup(config: AutoRotateConfig) -> (CameraAnimator, OrbitCamera, OrbitControls) {
        let camera = OrbitCamera::looking_at(
            Vector3::new(3.0, 2.0, 3.0),
            Vector3::new(0.0, 0.7, 0.0),
            1.5,
        );
        let mut controls = OrbitControls::new(&ControlsConfig::default());
        let animator = CameraAnimator::new(&config, &camera, &mut controls);
        (animator, camera, controls)
    }

    fn run(
        animator: &mut CameraAnimator,
        camera: &mut OrbitCamera,
        controls: &mut OrbitControls,
        seconds: f64,
    ) {
        let frames = (seconds / FRAME).round() as usize;
        for _ in 0..frames {
            animator.update(FRAME, camera, controls);
        }
    }

    #[test]
    fn test_starts_auto_rotating_with_controls_disabled() {
        let (animator, _, controls) = setup(AutoRotateConfig::default());
        assert!(animator.is_auto_rotating());
        assert!(!controls.enabled());
        assert_relative_eq!(animator.radius(), 18f32.sqrt(), epsilon = 1e-5);
        assert_relative_eq!(animator.height(), 2.0);
    }

    #[test]
    fn test_full_period_returns_to_start() {
        let config = AutoRotateConfig::default();
        let (mut animator, mut camera, mut controls) = setup(config);
        let start = (animator.angle(), animator.radius(), animator.height(), camera.eye);

        run(&mut animator, &mut camera, &mut controls, 6.0);
        assert!((camera.eye - start.3).x.abs() > 0.1);

        let period = config.period().unwrap() as f64;
        run(&mut animator, &mut camera, &mut controls, period - 6.0);

        let delta = (animator.angle() - start.0).rem_euclid(std::f32::consts::TAU);
        assert!(delta < 1e-3 || delta > std::f32::consts::TAU - 1e-3);
        assert_relative_eq!(animator.radius(), start.1);
        assert_relative_eq!(animator.height(), start.2);
        assert_relative_eq!(camera.eye, start.3, epsilon = 1e-3);
    }

    #[test]
    fn test_rotation_keeps_height_and_radius() {
        let (mut animator, mut camera, mut controls) = setup(AutoRotateConfig::default());
        let target = camera.target;
        for _ in 0..200 {
            animator.update(FRAME, &mut camera, &mut controls);
            let offset = camera.eye - target;
            assert_relative_eq!(camera.eye.y, 2.0, epsilon = 1e-5);
            assert_relative_eq!(
                (offset.x * offset.x + offset.z * offset.z).sqrt(),
                18f32.sqrt(),
                epsilon = 1e-4
            );
        }
    }

    #[test]
    fn test_interaction_pauses_and_resumes_after_delay() {
        let (mut animator, mut camera, mut controls) = setup(AutoRotateConfig::default());
        run(&mut animator, &mut camera, &mut controls, 1.0);

        animator.on_interaction_start(&camera, &mut controls);
        assert_eq!(animator.mode(), RotationMode::UserInteracting);
        assert!(controls.enabled());

        // User drags the camera somewhere else
        camera.add_yaw(0.8);
        let dragged_eye = camera.eye;
        animator.on_interaction_end();
        let deadline = animator.resume_deadline().unwrap();
        assert_relative_eq!(deadline, animator.clock() + 3.0);

        run(&mut animator, &mut camera, &mut controls, 2.5);
        assert!(animator.resume_deadline().is_some());
        assert_relative_eq!(camera.eye, dragged_eye);

        run(&mut animator, &mut camera, &mut controls, 0.51);
        assert!(animator.is_auto_rotating());
        assert!(!controls.enabled());

        let offset = dragged_eye - camera.target;
        let expected = offset.z.atan2(offset.x);
        // At most one frame of rotation since resuming
        let drift = (animator.angle() - expected).rem_euclid(std::f32::consts::TAU);
        assert!(
            drift < 0.01 || drift > std::f32::consts::TAU - 1e-4,
            "angle drifted by {drift}"
        );
    }

    #[test]
    fn test_new_interaction_cancels_pending_resume() {
        let (mut animator, mut camera, mut controls) = setup(AutoRotateConfig::default());
        animator.on_interaction_start(&camera, &mut controls);
        animator.on_interaction_end();
        run(&mut animator, &mut camera, &mut controls, 2.0);

        animator.on_interaction_start(&camera, &mut controls);
        assert_eq!(animator.resume_deadline(), None);
        run(&mut animator, &mut camera, &mut controls, 5.0);
        assert_eq!(animator.mode(), RotationMode::UserInteracting);
    }

    #[test]
    fn test_controls_change_only_pauses_auto_rotation() {
        let (mut animator, camera, mut controls) = setup(AutoRotateConfig::default());
        animator.on_interaction_start(&camera, &mut controls);
        animator.on_interaction_end();
        let deadline = animator.resume_deadline();

        animator.on_controls_change(&camera, &mut controls);
        assert_eq!(animator.resume_deadline(), deadline);

        animator.set_auto_rotate(true, &camera, &mut controls);
        animator.on_controls_change(&camera, &mut controls);
        assert_eq!(animator.mode(), RotationMode::UserInteracting);
    }

    #[test]
    fn test_manual_mode_never_resumes() {
        let (mut animator, mut camera, mut controls) = setup(AutoRotateConfig::default());
        assert!(!animator.toggle_auto_rotate(&camera, &mut controls));
        assert_eq!(animator.mode(), RotationMode::Manual);
        assert!(controls.enabled());

        animator.on_interaction_start(&camera, &mut controls);
        animator.on_interaction_end();
        run(&mut animator, &mut camera, &mut controls, 10.0);
        assert_eq!(animator.mode(), RotationMode::Manual);

        assert!(animator.toggle_auto_rotate(&camera, &mut controls));
        assert!(animator.is_auto_rotating());
    }

    #[test]
    fn test_reset_returns_to_initial_placement() {
        let (mut animator, mut camera, mut controls) = setup(AutoRotateConfig::default());
        animator.on_interaction_start(&camera, &mut controls);
        camera.add_yaw(1.2);
        camera.set_target(Vector3::new(0.5, 1.0, -0.5));

        animator.reset(&mut camera, &mut controls);
        assert!(animator.is_resetting());
        assert!(!controls.enabled());

        run(&mut animator, &mut camera, &mut controls, 0.5);
        assert!(animator.is_resetting());
        assert!((camera.eye - animator.initial_eye()).x.abs() > 1e-3);

        run(&mut animator, &mut camera, &mut controls, 0.55);
        assert!(animator.is_auto_rotating());
        // Rotation restarted from the initial placement at most one frame ago
        assert_relative_eq!(camera.target, animator.initial_target());
        assert_relative_eq!(animator.height(), 2.0);
        assert_relative_eq!(animator.radius(), 18f32.sqrt(), epsilon = 1e-5);
    }

    #[test]
    fn test_instant_reset() {
        let config = AutoRotateConfig {
            enabled: false,
            reset_duration: 0.0,
            ..AutoRotateConfig::default()
        };
        let (mut animator, mut camera, mut controls) = setup(config);
        camera.add_pitch(-0.3);

        animator.reset(&mut camera, &mut controls);
        assert_eq!(animator.mode(), RotationMode::Manual);
        assert!(controls.enabled());
        assert_relative_eq!(camera.eye, animator.initial_eye());
    }

    #[test]
    fn test_interaction_interrupts_reset() {
        let (mut animator, mut camera, mut controls) = setup(AutoRotateConfig::default());
        animator.reset(&mut camera, &mut controls);
        animator.on_interaction_start(&camera, &mut controls);
        assert_eq!(animator.mode(), RotationMode::UserInteracting);
        assert!(controls.enabled());
    }

    #[test]
    fn test_cancel_clears_deadline() {
        let (mut animator, mut camera, mut controls) = setup(AutoRotateConfig::default());
        animator.on_interaction_start(&camera, &mut controls);
        animator.on_interaction_end();
        animator.cancel();
        run(&mut animator, &mut camera, &mut controls, 5.0);
        assert!(!animator.is_auto_rotating());
    }

    #[test]
    fn test_ease_out_cubic() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert!(ease_out_cubic(0.5) > 0.5);
    }
}

//! GPU-free viewer core.
//!
//! [`Viewer`] owns every piece of viewer state and advances it one frame at a
//! time. Window and renderer glue lives in [`crate::app`]; everything here can
//! be driven from tests with synthetic pointer input.

use crate::{
    config::ViewerConfig,
    gfx::{
        camera::{
            camera_utils::CameraManager, CameraAnimator, ControlEvent, RotationMode,
        },
        lighting::{LightKind, LightingRig},
        picking::{screen_to_ray, Ray},
        scene::Scene,
    },
    interaction::{InfoPanel, InteractionManager},
    product::Product,
    ui::UiAction,
};

/// Snapshot of what the UI needs to draw
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerStatus {
    pub mode: RotationMode,
    pub auto_rotate_enabled: bool,
    pub paused: bool,
    pub info_panel: InfoPanel,
}

#[derive(Debug, Clone, Copy, Default)]
struct PointerState {
    position: Option<(f32, f32)>,
    pressed_at: Option<(f32, f32)>,
}

pub struct Viewer {
    config: ViewerConfig,
    scene: Scene,
    lighting: LightingRig,
    product: Product,
    interaction: InteractionManager,
    animator: CameraAnimator,
    viewport: (u32, u32),
    elapsed: f64,
    paused: bool,
    pointer: PointerState,
}

impl Viewer {
    /// Builds the scene: camera, lights, ground, chair, interaction, animator
    pub fn new(config: ViewerConfig) -> Self {
        let mut scene = Scene::new(CameraManager::from_config(&config));
        let lighting = LightingRig::install(config.lighting, &mut scene);
        let product = Product::build_chair(&mut scene, config.float);
        scene.update_world_matrices();

        let interaction =
            InteractionManager::new(config.interaction, product.interactive_nodes(), &mut scene);

        let camera_manager = &mut scene.camera_manager;
        let animator = CameraAnimator::new(
            &config.auto_rotate,
            &camera_manager.camera,
            &mut camera_manager.controls,
        );
        scene.update();

        let stats = scene.get_statistics();
        log::info!(
            "Viewer ready: {} nodes, {} meshes, {} materials, {} triangles",
            stats.node_count,
            stats.mesh_count,
            stats.material_count,
            stats.total_triangles
        );

        Self {
            viewport: config.window_size,
            config,
            scene,
            lighting,
            product,
            interaction,
            animator,
            elapsed: 0.0,
            paused: false,
            pointer: PointerState::default(),
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn lighting(&self) -> &LightingRig {
        &self.lighting
    }

    pub fn product(&self) -> &Product {
        &self.product
    }

    pub fn interaction(&self) -> &InteractionManager {
        &self.interaction
    }

    pub fn animator(&self) -> &CameraAnimator {
        &self.animator
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    /// Seconds of unpaused time since start
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn status(&self) -> ViewerStatus {
        ViewerStatus {
            mode: self.animator.mode(),
            auto_rotate_enabled: self.animator.auto_rotate_enabled(),
            paused: self.paused,
            info_panel: self.interaction.info_panel().clone(),
        }
    }

    /// Advances one frame by `dt` seconds; paused viewers do not move
    pub fn frame(&mut self, dt: f64) {
        if self.paused {
            return;
        }
        let dt = dt.max(0.0);
        self.elapsed += dt;

        let camera_manager = &mut self.scene.camera_manager;
        camera_manager.update();
        self.animator
            .update(dt, &mut camera_manager.camera, &mut camera_manager.controls);

        self.product.update_float(self.elapsed as f32, &mut self.scene);
        self.interaction.update(dt as f32, &mut self.scene);
        self.scene.update();
    }

    /// New viewport size in physical pixels; zero sizes are ignored
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.viewport = (width, height);
        self.scene
            .camera_manager
            .camera
            .resize_projection(width, height);
        self.scene.camera_manager.camera.update_view_proj();
    }

    /// World ray through a pixel of the viewport
    pub fn ray_at(&self, x: f32, y: f32) -> Ray {
        let (width, height) = self.viewport;
        screen_to_ray(
            (x, y),
            (width as f32, height as f32),
            &self.scene.camera_manager.camera,
        )
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        self.pointer.position = Some((x, y));
        self.pointer.pressed_at = Some((x, y));

        let CameraManager { camera, controls } = &mut self.scene.camera_manager;
        self.animator.on_interaction_start(camera, controls);
        controls.pointer_down(x, y);
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        self.pointer.position = Some((x, y));

        let CameraManager { camera, controls } = &mut self.scene.camera_manager;
        if controls.pointer_move(x, y) == Some(ControlEvent::Change) {
            self.animator.on_controls_change(camera, controls);
        }

        let ray = self.ray_at(x, y);
        self.interaction.pointer_move(&ray, &mut self.scene);
    }

    /// Ends a drag; a release close to the press point counts as a click
    pub fn pointer_up(&mut self, x: f32, y: f32) {
        self.pointer.position = Some((x, y));
        self.scene.camera_manager.controls.pointer_up();
        self.animator.on_interaction_end();

        if let Some((press_x, press_y)) = self.pointer.pressed_at.take() {
            let travel = ((x - press_x).powi(2) + (y - press_y).powi(2)).sqrt();
            if travel < self.config.interaction.click_threshold {
                self.click(x, y);
            }
        }
    }

    pub fn pointer_leave(&mut self) {
        self.pointer = PointerState::default();
        self.scene.camera_manager.controls.pointer_up();
        self.animator.on_interaction_end();
        self.interaction.pointer_leave(&mut self.scene);
    }

    /// Wheel zoom by `lines`, positive zooms in
    pub fn wheel(&mut self, lines: f32) {
        let CameraManager { camera, controls } = &mut self.scene.camera_manager;
        self.animator.on_interaction_start(camera, controls);
        controls.wheel(lines);
        self.animator.on_interaction_end();
    }

    pub fn click(&mut self, x: f32, y: f32) {
        let ray = self.ray_at(x, y);
        self.interaction.click(&ray, &mut self.scene);
    }

    pub fn pause(&mut self) {
        if !self.paused {
            log::info!("Viewer paused");
            self.paused = true;
        }
    }

    pub fn resume(&mut self) {
        if self.paused {
            log::info!("Viewer resumed");
            self.paused = false;
        }
    }

    /// Flips auto-rotation; returns the new setting
    pub fn toggle_rotation(&mut self) -> bool {
        let CameraManager { camera, controls } = &mut self.scene.camera_manager;
        self.animator.toggle_auto_rotate(camera, controls)
    }

    pub fn reset_camera(&mut self) {
        let CameraManager { camera, controls } = &mut self.scene.camera_manager;
        self.animator.reset(camera, controls);
    }

    pub fn close_info_panel(&mut self) {
        self.interaction.deselect(&mut self.scene);
    }

    pub fn set_shadows_enabled(&mut self, enabled: bool) {
        self.lighting.set_shadows_enabled(enabled, &mut self.scene);
    }

    pub fn set_light_intensity(&mut self, kind: LightKind, intensity: f32) {
        self.lighting.set_intensity(kind, intensity);
    }

    pub fn handle_ui_action(&mut self, action: UiAction) {
        match action {
            UiAction::ToggleRotation => {
                self.toggle_rotation();
            }
            UiAction::ResetCamera => self.reset_camera(),
            UiAction::CloseInfoPanel => self.close_info_panel(),
        }
    }

    /// Stops all timers; the viewer stays paused afterwards
    pub fn teardown(&mut self) {
        self.animator.cancel();
        self.pause();
        log::info!("Viewer torn down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::camera::camera_utils::Camera;
    use approx::assert_relative_eq;
    use cgmath::{Vector3, Vector4};

    const FRAME: f64 = 1.0 / 60.0;

    fn run(viewer: &mut Viewer, seconds: f64) {
        for _ in 0..(seconds / FRAME).round() as usize {
            viewer.frame(FRAME);
        }
    }

    fn project(viewer: &Viewer, point: Vector3<f32>) -> (f32, f32) {
        let clip = viewer.scene().camera_manager.camera.build_view_projection_matrix()
            * Vector4::new(point.x, point.y, point.z, 1.0);
        let (w, h) = viewer.viewport();
        (
            (clip.x / clip.w + 1.0) * 0.5 * w as f32,
            (1.0 - clip.y / clip.w) * 0.5 * h as f32,
        )
    }

    #[test]
    fn test_resize_updates_camera_and_viewport_only() {
        let mut viewer = Viewer::new(ViewerConfig::default());
        let nodes_before = viewer.scene().node_count();
        let transforms_before: Vec<_> = viewer.scene().nodes().map(|(_, n)| n.transform).collect();

        viewer.resize(1920, 1080);

        assert_eq!(viewer.viewport(), (1920, 1080));
        assert_relative_eq!(viewer.scene().camera_manager.camera.aspect, 1920.0 / 1080.0);
        assert_eq!(viewer.scene().node_count(), nodes_before);
        let transforms_after: Vec<_> = viewer.scene().nodes().map(|(_, n)| n.transform).collect();
        assert_eq!(transforms_before, transforms_after);

        viewer.resize(0, 500);
        assert_eq!(viewer.viewport(), (1920, 1080));
    }

    #[test]
    fn test_drag_pauses_and_resumes_from_dragged_position() {
        let mut viewer = Viewer::new(ViewerConfig::default());
        run(&mut viewer, 1.0);
        assert!(viewer.animator().is_auto_rotating());

        viewer.pointer_down(100.0, 100.0);
        assert_eq!(viewer.animator().mode(), RotationMode::UserInteracting);
        let paused_eye = viewer.scene().camera_manager.camera.eye;
        viewer.frame(FRAME);
        assert_relative_eq!(viewer.scene().camera_manager.camera.eye, paused_eye);

        viewer.pointer_move(160.0, 100.0);
        viewer.pointer_up(160.0, 100.0);
        assert!(viewer.animator().resume_deadline().is_some());
        assert_eq!(viewer.interaction().selected(), None);

        let mut frames = 0;
        while !viewer.animator().is_auto_rotating() {
            viewer.frame(FRAME);
            frames += 1;
            assert!(frames < 400, "rotation never resumed");
        }
        // Resumed after the configured delay, not earlier
        assert!(frames as f64 * FRAME >= 3.0 - FRAME);

        let camera = &viewer.scene().camera_manager.camera;
        let offset = camera.eye - camera.target;
        assert_relative_eq!(viewer.animator().angle(), offset.z.atan2(offset.x), epsilon = 1e-5);
        assert!((camera.eye - paused_eye).x.abs() > 1e-3, "drag had no effect");
    }

    #[test]
    fn test_click_selects_part_under_pointer() {
        let mut viewer = Viewer::new(ViewerConfig::default());
        let seat = viewer.scene().find_by_name("seat").unwrap();
        let (x, y) = project(&viewer, Vector3::new(0.0, 0.5, 0.0));

        viewer.pointer_down(x, y);
        viewer.pointer_up(x + 1.0, y);
        assert_eq!(viewer.interaction().selected(), Some(seat));
        assert!(viewer.status().info_panel.visible);

        viewer.handle_ui_action(UiAction::CloseInfoPanel);
        assert_eq!(viewer.interaction().selected(), None);
        assert!(!viewer.status().info_panel.visible);
    }

    #[test]
    fn test_drag_is_not_a_click() {
        let mut viewer = Viewer::new(ViewerConfig::default());
        let (x, y) = project(&viewer, Vector3::new(0.0, 0.5, 0.0));

        viewer.pointer_down(x, y);
        viewer.pointer_move(x + 40.0, y);
        viewer.pointer_up(x + 40.0, y);
        assert_eq!(viewer.interaction().selected(), None);
    }

    #[test]
    fn test_hover_follows_pointer() {
        let mut viewer = Viewer::new(ViewerConfig::default());
        let seat = viewer.scene().find_by_name("seat").unwrap();
        let (x, y) = project(&viewer, Vector3::new(0.0, 0.5, 0.0));

        viewer.pointer_move(x, y);
        assert_eq!(viewer.interaction().hovered(), Some(seat));

        viewer.pointer_leave();
        assert_eq!(viewer.interaction().hovered(), None);
    }

    #[test]
    fn test_wheel_pauses_and_arms_resume() {
        let mut viewer = Viewer::new(ViewerConfig::default());
        let distance = viewer.scene().camera_manager.camera.distance;

        viewer.wheel(1.0);
        assert!(viewer.animator().resume_deadline().is_some());
        viewer.frame(FRAME);
        assert!(viewer.scene().camera_manager.camera.distance < distance);
    }

    #[test]
    fn test_pause_freezes_and_resume_continues() {
        let mut viewer = Viewer::new(ViewerConfig::default());
        viewer.pause();
        let eye = viewer.scene().camera_manager.camera.eye;
        run(&mut viewer, 1.0);
        assert_eq!(viewer.scene().camera_manager.camera.eye, eye);
        assert_eq!(viewer.elapsed(), 0.0);

        viewer.resume();
        run(&mut viewer, 0.5);
        assert_ne!(viewer.scene().camera_manager.camera.eye, eye);
    }

    #[test]
    fn test_reset_camera_restores_initial_position() {
        let mut viewer = Viewer::new(ViewerConfig::default());
        run(&mut viewer, 5.0);
        viewer.reset_camera();
        let duration = viewer.config().auto_rotate.reset_duration as f64;
        run(&mut viewer, duration);

        let camera = &viewer.scene().camera_manager.camera;
        let initial = Vector3::from(viewer.config().camera.position);
        // At most one frame of rotation after the reset finished
        assert_relative_eq!(camera.eye, initial, epsilon = 0.05);
        assert_relative_eq!(camera.target, Vector3::from(viewer.config().camera.target));
    }

    #[test]
    fn test_toggle_and_teardown() {
        let mut viewer = Viewer::new(ViewerConfig::default());
        assert!(!viewer.toggle_rotation());
        assert!(!viewer.status().auto_rotate_enabled);
        viewer.handle_ui_action(UiAction::ToggleRotation);
        assert!(viewer.status().auto_rotate_enabled);

        viewer.pointer_down(10.0, 10.0);
        viewer.pointer_up(100.0, 10.0);
        viewer.teardown();
        assert_eq!(viewer.animator().resume_deadline(), None);
        assert!(viewer.is_paused());
    }

    #[test]
    fn test_light_controls_reach_rig() {
        let mut viewer = Viewer::new(ViewerConfig::default());
        viewer.set_light_intensity(LightKind::Key, 0.4);
        viewer.set_light_intensity(LightKind::Ambient, -2.0);
        assert_eq!(viewer.lighting().intensity(LightKind::Key), 0.4);
        assert_eq!(viewer.lighting().intensity(LightKind::Ambient), 0.0);

        viewer.set_shadows_enabled(false);
        assert!(!viewer.lighting().shadows_enabled());
    }
}

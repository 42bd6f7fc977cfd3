//! Lighting rig: ambient, key, fill and hemisphere lights plus the ground plane
//!
//! The rig is plain data. [`LightingRig::uniform`] packs it into the light
//! block of the global uniform buffer every frame.

use cgmath::{InnerSpace, Matrix4, Point3, Vector3};

use crate::gfx::{
    camera::orbit_camera::OPENGL_TO_WGPU_MATRIX,
    geometry::generate_plane,
    resources::material::{hex_color, Material},
    scene::{NodeId, Scene, SceneNode},
};

/// Half extent of the key light's orthographic shadow frustum
const SHADOW_EXTENT: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightKind {
    Ambient,
    Key,
    Fill,
    Hemisphere,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: [f32; 3],
    pub intensity: f32,
}

/// Directional light shining from `position` towards the origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub intensity: f32,
}

impl DirectionalLight {
    /// Unit vector pointing from the scene towards the light
    pub fn direction(&self) -> Vector3<f32> {
        let position = Vector3::from(self.position);
        if position.magnitude2() > f32::EPSILON {
            position.normalize()
        } else {
            Vector3::unit_y()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HemisphereLight {
    pub sky_color: [f32; 3],
    pub ground_color: [f32; 3],
    pub intensity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightingConfig {
    pub ambient: AmbientLight,
    /// Shadow-casting key light
    pub key: DirectionalLight,
    pub fill: DirectionalLight,
    pub hemisphere: HemisphereLight,
    pub shadows_enabled: bool,
    /// Edge length of the square ground plane
    pub ground_size: f32,
    pub ground_color: [f32; 3],
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            ambient: AmbientLight {
                color: hex_color(0xffffff),
                intensity: 0.4,
            },
            key: DirectionalLight {
                position: [5.0, 10.0, 7.5],
                color: hex_color(0xffffff),
                intensity: 1.0,
            },
            fill: DirectionalLight {
                position: [-5.0, 5.0, -5.0],
                color: hex_color(0xffffff),
                intensity: 0.3,
            },
            hemisphere: HemisphereLight {
                sky_color: hex_color(0xffffff),
                ground_color: hex_color(0x444444),
                intensity: 0.4,
            },
            shadows_enabled: true,
            ground_size: 20.0,
            ground_color: hex_color(0xf0f0f0),
        }
    }
}

impl LightingConfig {
    pub fn with_shadows(mut self, enabled: bool) -> Self {
        self.shadows_enabled = enabled;
        self
    }
}

/// Light block of the global uniform. MUST match the light fields of
/// `Globals` in `scene.wgsl`.
///
/// Colors are premultiplied by intensity. `key_direction.w` is 1 when the key
/// light casts shadows.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightsUniform {
    pub light_view_proj: [[f32; 4]; 4],
    pub ambient: [f32; 4],
    pub key_direction: [f32; 4],
    pub key_color: [f32; 4],
    pub fill_direction: [f32; 4],
    pub fill_color: [f32; 4],
    pub sky_color: [f32; 4],
    pub ground_color: [f32; 4],
}

pub struct LightingRig {
    config: LightingConfig,
    ground: Option<NodeId>,
}

impl LightingRig {
    /// Rig without a ground plane
    pub fn new(config: LightingConfig) -> Self {
        Self {
            config,
            ground: None,
        }
    }

    /// Creates the rig and adds its ground plane to `scene`
    pub fn install(config: LightingConfig, scene: &mut Scene) -> Self {
        let mut rig = Self::new(config);

        let mesh = scene.add_mesh(generate_plane(config.ground_size, config.ground_size, 1, 1));
        let material = scene.add_material(
            Material::new(
                "ground",
                [
                    config.ground_color[0],
                    config.ground_color[1],
                    config.ground_color[2],
                    1.0,
                ],
                0.0,
                0.9,
            ),
        );
        let root = scene.root();
        rig.ground = Some(scene.add_node(
            SceneNode::mesh("ground", mesh, material).with_shadows(false, config.shadows_enabled),
            root,
        ));

        log::info!(
            "Lighting rig installed (shadows {})",
            if config.shadows_enabled { "on" } else { "off" }
        );
        rig
    }

    pub fn config(&self) -> &LightingConfig {
        &self.config
    }

    pub fn ground(&self) -> Option<NodeId> {
        self.ground
    }

    pub fn intensity(&self, kind: LightKind) -> f32 {
        match kind {
            LightKind::Ambient => self.config.ambient.intensity,
            LightKind::Key => self.config.key.intensity,
            LightKind::Fill => self.config.fill.intensity,
            LightKind::Hemisphere => self.config.hemisphere.intensity,
        }
    }

    /// Negative intensities clamp to zero
    pub fn set_intensity(&mut self, kind: LightKind, intensity: f32) {
        let intensity = intensity.max(0.0);
        let slot = match kind {
            LightKind::Ambient => &mut self.config.ambient.intensity,
            LightKind::Key => &mut self.config.key.intensity,
            LightKind::Fill => &mut self.config.fill.intensity,
            LightKind::Hemisphere => &mut self.config.hemisphere.intensity,
        };
        *slot = intensity;
    }

    pub fn shadows_enabled(&self) -> bool {
        self.config.shadows_enabled
    }

    /// Toggles key light shadows and whether the ground receives them
    pub fn set_shadows_enabled(&mut self, enabled: bool, scene: &mut Scene) {
        self.config.shadows_enabled = enabled;
        if let Some(ground) = self.ground.and_then(|id| scene.node_mut(id)) {
            ground.receive_shadow = enabled;
        }
    }

    /// View-projection of the key light's shadow frustum
    pub fn light_view_proj(&self) -> Matrix4<f32> {
        let view = Matrix4::look_at_rh(
            Point3::from(self.config.key.position),
            Point3::new(0.0, 0.0, 0.0),
            Vector3::unit_y(),
        );
        let distance = Vector3::from(self.config.key.position).magnitude();
        let proj = cgmath::ortho(
            -SHADOW_EXTENT,
            SHADOW_EXTENT,
            -SHADOW_EXTENT,
            SHADOW_EXTENT,
            0.1,
            distance + SHADOW_EXTENT * 2.0,
        );
        OPENGL_TO_WGPU_MATRIX * proj * view
    }

    pub fn uniform(&self) -> LightsUniform {
        let c = &self.config;
        let scaled = |color: [f32; 3], intensity: f32| {
            [color[0] * intensity, color[1] * intensity, color[2] * intensity, 1.0]
        };
        let key_dir = c.key.direction();
        let fill_dir = c.fill.direction();

        LightsUniform {
            light_view_proj: self.light_view_proj().into(),
            ambient: scaled(c.ambient.color, c.ambient.intensity),
            key_direction: [
                key_dir.x,
                key_dir.y,
                key_dir.z,
                if c.shadows_enabled { 1.0 } else { 0.0 },
            ],
            key_color: scaled(c.key.color, c.key.intensity),
            fill_direction: [fill_dir.x, fill_dir.y, fill_dir.z, 0.0],
            fill_color: scaled(c.fill.color, c.fill.intensity),
            sky_color: scaled(c.hemisphere.sky_color, c.hemisphere.intensity),
            ground_color: scaled(c.hemisphere.ground_color, c.hemisphere.intensity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewerConfig;
    use crate::gfx::camera::CameraManager;
    use cgmath::{Transform, Vector4};

    fn scene() -> Scene {
        Scene::new(CameraManager::from_config(&ViewerConfig::default()))
    }

    #[test]
    fn test_uniform_layout() {
        assert_eq!(std::mem::size_of::<LightsUniform>(), 176);
    }

    #[test]
    fn test_install_adds_shadow_receiving_ground() {
        let mut scene = scene();
        let rig = LightingRig::install(LightingConfig::default(), &mut scene);

        let ground = scene.node(rig.ground().unwrap()).unwrap();
        assert!(ground.receive_shadow);
        assert!(!ground.cast_shadow);
        assert_eq!(ground.transform.position.y, 0.0);

        let bounds = scene.mesh(ground.mesh.unwrap()).unwrap().bounds();
        assert_eq!(bounds.size().x, 20.0);
        assert_eq!(bounds.size().z, 20.0);
    }

    #[test]
    fn test_shadow_toggle_updates_ground_and_uniform() {
        let mut scene = scene();
        let mut rig = LightingRig::install(LightingConfig::default(), &mut scene);
        assert_eq!(rig.uniform().key_direction[3], 1.0);

        rig.set_shadows_enabled(false, &mut scene);
        assert!(!rig.shadows_enabled());
        assert!(!scene.node(rig.ground().unwrap()).unwrap().receive_shadow);
        assert_eq!(rig.uniform().key_direction[3], 0.0);
    }

    #[test]
    fn test_intensity_clamps_negative() {
        let mut rig = LightingRig::new(LightingConfig::default());
        rig.set_intensity(LightKind::Fill, 0.8);
        assert_eq!(rig.intensity(LightKind::Fill), 0.8);
        assert_eq!(rig.uniform().fill_color[0], 0.8);

        rig.set_intensity(LightKind::Key, -1.0);
        assert_eq!(rig.intensity(LightKind::Key), 0.0);
    }

    #[test]
    fn test_origin_inside_shadow_frustum() {
        let rig = LightingRig::new(LightingConfig::default());
        let clip = rig.light_view_proj() * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert!(clip.x.abs() < 1e-4 && clip.y.abs() < 1e-4);
        assert!(clip.z > 0.0 && clip.z < 1.0);

        let corner = rig
            .light_view_proj()
            .transform_point(Point3::new(0.8, 1.2, 0.8));
        assert!(corner.x.abs() <= 1.0 && corner.y.abs() <= 1.0);
    }
}

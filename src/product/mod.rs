//! # Product Builder
//!
//! Procedurally assembles the showcased chair from box and cylinder
//! primitives. Every part is a mesh node under a `"chair"` group, tagged with a
//! display name and a [`PartType`], and owns a private clone of its base
//! material so interaction tinting never leaks between parts.

use std::fmt;

use crate::{
    config::FloatConfig,
    gfx::{
        geometry::{generate_box, generate_cylinder, GeometryData},
        resources::material::Material,
        scene::{NodeId, Scene, SceneNode},
    },
};

const CYLINDER_SEGMENTS: u32 = 16;

/// Category of a chair part, shown in the info panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartType {
    Seat,
    Backrest,
    BackSupport,
    Leg,
    Armrest,
    ArmSupport,
}

impl PartType {
    pub const ALL: [PartType; 6] = [
        PartType::Seat,
        PartType::Backrest,
        PartType::BackSupport,
        PartType::Leg,
        PartType::Armrest,
        PartType::ArmSupport,
    ];

    /// Tag stored in node metadata
    pub fn tag(self) -> &'static str {
        match self {
            PartType::Seat => "seat",
            PartType::Backrest => "backrest",
            PartType::BackSupport => "back-support",
            PartType::Leg => "leg",
            PartType::Armrest => "armrest",
            PartType::ArmSupport => "arm-support",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|part| part.tag() == tag)
    }

    pub fn description(self) -> &'static str {
        match self {
            PartType::Seat => "Upholstered seat cushion",
            PartType::Backrest => "Padded backrest panel",
            PartType::BackSupport => "Wooden backrest support bar",
            PartType::Leg => "Solid wood leg",
            PartType::Armrest => "Wooden armrest",
            PartType::ArmSupport => "Brushed metal armrest support",
        }
    }
}

impl fmt::Display for PartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, Copy)]
enum Shape {
    Box { width: f32, height: f32, depth: f32 },
    Cylinder { radius: f32, height: f32 },
}

impl Shape {
    fn geometry(self) -> GeometryData {
        match self {
            Shape::Box {
                width,
                height,
                depth,
            } => generate_box(width, height, depth),
            Shape::Cylinder { radius, height } => {
                generate_cylinder(radius, radius, height, CYLINDER_SEGMENTS)
            }
        }
    }
}

struct PartSpec {
    name: &'static str,
    display_name: &'static str,
    part_type: PartType,
    shape: Shape,
    position: [f32; 3],
    material: &'static str,
}

const FABRIC: &str = "fabric";
const WOOD: &str = "wood";
const METAL: &str = "metal";

const SEAT_HEIGHT: f32 = 0.5;
const LEG_OFFSET: f32 = 0.42;
const ARM_OFFSET: f32 = 0.54;

#[rustfmt::skip]
const CHAIR_PARTS: [PartSpec; 12] = [
    PartSpec { name: "seat", display_name: "Seat", part_type: PartType::Seat,
        shape: Shape::Box { width: 1.0, height: 0.1, depth: 1.0 },
        position: [0.0, SEAT_HEIGHT, 0.0], material: FABRIC },
    PartSpec { name: "backrest", display_name: "Backrest", part_type: PartType::Backrest,
        shape: Shape::Box { width: 1.0, height: 0.6, depth: 0.08 },
        position: [0.0, 1.15, -0.46], material: FABRIC },
    PartSpec { name: "back-support-left", display_name: "Left Back Support", part_type: PartType::BackSupport,
        shape: Shape::Box { width: 0.06, height: 0.3, depth: 0.06 },
        position: [-0.4, 0.7, -0.46], material: WOOD },
    PartSpec { name: "back-support-right", display_name: "Right Back Support", part_type: PartType::BackSupport,
        shape: Shape::Box { width: 0.06, height: 0.3, depth: 0.06 },
        position: [0.4, 0.7, -0.46], material: WOOD },
    PartSpec { name: "leg-front-left", display_name: "Front Left Leg", part_type: PartType::Leg,
        shape: Shape::Cylinder { radius: 0.04, height: SEAT_HEIGHT - 0.05 },
        position: [-LEG_OFFSET, 0.225, LEG_OFFSET], material: WOOD },
    PartSpec { name: "leg-front-right", display_name: "Front Right Leg", part_type: PartType::Leg,
        shape: Shape::Cylinder { radius: 0.04, height: SEAT_HEIGHT - 0.05 },
        position: [LEG_OFFSET, 0.225, LEG_OFFSET], material: WOOD },
    PartSpec { name: "leg-back-left", display_name: "Back Left Leg", part_type: PartType::Leg,
        shape: Shape::Cylinder { radius: 0.04, height: SEAT_HEIGHT - 0.05 },
        position: [-LEG_OFFSET, 0.225, -LEG_OFFSET], material: WOOD },
    PartSpec { name: "leg-back-right", display_name: "Back Right Leg", part_type: PartType::Leg,
        shape: Shape::Cylinder { radius: 0.04, height: SEAT_HEIGHT - 0.05 },
        position: [LEG_OFFSET, 0.225, -LEG_OFFSET], material: WOOD },
    PartSpec { name: "armrest-left", display_name: "Left Armrest", part_type: PartType::Armrest,
        shape: Shape::Box { width: 0.08, height: 0.06, depth: 0.8 },
        position: [-ARM_OFFSET, 0.88, 0.0], material: WOOD },
    PartSpec { name: "armrest-right", display_name: "Right Armrest", part_type: PartType::Armrest,
        shape: Shape::Box { width: 0.08, height: 0.06, depth: 0.8 },
        position: [ARM_OFFSET, 0.88, 0.0], material: WOOD },
    PartSpec { name: "arm-support-left", display_name: "Left Arm Support", part_type: PartType::ArmSupport,
        shape: Shape::Cylinder { radius: 0.03, height: 0.3 },
        position: [-ARM_OFFSET, 0.7, 0.25], material: METAL },
    PartSpec { name: "arm-support-right", display_name: "Right Arm Support", part_type: PartType::ArmSupport,
        shape: Shape::Cylinder { radius: 0.03, height: 0.3 },
        position: [ARM_OFFSET, 0.7, 0.25], material: METAL },
];

/// The chair as it lives in the scene graph
pub struct Product {
    root: NodeId,
    parts: Vec<NodeId>,
    base_y: f32,
    float: FloatConfig,
}

impl Product {
    /// Builds the chair under the scene root
    pub fn build_chair(scene: &mut Scene, float: FloatConfig) -> Self {
        for material in [
            Material::from_hex(FABRIC, 0x4a6fa5, 0.0, 0.8),
            Material::from_hex(WOOD, 0x8b5a2b, 0.0, 0.6),
            Material::from_hex(METAL, 0xb8b8b8, 0.9, 0.3),
        ] {
            scene.add_material(material);
        }

        let scene_root = scene.root();
        let root = scene.add_node(SceneNode::group("chair"), scene_root);

        let parts = CHAIR_PARTS
            .iter()
            .map(|part| {
                let mesh = scene.add_mesh(part.shape.geometry());
                let material_name = format!("{}-material", part.name);
                let material = scene
                    .material_manager
                    .clone_material(part.material, &material_name)
                    .unwrap_or_else(|| scene.material_manager.get_default_material().name.clone());
                let [x, y, z] = part.position;

                scene.add_node(
                    SceneNode::mesh(part.name, mesh, material)
                        .with_position(x, y, z)
                        .with_shadows(true, true)
                        .with_display_name(part.display_name)
                        .with_part_type(part.part_type.tag()),
                    root,
                )
            })
            .collect::<Vec<_>>();

        log::info!("Built chair with {} parts", parts.len());

        Self {
            root,
            parts,
            base_y: 0.0,
            float,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Meshes that react to hover and click
    pub fn interactive_nodes(&self) -> &[NodeId] {
        &self.parts
    }

    pub fn base_y(&self) -> f32 {
        self.base_y
    }

    pub fn float_config(&self) -> &FloatConfig {
        &self.float
    }

    pub fn set_float_enabled(&mut self, enabled: bool) {
        self.float.enabled = enabled;
    }

    /// Vertical offset of the group at `elapsed` seconds
    pub fn float_offset(&self, elapsed: f32) -> f32 {
        if self.float.enabled {
            self.float.amplitude * (elapsed * self.float.speed).sin()
        } else {
            0.0
        }
    }

    /// Bobs the whole chair; disabled floating pins it at its base height
    pub fn update_float(&self, elapsed: f32, scene: &mut Scene) {
        let y = self.base_y + self.float_offset(elapsed);
        if let Some(root) = scene.node_mut(self.root) {
            root.transform.position.y = y;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewerConfig;
    use crate::gfx::camera::CameraManager;
    use approx::assert_relative_eq;
    use std::collections::HashSet;

    fn build(float: FloatConfig) -> (Scene, Product) {
        let mut scene = Scene::new(CameraManager::from_config(&ViewerConfig::default()));
        let product = Product::build_chair(&mut scene, float);
        (scene, product)
    }

    #[test]
    fn test_chair_structure() {
        let (scene, product) = build(FloatConfig::default());
        let root = scene.node(product.root()).unwrap();
        assert_eq!(root.name, "chair");
        assert_eq!(root.children(), product.interactive_nodes());
        assert_eq!(product.interactive_nodes().len(), 12);

        let count = |part: PartType| {
            product
                .interactive_nodes()
                .iter()
                .filter(|id| {
                    scene.node(**id).unwrap().metadata.part_type.as_deref() == Some(part.tag())
                })
                .count()
        };
        assert_eq!(count(PartType::Seat), 1);
        assert_eq!(count(PartType::Backrest), 1);
        assert_eq!(count(PartType::BackSupport), 2);
        assert_eq!(count(PartType::Leg), 4);
        assert_eq!(count(PartType::Armrest), 2);
        assert_eq!(count(PartType::ArmSupport), 2);
    }

    #[test]
    fn test_parts_are_tagged_and_shadowed() {
        let (scene, product) = build(FloatConfig::default());
        for id in product.interactive_nodes() {
            let node = scene.node(*id).unwrap();
            assert!(node.mesh.is_some());
            assert!(node.cast_shadow && node.receive_shadow);
            assert!(node.metadata.display_name.is_some());
            let tag = node.metadata.part_type.as_deref().unwrap();
            assert!(PartType::from_tag(tag).is_some());
        }
    }

    #[test]
    fn test_each_part_owns_its_material() {
        let (scene, product) = build(FloatConfig::default());
        let materials: HashSet<&str> = product
            .interactive_nodes()
            .iter()
            .map(|id| scene.node(*id).unwrap().material.as_deref().unwrap())
            .collect();
        assert_eq!(materials.len(), 12);
        for id in &materials {
            assert!(scene.material_manager.contains(id));
        }

        let seat = scene.find_by_name("seat").unwrap();
        let seat_material = scene.node(seat).unwrap().material.clone().unwrap();
        assert_eq!(
            scene.material_manager.get_material(&seat_material).unwrap().base_color,
            scene.material_manager.get_material(FABRIC).unwrap().base_color
        );
    }

    #[test]
    fn test_legs_stand_on_ground() {
        let (mut scene, product) = build(FloatConfig::default());
        scene.update_world_matrices();
        let leg = scene.find_by_name("leg-front-left").unwrap();
        let node = scene.node(leg).unwrap();
        let bounds = scene
            .mesh(node.mesh.unwrap())
            .unwrap()
            .bounds()
            .transform(&node.world_matrix());
        assert_relative_eq!(bounds.min.y, 0.0, epsilon = 1e-5);
        assert!(product.base_y() == 0.0);
    }

    #[test]
    fn test_float_offsets_group() {
        let float = FloatConfig {
            enabled: true,
            amplitude: 0.1,
            speed: 2.0,
        };
        let (mut scene, product) = build(float);

        product.update_float(std::f32::consts::FRAC_PI_4, &mut scene);
        assert_relative_eq!(scene.node(product.root()).unwrap().transform.position.y, 0.1);

        let (mut scene, mut product) = build(float);
        product.set_float_enabled(false);
        product.update_float(1.3, &mut scene);
        assert_eq!(scene.node(product.root()).unwrap().transform.position.y, 0.0);
    }

    #[test]
    fn test_part_type_tags_round_trip() {
        for part in PartType::ALL {
            assert_eq!(PartType::from_tag(part.tag()), Some(part));
            assert!(!part.description().is_empty());
        }
        assert_eq!(PartType::from_tag("cushion"), None);
    }
}

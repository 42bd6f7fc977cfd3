//! # Interaction Manager
//!
//! Hover and selection feedback for the product's parts.
//!
//! At construction every interactive node's material id and scale are
//! recorded, and a hover and a selection material are cloned from its
//! original. Feedback only ever swaps material ids and scales, so restoring a
//! node means writing the recorded values back.

use std::collections::HashMap;
use std::f32::consts::TAU;

use cgmath::Vector3;

use crate::{
    config::InteractionConfig,
    gfx::{
        picking::{pick, Ray},
        resources::material::MaterialId,
        scene::{NodeId, Scene},
    },
    product::PartType,
};

/// What the info panel shows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InfoPanel {
    pub visible: bool,
    pub name: String,
    pub part_type: Option<PartType>,
}

impl InfoPanel {
    /// Human readable part description, empty for untyped nodes
    pub fn description(&self) -> &'static str {
        self.part_type.map(PartType::description).unwrap_or_default()
    }

    fn show(&mut self, name: &str, part_type: Option<PartType>) {
        self.visible = true;
        self.name = name.to_string();
        self.part_type = part_type;
    }

    fn hide(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone)]
struct Restoration {
    material: MaterialId,
    scale: Vector3<f32>,
    hover_material: MaterialId,
    selected_material: MaterialId,
}

#[derive(Debug, Clone, Copy)]
struct Pulse {
    node: NodeId,
    elapsed: f32,
}

pub struct InteractionManager {
    config: InteractionConfig,
    nodes: Vec<NodeId>,
    records: HashMap<NodeId, Restoration>,
    hovered: Option<NodeId>,
    selected: Option<NodeId>,
    pulse: Option<Pulse>,
    info_panel: InfoPanel,
}

impl InteractionManager {
    /// Records the restoration state of `nodes` and creates their tinted materials.
    ///
    /// Nodes without a mesh or material are not interactive and are skipped.
    pub fn new(config: InteractionConfig, nodes: &[NodeId], scene: &mut Scene) -> Self {
        let mut records = HashMap::new();

        for &id in nodes {
            let Some(node) = scene.node(id) else {
                log::warn!("Interactive node {:?} does not exist", id);
                continue;
            };
            let (Some(_), Some(material)) = (node.mesh, node.material.clone()) else {
                log::warn!("Node '{}' has no mesh or material, not interactive", node.name);
                continue;
            };
            let scale = node.transform.scale;

            let hover_material =
                tinted_clone(scene, &material, "hover", config.hover_emissive);
            let selected_material =
                tinted_clone(scene, &material, "selected", config.selected_emissive);

            records.insert(
                id,
                Restoration {
                    material,
                    scale,
                    hover_material,
                    selected_material,
                },
            );
        }

        log::debug!("Interaction manager tracking {} nodes", records.len());

        Self {
            config,
            nodes: nodes
                .iter()
                .copied()
                .filter(|id| records.contains_key(id))
                .collect(),
            records,
            hovered: None,
            selected: None,
            pulse: None,
            info_panel: InfoPanel::default(),
        }
    }

    pub fn config(&self) -> &InteractionConfig {
        &self.config
    }

    pub fn hovered(&self) -> Option<NodeId> {
        self.hovered
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    pub fn info_panel(&self) -> &InfoPanel {
        &self.info_panel
    }

    pub fn is_pulsing(&self) -> bool {
        self.pulse.is_some()
    }

    pub fn interactive_nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Material id recorded at construction
    pub fn original_material(&self, id: NodeId) -> Option<&MaterialId> {
        self.records.get(&id).map(|r| &r.material)
    }

    /// Scale recorded at construction
    pub fn original_scale(&self, id: NodeId) -> Option<Vector3<f32>> {
        self.records.get(&id).map(|r| r.scale)
    }

    /// Nearest interactive node under `ray`
    pub fn pick(&self, ray: &Ray, scene: &Scene) -> Option<NodeId> {
        pick(scene, ray, &self.nodes).map(|hit| hit.node)
    }

    /// Updates hover from a pointer ray; returns the hovered node
    pub fn pointer_move(&mut self, ray: &Ray, scene: &mut Scene) -> Option<NodeId> {
        let target = self.pick(ray, scene);
        self.set_hovered(target, scene);
        self.hovered
    }

    /// Pointer left the canvas
    pub fn pointer_leave(&mut self, scene: &mut Scene) {
        self.set_hovered(None, scene);
    }

    pub fn set_hovered(&mut self, target: Option<NodeId>, scene: &mut Scene) {
        let target = target.filter(|id| self.records.contains_key(id));
        if target == self.hovered {
            return;
        }

        if let Some(previous) = self.hovered.take() {
            if let Some(node) = scene.node_mut(previous) {
                node.metadata.hovered = false;
            }
            if Some(previous) != self.selected {
                self.restore(previous, scene);
            }
        }

        if let Some(id) = target {
            if let Some(node) = scene.node_mut(id) {
                node.metadata.hovered = true;
            }
            if Some(id) != self.selected {
                self.apply_hover(id, scene);
            }
        }

        self.hovered = target;
    }

    /// Selects the part under `ray`, or clears the selection on a miss
    pub fn click(&mut self, ray: &Ray, scene: &mut Scene) -> Option<NodeId> {
        let target = self.pick(ray, scene);
        self.select(target, scene);
        self.selected
    }

    /// Makes `target` the selection; `None` clears it and hides the info panel
    pub fn select(&mut self, target: Option<NodeId>, scene: &mut Scene) {
        let target = target.filter(|id| self.records.contains_key(id));

        if let Some(previous) = self.selected.take() {
            self.pulse = None;
            if let Some(node) = scene.node_mut(previous) {
                node.metadata.selected = false;
            }
            self.restore(previous, scene);
            if Some(previous) == self.hovered && Some(previous) != target {
                self.apply_hover(previous, scene);
            }
        }

        let Some(id) = target else {
            self.info_panel.hide();
            return;
        };
        let Some(record) = self.records.get(&id) else {
            return;
        };
        let Some(node) = scene.node_mut(id) else {
            return;
        };

        node.metadata.selected = true;
        node.material = Some(record.selected_material.clone());
        node.transform.scale = record.scale;

        let part_type = node.metadata.part_type.as_deref().and_then(PartType::from_tag);
        self.info_panel.show(node.label(), part_type);
        log::debug!("Selected '{}'", node.label());

        self.selected = Some(id);
        self.pulse = Some(Pulse {
            node: id,
            elapsed: 0.0,
        });
    }

    /// Clears the selection (info panel close button)
    pub fn deselect(&mut self, scene: &mut Scene) {
        self.select(None, scene);
    }

    /// Advances the selection pulse by `dt` seconds
    pub fn update(&mut self, dt: f32, scene: &mut Scene) {
        let Some(mut pulse) = self.pulse else {
            return;
        };
        let Some(base) = self.original_scale(pulse.node) else {
            self.pulse = None;
            return;
        };

        pulse.elapsed += dt.max(0.0);
        let duration = self.config.pulse_duration();
        let factor = if pulse.elapsed >= duration {
            self.pulse = None;
            1.0
        } else {
            self.pulse = Some(pulse);
            1.0 + self.config.pulse_amplitude
                * (TAU * self.config.pulse_frequency * pulse.elapsed).sin()
        };

        if let Some(node) = scene.node_mut(pulse.node) {
            node.transform.scale = base * factor;
        }
    }

    fn apply_hover(&self, id: NodeId, scene: &mut Scene) {
        let (Some(record), Some(node)) = (self.records.get(&id), scene.node_mut(id)) else {
            return;
        };
        node.material = Some(record.hover_material.clone());
        node.transform.scale = record.scale * self.config.hover_scale;
    }

    fn restore(&self, id: NodeId, scene: &mut Scene) {
        let (Some(record), Some(node)) = (self.records.get(&id), scene.node_mut(id)) else {
            return;
        };
        node.material = Some(record.material.clone());
        node.transform.scale = record.scale;
    }
}

fn tinted_clone(
    scene: &mut Scene,
    material: &MaterialId,
    suffix: &str,
    emissive: [f32; 3],
) -> MaterialId {
    let name = format!("{material}-{suffix}");
    let Some(id) = scene.material_manager.clone_material(material, &name) else {
        log::warn!("Material '{}' missing, '{}' falls back to it", material, name);
        return material.clone();
    };
    if let Some(tinted) = scene.material_manager.get_material_mut(&id) {
        tinted.emissive = emissive;
    }
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{FloatConfig, ViewerConfig},
        gfx::camera::CameraManager,
        product::Product,
    };

    struct Fixture {
        scene: Scene,
        interaction: InteractionManager,
        seat: NodeId,
        leg: NodeId,
    }

    fn fixture() -> Fixture {
        let mut scene = Scene::new(CameraManager::from_config(&ViewerConfig::default()));
        let product = Product::build_chair(&mut scene, FloatConfig::default());
        scene.update_world_matrices();
        let interaction = InteractionManager::new(
            InteractionConfig::default(),
            product.interactive_nodes(),
            &mut scene,
        );
        Fixture {
            seat: scene.find_by_name("seat").unwrap(),
            leg: scene.find_by_name("leg-front-left").unwrap(),
            scene,
            interaction,
        }
    }

    fn seat_ray() -> Ray {
        Ray::new(Vector3::new(0.0, 5.0, 0.0), Vector3::new(0.0, -1.0, 0.0))
    }

    fn leg_ray() -> Ray {
        Ray::new(Vector3::new(-0.42, 0.2, 5.0), Vector3::new(0.0, 0.0, -1.0))
    }

    fn empty_ray() -> Ray {
        Ray::new(Vector3::new(0.0, 5.0, 5.0), Vector3::new(0.0, 1.0, 0.0))
    }

    fn material_of(scene: &Scene, id: NodeId) -> MaterialId {
        scene.node(id).unwrap().material.clone().unwrap()
    }

    fn scale_of(scene: &Scene, id: NodeId) -> Vector3<f32> {
        scene.node(id).unwrap().transform.scale
    }

    #[test]
    fn test_hover_applies_and_restores_exactly() {
        let Fixture {
            mut scene,
            mut interaction,
            seat,
            ..
        } = fixture();
        let original_material = material_of(&scene, seat);
        let original_scale = scale_of(&scene, seat);

        assert_eq!(interaction.pointer_move(&seat_ray(), &mut scene), Some(seat));
        assert_ne!(material_of(&scene, seat), original_material);
        assert_ne!(scale_of(&scene, seat), original_scale);
        assert!(scene.node(seat).unwrap().metadata.hovered);

        assert_eq!(interaction.pointer_move(&empty_ray(), &mut scene), None);
        assert_eq!(material_of(&scene, seat), original_material);
        assert_eq!(scale_of(&scene, seat), original_scale);
        assert!(!scene.node(seat).unwrap().metadata.hovered);
    }

    #[test]
    fn test_hover_moves_between_parts() {
        let Fixture {
            mut scene,
            mut interaction,
            seat,
            leg,
        } = fixture();

        interaction.pointer_move(&seat_ray(), &mut scene);
        interaction.pointer_move(&leg_ray(), &mut scene);

        assert_eq!(interaction.hovered(), Some(leg));
        assert_eq!(&material_of(&scene, seat), interaction.original_material(seat).unwrap());
        assert_eq!(Some(scale_of(&scene, seat)), interaction.original_scale(seat));
        assert_ne!(&material_of(&scene, leg), interaction.original_material(leg).unwrap());
    }

    #[test]
    fn test_tint_materials_leave_base_untouched() {
        let Fixture {
            mut scene,
            mut interaction,
            seat,
            ..
        } = fixture();
        let original = interaction.original_material(seat).unwrap().clone();
        let base_emissive = scene.material_manager.get_material(&original).unwrap().emissive;

        interaction.pointer_move(&seat_ray(), &mut scene);
        let hover = material_of(&scene, seat);
        assert_eq!(
            scene.material_manager.get_material(&hover).unwrap().emissive,
            InteractionConfig::default().hover_emissive
        );
        assert_eq!(
            scene.material_manager.get_material(&original).unwrap().emissive,
            base_emissive
        );
    }

    #[test]
    fn test_click_selects_and_clears_previous() {
        let Fixture {
            mut scene,
            mut interaction,
            seat,
            leg,
        } = fixture();

        assert_eq!(interaction.click(&seat_ray(), &mut scene), Some(seat));
        assert!(scene.node(seat).unwrap().metadata.selected);
        let panel = interaction.info_panel();
        assert!(panel.visible);
        assert_eq!(panel.name, "Seat");
        assert_eq!(panel.part_type, Some(PartType::Seat));

        assert_eq!(interaction.click(&leg_ray(), &mut scene), Some(leg));
        assert!(!scene.node(seat).unwrap().metadata.selected);
        assert_eq!(&material_of(&scene, seat), interaction.original_material(seat).unwrap());
        assert_eq!(Some(scale_of(&scene, seat)), interaction.original_scale(seat));
        assert_eq!(interaction.info_panel().part_type, Some(PartType::Leg));

        assert_eq!(interaction.click(&empty_ray(), &mut scene), None);
        assert_eq!(interaction.selected(), None);
        assert!(!interaction.info_panel().visible);
        assert_eq!(&material_of(&scene, leg), interaction.original_material(leg).unwrap());
        assert!(!interaction.is_pulsing());
    }

    #[test]
    fn test_selected_part_ignores_hover() {
        let Fixture {
            mut scene,
            mut interaction,
            seat,
            ..
        } = fixture();

        interaction.click(&seat_ray(), &mut scene);
        let selected_material = material_of(&scene, seat);

        interaction.pointer_move(&seat_ray(), &mut scene);
        assert_eq!(material_of(&scene, seat), selected_material);

        interaction.pointer_move(&empty_ray(), &mut scene);
        assert_eq!(material_of(&scene, seat), selected_material);
        assert_eq!(interaction.selected(), Some(seat));
    }

    #[test]
    fn test_deselect_restores_hover_if_still_hovered() {
        let Fixture {
            mut scene,
            mut interaction,
            seat,
            ..
        } = fixture();

        interaction.pointer_move(&seat_ray(), &mut scene);
        interaction.click(&seat_ray(), &mut scene);
        interaction.deselect(&mut scene);

        assert!(!interaction.info_panel().visible);
        assert_eq!(interaction.hovered(), Some(seat));
        assert!(material_of(&scene, seat).ends_with("-hover"));

        interaction.pointer_leave(&mut scene);
        assert_eq!(&material_of(&scene, seat), interaction.original_material(seat).unwrap());
    }

    #[test]
    fn test_pulse_oscillates_then_settles() {
        let Fixture {
            mut scene,
            mut interaction,
            seat,
            ..
        } = fixture();
        let base = interaction.original_scale(seat).unwrap();
        interaction.click(&seat_ray(), &mut scene);
        assert!(interaction.is_pulsing());

        // A quarter period at 2 Hz is the peak of the sine
        interaction.update(0.125, &mut scene);
        approx::assert_relative_eq!(scale_of(&scene, seat).x, base.x * 1.05, epsilon = 1e-5);

        for _ in 0..100 {
            interaction.update(1.0 / 60.0, &mut scene);
        }
        assert!(!interaction.is_pulsing());
        assert_eq!(scale_of(&scene, seat), base);
        assert_eq!(interaction.selected(), Some(seat));
    }
}

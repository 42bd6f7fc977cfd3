//! # Object Picking
//!
//! Pointer ray-casting against scene nodes.
//!
//! 1. **Pointer to ray**: screen coordinates go through NDC and the inverse
//!    view-projection into a world-space [`Ray`]
//! 2. **Ray vs node**: the ray is moved into each candidate's local space and
//!    tested against the mesh bounding box
//! 3. **Selection**: the nearest hit wins
//!
//! ## Usage
//!
//! ```no_run
//! use showroom::config::ViewerConfig;
//! use showroom::gfx::camera::CameraManager;
//! use showroom::gfx::picking::{pick, screen_to_ray};
//! use showroom::gfx::scene::Scene;
//!
//! let scene = Scene::new(CameraManager::from_config(&ViewerConfig::default()));
//! let ray = screen_to_ray((600.0, 400.0), (1200.0, 800.0), &scene.camera_manager.camera);
//! if let Some(hit) = pick(&scene, &ray, &[]) {
//!     println!("Picked {:?} at {}", hit.node, hit.distance);
//! }
//! ```

use cgmath::{
    ElementWise, EuclideanSpace, InnerSpace, Matrix4, Point3, SquareMatrix, Transform, Vector3,
    Zero,
};

use crate::gfx::{
    camera::orbit_camera::OrbitCamera,
    scene::{NodeId, Scene},
};

/// A ray for intersection testing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vector3<f32>,
    pub direction: Vector3<f32>,
}

impl Ray {
    /// Ray with a normalized direction
    pub fn new(origin: Vector3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    pub fn point_at(&self, t: f32) -> Vector3<f32> {
        self.origin + self.direction * t
    }

    /// Same ray expressed through `matrix`.
    ///
    /// The direction is not renormalized so a parameter `t` names the same
    /// point in both spaces.
    pub fn transform(&self, matrix: &Matrix4<f32>) -> Self {
        Self {
            origin: matrix
                .transform_point(Point3::from_vec(self.origin))
                .to_vec(),
            direction: matrix.transform_vector(self.direction),
        }
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
}

impl Aabb {
    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self { min, max }
    }

    /// Tight bounds around `vertices`; empty input yields a point box at the origin
    pub fn from_vertices(vertices: &[[f32; 3]]) -> Self {
        let Some(first) = vertices.first() else {
            return Self::new(Vector3::zero(), Vector3::zero());
        };

        let first = Vector3::from(*first);
        vertices
            .iter()
            .skip(1)
            .map(|v| Vector3::from(*v))
            .fold(Self::new(first, first), |aabb, v| {
                Self::new(
                    Vector3::new(aabb.min.x.min(v.x), aabb.min.y.min(v.y), aabb.min.z.min(v.z)),
                    Vector3::new(aabb.max.x.max(v.x), aabb.max.y.max(v.y), aabb.max.z.max(v.z)),
                )
            })
    }

    pub fn center(&self) -> Vector3<f32> {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }

    /// Slab test; the ray parameter of the entry point, or of the exit point
    /// when the origin is inside the box
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let inv_dir = Vector3::new(
            1.0 / ray.direction.x,
            1.0 / ray.direction.y,
            1.0 / ray.direction.z,
        );

        let t_min = (self.min - ray.origin).mul_element_wise(inv_dir);
        let t_max = (self.max - ray.origin).mul_element_wise(inv_dir);

        let t1 = Vector3::new(
            t_min.x.min(t_max.x),
            t_min.y.min(t_max.y),
            t_min.z.min(t_max.z),
        );
        let t2 = Vector3::new(
            t_min.x.max(t_max.x),
            t_min.y.max(t_max.y),
            t_min.z.max(t_max.z),
        );

        let t_near = t1.x.max(t1.y.max(t1.z));
        let t_far = t2.x.min(t2.y.min(t2.z));

        if t_near <= t_far && t_far >= 0.0 {
            Some(if t_near >= 0.0 { t_near } else { t_far })
        } else {
            None
        }
    }

    /// Bounds of the 8 transformed corners
    pub fn transform(&self, matrix: &Matrix4<f32>) -> Self {
        let corners: Vec<[f32; 3]> = (0..8)
            .map(|i| {
                let corner = Point3::new(
                    if i & 1 == 0 { self.min.x } else { self.max.x },
                    if i & 2 == 0 { self.min.y } else { self.max.y },
                    if i & 4 == 0 { self.min.z } else { self.max.z },
                );
                matrix.transform_point(corner).into()
            })
            .collect();

        Self::from_vertices(&corners)
    }
}

/// Result of a pick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    pub node: NodeId,
    /// Distance along the world ray
    pub distance: f32,
    /// World-space hit point
    pub point: Vector3<f32>,
}

/// Converts a pointer position in pixels to a world-space ray
pub fn screen_to_ray(screen_pos: (f32, f32), screen_size: (f32, f32), camera: &OrbitCamera) -> Ray {
    let (mouse_x, mouse_y) = screen_pos;
    let (screen_width, screen_height) = (screen_size.0.max(1.0), screen_size.1.max(1.0));

    let ndc_x = (2.0 * mouse_x) / screen_width - 1.0;
    let ndc_y = 1.0 - (2.0 * mouse_y) / screen_height; // Flip Y axis

    let view_proj = camera.projection_matrix() * camera.view_matrix();
    let Some(inv_view_proj) = view_proj.invert() else {
        log::warn!("Camera matrix is not invertible, picking along the view axis");
        return Ray::new(camera.eye, camera.target - camera.eye);
    };

    let near = inv_view_proj.transform_point(Point3::new(ndc_x, ndc_y, -1.0));
    let far = inv_view_proj.transform_point(Point3::new(ndc_x, ndc_y, 1.0));

    Ray::new(near.to_vec(), far - near)
}

/// Nearest visible candidate whose mesh bounds the ray crosses.
///
/// Bounds are tested in each node's local space, so rotated and scaled
/// nodes are matched tightly. World matrices must be current.
pub fn pick(scene: &Scene, ray: &Ray, candidates: &[NodeId]) -> Option<PickHit> {
    candidates
        .iter()
        .filter(|id| scene.is_effectively_visible(**id))
        .filter_map(|&id| {
            let node = scene.node(id)?;
            let mesh = scene.mesh(node.mesh?)?;
            let inverse = node.world_matrix().invert()?;
            let distance = mesh.bounds().intersect_ray(&ray.transform(&inverse))?;
            Some(PickHit {
                node: id,
                distance,
                point: ray.point_at(distance),
            })
        })
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewerConfig;
    use crate::gfx::{camera::CameraManager, geometry::generate_box, scene::SceneNode};
    use approx::assert_relative_eq;
    use cgmath::{Deg, Quaternion, Rotation3};

    fn scene() -> Scene {
        Scene::new(CameraManager::from_config(&ViewerConfig::default()))
    }

    #[test]
    fn test_ray_aabb_hit_and_miss() {
        let aabb = Aabb::new(Vector3::new(-1.0, -1.0, -1.0), Vector3::new(1.0, 1.0, 1.0));

        let hit = Ray::new(Vector3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
        assert_relative_eq!(aabb.intersect_ray(&hit).unwrap(), 4.0);

        let miss = Ray::new(Vector3::new(3.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
        assert_eq!(aabb.intersect_ray(&miss), None);

        let behind = Ray::new(Vector3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(aabb.intersect_ray(&behind), None);
    }

    #[test]
    fn test_aabb_from_vertices() {
        let aabb = Aabb::from_vertices(&[[1.0, -2.0, 0.5], [-1.0, 3.0, 0.0], [0.0, 0.0, 2.0]]);
        assert_eq!(aabb.min, Vector3::new(-1.0, -2.0, 0.0));
        assert_eq!(aabb.max, Vector3::new(1.0, 3.0, 2.0));
        assert_eq!(Aabb::from_vertices(&[]).size(), Vector3::zero());
    }

    #[test]
    fn test_aabb_transform() {
        let aabb = Aabb::new(Vector3::new(-1.0, -1.0, -1.0), Vector3::new(1.0, 1.0, 1.0));
        let moved = aabb.transform(&Matrix4::from_translation(Vector3::new(2.0, 0.0, 0.0)));
        assert_eq!(moved.center(), Vector3::new(2.0, 0.0, 0.0));

        let rotated = aabb.transform(&Matrix4::from_angle_y(Deg(45.0)));
        assert_relative_eq!(rotated.max.x, 2f32.sqrt(), epsilon = 1e-5);
    }

    #[test]
    fn test_screen_center_ray_points_at_target() {
        let scene = scene();
        let camera = &scene.camera_manager.camera;
        let ray = screen_to_ray((600.0, 400.0), (1200.0, 800.0), camera);

        let to_target = (camera.target - camera.eye).normalize();
        assert_relative_eq!(ray.direction, to_target, epsilon = 1e-4);
    }

    #[test]
    fn test_pick_nearest_of_overlapping_nodes() {
        let mut scene = scene();
        let root = scene.root();
        let mesh = scene.add_mesh(generate_box(0.5, 0.5, 0.5));
        let target = scene.camera_manager.camera.target;
        let eye = scene.camera_manager.camera.eye;
        let near_pos = target + (eye - target) * 0.3;

        let far = scene.add_node(
            SceneNode::mesh("far", mesh, "default".into()).with_position(target.x, target.y, target.z),
            root,
        );
        let near = scene.add_node(
            SceneNode::mesh("near", mesh, "default".into())
                .with_position(near_pos.x, near_pos.y, near_pos.z),
            root,
        );
        scene.update();

        let ray = screen_to_ray((600.0, 400.0), (1200.0, 800.0), &scene.camera_manager.camera);
        let hit = pick(&scene, &ray, &[far, near]).unwrap();
        assert_eq!(hit.node, near);

        // Hidden nodes are not pickable
        scene.node_mut(near).unwrap().visible = false;
        assert_eq!(pick(&scene, &ray, &[far, near]).unwrap().node, far);

        // Corner of the screen misses everything
        let corner = screen_to_ray((2.0, 2.0), (1200.0, 800.0), &scene.camera_manager.camera);
        assert_eq!(pick(&scene, &corner, &[far, near]), None);
    }

    #[test]
    fn test_pick_uses_local_space_of_rotated_scaled_node() {
        let mut scene = scene();
        let root = scene.root();
        let mesh = scene.add_mesh(generate_box(2.0, 0.2, 0.2));
        let mut node = SceneNode::mesh("bar", mesh, "default".into())
            .with_rotation(Quaternion::from_angle_y(Deg(90.0)));
        node.transform.scale = Vector3::new(2.0, 1.0, 1.0);
        let bar = scene.add_node(node, root);
        scene.update_world_matrices();

        // After rotation the bar extends along Z, scaled to 4 units
        let along_z = Ray::new(Vector3::new(0.0, 5.0, 1.8), Vector3::new(0.0, -1.0, 0.0));
        let hit = pick(&scene, &along_z, &[bar]).unwrap();
        assert_relative_eq!(hit.distance, 4.9, epsilon = 1e-4);
        assert_relative_eq!(hit.point.y, 0.1, epsilon = 1e-4);

        let along_x = Ray::new(Vector3::new(1.8, 5.0, 0.0), Vector3::new(0.0, -1.0, 0.0));
        assert_eq!(pick(&scene, &along_x, &[bar]), None);
    }
}

/// Scene composition: the orb, the ring, the shard halo and the starfield
use log::debug;
use nalgebra::{Matrix4, Point3, Vector3};
use rand::Rng;
use std::f32::consts::FRAC_PI_2;
use std::sync::Arc;

use crate::geometry::Mesh;
use crate::lighting::Lighting;
use crate::material::{Material, PointMaterial};
use crate::transform::{RotationState, Transform};

/// Composition constants
#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    pub orb_radius: f32,
    pub orb_detail: u32,

    pub ring_radius: f32,
    pub ring_tube: f32,
    pub ring_tubular_segments: u32,
    pub ring_radial_segments: u32,
    /// Base tilt about X so the knot lies flat around the orb
    pub ring_base_tilt: f32,

    pub shard_count: usize,
    pub shard_orbit_radius: f32,
    pub shard_height: f32,
    pub shard_height_frequency: f32,
    pub shard_cone_radius: f32,
    pub shard_cone_height: f32,
    pub shard_cone_segments: u32,

    pub star_count: usize,
    /// Full width, height and depth of the box stars are scattered in
    pub star_extent: Vector3<f32>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            orb_radius: 1.2,
            orb_detail: 2,

            ring_radius: 1.8,
            ring_tube: 0.08,
            ring_tubular_segments: 160,
            ring_radial_segments: 12,
            ring_base_tilt: FRAC_PI_2,

            shard_count: 12,
            shard_orbit_radius: 2.4,
            shard_height: 0.8,
            shard_height_frequency: 0.5,
            shard_cone_radius: 0.12,
            shard_cone_height: 0.4,
            shard_cone_segments: 5,

            star_count: 600,
            star_extent: Vector3::new(40.0, 20.0, 40.0),
        }
    }
}

/// A positioned, rotatable mesh
#[derive(Debug, Clone)]
pub struct SceneObject {
    pub name: &'static str,
    pub mesh: Arc<Mesh>,
    pub material: Material,
    pub transform: Transform,
}

/// Objects that move together under a shared transform
#[derive(Debug, Clone)]
pub struct Group {
    pub transform: Transform,
    pub children: Vec<SceneObject>,
}

impl Group {
    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// Point particles drawn as sprites
#[derive(Debug, Clone)]
pub struct StarField {
    pub points: Vec<Point3<f32>>,
    pub material: PointMaterial,
    pub transform: Transform,
}

/// A mesh ready to draw, with its object-to-world matrix
pub struct Drawable<'a> {
    pub object: &'a SceneObject,
    pub world: Matrix4<f32>,
}

/// The full decorative scene
#[derive(Debug, Clone)]
pub struct Scene {
    pub orb: SceneObject,
    pub ring: SceneObject,
    pub shards: Group,
    pub stars: StarField,
    pub lighting: Lighting,
}

impl Scene {
    /// Build the scene from `config`, drawing shard rotations and star
    /// positions from `rng`. A seeded generator gives a reproducible scene.
    pub fn compose<R: Rng>(config: &SceneConfig, rng: &mut R) -> Self {
        let orb = SceneObject {
            name: "orb",
            mesh: Arc::new(Mesh::icosahedron(config.orb_radius, config.orb_detail)),
            material: Material::orb(),
            transform: Transform::identity(),
        };

        let ring = SceneObject {
            name: "ring",
            mesh: Arc::new(Mesh::torus_knot(
                config.ring_radius,
                config.ring_tube,
                config.ring_tubular_segments,
                config.ring_radial_segments,
                2,
                3,
            )),
            material: Material::ring(),
            transform: Transform::new(
                Vector3::zeros(),
                RotationState::new(config.ring_base_tilt, 0.0, 0.0),
            ),
        };

        let shard_mesh = Arc::new(Mesh::cone(
            config.shard_cone_radius,
            config.shard_cone_height,
            config.shard_cone_segments,
        ));
        let children = (0..config.shard_count)
            .map(|i| {
                let rotation = RotationState::new(rng.gen(), rng.gen(), rng.gen());
                SceneObject {
                    name: "shard",
                    mesh: Arc::clone(&shard_mesh),
                    material: Material::shard(),
                    transform: Transform::new(shard_position(config, i), rotation),
                }
            })
            .collect();
        let shards = Group {
            transform: Transform::identity(),
            children,
        };

        let extent = config.star_extent;
        let points = (0..config.star_count)
            .map(|_| {
                Point3::new(
                    (rng.gen::<f32>() - 0.5) * extent.x,
                    (rng.gen::<f32>() - 0.5) * extent.y,
                    (rng.gen::<f32>() - 0.5) * extent.z,
                )
            })
            .collect();
        let stars = StarField {
            points,
            material: PointMaterial::star(),
            transform: Transform::identity(),
        };

        debug!(
            "Composed scene: orb {} tris, ring {} tris, {} shards, {} stars",
            orb.mesh.triangle_count(),
            ring.mesh.triangle_count(),
            shards.len(),
            stars.points.len()
        );

        Self {
            orb,
            ring,
            shards,
            stars,
            lighting: Lighting::studio(),
        }
    }

    /// Every mesh object with its world matrix: orb, ring, then shards.
    pub fn drawables(&self) -> impl Iterator<Item = Drawable<'_>> + '_ {
        let group = self.shards.transform.matrix();
        [&self.orb, &self.ring]
            .into_iter()
            .map(|object| Drawable {
                object,
                world: object.transform.matrix(),
            })
            .chain(self.shards.children.iter().map(move |object| Drawable {
                object,
                world: group * object.transform.matrix(),
            }))
    }
}

/// Shard `i` sits on a wobbling circle around the orb.
pub fn shard_position(config: &SceneConfig, index: usize) -> Vector3<f32> {
    let i = index as f32;
    Vector3::new(
        i.sin() * config.shard_orbit_radius,
        (i * config.shard_height_frequency).cos() * config.shard_height,
        i.cos() * config.shard_orbit_radius,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn scene(seed: u64) -> Scene {
        Scene::compose(&SceneConfig::default(), &mut StdRng::seed_from_u64(seed))
    }

    #[test]
    fn test_primary_and_ring_at_origin() {
        let scene = scene(1);
        assert_eq!(scene.orb.transform.position, Vector3::zeros());
        assert_eq!(scene.ring.transform.position, Vector3::zeros());
        assert_eq!(scene.ring.transform.rotation, RotationState::new(FRAC_PI_2, 0.0, 0.0));
    }

    #[test]
    fn test_shard_layout() {
        let scene = scene(7);
        assert_eq!(scene.shards.len(), 12);

        for (i, shard) in scene.shards.children.iter().enumerate() {
            let i = i as f32;
            let position = shard.transform.position;
            assert_eq!(position.x, i.sin() * 2.4);
            assert_eq!(position.y, (i * 0.5).cos() * 0.8);
            assert_eq!(position.z, i.cos() * 2.4);

            let rotation = shard.transform.rotation;
            for angle in [rotation.x, rotation.y, rotation.z] {
                assert!((0.0..1.0).contains(&angle));
            }
        }
    }

    #[test]
    fn test_shards_share_one_mesh() {
        let scene = scene(3);
        let first = &scene.shards.children[0].mesh;
        assert!(scene.shards.children.iter().all(|s| Arc::ptr_eq(first, &s.mesh)));
    }

    #[test]
    fn test_star_bounds() {
        let scene = scene(11);
        assert_eq!(scene.stars.points.len(), 600);
        for star in &scene.stars.points {
            assert!(star.x.abs() <= 20.0);
            assert!(star.y.abs() <= 10.0);
            assert!(star.z.abs() <= 20.0);
        }
    }

    #[test]
    fn test_seeded_composition_is_reproducible() {
        let a = scene(42);
        let b = scene(42);
        assert_eq!(a.stars.points, b.stars.points);
        for (x, y) in a.shards.children.iter().zip(&b.shards.children) {
            assert_eq!(x.transform, y.transform);
        }
    }

    #[test]
    fn test_drawables_order_and_count() {
        let scene = scene(5);
        let names: Vec<_> = scene.drawables().map(|d| d.object.name).collect();
        assert_eq!(names.len(), 14);
        assert_eq!(&names[..3], &["orb", "ring", "shard"]);
    }
}

/// Per-frame motion of the scene
///
/// Every angle is a closed-form function of elapsed time and pointer offset,
/// so applying the same input twice always lands on the same pose.
use std::f32::consts::FRAC_PI_2;

use crate::pointer::PointerState;
use crate::scene::Scene;

/// Everything a frame update reads
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameInput {
    /// Seconds since the clock started
    pub elapsed: f32,
    pub pointer: PointerState,
}

impl FrameInput {
    pub fn new(elapsed: f32, pointer: PointerState) -> Self {
        Self { elapsed, pointer }
    }
}

/// The animated angles for one frame, in radians
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScenePose {
    pub orb_yaw: f32,
    pub orb_pitch: f32,
    pub ring_roll: f32,
    pub ring_pitch: f32,
    pub shards_yaw: f32,
    pub shards_pitch: f32,
    pub stars_yaw: f32,
}

impl ScenePose {
    pub fn from_input(input: &FrameInput) -> Self {
        let t = input.elapsed;
        let PointerState { x: px, y: py } = input.pointer;

        Self {
            orb_yaw: t * 0.4 + px * 0.4,
            orb_pitch: t * 0.2 + py * 0.4,

            ring_roll: t * 0.3 - px * 0.2,
            ring_pitch: FRAC_PI_2 + py * 0.2,

            shards_yaw: t * 0.35,
            shards_pitch: t * 0.15,

            stars_yaw: t * 0.02,
        }
    }
}

impl Scene {
    /// Overwrite the animated angles; every other angle keeps its composed value.
    pub fn apply_pose(&mut self, pose: &ScenePose) {
        self.orb.transform.rotation.y = pose.orb_yaw;
        self.orb.transform.rotation.x = pose.orb_pitch;

        self.ring.transform.rotation.z = pose.ring_roll;
        self.ring.transform.rotation.x = pose.ring_pitch;

        self.shards.transform.rotation.y = pose.shards_yaw;
        self.shards.transform.rotation.x = pose.shards_pitch;

        self.stars.transform.rotation.y = pose.stars_yaw;
    }

    pub fn update(&mut self, input: &FrameInput) -> ScenePose {
        let pose = ScenePose::from_input(input);
        self.apply_pose(&pose);
        pose
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn scene() -> Scene {
        Scene::compose(&SceneConfig::default(), &mut StdRng::seed_from_u64(9))
    }

    #[test]
    fn test_orb_yaw_formula() {
        for &t in &[0.0_f32, 0.5, 3.0, 120.25] {
            for &px in &[-1.0_f32, -0.3, 0.0, 0.8, 1.0] {
                let pose = ScenePose::from_input(&FrameInput::new(t, PointerState::new(px, 0.0)));
                assert_eq!(pose.orb_yaw, 0.4 * t + 0.4 * px);
            }
        }
    }

    #[test]
    fn test_pose_at_rest() {
        let pose = ScenePose::from_input(&FrameInput::default());
        assert_eq!(pose.orb_yaw, 0.0);
        assert_eq!(pose.ring_pitch, FRAC_PI_2);
        assert_eq!(pose.stars_yaw, 0.0);
    }

    #[test]
    fn test_pointer_drives_ring_against_orb() {
        let pose = ScenePose::from_input(&FrameInput::new(0.0, PointerState::new(1.0, -1.0)));
        assert!((pose.orb_yaw - 0.4).abs() < 1e-6);
        assert!((pose.orb_pitch + 0.4).abs() < 1e-6);
        assert!((pose.ring_roll + 0.2).abs() < 1e-6);
        assert!((pose.ring_pitch - (FRAC_PI_2 - 0.2)).abs() < 1e-6);
    }

    #[test]
    fn test_update_is_idempotent() {
        let mut scene = scene();
        let input = FrameInput::new(4.2, PointerState::new(0.25, -0.6));

        scene.update(&input);
        let first = (
            scene.orb.transform.rotation,
            scene.ring.transform.rotation,
            scene.shards.transform.rotation,
            scene.stars.transform.rotation,
        );

        scene.update(&input);
        let second = (
            scene.orb.transform.rotation,
            scene.ring.transform.rotation,
            scene.shards.transform.rotation,
            scene.stars.transform.rotation,
        );

        assert_eq!(first, second);
    }

    #[test]
    fn test_group_rotates_rigidly() {
        let mut scene = scene();
        let before: Vec<_> = scene.shards.children.iter().map(|s| s.transform).collect();

        scene.update(&FrameInput::new(10.0, PointerState::new(0.5, 0.5)));

        let after: Vec<_> = scene.shards.children.iter().map(|s| s.transform).collect();
        assert_eq!(before, after);
        let rotation = scene.shards.transform.rotation;
        assert!((rotation.x - 1.5).abs() < 1e-5);
        assert!((rotation.y - 3.5).abs() < 1e-5);
        assert_eq!(rotation.z, 0.0);
    }

    #[test]
    fn test_untouched_axes_keep_composed_values() {
        let mut scene = scene();
        scene.update(&FrameInput::new(2.0, PointerState::centered()));
        assert_eq!(scene.orb.transform.rotation.z, 0.0);
        assert_eq!(scene.ring.transform.rotation.y, 0.0);
    }
}

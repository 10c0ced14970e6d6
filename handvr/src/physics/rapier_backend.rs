use std::collections::HashMap;

use cgmath::{InnerSpace, Point3, Vector3};
use rapier3d::parry::query::Ray;
use rapier3d::prelude::*;

use super::util::{
    npoint_to_cgmath, nvec_to_cgmath, nvec_to_cgpoint, point_to_npoint, point_to_nvec, vec_to_nvec,
};
use super::{PhysicsBackend, RayHit};
use crate::error::{HandError, HandResult};
use crate::hand::HandId;
use crate::interactable::InteractableId;

struct Grip {
    joint: ImpulseJointHandle,
    body: RigidBodyHandle,
}

/// Rapier-backed scene holding the hand proxies, grabbable bodies and static
/// geometry the pointer can land on.
///
/// The simulation is never stepped here; this adapter only performs the reads
/// and writes the hands need.
pub struct RapierPhysics {
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    islands: IslandManager,
    interactables: HashMap<InteractableId, RigidBodyHandle>,
    hands: HashMap<HandId, RigidBodyHandle>,
    grips: HashMap<HandId, Grip>,
}

impl RapierPhysics {
    pub fn new() -> Self {
        RapierPhysics {
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            islands: IslandManager::new(),
            interactables: HashMap::new(),
            hands: HashMap::new(),
            grips: HashMap::new(),
        }
    }

    /// Static axis-aligned box (floors, walls, teleport surfaces).
    pub fn add_static_box(
        &mut self,
        center: Point3<f32>,
        half_extents: Vector3<f32>,
    ) -> ColliderHandle {
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .translation(point_to_nvec(center))
            .build();
        self.colliders.insert(collider)
    }

    /// Dynamic ball-shaped body that hands can grab.
    pub fn add_interactable(
        &mut self,
        id: InteractableId,
        position: Point3<f32>,
        radius: f32,
    ) -> RigidBodyHandle {
        let body = RigidBodyBuilder::dynamic()
            .translation(point_to_nvec(position))
            .build();
        let handle = self.bodies.insert(body);
        let collider = ColliderBuilder::ball(radius).build();
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);
        self.interactables.insert(id, handle);
        handle
    }

    pub fn remove_interactable(&mut self, id: InteractableId) {
        let Some(handle) = self.interactables.remove(&id) else {
            return;
        };

        self.bodies.remove(
            handle,
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
        self.grips.retain(|_, grip| grip.body != handle);
    }

    pub fn is_attached(&self, hand: HandId, body: InteractableId) -> bool {
        match (self.grips.get(&hand), self.interactables.get(&body)) {
            (Some(grip), Some(handle)) => {
                grip.body == *handle && self.impulse_joints.get(grip.joint).is_some()
            }
            _ => false,
        }
    }

    pub fn joint_count(&self) -> usize {
        self.impulse_joints.len()
    }

    fn interactable_body_mut(&mut self, id: InteractableId) -> HandResult<&mut RigidBody> {
        self.interactables
            .get(&id)
            .and_then(|handle| self.bodies.get_mut(*handle))
            .ok_or(HandError::UnknownBody(id))
    }

    fn is_ray_blocker(&self, collider: &Collider) -> bool {
        if collider.is_sensor() {
            return false;
        }

        match collider.parent() {
            Some(parent) => {
                !self.hands.values().any(|hand| *hand == parent)
                    && !self.grips.values().any(|grip| grip.body == parent)
            }
            None => true,
        }
    }
}

impl Default for RapierPhysics {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsBackend for RapierPhysics {
    fn body_position(&self, body: InteractableId) -> Option<Point3<f32>> {
        let handle = self.interactables.get(&body)?;
        self.bodies
            .get(*handle)
            .map(|rb| nvec_to_cgpoint(rb.translation()))
    }

    fn set_body_position(&mut self, body: InteractableId, position: Point3<f32>) -> HandResult<()> {
        self.interactable_body_mut(body)?
            .set_translation(point_to_nvec(position), true);
        Ok(())
    }

    fn body_velocity(&self, body: InteractableId) -> Option<(Vector3<f32>, Vector3<f32>)> {
        let handle = self.interactables.get(&body)?;
        self.bodies
            .get(*handle)
            .map(|rb| (nvec_to_cgmath(rb.linvel()), nvec_to_cgmath(rb.angvel())))
    }

    fn set_body_velocity(
        &mut self,
        body: InteractableId,
        linear: Vector3<f32>,
        angular: Vector3<f32>,
    ) -> HandResult<()> {
        let rb = self.interactable_body_mut(body)?;
        rb.set_linvel(vec_to_nvec(linear), true);
        rb.set_angvel(vec_to_nvec(angular), true);
        Ok(())
    }

    fn move_hand(&mut self, hand: HandId, position: Point3<f32>) -> HandResult<()> {
        match self.hands.get(&hand).and_then(|handle| self.bodies.get_mut(*handle)) {
            Some(body) => body.set_translation(point_to_nvec(position), true),
            None => {
                let body = RigidBodyBuilder::kinematic_position_based()
                    .translation(point_to_nvec(position))
                    .build();
                let handle = self.bodies.insert(body);
                self.hands.insert(hand, handle);
                crate::physics_log!(DEBUG, %hand, "created kinematic hand proxy");
            }
        }
        Ok(())
    }

    fn can_attach(&self, hand: HandId, body: InteractableId) -> bool {
        self.hands.contains_key(&hand) && self.interactables.contains_key(&body)
    }

    fn attach(&mut self, hand: HandId, body: InteractableId) -> HandResult<()> {
        let hand_body = *self.hands.get(&hand).ok_or(HandError::UnknownHand(hand))?;
        let object_body = *self
            .interactables
            .get(&body)
            .ok_or(HandError::UnknownBody(body))?;

        self.detach(hand);

        let joint = GenericJointBuilder::new(JointAxesMask::LOCKED_FIXED_AXES).build();
        let handle = self
            .impulse_joints
            .insert(hand_body, object_body, joint, true);
        self.grips.insert(
            hand,
            Grip {
                joint: handle,
                body: object_body,
            },
        );
        Ok(())
    }

    fn detach(&mut self, hand: HandId) {
        if let Some(grip) = self.grips.remove(&hand) {
            self.impulse_joints.remove(grip.joint, true);
        }
    }

    fn cast_ray(
        &self,
        origin: Point3<f32>,
        direction: Vector3<f32>,
        max_distance: f32,
    ) -> Option<RayHit> {
        if direction.magnitude2() <= f32::EPSILON {
            return None;
        }

        let ray = Ray::new(point_to_npoint(origin), vec_to_nvec(direction.normalize()));

        self.colliders
            .iter()
            .filter(|(_, collider)| self.is_ray_blocker(collider))
            .filter_map(|(_, collider)| {
                collider
                    .shape()
                    .cast_ray(collider.position(), &ray, max_distance, true)
            })
            .min_by(|a, b| a.total_cmp(b))
            .map(|toi| RayHit {
                point: npoint_to_cgmath(ray.point_at(toi)),
                distance: toi,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hand::{Handedness, PeerId};
    use cgmath::vec3;

    fn right_hand() -> HandId {
        HandId::new(PeerId(1), Handedness::Right)
    }

    fn right_hand_without_proxy() -> HandId {
        HandId::new(PeerId(9), Handedness::Right)
    }

    fn scene_with_floor() -> RapierPhysics {
        let mut physics = RapierPhysics::new();
        physics.add_static_box(Point3::new(0.0, -0.5, 0.0), vec3(10.0, 0.5, 10.0));
        physics
    }

    #[test]
    fn test_ray_hits_floor_below() {
        let physics = scene_with_floor();
        let hit = physics
            .cast_ray(Point3::new(1.0, 2.0, -1.0), vec3(0.0, -1.0, 0.0), f32::MAX)
            .expect("floor should be hit");

        assert!((hit.point.y - 0.0).abs() < 1e-4);
        assert!((hit.distance - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_ray_respects_max_distance() {
        let physics = scene_with_floor();
        let hit = physics.cast_ray(Point3::new(0.0, 2.0, 0.0), vec3(0.0, -1.0, 0.0), 1.0);
        assert!(hit.is_none());
    }

    #[test]
    fn test_ray_pointing_away_misses() {
        let physics = scene_with_floor();
        let hit = physics.cast_ray(Point3::new(0.0, 2.0, 0.0), vec3(0.0, 1.0, 0.0), f32::MAX);
        assert!(hit.is_none());
    }

    #[test]
    fn test_velocity_round_trips_through_body() {
        let mut physics = RapierPhysics::new();
        let crate_id = InteractableId(7);
        physics.add_interactable(crate_id, Point3::new(0.0, 1.0, 0.0), 0.1);

        physics
            .set_body_velocity(crate_id, vec3(0.0, 5.0, 0.0), vec3(1.0, 0.0, 0.0))
            .unwrap();

        assert_eq!(
            physics.body_velocity(crate_id),
            Some((vec3(0.0, 5.0, 0.0), vec3(1.0, 0.0, 0.0)))
        );
    }

    #[test]
    fn test_unknown_body_is_an_error() {
        let mut physics = RapierPhysics::new();
        let err = physics
            .set_body_position(InteractableId(99), Point3::new(0.0, 0.0, 0.0))
            .unwrap_err();
        assert!(matches!(err, HandError::UnknownBody(InteractableId(99))));
    }

    #[test]
    fn test_attach_and_detach_manage_one_joint() {
        let mut physics = RapierPhysics::new();
        let hand = right_hand();
        let a = InteractableId(1);
        let b = InteractableId(2);
        physics.move_hand(hand, Point3::new(0.0, 1.0, 0.0)).unwrap();
        physics.add_interactable(a, Point3::new(0.0, 1.0, 0.0), 0.1);
        physics.add_interactable(b, Point3::new(1.0, 1.0, 0.0), 0.1);

        assert!(!physics.can_attach(right_hand_without_proxy(), a));
        assert!(physics.can_attach(hand, a));
        physics.attach(hand, a).unwrap();
        assert!(physics.is_attached(hand, a));

        physics.attach(hand, b).unwrap();
        assert_eq!(physics.joint_count(), 1);
        assert!(physics.is_attached(hand, b));
        assert!(!physics.is_attached(hand, a));

        physics.detach(hand);
        assert_eq!(physics.joint_count(), 0);
    }

    #[test]
    fn test_ray_ignores_held_body() {
        let mut physics = scene_with_floor();
        let hand = right_hand();
        let held = InteractableId(3);
        physics.move_hand(hand, Point3::new(0.0, 1.0, 0.0)).unwrap();
        physics.add_interactable(held, Point3::new(0.0, 1.0, 0.0), 0.2);

        let down = vec3(0.0, -1.0, 0.0);
        let before = physics
            .cast_ray(Point3::new(0.0, 1.0, 0.0), down, f32::MAX)
            .unwrap();
        assert!(before.distance < 0.5);

        physics.attach(hand, held).unwrap();
        let after = physics
            .cast_ray(Point3::new(0.0, 1.0, 0.0), down, f32::MAX)
            .unwrap();
        assert!((after.point.y - 0.0).abs() < 1e-4);
    }

    #[test]
    fn test_removing_interactable_releases_grip() {
        let mut physics = RapierPhysics::new();
        let hand = right_hand();
        let id = InteractableId(4);
        physics.move_hand(hand, Point3::new(0.0, 1.0, 0.0)).unwrap();
        physics.add_interactable(id, Point3::new(0.0, 1.0, 0.0), 0.1);
        physics.attach(hand, id).unwrap();

        physics.remove_interactable(id);

        assert_eq!(physics.joint_count(), 0);
        assert!(physics.body_position(id).is_none());
    }
}

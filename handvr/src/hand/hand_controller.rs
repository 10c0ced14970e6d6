use cgmath::{InnerSpace, Point3, Vector3};
use ordered_float::OrderedFloat;

use super::{Authority, HandId, HandPose};
use crate::config::HandConfig;
use crate::interactable::{InteractableId, ObjectTags};
use crate::physics::PhysicsBackend;
use crate::rig::CameraRig;
use crate::teleport::{PointerMarker, TeleportEvent, TeleportSequence, ground_translation};

/// Interaction state of a single hand.
///
/// Holds what the hand is touching and holding, its pointer and its teleport
/// sequence. Anything that crosses hands (taking an object from another hand,
/// replicating to peers) is coordinated by [`crate::world::InteractionWorld`].
#[derive(Clone, Debug)]
pub struct HandController {
    id: HandId,
    authority: Authority,
    // Insertion order doubles as the nearest-candidate tie-break.
    contacts: Vec<InteractableId>,
    held: Option<InteractableId>,
    pose: HandPose,
    pointer: PointerMarker,
    teleport: TeleportSequence,
    next_sequence: u64,
    last_applied_sequence: Option<u64>,
}

impl HandController {
    pub fn new(id: HandId, authority: Authority, config: &HandConfig) -> Self {
        HandController {
            id,
            authority,
            contacts: Vec::new(),
            held: None,
            pose: HandPose::default(),
            pointer: PointerMarker::default(),
            teleport: TeleportSequence::new(config.fade_duration),
            next_sequence: 0,
            last_applied_sequence: None,
        }
    }

    pub fn id(&self) -> HandId {
        self.id
    }

    pub fn authority(&self) -> Authority {
        self.authority
    }

    pub fn is_owner(&self) -> bool {
        self.authority == Authority::Owner
    }

    /// Returns true if `object` became a new candidate.
    pub fn on_proximity_enter(&mut self, object: InteractableId, tags: ObjectTags) -> bool {
        if !tags.is_interactable() || self.contacts.contains(&object) {
            return false;
        }
        self.contacts.push(object);
        true
    }

    /// Returns true if `object` stopped being a candidate.
    pub fn on_proximity_exit(&mut self, object: InteractableId, tags: ObjectTags) -> bool {
        if !tags.is_interactable() {
            return false;
        }
        self.forget(object)
    }

    /// Drop `object` from the candidates regardless of tags (despawned bodies).
    pub fn forget(&mut self, object: InteractableId) -> bool {
        let before = self.contacts.len();
        self.contacts.retain(|contact| *contact != object);
        self.contacts.len() != before
    }

    pub fn contacts(&self) -> &[InteractableId] {
        &self.contacts
    }

    pub fn is_touching(&self, object: InteractableId) -> bool {
        self.contacts.contains(&object)
    }

    /// Closest candidate by squared distance; the earliest contact wins ties.
    /// Candidates the physics backend has no position for are skipped.
    pub fn nearest_interactable<P: PhysicsBackend + ?Sized>(
        &self,
        physics: &P,
    ) -> Option<InteractableId> {
        self.contacts
            .iter()
            .filter_map(|id| {
                physics
                    .body_position(*id)
                    .map(|position| (*id, (position - self.pose.position).magnitude2()))
            })
            .min_by_key(|(_, distance)| OrderedFloat(*distance))
            .map(|(id, _)| id)
    }

    pub fn held(&self) -> Option<InteractableId> {
        self.held
    }

    pub(crate) fn grip(&mut self, object: InteractableId) {
        self.held = Some(object);
    }

    pub(crate) fn release_grip(&mut self) -> Option<InteractableId> {
        self.held.take()
    }

    pub fn pose(&self) -> &HandPose {
        &self.pose
    }

    pub fn set_pose(&mut self, pose: HandPose) {
        self.pose = pose;
    }

    /// Replica bookkeeping: the last position an owner reported.
    pub(crate) fn set_position(&mut self, position: Point3<f32>) {
        self.pose.position = position;
    }

    pub(crate) fn set_velocity(&mut self, linear: Vector3<f32>, angular: Vector3<f32>) {
        self.pose.linear_velocity = linear;
        self.pose.angular_velocity = angular;
    }

    pub fn pointer(&self) -> &PointerMarker {
        &self.pointer
    }

    pub fn update_pointer<P: PhysicsBackend + ?Sized>(
        &mut self,
        physics: &P,
        max_distance: f32,
    ) -> bool {
        self.pointer.update(&self.pose, physics, max_distance)
    }

    pub fn teleport(&self) -> &TeleportSequence {
        &self.teleport
    }

    pub fn is_teleporting(&self) -> bool {
        self.teleport.is_in_progress()
    }

    /// Start a teleport to the pointer target.
    ///
    /// No-op (`None`) without a pointer hit, while a teleport is running, or if
    /// the rig does not know this hand's player.
    pub fn try_teleport<R: CameraRig + ?Sized>(
        &mut self,
        rig: &R,
    ) -> Option<(Vector3<f32>, TeleportEvent)> {
        let target = self.pointer.target()?;
        if self.teleport.is_in_progress() {
            return None;
        }

        let head = rig.head_position(self.id.owner)?;
        let anchor = rig.anchor_position(self.id.owner)?;
        let translation = ground_translation(target, head, anchor);

        self.teleport
            .start(translation)
            .map(|event| (translation, event))
    }

    pub(crate) fn start_teleport(&mut self, translation: Vector3<f32>) -> Option<TeleportEvent> {
        self.teleport.start(translation)
    }

    pub(crate) fn advance_teleport(&mut self, dt: f32) -> Vec<TeleportEvent> {
        self.teleport.advance(dt)
    }

    pub(crate) fn next_sequence(&mut self) -> u64 {
        self.next_sequence += 1;
        self.next_sequence
    }

    /// Accept a replicated sequence number only if it is newer than the last
    /// one applied to this hand.
    pub(crate) fn accept_sequence(&mut self, sequence: u64) -> bool {
        match self.last_applied_sequence {
            Some(last) if sequence <= last => false,
            _ => {
                self.last_applied_sequence = Some(sequence);
                true
            }
        }
    }
}

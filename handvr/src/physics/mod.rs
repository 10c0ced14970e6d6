mod rapier_backend;
pub mod util;

pub use rapier_backend::RapierPhysics;

use cgmath::{Point3, Vector3};

use crate::error::HandResult;
use crate::hand::HandId;
use crate::interactable::InteractableId;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    pub point: Point3<f32>,
    pub distance: f32,
}

/// The physics engine as seen from the hands.
///
/// Mutators are fallible only for bookkeeping reasons (an id the backend has
/// never heard of); callers treat a failure as "nothing happened".
pub trait PhysicsBackend {
    fn body_position(&self, body: InteractableId) -> Option<Point3<f32>>;

    fn set_body_position(&mut self, body: InteractableId, position: Point3<f32>) -> HandResult<()>;

    /// Linear and angular velocity of a body.
    fn body_velocity(&self, body: InteractableId) -> Option<(Vector3<f32>, Vector3<f32>)>;

    fn set_body_velocity(
        &mut self,
        body: InteractableId,
        linear: Vector3<f32>,
        angular: Vector3<f32>,
    ) -> HandResult<()>;

    /// Keep the hand's physics proxy on the tracked controller position.
    fn move_hand(&mut self, hand: HandId, position: Point3<f32>) -> HandResult<()>;

    /// Whether [`Self::attach`] would succeed: both the hand proxy and the
    /// body are known.
    fn can_attach(&self, hand: HandId, body: InteractableId) -> bool;

    /// Rigidly attach `body` to `hand`, replacing any existing attachment.
    fn attach(&mut self, hand: HandId, body: InteractableId) -> HandResult<()>;

    /// Break the hand's attachment, if it has one.
    fn detach(&mut self, hand: HandId);

    fn cast_ray(
        &self,
        origin: Point3<f32>,
        direction: Vector3<f32>,
        max_distance: f32,
    ) -> Option<RayHit>;
}

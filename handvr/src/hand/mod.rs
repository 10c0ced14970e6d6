mod hand_controller;

pub use hand_controller::HandController;

use std::fmt;

use cgmath::{One, Point3, Quaternion, Rotation, Vector3, Zero, vec3};
use serde::{Deserialize, Serialize};

/// A participant in a shared session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PeerId(pub u32);

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "peer{}", self.0)
    }
}

/// Which controller a hand is bound to; doubles as the input source key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HandId {
    pub owner: PeerId,
    pub side: Handedness,
}

impl HandId {
    pub fn new(owner: PeerId, side: Handedness) -> Self {
        HandId { owner, side }
    }
}

impl fmt::Display for HandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = match self.side {
            Handedness::Left => "left",
            Handedness::Right => "right",
        };
        write!(f, "{}/{}", self.owner, side)
    }
}

/// Whether this peer originates a hand's transitions or only replays them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Authority {
    Owner,
    Replica,
}

/// Tracked controller state for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandPose {
    pub position: Point3<f32>,
    pub rotation: Quaternion<f32>,
    pub linear_velocity: Vector3<f32>,
    pub angular_velocity: Vector3<f32>,
}

impl HandPose {
    pub fn at(position: Point3<f32>) -> Self {
        HandPose {
            position,
            ..HandPose::default()
        }
    }

    pub fn with_rotation(mut self, rotation: Quaternion<f32>) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_velocity(
        mut self,
        linear_velocity: Vector3<f32>,
        angular_velocity: Vector3<f32>,
    ) -> Self {
        self.linear_velocity = linear_velocity;
        self.angular_velocity = angular_velocity;
        self
    }

    /// Pointing direction; controllers point down their local -Z.
    pub fn forward(&self) -> Vector3<f32> {
        self.rotation.rotate_vector(vec3(0.0, 0.0, -1.0))
    }
}

impl Default for HandPose {
    fn default() -> Self {
        HandPose {
            position: Point3::new(0.0, 0.0, 0.0),
            rotation: Quaternion::one(),
            linear_velocity: Vector3::zero(),
            angular_velocity: Vector3::zero(),
        }
    }
}

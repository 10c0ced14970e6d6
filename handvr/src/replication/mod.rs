mod channel_transport;

pub use channel_transport::{ChannelEndpoint, ChannelHub};

use cgmath::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::HandResult;
use crate::hand::HandId;
use crate::interactable::InteractableId;

/// A replicated hand transition.
///
/// Carries everything the owner resolved locally (which body, where the hand
/// was, how fast it moved) so replicas apply the identical transition instead
/// of re-deriving it from their own, possibly divergent, state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HandCommand {
    pub hand: HandId,
    /// Per-hand, strictly increasing on the owner.
    pub sequence: u64,
    pub op: HandOp,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum HandOp {
    Pickup {
        target: InteractableId,
        hand_position: Point3<f32>,
        /// Linear and angular velocity the target's previous holder releases
        /// it with, when the pickup takes it from another hand.
        previous_holder_velocity: Option<(Vector3<f32>, Vector3<f32>)>,
    },
    Drop {
        linear_velocity: Vector3<f32>,
        angular_velocity: Vector3<f32>,
    },
    Teleport {
        translation: Vector3<f32>,
    },
}

impl HandOp {
    pub fn name(&self) -> &'static str {
        match self {
            HandOp::Pickup { .. } => "pickup",
            HandOp::Drop { .. } => "drop",
            HandOp::Teleport { .. } => "teleport",
        }
    }
}

impl HandCommand {
    pub fn encode(&self) -> HandResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn decode(bytes: &[u8]) -> HandResult<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Delivers commands to every other participant of the session, in the order
/// they were broadcast.
pub trait CommandTransport {
    fn broadcast(&mut self, command: &HandCommand) -> HandResult<()>;

    /// Commands received from other peers since the last drain.
    fn drain(&mut self) -> Vec<HandCommand>;
}

/// Transport for a session with no other participants.
#[derive(Clone, Copy, Debug, Default)]
pub struct Offline;

impl CommandTransport for Offline {
    fn broadcast(&mut self, _command: &HandCommand) -> HandResult<()> {
        Ok(())
    }

    fn drain(&mut self) -> Vec<HandCommand> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HandError;
    use crate::hand::{Handedness, PeerId};
    use cgmath::vec3;

    #[test]
    fn test_wire_format_is_tagged_json() {
        let command = HandCommand {
            hand: HandId::new(PeerId(2), Handedness::Left),
            sequence: 4,
            op: HandOp::Teleport {
                translation: vec3(1.0, 0.0, -2.0),
            },
        };

        let bytes = command.encode().unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["op"]["op"], "teleport");
        assert_eq!(json["hand"]["side"], "Left");
        assert_eq!(HandCommand::decode(&bytes).unwrap(), command);
    }

    #[test]
    fn test_pickup_carries_previous_holder_velocity() {
        let command = HandCommand {
            hand: HandId::new(PeerId(1), Handedness::Right),
            sequence: 2,
            op: HandOp::Pickup {
                target: InteractableId(7),
                hand_position: Point3::new(0.0, 1.0, 0.0),
                previous_holder_velocity: Some((vec3(3.0, 0.0, 0.0), vec3(0.0, 1.0, 0.0))),
            },
        };

        let bytes = command.encode().unwrap();
        assert_eq!(HandCommand::decode(&bytes).unwrap(), command);

        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(json["op"]["previous_holder_velocity"].is_array());
    }

    #[test]
    fn test_offline_transport_hears_nothing() {
        let mut transport = Offline;
        let command = HandCommand {
            hand: HandId::new(PeerId(1), Handedness::Left),
            sequence: 1,
            op: HandOp::Teleport {
                translation: vec3(0.0, 0.0, 1.0),
            },
        };

        assert!(transport.broadcast(&command).is_ok());
        assert!(transport.drain().is_empty());
    }

    #[test]
    fn test_garbage_is_a_wire_error() {
        let err = HandCommand::decode(b"{\"hand\":").unwrap_err();
        assert!(matches!(err, HandError::Wire(_)));
    }
}

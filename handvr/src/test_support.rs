//! In-memory collaborators for unit tests.

use std::collections::HashMap;

use cgmath::{InnerSpace, Point3, Vector3, Zero, vec3};

use crate::config::HandConfig;
use crate::error::{HandError, HandResult};
use crate::hand::{HandId, PeerId};
use crate::interactable::InteractableId;
use crate::physics::{PhysicsBackend, RayHit};
use crate::presentation::{FadeColor, ScreenFader};
use crate::replication::{CommandTransport, HandCommand};
use crate::rig::SimpleRig;
use crate::world::InteractionWorld;

#[derive(Clone, Debug, PartialEq)]
pub enum PhysicsCall {
    SetPosition(InteractableId, Point3<f32>),
    SetVelocity(InteractableId, Vector3<f32>, Vector3<f32>),
    Attach(HandId, InteractableId),
    Detach(HandId),
}

#[derive(Clone, Debug)]
pub struct FakeBody {
    pub position: Point3<f32>,
    pub linear: Vector3<f32>,
    pub angular: Vector3<f32>,
}

/// Bodies are points, the only ray target is an optional infinite floor.
#[derive(Debug, Default)]
pub struct FakePhysics {
    pub bodies: HashMap<InteractableId, FakeBody>,
    pub hands: HashMap<HandId, Point3<f32>>,
    pub attachments: HashMap<HandId, InteractableId>,
    pub floor: Option<f32>,
    pub calls: Vec<PhysicsCall>,
}

impl FakePhysics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_floor(height: f32) -> Self {
        FakePhysics {
            floor: Some(height),
            ..Self::default()
        }
    }

    pub fn add_body(&mut self, id: InteractableId, position: Point3<f32>) {
        self.bodies.insert(
            id,
            FakeBody {
                position,
                linear: Vector3::zero(),
                angular: Vector3::zero(),
            },
        );
    }
}

impl PhysicsBackend for FakePhysics {
    fn body_position(&self, body: InteractableId) -> Option<Point3<f32>> {
        self.bodies.get(&body).map(|b| b.position)
    }

    fn set_body_position(&mut self, body: InteractableId, position: Point3<f32>) -> HandResult<()> {
        let b = self.bodies.get_mut(&body).ok_or(HandError::UnknownBody(body))?;
        b.position = position;
        self.calls.push(PhysicsCall::SetPosition(body, position));
        Ok(())
    }

    fn body_velocity(&self, body: InteractableId) -> Option<(Vector3<f32>, Vector3<f32>)> {
        self.bodies.get(&body).map(|b| (b.linear, b.angular))
    }

    fn set_body_velocity(
        &mut self,
        body: InteractableId,
        linear: Vector3<f32>,
        angular: Vector3<f32>,
    ) -> HandResult<()> {
        let b = self.bodies.get_mut(&body).ok_or(HandError::UnknownBody(body))?;
        b.linear = linear;
        b.angular = angular;
        self.calls.push(PhysicsCall::SetVelocity(body, linear, angular));
        Ok(())
    }

    fn move_hand(&mut self, hand: HandId, position: Point3<f32>) -> HandResult<()> {
        self.hands.insert(hand, position);
        Ok(())
    }

    fn can_attach(&self, hand: HandId, body: InteractableId) -> bool {
        self.hands.contains_key(&hand) && self.bodies.contains_key(&body)
    }

    fn attach(&mut self, hand: HandId, body: InteractableId) -> HandResult<()> {
        if !self.hands.contains_key(&hand) {
            return Err(HandError::UnknownHand(hand));
        }
        if !self.bodies.contains_key(&body) {
            return Err(HandError::UnknownBody(body));
        }
        self.attachments.insert(hand, body);
        self.calls.push(PhysicsCall::Attach(hand, body));
        Ok(())
    }

    fn detach(&mut self, hand: HandId) {
        self.attachments.remove(&hand);
        self.calls.push(PhysicsCall::Detach(hand));
    }

    fn cast_ray(
        &self,
        origin: Point3<f32>,
        direction: Vector3<f32>,
        max_distance: f32,
    ) -> Option<RayHit> {
        let floor = self.floor?;
        let direction = direction.normalize();
        if direction.y >= 0.0 || origin.y < floor {
            return None;
        }
        let distance = (floor - origin.y) / direction.y;
        (distance <= max_distance).then(|| RayHit {
            point: origin + direction * distance,
            distance,
        })
    }
}

#[derive(Debug, Default)]
pub struct RecordingFader {
    pub fades: Vec<(FadeColor, f32)>,
}

impl ScreenFader for RecordingFader {
    fn start_fade(&mut self, color: FadeColor, duration: f32) {
        self.fades.push((color, duration));
    }
}

/// Keeps what was broadcast; tests push into `incoming` to simulate peers.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    pub sent: Vec<HandCommand>,
    pub incoming: Vec<HandCommand>,
}

impl CommandTransport for RecordingTransport {
    fn broadcast(&mut self, command: &HandCommand) -> HandResult<()> {
        self.sent.push(command.clone());
        Ok(())
    }

    fn drain(&mut self) -> Vec<HandCommand> {
        std::mem::take(&mut self.incoming)
    }
}

pub type TestWorld = InteractionWorld<FakePhysics, SimpleRig, RecordingFader, RecordingTransport>;

pub const HEAD_HEIGHT: f32 = 1.5;

/// World for `local` with a floor at y = 0 and every player in `players`
/// standing at the origin.
pub fn test_world(local: PeerId, players: &[PeerId]) -> TestWorld {
    let mut rig = SimpleRig::new();
    for player in players.iter().chain(std::iter::once(&local)) {
        rig.insert_player(*player, Point3::new(0.0, 0.0, 0.0), vec3(0.0, HEAD_HEIGHT, 0.0));
    }

    InteractionWorld::new(
        local,
        HandConfig::default(),
        FakePhysics::with_floor(0.0),
        rig,
        RecordingFader::default(),
        RecordingTransport::default(),
    )
}

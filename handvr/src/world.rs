use std::collections::BTreeMap;

use cgmath::{Point3, Vector3};

use crate::config::HandConfig;
use crate::hand::{Authority, HandController, HandId, Handedness, PeerId};
use crate::input::{HandAction, InputSource};
use crate::interactable::{InteractableId, InteractableRegistry, ObjectTags};
use crate::physics::PhysicsBackend;
use crate::presentation::ScreenFader;
use crate::replication::{CommandTransport, HandCommand, HandOp};
use crate::rig::CameraRig;
use crate::teleport::TeleportEvent;

/// Every hand in a session as seen from one peer.
///
/// Local hands are driven by input and broadcast what they do; remote hands
/// replay those broadcasts. Both go through the same attach/release paths so
/// the holder invariant (`registry.holder(o) == Some(h)` iff
/// `hand(h).held() == Some(o)`) is kept in one place.
pub struct InteractionWorld<P, R, F, T> {
    local_peer: PeerId,
    config: HandConfig,
    hands: BTreeMap<HandId, HandController>,
    interactables: InteractableRegistry,
    physics: P,
    rig: R,
    fader: F,
    transport: T,
}

impl<P, R, F, T> InteractionWorld<P, R, F, T>
where
    P: PhysicsBackend,
    R: CameraRig,
    F: ScreenFader,
    T: CommandTransport,
{
    pub fn new(
        local_peer: PeerId,
        config: HandConfig,
        physics: P,
        rig: R,
        fader: F,
        transport: T,
    ) -> Self {
        InteractionWorld {
            local_peer,
            config,
            hands: BTreeMap::new(),
            interactables: InteractableRegistry::new(),
            physics,
            rig,
            fader,
            transport,
        }
    }

    pub fn local_peer(&self) -> PeerId {
        self.local_peer
    }

    pub fn config(&self) -> &HandConfig {
        &self.config
    }

    /// Add one of this peer's own hands. Registering twice keeps the first.
    pub fn register_hand(&mut self, side: Handedness) -> HandId {
        let id = HandId::new(self.local_peer, side);
        if !self.hands.contains_key(&id) {
            crate::hand_log!(INFO, hand = %id, "registered local hand");
            self.hands
                .insert(id, HandController::new(id, Authority::Owner, &self.config));
        }
        id
    }

    /// Add a replica of another peer's hand. Returns false for hands this peer
    /// owns or already knows.
    pub fn register_remote_hand(&mut self, hand: HandId) -> bool {
        if hand.owner == self.local_peer {
            crate::hand_log!(WARN, %hand, "refusing to register a local hand as a replica");
            return false;
        }
        if self.hands.contains_key(&hand) {
            return false;
        }

        crate::hand_log!(INFO, %hand, "registered remote hand");
        self.hands
            .insert(hand, HandController::new(hand, Authority::Replica, &self.config));
        true
    }

    /// Destroy a hand: whatever it holds is released with its last velocity.
    pub fn remove_hand(&mut self, hand: HandId) -> Option<HandController> {
        let pose = *self.hands.get(&hand)?.pose();
        self.release(hand, pose.linear_velocity, pose.angular_velocity);
        self.physics.detach(hand);

        crate::hand_log!(INFO, %hand, "removed hand");
        self.hands.remove(&hand)
    }

    pub fn hand(&self, hand: HandId) -> Option<&HandController> {
        self.hands.get(&hand)
    }

    /// All hands in `HandId` order.
    pub fn hands(&self) -> impl Iterator<Item = &HandController> {
        self.hands.values()
    }

    pub fn interactables(&self) -> &InteractableRegistry {
        &self.interactables
    }

    pub fn physics(&self) -> &P {
        &self.physics
    }

    pub fn physics_mut(&mut self) -> &mut P {
        &mut self.physics
    }

    pub fn rig(&self) -> &R {
        &self.rig
    }

    pub fn rig_mut(&mut self) -> &mut R {
        &mut self.rig
    }

    pub fn fader(&self) -> &F {
        &self.fader
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn on_proximity_enter(&mut self, hand: HandId, object: InteractableId, tags: ObjectTags) {
        if let Some(controller) = self.hands.get_mut(&hand) {
            if controller.on_proximity_enter(object, tags) {
                crate::hand_log!(TRACE, %hand, %object, "entered proximity");
            }
        }
    }

    pub fn on_proximity_exit(&mut self, hand: HandId, object: InteractableId, tags: ObjectTags) {
        if let Some(controller) = self.hands.get_mut(&hand) {
            if controller.on_proximity_exit(object, tags) {
                crate::hand_log!(TRACE, %hand, %object, "left proximity");
            }
        }
    }

    /// The object is gone from the scene: forget it everywhere.
    pub fn despawn_interactable(&mut self, object: InteractableId) {
        for controller in self.hands.values_mut() {
            controller.forget(object);
        }

        if let Some(holder) = self.interactables.holder(object) {
            if let Some(controller) = self.hands.get_mut(&holder) {
                controller.release_grip();
            }
            self.physics.detach(holder);
        }

        if self.interactables.remove(object).is_some() {
            crate::hand_log!(DEBUG, %object, "despawned interactable");
        }
    }

    /// Advance one frame.
    pub fn tick<I: InputSource + ?Sized>(&mut self, input: &I, dt: f32) {
        // Sequences started by this tick's remote commands wait for the next
        // tick, as the owner's own do.
        let running = self.running_teleports();

        for command in self.transport.drain() {
            self.apply_remote(command);
        }

        self.advance_teleports(running, dt);

        let local: Vec<HandId> = self
            .hands
            .keys()
            .filter(|id| id.owner == self.local_peer)
            .copied()
            .collect();

        for hand in local {
            if let Some(pose) = input.pose(hand.side) {
                if let Some(controller) = self.hands.get_mut(&hand) {
                    controller.set_pose(pose);
                }
                if let Err(err) = self.physics.move_hand(hand, pose.position) {
                    crate::physics_log!(WARN, %hand, "failed to move hand proxy: {}", err);
                }
            }

            if input.pressed(HandAction::Grab, hand.side) {
                self.pickup(hand);
            }
            if input.released(HandAction::Grab, hand.side) {
                self.drop_held(hand);
            }

            self.update_pointer(hand);

            if input.released(HandAction::Teleport, hand.side) {
                self.try_teleport(hand);
            }
        }
    }

    /// Grab the nearest candidate with a local hand.
    ///
    /// An object this hand already holds is dropped (and the drop broadcast)
    /// first. Nothing is released unless the attachment can be made.
    pub fn pickup(&mut self, hand: HandId) -> Option<InteractableId> {
        let controller = self.hands.get(&hand)?;
        if !controller.is_owner() {
            crate::hand_log!(WARN, %hand, "pickup requested on a replica");
            return None;
        }

        let target = controller.nearest_interactable(&self.physics)?;
        let hand_position = controller.pose().position;
        let held = controller.held();

        if held == Some(target) {
            return None;
        }
        if !self.physics.can_attach(hand, target) {
            crate::physics_log!(WARN, %hand, object = %target, "cannot attach, pickup skipped");
            return None;
        }

        if held.is_some() {
            self.drop_held(hand);
        }

        let previous_holder_velocity = self
            .interactables
            .holder(target)
            .filter(|previous| *previous != hand)
            .map(|previous| self.last_velocity(previous));

        if !self.attach(hand, target, hand_position, previous_holder_velocity) {
            return None;
        }

        let sequence = self.next_sequence(hand)?;
        self.broadcast(HandCommand {
            hand,
            sequence,
            op: HandOp::Pickup {
                target,
                hand_position,
                previous_holder_velocity,
            },
        });
        Some(target)
    }

    /// Release whatever a local hand holds, throwing it with the hand's velocity.
    pub fn drop_held(&mut self, hand: HandId) -> Option<InteractableId> {
        let controller = self.hands.get(&hand)?;
        if !controller.is_owner() || controller.held().is_none() {
            return None;
        }

        let pose = *controller.pose();
        let released = self.release(hand, pose.linear_velocity, pose.angular_velocity)?;

        let sequence = self.next_sequence(hand)?;
        self.broadcast(HandCommand {
            hand,
            sequence,
            op: HandOp::Drop {
                linear_velocity: pose.linear_velocity,
                angular_velocity: pose.angular_velocity,
            },
        });
        Some(released)
    }

    pub fn update_pointer(&mut self, hand: HandId) -> bool {
        let max_distance = self.config.pointer_max_distance();
        match self.hands.get_mut(&hand) {
            Some(controller) => controller.update_pointer(&self.physics, max_distance),
            None => false,
        }
    }

    /// Start a teleport toward the pointer target of a local hand.
    pub fn try_teleport(&mut self, hand: HandId) -> bool {
        let Some(controller) = self.hands.get_mut(&hand) else {
            return false;
        };
        if !controller.is_owner() {
            return false;
        }

        let Some((translation, event)) = controller.try_teleport(&self.rig) else {
            return false;
        };
        let sequence = controller.next_sequence();

        crate::teleport_log!(
            INFO,
            %hand,
            "teleporting by ({:.2}, {:.2}, {:.2})",
            translation.x,
            translation.y,
            translation.z
        );
        self.run_teleport_events(hand, [event]);
        self.broadcast(HandCommand {
            hand,
            sequence,
            op: HandOp::Teleport { translation },
        });
        true
    }

    /// Replay a command from another peer. Returns whether it was applied.
    pub fn apply_remote(&mut self, command: HandCommand) -> bool {
        let hand = command.hand;
        if hand.owner == self.local_peer {
            crate::replication_log!(
                WARN,
                %hand,
                seq = command.sequence,
                "ignoring {} for a hand this peer owns",
                command.op.name()
            );
            return false;
        }

        let config = &self.config;
        let controller = self.hands.entry(hand).or_insert_with(|| {
            crate::replication_log!(INFO, %hand, "first command from unknown hand, creating replica");
            HandController::new(hand, Authority::Replica, config)
        });

        if !controller.accept_sequence(command.sequence) {
            crate::replication_log!(
                DEBUG,
                %hand,
                seq = command.sequence,
                "dropping stale {}",
                command.op.name()
            );
            return false;
        }

        crate::replication_log!(DEBUG, %hand, seq = command.sequence, "applying {}", command.op.name());

        match command.op {
            HandOp::Pickup {
                target,
                hand_position,
                previous_holder_velocity,
            } => {
                controller.set_position(hand_position);
                if let Err(err) = self.physics.move_hand(hand, hand_position) {
                    crate::physics_log!(WARN, %hand, "failed to move hand proxy: {}", err);
                }
                self.attach(hand, target, hand_position, previous_holder_velocity);
            }
            HandOp::Drop {
                linear_velocity,
                angular_velocity,
            } => {
                controller.set_velocity(linear_velocity, angular_velocity);
                self.release(hand, linear_velocity, angular_velocity);
            }
            HandOp::Teleport { translation } => match controller.start_teleport(translation) {
                Some(event) => self.run_teleport_events(hand, [event]),
                None => {
                    // Still finishing the previous one; keep the anchor in step.
                    crate::teleport_log!(WARN, %hand, "replica busy, translating without fade");
                    self.rig.translate_anchor(hand.owner, translation);
                }
            },
        }
        true
    }

    /// Attach `object` to `hand`, taking it from any other holder first.
    ///
    /// The previous holder releases with `previous_holder_velocity`, which the
    /// originating peer resolved so every peer throws the object the same way.
    /// Returns false, with nothing released, if the physics backend cannot make
    /// the attachment.
    fn attach(
        &mut self,
        hand: HandId,
        object: InteractableId,
        position: Point3<f32>,
        previous_holder_velocity: Option<(Vector3<f32>, Vector3<f32>)>,
    ) -> bool {
        let Some(current) = self.hands.get(&hand).map(|controller| controller.held()) else {
            return false;
        };
        if current == Some(object) {
            return true;
        }
        if !self.physics.can_attach(hand, object) {
            crate::physics_log!(WARN, %hand, %object, "cannot attach");
            return false;
        }

        if let Some(previous) = self.interactables.holder(object) {
            if previous != hand {
                crate::hand_log!(DEBUG, %hand, from = %previous, %object, "taking held object");
                let (linear, angular) =
                    previous_holder_velocity.unwrap_or_else(|| self.last_velocity(previous));
                self.release(previous, linear, angular);
            }
        }

        if current.is_some() {
            // Owners broadcast a drop before swapping, so only a replica that
            // missed it gets here.
            let (linear, angular) = self.last_velocity(hand);
            self.release(hand, linear, angular);
        }

        if let Err(err) = self.physics.set_body_position(object, position) {
            crate::physics_log!(WARN, %hand, %object, "failed to move grabbed body: {}", err);
        }
        if let Err(err) = self.physics.attach(hand, object) {
            crate::physics_log!(WARN, %hand, %object, "attach failed: {}", err);
            return false;
        }

        if let Some(controller) = self.hands.get_mut(&hand) {
            controller.grip(object);
        }
        self.interactables.set_holder(object, hand);
        crate::hand_log!(DEBUG, %hand, %object, "picked up");
        true
    }

    fn release(
        &mut self,
        hand: HandId,
        linear_velocity: Vector3<f32>,
        angular_velocity: Vector3<f32>,
    ) -> Option<InteractableId> {
        let object = self.hands.get_mut(&hand)?.release_grip()?;

        if let Err(err) = self
            .physics
            .set_body_velocity(object, linear_velocity, angular_velocity)
        {
            crate::physics_log!(WARN, %hand, %object, "failed to set release velocity: {}", err);
        }
        self.physics.detach(hand);
        self.interactables.release(object, hand);

        crate::hand_log!(
            DEBUG,
            %hand,
            %object,
            "dropped with velocity ({:.2}, {:.2}, {:.2})",
            linear_velocity.x,
            linear_velocity.y,
            linear_velocity.z
        );
        Some(object)
    }

    fn last_velocity(&self, hand: HandId) -> (Vector3<f32>, Vector3<f32>) {
        let pose = self
            .hands
            .get(&hand)
            .map(|controller| *controller.pose())
            .unwrap_or_default();
        (pose.linear_velocity, pose.angular_velocity)
    }

    fn running_teleports(&self) -> Vec<HandId> {
        self.hands
            .values()
            .filter(|controller| controller.is_teleporting())
            .map(|controller| controller.id())
            .collect()
    }

    fn advance_teleports(&mut self, running: Vec<HandId>, dt: f32) {
        for hand in running {
            let events = match self.hands.get_mut(&hand) {
                Some(controller) => controller.advance_teleport(dt),
                None => continue,
            };
            self.run_teleport_events(hand, events);
        }
    }

    fn run_teleport_events(&mut self, hand: HandId, events: impl IntoIterator<Item = TeleportEvent>) {
        // Fades are the owner's presentation; replicas only move the anchor.
        let presents = hand.owner == self.local_peer;

        for event in events {
            match event {
                TeleportEvent::BeginFadeOut { duration } => {
                    if presents {
                        self.fader.start_fade(self.config.fade_color, duration);
                    }
                }
                TeleportEvent::ApplyTranslation(delta) => {
                    self.rig.translate_anchor(hand.owner, delta);
                    crate::teleport_log!(DEBUG, %hand, "anchor translated");
                }
                TeleportEvent::BeginFadeIn { duration } => {
                    if presents {
                        self.fader
                            .start_fade(self.config.fade_color.transparent(), duration);
                    }
                }
                TeleportEvent::Completed => {
                    crate::teleport_log!(DEBUG, %hand, "teleport complete");
                }
            }
        }
    }

    fn next_sequence(&mut self, hand: HandId) -> Option<u64> {
        self.hands
            .get_mut(&hand)
            .map(|controller| controller.next_sequence())
    }

    fn broadcast(&mut self, command: HandCommand) {
        crate::replication_log!(
            DEBUG,
            hand = %command.hand,
            seq = command.sequence,
            "broadcasting {}",
            command.op.name()
        );
        if let Err(err) = self.transport.broadcast(&command) {
            crate::replication_log!(WARN, hand = %command.hand, "broadcast failed: {}", err);
        }
    }
}

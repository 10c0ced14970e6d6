// handvr - networked VR hand interaction
//
// Grab/drop of physics objects, proximity tracking, pointer-driven teleport with
// a screen fade, and replication of those transitions to every peer observing
// the same hand. Physics, input, presentation and transport are collaborators
// reached through the traits in `input`, `physics`, `presentation`, `rig` and
// `replication`.

pub mod logging;

pub mod config;
pub mod error;
pub mod hand;
pub mod input;
pub mod interactable;
pub mod physics;
pub mod presentation;
pub mod replication;
pub mod rig;
pub mod teleport;
pub mod world;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::HandConfig;
pub use error::{HandError, HandResult};
pub use hand::{Authority, HandController, HandId, HandPose, Handedness, PeerId};
pub use input::{ButtonTracker, HandAction, InputSnapshot, InputSource};
pub use interactable::{Interactable, InteractableId, InteractableRegistry, ObjectTags};
pub use physics::{PhysicsBackend, RapierPhysics, RayHit};
pub use presentation::{FadeColor, NoFade, ScreenFader};
pub use replication::{ChannelEndpoint, ChannelHub, CommandTransport, HandCommand, HandOp, Offline};
pub use rig::{CameraRig, SimpleRig};
pub use teleport::{PointerMarker, TeleportEvent, TeleportPhase, TeleportSequence};
pub use world::InteractionWorld;

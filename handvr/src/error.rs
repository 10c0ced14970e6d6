use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::hand::HandId;
use crate::interactable::InteractableId;

/// Infrastructure failures.
///
/// Hand operations themselves never fail: an absent target, an empty hand or a
/// teleport already underway are no-ops. These variants cover the plumbing
/// around them (config, wire format, collaborator lookups).
#[derive(Debug, Error)]
pub enum HandError {
    #[error("failed to read config '{}'", path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("hand command wire error: {0}")]
    Wire(#[from] serde_json::Error),

    #[error("no physics body registered for interactable {0}")]
    UnknownBody(InteractableId),

    #[error("no physics body registered for hand {0}")]
    UnknownHand(HandId),

    #[error("transport to peer {0} is disconnected")]
    TransportClosed(u32),
}

pub type HandResult<T> = Result<T, HandError>;

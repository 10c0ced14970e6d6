use std::collections::HashMap;
use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::hand::HandId;

/// Opaque id of a grabbable physics body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InteractableId(pub u64);

impl fmt::Display for InteractableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

bitflags! {
    /// Categories carried by proximity notifications.
    pub struct ObjectTags: u32 {
        const INTERACTABLE = 0b0000_0001;
        const TELEPORT_SURFACE = 0b0000_0010;
    }
}

impl ObjectTags {
    pub fn is_interactable(&self) -> bool {
        self.contains(ObjectTags::INTERACTABLE)
    }
}

/// Grab bookkeeping for one body. `holder` is a plain id, never an owning
/// reference, so hands and objects can be dropped in any order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Interactable {
    pub id: InteractableId,
    pub holder: Option<HandId>,
}

#[derive(Debug, Default)]
pub struct InteractableRegistry {
    entries: HashMap<InteractableId, Interactable>,
}

impl InteractableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: InteractableId) -> Option<&Interactable> {
        self.entries.get(&id)
    }

    pub fn holder(&self, id: InteractableId) -> Option<HandId> {
        self.entries.get(&id).and_then(|entry| entry.holder)
    }

    pub fn set_holder(&mut self, id: InteractableId, hand: HandId) {
        self.entries
            .entry(id)
            .or_insert(Interactable { id, holder: None })
            .holder = Some(hand);
    }

    /// Clear the holder of `id`, but only if it is still `hand`.
    pub fn release(&mut self, id: InteractableId, hand: HandId) -> bool {
        match self.entries.get_mut(&id) {
            Some(entry) if entry.holder == Some(hand) => {
                entry.holder = None;
                true
            }
            _ => false,
        }
    }

    pub fn remove(&mut self, id: InteractableId) -> Option<Interactable> {
        self.entries.remove(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hand::{Handedness, PeerId};

    #[test]
    fn test_release_only_clears_matching_holder() {
        let left = HandId::new(PeerId(1), Handedness::Left);
        let right = HandId::new(PeerId(1), Handedness::Right);
        let id = InteractableId(5);

        let mut registry = InteractableRegistry::new();
        registry.set_holder(id, left);

        assert!(!registry.release(id, right));
        assert_eq!(registry.holder(id), Some(left));

        assert!(registry.release(id, left));
        assert_eq!(registry.holder(id), None);
    }

    #[test]
    fn test_tags_gate_interactable() {
        assert!(ObjectTags::INTERACTABLE.is_interactable());
        assert!((ObjectTags::INTERACTABLE | ObjectTags::TELEPORT_SURFACE).is_interactable());
        assert!(!ObjectTags::TELEPORT_SURFACE.is_interactable());
        assert!(!ObjectTags::empty().is_interactable());
    }
}

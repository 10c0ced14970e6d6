use std::collections::HashMap;

use cgmath::{Point3, Vector3};

use crate::hand::PeerId;

/// Tracking-space anchors for every player on this peer.
///
/// The anchor is the rig origin teleports move; the head is tracked relative
/// to it and follows along.
pub trait CameraRig {
    fn head_position(&self, player: PeerId) -> Option<Point3<f32>>;

    fn anchor_position(&self, player: PeerId) -> Option<Point3<f32>>;

    fn translate_anchor(&mut self, player: PeerId, delta: Vector3<f32>);
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct RigState {
    anchor: Point3<f32>,
    head_offset: Vector3<f32>,
}

/// Map-backed rig: an anchor per player plus a head offset from it.
#[derive(Clone, Debug, Default)]
pub struct SimpleRig {
    players: HashMap<PeerId, RigState>,
}

impl SimpleRig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_player(&mut self, player: PeerId, anchor: Point3<f32>, head_offset: Vector3<f32>) {
        self.players.insert(player, RigState { anchor, head_offset });
    }

    /// Headset moved within the play space.
    pub fn set_head_offset(&mut self, player: PeerId, head_offset: Vector3<f32>) {
        if let Some(state) = self.players.get_mut(&player) {
            state.head_offset = head_offset;
        }
    }
}

impl CameraRig for SimpleRig {
    fn head_position(&self, player: PeerId) -> Option<Point3<f32>> {
        self.players
            .get(&player)
            .map(|state| state.anchor + state.head_offset)
    }

    fn anchor_position(&self, player: PeerId) -> Option<Point3<f32>> {
        self.players.get(&player).map(|state| state.anchor)
    }

    fn translate_anchor(&mut self, player: PeerId, delta: Vector3<f32>) {
        if let Some(state) = self.players.get_mut(&player) {
            state.anchor += delta;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::vec3;

    #[test]
    fn test_head_follows_anchor() {
        let player = PeerId(3);
        let mut rig = SimpleRig::new();
        rig.insert_player(player, Point3::new(0.0, 0.0, 0.0), vec3(0.25, 1.5, 0.5));

        rig.translate_anchor(player, vec3(2.0, 0.0, -1.0));

        assert_eq!(rig.anchor_position(player), Some(Point3::new(2.0, 0.0, -1.0)));
        assert_eq!(rig.head_position(player), Some(Point3::new(2.25, 1.5, -0.5)));
    }

    #[test]
    fn test_unknown_player_is_ignored() {
        let mut rig = SimpleRig::new();
        rig.translate_anchor(PeerId(9), vec3(1.0, 0.0, 0.0));
        assert_eq!(rig.anchor_position(PeerId(9)), None);
    }
}

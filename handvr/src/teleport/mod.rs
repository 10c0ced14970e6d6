// VR Teleport Movement
//
// Point at a surface, release the teleport button, and the player's rig jumps
// there behind a fade to black so the translation is never seen.

pub mod pointer;
pub mod teleport_sequence;

pub use pointer::PointerMarker;
pub use teleport_sequence::{TeleportEvent, TeleportPhase, TeleportSequence};

use cgmath::{Point3, Vector3};

/// Horizontal move that puts the player's head above `target`.
///
/// The head is projected onto the anchor's floor height so only the ground-plane
/// offset of the head from the anchor is cancelled; the anchor's vertical
/// position moves to the target height.
pub fn ground_translation(
    target: Point3<f32>,
    head: Point3<f32>,
    anchor: Point3<f32>,
) -> Vector3<f32> {
    let ground = Point3::new(head.x, anchor.y, head.z);
    target - ground
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::vec3;

    #[test]
    fn test_ground_translation_ignores_head_height() {
        let translation = ground_translation(
            Point3::new(5.0, 0.0, -3.0),
            Point3::new(1.0, 1.7, 1.0),
            Point3::new(0.5, 0.0, 0.5),
        );
        assert_eq!(translation, vec3(4.0, 0.0, -4.0));
    }

    #[test]
    fn test_ground_translation_climbs_to_target_height() {
        let translation = ground_translation(
            Point3::new(0.0, 2.0, 0.0),
            Point3::new(0.0, 1.7, 0.0),
            Point3::new(0.0, 0.0, 0.0),
        );
        assert_eq!(translation, vec3(0.0, 2.0, 0.0));
    }
}

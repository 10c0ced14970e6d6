use cgmath::Point3;

use crate::hand::HandPose;
use crate::physics::PhysicsBackend;

/// Teleport destination marker driven by a ray from the hand each frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerMarker {
    target: Option<Point3<f32>>,
}

impl PointerMarker {
    /// Re-cast the pointer ray. Returns whether it hit anything.
    ///
    /// A miss hides the marker and invalidates the previous target.
    pub fn update<P: PhysicsBackend + ?Sized>(
        &mut self,
        pose: &HandPose,
        physics: &P,
        max_distance: f32,
    ) -> bool {
        self.target = physics
            .cast_ray(pose.position, pose.forward(), max_distance)
            .map(|hit| hit.point);
        self.target.is_some()
    }

    pub fn is_visible(&self) -> bool {
        self.target.is_some()
    }

    pub fn target(&self) -> Option<Point3<f32>> {
        self.target
    }
}

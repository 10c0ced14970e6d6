use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::config::HandConfig;
use crate::hand::{HandPose, Handedness};

/// Logical controller actions the hands react to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandAction {
    Grab,
    Teleport,
    /// Exposed by the input layer; no hand operation is bound to it.
    Click,
}

/// Per-frame controller state supplied by the VR runtime.
pub trait InputSource {
    /// `action` went down this frame.
    fn pressed(&self, action: HandAction, side: Handedness) -> bool;

    /// `action` came up this frame.
    fn released(&self, action: HandAction, side: Handedness) -> bool;

    fn pose(&self, side: Handedness) -> Option<HandPose>;
}

/// One frame of input, built explicitly or by a [`ButtonTracker`].
#[derive(Clone, Debug, Default)]
pub struct InputSnapshot {
    poses: HashMap<Handedness, HandPose>,
    pressed: HashSet<(HandAction, Handedness)>,
    released: HashSet<(HandAction, Handedness)>,
}

impl InputSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pose(mut self, side: Handedness, pose: HandPose) -> Self {
        self.set_pose(side, pose);
        self
    }

    pub fn with_press(mut self, action: HandAction, side: Handedness) -> Self {
        self.pressed.insert((action, side));
        self
    }

    pub fn with_release(mut self, action: HandAction, side: Handedness) -> Self {
        self.released.insert((action, side));
        self
    }

    pub fn set_pose(&mut self, side: Handedness, pose: HandPose) {
        self.poses.insert(side, pose);
    }
}

impl InputSource for InputSnapshot {
    fn pressed(&self, action: HandAction, side: Handedness) -> bool {
        self.pressed.contains(&(action, side))
    }

    fn released(&self, action: HandAction, side: Handedness) -> bool {
        self.released.contains(&(action, side))
    }

    fn pose(&self, side: Handedness) -> Option<HandPose> {
        self.poses.get(&side).copied()
    }
}

const CLICK_THRESHOLD: f32 = 0.5;

/// Turns analog button levels into press/release edges.
///
/// Runtimes that only see trigger and grip values feed them here every frame
/// and hand the resulting [`InputSnapshot`] to the world.
#[derive(Clone, Debug)]
pub struct ButtonTracker {
    grab_threshold: f32,
    teleport_threshold: f32,
    was_pressed: HashMap<(HandAction, Handedness), bool>,
}

impl ButtonTracker {
    pub fn new(config: &HandConfig) -> Self {
        ButtonTracker {
            grab_threshold: config.grab_threshold,
            teleport_threshold: config.teleport_threshold,
            was_pressed: HashMap::new(),
        }
    }

    fn threshold(&self, action: HandAction) -> f32 {
        match action {
            HandAction::Grab => self.grab_threshold,
            HandAction::Teleport => self.teleport_threshold,
            HandAction::Click => CLICK_THRESHOLD,
        }
    }

    /// Record this frame's `level` for `action`, adding any edge to `snapshot`.
    pub fn feed(
        &mut self,
        snapshot: &mut InputSnapshot,
        action: HandAction,
        side: Handedness,
        level: f32,
    ) {
        let is_pressed = level >= self.threshold(action);
        let was_pressed = self
            .was_pressed
            .insert((action, side), is_pressed)
            .unwrap_or(false);

        if is_pressed && !was_pressed {
            crate::input_log!(DEBUG, ?side, ?action, "button down");
            snapshot.pressed.insert((action, side));
        } else if !is_pressed && was_pressed {
            crate::input_log!(DEBUG, ?side, ?action, "button up");
            snapshot.released.insert((action, side));
        }
    }

    pub fn is_held(&self, action: HandAction, side: Handedness) -> bool {
        self.was_pressed
            .get(&(action, side))
            .copied()
            .unwrap_or(false)
    }
}

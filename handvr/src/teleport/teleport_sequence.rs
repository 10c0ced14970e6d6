use cgmath::{Vector3, Zero};

/// Where a teleport currently is. `Translating` is passed through inside a
/// single [`TeleportSequence::advance`] call once the fade-out completes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TeleportPhase {
    Idle,
    FadingOut { elapsed: f32 },
    Translating,
    FadingIn { elapsed: f32 },
}

/// Side effects the owner of the sequence must carry out, in order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TeleportEvent {
    BeginFadeOut { duration: f32 },
    ApplyTranslation(Vector3<f32>),
    BeginFadeIn { duration: f32 },
    Completed,
}

/// Fade out, move the rig, fade back in.
///
/// Started sequences always run to completion and a start request while one is
/// running is rejected. Each fade phase lasts at least `fade_duration` of
/// accumulated tick time; time overshooting a phase is dropped, never carried
/// into the next one.
#[derive(Clone, Debug)]
pub struct TeleportSequence {
    phase: TeleportPhase,
    translation: Vector3<f32>,
    fade_duration: f32,
}

impl TeleportSequence {
    pub fn new(fade_duration: f32) -> Self {
        TeleportSequence {
            phase: TeleportPhase::Idle,
            translation: Vector3::zero(),
            fade_duration: fade_duration.max(0.0),
        }
    }

    pub fn phase(&self) -> TeleportPhase {
        self.phase
    }

    pub fn fade_duration(&self) -> f32 {
        self.fade_duration
    }

    pub fn is_in_progress(&self) -> bool {
        self.phase != TeleportPhase::Idle
    }

    /// Translation of the running (or last) sequence.
    pub fn translation(&self) -> Vector3<f32> {
        self.translation
    }

    /// Begin a teleport, or `None` if one is already underway.
    pub fn start(&mut self, translation: Vector3<f32>) -> Option<TeleportEvent> {
        if self.is_in_progress() {
            return None;
        }

        self.translation = translation;
        self.phase = TeleportPhase::FadingOut { elapsed: 0.0 };
        Some(TeleportEvent::BeginFadeOut {
            duration: self.fade_duration,
        })
    }

    pub fn advance(&mut self, dt: f32) -> Vec<TeleportEvent> {
        let dt = dt.max(0.0);
        let mut events = Vec::new();

        match self.phase {
            TeleportPhase::Idle | TeleportPhase::Translating => {}
            TeleportPhase::FadingOut { elapsed } => {
                let elapsed = elapsed + dt;
                self.phase = if elapsed >= self.fade_duration {
                    TeleportPhase::Translating
                } else {
                    TeleportPhase::FadingOut { elapsed }
                };
            }
            TeleportPhase::FadingIn { elapsed } => {
                let elapsed = elapsed + dt;
                if elapsed >= self.fade_duration {
                    self.phase = TeleportPhase::Idle;
                    events.push(TeleportEvent::Completed);
                } else {
                    self.phase = TeleportPhase::FadingIn { elapsed };
                }
            }
        }

        if self.phase == TeleportPhase::Translating {
            events.push(TeleportEvent::ApplyTranslation(self.translation));
            events.push(TeleportEvent::BeginFadeIn {
                duration: self.fade_duration,
            });
            self.phase = TeleportPhase::FadingIn { elapsed: 0.0 };
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::vec3;

    fn run_to_idle(sequence: &mut TeleportSequence, dt: f32) -> (f32, Vec<TeleportEvent>) {
        let mut elapsed = 0.0;
        let mut events = Vec::new();
        for _ in 0..10_000 {
            elapsed += dt;
            events.extend(sequence.advance(dt));
            if !sequence.is_in_progress() {
                break;
            }
        }
        (elapsed, events)
    }

    #[test]
    fn test_start_from_idle_fades_out() {
        let mut sequence = TeleportSequence::new(0.5);
        let event = sequence.start(vec3(1.0, 0.0, 2.0));
        assert_eq!(event, Some(TeleportEvent::BeginFadeOut { duration: 0.5 }));
        assert!(sequence.is_in_progress());
        assert_eq!(sequence.phase(), TeleportPhase::FadingOut { elapsed: 0.0 });
    }

    #[test]
    fn test_start_while_running_is_rejected() {
        let mut sequence = TeleportSequence::new(0.5);
        sequence.start(vec3(1.0, 0.0, 0.0));
        sequence.advance(0.1);

        assert_eq!(sequence.start(vec3(9.0, 0.0, 0.0)), None);
        assert_eq!(sequence.translation(), vec3(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_full_sequence_translates_once_and_takes_two_fades() {
        let fade = 0.5;
        let dt = 1.0 / 64.0;
        let mut sequence = TeleportSequence::new(fade);
        sequence.start(vec3(3.0, 0.0, -4.0));

        let (elapsed, events) = run_to_idle(&mut sequence, dt);

        assert!(elapsed >= 2.0 * fade);
        assert!(!sequence.is_in_progress());
        let translations: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, TeleportEvent::ApplyTranslation(_)))
            .collect();
        assert_eq!(
            translations,
            vec![&TeleportEvent::ApplyTranslation(vec3(3.0, 0.0, -4.0))]
        );
        assert_eq!(events.last(), Some(&TeleportEvent::Completed));
    }

    #[test]
    fn test_translation_lands_between_fades() {
        let mut sequence = TeleportSequence::new(0.2);
        sequence.start(vec3(1.0, 0.0, 0.0));

        assert!(sequence.advance(0.1).is_empty());
        let events = sequence.advance(0.1);
        assert_eq!(
            events,
            vec![
                TeleportEvent::ApplyTranslation(vec3(1.0, 0.0, 0.0)),
                TeleportEvent::BeginFadeIn { duration: 0.2 },
            ]
        );
        assert_eq!(sequence.phase(), TeleportPhase::FadingIn { elapsed: 0.0 });
    }

    #[test]
    fn test_overshoot_is_not_carried_into_fade_in() {
        let mut sequence = TeleportSequence::new(0.5);
        sequence.start(vec3(1.0, 0.0, 0.0));

        // One huge frame finishes the fade-out but must not also finish the fade-in.
        let events = sequence.advance(5.0);
        assert!(events.contains(&TeleportEvent::BeginFadeIn { duration: 0.5 }));
        assert!(sequence.is_in_progress());

        assert_eq!(sequence.advance(5.0), vec![TeleportEvent::Completed]);
        assert!(!sequence.is_in_progress());
    }

    #[test]
    fn test_can_restart_after_completion() {
        let mut sequence = TeleportSequence::new(0.1);
        sequence.start(vec3(1.0, 0.0, 0.0));
        run_to_idle(&mut sequence, 0.05);

        assert!(sequence.start(vec3(0.0, 0.0, 1.0)).is_some());
    }

    #[test]
    fn test_idle_advance_is_inert() {
        let mut sequence = TeleportSequence::new(0.5);
        assert!(sequence.advance(1.0).is_empty());
        assert_eq!(sequence.phase(), TeleportPhase::Idle);
    }
}

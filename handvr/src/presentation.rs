use serde::{Deserialize, Serialize};

/// Full-screen fade tint.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FadeColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl FadeColor {
    pub const BLACK: FadeColor = FadeColor::rgba(0.0, 0.0, 0.0, 1.0);
    pub const CLEAR: FadeColor = FadeColor::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        FadeColor { r, g, b, a }
    }

    /// Same tint with zero alpha, used as the fade-in target.
    pub const fn transparent(self) -> Self {
        FadeColor { a: 0.0, ..self }
    }
}

/// Screen fade-to-color effect supplied by the presentation layer.
pub trait ScreenFader {
    fn start_fade(&mut self, color: FadeColor, duration: f32);
}

/// Fader for peers that have no screen to fade.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoFade;

impl ScreenFader for NoFade {
    fn start_fade(&mut self, _color: FadeColor, _duration: f32) {}
}

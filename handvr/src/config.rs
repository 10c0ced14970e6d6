use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{HandError, HandResult};
use crate::presentation::FadeColor;

/// Tunables shared by every hand in a world.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandConfig {
    /// Seconds for each half of the teleport fade.
    pub fade_duration: f32,
    pub fade_color: FadeColor,
    /// Maximum pointer ray length; `None` casts without limit.
    pub pointer_range: Option<f32>,
    /// Analog level at which the grab button counts as held.
    pub grab_threshold: f32,
    pub teleport_threshold: f32,
}

impl Default for HandConfig {
    fn default() -> Self {
        HandConfig {
            fade_duration: 0.5,
            fade_color: FadeColor::BLACK,
            pointer_range: None,
            grab_threshold: 0.5,
            teleport_threshold: 0.5,
        }
    }
}

impl HandConfig {
    pub fn from_toml_str(source: &str) -> HandResult<Self> {
        let config: HandConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> HandResult<Self> {
        let source = std::fs::read_to_string(path).map_err(|source| HandError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> HandResult<()> {
        if !self.fade_duration.is_finite() || self.fade_duration < 0.0 {
            return Err(HandError::InvalidConfig(format!(
                "fade_duration must be a non-negative number of seconds, got {}",
                self.fade_duration
            )));
        }

        if let Some(range) = self.pointer_range {
            if !(range > 0.0) {
                return Err(HandError::InvalidConfig(format!(
                    "pointer_range must be positive, got {}",
                    range
                )));
            }
        }

        for (name, threshold) in [
            ("grab_threshold", self.grab_threshold),
            ("teleport_threshold", self.teleport_threshold),
        ] {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(HandError::InvalidConfig(format!(
                    "{} must be within 0..=1, got {}",
                    name, threshold
                )));
            }
        }

        Ok(())
    }

    /// Ray length handed to the physics collaborator.
    pub fn pointer_max_distance(&self) -> f32 {
        self.pointer_range.unwrap_or(f32::MAX)
    }
}

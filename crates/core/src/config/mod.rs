use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::animation::{PhaseTiming, Viewport};
use crate::mapping::MappingProfile;
use crate::surface::{ButtonLayout, TransportControl};
use crate::{FlowTextError, Result};

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub surface: SurfaceConfig,
    pub profile: ProfileKind,
    pub viewport: Viewport,
    pub frame_rate: u32,
    pub capture: CaptureConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            surface: SurfaceConfig::default(),
            profile: ProfileKind::default(),
            viewport: Viewport::default(),
            frame_rate: 60,
            capture: CaptureConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn live_defaults() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: AppConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.viewport.is_valid() {
            return Err(FlowTextError::InvalidConfig(format!(
                "viewport must be positive, got {}x{}",
                self.viewport.width, self.viewport.height
            )));
        }
        if self.frame_rate == 0 {
            return Err(FlowTextError::InvalidConfig(
                "frame_rate must be at least 1".into(),
            ));
        }
        self.profile.timing().validate()
    }
}

/// Configuration specific to the hardware surface.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    pub layout: ButtonLayout,
    /// Case-insensitive substring of the MIDI port name to open.
    pub port: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub control: TransportControl,
    pub user_id: String,
    pub output: Option<PathBuf>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            control: TransportControl::Record,
            user_id: "anonymous".to_string(),
            output: None,
        }
    }
}

/// Named animator variant; selects both the mapping table and the timing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileKind {
    #[default]
    Classic,
    Extended,
}

impl ProfileKind {
    pub fn mapping(self) -> MappingProfile {
        match self {
            ProfileKind::Classic => MappingProfile::classic(),
            ProfileKind::Extended => MappingProfile::extended(),
        }
    }

    pub fn timing(self) -> PhaseTiming {
        match self {
            ProfileKind::Classic => PhaseTiming::classic(),
            ProfileKind::Extended => PhaseTiming::extended(),
        }
    }
}

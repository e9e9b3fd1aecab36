//! Transport tuning
//!
//! Loaded from a JSON file next to the save; missing or unreadable files fall
//! back to defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::SIM_DT;
use crate::error::{Result, TransportError};
use crate::sim::acceptor::DEFAULT_LEDGER_CAPACITY;

/// Simulation settings for item transport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Belt speed in tiles per second
    pub belt_speed: f32,
    /// Fixed simulation timestep (seconds)
    pub sim_dt: f32,
    /// How many consumption animations each acceptor keeps
    pub max_consumption_animations: usize,
    /// Consumption animation progress per second
    pub consumption_animation_speed: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            belt_speed: 1.0,
            sim_dt: SIM_DT,
            max_consumption_animations: DEFAULT_LEDGER_CAPACITY,
            consumption_animation_speed: 4.0,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values that would move items backwards or stall them
    pub fn validate(&self) -> Result<()> {
        if !(self.belt_speed.is_finite() && self.belt_speed > 0.0) {
            return Err(TransportError::InvalidConfiguration(format!(
                "belt_speed must be positive, got {}",
                self.belt_speed
            )));
        }
        if !(self.sim_dt.is_finite() && self.sim_dt > 0.0) {
            return Err(TransportError::InvalidConfiguration(format!(
                "sim_dt must be positive, got {}",
                self.sim_dt
            )));
        }
        if !self.consumption_animation_speed.is_finite() {
            return Err(TransportError::InvalidConfiguration(format!(
                "consumption_animation_speed must be finite, got {}",
                self.consumption_animation_speed
            )));
        }
        Ok(())
    }

    /// Read and validate settings from `path`
    pub fn try_load(path: impl AsRef<Path>) -> Result<Self> {
        let settings = Self::from_json(&std::fs::read_to_string(path.as_ref())?)?;
        log::info!("Loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    /// Load settings from `path`, using defaults if that fails
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self::try_load(path).unwrap_or_else(|e| {
            log::warn!("Using default settings ({}: {})", path.display(), e);
            Self::default()
        })
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        log::info!("Settings saved");
        Ok(())
    }
}

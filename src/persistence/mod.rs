//! Save/load of transport state
//!
//! Versioned JSON envelope around the transport world. What is stored:
//! - belts: exit direction only
//! - ejector slots: layout, held item, progress, `enabled`
//! - acceptor slots: layout and filters (the consumption ledger is dropped)

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TransportError};
use crate::sim::TransportWorld;

/// Current save format version
pub const SAVE_VERSION: u32 = 1;

/// Versioned save envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveGame {
    pub version: u32,
    pub world: TransportWorld,
}

impl SaveGame {
    pub fn new(world: TransportWorld) -> Self {
        Self {
            version: SAVE_VERSION,
            world,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let save: SaveGame = serde_json::from_str(json)?;
        if save.version != SAVE_VERSION {
            return Err(TransportError::UnsupportedVersion {
                found: save.version,
                expected: SAVE_VERSION,
            });
        }
        Ok(save)
    }

    /// Restore the world, re-sorting buildings for deterministic iteration
    pub fn into_world(self) -> TransportWorld {
        let mut world = self.world;
        world.normalize_order();
        world
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path.as_ref(), self.to_json()?)?;
        log::info!(
            "Saved {} buildings at tick {}",
            self.world.buildings.len(),
            self.world.time_ticks
        );
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let save = Self::from_json(&std::fs::read_to_string(path.as_ref())?)?;
        log::info!("Loaded {} buildings", save.world.buildings.len());
        Ok(save)
    }
}

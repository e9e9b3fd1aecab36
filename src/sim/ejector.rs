//! Ejector slot model
//!
//! Output ports of a building. Each slot holds at most one in-flight item
//! together with its transit progress. `take_slot_item` is the only way an
//! item leaves a slot.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::direction::{Direction, Layer};
use crate::error::{Result, TransportError};
use crate::item::Item;

/// Template for an output port
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EjectorSlotConfig {
    pub pos: IVec2,
    pub direction: Direction,
    #[serde(default)]
    pub layer: Layer,
}

/// Persisted form of an ejector slot, checked on load
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EjectorSlotRecord {
    pub pos: IVec2,
    pub direction: Direction,
    #[serde(default)]
    pub layer: Layer,
    #[serde(default)]
    pub item: Option<Item>,
    #[serde(default)]
    pub progress: f32,
}

/// An output port and whatever it currently carries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "EjectorSlotRecord", into = "EjectorSlotRecord")]
pub struct EjectorSlot {
    pub pos: IVec2,
    /// Direction the item is ejected *into*
    pub direction: Direction,
    pub layer: Layer,
    pub item: Option<Item>,
    /// Distance travelled; always 0 while `item` is `None`
    pub progress: f32,
}

impl TryFrom<EjectorSlotRecord> for EjectorSlot {
    type Error = TransportError;

    fn try_from(record: EjectorSlotRecord) -> Result<Self> {
        if !record.progress.is_finite() || record.progress < 0.0 {
            return Err(TransportError::InvalidConfiguration(format!(
                "ejector slot progress {} is not a finite non-negative value",
                record.progress
            )));
        }
        if record.item.is_none() && record.progress != 0.0 {
            return Err(TransportError::InvalidConfiguration(format!(
                "empty ejector slot has progress {}",
                record.progress
            )));
        }
        Ok(Self {
            pos: record.pos,
            direction: record.direction,
            layer: record.layer,
            item: record.item,
            progress: record.progress,
        })
    }
}

impl From<EjectorSlot> for EjectorSlotRecord {
    fn from(slot: EjectorSlot) -> Self {
        Self {
            pos: slot.pos,
            direction: slot.direction,
            layer: slot.layer,
            item: slot.item,
            progress: slot.progress,
        }
    }
}

impl From<EjectorSlotConfig> for EjectorSlot {
    fn from(config: EjectorSlotConfig) -> Self {
        Self {
            pos: config.pos,
            direction: config.direction,
            layer: config.layer,
            item: None,
            progress: 0.0,
        }
    }
}

impl EjectorSlot {
    pub fn is_free(&self) -> bool {
        self.item.is_none()
    }

    pub fn config(&self) -> EjectorSlotConfig {
        EjectorSlotConfig {
            pos: self.pos,
            direction: self.direction,
            layer: self.layer,
        }
    }
}

fn default_enabled() -> bool {
    true
}

/// Output ports of a building, addressed by declaration index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemEjector {
    slots: Vec<EjectorSlot>,
    /// When false the transport step skips this ejector entirely
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl ItemEjector {
    pub fn new(configs: impl IntoIterator<Item = EjectorSlotConfig>) -> Self {
        Self {
            slots: configs.into_iter().map(EjectorSlot::from).collect(),
            enabled: true,
        }
    }

    /// Same slot layout, no items
    pub fn duplicate_without_contents(&self) -> Self {
        Self::new(self.slots.iter().map(EjectorSlot::config))
    }

    pub fn slots(&self) -> &[EjectorSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn check_index(&self, index: usize) {
        assert!(
            index < self.slots.len(),
            "invalid ejector slot: {} (have {})",
            index,
            self.slots.len()
        );
    }

    pub fn slot(&self, index: usize) -> &EjectorSlot {
        self.check_index(index);
        &self.slots[index]
    }

    /// Tile-local coordinate slot `index` ejects into
    pub fn slot_target_local_tile(&self, index: usize) -> IVec2 {
        let slot = self.slot(index);
        slot.pos + slot.direction.to_vector()
    }

    pub fn any_slot_ejects_to_local_tile(&self, tile: IVec2, layer: Layer) -> bool {
        (0..self.slots.len())
            .any(|i| self.slots[i].layer == layer && self.slot_target_local_tile(i) == tile)
    }

    pub fn can_eject_on_slot(&self, index: usize) -> bool {
        self.slot(index).is_free()
    }

    /// First free slot on `layer`, in declaration order
    pub fn first_free_slot(&self, layer: Layer) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| s.layer == layer && s.is_free())
    }

    /// Place `item` on slot `index`. Returns false, changing nothing, if the
    /// slot is occupied.
    pub fn try_eject(&mut self, index: usize, item: Item) -> bool {
        if !self.can_eject_on_slot(index) {
            return false;
        }
        let slot = &mut self.slots[index];
        slot.item = Some(item);
        slot.progress = 0.0;
        true
    }

    /// Clear slot `index` and return what it held
    pub fn take_slot_item(&mut self, index: usize) -> Option<Item> {
        self.check_index(index);
        let slot = &mut self.slots[index];
        slot.progress = 0.0;
        slot.item.take()
    }

    /// Move the item on slot `index` forward by `amount`, stopping at `limit`.
    /// Empty slots stay at zero and progress never moves backwards. Returns
    /// the new progress.
    pub fn advance_slot(&mut self, index: usize, amount: f32, limit: f32) -> f32 {
        self.check_index(index);
        let slot = &mut self.slots[index];
        if slot.item.is_some() && amount > 0.0 {
            slot.progress = (slot.progress + amount).min(limit);
        }
        slot.progress
    }
}

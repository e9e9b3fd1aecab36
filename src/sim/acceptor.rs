//! Acceptor slot model
//!
//! Answers "can this building receive an item arriving from direction D on
//! layer L, and through which port". The acceptor never owns items; it only
//! authorizes a transfer and keeps a short cosmetic record of what it consumed.

use std::collections::VecDeque;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::direction::{Direction, Layer};
use crate::error::{Result, TransportError};
use crate::item::{Item, ItemFilter};

/// Default number of consumption animations kept per acceptor
pub const DEFAULT_LEDGER_CAPACITY: usize = 16;

/// An input port on a building
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcceptorSlot {
    /// Tile-local position of the port
    pub pos: IVec2,
    /// Directions this port accepts items *from*
    pub directions: Vec<Direction>,
    #[serde(default)]
    pub layer: Layer,
    /// Which item categories may enter (`None` = anything)
    #[serde(default)]
    pub filter: Option<ItemFilter>,
}

/// Result of a successful slot lookup
#[derive(Debug, Clone, Copy)]
pub struct LocatedSlot<'a> {
    pub slot: &'a AcceptorSlot,
    pub index: usize,
    /// The accepted-from direction that matched
    pub accepted_direction: Direction,
}

/// A recently consumed item, kept only so renderers can finish the belt animation
#[derive(Debug, Clone, PartialEq)]
pub struct ConsumptionAnimation {
    pub item: Item,
    pub slot_index: usize,
    pub direction: Direction,
    /// 0 when recorded, entry is dropped once it reaches 1
    pub anim_progress: f32,
}

/// Fixed-capacity ring of consumption animations. When full, the oldest
/// entry is evicted.
#[derive(Debug, Clone)]
pub struct ConsumptionLedger {
    entries: VecDeque<ConsumptionAnimation>,
    capacity: usize,
}

impl Default for ConsumptionLedger {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_LEDGER_CAPACITY)
    }
}

impl ConsumptionLedger {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn push(&mut self, animation: ConsumptionAnimation) {
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(animation);
    }

    /// Advance every animation and drop the finished ones
    pub fn update(&mut self, dt: f32, speed: f32) {
        for entry in self.entries.iter_mut() {
            entry.anim_progress += dt * speed;
        }
        self.entries.retain(|e| e.anim_progress < 1.0);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConsumptionAnimation> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Persisted form: static slot configuration only
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcceptorRecord {
    pub slots: Vec<AcceptorSlot>,
}

/// Input ports of a building, in declaration order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "AcceptorRecord", into = "AcceptorRecord")]
pub struct ItemAcceptor {
    slots: Vec<AcceptorSlot>,
    ledger: ConsumptionLedger,
}

impl TryFrom<AcceptorRecord> for ItemAcceptor {
    type Error = TransportError;

    fn try_from(record: AcceptorRecord) -> Result<Self> {
        ItemAcceptor::new(record.slots)
    }
}

impl From<ItemAcceptor> for AcceptorRecord {
    fn from(acceptor: ItemAcceptor) -> Self {
        AcceptorRecord {
            slots: acceptor.slots,
        }
    }
}

impl ItemAcceptor {
    /// Build from template slots. Fails if any slot accepts from nowhere.
    pub fn new(slots: Vec<AcceptorSlot>) -> Result<Self> {
        Self::with_ledger_capacity(slots, DEFAULT_LEDGER_CAPACITY)
    }

    pub fn with_ledger_capacity(slots: Vec<AcceptorSlot>, capacity: usize) -> Result<Self> {
        if let Some(slot) = slots.iter().position(|s| s.directions.is_empty()) {
            return Err(TransportError::EmptyDirectionSet { slot });
        }
        Ok(Self {
            slots,
            ledger: ConsumptionLedger::with_capacity(capacity),
        })
    }

    /// Same slot layout, empty ledger
    pub fn duplicate_without_contents(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            ledger: ConsumptionLedger::with_capacity(self.ledger.capacity()),
        }
    }

    pub fn slots(&self) -> &[AcceptorSlot] {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> &AcceptorSlot {
        assert!(
            index < self.slots.len(),
            "invalid acceptor slot: {} (have {})",
            index,
            self.slots.len()
        );
        &self.slots[index]
    }

    /// Whether slot `index` would let `item` in
    pub fn can_accept_item(&self, index: usize, item: &Item) -> bool {
        Self::filter_matches(self.slot(index).filter, item)
    }

    pub fn filter_matches(filter: Option<ItemFilter>, item: &Item) -> bool {
        match filter {
            None => true,
            Some(f) => f.matches(item.kind),
        }
    }

    /// Find the first declared slot at `target_local_tile` on `layer` that
    /// accepts an item ejected *into* `from_direction`.
    pub fn find_matching_slot(
        &self,
        target_local_tile: IVec2,
        from_direction: Direction,
        layer: Layer,
    ) -> Option<LocatedSlot<'_>> {
        let desired = from_direction.invert();

        self.slots
            .iter()
            .enumerate()
            .find(|(_, slot)| {
                slot.pos == target_local_tile
                    && slot.layer == layer
                    && slot.directions.contains(&desired)
            })
            .map(|(index, slot)| LocatedSlot {
                slot,
                index,
                accepted_direction: desired,
            })
    }

    /// Record a consumed item for the follow-through animation. Has no
    /// effect on matching.
    pub fn on_item_accepted(&mut self, slot_index: usize, direction: Direction, item: Item) {
        self.ledger.push(ConsumptionAnimation {
            item,
            slot_index,
            direction,
            anim_progress: 0.0,
        });
    }

    pub fn consumption_animations(&self) -> &ConsumptionLedger {
        &self.ledger
    }

    pub fn update_consumption_animations(&mut self, dt: f32, speed: f32) {
        self.ledger.update(dt, speed);
    }
}

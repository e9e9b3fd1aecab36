//! Building slot templates
//!
//! Each building type declares its ports once as plain data. Placing a
//! building instantiates fresh slot lists from the template.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::acceptor::{AcceptorSlot, ItemAcceptor};
use super::belt::{Belt, BeltOrientation};
use super::ejector::{EjectorSlotConfig, ItemEjector};
use crate::direction::{Direction, Layer};
use crate::error::Result;
use crate::item::{ItemFilter, ItemKind};

/// Static port layout of a building type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildingTemplate {
    pub name: String,
    /// Footprint in tiles
    pub dimensions: IVec2,
    #[serde(default)]
    pub belt: Option<Belt>,
    #[serde(default)]
    pub acceptor_slots: Vec<AcceptorSlot>,
    #[serde(default)]
    pub ejector_slots: Vec<EjectorSlotConfig>,
}

/// Slot components created from a template
#[derive(Debug, Clone)]
pub struct BuildingComponents {
    pub belt: Option<Belt>,
    pub acceptor: Option<ItemAcceptor>,
    pub ejector: Option<ItemEjector>,
}

impl BuildingTemplate {
    /// Create fresh components. Rejects malformed acceptor slots.
    pub fn instantiate(&self, ledger_capacity: usize) -> Result<BuildingComponents> {
        let acceptor = if self.acceptor_slots.is_empty() {
            None
        } else {
            Some(ItemAcceptor::with_ledger_capacity(
                self.acceptor_slots.clone(),
                ledger_capacity,
            )?)
        };
        let ejector = if self.ejector_slots.is_empty() {
            None
        } else {
            Some(ItemEjector::new(self.ejector_slots.iter().copied()))
        };

        log::debug!(
            "Instantiated {}: {} acceptor slots, {} ejector slots",
            self.name,
            self.acceptor_slots.len(),
            self.ejector_slots.len()
        );

        Ok(BuildingComponents {
            belt: self.belt,
            acceptor,
            ejector,
        })
    }
}

fn shape_slot(x: i32, y: i32, directions: &[Direction]) -> AcceptorSlot {
    AcceptorSlot {
        pos: IVec2::new(x, y),
        directions: directions.to_vec(),
        layer: Layer::Regular,
        filter: Some(ItemFilter::Only(ItemKind::Shape)),
    }
}

/// A single belt tile. Belts expose one acceptor and one ejector slot.
pub fn belt(orientation: BeltOrientation) -> BuildingTemplate {
    let belt = Belt::new(orientation);
    BuildingTemplate {
        name: "belt".to_string(),
        dimensions: IVec2::ONE,
        belt: Some(belt),
        acceptor_slots: vec![belt.acceptor_slot()],
        ejector_slots: vec![belt.ejector_slot()],
    }
}

/// Single-tile output-only building ejecting toward `direction`
pub fn source(direction: Direction, layer: Layer) -> BuildingTemplate {
    BuildingTemplate {
        name: "source".to_string(),
        dimensions: IVec2::ONE,
        belt: None,
        acceptor_slots: Vec::new(),
        ejector_slots: vec![EjectorSlotConfig {
            pos: IVec2::ZERO,
            direction,
            layer,
        }],
    }
}

/// The 4x4 hub. Every edge tile accepts shapes from outside; corner tiles
/// accept from both adjacent edges.
pub fn hub() -> BuildingTemplate {
    use Direction::*;

    BuildingTemplate {
        name: "hub".to_string(),
        dimensions: IVec2::new(4, 4),
        belt: None,
        acceptor_slots: vec![
            shape_slot(0, 0, &[Top, Left]),
            shape_slot(1, 0, &[Top]),
            shape_slot(2, 0, &[Top]),
            shape_slot(3, 0, &[Top, Right]),
            shape_slot(0, 3, &[Bottom, Left]),
            shape_slot(1, 3, &[Bottom]),
            shape_slot(2, 3, &[Bottom]),
            shape_slot(3, 3, &[Bottom, Right]),
            shape_slot(0, 1, &[Left]),
            shape_slot(0, 2, &[Left]),
            // Shadowed by the corner entries above
            shape_slot(0, 3, &[Left]),
            shape_slot(3, 1, &[Right]),
            shape_slot(3, 2, &[Right]),
            shape_slot(3, 3, &[Right]),
        ],
        ejector_slots: Vec::new(),
    }
}

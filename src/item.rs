//! Items carried by ejector slots and the filters acceptors apply to them

use serde::{Deserialize, Serialize};

/// Concrete item category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemKind {
    Shape,
    Color,
    PositiveEnergy,
    NegativeEnergy,
}

impl ItemKind {
    pub fn is_energy(&self) -> bool {
        matches!(self, ItemKind::PositiveEnergy | ItemKind::NegativeEnergy)
    }
}

/// Admission rule for an acceptor slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemFilter {
    /// Exactly this category
    Only(ItemKind),
    /// Any of the energy sub-kinds
    GenericEnergy,
}

impl ItemFilter {
    pub fn matches(&self, kind: ItemKind) -> bool {
        match self {
            ItemFilter::Only(wanted) => *wanted == kind,
            ItemFilter::GenericEnergy => kind.is_energy(),
        }
    }
}

/// A discrete item in transit. The id is what makes two items of the same
/// kind distinguishable when auditing hand-offs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    pub id: u32,
    pub kind: ItemKind,
}

impl Item {
    pub fn new(id: u32, kind: ItemKind) -> Self {
        Self { id, kind }
    }
}

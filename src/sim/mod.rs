//! Deterministic transport simulation
//!
//! Slot models and belt geometry. This module must stay deterministic:
//! - Fixed timestep only
//! - Stable iteration order (buildings by id, slots by declaration index)
//! - No rendering or platform dependencies

pub mod acceptor;
pub mod belt;
pub mod ejector;
pub mod templates;
pub mod tick;

pub use acceptor::{AcceptorSlot, ConsumptionAnimation, ConsumptionLedger, ItemAcceptor, LocatedSlot};
pub use belt::{Belt, BeltOrientation};
pub use ejector::{EjectorSlot, EjectorSlotConfig, ItemEjector};
pub use templates::{BuildingComponents, BuildingTemplate};
pub use tick::{Building, TickReport, TransportWorld, tick};

//! Belt Slots - item transport for a tile-based factory simulation
//!
//! Core modules:
//! - `direction`: Four-way directional algebra and simulation layers
//! - `item`: Items and acceptor filters
//! - `sim`: Belt geometry, acceptor/ejector slot models, transport step
//! - `persistence`: Versioned save/load
//! - `settings`: Transport tuning

pub mod direction;
pub mod error;
pub mod item;
pub mod persistence;
pub mod settings;
pub mod sim;

pub use direction::{Direction, Layer};
pub use error::{Result, TransportError};
pub use item::{Item, ItemFilter, ItemKind};
pub use settings::Settings;

/// Simulation constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;

    /// Length of a curved belt on the regular layer. Approximates a quarter
    /// circle of radius 0.5 (π/4); belt speeds are tuned against this value.
    pub const CURVED_BELT_LENGTH: f32 = 0.78;

    /// How far past the end of a belt progress may overshoot in one tick
    pub const PROGRESS_EPSILON: f32 = 0.02;
}

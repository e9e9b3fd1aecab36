//! Directional algebra shared by every slot and geometry query
//!
//! Tile-local space uses screen conventions: x grows to the right, y grows
//! downward, so `Top` is `(0, -1)`.

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// One of the four tile edges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Top,
    Right,
    Bottom,
    Left,
}

impl Direction {
    /// All directions in clockwise order starting at `Top`
    pub const ALL: [Direction; 4] = [
        Direction::Top,
        Direction::Right,
        Direction::Bottom,
        Direction::Left,
    ];

    /// The opposite edge. An ejector emits *into* a direction while an
    /// acceptor declares the direction it accepts *from*.
    #[inline]
    pub fn invert(self) -> Direction {
        match self {
            Direction::Top => Direction::Bottom,
            Direction::Right => Direction::Left,
            Direction::Bottom => Direction::Top,
            Direction::Left => Direction::Right,
        }
    }

    /// Unit step in tile-local space
    #[inline]
    pub fn to_vector(self) -> IVec2 {
        match self {
            Direction::Top => IVec2::new(0, -1),
            Direction::Right => IVec2::new(1, 0),
            Direction::Bottom => IVec2::new(0, 1),
            Direction::Left => IVec2::new(-1, 0),
        }
    }

    /// Rotate a quarter turn clockwise
    pub fn rotate_cw(self) -> Direction {
        match self {
            Direction::Top => Direction::Right,
            Direction::Right => Direction::Bottom,
            Direction::Bottom => Direction::Left,
            Direction::Left => Direction::Top,
        }
    }

    /// Rotate a quarter turn counter-clockwise
    pub fn rotate_ccw(self) -> Direction {
        self.rotate_cw().invert()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Top => "top",
            Direction::Right => "right",
            Direction::Bottom => "bottom",
            Direction::Left => "left",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "top" => Some(Direction::Top),
            "right" => Some(Direction::Right),
            "bottom" => Some(Direction::Bottom),
            "left" => Some(Direction::Left),
            _ => None,
        }
    }
}

/// Simulation plane. Items on one layer are invisible to matching on the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    #[default]
    Regular,
    Wires,
}

impl Layer {
    /// The other layer (used when the player switches the wires overlay)
    pub fn toggled(self) -> Layer {
        match self {
            Layer::Regular => Layer::Wires,
            Layer::Wires => Layer::Regular,
        }
    }
}

//! Belt tile geometry
//!
//! A belt maps a scalar progress value to an offset inside a unit tile
//! centered at the origin. Items always enter at the bottom edge `(0, 0.5)`
//! and leave through the top, left or right edge depending on orientation.
//!
//! On the regular layer a curve is a quarter circle of radius 0.5 around the
//! tile corner it turns toward. The wires layer never uses arcs: curves are an
//! L of two straight half-tile segments meeting at the tile center.

use std::f32::consts::FRAC_PI_2;

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use super::acceptor::AcceptorSlot;
use super::ejector::EjectorSlotConfig;
use crate::consts::{CURVED_BELT_LENGTH, PROGRESS_EPSILON};
use crate::direction::{Direction, Layer};
use crate::error::{Result, TransportError};

/// Shape of a belt tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BeltOrientation {
    Straight,
    CurveLeft,
    CurveRight,
}

impl BeltOrientation {
    /// Map a persisted belt direction to its shape. Belts are authored as the
    /// edge they leave through; `bottom` would point back into the entry edge.
    pub fn from_direction(direction: Direction) -> Result<Self> {
        match direction {
            Direction::Top => Ok(BeltOrientation::Straight),
            Direction::Left => Ok(BeltOrientation::CurveLeft),
            Direction::Right => Ok(BeltOrientation::CurveRight),
            Direction::Bottom => Err(TransportError::InvalidConfiguration(
                "belt cannot exit through its entry edge (bottom)".to_string(),
            )),
        }
    }

    /// Edge the item leaves through
    pub fn exit_direction(self) -> Direction {
        match self {
            BeltOrientation::Straight => Direction::Top,
            BeltOrientation::CurveLeft => Direction::Left,
            BeltOrientation::CurveRight => Direction::Right,
        }
    }

    /// Progress value at which an item reaches the end of the belt
    pub fn effective_length(self, layer: Layer) -> f32 {
        match (self, layer) {
            (BeltOrientation::Straight, _) | (_, Layer::Wires) => 1.0,
            (BeltOrientation::CurveLeft | BeltOrientation::CurveRight, Layer::Regular) => {
                CURVED_BELT_LENGTH
            }
        }
    }

    /// Convert belt progress to a tile-local offset in `[-0.5, 0.5]²`.
    ///
    /// Progress may overshoot the effective length by `PROGRESS_EPSILON`
    /// since a tick can step slightly past the end.
    pub fn local_position(self, progress: f32, layer: Layer) -> Result<Vec2> {
        let max = self.effective_length(layer) + PROGRESS_EPSILON;
        if !(0.0..=max).contains(&progress) {
            return Err(TransportError::InvalidProgress { progress, max });
        }

        let pos = match (layer, self) {
            (_, BeltOrientation::Straight) => Vec2::new(0.0, 0.5 - progress),

            (Layer::Regular, curve) => {
                let angle = (progress / CURVED_BELT_LENGTH) * FRAC_PI_2;
                // Mirror image across the vertical axis for left turns
                let side = if curve == BeltOrientation::CurveRight { 1.0 } else { -1.0 };
                Vec2::new(
                    side * (0.5 - 0.5 * angle.cos()),
                    0.5 - 0.5 * angle.sin(),
                )
            }

            (Layer::Wires, curve) => {
                if progress > 0.5 {
                    let side = if curve == BeltOrientation::CurveRight { 1.0 } else { -1.0 };
                    Vec2::new(side * (progress - 0.5), 0.0)
                } else {
                    Vec2::new(0.0, 0.5 - progress)
                }
            }
        };

        Ok(pos)
    }
}

/// On-disk shape of a belt: only the exit direction is stored
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeltRecord {
    pub direction: Direction,
}

/// Belt component attached to a single-tile building
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BeltRecord", into = "BeltRecord")]
pub struct Belt {
    pub orientation: BeltOrientation,
}

impl TryFrom<BeltRecord> for Belt {
    type Error = TransportError;

    fn try_from(record: BeltRecord) -> Result<Self> {
        Ok(Belt {
            orientation: BeltOrientation::from_direction(record.direction)?,
        })
    }
}

impl From<Belt> for BeltRecord {
    fn from(belt: Belt) -> Self {
        BeltRecord {
            direction: belt.direction(),
        }
    }
}

impl Belt {
    pub fn new(orientation: BeltOrientation) -> Self {
        Self { orientation }
    }

    /// Build from an authored exit direction
    pub fn from_direction(direction: Direction) -> Result<Self> {
        Ok(Self::new(BeltOrientation::from_direction(direction)?))
    }

    pub fn direction(&self) -> Direction {
        self.orientation.exit_direction()
    }

    /// Blueprint copy. A belt holds no items of its own, so this is a plain copy.
    pub fn duplicate_without_contents(&self) -> Self {
        *self
    }

    pub fn effective_length(&self, layer: Layer) -> f32 {
        self.orientation.effective_length(layer)
    }

    pub fn local_position(&self, progress: f32, layer: Layer) -> Result<Vec2> {
        self.orientation.local_position(progress, layer)
    }

    /// The single input port every belt exposes for matching
    pub fn acceptor_slot(&self) -> AcceptorSlot {
        AcceptorSlot {
            pos: IVec2::ZERO,
            directions: vec![Direction::Bottom],
            layer: Layer::Regular,
            filter: None,
        }
    }

    /// The single output port, pointing out of the exit edge
    pub fn ejector_slot(&self) -> EjectorSlotConfig {
        EjectorSlotConfig {
            pos: IVec2::ZERO,
            direction: self.direction(),
            layer: Layer::Regular,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ORIENTATIONS: [BeltOrientation; 3] = [
        BeltOrientation::Straight,
        BeltOrientation::CurveLeft,
        BeltOrientation::CurveRight,
    ];

    fn approx(a: Vec2, b: Vec2) -> bool {
        a.abs_diff_eq(b, 1e-5)
    }

    #[test]
    fn test_effective_lengths() {
        assert_eq!(BeltOrientation::Straight.effective_length(Layer::Regular), 1.0);
        assert_eq!(BeltOrientation::Straight.effective_length(Layer::Wires), 1.0);
        assert_eq!(BeltOrientation::CurveLeft.effective_length(Layer::Regular), 0.78);
        assert_eq!(BeltOrientation::CurveRight.effective_length(Layer::Regular), 0.78);
        assert_eq!(BeltOrientation::CurveLeft.effective_length(Layer::Wires), 1.0);
        assert_eq!(BeltOrientation::CurveRight.effective_length(Layer::Wires), 1.0);
    }

    #[test]
    fn test_endpoints_match_entry_and_exit_edges() {
        for layer in [Layer::Regular, Layer::Wires] {
            for orientation in ORIENTATIONS {
                let start = orientation.local_position(0.0, layer).unwrap();
                assert!(approx(start, Vec2::new(0.0, 0.5)), "{orientation:?} {layer:?} start {start}");

                let end = orientation
                    .local_position(orientation.effective_length(layer), layer)
                    .unwrap();
                let exit = orientation.exit_direction().to_vector().as_vec2() * 0.5;
                assert!(approx(end, exit), "{orientation:?} {layer:?} end {end}");
            }
        }
    }

    #[test]
    fn test_straight_midpoint_is_center() {
        let mid = BeltOrientation::Straight.local_position(0.5, Layer::Regular).unwrap();
        assert!(approx(mid, Vec2::ZERO));
    }

    #[test]
    fn test_regular_curve_stays_on_arc() {
        let corner = Vec2::new(0.5, 0.5);
        for i in 0..=10 {
            let p = CURVED_BELT_LENGTH * i as f32 / 10.0;
            let pos = BeltOrientation::CurveRight.local_position(p, Layer::Regular).unwrap();
            assert!(((pos - corner).length() - 0.5).abs() < 1e-5);
        }
    }

    #[test]
    fn test_left_and_right_curves_are_mirrored() {
        for layer in [Layer::Regular, Layer::Wires] {
            for i in 0..=10 {
                let p = 0.078 * i as f32;
                let l = BeltOrientation::CurveLeft.local_position(p, layer).unwrap();
                let r = BeltOrientation::CurveRight.local_position(p, layer).unwrap();
                assert!(approx(l, Vec2::new(-r.x, r.y)));
            }
        }
    }

    #[test]
    fn test_wires_curve_is_rectilinear() {
        let o = BeltOrientation::CurveRight;
        assert!(approx(o.local_position(0.25, Layer::Wires).unwrap(), Vec2::new(0.0, 0.25)));
        assert!(approx(o.local_position(0.5, Layer::Wires).unwrap(), Vec2::ZERO));
        assert!(approx(o.local_position(0.75, Layer::Wires).unwrap(), Vec2::new(0.25, 0.0)));
    }

    #[test]
    fn test_overshoot_within_epsilon_is_tolerated() {
        assert!(BeltOrientation::Straight.local_position(1.015, Layer::Regular).is_ok());
        assert!(BeltOrientation::CurveLeft.local_position(0.79, Layer::Regular).is_ok());
    }

    #[test]
    fn test_invalid_progress_is_rejected() {
        let err = BeltOrientation::Straight
            .local_position(-0.01, Layer::Regular)
            .unwrap_err();
        assert!(matches!(err, TransportError::InvalidProgress { .. }));

        // Curves on the regular layer are shorter than a tile
        let err = BeltOrientation::CurveRight
            .local_position(0.9, Layer::Regular)
            .unwrap_err();
        assert!(matches!(err, TransportError::InvalidProgress { .. }));
        assert!(BeltOrientation::CurveRight.local_position(0.9, Layer::Wires).is_ok());
    }

    #[test]
    fn test_bottom_is_not_a_belt_direction() {
        let err = Belt::from_direction(Direction::Bottom).unwrap_err();
        assert!(matches!(err, TransportError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_belt_persists_direction_only() {
        let belt = Belt::new(BeltOrientation::CurveLeft);
        let json = serde_json::to_string(&belt).unwrap();
        assert_eq!(json, r#"{"direction":"left"}"#);
        let back: Belt = serde_json::from_str(&json).unwrap();
        assert_eq!(back, belt);

        assert!(serde_json::from_str::<Belt>(r#"{"direction":"bottom"}"#).is_err());
    }

    #[test]
    fn test_fake_slots_follow_orientation() {
        let belt = Belt::new(BeltOrientation::CurveRight);
        assert_eq!(belt.acceptor_slot().directions, vec![Direction::Bottom]);
        assert_eq!(belt.ejector_slot().direction, Direction::Right);
        assert_eq!(belt.ejector_slot().pos, IVec2::ZERO);
    }

    proptest! {
        #[test]
        fn positions_stay_inside_tile(
            o in prop::sample::select(ORIENTATIONS.to_vec()),
            wires in any::<bool>(),
            t in 0.0f32..=1.0,
        ) {
            let layer = if wires { Layer::Wires } else { Layer::Regular };
            let p = t * o.effective_length(layer);
            let pos = o.local_position(p, layer).unwrap();
            prop_assert!(pos.x.abs() <= 0.5 + 1e-5);
            prop_assert!(pos.y.abs() <= 0.5 + 1e-5);
        }
    }
}

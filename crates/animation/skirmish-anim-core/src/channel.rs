//! The closed set of animatable channels a part can carry.
//!
//! The wire format addresses channels by a `(kind, field)` byte pair; in
//! memory that pair maps onto the exhaustive [`ChannelId`] enum so a decoder
//! typo is a compile-time impossibility rather than a runtime type lookup.

use serde::{Deserialize, Serialize};

use crate::curve::Curve;

/// One animatable channel of a part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelId {
    PosX,
    PosY,
    PosZ,
    RotX,
    RotY,
    RotZ,
    SclX,
    SclY,
    SclZ,
    DataA,
    DataB,
    DataC,
    ColR,
    ColG,
    ColB,
    ColA,
    FlipX,
    FlipY,
    Active,
    Direction,
}

impl ChannelId {
    /// All channels, in wire-table order.
    pub const ALL: [ChannelId; 20] = [
        Self::PosX,
        Self::PosY,
        Self::PosZ,
        Self::RotX,
        Self::RotY,
        Self::RotZ,
        Self::SclX,
        Self::SclY,
        Self::SclZ,
        Self::DataA,
        Self::DataB,
        Self::DataC,
        Self::ColR,
        Self::ColG,
        Self::ColB,
        Self::ColA,
        Self::FlipX,
        Self::FlipY,
        Self::Active,
        Self::Direction,
    ];

    /// Map the wire `(kind, field)` byte pair to a channel.
    ///
    /// Kind 1 is the transform block, kind 2 the part-visual block, kind 3
    /// the object-state block.
    pub fn from_bytes(kind: u8, field: u8) -> Option<Self> {
        Some(match (kind, field) {
            (1, 1) => Self::PosX,
            (1, 2) => Self::PosY,
            (1, 3) => Self::PosZ,
            (1, 4) => Self::RotX,
            (1, 5) => Self::RotY,
            (1, 6) => Self::RotZ,
            (1, 7) => Self::SclX,
            (1, 8) => Self::SclY,
            (1, 9) => Self::SclZ,
            (2, 1) => Self::DataA,
            (2, 2) => Self::DataB,
            (2, 3) => Self::DataC,
            (2, 4) => Self::ColR,
            (2, 5) => Self::ColG,
            (2, 6) => Self::ColB,
            (2, 7) => Self::ColA,
            (2, 8) => Self::FlipX,
            (2, 9) => Self::FlipY,
            (3, 1) => Self::Active,
            (3, 2) => Self::Direction,
            _ => return None,
        })
    }

    /// The wire `(kind, field)` byte pair for this channel.
    pub fn to_bytes(self) -> (u8, u8) {
        match self {
            Self::PosX => (1, 1),
            Self::PosY => (1, 2),
            Self::PosZ => (1, 3),
            Self::RotX => (1, 4),
            Self::RotY => (1, 5),
            Self::RotZ => (1, 6),
            Self::SclX => (1, 7),
            Self::SclY => (1, 8),
            Self::SclZ => (1, 9),
            Self::DataA => (2, 1),
            Self::DataB => (2, 2),
            Self::DataC => (2, 3),
            Self::ColR => (2, 4),
            Self::ColG => (2, 5),
            Self::ColB => (2, 6),
            Self::ColA => (2, 7),
            Self::FlipX => (2, 8),
            Self::FlipY => (2, 9),
            Self::Active => (3, 1),
            Self::Direction => (3, 2),
        }
    }

    /// The value a channel holds when the asset stored neither a curve nor a
    /// baked default: identity scale, opaque white tint, active, the rest 0.
    #[inline]
    pub fn neutral_value(self) -> f32 {
        match self {
            Self::SclX | Self::SclY | Self::SclZ => 1.0,
            Self::ColR | Self::ColG | Self::ColB | Self::ColA => 1.0,
            Self::Active => 1.0,
            _ => 0.0,
        }
    }
}

/// Every channel curve of one part.
///
/// Invariant: each channel always has an evaluable curve — missing data is
/// filled with a constant at decode time, so sampling never branches on
/// "no data".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelSet {
    pub pos_x: Curve,
    pub pos_y: Curve,
    pub pos_z: Curve,
    pub rot_x: Curve,
    pub rot_y: Curve,
    pub rot_z: Curve,
    pub scl_x: Curve,
    pub scl_y: Curve,
    pub scl_z: Curve,
    pub data_a: Curve,
    pub data_b: Curve,
    pub data_c: Curve,
    pub col_r: Curve,
    pub col_g: Curve,
    pub col_b: Curve,
    pub col_a: Curve,
    pub flip_x: Curve,
    pub flip_y: Curve,
    pub active: Curve,
    pub direction: Curve,
}

impl Default for ChannelSet {
    fn default() -> Self {
        let c = |id: ChannelId| Curve::constant(id.neutral_value());
        Self {
            pos_x: c(ChannelId::PosX),
            pos_y: c(ChannelId::PosY),
            pos_z: c(ChannelId::PosZ),
            rot_x: c(ChannelId::RotX),
            rot_y: c(ChannelId::RotY),
            rot_z: c(ChannelId::RotZ),
            scl_x: c(ChannelId::SclX),
            scl_y: c(ChannelId::SclY),
            scl_z: c(ChannelId::SclZ),
            data_a: c(ChannelId::DataA),
            data_b: c(ChannelId::DataB),
            data_c: c(ChannelId::DataC),
            col_r: c(ChannelId::ColR),
            col_g: c(ChannelId::ColG),
            col_b: c(ChannelId::ColB),
            col_a: c(ChannelId::ColA),
            flip_x: c(ChannelId::FlipX),
            flip_y: c(ChannelId::FlipY),
            active: c(ChannelId::Active),
            direction: c(ChannelId::Direction),
        }
    }
}

impl ChannelSet {
    /// Borrow the curve for a channel.
    pub fn get(&self, id: ChannelId) -> &Curve {
        match id {
            ChannelId::PosX => &self.pos_x,
            ChannelId::PosY => &self.pos_y,
            ChannelId::PosZ => &self.pos_z,
            ChannelId::RotX => &self.rot_x,
            ChannelId::RotY => &self.rot_y,
            ChannelId::RotZ => &self.rot_z,
            ChannelId::SclX => &self.scl_x,
            ChannelId::SclY => &self.scl_y,
            ChannelId::SclZ => &self.scl_z,
            ChannelId::DataA => &self.data_a,
            ChannelId::DataB => &self.data_b,
            ChannelId::DataC => &self.data_c,
            ChannelId::ColR => &self.col_r,
            ChannelId::ColG => &self.col_g,
            ChannelId::ColB => &self.col_b,
            ChannelId::ColA => &self.col_a,
            ChannelId::FlipX => &self.flip_x,
            ChannelId::FlipY => &self.flip_y,
            ChannelId::Active => &self.active,
            ChannelId::Direction => &self.direction,
        }
    }

    /// Replace the curve for a channel.
    pub fn set(&mut self, id: ChannelId, curve: Curve) {
        let slot = match id {
            ChannelId::PosX => &mut self.pos_x,
            ChannelId::PosY => &mut self.pos_y,
            ChannelId::PosZ => &mut self.pos_z,
            ChannelId::RotX => &mut self.rot_x,
            ChannelId::RotY => &mut self.rot_y,
            ChannelId::RotZ => &mut self.rot_z,
            ChannelId::SclX => &mut self.scl_x,
            ChannelId::SclY => &mut self.scl_y,
            ChannelId::SclZ => &mut self.scl_z,
            ChannelId::DataA => &mut self.data_a,
            ChannelId::DataB => &mut self.data_b,
            ChannelId::DataC => &mut self.data_c,
            ChannelId::ColR => &mut self.col_r,
            ChannelId::ColG => &mut self.col_g,
            ChannelId::ColB => &mut self.col_b,
            ChannelId::ColA => &mut self.col_a,
            ChannelId::FlipX => &mut self.flip_x,
            ChannelId::FlipY => &mut self.flip_y,
            ChannelId::Active => &mut self.active,
            ChannelId::Direction => &mut self.direction,
        };
        *slot = curve;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_pairs_round_trip() {
        for id in ChannelId::ALL {
            let (kind, field) = id.to_bytes();
            assert_eq!(ChannelId::from_bytes(kind, field), Some(id));
        }
    }

    #[test]
    fn unknown_pairs_are_rejected() {
        assert_eq!(ChannelId::from_bytes(0, 1), None);
        assert_eq!(ChannelId::from_bytes(1, 10), None);
        assert_eq!(ChannelId::from_bytes(4, 1), None);
    }

    #[test]
    fn default_set_holds_neutral_values() {
        let set = ChannelSet::default();
        assert_eq!(set.get(ChannelId::SclX).evaluate(0.3), 1.0);
        assert_eq!(set.get(ChannelId::ColA).evaluate(0.3), 1.0);
        assert_eq!(set.get(ChannelId::Active).evaluate(0.3), 1.0);
        assert_eq!(set.get(ChannelId::PosX).evaluate(0.3), 0.0);
        assert_eq!(set.get(ChannelId::FlipX).evaluate(0.3), 0.0);
    }
}

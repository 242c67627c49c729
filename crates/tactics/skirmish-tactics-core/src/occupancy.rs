//! Fixed-width occupancy bitmasks over a square neighbourhood of cells.
//!
//! Two uses share the encoding: *live* masks describe which relative cells
//! around a point are currently blocked, *static* masks describe which
//! relative cells an animation requires to be clear. Both are baked ahead of
//! time so the legality check during UI hover and AI evaluation is a single
//! bitwise AND.

use serde::{Deserialize, Serialize};

/// An absolute map cell on the tactical grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub z: i32,
}

impl Cell {
    #[inline]
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// The relative offset from `self` to `other`.
    #[inline]
    pub fn offset_to(&self, other: Cell) -> CellOffset {
        CellOffset {
            x: other.x - self.x,
            z: other.z - self.z,
        }
    }

    #[inline]
    pub fn offset(&self, dx: i32, dz: i32) -> Cell {
        Cell {
            x: self.x + dx,
            z: self.z + dz,
        }
    }

    /// Squared Euclidean distance, enough for ranking.
    #[inline]
    pub fn distance_squared(&self, other: Cell) -> i64 {
        let dx = (other.x - self.x) as i64;
        let dz = (other.z - self.z) as i64;
        dx * dx + dz * dz
    }
}

/// A relative cell offset from an anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CellOffset {
    pub x: i32,
    pub z: i32,
}

impl CellOffset {
    #[inline]
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Negate per mirrored axis.
    #[inline]
    pub fn mirrored(self, mirror_x: bool, mirror_y: bool) -> Self {
        Self {
            x: if mirror_x { -self.x } else { self.x },
            z: if mirror_y { -self.z } else { self.z },
        }
    }
}

macro_rules! occupancy_mask {
    ($name:ident, $repr:ty, $radius:expr, $doc:expr) => {
        #[doc = $doc]
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
        )]
        pub struct $name(pub $repr);

        impl $name {
            /// Neighbourhood radius; the mask covers `[-RADIUS, RADIUS]²`.
            pub const RADIUS: i32 = $radius;
            /// Cells per row.
            pub const WIDTH: i32 = 2 * $radius + 1;

            #[inline]
            fn bit(dx: i32, dz: i32) -> Option<u32> {
                if dx.abs() > Self::RADIUS || dz.abs() > Self::RADIUS {
                    return None;
                }
                Some(((dx + Self::RADIUS) + (dz + Self::RADIUS) * Self::WIDTH) as u32)
            }

            /// Build a live mask: a bit is set when the cell is *not* clear.
            pub fn encode_live(mut is_cell_clear: impl FnMut(i32, i32) -> bool) -> Self {
                let mut mask = Self::default();
                for dz in -Self::RADIUS..=Self::RADIUS {
                    for dx in -Self::RADIUS..=Self::RADIUS {
                        if !is_cell_clear(dx, dz) {
                            mask.set(dx, dz);
                        }
                    }
                }
                mask
            }

            /// Build a static requirement mask: a bit is set for every cell
            /// that must be clear. Offsets outside the radius are ignored.
            pub fn encode_static<I>(must_be_clear: I) -> Self
            where
                I: IntoIterator<Item = CellOffset>,
            {
                let mut mask = Self::default();
                for off in must_be_clear {
                    mask.set(off.x, off.z);
                }
                mask
            }

            #[inline]
            pub fn set(&mut self, dx: i32, dz: i32) {
                if let Some(bit) = Self::bit(dx, dz) {
                    self.0 |= 1 << bit;
                }
            }

            #[inline]
            pub fn get(&self, dx: i32, dz: i32) -> bool {
                match Self::bit(dx, dz) {
                    Some(bit) => self.0 & (1 << bit) != 0,
                    None => false,
                }
            }

            /// Legality of starting an action whose requirements are `self`
            /// against the live occupancy: no required-clear cell may be
            /// blocked.
            #[inline]
            pub fn allows(&self, live: $name) -> bool {
                self.0 & live.0 == 0
            }

            /// The mask with offsets negated per mirrored axis.
            pub fn mirrored(self, mirror_x: bool, mirror_y: bool) -> Self {
                if !mirror_x && !mirror_y {
                    return self;
                }
                let mut out = Self::default();
                for dz in -Self::RADIUS..=Self::RADIUS {
                    for dx in -Self::RADIUS..=Self::RADIUS {
                        if self.get(dx, dz) {
                            let m = CellOffset::new(dx, dz).mirrored(mirror_x, mirror_y);
                            out.set(m.x, m.z);
                        }
                    }
                }
                out
            }
        }
    };
}

occupancy_mask!(
    LargeMask,
    u64,
    3,
    "A 7×7 occupancy mask, used for per-animation space requirements."
);
occupancy_mask!(
    SmallMask,
    u32,
    1,
    "A 3×3 occupancy mask, used for destination picking around one actor."
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_layout_matches_row_major_indexing() {
        let mut mask = SmallMask::default();
        mask.set(-1, -1);
        assert_eq!(mask.0, 1);
        let mut mask = SmallMask::default();
        mask.set(1, 1);
        assert_eq!(mask.0, 1 << 8);
        let mut mask = SmallMask::default();
        mask.set(0, 0);
        assert_eq!(mask.0, 1 << 4);
    }

    #[test]
    fn out_of_radius_offsets_are_ignored() {
        let mut mask = SmallMask::default();
        mask.set(2, 0);
        assert_eq!(mask.0, 0);
        assert!(!mask.get(5, 5));

        let static_mask = LargeMask::encode_static([CellOffset::new(9, 0)]);
        assert_eq!(static_mask.0, 0);
    }

    #[test]
    fn live_mask_sets_blocked_cells() {
        // Only (1, 0) is blocked.
        let mask = LargeMask::encode_live(|dx, dz| !(dx == 1 && dz == 0));
        assert!(mask.get(1, 0));
        assert!(!mask.get(-1, 0));
        assert_eq!(mask.0.count_ones(), 1);
    }

    #[test]
    fn legality_is_a_single_and() {
        let static_mask =
            LargeMask::encode_static([CellOffset::new(1, 0), CellOffset::new(-1, 0)]);
        let live_blocked = LargeMask::encode_live(|dx, dz| !(dx == 1 && dz == 0));
        let live_clear = LargeMask::default();
        assert!(!static_mask.allows(live_blocked));
        assert!(static_mask.allows(live_clear));
    }

    #[test]
    fn mirroring_mask_equals_negating_offsets() {
        let static_mask =
            LargeMask::encode_static([CellOffset::new(1, 0), CellOffset::new(2, 1)]);
        let flipped = static_mask.mirrored(true, false);
        assert!(flipped.get(-1, 0));
        assert!(flipped.get(-2, 1));
        assert!(!flipped.get(1, 0));
        // Mirroring twice restores the original.
        assert_eq!(flipped.mirrored(true, false), static_mask);
    }

    #[test]
    fn legality_is_symmetric_under_simultaneous_mirroring() {
        let static_mask = LargeMask::encode_static([CellOffset::new(1, 0)]);
        let live = LargeMask::encode_live(|dx, dz| !(dx == 1 && dz == 0));

        // Blocked on the east side: illegal as authored, legal when the
        // animation is mirrored.
        assert!(!static_mask.allows(live));
        assert!(static_mask.mirrored(true, false).allows(live));

        // Mirroring the live occupancy as well restores illegality.
        let live_mirrored = live.mirrored(true, false);
        assert!(!static_mask.mirrored(true, false).allows(live_mirrored));
    }
}

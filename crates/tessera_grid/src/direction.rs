//! Four-way direction masks for tile connectivity.
//!
//! Input and output directions of tiles are encoded as a bitmask of size 4
//! where the individual bits are interpreted as NESW (North, East, South,
//! West) MSB → LSB. The mask `0b1010` means North and South, for instance.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not};

/// A set of directions encoded as a 4-bit mask (N, E, S, W from MSB to LSB).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Directions(u8);

impl Directions {
    /// The empty direction set.
    pub const NONE: Directions = Directions(0b0000);
    /// West only.
    pub const W: Directions = Directions(0b0001);
    /// South only.
    pub const S: Directions = Directions(0b0010);
    /// South and west.
    pub const SW: Directions = Directions(0b0011);
    /// East only.
    pub const E: Directions = Directions(0b0100);
    /// East and west.
    pub const EW: Directions = Directions(0b0101);
    /// East and south.
    pub const ES: Directions = Directions(0b0110);
    /// East, south, and west.
    pub const ESW: Directions = Directions(0b0111);
    /// North only.
    pub const N: Directions = Directions(0b1000);
    /// North and west.
    pub const NW: Directions = Directions(0b1001);
    /// North and south.
    pub const NS: Directions = Directions(0b1010);
    /// North, south, and west.
    pub const NSW: Directions = Directions(0b1011);
    /// North and east.
    pub const NE: Directions = Directions(0b1100);
    /// North, east, and west.
    pub const NEW: Directions = Directions(0b1101);
    /// North, east, and south.
    pub const NES: Directions = Directions(0b1110);
    /// All four directions.
    pub const NESW: Directions = Directions(0b1111);

    /// Creates a direction set from its raw 4-bit encoding.
    ///
    /// Bits above the lowest four are discarded.
    pub const fn from_bits(bits: u8) -> Self {
        Directions(bits & 0b1111)
    }

    /// Returns the raw 4-bit encoding.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Returns `true` if no direction is set.
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if all directions in `d` are contained in `self`.
    pub const fn contains(self, d: Directions) -> bool {
        self.0 & d.0 == d.0
    }

    /// Returns the number of directions set.
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Returns the set of opposite directions.
    ///
    /// Implemented as a rotation of the underlying 4-bit string by two
    /// positions, which maps N ↔ S and E ↔ W simultaneously.
    pub const fn opposite(self) -> Self {
        Directions(((self.0 << 2) | (self.0 >> 2)) & 0b1111)
    }
}

impl BitOr for Directions {
    type Output = Directions;

    fn bitor(self, rhs: Directions) -> Directions {
        Directions(self.0 | rhs.0)
    }
}

impl BitOrAssign for Directions {
    fn bitor_assign(&mut self, rhs: Directions) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Directions {
    type Output = Directions;

    fn bitand(self, rhs: Directions) -> Directions {
        Directions(self.0 & rhs.0)
    }
}

impl BitAndAssign for Directions {
    fn bitand_assign(&mut self, rhs: Directions) {
        self.0 &= rhs.0;
    }
}

impl Not for Directions {
    type Output = Directions;

    fn not(self) -> Directions {
        Directions(!self.0 & 0b1111)
    }
}

impl fmt::Debug for Directions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Directions({self})")
    }
}

impl fmt::Display for Directions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            return write!(f, "∅");
        }
        if self.contains(Directions::N) {
            write!(f, "N")?;
        }
        if self.contains(Directions::E) {
            write!(f, "E")?;
        }
        if self.contains(Directions::S) {
            write!(f, "S")?;
        }
        if self.contains(Directions::W) {
            write!(f, "W")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singleton_opposites() {
        assert_eq!(Directions::N.opposite(), Directions::S);
        assert_eq!(Directions::E.opposite(), Directions::W);
        assert_eq!(Directions::S.opposite(), Directions::N);
        assert_eq!(Directions::W.opposite(), Directions::E);
    }

    #[test]
    fn opposite_of_opposite_is_identity() {
        for bits in 0..16u8 {
            let d = Directions::from_bits(bits);
            assert_eq!(d.opposite().opposite(), d);
        }
    }

    #[test]
    fn opposite_of_combined_masks() {
        assert_eq!(Directions::NE.opposite(), Directions::SW);
        assert_eq!(Directions::NS.opposite(), Directions::NS);
        assert_eq!(Directions::NESW.opposite(), Directions::NESW);
        assert_eq!(Directions::NONE.opposite(), Directions::NONE);
    }

    #[test]
    fn union_and_intersection() {
        assert_eq!(Directions::N | Directions::E, Directions::NE);
        assert_eq!(Directions::NESW & Directions::SW, Directions::SW);
        assert_eq!(Directions::N & Directions::S, Directions::NONE);
    }

    #[test]
    fn complement() {
        assert_eq!(!Directions::NONE, Directions::NESW);
        assert_eq!(!Directions::NE, Directions::SW);
    }

    #[test]
    fn containment() {
        assert!(Directions::NESW.contains(Directions::ES));
        assert!(!Directions::NE.contains(Directions::S));
        assert!(Directions::NONE.contains(Directions::NONE));
    }

    #[test]
    fn assign_operators() {
        let mut d = Directions::NONE;
        d |= Directions::N;
        d |= Directions::W;
        assert_eq!(d, Directions::NW);
        d &= Directions::N;
        assert_eq!(d, Directions::N);
    }

    #[test]
    fn count_set_bits() {
        assert_eq!(Directions::NONE.count(), 0);
        assert_eq!(Directions::E.count(), 1);
        assert_eq!(Directions::NS.count(), 2);
        assert_eq!(Directions::NESW.count(), 4);
    }

    #[test]
    fn from_bits_masks_high_bits() {
        assert_eq!(Directions::from_bits(0b1111_0101), Directions::EW);
    }

    #[test]
    fn display_format() {
        assert_eq!(format!("{}", Directions::NONE), "∅");
        assert_eq!(format!("{}", Directions::NE), "NE");
        assert_eq!(format!("{}", Directions::NESW), "NESW");
    }

    #[test]
    fn serde_roundtrip() {
        let d = Directions::ESW;
        let json = serde_json::to_string(&d).unwrap();
        let restored: Directions = serde_json::from_str(&json).unwrap();
        assert_eq!(d, restored);
    }
}

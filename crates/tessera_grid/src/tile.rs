//! Tile coordinates.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of the ground layer.
pub const GROUND: usize = 0;

/// A face of a 3-dimensional layout grid, addressed by `(x, y, z)`.
///
/// Numbering starts in the upper left ground-layer corner at `(0, 0, 0)`.
/// `z == 0` is the ground layer; higher layers carry wire crossings.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Tile {
    /// Column coordinate, growing eastwards.
    pub x: usize,
    /// Row coordinate, growing southwards.
    pub y: usize,
    /// Layer coordinate, growing upwards from the ground layer.
    pub z: usize,
}

impl Tile {
    /// Creates a tile at `(x, y, z)`.
    pub const fn new(x: usize, y: usize, z: usize) -> Self {
        Tile { x, y, z }
    }

    /// Creates a tile in the ground layer at `(x, y, 0)`.
    pub const fn ground_at(x: usize, y: usize) -> Self {
        Tile { x, y, z: GROUND }
    }

    /// Returns the `(x, y)` projection of this tile onto the ground layer.
    pub const fn ground(self) -> (usize, usize) {
        (self.x, self.y)
    }

    /// Returns `true` if this tile lies in the ground layer.
    pub const fn is_ground(self) -> bool {
        self.z == GROUND
    }

    /// Returns the same position in the ground layer.
    pub const fn to_ground(self) -> Tile {
        Tile {
            x: self.x,
            y: self.y,
            z: GROUND,
        }
    }
}

impl fmt::Debug for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.x, self.y, self.z)
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.x, self.y, self.z)
    }
}

impl From<(usize, usize)> for Tile {
    fn from((x, y): (usize, usize)) -> Self {
        Tile::ground_at(x, y)
    }
}

impl From<(usize, usize, usize)> for Tile {
    fn from((x, y, z): (usize, usize, usize)) -> Self {
        Tile::new(x, y, z)
    }
}

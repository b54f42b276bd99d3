//! Rectangular 3-dimensional face grids.

use crate::direction::Directions;
use crate::tile::{Tile, GROUND};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A rectangular 3-dimensional set of faces.
///
/// Faces live at `(x, y, z)` with `x < width`, `y < height`, `z < layers`.
/// The ground layer `z == 0` hosts gates and wires; layers above it host
/// crossings. Boundaries are closed: neighbor queries outside the current
/// dimensions return `None` and never wrap around.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: usize,
    height: usize,
    layers: usize,
}

impl Grid {
    /// Creates a grid with the given dimensions.
    ///
    /// `layers - 1` is the number of crossing layers; a layout that supports
    /// crossings needs `layers >= 2`.
    pub fn new(width: usize, height: usize, layers: usize) -> Self {
        Grid {
            width,
            height,
            layers,
        }
    }

    /// Returns the grid's x-dimension.
    pub fn x(&self) -> usize {
        self.width
    }

    /// Returns the grid's y-dimension.
    pub fn y(&self) -> usize {
        self.height
    }

    /// Returns the grid's z-dimension.
    pub fn z(&self) -> usize {
        self.layers
    }

    /// Returns the number of faces per layer, i.e. `x * y`.
    pub fn area(&self) -> usize {
        self.width * self.height
    }

    /// Resizes the grid in place.
    ///
    /// Attributes stored elsewhere under tile positions are unaffected;
    /// positions that fall outside the new dimensions simply become
    /// unreachable.
    pub fn resize(&mut self, width: usize, height: usize, layers: usize) {
        self.width = width;
        self.height = height;
        self.layers = layers;
    }

    /// Returns `true` if `t` lies within the current dimensions.
    pub fn contains(&self, t: Tile) -> bool {
        t.x < self.width && t.y < self.height && t.z < self.layers
    }

    /// Returns the face at `(x, y, z)`, or `None` if it is out of range.
    pub fn at(&self, x: usize, y: usize, z: usize) -> Option<Tile> {
        let t = Tile::new(x, y, z);
        self.contains(t).then_some(t)
    }

    /// Returns the face north of `t` (y lower by one), or `None` at the rim.
    pub fn north(&self, t: Tile) -> Option<Tile> {
        (t.y > 0).then(|| Tile::new(t.x, t.y - 1, t.z))
    }

    /// Returns the face east of `t` (x higher by one), or `None` at the rim.
    pub fn east(&self, t: Tile) -> Option<Tile> {
        self.at(t.x + 1, t.y, t.z)
    }

    /// Returns the face south of `t` (y higher by one), or `None` at the rim.
    pub fn south(&self, t: Tile) -> Option<Tile> {
        self.at(t.x, t.y + 1, t.z)
    }

    /// Returns the face west of `t` (x lower by one), or `None` at the rim.
    pub fn west(&self, t: Tile) -> Option<Tile> {
        (t.x > 0).then(|| Tile::new(t.x - 1, t.y, t.z))
    }

    /// Returns the face above `t` (z higher by one), or `None` at the top.
    pub fn above(&self, t: Tile) -> Option<Tile> {
        self.at(t.x, t.y, t.z + 1)
    }

    /// Returns the face below `t` (z lower by one), or `None` in the ground
    /// layer.
    pub fn below(&self, t: Tile) -> Option<Tile> {
        (t.z > 0).then(|| Tile::new(t.x, t.y, t.z - 1))
    }

    /// Returns the in-layer neighbor of `t` in the single direction `d`, or
    /// `None` if `d` is not a singleton direction or the neighbor is out of
    /// range.
    pub fn neighbor(&self, t: Tile, d: Directions) -> Option<Tile> {
        match d {
            Directions::N => self.north(t),
            Directions::E => self.east(t),
            Directions::S => self.south(t),
            Directions::W => self.west(t),
            _ => None,
        }
    }

    /// Returns all faces adjacent to `t` within the same layer.
    pub fn surrounding_2d(&self, t: Tile) -> Vec<Tile> {
        [self.north(t), self.east(t), self.south(t), self.west(t)]
            .into_iter()
            .flatten()
            .collect()
    }

    /// Returns all faces adjacent to `t`, including the layers above and
    /// below.
    pub fn surrounding_3d(&self, t: Tile) -> Vec<Tile> {
        [
            self.north(t),
            self.east(t),
            self.south(t),
            self.west(t),
            self.above(t),
            self.below(t),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Returns `true` if `t` has fewer than four in-layer neighbors, i.e.
    /// lies at the layout's border.
    pub fn is_border(&self, t: Tile) -> bool {
        self.surrounding_2d(t).len() < 4
    }

    /// Returns the direction towards the border closest to `t`.
    ///
    /// Only a single direction is returned even if multiple borders are
    /// equally close.
    pub fn closest_border(&self, t: Tile) -> Directions {
        if t.x <= self.width / 2 {
            if t.y <= self.height / 2 {
                if t.x <= t.y {
                    Directions::W
                } else {
                    Directions::N
                }
            } else if t.x <= self.height - t.y {
                Directions::W
            } else {
                Directions::S
            }
        } else if t.y <= self.height / 2 {
            if self.width - t.x <= t.y {
                Directions::E
            } else {
                Directions::N
            }
        } else if self.width - t.x <= self.height - t.y {
            Directions::E
        } else {
            Directions::S
        }
    }

    /// Iterates over all faces of layer `n` in row-major order.
    pub fn layer_n(&self, n: usize) -> impl Iterator<Item = Tile> + '_ {
        let (w, within) = (self.width, n < self.layers);
        (0..if within { self.area() } else { 0 }).map(move |i| Tile::new(i % w, i / w, n))
    }

    /// Iterates over all faces in the ground layer in row-major order.
    pub fn ground_layer(&self) -> impl Iterator<Item = Tile> + '_ {
        self.layer_n(GROUND)
    }

    /// Iterates over all faces above the ground layer.
    pub fn crossing_layers(&self) -> impl Iterator<Item = Tile> + '_ {
        (1..self.layers).flat_map(move |z| self.layer_n(z))
    }

    /// Iterates over every face of the grid.
    pub fn tiles(&self) -> impl Iterator<Item = Tile> + '_ {
        (0..self.layers).flat_map(move |z| self.layer_n(z))
    }

    /// Samples a uniformly random face from the grid.
    ///
    /// # Panics
    ///
    /// Panics if the grid has no faces.
    pub fn random_face(&self) -> Tile {
        let mut rng = rand::thread_rng();
        Tile::new(
            rng.gen_range(0..self.width),
            rng.gen_range(0..self.height),
            rng.gen_range(0..self.layers),
        )
    }

    /// Samples a uniformly random face from layer `n`.
    ///
    /// # Panics
    ///
    /// Panics if the layer is out of range or the grid has no faces.
    pub fn random_face_in_layer(&self, n: usize) -> Tile {
        assert!(n < self.layers, "layer {n} out of range");
        let mut rng = rand::thread_rng();
        Tile::new(
            rng.gen_range(0..self.width),
            rng.gen_range(0..self.height),
            n,
        )
    }

    /// Returns the Euclidean distance between two faces.
    pub fn euclidean_distance(&self, t1: Tile, t2: Tile) -> f64 {
        let dx = t1.x as f64 - t2.x as f64;
        let dy = t1.y as f64 - t2.y as f64;
        let dz = t1.z as f64 - t2.z as f64;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Returns the Manhattan distance between two faces.
    pub fn manhattan_distance(&self, t1: Tile, t2: Tile) -> usize {
        t1.x.abs_diff(t2.x) + t1.y.abs_diff(t2.y) + t1.z.abs_diff(t2.z)
    }
}

//! Tile grids, directions, and clocking schemes for FCN layouts.
//!
//! This crate provides the geometric substrate that gate-level layouts are
//! built on: a rectangular 3-dimensional [`Grid`] of faces addressed by
//! [`Tile`] coordinates, the four-way [`Directions`] bitmask used to annotate
//! information flow between neighboring tiles, and [`ClockingScheme`]s that
//! assign clock phases to tiles either periodically (regular schemes) or
//! per-tile (open schemes).
//!
//! The ground layer (`z == 0`) hosts gates and wires; layers above it host
//! wire crossings. Boundaries are closed: neighbor queries at the rim return
//! `None` rather than wrapping.

#![warn(missing_docs)]

pub mod clocking;
pub mod direction;
pub mod grid;
pub mod tile;

pub use clocking::{lookup_clocking, ClockingScheme};
pub use direction::Directions;
pub use grid::Grid;
pub use tile::{Tile, GROUND};

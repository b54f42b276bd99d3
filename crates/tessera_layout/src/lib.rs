//! Gate-level layouts for FCN physical design.
//!
//! A [`GateLayout`] maps the vertices and edges of a
//! [`LogicNetwork`](tessera_network::LogicNetwork) onto the tiles of a
//! clocked [`Grid`](tessera_grid::Grid): at most one gate per tile, one or
//! more routed wires per wire tile, input/output direction masks on tiles
//! and on individual wires, primary-I/O flags, and optional latch delays.
//!
//! On top of the raw data model the crate provides the analyses that turn a
//! tile assignment into a circuit: information-flow tracing (where clocking
//! and logic agree), critical-path and throughput computation, the energy
//! model, bounding-box shrinking, a textual dump, and the port router that
//! derives tile-internal connector positions for downstream cell compilers.

#![warn(missing_docs)]

pub mod energy;
pub mod flow;
pub mod layout;
pub mod ports;
pub mod print;

pub use energy::EnergyInfo;
pub use flow::{Element, PathInfo};
pub use layout::{BoundingBox, GateLayout};
pub use ports::{CellTechnology, Port, PortError, PortList, PortRouter};

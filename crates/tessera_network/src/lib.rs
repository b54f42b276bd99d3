//! Logic networks for FCN physical design.
//!
//! A [`LogicNetwork`] is a directed acyclic multigraph whose vertices carry
//! Boolean operations ([`Operation`]) and whose edges carry signals between
//! them. Networks are built through typed builder methods (`create_pi`,
//! `create_and`, …) that enforce fan-in arities by construction, and are
//! reshaped by the rewrites in [`rewrite`]: XOR decomposition, fan-out
//! normalization, and balance-vertex insertion.
//!
//! Vertices and edges are arena-allocated and addressed by stable
//! [`VertexId`]/[`EdgeId`] indices; removal tombstones an entry instead of
//! shifting its neighbors.

#![warn(missing_docs)]

pub mod ids;
pub mod network;
pub mod operation;
pub mod rewrite;

pub use ids::{EdgeId, VertexId};
pub use network::{LogicNetwork, NetworkError};
pub use operation::Operation;
pub use rewrite::{substitute, FanoutDecomposition};

//! Port routing: deriving tile-internal connector positions.
//!
//! Downstream cell compilers expand every tile into a block of cells (5×5
//! for QCA, 4×4 for iNML) and need to know at which sub-cell positions
//! neighboring tiles connect. The port router derives these positions from
//! the direction masks of a completed layout. The mapping is a lookup keyed
//! by the directional signature of each tile; signatures without a library
//! entry are an error.

use crate::flow::Element;
use crate::layout::GateLayout;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tessera_grid::{Directions, Tile};
use tessera_network::{EdgeId, Operation, VertexId};

/// A connector position within a tile's cell block.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct Port {
    /// Horizontal cell position.
    pub u: usize,
    /// Vertical cell position.
    pub v: usize,
}

impl Port {
    /// Creates a port at cell position `(u, v)`.
    pub const fn new(u: usize, v: usize) -> Self {
        Port { u, v }
    }
}

/// The connector positions of one tile element.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct PortList {
    /// Input connector positions.
    pub inp: BTreeSet<Port>,
    /// Output connector positions.
    pub out: BTreeSet<Port>,
}

/// The cell technology and tile size ports are computed for.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum CellTechnology {
    /// Quantum-dot cellular automata with 5×5 cell tiles.
    Qca5x5,
    /// In-plane nanomagnet logic with 4×4 cell tiles.
    Inml4x4,
}

/// Errors raised during port computation.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// A tile's direction signature has no entry in the cell library.
    #[error("unsupported direction pattern on tile {tile}: inputs {inp}, outputs {out}")]
    UnsupportedPattern {
        /// The offending tile.
        tile: Tile,
        /// Its input direction mask.
        inp: Directions,
        /// Its output direction mask.
        out: Directions,
    },
}

/// Computed connector ports for every occupied tile of a layout.
#[derive(Debug, Clone, Default)]
pub struct PortRouter {
    gate_ports: HashMap<(Tile, VertexId), PortList>,
    wire_ports: HashMap<(Tile, EdgeId), PortList>,
}

impl PortRouter {
    /// Computes ports for all occupied tiles of the layout.
    pub fn compute(layout: &GateLayout, tech: CellTechnology) -> Result<Self, PortError> {
        let mut router = PortRouter::default();
        match tech {
            CellTechnology::Qca5x5 => router.compute_qca(layout)?,
            CellTechnology::Inml4x4 => router.compute_inml(layout)?,
        }
        Ok(router)
    }

    /// Returns the ports of the vertex on tile `t`, if computed.
    pub fn gate_ports(&self, t: Tile, v: VertexId) -> Option<&PortList> {
        self.gate_ports.get(&(t, v))
    }

    /// Returns the ports of edge `e` on tile `t`, if computed.
    pub fn wire_ports(&self, t: Tile, e: EdgeId) -> Option<&PortList> {
        self.wire_ports.get(&(t, e))
    }

    // ------------------------------------------------------------------
    // QCA 5×5
    // ------------------------------------------------------------------

    /// Maps a single direction onto the QCA 5×5 border midpoints
    /// `{(2,0), (4,2), (2,4), (0,2)}`.
    fn qca_port(d: Directions) -> Option<Port> {
        match d {
            Directions::N => Some(Port::new(2, 0)),
            Directions::E => Some(Port::new(4, 2)),
            Directions::S => Some(Port::new(2, 4)),
            Directions::W => Some(Port::new(0, 2)),
            _ => None,
        }
    }

    fn compute_qca(&mut self, layout: &GateLayout) -> Result<(), PortError> {
        const BORDER_MIDPOINTS: [(Directions, Port); 4] = [
            (Directions::N, Port::new(2, 0)),
            (Directions::E, Port::new(4, 2)),
            (Directions::S, Port::new(2, 4)),
            (Directions::W, Port::new(0, 2)),
        ];

        for t in layout.grid().tiles().filter(|&t| !layout.is_free_tile(t)) {
            if let Some(v) = layout.get_vertex(t) {
                let mut p = PortList::default();
                for (d, port) in BORDER_MIDPOINTS {
                    if layout.tile_inp_dirs(t).contains(d) {
                        p.inp.insert(port);
                    }
                    if layout.tile_out_dirs(t).contains(d) {
                        p.out.insert(port);
                    }
                }
                self.gate_ports.insert((t, v), p);
            } else {
                for e in layout.edges_at(t) {
                    let mut p = PortList::default();
                    let unsupported = || PortError::UnsupportedPattern {
                        tile: t,
                        inp: layout.wire_inp_dirs(t, e),
                        out: layout.wire_out_dirs(t, e),
                    };
                    // routed wires enter and leave through exactly one face
                    p.inp.insert(
                        Self::qca_port(layout.wire_inp_dirs(t, e)).ok_or_else(unsupported)?,
                    );
                    p.out.insert(
                        Self::qca_port(layout.wire_out_dirs(t, e)).ok_or_else(unsupported)?,
                    );
                    self.wire_ports.insert((t, e), p);
                }
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // iNML 4×4
    // ------------------------------------------------------------------

    /// Returns `true` if the data-flow predecessor of `gw` on `t` is a gate
    /// whose output connector sits low (AND/OR/MAJ).
    fn inml_low_predecessor(layout: &GateLayout, t: Tile, gw: Element) -> bool {
        layout
            .incoming_data_flow(t, gw)
            .first()
            .and_then(|&(it, _)| layout.get_op(it))
            .is_some_and(|op| {
                matches!(op, Operation::And | Operation::Or | Operation::Maj)
            })
    }

    /// Returns `true` if the data-flow successor of `gw` on `t` is a
    /// fan-out, whose input connector sits low.
    fn inml_fanout_successor(layout: &GateLayout, t: Tile, gw: Element) -> bool {
        layout
            .outgoing_data_flow(t, gw)
            .first()
            .and_then(|&(at, _)| layout.get_op(at))
            .is_some_and(|op| op.is_fanout())
    }

    /// Maps an input direction onto the iNML 4×4 west face.
    ///
    /// Signals from the north dock at the top, signals from the west at
    /// mid-height (or at the bottom after an AND/OR/MAJ, whose outputs sit
    /// low), signals from the south at the bottom. MAJ gates take their
    /// northern input at the bottom-center instead. Eastern inputs have no
    /// library entry.
    fn inml_inp_port(
        layout: &GateLayout,
        t: Tile,
        gw: Element,
        op: Option<Operation>,
        d: Directions,
    ) -> Option<Port> {
        match d {
            Directions::N if op == Some(Operation::Maj) => Some(Port::new(1, 3)),
            Directions::N => Some(Port::new(0, 0)),
            Directions::W => {
                if Self::inml_low_predecessor(layout, t, gw) {
                    Some(Port::new(0, 3))
                } else {
                    Some(Port::new(0, 2))
                }
            }
            Directions::S => Some(Port::new(0, 3)),
            _ => None,
        }
    }

    /// Maps an output direction onto the iNML 4×4 east face.
    ///
    /// AND/OR/MAJ emit at `(3,1)`; everything else emits at mid-height, or
    /// at the bottom when feeding a fan-out. Western outputs have no library
    /// entry.
    fn inml_out_port(
        layout: &GateLayout,
        t: Tile,
        gw: Element,
        op: Option<Operation>,
        d: Directions,
    ) -> Option<Port> {
        match d {
            Directions::N => Some(Port::new(3, 0)),
            Directions::E => match op {
                Some(Operation::And) | Some(Operation::Or) | Some(Operation::Maj) => {
                    Some(Port::new(3, 1))
                }
                _ if Self::inml_fanout_successor(layout, t, gw) => Some(Port::new(3, 3)),
                _ => Some(Port::new(3, 2)),
            },
            Directions::S => Some(Port::new(3, 3)),
            _ => None,
        }
    }

    fn compute_inml(&mut self, layout: &GateLayout) -> Result<(), PortError> {
        for t in layout.grid().tiles().filter(|&t| !layout.is_free_tile(t)) {
            if let Some(v) = layout.get_vertex(t) {
                let gw = Element::Gate(v);
                let op = layout.get_op(t);
                let mut p = PortList::default();
                for d in [Directions::N, Directions::E, Directions::S, Directions::W] {
                    if layout.tile_inp_dirs(t).contains(d) {
                        p.inp.insert(
                            Self::inml_inp_port(layout, t, gw, op, d).ok_or(
                                PortError::UnsupportedPattern {
                                    tile: t,
                                    inp: layout.tile_inp_dirs(t),
                                    out: layout.tile_out_dirs(t),
                                },
                            )?,
                        );
                    }
                    if layout.tile_out_dirs(t).contains(d) {
                        p.out.insert(
                            Self::inml_out_port(layout, t, gw, op, d).ok_or(
                                PortError::UnsupportedPattern {
                                    tile: t,
                                    inp: layout.tile_inp_dirs(t),
                                    out: layout.tile_out_dirs(t),
                                },
                            )?,
                        );
                    }
                }
                self.gate_ports.insert((t, v), p);
            } else {
                for e in layout.edges_at(t) {
                    let gw = Element::Wire(e);
                    let mut p = PortList::default();
                    let unsupported = || PortError::UnsupportedPattern {
                        tile: t,
                        inp: layout.wire_inp_dirs(t, e),
                        out: layout.wire_out_dirs(t, e),
                    };
                    p.inp.insert(
                        Self::inml_inp_port(layout, t, gw, None, layout.wire_inp_dirs(t, e))
                            .ok_or_else(unsupported)?,
                    );
                    p.out.insert(
                        Self::inml_out_port(layout, t, gw, None, layout.wire_out_dirs(t, e))
                            .ok_or_else(unsupported)?,
                    );
                    self.wire_ports.insert((t, e), p);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tessera_grid::ClockingScheme;
    use tessera_network::LogicNetwork;

    fn wired_chain() -> (GateLayout, VertexId, VertexId, EdgeId) {
        let mut n = LogicNetwork::new("chain");
        let a = n.create_pi("a");
        let g = n.create_not(a);
        let e = n.get_edge(a, g).unwrap();
        let mut l = GateLayout::new(3, 1, 2, ClockingScheme::twoddwave_4(), Arc::new(n));
        l.assign_vertex(Tile::new(0, 0, 0), a, true, false);
        l.assign_edge(Tile::new(1, 0, 0), e);
        l.assign_vertex(Tile::new(2, 0, 0), g, false, false);
        l.assign_tile_out_dir(Tile::new(0, 0, 0), Directions::E);
        l.assign_wire_inp_dir(Tile::new(1, 0, 0), e, Directions::W);
        l.assign_wire_out_dir(Tile::new(1, 0, 0), e, Directions::E);
        l.assign_tile_inp_dir(Tile::new(2, 0, 0), Directions::W);
        (l, a, g, e)
    }

    #[test]
    fn qca_gate_ports_use_border_midpoints() {
        let (l, a, g, _) = wired_chain();
        let router = PortRouter::compute(&l, CellTechnology::Qca5x5).unwrap();

        let pi_ports = router.gate_ports(Tile::new(0, 0, 0), a).unwrap();
        assert!(pi_ports.inp.is_empty());
        assert_eq!(pi_ports.out.iter().next(), Some(&Port::new(4, 2)));

        let not_ports = router.gate_ports(Tile::new(2, 0, 0), g).unwrap();
        assert_eq!(not_ports.inp.iter().next(), Some(&Port::new(0, 2)));
    }

    #[test]
    fn qca_wire_ports() {
        let (l, _, _, e) = wired_chain();
        let router = PortRouter::compute(&l, CellTechnology::Qca5x5).unwrap();
        let p = router.wire_ports(Tile::new(1, 0, 0), e).unwrap();
        assert_eq!(p.inp.iter().next(), Some(&Port::new(0, 2)));
        assert_eq!(p.out.iter().next(), Some(&Port::new(4, 2)));
    }

    #[test]
    fn qca_admissible_positions() {
        let admissible: BTreeSet<Port> = [
            Port::new(2, 0),
            Port::new(4, 2),
            Port::new(2, 4),
            Port::new(0, 2),
        ]
        .into_iter()
        .collect();
        let (mut l, _, g, _) = wired_chain();
        let t = Tile::new(2, 0, 0);
        l.assign_tile_out_dir(t, Directions::S);
        let router = PortRouter::compute(&l, CellTechnology::Qca5x5).unwrap();
        let p = router.gate_ports(t, g).unwrap();
        assert!(p.inp.iter().chain(&p.out).all(|q| admissible.contains(q)));
    }

    #[test]
    fn qca_rejects_multi_direction_wire() {
        let (mut l, _, _, e) = wired_chain();
        let t = Tile::new(1, 0, 0);
        // a wire entering through two faces has no 5×5 library entry
        l.assign_wire_inp_dir(t, e, Directions::N);
        let err = PortRouter::compute(&l, CellTechnology::Qca5x5).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("unsupported direction pattern"));
        assert!(msg.contains("(1,0,0)"));
    }

    #[test]
    fn inml_wire_ports_follow_west_east_flow() {
        let (l, _, _, e) = wired_chain();
        let router = PortRouter::compute(&l, CellTechnology::Inml4x4).unwrap();
        let p = router.wire_ports(Tile::new(1, 0, 0), e).unwrap();
        assert_eq!(p.inp.iter().next(), Some(&Port::new(0, 2)));
        assert_eq!(p.out.iter().next(), Some(&Port::new(3, 2)));
    }

    #[test]
    fn inml_logic_gate_emits_low() {
        let mut n = LogicNetwork::new("and");
        let a = n.create_pi("a");
        let b = n.create_pi("b");
        let g = n.create_and(a, b);
        let y = n.create_po(g, "y");
        let mut l = GateLayout::new(3, 2, 2, ClockingScheme::twoddwave_4(), Arc::new(n));
        l.assign_vertex(Tile::new(0, 0, 0), a, true, false);
        l.assign_vertex(Tile::new(1, 1, 0), b, true, false);
        l.assign_vertex(Tile::new(1, 0, 0), g, false, false);
        l.assign_vertex(Tile::new(2, 0, 0), y, false, true);
        l.assign_tile_out_dir(Tile::new(0, 0, 0), Directions::E);
        l.assign_tile_inp_dir(Tile::new(1, 0, 0), Directions::SW);
        l.assign_tile_out_dir(Tile::new(1, 0, 0), Directions::E);
        l.assign_tile_out_dir(Tile::new(1, 1, 0), Directions::N);
        l.assign_tile_inp_dir(Tile::new(2, 0, 0), Directions::W);

        let router = PortRouter::compute(&l, CellTechnology::Inml4x4).unwrap();
        let and_ports = router.gate_ports(Tile::new(1, 0, 0), g).unwrap();
        assert!(and_ports.out.contains(&Port::new(3, 1)));
        // western and southern inputs dock on the west face
        assert!(and_ports.inp.contains(&Port::new(0, 2)));
        assert!(and_ports.inp.contains(&Port::new(0, 3)));
    }

    #[test]
    fn inml_rejects_westward_output() {
        let (mut l, _, g, _) = wired_chain();
        let t = Tile::new(2, 0, 0);
        l.assign_tile_out_dir(t, Directions::W);
        assert!(PortRouter::compute(&l, CellTechnology::Inml4x4).is_err());
    }

    #[test]
    fn port_list_serde_roundtrip() {
        let mut p = PortList::default();
        p.inp.insert(Port::new(0, 2));
        p.out.insert(Port::new(4, 2));
        let json = serde_json::to_string(&p).unwrap();
        let restored: PortList = serde_json::from_str(&json).unwrap();
        assert_eq!(p, restored);
    }
}

//! Red/blue edge coloring.
//!
//! Walking the joint-DFS ordering in reverse, every vertex decides a color
//! for its still-uncolored incoming edges and propagates it: sibling
//! outgoing edges of a source receive the contrary color, sibling incoming
//! edges of a target the same color. At the fixpoint, all incoming edges of
//! any vertex share one color; red drives horizontal and blue vertical
//! placement in the embedding.

use std::collections::HashMap;
use tessera_network::{EdgeId, LogicNetwork, VertexId};

/// The color of an edge during and after the coloring pass.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum RbColor {
    /// Not yet colored.
    White,
    /// Horizontal routing.
    Red,
    /// Vertical routing.
    Blue,
}

impl RbColor {
    fn contrary(self) -> RbColor {
        match self {
            RbColor::Red => RbColor::Blue,
            RbColor::Blue => RbColor::Red,
            RbColor::White => RbColor::White,
        }
    }
}

/// Computes a red/blue coloring of the network's edges.
pub(crate) fn rb_coloring(
    network: &LogicNetwork,
    io_ports: bool,
    jdfs: &[VertexId],
) -> HashMap<EdgeId, RbColor> {
    let mut coloring: HashMap<EdgeId, RbColor> = network
        .edges(io_ports, false)
        .map(|e| (e, RbColor::White))
        .collect();

    fn apply(
        network: &LogicNetwork,
        io_ports: bool,
        coloring: &mut HashMap<EdgeId, RbColor>,
        e: EdgeId,
        c: RbColor,
    ) {
        if coloring.get(&e) != Some(&RbColor::White) {
            return;
        }
        coloring.insert(e, c);

        let siblings_out: Vec<EdgeId> = network
            .out_edges(network.source(e), io_ports, false)
            .filter(|&oe| oe != e)
            .collect();
        for oe in siblings_out {
            apply(network, io_ports, coloring, oe, c.contrary());
        }

        let siblings_in: Vec<EdgeId> = network
            .in_edges(network.target(e), io_ports, false)
            .filter(|&ie| ie != e)
            .collect();
        for ie in siblings_in {
            apply(network, io_ports, coloring, ie, c);
        }
    }

    for &v in jdfs.iter().rev() {
        let incoming: Vec<EdgeId> = network.in_edges(v, io_ports, false).collect();
        // any blue fan-in forces the rest blue; fresh fan-ins default to red
        let color = if incoming
            .iter()
            .any(|e| coloring.get(e) == Some(&RbColor::Blue))
        {
            RbColor::Blue
        } else {
            RbColor::Red
        };

        for e in incoming {
            apply(network, io_ports, &mut coloring, e, color);
        }
    }

    coloring
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ortho::jdfs::jdfs_order;
    use tessera_network::rewrite::substitute;

    fn assert_coloring_invariant(
        network: &LogicNetwork,
        coloring: &HashMap<EdgeId, RbColor>,
        io_ports: bool,
    ) {
        for v in network.vertices(io_ports, false) {
            let incoming: Vec<RbColor> = network
                .in_edges(v, io_ports, false)
                .map(|e| coloring[&e])
                .collect();
            // all incoming edges share one color
            assert!(
                incoming.windows(2).all(|w| w[0] == w[1]),
                "mixed fan-in colors at {v}"
            );
            // outgoing edges take at most two colors by construction
            for e in network.in_edges(v, io_ports, false) {
                assert_ne!(coloring[&e], RbColor::White);
            }
        }
    }

    #[test]
    fn tree_fanins_are_uniformly_colored() {
        let mut n = LogicNetwork::new("tree");
        let a = n.create_pi("a");
        let b = n.create_pi("b");
        let c = n.create_pi("c");
        let d = n.create_pi("d");
        let o1 = n.create_or(a, b);
        let o2 = n.create_or(c, d);
        let g = n.create_and(o1, o2);
        n.create_po(g, "y");

        let order = jdfs_order(&n, true);
        let coloring = rb_coloring(&n, true, &order);
        assert_coloring_invariant(&n, &coloring, true);
    }

    #[test]
    fn fanout_siblings_get_contrary_colors() {
        let mut n = LogicNetwork::new("fan");
        let a = n.create_pi("a");
        n.create_po(a, "y1");
        n.create_po(a, "y2");
        n.create_po(a, "y3");
        substitute(&mut n);

        let order = jdfs_order(&n, true);
        let coloring = rb_coloring(&n, true, &order);
        assert_coloring_invariant(&n, &coloring, true);

        for v in n.vertices(true, false) {
            if n.op(v).is_fanout() {
                let outs: Vec<RbColor> = n
                    .out_edges(v, true, false)
                    .map(|e| coloring[&e])
                    .collect();
                assert_eq!(outs.len(), 2);
                assert_ne!(outs[0], outs[1]);
            }
        }
    }

    #[test]
    fn decomposed_xor_is_colorable() {
        let mut n = LogicNetwork::new("xor");
        let a = n.create_pi("a");
        let b = n.create_pi("b");
        let g = n.create_xor(a, b);
        n.create_po(g, "y");
        substitute(&mut n);

        let order = jdfs_order(&n, true);
        let coloring = rb_coloring(&n, true, &order);
        assert_coloring_invariant(&n, &coloring, true);
        // every edge received a definite color
        assert!(coloring.values().all(|&c| c != RbColor::White));
    }
}

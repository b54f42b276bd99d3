//! Network rewrites: XOR decomposition and fan-out normalization.
//!
//! The placement engines require networks in which every operation matches
//! the gate library: no XOR vertices, and no vertex other than a fan-out
//! with more than one outgoing edge. [`substitute`] establishes that normal
//! form in two passes:
//!
//! ```text
//!  raw ──decompose XOR──▶ decomposed ──insert fan-outs──▶ normal
//! ```
//!
//! `normal` is a fixpoint: running [`substitute`] again changes nothing.

use crate::ids::VertexId;
use crate::network::LogicNetwork;
use crate::operation::Operation;

/// How a multi-target fan-out is decomposed into `F1O2` vertices.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum FanoutDecomposition {
    /// A chain of fan-outs, each serving one target and feeding the next.
    #[default]
    DepthFirst,
    /// A balanced tree of fan-outs.
    BreadthFirst,
}

/// Rewrites the network into the placement normal form.
///
/// First decomposes every XOR vertex into `F1O2`/`AND`/`OR`/`NOT` gates,
/// then inserts chained fan-outs so that every vertex except `F1O2`/`F1O3`
/// has at most one outgoing edge.
pub fn substitute(network: &mut LogicNetwork) {
    decompose_xors(network);
    insert_fanouts(network, FanoutDecomposition::DepthFirst);
}

/// Decomposes all XOR vertices into `F1O2`/`AND`/`OR`/`NOT` structures.
pub fn decompose_xors(network: &mut LogicNetwork) {
    loop {
        let next = network
            .vertices(false, false)
            .find(|&v| network.op(v) == Operation::Xor);
        match next {
            Some(v) => decompose_xor(network, v),
            None => break,
        }
    }
}

/// Expands a single XOR vertex:
///
/// ```text
///   a ──▶ F1O2 ──▶ AND ──▶ NOT ──▶ AND ──▶ …
///            ╲     ╱              ╱
///             ▶ OR ──────────────╯
///            ╱     ╲  (second F1O2 feeds AND and OR alike)
///   b ──▶ F1O2
/// ```
fn decompose_xor(network: &mut LogicNetwork, xor: VertexId) {
    let fo_1 = network.create_vertex(Operation::F1O2);
    let fo_2 = network.create_vertex(Operation::F1O2);
    let and_1 = network.create_vertex(Operation::And);
    let and_2 = network.create_vertex(Operation::And);
    let not = network.create_vertex(Operation::Not);
    let or = network.create_vertex(Operation::Or);

    network.connect(fo_1, and_1);
    network.connect(fo_1, or);
    network.connect(fo_2, and_1);
    network.connect(fo_2, or);
    network.connect(and_1, not);
    network.connect(not, and_2);
    network.connect(or, and_2);

    let preds: Vec<VertexId> = network.inv_adjacent(xor, true, true).collect();
    network.connect(preds[0], fo_1);
    network.connect(preds[1], fo_2);

    let succs: Vec<VertexId> = network.adjacent(xor, true, true).collect();
    for s in succs {
        network.connect(and_2, s);
    }

    network.remove_vertex(xor);
}

/// Replaces every vertex with more than one outgoing edge by `F1O2`
/// structures according to the chosen decomposition.
pub fn insert_fanouts(network: &mut LogicNetwork, decomposition: FanoutDecomposition) {
    let oversubscribed: Vec<VertexId> = network
        .vertices(true, true)
        .filter(|&v| network.out_degree(v, true, true) > 1 && !network.op(v).is_fanout())
        .collect();

    for v in oversubscribed {
        let out_edges: Vec<_> = network.out_edges(v, true, true).collect();
        let targets: Vec<VertexId> = out_edges.iter().map(|&e| network.target(e)).collect();

        match decomposition {
            FanoutDecomposition::DepthFirst => {
                let mut predecessor = v;
                for (i, &t) in targets.iter().enumerate() {
                    if i + 1 == targets.len() {
                        network.connect(predecessor, t);
                    } else {
                        let fan_out = network.create_vertex(Operation::F1O2);
                        network.connect(predecessor, fan_out);
                        network.connect(fan_out, t);
                        predecessor = fan_out;
                    }
                }
            }
            FanoutDecomposition::BreadthFirst => {
                fanout_tree(network, v, &targets);
            }
        }

        for e in out_edges {
            network.remove_edge(e);
        }
    }
}

/// Connects `source` to all `targets` through a balanced `F1O2` tree.
fn fanout_tree(network: &mut LogicNetwork, source: VertexId, targets: &[VertexId]) {
    match targets {
        [] => {}
        [t] => {
            network.connect(source, *t);
        }
        _ => {
            let fan_out = network.create_vertex(Operation::F1O2);
            network.connect(source, fan_out);
            let (left, right) = targets.split_at(targets.len().div_ceil(2));
            fanout_tree(network, fan_out, left);
            fanout_tree(network, fan_out, right);
        }
    }
}

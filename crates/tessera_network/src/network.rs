//! The logic-network graph.

use crate::ids::{EdgeId, VertexId};
use crate::operation::{Operation, ALL_OPERATIONS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::collections::HashMap;

/// Errors raised by network construction and validation.
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    /// A vertex carries a number of fan-ins that does not match its
    /// operation's arity.
    #[error("arity violation on {op}: expected {expected} fan-ins, found {actual}")]
    ArityViolation {
        /// The offending operation.
        op: Operation,
        /// Fan-ins required by the operation.
        expected: usize,
        /// Fan-ins actually present.
        actual: usize,
    },
}

/// A vertex record: operation plus incident edge lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Node {
    op: Operation,
    ins: Vec<EdgeId>,
    outs: Vec<EdgeId>,
    alive: bool,
}

/// An edge record connecting two vertices.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EdgeRec {
    source: VertexId,
    target: VertexId,
    alive: bool,
}

/// A directed acyclic multigraph of typed Boolean operations.
///
/// Networks always contain the two constant vertices `ZERO` and `ONE`.
/// Primary inputs and outputs are tracked in explicit sets and carry port
/// names. Most query functions take `ios`/`consts` flags controlling whether
/// I/O and constant vertices (and edges touching them) are included; the
/// engines mostly work on the filtered view.
///
/// Vertices and edges are never reused: removal tombstones the record so that
/// all previously handed-out IDs of live entities stay valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogicNetwork {
    name: String,
    nodes: Vec<Node>,
    edges: Vec<EdgeRec>,
    pi_set: BTreeSet<VertexId>,
    po_set: BTreeSet<VertexId>,
    port_names: HashMap<VertexId, String>,
    op_counter: Vec<usize>,
    zero: VertexId,
    one: VertexId,
}

impl LogicNetwork {
    /// Creates an empty network carrying the given name.
    ///
    /// The constant vertices are allocated up front.
    pub fn new(name: impl Into<String>) -> Self {
        let mut ln = LogicNetwork {
            name: name.into(),
            nodes: Vec::new(),
            edges: Vec::new(),
            pi_set: BTreeSet::new(),
            po_set: BTreeSet::new(),
            port_names: HashMap::new(),
            op_counter: vec![0; ALL_OPERATIONS.len()],
            zero: VertexId::from_raw(0),
            one: VertexId::from_raw(1),
        };
        ln.zero = ln.create_vertex(Operation::Zero);
        ln.one = ln.create_vertex(Operation::One);
        ln
    }

    /// Returns the network's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Adds a vertex with the given operation and returns its ID.
    pub fn create_vertex(&mut self, op: Operation) -> VertexId {
        let id = VertexId::from_raw(self.nodes.len() as u32);
        self.nodes.push(Node {
            op,
            ins: Vec::new(),
            outs: Vec::new(),
            alive: true,
        });
        self.op_counter[op.index()] += 1;
        id
    }

    /// Removes a vertex together with all its incident edges.
    pub fn remove_vertex(&mut self, v: VertexId) {
        let incident: Vec<EdgeId> = self.node(v).ins.iter().chain(&self.node(v).outs).copied().collect();
        for e in incident {
            self.remove_edge(e);
        }
        let op = self.node(v).op;
        self.op_counter[op.index()] -= 1;
        self.node_mut(v).alive = false;
        self.pi_set.remove(&v);
        self.po_set.remove(&v);
        self.port_names.remove(&v);
    }

    /// Connects `a` to `b` and returns the new edge's ID.
    pub fn connect(&mut self, a: VertexId, b: VertexId) -> EdgeId {
        let id = EdgeId::from_raw(self.edges.len() as u32);
        self.edges.push(EdgeRec {
            source: a,
            target: b,
            alive: true,
        });
        self.node_mut(a).outs.push(id);
        self.node_mut(b).ins.push(id);
        id
    }

    /// Removes an edge from the network.
    pub fn remove_edge(&mut self, e: EdgeId) {
        if !self.edges[e.as_raw() as usize].alive {
            return;
        }
        let (s, t) = (self.source(e), self.target(e));
        self.edges[e.as_raw() as usize].alive = false;
        self.node_mut(s).outs.retain(|&oe| oe != e);
        self.node_mut(t).ins.retain(|&ie| ie != e);
    }

    /// Creates a primary input vertex with the given port name.
    pub fn create_pi(&mut self, name: impl Into<String>) -> VertexId {
        let v = self.create_vertex(Operation::Pi);
        self.pi_set.insert(v);
        self.port_names.insert(v, name.into());
        v
    }

    /// Creates a primary output vertex fed by `src`, with the given port
    /// name.
    pub fn create_po(&mut self, src: VertexId, name: impl Into<String>) -> VertexId {
        let v = self.create_vertex(Operation::Po);
        self.connect(src, v);
        self.po_set.insert(v);
        self.port_names.insert(v, name.into());
        v
    }

    /// Returns the constant vertex for the given polarity.
    pub fn get_constant(&self, value: bool) -> VertexId {
        if value {
            self.one
        } else {
            self.zero
        }
    }

    /// Creates a buffer fed by `a`.
    pub fn create_buf(&mut self, a: VertexId) -> VertexId {
        let v = self.create_vertex(Operation::Buf);
        self.connect(a, v);
        v
    }

    /// Creates an inverter fed by `a`.
    pub fn create_not(&mut self, a: VertexId) -> VertexId {
        let v = self.create_vertex(Operation::Not);
        self.connect(a, v);
        v
    }

    /// Creates a conjunction of `a` and `b`.
    pub fn create_and(&mut self, a: VertexId, b: VertexId) -> VertexId {
        let v = self.create_vertex(Operation::And);
        self.connect(a, v);
        self.connect(b, v);
        v
    }

    /// Creates a disjunction of `a` and `b`.
    pub fn create_or(&mut self, a: VertexId, b: VertexId) -> VertexId {
        let v = self.create_vertex(Operation::Or);
        self.connect(a, v);
        self.connect(b, v);
        v
    }

    /// Creates an exclusive disjunction of `a` and `b`.
    pub fn create_xor(&mut self, a: VertexId, b: VertexId) -> VertexId {
        let v = self.create_vertex(Operation::Xor);
        self.connect(a, v);
        self.connect(b, v);
        v
    }

    /// Creates a majority of `a`, `b`, and `c`.
    pub fn create_maj(&mut self, a: VertexId, b: VertexId, c: VertexId) -> VertexId {
        let v = self.create_vertex(Operation::Maj);
        self.connect(a, v);
        self.connect(b, v);
        self.connect(c, v);
        v
    }

    /// Splits edge `e` (`s → t`) by inserting a balance wire vertex `w`,
    /// leaving `s → w → t`. Returns the inserted vertex.
    pub fn create_balance_vertex(&mut self, e: EdgeId) -> VertexId {
        let (s, t) = (self.source(e), self.target(e));
        self.remove_edge(e);
        let w = self.create_vertex(Operation::W);
        self.connect(s, w);
        self.connect(w, t);
        w
    }

    // ------------------------------------------------------------------
    // Element access
    // ------------------------------------------------------------------

    /// Returns the operation of vertex `v`.
    pub fn op(&self, v: VertexId) -> Operation {
        self.node(v).op
    }

    /// Returns the source vertex of edge `e`.
    pub fn source(&self, e: EdgeId) -> VertexId {
        self.edges[e.as_raw() as usize].source
    }

    /// Returns the target vertex of edge `e`.
    pub fn target(&self, e: EdgeId) -> VertexId {
        self.edges[e.as_raw() as usize].target
    }

    /// Returns the live edge from `a` to `b`, if any.
    pub fn get_edge(&self, a: VertexId, b: VertexId) -> Option<EdgeId> {
        self.node(a).outs.iter().copied().find(|&e| self.target(e) == b)
    }

    /// Returns the port name of an I/O vertex, if one was stored.
    pub fn port_name(&self, v: VertexId) -> Option<&str> {
        self.port_names.get(&v).map(String::as_str)
    }

    fn node(&self, v: VertexId) -> &Node {
        &self.nodes[v.as_raw() as usize]
    }

    fn node_mut(&mut self, v: VertexId) -> &mut Node {
        &mut self.nodes[v.as_raw() as usize]
    }

    /// Returns `true` if `v` should be hidden under the given flags.
    fn hidden(&self, v: VertexId, ios: bool, consts: bool) -> bool {
        let op = self.node(v).op;
        (!ios && op.is_io()) || (!consts && op.is_const())
    }

    // ------------------------------------------------------------------
    // Ranges
    // ------------------------------------------------------------------

    /// Iterates over all vertices, optionally including I/Os and constants.
    pub fn vertices(&self, ios: bool, consts: bool) -> impl Iterator<Item = VertexId> + '_ {
        (0..self.nodes.len() as u32)
            .map(VertexId::from_raw)
            .filter(move |&v| self.node(v).alive && !self.hidden(v, ios, consts))
    }

    /// Iterates over all edges whose endpoints pass the given flags.
    pub fn edges(&self, ios: bool, consts: bool) -> impl Iterator<Item = EdgeId> + '_ {
        (0..self.edges.len() as u32)
            .map(EdgeId::from_raw)
            .filter(move |&e| {
                self.edges[e.as_raw() as usize].alive
                    && !self.hidden(self.source(e), ios, consts)
                    && !self.hidden(self.target(e), ios, consts)
            })
    }

    /// Iterates over the edges leaving `v` whose targets pass the flags.
    pub fn out_edges(&self, v: VertexId, ios: bool, consts: bool) -> impl Iterator<Item = EdgeId> + '_ {
        self.node(v)
            .outs
            .iter()
            .copied()
            .filter(move |&e| !self.hidden(self.target(e), ios, consts))
    }

    /// Iterates over the edges entering `v` whose sources pass the flags.
    pub fn in_edges(&self, v: VertexId, ios: bool, consts: bool) -> impl Iterator<Item = EdgeId> + '_ {
        self.node(v)
            .ins
            .iter()
            .copied()
            .filter(move |&e| !self.hidden(self.source(e), ios, consts))
    }

    /// Iterates over the successors of `v` that pass the flags.
    pub fn adjacent(&self, v: VertexId, ios: bool, consts: bool) -> impl Iterator<Item = VertexId> + '_ {
        self.out_edges(v, ios, consts).map(|e| self.target(e))
    }

    /// Iterates over the predecessors of `v` that pass the flags.
    pub fn inv_adjacent(&self, v: VertexId, ios: bool, consts: bool) -> impl Iterator<Item = VertexId> + '_ {
        self.in_edges(v, ios, consts).map(|e| self.source(e))
    }

    // ------------------------------------------------------------------
    // Counts and degrees
    // ------------------------------------------------------------------

    /// Returns the number of vertices with respect to the flags.
    pub fn vertex_count(&self, ios: bool, consts: bool) -> usize {
        self.vertices(ios, consts).count()
    }

    /// Returns the number of edges with respect to the flags.
    pub fn edge_count(&self, ios: bool, consts: bool) -> usize {
        self.edges(ios, consts).count()
    }

    /// Returns the number of edges leaving `v` with respect to the flags.
    pub fn out_degree(&self, v: VertexId, ios: bool, consts: bool) -> usize {
        self.out_edges(v, ios, consts).count()
    }

    /// Returns the number of edges entering `v` with respect to the flags.
    pub fn in_degree(&self, v: VertexId, ios: bool, consts: bool) -> usize {
        self.in_edges(v, ios, consts).count()
    }

    /// Returns the number of operations of the given type.
    pub fn operation_count(&self, op: Operation) -> usize {
        self.op_counter[op.index()]
    }

    /// Returns the number of constant signals, i.e. edges leaving the two
    /// constant vertices.
    pub fn const_count(&self) -> usize {
        self.out_degree(self.zero, true, true) + self.out_degree(self.one, true, true)
    }

    // ------------------------------------------------------------------
    // I/O bookkeeping
    // ------------------------------------------------------------------

    /// Returns `true` iff `v` is flagged as primary input.
    pub fn is_pi(&self, v: VertexId) -> bool {
        self.pi_set.contains(&v)
    }

    /// Returns `true` iff `v` has a primary-input predecessor.
    pub fn pre_pi(&self, v: VertexId) -> bool {
        self.inv_adjacent(v, true, false).any(|p| self.is_pi(p))
    }

    /// Returns `true` iff `v` is flagged as primary output.
    pub fn is_po(&self, v: VertexId) -> bool {
        self.po_set.contains(&v)
    }

    /// Returns `true` iff `v` has a primary-output successor.
    pub fn post_po(&self, v: VertexId) -> bool {
        self.adjacent(v, true, false).any(|s| self.is_po(s))
    }

    /// Returns `true` iff `v` is an explicit PI or PO vertex.
    pub fn is_io(&self, v: VertexId) -> bool {
        self.node(v).op.is_io()
    }

    /// Returns `true` iff `v` is a constant vertex.
    pub fn is_const(&self, v: VertexId) -> bool {
        self.node(v).op.is_const()
    }

    /// Returns the number of primary inputs.
    pub fn pi_count(&self) -> usize {
        self.pi_set.len()
    }

    /// Returns the number of primary outputs.
    pub fn po_count(&self) -> usize {
        self.po_set.len()
    }

    /// Iterates over all primary-input vertices in ID order.
    pub fn pis(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.pi_set.iter().copied()
    }

    /// Iterates over all primary-output vertices in ID order.
    pub fn pos(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.po_set.iter().copied()
    }

    // ------------------------------------------------------------------
    // Classification
    // ------------------------------------------------------------------

    fn only_contains(&self, logic: &[Operation]) -> bool {
        const STRUCTURAL: [Operation; 8] = [
            Operation::F1O2,
            Operation::F1O3,
            Operation::W,
            Operation::Pi,
            Operation::Po,
            Operation::One,
            Operation::Zero,
            Operation::Buf,
        ];
        ALL_OPERATIONS.iter().all(|&op| {
            STRUCTURAL.contains(&op) || logic.contains(&op) || self.operation_count(op) == 0
        })
    }

    /// Returns `true` iff the network contains only MAJ and NOT logic.
    pub fn is_mig(&self) -> bool {
        self.only_contains(&[Operation::Maj, Operation::Not])
    }

    /// Returns `true` iff the network contains only AND and NOT logic.
    pub fn is_aig(&self) -> bool {
        self.only_contains(&[Operation::And, Operation::Not])
    }

    /// Returns `true` iff the network contains only OR and NOT logic.
    pub fn is_oig(&self) -> bool {
        self.only_contains(&[Operation::Or, Operation::Not])
    }

    /// Returns `true` iff the network contains only AND, OR, and NOT logic.
    pub fn is_aoig(&self) -> bool {
        self.only_contains(&[Operation::And, Operation::Or, Operation::Not])
    }

    /// Returns `true` iff the network contains only MAJ, AND, OR, and NOT
    /// logic.
    pub fn is_maoig(&self) -> bool {
        self.only_contains(&[
            Operation::Maj,
            Operation::And,
            Operation::Or,
            Operation::Not,
        ])
    }

    // ------------------------------------------------------------------
    // Paths and validation
    // ------------------------------------------------------------------

    /// Returns all edge paths leading from fan-in-free vertices to `v`.
    ///
    /// A vertex without predecessors contributes the empty path. Edges hidden
    /// by the flags are not traversed; a vertex whose entire fan-in is hidden
    /// therefore yields no paths at all.
    pub fn all_paths(&self, v: VertexId, ios: bool, consts: bool) -> Vec<Vec<EdgeId>> {
        if self.node(v).ins.is_empty() {
            return vec![Vec::new()];
        }
        let mut paths = Vec::new();
        for e in self.in_edges(v, ios, consts) {
            let mut sub = self.all_paths(self.source(e), ios, consts);
            for p in &mut sub {
                p.push(e);
            }
            paths.append(&mut sub);
        }
        paths
    }

    /// Checks that every live vertex carries exactly the fan-in its
    /// operation requires, and that fan-out vertices respect their output
    /// bound.
    pub fn validate_arities(&self) -> Result<(), NetworkError> {
        for v in self.vertices(true, true) {
            let op = self.op(v);
            if op.is_const() {
                continue;
            }
            let actual = self.in_degree(v, true, true);
            if actual != op.num_inputs() {
                return Err(NetworkError::ArityViolation {
                    op,
                    expected: op.num_inputs(),
                    actual,
                });
            }
            if let Some(max) = op.max_outputs() {
                let outs = self.out_degree(v, true, true);
                if op.is_fanout() && outs > max {
                    return Err(NetworkError::ArityViolation {
                        op,
                        expected: max,
                        actual: outs,
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_input_net() -> (LogicNetwork, VertexId, VertexId, VertexId) {
        let mut n = LogicNetwork::new("test");
        let a = n.create_pi("a");
        let b = n.create_pi("b");
        let g = n.create_and(a, b);
        n.create_po(g, "y");
        (n, a, b, g)
    }

    #[test]
    fn constants_exist_up_front() {
        let n = LogicNetwork::new("empty");
        assert_eq!(n.operation_count(Operation::Zero), 1);
        assert_eq!(n.operation_count(Operation::One), 1);
        assert_ne!(n.get_constant(false), n.get_constant(true));
        assert!(n.is_const(n.get_constant(true)));
        assert_eq!(n.vertex_count(true, true), 2);
        assert_eq!(n.vertex_count(false, false), 0);
    }

    #[test]
    fn build_and_count() {
        let (n, ..) = two_input_net();
        assert_eq!(n.pi_count(), 2);
        assert_eq!(n.po_count(), 1);
        assert_eq!(n.vertex_count(false, false), 1);
        assert_eq!(n.vertex_count(true, false), 4);
        assert_eq!(n.edge_count(false, false), 0);
        assert_eq!(n.edge_count(true, false), 3);
        assert_eq!(n.operation_count(Operation::And), 1);
    }

    #[test]
    fn adjacency_respects_flags() {
        let (n, a, _, g) = two_input_net();
        // the AND's predecessors are I/Os, hidden by default
        assert_eq!(n.inv_adjacent(g, false, false).count(), 0);
        assert_eq!(n.inv_adjacent(g, true, false).count(), 2);
        assert_eq!(n.adjacent(a, true, false).next(), Some(g));
        assert_eq!(n.adjacent(g, false, false).count(), 0);
        assert_eq!(n.adjacent(g, true, false).count(), 1);
    }

    #[test]
    fn port_names_are_stored() {
        let (n, a, b, g) = two_input_net();
        assert_eq!(n.port_name(a), Some("a"));
        assert_eq!(n.port_name(b), Some("b"));
        assert_eq!(n.port_name(g), None);
    }

    #[test]
    fn pre_pi_and_post_po() {
        let (n, a, _, g) = two_input_net();
        assert!(n.pre_pi(g));
        assert!(n.post_po(g));
        assert!(!n.pre_pi(a));
    }

    #[test]
    fn balance_vertex_splits_edge() {
        let mut n = LogicNetwork::new("test");
        let a = n.create_pi("a");
        let g = n.create_not(a);
        n.create_po(g, "y");
        let e = n.get_edge(a, g).unwrap();
        let w = n.create_balance_vertex(e);
        assert_eq!(n.op(w), Operation::W);
        assert!(n.get_edge(a, g).is_none());
        assert!(n.get_edge(a, w).is_some());
        assert!(n.get_edge(w, g).is_some());
        assert_eq!(n.operation_count(Operation::W), 1);
    }

    #[test]
    fn remove_vertex_updates_counts_and_edges() {
        let (mut n, a, _, g) = two_input_net();
        n.remove_vertex(g);
        assert_eq!(n.operation_count(Operation::And), 0);
        assert_eq!(n.out_degree(a, true, true), 0);
        assert_eq!(n.vertex_count(true, false), 3);
    }

    #[test]
    fn get_edge_finds_live_edges_only() {
        let mut n = LogicNetwork::new("test");
        let a = n.create_pi("a");
        let g = n.create_buf(a);
        let e = n.get_edge(a, g).unwrap();
        n.remove_edge(e);
        assert!(n.get_edge(a, g).is_none());
    }

    #[test]
    fn classification() {
        let (n, ..) = two_input_net();
        assert!(n.is_aoig());
        assert!(n.is_aig());
        assert!(!n.is_oig());
        assert!(n.is_maoig());
        assert!(!n.is_mig());

        let mut x = LogicNetwork::new("xor");
        let a = x.create_pi("a");
        let b = x.create_pi("b");
        let g = x.create_xor(a, b);
        x.create_po(g, "y");
        assert!(!x.is_aoig());
    }

    #[test]
    fn all_paths_on_tree() {
        let mut n = LogicNetwork::new("tree");
        let a = n.create_pi("a");
        let b = n.create_pi("b");
        let c = n.create_pi("c");
        let d = n.create_pi("d");
        let o1 = n.create_or(a, b);
        let o2 = n.create_or(c, d);
        let g = n.create_and(o1, o2);
        let paths = n.all_paths(g, true, false);
        assert_eq!(paths.len(), 4);
        assert!(paths.iter().all(|p| p.len() == 2));
        // every path ends in an edge targeting g
        assert!(paths.iter().all(|p| n.target(*p.last().unwrap()) == g));
    }

    #[test]
    fn all_paths_with_hidden_fanin() {
        let (n, _, _, g) = two_input_net();
        // both fan-ins come from PIs which are hidden by default
        assert!(n.all_paths(g, false, false).is_empty());
        assert_eq!(n.all_paths(g, true, false).len(), 2);
    }

    #[test]
    fn validate_accepts_well_formed() {
        let (n, ..) = two_input_net();
        assert!(n.validate_arities().is_ok());
    }

    #[test]
    fn validate_rejects_dangling_gate() {
        let mut n = LogicNetwork::new("bad");
        let a = n.create_pi("a");
        let g = n.create_and(a, a);
        let e = n.get_edge(a, g).unwrap();
        n.remove_edge(e);
        let err = n.validate_arities().unwrap_err();
        match err {
            NetworkError::ArityViolation { op, expected, actual } => {
                assert_eq!(op, Operation::And);
                assert_eq!(expected, 2);
                assert_eq!(actual, 1);
            }
        }
    }

    #[test]
    fn const_count_tracks_constant_fanout() {
        let mut n = LogicNetwork::new("consts");
        assert_eq!(n.const_count(), 0);
        let one = n.get_constant(true);
        let a = n.create_pi("a");
        let g = n.create_and(a, one);
        n.create_po(g, "y");
        assert_eq!(n.const_count(), 1);
    }

    #[test]
    fn serde_roundtrip() {
        let (n, ..) = two_input_net();
        let json = serde_json::to_string(&n).unwrap();
        let restored: LogicNetwork = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.vertex_count(true, true), n.vertex_count(true, true));
        assert_eq!(restored.pi_count(), 2);
        assert_eq!(restored.name(), "test");
    }
}

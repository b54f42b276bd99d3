//! Information-flow tracing and path analysis.
//!
//! A tile pair participates in information flow when the clocking scheme
//! permits the hop *and* the logic network places a successor relation on
//! the two tiles' elements. Tracing these pairs turns a tile assignment
//! into an executable circuit and is the basis for the critical-path and
//! throughput analysis.

use crate::layout::GateLayout;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tessera_grid::Tile;
use tessera_network::{EdgeId, VertexId};

/// The logic element occupying a tile: a gate vertex or a routed wire edge.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Element {
    /// A gate vertex.
    Gate(VertexId),
    /// A routed wire edge.
    Wire(EdgeId),
}

/// Statistics about the longest incoming path of a tile.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct PathInfo {
    /// Number of tiles on the longest path from any PI.
    pub length: usize,
    /// Path length seeded with the PI tile's clock phase.
    pub delay: usize,
    /// Largest delay difference among the tile's incoming paths.
    pub diff: usize,
}

/// Cache for [`GateLayout::signal_delay`] results of gate tiles.
pub type DelayCache = HashMap<Tile, PathInfo>;

impl GateLayout {
    /// Returns one element occupying tile `t`, preferring the gate vertex.
    ///
    /// Wire tiles with several edges yield the lowest edge ID; free tiles
    /// yield `None`.
    pub fn element_at(&self, t: Tile) -> Option<Element> {
        if let Some(v) = self.get_vertex(t) {
            Some(Element::Gate(v))
        } else {
            self.edges_at(t).first().copied().map(Element::Wire)
        }
    }

    /// Checks whether `at` hosts a logical successor of `gw` and returns it.
    fn flow_successor(&self, gw: Element, at: Tile) -> Option<Element> {
        let network = self.network();
        match gw {
            Element::Gate(v) => {
                if let Some(av) = self.get_vertex(at) {
                    if network.adjacent(v, true, false).any(|s| s == av) {
                        return Some(Element::Gate(av));
                    }
                }
                network
                    .out_edges(v, true, false)
                    .find(|&e| self.has_edge(at, e))
                    .map(Element::Wire)
            }
            Element::Wire(e) => {
                if self.has_edge(at, e) {
                    Some(Element::Wire(e))
                } else if self.get_vertex(at) == Some(self.network().target(e)) {
                    Some(Element::Gate(self.network().target(e)))
                } else {
                    None
                }
            }
        }
    }

    /// Checks whether `at` hosts a logical predecessor of `gw` and returns
    /// it.
    fn flow_predecessor(&self, gw: Element, at: Tile) -> Option<Element> {
        let network = self.network();
        match gw {
            Element::Gate(v) => {
                if let Some(iav) = self.get_vertex(at) {
                    if network.inv_adjacent(v, true, false).any(|p| p == iav) {
                        return Some(Element::Gate(iav));
                    }
                }
                network
                    .in_edges(v, true, false)
                    .find(|&e| self.has_edge(at, e))
                    .map(Element::Wire)
            }
            Element::Wire(e) => {
                if self.has_edge(at, e) {
                    Some(Element::Wire(e))
                } else if self.get_vertex(at) == Some(self.network().source(e)) {
                    Some(Element::Gate(self.network().source(e)))
                } else {
                    None
                }
            }
        }
    }

    /// Expands an outgoing-clocked neighbor to the tile stack that may host
    /// the continuation: the neighbor itself plus the tiles above and below.
    fn stack_of(&self, t: Tile) -> Vec<Tile> {
        let mut stack = vec![t];
        stack.extend(self.grid().above(t));
        stack.extend(self.grid().below(t));
        stack
    }

    /// Returns the tiles (with their elements) that receive information from
    /// element `gw` on tile `t`: outgoing-clocked neighbors, including their
    /// crossing stack, that host a logical successor.
    pub fn outgoing_data_flow(&self, t: Tile, gw: Element) -> Vec<(Tile, Element)> {
        let mut flows = Vec::new();
        for at in self.outgoing_clocked_tiles(t) {
            for candidate in self.stack_of(at) {
                if let Some(target) = self.flow_successor(gw, candidate) {
                    flows.push((candidate, target));
                }
            }
        }
        flows.dedup();
        flows
    }

    /// Returns the tiles (with their elements) that feed information into
    /// element `gw` on tile `t`.
    pub fn incoming_data_flow(&self, t: Tile, gw: Element) -> Vec<(Tile, Element)> {
        let mut flows = Vec::new();
        for iat in self.incoming_clocked_tiles(t) {
            for candidate in self.stack_of(iat) {
                if let Some(source) = self.flow_predecessor(gw, candidate) {
                    flows.push((candidate, source));
                }
            }
        }
        flows.dedup();
        flows
    }

    /// Returns all tiles that receive information from tile `t`, considering
    /// every element assigned to `t`.
    pub fn outgoing_information_flow(&self, t: Tile) -> Vec<Tile> {
        let mut tiles: Vec<Tile> = self
            .elements_at(t)
            .into_iter()
            .flat_map(|gw| self.outgoing_data_flow(t, gw))
            .map(|(at, _)| at)
            .collect();
        tiles.sort();
        tiles.dedup();
        tiles
    }

    /// Returns all tiles that feed information into tile `t`, considering
    /// every element assigned to `t`.
    pub fn incoming_information_flow(&self, t: Tile) -> Vec<Tile> {
        let mut tiles: Vec<Tile> = self
            .elements_at(t)
            .into_iter()
            .flat_map(|gw| self.incoming_data_flow(t, gw))
            .map(|(it, _)| it)
            .collect();
        tiles.sort();
        tiles.dedup();
        tiles
    }

    /// Returns `true` iff any information flows from `t1` to `t2`.
    pub fn is_data_flow(&self, t1: Tile, t2: Tile) -> bool {
        self.outgoing_information_flow(t1)
            .iter()
            .any(|&t| t == t2)
    }

    /// Returns every element assigned to tile `t`.
    fn elements_at(&self, t: Tile) -> Vec<Element> {
        if let Some(v) = self.get_vertex(t) {
            vec![Element::Gate(v)]
        } else {
            self.edges_at(t).into_iter().map(Element::Wire).collect()
        }
    }

    /// Returns statistics about the longest incoming information-flow path
    /// from any PI to tile `t`.
    ///
    /// `length` counts tiles, `delay` additionally seeds the count with the
    /// source tile's clock phase, and `diff` is the largest delay difference
    /// among `t`'s incoming paths (its local unbalance). Results for gate
    /// tiles are memoized in `cache`; wire tiles are visited at most once
    /// anyway. Free tiles report all zeroes.
    pub fn signal_delay(&self, t: Tile, cache: &mut DelayCache) -> PathInfo {
        if self.is_free_tile(t) {
            return PathInfo::default();
        }

        let incoming = self.incoming_information_flow(t);
        if incoming.is_empty() {
            return PathInfo {
                length: 1,
                delay: self.phase_of(t).unwrap_or(0),
                diff: 0,
            };
        }
        if let Some(info) = cache.get(&t) {
            return *info;
        }

        let mut infos: Vec<PathInfo> = incoming
            .iter()
            .map(|&cur| self.signal_delay(cur, cache))
            .collect();

        let mut dominant = if infos.len() == 1 {
            infos[0]
        } else {
            infos.sort_by_key(|i| i.length);
            let longest = *infos.last().unwrap();
            PathInfo {
                length: longest.length,
                delay: longest.delay,
                diff: longest.delay - infos.first().unwrap().delay,
            }
        };

        dominant.length += 1;
        dominant.delay += 1;

        if self.is_gate_tile(t) {
            cache.insert(t, dominant);
        }

        dominant
    }

    /// Returns the critical path length (tiles on the longest PI→PO path)
    /// and the layout's throughput.
    ///
    /// Throughput is reported as `1/x` where only `x` is returned: the
    /// largest delay difference of any gate, in full clock cycles. Fully
    /// synchronized layouts report 1.
    pub fn critical_path_and_throughput(&self) -> (usize, usize) {
        let mut cache = DelayCache::new();
        let mut critical_path = 0;
        for po in self.po_tiles().collect::<Vec<_>>() {
            critical_path = critical_path.max(self.signal_delay(po, &mut cache).length);
        }

        let mut throughput = cache.values().map(|i| i.diff).max().unwrap_or(0);
        // report in cycles, not phases
        throughput /= self.num_phases();
        if throughput == 0 {
            throughput = 1;
        }

        (critical_path, throughput)
    }
}

//! The gate-level layout data model.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tessera_grid::clocking::Phase;
use tessera_grid::{ClockingScheme, Directions, Grid, Tile};
use tessera_network::{EdgeId, LogicNetwork, Operation, VertexId};

/// The minimum rectangle containing every non-free tile of a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Smallest x-coordinate carrying an element.
    pub min_x: usize,
    /// Smallest y-coordinate carrying an element.
    pub min_y: usize,
    /// Largest x-coordinate carrying an element.
    pub max_x: usize,
    /// Largest y-coordinate carrying an element.
    pub max_y: usize,
}

/// A layout of logic-network elements on a clocked tile grid.
///
/// Tiles can be occupied by either one operation vertex (a *gate tile*) or
/// by one or more routed edges (a *wire tile*), never both. Direction maps
/// record through which tile faces information enters and leaves, both per
/// tile and per individual wire; in combination with the clocking scheme
/// they define the layout's information flow.
///
/// Latch delays, irregular clock assignments, and primary-I/O markers are
/// tracked per ground position.
#[derive(Debug, Clone)]
pub struct GateLayout {
    grid: Grid,
    clocking: ClockingScheme,
    network: Arc<LogicNetwork>,
    v_map: HashMap<Tile, VertexId>,
    t_map: HashMap<VertexId, Tile>,
    e_map: HashMap<Tile, BTreeSet<EdgeId>>,
    inp_dir_map: HashMap<Tile, Directions>,
    out_dir_map: HashMap<Tile, Directions>,
    edge_inp_dir_map: HashMap<(Tile, EdgeId), Directions>,
    edge_out_dir_map: HashMap<(Tile, EdgeId), Directions>,
    pi_set: BTreeSet<Tile>,
    po_set: BTreeSet<Tile>,
    clock_map: HashMap<(usize, usize), Phase>,
    latch_map: HashMap<(usize, usize), usize>,
}

impl GateLayout {
    /// Creates an empty layout of the given dimensions.
    ///
    /// `layers - 1` is the number of crossing layers; layouts that route
    /// crossings need `layers >= 2`.
    pub fn new(
        width: usize,
        height: usize,
        layers: usize,
        clocking: ClockingScheme,
        network: Arc<LogicNetwork>,
    ) -> Self {
        GateLayout {
            grid: Grid::new(width, height, layers),
            clocking,
            network,
            v_map: HashMap::new(),
            t_map: HashMap::new(),
            e_map: HashMap::new(),
            inp_dir_map: HashMap::new(),
            out_dir_map: HashMap::new(),
            edge_inp_dir_map: HashMap::new(),
            edge_out_dir_map: HashMap::new(),
            pi_set: BTreeSet::new(),
            po_set: BTreeSet::new(),
            clock_map: HashMap::new(),
            latch_map: HashMap::new(),
        }
    }

    /// Returns the underlying grid.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Returns the associated logic network.
    pub fn network(&self) -> &LogicNetwork {
        &self.network
    }

    /// Returns a clone of the network handle.
    pub fn network_handle(&self) -> Arc<LogicNetwork> {
        Arc::clone(&self.network)
    }

    /// Returns the layout's x-dimension.
    pub fn x(&self) -> usize {
        self.grid.x()
    }

    /// Returns the layout's y-dimension.
    pub fn y(&self) -> usize {
        self.grid.y()
    }

    /// Returns the layout's z-dimension.
    pub fn z(&self) -> usize {
        self.grid.z()
    }

    /// Resizes the grid without touching any assignment maps.
    ///
    /// Positions that fall outside the new dimensions become unreachable but
    /// keep their entries; the top-left corner stays fixed at `(0, 0, 0)`,
    /// so indices of remaining tiles are unaffected.
    pub fn resize(&mut self, width: usize, height: usize, layers: usize) {
        self.grid.resize(width, height, layers);
    }

    // ------------------------------------------------------------------
    // Clocking and latches
    // ------------------------------------------------------------------

    /// Returns the clocking scheme.
    pub fn clocking(&self) -> &ClockingScheme {
        &self.clocking
    }

    /// Returns the number of clock phases.
    pub fn num_phases(&self) -> usize {
        self.clocking.phases
    }

    /// Returns `true` iff the stored clocking scheme is regular.
    pub fn is_regularly_clocked(&self) -> bool {
        self.clocking.regular
    }

    /// Returns the clock phase of tile `t`.
    ///
    /// Regular schemes are evaluated by periodic cutout lookup; irregular
    /// schemes consult the per-tile assignment and return `None` if no phase
    /// has been stored yet.
    pub fn phase_of(&self, t: Tile) -> Option<Phase> {
        if self.clocking.regular {
            self.clocking.phase_of(t)
        } else {
            self.clock_map.get(&t.ground()).copied()
        }
    }

    /// Assigns clock phase `p` to tile `t`.
    ///
    /// Only effective for irregular schemes and phases within range; the
    /// assignment applies to the whole tile stack.
    pub fn assign_phase(&mut self, t: Tile, p: Phase) {
        if !self.clocking.regular && p < self.clocking.phases {
            self.clock_map.insert(t.ground(), p);
        }
    }

    /// Returns the latch delay of tile `t` in clock phases (0 if none).
    pub fn latch(&self, t: Tile) -> usize {
        self.latch_map.get(&t.ground()).copied().unwrap_or(0)
    }

    /// Assigns a latch delay in clock phases to the tile stack at `t`.
    ///
    /// A delay of 0 removes the latch.
    pub fn assign_latch(&mut self, t: Tile, delay: usize) {
        if delay == 0 {
            self.latch_map.remove(&t.ground());
        } else {
            self.latch_map.insert(t.ground(), delay);
        }
    }

    /// Returns the number of latches in the layout.
    pub fn latch_count(&self) -> usize {
        self.latch_map.len()
    }

    /// Returns human-readable representations of all latches, e.g.
    /// `"l@(1,2)=4"`.
    pub fn latch_descriptors(&self) -> Vec<String> {
        let mut reprs: Vec<String> = self
            .latch_map
            .iter()
            .map(|(&(x, y), &l)| format!("l@({x},{y})={l}"))
            .collect();
        reprs.sort();
        reprs
    }

    /// Returns `true` iff `t1` can feed information to `t2`: both phases are
    /// known, the tiles are in-layer neighbors, and `t2`'s phase succeeds
    /// `t1`'s phase plus its latch delay.
    pub fn is_outgoing_clocked(&self, t1: Tile, t2: Tile) -> bool {
        if t1.z != t2.z || self.grid.manhattan_distance(t1.to_ground(), t2.to_ground()) != 1 {
            return false;
        }
        match (self.phase_of(t1), self.phase_of(t2)) {
            (Some(p1), Some(p2)) => (p1 + self.latch(t1) + 1) % self.num_phases() == p2,
            _ => false,
        }
    }

    /// Returns `true` iff `t2` can feed information to `t1`.
    pub fn is_incoming_clocked(&self, t1: Tile, t2: Tile) -> bool {
        self.is_outgoing_clocked(t2, t1)
    }

    /// Returns all in-layer neighbors of `t` that can feed information to
    /// `t` under the clocking.
    pub fn incoming_clocked_tiles(&self, t: Tile) -> Vec<Tile> {
        self.grid
            .surrounding_2d(t)
            .into_iter()
            .filter(|&n| self.is_incoming_clocked(t, n))
            .collect()
    }

    /// Returns all in-layer neighbors of `t` that `t` can feed information
    /// to under the clocking.
    pub fn outgoing_clocked_tiles(&self, t: Tile) -> Vec<Tile> {
        self.grid
            .surrounding_2d(t)
            .into_iter()
            .filter(|&n| self.is_outgoing_clocked(t, n))
            .collect()
    }

    /// Returns the number of tiles that can pass information into `t`.
    pub fn in_degree(&self, t: Tile) -> usize {
        self.incoming_clocked_tiles(t).len()
    }

    /// Returns the number of tiles that `t` can pass information to.
    pub fn out_degree(&self, t: Tile) -> usize {
        self.outgoing_clocked_tiles(t).len()
    }

    // ------------------------------------------------------------------
    // Vertex assignment
    // ------------------------------------------------------------------

    /// Binds vertex `v` to tile `t`, clearing any prior edge assignments and
    /// direction marks on `t`. The `pi`/`po` flags add `t` to the primary
    /// I/O tile sets.
    pub fn assign_vertex(&mut self, t: Tile, v: VertexId, pi: bool, po: bool) {
        self.dissociate_edges(t);
        self.dissociate_vertex(t);
        if let Some(old) = self.t_map.remove(&v) {
            self.v_map.remove(&old);
            self.pi_set.remove(&old);
            self.po_set.remove(&old);
        }
        self.v_map.insert(t, v);
        self.t_map.insert(v, t);
        if pi {
            self.pi_set.insert(t);
        }
        if po {
            self.po_set.insert(t);
        }
    }

    /// Unbinds any vertex from tile `t`, purging its I/O flags and direction
    /// entries.
    pub fn dissociate_vertex(&mut self, t: Tile) {
        if let Some(v) = self.v_map.remove(&t) {
            self.t_map.remove(&v);
        }
        self.pi_set.remove(&t);
        self.po_set.remove(&t);
        self.inp_dir_map.remove(&t);
        self.out_dir_map.remove(&t);
    }

    /// Returns the vertex assigned to tile `t`, if any.
    pub fn get_vertex(&self, t: Tile) -> Option<VertexId> {
        self.v_map.get(&t).copied()
    }

    /// Returns `true` iff vertex `v` is assigned to tile `t`.
    pub fn has_vertex(&self, t: Tile, v: VertexId) -> bool {
        self.v_map.get(&t) == Some(&v)
    }

    /// Returns the tile that vertex `v` is assigned to, if any.
    pub fn tile_of(&self, v: VertexId) -> Option<Tile> {
        self.t_map.get(&v).copied()
    }

    /// Returns `true` iff a vertex is assigned to tile `t`.
    pub fn is_gate_tile(&self, t: Tile) -> bool {
        self.v_map.contains_key(&t)
    }

    // ------------------------------------------------------------------
    // Edge assignment
    // ------------------------------------------------------------------

    /// Appends edge `e` to the edge set of tile `t`. Any vertex binding on
    /// `t` is removed first.
    pub fn assign_edge(&mut self, t: Tile, e: EdgeId) {
        self.dissociate_vertex(t);
        self.e_map.entry(t).or_default().insert(e);
    }

    /// Removes edge `e` from tile `t`, subtracting its direction entries
    /// from the tile masks.
    pub fn dissociate_edge(&mut self, t: Tile, e: EdgeId) {
        let Some(set) = self.e_map.get_mut(&t) else {
            return;
        };
        if !set.remove(&e) {
            return;
        }
        if set.is_empty() {
            self.e_map.remove(&t);
        }

        let inp = self.wire_inp_dirs(t, e);
        let out = self.wire_out_dirs(t, e);
        if let Some(d) = self.inp_dir_map.get_mut(&t) {
            *d &= !inp;
            if d.is_none() {
                self.inp_dir_map.remove(&t);
            }
        }
        if let Some(d) = self.out_dir_map.get_mut(&t) {
            *d &= !out;
            if d.is_none() {
                self.out_dir_map.remove(&t);
            }
        }
        self.edge_inp_dir_map.remove(&(t, e));
        self.edge_out_dir_map.remove(&(t, e));
    }

    /// Removes all edges from tile `t` together with their direction
    /// entries.
    pub fn dissociate_edges(&mut self, t: Tile) {
        self.inp_dir_map.remove(&t);
        self.out_dir_map.remove(&t);
        for e in self.edges_at(t) {
            self.edge_inp_dir_map.remove(&(t, e));
            self.edge_out_dir_map.remove(&(t, e));
        }
        self.e_map.remove(&t);
    }

    /// Returns the edges routed through tile `t` in ID order.
    pub fn edges_at(&self, t: Tile) -> Vec<EdgeId> {
        self.e_map
            .get(&t)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Returns `true` iff one or more edges are assigned to tile `t`.
    pub fn is_wire_tile(&self, t: Tile) -> bool {
        self.e_map.get(&t).is_some_and(|s| !s.is_empty())
    }

    /// Returns `true` iff edge `e` is assigned to tile `t`.
    pub fn has_edge(&self, t: Tile, e: EdgeId) -> bool {
        self.e_map.get(&t).is_some_and(|s| s.contains(&e))
    }

    /// Removes all assignments from tile `t`: vertex, edges, directions, and
    /// latch.
    pub fn clear_tile(&mut self, t: Tile) {
        self.dissociate_edges(t);
        self.dissociate_vertex(t);
        self.assign_latch(t, 0);
    }

    /// Returns `true` iff tile `t` holds neither a vertex nor an edge.
    pub fn is_free_tile(&self, t: Tile) -> bool {
        !self.is_gate_tile(t) && !self.is_wire_tile(t)
    }

    /// Returns the operation on tile `t`: the assigned vertex's operation,
    /// `W` for a wire tile, or `None` for a free tile.
    pub fn get_op(&self, t: Tile) -> Option<Operation> {
        if let Some(v) = self.get_vertex(t) {
            Some(self.network.op(v))
        } else if self.is_wire_tile(t) {
            Some(Operation::W)
        } else {
            None
        }
    }

    // ------------------------------------------------------------------
    // Directions
    // ------------------------------------------------------------------

    /// Adds input directions `d` to tile `t`. Passing
    /// [`Directions::NONE`] erases the entry. No-op on free tiles.
    pub fn assign_tile_inp_dir(&mut self, t: Tile, d: Directions) {
        if self.is_free_tile(t) {
            return;
        }
        if d.is_none() {
            self.inp_dir_map.remove(&t);
        } else {
            *self.inp_dir_map.entry(t).or_default() |= d;
        }
    }

    /// Adds output directions `d` to tile `t`. Passing
    /// [`Directions::NONE`] erases the entry. No-op on free tiles.
    pub fn assign_tile_out_dir(&mut self, t: Tile, d: Directions) {
        if self.is_free_tile(t) {
            return;
        }
        if d.is_none() {
            self.out_dir_map.remove(&t);
        } else {
            *self.out_dir_map.entry(t).or_default() |= d;
        }
    }

    /// Adds input directions `d` for edge `e` on tile `t`, mirroring them
    /// into the tile mask. No-op if `e` is not routed through `t`.
    pub fn assign_wire_inp_dir(&mut self, t: Tile, e: EdgeId, d: Directions) {
        if !self.has_edge(t, e) {
            return;
        }
        if d.is_none() {
            self.inp_dir_map.remove(&t);
            self.edge_inp_dir_map.remove(&(t, e));
        } else {
            *self.inp_dir_map.entry(t).or_default() |= d;
            *self.edge_inp_dir_map.entry((t, e)).or_default() |= d;
        }
    }

    /// Adds output directions `d` for edge `e` on tile `t`, mirroring them
    /// into the tile mask. No-op if `e` is not routed through `t`.
    pub fn assign_wire_out_dir(&mut self, t: Tile, e: EdgeId, d: Directions) {
        if !self.has_edge(t, e) {
            return;
        }
        if d.is_none() {
            self.out_dir_map.remove(&t);
            self.edge_out_dir_map.remove(&(t, e));
        } else {
            *self.out_dir_map.entry(t).or_default() |= d;
            *self.edge_out_dir_map.entry((t, e)).or_default() |= d;
        }
    }

    /// Returns the input directions of tile `t`.
    pub fn tile_inp_dirs(&self, t: Tile) -> Directions {
        self.inp_dir_map.get(&t).copied().unwrap_or_default()
    }

    /// Returns the output directions of tile `t`.
    pub fn tile_out_dirs(&self, t: Tile) -> Directions {
        self.out_dir_map.get(&t).copied().unwrap_or_default()
    }

    /// Returns the input directions of edge `e` on tile `t`.
    pub fn wire_inp_dirs(&self, t: Tile, e: EdgeId) -> Directions {
        self.edge_inp_dir_map
            .get(&(t, e))
            .copied()
            .unwrap_or_default()
    }

    /// Returns the output directions of edge `e` on tile `t`.
    pub fn wire_out_dirs(&self, t: Tile, e: EdgeId) -> Directions {
        self.edge_out_dir_map
            .get(&(t, e))
            .copied()
            .unwrap_or_default()
    }

    /// Returns `true` iff all directions in `d` are inputs of tile `t`.
    pub fn is_tile_inp_dir(&self, t: Tile, d: Directions) -> bool {
        self.tile_inp_dirs(t).contains(d)
    }

    /// Returns `true` iff all directions in `d` are outputs of tile `t`.
    pub fn is_tile_out_dir(&self, t: Tile, d: Directions) -> bool {
        self.tile_out_dirs(t).contains(d)
    }

    /// Returns `true` iff all directions in `d` are inputs of edge `e` on
    /// tile `t`. `false` if `e` carries no direction entry on `t`.
    pub fn is_wire_inp_dir(&self, t: Tile, e: EdgeId, d: Directions) -> bool {
        self.edge_inp_dir_map
            .get(&(t, e))
            .is_some_and(|m| m.contains(d))
    }

    /// Returns `true` iff all directions in `d` are outputs of edge `e` on
    /// tile `t`. `false` if `e` carries no direction entry on `t`.
    pub fn is_wire_out_dir(&self, t: Tile, e: EdgeId, d: Directions) -> bool {
        self.edge_out_dir_map
            .get(&(t, e))
            .is_some_and(|m| m.contains(d))
    }

    /// Returns all directions of tile `t` that are neither inputs nor
    /// outputs.
    pub fn unused_dirs(&self, t: Tile) -> Directions {
        !(self.tile_inp_dirs(t) | self.tile_out_dirs(t))
    }

    /// Returns the direction in which `t2` can be reached from `t1`, or
    /// [`Directions::NONE`] if the tiles are not straightly adjacent.
    ///
    /// The layer coordinate is ignored, so a tile and the crossing above its
    /// neighbor still relate by a bearing.
    pub fn bearing(&self, t1: Tile, t2: Tile) -> Directions {
        if t1.x == t2.x {
            if t2.y + 1 == t1.y {
                return Directions::N;
            }
            if t1.y + 1 == t2.y {
                return Directions::S;
            }
        }
        if t1.y == t2.y {
            if t2.x + 1 == t1.x {
                return Directions::W;
            }
            if t1.x + 1 == t2.x {
                return Directions::E;
            }
        }
        Directions::NONE
    }

    // ------------------------------------------------------------------
    // I/O tiles and counts
    // ------------------------------------------------------------------

    /// Returns `true` iff tile `t` is flagged as primary input.
    pub fn is_pi(&self, t: Tile) -> bool {
        self.pi_set.contains(&t)
    }

    /// Returns `true` iff tile `t` is flagged as primary output.
    pub fn is_po(&self, t: Tile) -> bool {
        self.po_set.contains(&t)
    }

    /// Iterates over all primary-input tiles.
    pub fn pi_tiles(&self) -> impl Iterator<Item = Tile> + '_ {
        self.pi_set.iter().copied()
    }

    /// Iterates over all primary-output tiles.
    pub fn po_tiles(&self) -> impl Iterator<Item = Tile> + '_ {
        self.po_set.iter().copied()
    }

    /// Returns `true` iff every primary I/O tile hosts a designated PI/PO
    /// operation vertex.
    pub fn has_io_pins(&self) -> bool {
        self.pi_set
            .iter()
            .all(|&t| self.get_op(t) == Some(Operation::Pi))
            && self
                .po_set
                .iter()
                .all(|&t| self.get_op(t) == Some(Operation::Po))
    }

    /// Returns the input port names reachable at tile `t`: the tile's own PI
    /// name, or the names of PI predecessors of its gate.
    pub fn inp_names(&self, t: Tile) -> Vec<String> {
        let Some(v) = self.get_vertex(t) else {
            return Vec::new();
        };
        if self.network.op(v) == Operation::Pi {
            return self.network.port_name(v).map(String::from).into_iter().collect();
        }
        self.network
            .inv_adjacent(v, true, false)
            .filter(|&p| self.network.op(p) == Operation::Pi)
            .filter_map(|p| self.network.port_name(p).map(String::from))
            .collect()
    }

    /// Returns the output port names reachable at tile `t`: the tile's own
    /// PO name, or the names of PO successors of its gate.
    pub fn out_names(&self, t: Tile) -> Vec<String> {
        let Some(v) = self.get_vertex(t) else {
            return Vec::new();
        };
        if self.network.op(v) == Operation::Po {
            return self.network.port_name(v).map(String::from).into_iter().collect();
        }
        self.network
            .adjacent(v, true, false)
            .filter(|&s| self.network.op(s) == Operation::Po)
            .filter_map(|s| self.network.port_name(s).map(String::from))
            .collect()
    }

    /// Returns the number of gate tiles.
    pub fn gate_count(&self) -> usize {
        self.v_map.len()
    }

    /// Returns the number of wire tiles. A crossing counts as two wire
    /// tiles, one per layer.
    pub fn wire_count(&self) -> usize {
        self.e_map.len()
    }

    /// Returns the number of wire tiles above the ground layer.
    pub fn crossing_count(&self) -> usize {
        self.e_map.keys().filter(|t| !t.is_ground()).count()
    }

    // ------------------------------------------------------------------
    // Bounding box
    // ------------------------------------------------------------------

    fn column_free(&self, x: usize) -> bool {
        (0..self.y()).all(|y| {
            (0..self.z()).all(|z| self.is_free_tile(Tile::new(x, y, z)))
        })
    }

    fn row_free(&self, y: usize) -> bool {
        (0..self.x()).all(|x| {
            (0..self.z()).all(|z| self.is_free_tile(Tile::new(x, y, z)))
        })
    }

    /// Scans the grid for the minimum rectangle containing every non-free
    /// tile across all layers.
    pub fn bounding_box(&self) -> BoundingBox {
        let min_x = (0..self.x()).find(|&x| !self.column_free(x)).unwrap_or(0);
        let min_y = (0..self.y()).find(|&y| !self.row_free(y)).unwrap_or(0);
        let max_x = (0..self.x())
            .rev()
            .find(|&x| !self.column_free(x))
            .unwrap_or_else(|| self.x().saturating_sub(1));
        let max_y = (0..self.y())
            .rev()
            .find(|&y| !self.row_free(y))
            .unwrap_or_else(|| self.y().saturating_sub(1));
        BoundingBox {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Shrinks the grid to `(max_x + 1, max_y + 1, z)` so that no occupied
    /// tile is lost. Indices of remaining tiles are unchanged.
    pub fn shrink_to_fit(&mut self) {
        let bb = self.bounding_box();
        self.resize(bb.max_x + 1, bb.max_y + 1, self.z());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn net_and() -> (Arc<LogicNetwork>, VertexId, VertexId, VertexId, VertexId) {
        let mut n = LogicNetwork::new("and");
        let a = n.create_pi("a");
        let b = n.create_pi("b");
        let g = n.create_and(a, b);
        let y = n.create_po(g, "y");
        (Arc::new(n), a, b, g, y)
    }

    fn twoddwave_layout(w: usize, h: usize) -> (GateLayout, VertexId, VertexId, VertexId, VertexId) {
        let (n, a, b, g, y) = net_and();
        let l = GateLayout::new(w, h, 2, ClockingScheme::twoddwave_4(), n);
        (l, a, b, g, y)
    }

    #[test]
    fn vertex_assignment_is_bijective() {
        let (mut l, a, ..) = twoddwave_layout(3, 3);
        let t = Tile::new(0, 0, 0);
        l.assign_vertex(t, a, true, false);
        assert!(l.is_gate_tile(t));
        assert!(l.has_vertex(t, a));
        assert_eq!(l.tile_of(a), Some(t));
        assert!(l.is_pi(t));
        assert!(!l.is_po(t));

        // re-assigning the vertex moves it
        let t2 = Tile::new(1, 0, 0);
        l.assign_vertex(t2, a, true, false);
        assert!(l.is_free_tile(t));
        assert_eq!(l.tile_of(a), Some(t2));
        assert!(!l.is_pi(t));
        assert!(l.is_pi(t2));
    }

    #[test]
    fn no_mixed_occupancy() {
        let (mut l, a, _, g, _) = twoddwave_layout(3, 3);
        let t = Tile::new(1, 1, 0);
        let n = l.network_handle();
        let e = n.get_edge(a, g).unwrap();

        l.assign_vertex(t, a, false, false);
        assert!(l.is_gate_tile(t));
        l.assign_edge(t, e);
        assert!(l.is_wire_tile(t));
        assert!(!l.is_gate_tile(t));
        l.assign_vertex(t, g, false, false);
        assert!(l.is_gate_tile(t));
        assert!(!l.is_wire_tile(t));
    }

    #[test]
    fn edge_dissociation_purges_directions() {
        let (mut l, a, _, g, _) = twoddwave_layout(3, 3);
        let n = l.network_handle();
        let e = n.get_edge(a, g).unwrap();
        let t = Tile::new(1, 0, 0);
        l.assign_edge(t, e);
        l.assign_wire_inp_dir(t, e, Directions::W);
        l.assign_wire_out_dir(t, e, Directions::E);
        assert_eq!(l.tile_inp_dirs(t), Directions::W);
        assert_eq!(l.wire_out_dirs(t, e), Directions::E);

        l.dissociate_edge(t, e);
        assert!(l.is_free_tile(t));
        assert_eq!(l.tile_inp_dirs(t), Directions::NONE);
        assert_eq!(l.wire_inp_dirs(t, e), Directions::NONE);
    }

    #[test]
    fn wire_dirs_mirror_into_tile_mask() {
        let (mut l, a, b, g, _) = twoddwave_layout(3, 3);
        let n = l.network_handle();
        let e1 = n.get_edge(a, g).unwrap();
        let e2 = n.get_edge(b, g).unwrap();
        let t = Tile::new(1, 0, 0);
        l.assign_edge(t, e1);
        l.assign_edge(t, e2);
        l.assign_wire_inp_dir(t, e1, Directions::W);
        l.assign_wire_inp_dir(t, e2, Directions::N);
        l.assign_wire_out_dir(t, e1, Directions::E);
        l.assign_wire_out_dir(t, e2, Directions::S);

        assert_eq!(l.tile_inp_dirs(t), Directions::NW);
        assert_eq!(l.tile_out_dirs(t), Directions::ES);
        assert!(l.tile_inp_dirs(t).contains(l.wire_inp_dirs(t, e1)));
        assert!(l.tile_inp_dirs(t).contains(l.wire_inp_dirs(t, e2)));
        // per-edge masks are disjoint on a ground-layer crossing tile
        assert_eq!(
            l.wire_inp_dirs(t, e1) & l.wire_inp_dirs(t, e2),
            Directions::NONE
        );
    }

    #[test]
    fn direction_assignment_on_free_tile_is_ignored() {
        let (mut l, ..) = twoddwave_layout(3, 3);
        let t = Tile::new(2, 2, 0);
        l.assign_tile_inp_dir(t, Directions::N);
        assert_eq!(l.tile_inp_dirs(t), Directions::NONE);
    }

    #[test]
    fn clocking_relations_on_twoddwave() {
        let (l, ..) = twoddwave_layout(4, 4);
        let t = Tile::new(1, 1, 0);
        // phases: (1,1) = 2; east (2,1) = 3; north (1,0) = 1
        assert!(l.is_outgoing_clocked(t, Tile::new(2, 1, 0)));
        assert!(l.is_outgoing_clocked(t, Tile::new(1, 2, 0)));
        assert!(l.is_incoming_clocked(t, Tile::new(0, 1, 0)));
        assert!(l.is_incoming_clocked(t, Tile::new(1, 0, 0)));
        assert!(!l.is_outgoing_clocked(t, Tile::new(0, 1, 0)));
        // non-adjacent tiles never relate
        assert!(!l.is_outgoing_clocked(t, Tile::new(3, 1, 0)));
        assert_eq!(l.in_degree(t), 2);
        assert_eq!(l.out_degree(t), 2);
    }

    #[test]
    fn latch_shifts_outgoing_phase() {
        let (mut l, a, _, g, _) = twoddwave_layout(4, 4);
        let n = l.network_handle();
        let e = n.get_edge(a, g).unwrap();
        let t = Tile::new(1, 1, 0);
        l.assign_edge(t, e);
        // latch of 3 phases: (2 + 3 + 1) mod 4 = 2, feeding same-phase tiles
        l.assign_latch(t, 3);
        assert!(!l.is_outgoing_clocked(t, Tile::new(2, 1, 0)));
        // a full cycle keeps the original relation
        l.assign_latch(t, 4);
        assert!(l.is_outgoing_clocked(t, Tile::new(2, 1, 0)));
        assert_eq!(l.latch_count(), 1);
        assert_eq!(l.latch_descriptors(), vec!["l@(1,1)=4".to_string()]);
    }

    #[test]
    fn irregular_phases_are_assignable() {
        let (n, ..) = net_and();
        let mut l = GateLayout::new(2, 2, 2, ClockingScheme::open_4(), n);
        let t = Tile::new(0, 0, 0);
        assert_eq!(l.phase_of(t), None);
        l.assign_phase(t, 2);
        assert_eq!(l.phase_of(t), Some(2));
        // phase applies to the whole stack
        assert_eq!(l.phase_of(Tile::new(0, 0, 1)), Some(2));
        // out-of-range phases are ignored
        l.assign_phase(t, 9);
        assert_eq!(l.phase_of(t), Some(2));
    }

    #[test]
    fn bearings() {
        let (l, ..) = twoddwave_layout(3, 3);
        let c = Tile::new(1, 1, 0);
        assert_eq!(l.bearing(c, Tile::new(1, 0, 0)), Directions::N);
        assert_eq!(l.bearing(c, Tile::new(2, 1, 0)), Directions::E);
        assert_eq!(l.bearing(c, Tile::new(1, 2, 0)), Directions::S);
        assert_eq!(l.bearing(c, Tile::new(0, 1, 0)), Directions::W);
        assert_eq!(l.bearing(c, Tile::new(2, 2, 0)), Directions::NONE);
        // layers are ignored
        assert_eq!(l.bearing(c, Tile::new(1, 0, 1)), Directions::N);
    }

    #[test]
    fn op_queries() {
        let (mut l, a, _, g, _) = twoddwave_layout(3, 3);
        let n = l.network_handle();
        let e = n.get_edge(a, g).unwrap();
        l.assign_vertex(Tile::new(0, 0, 0), g, false, false);
        l.assign_edge(Tile::new(1, 0, 0), e);
        assert_eq!(l.get_op(Tile::new(0, 0, 0)), Some(Operation::And));
        assert_eq!(l.get_op(Tile::new(1, 0, 0)), Some(Operation::W));
        assert_eq!(l.get_op(Tile::new(2, 2, 0)), None);
    }

    #[test]
    fn counts() {
        let (mut l, a, b, g, _) = twoddwave_layout(3, 3);
        let n = l.network_handle();
        let e1 = n.get_edge(a, g).unwrap();
        let e2 = n.get_edge(b, g).unwrap();
        l.assign_vertex(Tile::new(0, 0, 0), g, false, false);
        l.assign_edge(Tile::new(1, 0, 0), e1);
        l.assign_edge(Tile::new(1, 0, 1), e2);
        assert_eq!(l.gate_count(), 1);
        assert_eq!(l.wire_count(), 2);
        assert_eq!(l.crossing_count(), 1);
    }

    #[test]
    fn io_pin_detection() {
        let (mut l, a, _, g, y) = twoddwave_layout(3, 3);
        l.assign_vertex(Tile::new(0, 0, 0), a, true, false);
        l.assign_vertex(Tile::new(1, 0, 0), g, false, false);
        l.assign_vertex(Tile::new(2, 0, 0), y, false, true);
        assert!(l.has_io_pins());

        // flagging a plain gate as PO breaks the designated-pin property
        l.assign_vertex(Tile::new(1, 0, 0), g, false, true);
        assert!(!l.has_io_pins());
    }

    #[test]
    fn port_name_propagation() {
        let (mut l, a, _, g, y) = twoddwave_layout(3, 3);
        l.assign_vertex(Tile::new(0, 0, 0), a, true, false);
        l.assign_vertex(Tile::new(1, 0, 0), g, false, false);
        l.assign_vertex(Tile::new(2, 0, 0), y, false, true);
        assert_eq!(l.inp_names(Tile::new(0, 0, 0)), vec!["a".to_string()]);
        assert_eq!(l.out_names(Tile::new(2, 0, 0)), vec!["y".to_string()]);
        // the AND gate sees its PI predecessors and PO successor
        assert_eq!(l.inp_names(Tile::new(1, 0, 0)).len(), 1);
        assert_eq!(l.out_names(Tile::new(1, 0, 0)), vec!["y".to_string()]);
    }

    #[test]
    fn bounding_box_and_shrink() {
        let (mut l, a, _, g, _) = twoddwave_layout(6, 6);
        let n = l.network_handle();
        let e = n.get_edge(a, g).unwrap();
        l.assign_vertex(Tile::new(0, 0, 0), a, true, false);
        l.assign_vertex(Tile::new(2, 1, 0), g, false, false);
        l.assign_edge(Tile::new(1, 1, 1), e);

        let bb = l.bounding_box();
        assert_eq!(
            bb,
            BoundingBox {
                min_x: 0,
                min_y: 0,
                max_x: 2,
                max_y: 1
            }
        );

        l.shrink_to_fit();
        assert_eq!(l.x(), 3);
        assert_eq!(l.y(), 2);
        assert_eq!(l.z(), 2);
        // assignments survive the shrink untouched
        assert_eq!(l.tile_of(g), Some(Tile::new(2, 1, 0)));
        assert!(l.is_wire_tile(Tile::new(1, 1, 1)));
    }

    #[test]
    fn clear_tile_resets_everything() {
        let (mut l, a, _, g, _) = twoddwave_layout(3, 3);
        let n = l.network_handle();
        let e = n.get_edge(a, g).unwrap();
        let t = Tile::new(1, 0, 0);
        l.assign_edge(t, e);
        l.assign_wire_inp_dir(t, e, Directions::W);
        l.assign_latch(t, 4);
        l.clear_tile(t);
        assert!(l.is_free_tile(t));
        assert_eq!(l.latch(t), 0);
        assert_eq!(l.tile_inp_dirs(t), Directions::NONE);
    }
}

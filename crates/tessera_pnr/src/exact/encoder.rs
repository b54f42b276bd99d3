//! SMT variable model and constraint generation.
//!
//! The instance works with a single layer of variables even though crossings
//! may appear in the solution: every variable refers to a ground tile, and
//! crossings are reconstructed afterwards. This keeps the variable count at
//! a fraction of a full 3-D encoding.

use crate::config::ExactConfig;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tessera_grid::Tile;
use tessera_layout::GateLayout;
use tessera_network::{EdgeId, LogicNetwork, Operation, VertexId};
use z3::ast::{Ast, Bool, Int};
use z3::{Context, Optimize};

/// The solver variables of one size round.
pub(crate) struct Vars<'ctx> {
    /// `tv[t, v]`: vertex `v` is placed on ground tile `t`.
    pub tv: HashMap<(Tile, VertexId), Bool<'ctx>>,
    /// `te[t, e]`: edge `e` is routed through ground tile `t`.
    pub te: HashMap<(Tile, EdgeId), Bool<'ctx>>,
    /// `tc[t1, t2]`: an information-flow arrow `t1 → t2` is established.
    pub tc: HashMap<(Tile, Tile), Bool<'ctx>>,
    /// `tp[t1, t2]`: a path `t1 ↝ t2` exists.
    pub tp: HashMap<(Tile, Tile), Bool<'ctx>>,
    /// `vcl[v]`: clock phase at which primary input `v` emits.
    pub vcl: HashMap<VertexId, Int<'ctx>>,
    /// `tcl[t]`: clock phase of tile `t` (irregular clockings only).
    pub tcl: HashMap<Tile, Int<'ctx>>,
    /// `tl[t]`: latch delay of tile `t` in cycles (latch option only).
    pub tl: HashMap<Tile, Int<'ctx>>,
}

/// Generates the SMT instance for one layout size.
pub(crate) struct Encoder<'a, 'ctx> {
    ctx: &'ctx Context,
    solver: &'a Optimize<'ctx>,
    layout: &'a GateLayout,
    network: &'a LogicNetwork,
    config: &'a ExactConfig,
    tiles: Vec<Tile>,
    vertices: Vec<VertexId>,
    edges: Vec<EdgeId>,
    vars: Vars<'ctx>,
}

impl<'a, 'ctx> Encoder<'a, 'ctx> {
    /// Declares all variables for the current grid dimensions.
    pub fn new(
        ctx: &'ctx Context,
        solver: &'a Optimize<'ctx>,
        layout: &'a GateLayout,
        config: &'a ExactConfig,
    ) -> Self {
        let network = layout.network();
        let tiles: Vec<Tile> = layout.grid().ground_layer().collect();
        let vertices: Vec<VertexId> = network.vertices(config.io_ports, false).collect();
        let edges: Vec<EdgeId> = network.edges(config.io_ports, false).collect();

        let mut vars = Vars {
            tv: HashMap::new(),
            te: HashMap::new(),
            tc: HashMap::new(),
            tp: HashMap::new(),
            vcl: HashMap::new(),
            tcl: HashMap::new(),
            tl: HashMap::new(),
        };

        let index = |t: Tile| t.y * layout.x() + t.x;

        for &t in &tiles {
            for &v in &vertices {
                vars.tv.insert(
                    (t, v),
                    Bool::new_const(ctx, format!("tv_{}_{}", index(t), v)),
                );
            }
            for &e in &edges {
                vars.te.insert(
                    (t, e),
                    Bool::new_const(ctx, format!("te_{}_{}", index(t), e)),
                );
            }
            for at in Self::connection_targets(layout, t) {
                vars.tc.insert(
                    (t, at),
                    Bool::new_const(ctx, format!("tc_{}_{}", index(t), index(at))),
                );
            }
            for &t2 in &tiles {
                vars.tp.insert(
                    (t, t2),
                    Bool::new_const(ctx, format!("tp_{}_{}", index(t), index(t2))),
                );
            }
            if !layout.is_regularly_clocked() {
                vars.tcl
                    .insert(t, Int::new_const(ctx, format!("tcl_{}", index(t))));
            }
            if config.artificial_latches && !config.desynchronize {
                vars.tl
                    .insert(t, Int::new_const(ctx, format!("tl_{}", index(t))));
            }
        }

        for v in Self::clocked_inputs(network, config) {
            vars.vcl.insert(v, Int::new_const(ctx, format!("vcl_{v}")));
        }

        Encoder {
            ctx,
            solver,
            layout,
            network,
            config,
            tiles,
            vertices,
            edges,
            vars,
        }
    }

    /// Consumes the encoder, keeping only the variable maps for model
    /// extraction.
    pub fn into_vars(self) -> Vars<'ctx> {
        self.vars
    }

    /// The tiles a connection variable may point to from `t`: the
    /// outgoing-clocked neighbors under a regular scheme, all in-layer
    /// neighbors under an irregular one.
    fn connection_targets(layout: &GateLayout, t: Tile) -> Vec<Tile> {
        if layout.is_regularly_clocked() {
            layout.outgoing_clocked_tiles(t)
        } else {
            layout.grid().surrounding_2d(t)
        }
    }

    /// The tiles a connection variable may arrive at `t` from.
    fn connection_sources(layout: &GateLayout, t: Tile) -> Vec<Tile> {
        if layout.is_regularly_clocked() {
            layout.incoming_clocked_tiles(t)
        } else {
            layout.grid().surrounding_2d(t)
        }
    }

    /// The vertices carrying a PI clock variable: the primary inputs
    /// themselves, or their successors when I/O ports are not routed.
    fn clocked_inputs(network: &LogicNetwork, config: &ExactConfig) -> Vec<VertexId> {
        if config.io_ports {
            network.pis().collect()
        } else {
            let mut vs: Vec<VertexId> = network
                .pis()
                .flat_map(|pi| network.adjacent(pi, false, false).collect::<Vec<_>>())
                .collect();
            vs.sort();
            vs.dedup();
            vs
        }
    }

    // ------------------------------------------------------------------
    // Variable accessors
    // ------------------------------------------------------------------

    fn tv(&self, t: Tile, v: VertexId) -> &Bool<'ctx> {
        &self.vars.tv[&(t, v)]
    }

    fn te(&self, t: Tile, e: EdgeId) -> &Bool<'ctx> {
        &self.vars.te[&(t, e)]
    }

    fn tc(&self, t1: Tile, t2: Tile) -> &Bool<'ctx> {
        &self.vars.tc[&(t1, t2)]
    }

    fn tp(&self, t1: Tile, t2: Tile) -> &Bool<'ctx> {
        &self.vars.tp[&(t1, t2)]
    }

    fn vcl(&self, v: VertexId) -> &Int<'ctx> {
        &self.vars.vcl[&v]
    }

    fn tcl(&self, t: Tile) -> &Int<'ctx> {
        &self.vars.tcl[&t]
    }

    fn tl(&self, t: Tile) -> &Int<'ctx> {
        &self.vars.tl[&t]
    }

    // ------------------------------------------------------------------
    // Expression helpers
    // ------------------------------------------------------------------

    fn int(&self, v: i64) -> Int<'ctx> {
        Int::from_i64(self.ctx, v)
    }

    fn at_most(&self, vs: &[&Bool<'ctx>], k: i32) -> Bool<'ctx> {
        let weighted: Vec<(&Bool<'ctx>, i32)> = vs.iter().map(|&b| (b, 1)).collect();
        Bool::pb_le(self.ctx, &weighted, k)
    }

    fn at_least(&self, vs: &[&Bool<'ctx>], k: i32) -> Bool<'ctx> {
        let weighted: Vec<(&Bool<'ctx>, i32)> = vs.iter().map(|&b| (b, 1)).collect();
        Bool::pb_ge(self.ctx, &weighted, k)
    }

    fn exactly(&self, vs: &[&Bool<'ctx>], k: i32) -> Bool<'ctx> {
        let weighted: Vec<(&Bool<'ctx>, i32)> = vs.iter().map(|&b| (b, 1)).collect();
        Bool::pb_eq(self.ctx, &weighted, k)
    }

    fn any(&self, vs: &[Bool<'ctx>]) -> Bool<'ctx> {
        let refs: Vec<&Bool<'ctx>> = vs.iter().collect();
        Bool::or(self.ctx, &refs)
    }

    fn all(&self, vs: &[Bool<'ctx>]) -> Bool<'ctx> {
        let refs: Vec<&Bool<'ctx>> = vs.iter().collect();
        Bool::and(self.ctx, &refs)
    }

    fn sum(&self, vs: &[Int<'ctx>]) -> Int<'ctx> {
        if vs.is_empty() {
            return self.int(0);
        }
        let refs: Vec<&Int<'ctx>> = vs.iter().collect();
        Int::add(self.ctx, &refs)
    }

    /// Equality of an arbitrary number of expressions, as a conjunction of
    /// pairwise equalities.
    fn all_equal(&self, vs: &[Int<'ctx>]) -> Bool<'ctx> {
        let eqs: Vec<Bool<'ctx>> = vs.windows(2).map(|w| w[0]._eq(&w[1])).collect();
        self.all(&eqs)
    }

    /// Phase-successor test for irregular clockings:
    /// `(tcl[t2] - tcl[t1]) mod P == 1`.
    fn phase_succ(&self, t1: Tile, t2: Tile) -> Bool<'ctx> {
        let phases = self.int(self.layout.num_phases() as i64);
        let diff = Int::sub(self.ctx, &[self.tcl(t2), self.tcl(t1)]);
        diff.modulo(&phases)._eq(&self.int(1))
    }

    /// Appends, for every ground tile, a counter expression measuring how
    /// many tiles edge `e` occupies. A latch on a tile counts as one extra
    /// clock cycle (`P` phases) per latch unit.
    fn tile_ite_counters(&self, e: EdgeId, counters: &mut Vec<Int<'ctx>>) {
        let one = self.int(1);
        let zero = self.int(0);
        let phases = self.int(self.layout.num_phases() as i64);

        for &t in &self.tiles {
            let occupied = if self.config.artificial_latches {
                let latch_phases = Int::mul(self.ctx, &[self.tl(t), &phases]);
                Int::add(self.ctx, &[&latch_phases, &one])
            } else {
                one.clone()
            };
            counters.push(self.te(t, e).ite(&occupied, &zero));
        }
    }

    // ------------------------------------------------------------------
    // Constraint groups
    // ------------------------------------------------------------------

    /// Limits every tile to one vertex or, with crossings enabled, to one
    /// vertex or up to two edges; otherwise to a single element.
    fn restrict_tile_elements(&self) {
        for &t in &self.tiles {
            if self.config.crossings {
                let tv: Vec<&Bool> = self.vertices.iter().map(|&v| self.tv(t, v)).collect();
                self.solver.assert(&self.at_most(&tv, 1));

                let te: Vec<&Bool> = self.edges.iter().map(|&e| self.te(t, e)).collect();
                self.solver.assert(&self.at_most(&te, 2));
            } else {
                let mut all: Vec<&Bool> = self.vertices.iter().map(|&v| self.tv(t, v)).collect();
                all.extend(self.edges.iter().map(|&e| self.te(t, e)));
                self.solver.assert(&self.at_most(&all, 1));
            }
        }
    }

    /// Places every vertex on exactly one tile.
    fn restrict_vertices(&self) {
        for &v in &self.vertices {
            let vs: Vec<&Bool> = self.tiles.iter().map(|&t| self.tv(t, v)).collect();
            self.solver.assert(&self.exactly(&vs, 1));
        }
    }

    /// Restricts irregular clock variables to `0..P`.
    fn restrict_clocks(&self) {
        let phases = self.int(self.layout.num_phases() as i64);
        let zero = self.int(0);
        for &t in &self.tiles {
            let cl = self.tcl(t);
            self.solver.assert(&cl.ge(&zero));
            self.solver.assert(&cl.lt(&phases));
        }
    }

    /// Keeps latches non-negative and off vertex tiles, and minimizes their
    /// total number.
    fn restrict_latches(&self) {
        let zero = self.int(0);
        let mut all_latches = Vec::new();

        for &t in &self.tiles {
            let l = self.tl(t);
            self.solver.assert(&l.ge(&zero));

            // tiles without wires cannot hold latches
            let te: Vec<&Bool> = self.edges.iter().map(|&e| self.te(t, e)).collect();
            self.solver
                .assert(&self.at_most(&te, 0).implies(&l._eq(&zero)));

            all_latches.push(l.clone());
        }

        self.solver.minimize(&self.sum(&all_latches));
    }

    /// A placed vertex must see each of its successors on an
    /// outgoing-clocked neighbor, either as the successor vertex itself or
    /// as the connecting edge, with the arrow variable set.
    fn adjacent_vertex_tiles(&self) {
        for &t in &self.tiles {
            for &v in &self.vertices {
                let mut conj = Vec::new();
                for av in self.network.adjacent(v, self.config.io_ports, false) {
                    let Some(ev) = self.network.get_edge(v, av) else {
                        continue;
                    };
                    let mut disj = Vec::new();
                    for at in Self::connection_targets(self.layout, t) {
                        let hop = Bool::or(self.ctx, &[self.tv(at, av), self.te(at, ev)]);
                        let mut arms = vec![hop, self.tc(t, at).clone()];
                        if !self.layout.is_regularly_clocked() {
                            arms.push(self.phase_succ(t, at));
                        }
                        disj.push(self.all(&arms));
                    }
                    if !disj.is_empty() {
                        conj.push(self.any(&disj));
                    }
                }
                if !conj.is_empty() {
                    self.solver
                        .assert(&self.tv(t, v).implies(&self.all(&conj)));
                }
            }
        }
    }

    /// Mirror of [`Self::adjacent_vertex_tiles`] for predecessors.
    fn inv_adjacent_vertex_tiles(&self) {
        for &t in &self.tiles {
            for &v in &self.vertices {
                let mut conj = Vec::new();
                for iav in self.network.inv_adjacent(v, self.config.io_ports, false) {
                    let Some(iev) = self.network.get_edge(iav, v) else {
                        continue;
                    };
                    let mut disj = Vec::new();
                    for iat in Self::connection_sources(self.layout, t) {
                        let hop = Bool::or(self.ctx, &[self.tv(iat, iav), self.te(iat, iev)]);
                        let mut arms = vec![hop, self.tc(iat, t).clone()];
                        if !self.layout.is_regularly_clocked() {
                            arms.push(self.phase_succ(iat, t));
                        }
                        disj.push(self.all(&arms));
                    }
                    if !disj.is_empty() {
                        conj.push(self.any(&disj));
                    }
                }
                if !conj.is_empty() {
                    self.solver
                        .assert(&self.tv(t, v).implies(&self.all(&conj)));
                }
            }
        }
    }

    /// A routed edge must continue on an outgoing-clocked neighbor, either
    /// as its target vertex or as the edge itself.
    fn adjacent_edge_tiles(&self) {
        for &t in &self.tiles {
            for &e in &self.edges {
                let target = self.network.target(e);
                let mut disj = Vec::new();
                for at in Self::connection_targets(self.layout, t) {
                    let hop = Bool::or(self.ctx, &[self.tv(at, target), self.te(at, e)]);
                    let mut arms = vec![hop, self.tc(t, at).clone()];
                    if !self.layout.is_regularly_clocked() {
                        arms.push(self.phase_succ(t, at));
                    }
                    disj.push(self.all(&arms));
                }
                if !disj.is_empty() {
                    self.solver
                        .assert(&self.te(t, e).implies(&self.any(&disj)));
                }
            }
        }
    }

    /// Mirror of [`Self::adjacent_edge_tiles`] for the edge's source.
    fn inv_adjacent_edge_tiles(&self) {
        for &t in &self.tiles {
            for &e in &self.edges {
                let source = self.network.source(e);
                let mut disj = Vec::new();
                for iat in Self::connection_sources(self.layout, t) {
                    let hop = Bool::or(self.ctx, &[self.tv(iat, source), self.te(iat, e)]);
                    let mut arms = vec![hop, self.tc(iat, t).clone()];
                    if !self.layout.is_regularly_clocked() {
                        arms.push(self.phase_succ(iat, t));
                    }
                    disj.push(self.all(&arms));
                }
                if !disj.is_empty() {
                    self.solver
                        .assert(&self.te(t, e).implies(&self.any(&disj)));
                }
            }
        }
    }

    /// Lifts established arrows to path variables.
    fn establish_sub_paths(&self) {
        for &t in &self.tiles {
            for at in Self::connection_targets(self.layout, t) {
                self.solver
                    .assert(&self.tc(t, at).implies(self.tp(t, at)));
            }
        }
    }

    /// Spans paths transitively.
    fn establish_transitive_paths(&self) {
        for &t1 in &self.tiles {
            for &t2 in &self.tiles {
                if t1 == t2 {
                    continue;
                }
                for &t3 in &self.tiles {
                    if t2 == t3 {
                        continue;
                    }
                    let chain = Bool::and(self.ctx, &[self.tp(t1, t2), self.tp(t2, t3)]);
                    self.solver.assert(&chain.implies(self.tp(t1, t3)));
                }
            }
        }
    }

    /// Forbids information loops.
    fn eliminate_cycles(&self) {
        for &t in &self.tiles {
            self.solver.assert(&self.tp(t, t).not());
        }
    }

    /// Ties every PI clock variable to the phase of the tile its vertex is
    /// placed on.
    fn assign_pi_clockings(&self) {
        for v in Self::clocked_inputs(self.network, self.config) {
            let cl = self.vcl(v);
            for &t in &self.tiles {
                let phase = if self.layout.is_regularly_clocked() {
                    match self.layout.phase_of(t) {
                        Some(p) => self.int(p as i64),
                        None => continue,
                    }
                } else {
                    self.tcl(t).clone()
                };
                self.solver
                    .assert(&self.tv(t, v).implies(&cl._eq(&phase)));
            }
        }
    }

    /// Requires all fan-in paths to a primary output to have the same
    /// length modulo timing, expressed as equal ITE-counter sums.
    fn fanin_lengths(&self) {
        let define_length = |v: VertexId| {
            let paths = self.network.all_paths(v, self.config.io_ports, false);
            if paths.is_empty() {
                return;
            }
            let max_length = paths.iter().map(Vec::len).max().unwrap_or(0);

            let mut all_path_lengths = Vec::new();
            for p in &paths {
                let mut terms = Vec::new();

                // vertex count acts as an offset to the path length, since
                // every vertex is placed on some tile
                let offset = p.len() as i64 - max_length as i64;
                if offset != 0 {
                    terms.push(self.int(offset));
                }

                for &e in p {
                    // the clock phase of an involved PI joins the sum
                    let s = self.network.source(e);
                    if self.config.io_ports && self.network.is_pi(s) {
                        terms.push(self.vcl(s).clone());
                    } else if !self.config.io_ports && self.network.pre_pi(s) {
                        terms.push(self.vcl(s).clone());
                    }

                    self.tile_ite_counters(e, &mut terms);
                }
                all_path_lengths.push(self.sum(&terms));
            }
            self.solver.assert(&self.all_equal(&all_path_lengths));
        };

        if self.config.io_ports {
            for po in self.network.pos().collect::<Vec<_>>() {
                define_length(po);
            }
        } else {
            for po in self.network.pos().collect::<Vec<_>>() {
                for v in self.network.inv_adjacent(po, false, false).collect::<Vec<_>>() {
                    define_length(v);
                }
            }
        }
    }

    /// Forbids placements on tiles with insufficient clocked neighbors.
    fn prevent_insufficiencies(&self) {
        for &t in &self.tiles {
            if self.layout.is_regularly_clocked() {
                let t_out = self.layout.out_degree(t);
                let t_in = self.layout.in_degree(t);

                for &v in &self.vertices {
                    if t_out < self.network.out_degree(v, self.config.io_ports, false)
                        || t_in < self.network.in_degree(v, self.config.io_ports, false)
                    {
                        self.solver.assert(&self.tv(t, v).not());
                    }
                }

                if t_out == 0 || t_in == 0 {
                    for &e in &self.edges {
                        self.solver.assert(&self.te(t, e).not());
                    }
                }
            } else {
                // an open clocking admits any orientation, so only the total
                // neighborhood size can prune
                let degree = self.layout.grid().surrounding_2d(t).len();
                for &v in &self.vertices {
                    let needed = self.network.out_degree(v, self.config.io_ports, false)
                        + self.network.in_degree(v, self.config.io_ports, false);
                    if degree < needed {
                        self.solver.assert(&self.tv(t, v).not());
                    }
                }
            }
        }
    }

    /// Makes the number of arrow variables at each tile match the element
    /// that occupies it, and forbids paths through empty tiles.
    fn define_number_of_connections(&self) {
        for &t in &self.tiles {
            let outgoing: Vec<Bool> = Self::connection_targets(self.layout, t)
                .into_iter()
                .map(|at| self.tc(t, at).clone())
                .collect();
            let incoming: Vec<Bool> = Self::connection_sources(self.layout, t)
                .into_iter()
                .map(|iat| self.tc(iat, t).clone())
                .collect();

            let acc: Vec<&Bool> = outgoing.iter().collect();
            let iacc: Vec<&Bool> = incoming.iter().collect();

            // all connection and path variables touching t
            let mut ccp: Vec<Bool> = outgoing.iter().chain(incoming.iter()).cloned().collect();

            let mut occupied: Vec<&Bool> = Vec::new();

            for &v in &self.vertices {
                let tv = self.tv(t, v);
                let aon = self.network.out_degree(v, self.config.io_ports, false) as i32;
                let iaon = self.network.in_degree(v, self.config.io_ports, false) as i32;

                occupied.push(tv);

                // a placed vertex fixes its connection counts to its arity
                if !acc.is_empty() {
                    self.solver.assert(&tv.implies(&self.exactly(&acc, aon)));
                }
                if !iacc.is_empty() {
                    self.solver.assert(&tv.implies(&self.exactly(&iacc, iaon)));
                }
            }

            let wires: Vec<&Bool> = self.edges.iter().map(|&e| self.te(t, e)).collect();
            occupied.extend(wires.iter().copied());

            // a single routed edge passes through: one in, one out
            if !acc.is_empty() {
                self.solver.assert(
                    &self
                        .exactly(&wires, 1)
                        .implies(&self.exactly(&acc, 1)),
                );
            }
            if !iacc.is_empty() {
                self.solver.assert(
                    &self
                        .exactly(&wires, 1)
                        .implies(&self.exactly(&iacc, 1)),
                );
            }

            // two stacked edges need two connections in each direction
            if self.config.crossings {
                if !acc.is_empty() {
                    self.solver.assert(
                        &self
                            .exactly(&wires, 2)
                            .implies(&self.exactly(&acc, 2)),
                    );
                }
                if !iacc.is_empty() {
                    self.solver.assert(
                        &self
                            .exactly(&wires, 2)
                            .implies(&self.exactly(&iacc, 2)),
                    );
                }
            }

            for &t2 in &self.tiles {
                ccp.push(self.tp(t, t2).clone());
                if t != t2 {
                    ccp.push(self.tp(t2, t).clone());
                }
            }
            let ccp_refs: Vec<&Bool> = ccp.iter().collect();

            // an empty tile has no connections and no paths at all
            if !occupied.is_empty() && !ccp_refs.is_empty() {
                self.solver.assert(
                    &self
                        .at_most(&occupied, 0)
                        .implies(&self.at_most(&ccp_refs, 0)),
                );
            }
        }
    }

    /// Forbids primary I/O placements on non-border tiles.
    fn enforce_border_io(&self) {
        let assign_border = |v: VertexId| {
            for &t in &self.tiles {
                if !self.layout.grid().is_border(t) {
                    self.solver.assert(&self.tv(t, v).not());
                }
            }
        };

        if self.config.io_ports {
            for v in self.network.pis().chain(self.network.pos()).collect::<Vec<_>>() {
                assign_border(v);
            }
        } else {
            let mut border_vs: Vec<VertexId> = Vec::new();
            for pi in self.network.pis() {
                border_vs.extend(self.network.adjacent(pi, false, false));
            }
            for po in self.network.pos() {
                border_vs.extend(self.network.inv_adjacent(po, false, false));
            }
            border_vs.sort();
            border_vs.dedup();
            for v in border_vs {
                assign_border(v);
            }
        }
    }

    /// Caps the number of tiles each edge may occupy.
    fn limit_wire_length(&self, limit: usize) {
        for &e in &self.edges {
            let tes: Vec<&Bool> = self.tiles.iter().map(|&t| self.te(t, e)).collect();
            self.solver.assert(&self.at_most(&tes, limit as i32));
        }
    }

    /// Caps the number of crossing tiles.
    fn limit_crossings(&self, limit: usize) {
        let counter = self.crossing_counter();
        self.solver
            .assert(&counter.le(&self.int(limit as i64)));
    }

    /// Counter summing one per tile that carries two stacked edges.
    fn crossing_counter(&self) -> Int<'ctx> {
        let one = self.int(1);
        let zero = self.int(0);
        let counters: Vec<Int> = self
            .tiles
            .iter()
            .map(|&t| {
                let wires: Vec<&Bool> = self.edges.iter().map(|&e| self.te(t, e)).collect();
                self.at_least(&wires, 2).ite(&one, &zero)
            })
            .collect();
        self.sum(&counters)
    }

    /// Forces every inverter's input and output onto opposite tile faces by
    /// forbidding bent arrow combinations around its tile.
    fn enforce_straight_inverters(&self) {
        for &v in &self.vertices {
            if self.network.op(v) != Operation::Not {
                continue;
            }
            for &t in &self.tiles {
                for iat in Self::connection_sources(self.layout, t) {
                    let inp = self.layout.bearing(t, iat);
                    for at in Self::connection_targets(self.layout, t) {
                        let out = self.layout.bearing(t, at);
                        if inp != out.opposite() {
                            let bent = Bool::and(
                                self.ctx,
                                &[self.tv(t, v), self.tc(iat, t), self.tc(t, at)],
                            );
                            self.solver.assert(&bent.not());
                        }
                    }
                }
            }
        }
    }

    /// Objective: as few wire tiles as possible.
    fn minimize_wires(&self) {
        let one = self.int(1);
        let zero = self.int(0);
        let counters: Vec<Int> = self
            .tiles
            .iter()
            .flat_map(|&t| {
                self.edges
                    .iter()
                    .map(|&e| self.te(t, e).ite(&one, &zero))
                    .collect::<Vec<_>>()
            })
            .collect();
        self.solver.minimize(&self.sum(&counters));
    }

    /// Objective: as few crossings as possible.
    fn minimize_crossings(&self) {
        self.solver.minimize(&self.crossing_counter());
    }

    /// Emits the full instance.
    ///
    /// `cancel` is polled between constraint groups; when another worker has
    /// already won, generation stops early and `false` is returned.
    pub fn generate(&self, cancel: Option<&AtomicBool>) -> bool {
        let cancelled = || cancel.is_some_and(|c| c.load(Ordering::Relaxed));

        // layout constraints
        self.restrict_tile_elements();
        self.restrict_vertices();

        if !self.layout.is_regularly_clocked() {
            self.restrict_clocks();
        }
        if self.config.artificial_latches && !self.config.desynchronize {
            self.restrict_latches();
        }
        if cancelled() {
            return false;
        }

        // adjacency constraints
        self.adjacent_vertex_tiles();
        self.inv_adjacent_vertex_tiles();
        self.adjacent_edge_tiles();
        self.inv_adjacent_edge_tiles();
        if cancelled() {
            return false;
        }

        // path and cycle constraints
        self.establish_sub_paths();
        self.establish_transitive_paths();
        self.eliminate_cycles();
        if cancelled() {
            return false;
        }

        // fan-in constraints
        self.assign_pi_clockings();
        if !self.config.desynchronize {
            self.fanin_lengths();
        }
        if cancelled() {
            return false;
        }

        // pruning constraints
        self.prevent_insufficiencies();
        self.define_number_of_connections();
        if cancelled() {
            return false;
        }

        // physical restrictions
        if self.config.border_io {
            self.enforce_border_io();
        }
        if let Some(limit) = self.config.wire_limit {
            self.limit_wire_length(limit);
        }
        if self.config.crossings {
            if let Some(limit) = self.config.crossings_limit {
                self.limit_crossings(limit);
            }
        }
        if self.config.straight_inverters {
            self.enforce_straight_inverters();
        }
        if self.config.minimize_wires {
            self.minimize_wires();
        }
        if self.config.minimize_crossings {
            self.minimize_crossings();
        }

        !cancelled()
    }
}

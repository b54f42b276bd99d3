//! Orthogonal embedding with bent wires.
//!
//! Places the vertices of a joint-DFS ordering on a 2DDWave-clocked grid:
//! red fan-ins extend a row towards the east, blue fan-ins extend a column
//! towards the south, and fan-in-free vertices open both a new row and a new
//! column. Wires run east and south with at most one bend; a wire entering
//! an occupied tile is lifted to the crossing layer. Information flow is
//! uniformly top-left to bottom-right, so the clocking is satisfied by
//! construction.

use crate::ortho::coloring::RbColor;
use std::collections::HashMap;
use std::sync::Arc;
use tessera_grid::{ClockingScheme, Directions, Tile};
use tessera_layout::GateLayout;
use tessera_network::{EdgeId, LogicNetwork, VertexId};

/// Embeds the ordered, colored network onto a fresh layout and shrinks it
/// to its bounding box.
pub(crate) fn orthogonal_embedding(
    network: Arc<LogicNetwork>,
    coloring: &HashMap<EdgeId, RbColor>,
    jdfs: &[VertexId],
    phases: usize,
    io_ports: bool,
) -> GateLayout {
    // start from a |V| × |V| grid and shrink to fit at the end
    let extent = network.vertex_count(io_ports, false).max(1);
    let clocking = if phases == 3 {
        ClockingScheme::twoddwave_3()
    } else {
        ClockingScheme::twoddwave_4()
    };
    let mut layout = GateLayout::new(extent, extent, 2, clocking, Arc::clone(&network));

    let mut pos: HashMap<VertexId, Tile> = HashMap::new();
    let mut x_cursor = 0usize;
    let mut y_cursor = 0usize;

    let is_pi = |v: VertexId| {
        if io_ports {
            network.is_pi(v)
        } else {
            network.pre_pi(v)
        }
    };
    let is_po = |v: VertexId| {
        if io_ports {
            network.is_po(v)
        } else {
            network.post_po(v)
        }
    };

    for &v in jdfs {
        let incoming: Vec<EdgeId> = network.in_edges(v, io_ports, false).collect();

        match incoming.len() {
            // a source vertex opens a new row and column
            0 => {
                let t = Tile::ground_at(x_cursor, y_cursor);
                layout.assign_vertex(t, v, is_pi(v), is_po(v));
                pos.insert(v, t);
                x_cursor += 1;
                y_cursor += 1;
            }
            1 => {
                let e = incoming[0];
                let pre_t = pos[&network.source(e)];

                if coloring[&e] == RbColor::Red {
                    // horizontal: the predecessor fixes the row
                    let t = Tile::ground_at(x_cursor, pre_t.y);
                    layout.assign_vertex(t, v, is_pi(v), is_po(v));
                    pos.insert(v, t);

                    wire_east(&mut layout, pre_t, t, e);
                    assign_wire_dir(
                        &mut layout,
                        Tile::ground_at(pre_t.x + 1, pre_t.y),
                        pre_t,
                        Directions::E,
                        e,
                    );
                    assign_wire_dir(
                        &mut layout,
                        t,
                        Tile::ground_at(t.x - 1, t.y),
                        Directions::E,
                        e,
                    );

                    x_cursor += 1;
                } else {
                    // vertical: the predecessor fixes the column
                    let t = Tile::ground_at(pre_t.x, y_cursor);
                    layout.assign_vertex(t, v, is_pi(v), is_po(v));
                    pos.insert(v, t);

                    wire_south(&mut layout, pre_t, t, e);
                    assign_wire_dir(
                        &mut layout,
                        Tile::ground_at(pre_t.x, pre_t.y + 1),
                        pre_t,
                        Directions::S,
                        e,
                    );
                    assign_wire_dir(
                        &mut layout,
                        t,
                        Tile::ground_at(t.x, t.y - 1),
                        Directions::S,
                        e,
                    );

                    y_cursor += 1;
                }
            }
            _ => {
                let (e1, e2) = (incoming[0], incoming[1]);
                let p1 = pos[&network.source(e1)];
                let p2 = pos[&network.source(e2)];

                // placement is decided by the fan-in colors
                let t = if coloring[&e1] == coloring[&e2] && coloring[&e1] == RbColor::Red {
                    let y = p1.y.max(p2.y);
                    let t = Tile::ground_at(x_cursor, y);
                    x_cursor += 1;
                    t
                } else if coloring[&e1] == coloring[&e2] && coloring[&e1] == RbColor::Blue {
                    let x = p1.x.max(p2.x);
                    let t = Tile::ground_at(x, y_cursor);
                    y_cursor += 1;
                    t
                } else {
                    // a coloring conflict claims both a new row and column
                    let t = Tile::ground_at(x_cursor, y_cursor);
                    x_cursor += 1;
                    y_cursor += 1;
                    t
                };

                layout.assign_vertex(t, v, is_pi(v), is_po(v));
                pos.insert(v, t);

                for (e, pre_t) in [(e1, p1), (e2, p2)] {
                    if coloring[&e] == RbColor::Red {
                        let bending_wire = pre_t.y != t.y;

                        // horizontal segment first
                        let target = if bending_wire {
                            Tile::ground_at(t.x + 1, pre_t.y)
                        } else {
                            t
                        };
                        wire_east(&mut layout, pre_t, target, e);
                        assign_wire_dir(
                            &mut layout,
                            Tile::ground_at(pre_t.x + 1, pre_t.y),
                            pre_t,
                            Directions::E,
                            e,
                        );

                        if bending_wire {
                            wire_south(&mut layout, Tile::ground_at(t.x, pre_t.y), t, e);
                            assign_wire_dir(
                                &mut layout,
                                t,
                                Tile::ground_at(t.x, t.y - 1),
                                Directions::S,
                                e,
                            );
                        } else {
                            assign_wire_dir(
                                &mut layout,
                                t,
                                Tile::ground_at(t.x - 1, t.y),
                                Directions::E,
                                e,
                            );
                        }
                    } else {
                        let bending_wire = pre_t.x != t.x;

                        // vertical segment first
                        let target = if bending_wire {
                            Tile::ground_at(pre_t.x, t.y + 1)
                        } else {
                            t
                        };
                        wire_south(&mut layout, pre_t, target, e);
                        assign_wire_dir(
                            &mut layout,
                            Tile::ground_at(pre_t.x, pre_t.y + 1),
                            pre_t,
                            Directions::S,
                            e,
                        );

                        if bending_wire {
                            wire_east(&mut layout, Tile::ground_at(pre_t.x, t.y), t, e);
                            assign_wire_dir(
                                &mut layout,
                                t,
                                Tile::ground_at(t.x - 1, t.y),
                                Directions::E,
                                e,
                            );
                        } else {
                            assign_wire_dir(
                                &mut layout,
                                t,
                                Tile::ground_at(t.x, t.y - 1),
                                Directions::S,
                                e,
                            );
                        }
                    }
                }
            }
        }
    }

    layout.shrink_to_fit();
    layout
}

/// Assigns flow directions between two adjacent tile positions, resolving
/// each position to the layer that actually carries the element.
/// `current` receives the input, `previous` the output of direction `dir`.
fn assign_wire_dir(
    layout: &mut GateLayout,
    current: Tile,
    previous: Tile,
    dir: Directions,
    e: EdgeId,
) {
    let t1 = if layout.has_edge(current, e) || layout.is_gate_tile(current) {
        current
    } else {
        layout.grid().above(current).unwrap_or(current)
    };
    layout.assign_wire_inp_dir(t1, e, dir.opposite());
    layout.assign_tile_inp_dir(t1, dir.opposite());

    let t2 = if layout.has_edge(previous, e) || layout.is_gate_tile(previous) {
        previous
    } else {
        layout.grid().above(previous).unwrap_or(previous)
    };
    layout.assign_wire_out_dir(t2, e, dir);
    layout.assign_tile_out_dir(t2, dir);
}

/// Routes edge `e` horizontally from `t1` (exclusive) to `t2` (exclusive),
/// lifting to the crossing layer wherever a wire already occupies a tile.
fn wire_east(layout: &mut GateLayout, t1: Tile, t2: Tile, e: EdgeId) {
    for x in (t1.x + 1)..t2.x {
        let current = Tile::ground_at(x, t1.y);
        let previous = Tile::ground_at(x - 1, t1.y);

        if layout.is_wire_tile(current) {
            if let Some(above) = layout.grid().above(current) {
                layout.assign_edge(above, e);
            }
        } else {
            layout.assign_edge(current, e);
        }

        assign_wire_dir(layout, current, previous, Directions::E, e);
    }
}

/// Routes edge `e` vertically from `t1` (exclusive) to `t2` (exclusive),
/// lifting to the crossing layer wherever a wire already occupies a tile.
fn wire_south(layout: &mut GateLayout, t1: Tile, t2: Tile, e: EdgeId) {
    for y in (t1.y + 1)..t2.y {
        let current = Tile::ground_at(t1.x, y);
        let previous = Tile::ground_at(t1.x, y - 1);

        if layout.is_wire_tile(current) {
            if let Some(above) = layout.grid().above(current) {
                layout.assign_edge(above, e);
            }
        } else {
            layout.assign_edge(current, e);
        }

        assign_wire_dir(layout, current, previous, Directions::S, e);
    }
}

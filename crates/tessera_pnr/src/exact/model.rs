//! Reconstruction of a layout from a satisfying solver model.

use crate::config::ExactConfig;
use crate::exact::encoder::Vars;
use tessera_grid::Tile;
use tessera_layout::GateLayout;
use z3::ast::{Bool, Int};
use z3::Model;

fn eval_bool(model: &Model, var: &Bool) -> bool {
    model
        .eval(var, true)
        .and_then(|b| b.as_bool())
        .unwrap_or(false)
}

fn eval_int(model: &Model, var: &Int) -> i64 {
    model
        .eval(var, true)
        .and_then(|i| i.as_i64())
        .unwrap_or(0)
}

/// Populates `layout` from a satisfying assignment.
///
/// Vertices land on their ground tiles; a second edge routed through an
/// occupied wire tile is lifted to the crossing layer. Irregular clock
/// phases, information-flow directions (derived from arrow variables and
/// bearings), and latch delays are applied afterwards.
pub(crate) fn extract_layout(
    vars: &Vars<'_>,
    model: &Model<'_>,
    layout: &mut GateLayout,
    config: &ExactConfig,
) {
    let network = layout.network_handle();
    let tiles: Vec<Tile> = layout.grid().ground_layer().collect();
    let vertices: Vec<_> = network.vertices(config.io_ports, false).collect();
    let edges: Vec<_> = network.edges(config.io_ports, false).collect();

    // place vertices and route edges
    for &t in &tiles {
        let mut element_placed = false;
        for &v in &vertices {
            if eval_bool(model, &vars.tv[&(t, v)]) {
                let (pi, po) = if config.io_ports {
                    (network.is_pi(v), network.is_po(v))
                } else {
                    (network.pre_pi(v), network.post_po(v))
                };
                layout.assign_vertex(t, v, pi, po);
                // no second element can share the tile
                element_placed = true;
                break;
            }
        }
        if element_placed {
            continue;
        }

        for &e in &edges {
            if eval_bool(model, &vars.te[&(t, e)]) {
                if layout.is_wire_tile(t) {
                    // second edge on this position: lift it to the crossing
                    // layer
                    if let Some(above) = layout.grid().above(t) {
                        layout.assign_edge(above, e);
                    }
                } else {
                    layout.assign_edge(t, e);
                }
            }
        }
    }

    // irregular schemes get their phases from the model; from here on no
    // distinction between regular and irregular is necessary
    if !layout.is_regularly_clocked() {
        for &t in &tiles {
            layout.assign_phase(t, eval_int(model, &vars.tcl[&t]) as usize);
        }
    }

    // derive directions from established arrows
    for &t1 in &tiles {
        for t2 in layout.outgoing_clocked_tiles(t1) {
            let Some(arrow) = vars.tc.get(&(t1, t2)) else {
                continue;
            };
            if !eval_bool(model, arrow) {
                continue;
            }

            // resolve the actual layers of the two endpoints: the flow may
            // run through a crossing above either tile
            let above1 = layout.grid().above(t1);
            let above2 = layout.grid().above(t2);
            let mut candidates = vec![(t1, t2)];
            if let Some(a2) = above2 {
                candidates.push((t1, a2));
            }
            if let Some(a1) = above1 {
                candidates.push((a1, t2));
            }
            if let (Some(a1), Some(a2)) = (above1, above2) {
                candidates.push((a1, a2));
            }
            let Some(&(src, dst)) = candidates
                .iter()
                .find(|&&(src, dst)| layout.is_data_flow(src, dst))
            else {
                continue;
            };

            let out_dir = layout.bearing(src, dst);
            for e in layout.edges_at(src) {
                layout.assign_wire_out_dir(src, e, out_dir);
            }
            layout.assign_tile_out_dir(src, out_dir);

            let inp_dir = layout.bearing(dst, src);
            for e in layout.edges_at(dst) {
                layout.assign_wire_inp_dir(dst, e, inp_dir);
            }
            layout.assign_tile_inp_dir(dst, inp_dir);
        }
    }

    // latch delays come in cycles and are stored in phases
    if config.artificial_latches && !config.desynchronize {
        let phases = layout.num_phases();
        for &t in &tiles {
            let cycles = eval_int(model, &vars.tl[&t]) as usize;
            layout.assign_latch(t, cycles * phases);
        }
    }
}

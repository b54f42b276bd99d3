//! Heuristic placement and routing via orthogonal graph drawing.
//!
//! An adaptation of orthogonal graph drawing for 3-graphs: a joint DFS
//! ordering, a red/blue edge coloring, and an incremental embedding with
//! bent wires produce a feasible (non-minimal) 2DDWave layout in linear
//! time. Only AOIG networks (AND/OR/NOT logic plus fan-outs, wires, and
//! I/Os) are supported.

pub(crate) mod coloring;
pub(crate) mod embed;
pub(crate) mod jdfs;

use crate::error::PnrError;
use crate::report::RuntimeReport;
use crate::PrResult;
use std::sync::Arc;
use std::time::Instant;
use tessera_network::LogicNetwork;

/// Performs heuristic placement and routing of `network` on a 2DDWave grid
/// with the given number of clock phases (3 selects the 3-phase scheme,
/// anything else the 4-phase one).
///
/// `io_ports` routes designated PI/PO vertices; otherwise gates adjacent to
/// the I/Os act as implicit pins.
pub fn place_and_route(network: Arc<LogicNetwork>, phases: usize, io_ports: bool) -> PrResult {
    let start = Instant::now();
    let runtime = |start: &Instant| RuntimeReport::with_runtime(start.elapsed().as_millis() as u64);

    if network.pi_count() == 0 || network.po_count() == 0 {
        return PrResult {
            layout: Err(PnrError::EmptyNetwork),
            report: runtime(&start),
        };
    }
    if !network.is_aoig() {
        return PrResult {
            layout: Err(PnrError::UnsupportedLogic),
            report: runtime(&start),
        };
    }
    if let Err(e) = network.validate_arities() {
        return PrResult {
            layout: Err(e.into()),
            report: runtime(&start),
        };
    }

    let ordering = jdfs::jdfs_order(&network, io_ports);
    let rb = coloring::rb_coloring(&network, io_ports, &ordering);
    let layout = embed::orthogonal_embedding(network, &rb, &ordering, phases, io_ports);

    PrResult {
        layout: Ok(layout),
        report: runtime(&start),
    }
}

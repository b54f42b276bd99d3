//! Exact placement and routing via SMT solving.
//!
//! For a logic network, a clocking scheme, and a tile budget, the engine
//! searches for the smallest rectangular layout on which the network can be
//! placed and routed under the configured options. Layout sizes are probed
//! in increasing order; for each size, every factorization into a grid with
//! both dimensions at least 2 is encoded as an SMT instance and checked.
//! The first satisfiable instance yields the result.
//!
//! Each size round owns its solver context; the remaining wall-clock budget
//! is handed to the solver as its timeout. With `num_threads > 1`, the
//! factor pairs of one size are distributed over a worker pool in which the
//! first satisfied worker wins and peers cancel cooperatively.

pub(crate) mod encoder;
pub(crate) mod model;

use crate::config::ExactConfig;
use crate::error::PnrError;
use crate::report::RuntimeReport;
use crate::PrResult;
use encoder::Encoder;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Instant;
use tessera_layout::GateLayout;
use tessera_network::LogicNetwork;
use z3::{Config, Context, Optimize, SatResult};

/// Enumerates all grid dimensions `(x, y)` with `x * y == n` and both
/// dimensions at least 2.
pub(crate) fn factorize(n: usize) -> Vec<(usize, usize)> {
    let mut dims = Vec::new();
    let mut i = 1;
    while i * i <= n {
        if n % i == 0 {
            let (x, y) = (i, n / i);
            if x > 1 && y > 1 {
                dims.push((x, y));
                if x != y {
                    dims.push((y, x));
                }
            }
        }
        i += 1;
    }
    dims
}

/// Performs exact placement and routing of `network` under `config`.
///
/// The network must be in placement normal form (no XOR, fan-out arities
/// respected); run
/// [`substitute`](tessera_network::rewrite::substitute) first.
pub fn place_and_route(network: Arc<LogicNetwork>, config: &ExactConfig) -> PrResult {
    let start = Instant::now();
    let mut rounds = 0usize;

    let elapsed_ms = |start: &Instant| start.elapsed().as_millis() as u64;
    let report_at = |start: &Instant, rounds: usize, last_size: usize| RuntimeReport {
        runtime_ms: elapsed_ms(start),
        rounds: Some(rounds),
        last_size: Some(last_size),
    };

    if let Err(e) = config.validate() {
        return PrResult {
            layout: Err(e),
            report: RuntimeReport::with_runtime(elapsed_ms(&start)),
        };
    }
    if network.pi_count() == 0 || network.po_count() == 0 {
        return PrResult {
            layout: Err(PnrError::EmptyNetwork),
            report: RuntimeReport::with_runtime(elapsed_ms(&start)),
        };
    }
    if let Err(e) = network.validate_arities() {
        return PrResult {
            layout: Err(e.into()),
            report: RuntimeReport::with_runtime(elapsed_ms(&start)),
        };
    }

    let lower_bound = if config.fixed_size {
        config.upper_bound
    } else {
        network.vertex_count(config.io_ports, false)
    };

    let mut n = lower_bound;
    while n <= config.upper_bound {
        let remaining = config.timeout_ms.saturating_sub(elapsed_ms(&start));
        if remaining == 0 {
            return PrResult {
                layout: Err(PnrError::Timeout { last_size: n }),
                report: report_at(&start, rounds, n),
            };
        }

        let dims = factorize(n);
        let outcome = if config.num_threads > 1 {
            solve_size_parallel(&network, config, &dims, &start, &mut rounds)
        } else {
            solve_size_serial(&network, config, &dims, &start, &mut rounds)
        };

        match outcome {
            Ok(Some(layout)) => {
                return PrResult {
                    layout: Ok(layout),
                    report: report_at(&start, rounds, n),
                };
            }
            Ok(None) => {}
            Err(e) => {
                return PrResult {
                    layout: Err(e),
                    report: report_at(&start, rounds, n),
                };
            }
        }

        if config.fixed_size {
            break;
        }
        match n.checked_add(1) {
            Some(next) => n = next,
            None => break,
        }
    }

    PrResult {
        layout: Err(PnrError::NotPlaceable {
            tiles: config.upper_bound,
        }),
        report: report_at(&start, rounds, config.upper_bound.min(n)),
    }
}

/// Probes all factor pairs of one size sequentially.
fn solve_size_serial(
    network: &Arc<LogicNetwork>,
    config: &ExactConfig,
    dims: &[(usize, usize)],
    start: &Instant,
    rounds: &mut usize,
) -> Result<Option<GateLayout>, PnrError> {
    for &(x, y) in dims {
        let remaining = config
            .timeout_ms
            .saturating_sub(start.elapsed().as_millis() as u64);
        if remaining == 0 {
            return Err(PnrError::Timeout { last_size: x * y });
        }
        *rounds += 1;
        if let Some(layout) = solve_round(network, config, x, y, remaining, None)? {
            return Ok(Some(layout));
        }
    }
    Ok(None)
}

/// Probes the factor pairs of one size on a worker pool.
///
/// Workers drain the pair list through a shared cursor, each owning its own
/// solver context. The first satisfied worker publishes its layout and
/// raises the `done` flag; peers observe the flag between constraint groups
/// and after every solver return. Which factor pair wins is unspecified.
fn solve_size_parallel(
    network: &Arc<LogicNetwork>,
    config: &ExactConfig,
    dims: &[(usize, usize)],
    start: &Instant,
    rounds: &mut usize,
) -> Result<Option<GateLayout>, PnrError> {
    if dims.is_empty() {
        return Ok(None);
    }

    let cursor = AtomicUsize::new(0);
    let attempts = AtomicUsize::new(0);
    let done = AtomicBool::new(false);
    let winner: Mutex<Option<GateLayout>> = Mutex::new(None);
    let failure: Mutex<Option<PnrError>> = Mutex::new(None);
    let workers = config.num_threads.min(dims.len());

    thread::scope(|scope| {
        for _ in 0..workers {
            scope.spawn(|| loop {
                if done.load(Ordering::Relaxed) {
                    break;
                }
                let i = cursor.fetch_add(1, Ordering::Relaxed);
                if i >= dims.len() {
                    break;
                }
                let remaining = config
                    .timeout_ms
                    .saturating_sub(start.elapsed().as_millis() as u64);
                if remaining == 0 {
                    break;
                }
                attempts.fetch_add(1, Ordering::Relaxed);

                let (x, y) = dims[i];
                match solve_round(network, config, x, y, remaining, Some(&done)) {
                    Ok(Some(layout)) => {
                        let mut slot = winner.lock().unwrap_or_else(|e| e.into_inner());
                        if slot.is_none() {
                            *slot = Some(layout);
                        }
                        done.store(true, Ordering::Relaxed);
                        break;
                    }
                    Ok(None) => {}
                    Err(e) => {
                        let mut slot = failure.lock().unwrap_or_else(|e| e.into_inner());
                        if slot.is_none() {
                            *slot = Some(e);
                        }
                        done.store(true, Ordering::Relaxed);
                        break;
                    }
                }
            });
        }
    });

    *rounds += attempts.load(Ordering::Relaxed);

    if let Some(layout) = winner.into_inner().unwrap_or_else(|e| e.into_inner()) {
        return Ok(Some(layout));
    }
    if let Some(e) = failure.into_inner().unwrap_or_else(|e| e.into_inner()) {
        return Err(e);
    }
    Ok(None)
}

/// Encodes and checks one grid size, returning the reconstructed layout on
/// SAT, `None` on UNSAT or cancellation.
fn solve_round(
    network: &Arc<LogicNetwork>,
    config: &ExactConfig,
    x: usize,
    y: usize,
    timeout_ms: u64,
    cancel: Option<&AtomicBool>,
) -> Result<Option<GateLayout>, PnrError> {
    let mut layout = GateLayout::new(x, y, 2, config.clocking.clone(), Arc::clone(network));

    let mut z3_config = Config::new();
    z3_config.set_timeout_msec(timeout_ms);
    let ctx = Context::new(&z3_config);
    let solver = Optimize::new(&ctx);

    let round_start = Instant::now();
    let instance = Encoder::new(&ctx, &solver, &layout, config);
    if !instance.generate(cancel) {
        return Ok(None);
    }
    let vars = instance.into_vars();

    match solver.check(&[]) {
        SatResult::Sat => {
            let Some(model) = solver.get_model() else {
                return Err(PnrError::SolverResourceLimit(
                    "satisfiable instance without a model".into(),
                ));
            };
            model::extract_layout(&vars, &model, &mut layout, config);
            Ok(Some(layout))
        }
        SatResult::Unsat => Ok(None),
        SatResult::Unknown => {
            // a solver-side timeout or cooperative cancellation is a normal
            // round termination; the search loop accounts for the budget
            let cancelled = cancel.is_some_and(|c| c.load(Ordering::Relaxed));
            let round_elapsed = round_start.elapsed().as_millis() as u64;
            if cancelled || round_elapsed >= timeout_ms {
                Ok(None)
            } else {
                Err(PnrError::SolverResourceLimit(
                    "solver returned unknown".into(),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_grid::{lookup_clocking, ClockingScheme};
    use tessera_network::rewrite::substitute;

    fn and_network() -> LogicNetwork {
        let mut n = LogicNetwork::new("and");
        let a = n.create_pi("a");
        let b = n.create_pi("b");
        let g = n.create_and(a, b);
        n.create_po(g, "y");
        n
    }

    #[test]
    fn factorize_enumerates_both_orientations() {
        assert_eq!(factorize(4), vec![(2, 2)]);
        assert_eq!(factorize(6), vec![(2, 3), (3, 2)]);
        assert_eq!(factorize(12), vec![(2, 6), (6, 2), (3, 4), (4, 3)]);
    }

    #[test]
    fn factorize_skips_degenerate_strips() {
        assert!(factorize(0).is_empty());
        assert!(factorize(1).is_empty());
        assert!(factorize(2).is_empty());
        assert!(factorize(5).is_empty());
        assert!(factorize(7).is_empty());
    }

    #[test]
    fn empty_network_is_rejected() {
        let n = Arc::new(LogicNetwork::new("empty"));
        let result = place_and_route(n, &ExactConfig::default());
        assert!(matches!(result.layout, Err(PnrError::EmptyNetwork)));
        assert!(result.report.to_json().get("runtime").is_some());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = ExactConfig::default();
        config.artificial_latches = true;
        config.desynchronize = true;
        let n = Arc::new(and_network());
        let result = place_and_route(n, &config);
        assert!(matches!(result.layout, Err(PnrError::InvalidConfig(_))));
    }

    #[test]
    fn gate_placement_under_open_clocking() {
        // a single AND gate (I/O kept implicit) fits a 2×2 open-clocked grid
        let n = Arc::new(and_network());
        let mut config = ExactConfig::new(ClockingScheme::open_4());
        config.upper_bound = 9;
        config.timeout_ms = 60_000;
        let result = place_and_route(n, &config);

        let layout = result.layout.unwrap();
        assert_eq!(layout.gate_count(), 1);
        assert_eq!(layout.x() * layout.y(), 4);
        assert!(result.report.rounds.is_some_and(|r| r <= 2));
        // the AND tile carries the implicit I/O flags
        let t = layout.pi_tiles().next().unwrap();
        assert!(layout.is_po(t));
    }

    #[test]
    fn border_io_placement_under_twoddwave() {
        let mut n = and_network();
        substitute(&mut n);
        let n = Arc::new(n);

        let mut config = ExactConfig::new(lookup_clocking("2DDWAVE4").unwrap());
        config.io_ports = true;
        config.border_io = true;
        config.upper_bound = 12;
        config.timeout_ms = 120_000;
        let result = place_and_route(n, &config);

        let layout = result.layout.unwrap();
        assert_eq!(layout.gate_count(), 4);
        for t in layout.pi_tiles().chain(layout.po_tiles()) {
            assert!(layout.grid().is_border(t));
        }
        // clocking is respected along every information-flow pair
        for t in layout.grid().tiles() {
            for at in layout.outgoing_information_flow(t) {
                if t.z == at.z {
                    assert!(layout.is_outgoing_clocked(t, at));
                }
            }
        }
        let (cp, tp) = layout.critical_path_and_throughput();
        assert!(cp >= 3);
        assert_eq!(tp, 1);
    }

    #[test]
    fn fixed_size_probes_single_size() {
        let n = Arc::new(and_network());
        let mut config = ExactConfig::new(ClockingScheme::open_4());
        config.fixed_size = true;
        config.upper_bound = 4;
        config.timeout_ms = 60_000;
        let result = place_and_route(n, &config);
        assert!(result.layout.is_ok());
        assert_eq!(result.report.last_size, Some(4));
    }

    #[test]
    fn unplaceable_budget_reports_not_placeable() {
        let n = Arc::new(and_network());
        let mut config = ExactConfig::new(lookup_clocking("2DDWAVE4").unwrap());
        // four I/O-routed vertices can never fit three tiles
        config.io_ports = true;
        config.upper_bound = 3;
        config.timeout_ms = 60_000;
        let result = place_and_route(n, &config);
        assert!(matches!(
            result.layout,
            Err(PnrError::NotPlaceable { tiles: 3 })
        ));
    }

    #[test]
    fn latch_option_keeps_balanced_layouts_latch_free() {
        // a NOT feeding an AND needs no artificial delay; minimization must
        // settle on zero latches
        let mut n = LogicNetwork::new("latch");
        let a = n.create_pi("a");
        let b = n.create_pi("b");
        let inv = n.create_not(b);
        let g = n.create_and(a, inv);
        n.create_po(g, "y");
        let n = Arc::new(n);

        let mut config = ExactConfig::new(lookup_clocking("2DDWAVE4").unwrap());
        config.artificial_latches = true;
        config.upper_bound = 16;
        config.timeout_ms = 120_000;
        let result = place_and_route(n, &config);

        let layout = result.layout.unwrap();
        assert_eq!(layout.gate_count(), 2);
        assert_eq!(layout.latch_count(), 0);
    }

    #[test]
    fn parallel_search_finds_layout() {
        let mut n = and_network();
        substitute(&mut n);
        let n = Arc::new(n);

        let mut config = ExactConfig::new(lookup_clocking("2DDWAVE4").unwrap());
        config.io_ports = true;
        config.upper_bound = 16;
        config.num_threads = 4;
        config.timeout_ms = 120_000;
        let result = place_and_route(n, &config);
        let layout = result.layout.unwrap();
        assert_eq!(layout.gate_count(), 4);
    }
}

//! Placement and routing engines for FCN gate layouts.
//!
//! Two engines map a [`LogicNetwork`](tessera_network::LogicNetwork) onto a
//! clocked [`GateLayout`](tessera_layout::GateLayout):
//!
//! - [`exact`] — an SMT-based placer/router that searches for a minimum-area
//!   layout satisfying all constraints, with iterative size search over grid
//!   factorizations and optional parallel factor exploration;
//! - [`ortho`] — a heuristic based on orthogonal graph drawing that produces
//!   a feasible, non-minimal 2DDWave layout in linear time.
//!
//! Both return a [`PrResult`] carrying the layout (or the error that stopped
//! the engine) together with a JSON-serializable [`RuntimeReport`].

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod exact;
pub mod ortho;
pub mod report;

pub use config::ExactConfig;
pub use error::PnrError;
pub use report::RuntimeReport;

use tessera_layout::GateLayout;

/// The outcome of one engine invocation.
///
/// The runtime report is produced for every invocation, successful or not;
/// callers are free to ignore it.
#[derive(Debug)]
pub struct PrResult {
    /// The placed and routed layout, or the error that ended the run.
    pub layout: Result<GateLayout, PnrError>,
    /// Statistics about the invocation.
    pub report: RuntimeReport,
}

impl PrResult {
    /// Returns `true` iff the engine produced a layout.
    pub fn is_success(&self) -> bool {
        self.layout.is_ok()
    }
}

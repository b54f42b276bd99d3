//! Configuration of the exact placement engine.

use crate::error::PnrError;
use serde::{Deserialize, Serialize};
use tessera_grid::ClockingScheme;

/// Default wall-clock budget in milliseconds (effectively unbounded).
pub const DEFAULT_TIMEOUT_MS: u64 = u32::MAX as u64;

/// Options of the exact placement and routing engine.
///
/// All feature toggles are independent unless validated otherwise:
/// artificial latches only make sense with fan-in balancing, so combining
/// `artificial_latches` with `desynchronize` is rejected up front.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExactConfig {
    /// Maximum number of layout tiles to probe.
    pub upper_bound: usize,
    /// Interpret `upper_bound` as the one fixed size to probe instead of a
    /// search limit.
    pub fixed_size: bool,
    /// Allow wire crossings in a second layer.
    pub crossings: bool,
    /// Maximum number of crossing tiles, if bounded.
    pub crossings_limit: Option<usize>,
    /// Maximum number of wire tiles per edge, if bounded.
    pub wire_limit: Option<usize>,
    /// Route designated PI/PO port vertices instead of treating gates as
    /// implicit I/O pins.
    pub io_ports: bool,
    /// Force primary I/Os onto border tiles.
    pub border_io: bool,
    /// Allow a discrepancy in fan-in path lengths (disables balancing).
    pub desynchronize: bool,
    /// Balance fan-in paths with artificial clock latches, minimizing their
    /// number.
    pub artificial_latches: bool,
    /// Force inverters to have opposite input and output directions.
    pub straight_inverters: bool,
    /// Minimize the number of wire tiles.
    pub minimize_wires: bool,
    /// Minimize the number of crossing tiles.
    pub minimize_crossings: bool,
    /// Clocking scheme to place under.
    pub clocking: ClockingScheme,
    /// Wall-clock budget in milliseconds for the whole search.
    pub timeout_ms: u64,
    /// Number of factor pairs of one size explored in parallel.
    pub num_threads: usize,
}

impl ExactConfig {
    /// Creates a default configuration for the given clocking scheme.
    pub fn new(clocking: ClockingScheme) -> Self {
        ExactConfig {
            upper_bound: usize::MAX,
            fixed_size: false,
            crossings: false,
            crossings_limit: None,
            wire_limit: None,
            io_ports: false,
            border_io: false,
            desynchronize: false,
            artificial_latches: false,
            straight_inverters: false,
            minimize_wires: false,
            minimize_crossings: false,
            clocking,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            num_threads: 1,
        }
    }

    /// Checks inter-option dependencies.
    pub fn validate(&self) -> Result<(), PnrError> {
        if self.artificial_latches && self.desynchronize {
            return Err(PnrError::InvalidConfig(
                "artificial latches require fan-in balancing, which desynchronize disables".into(),
            ));
        }
        if self.crossings_limit.is_some() && !self.crossings {
            return Err(PnrError::InvalidConfig(
                "a crossings limit requires crossings to be enabled".into(),
            ));
        }
        if self.num_threads == 0 {
            return Err(PnrError::InvalidConfig(
                "at least one worker thread is required".into(),
            ));
        }
        if self.clocking.name.eq_ignore_ascii_case("USE") && self.clocking.phases == 3 {
            return Err(PnrError::UnsupportedClocking("USE with 3 phases".into()));
        }
        Ok(())
    }
}

impl Default for ExactConfig {
    fn default() -> Self {
        ExactConfig::new(ClockingScheme::twoddwave_4())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(ExactConfig::default().validate().is_ok());
    }

    #[test]
    fn latches_conflict_with_desynchronize() {
        let mut c = ExactConfig::default();
        c.artificial_latches = true;
        assert!(c.validate().is_ok());
        c.desynchronize = true;
        assert!(matches!(c.validate(), Err(PnrError::InvalidConfig(_))));
    }

    #[test]
    fn crossings_limit_requires_crossings() {
        let mut c = ExactConfig::default();
        c.crossings_limit = Some(2);
        assert!(matches!(c.validate(), Err(PnrError::InvalidConfig(_))));
        c.crossings = true;
        assert!(c.validate().is_ok());
    }

    #[test]
    fn zero_threads_rejected() {
        let mut c = ExactConfig::default();
        c.num_threads = 0;
        assert!(matches!(c.validate(), Err(PnrError::InvalidConfig(_))));
    }

    #[test]
    fn three_phase_use_rejected() {
        let mut scheme = ClockingScheme::use_4();
        scheme.phases = 3;
        let c = ExactConfig::new(scheme);
        assert!(matches!(
            c.validate(),
            Err(PnrError::UnsupportedClocking(_))
        ));
    }

    #[test]
    fn serde_roundtrip() {
        let c = ExactConfig::default();
        let json = serde_json::to_string(&c).unwrap();
        let restored: ExactConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.upper_bound, c.upper_bound);
        assert_eq!(restored.clocking, c.clocking);
    }
}

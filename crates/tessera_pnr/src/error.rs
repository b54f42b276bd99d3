//! Errors of the placement and routing engines.

use tessera_network::NetworkError;

/// Errors raised by the exact and orthogonal engines.
///
/// `Timeout`, `NotPlaceable`, and `SolverResourceLimit` are terminal but
/// recoverable: the caller may retry with different options. Configuration
/// and network-shape errors indicate misuse and are fatal for the run.
#[derive(Debug, thiserror::Error)]
pub enum PnrError {
    /// The engine was invoked with a network lacking primary inputs or
    /// outputs.
    #[error("logic network has no primary inputs or outputs")]
    EmptyNetwork,

    /// The orthogonal engine was given a network that is not an AOIG.
    #[error("logic network has to be an AOIG")]
    UnsupportedLogic,

    /// The clocking scheme is unknown or unsupported in this combination.
    #[error("unsupported clocking scheme: {0}")]
    UnsupportedClocking(String),

    /// The size search exhausted the tile budget without a satisfiable
    /// instance.
    #[error("not placeable within a budget of {tiles} tiles")]
    NotPlaceable {
        /// The exhausted tile budget.
        tiles: usize,
    },

    /// The wall-clock budget ran out.
    #[error("timed out while probing a layout of {last_size} tiles")]
    Timeout {
        /// The last probed layout size.
        last_size: usize,
    },

    /// The SMT solver reported neither SAT nor UNSAT.
    #[error("solver resource limit exceeded: {0}")]
    SolverResourceLimit(String),

    /// Engine options contradict each other.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The input network violates an operation arity.
    #[error(transparent)]
    Network(#[from] NetworkError),
}

//! Error types for the discrete-logarithm algorithm.

use qdlog_arith::ArithError;
use qdlog_hal::HalError;
use qdlog_ir::IrError;
use thiserror::Error;

use crate::stage::Stage;

/// Errors raised while configuring, assembling or running the algorithm.
///
/// A run that simply fails to find the logarithm is not an error; it is
/// reported through [`DiscreteLogResult`](crate::DiscreteLogResult).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AlgoError {
    /// A configuration value is out of range.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A base is not a unit modulo the modulus.
    #[error("{value} is not coprime to {modulus}")]
    NotCoprime {
        /// The offending base.
        value: u64,
        /// The modulus.
        modulus: u64,
    },

    /// A builder produced a circuit that does not fit its slot.
    #[error("Builder contract violated: {0}")]
    BuilderContract(String),

    /// The stage machine was driven out of order.
    #[error("Invalid stage transition from {from} to {to}")]
    InvalidTransition {
        /// State before the attempted transition.
        from: Stage,
        /// Requested state.
        to: Stage,
    },

    /// A conditioned gate reads a classical bit before it is measured.
    #[error("Instruction {instruction} reads clbit {clbit} before it is written")]
    FeedbackOrder {
        /// Position of the conditioned instruction.
        instruction: usize,
        /// The unwritten classical bit.
        clbit: u32,
    },

    /// A measured bitstring does not match the circuit's classical registers.
    #[error("Malformed outcome: {0}")]
    MalformedOutcome(String),

    /// Configuration could not be parsed.
    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),

    /// Circuit assembly failed.
    #[error("IR error: {0}")]
    Ir(#[from] IrError),

    /// Arithmetic construction failed.
    #[error("Arithmetic error: {0}")]
    Arith(#[from] ArithError),

    /// Execution failed.
    #[error("Backend error: {0}")]
    Hal(#[from] HalError),
}

/// Result type for algorithm operations.
pub type AlgoResult<T> = Result<T, AlgoError>;

//! Error types for arithmetic circuit construction.

use qdlog_ir::IrError;
use thiserror::Error;

/// Errors raised while validating parameters or assembling arithmetic circuits.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ArithError {
    /// The modulus cannot be used by the requested construction.
    #[error("Invalid modulus {modulus}: {reason}")]
    InvalidModulus {
        /// The rejected modulus.
        modulus: u64,
        /// Why it was rejected.
        reason: String,
    },

    /// A multiplication constant is not reduced modulo the modulus.
    #[error("Constant {value} is not reduced modulo {modulus}")]
    ConstantOutOfRange {
        /// The constant.
        value: u64,
        /// The modulus.
        modulus: u64,
    },

    /// A register is too narrow for the construction.
    #[error("Register '{register}' needs at least {required} qubits, got {got}")]
    WidthTooSmall {
        /// Register role.
        register: &'static str,
        /// Minimum width.
        required: u32,
        /// Requested width.
        got: u32,
    },

    /// The constant has no multiplicative inverse modulo the modulus.
    #[error("{value} is not invertible modulo {modulus}")]
    NotInvertible {
        /// The constant.
        value: u64,
        /// The modulus.
        modulus: u64,
    },

    /// Circuit assembly failed.
    #[error(transparent)]
    Ir(#[from] IrError),
}

/// Result type for arithmetic operations.
pub type ArithResult<T> = Result<T, ArithError>;

/// Fail with [`ArithError::WidthTooSmall`] unless `got >= required`.
pub(crate) fn require_width(register: &'static str, required: u32, got: u32) -> ArithResult<()> {
    if got < required {
        return Err(ArithError::WidthTooSmall {
            register,
            required,
            got,
        });
    }
    Ok(())
}

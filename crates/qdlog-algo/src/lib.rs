//! qdlog Discrete-Logarithm Algorithm
//!
//! Mosca-Ekert phase estimation for `g^m ≡ b (mod p)`: circuit assembly in
//! four variants, execution on any [`qdlog_hal::Backend`] and classical
//! recovery of `m` from the two phase estimates.
//!
//! # Core Components
//!
//! - **Configuration**: [`DiscreteLogConfig`], loadable from JSON
//! - **Orchestrators**: [`SeparateRegister`], [`SharedRegister`],
//!   [`SemiClassical`] and [`OneQubit`], all behind [`DiscreteLogAlgorithm`]
//! - **Stage machine**: [`StageTracker`] rejects out-of-order assembly
//! - **Feedback check**: [`verify_feedback_order`]
//! - **Aggregation**: [`combine`] turns outcomes into a [`DiscreteLogResult`]
//!
//! # Example
//!
//! ```rust
//! use qdlog_algo::{DiscreteLogAlgorithm, DiscreteLogConfig, SharedRegister};
//! use qdlog_arith::ArithmeticKind;
//!
//! let config = DiscreteLogConfig::new(4, 2, 17).with_arithmetic(ArithmeticKind::Hrs);
//! let algorithm = SharedRegister::new(config).unwrap();
//! let circuit = algorithm.construct_circuit().unwrap();
//!
//! assert_eq!(circuit.qreg("top").unwrap().len(), 5);
//! assert_eq!(circuit.creg("m2").unwrap().len(), 5);
//! ```

pub mod aggregator;
pub mod config;
pub mod error;
pub mod feedback;
pub mod orchestrator;
pub mod stage;

pub use aggregator::{DiscreteLogResult, Outcome, combine, decode_candidate, decode_counts};
pub use config::{DEFAULT_SHOTS, DiscreteLogConfig};
pub use error::{AlgoError, AlgoResult};
pub use feedback::verify_feedback_order;
pub use orchestrator::{
    DiscreteLogAlgorithm, OneQubit, SemiClassical, SeparateRegister, SharedRegister, Variant,
};
pub use stage::{Schedule, Stage, StageTracker};

//! qdlog Local Sparse Statevector Simulator
//!
//! This crate provides the reference execution backend for qdlog circuits.
//! It stores only non-zero amplitudes, which keeps modular arithmetic on
//! computational-basis registers cheap, and it follows mid-circuit
//! measurement, reset and classically conditioned gates exactly.
//!
//! # Features
//!
//! - **Exact distributions**: [`OutcomeDistribution`] branches at every
//!   measurement and reports the probability of each classical outcome
//! - **Seeded sampling**: shots are drawn from the exact distribution with a
//!   reproducible RNG when a seed is configured
//! - **Basis-state testing**: [`Statevector`] prepares basis states and
//!   applies unitary circuits so arithmetic can be checked directly
//!
//! # Example
//!
//! ```ignore
//! use qdlog_adapter_sim::SimulatorBackend;
//! use qdlog_hal::Backend;
//!
//! let backend = SimulatorBackend::with_seed(7);
//! let job_id = backend.submit(&circuit, 100).await?;
//! let result = backend.wait(&job_id).await?;
//! println!("Results: {:?}", result.counts);
//! ```

mod distribution;
mod simulator;
mod statevector;

pub use distribution::{MAX_CLBITS, OutcomeDistribution};
pub use simulator::{DEFAULT_MAX_QUBITS, SimulatorBackend};
pub use statevector::{MAX_QUBITS, Statevector};

//! qdlog Hardware Abstraction Layer
//!
//! This crate defines the interface between circuit construction and the
//! execution backend that turns a circuit into measurement statistics.
//!
//! - A common [`Backend`] trait for job submission and management
//! - [`Capabilities`] to describe supported gates and features
//! - Unified result handling via [`ExecutionResult`] and [`Counts`]
//!
//! # Example: Running a Circuit
//!
//! ```ignore
//! use qdlog_hal::Backend;
//! use qdlog_adapter_sim::SimulatorBackend;
//!
//! let backend = SimulatorBackend::new();
//! let job_id = backend.submit(&circuit, 100).await?;
//! let result = backend.wait(&job_id).await?;
//!
//! if let Some((bitstring, count)) = result.counts.most_frequent() {
//!     println!("Most frequent: {bitstring} ({count} times)");
//! }
//! ```

pub mod backend;
pub mod capability;
pub mod error;
pub mod job;
pub mod result;

pub use backend::{Backend, BackendConfig, BackendFactory, ValidationResult};
pub use capability::Capabilities;
pub use error::{HalError, HalResult};
pub use job::{Job, JobId, JobStatus};
pub use result::{Counts, ExecutionResult};

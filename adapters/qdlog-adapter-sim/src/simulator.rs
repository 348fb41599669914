//! Simulator backend implementation.

use async_trait::async_trait;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rustc_hash::FxHashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{debug, instrument};
use uuid::Uuid;

use qdlog_hal::{
    Backend, BackendConfig, BackendFactory, Capabilities, ExecutionResult, HalError, HalResult,
    Job, JobId, JobStatus, ValidationResult,
};
use qdlog_ir::Circuit;

use crate::distribution::{MAX_CLBITS, OutcomeDistribution};
use crate::statevector::MAX_QUBITS;

/// Default qubit limit of a simulator built with [`SimulatorBackend::new`].
pub const DEFAULT_MAX_QUBITS: u32 = 48;

/// Job data for the simulator.
struct SimJob {
    job: Job,
    result: Option<ExecutionResult>,
}

/// Local simulator backend.
///
/// Each submitted circuit is simulated once to obtain the exact
/// distribution of its classical bits, and the requested shots are drawn
/// from that distribution. With a seed set, results are reproducible.
pub struct SimulatorBackend {
    /// Backend configuration.
    config: BackendConfig,
    /// Cached capabilities.
    capabilities: Capabilities,
    /// Jobs whose outcome has not been collected yet.
    jobs: Arc<Mutex<FxHashMap<String, SimJob>>>,
    /// Maximum number of qubits supported.
    max_qubits: u32,
    /// Sampling RNG.
    rng: Mutex<StdRng>,
}

impl SimulatorBackend {
    /// Create a new simulator backend with default settings.
    pub fn new() -> Self {
        Self::build(BackendConfig::new("simulator"), DEFAULT_MAX_QUBITS, None)
    }

    /// Create a simulator with custom max qubits.
    pub fn with_max_qubits(max_qubits: u32) -> Self {
        Self::build(BackendConfig::new("simulator"), max_qubits, None)
    }

    /// Create a simulator whose sampling is reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Self::build(BackendConfig::new("simulator"), DEFAULT_MAX_QUBITS, Some(seed))
    }

    fn build(config: BackendConfig, max_qubits: u32, seed: Option<u64>) -> Self {
        let rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        let mut capabilities = Capabilities::simulator(max_qubits);
        capabilities.name.clone_from(&config.name);
        Self {
            config,
            capabilities,
            jobs: Arc::new(Mutex::new(FxHashMap::default())),
            max_qubits,
            rng: Mutex::new(rng),
        }
    }

    /// Exact probability of every classical outcome of `circuit`.
    pub fn exact_distribution(&self, circuit: &Circuit) -> HalResult<OutcomeDistribution> {
        self.check_size(circuit)?;
        OutcomeDistribution::of_circuit(circuit)
    }

    /// Number of jobs whose outcome has not been collected.
    pub fn job_count(&self) -> usize {
        self.jobs
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    fn check_size(&self, circuit: &Circuit) -> HalResult<()> {
        if circuit.num_qubits() > self.max_qubits as usize {
            return Err(HalError::CircuitTooLarge(format!(
                "Circuit has {} qubits but simulator only supports {}",
                circuit.num_qubits(),
                self.max_qubits
            )));
        }
        Ok(())
    }

    /// Run simulation synchronously.
    #[instrument(skip(self, circuit), fields(circuit = circuit.name()))]
    fn run_simulation(&self, circuit: &Circuit, shots: u32) -> HalResult<ExecutionResult> {
        let start = Instant::now();

        debug!(
            num_qubits = circuit.num_qubits(),
            num_instructions = circuit.len(),
            shots,
            "Starting simulation"
        );

        let distribution = OutcomeDistribution::of_circuit(circuit)?;
        let counts = {
            let mut rng = self
                .rng
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            distribution.sample(shots, &mut *rng)
        };

        let elapsed = start.elapsed();
        debug!(
            outcomes = counts.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Simulation completed"
        );

        Ok(ExecutionResult::new(counts, shots)
            .with_execution_time(elapsed.as_millis() as u64)
            .with_metadata("distinct_outcomes", serde_json::json!(distribution.entries().len())))
    }
}

impl Default for SimulatorBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend for SimulatorBackend {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn validate(&self, circuit: &Circuit) -> HalResult<ValidationResult> {
        let mut reasons = vec![];
        if circuit.num_qubits() > self.max_qubits as usize {
            reasons.push(format!(
                "{} qubits exceed the limit of {}",
                circuit.num_qubits(),
                self.max_qubits
            ));
        }
        if circuit.num_clbits() > MAX_CLBITS {
            reasons.push(format!(
                "{} classical bits exceed the limit of {MAX_CLBITS}",
                circuit.num_clbits()
            ));
        }
        for inst in circuit.instructions() {
            if inst.is_gate() && !self.capabilities.supports_gate(inst.name()) {
                reasons.push(format!("unsupported gate '{}'", inst.name()));
                break;
            }
        }
        if reasons.is_empty() {
            Ok(ValidationResult::Valid)
        } else {
            Ok(ValidationResult::Invalid { reasons })
        }
    }

    #[instrument(skip(self, circuit))]
    async fn submit(&self, circuit: &Circuit, shots: u32) -> HalResult<JobId> {
        if shots == 0 {
            return Err(HalError::InvalidShots("shots must be positive".into()));
        }
        if shots > self.capabilities.max_shots {
            return Err(HalError::InvalidShots(format!(
                "{shots} exceeds the maximum of {}",
                self.capabilities.max_shots
            )));
        }
        self.check_size(circuit)?;

        let job_id = JobId::new(Uuid::new_v4().to_string());
        let job = Job::new(job_id.clone(), shots)
            .with_backend(self.config.name.clone())
            .with_circuit_name(circuit.name());

        {
            let mut jobs = self
                .jobs
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            jobs.insert(job_id.0.clone(), SimJob { job, result: None });
        }

        debug!("Submitted job: {}", job_id);

        let outcome = self.run_simulation(circuit, shots);

        let mut jobs = self
            .jobs
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(sim_job) = jobs.get_mut(&job_id.0) {
            match outcome {
                Ok(result) => {
                    sim_job.result = Some(result);
                    sim_job.job.set_status(JobStatus::Completed);
                }
                Err(e) => sim_job.job.set_status(JobStatus::Failed(e.to_string())),
            }
        }

        Ok(job_id)
    }

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        let jobs = self
            .jobs
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        jobs.get(&job_id.0)
            .map(|j| j.job.status.clone())
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))
    }

    /// Hand out the outcome of a finished job and forget the job.
    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        let mut jobs = self
            .jobs
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let status = jobs
            .get(&job_id.0)
            .map(|j| j.job.status.clone())
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))?;
        if !status.is_terminal() {
            return Err(HalError::Backend(format!(
                "job {job_id} has no result in status {status}"
            )));
        }

        let result = jobs.remove(&job_id.0).and_then(|j| j.result);
        match (status, result) {
            (JobStatus::Completed, Some(result)) => Ok(result),
            (JobStatus::Failed(msg), _) => Err(HalError::JobFailed(msg)),
            (JobStatus::Cancelled, _) => Err(HalError::JobCancelled),
            (status, _) => Err(HalError::Backend(format!(
                "job {job_id} finished as {status} without a result"
            ))),
        }
    }

    async fn cancel(&self, job_id: &JobId) -> HalResult<()> {
        let mut jobs = self
            .jobs
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(sim_job) = jobs.get_mut(&job_id.0) {
            sim_job.job.set_status(JobStatus::Cancelled);
            Ok(())
        } else {
            Err(HalError::JobNotFound(job_id.0.clone()))
        }
    }
}

impl BackendFactory for SimulatorBackend {
    /// Reads `max_qubits` and `seed` from the extra configuration.
    fn from_config(config: BackendConfig) -> HalResult<Self> {
        let max_qubits = config
            .extra_u64("max_qubits")
            .unwrap_or(u64::from(DEFAULT_MAX_QUBITS));
        if max_qubits == 0 || max_qubits > MAX_QUBITS as u64 {
            return Err(HalError::Configuration(format!(
                "max_qubits must lie in 1..={MAX_QUBITS}, got {max_qubits}"
            )));
        }
        if config.extra.contains_key("seed") && config.extra_u64("seed").is_none() {
            return Err(HalError::Configuration(
                "seed must be an unsigned integer".into(),
            ));
        }
        let seed = config.extra_u64("seed");
        Ok(Self::build(config, max_qubits as u32, seed))
    }
}

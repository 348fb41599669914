//! Parameters of a discrete-logarithm run.
//!
//! A configuration can be built in code with the `with_*` methods or loaded
//! from JSON; missing optional fields take their defaults.
//!
//! ```json
//! { "b": 4, "g": 2, "p": 17, "full_run": true, "arithmetic": "hrs" }
//! ```

use serde::{Deserialize, Serialize};

use qdlog_arith::ArithmeticKind;
use qdlog_arith::numtheory::{check_modulus, gcd, modulus_width, mod_pow};

use crate::error::{AlgoError, AlgoResult};

/// Shots executed when none are configured.
pub const DEFAULT_SHOTS: u32 = 100;

/// Find `m` with `g^m ≡ b (mod p)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscreteLogConfig {
    /// The element whose logarithm is sought.
    pub b: u64,
    /// The generator.
    pub g: u64,
    /// The modulus.
    pub p: u64,
    /// Multiplicative order of `g`, if known. Otherwise it is estimated
    /// from the first-stage measurements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r: Option<u64>,
    /// Width of the phase register, `ceil(log2 p)` by default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<u32>,
    /// Examine every shot and report the success probability instead of
    /// returning the first decodable candidate.
    #[serde(default)]
    pub full_run: bool,
    /// Number of shots.
    #[serde(default = "default_shots")]
    pub shots: u32,
    /// Construction used for modular exponentiation.
    #[serde(default)]
    pub arithmetic: ArithmeticKind,
}

fn default_shots() -> u32 {
    DEFAULT_SHOTS
}

impl DiscreteLogConfig {
    /// Configuration with default options.
    pub fn new(b: u64, g: u64, p: u64) -> Self {
        Self {
            b,
            g,
            p,
            r: None,
            n: None,
            full_run: false,
            shots: DEFAULT_SHOTS,
            arithmetic: ArithmeticKind::default(),
        }
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> AlgoResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the known order of `g`.
    #[must_use]
    pub fn with_order(mut self, r: u64) -> Self {
        self.r = Some(r);
        self
    }

    /// Set the phase register width.
    #[must_use]
    pub fn with_top_width(mut self, n: u32) -> Self {
        self.n = Some(n);
        self
    }

    /// Enable or disable full-run mode.
    #[must_use]
    pub fn with_full_run(mut self, full_run: bool) -> Self {
        self.full_run = full_run;
        self
    }

    /// Set the number of shots.
    #[must_use]
    pub fn with_shots(mut self, shots: u32) -> Self {
        self.shots = shots;
        self
    }

    /// Select the arithmetic construction.
    #[must_use]
    pub fn with_arithmetic(mut self, arithmetic: ArithmeticKind) -> Self {
        self.arithmetic = arithmetic;
        self
    }

    /// Width of the phase register.
    pub fn top_width(&self) -> u32 {
        self.n.unwrap_or_else(|| modulus_width(self.p))
    }

    /// Check every parameter before any circuit is built.
    pub fn validate(&self) -> AlgoResult<()> {
        check_modulus(self.p)?;
        for (name, value) in [("g", self.g), ("b", self.b)] {
            if value >= self.p {
                return Err(AlgoError::InvalidParameter(format!(
                    "{name} = {value} is not reduced modulo {}",
                    self.p
                )));
            }
            if gcd(value, self.p) != 1 {
                return Err(AlgoError::NotCoprime {
                    value,
                    modulus: self.p,
                });
            }
        }
        if self.shots == 0 {
            return Err(AlgoError::InvalidParameter("shots must be positive".into()));
        }
        if self.n == Some(0) {
            return Err(AlgoError::InvalidParameter(
                "the phase register needs at least one qubit".into(),
            ));
        }
        if self.top_width() > 63 {
            return Err(AlgoError::InvalidParameter(format!(
                "phase register of {} qubits cannot be decoded",
                self.top_width()
            )));
        }
        if let Some(r) = self.r {
            if r == 0 || mod_pow(self.g, r, self.p) != 1 {
                return Err(AlgoError::InvalidParameter(format!(
                    "{r} is not a period of {} modulo {}",
                    self.g, self.p
                )));
            }
        }
        Ok(())
    }
}

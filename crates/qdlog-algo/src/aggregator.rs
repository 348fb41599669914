//! Classical post-processing of the two phase estimates.
//!
//! Stage 1 estimates `k/r` with `y1 / 2^n`, stage 2 estimates `k·m/r` (mod 1)
//! with `y2 / 2^n`. With `k` invertible modulo `r` the logarithm follows as
//! `m = (y2·r/2^n)·k⁻¹ mod r`. When `r` is unknown it is recovered from the
//! stage-1 estimates by continued fractions.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use qdlog_arith::numtheory::{gcd, mod_inverse, mod_pow};
use qdlog_hal::Counts;
use qdlog_ir::{Circuit, ClbitId};

use crate::config::DiscreteLogConfig;
use crate::error::{AlgoError, AlgoResult};

/// Name of the classical register holding the stage-1 estimate.
pub const STAGE1_REGISTER: &str = "m1";
/// Name of the classical register holding the stage-2 estimate.
pub const STAGE2_REGISTER: &str = "m2";

/// One distinct measurement outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// Stage-1 estimate.
    pub y1: u64,
    /// Stage-2 estimate.
    pub y2: u64,
    /// Number of shots that produced it.
    pub frequency: u64,
}

/// Outcome of a discrete-logarithm run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscreteLogResult {
    /// The logarithm, if one was found.
    pub m: Option<u64>,
    /// Fraction of shots yielding a verified logarithm. Only set in
    /// full-run mode.
    pub success_probability: Option<f64>,
    /// Order of `g`, given or recovered.
    pub order: Option<u64>,
    /// Shots examined.
    pub shots: u64,
    /// Shots whose candidate satisfies `g^m ≡ b`.
    pub num_success: u64,
    /// Shots that did not yield a valid candidate.
    pub num_fail: u64,
    /// Decoded outcomes, most frequent first.
    pub outcomes: Vec<Outcome>,
}

/// Split every counts entry into its two phase estimates.
///
/// The result is ordered by descending frequency, ties broken by bitstring.
pub fn decode_counts(circuit: &Circuit, counts: &Counts) -> AlgoResult<Vec<Outcome>> {
    let m1 = circuit.creg(STAGE1_REGISTER)?;
    let m2 = circuit.creg(STAGE2_REGISTER)?;
    counts
        .sorted()
        .into_iter()
        .map(|(bitstring, frequency)| {
            let read = |clbits: &[ClbitId]| {
                Counts::read_bits(bitstring, clbits).ok_or_else(|| {
                    AlgoError::MalformedOutcome(format!(
                        "'{bitstring}' does not cover {} classical bits",
                        circuit.num_clbits()
                    ))
                })
            };
            Ok(Outcome {
                y1: read(m1.as_slice())?,
                y2: read(m2.as_slice())?,
                frequency,
            })
        })
        .collect()
}

/// Best rational approximation of `numerator / denominator` whose
/// denominator does not exceed `max_denominator`, in lowest terms.
///
/// Of the two closest candidates the last convergent wins a tie.
pub fn limit_denominator(numerator: u64, denominator: u64, max_denominator: u64) -> (u64, u64) {
    if denominator == 0 || max_denominator == 0 {
        return (0, 1);
    }
    let g = gcd(numerator, denominator);
    let (num, den) = (numerator / g, denominator / g);
    if den <= max_denominator {
        return (num, den);
    }

    let (mut p0, mut q0, mut p1, mut q1) = (0u128, 1u128, 1u128, 0u128);
    let (mut n, mut d) = (u128::from(num), u128::from(den));
    let max = u128::from(max_denominator);
    while d != 0 {
        let a = n / d;
        let q2 = q0 + a * q1;
        if q2 > max {
            break;
        }
        (p0, q0, p1, q1) = (p1, q1, p0 + a * p1, q2);
        (n, d) = (d, n - a * d);
    }
    let k = (max - q0) / q1;
    let bound1 = (p0 + k * p1, q0 + k * q1);
    let bound2 = (p1, q1);

    // |p/q - num/den| compared without division
    let target = (u128::from(num), u128::from(den));
    let distance = |(p, q): (u128, u128)| (p * target.1).abs_diff(target.0 * q);
    let closer = if distance(bound2) * bound1.1 <= distance(bound1) * bound2.1 {
        bound2
    } else {
        bound1
    };
    #[allow(clippy::cast_possible_truncation)]
    (closer.0 as u64, closer.1 as u64)
}

/// Smallest continued-fraction denominator `d` of any `y1 / 2^n` with
/// `g^d ≡ 1 (mod p)`.
pub fn find_order(outcomes: &[Outcome], n: u32, g: u64, p: u64) -> Option<u64> {
    let order = outcomes
        .iter()
        .map(|o| limit_denominator(o.y1, 1u64 << n, p - 1).1)
        .filter(|&d| mod_pow(g, d, p) == 1)
        .min();
    debug!(?order, "recovered order from stage-1 estimates");
    order
}

/// `round(value / 2^n)` with ties to even.
#[allow(clippy::cast_possible_truncation)]
fn round_shifted(value: u128, n: u32) -> u64 {
    let quotient = value >> n;
    if n == 0 {
        return quotient as u64;
    }
    let remainder = value & ((1u128 << n) - 1);
    let half = 1u128 << (n - 1);
    let round_up = remainder > half || (remainder == half && quotient & 1 == 1);
    (quotient + u128::from(round_up)) as u64
}

/// The logarithm candidate of a single outcome, or `None` when `k` is not
/// invertible modulo `r`.
///
/// `k = round(y1·r / 2^n)` and `m = round(v·k⁻¹ mod r) mod r` with
/// `v = y2·r / 2^n`, both rounded half to even.
pub fn decode_candidate(y1: u64, y2: u64, r: u64, n: u32) -> Option<u64> {
    if r == 0 {
        return None;
    }
    let k = round_shifted(u128::from(y1) * u128::from(r), n);
    if gcd(k, r) != 1 {
        return None;
    }
    let k_inv = mod_inverse(k, r)?;
    // y2·r·k⁻¹ / 2^n mod r only depends on y2·k⁻¹ mod 2^n
    let s = (u128::from(y2) * u128::from(k_inv)) & ((1u128 << n) - 1);
    Some(round_shifted(u128::from(r) * s, n) % r)
}

/// Reduce decoded outcomes to a [`DiscreteLogResult`].
///
/// Outcomes are examined in order. In single-run mode the first decodable
/// candidate is returned as is and the scan stops; its shots count as
/// successes only if it happens to satisfy `g^m ≡ b`. In full-run mode
/// every outcome is verified and the success probability is reported.
pub fn combine(outcomes: Vec<Outcome>, config: &DiscreteLogConfig) -> DiscreteLogResult {
    let n = config.top_width();
    let shots: u64 = outcomes.iter().map(|o| o.frequency).sum();
    let order = config.r.or_else(|| find_order(&outcomes, n, config.g, config.p));

    let mut m = None;
    let mut num_success = 0;
    let mut num_fail = 0;

    match order {
        None => num_fail = shots,
        Some(r) => {
            for outcome in &outcomes {
                let candidate = decode_candidate(outcome.y1, outcome.y2, r, n);
                let verified = candidate.is_some_and(|c| mod_pow(config.g, c, config.p) == config.b);
                if verified {
                    num_success += outcome.frequency;
                } else {
                    num_fail += outcome.frequency;
                }
                if config.full_run {
                    if verified && m.is_none() {
                        m = candidate;
                    }
                } else if candidate.is_some() {
                    m = candidate;
                    break;
                }
            }
        }
    }

    #[allow(clippy::cast_precision_loss)]
    let success_probability = config.full_run.then(|| {
        if shots == 0 {
            0.0
        } else {
            num_success as f64 / shots as f64
        }
    });

    info!(
        ?m,
        ?order,
        num_success,
        num_fail,
        ?success_probability,
        "discrete logarithm combined"
    );
    DiscreteLogResult {
        m,
        success_probability,
        order,
        shots,
        num_success,
        num_fail,
        outcomes,
    }
}

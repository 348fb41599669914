//! Builder traits for modular exponentiation and multiplication circuits.
//!
//! Every exponentiation circuit has the register layout
//! `[exponent: n][target: m][ancilla: k]` and every multiplication circuit
//! `[control: 1][target: m][ancilla: k]`. Ancillas start and end in |0⟩.

use serde::{Deserialize, Serialize};
use std::fmt;

use qdlog_ir::Circuit;

use crate::error::{ArithError, ArithResult, require_width};
use crate::numtheory::{check_invertible, check_modulus};
use crate::{brg, hrs, montgomery};

/// Builds `|x⟩|y⟩|0⟩ -> |x⟩|y·a^x mod p⟩|0⟩` over an `n`-qubit exponent.
///
/// Bit `i` of the exponent controls a multiplication by `a^(2^i) mod p`.
pub trait ModExpBuilder: Send + Sync {
    /// Assemble the exponentiation circuit.
    fn build(&self, n: u32, a: u64, p: u64) -> ArithResult<Circuit>;
}

/// Builds a single controlled multiplication `|c⟩|x⟩|0⟩ -> |c⟩|a^c·x mod p⟩|0⟩`.
///
/// `n` is the exponent width of the surrounding algorithm. The bundled
/// builders size the target by `p` alone and ignore it.
pub trait ModMulBuilder: Send + Sync {
    /// Assemble the multiplication circuit.
    fn build_multiplier(&self, n: u32, a: u64, p: u64) -> ArithResult<Circuit>;
}

/// Register widths a builder allocates below the exponent.
pub trait AncillaLayout {
    /// Width of the target register, `ceil(log2 p)`.
    fn target_width(&self, p: u64) -> ArithResult<u32> {
        check_modulus(p)
    }

    /// Width of the clean ancilla register.
    fn ancilla_width(&self, p: u64) -> ArithResult<u32>;

    /// Target plus ancilla.
    fn bottom_width(&self, p: u64) -> ArithResult<u32> {
        Ok(self.target_width(p)? + self.ancilla_width(p)?)
    }
}

impl<F> ModExpBuilder for F
where
    F: Fn(u32, u64, u64) -> ArithResult<Circuit> + Send + Sync,
{
    fn build(&self, n: u32, a: u64, p: u64) -> ArithResult<Circuit> {
        self(n, a, p)
    }
}

impl<F> ModMulBuilder for F
where
    F: Fn(u32, u64, u64) -> ArithResult<Circuit> + Send + Sync,
{
    fn build_multiplier(&self, n: u32, a: u64, p: u64) -> ArithResult<Circuit> {
        self(n, a, p)
    }
}

/// Validated `(n, a, p)` triple of an exponentiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExponentiationSpec {
    /// Exponent width.
    pub n: u32,
    /// Base.
    pub a: u64,
    /// Modulus.
    pub p: u64,
}

impl ExponentiationSpec {
    /// Check `n >= 1`, `p >= 2`, `a < p` and that `p` fits a supported width.
    pub fn new(n: u32, a: u64, p: u64) -> ArithResult<Self> {
        require_width("exponent", 1, n)?;
        check_modulus(p)?;
        if a >= p {
            return Err(ArithError::ConstantOutOfRange { value: a, modulus: p });
        }
        Ok(Self { n, a, p })
    }

    /// Width of the target register.
    pub fn target_width(&self) -> u32 {
        crate::numtheory::modulus_width(self.p)
    }

    /// Additionally require `gcd(a, p) = 1`, as every in-place builder does.
    pub fn require_invertible(self) -> ArithResult<Self> {
        check_invertible(self.a, self.p)?;
        Ok(self)
    }
}

/// Beauregard's Fourier-basis construction. Ancilla `m + 2`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Brg;

/// Häner-Roetteler-Svore Toffoli construction on borrowed qubits. Ancilla `m + 1`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hrs;

/// Rines-Chuang Montgomery multiplication in the Fourier basis. Ancilla `2m + 1`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Montgomery;

impl ModExpBuilder for Brg {
    fn build(&self, n: u32, a: u64, p: u64) -> ArithResult<Circuit> {
        let params = ExponentiationSpec::new(n, a, p)?.require_invertible()?;
        brg::mod_exp(params.n, params.a, params.p)
    }
}

impl ModMulBuilder for Brg {
    fn build_multiplier(&self, _n: u32, a: u64, p: u64) -> ArithResult<Circuit> {
        brg::controlled_multiplier(a, p)
    }
}

impl AncillaLayout for Brg {
    fn ancilla_width(&self, p: u64) -> ArithResult<u32> {
        Ok(check_modulus(p)? + 2)
    }
}

impl ModExpBuilder for Hrs {
    fn build(&self, n: u32, a: u64, p: u64) -> ArithResult<Circuit> {
        let params = ExponentiationSpec::new(n, a, p)?.require_invertible()?;
        hrs::mod_exp(params.n, params.a, params.p)
    }
}

impl ModMulBuilder for Hrs {
    fn build_multiplier(&self, _n: u32, a: u64, p: u64) -> ArithResult<Circuit> {
        hrs::controlled_multiplier(a, p)
    }
}

impl AncillaLayout for Hrs {
    fn ancilla_width(&self, p: u64) -> ArithResult<u32> {
        Ok(check_modulus(p)? + 1)
    }
}

impl ModExpBuilder for Montgomery {
    fn build(&self, n: u32, a: u64, p: u64) -> ArithResult<Circuit> {
        let params = ExponentiationSpec::new(n, a, p)?.require_invertible()?;
        montgomery::mod_exp(params.n, params.a, params.p)
    }
}

impl ModMulBuilder for Montgomery {
    fn build_multiplier(&self, _n: u32, a: u64, p: u64) -> ArithResult<Circuit> {
        montgomery::controlled_multiplier(a, p)
    }
}

impl AncillaLayout for Montgomery {
    fn ancilla_width(&self, p: u64) -> ArithResult<u32> {
        Ok(2 * check_modulus(p)? + 1)
    }
}

/// Selects one of the bundled constructions, e.g. from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArithmeticKind {
    /// [`Brg`].
    #[default]
    Brg,
    /// [`Hrs`].
    Hrs,
    /// [`Montgomery`].
    Montgomery,
}

impl ArithmeticKind {
    /// All bundled constructions.
    pub const ALL: [ArithmeticKind; 3] = [Self::Brg, Self::Hrs, Self::Montgomery];

    /// Short lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Brg => "brg",
            Self::Hrs => "hrs",
            Self::Montgomery => "montgomery",
        }
    }
}

impl fmt::Display for ArithmeticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl ModExpBuilder for ArithmeticKind {
    fn build(&self, n: u32, a: u64, p: u64) -> ArithResult<Circuit> {
        match self {
            Self::Brg => Brg.build(n, a, p),
            Self::Hrs => Hrs.build(n, a, p),
            Self::Montgomery => Montgomery.build(n, a, p),
        }
    }
}

impl ModMulBuilder for ArithmeticKind {
    fn build_multiplier(&self, n: u32, a: u64, p: u64) -> ArithResult<Circuit> {
        match self {
            Self::Brg => Brg.build_multiplier(n, a, p),
            Self::Hrs => Hrs.build_multiplier(n, a, p),
            Self::Montgomery => Montgomery.build_multiplier(n, a, p),
        }
    }
}

impl AncillaLayout for ArithmeticKind {
    fn ancilla_width(&self, p: u64) -> ArithResult<u32> {
        match self {
            Self::Brg => Brg.ancilla_width(p),
            Self::Hrs => Hrs.ancilla_width(p),
            Self::Montgomery => Montgomery.ancilla_width(p),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_validation() {
        assert!(ExponentiationSpec::new(3, 2, 5).is_ok());
        assert!(matches!(
            ExponentiationSpec::new(0, 2, 5),
            Err(ArithError::WidthTooSmall { .. })
        ));
        assert!(matches!(
            ExponentiationSpec::new(3, 5, 5),
            Err(ArithError::ConstantOutOfRange { .. })
        ));
        assert!(matches!(
            ExponentiationSpec::new(3, 0, 1),
            Err(ArithError::InvalidModulus { .. })
        ));
        assert!(matches!(
            ExponentiationSpec::new(3, 2, 4).unwrap().require_invertible(),
            Err(ArithError::NotInvertible { .. })
        ));
        assert_eq!(ExponentiationSpec::new(2, 3, 17).unwrap().target_width(), 5);
    }

    #[test]
    fn test_layout_matches_built_circuits() {
        for kind in ArithmeticKind::ALL {
            let p = 7;
            let exp = kind.build(2, 3, p).unwrap();
            assert_eq!(
                exp.num_qubits() as u32,
                2 + kind.bottom_width(p).unwrap(),
                "{kind}"
            );
            let mul = kind.build_multiplier(2, 3, p).unwrap();
            assert_eq!(mul.num_qubits() as u32, 1 + kind.bottom_width(p).unwrap());
            let target = exp.qreg("target").unwrap().len() as u32;
            assert_eq!(target, kind.target_width(p).unwrap());
        }
    }

    #[test]
    fn test_closures_are_builders() {
        let custom = |n: u32, a: u64, p: u64| Hrs.build(n, a, p);
        let exp: &dyn ModExpBuilder = &custom;
        assert_eq!(exp.build(1, 2, 5).unwrap().num_qubits(), 1 + 3 + 4);

        let mul: &dyn ModMulBuilder = &|_n: u32, a: u64, p: u64| brg::controlled_multiplier(a, p);
        assert_eq!(mul.build_multiplier(4, 2, 5).unwrap().num_qubits(), 1 + 3 + 5);
    }

    #[test]
    fn test_kind_serde() {
        let kind: ArithmeticKind = serde_json::from_str("\"montgomery\"").unwrap();
        assert_eq!(kind, ArithmeticKind::Montgomery);
        assert_eq!(serde_json::to_string(&ArithmeticKind::Hrs).unwrap(), "\"hrs\"");
        assert_eq!(ArithmeticKind::default(), ArithmeticKind::Brg);
    }
}

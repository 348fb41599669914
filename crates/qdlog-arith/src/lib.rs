//! qdlog Reversible Arithmetic
//!
//! Circuit builders for the arithmetic inside Shor-type algorithms: adders,
//! comparators and three interchangeable constructions of controlled modular
//! multiplication and exponentiation.
//!
//! # Core Components
//!
//! - **Adders**: [`ripple_carry_adder`], [`takahashi_adder`] and the
//!   Fourier-basis adders in [`draper`]
//! - **Borrowed-qubit primitives**: [`controlled_incrementer`],
//!   [`carry_gate`], [`controlled_constant_adder`], [`comparator`]
//! - **Modular exponentiation**: [`Brg`], [`Hrs`] and [`Montgomery`],
//!   selected at runtime through [`ArithmeticKind`]
//! - **Builder traits**: [`ModExpBuilder`], [`ModMulBuilder`] and
//!   [`AncillaLayout`]; any `Fn(u32, u64, u64) -> ArithResult<Circuit>` is a
//!   builder too
//!
//! # Constructions
//!
//! | Builder | Multiplier | Ancilla | Constraint |
//! |---------|-----------|---------|------------|
//! | [`Brg`] | Fourier modular adders | `m + 2` | |
//! | [`Hrs`] | Toffoli adders on borrowed qubits | `m + 1` | `m >= 3` |
//! | [`Montgomery`] | Fourier Montgomery reduction | `2m + 1` | odd `p` |
//!
//! `m = ceil(log2 p)` is the width of the target register.
//!
//! # Example
//!
//! ```rust
//! use qdlog_arith::{AncillaLayout, ArithmeticKind, ModExpBuilder};
//!
//! let kind = ArithmeticKind::Hrs;
//! let circuit = kind.build(4, 2, 11).unwrap();
//!
//! assert_eq!(circuit.qreg("exponent").unwrap().len(), 4);
//! assert_eq!(circuit.num_qubits() as u32, 4 + kind.bottom_width(11).unwrap());
//! ```

pub mod brg;
pub mod builder;
pub mod carry;
pub mod comparator;
pub mod constant_adder;
pub mod draper;
pub mod error;
pub mod hrs;
pub mod incrementer;
pub mod montgomery;
pub mod numtheory;
pub mod ripple;

pub use builder::{
    AncillaLayout, ArithmeticKind, Brg, ExponentiationSpec, Hrs, ModExpBuilder, ModMulBuilder,
    Montgomery,
};
pub use carry::carry_gate;
pub use comparator::comparator;
pub use constant_adder::controlled_constant_adder;
pub use draper::{draper_add_constant, fourier_adder, phi_add};
pub use error::{ArithError, ArithResult};
pub use incrementer::controlled_incrementer;
pub use ripple::{ripple_carry_adder, takahashi_adder};

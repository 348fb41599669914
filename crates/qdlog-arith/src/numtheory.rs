//! Classical number theory used to derive circuit constants.

use crate::error::{ArithError, ArithResult};

/// Widest modulus (in bits) the builders accept.
///
/// The Montgomery reduction works modulo `2^(m+1)`, which must fit in a `u64`.
pub const MAX_MODULUS_WIDTH: u32 = 62;

/// Greatest common divisor.
pub fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// `base^exp mod modulus` by square-and-multiply.
#[allow(clippy::cast_possible_truncation)]
pub fn mod_pow(base: u64, mut exp: u64, modulus: u64) -> u64 {
    if modulus == 1 {
        return 0;
    }
    let m = u128::from(modulus);
    let mut base = u128::from(base) % m;
    let mut acc: u128 = 1;
    while exp > 0 {
        if exp & 1 == 1 {
            acc = acc * base % m;
        }
        base = base * base % m;
        exp >>= 1;
    }
    acc as u64
}

/// `a^(2^i) mod modulus`, the constant controlled by exponent bit `i`.
#[allow(clippy::cast_possible_truncation)]
pub fn square_power(a: u64, i: u32, modulus: u64) -> u64 {
    let m = u128::from(modulus);
    let mut acc = u128::from(a) % m;
    for _ in 0..i {
        acc = acc * acc % m;
    }
    acc as u64
}

/// Multiplicative inverse of `a` modulo `modulus`, if it exists.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn mod_inverse(a: u64, modulus: u64) -> Option<u64> {
    if modulus == 0 {
        return None;
    }
    let (mut old_r, mut r) = (i128::from(a % modulus), i128::from(modulus));
    let (mut old_s, mut s) = (1i128, 0i128);
    while r != 0 {
        let q = old_r / r;
        (old_r, r) = (r, old_r - q * r);
        (old_s, s) = (s, old_s - q * s);
    }
    if old_r != 1 {
        return None;
    }
    Some(old_s.rem_euclid(i128::from(modulus)) as u64)
}

/// Smallest `d >= 1` with `g^d ≡ 1 (mod p)`.
///
/// Brute force; intended for the small moduli that fit a simulated circuit.
#[allow(clippy::cast_possible_truncation)]
pub fn multiplicative_order(g: u64, p: u64) -> Option<u64> {
    if p < 2 || gcd(g, p) != 1 {
        return None;
    }
    let mut acc = g % p;
    for d in 1..p {
        if acc == 1 {
            return Some(d);
        }
        acc = (u128::from(acc) * u128::from(g % p) % u128::from(p)) as u64;
    }
    None
}

/// Number of qubits needed to hold every residue modulo `p`: `ceil(log2 p)`.
pub fn modulus_width(p: u64) -> u32 {
    (u64::BITS - p.saturating_sub(1).leading_zeros()).max(1)
}

/// Validate a modulus and return its width.
pub fn check_modulus(p: u64) -> ArithResult<u32> {
    if p < 2 {
        return Err(ArithError::InvalidModulus {
            modulus: p,
            reason: "must be at least 2".into(),
        });
    }
    let width = modulus_width(p);
    if width > MAX_MODULUS_WIDTH {
        return Err(ArithError::InvalidModulus {
            modulus: p,
            reason: format!("wider than {MAX_MODULUS_WIDTH} bits"),
        });
    }
    Ok(width)
}

/// Validate a multiplication constant and return its inverse modulo `p`.
pub fn check_invertible(a: u64, p: u64) -> ArithResult<u64> {
    if a >= p {
        return Err(ArithError::ConstantOutOfRange { value: a, modulus: p });
    }
    mod_inverse(a, p).ok_or(ArithError::NotInvertible { value: a, modulus: p })
}

/// The low `width` bits of the two's complement representation of `value`.
#[allow(clippy::cast_sign_loss)]
pub fn twos_complement(value: i64, width: u32) -> u64 {
    let bits = value as u64;
    if width >= u64::BITS {
        bits
    } else {
        bits & ((1u64 << width) - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_modulus_width() {
        assert_eq!(modulus_width(2), 1);
        assert_eq!(modulus_width(5), 3);
        assert_eq!(modulus_width(8), 3);
        assert_eq!(modulus_width(17), 5);
        assert_eq!(modulus_width(32), 5);
        assert_eq!(modulus_width(33), 6);
    }

    #[test]
    fn test_check_modulus() {
        assert!(matches!(
            check_modulus(1),
            Err(ArithError::InvalidModulus { modulus: 1, .. })
        ));
        assert_eq!(check_modulus(17).unwrap(), 5);
        assert!(check_modulus(1 << 63).is_err());
    }

    #[test]
    fn test_mod_inverse_known_values() {
        assert_eq!(mod_inverse(3, 7), Some(5));
        assert_eq!(mod_inverse(2, 17), Some(9));
        assert_eq!(mod_inverse(4, 8), None);
        assert_eq!(mod_inverse(0, 5), None);
    }

    #[test]
    fn test_check_invertible() {
        assert_eq!(check_invertible(3, 7).unwrap(), 5);
        assert!(matches!(
            check_invertible(7, 7),
            Err(ArithError::ConstantOutOfRange { value: 7, modulus: 7 })
        ));
        assert!(matches!(
            check_invertible(6, 9),
            Err(ArithError::NotInvertible { value: 6, modulus: 9 })
        ));
    }

    #[test]
    fn test_multiplicative_order() {
        assert_eq!(multiplicative_order(2, 17), Some(8));
        assert_eq!(multiplicative_order(3, 17), Some(16));
        assert_eq!(multiplicative_order(3, 7), Some(6));
        assert_eq!(multiplicative_order(1, 7), Some(1));
        assert_eq!(multiplicative_order(4, 8), None);
    }

    #[test]
    fn test_twos_complement() {
        assert_eq!(twos_complement(-1, 4), 0b1111);
        assert_eq!(twos_complement(-12, 5), 20);
        assert_eq!(twos_complement(5, 3), 5);
        assert_eq!(twos_complement(9, 3), 1);
    }

    proptest! {
        #[test]
        fn prop_mod_pow_matches_repeated_multiplication(
            base in 0u64..1000,
            exp in 0u64..40,
            modulus in 2u64..1000,
        ) {
            let mut expected = 1 % modulus;
            for _ in 0..exp {
                expected = expected * base % modulus;
            }
            prop_assert_eq!(mod_pow(base, exp, modulus), expected);
        }

        #[test]
        fn prop_square_power_matches_mod_pow(a in 0u64..500, i in 0u32..10, p in 2u64..500) {
            prop_assert_eq!(square_power(a, i, p), mod_pow(a, 1u64 << i, p));
        }

        #[test]
        fn prop_mod_inverse_is_inverse(a in 1u64..10_000, modulus in 2u64..10_000) {
            match mod_inverse(a, modulus) {
                Some(inv) => prop_assert_eq!(a % modulus * inv % modulus, 1),
                None => prop_assert_ne!(gcd(a, modulus), 1),
            }
        }
    }
}

//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: vigil — threshold-custody trusted authority for versioned records.
//

//! Arithmetic over GF(P), P = secp256k1's base field prime.
//!
//! This is the field the Shamir engine splits and reconstructs secrets
//! over. All values are represented as 32-byte big-endian integers at the
//! module boundary; internally everything is a `BigUint`.

use num_bigint::BigUint;
use num_traits::{One, Zero};
use once_cell::sync::Lazy;

/// 2^256 - 2^32 - 977, the secp256k1 base field prime.
pub static P: Lazy<BigUint> = Lazy::new(|| {
    BigUint::parse_bytes(
        b"FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEFFFFFC2F",
        16,
    )
    .expect("valid hex literal")
});

pub fn from_be_bytes(bytes: &[u8; 32]) -> BigUint {
    BigUint::from_bytes_be(bytes)
}

/// Encode a field element as 32 big-endian bytes, left-padding with zeros.
pub fn to_be_bytes(value: &BigUint) -> [u8; 32] {
    let raw = value.to_bytes_be();
    let mut out = [0u8; 32];
    let start = 32 - raw.len();
    out[start..].copy_from_slice(&raw);
    out
}

pub fn add(a: &BigUint, b: &BigUint) -> BigUint {
    (a + b) % &*P
}

pub fn mul(a: &BigUint, b: &BigUint) -> BigUint {
    (a * b) % &*P
}

pub fn sub(a: &BigUint, b: &BigUint) -> BigUint {
    let p = &*P;
    if a >= b {
        (a - b) % p
    } else {
        p - ((b - a) % p)
    }
}

/// Modular inverse via Fermat's little theorem: a^(p-2) mod p.
/// Panics if `a` is zero — callers must never invert zero (duplicate or
/// zero x-coordinates are rejected before this is reached).
pub fn inv(a: &BigUint) -> BigUint {
    assert!(!a.is_zero(), "cannot invert zero in GF(P)");
    let exponent = &*P - BigUint::from(2u32);
    a.modpow(&exponent, &P)
}

pub fn is_zero(a: &BigUint) -> bool {
    a.is_zero()
}

pub fn one() -> BigUint {
    BigUint::one()
}

pub fn zero_value() -> BigUint {
    BigUint::zero()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_mul_roundtrip_stay_below_prime() {
        let a = BigUint::from(123456789u64);
        let b = BigUint::from(987654321u64);
        assert!(add(&a, &b) < *P);
        assert!(mul(&a, &b) < *P);
    }

    #[test]
    fn inverse_multiplies_to_one() {
        let a = BigUint::from(42u64);
        let inv_a = inv(&a);
        assert_eq!(mul(&a, &inv_a), one());
    }

    #[test]
    fn sub_wraps_around_when_negative() {
        let a = BigUint::from(1u64);
        let b = BigUint::from(2u64);
        let result = sub(&a, &b);
        assert_eq!(add(&result, &b) % &*P, a);
    }

    #[test]
    fn round_trip_bytes() {
        let bytes = [7u8; 32];
        let value = from_be_bytes(&bytes);
        assert_eq!(to_be_bytes(&value), bytes);
    }
}

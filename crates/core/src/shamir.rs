//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: vigil — threshold-custody trusted authority for versioned records.
//

//! k-of-n Shamir secret sharing over GF(P).
//!
//! A share is the 33-byte concatenation of a one-byte x-coordinate and a
//! 32-byte big-endian y-coordinate. Splitting samples a degree-(k-1)
//! polynomial with the secret as its constant term; reconstruction
//! interpolates that polynomial at x = 0.

use num_bigint::BigUint;
use rand::RngCore;
use zeroize::Zeroize;

use crate::error::{CoreError, CoreResult};
use crate::field::{self, P};

const SHARE_LEN: usize = 33;

#[derive(Debug, Clone, PartialEq, Eq, Zeroize)]
pub struct Share {
    pub x: u8,
    pub y: [u8; 32],
}

impl Share {
    pub fn to_bytes(&self) -> [u8; SHARE_LEN] {
        let mut out = [0u8; SHARE_LEN];
        out[0] = self.x;
        out[1..].copy_from_slice(&self.y);
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> CoreResult<Self> {
        if bytes.len() != SHARE_LEN {
            return Err(CoreError::invalid_argument(format!(
                "share must be {SHARE_LEN} bytes, got {}",
                bytes.len()
            )));
        }
        let mut y = [0u8; 32];
        y.copy_from_slice(&bytes[1..]);
        Ok(Share { x: bytes[0], y })
    }
}

/// Split a 32-byte secret into `n` shares requiring `k` of them to
/// reconstruct. Requires `1 < k <= n <= 255` and `secret < P`.
pub fn split(secret: &[u8; 32], n: u8, k: u8) -> CoreResult<Vec<Share>> {
    if !(k > 1 && k <= n) {
        return Err(CoreError::invalid_argument(format!(
            "threshold must satisfy 1 < k <= n, got k={k}, n={n}"
        )));
    }
    let s = field::from_be_bytes(secret);
    if s >= *P {
        return Err(CoreError::invalid_argument(
            "secret is not a valid field element (>= P)",
        ));
    }

    let mut rng = rand::rngs::OsRng;
    let mut coefficients = Vec::with_capacity(k as usize - 1);
    for _ in 0..(k - 1) {
        coefficients.push(sample_field_element(&mut rng));
    }

    let mut shares = Vec::with_capacity(n as usize);
    for x in 1..=n {
        let x_big = BigUint::from(x);
        let y = eval_poly(&s, &coefficients, &x_big);
        shares.push(Share {
            x,
            y: field::to_be_bytes(&y),
        });
    }
    Ok(shares)
}

/// Reconstruct the secret from at least `k` shares via Lagrange
/// interpolation at x = 0. Supplying fewer than the original threshold
/// yields a well-defined but meaningless value — the AEAD tag check on the
/// decrypted blob is the real gate against under-threshold reconstruction.
pub fn reconstruct(shares: &[Share]) -> CoreResult<[u8; 32]> {
    if shares.is_empty() {
        return Err(CoreError::invalid_argument("no shares supplied"));
    }
    let mut seen = std::collections::HashSet::new();
    for share in shares {
        if share.x == 0 {
            return Err(CoreError::invalid_argument("share x-coordinate must be >= 1"));
        }
        if !seen.insert(share.x) {
            return Err(CoreError::invalid_argument(format!(
                "duplicate share x-coordinate: {}",
                share.x
            )));
        }
    }

    let points: Vec<(BigUint, BigUint)> = shares
        .iter()
        .map(|s| (BigUint::from(s.x), field::from_be_bytes(&s.y)))
        .collect();

    let mut acc = field::zero_value();
    for (i, (x_i, y_i)) in points.iter().enumerate() {
        let mut numerator = field::one();
        let mut denominator = field::one();
        for (j, (x_j, _)) in points.iter().enumerate() {
            if i == j {
                continue;
            }
            // numerator *= (0 - x_j) = -x_j
            numerator = field::mul(&numerator, &field::sub(&field::zero_value(), x_j));
            // denominator *= (x_i - x_j)
            denominator = field::mul(&denominator, &field::sub(x_i, x_j));
        }
        let term = field::mul(y_i, &field::mul(&numerator, &field::inv(&denominator)));
        acc = field::add(&acc, &term);
    }

    Ok(field::to_be_bytes(&acc))
}

fn sample_field_element(rng: &mut impl RngCore) -> BigUint {
    loop {
        let mut bytes = [0u8; 32];
        rng.fill_bytes(&mut bytes);
        let candidate = field::from_be_bytes(&bytes);
        if candidate < *P {
            return candidate;
        }
    }
}

fn eval_poly(constant: &BigUint, coefficients: &[BigUint], x: &BigUint) -> BigUint {
    // Horner's method, highest degree first.
    let mut acc = coefficients.last().cloned().unwrap_or_else(field::one);
    if coefficients.is_empty() {
        return constant.clone();
    }
    for coeff in coefficients[..coefficients.len() - 1].iter().rev() {
        acc = field::add(&field::mul(&acc, x), coeff);
    }
    field::add(&field::mul(&acc, x), constant)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret_from_u64(v: u64) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&v.to_be_bytes());
        bytes
    }

    #[test]
    fn round_trips_with_exactly_k_shares() {
        let secret = secret_from_u64(123456789);
        let shares = split(&secret, 5, 3).unwrap();
        let subset = vec![shares[0].clone(), shares[2].clone(), shares[4].clone()];
        let recovered = reconstruct(&subset).unwrap();
        assert_eq!(recovered, secret);
    }

    #[test]
    fn round_trips_with_all_shares() {
        let secret = secret_from_u64(42);
        let shares = split(&secret, 5, 2).unwrap();
        let recovered = reconstruct(&shares).unwrap();
        assert_eq!(recovered, secret);
    }

    #[test]
    fn under_threshold_does_not_panic_and_differs() {
        let secret = secret_from_u64(999);
        let shares = split(&secret, 5, 4).unwrap();
        let subset = vec![shares[0].clone(), shares[1].clone()];
        let recovered = reconstruct(&subset).unwrap();
        assert_ne!(recovered, secret);
    }

    #[test]
    fn rejects_invalid_threshold() {
        let secret = secret_from_u64(1);
        assert!(split(&secret, 3, 1).is_err());
        assert!(split(&secret, 3, 4).is_err());
    }

    #[test]
    fn rejects_duplicate_x_on_reconstruct() {
        let secret = secret_from_u64(7);
        let shares = split(&secret, 5, 3).unwrap();
        let bad = vec![shares[0].clone(), shares[0].clone(), shares[1].clone()];
        assert!(reconstruct(&bad).is_err());
    }

    #[test]
    fn share_byte_round_trip() {
        let share = Share {
            x: 3,
            y: [9u8; 32],
        };
        let bytes = share.to_bytes();
        let parsed = Share::from_bytes(&bytes).unwrap();
        assert_eq!(share, parsed);
    }
}

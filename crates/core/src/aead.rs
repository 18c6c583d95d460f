//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: vigil — threshold-custody trusted authority for versioned records.
//

//! AES-256-GCM encryption with caller-supplied associated data.

use aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use rand::RngCore;

use crate::error::{CoreError, CoreResult};

pub const NONCE_LEN: usize = 12;
pub const KEY_LEN: usize = 32;

/// Encrypt `plaintext` under `key` with a fresh random nonce, binding `aad`.
/// Returns `(nonce, ciphertext_with_tag)`.
pub fn encrypt(key: &[u8], plaintext: &[u8], aad: &[u8]) -> CoreResult<([u8; NONCE_LEN], Vec<u8>)> {
    let cipher = cipher_from_key(key)?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(
            nonce,
            Payload {
                msg: plaintext,
                aad,
            },
        )
        .map_err(|_| CoreError::internal("AEAD encryption failed"))?;

    Ok((nonce_bytes, ciphertext))
}

/// Decrypt `ciphertext` under `key`/`nonce`, verifying `aad`. Any tampering
/// with the ciphertext, nonce, or aad surfaces as `CoreError::Integrity`.
pub fn decrypt(
    key: &[u8],
    nonce: &[u8; NONCE_LEN],
    ciphertext: &[u8],
    aad: &[u8],
) -> CoreResult<Vec<u8>> {
    let cipher = cipher_from_key(key)?;
    let nonce = Nonce::from_slice(nonce);

    cipher
        .decrypt(
            nonce,
            Payload {
                msg: ciphertext,
                aad,
            },
        )
        .map_err(|_| CoreError::integrity("AEAD authentication failed"))
}

fn cipher_from_key(key: &[u8]) -> CoreResult<Aes256Gcm> {
    if key.len() != KEY_LEN {
        return Err(CoreError::invalid_argument(format!(
            "AES-256-GCM key must be {KEY_LEN} bytes, got {}",
            key.len()
        )));
    }
    Ok(Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key)))
}

//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: vigil — threshold-custody trusted authority for versioned records.
//

//! Per-peer node master keys (NMKs), generated on first touch and used to
//! wrap/unwrap Shamir shares.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use base64::Engine;
use rand::RngCore;

use crate::aead;
use crate::error::{CoreError, CoreResult};
use crate::secret::Secret;

/// Holds one 32-byte master key per configured peer, persisted under
/// `base_dir/<peer_id>.key`.
pub struct PeerNmkStore {
    base_dir: PathBuf,
    keys: HashMap<String, Secret<[u8; 32]>>,
}

impl PeerNmkStore {
    /// Load (or generate and persist) a master key for each `peer_id`.
    pub fn open(base_dir: impl Into<PathBuf>, peer_ids: &[String]) -> CoreResult<Self> {
        let base_dir = base_dir.into();
        std::fs::create_dir_all(&base_dir)?;

        let mut keys = HashMap::with_capacity(peer_ids.len());
        for peer_id in peer_ids {
            let path = key_path(&base_dir, peer_id);
            let key = if path.exists() {
                load_key(&path)?
            } else {
                generate_and_persist(&path)?
            };
            keys.insert(peer_id.clone(), Secret::new(key));
        }
        Ok(Self { base_dir, keys })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Wrap `share` under `peer_id`'s NMK, binding `aad`. Returns a
    /// base64-encoded `nonce || ciphertext` token suitable for ledger storage.
    pub fn wrap_share(&self, peer_id: &str, share: &[u8], aad: &[u8]) -> CoreResult<String> {
        let key = self.key_for(peer_id)?;
        let (nonce, ciphertext) = aead::encrypt(key.expose_secret(), share, aad)?;
        let mut combined = Vec::with_capacity(nonce.len() + ciphertext.len());
        combined.extend_from_slice(&nonce);
        combined.extend_from_slice(&ciphertext);
        Ok(base64::engine::general_purpose::STANDARD.encode(combined))
    }

    /// Inverse of [`Self::wrap_share`].
    pub fn unwrap_share(&self, peer_id: &str, token: &str, aad: &[u8]) -> CoreResult<Vec<u8>> {
        let key = self.key_for(peer_id)?;
        let combined = base64::engine::general_purpose::STANDARD
            .decode(token)
            .map_err(|e| CoreError::integrity(format!("invalid wrapped share encoding: {e}")))?;
        if combined.len() < aead::NONCE_LEN {
            return Err(CoreError::integrity("wrapped share too short"));
        }
        let (nonce_bytes, ciphertext) = combined.split_at(aead::NONCE_LEN);
        let mut nonce = [0u8; aead::NONCE_LEN];
        nonce.copy_from_slice(nonce_bytes);
        aead::decrypt(key.expose_secret(), &nonce, ciphertext, aad)
    }

    fn key_for(&self, peer_id: &str) -> CoreResult<&Secret<[u8; 32]>> {
        self.keys
            .get(peer_id)
            .ok_or_else(|| CoreError::not_found(format!("unknown peer: {peer_id}")))
    }
}

fn key_path(base_dir: &Path, peer_id: &str) -> PathBuf {
    base_dir.join(format!("{peer_id}.key"))
}

fn generate_and_persist(path: &Path) -> CoreResult<[u8; 32]> {
    let mut key = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut key);

    let tmp_path = path.with_extension("key.tmp");
    std::fs::write(&tmp_path, key)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(key)
}

fn load_key(path: &Path) -> CoreResult<[u8; 32]> {
    let bytes = std::fs::read(path)?;
    if bytes.len() != 32 {
        return Err(CoreError::integrity(format!(
            "peer key at {} is not 32 bytes",
            path.display()
        )));
    }
    let mut key = [0u8; 32];
    key.copy_from_slice(&bytes);
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn generates_and_persists_keys_on_first_open() {
        let dir = tempdir().unwrap();
        let peers = vec!["peer1".to_string(), "peer2".to_string()];
        let store = PeerNmkStore::open(dir.path(), &peers).unwrap();
        assert!(dir.path().join("peer1.key").exists());
        assert!(dir.path().join("peer2.key").exists());
        drop(store);
    }

    #[test]
    fn reopening_reuses_the_same_key() {
        let dir = tempdir().unwrap();
        let peers = vec!["peer1".to_string()];
        let store1 = PeerNmkStore::open(dir.path(), &peers).unwrap();
        let wrapped = store1.wrap_share("peer1", b"share-bytes", b"aad").unwrap();

        let store2 = PeerNmkStore::open(dir.path(), &peers).unwrap();
        let unwrapped = store2.unwrap_share("peer1", &wrapped, b"aad").unwrap();
        assert_eq!(unwrapped, b"share-bytes");
    }

    #[test]
    fn wrap_unwrap_round_trips() {
        let dir = tempdir().unwrap();
        let peers = vec!["peer1".to_string()];
        let store = PeerNmkStore::open(dir.path(), &peers).unwrap();
        let wrapped = store.wrap_share("peer1", b"a-share", b"P001:1").unwrap();
        let unwrapped = store.unwrap_share("peer1", &wrapped, b"P001:1").unwrap();
        assert_eq!(unwrapped, b"a-share");
    }

    #[test]
    fn unwrap_fails_with_wrong_aad() {
        let dir = tempdir().unwrap();
        let peers = vec!["peer1".to_string()];
        let store = PeerNmkStore::open(dir.path(), &peers).unwrap();
        let wrapped = store.wrap_share("peer1", b"a-share", b"P001:1").unwrap();
        assert!(store.unwrap_share("peer1", &wrapped, b"P001:2").is_err());
    }

    #[test]
    fn unknown_peer_is_not_found() {
        let dir = tempdir().unwrap();
        let store = PeerNmkStore::open(dir.path(), &[]).unwrap();
        assert!(store.wrap_share("ghost", b"x", b"aad").is_err());
    }
}

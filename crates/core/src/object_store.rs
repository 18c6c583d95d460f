//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: vigil — threshold-custody trusted authority for versioned records.
//

//! Local, content-addressed storage for encrypted record blobs.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::error::CoreResult;

const DEFAULT_CONDITION: &str = "general";

pub struct LocalObjectStore {
    base_dir: PathBuf,
}

impl LocalObjectStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Write `blob` to `<base>/<condition|"general">/<patient_id>/v<version>.bin`
    /// and return `(path, sha256_hex(blob))`.
    pub fn put(
        &self,
        patient_id: &str,
        version: u64,
        blob: &[u8],
        condition: Option<&str>,
    ) -> CoreResult<(String, String)> {
        let condition = normalize_condition(condition);
        let dir = self.base_dir.join(&condition).join(patient_id);
        std::fs::create_dir_all(&dir)?;
        let path = dir.join(format!("v{version}.bin"));
        std::fs::write(&path, blob)?;
        Ok((path.to_string_lossy().into_owned(), hash(blob)))
    }

    pub fn get(&self, path: &str) -> CoreResult<Vec<u8>> {
        Ok(std::fs::read(Path::new(path))?)
    }
}

pub fn hash(blob: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(blob);
    hex::encode(hasher.finalize())
}

fn normalize_condition(condition: Option<&str>) -> String {
    let trimmed = condition.unwrap_or(DEFAULT_CONDITION).trim();
    if trimmed.is_empty() {
        DEFAULT_CONDITION.to_string()
    } else {
        trimmed.to_string()
    }
}

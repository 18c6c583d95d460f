//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: vigil — threshold-custody trusted authority for versioned records.
//

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::audit::AuditEntry;
use crate::priority::Priority;

/// One immutable version of a patient's record, as persisted by the ledger.
///
/// Field names are bit-stable: they are the on-the-wire JSON shape consumed
/// by both ledger backings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordVersion {
    pub patient_id: String,
    pub priority: Priority,
    pub threshold: u8,
    pub version: u64,
    pub encrypted_file_path: String,
    pub encrypted_file_hash: String,
    /// peer_id -> base64(nonce || ciphertext) wrapped share
    pub shares_wrapped: BTreeMap<String, String>,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub audit_logs: Vec<AuditEntry>,
}

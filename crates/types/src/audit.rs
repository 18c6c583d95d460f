//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: vigil — threshold-custody trusted authority for versioned records.
//

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::priority::Priority;

/// What happened to a record version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditEvent {
    Create,
    Update,
    Read,
}

/// One entry in a record's audit trail. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub event: AuditEvent,
    pub timestamp: DateTime<Utc>,
    pub requester: Option<String>,
    /// Present for CREATE/UPDATE entries; absent for READ.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
}

impl AuditEntry {
    pub fn write(
        event: AuditEvent,
        requester: Option<String>,
        priority: Priority,
        threshold: u8,
        version: u64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            event,
            timestamp,
            requester,
            priority: Some(priority),
            threshold: Some(threshold),
            version: Some(version),
        }
    }

    pub fn read(requester: Option<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            event: AuditEvent::Read,
            timestamp,
            requester,
            priority: None,
            threshold: None,
            version: None,
        }
    }
}

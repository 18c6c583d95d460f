//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: vigil — threshold-custody trusted authority for versioned records.
//

//! The trusted authority orchestrator: coordinates upload, reconstruction,
//! update, and history against the ledger, object store, peer store, and
//! triage classifier.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use rand::RngCore;
use tokio::sync::Mutex;
use vigil_types::{AuditEntry, AuditEvent, Priority, RecordVersion};
use zeroize::Zeroizing;

use crate::aead;
use crate::error::{CoreError, CoreResult};
use crate::ledger::LedgerAdapter;
use crate::llm::TriageClassifier;
use crate::object_store::LocalObjectStore;
use crate::peer_store::PeerNmkStore;
use crate::policy;
use crate::shamir;

/// Summary returned by a successful upload or update.
#[derive(Debug, Clone)]
pub struct UploadResult {
    pub patient_id: String,
    pub priority: Priority,
    pub threshold: u8,
    pub version: u64,
}

/// Reconstructed plaintext plus the record metadata it was read from.
#[derive(Debug, Clone)]
pub struct ReconstructResult {
    pub patient_id: String,
    pub priority: Priority,
    pub threshold: u8,
    pub version: u64,
    pub plaintext: Vec<u8>,
    pub audit_logs: Vec<AuditEntry>,
}

#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub patient_id: String,
    pub priority: Priority,
    pub threshold: u8,
    pub version: u64,
    pub timestamp: chrono::DateTime<Utc>,
}

pub struct TaCore {
    ledger: Arc<dyn LedgerAdapter>,
    object_store: LocalObjectStore,
    peer_store: PeerNmkStore,
    classifier: Arc<dyn TriageClassifier>,
    peer_ids: Vec<String>,
    write_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl TaCore {
    pub fn new(
        ledger: Arc<dyn LedgerAdapter>,
        object_store: LocalObjectStore,
        peer_store: PeerNmkStore,
        classifier: Arc<dyn TriageClassifier>,
        peer_ids: Vec<String>,
    ) -> Self {
        Self {
            ledger,
            object_store,
            peer_store,
            classifier,
            peer_ids,
            write_locks: Mutex::new(HashMap::new()),
        }
    }

    pub async fn upload_new_record(
        &self,
        patient_id: &str,
        file_bytes: &[u8],
        filename: &str,
        requester: Option<String>,
    ) -> CoreResult<UploadResult> {
        let _guard = self.lock_for(patient_id).await;

        let existing = self.ledger.get_latest_record(patient_id).await.ok();
        let version = existing.as_ref().map(|r| r.version + 1).unwrap_or(1);
        let existing_priority = existing.as_ref().map(|r| r.priority);

        let llm_priority = self.classifier.classify(file_bytes, filename).await?;
        let priority = match existing_priority {
            Some(prev) => prev.max_by_rank(llm_priority),
            None => llm_priority,
        };

        let result = self
            .write_version(patient_id, version, priority, file_bytes, requester)
            .await?;

        Ok(result)
    }

    pub async fn update_record(
        &self,
        patient_id: &str,
        new_file_bytes: &[u8],
        filename: &str,
        requester: Option<String>,
    ) -> CoreResult<UploadResult> {
        let _guard = self.lock_for(patient_id).await;

        let latest = self.ledger.get_latest_record(patient_id).await?;
        let version = latest.version + 1;

        // update_record always re-classifies, same as upload, but is only
        // reachable when history already exists.
        let llm_priority = self.classifier.classify(new_file_bytes, filename).await?;
        let priority = latest.priority.max_by_rank(llm_priority);

        self.write_version(patient_id, version, priority, new_file_bytes, requester)
            .await
    }

    async fn write_version(
        &self,
        patient_id: &str,
        version: u64,
        priority: Priority,
        file_bytes: &[u8],
        requester: Option<String>,
    ) -> CoreResult<UploadResult> {
        let threshold = policy::priority_to_threshold(priority)?;
        let aad = version_aad(patient_id, version);

        let mut pdk = Zeroizing::new([0u8; 32]);
        rand::rngs::OsRng.fill_bytes(&mut *pdk);

        let (nonce, ciphertext) = aead::encrypt(&pdk, file_bytes, &aad)?;
        let mut blob = Vec::with_capacity(nonce.len() + ciphertext.len());
        blob.extend_from_slice(&nonce);
        blob.extend_from_slice(&ciphertext);

        let (base_id, condition) = split_patient_and_condition(patient_id);
        let (blob_path, blob_digest) =
            self.object_store
                .put(base_id, version, &blob, condition.as_deref())?;

        let shares = Zeroizing::new(shamir::split(&pdk, self.peer_ids.len() as u8, threshold)?);

        if shares.len() != self.peer_ids.len() {
            return Err(CoreError::internal(
                "share count does not match configured peer count",
            ));
        }

        let mut shares_wrapped = std::collections::BTreeMap::new();
        for (peer_id, share) in self.peer_ids.iter().zip(shares.iter()) {
            let wrapped = self
                .peer_store
                .wrap_share(peer_id, &share.to_bytes(), &aad)?;
            shares_wrapped.insert(peer_id.clone(), wrapped);
        }

        let timestamp = Utc::now();
        let event = if version == 1 {
            AuditEvent::Create
        } else {
            AuditEvent::Update
        };
        let audit_entry =
            AuditEntry::write(event, requester, priority, threshold, version, timestamp);

        let mut audit_logs = if version == 1 {
            vec![]
        } else {
            self.ledger.get_history(patient_id).await?.last().map(|r| r.audit_logs.clone()).unwrap_or_default()
        };
        audit_logs.push(audit_entry);

        let record = RecordVersion {
            patient_id: patient_id.to_string(),
            priority,
            threshold,
            version,
            encrypted_file_path: blob_path,
            encrypted_file_hash: blob_digest,
            shares_wrapped,
            timestamp,
            audit_logs,
        };

        if version == 1 {
            self.ledger.create_record(record).await?;
        } else {
            self.ledger.update_record(record).await?;
        }

        Ok(UploadResult {
            patient_id: patient_id.to_string(),
            priority,
            threshold,
            version,
        })
    }

    pub async fn reconstruct_latest(
        &self,
        patient_id: &str,
        requester: Option<String>,
    ) -> CoreResult<ReconstructResult> {
        let record = self.ledger.get_latest_record(patient_id).await?;
        let aad = version_aad(patient_id, record.version);

        let mut shares = Zeroizing::new(Vec::with_capacity(record.threshold as usize));
        for peer_id in self.peer_ids.iter().take(record.threshold as usize) {
            let token = record.shares_wrapped.get(peer_id).ok_or_else(|| {
                CoreError::integrity(format!("missing wrapped share for peer {peer_id}"))
            })?;
            let share_bytes = self.peer_store.unwrap_share(peer_id, token, &aad)?;
            shares.push(shamir::Share::from_bytes(&share_bytes)?);
        }

        let pdk = Zeroizing::new(shamir::reconstruct(&shares)?);

        let blob = self.object_store.get(&record.encrypted_file_path)?;
        let actual_digest = crate::object_store::hash(&blob);
        if actual_digest != record.encrypted_file_hash {
            return Err(CoreError::integrity("blob digest mismatch"));
        }

        if blob.len() < aead::NONCE_LEN {
            return Err(CoreError::integrity("stored blob shorter than a nonce"));
        }
        let (nonce_bytes, ciphertext) = blob.split_at(aead::NONCE_LEN);
        let mut nonce = [0u8; aead::NONCE_LEN];
        nonce.copy_from_slice(nonce_bytes);

        let plaintext = aead::decrypt(&pdk, &nonce, ciphertext, &aad)?;

        let read_entry = AuditEntry::read(requester, Utc::now());
        if let Err(e) = self
            .ledger
            .append_audit_log(patient_id, read_entry.clone())
            .await
        {
            tracing::warn!(patient_id, error = %e, "failed to append READ audit entry");
        }

        let mut audit_logs = record.audit_logs;
        audit_logs.push(read_entry);

        Ok(ReconstructResult {
            patient_id: record.patient_id,
            priority: record.priority,
            threshold: record.threshold,
            version: record.version,
            plaintext,
            audit_logs,
        })
    }

    pub async fn get_history(&self, patient_id: &str) -> CoreResult<Vec<HistoryEntry>> {
        let history = self.ledger.get_history(patient_id).await?;
        Ok(history
            .into_iter()
            .map(|r| HistoryEntry {
                patient_id: r.patient_id,
                priority: r.priority,
                threshold: r.threshold,
                version: r.version,
                timestamp: r.timestamp,
            })
            .collect())
    }

    async fn lock_for(&self, patient_id: &str) -> tokio::sync::OwnedMutexGuard<()> {
        let mut locks = self.write_locks.lock().await;
        let entry = locks
            .entry(patient_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        drop(locks);
        entry.lock_owned().await
    }
}

fn version_aad(patient_id: &str, version: u64) -> Vec<u8> {
    format!("{patient_id}:{version}").into_bytes()
}

/// Splits `patient_id` on the first `_` into (base_id, condition). An empty
/// base or an empty suffix both fall back to treating the whole id as the
/// base with no condition.
fn split_patient_and_condition(patient_id: &str) -> (&str, Option<String>) {
    match patient_id.split_once('_') {
        Some((base, condition)) if !base.is_empty() && !condition.is_empty() => {
            (base, Some(condition.to_string()))
        }
        _ => (patient_id, None),
    }
}

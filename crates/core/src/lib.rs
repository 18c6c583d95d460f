//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: vigil — threshold-custody trusted authority for versioned records.
//

//! # vigil-core
//!
//! Threshold-custody cryptography and orchestration for a trusted authority
//! that stores versioned records encrypted at rest, with the per-record key
//! split across independent peers via Shamir secret sharing.
//!
//! ## Architecture
//!
//! - [`field`] / [`shamir`] — GF(P) arithmetic and k-of-n secret sharing.
//! - [`aead`] — AES-256-GCM with associated data.
//! - [`peer_store`] — per-peer node master keys, wrapping/unwrapping shares.
//! - [`object_store`] — content-addressed storage for encrypted blobs.
//! - [`ledger`] — the abstract ledger contract plus file/remote backings.
//! - [`policy`] — priority-to-threshold mapping.
//! - [`llm`] — the triage classifier seam.
//! - [`orchestrator`] — ties everything together behind `TaCore`.
//! - [`config`] — environment-driven startup configuration.

pub mod aead;
pub mod config;
pub mod error;
pub mod field;
pub mod ledger;
pub mod llm;
pub mod object_store;
pub mod orchestrator;
pub mod peer_store;
pub mod policy;
pub mod secret;
pub mod shamir;

pub use config::{Config, LedgerMode};
pub use error::{CoreError, CoreResult};
pub use ledger::{FileLedgerAdapter, LedgerAdapter, RemoteLedgerAdapter};
pub use llm::{MockClassifier, TriageClassifier};
pub use object_store::LocalObjectStore;
pub use orchestrator::{HistoryEntry, ReconstructResult, TaCore, UploadResult};
pub use peer_store::PeerNmkStore;
pub use secret::Secret;

//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: vigil — threshold-custody trusted authority for versioned records.
//

//! Environment-driven configuration, built once at process startup.

use std::path::PathBuf;

/// Selects which `LedgerAdapter` backing the orchestrator is wired to.
#[derive(Debug, Clone)]
pub enum LedgerMode {
    Mock,
    Fabric { base_url: String, verify_tls: bool },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub peer_ids: Vec<String>,
    pub ledger_mode: LedgerMode,
    pub data_root: PathBuf,
}

impl Config {
    /// Builds a `Config` from environment variables, loading a `.env` file
    /// first if present.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let peer_ids = peer_ids_from_env();
        let ledger_mode = ledger_mode_from_env();
        let data_root = std::env::var("VIGIL_DATA_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data"));

        Self {
            peer_ids,
            ledger_mode,
            data_root,
        }
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.data_root.join("ledger.json")
    }

    pub fn object_store_dir(&self) -> PathBuf {
        self.data_root.join("objects")
    }

    pub fn peer_store_dir(&self) -> PathBuf {
        self.data_root.join("peers")
    }
}

fn peer_ids_from_env() -> Vec<String> {
    if let Ok(raw) = std::env::var("TA_PEER_IDS") {
        let ids: Vec<String> = raw
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if !ids.is_empty() {
            return ids;
        }
    }

    let num_peers: u32 = std::env::var("TA_NUM_PEERS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(5)
        .max(2);

    (1..=num_peers).map(|n| format!("peer{n}")).collect()
}

fn ledger_mode_from_env() -> LedgerMode {
    match std::env::var("FABRIC_MODE").as_deref() {
        Ok("fabric") => {
            let base_url = std::env::var("FABRIC_REST_URL")
                .unwrap_or_else(|_| "http://localhost:8800".to_string());
            let verify_tls = !matches!(
                std::env::var("FABRIC_SSL_VERIFY")
                    .unwrap_or_default()
                    .to_lowercase()
                    .as_str(),
                "0" | "false" | "no" | "off"
            );
            LedgerMode::Fabric {
                base_url,
                verify_tls,
            }
        }
        _ => LedgerMode::Mock,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Environment variables are process-global; serialize these tests.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn clear_env() {
        for var in ["TA_PEER_IDS", "TA_NUM_PEERS", "FABRIC_MODE", "FABRIC_REST_URL", "FABRIC_SSL_VERIFY"] {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn defaults_to_five_mock_peers() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        let config = Config::from_env();
        assert_eq!(config.peer_ids.len(), 5);
        assert_eq!(config.peer_ids[0], "peer1");
        assert!(matches!(config.ledger_mode, LedgerMode::Mock));
    }

    #[test]
    fn explicit_peer_ids_override_count() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        std::env::set_var("TA_PEER_IDS", "alpha,beta,gamma");
        let config = Config::from_env();
        assert_eq!(config.peer_ids, vec!["alpha", "beta", "gamma"]);
        clear_env();
    }

    #[test]
    fn num_peers_is_clamped_to_at_least_two() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        std::env::set_var("TA_NUM_PEERS", "1");
        let config = Config::from_env();
        assert_eq!(config.peer_ids.len(), 2);
        clear_env();
    }

    #[test]
    fn fabric_mode_reads_url_and_tls_flag() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        std::env::set_var("FABRIC_MODE", "fabric");
        std::env::set_var("FABRIC_REST_URL", "https://ledger.example.com");
        std::env::set_var("FABRIC_SSL_VERIFY", "false");
        let config = Config::from_env();
        match config.ledger_mode {
            LedgerMode::Fabric {
                base_url,
                verify_tls,
            } => {
                assert_eq!(base_url, "https://ledger.example.com");
                assert!(!verify_tls);
            }
            LedgerMode::Mock => panic!("expected fabric mode"),
        }
        clear_env();
    }
}

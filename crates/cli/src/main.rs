//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: vigil — threshold-custody trusted authority for versioned records.
//

//! `vigil` — a command-line client against a locally-constructed trusted
//! authority, backed by the same `vigil-core` orchestrator the HTTP service
//! uses. Useful for local smoke-testing without standing up a server.

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use vigil_core::{
    Config, FileLedgerAdapter, LedgerAdapter, LedgerMode, LocalObjectStore, MockClassifier,
    PeerNmkStore, RemoteLedgerAdapter, TaCore, TriageClassifier,
};

#[derive(Parser, Debug)]
#[command(name = "vigil", version, about = "vigil trusted-authority CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Upload a new record (creates version 1, or the next version if history exists)
    Upload(UploadCmd),
    /// Submit an updated record over an existing patient
    Update(UploadCmd),
    /// Reconstruct and print the latest version of a record
    Read(ReadCmd),
    /// List version history for a patient
    History(ReadCmd),
}

#[derive(Args, Debug)]
struct UploadCmd {
    /// Patient identifier, optionally "patient_id:condition"
    patient_id: String,
    /// File to upload
    #[arg(long = "in", value_name = "PATH")]
    input: PathBuf,
    /// Requesting identity, recorded in the audit trail
    #[arg(long)]
    requester: Option<String>,
}

#[derive(Args, Debug)]
struct ReadCmd {
    /// Patient identifier, optionally "patient_id:condition"
    patient_id: String,
    /// Where to write the reconstructed plaintext (read only)
    #[arg(long = "out", value_name = "PATH")]
    output: Option<PathBuf>,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        process::exit(1);
    }
}

#[tokio::main]
async fn run() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let core = build_core()?;

    match cli.command {
        Commands::Upload(args) => handle_upload(&core, args).await,
        Commands::Update(args) => handle_update(&core, args).await,
        Commands::Read(args) => handle_read(&core, args).await,
        Commands::History(args) => handle_history(&core, args).await,
    }
}

fn build_core() -> Result<TaCore> {
    let config = Config::from_env();

    std::fs::create_dir_all(config.object_store_dir())?;
    std::fs::create_dir_all(config.peer_store_dir())?;

    let ledger: Arc<dyn LedgerAdapter> = match &config.ledger_mode {
        LedgerMode::Mock => Arc::new(FileLedgerAdapter::open(config.ledger_path())?),
        LedgerMode::Fabric {
            base_url,
            verify_tls,
        } => Arc::new(RemoteLedgerAdapter::new(base_url.clone(), *verify_tls)?),
    };

    let object_store = LocalObjectStore::new(config.object_store_dir());
    let peer_store = PeerNmkStore::open(config.peer_store_dir(), &config.peer_ids)?;
    let classifier: Arc<dyn TriageClassifier> = Arc::new(MockClassifier::from_env_or_medium());

    Ok(TaCore::new(
        ledger,
        object_store,
        peer_store,
        classifier,
        config.peer_ids,
    ))
}

async fn handle_upload(core: &TaCore, args: UploadCmd) -> Result<()> {
    let bytes = std::fs::read(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let filename = args
        .input
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "upload.bin".to_string());

    let result = core
        .upload_new_record(&args.patient_id, &bytes, &filename, args.requester)
        .await?;

    println!(
        "uploaded {} version {} (priority {}, threshold {})",
        result.patient_id, result.version, result.priority, result.threshold
    );
    Ok(())
}

async fn handle_update(core: &TaCore, args: UploadCmd) -> Result<()> {
    let bytes = std::fs::read(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let filename = args
        .input
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "upload.bin".to_string());

    let result = core
        .update_record(&args.patient_id, &bytes, &filename, args.requester)
        .await?;

    println!(
        "updated {} to version {} (priority {}, threshold {})",
        result.patient_id, result.version, result.priority, result.threshold
    );
    Ok(())
}

async fn handle_read(core: &TaCore, args: ReadCmd) -> Result<()> {
    let result = core.reconstruct_latest(&args.patient_id, None).await?;

    match args.output {
        Some(path) => {
            std::fs::write(&path, &result.plaintext)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!(
                "wrote version {} ({} bytes) to {}",
                result.version,
                result.plaintext.len(),
                path.display()
            );
        }
        None => {
            println!(
                "version {} (priority {}, threshold {}), {} bytes reconstructed",
                result.version,
                result.priority,
                result.threshold,
                result.plaintext.len()
            );
        }
    }
    Ok(())
}

async fn handle_history(core: &TaCore, args: ReadCmd) -> Result<()> {
    let history = core.get_history(&args.patient_id).await?;
    for entry in history {
        println!(
            "v{} priority={} threshold={} at {}",
            entry.version,
            entry.priority,
            entry.threshold,
            entry.timestamp.to_rfc3339()
        );
    }
    Ok(())
}

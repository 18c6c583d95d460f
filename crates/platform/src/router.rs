//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: vigil — threshold-custody trusted authority for versioned records.
//

//! Axum router composition for the vigil HTTP layer.
//!
//! Routes:
//!   POST  /auth/login               — issue a bearer token
//!   POST  /records/:id/upload       — hospital uploads a new record (v1)
//!   POST  /records/:id/update       — doctor submits an updated record
//!   GET   /records/:id              — doctor reconstructs the latest version
//!   GET   /records/:id/history      — any authenticated caller reads history
//!   GET   /healthz                  — health check

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::handlers::{
    health_handler, history_handler, login_handler, read_handler, update_handler,
    upload_handler,
};
use crate::state::AppState;

/// Build the full Axum router for the vigil platform service.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/auth/login", post(login_handler))
        .route("/records/:id/upload", post(upload_handler))
        .route("/records/:id/update", post(update_handler))
        .route("/records/:id", get(read_handler))
        .route("/records/:id/history", get(history_handler))
        .route("/healthz", get(health_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

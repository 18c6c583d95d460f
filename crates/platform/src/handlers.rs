//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: vigil — threshold-custody trusted authority for versioned records.
//

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::auth::{self, Claims, Role};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

pub async fn login_handler(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, StatusCode> {
    let role = auth::authenticate(&req.username, &req.password).ok_or(StatusCode::UNAUTHORIZED)?;
    let token = auth::mint_token(&req.username, role, &state.jwt_secret)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(LoginResponse { token }))
}

#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    pub filename: String,
    /// base64-encoded file contents.
    pub file_b64: String,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub patient_id: String,
    pub priority: String,
    pub threshold: u8,
    pub version: u64,
}

pub async fn upload_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(patient_id): Path<String>,
    Json(req): Json<UploadRequest>,
) -> Result<Json<UploadResponse>, StatusCode> {
    let claims = require_role(&state, &headers, Role::Hospital)?;
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(&req.file_b64)
        .map_err(|_| StatusCode::BAD_REQUEST)?;

    let result = state
        .core
        .upload_new_record(&patient_id, &bytes, &req.filename, Some(claims.sub))
        .await
        .map_err(map_core_error)?;

    Ok(Json(UploadResponse {
        patient_id: result.patient_id,
        priority: result.priority.to_string(),
        threshold: result.threshold,
        version: result.version,
    }))
}

pub async fn update_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(patient_id): Path<String>,
    Json(req): Json<UploadRequest>,
) -> Result<Json<UploadResponse>, StatusCode> {
    let claims = require_role(&state, &headers, Role::Doctor)?;
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(&req.file_b64)
        .map_err(|_| StatusCode::BAD_REQUEST)?;

    let result = state
        .core
        .update_record(&patient_id, &bytes, &req.filename, Some(claims.sub))
        .await
        .map_err(map_core_error)?;

    Ok(Json(UploadResponse {
        patient_id: result.patient_id,
        priority: result.priority.to_string(),
        threshold: result.threshold,
        version: result.version,
    }))
}

#[derive(Debug, Serialize)]
pub struct ReadResponse {
    pub priority: String,
    pub threshold: u8,
    pub version: u64,
    pub file_b64: String,
}

pub async fn read_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(patient_id): Path<String>,
) -> Result<Json<ReadResponse>, StatusCode> {
    let claims = require_role(&state, &headers, Role::Doctor)?;
    let result = state
        .core
        .reconstruct_latest(&patient_id, Some(claims.sub))
        .await
        .map_err(map_core_error)?;

    Ok(Json(ReadResponse {
        priority: result.priority.to_string(),
        threshold: result.threshold,
        version: result.version,
        file_b64: base64::engine::general_purpose::STANDARD.encode(result.plaintext),
    }))
}

#[derive(Debug, Serialize)]
pub struct HistoryEntryResponse {
    pub priority: String,
    pub threshold: u8,
    pub version: u64,
    pub timestamp: String,
}

pub async fn history_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(patient_id): Path<String>,
) -> Result<Json<Vec<HistoryEntryResponse>>, StatusCode> {
    require_any_authenticated(&state, &headers)?;
    let history = state
        .core
        .get_history(&patient_id)
        .await
        .map_err(map_core_error)?;

    Ok(Json(
        history
            .into_iter()
            .map(|entry| HistoryEntryResponse {
                priority: entry.priority.to_string(),
                threshold: entry.threshold,
                version: entry.version,
                timestamp: entry.timestamp.to_rfc3339(),
            })
            .collect(),
    ))
}

pub async fn health_handler() -> StatusCode {
    StatusCode::OK
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

fn require_any_authenticated(state: &AppState, headers: &HeaderMap) -> Result<Claims, StatusCode> {
    let token = bearer_token(headers).ok_or(StatusCode::UNAUTHORIZED)?;
    auth::verify_token(token, &state.jwt_secret).map_err(|_| StatusCode::UNAUTHORIZED)
}

fn require_role(state: &AppState, headers: &HeaderMap, role: Role) -> Result<Claims, StatusCode> {
    let claims = require_any_authenticated(state, headers)?;
    if claims.role != role {
        return Err(StatusCode::FORBIDDEN);
    }
    Ok(claims)
}

fn map_core_error(err: vigil_core::CoreError) -> StatusCode {
    use vigil_core::CoreError::*;
    match &err {
        InvalidArgument(_) => StatusCode::BAD_REQUEST,
        NotFound(_) => StatusCode::NOT_FOUND,
        Conflict(_) => StatusCode::CONFLICT,
        Integrity(_) => {
            warn!(error = %err, "integrity check failed");
            StatusCode::UNPROCESSABLE_ENTITY
        }
        External(_) => StatusCode::BAD_GATEWAY,
        Internal(_) | Io(_) | Json(_) => {
            warn!(error = %err, "internal error");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: vigil — threshold-custody trusted authority for versioned records.
//

//! End-to-end exercise of the HTTP surface against a tempdir-backed core:
//! login, upload, read, update, history, role enforcement.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use base64::Engine;
use serde_json::{json, Value};
use tower::ServiceExt;
use vigil_core::{FileLedgerAdapter, LedgerAdapter, LocalObjectStore, MockClassifier, PeerNmkStore, TaCore, TriageClassifier};
use vigil_platform::{create_router, AppState};
use vigil_types::Priority;

const JWT_SECRET: &str = "test-secret";

fn build_state(dir: &std::path::Path) -> AppState {
    let ledger: Arc<dyn LedgerAdapter> =
        Arc::new(FileLedgerAdapter::open(dir.join("ledger.json")).unwrap());
    let object_store = LocalObjectStore::new(dir.join("objects"));
    let peer_ids = vec!["peer1".to_string(), "peer2".to_string(), "peer3".to_string()];
    let peer_store = PeerNmkStore::open(dir.join("peers"), &peer_ids).unwrap();
    let classifier: Arc<dyn TriageClassifier> = Arc::new(MockClassifier::new(Priority::Medium));

    let core = Arc::new(TaCore::new(ledger, object_store, peer_store, classifier, peer_ids));
    AppState {
        core,
        jwt_secret: Arc::new(JWT_SECRET.to_string()),
    }
}

async fn login(app: &axum::Router, username: &str, password: &str) -> String {
    let body = json!({ "username": username, "password": password });
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/login")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    json["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_router(build_state(dir.path()));

    let body = json!({ "username": "hospital1", "password": "wrong" });
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/login")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn upload_requires_hospital_role() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_router(build_state(dir.path()));

    let token = login(&app, "doctor1", "doctor1").await;
    let body = json!({
        "filename": "record.txt",
        "file_b64": base64::engine::general_purpose::STANDARD.encode(b"hello"),
    });
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/records/patient-1/upload")
                .header("content-type", "application/json")
                .header("authorization", format!("Bearer {token}"))
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn full_upload_read_update_history_flow() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_router(build_state(dir.path()));

    let hospital_token = login(&app, "hospital1", "hospital1").await;
    let upload_body = json!({
        "filename": "record.txt",
        "file_b64": base64::engine::general_purpose::STANDARD.encode(b"first version"),
    });
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/records/patient-42/upload")
                .header("content-type", "application/json")
                .header("authorization", format!("Bearer {hospital_token}"))
                .body(Body::from(upload_body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["version"], 1);

    let doctor_token = login(&app, "doctor1", "doctor1").await;
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/records/patient-42")
                .header("authorization", format!("Bearer {doctor_token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(json["file_b64"].as_str().unwrap())
        .unwrap();
    assert_eq!(decoded, b"first version");

    let update_body = json!({
        "filename": "second.txt",
        "file_b64": base64::engine::general_purpose::STANDARD.encode(b"second version"),
    });
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/records/patient-42/update")
                .header("content-type", "application/json")
                .header("authorization", format!("Bearer {doctor_token}"))
                .body(Body::from(update_body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/records/patient-42/history")
                .header("authorization", format!("Bearer {doctor_token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let history: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(history.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn missing_bearer_token_is_unauthorized() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_router(build_state(dir.path()));

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/records/patient-1/history")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Server and service lifecycle tests
//!
//! These tests verify that:
//! - The server serves /predict over a real TCP listener
//! - The inference deadline turns a slow model into a 500
//! - A failed request leaves the service usable

use super::support::*;
use axum::http::StatusCode;
use care_label_node::api::{ApiConfig, ApiServer, AppState};
use care_label_node::vision::RawDetection;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

#[tokio::test]
async fn test_server_answers_over_tcp() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let config = ApiConfig {
        listen_addr: addr,
        max_body_bytes: TEST_BODY_LIMIT,
    };
    let state = AppState::new(service_for(Arc::new(ScriptedModel::returning(vec![])), None));
    let server = ApiServer::new(config, state);
    let handle = tokio::spawn(server.run_with_listener(listener));

    let body = "{}";
    let request = format!(
        "POST /predict HTTP/1.1\r\nHost: {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        addr,
        body.len(),
        body
    );

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request.as_bytes()).await.unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();

    assert!(response.starts_with("HTTP/1.1 400"), "response: {}", response);
    assert!(response.contains("No image provided"));

    handle.abort();
}

#[tokio::test]
async fn test_inference_timeout_is_inference_failure() {
    let model = Arc::new(
        ScriptedModel::returning(vec![RawDetection::new(1.0, [0.0, 0.0, 10.0, 10.0], 0.9)])
            .with_delay(Duration::from_millis(500)),
    );
    let service = service_for(model, Some(Duration::from_millis(50)));

    let (status, body) = service.handle(json!({ "image": label_payload() })).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Model inference failed: "));
}

#[tokio::test]
async fn test_service_recovers_after_failure() {
    let service = service_for(
        Arc::new(ScriptedModel::returning(vec![RawDetection::new(
            48.0,
            [5.0, 5.0, 45.0, 25.0],
            0.9,
        )])),
        None,
    );

    let (status, _) = service.handle(json!({"image": "***"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = service.handle(json!({ "image": label_payload() })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"][0]["desc"], "Wring gently.");
}

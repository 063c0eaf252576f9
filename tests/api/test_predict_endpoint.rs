// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /predict behaviour through the full router
//!
//! These tests verify that:
//! - A valid label returns the re-encoded image plus one item per detection
//! - Missing or falsy `image` values are a 400 with "No image provided"
//! - Undecodable payloads are a 400 with "Image decoding failed: ..."
//! - Model failures and unknown classes are a 500 with "Model inference failed: ..."
//! - Bodies that are not JSON objects are a 500 with "Unexpected error: ..."

use super::support::*;
use axum::http::StatusCode;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use care_label_node::vision::{decode_base64_image, RawDetection};
use serde_json::{json, Value};
use std::sync::atomic::Ordering;
use std::sync::Arc;

fn error_text(body: &Value) -> &str {
    body["error"].as_str().expect("error field is a string")
}

#[tokio::test]
async fn test_single_symbol_scenario() {
    let app = app_returning(vec![RawDetection::new(5.0, [10.0, 10.0, 50.0, 50.0], 0.93)]);
    let body = json!({ "image": label_payload() }).to_string();

    let (status, body) = send(app, post_json(body)).await;

    assert_eq!(status, StatusCode::OK);
    let result = body["result"].as_array().unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result[0]["desc"], "Wash at 95°C.");

    let (crop, _) = decode_base64_image(result[0]["img"].as_str().unwrap()).unwrap();
    assert_eq!(crop.dimensions(), (40, 40));

    let (original, _) = decode_base64_image(body["image"].as_str().unwrap()).unwrap();
    assert_eq!(original.dimensions(), (200, 120));
}

#[tokio::test]
async fn test_response_contains_only_image_and_result() {
    let app = app_returning(vec![RawDetection::new(28.0, [0.0, 0.0, 30.0, 30.0], 0.8)]);
    let (status, body) = send(app, post_json(json!({ "image": label_payload() }).to_string())).await;

    assert_eq!(status, StatusCode::OK);
    let mut keys: Vec<&String> = body.as_object().unwrap().keys().collect();
    keys.sort();
    assert_eq!(keys, vec!["image", "result"]);

    let item = body["result"][0].as_object().unwrap();
    let mut item_keys: Vec<&String> = item.keys().collect();
    item_keys.sort();
    assert_eq!(item_keys, vec!["desc", "img"]);
    assert!(item["img"].as_str().unwrap().starts_with("data:image/jpeg;base64,"));
}

#[tokio::test]
async fn test_detection_order_and_duplicates_preserved() {
    let app = app_returning(vec![
        RawDetection::new(28.0, [0.0, 0.0, 30.0, 30.0], 0.7),
        RawDetection::new(0.0, [40.0, 10.0, 90.0, 60.0], 0.9),
        RawDetection::new(28.0, [0.0, 0.0, 30.0, 30.0], 0.6),
    ]);
    let (status, body) = send(app, post_json(json!({ "image": label_payload() }).to_string())).await;

    assert_eq!(status, StatusCode::OK);
    let descs: Vec<&str> = body["result"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["desc"].as_str().unwrap())
        .collect();
    assert_eq!(descs, vec!["Hand wash.", "Wash at 30°C.", "Hand wash."]);
}

#[tokio::test]
async fn test_no_detections_is_empty_result() {
    let app = app_returning(vec![]);
    let (status, body) = send(app, post_json(json!({ "image": label_payload() }).to_string())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], json!([]));
    assert!(body["image"].as_str().unwrap().starts_with("data:image/jpeg;base64,"));
}

#[tokio::test]
async fn test_raw_base64_without_prefix_is_accepted() {
    let payload = label_payload();
    let raw = payload.trim_start_matches("data:image/jpeg;base64,").to_string();

    let (status, _) = send(app_returning(vec![]), post_json(json!({ "image": raw }).to_string())).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_missing_image_field() {
    let model = Arc::new(ScriptedModel::returning(vec![]));
    let (status, body) = send(app_for(Arc::clone(&model)), post_json("{}")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "No image provided"}));
    assert_eq!(model.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_falsy_image_values_count_as_missing() {
    for image in [json!(null), json!(""), json!(false), json!(0), json!([]), json!({})] {
        let body = json!({ "image": image.clone() }).to_string();
        let (status, body) = send(app_returning(vec![]), post_json(body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "image = {}", image);
        assert_eq!(error_text(&body), "No image provided", "image = {}", image);
    }
}

#[tokio::test]
async fn test_non_string_image_is_decode_failure() {
    let (status, body) = send(app_returning(vec![]), post_json(r#"{"image": 42}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error_text(&body).starts_with("Image decoding failed: "));
}

#[tokio::test]
async fn test_invalid_base64_is_decode_failure() {
    let model = Arc::new(ScriptedModel::returning(vec![]));
    let body = json!({"image": "this is not base64!!"}).to_string();
    let (status, body) = send(app_for(Arc::clone(&model)), post_json(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error_text(&body).starts_with("Image decoding failed: "));
    assert_eq!(model.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_non_image_bytes_are_decode_failure() {
    let payload = STANDARD.encode(b"hello, care label");
    let (status, body) = send(app_returning(vec![]), post_json(json!({ "image": payload }).to_string())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error_text(&body).starts_with("Image decoding failed: "));
}

#[tokio::test]
async fn test_model_failure_is_inference_failure() {
    let app = app_for(Arc::new(ScriptedModel::failing("session run failed")));
    let (status, body) = send(app, post_json(json!({ "image": label_payload() }).to_string())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error_text(&body), "Model inference failed: session run failed");
}

#[tokio::test]
async fn test_unknown_class_fails_whole_request() {
    let app = app_returning(vec![
        RawDetection::new(3.0, [0.0, 0.0, 20.0, 20.0], 0.9),
        RawDetection::new(49.0, [0.0, 0.0, 20.0, 20.0], 0.9),
    ]);
    let (status, body) = send(app, post_json(json!({ "image": label_payload() }).to_string())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(error_text(&body).starts_with("Model inference failed: "));
    assert!(body.get("result").is_none());
}

#[tokio::test]
async fn test_malformed_detection_is_inference_failure() {
    let app = app_returning(vec![RawDetection {
        bbox: None,
        class: Some(1.0),
        confidence: Some(0.5),
    }]);
    let (status, body) = send(app, post_json(json!({ "image": label_payload() }).to_string())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(error_text(&body).starts_with("Model inference failed: "));
}

#[tokio::test]
async fn test_non_json_body_is_unexpected_error() {
    let (status, body) = send(app_returning(vec![]), post_json("image=abc")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(error_text(&body).starts_with("Unexpected error: "));
}

#[tokio::test]
async fn test_json_array_body_is_unexpected_error() {
    let (status, body) = send(app_returning(vec![]), post_json("[1, 2, 3]")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(error_text(&body).starts_with("Unexpected error: "));
}

#[tokio::test]
async fn test_concurrent_requests_are_independent() {
    let model = Arc::new(ScriptedModel::returning(vec![RawDetection::new(
        12.0,
        [20.0, 20.0, 60.0, 50.0],
        0.9,
    )]));
    let app = app_for(Arc::clone(&model));
    let payload = label_payload();

    let mut handles = Vec::new();
    for i in 0..8 {
        let app = app.clone();
        let body = if i % 2 == 0 {
            json!({ "image": payload.clone() })
        } else {
            json!({})
        };
        handles.push(tokio::spawn(async move {
            (i, send(app, post_json(body.to_string())).await)
        }));
    }

    for handle in handles {
        let (i, (status, body)) = handle.await.unwrap();
        if i % 2 == 0 {
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["result"].as_array().unwrap().len(), 1);
        } else {
            assert_eq!(status, StatusCode::BAD_REQUEST);
        }
    }
    assert_eq!(model.calls.load(Ordering::SeqCst), 4);
}

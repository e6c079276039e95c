// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2025 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! Integration tests for the HTTP client using a mock Axum server.

use std::{collections::HashMap, net::SocketAddr, time::Duration};

use axum::{
    Form, Json, Router,
    extract::Query,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use reclaim_network::http::{HttpClient, HttpClientError};
use rstest::rstest;
use serde_json::{Value, json};

fn create_router() -> Router {
    Router::new()
        .route(
            "/echo",
            get(
                |headers: HeaderMap, Query(params): Query<HashMap<String, String>>| async move {
                    let agent = headers
                        .get("user-agent")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    let token = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    Json(json!({"agent": agent, "token": token, "params": params}))
                },
            ),
        )
        .route(
            "/missing",
            get(|| async { (StatusCode::NOT_FOUND, "not found").into_response() }),
        )
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                Json(json!({"late": true}))
            }),
        )
        .route(
            "/json",
            post(|Json(body): Json<Value>| async move { Json(json!({"received": body})) }),
        )
        .route(
            "/form",
            post(|Form(body): Form<HashMap<String, String>>| async move {
                Json(json!({"received": body}))
            }),
        )
}

async fn start_test_server() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind test server");
    let addr = listener.local_addr().expect("missing local addr");

    tokio::spawn(async move {
        axum::serve(listener, create_router().into_make_service())
            .await
            .expect("test server failed");
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    addr
}

#[rstest]
#[tokio::test]
async fn test_get_sends_default_headers_and_params() {
    let addr = start_test_server().await;
    let headers = HashMap::from([("Authorization".to_string(), "Bearer k".to_string())]);
    let client = HttpClient::new(headers, Some(5)).unwrap();

    let response = client
        .get(
            &format!("http://{addr}/echo"),
            Some(&[("reference", "FP-1")]),
            None,
        )
        .await
        .unwrap();

    assert!(response.is_success());
    let body: Value = response.json().unwrap();
    assert!(body["agent"].as_str().unwrap().starts_with("reclaim/"));
    assert_eq!(body["token"], "Bearer k");
    assert_eq!(body["params"]["reference"], "FP-1");
}

#[rstest]
#[tokio::test]
async fn test_non_success_status_is_returned() {
    let addr = start_test_server().await;
    let client = HttpClient::new(HashMap::new(), Some(5)).unwrap();

    let response = client
        .get(&format!("http://{addr}/missing"), None, None)
        .await
        .unwrap();

    assert_eq!(response.status.as_u16(), 404);
    match response.error_for_status() {
        Err(HttpClientError::Status { status, .. }) => assert_eq!(status, 404),
        other => panic!("expected status error, got {other:?}"),
    }
}

#[rstest]
#[tokio::test]
async fn test_timeout_is_retryable() {
    let addr = start_test_server().await;
    let client = HttpClient::new(HashMap::new(), Some(1)).unwrap();

    let error = client
        .get(&format!("http://{addr}/slow"), None, None)
        .await
        .unwrap_err();

    assert!(matches!(error, HttpClientError::Timeout(_)), "{error:?}");
    assert!(error.is_retryable());
}

#[rstest]
#[tokio::test]
async fn test_connection_refused_is_retryable() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = HttpClient::new(HashMap::new(), Some(5)).unwrap();
    let error = client
        .get(&format!("http://{addr}/echo"), None, None)
        .await
        .unwrap_err();

    assert!(matches!(error, HttpClientError::Connect(_)), "{error:?}");
    assert!(error.is_retryable());
}

#[rstest]
#[tokio::test]
async fn test_post_json_and_form() {
    let addr = start_test_server().await;
    let client = HttpClient::new(HashMap::new(), Some(5)).unwrap();

    let response = client
        .post_json(
            &format!("http://{addr}/json"),
            &json!({"transaction_id": "CP-1"}),
            None,
        )
        .await
        .unwrap();
    let body: Value = response.json().unwrap();
    assert_eq!(body["received"]["transaction_id"], "CP-1");

    let response = client
        .post_form(
            &format!("http://{addr}/form"),
            &[("apikey", "k"), ("password", "p w")],
            None,
        )
        .await
        .unwrap();
    let body: Value = response.json().unwrap();
    assert_eq!(body["received"]["password"], "p w");
}

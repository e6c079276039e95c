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

//! Integration tests for the CinetPay adapter using a mock Axum server.

use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use axum::{
    Form, Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use reclaim_cinetpay::{config::CinetPayConfig, provider::CinetPayProvider};
use reclaim_common::provider::{ProviderAdapter, ProviderError};
use reclaim_model::{
    enums::{KindProvenance, KindSelector, TransactionKind},
    identifiers::Reference,
};
use reclaim_network::http::HttpClientError;
use rstest::rstest;
use rust_decimal_macros::dec;
use serde_json::{Value, json};

const API_KEY: &str = "test-key";
const TRANSFER_PASSWORD: &str = "transfer-pass";
const TOKEN: &str = "tok-1";

#[derive(Clone, Default)]
struct TestServerState {
    logins: Arc<AtomicUsize>,
}

fn load_test_data(name: &str) -> Value {
    let content = match name {
        "payment_check_accepted" => include_str!("../test_data/payment_check_accepted.json"),
        "payment_check_not_found" => include_str!("../test_data/payment_check_not_found.json"),
        "transfer_check_validated" => include_str!("../test_data/transfer_check_validated.json"),
        _ => panic!("unknown test data {name}"),
    };
    serde_json::from_str(content).unwrap()
}

async fn handle_payment_check(Json(body): Json<Value>) -> Response {
    if body["apikey"] != API_KEY {
        return Json(json!({"code": "609", "message": "AUTH_NOT_FOUND", "data": ""}))
            .into_response();
    }

    match body["transaction_id"].as_str().unwrap_or_default() {
        "CP-20240512-0001" => Json(load_test_data("payment_check_accepted")).into_response(),
        "CP-REFUSED" => Json(json!({
            "code": "00",
            "message": "SUCCES",
            "data": {"amount": 2142, "currency": "XAF", "status": "REFUSED"}
        }))
        .into_response(),
        "CP-SLOW" => {
            tokio::time::sleep(Duration::from_secs(3)).await;
            Json(load_test_data("payment_check_accepted")).into_response()
        }
        _ => (
            StatusCode::BAD_REQUEST,
            Json(load_test_data("payment_check_not_found")),
        )
            .into_response(),
    }
}

async fn handle_login(
    State(state): State<TestServerState>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    if form.get("apikey").map(String::as_str) != Some(API_KEY)
        || form.get("password").map(String::as_str) != Some(TRANSFER_PASSWORD)
    {
        return Json(json!({"code": 701, "message": "INVALID_CREDENTIALS"})).into_response();
    }
    state.logins.fetch_add(1, Ordering::SeqCst);
    Json(json!({"code": 0, "message": "OPERATION_SUCCES", "data": {"token": TOKEN}}))
        .into_response()
}

async fn handle_transfer_check(Query(params): Query<HashMap<String, String>>) -> Response {
    if params.get("token").map(String::as_str) != Some(TOKEN) {
        return Json(json!({"code": 706, "message": "INVALID_TOKEN"})).into_response();
    }
    match params
        .get("client_transaction_id")
        .map(String::as_str)
        .unwrap_or_default()
    {
        "TR-20240512-0042" => Json(load_test_data("transfer_check_validated")).into_response(),
        _ => Json(json!({"code": 0, "message": "OPERATION_SUCCES", "data": []})).into_response(),
    }
}

async fn start_test_server(state: TestServerState) -> SocketAddr {
    let router = Router::new()
        .route("/v2/payment/check", post(handle_payment_check))
        .route("/v1/auth/login", post(handle_login))
        .route("/v1/transfer/check/money", get(handle_transfer_check))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router.into_make_service())
            .await
            .unwrap();
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    addr
}

fn provider(addr: SocketAddr, api_key: &str, transfer_password: Option<&str>) -> CinetPayProvider {
    let base_url = format!("http://{addr}");
    let config = CinetPayConfig::new(
        api_key.to_string(),
        "105890".to_string(),
        transfer_password.map(str::to_string),
        Some(base_url.clone()),
        Some(base_url),
        Some(1),
    );
    CinetPayProvider::new(config).unwrap()
}

#[rstest]
#[tokio::test]
async fn test_payment_check_accepted() {
    let addr = start_test_server(TestServerState::default()).await;
    let provider = provider(addr, API_KEY, None);

    let tx = provider
        .fetch_status(&Reference::new("CP-20240512-0001"), KindSelector::Payment)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(tx.kind(), TransactionKind::Payment);
    assert_eq!(tx.kind.provenance, KindProvenance::Declared);
    assert_eq!(tx.amount, dec!(2142));
    assert_eq!(tx.currency, "XAF");
    assert_eq!(tx.hints.email.as_deref(), Some("awa@example.com"));
    assert_eq!(tx.hints.phone.as_deref(), Some("+237670000001"));
    assert!(provider.is_successful(&tx.status));
}

#[rstest]
#[tokio::test]
async fn test_payment_check_refused_is_returned_unsuccessful() {
    let addr = start_test_server(TestServerState::default()).await;
    let provider = provider(addr, API_KEY, None);

    let tx = provider
        .fetch_status(&Reference::new("CP-REFUSED"), KindSelector::Payment)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(tx.status, "REFUSED");
    assert!(!provider.is_successful(&tx.status));
}

#[rstest]
#[tokio::test]
async fn test_payment_check_not_found() {
    let addr = start_test_server(TestServerState::default()).await;
    let provider = provider(addr, API_KEY, None);

    let result = provider
        .fetch_status(&Reference::new("CP-UNKNOWN"), KindSelector::Payment)
        .await
        .unwrap();

    assert!(result.is_none());
}

#[rstest]
#[tokio::test]
async fn test_payment_check_invalid_key() {
    let addr = start_test_server(TestServerState::default()).await;
    let provider = provider(addr, "wrong-key", None);

    let result = provider
        .fetch_status(&Reference::new("CP-20240512-0001"), KindSelector::Payment)
        .await;

    assert!(matches!(result, Err(ProviderError::Authentication(_))));
}

#[rstest]
#[tokio::test]
async fn test_payment_check_timeout_is_retryable() {
    let addr = start_test_server(TestServerState::default()).await;
    let provider = provider(addr, API_KEY, None);

    let error = provider
        .fetch_status(&Reference::new("CP-SLOW"), KindSelector::Payment)
        .await
        .unwrap_err();

    assert!(matches!(
        error,
        ProviderError::Transport(HttpClientError::Timeout(_))
    ));
    assert!(error.is_retryable());
}

#[rstest]
#[tokio::test]
async fn test_auto_falls_back_to_transfer_and_caches_token() {
    let state = TestServerState::default();
    let addr = start_test_server(state.clone()).await;
    let provider = provider(addr, API_KEY, Some(TRANSFER_PASSWORD));
    let reference = Reference::new("TR-20240512-0042");

    let tx = provider
        .fetch_status(&reference, KindSelector::Auto)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(tx.kind(), TransactionKind::Payout);
    assert_eq!(tx.kind.provenance, KindProvenance::Endpoint);
    assert_eq!(tx.amount, dec!(1500));
    assert_eq!(tx.status, "VAL");
    assert_eq!(tx.hints.phone.as_deref(), Some("+237670000002"));
    assert!(provider.is_successful(&tx.status));

    provider
        .fetch_status(&reference, KindSelector::Payout)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(state.logins.load(Ordering::SeqCst), 1);
}

#[rstest]
#[tokio::test]
async fn test_auto_payment_found_first() {
    let addr = start_test_server(TestServerState::default()).await;
    let provider = provider(addr, API_KEY, Some(TRANSFER_PASSWORD));

    let tx = provider
        .fetch_status(&Reference::new("CP-20240512-0001"), KindSelector::Auto)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(tx.kind(), TransactionKind::Payment);
    assert_eq!(tx.kind.provenance, KindProvenance::Endpoint);
}

#[rstest]
#[tokio::test]
async fn test_auto_without_transfer_credentials() {
    let addr = start_test_server(TestServerState::default()).await;
    let provider = provider(addr, API_KEY, None);

    let result = provider
        .fetch_status(&Reference::new("TR-20240512-0042"), KindSelector::Auto)
        .await
        .unwrap();

    assert!(result.is_none());
}

#[rstest]
#[tokio::test]
async fn test_payout_requires_transfer_credentials() {
    let addr = start_test_server(TestServerState::default()).await;
    let provider = provider(addr, API_KEY, None);

    let result = provider
        .fetch_status(&Reference::new("TR-20240512-0042"), KindSelector::Payout)
        .await;

    assert!(matches!(result, Err(ProviderError::Unsupported(_))));
}

#[rstest]
#[tokio::test]
async fn test_transfer_unknown_reference() {
    let addr = start_test_server(TestServerState::default()).await;
    let provider = provider(addr, API_KEY, Some(TRANSFER_PASSWORD));

    let result = provider
        .fetch_status(&Reference::new("TR-UNKNOWN"), KindSelector::Payout)
        .await
        .unwrap();

    assert!(result.is_none());
}

#[rstest]
#[tokio::test]
async fn test_transfer_login_rejected() {
    let addr = start_test_server(TestServerState::default()).await;
    let provider = provider(addr, API_KEY, Some("wrong"));

    let result = provider
        .fetch_status(&Reference::new("TR-20240512-0042"), KindSelector::Payout)
        .await;

    assert!(matches!(result, Err(ProviderError::Authentication(_))));
}

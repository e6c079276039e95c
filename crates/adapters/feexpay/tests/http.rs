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

//! Integration tests for the FeexPay adapter using a mock Axum server.

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json, Router,
    extract::Path,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use pretty_assertions::assert_eq;
use reclaim_common::provider::{ProviderAdapter, ProviderError};
use reclaim_feexpay::{config::FeexPayConfig, provider::FeexPayProvider};
use reclaim_model::{
    enums::{ClassificationConfidence, KindProvenance, KindSelector, TransactionKind},
    identifiers::Reference,
};
use reclaim_network::http::HttpClientError;
use rstest::rstest;
use rust_decimal_macros::dec;
use serde_json::{Value, json};

const API_KEY: &str = "fp-test-key";

fn load_test_data(name: &str) -> Value {
    let content = match name {
        "status_successful" => include_str!("../test_data/status_successful.json"),
        "status_payout" => include_str!("../test_data/status_payout.json"),
        _ => panic!("unknown test data {name}"),
    };
    serde_json::from_str(content).unwrap()
}

async fn handle_status(headers: HeaderMap, Path(reference): Path<String>) -> Response {
    let expected = format!("Bearer {API_KEY}");
    if headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        != Some(expected.as_str())
    {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Unauthenticated."})),
        )
            .into_response();
    }

    match reference.as_str() {
        "FP-20240512-0007" => Json(load_test_data("status_successful")).into_response(),
        "FP-20240512-0042" => Json(load_test_data("status_payout")).into_response(),
        "FP-PENDING" => Json(json!({"amount": 3000, "status": "PENDING"})).into_response(),
        "FP-EMPTY" => Json(json!({})).into_response(),
        "FP-BROKEN" => Json(json!(["not", "an", "object"])).into_response(),
        "FP-SLOW" => {
            tokio::time::sleep(Duration::from_secs(3)).await;
            Json(load_test_data("status_successful")).into_response()
        }
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({"message": "Transaction not found"})),
        )
            .into_response(),
    }
}

async fn start_test_server() -> SocketAddr {
    let router = Router::new().route(
        "/api/transactions/public/single/status/{reference}",
        get(handle_status),
    );

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

fn provider(addr: SocketAddr, api_key: &str) -> FeexPayProvider {
    let config = FeexPayConfig::new(api_key.to_string(), Some(format!("http://{addr}")), Some(1));
    FeexPayProvider::new(config).unwrap()
}

#[rstest]
#[tokio::test]
async fn test_status_payment_inferred_from_session() {
    let addr = start_test_server().await;
    let provider = provider(addr, API_KEY);

    let tx = provider
        .fetch_status(&Reference::new("FP-20240512-0007"), KindSelector::Auto)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(tx.kind(), TransactionKind::Payment);
    assert_eq!(tx.kind.provenance, KindProvenance::PayloadShape);
    assert_eq!(tx.amount, dec!(5175));
    assert_eq!(tx.session_id.as_deref(), Some("cs_5f2c81d0"));
    assert_eq!(tx.hints.email.as_deref(), Some("kofi.mensah@example.com"));
    assert_eq!(tx.hints.phone.as_deref(), Some("+22997000001"));
    assert_eq!(tx.hints.provider_user_id.as_deref(), Some("6634a1f0c2"));
    assert!(provider.is_successful(&tx.status));
}

#[rstest]
#[tokio::test]
async fn test_status_payout_inferred_from_recipient() {
    let addr = start_test_server().await;
    let provider = provider(addr, API_KEY);

    let tx = provider
        .fetch_status(&Reference::new("FP-20240512-0042"), KindSelector::Auto)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(tx.kind(), TransactionKind::Payout);
    assert_eq!(tx.kind.confidence, ClassificationConfidence::High);
    assert_eq!(tx.hints.phone.as_deref(), Some("+22997000002"));
    assert!(tx.occurred_at.is_some());
}

#[rstest]
#[tokio::test]
async fn test_status_declared_kind_wins() {
    let addr = start_test_server().await;
    let provider = provider(addr, API_KEY);

    let tx = provider
        .fetch_status(&Reference::new("FP-20240512-0042"), KindSelector::Payment)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(tx.kind(), TransactionKind::Payment);
    assert_eq!(tx.kind.provenance, KindProvenance::Declared);
}

#[rstest]
#[tokio::test]
async fn test_status_pending_is_low_confidence_and_unsuccessful() {
    let addr = start_test_server().await;
    let provider = provider(addr, API_KEY);

    let tx = provider
        .fetch_status(&Reference::new("FP-PENDING"), KindSelector::Auto)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(tx.kind.provenance, KindProvenance::FixedAmount);
    assert!(tx.kind.is_low_confidence());
    assert!(!provider.is_successful(&tx.status));
}

#[rstest]
#[case("FP-UNKNOWN")]
#[case("FP-EMPTY")]
#[tokio::test]
async fn test_status_not_found(#[case] reference: &str) {
    let addr = start_test_server().await;
    let provider = provider(addr, API_KEY);

    let result = provider
        .fetch_status(&Reference::new(reference), KindSelector::Auto)
        .await
        .unwrap();

    assert!(result.is_none());
}

#[rstest]
#[tokio::test]
async fn test_status_rejected_key() {
    let addr = start_test_server().await;
    let provider = provider(addr, "wrong-key");

    let result = provider
        .fetch_status(&Reference::new("FP-20240512-0007"), KindSelector::Auto)
        .await;

    assert!(matches!(result, Err(ProviderError::Authentication(_))));
}

#[rstest]
#[tokio::test]
async fn test_status_not_an_object() {
    let addr = start_test_server().await;
    let provider = provider(addr, API_KEY);

    let result = provider
        .fetch_status(&Reference::new("FP-BROKEN"), KindSelector::Auto)
        .await;

    assert!(matches!(result, Err(ProviderError::InvalidResponse(_))));
}

#[rstest]
#[tokio::test]
async fn test_status_timeout() {
    let addr = start_test_server().await;
    let provider = provider(addr, API_KEY);

    let result = provider
        .fetch_status(&Reference::new("FP-SLOW"), KindSelector::Auto)
        .await;

    assert!(matches!(
        result,
        Err(ProviderError::Transport(HttpClientError::Timeout(_)))
    ));
}

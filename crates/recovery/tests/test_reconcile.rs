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

//! Integration tests for reference and export reconciliation.

mod common;

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use common::{Harness, fast_config, harness};
use pretty_assertions::assert_eq;
use reclaim_common::{
    ledger::RecoveryLedger,
    provider::ProviderError,
    stubs::{StaticProviderAdapter, stub_user},
};
use reclaim_model::{
    enums::{
        ClassificationConfidence, EntitlementKind, KindProvenance, KindSelector, PlanType,
        Provider, RecoveryStatus, TransactionKind,
    },
    identifiers::{Reference, UserId},
    stubs::{stub_payment, stub_payout},
    transaction::{IdentityHints, KindClassification, ProviderTransaction},
};
use reclaim_network::http::HttpClientError;
use reclaim_recovery::{
    config::ReconciliationConfig,
    orchestrator::RecoveryError,
    report::{FailureKind, ReferenceOutcome, SkipReason},
    state::ReferenceState,
};
use rstest::rstest;
use rust_decimal_macros::dec;
use tokio_util::sync::CancellationToken;

const KNOWN_PHONE: &str = "+237670000001";

fn known_user(harness: &Harness) -> UserId {
    let user = stub_user("u-awa", Some("awa@example.com"), Some(KNOWN_PHONE));
    let id = user.id;
    harness.directory.add_user(user);
    id
}

fn phone_hints(phone: &str) -> IdentityHints {
    IdentityHints::new(None, Some(phone), None)
}

fn refs(values: &[&str]) -> Vec<Reference> {
    values.iter().map(Reference::new).collect()
}

fn low_confidence(mut transaction: ProviderTransaction) -> ProviderTransaction {
    transaction.provider = Provider::FeexPay;
    transaction.kind = KindClassification::new(
        TransactionKind::Payment,
        KindProvenance::FixedAmount,
        ClassificationConfidence::Low,
    );
    transaction
}

#[rstest]
#[tokio::test]
async fn test_restores_resolved_and_parks_unresolved(harness: Harness) {
    let user_id = known_user(&harness);
    let adapter = Arc::new(
        StaticProviderAdapter::new(Provider::CinetPay)
            .with_transaction(stub_payment("CP-1", dec!(2142), phone_hints(KNOWN_PHONE)))
            .with_transaction(stub_payment("CP-2", dec!(5175), phone_hints("+237699999999"))),
    );
    let orchestrator = harness.with_adapter(adapter);

    let report = orchestrator
        .reconcile_references(
            Provider::CinetPay,
            KindSelector::Payment,
            &refs(&["CP-1", "CP-2"]),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(report.total_processed, 2);
    assert_eq!(report.successful_recoveries, 1);
    assert_eq!(report.saved_for_later, 1);

    let restored = report.get(&Reference::new("CP-1")).unwrap();
    assert_eq!(restored.state, Some(ReferenceState::Done));
    assert!(matches!(
        restored.outcome,
        ReferenceOutcome::Restored { user_id: id, .. } if id == user_id
    ));
    assert_eq!(harness.canonical.intents().len(), 1);
    assert_eq!(harness.payments.calls().len(), 1);

    let records = harness.ledger.records().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].reference, Reference::new("CP-2"));
    assert_eq!(records[0].amount, dec!(5000));
    assert_eq!(records[0].recovery_status, RecoveryStatus::NotRestored);
}

#[rstest]
#[tokio::test]
async fn test_second_run_skips_everything(harness: Harness) {
    known_user(&harness);
    let adapter = Arc::new(
        StaticProviderAdapter::new(Provider::CinetPay)
            .with_transaction(stub_payout("TR-1", dec!(1500), phone_hints(KNOWN_PHONE)))
            .with_transaction(stub_payout("TR-2", dec!(800), phone_hints("+237699999999"))),
    );
    let orchestrator = harness.with_adapter(adapter);
    let references = refs(&["TR-1", "TR-2"]);
    let cancel = CancellationToken::new();

    let first = orchestrator
        .reconcile_references(Provider::CinetPay, KindSelector::Payout, &references, &cancel)
        .await
        .unwrap();
    let second = orchestrator
        .reconcile_references(Provider::CinetPay, KindSelector::Payout, &references, &cancel)
        .await
        .unwrap();

    assert_eq!(first.successful_recoveries, 1);
    assert_eq!(first.saved_for_later, 1);
    assert_eq!(second.skipped, 2);
    assert_eq!(second.successful_recoveries, 0);
    assert_eq!(second.saved_for_later, 0);
    assert_eq!(
        second.get(&Reference::new("TR-1")).unwrap().outcome,
        ReferenceOutcome::Skipped {
            reason: SkipReason::DuplicateCanonicalRecord
        }
    );
    assert_eq!(
        second.get(&Reference::new("TR-2")).unwrap().outcome,
        ReferenceOutcome::Skipped {
            reason: SkipReason::AlreadyKnown
        }
    );
    assert_eq!(harness.canonical.transactions().len(), 1);
    assert_eq!(harness.ledger.records().unwrap().len(), 1);
    assert_eq!(
        harness.directory.balance(&UserId::new("u-awa")),
        Some(dec!(-1500))
    );
}

#[rstest]
#[tokio::test]
async fn test_duplicate_input_is_fetched_once(harness: Harness) {
    let adapter = Arc::new(
        StaticProviderAdapter::new(Provider::CinetPay)
            .with_transaction(stub_payment("CP-1", dec!(2142), phone_hints("+237699999999"))),
    );
    let orchestrator = harness.with_adapter(adapter.clone());

    let report = orchestrator
        .reconcile_references(
            Provider::CinetPay,
            KindSelector::Payment,
            &refs(&["CP-1", "CP-1"]),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(report.saved_for_later, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(
        report.references[1].outcome,
        ReferenceOutcome::Skipped {
            reason: SkipReason::DuplicateInput
        }
    );
    assert_eq!(adapter.calls().len(), 1);
}

#[rstest]
#[tokio::test]
async fn test_unknown_and_rejected_references(harness: Harness) {
    let mut refused = stub_payment("CP-REFUSED", dec!(2142), phone_hints(KNOWN_PHONE));
    refused.status = "REFUSED".to_string();
    let adapter = Arc::new(StaticProviderAdapter::new(Provider::CinetPay).with_transaction(refused));
    let orchestrator = harness.with_adapter(adapter);

    let report = orchestrator
        .reconcile_references(
            Provider::CinetPay,
            KindSelector::Payment,
            &refs(&["CP-MISSING", "CP-REFUSED"]),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(
        report.references[0].outcome,
        ReferenceOutcome::Failed {
            kind: FailureKind::NotFound
        }
    );
    assert_eq!(report.references[0].state, Some(ReferenceState::Error));
    assert_eq!(
        report.references[1].outcome,
        ReferenceOutcome::Skipped {
            reason: SkipReason::ProviderRejected
        }
    );
    assert_eq!(report.error_references, refs(&["CP-MISSING"]));
    assert!(harness.ledger.records().unwrap().is_empty());
}

#[rstest]
#[tokio::test]
async fn test_timeouts_are_reported_apart_from_errors(harness: Harness) {
    let adapter = Arc::new(
        StaticProviderAdapter::new(Provider::CinetPay)
            .with_transaction(stub_payment("CP-SLOW", dec!(2142), phone_hints(KNOWN_PHONE)))
            .with_delay(Reference::new("CP-SLOW"), Duration::from_secs(3))
            .with_response(
                Reference::new("CP-DNS"),
                Err(ProviderError::Transport(HttpClientError::Connect(
                    "dns error".to_string(),
                ))),
            )
            .with_response(
                Reference::new("CP-AUTH"),
                Err(ProviderError::Authentication("bad key".to_string())),
            ),
    );
    let orchestrator = harness.with_adapter(adapter);

    let report = orchestrator
        .reconcile_references(
            Provider::CinetPay,
            KindSelector::Payment,
            &refs(&["CP-SLOW", "CP-DNS", "CP-AUTH"]),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(report.timed_out, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.timeout_references, refs(&["CP-SLOW", "CP-DNS"]));
    assert_eq!(report.error_references, refs(&["CP-AUTH"]));
    assert_eq!(report.references[0].state, Some(ReferenceState::Timeout));
    assert_eq!(
        report.references[2].outcome,
        ReferenceOutcome::Failed {
            kind: FailureKind::Provider
        }
    );
}

#[rstest]
#[tokio::test]
async fn test_low_confidence_is_rejected(harness: Harness) {
    let adapter = Arc::new(StaticProviderAdapter::new(Provider::FeexPay).with_transaction(
        low_confidence(stub_payment("FP-1", dec!(2142), phone_hints("+22997000001"))),
    ));
    let orchestrator = harness.with_adapter(adapter);

    let report = orchestrator
        .reconcile_references(
            Provider::FeexPay,
            KindSelector::Auto,
            &refs(&["FP-1"]),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(
        report.references[0].outcome,
        ReferenceOutcome::Failed {
            kind: FailureKind::ClassificationRejected
        }
    );
    assert!(harness.ledger.records().unwrap().is_empty());
}

#[rstest]
#[tokio::test]
async fn test_low_confidence_accepted_when_allowed(harness: Harness) {
    let adapter = Arc::new(StaticProviderAdapter::new(Provider::FeexPay).with_transaction(
        low_confidence(stub_payment("FP-1", dec!(2142), phone_hints("+22997000001"))),
    ));
    let config = ReconciliationConfig::new(None, Some(0), Some(1), Some(false), None);
    let orchestrator = harness.orchestrator(config).with_adapter(adapter);

    let report = orchestrator
        .reconcile_references(
            Provider::FeexPay,
            KindSelector::Auto,
            &refs(&["FP-1"]),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(report.saved_for_later, 1);
    let records = harness.ledger.records().unwrap();
    assert_eq!(records[0].provider, Provider::FeexPay);
    assert_eq!(records[0].plan_type, Some(PlanType::Classique));
}

#[rstest]
#[tokio::test]
async fn test_entitlement_conflict_is_skipped(harness: Harness) {
    let user_id = known_user(&harness);
    harness.directory.grant(user_id, EntitlementKind::Cible);
    let adapter = Arc::new(
        StaticProviderAdapter::new(Provider::CinetPay)
            .with_transaction(stub_payment("CP-UP", dec!(3105), phone_hints(KNOWN_PHONE))),
    );
    let orchestrator = harness.with_adapter(adapter);

    let report = orchestrator
        .reconcile_references(
            Provider::CinetPay,
            KindSelector::Payment,
            &refs(&["CP-UP"]),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(
        report.references[0].outcome,
        ReferenceOutcome::Skipped {
            reason: SkipReason::EntitlementConflict
        }
    );
    assert!(harness.canonical.intents().is_empty());
    assert!(harness.payments.calls().is_empty());
}

#[rstest]
#[tokio::test]
async fn test_cancelled_run_processes_nothing(harness: Harness) {
    let adapter = Arc::new(StaticProviderAdapter::new(Provider::CinetPay));
    let orchestrator = harness.with_adapter(adapter.clone());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let report = orchestrator
        .reconcile_references(
            Provider::CinetPay,
            KindSelector::Payment,
            &refs(&["CP-1", "CP-2"]),
            &cancel,
        )
        .await
        .unwrap();

    assert_eq!(report.total_processed, 0);
    assert_eq!(report.cancelled, 2);
    assert_eq!(report.failed, 0);
    assert!(adapter.calls().is_empty());
}

#[rstest]
#[tokio::test]
async fn test_missing_adapter(harness: Harness) {
    let orchestrator = harness.orchestrator(fast_config());

    let result = orchestrator
        .reconcile_references(
            Provider::FeexPay,
            KindSelector::Auto,
            &refs(&["FP-1"]),
            &CancellationToken::new(),
        )
        .await;

    assert!(matches!(result, Err(RecoveryError::NoAdapter(Provider::FeexPay))));
}

#[rstest]
#[tokio::test]
async fn test_export_rows_are_trusted_in_batches(harness: Harness) {
    known_user(&harness);
    let adapter = Arc::new(StaticProviderAdapter::new(Provider::CinetPay));
    let orchestrator = harness.with_adapter(adapter.clone());
    let rows = vec![
        stub_payment("CP-1", dec!(2142), phone_hints(KNOWN_PHONE)),
        stub_payment("CP-2", dec!(2142), phone_hints("+237699999991")),
        stub_payment("CP-3", dec!(5175), phone_hints("+237699999992")),
        stub_payment("CP-2", dec!(2142), phone_hints("+237699999991")),
    ];

    let report = orchestrator
        .reconcile_export(rows, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.total_processed, 4);
    assert_eq!(report.successful_recoveries, 1);
    assert_eq!(report.saved_for_later, 2);
    assert_eq!(
        report.references[3].outcome,
        ReferenceOutcome::Skipped {
            reason: SkipReason::DuplicateInput
        }
    );
    assert!(adapter.calls().is_empty());
    assert_eq!(harness.ledger.statistics().await.unwrap().not_restored(), 2);
}

#[rstest]
#[tokio::test]
async fn test_export_rows_verified_against_provider(harness: Harness) {
    let mut live = stub_payment("CP-1", dec!(2142), phone_hints("+237699999991"));
    live.status = "REFUSED".to_string();
    let adapter = Arc::new(StaticProviderAdapter::new(Provider::CinetPay).with_transaction(live));
    let config = ReconciliationConfig::new(Some(1), Some(0), Some(1), None, Some(true));
    let orchestrator = harness.orchestrator(config).with_adapter(adapter.clone());
    let rows = vec![stub_payment("CP-1", dec!(2142), phone_hints("+237699999991"))];

    let report = orchestrator
        .reconcile_export(rows, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(
        adapter.calls(),
        vec![(Reference::new("CP-1"), KindSelector::Payment)]
    );
    assert_eq!(
        report.references[0].outcome,
        ReferenceOutcome::Skipped {
            reason: SkipReason::ProviderRejected
        }
    );
    assert!(harness.ledger.records().unwrap().is_empty());
}

#[rstest]
#[tokio::test]
async fn test_reference_list_is_fetched_in_throttled_batches(harness: Harness) {
    known_user(&harness);
    let adapter = Arc::new(
        StaticProviderAdapter::new(Provider::CinetPay)
            .with_transaction(stub_payment("CP-1", dec!(2142), phone_hints(KNOWN_PHONE)))
            .with_transaction(stub_payment("CP-2", dec!(2142), phone_hints("+237699999991")))
            .with_transaction(stub_payment("CP-4", dec!(5175), phone_hints("+237699999992"))),
    );
    let config = ReconciliationConfig::new(Some(2), Some(50), Some(1), None, None);
    let orchestrator = harness.orchestrator(config).with_adapter(adapter.clone());
    let references = refs(&["CP-1", "CP-2", "CP-3", "CP-2", "CP-4"]);

    let started = Instant::now();
    let report = orchestrator
        .reconcile_reference_batches(
            Provider::CinetPay,
            KindSelector::Payment,
            &references,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    // Three batches, two pauses
    assert!(started.elapsed() >= Duration::from_millis(100));
    assert_eq!(report.total_processed, 5);
    assert_eq!(report.successful_recoveries, 1);
    assert_eq!(report.saved_for_later, 2);
    assert_eq!(
        report.references[3].outcome,
        ReferenceOutcome::Skipped {
            reason: SkipReason::DuplicateInput
        }
    );
    assert_eq!(
        adapter.calls(),
        vec![
            (Reference::new("CP-1"), KindSelector::Payment),
            (Reference::new("CP-2"), KindSelector::Payment),
            (Reference::new("CP-3"), KindSelector::Payment),
            (Reference::new("CP-4"), KindSelector::Payment),
        ]
    );
}

#[rstest]
#[tokio::test]
async fn test_reference_batches_cancelled_between_batches(harness: Harness) {
    let adapter = Arc::new(StaticProviderAdapter::new(Provider::CinetPay));
    let config = ReconciliationConfig::new(Some(1), Some(60_000), Some(1), None, None);
    let orchestrator = harness.orchestrator(config).with_adapter(adapter.clone());
    let cancel = CancellationToken::new();
    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let report = orchestrator
        .reconcile_reference_batches(
            Provider::CinetPay,
            KindSelector::Auto,
            &refs(&["CP-1", "CP-2", "CP-3"]),
            &cancel,
        )
        .await
        .unwrap();

    assert_eq!(adapter.calls().len(), 1);
    assert_eq!(report.cancelled, 2);
}

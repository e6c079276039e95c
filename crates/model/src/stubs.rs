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

//! Type stubs to facilitate testing.

use chrono::{TimeZone, Utc};
use rstest::fixture;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;

use crate::{
    enums::{Provider, TransactionKind},
    identifiers::Reference,
    payload::ProviderPayload,
    record::RecoveryRecord,
    transaction::{IdentityHints, KindClassification, ProviderTransaction},
};

/// Builds a successful CinetPay payment for `reference`, `amount` and `hints`.
#[must_use]
pub fn stub_payment(reference: &str, amount: Decimal, hints: IdentityHints) -> ProviderTransaction {
    ProviderTransaction {
        provider: Provider::CinetPay,
        reference: Reference::new(reference),
        kind: KindClassification::declared(TransactionKind::Payment),
        status: "ACCEPTED".to_string(),
        amount,
        currency: "XAF".to_string(),
        hints,
        session_id: None,
        occurred_at: Utc.with_ymd_and_hms(2024, 5, 12, 9, 30, 0).single(),
        payload: ProviderPayload::CinetPayPayment(json!({
            "cpm_trans_id": reference,
            "amount": amount.to_string(),
            "currency": "XAF",
            "status": "ACCEPTED",
        })),
    }
}

/// Builds a successful CinetPay transfer for `reference`, `amount` and `hints`.
#[must_use]
pub fn stub_payout(reference: &str, amount: Decimal, hints: IdentityHints) -> ProviderTransaction {
    ProviderTransaction {
        provider: Provider::CinetPay,
        reference: Reference::new(reference),
        kind: KindClassification::declared(TransactionKind::Payout),
        status: "VAL".to_string(),
        amount,
        currency: "XAF".to_string(),
        hints,
        session_id: None,
        occurred_at: Utc.with_ymd_and_hms(2024, 5, 12, 10, 0, 0).single(),
        payload: ProviderPayload::CinetPayTransfer(json!({
            "client_transaction_id": reference,
            "amount": amount.to_string(),
            "treatment_status": "VAL",
        })),
    }
}

#[fixture]
pub fn provider_transaction_payment() -> ProviderTransaction {
    stub_payment(
        "CP-20240512-0001",
        dec!(2142),
        IdentityHints::new(None, Some("+237670000001"), None),
    )
}

#[fixture]
pub fn provider_transaction_payout() -> ProviderTransaction {
    stub_payout(
        "TR-20240512-0042",
        dec!(1500),
        IdentityHints::new(Some("awa@example.com"), Some("+237670000001"), None),
    )
}

#[fixture]
pub fn recovery_record(provider_transaction_payment: ProviderTransaction) -> RecoveryRecord {
    RecoveryRecord::from_transaction(&provider_transaction_payment, Utc::now())
}

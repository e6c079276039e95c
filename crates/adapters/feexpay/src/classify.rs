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

//! Transaction kind inference for the unified FeexPay status endpoint.

use reclaim_model::{
    enums::{ClassificationConfidence, KindProvenance, KindSelector, TransactionKind},
    pricing::is_plan_amount,
    transaction::KindClassification,
};
use rust_decimal::Decimal;
use serde_json::Value;

/// Returns the session identifier carried by a payment payload, if any.
#[must_use]
pub fn session_id(payload: &Value) -> Option<String> {
    payload
        .pointer("/callback_info/sessionId")
        .or_else(|| payload.pointer("/callback_info/session_id"))
        .or_else(|| payload.get("custom_id"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Returns the plain recipient carried by a payout payload, if any.
#[must_use]
pub fn recipient(payload: &Value) -> Option<String> {
    ["receiver", "recipient"].iter().find_map(|key| match payload.get(*key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Classifies a FeexPay transaction.
///
/// Evidence is applied in decreasing strength: a declared kind, then the payload shape, then
/// the fixed plan amounts. Amount and fallback classifications are low confidence.
#[must_use]
pub fn classify(selector: KindSelector, payload: &Value, amount: Decimal) -> KindClassification {
    if let Some(kind) = selector.declared() {
        return KindClassification::declared(kind);
    }

    if session_id(payload).is_some() {
        return KindClassification::new(
            TransactionKind::Payment,
            KindProvenance::PayloadShape,
            ClassificationConfidence::High,
        );
    }

    if recipient(payload).is_some() {
        return KindClassification::new(
            TransactionKind::Payout,
            KindProvenance::PayloadShape,
            ClassificationConfidence::High,
        );
    }

    if is_plan_amount(amount) {
        return KindClassification::new(
            TransactionKind::Payment,
            KindProvenance::FixedAmount,
            ClassificationConfidence::Low,
        );
    }

    KindClassification::new(
        TransactionKind::Payout,
        KindProvenance::Fallback,
        ClassificationConfidence::Low,
    )
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use serde_json::json;

    use super::*;

    #[rstest]
    #[case(KindSelector::Payout, json!({"custom_id": "sess-1"}), dec!(2142), TransactionKind::Payout, KindProvenance::Declared, ClassificationConfidence::High)]
    #[case(KindSelector::Auto, json!({"callback_info": {"sessionId": "sess-1"}, "receiver": "22997000001"}), dec!(1000), TransactionKind::Payment, KindProvenance::PayloadShape, ClassificationConfidence::High)]
    #[case(KindSelector::Auto, json!({"custom_id": "sess-2"}), dec!(1000), TransactionKind::Payment, KindProvenance::PayloadShape, ClassificationConfidence::High)]
    #[case(KindSelector::Auto, json!({"receiver": 22997000001u64}), dec!(2142), TransactionKind::Payout, KindProvenance::PayloadShape, ClassificationConfidence::High)]
    #[case(KindSelector::Auto, json!({"custom_id": "  "}), dec!(5175), TransactionKind::Payment, KindProvenance::FixedAmount, ClassificationConfidence::Low)]
    #[case(KindSelector::Auto, json!({}), dec!(3000), TransactionKind::Payment, KindProvenance::FixedAmount, ClassificationConfidence::Low)]
    #[case(KindSelector::Auto, json!({}), dec!(1234), TransactionKind::Payout, KindProvenance::Fallback, ClassificationConfidence::Low)]
    fn test_classify(
        #[case] selector: KindSelector,
        #[case] payload: Value,
        #[case] amount: Decimal,
        #[case] kind: TransactionKind,
        #[case] provenance: KindProvenance,
        #[case] confidence: ClassificationConfidence,
    ) {
        assert_eq!(
            classify(selector, &payload, amount),
            KindClassification::new(kind, provenance, confidence)
        );
    }

    #[rstest]
    fn test_session_id_sources() {
        assert_eq!(
            session_id(&json!({"callback_info": {"session_id": "s-9"}})).as_deref(),
            Some("s-9")
        );
        assert_eq!(session_id(&json!({"callback_info": "opaque"})), None);
    }
}

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

//! Normalization of CinetPay API payloads into [`ProviderTransaction`]s.

use reclaim_common::provider::ProviderError;
use reclaim_model::{
    enums::Provider,
    identifiers::Reference,
    payload::ProviderPayload,
    phone::{CountryCode, normalize_phone},
    transaction::{IdentityHints, KindClassification, ProviderTransaction},
};
use serde_json::Value;

use super::models::{CinetPayPaymentData, CinetPayTransferData};
use crate::common::{
    consts::CINETPAY_DEFAULT_CURRENCY,
    parse::{parse_datetime, parse_metadata},
};

fn country_of(prefix: Option<&str>, operator: Option<&str>) -> Option<CountryCode> {
    prefix
        .and_then(CountryCode::from_dialing_code)
        .or_else(|| operator.and_then(CountryCode::from_operator))
}

fn currency_of(currency: Option<&str>, country: Option<CountryCode>) -> String {
    match currency.map(str::trim).filter(|c| !c.is_empty()) {
        Some(currency) => currency.to_ascii_uppercase(),
        None => country
            .map_or(CINETPAY_DEFAULT_CURRENCY, CountryCode::default_currency)
            .to_string(),
    }
}

/// Parses the `data` object of a payment check.
///
/// # Errors
///
/// Returns an error if the payload is not an object or carries no amount.
pub fn parse_payment_transaction(
    reference: &Reference,
    classification: KindClassification,
    raw: Value,
) -> Result<ProviderTransaction, ProviderError> {
    let data: CinetPayPaymentData = serde_json::from_value(raw.clone())?;
    let amount = data.amount.ok_or_else(|| {
        ProviderError::InvalidResponse(format!("payment {reference} has no amount"))
    })?;

    let prefix = data
        .customer_phone_prefix
        .as_deref()
        .or(data.phone_prefix.as_deref());
    let country = country_of(prefix, data.payment_method.as_deref());
    let customer_phone = data
        .customer_phone_number
        .as_deref()
        .and_then(|number| normalize_phone(number, country));

    let metadata = parse_metadata(data.metadata.as_ref());
    let hints = IdentityHints::new(
        metadata.email.as_deref(),
        metadata.phone.as_deref(),
        metadata.user_id.as_deref(),
    )
    .with_email(data.customer_email.as_deref())
    .with_phone(customer_phone.as_deref());

    Ok(ProviderTransaction {
        provider: Provider::CinetPay,
        reference: *reference,
        kind: classification,
        status: data.status.unwrap_or_default().trim().to_ascii_uppercase(),
        amount,
        currency: currency_of(data.currency.as_deref(), country),
        hints,
        session_id: None,
        occurred_at: data.payment_date.as_deref().and_then(parse_datetime),
        payload: ProviderPayload::CinetPayPayment(raw),
    })
}

/// Selects the transfer matching `reference` from the `data` array of a transfer check.
#[must_use]
pub fn select_transfer(reference: &Reference, data: Value) -> Option<Value> {
    let items = match data {
        Value::Array(items) => items,
        Value::Object(_) => vec![data],
        _ => return None,
    };
    let matches_reference = |item: &Value| {
        item.get("client_transaction_id")
            .and_then(Value::as_str)
            .is_some_and(|id| id == reference.as_str())
    };
    let position = items.iter().position(matches_reference).unwrap_or(0);
    items.into_iter().nth(position)
}

/// Parses one transfer of a transfer check.
///
/// # Errors
///
/// Returns an error if the payload is not an object or carries no amount.
pub fn parse_transfer_transaction(
    reference: &Reference,
    classification: KindClassification,
    raw: Value,
) -> Result<ProviderTransaction, ProviderError> {
    let data: CinetPayTransferData = serde_json::from_value(raw.clone())?;
    let amount = data.amount.ok_or_else(|| {
        ProviderError::InvalidResponse(format!("transfer {reference} has no amount"))
    })?;

    let country = country_of(data.prefix.as_deref(), None);
    let receiver = data
        .receiver_e164
        .as_deref()
        .and_then(|number| normalize_phone(number, None))
        .or_else(|| {
            data.receiver
                .as_deref()
                .and_then(|number| normalize_phone(number, country))
        });

    Ok(ProviderTransaction {
        provider: Provider::CinetPay,
        reference: *reference,
        kind: classification,
        status: data
            .treatment_status
            .unwrap_or_default()
            .trim()
            .to_ascii_uppercase(),
        amount,
        currency: currency_of(data.currency.as_deref(), country),
        hints: IdentityHints::new(None, receiver.as_deref(), None),
        session_id: None,
        occurred_at: data.validated_at.as_deref().and_then(parse_datetime),
        payload: ProviderPayload::CinetPayTransfer(raw),
    })
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use reclaim_model::{
        enums::TransactionKind,
        identifiers::stubs::{reference, reference_payout},
    };
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use serde_json::json;

    use super::*;

    #[rstest]
    fn test_parse_payment_with_prefix_and_metadata(reference: Reference) {
        let raw = json!({
            "amount": "2142",
            "currency": "XAF",
            "status": "ACCEPTED",
            "payment_method": "OMCM",
            "payment_date": "2024-05-12 10:31:02",
            "metadata": "{\"email\":\"Awa@Example.com\"}",
            "customer_phone_number": "670000001",
            "customer_phone_prefix": "237"
        });
        let tx = parse_payment_transaction(
            &reference,
            KindClassification::declared(TransactionKind::Payment),
            raw.clone(),
        )
        .unwrap();

        assert_eq!(tx.amount, dec!(2142));
        assert_eq!(tx.status, "ACCEPTED");
        assert_eq!(tx.hints.email.as_deref(), Some("awa@example.com"));
        assert_eq!(tx.hints.phone.as_deref(), Some("+237670000001"));
        assert!(tx.occurred_at.is_some());
        assert_eq!(tx.payload, ProviderPayload::CinetPayPayment(raw));
    }

    #[rstest]
    fn test_parse_payment_country_from_operator(reference: Reference) {
        let raw = json!({
            "amount": 5175,
            "status": "accepted",
            "payment_method": "WAVECI",
            "customer_phone_number": "0701020304"
        });
        let tx = parse_payment_transaction(
            &reference,
            KindClassification::declared(TransactionKind::Payment),
            raw,
        )
        .unwrap();

        assert_eq!(tx.status, "ACCEPTED");
        assert_eq!(tx.currency, "XOF");
        assert_eq!(tx.hints.phone.as_deref(), Some("+2250701020304"));
    }

    #[rstest]
    fn test_parse_payment_without_amount(reference: Reference) {
        let result = parse_payment_transaction(
            &reference,
            KindClassification::declared(TransactionKind::Payment),
            json!({"status": "ACCEPTED"}),
        );
        assert!(matches!(result, Err(ProviderError::InvalidResponse(_))));
    }

    #[rstest]
    fn test_select_transfer_prefers_matching_reference(reference_payout: Reference) {
        let data = json!([
            {"client_transaction_id": "TR-OTHER", "amount": 1},
            {"client_transaction_id": reference_payout.as_str(), "amount": 2}
        ]);
        let selected = select_transfer(&reference_payout, data).unwrap();
        assert_eq!(selected["amount"], 2);
        assert_eq!(select_transfer(&reference_payout, json!([])), None);
    }

    #[rstest]
    fn test_parse_transfer(reference_payout: Reference) {
        let raw = json!({
            "amount": "1500",
            "receiver": "670000002",
            "prefix": "237",
            "treatment_status": "VAL",
            "client_transaction_id": reference_payout.as_str(),
            "validated_at": "2024-05-12 11:00:00"
        });
        let tx = parse_transfer_transaction(
            &reference_payout,
            KindClassification::declared(TransactionKind::Payout),
            raw,
        )
        .unwrap();

        assert_eq!(tx.kind(), TransactionKind::Payout);
        assert_eq!(tx.status, "VAL");
        assert_eq!(tx.currency, "XAF");
        assert_eq!(tx.hints.phone.as_deref(), Some("+237670000002"));
    }
}

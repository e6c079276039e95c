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

//! The FeexPay [`ProviderAdapter`].

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use reclaim_common::provider::{ProviderAdapter, ProviderError};
use reclaim_model::{
    enums::{KindSelector, Provider},
    identifiers::Reference,
    payload::ProviderPayload,
    phone::{CountryCode, digits_only, normalize_phone},
    transaction::{IdentityHints, ProviderTransaction},
};
use serde_json::Value;

use crate::{
    classify::{classify, recipient, session_id},
    config::FeexPayConfig,
    http::{client::FeexPayHttpClient, models::FeexPayStatus},
};

/// Statuses of a completed FeexPay transaction.
pub const FEEXPAY_SUCCESS_STATUSES: [&str; 2] = ["SUCCESSFUL", "SUCCESS"];

/// FeexPay operates primarily in Benin.
const FEEXPAY_DEFAULT_COUNTRY: CountryCode = CountryCode::BJ;

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw.trim(), "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.and_utc())
        })
}

fn normalize(raw: &str) -> Option<String> {
    let country = if CountryCode::from_number(&digits_only(raw)).is_some() {
        None
    } else {
        Some(FEEXPAY_DEFAULT_COUNTRY)
    };
    normalize_phone(raw, country)
}

/// Normalizes a FeexPay status object, inferring the transaction kind when not declared.
///
/// # Errors
///
/// Returns an error if the object carries no amount.
pub fn parse_status(
    reference: &Reference,
    selector: KindSelector,
    raw: Value,
) -> Result<ProviderTransaction, ProviderError> {
    let status: FeexPayStatus = serde_json::from_value(raw.clone())?;
    let amount = status.amount.ok_or_else(|| {
        ProviderError::InvalidResponse(format!("transaction {reference} has no amount"))
    })?;
    let classification = classify(selector, &raw, amount);
    let callback = status.callback();

    let phone = callback
        .phone
        .as_deref()
        .or(status.phone.as_deref())
        .and_then(normalize)
        .or_else(|| recipient(&raw).as_deref().and_then(normalize));
    let hints = IdentityHints::new(
        callback.email.as_deref(),
        phone.as_deref(),
        callback.user_id.as_deref(),
    )
    .with_email(status.email.as_deref());

    Ok(ProviderTransaction {
        provider: Provider::FeexPay,
        reference: *reference,
        kind: classification,
        status: status.status.unwrap_or_default().trim().to_ascii_uppercase(),
        amount,
        currency: status
            .currency
            .map(|c| c.trim().to_ascii_uppercase())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| FEEXPAY_DEFAULT_COUNTRY.default_currency().to_string()),
        hints,
        session_id: session_id(&raw),
        occurred_at: status.created_at.as_deref().and_then(parse_timestamp),
        payload: ProviderPayload::FeexPay(raw),
    })
}

/// Status adapter for the unified FeexPay endpoint.
#[derive(Debug)]
pub struct FeexPayProvider {
    client: FeexPayHttpClient,
}

impl FeexPayProvider {
    /// Creates a new [`FeexPayProvider`] instance.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: FeexPayConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: FeexPayHttpClient::new(config)?,
        })
    }
}

#[async_trait]
impl ProviderAdapter for FeexPayProvider {
    fn provider(&self) -> Provider {
        Provider::FeexPay
    }

    async fn fetch_status(
        &self,
        reference: &Reference,
        selector: KindSelector,
    ) -> Result<Option<ProviderTransaction>, ProviderError> {
        self.client
            .get_status(reference)
            .await?
            .map(|raw| parse_status(reference, selector, raw))
            .transpose()
    }

    fn is_successful(&self, status: &str) -> bool {
        let status = status.trim();
        FEEXPAY_SUCCESS_STATUSES
            .iter()
            .any(|s| status.eq_ignore_ascii_case(s))
    }
}

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

//! Provides the HTTP client for the [CinetPay](https://cinetpay.com) payment and transfer APIs.
//!
//! CinetPay API reference <https://docs.cinetpay.com/>.

use std::{
    collections::HashMap,
    fmt::Debug,
    time::{Duration, Instant},
};

use reclaim_common::provider::ProviderError;
use reclaim_core::consts::RECLAIM_USER_AGENT;
use reclaim_model::{enums::Provider, identifiers::Reference};
use reclaim_network::http::{HttpClient, HttpClientError, HttpResponse};
use serde_json::Value;
use tokio::sync::Mutex;

use super::models::{
    CinetPayLoginData, CinetPayLoginRequest, CinetPayPaymentCheckRequest, CinetPayResponse,
};
use crate::{
    common::{
        consts::{
            CINETPAY_CODE_NOT_FOUND, CINETPAY_CODE_OK, CINETPAY_TOKEN_TTL_SECS,
            CINETPAY_TRANSFER_CODE_OK,
        },
        urls::{payment_check_url, transfer_check_url, transfer_login_url},
    },
    config::CinetPayConfig,
    http::parse::select_transfer,
};

/// Payment check codes signalling rejected merchant credentials.
const AUTHENTICATION_CODES: [&str; 2] = ["608", "609"];

#[derive(Clone, Debug)]
struct CachedToken {
    value: String,
    acquired_at: Instant,
}

impl CachedToken {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.acquired_at.elapsed() < ttl
    }
}

/// HTTP client for the CinetPay payment check and transfer APIs.
pub struct CinetPayHttpClient {
    config: CinetPayConfig,
    client: HttpClient,
    token: Mutex<Option<CachedToken>>,
    token_ttl: Duration,
}

impl Debug for CinetPayHttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(CinetPayHttpClient))
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl CinetPayHttpClient {
    /// Creates a new [`CinetPayHttpClient`] instance.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: CinetPayConfig) -> Result<Self, ProviderError> {
        let client = HttpClient::new(Self::default_headers(), Some(config.timeout_secs))?;
        Ok(Self {
            config,
            client,
            token: Mutex::new(None),
            token_ttl: Duration::from_secs(CINETPAY_TOKEN_TTL_SECS),
        })
    }

    #[must_use]
    pub fn config(&self) -> &CinetPayConfig {
        &self.config
    }

    fn default_headers() -> HashMap<String, String> {
        HashMap::from([("User-Agent".to_string(), RECLAIM_USER_AGENT.to_string())])
    }

    fn api_error(code: &str, message: String) -> ProviderError {
        ProviderError::Api {
            provider: Provider::CinetPay,
            code: code.to_string(),
            message,
        }
    }

    /// Decodes the CinetPay envelope, which is also sent with non-2xx statuses.
    fn decode_envelope(response: HttpResponse) -> Result<CinetPayResponse, ProviderError> {
        let is_success = response.is_success();
        match response.json::<CinetPayResponse>() {
            Ok(envelope) => Ok(envelope),
            Err(e) if is_success => Err(ProviderError::InvalidResponse(e.to_string())),
            Err(_) => Err(ProviderError::Transport(HttpClientError::Status {
                status: response.status.as_u16(),
                body: response.text(),
            })),
        }
    }

    /// Checks a collection by its merchant transaction ID.
    ///
    /// Returns the raw `data` object, or `None` when CinetPay does not know the transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails or CinetPay answers with an error code.
    pub async fn check_payment(&self, reference: &Reference) -> Result<Option<Value>, ProviderError> {
        let request = CinetPayPaymentCheckRequest {
            apikey: &self.config.api_key,
            site_id: &self.config.site_id,
            transaction_id: reference.as_str(),
        };
        let url = payment_check_url(&self.config.base_url);
        tracing::debug!("Checking CinetPay payment {reference}");

        let response = self.client.post_json(&url, &request, None).await?;
        let envelope = Self::decode_envelope(response)?;

        match envelope.code.as_str() {
            CINETPAY_CODE_OK => envelope.data.filter(Value::is_object).map(Some).ok_or_else(|| {
                ProviderError::InvalidResponse(format!("payment {reference} returned no data"))
            }),
            CINETPAY_CODE_NOT_FOUND => Ok(None),
            code if AUTHENTICATION_CODES.contains(&code) => {
                Err(ProviderError::Authentication(envelope.detail()))
            }
            code => Err(Self::api_error(code, envelope.detail())),
        }
    }

    /// Returns a transfer API token, logging in when no fresh token is cached.
    async fn token(&self) -> Result<String, ProviderError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref()
            && token.is_fresh(self.token_ttl)
        {
            return Ok(token.value.clone());
        }

        let password = self.config.transfer_password.as_deref().ok_or_else(|| {
            ProviderError::Unsupported("CinetPay transfer password not configured".to_string())
        })?;
        let form = CinetPayLoginRequest {
            apikey: &self.config.api_key,
            password,
        };
        let url = transfer_login_url(&self.config.transfer_base_url);
        tracing::debug!("Logging in to CinetPay transfer API");

        let response = self.client.post_form(&url, &form, None).await?;
        let envelope = Self::decode_envelope(response)?;
        if envelope.code != CINETPAY_TRANSFER_CODE_OK {
            return Err(ProviderError::Authentication(envelope.detail()));
        }

        let data: CinetPayLoginData = serde_json::from_value(envelope.data.unwrap_or_default())?;
        *cached = Some(CachedToken {
            value: data.token.clone(),
            acquired_at: Instant::now(),
        });
        Ok(data.token)
    }

    /// Drops the cached transfer token so the next call logs in again.
    pub async fn invalidate_token(&self) {
        *self.token.lock().await = None;
    }

    /// Checks a transfer by its client transaction ID.
    ///
    /// Returns the raw transfer object, or `None` when CinetPay does not know the transfer.
    ///
    /// # Errors
    ///
    /// Returns an error if transfer credentials are missing, the call fails or CinetPay answers
    /// with an error code.
    pub async fn check_transfer(
        &self,
        reference: &Reference,
    ) -> Result<Option<Value>, ProviderError> {
        let token = self.token().await?;
        let url = transfer_check_url(&self.config.transfer_base_url);
        let params = [
            ("token", token.as_str()),
            ("client_transaction_id", reference.as_str()),
        ];
        tracing::debug!("Checking CinetPay transfer {reference}");

        let response = self.client.get(&url, Some(&params), None).await?;
        if response.status.as_u16() == 404 {
            return Ok(None);
        }
        let envelope = Self::decode_envelope(response)?;

        if envelope.code != CINETPAY_TRANSFER_CODE_OK {
            // The token may have been revoked server side
            self.invalidate_token().await;
            return Err(Self::api_error(&envelope.code, envelope.detail()));
        }

        Ok(envelope
            .data
            .and_then(|data| select_transfer(reference, data)))
    }
}

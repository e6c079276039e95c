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

//! Provides the HTTP client for the [FeexPay](https://feexpay.me) status API.

use std::{collections::HashMap, fmt::Debug};

use reclaim_common::provider::ProviderError;
use reclaim_core::consts::RECLAIM_USER_AGENT;
use reclaim_model::identifiers::Reference;
use reclaim_network::http::HttpClient;
use serde_json::Value;

use super::models::unwrap_status_body;
use crate::config::FeexPayConfig;

/// HTTP client for the FeexPay status API.
pub struct FeexPayHttpClient {
    config: FeexPayConfig,
    client: HttpClient,
}

impl Debug for FeexPayHttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(FeexPayHttpClient))
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl FeexPayHttpClient {
    /// Creates a new [`FeexPayHttpClient`] instance.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: FeexPayConfig) -> Result<Self, ProviderError> {
        let headers = HashMap::from([
            ("User-Agent".to_string(), RECLAIM_USER_AGENT.to_string()),
            (
                "Authorization".to_string(),
                format!("Bearer {}", config.api_key),
            ),
        ]);
        let client = HttpClient::new(headers, Some(config.timeout_secs))?;
        Ok(Self { config, client })
    }

    fn status_url(&self, reference: &Reference) -> String {
        format!(
            "{}/api/transactions/public/single/status/{reference}",
            self.config.base_url.trim_end_matches('/')
        )
    }

    /// Fetches the status object of `reference`, or `None` when FeexPay does not know it.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails, the key is rejected or the body is not JSON.
    pub async fn get_status(&self, reference: &Reference) -> Result<Option<Value>, ProviderError> {
        tracing::debug!("Checking FeexPay transaction {reference}");
        let response = self
            .client
            .get(&self.status_url(reference), None, None)
            .await?;

        match response.status.as_u16() {
            404 => return Ok(None),
            401 | 403 => return Err(ProviderError::Authentication(response.text())),
            _ => {}
        }

        let body: Value = response.error_for_status()?.json()?;
        match unwrap_status_body(body) {
            Value::Object(map) if map.is_empty() => Ok(None),
            value @ Value::Object(_) => Ok(Some(value)),
            other => Err(ProviderError::InvalidResponse(format!(
                "status of {reference} is not an object: {other}"
            ))),
        }
    }
}

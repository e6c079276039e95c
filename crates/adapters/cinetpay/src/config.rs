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

//! Configuration for the CinetPay adapter.

use std::fmt::Debug;

use reclaim_core::env::{get_env_var, get_env_var_or, get_optional_env_var};
use reclaim_network::http::DEFAULT_TIMEOUT_SECS;

use crate::common::urls::{CINETPAY_HTTP_URL, CINETPAY_TRANSFER_HTTP_URL};

/// Configuration for the CinetPay adapter.
#[derive(Clone)]
pub struct CinetPayConfig {
    /// The merchant API key (`CINETPAY_API_KEY`).
    pub api_key: String,
    /// The merchant site ID (`CINETPAY_SITE_ID`).
    pub site_id: String,
    /// The transfer API password (`CINETPAY_TRANSFER_PASSWORD`), required for payout lookups.
    pub transfer_password: Option<String>,
    /// The payment API base URL (`CINETPAY_BASE_URL`).
    pub base_url: String,
    /// The transfer API base URL (`CINETPAY_TRANSFER_BASE_URL`).
    pub transfer_base_url: String,
    /// The timeout budget of every provider call (`RECLAIM_PROVIDER_TIMEOUT_SECS`).
    pub timeout_secs: u64,
}

impl Debug for CinetPayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(CinetPayConfig))
            .field("site_id", &self.site_id)
            .field("has_transfer_password", &self.transfer_password.is_some())
            .field("base_url", &self.base_url)
            .field("transfer_base_url", &self.transfer_base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}

impl CinetPayConfig {
    /// Creates a new [`CinetPayConfig`] instance, filling unset values with defaults.
    #[must_use]
    pub fn new(
        api_key: String,
        site_id: String,
        transfer_password: Option<String>,
        base_url: Option<String>,
        transfer_base_url: Option<String>,
        timeout_secs: Option<u64>,
    ) -> Self {
        Self {
            api_key,
            site_id,
            transfer_password,
            base_url: base_url.unwrap_or_else(|| CINETPAY_HTTP_URL.to_string()),
            transfer_base_url: transfer_base_url
                .unwrap_or_else(|| CINETPAY_TRANSFER_HTTP_URL.to_string()),
            timeout_secs: timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Creates a new [`CinetPayConfig`] from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `CINETPAY_API_KEY` or `CINETPAY_SITE_ID` is unset, or if the timeout
    /// is not a valid number of seconds.
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self::new(
            get_env_var("CINETPAY_API_KEY")?,
            get_env_var("CINETPAY_SITE_ID")?,
            get_optional_env_var("CINETPAY_TRANSFER_PASSWORD"),
            get_optional_env_var("CINETPAY_BASE_URL"),
            get_optional_env_var("CINETPAY_TRANSFER_BASE_URL"),
            Some(get_env_var_or(
                "RECLAIM_PROVIDER_TIMEOUT_SECS",
                DEFAULT_TIMEOUT_SECS,
            )?),
        ))
    }

    /// Returns whether payout (transfer) lookups can be authenticated.
    #[must_use]
    pub fn has_transfer_credentials(&self) -> bool {
        self.transfer_password.is_some()
    }
}

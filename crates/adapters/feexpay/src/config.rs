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

//! Configuration for the FeexPay adapter.

use std::fmt::Debug;

use reclaim_core::env::{get_env_var, get_env_var_or, get_optional_env_var};
use reclaim_network::http::DEFAULT_TIMEOUT_SECS;

pub const FEEXPAY_HTTP_URL: &str = "https://api.feexpay.me";

/// Configuration for the FeexPay adapter.
#[derive(Clone)]
pub struct FeexPayConfig {
    /// The merchant API key (`FEEXPAY_API_KEY`), sent as a bearer token.
    pub api_key: String,
    /// The API base URL (`FEEXPAY_BASE_URL`).
    pub base_url: String,
    /// The timeout budget of every provider call (`RECLAIM_PROVIDER_TIMEOUT_SECS`).
    pub timeout_secs: u64,
}

impl Debug for FeexPayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(FeexPayConfig))
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}

impl FeexPayConfig {
    /// Creates a new [`FeexPayConfig`] instance, filling unset values with defaults.
    #[must_use]
    pub fn new(api_key: String, base_url: Option<String>, timeout_secs: Option<u64>) -> Self {
        Self {
            api_key,
            base_url: base_url.unwrap_or_else(|| FEEXPAY_HTTP_URL.to_string()),
            timeout_secs: timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Creates a new [`FeexPayConfig`] from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `FEEXPAY_API_KEY` is unset or the timeout is invalid.
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self::new(
            get_env_var("FEEXPAY_API_KEY")?,
            get_optional_env_var("FEEXPAY_BASE_URL"),
            Some(get_env_var_or(
                "RECLAIM_PROVIDER_TIMEOUT_SECS",
                DEFAULT_TIMEOUT_SECS,
            )?),
        ))
    }
}

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

//! Configuration for reconciliation runs.

use std::time::Duration;

use reclaim_core::env::get_env_var_or;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BATCH_SIZE: usize = 10;
pub const DEFAULT_INTER_BATCH_DELAY_MS: u64 = 2_000;
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 30;

/// Configuration for `ReconciliationOrchestrator` instances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationConfig {
    /// The number of export rows processed between two throttling pauses.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// The pause (milliseconds) between two export batches.
    #[serde(default = "default_inter_batch_delay_ms")]
    pub inter_batch_delay_ms: u64,
    /// The budget (seconds) of every outbound provider call.
    #[serde(default = "default_provider_timeout_secs")]
    pub provider_timeout_secs: u64,
    /// If low confidence kind classifications are failed rather than restored.
    #[serde(default = "default_true")]
    pub reject_low_confidence: bool,
    /// If export rows are re-fetched from the live provider instead of trusted.
    #[serde(default)]
    pub verify_exports: bool,
}

const fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

const fn default_inter_batch_delay_ms() -> u64 {
    DEFAULT_INTER_BATCH_DELAY_MS
}

const fn default_provider_timeout_secs() -> u64 {
    DEFAULT_PROVIDER_TIMEOUT_SECS
}

const fn default_true() -> bool {
    true
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            inter_batch_delay_ms: DEFAULT_INTER_BATCH_DELAY_MS,
            provider_timeout_secs: DEFAULT_PROVIDER_TIMEOUT_SECS,
            reject_low_confidence: true,
            verify_exports: false,
        }
    }
}

impl ReconciliationConfig {
    /// Creates a new [`ReconciliationConfig`] instance, filling unset values with defaults.
    ///
    /// A zero batch size is raised to one.
    #[must_use]
    pub fn new(
        batch_size: Option<usize>,
        inter_batch_delay_ms: Option<u64>,
        provider_timeout_secs: Option<u64>,
        reject_low_confidence: Option<bool>,
        verify_exports: Option<bool>,
    ) -> Self {
        Self {
            batch_size: batch_size.unwrap_or(DEFAULT_BATCH_SIZE).max(1),
            inter_batch_delay_ms: inter_batch_delay_ms.unwrap_or(DEFAULT_INTER_BATCH_DELAY_MS),
            provider_timeout_secs: provider_timeout_secs.unwrap_or(DEFAULT_PROVIDER_TIMEOUT_SECS),
            reject_low_confidence: reject_low_confidence.unwrap_or(true),
            verify_exports: verify_exports.unwrap_or(false),
        }
    }

    /// Creates a new [`ReconciliationConfig`] from environment variables.
    ///
    /// Reads `RECLAIM_BATCH_SIZE`, `RECLAIM_BATCH_DELAY_MS`, `RECLAIM_PROVIDER_TIMEOUT_SECS`,
    /// `RECLAIM_REJECT_LOW_CONFIDENCE` and `RECLAIM_VERIFY_EXPORTS`.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but cannot be parsed.
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self::new(
            Some(get_env_var_or("RECLAIM_BATCH_SIZE", DEFAULT_BATCH_SIZE)?),
            Some(get_env_var_or(
                "RECLAIM_BATCH_DELAY_MS",
                DEFAULT_INTER_BATCH_DELAY_MS,
            )?),
            Some(get_env_var_or(
                "RECLAIM_PROVIDER_TIMEOUT_SECS",
                DEFAULT_PROVIDER_TIMEOUT_SECS,
            )?),
            Some(get_env_var_or("RECLAIM_REJECT_LOW_CONFIDENCE", true)?),
            Some(get_env_var_or("RECLAIM_VERIFY_EXPORTS", false)?),
        ))
    }

    #[must_use]
    pub fn inter_batch_delay(&self) -> Duration {
        Duration::from_millis(self.inter_batch_delay_ms)
    }

    #[must_use]
    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }
}

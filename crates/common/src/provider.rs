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

//! The provider adapter seam.

use async_trait::async_trait;
use reclaim_model::{
    enums::{KindSelector, Provider},
    identifiers::Reference,
    transaction::ProviderTransaction,
};
use reclaim_network::http::HttpClientError;
use thiserror::Error;

/// A typed error returned by provider adapters.
#[derive(Clone, Debug, Error)]
pub enum ProviderError {
    /// The call failed at the transport level.
    #[error("Transport error: {0}")]
    Transport(#[from] HttpClientError),
    /// The provider rejected the adapter credentials.
    #[error("Authentication failed: {0}")]
    Authentication(String),
    /// The provider answered with an error code.
    #[error("{provider} error {code}: {message}")]
    Api {
        provider: Provider,
        code: String,
        message: String,
    },
    /// The response could not be normalized.
    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
    /// The adapter cannot serve the requested lookup.
    #[error("Unsupported lookup: {0}")]
    Unsupported(String),
}

impl ProviderError {
    /// Returns whether the error is a transient transport failure (timeout, connect, DNS).
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_retryable(),
            _ => false,
        }
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(error: serde_json::Error) -> Self {
        Self::InvalidResponse(error.to_string())
    }
}

/// Fetches authoritative transaction state from one money-movement provider.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Returns the provider this adapter talks to.
    fn provider(&self) -> Provider;

    /// Fetches the current state of `reference`, normalized.
    ///
    /// Returns `Ok(None)` when the provider does not know the reference.
    async fn fetch_status(
        &self,
        reference: &Reference,
        selector: KindSelector,
    ) -> Result<Option<ProviderTransaction>, ProviderError>;

    /// Returns whether `status` marks a completed, recoverable transaction.
    fn is_successful(&self, status: &str) -> bool;
}

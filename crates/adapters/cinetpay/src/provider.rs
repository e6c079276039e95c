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

//! The CinetPay [`ProviderAdapter`].

use async_trait::async_trait;
use reclaim_common::provider::{ProviderAdapter, ProviderError};
use reclaim_model::{
    enums::{ClassificationConfidence, KindProvenance, KindSelector, Provider, TransactionKind},
    identifiers::Reference,
    transaction::{KindClassification, ProviderTransaction},
};

use crate::{
    common::consts::{CINETPAY_STATUS_ACCEPTED, CINETPAY_TRANSFER_STATUS_VALIDATED},
    config::CinetPayConfig,
    http::{
        client::CinetPayHttpClient,
        parse::{parse_payment_transaction, parse_transfer_transaction},
    },
};

/// Live status adapter for CinetPay collections (payment API) and payouts (transfer API).
#[derive(Debug)]
pub struct CinetPayProvider {
    client: CinetPayHttpClient,
}

impl CinetPayProvider {
    /// Creates a new [`CinetPayProvider`] instance.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: CinetPayConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: CinetPayHttpClient::new(config)?,
        })
    }

    #[must_use]
    pub fn client(&self) -> &CinetPayHttpClient {
        &self.client
    }

    async fn fetch_payment(
        &self,
        reference: &Reference,
        classification: KindClassification,
    ) -> Result<Option<ProviderTransaction>, ProviderError> {
        self.client
            .check_payment(reference)
            .await?
            .map(|raw| parse_payment_transaction(reference, classification, raw))
            .transpose()
    }

    async fn fetch_transfer(
        &self,
        reference: &Reference,
        classification: KindClassification,
    ) -> Result<Option<ProviderTransaction>, ProviderError> {
        self.client
            .check_transfer(reference)
            .await?
            .map(|raw| parse_transfer_transaction(reference, classification, raw))
            .transpose()
    }
}

#[async_trait]
impl ProviderAdapter for CinetPayProvider {
    fn provider(&self) -> Provider {
        Provider::CinetPay
    }

    async fn fetch_status(
        &self,
        reference: &Reference,
        selector: KindSelector,
    ) -> Result<Option<ProviderTransaction>, ProviderError> {
        match selector {
            KindSelector::Payment => {
                self.fetch_payment(reference, KindClassification::declared(TransactionKind::Payment))
                    .await
            }
            KindSelector::Payout => {
                self.fetch_transfer(reference, KindClassification::declared(TransactionKind::Payout))
                    .await
            }
            KindSelector::Auto => {
                let payment = KindClassification::new(
                    TransactionKind::Payment,
                    KindProvenance::Endpoint,
                    ClassificationConfidence::High,
                );
                if let Some(transaction) = self.fetch_payment(reference, payment).await? {
                    return Ok(Some(transaction));
                }

                if !self.client.config().has_transfer_credentials() {
                    tracing::debug!(
                        "Payment {reference} not found and no transfer credentials configured"
                    );
                    return Ok(None);
                }

                let payout = KindClassification::new(
                    TransactionKind::Payout,
                    KindProvenance::Endpoint,
                    ClassificationConfidence::High,
                );
                self.fetch_transfer(reference, payout).await
            }
        }
    }

    fn is_successful(&self, status: &str) -> bool {
        let status = status.trim();
        status.eq_ignore_ascii_case(CINETPAY_STATUS_ACCEPTED)
            || status.eq_ignore_ascii_case(CINETPAY_TRANSFER_STATUS_VALIDATED)
    }
}

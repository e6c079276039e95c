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

//! The platform's webhook-equivalent completion pipelines.
//!
//! Restoration replays these pipelines as best-effort side effects once the monetary state
//! change has been applied. Each restoration carries its own [`RestorationContext`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reclaim_model::{
    canonical::{CanonicalPaymentIntent, CanonicalTransaction},
    enums::{Provider, TransactionKind},
    identifiers::{Reference, UserId},
};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};
use thiserror::Error;

/// A typed error returned by completion pipelines.
#[derive(Clone, Debug, Error)]
pub enum CompletionError {
    /// The pipeline could not find the canonical transaction it was asked to complete.
    ///
    /// Expected when the transaction was created directly rather than via the live webhook.
    #[error("Canonical transaction not found: {0}")]
    TransactionNotFound(String),
    /// Referral commission fan-out failed.
    #[error("Commission dispatch failed: {0}")]
    Commission(String),
    #[error("Completion failed: {0}")]
    Other(String),
}

/// What started a restoration.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, AsRefStr, Serialize, Deserialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RestorationTrigger {
    /// An operator reconciliation run.
    Reconciliation,
    /// A new user registration sweeping the ledger.
    Registration,
}

/// Per-restoration context passed explicitly through the completion pipeline.
///
/// A context is created for one restoration and never shared with another.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RestorationContext {
    pub provider: Provider,
    pub reference: Reference,
    pub kind: TransactionKind,
    pub user_id: UserId,
    pub trigger: RestorationTrigger,
    pub started_at: DateTime<Utc>,
    notes: Vec<String>,
}

impl RestorationContext {
    /// Creates a new [`RestorationContext`] instance.
    #[must_use]
    pub fn new(
        provider: Provider,
        reference: Reference,
        kind: TransactionKind,
        user_id: UserId,
        trigger: RestorationTrigger,
    ) -> Self {
        Self {
            provider,
            reference,
            kind,
            user_id,
            trigger,
            started_at: Utc::now(),
            notes: Vec::new(),
        }
    }

    /// Records a note about what the pipeline did.
    pub fn note(&mut self, message: impl Into<String>) {
        self.notes.push(message.into());
    }

    #[must_use]
    pub fn notes(&self) -> &[String] {
        &self.notes
    }
}

/// Payment completion: entitlement activation and referral commission fan-out.
#[async_trait]
pub trait PaymentCompletion: Send + Sync {
    async fn complete_payment(
        &self,
        intent: &CanonicalPaymentIntent,
        context: &mut RestorationContext,
    ) -> Result<(), CompletionError>;
}

/// Payout completion: the payout webhook processing.
#[async_trait]
pub trait PayoutCompletion: Send + Sync {
    async fn complete_payout(
        &self,
        transaction: &CanonicalTransaction,
        context: &mut RestorationContext,
    ) -> Result<(), CompletionError>;
}

/// Completion pipelines for runs with no platform attached.
///
/// Both pipelines refuse, leaving a note on the context.
#[derive(Clone, Copy, Debug, Default)]
pub struct DetachedCompletion;

#[async_trait]
impl PaymentCompletion for DetachedCompletion {
    async fn complete_payment(
        &self,
        _intent: &CanonicalPaymentIntent,
        context: &mut RestorationContext,
    ) -> Result<(), CompletionError> {
        context.note("payment completion skipped: no platform attached");
        Err(CompletionError::Other("no platform attached".to_string()))
    }
}

#[async_trait]
impl PayoutCompletion for DetachedCompletion {
    async fn complete_payout(
        &self,
        _transaction: &CanonicalTransaction,
        context: &mut RestorationContext,
    ) -> Result<(), CompletionError> {
        context.note("payout completion skipped: no platform attached");
        Err(CompletionError::Other("no platform attached".to_string()))
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use chrono::Utc;
    use reclaim_model::identifiers::{CanonicalId, stubs::*};
    use rstest::rstest;
    use rust_decimal_macros::dec;

    use super::*;

    #[rstest]
    fn test_context_notes(reference: Reference, user_id: UserId) {
        let mut context = RestorationContext::new(
            Provider::CinetPay,
            reference,
            TransactionKind::Payment,
            user_id,
            RestorationTrigger::Registration,
        );
        assert!(context.notes().is_empty());
        context.note("entitlement activated");
        assert_eq!(context.notes(), ["entitlement activated"]);
        assert_eq!(context.trigger.to_string(), "REGISTRATION");
    }

    #[rstest]
    #[tokio::test]
    async fn test_detached_payout_completion_refuses(reference_payout: Reference, user_id: UserId) {
        let transaction = CanonicalTransaction {
            id: CanonicalId::new("TX-0001"),
            user_id,
            provider: Provider::CinetPay,
            kind: TransactionKind::Payout,
            external_reference: reference_payout,
            amount: dec!(1500),
            currency: "XAF".to_string(),
            created_at: Utc::now(),
        };
        let mut context = RestorationContext::new(
            Provider::CinetPay,
            reference_payout,
            TransactionKind::Payout,
            user_id,
            RestorationTrigger::Reconciliation,
        );

        let result = DetachedCompletion
            .complete_payout(&transaction, &mut context)
            .await;

        assert!(matches!(result, Err(CompletionError::Other(_))));
        assert_eq!(context.notes().len(), 1);
    }
}

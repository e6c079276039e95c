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

//! The canonical record store seam.

use async_trait::async_trait;
use reclaim_model::{
    canonical::{CanonicalPaymentIntent, CanonicalTransaction, NewPaymentIntent, NewWithdrawal},
    enums::{PlanType, Provider},
    identifiers::{CanonicalId, Reference, UserId},
};
use thiserror::Error;

/// A typed error returned by canonical store implementations.
#[derive(Clone, Debug, Error)]
pub enum CanonicalError {
    /// A unique index rejected the record, proving it was already materialized.
    #[error("Duplicate canonical record: {0}")]
    Duplicate(String),
    #[error("Canonical record not found: {0}")]
    NotFound(CanonicalId),
    #[error("Canonical store backend error: {0}")]
    Backend(String),
}

/// The platform's own transaction and payment intent records.
///
/// Withdrawals are unique on `(provider, external_reference)` and payment intents on
/// `(provider, session_id)`. These indexes are the exactly-once guard for restoration.
#[async_trait]
pub trait CanonicalStore: Send + Sync {
    async fn find_transaction_by_reference(
        &self,
        provider: Provider,
        reference: &Reference,
    ) -> Result<Option<CanonicalTransaction>, CanonicalError>;

    /// Creates a withdrawal, failing with [`CanonicalError::Duplicate`] when one exists.
    async fn create_withdrawal(
        &self,
        withdrawal: NewWithdrawal,
    ) -> Result<CanonicalTransaction, CanonicalError>;

    /// Deletes a withdrawal whose balance effect could not be applied.
    ///
    /// Restores the store to its state before [`CanonicalStore::create_withdrawal`], so a later
    /// restoration materializes the withdrawal again.
    async fn void_withdrawal(&self, id: &CanonicalId) -> Result<(), CanonicalError>;

    /// Finds a payment intent by session ID, or by provider payment ID.
    async fn find_payment_intent(
        &self,
        provider: Provider,
        session_id: Option<&str>,
        provider_payment_id: &str,
    ) -> Result<Option<CanonicalPaymentIntent>, CanonicalError>;

    /// Finds a succeeded payment intent of `user_id` for `plan`.
    async fn find_succeeded_intent(
        &self,
        user_id: &UserId,
        plan: PlanType,
    ) -> Result<Option<CanonicalPaymentIntent>, CanonicalError>;

    /// Creates a payment intent directly in the `SUCCEEDED` state, failing with
    /// [`CanonicalError::Duplicate`] when the session is already known.
    async fn create_succeeded_intent(
        &self,
        intent: NewPaymentIntent,
    ) -> Result<CanonicalPaymentIntent, CanonicalError>;

    /// Moves an existing intent to `SUCCEEDED` in place, attributing it to `user_id`.
    async fn mark_intent_succeeded(
        &self,
        id: &CanonicalId,
        user_id: &UserId,
    ) -> Result<CanonicalPaymentIntent, CanonicalError>;
}

/// A [`CanonicalStore`] for runs with no platform attached.
///
/// Lookups miss and writes are refused, so no transaction is ever materialized.
#[derive(Clone, Copy, Debug, Default)]
pub struct DetachedCanonicalStore;

fn detached() -> CanonicalError {
    CanonicalError::Backend("no platform attached".to_string())
}

#[async_trait]
impl CanonicalStore for DetachedCanonicalStore {
    async fn find_transaction_by_reference(
        &self,
        _provider: Provider,
        _reference: &Reference,
    ) -> Result<Option<CanonicalTransaction>, CanonicalError> {
        Ok(None)
    }

    async fn create_withdrawal(
        &self,
        _withdrawal: NewWithdrawal,
    ) -> Result<CanonicalTransaction, CanonicalError> {
        Err(detached())
    }

    async fn void_withdrawal(&self, id: &CanonicalId) -> Result<(), CanonicalError> {
        Err(CanonicalError::NotFound(*id))
    }

    async fn find_payment_intent(
        &self,
        _provider: Provider,
        _session_id: Option<&str>,
        _provider_payment_id: &str,
    ) -> Result<Option<CanonicalPaymentIntent>, CanonicalError> {
        Ok(None)
    }

    async fn find_succeeded_intent(
        &self,
        _user_id: &UserId,
        _plan: PlanType,
    ) -> Result<Option<CanonicalPaymentIntent>, CanonicalError> {
        Ok(None)
    }

    async fn create_succeeded_intent(
        &self,
        _intent: NewPaymentIntent,
    ) -> Result<CanonicalPaymentIntent, CanonicalError> {
        Err(detached())
    }

    async fn mark_intent_succeeded(
        &self,
        id: &CanonicalId,
        _user_id: &UserId,
    ) -> Result<CanonicalPaymentIntent, CanonicalError> {
        Err(CanonicalError::NotFound(*id))
    }
}

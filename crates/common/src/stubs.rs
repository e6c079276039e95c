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

//! In-memory collaborator stubs to facilitate testing.

use std::{
    collections::HashMap,
    sync::{
        Mutex, MutexGuard, PoisonError,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::Utc;
use reclaim_model::{
    canonical::{CanonicalPaymentIntent, CanonicalTransaction, NewPaymentIntent, NewWithdrawal},
    enums::{EntitlementKind, IntentStatus, KindSelector, PlanType, Provider},
    identifiers::{CanonicalId, Reference, UserId},
    transaction::ProviderTransaction,
};
use rust_decimal::Decimal;

use crate::{
    canonical::{CanonicalError, CanonicalStore},
    completion::{CompletionError, PaymentCompletion, PayoutCompletion, RestorationContext},
    directory::{DirectoryError, PlatformUser, UserDirectory},
    provider::{ProviderAdapter, ProviderError},
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Returns a platform user with the given identities and a zero balance.
#[must_use]
pub fn stub_user(id: &str, email: Option<&str>, phone: Option<&str>) -> PlatformUser {
    PlatformUser {
        id: UserId::new(id),
        email: email.map(ToString::to_string),
        phone: phone.map(ToString::to_string),
        momo_number: None,
        balance: Decimal::ZERO,
    }
}

// ---- UserDirectory ----

#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    users: Mutex<Vec<PlatformUser>>,
    entitlements: Mutex<HashMap<UserId, Vec<EntitlementKind>>>,
    fail_balance_updates: AtomicBool,
}

impl InMemoryUserDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, user: PlatformUser) {
        lock(&self.users).push(user);
    }

    pub fn grant(&self, id: UserId, entitlement: EntitlementKind) {
        lock(&self.entitlements)
            .entry(id)
            .or_default()
            .push(entitlement);
    }

    /// Makes every subsequent balance update fail.
    pub fn fail_balance_updates(&self) {
        self.fail_balance_updates.store(true, Ordering::SeqCst);
    }

    pub fn resume_balance_updates(&self) {
        self.fail_balance_updates.store(false, Ordering::SeqCst);
    }

    #[must_use]
    pub fn user(&self, id: &UserId) -> Option<PlatformUser> {
        lock(&self.users).iter().find(|u| u.id == *id).cloned()
    }

    #[must_use]
    pub fn balance(&self, id: &UserId) -> Option<Decimal> {
        self.user(id).map(|u| u.balance)
    }

    fn find(&self, predicate: impl Fn(&PlatformUser) -> bool) -> Option<PlatformUser> {
        lock(&self.users).iter().find(|u| predicate(u)).cloned()
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn get_by_id(&self, id: &UserId) -> Result<Option<PlatformUser>, DirectoryError> {
        Ok(self.user(id))
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<PlatformUser>, DirectoryError> {
        Ok(self.find(|u| {
            u.email
                .as_deref()
                .is_some_and(|e| e.eq_ignore_ascii_case(email))
        }))
    }

    async fn get_by_phone(&self, phone: &str) -> Result<Option<PlatformUser>, DirectoryError> {
        Ok(self.find(|u| u.phone.as_deref() == Some(phone)))
    }

    async fn get_by_momo_number(
        &self,
        number: &str,
    ) -> Result<Option<PlatformUser>, DirectoryError> {
        Ok(self.find(|u| u.momo_number.as_deref() == Some(number)))
    }

    async fn update_balance(&self, id: &UserId, delta: Decimal) -> Result<Decimal, DirectoryError> {
        if self.fail_balance_updates.load(Ordering::SeqCst) {
            return Err(DirectoryError::Backend("balance update refused".to_string()));
        }
        let mut users = lock(&self.users);
        let user = users
            .iter_mut()
            .find(|u| u.id == *id)
            .ok_or(DirectoryError::NotFound(*id))?;
        user.balance += delta;
        Ok(user.balance)
    }

    async fn get_active_entitlements(
        &self,
        id: &UserId,
    ) -> Result<Vec<EntitlementKind>, DirectoryError> {
        Ok(lock(&self.entitlements)
            .get(id)
            .cloned()
            .unwrap_or_default())
    }
}

// ---- CanonicalStore ----

#[derive(Debug, Default)]
pub struct InMemoryCanonicalStore {
    transactions: Mutex<Vec<CanonicalTransaction>>,
    intents: Mutex<Vec<CanonicalPaymentIntent>>,
    next_id: AtomicU64,
}

impl InMemoryCanonicalStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn transactions(&self) -> Vec<CanonicalTransaction> {
        lock(&self.transactions).clone()
    }

    #[must_use]
    pub fn intents(&self) -> Vec<CanonicalPaymentIntent> {
        lock(&self.intents).clone()
    }

    /// Seeds an intent, as if created by the live checkout flow.
    pub fn insert_intent(&self, intent: CanonicalPaymentIntent) {
        lock(&self.intents).push(intent);
    }

    fn next_id(&self, prefix: &str) -> CanonicalId {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        CanonicalId::new(format!("{prefix}-{n:04}"))
    }
}

#[async_trait]
impl CanonicalStore for InMemoryCanonicalStore {
    async fn find_transaction_by_reference(
        &self,
        provider: Provider,
        reference: &Reference,
    ) -> Result<Option<CanonicalTransaction>, CanonicalError> {
        Ok(lock(&self.transactions)
            .iter()
            .find(|t| t.provider == provider && t.external_reference == *reference)
            .cloned())
    }

    async fn create_withdrawal(
        &self,
        withdrawal: NewWithdrawal,
    ) -> Result<CanonicalTransaction, CanonicalError> {
        let mut transactions = lock(&self.transactions);
        if transactions.iter().any(|t| {
            t.provider == withdrawal.provider
                && t.external_reference == withdrawal.external_reference
        }) {
            return Err(CanonicalError::Duplicate(
                withdrawal.external_reference.to_string(),
            ));
        }
        let transaction = CanonicalTransaction {
            id: self.next_id("TX"),
            user_id: withdrawal.user_id,
            provider: withdrawal.provider,
            kind: reclaim_model::enums::TransactionKind::Payout,
            external_reference: withdrawal.external_reference,
            amount: withdrawal.amount,
            currency: withdrawal.currency,
            created_at: Utc::now(),
        };
        transactions.push(transaction.clone());
        Ok(transaction)
    }

    async fn void_withdrawal(&self, id: &CanonicalId) -> Result<(), CanonicalError> {
        let mut transactions = lock(&self.transactions);
        let position = transactions
            .iter()
            .position(|t| t.id == *id)
            .ok_or(CanonicalError::NotFound(*id))?;
        transactions.remove(position);
        Ok(())
    }

    async fn find_payment_intent(
        &self,
        provider: Provider,
        session_id: Option<&str>,
        provider_payment_id: &str,
    ) -> Result<Option<CanonicalPaymentIntent>, CanonicalError> {
        Ok(lock(&self.intents)
            .iter()
            .find(|i| {
                i.provider == provider
                    && (session_id.is_some_and(|s| i.session_id == s)
                        || i.provider_payment_id.as_deref() == Some(provider_payment_id))
            })
            .cloned())
    }

    async fn find_succeeded_intent(
        &self,
        user_id: &UserId,
        plan: PlanType,
    ) -> Result<Option<CanonicalPaymentIntent>, CanonicalError> {
        Ok(lock(&self.intents)
            .iter()
            .find(|i| i.user_id == *user_id && i.plan == plan && i.is_succeeded())
            .cloned())
    }

    async fn create_succeeded_intent(
        &self,
        intent: NewPaymentIntent,
    ) -> Result<CanonicalPaymentIntent, CanonicalError> {
        let mut intents = lock(&self.intents);
        if intents
            .iter()
            .any(|i| i.provider == intent.provider && i.session_id == intent.session_id)
        {
            return Err(CanonicalError::Duplicate(intent.session_id));
        }
        let now = Utc::now();
        let created = CanonicalPaymentIntent {
            id: self.next_id("PI"),
            user_id: intent.user_id,
            provider: intent.provider,
            session_id: intent.session_id,
            provider_payment_id: intent.provider_payment_id,
            plan: intent.plan,
            amount: intent.amount,
            currency: intent.currency,
            status: IntentStatus::Succeeded,
            created_at: now,
            updated_at: now,
        };
        intents.push(created.clone());
        Ok(created)
    }

    async fn mark_intent_succeeded(
        &self,
        id: &CanonicalId,
        user_id: &UserId,
    ) -> Result<CanonicalPaymentIntent, CanonicalError> {
        let mut intents = lock(&self.intents);
        let intent = intents
            .iter_mut()
            .find(|i| i.id == *id)
            .ok_or(CanonicalError::NotFound(*id))?;
        intent.status = IntentStatus::Succeeded;
        intent.user_id = *user_id;
        intent.updated_at = Utc::now();
        Ok(intent.clone())
    }
}

// ---- Completion pipelines ----

#[derive(Debug, Default)]
pub struct RecordingPaymentCompletion {
    calls: Mutex<Vec<CanonicalPaymentIntent>>,
    failure: Mutex<Option<CompletionError>>,
}

impl RecordingPaymentCompletion {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent completion record the call, then fail with `error`.
    pub fn fail_with(&self, error: CompletionError) {
        *lock(&self.failure) = Some(error);
    }

    #[must_use]
    pub fn calls(&self) -> Vec<CanonicalPaymentIntent> {
        lock(&self.calls).clone()
    }
}

#[async_trait]
impl PaymentCompletion for RecordingPaymentCompletion {
    async fn complete_payment(
        &self,
        intent: &CanonicalPaymentIntent,
        context: &mut RestorationContext,
    ) -> Result<(), CompletionError> {
        lock(&self.calls).push(intent.clone());
        if let Some(error) = lock(&self.failure).clone() {
            return Err(error);
        }
        context.note(format!("{} activated", intent.plan));
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct RecordingPayoutCompletion {
    calls: Mutex<Vec<CanonicalTransaction>>,
    failure: Mutex<Option<CompletionError>>,
}

impl RecordingPayoutCompletion {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent completion record the call, then fail with `error`.
    pub fn fail_with(&self, error: CompletionError) {
        *lock(&self.failure) = Some(error);
    }

    #[must_use]
    pub fn calls(&self) -> Vec<CanonicalTransaction> {
        lock(&self.calls).clone()
    }
}

#[async_trait]
impl PayoutCompletion for RecordingPayoutCompletion {
    async fn complete_payout(
        &self,
        transaction: &CanonicalTransaction,
        context: &mut RestorationContext,
    ) -> Result<(), CompletionError> {
        lock(&self.calls).push(transaction.clone());
        if let Some(error) = lock(&self.failure).clone() {
            return Err(error);
        }
        context.note("payout completed");
        Ok(())
    }
}

// ---- ProviderAdapter ----

type StaticResponse = Result<Option<ProviderTransaction>, ProviderError>;

/// A [`ProviderAdapter`] answering from a fixed table of responses.
///
/// Unknown references answer `Ok(None)`.
#[derive(Debug)]
pub struct StaticProviderAdapter {
    provider: Provider,
    responses: Mutex<HashMap<Reference, StaticResponse>>,
    delays: Mutex<HashMap<Reference, Duration>>,
    calls: Mutex<Vec<(Reference, KindSelector)>>,
}

impl StaticProviderAdapter {
    #[must_use]
    pub fn new(provider: Provider) -> Self {
        Self {
            provider,
            responses: Mutex::new(HashMap::new()),
            delays: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn with_transaction(self, transaction: ProviderTransaction) -> Self {
        lock(&self.responses).insert(transaction.reference, Ok(Some(transaction)));
        self
    }

    #[must_use]
    pub fn with_response(self, reference: Reference, response: StaticResponse) -> Self {
        lock(&self.responses).insert(reference, response);
        self
    }

    /// Delays the answer for `reference`.
    #[must_use]
    pub fn with_delay(self, reference: Reference, delay: Duration) -> Self {
        lock(&self.delays).insert(reference, delay);
        self
    }

    /// Returns the lookups made so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<(Reference, KindSelector)> {
        lock(&self.calls).clone()
    }
}

#[async_trait]
impl ProviderAdapter for StaticProviderAdapter {
    fn provider(&self) -> Provider {
        self.provider
    }

    async fn fetch_status(
        &self,
        reference: &Reference,
        selector: KindSelector,
    ) -> Result<Option<ProviderTransaction>, ProviderError> {
        lock(&self.calls).push((*reference, selector));
        let delay = lock(&self.delays).get(reference).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let response = lock(&self.responses).get(reference).cloned();
        response.unwrap_or(Ok(None))
    }

    fn is_successful(&self, status: &str) -> bool {
        matches!(
            status.to_ascii_uppercase().as_str(),
            "ACCEPTED" | "VAL" | "SUCCESSFUL" | "SUCCESS"
        )
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use reclaim_model::{identifiers::stubs::*, stubs::*};
    use rstest::rstest;
    use rust_decimal_macros::dec;

    use super::*;

    #[rstest]
    #[tokio::test]
    async fn test_directory_balance_and_lookups(user_id: UserId) {
        let directory = InMemoryUserDirectory::new();
        directory.add_user(PlatformUser {
            momo_number: Some("670000001".to_string()),
            ..stub_user(user_id.as_str(), Some("Awa@Example.com"), None)
        });

        assert!(directory.get_by_email("awa@example.com").await.unwrap().is_some());
        assert!(directory.get_by_momo_number("670000001").await.unwrap().is_some());
        assert!(directory.get_by_phone("670000001").await.unwrap().is_none());
        assert_eq!(
            directory.update_balance(&user_id, dec!(-1500)).await.unwrap(),
            dec!(-1500)
        );
    }

    #[rstest]
    #[tokio::test]
    async fn test_canonical_store_uniqueness(reference: Reference, user_id: UserId) {
        let store = InMemoryCanonicalStore::new();
        let withdrawal = NewWithdrawal {
            user_id,
            provider: Provider::CinetPay,
            external_reference: reference,
            amount: dec!(1500),
            currency: "XAF".to_string(),
            recipient_phone: None,
        };
        let created = store.create_withdrawal(withdrawal.clone()).await.unwrap();
        assert_eq!(created.id.as_str(), "TX-0001");
        assert!(matches!(
            store.create_withdrawal(withdrawal.clone()).await,
            Err(CanonicalError::Duplicate(_))
        ));

        store.void_withdrawal(&created.id).await.unwrap();
        assert!(store.transactions().is_empty());
        assert!(matches!(
            store.void_withdrawal(&created.id).await,
            Err(CanonicalError::NotFound(_))
        ));
        assert!(store.create_withdrawal(withdrawal).await.is_ok());
    }

    #[rstest]
    #[tokio::test]
    async fn test_static_adapter(provider_transaction_payment: ProviderTransaction) {
        let reference = provider_transaction_payment.reference;
        let adapter = StaticProviderAdapter::new(Provider::CinetPay)
            .with_transaction(provider_transaction_payment);

        let found = adapter
            .fetch_status(&reference, KindSelector::Auto)
            .await
            .unwrap();
        let missing = adapter
            .fetch_status(&Reference::new("UNKNOWN"), KindSelector::Payment)
            .await
            .unwrap();

        assert!(found.is_some());
        assert!(missing.is_none());
        assert_eq!(adapter.calls().len(), 2);
        assert!(adapter.is_successful("accepted"));
        assert!(!adapter.is_successful("REFUSED"));
    }
}

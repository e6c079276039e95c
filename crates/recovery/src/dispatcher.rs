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

//! Restores provider transactions into the platform's canonical records.
//!
//! The canonical store's unique indexes are the exactly-once guard: a restoration that finds
//! (or collides with) an existing canonical record reports it as already materialized and
//! applies nothing. Completion pipelines run after the monetary effect and are best effort.

use std::sync::Arc;

use reclaim_common::{
    canonical::{CanonicalError, CanonicalStore},
    completion::{
        CompletionError, PaymentCompletion, PayoutCompletion, RestorationContext,
        RestorationTrigger,
    },
    directory::{DirectoryError, PlatformUser, UserDirectory},
};
use reclaim_model::{
    canonical::{
        CanonicalPaymentIntent, CanonicalTransaction, NewPaymentIntent, NewWithdrawal,
        synthesized_session_id,
    },
    enums::{PlanType, TransactionKind},
    identifiers::CanonicalId,
    pricing::map_amount,
    transaction::ProviderTransaction,
};
use thiserror::Error;

/// The result of a restoration attempt that did not fail.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RestorationOutcome {
    /// The canonical record was created (or completed) and its effects applied.
    Restored {
        canonical_id: CanonicalId,
        notes: Vec<String>,
    },
    /// A canonical record already exists for the transaction.
    AlreadyMaterialized { canonical_id: Option<CanonicalId> },
    /// The user already holds the entitlement the payment would grant.
    EntitlementConflict { plan: PlanType },
}

#[derive(Clone, Debug, Error)]
pub enum RestorationError {
    #[error(transparent)]
    Canonical(#[from] CanonicalError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

/// Creates canonical records, adjusts balances and replays the completion pipelines.
#[derive(Clone)]
pub struct RestorationDispatcher {
    directory: Arc<dyn UserDirectory>,
    canonical: Arc<dyn CanonicalStore>,
    payments: Arc<dyn PaymentCompletion>,
    payouts: Arc<dyn PayoutCompletion>,
}

impl std::fmt::Debug for RestorationDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(RestorationDispatcher))
            .finish_non_exhaustive()
    }
}

impl RestorationDispatcher {
    /// Creates a new [`RestorationDispatcher`] instance.
    #[must_use]
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        canonical: Arc<dyn CanonicalStore>,
        payments: Arc<dyn PaymentCompletion>,
        payouts: Arc<dyn PayoutCompletion>,
    ) -> Self {
        Self {
            directory,
            canonical,
            payments,
            payouts,
        }
    }

    /// Restores `transaction` for `user`.
    ///
    /// # Errors
    ///
    /// Returns an error if the canonical store or the balance update fails. A failed balance
    /// update voids the created withdrawal, so a retry materializes and debits it again.
    pub async fn restore(
        &self,
        transaction: &ProviderTransaction,
        user: &PlatformUser,
        trigger: RestorationTrigger,
    ) -> Result<RestorationOutcome, RestorationError> {
        let context = RestorationContext::new(
            transaction.provider,
            transaction.reference,
            transaction.kind(),
            user.id,
            trigger,
        );
        match transaction.kind() {
            TransactionKind::Payout => self.restore_payout(transaction, user, context).await,
            TransactionKind::Payment => self.restore_payment(transaction, user, context).await,
        }
    }

    async fn restore_payout(
        &self,
        transaction: &ProviderTransaction,
        user: &PlatformUser,
        mut context: RestorationContext,
    ) -> Result<RestorationOutcome, RestorationError> {
        if let Some(existing) = self
            .canonical
            .find_transaction_by_reference(transaction.provider, &transaction.reference)
            .await?
        {
            return Ok(RestorationOutcome::AlreadyMaterialized {
                canonical_id: Some(existing.id),
            });
        }

        let withdrawal = NewWithdrawal {
            user_id: user.id,
            provider: transaction.provider,
            external_reference: transaction.reference,
            amount: transaction.amount,
            currency: transaction.currency.clone(),
            recipient_phone: transaction.hints.phone.clone(),
        };
        let created = match self.canonical.create_withdrawal(withdrawal).await {
            Ok(created) => created,
            Err(CanonicalError::Duplicate(_)) => {
                return Ok(RestorationOutcome::AlreadyMaterialized { canonical_id: None });
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(delta) = TransactionKind::Payout.balance_delta(transaction.amount) {
            match self.directory.update_balance(&user.id, delta).await {
                Ok(balance) => context.note(format!("balance adjusted by {delta} to {balance}")),
                Err(e) => {
                    self.void_unapplied(&created, &e).await;
                    return Err(e.into());
                }
            }
        }

        match self.payouts.complete_payout(&created, &mut context).await {
            Ok(()) => {}
            Err(CompletionError::TransactionNotFound(detail)) => {
                tracing::debug!(
                    "Payout completion for {} found no transaction: {detail}",
                    transaction.reference
                );
            }
            Err(e) => {
                tracing::warn!("Payout completion for {} failed: {e}", transaction.reference);
                context.note(format!("payout completion failed: {e}"));
            }
        }

        Ok(RestorationOutcome::Restored {
            canonical_id: created.id,
            notes: context.notes().to_vec(),
        })
    }

    /// Removes a withdrawal whose debit failed, so the next attempt applies both together.
    async fn void_unapplied(&self, created: &CanonicalTransaction, cause: &DirectoryError) {
        match self.canonical.void_withdrawal(&created.id).await {
            Ok(()) => tracing::warn!(
                "Voided withdrawal {} for {}: balance update failed: {cause}",
                created.id,
                created.external_reference
            ),
            Err(e) => tracing::error!(
                "Withdrawal {} for {} left without its debit: balance update failed: {cause}, void failed: {e}",
                created.id,
                created.external_reference
            ),
        }
    }

    async fn restore_payment(
        &self,
        transaction: &ProviderTransaction,
        user: &PlatformUser,
        mut context: RestorationContext,
    ) -> Result<RestorationOutcome, RestorationError> {
        let mapping = map_amount(transaction.amount);
        let session_id = transaction
            .session_id
            .clone()
            .unwrap_or_else(|| synthesized_session_id(transaction.provider, &transaction.reference));

        let existing = self
            .canonical
            .find_payment_intent(
                transaction.provider,
                Some(&session_id),
                transaction.reference.as_str(),
            )
            .await?;
        if let Some(intent) = &existing
            && intent.is_succeeded()
        {
            return Ok(RestorationOutcome::AlreadyMaterialized {
                canonical_id: Some(intent.id),
            });
        }

        if self.holds_entitlement(user, mapping.plan).await? {
            return Ok(RestorationOutcome::EntitlementConflict { plan: mapping.plan });
        }

        let intent = match existing {
            Some(pending) => {
                context.note(format!("intent {} completed in place", pending.id));
                self.canonical
                    .mark_intent_succeeded(&pending.id, &user.id)
                    .await?
            }
            None => {
                let new_intent = NewPaymentIntent {
                    user_id: user.id,
                    provider: transaction.provider,
                    session_id,
                    provider_payment_id: Some(transaction.reference.to_string()),
                    plan: mapping.plan,
                    amount: mapping.net_amount,
                    currency: transaction.currency.clone(),
                };
                match self.canonical.create_succeeded_intent(new_intent).await {
                    Ok(intent) => intent,
                    Err(CanonicalError::Duplicate(_)) => {
                        return Ok(RestorationOutcome::AlreadyMaterialized {
                            canonical_id: None,
                        });
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        };

        self.complete_payment(&intent, &mut context).await;

        Ok(RestorationOutcome::Restored {
            canonical_id: intent.id,
            notes: context.notes().to_vec(),
        })
    }

    /// Returns whether `user` already holds the effect of a `plan` payment.
    ///
    /// An unknown plan grants nothing, so it never conflicts.
    async fn holds_entitlement(
        &self,
        user: &PlatformUser,
        plan: PlanType,
    ) -> Result<bool, RestorationError> {
        let Some(entitlement) = plan.entitlement() else {
            return Ok(false);
        };
        if self
            .canonical
            .find_succeeded_intent(&user.id, plan)
            .await?
            .is_some()
        {
            return Ok(true);
        }
        let active = self.directory.get_active_entitlements(&user.id).await?;
        Ok(active.contains(&entitlement))
    }

    async fn complete_payment(
        &self,
        intent: &CanonicalPaymentIntent,
        context: &mut RestorationContext,
    ) {
        match self.payments.complete_payment(intent, context).await {
            Ok(()) => {}
            Err(CompletionError::TransactionNotFound(detail)) => {
                tracing::debug!("Payment completion for {} found no transaction: {detail}", intent.id);
            }
            Err(e) => {
                tracing::warn!("Payment completion for {} failed: {e}", intent.id);
                context.note(format!("payment completion failed: {e}"));
            }
        }
    }
}

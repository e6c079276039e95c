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

//! The recovery ledger entry for a provider transaction not yet linked to a platform user.

use std::fmt::Display;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    enums::{PlanType, Provider, RecoveryStatus, RecoveryTrigger, TransactionKind},
    identifiers::{CanonicalId, RecordId, Reference, UserId},
    payload::ProviderPayload,
    pricing::map_amount,
    transaction::{IdentityHints, KindClassification, ProviderTransaction},
};

/// A durable ledger entry for one successful provider transaction.
///
/// `(provider, reference)` is unique across the ledger. The record is mutated only by the
/// `NOT_RESTORED -> RESTORED` transition, which sets the restoration fields together.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecoveryRecord {
    pub id: RecordId,
    pub reference: Reference,
    pub provider: Provider,
    pub kind: TransactionKind,
    pub candidate_email: Option<String>,
    pub candidate_phone: Option<String>,
    pub candidate_provider_user_id: Option<String>,
    /// Canonical amount: the mapped net plan amount for payments, the provider amount otherwise.
    pub amount: Decimal,
    /// Amount as reported by the provider.
    pub gross_amount: Decimal,
    pub plan_type: Option<PlanType>,
    pub currency: String,
    pub provider_status: String,
    pub session_id: Option<String>,
    pub payload: ProviderPayload,
    pub recovery_status: RecoveryStatus,
    pub restored_user_id: Option<UserId>,
    pub restored_transaction_id: Option<CanonicalId>,
    pub restored_at: Option<DateTime<Utc>>,
    pub occurred_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RecoveryRecord {
    /// Creates a new `NOT_RESTORED` record from a provider transaction.
    #[must_use]
    pub fn from_transaction(transaction: &ProviderTransaction, now: DateTime<Utc>) -> Self {
        let (amount, plan_type) = match transaction.kind() {
            TransactionKind::Payment => {
                let mapping = map_amount(transaction.amount);
                (mapping.net_amount, Some(mapping.plan))
            }
            TransactionKind::Payout => (transaction.amount, None),
        };

        Self {
            id: RecordId::new(),
            reference: transaction.reference,
            provider: transaction.provider,
            kind: transaction.kind(),
            candidate_email: transaction.hints.email.clone(),
            candidate_phone: transaction.hints.phone.clone(),
            candidate_provider_user_id: transaction.hints.provider_user_id.clone(),
            amount,
            gross_amount: transaction.amount,
            plan_type,
            currency: transaction.currency.clone(),
            provider_status: transaction.status.clone(),
            session_id: transaction.session_id.clone(),
            payload: transaction.payload.clone(),
            recovery_status: RecoveryStatus::NotRestored,
            restored_user_id: None,
            restored_transaction_id: None,
            restored_at: None,
            occurred_at: transaction.occurred_at,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuilds the provider transaction this record was parked from, for restoration.
    #[must_use]
    pub fn to_transaction(&self) -> ProviderTransaction {
        ProviderTransaction {
            provider: self.provider,
            reference: self.reference,
            kind: KindClassification::declared(self.kind),
            status: self.provider_status.clone(),
            amount: self.gross_amount,
            currency: self.currency.clone(),
            hints: self.hints(),
            session_id: self.session_id.clone(),
            occurred_at: self.occurred_at,
            payload: self.payload.clone(),
        }
    }

    /// Returns the candidate identity hints of the record.
    #[must_use]
    pub fn hints(&self) -> IdentityHints {
        IdentityHints {
            email: self.candidate_email.clone(),
            phone: self.candidate_phone.clone(),
            provider_user_id: self.candidate_provider_user_id.clone(),
        }
    }

    #[must_use]
    pub fn is_restored(&self) -> bool {
        self.recovery_status == RecoveryStatus::Restored
    }

    /// Applies the restoration transition.
    ///
    /// `canonical_id` is `None` when the record is swept in bulk without its own canonical record.
    /// Returns `false` without modifying the record when it is already restored.
    pub fn mark_restored(
        &mut self,
        user_id: UserId,
        canonical_id: Option<CanonicalId>,
        ts: DateTime<Utc>,
    ) -> bool {
        match self.recovery_status.apply(RecoveryTrigger::Restore) {
            Ok(status) => {
                self.recovery_status = status;
                self.restored_user_id = Some(user_id);
                self.restored_transaction_id = canonical_id;
                self.restored_at = Some(ts);
                self.updated_at = ts;
                true
            }
            Err(_) => false,
        }
    }
}

impl Display for RecoveryRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}(id={}, provider={}, reference={}, kind={}, amount={} {}, status={})",
            stringify!(RecoveryRecord),
            self.id,
            self.provider,
            self.reference,
            self.kind,
            self.amount,
            self.currency,
            self.recovery_status,
        )
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use rstest::rstest;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::{identifiers::stubs::*, stubs::*};

    #[rstest]
    fn test_from_payment_maps_net_amount(provider_transaction_payment: ProviderTransaction) {
        let record = RecoveryRecord::from_transaction(&provider_transaction_payment, Utc::now());
        assert_eq!(record.amount, dec!(2070));
        assert_eq!(record.gross_amount, dec!(2142));
        assert_eq!(record.plan_type, Some(PlanType::Classique));
        assert_eq!(record.recovery_status, RecoveryStatus::NotRestored);
        assert_eq!(record.candidate_phone.as_deref(), Some("+237670000001"));
    }

    #[rstest]
    fn test_from_payout_keeps_amount(provider_transaction_payout: ProviderTransaction) {
        let record = RecoveryRecord::from_transaction(&provider_transaction_payout, Utc::now());
        assert_eq!(record.amount, dec!(1500));
        assert_eq!(record.plan_type, None);
    }

    #[rstest]
    fn test_to_transaction_restores_gross(provider_transaction_payment: ProviderTransaction) {
        let record = RecoveryRecord::from_transaction(&provider_transaction_payment, Utc::now());
        let transaction = record.to_transaction();
        assert_eq!(transaction.amount, dec!(2142));
        assert_eq!(transaction.reference, provider_transaction_payment.reference);
        assert_eq!(transaction.hints, provider_transaction_payment.hints);
        assert_eq!(transaction.payload, provider_transaction_payment.payload);
    }

    #[rstest]
    fn test_mark_restored_is_idempotent(
        mut recovery_record: RecoveryRecord,
        user_id: UserId,
        canonical_id: CanonicalId,
    ) {
        let ts = Utc::now();
        assert!(recovery_record.mark_restored(user_id, Some(canonical_id), ts));
        assert!(recovery_record.is_restored());
        assert_eq!(recovery_record.restored_user_id, Some(user_id));
        assert_eq!(recovery_record.restored_at, Some(ts));

        let other = UserId::new("someone-else");
        assert!(!recovery_record.mark_restored(
            other,
            Some(CanonicalId::new("TX-9")),
            Utc::now()
        ));
        assert_eq!(recovery_record.restored_user_id, Some(user_id));
        assert_eq!(recovery_record.restored_at, Some(ts));
        assert_eq!(recovery_record.restored_transaction_id, Some(canonical_id));
    }

    #[rstest]
    fn test_bulk_mark_without_canonical(mut recovery_record: RecoveryRecord, user_id: UserId) {
        assert!(recovery_record.mark_restored(user_id, None, Utc::now()));
        assert!(recovery_record.is_restored());
        assert_eq!(recovery_record.restored_transaction_id, None);
    }

    #[rstest]
    fn test_serde_json(recovery_record: RecoveryRecord) {
        let json = serde_json::to_string(&recovery_record).unwrap();
        let parsed: RecoveryRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, recovery_record);
    }
}

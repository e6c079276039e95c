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

//! Views of the platform's own transaction and payment intent records.
//!
//! These records are owned by the platform. The recovery engine only creates them through the
//! canonical store seam and reads back what it needs for deduplication.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    enums::{IntentStatus, PlanType, Provider, TransactionKind},
    identifiers::{CanonicalId, Reference, UserId},
};

/// A platform transaction, unique on `external_reference`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CanonicalTransaction {
    pub id: CanonicalId,
    pub user_id: UserId,
    pub provider: Provider,
    pub kind: TransactionKind,
    pub external_reference: Reference,
    pub amount: Decimal,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

/// A withdrawal to materialize for a restored payout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewWithdrawal {
    pub user_id: UserId,
    pub provider: Provider,
    pub external_reference: Reference,
    pub amount: Decimal,
    pub currency: String,
    pub recipient_phone: Option<String>,
}

/// A platform payment intent, unique on `(provider, session_id)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CanonicalPaymentIntent {
    pub id: CanonicalId,
    pub user_id: UserId,
    pub provider: Provider,
    pub session_id: String,
    pub provider_payment_id: Option<String>,
    pub plan: PlanType,
    pub amount: Decimal,
    pub currency: String,
    pub status: IntentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CanonicalPaymentIntent {
    #[must_use]
    pub fn is_succeeded(&self) -> bool {
        self.status == IntentStatus::Succeeded
    }
}

/// A payment intent to materialize in the `SUCCEEDED` state for a restored payment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewPaymentIntent {
    pub user_id: UserId,
    pub provider: Provider,
    pub session_id: String,
    pub provider_payment_id: Option<String>,
    pub plan: PlanType,
    pub amount: Decimal,
    pub currency: String,
}

/// Returns the session identifier attached to a restored payment whose provider did not supply one.
#[must_use]
pub fn synthesized_session_id(provider: Provider, reference: &Reference) -> String {
    format!("recovery_{}_{}", provider.as_ref().to_lowercase(), reference)
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::identifiers::stubs::*;

    #[rstest]
    fn test_synthesized_session_id(reference: Reference) {
        assert_eq!(
            synthesized_session_id(Provider::CinetPay, &reference),
            "recovery_cinetpay_CP-20240512-0001"
        );
    }
}

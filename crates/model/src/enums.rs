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

//! Enumerations for the recovery domain model.

use std::collections::HashMap;

use reclaim_core::fsm::{FiniteStateMachine, InvalidStateTrigger};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// A money-movement provider whose transactions can be recovered.
#[derive(
    Copy,
    Clone,
    Debug,
    Display,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    AsRefStr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum Provider {
    /// CinetPay (collections and transfers, West and Central Africa).
    #[serde(rename = "CINETPAY")]
    #[strum(serialize = "CINETPAY")]
    CinetPay,
    /// FeexPay (single unified status endpoint for collections and payouts).
    #[serde(rename = "FEEXPAY")]
    #[strum(serialize = "FEEXPAY")]
    FeexPay,
}

/// The direction of a provider transaction.
#[derive(
    Copy,
    Clone,
    Debug,
    Display,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    AsRefStr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive, serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    /// Inbound money, typically a subscription purchase.
    Payment,
    /// Outbound money, a withdrawal to the user's mobile money account.
    Payout,
}

impl TransactionKind {
    /// Returns the signed balance adjustment the restoration applies directly for `amount`.
    ///
    /// Payouts debit the user. Payments grant an entitlement through the completion
    /// pipeline and carry no direct balance adjustment, so `None` is returned.
    #[must_use]
    pub fn balance_delta(self, amount: Decimal) -> Option<Decimal> {
        match self {
            Self::Payment => None,
            Self::Payout => Some(-amount),
        }
    }
}

/// The transaction kind requested by the operator for a reconciliation run.
#[derive(
    Copy,
    Clone,
    Debug,
    Display,
    Hash,
    PartialEq,
    Eq,
    AsRefStr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive, serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KindSelector {
    /// Every reference is a payment.
    Payment,
    /// Every reference is a payout.
    Payout,
    /// The adapter infers the kind of each reference.
    Auto,
}

impl KindSelector {
    /// Returns the declared kind, if the selector declares one.
    #[must_use]
    pub fn declared(self) -> Option<TransactionKind> {
        match self {
            Self::Payment => Some(TransactionKind::Payment),
            Self::Payout => Some(TransactionKind::Payout),
            Self::Auto => None,
        }
    }
}

impl From<TransactionKind> for KindSelector {
    fn from(value: TransactionKind) -> Self {
        match value {
            TransactionKind::Payment => Self::Payment,
            TransactionKind::Payout => Self::Payout,
        }
    }
}

/// How the kind of a transaction was established.
#[derive(
    Copy,
    Clone,
    Debug,
    Display,
    Hash,
    PartialEq,
    Eq,
    AsRefStr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KindProvenance {
    /// Declared by the caller.
    Declared,
    /// Implied by the provider endpoint that answered.
    Endpoint,
    /// Inferred from the payload shape (session identifier or plain recipient).
    PayloadShape,
    /// Inferred from a fixed plan amount.
    FixedAmount,
    /// Implied by the export file type.
    Export,
    /// Nothing conclusive, a default was applied.
    Fallback,
}

/// The confidence attached to a kind classification.
#[derive(
    Copy,
    Clone,
    Debug,
    Display,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    AsRefStr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClassificationConfidence {
    /// Heuristic evidence only.
    Low,
    /// Explicit or structural evidence.
    High,
}

/// The recovery status of a ledger record.
///
/// The only transition is `NOT_RESTORED -> RESTORED`, which is terminal.
#[derive(
    Copy,
    Clone,
    Debug,
    Display,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    AsRefStr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive, serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecoveryStatus {
    /// Parked, waiting for the owning user to be identified.
    NotRestored,
    /// Linked to a platform user and materialized as a canonical record.
    Restored,
}

/// The trigger driving a [`RecoveryStatus`] transition.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
pub enum RecoveryTrigger {
    /// The record was restored for a user.
    Restore,
}

impl RecoveryStatus {
    /// Returns the state machine governing recovery status transitions, starting at `self`.
    #[must_use]
    pub fn state_machine(self) -> FiniteStateMachine<Self, RecoveryTrigger> {
        FiniteStateMachine::new(
            self,
            HashMap::from([((Self::NotRestored, RecoveryTrigger::Restore), Self::Restored)]),
        )
    }

    /// Applies `trigger` to `self`, returning the next status.
    ///
    /// # Errors
    ///
    /// Returns an error if the transition is not permitted (e.g. restoring twice).
    pub fn apply(self, trigger: RecoveryTrigger) -> Result<Self, InvalidStateTrigger> {
        self.state_machine().trigger(trigger)
    }
}

/// The subscription plan a payment amount corresponds to.
#[derive(
    Copy,
    Clone,
    Debug,
    Display,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    AsRefStr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive, serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanType {
    /// Entry-level subscription.
    Classique,
    /// Targeted subscription.
    Cible,
    /// Upgrade from `CLASSIQUE` to `CIBLE`.
    Upgrade,
    /// The amount matched no known plan price.
    Unknown,
}

impl PlanType {
    /// Returns the entitlement granted once a payment for this plan completes.
    #[must_use]
    pub fn entitlement(self) -> Option<EntitlementKind> {
        match self {
            Self::Classique => Some(EntitlementKind::Classique),
            Self::Cible | Self::Upgrade => Some(EntitlementKind::Cible),
            Self::Unknown => None,
        }
    }
}

/// An active subscription held by a platform user.
#[derive(
    Copy,
    Clone,
    Debug,
    Display,
    Hash,
    PartialEq,
    Eq,
    AsRefStr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive, serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntitlementKind {
    /// The `CLASSIQUE` subscription.
    Classique,
    /// The `CIBLE` subscription.
    Cible,
}

/// The status of a canonical payment intent.
#[derive(
    Copy,
    Clone,
    Debug,
    Display,
    Hash,
    PartialEq,
    Eq,
    AsRefStr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntentStatus {
    /// Created, waiting for the provider webhook.
    Pending,
    /// Paid and processed.
    Succeeded,
    /// Declined or abandoned.
    Failed,
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rstest::rstest;
    use rust_decimal_macros::dec;

    use super::*;

    #[rstest]
    #[case("CINETPAY", Provider::CinetPay)]
    #[case("cinetpay", Provider::CinetPay)]
    #[case("FeexPay", Provider::FeexPay)]
    fn test_provider_from_str(#[case] value: &str, #[case] expected: Provider) {
        assert_eq!(Provider::from_str(value).unwrap(), expected);
    }

    #[rstest]
    fn test_provider_serde() {
        assert_eq!(
            serde_json::to_string(&Provider::CinetPay).unwrap(),
            "\"CINETPAY\""
        );
        assert_eq!(Provider::FeexPay.to_string(), "FEEXPAY");
    }

    #[rstest]
    fn test_recovery_status_strings() {
        assert_eq!(RecoveryStatus::NotRestored.to_string(), "NOT_RESTORED");
        assert_eq!(
            RecoveryStatus::from_str("restored").unwrap(),
            RecoveryStatus::Restored
        );
    }

    #[rstest]
    fn test_recovery_status_is_one_way() {
        assert_eq!(
            RecoveryStatus::NotRestored
                .apply(RecoveryTrigger::Restore)
                .unwrap(),
            RecoveryStatus::Restored
        );
        assert!(
            RecoveryStatus::Restored
                .apply(RecoveryTrigger::Restore)
                .is_err()
        );
    }

    #[rstest]
    #[case(TransactionKind::Payout, dec!(1500), Some(dec!(-1500)))]
    #[case(TransactionKind::Payment, dec!(2070), None)]
    fn test_balance_delta(
        #[case] kind: TransactionKind,
        #[case] amount: Decimal,
        #[case] expected: Option<Decimal>,
    ) {
        assert_eq!(kind.balance_delta(amount), expected);
    }

    #[rstest]
    #[case(PlanType::Classique, Some(EntitlementKind::Classique))]
    #[case(PlanType::Cible, Some(EntitlementKind::Cible))]
    #[case(PlanType::Upgrade, Some(EntitlementKind::Cible))]
    #[case(PlanType::Unknown, None)]
    fn test_plan_entitlement(#[case] plan: PlanType, #[case] expected: Option<EntitlementKind>) {
        assert_eq!(plan.entitlement(), expected);
    }

    #[rstest]
    fn test_kind_selector_declared() {
        assert_eq!(
            KindSelector::Payout.declared(),
            Some(TransactionKind::Payout)
        );
        assert_eq!(KindSelector::Auto.declared(), None);
        assert_eq!(KindSelector::from_str("auto").unwrap(), KindSelector::Auto);
    }
}

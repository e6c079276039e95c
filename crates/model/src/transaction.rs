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

//! The normalized transaction emitted by every provider adapter.

use std::fmt::Display;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    enums::{ClassificationConfidence, KindProvenance, Provider, TransactionKind},
    identifiers::Reference,
    payload::ProviderPayload,
    phone::phone_variants,
};

/// Identity hints extracted from a provider payload.
///
/// Empty strings are never stored: constructors and setters collapse them to `None`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityHints {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub provider_user_id: Option<String>,
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

impl IdentityHints {
    /// Creates a new [`IdentityHints`] instance.
    #[must_use]
    pub fn new(email: Option<&str>, phone: Option<&str>, provider_user_id: Option<&str>) -> Self {
        Self {
            email: non_empty(email).map(|e| e.to_lowercase()),
            phone: non_empty(phone),
            provider_user_id: non_empty(provider_user_id),
        }
    }

    #[must_use]
    pub fn with_email(mut self, email: Option<&str>) -> Self {
        if self.email.is_none() {
            self.email = non_empty(email).map(|e| e.to_lowercase());
        }
        self
    }

    #[must_use]
    pub fn with_phone(mut self, phone: Option<&str>) -> Self {
        if self.phone.is_none() {
            self.phone = non_empty(phone);
        }
        self
    }

    #[must_use]
    pub fn with_provider_user_id(mut self, provider_user_id: Option<&str>) -> Self {
        if self.provider_user_id.is_none() {
            self.provider_user_id = non_empty(provider_user_id);
        }
        self
    }

    /// Returns whether no hint is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.phone.is_none() && self.provider_user_id.is_none()
    }

    /// Returns the lookup variants of the phone hint.
    #[must_use]
    pub fn phone_variants(&self) -> Vec<String> {
        self.phone.as_deref().map(phone_variants).unwrap_or_default()
    }

    /// Returns whether `self` and `other` share at least one identity.
    ///
    /// Emails compare case-insensitively, phones compare on any variant and provider user ids
    /// compare exactly.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        let email = matches!(
            (&self.email, &other.email),
            (Some(a), Some(b)) if a.eq_ignore_ascii_case(b)
        );
        let user = matches!(
            (&self.provider_user_id, &other.provider_user_id),
            (Some(a), Some(b)) if a == b
        );
        let phone = {
            let ours = self.phone_variants();
            !ours.is_empty()
                && other
                    .phone_variants()
                    .iter()
                    .any(|variant| ours.contains(variant))
        };
        email || user || phone
    }
}

impl Display for IdentityHints {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "email={}, phone={}, provider_user_id={}",
            self.email.as_deref().unwrap_or("-"),
            self.phone.as_deref().unwrap_or("-"),
            self.provider_user_id.as_deref().unwrap_or("-"),
        )
    }
}

/// A typed transaction kind with the evidence it was established from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindClassification {
    pub kind: TransactionKind,
    pub provenance: KindProvenance,
    pub confidence: ClassificationConfidence,
}

impl KindClassification {
    /// Creates a new [`KindClassification`] instance.
    #[must_use]
    pub const fn new(
        kind: TransactionKind,
        provenance: KindProvenance,
        confidence: ClassificationConfidence,
    ) -> Self {
        Self {
            kind,
            provenance,
            confidence,
        }
    }

    /// A classification declared by the caller.
    #[must_use]
    pub const fn declared(kind: TransactionKind) -> Self {
        Self::new(kind, KindProvenance::Declared, ClassificationConfidence::High)
    }

    #[must_use]
    pub fn is_low_confidence(&self) -> bool {
        self.confidence == ClassificationConfidence::Low
    }
}

impl Display for KindClassification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}, {})", self.kind, self.provenance, self.confidence)
    }
}

/// A provider transaction normalized by an adapter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProviderTransaction {
    pub provider: Provider,
    pub reference: Reference,
    pub kind: KindClassification,
    /// Raw provider status string.
    pub status: String,
    /// Amount as reported by the provider (gross for payments).
    pub amount: Decimal,
    pub currency: String,
    pub hints: IdentityHints,
    /// Provider session identifier, when the payment was initiated through a checkout session.
    pub session_id: Option<String>,
    pub occurred_at: Option<DateTime<Utc>>,
    pub payload: ProviderPayload,
}

impl ProviderTransaction {
    /// Returns the transaction kind.
    #[must_use]
    pub fn kind(&self) -> TransactionKind {
        self.kind.kind
    }
}

impl Display for ProviderTransaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}(provider={}, reference={}, kind={}, status={}, amount={} {})",
            stringify!(ProviderTransaction),
            self.provider,
            self.reference,
            self.kind.kind,
            self.status,
            self.amount,
            self.currency,
        )
    }
}

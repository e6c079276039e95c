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

//! The recovery ledger: a durable store of provider transactions awaiting attribution.

pub mod memory;

use std::collections::BTreeMap;

use async_trait::async_trait;
use reclaim_model::{
    enums::{Provider, RecoveryStatus, TransactionKind},
    identifiers::{CanonicalId, RecordId, Reference, UserId},
    record::RecoveryRecord,
    transaction::IdentityHints,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The maximum number of records returned by a single page.
pub const MAX_PER_PAGE: u32 = 100;

/// The default number of records returned by a single page.
pub const DEFAULT_PER_PAGE: u32 = 20;

/// A typed error returned by ledger implementations.
#[derive(Clone, Debug, Error)]
pub enum LedgerError {
    /// The `(provider, reference)` key is already tracked.
    #[error("Duplicate record for {provider} reference {reference}")]
    DuplicateRecord {
        provider: Provider,
        reference: Reference,
    },
    /// No record exists with the given ID.
    #[error("Record not found: {0}")]
    NotFound(RecordId),
    /// The storage backend failed.
    #[error("Ledger backend error: {0}")]
    Backend(String),
}

/// Filters applied when listing ledger records.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFilter {
    pub provider: Option<Provider>,
    pub kind: Option<TransactionKind>,
    pub status: Option<RecoveryStatus>,
    /// Case-insensitive substring of the candidate email.
    pub email_contains: Option<String>,
    /// Substring of the candidate phone.
    pub phone_contains: Option<String>,
}

impl RecordFilter {
    /// Returns whether `record` passes the filter.
    #[must_use]
    pub fn matches(&self, record: &RecoveryRecord) -> bool {
        if self.provider.is_some_and(|p| p != record.provider)
            || self.kind.is_some_and(|k| k != record.kind)
            || self.status.is_some_and(|s| s != record.recovery_status)
        {
            return false;
        }
        if let Some(needle) = &self.email_contains {
            let needle = needle.to_lowercase();
            if !record
                .candidate_email
                .as_deref()
                .is_some_and(|email| email.to_lowercase().contains(&needle))
            {
                return false;
            }
        }
        if let Some(needle) = &self.phone_contains
            && !record
                .candidate_phone
                .as_deref()
                .is_some_and(|phone| phone.contains(needle.as_str()))
        {
            return false;
        }
        true
    }
}

/// A 1-based page request, with `per_page` capped at [`MAX_PER_PAGE`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    /// Creates a new [`PageRequest`] instance, clamping both values to their valid ranges.
    #[must_use]
    pub fn new(page: Option<u32>, per_page: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE),
        }
    }

    /// Returns the number of records to skip.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of results.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
}

impl<T> Page<T> {
    /// Returns the total number of pages.
    #[must_use]
    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(u64::from(self.per_page.max(1)))
    }
}

/// Aggregate ledger counts.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerStatistics {
    pub total: u64,
    pub by_provider: BTreeMap<Provider, u64>,
    pub by_kind: BTreeMap<TransactionKind, u64>,
    pub by_status: BTreeMap<RecoveryStatus, u64>,
}

impl LedgerStatistics {
    /// Accumulates `record` into the counts.
    pub fn add(&mut self, record: &RecoveryRecord) {
        self.total += 1;
        *self.by_provider.entry(record.provider).or_default() += 1;
        *self.by_kind.entry(record.kind).or_default() += 1;
        *self.by_status.entry(record.recovery_status).or_default() += 1;
    }

    /// Returns the number of records still awaiting attribution.
    #[must_use]
    pub fn not_restored(&self) -> u64 {
        self.by_status
            .get(&RecoveryStatus::NotRestored)
            .copied()
            .unwrap_or_default()
    }

    /// Returns the number of restored records.
    #[must_use]
    pub fn restored(&self) -> u64 {
        self.by_status
            .get(&RecoveryStatus::Restored)
            .copied()
            .unwrap_or_default()
    }
}

/// Durable store of provider transactions that could not be attributed to a platform user.
///
/// Implementations must enforce uniqueness of `(provider, reference)` at creation, and must
/// apply the restoration transition atomically so that re-marking is a no-op.
#[async_trait]
pub trait RecoveryLedger: Send + Sync {
    /// Returns whether a record exists for `(provider, reference)`, whatever its status.
    async fn exists(&self, provider: Provider, reference: &Reference)
    -> Result<bool, LedgerError>;

    /// Persists a new record.
    ///
    /// Fails with [`LedgerError::DuplicateRecord`] when the key is already tracked.
    async fn create(&self, record: RecoveryRecord) -> Result<RecoveryRecord, LedgerError>;

    /// Returns the record with the given ID.
    async fn get(&self, id: RecordId) -> Result<Option<RecoveryRecord>, LedgerError>;

    /// Returns the `NOT_RESTORED` records sharing any identity with `hints`, oldest first.
    async fn find_matching(&self, hints: &IdentityHints)
    -> Result<Vec<RecoveryRecord>, LedgerError>;

    /// Applies the restoration transition to one record.
    ///
    /// Returns `false` when the record was already restored.
    /// Fails with [`LedgerError::NotFound`] when no such record exists.
    async fn mark_restored(
        &self,
        id: RecordId,
        user_id: UserId,
        canonical_id: Option<CanonicalId>,
    ) -> Result<bool, LedgerError>;

    /// Marks every remaining `NOT_RESTORED` record matching `hints` as restored for `user_id`,
    /// except the records in `exclude`. Returns the number of records transitioned.
    async fn bulk_mark_restored(
        &self,
        hints: &IdentityHints,
        user_id: UserId,
        exclude: &[RecordId],
    ) -> Result<u64, LedgerError>;

    /// Returns aggregate counts by provider, kind and status.
    async fn statistics(&self) -> Result<LedgerStatistics, LedgerError>;

    /// Returns one page of records passing `filter`, newest first.
    async fn list(
        &self,
        filter: &RecordFilter,
        page: PageRequest,
    ) -> Result<Page<RecoveryRecord>, LedgerError>;
}

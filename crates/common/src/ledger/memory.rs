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

//! An in-memory [`RecoveryLedger`] for tests and dry runs.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;
use indexmap::IndexMap;
use reclaim_model::{
    enums::Provider,
    identifiers::{CanonicalId, RecordId, Reference, UserId},
    record::RecoveryRecord,
    transaction::IdentityHints,
};

use super::{LedgerError, LedgerStatistics, Page, PageRequest, RecordFilter, RecoveryLedger};

/// A [`RecoveryLedger`] holding records in insertion order in process memory.
#[derive(Debug, Default)]
pub struct InMemoryRecoveryLedger {
    records: RwLock<IndexMap<RecordId, RecoveryRecord>>,
}

impl InMemoryRecoveryLedger {
    /// Creates a new empty [`InMemoryRecoveryLedger`] instance.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of every record, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned.
    pub fn records(&self) -> Result<Vec<RecoveryRecord>, LedgerError> {
        Ok(self.read()?.values().cloned().collect())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, IndexMap<RecordId, RecoveryRecord>>, LedgerError> {
        self.records
            .read()
            .map_err(|e| LedgerError::Backend(e.to_string()))
    }

    fn write(
        &self,
    ) -> Result<RwLockWriteGuard<'_, IndexMap<RecordId, RecoveryRecord>>, LedgerError> {
        self.records
            .write()
            .map_err(|e| LedgerError::Backend(e.to_string()))
    }
}

#[async_trait]
impl RecoveryLedger for InMemoryRecoveryLedger {
    async fn exists(
        &self,
        provider: Provider,
        reference: &Reference,
    ) -> Result<bool, LedgerError> {
        Ok(self
            .read()?
            .values()
            .any(|r| r.provider == provider && r.reference == *reference))
    }

    async fn create(&self, record: RecoveryRecord) -> Result<RecoveryRecord, LedgerError> {
        let mut records = self.write()?;
        if records
            .values()
            .any(|r| r.provider == record.provider && r.reference == record.reference)
        {
            return Err(LedgerError::DuplicateRecord {
                provider: record.provider,
                reference: record.reference,
            });
        }
        records.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get(&self, id: RecordId) -> Result<Option<RecoveryRecord>, LedgerError> {
        Ok(self.read()?.get(&id).cloned())
    }

    async fn find_matching(
        &self,
        hints: &IdentityHints,
    ) -> Result<Vec<RecoveryRecord>, LedgerError> {
        let mut matches: Vec<RecoveryRecord> = self
            .read()?
            .values()
            .filter(|r| !r.is_restored() && r.hints().overlaps(hints))
            .cloned()
            .collect();
        // Stable sort keeps insertion order for equal timestamps
        matches.sort_by_key(|r| r.created_at);
        Ok(matches)
    }

    async fn mark_restored(
        &self,
        id: RecordId,
        user_id: UserId,
        canonical_id: Option<CanonicalId>,
    ) -> Result<bool, LedgerError> {
        let mut records = self.write()?;
        let record = records.get_mut(&id).ok_or(LedgerError::NotFound(id))?;
        Ok(record.mark_restored(user_id, canonical_id, Utc::now()))
    }

    async fn bulk_mark_restored(
        &self,
        hints: &IdentityHints,
        user_id: UserId,
        exclude: &[RecordId],
    ) -> Result<u64, LedgerError> {
        let now = Utc::now();
        let mut records = self.write()?;
        let mut count = 0;
        for record in records.values_mut() {
            if exclude.contains(&record.id) || !record.hints().overlaps(hints) {
                continue;
            }
            if record.mark_restored(user_id, None, now) {
                count += 1;
            }
        }
        tracing::debug!("Bulk marked {count} record(s) restored for user {user_id}");
        Ok(count)
    }

    async fn statistics(&self) -> Result<LedgerStatistics, LedgerError> {
        let mut stats = LedgerStatistics::default();
        for record in self.read()?.values() {
            stats.add(record);
        }
        Ok(stats)
    }

    async fn list(
        &self,
        filter: &RecordFilter,
        page: PageRequest,
    ) -> Result<Page<RecoveryRecord>, LedgerError> {
        let records = self.read()?;
        let mut matching: Vec<&RecoveryRecord> =
            records.values().filter(|r| filter.matches(r)).collect();
        // Later insertions first among equal timestamps
        matching.reverse();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
            .take(page.per_page as usize)
            .cloned()
            .collect();

        Ok(Page {
            items,
            page: page.page,
            per_page: page.per_page,
            total,
        })
    }
}

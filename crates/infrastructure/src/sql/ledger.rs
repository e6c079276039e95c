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

//! A [`RecoveryLedger`] persisted in PostgreSQL.

use async_trait::async_trait;
use chrono::Utc;
use reclaim_common::ledger::{
    LedgerError, LedgerStatistics, Page, PageRequest, RecordFilter, RecoveryLedger,
};
use reclaim_model::{
    enums::Provider,
    identifiers::{CanonicalId, RecordId, Reference, UserId},
    record::RecoveryRecord,
    transaction::IdentityHints,
};
use sqlx::{PgPool, postgres::PgConnectOptions};

use super::{
    pg::{PostgresConnectOptions, connect_pg, get_postgres_connect_options},
    queries::DatabaseQueries,
};

/// Recovery ledger backed by the `recovery_records` table.
///
/// Uniqueness of `(provider, reference)` and the one-way restoration transition are enforced
/// by the database, so concurrent writers cannot double-park or double-restore a record.
#[derive(Debug, Clone)]
pub struct PostgresRecoveryLedger {
    pool: PgPool,
}

impl PostgresRecoveryLedger {
    /// Creates a new [`PostgresRecoveryLedger`] over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects using options resolved from `POSTGRES_*` environment variables or defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the options are invalid or the connection fails.
    pub async fn connect(options: Option<PostgresConnectOptions>) -> anyhow::Result<Self> {
        let options = match options {
            Some(options) => options,
            None => get_postgres_connect_options(None, None, None, None, None)?,
        };
        tracing::debug!(
            "Connecting to ledger database at {}",
            options.redacted_connection_string()
        );
        let pool = connect_pg(PgConnectOptions::from(options)).await?;
        Ok(Self::new(pool))
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Deletes every record. Intended for test databases.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be truncated.
    pub async fn truncate(&self) -> Result<(), LedgerError> {
        DatabaseQueries::truncate(&self.pool).await
    }
}

#[async_trait]
impl RecoveryLedger for PostgresRecoveryLedger {
    async fn exists(
        &self,
        provider: Provider,
        reference: &Reference,
    ) -> Result<bool, LedgerError> {
        DatabaseQueries::exists(&self.pool, provider, reference).await
    }

    async fn create(&self, record: RecoveryRecord) -> Result<RecoveryRecord, LedgerError> {
        DatabaseQueries::insert_record(&self.pool, &record).await?;
        tracing::debug!("Parked {record}");
        Ok(record)
    }

    async fn get(&self, id: RecordId) -> Result<Option<RecoveryRecord>, LedgerError> {
        DatabaseQueries::load_record(&self.pool, id).await
    }

    async fn find_matching(
        &self,
        hints: &IdentityHints,
    ) -> Result<Vec<RecoveryRecord>, LedgerError> {
        DatabaseQueries::load_matching(&self.pool, hints).await
    }

    async fn mark_restored(
        &self,
        id: RecordId,
        user_id: UserId,
        canonical_id: Option<CanonicalId>,
    ) -> Result<bool, LedgerError> {
        let changed = DatabaseQueries::mark_restored(
            &self.pool,
            id,
            &user_id,
            canonical_id.as_ref(),
            Utc::now(),
        )
        .await?;
        if changed {
            return Ok(true);
        }

        // No row changed: either already restored or unknown
        match DatabaseQueries::load_record(&self.pool, id).await? {
            Some(_) => Ok(false),
            None => Err(LedgerError::NotFound(id)),
        }
    }

    async fn bulk_mark_restored(
        &self,
        hints: &IdentityHints,
        user_id: UserId,
        exclude: &[RecordId],
    ) -> Result<u64, LedgerError> {
        DatabaseQueries::bulk_mark_restored(&self.pool, hints, &user_id, exclude, Utc::now())
            .await
    }

    async fn statistics(&self) -> Result<LedgerStatistics, LedgerError> {
        DatabaseQueries::load_statistics(&self.pool).await
    }

    async fn list(
        &self,
        filter: &RecordFilter,
        page: PageRequest,
    ) -> Result<Page<RecoveryRecord>, LedgerError> {
        DatabaseQueries::load_page(&self.pool, filter, page).await
    }
}

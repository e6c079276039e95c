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

use chrono::{DateTime, Utc};
use reclaim_common::ledger::{LedgerError, LedgerStatistics, Page, PageRequest, RecordFilter};
use reclaim_model::{
    enums::{Provider, RecoveryStatus},
    identifiers::{CanonicalId, RecordId, Reference, UserId},
    phone::phone_variants,
    record::RecoveryRecord,
    transaction::IdentityHints,
};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::models::{
    enums::{PlanTypeModel, ProviderModel, RecoveryStatusModel, TransactionKindModel},
    record::{RecordCountModel, RecoveryRecordModel},
};

/// The SQLSTATE for a unique constraint violation.
const UNIQUE_VIOLATION: &str = "23505";

/// Matches unrestored rows sharing an identity with the hints bound at `$1..$3`.
const MATCH_HINTS: &str = "recovery_status = 'NOT_RESTORED' AND (\
     ($1::text IS NOT NULL AND lower(candidate_email) = lower($1::text)) \
     OR candidate_phone_keys && $2::text[] \
     OR ($3::text IS NOT NULL AND candidate_provider_user_id = $3::text))";

fn backend_error(context: &str, e: &sqlx::Error) -> LedgerError {
    LedgerError::Backend(format!("{context}: {e}"))
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION))
}

fn count_to_u64(count: i64) -> u64 {
    u64::try_from(count).unwrap_or_default()
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &RecordFilter) {
    builder.push(" WHERE TRUE");
    if let Some(provider) = filter.provider {
        builder
            .push(" AND provider = ")
            .push_bind(ProviderModel(provider));
    }
    if let Some(kind) = filter.kind {
        builder
            .push(" AND kind = ")
            .push_bind(TransactionKindModel(kind));
    }
    if let Some(status) = filter.status {
        builder
            .push(" AND recovery_status = ")
            .push_bind(RecoveryStatusModel(status));
    }
    if let Some(email) = &filter.email_contains {
        builder
            .push(" AND strpos(lower(candidate_email), lower(")
            .push_bind(email.clone())
            .push(")) > 0");
    }
    if let Some(phone) = &filter.phone_contains {
        builder
            .push(" AND strpos(candidate_phone, ")
            .push_bind(phone.clone())
            .push(") > 0");
    }
}

#[derive(Debug)]
pub struct DatabaseQueries;

impl DatabaseQueries {
    pub async fn exists(
        pool: &PgPool,
        provider: Provider,
        reference: &Reference,
    ) -> Result<bool, LedgerError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM recovery_records WHERE provider = $1 AND reference = $2)",
        )
        .bind(ProviderModel(provider))
        .bind(reference.as_str())
        .fetch_one(pool)
        .await
        .map_err(|e| backend_error("Failed to check record existence", &e))
    }

    pub async fn insert_record(
        pool: &PgPool,
        record: &RecoveryRecord,
    ) -> Result<(), LedgerError> {
        let phone_keys = record
            .candidate_phone
            .as_deref()
            .map(phone_variants)
            .unwrap_or_default();

        sqlx::query(
            r"INSERT INTO recovery_records (
                id, reference, provider, kind, candidate_email, candidate_phone,
                candidate_phone_keys, candidate_provider_user_id, amount, gross_amount, plan_type,
                currency, provider_status, session_id, payload, recovery_status, restored_user_id,
                restored_transaction_id, restored_at, occurred_at, created_at, updated_at
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11,
                $12, $13, $14, $15, $16, $17, $18, $19, $20, $21, $22
            )",
        )
        .bind(record.id.as_uuid())
        .bind(record.reference.as_str())
        .bind(ProviderModel(record.provider))
        .bind(TransactionKindModel(record.kind))
        .bind(record.candidate_email.as_deref())
        .bind(record.candidate_phone.as_deref())
        .bind(phone_keys)
        .bind(record.candidate_provider_user_id.as_deref())
        .bind(record.amount)
        .bind(record.gross_amount)
        .bind(record.plan_type.map(PlanTypeModel))
        .bind(record.currency.as_str())
        .bind(record.provider_status.as_str())
        .bind(record.session_id.as_deref())
        .bind(record.payload.to_json())
        .bind(RecoveryStatusModel(record.recovery_status))
        .bind(record.restored_user_id.map(|id| id.to_string()))
        .bind(record.restored_transaction_id.map(|id| id.to_string()))
        .bind(record.restored_at)
        .bind(record.occurred_at)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(pool)
        .await
        .map(|_| ())
        .map_err(|e| {
            if is_unique_violation(&e) {
                LedgerError::DuplicateRecord {
                    provider: record.provider,
                    reference: record.reference,
                }
            } else {
                backend_error("Failed to insert into recovery_records", &e)
            }
        })
    }

    pub async fn load_record(
        pool: &PgPool,
        id: RecordId,
    ) -> Result<Option<RecoveryRecord>, LedgerError> {
        sqlx::query_as::<_, RecoveryRecordModel>("SELECT * FROM recovery_records WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(pool)
            .await
            .map(|row| row.map(|model| model.0))
            .map_err(|e| backend_error("Failed to load record", &e))
    }

    pub async fn load_matching(
        pool: &PgPool,
        hints: &IdentityHints,
    ) -> Result<Vec<RecoveryRecord>, LedgerError> {
        if hints.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, RecoveryRecordModel>(&format!(
            "SELECT * FROM recovery_records WHERE {MATCH_HINTS} ORDER BY created_at ASC, id ASC"
        ))
        .bind(hints.email.as_deref())
        .bind(hints.phone_variants())
        .bind(hints.provider_user_id.as_deref())
        .fetch_all(pool)
        .await
        .map(|rows| rows.into_iter().map(|model| model.0).collect())
        .map_err(|e| backend_error("Failed to load matching records", &e))
    }

    /// Applies the restoration transition to one record, returning whether a row changed.
    pub async fn mark_restored(
        pool: &PgPool,
        id: RecordId,
        user_id: &UserId,
        canonical_id: Option<&CanonicalId>,
        ts: DateTime<Utc>,
    ) -> Result<bool, LedgerError> {
        let result = sqlx::query(
            r"UPDATE recovery_records
            SET recovery_status = $2, restored_user_id = $3, restored_transaction_id = $4,
                restored_at = $5, updated_at = $5
            WHERE id = $1 AND recovery_status = 'NOT_RESTORED'",
        )
        .bind(id.as_uuid())
        .bind(RecoveryStatusModel(RecoveryStatus::Restored))
        .bind(user_id.as_str())
        .bind(canonical_id.map(CanonicalId::as_str))
        .bind(ts)
        .execute(pool)
        .await
        .map_err(|e| backend_error("Failed to mark record restored", &e))?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn bulk_mark_restored(
        pool: &PgPool,
        hints: &IdentityHints,
        user_id: &UserId,
        exclude: &[RecordId],
        ts: DateTime<Utc>,
    ) -> Result<u64, LedgerError> {
        if hints.is_empty() {
            return Ok(0);
        }

        let exclude: Vec<Uuid> = exclude.iter().map(RecordId::as_uuid).collect();
        let result = sqlx::query(&format!(
            r"UPDATE recovery_records
            SET recovery_status = 'RESTORED', restored_user_id = $4, restored_at = $5,
                updated_at = $5
            WHERE {MATCH_HINTS} AND NOT (id = ANY($6::uuid[]))"
        ))
        .bind(hints.email.as_deref())
        .bind(hints.phone_variants())
        .bind(hints.provider_user_id.as_deref())
        .bind(user_id.as_str())
        .bind(ts)
        .bind(exclude)
        .execute(pool)
        .await
        .map_err(|e| backend_error("Failed to bulk mark records restored", &e))?;

        Ok(result.rows_affected())
    }

    pub async fn load_statistics(pool: &PgPool) -> Result<LedgerStatistics, LedgerError> {
        let rows = sqlx::query_as::<_, RecordCountModel>(
            r"SELECT provider, kind, recovery_status, COUNT(*) AS count
            FROM recovery_records
            GROUP BY provider, kind, recovery_status",
        )
        .fetch_all(pool)
        .await
        .map_err(|e| backend_error("Failed to load ledger statistics", &e))?;

        let mut stats = LedgerStatistics::default();
        for row in rows {
            let count = count_to_u64(row.count);
            stats.total += count;
            *stats.by_provider.entry(row.provider.0).or_default() += count;
            *stats.by_kind.entry(row.kind.0).or_default() += count;
            *stats.by_status.entry(row.status.0).or_default() += count;
        }
        Ok(stats)
    }

    pub async fn load_page(
        pool: &PgPool,
        filter: &RecordFilter,
        page: PageRequest,
    ) -> Result<Page<RecoveryRecord>, LedgerError> {
        let mut count_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM recovery_records");
        push_filter(&mut count_query, filter);
        let total = count_query
            .build_query_scalar::<i64>()
            .fetch_one(pool)
            .await
            .map_err(|e| backend_error("Failed to count records", &e))?;

        let mut page_query = QueryBuilder::<Postgres>::new("SELECT * FROM recovery_records");
        push_filter(&mut page_query, filter);
        page_query
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(i64::from(page.per_page))
            .push(" OFFSET ")
            .push_bind(i64::try_from(page.offset()).unwrap_or(i64::MAX));
        let items = page_query
            .build_query_as::<RecoveryRecordModel>()
            .fetch_all(pool)
            .await
            .map_err(|e| backend_error("Failed to list records", &e))?
            .into_iter()
            .map(|model| model.0)
            .collect();

        Ok(Page {
            items,
            page: page.page,
            per_page: page.per_page,
            total: count_to_u64(total),
        })
    }

    pub async fn truncate(pool: &PgPool) -> Result<(), LedgerError> {
        sqlx::query("TRUNCATE TABLE recovery_records")
            .execute(pool)
            .await
            .map(|_| ())
            .map_err(|e| backend_error("Failed to truncate recovery_records", &e))
    }
}

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
use reclaim_model::{
    identifiers::{CanonicalId, RecordId, Reference, UserId},
    payload::ProviderPayload,
    record::RecoveryRecord,
};
use rust_decimal::Decimal;
use sqlx::{FromRow, Row, postgres::PgRow};
use uuid::Uuid;

use super::enums::{PlanTypeModel, ProviderModel, RecoveryStatusModel, TransactionKindModel};

/// A [`RecoveryRecord`] decoded from a `recovery_records` row.
#[derive(Debug)]
pub struct RecoveryRecordModel(pub RecoveryRecord);

/// A `(provider, kind, recovery_status, count)` aggregate row.
#[derive(Debug)]
pub struct RecordCountModel {
    pub provider: ProviderModel,
    pub kind: TransactionKindModel,
    pub status: RecoveryStatusModel,
    pub count: i64,
}

fn decode_identifier<'a, T>(
    column: &str,
    value: &'a str,
    parse: impl FnOnce(&'a str) -> anyhow::Result<T>,
) -> Result<T, sqlx::Error> {
    parse(value).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: e.into(),
    })
}

impl<'r> FromRow<'r, PgRow> for RecoveryRecordModel {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let id = row.try_get::<Uuid, _>("id").map(RecordId::from)?;
        let reference = decode_identifier(
            "reference",
            row.try_get::<&str, _>("reference")?,
            Reference::new_checked,
        )?;
        let provider = row.try_get::<ProviderModel, _>("provider")?.0;
        let kind = row.try_get::<TransactionKindModel, _>("kind")?.0;
        let plan_type = row
            .try_get::<Option<PlanTypeModel>, _>("plan_type")?
            .map(|model| model.0);
        let payload = row
            .try_get::<serde_json::Value, _>("payload")
            .map(ProviderPayload::from_json)?;
        let recovery_status = row.try_get::<RecoveryStatusModel, _>("recovery_status")?.0;
        let restored_user_id = row
            .try_get::<Option<&str>, _>("restored_user_id")?
            .map(|value| decode_identifier("restored_user_id", value, UserId::new_checked))
            .transpose()?;
        let restored_transaction_id = row
            .try_get::<Option<&str>, _>("restored_transaction_id")?
            .map(|value| {
                decode_identifier("restored_transaction_id", value, CanonicalId::new_checked)
            })
            .transpose()?;

        Ok(Self(RecoveryRecord {
            id,
            reference,
            provider,
            kind,
            candidate_email: row.try_get::<Option<String>, _>("candidate_email")?,
            candidate_phone: row.try_get::<Option<String>, _>("candidate_phone")?,
            candidate_provider_user_id: row
                .try_get::<Option<String>, _>("candidate_provider_user_id")?,
            amount: row.try_get::<Decimal, _>("amount")?,
            gross_amount: row.try_get::<Decimal, _>("gross_amount")?,
            plan_type,
            currency: row.try_get::<String, _>("currency")?,
            provider_status: row.try_get::<String, _>("provider_status")?,
            session_id: row.try_get::<Option<String>, _>("session_id")?,
            payload,
            recovery_status,
            restored_user_id,
            restored_transaction_id,
            restored_at: row.try_get::<Option<DateTime<Utc>>, _>("restored_at")?,
            occurred_at: row.try_get::<Option<DateTime<Utc>>, _>("occurred_at")?,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
            updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
        }))
    }
}

impl<'r> FromRow<'r, PgRow> for RecordCountModel {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            provider: row.try_get::<ProviderModel, _>("provider")?,
            kind: row.try_get::<TransactionKindModel, _>("kind")?,
            status: row.try_get::<RecoveryStatusModel, _>("recovery_status")?,
            count: row.try_get::<i64, _>("count")?,
        })
    }
}

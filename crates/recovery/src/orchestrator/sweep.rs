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

//! Registration-time restoration of parked ledger records.

use reclaim_common::completion::RestorationTrigger;
use reclaim_model::{identifiers::UserId, transaction::IdentityHints};
use rust_decimal::Decimal;

use super::{RecoveryError, ReconciliationOrchestrator};
use crate::{
    dispatcher::RestorationOutcome,
    report::{RecoverableSummary, SweepReport},
};

impl ReconciliationOrchestrator {
    /// Restores every parked record matching a newly registered identity.
    ///
    /// Records are restored one by one, then the remaining matches (other than the records
    /// that failed) are swept with a bulk mark.
    ///
    /// # Errors
    ///
    /// Returns an error if the user is unknown or the ledger cannot be queried.
    pub async fn sweep_registration(
        &self,
        user_id: UserId,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> Result<SweepReport, RecoveryError> {
        let user = self
            .resolver
            .directory()
            .get_by_id(&user_id)
            .await?
            .ok_or(RecoveryError::UserNotFound(user_id))?;
        let hints = IdentityHints::new(email, phone, Some(user_id.as_str()));
        let records = self.ledger.find_matching(&hints).await?;
        tracing::info!("Sweeping {} parked record(s) for user {user_id}", records.len());

        let mut report = SweepReport::new(user_id);
        for record in records {
            let transaction = record.to_transaction();
            let canonical_id = match self
                .dispatcher
                .restore(&transaction, &user, RestorationTrigger::Registration)
                .await
            {
                Ok(RestorationOutcome::Restored { canonical_id, .. }) => {
                    report.restored += 1;
                    Some(canonical_id)
                }
                Ok(RestorationOutcome::AlreadyMaterialized { canonical_id }) => {
                    report.skipped += 1;
                    canonical_id
                }
                Ok(RestorationOutcome::EntitlementConflict { plan }) => {
                    tracing::info!(
                        "User {user_id} already holds {plan}, closing {} without restoring",
                        record.reference
                    );
                    report.skipped += 1;
                    None
                }
                Err(e) => {
                    tracing::error!("Restoring {record} for user {user_id} failed: {e}");
                    report.failed += 1;
                    report.failed_records.push(record.id);
                    continue;
                }
            };

            if let Err(e) = self
                .ledger
                .mark_restored(record.id, user_id, canonical_id)
                .await
            {
                tracing::error!("Marking {} restored failed: {e}", record.id);
                report.failed += 1;
                report.failed_records.push(record.id);
            }
        }

        report.bulk_marked = self
            .ledger
            .bulk_mark_restored(&hints, user_id, &report.failed_records)
            .await?;
        if report.bulk_marked > 0 {
            tracing::info!("Bulk marked {} record(s) for user {user_id}", report.bulk_marked);
        }

        Ok(report)
    }

    /// Returns whether recoverable value exists for an identity, without exposing it.
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger cannot be queried.
    pub async fn count_recoverable(
        &self,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> Result<RecoverableSummary, RecoveryError> {
        let hints = IdentityHints::new(email, phone, None);
        if hints.is_empty() {
            return Ok(RecoverableSummary::default());
        }
        let records = self.ledger.find_matching(&hints).await?;
        Ok(RecoverableSummary {
            count: records.len() as u64,
            has_recoverable_value: records.iter().any(|r| r.amount > Decimal::ZERO),
        })
    }
}

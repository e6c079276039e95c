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

//! Operator queries over the recovery ledger.

use reclaim_common::ledger::{LedgerStatistics, Page, PageRequest, RecordFilter};
use reclaim_model::{
    identifiers::{CanonicalId, RecordId, UserId},
    record::RecoveryRecord,
};

use super::{RecoveryError, ReconciliationOrchestrator};

impl ReconciliationOrchestrator {
    /// Returns aggregate ledger counts by provider, kind and status.
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger cannot be queried.
    pub async fn statistics(&self) -> Result<LedgerStatistics, RecoveryError> {
        Ok(self.ledger.statistics().await?)
    }

    /// Returns one page of ledger records, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger cannot be queried.
    pub async fn list_records(
        &self,
        filter: &RecordFilter,
        page: PageRequest,
    ) -> Result<Page<RecoveryRecord>, RecoveryError> {
        Ok(self.ledger.list(filter, page).await?)
    }

    /// Marks a record restored without running any restoration.
    ///
    /// Returns `false` when the record was already restored.
    ///
    /// # Errors
    ///
    /// Returns an error if the record does not exist or the ledger fails.
    pub async fn force_mark_restored(
        &self,
        id: RecordId,
        user_id: UserId,
        canonical_id: Option<CanonicalId>,
    ) -> Result<bool, RecoveryError> {
        let transitioned = self.ledger.mark_restored(id, user_id, canonical_id).await?;
        if transitioned {
            tracing::warn!("Record {id} force marked restored for user {user_id}");
        } else {
            tracing::info!("Record {id} was already restored");
        }
        Ok(transitioned)
    }
}

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

use reclaim_common::ledger::{PageRequest, RecordFilter};
use reclaim_recovery::{config::ReconciliationConfig, orchestrator::ReconciliationOrchestrator};

use crate::{
    opt::{DatabaseConfig, LedgerCommand, LedgerOpt},
    reconcile::{connect_ledger, detached_orchestrator},
};

async fn admin_orchestrator(
    database: &DatabaseConfig,
) -> anyhow::Result<ReconciliationOrchestrator> {
    let ledger = connect_ledger(database).await?;
    Ok(detached_orchestrator(ReconciliationConfig::default(), ledger))
}

pub async fn run_ledger_command(opt: LedgerOpt) -> anyhow::Result<()> {
    match opt.command {
        LedgerCommand::Stats { database } => {
            let orchestrator = admin_orchestrator(&database).await?;
            let statistics = orchestrator.statistics().await?;
            println!("{}", serde_json::to_string_pretty(&statistics)?);
        }
        LedgerCommand::List {
            status,
            provider,
            kind,
            email,
            phone,
            page,
            per_page,
            database,
        } => {
            let orchestrator = admin_orchestrator(&database).await?;
            let filter = RecordFilter {
                provider,
                kind,
                status,
                email_contains: email,
                phone_contains: phone,
            };
            let page = orchestrator
                .list_records(&filter, PageRequest::new(page, per_page))
                .await?;
            tracing::info!(
                "Page {} of {} ({} record(s) total)",
                page.page,
                page.total_pages(),
                page.total
            );
            println!("{}", serde_json::to_string_pretty(&page)?);
        }
        LedgerCommand::MarkRestored {
            id,
            user_id,
            canonical_id,
            database,
        } => {
            let orchestrator = admin_orchestrator(&database).await?;
            if orchestrator
                .force_mark_restored(id, user_id, canonical_id)
                .await?
            {
                println!("Record {id} marked restored for user {user_id}");
            } else {
                println!("Record {id} was already restored");
            }
        }
    }
    Ok(())
}

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

use std::sync::Arc;

use anyhow::bail;
use reclaim_cinetpay::csv::load_export;
use reclaim_common::{
    canonical::DetachedCanonicalStore, completion::DetachedCompletion,
    directory::DetachedDirectory, ledger::RecoveryLedger,
};
use reclaim_infrastructure::sql::ledger::PostgresRecoveryLedger;
use reclaim_model::enums::Provider;
use reclaim_recovery::{
    config::ReconciliationConfig, orchestrator::ReconciliationOrchestrator,
    report::ReconciliationReport,
};
use tokio_util::sync::CancellationToken;

use crate::{
    database::postgres::connect_options,
    opt::{DatabaseConfig, ReconcileOpt},
    provider::adapter_from_env,
};

/// Connects the Postgres ledger described by `config`.
///
/// # Errors
///
/// Returns an error if the options are invalid or the database is unreachable.
pub async fn connect_ledger(config: &DatabaseConfig) -> anyhow::Result<Arc<dyn RecoveryLedger>> {
    let options = connect_options(config)?;
    tracing::info!(
        "Connecting recovery ledger at {}",
        options.redacted_connection_string()
    );
    let ledger: Arc<dyn RecoveryLedger> =
        Arc::new(PostgresRecoveryLedger::connect(Some(options)).await?);
    Ok(ledger)
}

/// Builds an orchestrator with no platform attached.
///
/// Nothing resolves to a user, so every recoverable transaction is parked in `ledger`.
#[must_use]
pub fn detached_orchestrator(
    config: ReconciliationConfig,
    ledger: Arc<dyn RecoveryLedger>,
) -> ReconciliationOrchestrator {
    let completion = Arc::new(DetachedCompletion);
    ReconciliationOrchestrator::new(
        config,
        ledger,
        Arc::new(DetachedDirectory),
        Arc::new(DetachedCanonicalStore),
        completion.clone(),
        completion,
    )
}

/// Returns a token cancelled on the first Ctrl-C.
fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let child = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling remaining references");
            child.cancel();
        }
    });
    token
}

pub async fn run_reconcile_command(opt: ReconcileOpt) -> anyhow::Result<()> {
    let config = ReconciliationConfig::from_env()?;
    let ledger = connect_ledger(&opt.database).await?;
    let cancel = cancel_on_ctrl_c();

    let report = match &opt.file {
        Some(file) => {
            if opt.provider != Provider::CinetPay {
                bail!("Exports are only supported for {}", Provider::CinetPay);
            }
            let export = load_export(file)?;
            let live = export.is_reference_list() || config.verify_exports;
            let mut orchestrator = detached_orchestrator(config, ledger);
            if live {
                orchestrator.register_adapter(adapter_from_env(opt.provider)?);
            }
            if export.is_reference_list() {
                orchestrator
                    .reconcile_reference_batches(opt.provider, opt.kind, &export.references, &cancel)
                    .await?
            } else {
                orchestrator
                    .reconcile_export(export.transactions, &cancel)
                    .await?
            }
        }
        None => {
            let orchestrator = detached_orchestrator(config, ledger)
                .with_adapter(adapter_from_env(opt.provider)?);
            orchestrator
                .reconcile_references(opt.provider, opt.kind, &opt.references, &cancel)
                .await?
        }
    };

    print_report(&report, opt.json)
}

fn print_report(report: &ReconciliationReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("{}", report.table());
        println!("{report}");
    }
    Ok(())
}

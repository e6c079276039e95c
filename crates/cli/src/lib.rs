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

//! The `reclaim` operator command-line interface.
//!
//! Commands cover the ledger database lifecycle, one-off provider status checks, CSV export
//! parsing, reconciliation runs into the Postgres ledger, and ledger administration.

#![warn(rustc::all)]
#![deny(unsafe_code)]
#![deny(nonstandard_style)]
#![deny(missing_debug_implementations)]

mod database;
mod export;
mod ledger;
pub mod opt;
mod provider;
mod reconcile;

use crate::{
    database::postgres::run_database_command,
    export::run_export_command,
    ledger::run_ledger_command,
    opt::{Commands, ReclaimCli},
    provider::run_provider_command,
    reconcile::run_reconcile_command,
};

pub async fn run(opt: ReclaimCli) -> anyhow::Result<()> {
    match opt.command {
        Commands::Database(database_opt) => run_database_command(database_opt).await?,
        Commands::Provider(provider_opt) => run_provider_command(provider_opt).await?,
        Commands::Export(export_opt) => run_export_command(export_opt)?,
        Commands::Reconcile(reconcile_opt) => run_reconcile_command(reconcile_opt).await?,
        Commands::Ledger(ledger_opt) => run_ledger_command(ledger_opt).await?,
    }
    Ok(())
}

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

use std::path::PathBuf;

use clap::Parser;
use reclaim_model::{
    enums::{KindSelector, Provider, RecoveryStatus, TransactionKind},
    identifiers::{CanonicalId, RecordId, Reference, UserId},
};

/// Main CLI structure for parsing command-line arguments and options.
///
/// This is the entry point for the reclaim operator interface, giving access to the ledger
/// database, the provider adapters and the reconciliation engine.
#[derive(Debug, Parser)]
#[clap(version, about, author)]
pub struct ReclaimCli {
    #[clap(subcommand)]
    pub command: Commands,
}

/// Available top-level commands for the reclaim CLI.
#[derive(Parser, Debug)]
pub enum Commands {
    Database(DatabaseOpt),
    Provider(ProviderOpt),
    Export(ExportOpt),
    Reconcile(ReconcileOpt),
    Ledger(LedgerOpt),
}

/// Database management options and subcommands.
#[derive(Parser, Debug)]
#[command(about = "Postgres database operations", long_about = None)]
pub struct DatabaseOpt {
    #[clap(subcommand)]
    pub command: DatabaseCommand,
}

/// Configuration parameters for database connection and operations.
#[derive(Parser, Debug, Clone, Default)]
pub struct DatabaseConfig {
    /// Hostname or IP address of the database server.
    #[arg(long)]
    pub host: Option<String>,
    /// Port number of the database server.
    #[arg(long)]
    pub port: Option<u16>,
    /// Username for connecting to the database.
    #[arg(long)]
    pub username: Option<String>,
    /// Name of the database.
    #[arg(long)]
    pub database: Option<String>,
    /// Password for connecting to the database.
    #[arg(long)]
    pub password: Option<String>,
    /// Directory path to the schema files.
    #[arg(long)]
    pub schema: Option<PathBuf>,
}

/// Available database management commands.
#[derive(Parser, Debug, Clone)]
#[command(about = "Postgres database operations", long_about = None)]
pub enum DatabaseCommand {
    /// Initializes a new Postgres database with the recovery ledger schema.
    Init(DatabaseConfig),
    /// Drops roles, privileges and deletes all data from the database.
    Drop(DatabaseConfig),
}

/// Provider adapter options and subcommands.
#[derive(Parser, Debug)]
#[command(about = "Provider status checks", long_about = None)]
pub struct ProviderOpt {
    #[clap(subcommand)]
    pub command: ProviderCommand,
}

#[derive(Parser, Debug, Clone)]
pub enum ProviderCommand {
    /// Fetches and prints the normalized status of a single reference.
    Check {
        #[arg(long)]
        provider: Provider,
        #[arg(long, default_value = "AUTO")]
        kind: KindSelector,
        #[arg(value_parser = parse_reference)]
        reference: Reference,
    },
}

/// Provider export options and subcommands.
#[derive(Parser, Debug)]
#[command(about = "Provider batch exports", long_about = None)]
pub struct ExportOpt {
    #[clap(subcommand)]
    pub command: ExportCommand,
}

#[derive(Parser, Debug, Clone)]
pub enum ExportCommand {
    /// Parses a CinetPay CSV export and prints the accepted transactions.
    Parse {
        file: PathBuf,
        /// Print the transactions as JSON.
        #[arg(long)]
        json: bool,
    },
}

/// Reconciles provider references, or a provider export, into the recovery ledger.
#[derive(Parser, Debug, Clone)]
#[command(about = "Reconcile provider transactions into the recovery ledger", long_about = None)]
pub struct ReconcileOpt {
    #[arg(long)]
    pub provider: Provider,
    #[arg(long, default_value = "AUTO")]
    pub kind: KindSelector,
    /// Comma separated provider references to check live.
    #[arg(long, value_delimiter = ',', value_parser = parse_reference, conflicts_with = "file", required_unless_present = "file")]
    pub references: Vec<Reference>,
    /// A provider CSV export to reconcile in batches. A bare `transaction_id` list is checked live.
    #[arg(long)]
    pub file: Option<PathBuf>,
    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,
    #[clap(flatten)]
    pub database: DatabaseConfig,
}

/// Recovery ledger options and subcommands.
#[derive(Parser, Debug)]
#[command(about = "Recovery ledger administration", long_about = None)]
pub struct LedgerOpt {
    #[clap(subcommand)]
    pub command: LedgerCommand,
}

#[derive(Parser, Debug, Clone)]
pub enum LedgerCommand {
    /// Prints aggregate counts by provider, kind and status.
    Stats {
        #[clap(flatten)]
        database: DatabaseConfig,
    },
    /// Lists ledger records, newest first.
    List {
        #[arg(long)]
        status: Option<RecoveryStatus>,
        #[arg(long)]
        provider: Option<Provider>,
        #[arg(long)]
        kind: Option<TransactionKind>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        per_page: Option<u32>,
        #[clap(flatten)]
        database: DatabaseConfig,
    },
    /// Marks a record restored without running any restoration.
    MarkRestored {
        id: RecordId,
        #[arg(value_parser = parse_user_id)]
        user_id: UserId,
        #[arg(value_parser = parse_canonical_id)]
        canonical_id: Option<CanonicalId>,
        #[clap(flatten)]
        database: DatabaseConfig,
    },
}

fn parse_reference(value: &str) -> anyhow::Result<Reference> {
    Reference::new_checked(value)
}

fn parse_user_id(value: &str) -> anyhow::Result<UserId> {
    UserId::new_checked(value)
}

fn parse_canonical_id(value: &str) -> anyhow::Result<CanonicalId> {
    CanonicalId::new_checked(value)
}

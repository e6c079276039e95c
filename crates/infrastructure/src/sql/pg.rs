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

//! Connection options and schema management for PostgreSQL.

use std::path::{Path, PathBuf};

use derive_builder::Builder;
use reclaim_core::env::{get_env_var_or, get_optional_env_var};
use sqlx::{ConnectOptions, PgPool, postgres::PgConnectOptions};

/// The ledger schema, embedded so a schema directory is optional.
pub const TABLES_SQL: &str = include_str!("../../../../schema/sql/tables.sql");

/// The default role and database name.
pub const DEFAULT_DATABASE: &str = "reclaim";

#[derive(Debug, Clone, Builder)]
#[builder(default)]
pub struct PostgresConnectOptions {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
}

impl PostgresConnectOptions {
    /// Creates a new [`PostgresConnectOptions`] instance.
    #[must_use]
    pub fn new(
        host: String,
        port: u16,
        username: String,
        password: String,
        database: String,
    ) -> Self {
        Self {
            host,
            port,
            username,
            password,
            database,
        }
    }

    /// Returns the connection string with the password masked, for logging.
    #[must_use]
    pub fn redacted_connection_string(&self) -> String {
        format!(
            "postgres://{username}:***@{host}:{port}/{database}",
            username = self.username,
            host = self.host,
            port = self.port,
            database = self.database
        )
    }

    #[must_use]
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{username}:{password}@{host}:{port}/{database}",
            username = self.username,
            password = self.password,
            host = self.host,
            port = self.port,
            database = self.database
        )
    }

    #[must_use]
    pub fn default_administrator() -> Self {
        Self::new(
            String::from("localhost"),
            5432,
            String::from("postgres"),
            String::from("pass"),
            String::from(DEFAULT_DATABASE),
        )
    }
}

impl Default for PostgresConnectOptions {
    fn default() -> Self {
        Self::new(
            String::from("localhost"),
            5432,
            String::from(DEFAULT_DATABASE),
            String::from("pass"),
            String::from(DEFAULT_DATABASE),
        )
    }
}

impl From<PostgresConnectOptions> for PgConnectOptions {
    fn from(opt: PostgresConnectOptions) -> Self {
        Self::new()
            .host(opt.host.as_str())
            .port(opt.port)
            .username(opt.username.as_str())
            .password(opt.password.as_str())
            .database(opt.database.as_str())
            .disable_statement_logging()
    }
}

/// Resolves connect options from arguments, then `POSTGRES_*` environment variables, then defaults.
///
/// # Errors
///
/// Returns an error if `POSTGRES_PORT` is set but is not a valid port.
pub fn get_postgres_connect_options(
    host: Option<String>,
    port: Option<u16>,
    username: Option<String>,
    password: Option<String>,
    database: Option<String>,
) -> anyhow::Result<PostgresConnectOptions> {
    let defaults = PostgresConnectOptions::default_administrator();
    let host = host
        .or_else(|| get_optional_env_var("POSTGRES_HOST"))
        .unwrap_or(defaults.host);
    let port = match port {
        Some(port) => port,
        None => get_env_var_or("POSTGRES_PORT", defaults.port)?,
    };
    let username = username
        .or_else(|| get_optional_env_var("POSTGRES_USERNAME"))
        .unwrap_or(defaults.username);
    let database = database
        .or_else(|| get_optional_env_var("POSTGRES_DATABASE"))
        .unwrap_or(defaults.database);
    let password = password
        .or_else(|| get_optional_env_var("POSTGRES_PASSWORD"))
        .unwrap_or(defaults.password);
    Ok(PostgresConnectOptions::new(
        host, port, username, password, database,
    ))
}

/// Connects a pool with the given options.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect_pg(options: PgConnectOptions) -> anyhow::Result<PgPool> {
    Ok(PgPool::connect_with(options).await?)
}

/// Returns the schema directory from `SCHEMA_DIR`, if set.
fn get_schema_dir() -> Option<PathBuf> {
    get_optional_env_var("SCHEMA_DIR").map(PathBuf::from)
}

/// Splits a SQL script into statements, dropping empty fragments and comment-only lines.
#[must_use]
pub fn split_statements(sql: &str) -> Vec<String> {
    sql.split(';')
        .map(|fragment| {
            fragment
                .lines()
                .filter(|line| !line.trim_start().starts_with("--"))
                .collect::<Vec<_>>()
                .join("\n")
        })
        .filter(|statement| !statement.trim().is_empty())
        .map(|statement| format!("{};", statement.trim()))
        .collect()
}

fn load_schema_scripts(schema_dir: Option<&Path>) -> anyhow::Result<Vec<(String, String)>> {
    let Some(dir) = schema_dir.map(Path::to_path_buf).or_else(get_schema_dir) else {
        return Ok(vec![("tables.sql".to_string(), TABLES_SQL.to_string())]);
    };

    let mut entries = std::fs::read_dir(&dir)?.collect::<Result<Vec<_>, std::io::Error>>()?;
    entries.sort_by_key(std::fs::DirEntry::file_name);

    let mut scripts = Vec::new();
    for entry in entries {
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("sql") {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        scripts.push((name, std::fs::read_to_string(&path)?));
    }

    if scripts.is_empty() {
        anyhow::bail!("No .sql files found in schema dir {}", dir.display());
    }
    Ok(scripts)
}

/// Creates the role and the ledger schema, and grants the role access.
///
/// Safe to run repeatedly: objects that already exist are skipped.
///
/// # Errors
///
/// Returns an error if the schema cannot be read or a statement fails for any reason other
/// than the object already existing.
pub async fn init_postgres(
    pg: &PgPool,
    database: &str,
    password: &str,
    schema_dir: Option<&Path>,
) -> anyhow::Result<()> {
    tracing::info!("Initializing Postgres database with target permissions and schema");

    match sqlx::query("CREATE SCHEMA IF NOT EXISTS public;")
        .execute(pg)
        .await
    {
        Ok(_) => tracing::info!("Schema public created successfully"),
        Err(e) => tracing::error!("Error creating schema public: {e:?}"),
    }

    match sqlx::query(&format!("CREATE ROLE {database} PASSWORD '{password}' LOGIN;"))
        .execute(pg)
        .await
    {
        Ok(_) => tracing::info!("Role {database} created successfully"),
        Err(e) if e.to_string().contains("already exists") => {
            tracing::info!("Role {database} already exists");
        }
        Err(e) => tracing::error!("Error creating role {database}: {e:?}"),
    }

    for (name, content) in load_schema_scripts(schema_dir)? {
        tracing::info!("Executing schema file: {name}");
        for statement in split_statements(&content) {
            if let Err(e) = sqlx::query(&statement).execute(pg).await {
                if e.to_string().contains("already exists") {
                    tracing::info!("Already exists error on statement, skipping");
                } else {
                    anyhow::bail!("Error executing statement {statement} with error: {e:?}");
                }
            }
        }
    }

    let grants = [
        (
            format!("GRANT CONNECT ON DATABASE {database} TO {database};"),
            "connect",
        ),
        (
            format!("GRANT ALL PRIVILEGES ON SCHEMA public TO {database};"),
            "schema",
        ),
        (
            format!("GRANT ALL PRIVILEGES ON ALL TABLES IN SCHEMA public TO {database};"),
            "table",
        ),
    ];
    for (statement, scope) in grants {
        match sqlx::query(&statement).execute(pg).await {
            Ok(_) => tracing::info!("Granted {scope} privileges to role {database}"),
            Err(e) => tracing::error!("Error granting {scope} privileges to role {database}: {e:?}"),
        }
    }

    Ok(())
}

/// Drops the ledger tables and the role.
///
/// # Errors
///
/// Returns an error if the tables cannot be dropped.
pub async fn drop_postgres(pg: &PgPool, database: &str) -> anyhow::Result<()> {
    sqlx::query("DROP TABLE IF EXISTS recovery_records CASCADE;")
        .execute(pg)
        .await?;
    tracing::info!("Dropped ledger tables");

    match sqlx::query(&format!("DROP ROLE IF EXISTS {database};"))
        .execute(pg)
        .await
    {
        Ok(_) => tracing::info!("Dropped role {database}"),
        Err(e) => tracing::error!("Error dropping role {database}: {e:?}"),
    }
    Ok(())
}

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

//! Infrastructure for the reclaim recovery engine.
//!
//! The `reclaim-infrastructure` crate persists the recovery ledger in PostgreSQL:
//!
//! - **Connection management**: connect options resolved from arguments, environment or defaults.
//! - **Schema management**: idempotent initialization and teardown of the ledger schema.
//! - **Ledger backend**: a [`RecoveryLedger`](reclaim_common::ledger::RecoveryLedger)
//!   implementation enforcing `(provider, reference)` uniqueness in the database.
//!
//! # Feature flags
//!
//! - `postgres`: Enables the PostgreSQL backend (default).

#[cfg(feature = "postgres")]
pub mod sql;

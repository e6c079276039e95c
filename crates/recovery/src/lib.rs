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

//! Reconciliation and recovery machinery for provider-confirmed transactions.
//!
//! The `reclaim-recovery` crate drives provider transactions from ground truth to the
//! platform's records:
//!
//! - [`orchestrator::ReconciliationOrchestrator`]: the end-to-end reconciliation flow, the
//!   registration sweep and the admin queries.
//! - [`resolver::IdentityResolver`]: maps provider identity hints to a platform user.
//! - [`dispatcher::RestorationDispatcher`]: materializes canonical records and replays the
//!   completion pipelines.
//! - [`report::ReconciliationReport`]: the per-run outcome summary.

#![warn(rustc::all)]
#![deny(unsafe_code)]
#![deny(nonstandard_style)]
#![deny(missing_debug_implementations)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod config;
pub mod dispatcher;
pub mod orchestrator;
pub mod report;
pub mod resolver;
pub mod state;

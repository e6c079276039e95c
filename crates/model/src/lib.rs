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

//! The domain model for the reclaim recovery engine.
//!
//! The model covers the values that flow between provider adapters, the recovery ledger and
//! the restoration dispatcher:
//!
//! - Identifiers for provider references, platform users, ledger records and canonical records.
//! - Enumerations for providers, transaction kinds, recovery status and plans.
//! - The normalized [`transaction::ProviderTransaction`] emitted by every adapter.
//! - The durable [`record::RecoveryRecord`] ledger entry.
//! - The gross to net [`pricing`] table and [`phone`] number normalization.
//!
//! # Feature flags
//!
//! - `stubs`: Enables type stubs and `rstest` fixtures for use in tests of downstream crates.

#![warn(rustc::all)]
#![deny(unsafe_code)]
#![deny(nonstandard_style)]
#![deny(missing_debug_implementations)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod canonical;
pub mod enums;
pub mod identifiers;
pub mod payload;
pub mod phone;
pub mod pricing;
pub mod record;
pub mod transaction;

#[cfg(any(test, feature = "stubs"))]
pub mod stubs;

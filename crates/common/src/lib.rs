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

//! Common componentry for the reclaim recovery engine.
//!
//! The `reclaim-common` crate defines the seams between the engine and its collaborators:
//!
//! - [`provider::ProviderAdapter`]: fetches authoritative transaction state from a provider.
//! - [`ledger::RecoveryLedger`]: durable store of transactions awaiting attribution.
//! - [`directory::UserDirectory`]: read/update access to platform users.
//! - [`canonical::CanonicalStore`]: the platform's transaction and payment intent records.
//! - [`completion::PaymentCompletion`] and [`completion::PayoutCompletion`]: the platform's
//!   webhook-equivalent completion pipelines.
//!
//! # Feature flags
//!
//! - `stubs`: Enables in-memory collaborator stubs for use in testing scenarios.

#![warn(rustc::all)]
#![deny(unsafe_code)]
#![deny(nonstandard_style)]
#![deny(missing_debug_implementations)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod canonical;
pub mod completion;
pub mod directory;
pub mod ledger;
pub mod provider;

#[cfg(any(test, feature = "stubs"))]
pub mod stubs;

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

//! [CinetPay](https://cinetpay.com) adapter for the reclaim recovery engine.
//!
//! The `reclaim-cinetpay` crate provides two sources of ground truth for CinetPay transactions:
//!
//! - **Live status checks**: the payment check endpoint for collections and the transfer API
//!   (token authenticated) for payouts, normalized by [`provider::CinetPayProvider`].
//! - **Batch exports**: CSV exports from the merchant dashboard, filtered to accepted rows and
//!   normalized by [`csv::parse_export`].

pub mod common;
pub mod config;
pub mod csv;
pub mod http;
pub mod provider;

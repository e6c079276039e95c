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

pub const CINETPAY: &str = "CINETPAY";

/// Response code of a successful payment check.
pub const CINETPAY_CODE_OK: &str = "00";

/// Response code of a payment check for an unknown transaction.
pub const CINETPAY_CODE_NOT_FOUND: &str = "627";

/// Response code of a successful transfer API call.
pub const CINETPAY_TRANSFER_CODE_OK: &str = "0";

/// Payment status of a completed collection.
pub const CINETPAY_STATUS_ACCEPTED: &str = "ACCEPTED";

/// Treatment status of a validated transfer.
pub const CINETPAY_TRANSFER_STATUS_VALIDATED: &str = "VAL";

/// Statuses treated as completed in dashboard exports.
pub const CINETPAY_EXPORT_SUCCESS_STATUSES: [&str; 3] = ["ACCEPTED", "SUCCES", "SUCCESS"];

/// Transfer API tokens are valid for five minutes; refresh a little earlier.
pub const CINETPAY_TOKEN_TTL_SECS: u64 = 240;

pub const CINETPAY_DEFAULT_CURRENCY: &str = "XAF";

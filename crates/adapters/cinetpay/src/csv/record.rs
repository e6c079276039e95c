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

use serde::{Deserialize, Serialize};

/// One row of a CinetPay dashboard export.
///
/// Headers are matched case-insensitively and unknown columns are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CinetPayExportRecord {
    /// Transaction date as displayed by the dashboard.
    pub date: Option<String>,
    /// The merchant transaction ID.
    pub transaction_id: Option<String>,
    /// Customer phone number, usually without dialing code.
    pub phone_number: Option<String>,
    /// Amount, possibly with separators and a currency code.
    pub amount: Option<String>,
    pub status: Option<String>,
    /// Operator code such as `OMCM` or `WAVECI`.
    pub payment_method: Option<String>,
    pub currency: Option<String>,
    pub phone_prefix: Option<String>,
    pub operator_id: Option<String>,
    pub designation: Option<String>,
    /// Free-form merchant field, sometimes carrying the customer email.
    pub custom_field: Option<String>,
}

impl CinetPayExportRecord {
    /// Returns the trimmed transaction ID, if present.
    #[must_use]
    pub fn reference(&self) -> Option<&str> {
        self.transaction_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

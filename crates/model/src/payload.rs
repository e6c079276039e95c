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

//! The raw provider payload preserved for audit and replay.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The verbatim provider response a transaction was normalized from.
///
/// Each variant is written and read only by the owning adapter; everything else treats the
/// payload as opaque and persists it as-is.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", content = "body", rename_all = "snake_case")]
pub enum ProviderPayload {
    /// `data` object of a CinetPay payment check response.
    CinetPayPayment(Value),
    /// `data` object of a CinetPay transfer check response.
    CinetPayTransfer(Value),
    /// One row of a CinetPay CSV export, keyed by header.
    CinetPayExport(BTreeMap<String, String>),
    /// `data` object of a FeexPay status response.
    FeexPay(Value),
    /// Anything else.
    Raw(Map<String, Value>),
}

impl ProviderPayload {
    /// Returns the payload source tag.
    #[must_use]
    pub fn source(&self) -> &'static str {
        match self {
            Self::CinetPayPayment(_) => "cinet_pay_payment",
            Self::CinetPayTransfer(_) => "cinet_pay_transfer",
            Self::CinetPayExport(_) => "cinet_pay_export",
            Self::FeexPay(_) => "feex_pay",
            Self::Raw(_) => "raw",
        }
    }

    /// Serializes the payload into a JSON value for storage.
    #[must_use]
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Restores a payload from a stored JSON value.
    ///
    /// Values that do not carry a known envelope are kept as [`ProviderPayload::Raw`] when they
    /// are objects, so no stored audit data is ever dropped.
    #[must_use]
    pub fn from_json(value: Value) -> Self {
        match serde_json::from_value::<Self>(value.clone()) {
            Ok(payload) => payload,
            Err(_) => match value {
                Value::Object(map) => Self::Raw(map),
                other => {
                    let mut map = Map::new();
                    map.insert("value".to_string(), other);
                    Self::Raw(map)
                }
            },
        }
    }
}

impl Default for ProviderPayload {
    fn default() -> Self {
        Self::Raw(Map::new())
    }
}

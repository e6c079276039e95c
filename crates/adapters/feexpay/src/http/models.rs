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

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

fn deserialize_lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn deserialize_lenient_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(deserialize_lenient_string(deserializer)?.and_then(|s| s.replace(' ', "").parse().ok()))
}

/// Identity fields FeexPay echoes back from the merchant callback configuration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FeexPayCallbackInfo {
    #[serde(alias = "user_id", deserialize_with = "deserialize_lenient_string")]
    pub user_id: Option<String>,
    pub email: Option<String>,
    #[serde(alias = "phone_number", deserialize_with = "deserialize_lenient_string")]
    pub phone: Option<String>,
}

/// The transaction object of a status response.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct FeexPayStatus {
    #[serde(deserialize_with = "deserialize_lenient_string")]
    pub reference: Option<String>,
    #[serde(deserialize_with = "deserialize_lenient_decimal")]
    pub amount: Option<Decimal>,
    pub status: Option<String>,
    pub currency: Option<String>,
    #[serde(alias = "phoneNumber", deserialize_with = "deserialize_lenient_string")]
    pub phone: Option<String>,
    pub email: Option<String>,
    #[serde(alias = "createdAt")]
    pub created_at: Option<String>,
    pub callback_info: Option<Value>,
}

impl FeexPayStatus {
    /// Returns the callback info, when it is a structured object.
    #[must_use]
    pub fn callback(&self) -> FeexPayCallbackInfo {
        self.callback_info
            .as_ref()
            .filter(|value| value.is_object())
            .and_then(|value| serde_json::from_value(value.clone()).ok())
            .unwrap_or_default()
    }
}

/// Unwraps the transaction object from a response that may nest it under `data`.
#[must_use]
pub fn unwrap_status_body(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.get("data").is_some_and(Value::is_object) => {
            map.remove("data").unwrap_or_default()
        }
        other => other,
    }
}

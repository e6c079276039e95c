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

//! Request and response models of the CinetPay payment and transfer APIs.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::parse::{
    deserialize_code, deserialize_optional_amount, deserialize_optional_string,
};

/// The envelope of every CinetPay API response.
#[derive(Clone, Debug, Deserialize)]
pub struct CinetPayResponse {
    #[serde(deserialize_with = "deserialize_code")]
    pub code: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

impl CinetPayResponse {
    /// Returns the most descriptive message available.
    #[must_use]
    pub fn detail(&self) -> String {
        match &self.description {
            Some(description) if !description.is_empty() => {
                format!("{} ({description})", self.message)
            }
            _ => self.message.clone(),
        }
    }
}

/// Body of `POST /v2/payment/check`.
#[derive(Clone, Debug, Serialize)]
pub struct CinetPayPaymentCheckRequest<'a> {
    pub apikey: &'a str,
    pub site_id: &'a str,
    pub transaction_id: &'a str,
}

/// Form of `POST /v1/auth/login`.
#[derive(Clone, Debug, Serialize)]
pub struct CinetPayLoginRequest<'a> {
    pub apikey: &'a str,
    pub password: &'a str,
}

/// `data` of a successful transfer login.
#[derive(Clone, Debug, Deserialize)]
pub struct CinetPayLoginData {
    pub token: String,
}

/// `data` of a payment check.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct CinetPayPaymentData {
    #[serde(deserialize_with = "deserialize_optional_amount")]
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
    pub status: Option<String>,
    pub payment_method: Option<String>,
    #[serde(deserialize_with = "deserialize_optional_string")]
    pub operator_id: Option<String>,
    pub payment_date: Option<String>,
    pub metadata: Option<Value>,
    #[serde(deserialize_with = "deserialize_optional_string")]
    pub customer_phone_number: Option<String>,
    #[serde(deserialize_with = "deserialize_optional_string")]
    pub customer_phone_prefix: Option<String>,
    #[serde(deserialize_with = "deserialize_optional_string")]
    pub phone_prefix: Option<String>,
    pub customer_email: Option<String>,
}

/// One element of the `data` array of a transfer check.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct CinetPayTransferData {
    #[serde(deserialize_with = "deserialize_optional_amount")]
    pub amount: Option<Decimal>,
    #[serde(deserialize_with = "deserialize_optional_string")]
    pub receiver: Option<String>,
    pub receiver_e164: Option<String>,
    #[serde(deserialize_with = "deserialize_optional_string")]
    pub prefix: Option<String>,
    pub currency: Option<String>,
    pub treatment_status: Option<String>,
    pub sending_status: Option<String>,
    #[serde(deserialize_with = "deserialize_optional_string")]
    pub client_transaction_id: Option<String>,
    #[serde(deserialize_with = "deserialize_optional_string")]
    pub transaction_id: Option<String>,
    pub validated_at: Option<String>,
}

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

//! Lenient parsing of CinetPay amounts, timestamps and free-form metadata.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, de::Error};
use serde_json::Value;

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];

/// Parses an amount as written by CinetPay, e.g. `"2142"`, `"2 142 XAF"`, `"2,142.00"` or
/// `"2.142,50"`.
///
/// Spaces (including non-breaking) and a trailing currency code are ignored. When both `.` and `,`
/// appear, the last one is the decimal separator. A lone separator is a thousands separator when it
/// repeats or is followed by exactly three digits, otherwise a decimal separator.
#[must_use]
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-'))
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let normalized = match (cleaned.rfind('.'), cleaned.rfind(',')) {
        (Some(dot), Some(comma)) if dot > comma => cleaned.replace(',', ""),
        (Some(_), Some(_)) => cleaned.replace('.', "").replacen(',', ".", 1),
        (Some(_), None) => normalize_lone_separator(&cleaned, '.'),
        (None, Some(_)) => normalize_lone_separator(&cleaned, ','),
        (None, None) => cleaned,
    };

    Decimal::from_str(&normalized).ok()
}

fn normalize_lone_separator(cleaned: &str, separator: char) -> String {
    let groups = cleaned.matches(separator).count();
    let fraction = cleaned
        .rsplit_once(separator)
        .map_or(0, |(_, fraction)| fraction.len());
    if groups > 1 || fraction == 3 {
        cleaned.replace(separator, "")
    } else {
        cleaned.replacen(separator, ".", 1)
    }
}

/// Parses a CinetPay timestamp, assuming UTC when no offset is given.
#[must_use]
pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.and_utc());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }
    None
}

/// Returns `value` as a trimmed non-empty string, accepting JSON strings and numbers.
#[must_use]
pub fn value_to_string(value: &Value) -> Option<String> {
    let s = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!s.is_empty()).then_some(s)
}

/// Deserializes a response code sent either as a string or as a number.
///
/// # Errors
///
/// Returns an error if the value is neither a string nor a number.
pub fn deserialize_code<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    value_to_string(&value).ok_or_else(|| D::Error::custom(format!("invalid code: {value}")))
}

/// Deserializes an optional amount sent either as a string or as a number.
///
/// # Errors
///
/// Returns an error if a present value cannot be parsed as an amount.
pub fn deserialize_optional_amount<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value.as_ref().and_then(value_to_string) {
        Some(s) => parse_amount(&s)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid amount: {s}"))),
        None => Ok(None),
    }
}

/// Deserializes an optional identifier or phone number sent either as a string or as a number.
///
/// # Errors
///
/// Never fails for well-formed JSON; other value types are treated as absent.
pub fn deserialize_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_to_string))
}

/// Identity fields a merchant may have placed in the `metadata` of a payment.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetadataHints {
    pub user_id: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Extracts identity hints from a payment `metadata` value.
///
/// The metadata is usually a JSON document serialized into a string. Plain strings that look like
/// an email are taken as the email; anything unparseable yields no hints.
#[must_use]
pub fn parse_metadata(metadata: Option<&Value>) -> MetadataHints {
    let object = match metadata {
        Some(Value::Object(map)) => Value::Object(map.clone()),
        Some(Value::String(s)) => match serde_json::from_str::<Value>(s) {
            Ok(value @ Value::Object(_)) => value,
            _ if s.contains('@') => {
                return MetadataHints {
                    email: Some(s.trim().to_string()),
                    ..Default::default()
                };
            }
            _ => return MetadataHints::default(),
        },
        _ => return MetadataHints::default(),
    };

    let field = |keys: &[&str]| {
        keys.iter()
            .find_map(|key| object.get(*key).and_then(value_to_string))
    };

    MetadataHints {
        user_id: field(&["userId", "user_id", "uid"]),
        email: field(&["email", "userEmail"]),
        phone: field(&["phone", "phoneNumber", "phone_number"]),
    }
}

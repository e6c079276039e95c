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

//! Country codes, mobile money operator codes and phone number normalization.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

/// A country served by the supported mobile money operators (ISO 3166-1 alpha-2).
#[derive(
    Copy,
    Clone,
    Debug,
    Display,
    Hash,
    PartialEq,
    Eq,
    AsRefStr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum CountryCode {
    /// Cameroon.
    CM,
    /// Côte d'Ivoire.
    CI,
    /// Senegal.
    SN,
    /// Burkina Faso.
    BF,
    /// Togo.
    TG,
    /// Benin.
    BJ,
    /// Mali.
    ML,
}

impl CountryCode {
    /// Returns the international dialing code, without the leading `+`.
    #[must_use]
    pub const fn dialing_code(self) -> &'static str {
        match self {
            Self::CM => "237",
            Self::CI => "225",
            Self::SN => "221",
            Self::BF => "226",
            Self::TG => "228",
            Self::BJ => "229",
            Self::ML => "223",
        }
    }

    /// Returns the currency collected in this country.
    #[must_use]
    pub const fn default_currency(self) -> &'static str {
        match self {
            Self::CM => "XAF",
            _ => "XOF",
        }
    }

    /// Returns the country for a dialing code such as `"237"` or `"+237"`.
    #[must_use]
    pub fn from_dialing_code(code: &str) -> Option<Self> {
        let code = code.trim().trim_start_matches('+');
        Self::iter().find(|country| country.dialing_code() == code)
    }

    /// Returns the country for a mobile money operator (payment method) code.
    #[must_use]
    pub fn from_operator(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "OMCM" | "MOMOCM" => Some(Self::CM),
            "OMCIV2" | "OMCI" | "MOMOCI" | "FLOOZ" | "WAVECI" => Some(Self::CI),
            "OMSN" | "FREESN" | "WAVESN" => Some(Self::SN),
            "OMBF" | "MOOVBF" => Some(Self::BF),
            "TMONEYTG" | "FLOOZTG" => Some(Self::TG),
            "MTNBJ" | "MOOVBJ" => Some(Self::BJ),
            "OMML" | "MOOVML" => Some(Self::ML),
            _ => None,
        }
    }

    /// Returns the country whose dialing code prefixes `digits`, if any.
    #[must_use]
    pub fn from_number(digits: &str) -> Option<Self> {
        Self::iter().find(|country| digits.starts_with(country.dialing_code()))
    }
}

/// Strips every non-digit character from `raw`.
#[must_use]
pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Normalizes a phone number to `+<dialing code><local number>`.
///
/// When `country` is given and the number does not already carry its dialing code, the code is
/// prefixed. Without a country the digits are emitted as-is with a leading `+`.
/// Returns `None` when `raw` contains no digits.
#[must_use]
pub fn normalize_phone(raw: &str, country: Option<CountryCode>) -> Option<String> {
    let mut digits = digits_only(raw);
    if let Some(stripped) = digits.strip_prefix("00") {
        digits = stripped.to_string();
    }
    if digits.is_empty() {
        return None;
    }

    match country {
        Some(country) if !digits.starts_with(country.dialing_code()) => {
            Some(format!("+{}{digits}", country.dialing_code()))
        }
        _ => Some(format!("+{digits}")),
    }
}

/// Returns the lookup variants of a phone number, in resolution order.
///
/// The variants are the trimmed raw value, the bare digits, the digits with a leading `+`
/// and, when the number starts with a known dialing code, the local number with and without
/// a leading `0`. Duplicates are removed while preserving order.
#[must_use]
pub fn phone_variants(raw: &str) -> Vec<String> {
    let mut variants: Vec<String> = Vec::new();
    let mut push = |value: String| {
        if !value.is_empty() && !variants.contains(&value) {
            variants.push(value);
        }
    };

    push(raw.trim().to_string());

    let digits = digits_only(raw);
    if digits.is_empty() {
        return variants;
    }
    push(digits.clone());
    push(format!("+{digits}"));

    if let Some(country) = CountryCode::from_number(&digits) {
        let local = &digits[country.dialing_code().len()..];
        if !local.is_empty() {
            push(local.to_string());
            push(format!("0{local}"));
        }
    }

    variants
}

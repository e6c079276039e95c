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

//! Provides macros for generating string identifier functionality.

/// Implements the common surface of a `Ustr` backed identifier: checked construction,
/// accessors, `Display`/`Debug`, `FromStr`, `AsRef<str>` and serde support.
///
/// Deserialization goes through `new_checked`, so malformed input from a provider payload
/// or a database row surfaces as an error rather than a panic.
macro_rules! impl_ustr_identifier {
    ($ty:ident, $max_len:expr) => {
        impl $ty {
            /// Creates a new identifier instance with correctness checking.
            ///
            /// Surrounding whitespace is trimmed before validation.
            ///
            /// # Errors
            ///
            /// Returns an error if `value` is not a valid ASCII string or exceeds the maximum length.
            pub fn new_checked<T: AsRef<str>>(value: T) -> anyhow::Result<Self> {
                let value = value.as_ref().trim();
                check_valid_string_ascii(value, stringify!(value))?;
                check_string_max_len(value, $max_len, stringify!(value))?;
                Ok(Self(Ustr::from(value)))
            }

            /// Creates a new identifier instance.
            ///
            /// # Panics
            ///
            /// Panics if `value` is not a valid string.
            pub fn new<T: AsRef<str>>(value: T) -> Self {
                Self::new_checked(value).expect(FAILED)
            }

            /// Returns the inner identifier value.
            #[must_use]
            pub fn inner(&self) -> Ustr {
                self.0
            }

            /// Returns the inner identifier value as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl std::fmt::Debug for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{:?}", self.0)
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $ty {
            type Err = anyhow::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new_checked(s)
            }
        }

        impl AsRef<str> for $ty {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl serde::Serialize for $ty {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                self.0.serialize(serializer)
            }
        }

        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let value: String = serde::Deserialize::deserialize(deserializer)?;
                Self::new_checked(&value).map_err(serde::de::Error::custom)
            }
        }
    };
}

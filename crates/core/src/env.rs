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

//! Environment variable helpers used by configuration loading.

use std::str::FromStr;

/// Returns the environment variable for the given `key`.
///
/// # Errors
///
/// Returns an error if the environment variable is not set.
pub fn get_env_var(key: &str) -> anyhow::Result<String> {
    match std::env::var(key) {
        Ok(var) => Ok(var),
        Err(_) => anyhow::bail!("environment variable '{key}' must be set"),
    }
}

/// Returns the environment variable for the given `key` if it is set and non-empty.
#[must_use]
pub fn get_optional_env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Returns the environment variable for the given `key` parsed as `T`, or `default` when unset.
///
/// # Errors
///
/// Returns an error if the variable is set but cannot be parsed as `T`.
pub fn get_env_var_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get_optional_env_var(key) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("environment variable '{key}' is invalid: {e}")),
        None => Ok(default),
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_get_env_var_missing() {
        let result = get_env_var("RECLAIM_TEST_SURELY_NOT_SET_01");
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().to_string(),
            "environment variable 'RECLAIM_TEST_SURELY_NOT_SET_01' must be set"
        );
    }

    #[rstest]
    fn test_get_env_var_or_default_when_missing() {
        let value: u64 = get_env_var_or("RECLAIM_TEST_SURELY_NOT_SET_02", 30).unwrap();
        assert_eq!(value, 30);
    }

    #[rstest]
    fn test_get_optional_env_var_missing() {
        assert!(get_optional_env_var("RECLAIM_TEST_SURELY_NOT_SET_03").is_none());
    }
}

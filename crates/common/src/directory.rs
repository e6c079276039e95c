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

//! The user directory seam.

use async_trait::async_trait;
use reclaim_model::{enums::EntitlementKind, identifiers::UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A typed error returned by user directory implementations.
#[derive(Clone, Debug, Error)]
pub enum DirectoryError {
    #[error("User not found: {0}")]
    NotFound(UserId),
    #[error("User directory unavailable: {0}")]
    Unavailable(String),
    #[error("User directory backend error: {0}")]
    Backend(String),
}

/// The view of a platform user needed for attribution and restoration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformUser {
    pub id: UserId,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// The mobile money number used for withdrawals, when different from `phone`.
    pub momo_number: Option<String>,
    pub balance: Decimal,
}

/// Read and balance-update access to the platform's users.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn get_by_id(&self, id: &UserId) -> Result<Option<PlatformUser>, DirectoryError>;

    /// Looks up a user by exact (case-insensitive) email.
    async fn get_by_email(&self, email: &str) -> Result<Option<PlatformUser>, DirectoryError>;

    /// Looks up a user by exact phone number, as stored.
    async fn get_by_phone(&self, phone: &str) -> Result<Option<PlatformUser>, DirectoryError>;

    /// Looks up a user by exact mobile money number, as stored.
    async fn get_by_momo_number(
        &self,
        number: &str,
    ) -> Result<Option<PlatformUser>, DirectoryError>;

    /// Adds `delta` (negative for debits) to the user's balance, returning the new balance.
    async fn update_balance(&self, id: &UserId, delta: Decimal) -> Result<Decimal, DirectoryError>;

    async fn get_active_entitlements(
        &self,
        id: &UserId,
    ) -> Result<Vec<EntitlementKind>, DirectoryError>;
}

/// A [`UserDirectory`] for runs with no platform attached.
///
/// Every lookup misses, so every recoverable transaction is parked in the ledger for
/// attribution at registration time. Balance updates are refused.
#[derive(Clone, Copy, Debug, Default)]
pub struct DetachedDirectory;

#[async_trait]
impl UserDirectory for DetachedDirectory {
    async fn get_by_id(&self, _id: &UserId) -> Result<Option<PlatformUser>, DirectoryError> {
        Ok(None)
    }

    async fn get_by_email(&self, _email: &str) -> Result<Option<PlatformUser>, DirectoryError> {
        Ok(None)
    }

    async fn get_by_phone(&self, _phone: &str) -> Result<Option<PlatformUser>, DirectoryError> {
        Ok(None)
    }

    async fn get_by_momo_number(
        &self,
        _number: &str,
    ) -> Result<Option<PlatformUser>, DirectoryError> {
        Ok(None)
    }

    async fn update_balance(
        &self,
        _id: &UserId,
        _delta: Decimal,
    ) -> Result<Decimal, DirectoryError> {
        Err(DirectoryError::Unavailable(
            "no platform attached".to_string(),
        ))
    }

    async fn get_active_entitlements(
        &self,
        _id: &UserId,
    ) -> Result<Vec<EntitlementKind>, DirectoryError> {
        Ok(Vec::new())
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use reclaim_model::identifiers::stubs::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    use super::*;

    #[rstest]
    #[tokio::test]
    async fn test_detached_directory_never_resolves(user_id: UserId) {
        let directory = DetachedDirectory;
        assert!(directory.get_by_id(&user_id).await.unwrap().is_none());
        assert!(directory.get_by_email("a@b.c").await.unwrap().is_none());
        assert!(directory.get_by_phone("+237670000001").await.unwrap().is_none());
        assert!(directory.get_by_momo_number("670000001").await.unwrap().is_none());
        assert!(matches!(
            directory.update_balance(&user_id, dec!(-1)).await,
            Err(DirectoryError::Unavailable(_))
        ));
    }
}

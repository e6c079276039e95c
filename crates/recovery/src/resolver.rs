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

//! Maps provider identity hints to a platform user.

use std::sync::Arc;

use reclaim_common::directory::{DirectoryError, PlatformUser, UserDirectory};
use reclaim_model::{identifiers::UserId, transaction::IdentityHints};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

/// The identity field through which a user was resolved.
#[derive(Copy, Clone, Debug, Display, Hash, PartialEq, Eq, AsRefStr, Serialize, Deserialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchSource {
    ProviderUserId,
    Email,
    Phone,
    MomoNumber,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub user: PlatformUser,
    pub matched_by: MatchSource,
}

/// Resolves identity hints to a platform user, first match wins.
///
/// The lookup order is:
/// 1. The provider user ID, verified by a reverse lookup (a stale ID is a miss).
/// 2. The email.
/// 3. Every phone variant against the phone number, then every variant against the mobile
///    money number.
#[derive(Clone)]
pub struct IdentityResolver {
    directory: Arc<dyn UserDirectory>,
}

impl std::fmt::Debug for IdentityResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(IdentityResolver))
            .finish_non_exhaustive()
    }
}

impl IdentityResolver {
    /// Creates a new [`IdentityResolver`] instance.
    #[must_use]
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self { directory }
    }

    #[must_use]
    pub fn directory(&self) -> &Arc<dyn UserDirectory> {
        &self.directory
    }

    /// Resolves `hints` to a platform user, or `None` when nothing matches.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory lookup fails.
    pub async fn resolve(
        &self,
        hints: &IdentityHints,
    ) -> Result<Option<ResolvedIdentity>, DirectoryError> {
        if let Some(uid) = hints.provider_user_id.as_deref() {
            match UserId::new_checked(uid) {
                Ok(id) => {
                    if let Some(user) = self.directory.get_by_id(&id).await? {
                        return Ok(Some(Self::matched(user, MatchSource::ProviderUserId)));
                    }
                    tracing::debug!("Provider user ID {uid} is stale");
                }
                Err(e) => tracing::debug!("Ignoring provider user ID {uid:?}: {e}"),
            }
        }

        if let Some(email) = hints.email.as_deref()
            && let Some(user) = self.directory.get_by_email(email).await?
        {
            return Ok(Some(Self::matched(user, MatchSource::Email)));
        }

        let variants = hints.phone_variants();
        for variant in &variants {
            if let Some(user) = self.directory.get_by_phone(variant).await? {
                return Ok(Some(Self::matched(user, MatchSource::Phone)));
            }
        }
        for variant in &variants {
            if let Some(user) = self.directory.get_by_momo_number(variant).await? {
                return Ok(Some(Self::matched(user, MatchSource::MomoNumber)));
            }
        }

        Ok(None)
    }

    fn matched(user: PlatformUser, matched_by: MatchSource) -> ResolvedIdentity {
        tracing::debug!("Resolved user {} by {matched_by}", user.id);
        ResolvedIdentity { user, matched_by }
    }
}

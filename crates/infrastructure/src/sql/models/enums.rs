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

//! Text column models for ledger enums.
//!
//! Enums are stored as their `SCREAMING_SNAKE_CASE` names in `TEXT` columns.

use std::str::FromStr;

use reclaim_model::enums::{PlanType, Provider, RecoveryStatus, TransactionKind};
use sqlx::{
    Database, Decode, Postgres, encode::IsNull, error::BoxDynError, postgres::PgTypeInfo,
    types::Type,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProviderModel(pub Provider);
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransactionKindModel(pub TransactionKind);
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecoveryStatusModel(pub RecoveryStatus);
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlanTypeModel(pub PlanType);

macro_rules! impl_text_enum_model {
    ($model:ident, $inner:ty, $label:literal) => {
        impl sqlx::Encode<'_, Postgres> for $model {
            fn encode_by_ref(
                &self,
                buf: &mut <Postgres as Database>::ArgumentBuffer<'_>,
            ) -> Result<IsNull, BoxDynError> {
                <&str as sqlx::Encode<Postgres>>::encode(self.0.as_ref(), buf)
            }
        }

        impl<'r> sqlx::Decode<'r, Postgres> for $model {
            fn decode(value: <Postgres as Database>::ValueRef<'r>) -> Result<Self, BoxDynError> {
                let value_str: &str = <&str as Decode<Postgres>>::decode(value)?;
                let inner = <$inner>::from_str(value_str).map_err(|_| {
                    sqlx::Error::Decode(format!("Invalid {}: {value_str}", $label).into())
                })?;
                Ok(Self(inner))
            }
        }

        impl Type<Postgres> for $model {
            fn type_info() -> PgTypeInfo {
                <&str as Type<Postgres>>::type_info()
            }

            fn compatible(ty: &PgTypeInfo) -> bool {
                <&str as Type<Postgres>>::compatible(ty)
            }
        }

        impl From<$inner> for $model {
            fn from(value: $inner) -> Self {
                Self(value)
            }
        }
    };
}

impl_text_enum_model!(ProviderModel, Provider, "provider");
impl_text_enum_model!(TransactionKindModel, TransactionKind, "transaction kind");
impl_text_enum_model!(RecoveryStatusModel, RecoveryStatus, "recovery status");
impl_text_enum_model!(PlanTypeModel, PlanType, "plan type");

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

//! The fixed gross to net plan price table.
//!
//! Providers charge the listed plan price plus their own fee, so the amount reported by a
//! provider (gross) differs from the canonical plan amount recorded by the platform (net).
//! The table is a closed set: any other amount passes through unchanged as [`PlanType::Unknown`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::enums::PlanType;

/// A single row of the plan price table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlanPrice {
    pub gross: Decimal,
    pub net: Decimal,
    pub plan: PlanType,
}

pub const PRICE_TABLE: [PlanPrice; 3] = [
    PlanPrice {
        gross: Decimal::from_parts(2142, 0, 0, false, 0),
        net: Decimal::from_parts(2070, 0, 0, false, 0),
        plan: PlanType::Classique,
    },
    PlanPrice {
        gross: Decimal::from_parts(5175, 0, 0, false, 0),
        net: Decimal::from_parts(5000, 0, 0, false, 0),
        plan: PlanType::Cible,
    },
    PlanPrice {
        gross: Decimal::from_parts(3105, 0, 0, false, 0),
        net: Decimal::from_parts(3000, 0, 0, false, 0),
        plan: PlanType::Upgrade,
    },
];

/// The result of mapping a provider amount through the price table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanMapping {
    pub net_amount: Decimal,
    pub plan: PlanType,
}

impl PlanMapping {
    /// Returns whether the amount matched a known plan price.
    #[must_use]
    pub fn is_known(&self) -> bool {
        self.plan != PlanType::Unknown
    }
}

/// Maps a provider amount (gross or already net) to the canonical plan amount.
#[must_use]
pub fn map_amount(amount: Decimal) -> PlanMapping {
    PRICE_TABLE
        .iter()
        .find(|price| price.gross == amount || price.net == amount)
        .map_or(
            PlanMapping {
                net_amount: amount,
                plan: PlanType::Unknown,
            },
            |price| PlanMapping {
                net_amount: price.net,
                plan: price.plan,
            },
        )
}

/// Returns whether `amount` is one of the fixed plan prices, gross or net.
#[must_use]
pub fn is_plan_amount(amount: Decimal) -> bool {
    map_amount(amount).is_known()
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use rstest::rstest;
    use rust_decimal_macros::dec;

    use super::*;

    #[rstest]
    #[case(dec!(2142), dec!(2070), PlanType::Classique)]
    #[case(dec!(5175), dec!(5000), PlanType::Cible)]
    #[case(dec!(3105), dec!(3000), PlanType::Upgrade)]
    #[case(dec!(2070), dec!(2070), PlanType::Classique)]
    #[case(dec!(5000.00), dec!(5000), PlanType::Cible)]
    #[case(dec!(1234), dec!(1234), PlanType::Unknown)]
    #[case(dec!(2143), dec!(2143), PlanType::Unknown)]
    fn test_map_amount(#[case] amount: Decimal, #[case] net: Decimal, #[case] plan: PlanType) {
        let mapping = map_amount(amount);
        assert_eq!(mapping.net_amount, net);
        assert_eq!(mapping.plan, plan);
    }

    #[rstest]
    fn test_is_plan_amount() {
        assert!(is_plan_amount(dec!(3105)));
        assert!(!is_plan_amount(dec!(10000)));
    }
}

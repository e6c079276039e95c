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

//! Fixture functions to provide stub identifiers for testing.

use rstest::fixture;

use crate::identifiers::{CanonicalId, Reference, UserId};

// ---- Reference ----

#[fixture]
pub fn reference() -> Reference {
    Reference::new("CP-20240512-0001")
}

#[fixture]
pub fn reference_payout() -> Reference {
    Reference::new("TR-20240512-0042")
}

// ---- UserId ----

#[fixture]
pub fn user_id() -> UserId {
    UserId::new("65f1c0ffee0000000000a001")
}

// ---- CanonicalId ----

#[fixture]
pub fn canonical_id() -> CanonicalId {
    CanonicalId::new("TX-0001")
}

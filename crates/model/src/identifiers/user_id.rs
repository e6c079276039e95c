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

//! Represents a valid platform user ID.

use std::hash::Hash;

use reclaim_core::correctness::{FAILED, check_string_max_len, check_valid_string_ascii};
use ustr::Ustr;

/// Represents the identifier of a user account on the owning platform.
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct UserId(Ustr);

impl_ustr_identifier!(UserId, 64);

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::identifiers::stubs::*;

    #[rstest]
    fn test_string_reprs(user_id: UserId) {
        assert_eq!(user_id.as_str(), "65f1c0ffee0000000000a001");
        assert_eq!(user_id.inner(), Ustr::from("65f1c0ffee0000000000a001"));
    }

    #[rstest]
    #[should_panic]
    fn test_new_invalid_string() {
        let _ = UserId::new("");
    }
}

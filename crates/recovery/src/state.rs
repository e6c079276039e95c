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

//! The per-reference reconciliation state machine.

use std::collections::HashMap;

use reclaim_core::fsm::FiniteStateMachine;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter};

/// The state of one reference within a reconciliation run.
#[derive(
    Copy, Clone, Debug, Display, Hash, PartialEq, Eq, AsRefStr, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReferenceState {
    Fetching,
    Skipped,
    Resolving,
    Restoring,
    Parking,
    Done,
    Error,
    Timeout,
}

impl ReferenceState {
    /// Returns whether the reference reached a terminal state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Skipped | Self::Done | Self::Error | Self::Timeout)
    }
}

#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
pub enum ReferenceTrigger {
    /// Provider state fetched and recoverable.
    Fetched,
    /// The reference needs no further work.
    Skip,
    /// A platform user was resolved.
    Resolved,
    /// No platform user matched.
    Unresolved,
    Complete,
    Fail,
    TimeOut,
}

fn transition_table() -> HashMap<(ReferenceState, ReferenceTrigger), ReferenceState> {
    use ReferenceState::{Done, Error, Fetching, Parking, Resolving, Restoring, Skipped, Timeout};
    use ReferenceTrigger::{Complete, Fail, Fetched, Resolved, Skip, TimeOut, Unresolved};

    HashMap::from([
        ((Fetching, Fetched), Resolving),
        ((Fetching, Skip), Skipped),
        ((Fetching, Fail), Error),
        ((Fetching, TimeOut), Timeout),
        ((Resolving, Resolved), Restoring),
        ((Resolving, Unresolved), Parking),
        ((Resolving, Fail), Error),
        ((Restoring, Complete), Done),
        ((Restoring, Skip), Skipped),
        ((Restoring, Fail), Error),
        ((Restoring, TimeOut), Timeout),
        ((Parking, Complete), Done),
        ((Parking, Skip), Skipped),
        ((Parking, Fail), Error),
        ((Parking, TimeOut), Timeout),
    ])
}

/// Tracks one reference through `FETCHING` to a terminal state.
#[derive(Debug)]
pub struct ReferenceStateMachine {
    fsm: FiniteStateMachine<ReferenceState, ReferenceTrigger>,
}

impl Default for ReferenceStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl ReferenceStateMachine {
    /// Creates a new [`ReferenceStateMachine`] in the `FETCHING` state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            fsm: FiniteStateMachine::new(ReferenceState::Fetching, transition_table()),
        }
    }

    #[must_use]
    pub fn state(&self) -> ReferenceState {
        self.fsm.state()
    }

    #[must_use]
    pub fn history(&self) -> &[ReferenceState] {
        self.fsm.history()
    }

    /// Applies `trigger`, returning the resulting state.
    ///
    /// An invalid trigger is logged and leaves the state unchanged.
    pub fn apply(&mut self, trigger: ReferenceTrigger) -> ReferenceState {
        if let Err(e) = self.fsm.trigger(trigger) {
            tracing::error!("{e}");
        }
        self.fsm.state()
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use rstest::rstest;
    use strum::IntoEnumIterator;

    use super::*;

    #[rstest]
    #[case(&[ReferenceTrigger::Skip], ReferenceState::Skipped)]
    #[case(&[ReferenceTrigger::TimeOut], ReferenceState::Timeout)]
    #[case(&[ReferenceTrigger::Fetched, ReferenceTrigger::Resolved, ReferenceTrigger::Complete], ReferenceState::Done)]
    #[case(&[ReferenceTrigger::Fetched, ReferenceTrigger::Unresolved, ReferenceTrigger::Complete], ReferenceState::Done)]
    #[case(&[ReferenceTrigger::Fetched, ReferenceTrigger::Resolved, ReferenceTrigger::Skip], ReferenceState::Skipped)]
    #[case(&[ReferenceTrigger::Fetched, ReferenceTrigger::Unresolved, ReferenceTrigger::Fail], ReferenceState::Error)]
    fn test_paths(#[case] triggers: &[ReferenceTrigger], #[case] expected: ReferenceState) {
        let mut machine = ReferenceStateMachine::new();
        for trigger in triggers {
            machine.apply(*trigger);
        }
        assert_eq!(machine.state(), expected);
        assert!(machine.state().is_terminal());
        assert_eq!(machine.history().len(), triggers.len() + 1);
    }

    #[rstest]
    fn test_invalid_trigger_keeps_state() {
        let mut machine = ReferenceStateMachine::new();
        assert_eq!(machine.apply(ReferenceTrigger::Complete), ReferenceState::Fetching);
        assert_eq!(machine.history(), &[ReferenceState::Fetching]);
    }

    #[rstest]
    fn test_terminal_states() {
        let terminal: Vec<ReferenceState> =
            ReferenceState::iter().filter(|s| s.is_terminal()).collect();
        assert_eq!(
            terminal,
            [
                ReferenceState::Skipped,
                ReferenceState::Done,
                ReferenceState::Error,
                ReferenceState::Timeout
            ]
        );
    }
}

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

//! Defines a generic `Finite-State Machine` (FSM).
//!
//! The FSM operates with a state-transition table of tuples and enums. An invalid
//! trigger is reported as an [`InvalidStateTrigger`] error and leaves the current
//! state untouched.
//!
//! # References
//!
//! <https://en.wikipedia.org/wiki/Finite-state_machine>

use std::{
    collections::HashMap,
    fmt::{Debug, Display},
    hash::Hash,
};

/// Error representing an invalid trigger for the current state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvalidStateTrigger {
    /// The current state as a string.
    pub current_state: String,
    /// The trigger as a string.
    pub trigger: String,
}

impl Display for InvalidStateTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Invalid state transition: {} -> {}",
            self.current_state, self.trigger
        )
    }
}

impl std::error::Error for InvalidStateTrigger {}

/// Provides a generic finite state machine.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use reclaim_core::fsm::FiniteStateMachine;
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// enum State {
///     Pending,
///     Restored,
/// }
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// enum Trigger {
///     Restore,
/// }
///
/// let table = HashMap::from([((State::Pending, Trigger::Restore), State::Restored)]);
/// let mut fsm = FiniteStateMachine::new(State::Pending, table);
///
/// assert_eq!(fsm.trigger(Trigger::Restore).unwrap(), State::Restored);
/// assert!(fsm.trigger(Trigger::Restore).is_err());
/// ```
pub struct FiniteStateMachine<S, T>
where
    S: Copy + Eq + Hash + Debug,
    T: Copy + Eq + Hash + Debug,
{
    state: S,
    state_transition_table: HashMap<(S, T), S>,
    history: Vec<S>,
}

impl<S, T> Debug for FiniteStateMachine<S, T>
where
    S: Copy + Eq + Hash + Debug,
    T: Copy + Eq + Hash + Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(FiniteStateMachine))
            .field("state", &self.state)
            .field("history", &self.history)
            .finish_non_exhaustive()
    }
}

impl<S, T> FiniteStateMachine<S, T>
where
    S: Copy + Eq + Hash + Debug,
    T: Copy + Eq + Hash + Debug,
{
    /// Creates a new finite state machine.
    ///
    /// # Panics
    ///
    /// Panics if `state_transition_table` is empty.
    #[must_use]
    pub fn new(initial_state: S, state_transition_table: HashMap<(S, T), S>) -> Self {
        assert!(
            !state_transition_table.is_empty(),
            "state_transition_table cannot be empty"
        );

        Self {
            state: initial_state,
            state_transition_table,
            history: vec![initial_state],
        }
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> S {
        self.state
    }

    /// Returns every state visited so far, starting with the initial state.
    #[must_use]
    pub fn history(&self) -> &[S] {
        &self.history
    }

    /// Returns whether `trigger` is valid from the current state.
    #[must_use]
    pub fn can_trigger(&self, trigger: T) -> bool {
        self.state_transition_table
            .contains_key(&(self.state, trigger))
    }

    /// Returns whether no trigger is valid from the current state.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !self
            .state_transition_table
            .keys()
            .any(|(state, _)| *state == self.state)
    }

    /// Process the FSM with the given trigger, returning the new state.
    ///
    /// # Errors
    ///
    /// Returns an [`InvalidStateTrigger`] if the state and `trigger` combination is not
    /// found in the transition table. The current state is left unchanged.
    pub fn trigger(&mut self, trigger: T) -> Result<S, InvalidStateTrigger> {
        match self.state_transition_table.get(&(self.state, trigger)) {
            Some(&next_state) => {
                self.state = next_state;
                self.history.push(next_state);
                Ok(next_state)
            }
            None => Err(InvalidStateTrigger {
                current_state: format!("{:?}", self.state),
                trigger: format!("{trigger:?}"),
            }),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum TestState {
        Fetching,
        Resolving,
        Done,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum TestTrigger {
        Fetched,
        Finish,
    }

    #[fixture]
    fn fsm() -> FiniteStateMachine<TestState, TestTrigger> {
        let table = HashMap::from([
            (
                (TestState::Fetching, TestTrigger::Fetched),
                TestState::Resolving,
            ),
            ((TestState::Resolving, TestTrigger::Finish), TestState::Done),
        ]);
        FiniteStateMachine::new(TestState::Fetching, table)
    }

    #[rstest]
    fn test_initial_state(fsm: FiniteStateMachine<TestState, TestTrigger>) {
        assert_eq!(fsm.state(), TestState::Fetching);
        assert_eq!(fsm.history(), &[TestState::Fetching]);
        assert!(!fsm.is_terminal());
    }

    #[rstest]
    fn test_valid_multiple_transitions(mut fsm: FiniteStateMachine<TestState, TestTrigger>) {
        assert_eq!(
            fsm.trigger(TestTrigger::Fetched).unwrap(),
            TestState::Resolving
        );
        assert_eq!(fsm.trigger(TestTrigger::Finish).unwrap(), TestState::Done);
        assert!(fsm.is_terminal());
        assert_eq!(
            fsm.history(),
            &[TestState::Fetching, TestState::Resolving, TestState::Done]
        );
    }

    #[rstest]
    fn test_invalid_transition_leaves_state(mut fsm: FiniteStateMachine<TestState, TestTrigger>) {
        let err = fsm.trigger(TestTrigger::Finish).unwrap_err();
        assert_eq!(err.to_string(), "Invalid state transition: Fetching -> Finish");
        assert_eq!(fsm.state(), TestState::Fetching);
        assert!(!fsm.can_trigger(TestTrigger::Finish));
        assert!(fsm.can_trigger(TestTrigger::Fetched));
    }

    #[rstest]
    #[should_panic(expected = "state_transition_table cannot be empty")]
    fn test_empty_transition_table() {
        let table = HashMap::<(TestState, TestTrigger), TestState>::new();
        let _ = FiniteStateMachine::new(TestState::Fetching, table);
    }
}

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

//! Outcomes and summaries of reconciliation runs and registration sweeps.

use std::fmt::Display;

use reclaim_model::identifiers::{CanonicalId, RecordId, Reference, UserId};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};
use tabled::{Table, Tabled, settings::Style};

use crate::state::ReferenceState;

/// Why a reference needed no further work.
#[derive(Copy, Clone, Debug, Display, Hash, PartialEq, Eq, AsRefStr, Serialize, Deserialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SkipReason {
    /// The ledger already tracks the reference.
    AlreadyKnown,
    /// The reference was repeated within the same input.
    DuplicateInput,
    /// The provider reports a non-successful status.
    ProviderRejected,
    /// A canonical record already exists, proving a prior restoration.
    DuplicateCanonicalRecord,
    /// The user already holds the entitlement the payment would grant.
    EntitlementConflict,
}

/// Why a reference failed.
#[derive(Copy, Clone, Debug, Display, Hash, PartialEq, Eq, AsRefStr, Serialize, Deserialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
    /// The provider does not know the reference.
    NotFound,
    /// The provider answered with an error other than a transport failure.
    Provider,
    /// The transaction kind was inferred with low confidence.
    ClassificationRejected,
    /// The user directory failed.
    Directory,
    /// The canonical record or balance update failed.
    Restoration,
    /// The ledger failed.
    Persistence,
}

/// The terminal outcome of one reference.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReferenceOutcome {
    Restored {
        user_id: UserId,
        canonical_id: CanonicalId,
    },
    Parked {
        record_id: RecordId,
    },
    Skipped {
        reason: SkipReason,
    },
    Failed {
        kind: FailureKind,
    },
    TimedOut,
    /// The run was cancelled before the reference was processed.
    Cancelled,
}

impl Display for ReferenceOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Restored { user_id, .. } => write!(f, "RESTORED({user_id})"),
            Self::Parked { .. } => write!(f, "PARKED"),
            Self::Skipped { reason } => write!(f, "SKIPPED({reason})"),
            Self::Failed { kind } => write!(f, "FAILED({kind})"),
            Self::TimedOut => write!(f, "TIMED_OUT"),
            Self::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// The outcome of one reference within a run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceReport {
    pub reference: Reference,
    /// The terminal state, `None` when the reference was never processed.
    pub state: Option<ReferenceState>,
    pub outcome: ReferenceOutcome,
    pub message: String,
}

impl ReferenceReport {
    #[must_use]
    pub fn new(
        reference: Reference,
        state: Option<ReferenceState>,
        outcome: ReferenceOutcome,
        message: impl Into<String>,
    ) -> Self {
        Self {
            reference,
            state,
            outcome,
            message: message.into(),
        }
    }
}

#[derive(Tabled)]
struct ReferenceRow {
    reference: String,
    state: String,
    outcome: String,
    message: String,
}

/// The summary of one reconciliation run.
///
/// Every input reference appears exactly once in `references`, in input order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub total_processed: u64,
    pub successful_recoveries: u64,
    pub saved_for_later: u64,
    pub skipped: u64,
    pub failed: u64,
    pub timed_out: u64,
    pub cancelled: u64,
    /// References to re-submit once the provider is reachable again.
    pub timeout_references: Vec<Reference>,
    pub error_references: Vec<Reference>,
    pub references: Vec<ReferenceReport>,
}

impl ReconciliationReport {
    /// Accumulates the outcome of one reference.
    pub fn record(&mut self, report: ReferenceReport) {
        match &report.outcome {
            ReferenceOutcome::Restored { .. } => self.successful_recoveries += 1,
            ReferenceOutcome::Parked { .. } => self.saved_for_later += 1,
            ReferenceOutcome::Skipped { .. } => self.skipped += 1,
            ReferenceOutcome::Failed { .. } => {
                self.failed += 1;
                self.error_references.push(report.reference);
            }
            ReferenceOutcome::TimedOut => {
                self.timed_out += 1;
                self.timeout_references.push(report.reference);
            }
            ReferenceOutcome::Cancelled => self.cancelled += 1,
        }
        if !matches!(report.outcome, ReferenceOutcome::Cancelled) {
            self.total_processed += 1;
        }
        self.references.push(report);
    }

    /// Returns the report of `reference`, if it was part of the run.
    #[must_use]
    pub fn get(&self, reference: &Reference) -> Option<&ReferenceReport> {
        self.references.iter().find(|r| r.reference == *reference)
    }

    /// Returns a human-readable table of every reference outcome.
    #[must_use]
    pub fn table(&self) -> String {
        let rows: Vec<ReferenceRow> = self
            .references
            .iter()
            .map(|r| ReferenceRow {
                reference: r.reference.to_string(),
                state: r.state.map(|s| s.to_string()).unwrap_or_default(),
                outcome: r.outcome.to_string(),
                message: r.message.clone(),
            })
            .collect();
        Table::new(rows).with(Style::rounded()).to_string()
    }
}

impl Display for ReconciliationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "processed={}, restored={}, saved_for_later={}, skipped={}, failed={}, timed_out={}, cancelled={}",
            self.total_processed,
            self.successful_recoveries,
            self.saved_for_later,
            self.skipped,
            self.failed,
            self.timed_out,
            self.cancelled,
        )
    }
}

/// The summary of one registration sweep.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    pub user_id: UserId,
    pub restored: u64,
    pub skipped: u64,
    pub failed: u64,
    /// Records transitioned by the closing bulk mark.
    pub bulk_marked: u64,
    pub failed_records: Vec<RecordId>,
}

impl SweepReport {
    #[must_use]
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            restored: 0,
            skipped: 0,
            failed: 0,
            bulk_marked: 0,
            failed_records: Vec::new(),
        }
    }
}

/// Whether an identity has recoverable value, safe to show before authentication.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoverableSummary {
    pub count: u64,
    pub has_recoverable_value: bool,
}

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

//! The reconciliation orchestrator.
//!
//! References are processed sequentially and independently: each one is walked through the
//! [`ReferenceStateMachine`] to a terminal state and reported, and no failure aborts the run.
//! Cancellation is observed only between references.

pub mod admin;
pub mod sweep;

use std::{collections::HashSet, sync::Arc};

use chrono::Utc;
use indexmap::IndexMap;
use reclaim_common::{
    canonical::CanonicalStore,
    completion::{PaymentCompletion, PayoutCompletion, RestorationTrigger},
    directory::{DirectoryError, UserDirectory},
    ledger::{LedgerError, RecoveryLedger},
    provider::{ProviderAdapter, ProviderError},
};
use reclaim_model::{
    enums::{KindSelector, Provider},
    identifiers::{Reference, UserId},
    record::RecoveryRecord,
    transaction::ProviderTransaction,
};
use reclaim_network::http::HttpClientError;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::{
    config::ReconciliationConfig,
    dispatcher::{RestorationDispatcher, RestorationOutcome},
    report::{FailureKind, ReconciliationReport, ReferenceOutcome, ReferenceReport, SkipReason},
    resolver::IdentityResolver,
    state::{ReferenceStateMachine, ReferenceTrigger},
};

/// A run-level error. Per-reference failures are reported, never raised.
#[derive(Clone, Debug, Error)]
pub enum RecoveryError {
    #[error("No adapter registered for {0}")]
    NoAdapter(Provider),
    #[error("User not found: {0}")]
    UserNotFound(UserId),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

/// Where the provider state of a reference comes from.
enum Source {
    /// Fetch it from the live adapter.
    Fetch(Arc<dyn ProviderAdapter>, KindSelector),
    /// Trust a pre-parsed export row.
    Row(ProviderTransaction),
}

/// Drives provider transactions to restoration or to the recovery ledger.
pub struct ReconciliationOrchestrator {
    config: ReconciliationConfig,
    adapters: IndexMap<Provider, Arc<dyn ProviderAdapter>>,
    ledger: Arc<dyn RecoveryLedger>,
    resolver: IdentityResolver,
    dispatcher: RestorationDispatcher,
}

impl std::fmt::Debug for ReconciliationOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(ReconciliationOrchestrator))
            .field("config", &self.config)
            .field("adapters", &self.adapters.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl ReconciliationOrchestrator {
    /// Creates a new [`ReconciliationOrchestrator`] instance with no adapters registered.
    #[must_use]
    pub fn new(
        config: ReconciliationConfig,
        ledger: Arc<dyn RecoveryLedger>,
        directory: Arc<dyn UserDirectory>,
        canonical: Arc<dyn CanonicalStore>,
        payments: Arc<dyn PaymentCompletion>,
        payouts: Arc<dyn PayoutCompletion>,
    ) -> Self {
        Self {
            config,
            adapters: IndexMap::new(),
            ledger,
            resolver: IdentityResolver::new(directory.clone()),
            dispatcher: RestorationDispatcher::new(directory, canonical, payments, payouts),
        }
    }

    /// Registers `adapter`, replacing any adapter for the same provider.
    pub fn register_adapter(&mut self, adapter: Arc<dyn ProviderAdapter>) {
        let provider = adapter.provider();
        if self.adapters.insert(provider, adapter).is_some() {
            tracing::warn!("Replaced adapter for {provider}");
        }
    }

    #[must_use]
    pub fn with_adapter(mut self, adapter: Arc<dyn ProviderAdapter>) -> Self {
        self.register_adapter(adapter);
        self
    }

    #[must_use]
    pub fn config(&self) -> &ReconciliationConfig {
        &self.config
    }

    #[must_use]
    pub fn ledger(&self) -> &Arc<dyn RecoveryLedger> {
        &self.ledger
    }

    fn adapter(&self, provider: Provider) -> Result<Arc<dyn ProviderAdapter>, RecoveryError> {
        self.adapters
            .get(&provider)
            .cloned()
            .ok_or(RecoveryError::NoAdapter(provider))
    }

    /// Reconciles `references` against the live `provider` adapter.
    ///
    /// # Errors
    ///
    /// Returns an error if no adapter is registered for `provider`.
    pub async fn reconcile_references(
        &self,
        provider: Provider,
        selector: KindSelector,
        references: &[Reference],
        cancel: &CancellationToken,
    ) -> Result<ReconciliationReport, RecoveryError> {
        let adapter = self.adapter(provider)?;
        tracing::info!(
            "Reconciling {} {provider} reference(s), kind {selector}",
            references.len()
        );

        let mut report = ReconciliationReport::default();
        let mut seen = HashSet::new();
        for reference in references {
            if cancel.is_cancelled() {
                report.record(cancelled(*reference));
                continue;
            }
            if !seen.insert(*reference) {
                report.record(duplicate_input(*reference));
                continue;
            }
            let source = Source::Fetch(adapter.clone(), selector);
            report.record(self.process(provider, *reference, source).await);
        }

        tracing::info!("Reconciliation finished: {report}");
        Ok(report)
    }

    /// Reconciles a reference list against the live `provider` adapter in throttled batches.
    ///
    /// Used for reference-only exports, whose rows carry nothing to trust without a lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if no adapter is registered for `provider`.
    pub async fn reconcile_reference_batches(
        &self,
        provider: Provider,
        selector: KindSelector,
        references: &[Reference],
        cancel: &CancellationToken,
    ) -> Result<ReconciliationReport, RecoveryError> {
        let adapter = self.adapter(provider)?;
        let batch_size = self.config.batch_size.max(1);
        tracing::info!(
            "Reconciling {} {provider} reference(s), kind {selector}, in batches of {batch_size}",
            references.len()
        );

        let mut report = ReconciliationReport::default();
        let mut seen = HashSet::new();
        for (batch, chunk) in references.chunks(batch_size).enumerate() {
            if batch > 0 {
                self.pause_between_batches(batch, cancel).await;
            }
            for reference in chunk {
                if cancel.is_cancelled() {
                    report.record(cancelled(*reference));
                    continue;
                }
                if !seen.insert(*reference) {
                    report.record(duplicate_input(*reference));
                    continue;
                }
                let source = Source::Fetch(adapter.clone(), selector);
                report.record(self.process(provider, *reference, source).await);
            }
        }

        tracing::info!("Reference list reconciliation finished: {report}");
        Ok(report)
    }

    /// Reconciles pre-parsed export transactions in throttled batches.
    ///
    /// With `verify_exports` each row is re-fetched from the live adapter of its provider.
    ///
    /// # Errors
    ///
    /// Returns an error if `verify_exports` is set and a row's provider has no adapter.
    pub async fn reconcile_export(
        &self,
        transactions: Vec<ProviderTransaction>,
        cancel: &CancellationToken,
    ) -> Result<ReconciliationReport, RecoveryError> {
        if self.config.verify_exports {
            for transaction in &transactions {
                self.adapter(transaction.provider)?;
            }
        }

        let total = transactions.len();
        let batch_size = self.config.batch_size.max(1);
        tracing::info!("Reconciling {total} export row(s) in batches of {batch_size}");

        let mut report = ReconciliationReport::default();
        let mut seen = HashSet::new();
        let mut rows = transactions.into_iter().peekable();
        let mut batch = 0;

        while rows.peek().is_some() {
            if batch > 0 {
                self.pause_between_batches(batch, cancel).await;
            }
            batch += 1;

            for transaction in rows.by_ref().take(batch_size) {
                let reference = transaction.reference;
                if cancel.is_cancelled() {
                    report.record(cancelled(reference));
                    continue;
                }
                if !seen.insert((transaction.provider, reference)) {
                    report.record(duplicate_input(reference));
                    continue;
                }
                let provider = transaction.provider;
                let source = if self.config.verify_exports {
                    Source::Fetch(self.adapter(provider)?, transaction.kind().into())
                } else {
                    Source::Row(transaction)
                };
                report.record(self.process(provider, reference, source).await);
            }
        }

        tracing::info!("Export reconciliation finished: {report}");
        Ok(report)
    }

    /// Sleeps the inter-batch delay before the zero-based `batch`, waking early on cancellation.
    async fn pause_between_batches(&self, batch: usize, cancel: &CancellationToken) {
        if cancel.is_cancelled() {
            return;
        }
        tracing::debug!(
            "Pausing {:?} before batch {}",
            self.config.inter_batch_delay(),
            batch + 1
        );
        tokio::select! {
            () = tokio::time::sleep(self.config.inter_batch_delay()) => {}
            () = cancel.cancelled() => {}
        }
    }

    async fn process(
        &self,
        provider: Provider,
        reference: Reference,
        source: Source,
    ) -> ReferenceReport {
        let mut fsm = ReferenceStateMachine::new();
        let (outcome, message) = self.run(&mut fsm, provider, reference, source).await;
        let state = fsm.state();

        match &outcome {
            ReferenceOutcome::Restored { .. } | ReferenceOutcome::Parked { .. } => {
                tracing::info!("{provider} {reference}: {outcome} {message}");
            }
            ReferenceOutcome::TimedOut => tracing::warn!("{provider} {reference}: {message}"),
            ReferenceOutcome::Failed { .. } => {
                tracing::error!("{provider} {reference}: {outcome} {message}");
            }
            ReferenceOutcome::Skipped { .. } | ReferenceOutcome::Cancelled => {
                tracing::debug!("{provider} {reference}: {outcome} {message}");
            }
        }

        ReferenceReport::new(reference, Some(state), outcome, message)
    }

    async fn run(
        &self,
        fsm: &mut ReferenceStateMachine,
        provider: Provider,
        reference: Reference,
        source: Source,
    ) -> (ReferenceOutcome, String) {
        match self.ledger.exists(provider, &reference).await {
            Ok(true) => {
                fsm.apply(ReferenceTrigger::Skip);
                return skipped(SkipReason::AlreadyKnown, "already tracked in the ledger");
            }
            Ok(false) => {}
            Err(e) => {
                fsm.apply(ReferenceTrigger::Fail);
                return failed(FailureKind::Persistence, e);
            }
        }

        let (transaction, adapter) = match source {
            Source::Row(transaction) => (transaction, None),
            Source::Fetch(adapter, selector) => {
                match self.fetch(adapter.as_ref(), &reference, selector).await {
                    Ok(Some(transaction)) => (transaction, Some(adapter)),
                    Ok(None) => {
                        fsm.apply(ReferenceTrigger::Fail);
                        return failed(FailureKind::NotFound, "unknown to the provider");
                    }
                    Err(e) if e.is_retryable() => {
                        fsm.apply(ReferenceTrigger::TimeOut);
                        return (ReferenceOutcome::TimedOut, e.to_string());
                    }
                    Err(e) => {
                        fsm.apply(ReferenceTrigger::Fail);
                        return failed(FailureKind::Provider, e);
                    }
                }
            }
        };

        if let Some(adapter) = adapter
            && !adapter.is_successful(&transaction.status)
        {
            fsm.apply(ReferenceTrigger::Skip);
            return skipped(
                SkipReason::ProviderRejected,
                format!("provider status {}", transaction.status),
            );
        }

        if self.config.reject_low_confidence && transaction.kind.is_low_confidence() {
            fsm.apply(ReferenceTrigger::Fail);
            return failed(
                FailureKind::ClassificationRejected,
                format!(
                    "{} inferred from {} with {} confidence",
                    transaction.kind.kind, transaction.kind.provenance, transaction.kind.confidence
                ),
            );
        }

        fsm.apply(ReferenceTrigger::Fetched);
        self.resolve_and_restore(fsm, &transaction).await
    }

    /// Fetches `reference` within the provider timeout budget.
    async fn fetch(
        &self,
        adapter: &dyn ProviderAdapter,
        reference: &Reference,
        selector: KindSelector,
    ) -> Result<Option<ProviderTransaction>, ProviderError> {
        let budget = self.config.provider_timeout();
        match tokio::time::timeout(budget, adapter.fetch_status(reference, selector)).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Transport(HttpClientError::Timeout(format!(
                "no answer within {budget:?}"
            )))),
        }
    }

    async fn resolve_and_restore(
        &self,
        fsm: &mut ReferenceStateMachine,
        transaction: &ProviderTransaction,
    ) -> (ReferenceOutcome, String) {
        let identity = match self.resolver.resolve(&transaction.hints).await {
            Ok(identity) => identity,
            Err(e) => {
                fsm.apply(ReferenceTrigger::Fail);
                return failed(FailureKind::Directory, e);
            }
        };

        let Some(identity) = identity else {
            fsm.apply(ReferenceTrigger::Unresolved);
            return self.park(fsm, transaction).await;
        };

        fsm.apply(ReferenceTrigger::Resolved);
        let user_id = identity.user.id;
        match self
            .dispatcher
            .restore(transaction, &identity.user, RestorationTrigger::Reconciliation)
            .await
        {
            Ok(RestorationOutcome::Restored {
                canonical_id,
                notes,
            }) => {
                fsm.apply(ReferenceTrigger::Complete);
                let mut message = format!("matched by {}", identity.matched_by);
                for note in notes {
                    message.push_str("; ");
                    message.push_str(&note);
                }
                (
                    ReferenceOutcome::Restored {
                        user_id,
                        canonical_id,
                    },
                    message,
                )
            }
            Ok(RestorationOutcome::AlreadyMaterialized { canonical_id }) => {
                fsm.apply(ReferenceTrigger::Skip);
                let detail = canonical_id.map_or_else(
                    || "canonical record already exists".to_string(),
                    |id| format!("canonical record {id} already exists"),
                );
                skipped(SkipReason::DuplicateCanonicalRecord, detail)
            }
            Ok(RestorationOutcome::EntitlementConflict { plan }) => {
                fsm.apply(ReferenceTrigger::Skip);
                skipped(
                    SkipReason::EntitlementConflict,
                    format!("user {user_id} already holds the {plan} entitlement"),
                )
            }
            Err(e) => {
                fsm.apply(ReferenceTrigger::Fail);
                failed(FailureKind::Restoration, e)
            }
        }
    }

    async fn park(
        &self,
        fsm: &mut ReferenceStateMachine,
        transaction: &ProviderTransaction,
    ) -> (ReferenceOutcome, String) {
        let record = RecoveryRecord::from_transaction(transaction, Utc::now());
        match self.ledger.create(record).await {
            Ok(record) => {
                fsm.apply(ReferenceTrigger::Complete);
                (
                    ReferenceOutcome::Parked {
                        record_id: record.id,
                    },
                    format!("saved for later ({})", transaction.hints),
                )
            }
            Err(LedgerError::DuplicateRecord { .. }) => {
                fsm.apply(ReferenceTrigger::Skip);
                skipped(SkipReason::AlreadyKnown, "already tracked in the ledger")
            }
            Err(e) => {
                fsm.apply(ReferenceTrigger::Fail);
                failed(FailureKind::Persistence, e)
            }
        }
    }
}

fn skipped(reason: SkipReason, message: impl Into<String>) -> (ReferenceOutcome, String) {
    (ReferenceOutcome::Skipped { reason }, message.into())
}

fn failed(kind: FailureKind, error: impl ToString) -> (ReferenceOutcome, String) {
    (ReferenceOutcome::Failed { kind }, error.to_string())
}

fn cancelled(reference: Reference) -> ReferenceReport {
    ReferenceReport::new(reference, None, ReferenceOutcome::Cancelled, "run cancelled")
}

fn duplicate_input(reference: Reference) -> ReferenceReport {
    ReferenceReport::new(
        reference,
        None,
        ReferenceOutcome::Skipped {
            reason: SkipReason::DuplicateInput,
        },
        "repeated in the input",
    )
}

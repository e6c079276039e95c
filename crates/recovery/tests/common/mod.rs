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

//! Shared harness for the recovery integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use reclaim_common::{
    ledger::memory::InMemoryRecoveryLedger,
    stubs::{
        InMemoryCanonicalStore, InMemoryUserDirectory, RecordingPaymentCompletion,
        RecordingPayoutCompletion, StaticProviderAdapter,
    },
};
use reclaim_recovery::{config::ReconciliationConfig, orchestrator::ReconciliationOrchestrator};
use rstest::fixture;

pub struct Harness {
    pub ledger: Arc<InMemoryRecoveryLedger>,
    pub directory: Arc<InMemoryUserDirectory>,
    pub canonical: Arc<InMemoryCanonicalStore>,
    pub payments: Arc<RecordingPaymentCompletion>,
    pub payouts: Arc<RecordingPayoutCompletion>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            ledger: Arc::new(InMemoryRecoveryLedger::new()),
            directory: Arc::new(InMemoryUserDirectory::new()),
            canonical: Arc::new(InMemoryCanonicalStore::new()),
            payments: Arc::new(RecordingPaymentCompletion::new()),
            payouts: Arc::new(RecordingPayoutCompletion::new()),
        }
    }

    pub fn orchestrator(&self, config: ReconciliationConfig) -> ReconciliationOrchestrator {
        ReconciliationOrchestrator::new(
            config,
            self.ledger.clone(),
            self.directory.clone(),
            self.canonical.clone(),
            self.payments.clone(),
            self.payouts.clone(),
        )
    }

    pub fn with_adapter(&self, adapter: Arc<StaticProviderAdapter>) -> ReconciliationOrchestrator {
        self.orchestrator(fast_config()).with_adapter(adapter)
    }
}

/// A configuration without throttling and with a one second provider budget.
pub fn fast_config() -> ReconciliationConfig {
    ReconciliationConfig::new(Some(2), Some(0), Some(1), None, None)
}

#[fixture]
pub fn harness() -> Harness {
    Harness::new()
}

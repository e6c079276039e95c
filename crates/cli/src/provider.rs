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

use std::sync::Arc;

use reclaim_cinetpay::{config::CinetPayConfig, provider::CinetPayProvider};
use reclaim_common::provider::ProviderAdapter;
use reclaim_feexpay::{config::FeexPayConfig, provider::FeexPayProvider};
use reclaim_model::enums::Provider;

use crate::opt::{ProviderCommand, ProviderOpt};

/// Builds the live adapter for `provider` from its environment configuration.
///
/// # Errors
///
/// Returns an error if the provider's credentials are missing from the environment.
pub fn adapter_from_env(provider: Provider) -> anyhow::Result<Arc<dyn ProviderAdapter>> {
    let adapter: Arc<dyn ProviderAdapter> = match provider {
        Provider::CinetPay => Arc::new(CinetPayProvider::new(CinetPayConfig::from_env()?)?),
        Provider::FeexPay => Arc::new(FeexPayProvider::new(FeexPayConfig::from_env()?)?),
    };
    Ok(adapter)
}

pub async fn run_provider_command(opt: ProviderOpt) -> anyhow::Result<()> {
    match opt.command {
        ProviderCommand::Check {
            provider,
            kind,
            reference,
        } => {
            let adapter = adapter_from_env(provider)?;
            match adapter.fetch_status(&reference, kind).await? {
                Some(transaction) => {
                    let successful = adapter.is_successful(&transaction.status);
                    tracing::info!("{transaction} (successful={successful})");
                    println!("{}", serde_json::to_string_pretty(&transaction)?);
                }
                None => tracing::warn!("{provider} does not know reference {reference}"),
            }
        }
    }
    Ok(())
}

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

use std::collections::BTreeMap;

use reclaim_cinetpay::csv::{ExportParseResult, ExportSummary, load_export};

use crate::opt::{ExportCommand, ExportOpt};

pub fn run_export_command(opt: ExportOpt) -> anyhow::Result<()> {
    match opt.command {
        ExportCommand::Parse { file, json } => {
            let result = load_export(&file)?;
            tracing::info!(
                "Parsed {} row(s) from {}: {} accepted, {} missing reference, {} not successful, {} invalid",
                result.rows,
                file.display(),
                result.transactions.len() + result.references.len(),
                result.missing_reference,
                result.not_successful,
                result.invalid,
            );

            if json {
                print_json(&result)?;
            } else if result.is_reference_list() {
                for reference in &result.references {
                    println!("{reference}");
                }
            } else {
                println!("{}", summary_lines(result.rows, &result.summary).join("\n"));
                for transaction in &result.transactions {
                    println!("{transaction}");
                }
            }
        }
    }
    Ok(())
}

fn print_json(result: &ExportParseResult) -> anyhow::Result<()> {
    let value = if result.is_reference_list() {
        serde_json::json!({
            "format": result.format,
            "rows": result.rows,
            "references": result.references,
        })
    } else {
        serde_json::json!({
            "format": result.format,
            "rows": result.rows,
            "summary": result.summary,
            "transactions": result.transactions,
        })
    };
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn summary_lines(total: usize, summary: &ExportSummary) -> Vec<String> {
    let date_range = match (summary.first_date, summary.last_date) {
        (Some(first), Some(last)) => format!("{first} to {last}"),
        _ => "N/A".to_string(),
    };
    vec![
        format!("Total rows:      {total}"),
        format!("Date range:      {date_range}"),
        format!("Status:          {}", breakdown(&summary.by_status)),
        format!("Payment methods: {}", breakdown(&summary.by_payment_method)),
        format!("Currencies:      {}", breakdown(&summary.by_currency)),
        format!("Countries:       {}", breakdown(&summary.by_country)),
    ]
}

fn breakdown(counts: &BTreeMap<String, usize>) -> String {
    if counts.is_empty() {
        return "-".to_string();
    }
    counts
        .iter()
        .map(|(key, count)| format!("{key}={count}"))
        .collect::<Vec<_>>()
        .join(", ")
}

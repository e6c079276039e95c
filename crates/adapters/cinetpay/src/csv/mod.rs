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

//! Parsing of CinetPay dashboard CSV exports into [`ProviderTransaction`]s.
//!
//! Two layouts are read: the detailed dashboard export (one column per transaction field) and the
//! reference list written by the dashboard scrapers (a single `transaction_id` column). The latter
//! carries no status or amount, so its references must be verified against the live API.

mod record;

use std::{collections::BTreeMap, fs::File, io::Read, path::Path};

use anyhow::Context;
use chrono::{DateTime, Utc};
use csv::{ReaderBuilder, StringRecord, Trim};
use reclaim_model::{
    enums::{ClassificationConfidence, KindProvenance, Provider, TransactionKind},
    identifiers::Reference,
    payload::ProviderPayload,
    phone::{CountryCode, normalize_phone},
    transaction::{IdentityHints, KindClassification, ProviderTransaction},
};
use serde::Serialize;

pub use self::record::CinetPayExportRecord;
use crate::common::{
    consts::{CINETPAY_DEFAULT_CURRENCY, CINETPAY_EXPORT_SUCCESS_STATUSES, CINETPAY_STATUS_ACCEPTED},
    parse::{parse_amount, parse_datetime},
};

/// The classification of every exported row: exports only contain collections.
pub const EXPORT_CLASSIFICATION: KindClassification = KindClassification::new(
    TransactionKind::Payment,
    KindProvenance::Export,
    ClassificationConfidence::High,
);

/// Bucket for rows whose breakdown column is empty or missing.
pub const UNKNOWN_BUCKET: &str = "UNKNOWN";

const REFERENCE_COLUMN: &str = "transaction_id";

/// The layout of an export file.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub enum ExportFormat {
    /// The dashboard export with status, amount and customer columns.
    #[default]
    Detailed,
    /// A bare `transaction_id` column, as written by the dashboard scrapers.
    ReferenceList,
}

/// Statistics over every data row of a detailed export, skipped rows included.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExportSummary {
    pub first_date: Option<DateTime<Utc>>,
    pub last_date: Option<DateTime<Utc>>,
    pub by_status: BTreeMap<String, usize>,
    pub by_payment_method: BTreeMap<String, usize>,
    pub by_currency: BTreeMap<String, usize>,
    /// Counts per deduced country, see [`deduce_country`].
    pub by_country: BTreeMap<String, usize>,
}

impl ExportSummary {
    fn record(&mut self, record: &CinetPayExportRecord) {
        if let Some(date) = record.date.as_deref().and_then(parse_datetime) {
            self.first_date = Some(self.first_date.map_or(date, |first| first.min(date)));
            self.last_date = Some(self.last_date.map_or(date, |last| last.max(date)));
        }

        let country = deduce_country(record);
        bump(&mut self.by_status, record.status.as_deref());
        bump(&mut self.by_payment_method, record.payment_method.as_deref());
        bump(&mut self.by_currency, Some(row_currency(record, country).as_str()));
        bump(
            &mut self.by_country,
            country.as_ref().map(CountryCode::as_ref),
        );
    }
}

fn bump(counts: &mut BTreeMap<String, usize>, value: Option<&str>) {
    let key = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map_or_else(|| UNKNOWN_BUCKET.to_string(), str::to_ascii_uppercase);
    *counts.entry(key).or_default() += 1;
}

/// The outcome of parsing one export file.
#[derive(Debug, Clone, Default)]
pub struct ExportParseResult {
    pub format: ExportFormat,
    /// Accepted transactions, in file order.
    pub transactions: Vec<ProviderTransaction>,
    /// References read from a [`ExportFormat::ReferenceList`] file, in file order.
    pub references: Vec<Reference>,
    /// Number of data rows read.
    pub rows: usize,
    /// Rows skipped for an empty transaction ID.
    pub missing_reference: usize,
    /// Rows skipped for a non-successful status.
    pub not_successful: usize,
    /// Rows skipped for an unparseable amount or reference.
    pub invalid: usize,
    /// Empty for a reference list.
    pub summary: ExportSummary,
}

impl ExportParseResult {
    /// Returns whether the file only lists references to be verified live.
    #[must_use]
    pub fn is_reference_list(&self) -> bool {
        self.format == ExportFormat::ReferenceList
    }
}

/// Returns whether an export status marks a completed payment.
#[must_use]
pub fn is_export_success(status: &str) -> bool {
    let status = status.trim();
    CINETPAY_EXPORT_SUCCESS_STATUSES
        .iter()
        .any(|s| status.eq_ignore_ascii_case(s))
}

/// Deduces the country of a row from its phone prefix, then from its operator code.
#[must_use]
pub fn deduce_country(record: &CinetPayExportRecord) -> Option<CountryCode> {
    record
        .phone_prefix
        .as_deref()
        .and_then(CountryCode::from_dialing_code)
        .or_else(|| {
            record
                .payment_method
                .as_deref()
                .and_then(CountryCode::from_operator)
        })
}

/// The row's currency column, else the default currency of its deduced country.
fn row_currency(record: &CinetPayExportRecord, country: Option<CountryCode>) -> String {
    record
        .currency
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_ascii_uppercase)
        .unwrap_or_else(|| {
            country
                .map_or(CINETPAY_DEFAULT_CURRENCY, CountryCode::default_currency)
                .to_string()
        })
}

fn to_transaction(
    record: &CinetPayExportRecord,
    reference: Reference,
    columns: BTreeMap<String, String>,
) -> Option<ProviderTransaction> {
    let amount = record.amount.as_deref().and_then(parse_amount)?;
    let country = deduce_country(record);
    let phone = record
        .phone_number
        .as_deref()
        .and_then(|number| normalize_phone(number, country));
    let email = record
        .custom_field
        .as_deref()
        .filter(|field| field.contains('@'));
    let currency = row_currency(record, country);

    Some(ProviderTransaction {
        provider: Provider::CinetPay,
        reference,
        kind: EXPORT_CLASSIFICATION,
        status: CINETPAY_STATUS_ACCEPTED.to_string(),
        amount,
        currency,
        hints: IdentityHints::new(email, phone.as_deref(), None),
        session_id: None,
        occurred_at: record.date.as_deref().and_then(parse_datetime),
        payload: ProviderPayload::CinetPayExport(columns),
    })
}

/// Parses a CinetPay export from any reader.
///
/// Only successful rows are emitted. Rows without a transaction ID, with a non-successful status
/// or with an unparseable amount are counted and skipped. A file whose only column is
/// `transaction_id` is read as a [`ExportFormat::ReferenceList`] into
/// [`ExportParseResult::references`].
///
/// # Errors
///
/// Returns an error if the CSV is malformed or has no header row.
pub fn parse_export<R: Read>(reader: R) -> anyhow::Result<ExportParseResult> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers: StringRecord = reader
        .headers()
        .context("Failed to read export header row")?
        .iter()
        .map(|header| header.trim().to_ascii_lowercase())
        .collect();
    if headers.is_empty() {
        anyhow::bail!("Export has no header row");
    }
    reader.set_headers(headers.clone());

    let columns: Vec<&str> = headers.iter().filter(|h| !h.is_empty()).collect();
    if columns == [REFERENCE_COLUMN] {
        return parse_reference_list(reader.records());
    }

    let mut result = ExportParseResult::default();
    for (index, row) in reader.records().enumerate() {
        // Header is line 1
        let line = index + 2;
        let row = row.with_context(|| format!("Failed to read export line {line}"))?;
        result.rows += 1;

        let record: CinetPayExportRecord = row
            .deserialize(Some(&headers))
            .with_context(|| format!("Failed to decode export line {line}"))?;
        result.summary.record(&record);

        let Some(reference) = record.reference() else {
            tracing::warn!("Skipping export line {line}: empty transaction_id");
            result.missing_reference += 1;
            continue;
        };

        if !record.status.as_deref().is_some_and(is_export_success) {
            tracing::debug!(
                "Skipping export line {line}: status {}",
                record.status.as_deref().unwrap_or("-")
            );
            result.not_successful += 1;
            continue;
        }

        let Ok(reference) = Reference::new_checked(reference) else {
            tracing::warn!("Skipping export line {line}: invalid transaction_id {reference}");
            result.invalid += 1;
            continue;
        };

        let columns: BTreeMap<String, String> = headers
            .iter()
            .zip(row.iter())
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();

        match to_transaction(&record, reference, columns) {
            Some(transaction) => result.transactions.push(transaction),
            None => {
                tracing::warn!(
                    "Skipping export line {line}: invalid amount {}",
                    record.amount.as_deref().unwrap_or("-")
                );
                result.invalid += 1;
            }
        }
    }

    tracing::info!(
        "Parsed CinetPay export: {} rows, {} accepted, {} without reference, {} not successful, {} invalid",
        result.rows,
        result.transactions.len(),
        result.missing_reference,
        result.not_successful,
        result.invalid,
    );
    Ok(result)
}

fn parse_reference_list<R: Read>(
    rows: csv::StringRecordsIter<'_, R>,
) -> anyhow::Result<ExportParseResult> {
    let mut result = ExportParseResult {
        format: ExportFormat::ReferenceList,
        ..Default::default()
    };
    for (index, row) in rows.enumerate() {
        let line = index + 2;
        let row = row.with_context(|| format!("Failed to read export line {line}"))?;
        result.rows += 1;

        let raw = row.get(0).map(str::trim).unwrap_or_default();
        if raw.is_empty() {
            result.missing_reference += 1;
            continue;
        }
        match Reference::new_checked(raw) {
            Ok(reference) => result.references.push(reference),
            Err(_) => {
                tracing::warn!("Skipping export line {line}: invalid transaction_id {raw}");
                result.invalid += 1;
            }
        }
    }

    tracing::info!(
        "Parsed CinetPay reference list: {} rows, {} references, {} empty, {} invalid",
        result.rows,
        result.references.len(),
        result.missing_reference,
        result.invalid,
    );
    Ok(result)
}

/// Loads and parses a CinetPay export file.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or parsed.
pub fn load_export<P: AsRef<Path>>(filepath: P) -> anyhow::Result<ExportParseResult> {
    let filepath = filepath.as_ref();
    let file = File::open(filepath)
        .with_context(|| format!("Failed to open export {}", filepath.display()))?;
    parse_export(file)
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    use super::*;

    const EXPORT: &str = "\
Date,Transaction_ID,Phone_Number,Amount,Status,Payment_Method,Operator_ID
2024-05-12 10:31:02,CP-20240512-0001,670000001,2 142 XAF,ACCEPTED,OMCM,MP240512.1031.A1
2024-05-12 10:35:40,,670000002,2142,ACCEPTED,OMCM,MP240512.1035.B2
2024-05-12 10:40:11,CP-20240512-0003,0701020304,5175,REFUSED,WAVECI,
2024-05-12 10:44:59,CP-20240512-0004,0701020304,5175,succes,WAVECI,
2024-05-12 10:50:00,CP-20240512-0005,670000003,n/a,ACCEPTED,OMCM,
";

    #[rstest]
    fn test_parse_export_filters_and_normalizes() {
        let result = parse_export(EXPORT.as_bytes()).unwrap();

        assert_eq!(result.rows, 5);
        assert_eq!(result.missing_reference, 1);
        assert_eq!(result.not_successful, 1);
        assert_eq!(result.invalid, 1);
        assert_eq!(result.transactions.len(), 2);

        let first = &result.transactions[0];
        assert_eq!(first.reference.as_str(), "CP-20240512-0001");
        assert_eq!(first.amount, dec!(2142));
        assert_eq!(first.currency, "XAF");
        assert_eq!(first.hints.phone.as_deref(), Some("+237670000001"));
        assert_eq!(first.kind, EXPORT_CLASSIFICATION);
        assert!(first.occurred_at.is_some());
        match &first.payload {
            ProviderPayload::CinetPayExport(columns) => {
                assert_eq!(columns["operator_id"], "MP240512.1031.A1");
            }
            other => panic!("unexpected payload {other:?}"),
        }

        let second = &result.transactions[1];
        assert_eq!(second.reference.as_str(), "CP-20240512-0004");
        assert_eq!(second.currency, "XOF");
        assert_eq!(second.status, "ACCEPTED");
        assert_eq!(second.hints.phone.as_deref(), Some("+2250701020304"));
    }

    #[rstest]
    fn test_phone_prefix_overrides_operator() {
        let csv = "transaction_id,phone_number,amount,status,payment_method,phone_prefix,custom_field\n\
                   CP-1,76000001,3105,ACCEPTED,OMCM,221,awa@example.com\n";
        let result = parse_export(csv.as_bytes()).unwrap();
        let tx = &result.transactions[0];
        assert_eq!(tx.hints.phone.as_deref(), Some("+22176000001"));
        assert_eq!(tx.hints.email.as_deref(), Some("awa@example.com"));
        assert_eq!(tx.currency, "XOF");
    }

    #[rstest]
    fn test_phone_already_prefixed() {
        let csv = "transaction_id,phone_number,amount,status,payment_method\n\
                   CP-2,+237 670 000 004,2070,ACCEPTED,MOMOCM\n";
        let result = parse_export(csv.as_bytes()).unwrap();
        assert_eq!(
            result.transactions[0].hints.phone.as_deref(),
            Some("+237670000004")
        );
    }

    #[rstest]
    #[case("ACCEPTED", true)]
    #[case("Accepted", true)]
    #[case("SUCCES", true)]
    #[case("SUCCESS", true)]
    #[case("REFUSED", false)]
    #[case("PENDING", false)]
    fn test_is_export_success(#[case] status: &str, #[case] expected: bool) {
        assert_eq!(is_export_success(status), expected);
    }

    #[rstest]
    fn test_parse_export_summary_counts_every_row() {
        let result = parse_export(EXPORT.as_bytes()).unwrap();
        let summary = &result.summary;

        assert_eq!(result.format, ExportFormat::Detailed);
        assert!(result.references.is_empty());
        assert_eq!(
            summary.first_date,
            parse_datetime("2024-05-12 10:31:02")
        );
        assert_eq!(summary.last_date, parse_datetime("2024-05-12 10:50:00"));
        assert_eq!(
            summary.by_status,
            BTreeMap::from([
                ("ACCEPTED".to_string(), 3),
                ("REFUSED".to_string(), 1),
                ("SUCCES".to_string(), 1),
            ])
        );
        assert_eq!(
            summary.by_payment_method,
            BTreeMap::from([("OMCM".to_string(), 3), ("WAVECI".to_string(), 2)])
        );
        assert_eq!(
            summary.by_currency,
            BTreeMap::from([("XAF".to_string(), 3), ("XOF".to_string(), 2)])
        );
        assert_eq!(
            summary.by_country,
            BTreeMap::from([("CI".to_string(), 2), ("CM".to_string(), 3)])
        );
    }

    #[rstest]
    fn test_parse_export_summary_unknown_buckets() {
        let csv = "transaction_id,amount,status\nCP-1,2142,\n";
        let summary = parse_export(csv.as_bytes()).unwrap().summary;

        assert_eq!(summary.first_date, None);
        assert_eq!(summary.by_status[UNKNOWN_BUCKET], 1);
        assert_eq!(summary.by_payment_method[UNKNOWN_BUCKET], 1);
        assert_eq!(summary.by_country[UNKNOWN_BUCKET], 1);
        assert_eq!(summary.by_currency[CINETPAY_DEFAULT_CURRENCY], 1);
    }

    #[rstest]
    #[case("transaction_id\nCP-1\nCP-2\nCP-3\n")]
    #[case("Transaction_ID\nCP-1\n\"CP-2\"\n CP-3 \n")]
    fn test_parse_reference_list(#[case] csv: &str) {
        let result = parse_export(csv.as_bytes()).unwrap();

        assert!(result.is_reference_list());
        assert_eq!(result.rows, 3);
        assert_eq!(result.not_successful, 0);
        assert!(result.transactions.is_empty());
        assert_eq!(
            result.references,
            vec![
                Reference::new("CP-1"),
                Reference::new("CP-2"),
                Reference::new("CP-3")
            ]
        );
        assert_eq!(result.summary, ExportSummary::default());
    }

    #[rstest]
    fn test_parse_reference_list_skips_blank_and_invalid() {
        let csv = "transaction_id\nCP-1\n\"\"\nCP-\u{e9}2\nCP-3\n";
        let result = parse_export(csv.as_bytes()).unwrap();

        assert_eq!(result.rows, 4);
        assert_eq!(result.missing_reference, 1);
        assert_eq!(result.invalid, 1);
        assert_eq!(result.references.len(), 2);
    }

    #[rstest]
    fn test_load_export_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(EXPORT.as_bytes()).unwrap();

        let result = load_export(file.path()).unwrap();
        assert_eq!(result.transactions.len(), 2);
    }

    #[rstest]
    fn test_load_export_missing_file() {
        let error = load_export("/definitely/not/here.csv").unwrap_err();
        assert!(error.to_string().contains("Failed to open export"));
    }
}

//! Exporter: writes a dataset and its results to a timestamped directory.
//!
//! Layout under the caller's root:
//!
//! ```text
//! banking_export_YYYYMMDD_HHMMSS/
//!   banking_data.json
//!   analysis_results.json
//!   accounts.csv  transactions.csv  customers.csv
//!   fraud_events.csv  risk_assessments.csv
//! ```
//!
//! RULE: The leaf directory is created with `create_dir`, never reused.
//! A failed write leaves whatever was already written; there is no rollback.

use crate::{
    clock::Clock,
    dataset::Dataset,
    error::{BankError, BankResult},
    results::AnalysisResults,
};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

pub const DATASET_FILE: &str = "banking_data.json";
pub const RESULTS_FILE: &str = "analysis_results.json";
pub const DIR_PREFIX: &str = "banking_export_";

/// ISO-8601 without offset, matching the JSON encoding of timestamps.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub const ACCOUNT_HEADER: [&str; 13] = [
    "account_id",
    "account_number",
    "customer_id",
    "account_type",
    "balance",
    "credit_limit",
    "bank_name",
    "location",
    "status",
    "created_date",
    "last_activity",
    "transaction_count",
    "risk_score",
];

pub const TRANSACTION_HEADER: [&str; 11] = [
    "transaction_id",
    "account_number",
    "counterparty_account",
    "transaction_type",
    "amount",
    "description",
    "timestamp",
    "status",
    "merchant",
    "location",
    "fraud_score",
];

pub const CUSTOMER_HEADER: [&str; 11] = [
    "customer_id",
    "customer_name",
    "city",
    "state",
    "email",
    "date_of_birth",
    "account_count",
    "total_balance",
    "credit_score",
    "income_level",
    "risk_category",
];

pub const FRAUD_EVENT_HEADER: [&str; 11] = [
    "fraud_id",
    "account_number",
    "fraud_type",
    "severity",
    "detected_date",
    "status",
    "amount_involved",
    "location",
    "ip_address",
    "device_info",
    "confidence_score",
];

pub const RISK_ASSESSMENT_HEADER: [&str; 8] = [
    "risk_id",
    "account_number",
    "risk_factors",
    "risk_score",
    "risk_level",
    "assessment_date",
    "recommendation",
    "review_date",
];

/// Separator for list-valued fields in CSV cells.
pub const LIST_SEPARATOR: &str = "; ";

/// Write every export artefact and return the new directory.
pub fn export(
    ds: &Dataset,
    results: &AnalysisResults,
    root: &Path,
    clock: &dyn Clock,
) -> BankResult<PathBuf> {
    fs::create_dir_all(root).map_err(|e| BankError::export(root, e))?;
    let dir = root.join(format!("{DIR_PREFIX}{}", clock.now().format("%Y%m%d_%H%M%S")));
    fs::create_dir(&dir).map_err(|e| BankError::export(&dir, e))?;

    write_json(&dir.join(DATASET_FILE), ds)?;
    write_json(&dir.join(RESULTS_FILE), results)?;
    write_tables(ds, &dir)?;

    log::info!("exported {} to {}", ds.summary(), dir.display());
    Ok(dir)
}

/// Read a dataset previously written as `banking_data.json`.
pub fn load_dataset(path: &Path) -> BankResult<Dataset> {
    let file = File::open(path).map_err(|e| BankError::export(path, e))?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

pub fn load_results(path: &Path) -> BankResult<AnalysisResults> {
    let file = File::open(path).map_err(|e| BankError::export(path, e))?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> BankResult<()> {
    let file = File::create(path).map_err(|e| BankError::export(path, e))?;
    let mut out = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut out, value).map_err(|e| BankError::export(path, e))?;
    out.write_all(b"\n").map_err(|e| BankError::export(path, e))?;
    out.flush().map_err(|e| BankError::export(path, e))
}

fn csv_writer(path: &Path) -> BankResult<csv::Writer<File>> {
    csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_path(path)
        .map_err(|e| BankError::export(path, e))
}

/// Write one CSV table: the header, then one row per record.
fn write_table<R>(
    path: &Path,
    header: &[&str],
    records: &[R],
    row: impl Fn(&R) -> Vec<String>,
) -> BankResult<()> {
    let mut w = csv_writer(path)?;
    w.write_record(header).map_err(|e| BankError::export(path, e))?;
    for record in records {
        w.write_record(row(record)).map_err(|e| BankError::export(path, e))?;
    }
    w.flush().map_err(|e| BankError::export(path, e))
}

fn write_tables(ds: &Dataset, dir: &Path) -> BankResult<()> {
    write_table(&dir.join("accounts.csv"), &ACCOUNT_HEADER, &ds.accounts, |a| {
        vec![
            a.account_id.to_string(),
            a.account_number.clone(),
            a.customer_id.to_string(),
            a.account_type.to_string(),
            a.balance.to_string(),
            a.credit_limit.to_string(),
            a.bank_name.clone(),
            a.location.clone(),
            a.status.to_string(),
            a.created_date.to_string(),
            a.last_activity.to_string(),
            a.transaction_count.to_string(),
            a.risk_score.to_string(),
        ]
    })?;

    write_table(&dir.join("transactions.csv"), &TRANSACTION_HEADER, &ds.transactions, |t| {
        vec![
            t.transaction_id.to_string(),
            t.account_number.clone(),
            t.counterparty_account.clone().unwrap_or_default(),
            t.transaction_type.to_string(),
            t.amount.to_string(),
            t.description.clone(),
            t.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            t.status.to_string(),
            t.merchant.clone(),
            t.location.clone(),
            t.fraud_score.to_string(),
        ]
    })?;

    write_table(&dir.join("customers.csv"), &CUSTOMER_HEADER, &ds.customers, |c| {
        vec![
            c.customer_id.to_string(),
            c.customer_name.clone(),
            c.city.clone(),
            c.state.clone(),
            c.email.clone(),
            c.date_of_birth.to_string(),
            c.account_count.to_string(),
            c.total_balance.to_string(),
            c.credit_score.to_string(),
            c.income_level.to_string(),
            c.risk_category.to_string(),
        ]
    })?;

    write_table(&dir.join("fraud_events.csv"), &FRAUD_EVENT_HEADER, &ds.fraud_events, |f| {
        vec![
            f.fraud_id.to_string(),
            f.account_number.clone(),
            f.fraud_type.clone(),
            f.severity.to_string(),
            f.detected_date.to_string(),
            f.status.to_string(),
            f.amount_involved.to_string(),
            f.location.clone(),
            f.ip_address.clone(),
            f.device_info.clone(),
            f.confidence_score.to_string(),
        ]
    })?;

    write_table(
        &dir.join("risk_assessments.csv"),
        &RISK_ASSESSMENT_HEADER,
        &ds.risk_assessments,
        |r| {
            vec![
                r.risk_id.to_string(),
                r.account_number.clone(),
                r.risk_factors.join(LIST_SEPARATOR),
                r.risk_score.to_string(),
                r.risk_level.to_string(),
                r.assessment_date.to_string(),
                r.recommendation.clone(),
                r.review_date.to_string(),
            ]
        },
    )
}

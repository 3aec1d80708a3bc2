//! Typed records from the legacy input tables.
//!
//! Column names are the ones the billing system and last month's ageing
//! workbook carry. Every table is located through a [`SourceConfig`]; paths
//! resolve against the config file's directory.

use std::path::Path;

use ageing_engine::config::{AgeingConfig, SourceConfig};
use ageing_engine::model::{
    AgeingInput, InvoiceRecord, ManualReversalRecord, Recoverability, RecoverabilityRecord,
    ReversalRecord, ReversalSource,
};
use ageing_engine::parse::{parse_amount, parse_date, parse_payment_terms, parse_term_value};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::error::LoadError;
use crate::table::{Row, Table};

/// Read the table a source points at, CSV or workbook by extension.
pub fn read_table(source: &SourceConfig, base_dir: &Path) -> Result<Table, LoadError> {
    let path = base_dir.join(&source.file);
    let table = if source.is_workbook() {
        crate::xlsx::import(&path, source.sheet.as_deref(), source.header_row)?
    } else {
        crate::csv::import(&path, source.header_row)?
    };
    debug!(table = %table.name, rows = table.rows.len(), "read table");
    Ok(table)
}

/// Load every configured input table.
pub fn load_input(config: &AgeingConfig, base_dir: &Path) -> Result<AgeingInput, LoadError> {
    let day_first = config.day_first;
    let inputs = &config.inputs;

    let ledger = ledger_from_table(&read_table(&inputs.ledger, base_dir)?, day_first)?;

    let recoverability = match &inputs.recoverability {
        Some(source) => recoverability_from_table(&read_table(source, base_dir)?)?,
        None => Vec::new(),
    };
    let reversal_log = match &inputs.reversal_log {
        Some(source) => reversal_log_from_table(&read_table(source, base_dir)?, day_first)?,
        None => Vec::new(),
    };
    let manual_reversals = match &inputs.manual_reversals {
        Some(source) => manual_reversals_from_table(&read_table(source, base_dir)?, day_first)?,
        None => Vec::new(),
    };

    Ok(AgeingInput {
        ledger,
        recoverability,
        reversal_log,
        manual_reversals,
    })
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

pub fn ledger_from_table(table: &Table, day_first: bool) -> Result<Vec<InvoiceRecord>, LoadError> {
    let location_desc = table.require("Location Desc")?;
    let cust_code = table.require("Cust Code")?;
    let customer_name = table.require("Customer Name")?;
    let invoice_no = table.require("Invoice No")?;
    let doc_amount = table.require("Doc Amount")?;
    let invoice_date = table.require("Invoice Date")?;
    let order_location = table.require("Order Location")?;
    let os_days = table.require("O/S DAYS")?;
    let total_dr = table.require("Total Dr Bal")?;
    let total_cr = table.require("Total Cr Bal")?;
    let net = table.require("Net Outstanding")?;
    let terms = table.require("Payment Terms")?;

    let mut records = Vec::with_capacity(table.rows.len());
    let mut undated = 0usize;
    for row in &table.rows {
        let amount = |col: usize| required_amount(table, row, col);
        let record = InvoiceRecord {
            location_desc: row.get(location_desc).to_string(),
            customer_code: row.get(cust_code).to_string(),
            customer_name: row.get(customer_name).to_string(),
            invoice_no: row.get(invoice_no).trim().to_string(),
            doc_amount: amount(doc_amount)?,
            invoice_date: parse_date(row.get(invoice_date), day_first),
            order_location: row.get(order_location).trim().to_string(),
            os_days: parse_term_value(row.get(os_days)),
            total_dr_bal: amount(total_dr)?,
            total_cr_bal: amount(total_cr)?,
            net_outstanding: amount(net)?,
            payment_term_days: parse_payment_terms(row.get(terms)),
        };
        if record.invoice_date.is_none() {
            undated += 1;
        }
        records.push(record);
    }

    if undated > 0 {
        warn!(table = %table.name, rows = undated, "ledger rows with unreadable invoice date");
    }
    Ok(records)
}

// ---------------------------------------------------------------------------
// Recoverability
// ---------------------------------------------------------------------------

pub fn recoverability_from_table(table: &Table) -> Result<Vec<RecoverabilityRecord>, LoadError> {
    let order_location = table.require("Order Location")?;
    let customer_code = table.require("Customer Code")?;
    let invoice_no = table.require("Invoice No")?;
    let flag = table.require("Recoverable/Not Recoverable")?;

    Ok(table
        .rows
        .iter()
        .map(|row| RecoverabilityRecord {
            order_location: row.get(order_location).trim().to_string(),
            customer_code: row.get(customer_code).trim().to_string(),
            invoice_no: row.get(invoice_no).trim().to_string(),
            recoverability: Recoverability::from_label(row.get(flag)),
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Reversals
// ---------------------------------------------------------------------------

/// Reversal log rows. `Month`, `Impacted Overdue Days` and `Ageing Bucket`
/// are recomputed every run and ignored here.
pub fn reversal_log_from_table(
    table: &Table,
    day_first: bool,
) -> Result<Vec<ReversalRecord>, LoadError> {
    let old_no = table.require("OLDInvoice")?;
    let old_date = table.require("OLD Invoice Date")?;
    let term = table.require("Payment Term")?;
    let new_no = table.require("NEWInvoice")?;

    let new_date = table.column("New Date");
    let new_amount = table.column("New Amount");
    let client = table.column("Client");
    let name = table.column("Name");
    let original_amount = table.column("Inv Amt");
    let credit_no = table.column("Cr inv No");

    let mut records = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        records.push(ReversalRecord {
            source: ReversalSource::Log,
            old_invoice_no: row.get(old_no).trim().to_string(),
            old_invoice_date: parse_date(row.get(old_date), day_first),
            payment_term_days: parse_term_value(row.get(term)),
            new_invoice_no: row.get(new_no).trim().to_string(),
            new_date: parse_date(row.get_opt(new_date), day_first),
            new_amount: optional_amount(table, row, new_amount)?,
            client: optional_text(row, client),
            client_name: optional_text(row, name),
            original_amount: optional_amount(table, row, original_amount)?,
            credit_invoice_no: optional_text(row, credit_no),
        });
    }
    Ok(records)
}

pub fn manual_reversals_from_table(
    table: &Table,
    day_first: bool,
) -> Result<Vec<ManualReversalRecord>, LoadError> {
    let client = table.require("Client")?;
    let name = table.require("Name")?;
    let original_no = table.require("Or inv No")?;
    let original_date = table.require("Or inv Dt")?;
    let amount = table.require("Inv Amt")?;
    let credit_no = table.require("Cr inv No")?;
    let new_no = table.require("New Inv No")?;
    let new_date = table.require("New Dt")?;
    let new_amount = table.require("New amt")?;

    let mut records = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        records.push(ManualReversalRecord {
            client: row.get(client).trim().to_string(),
            name: row.get(name).trim().to_string(),
            original_invoice_no: row.get(original_no).trim().to_string(),
            original_invoice_date: parse_date(row.get(original_date), day_first),
            invoice_amount: optional_amount(table, row, Some(amount))?,
            credit_invoice_no: row.get(credit_no).trim().to_string(),
            new_invoice_no: row.get(new_no).trim().to_string(),
            new_date: parse_date(row.get(new_date), day_first),
            new_amount: optional_amount(table, row, Some(new_amount))?,
        });
    }
    Ok(records)
}

// ---------------------------------------------------------------------------
// Cell helpers
// ---------------------------------------------------------------------------

/// Monetary cell that must hold a number. Blank reads as zero.
fn required_amount(table: &Table, row: &Row, col: usize) -> Result<Decimal, LoadError> {
    Ok(optional_amount(table, row, Some(col))?.unwrap_or(Decimal::ZERO))
}

/// Monetary cell that may be blank or absent.
fn optional_amount(table: &Table, row: &Row, col: Option<usize>) -> Result<Option<Decimal>, LoadError> {
    let raw = row.get_opt(col);
    if raw.trim().is_empty() {
        return Ok(None);
    }
    match parse_amount(raw) {
        Some(d) => Ok(Some(d)),
        None => Err(LoadError::Amount {
            table: table.name.clone(),
            row: row.line,
            column: col
                .and_then(|c| table.headers.get(c))
                .cloned()
                .unwrap_or_default(),
            value: raw.to_string(),
        }),
    }
}

fn optional_text(row: &Row, col: Option<usize>) -> Option<String> {
    let s = row.get_opt(col).trim();
    (!s.is_empty()).then(|| s.to_string())
}

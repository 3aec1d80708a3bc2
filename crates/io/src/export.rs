// Output tables in the legacy layout: sheet "Ageing" and sheet "Sales Reversal"

use std::path::Path;

use ageing_engine::model::{AgedInvoice, AgedReversal, AgeingResult, Outstanding};
use ageing_engine::AgeingBucket;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::info;

use crate::error::ExportError;

pub const AGEING_SHEET: &str = "Ageing";
pub const REVERSAL_SHEET: &str = "Sales Reversal";

pub const AGEING_CSV: &str = "ageing.csv";
pub const REVERSAL_CSV: &str = "sales_reversal.csv";

/// Token written where a credit balance suppresses net outstanding.
pub const SUPPRESSED: &str = "Not due";

/// One output cell, typed so each writer can pick its native representation.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Blank,
    Text(String),
    Int(i64),
    Amount(Decimal),
    Date(NaiveDate),
    /// Value that could not be computed (unknown date).
    Unknown,
}

impl Cell {
    pub const UNKNOWN: &'static str = "Unknown";

    pub fn to_text(&self) -> String {
        match self {
            Cell::Blank => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Int(n) => n.to_string(),
            Cell::Amount(d) => d.normalize().to_string(),
            Cell::Date(d) => d.format("%Y-%m-%d").to_string(),
            Cell::Unknown => Self::UNKNOWN.to_string(),
        }
    }

    fn text(s: &str) -> Self {
        Cell::Text(s.to_string())
    }

    fn date(d: Option<NaiveDate>) -> Self {
        d.map(Cell::Date).unwrap_or(Cell::Blank)
    }

    fn amount(d: Option<Decimal>) -> Self {
        d.map(Cell::Amount).unwrap_or(Cell::Blank)
    }

    fn days(d: Option<i64>) -> Self {
        d.map(Cell::Int).unwrap_or(Cell::Unknown)
    }

    fn bucket(b: Option<AgeingBucket>) -> Self {
        b.map(|b| Cell::text(b.label())).unwrap_or(Cell::Unknown)
    }
}

#[derive(Debug, Clone)]
pub struct OutputSheet {
    pub name: &'static str,
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<Cell>>,
}

pub const AGEING_HEADERS: [&str; 17] = [
    "Location Desc",
    "Cust Code",
    "Customer Name",
    "Invoice No",
    "Doc Amount",
    "Invoice Date",
    "Order Location",
    "O/S DAYS",
    "Total Dr Bal",
    "Total Cr Bal",
    "Net Outstanding",
    "Payment Terms",
    "Recoverable/Not Recoverable",
    "Impacted Overdue Days",
    "Bucket",
    "Adjusted Bucket",
    "Provision",
];

pub const REVERSAL_HEADERS: [&str; 12] = [
    "Client",
    "Name",
    "OLDInvoice",
    "OLD Invoice Date",
    "Inv Amt",
    "Cr inv No",
    "NEWInvoice",
    "New Date",
    "New Amount",
    "Payment Term",
    "Impacted Overdue Days",
    "Ageing Bucket",
];

fn ageing_row(row: &AgedInvoice) -> Vec<Cell> {
    let inv = &row.invoice;
    let outstanding = match row.outstanding {
        Outstanding::Amount(a) => Cell::Amount(a),
        Outstanding::Suppressed => Cell::text(SUPPRESSED),
    };
    vec![
        Cell::text(&inv.location_desc),
        Cell::text(&inv.customer_code),
        Cell::text(&inv.customer_name),
        Cell::text(&inv.invoice_no),
        Cell::Amount(inv.doc_amount),
        Cell::date(inv.invoice_date),
        Cell::text(&inv.order_location),
        inv.os_days.map(Cell::Int).unwrap_or(Cell::Blank),
        Cell::Amount(inv.total_dr_bal),
        Cell::Amount(inv.total_cr_bal),
        outstanding,
        // Unreadable terms count as zero days
        Cell::Int(inv.payment_term_days.unwrap_or(0)),
        Cell::text(row.recoverability.label()),
        Cell::days(row.overdue_days),
        Cell::bucket(row.bucket),
        Cell::bucket(row.adjusted_bucket),
        Cell::Amount(row.provision),
    ]
}

fn reversal_row(row: &AgedReversal) -> Vec<Cell> {
    let r = &row.reversal;
    let opt_text = |s: &Option<String>| s.as_deref().map(Cell::text).unwrap_or(Cell::Blank);
    vec![
        opt_text(&r.client),
        opt_text(&r.client_name),
        Cell::text(&r.old_invoice_no),
        Cell::date(r.old_invoice_date),
        Cell::amount(r.original_amount),
        opt_text(&r.credit_invoice_no),
        Cell::text(&r.new_invoice_no),
        Cell::date(r.new_date),
        Cell::amount(r.new_amount),
        Cell::Int(r.payment_term_days.unwrap_or(0)),
        Cell::days(row.overdue_days),
        Cell::bucket(row.ageing_bucket),
    ]
}

/// Both output tables, ledger first.
pub fn sheets(result: &AgeingResult) -> Vec<OutputSheet> {
    vec![
        OutputSheet {
            name: AGEING_SHEET,
            headers: AGEING_HEADERS.to_vec(),
            rows: result.ledger.iter().map(ageing_row).collect(),
        },
        OutputSheet {
            name: REVERSAL_SHEET,
            headers: REVERSAL_HEADERS.to_vec(),
            rows: result.reversals.iter().map(reversal_row).collect(),
        },
    ]
}

/// Write the workbook with sheets "Ageing" and "Sales Reversal".
pub fn write_xlsx(result: &AgeingResult, path: &Path) -> Result<(), ExportError> {
    crate::xlsx::export(&sheets(result), path)?;
    info!(path = %path.display(), "wrote workbook");
    Ok(())
}

/// Write `ageing.csv` and `sales_reversal.csv` into `dir`, creating it if needed.
pub fn write_csv_dir(result: &AgeingResult, dir: &Path) -> Result<(), ExportError> {
    std::fs::create_dir_all(dir).map_err(|e| ExportError::new(dir, e))?;
    for sheet in sheets(result) {
        let file = match sheet.name {
            AGEING_SHEET => AGEING_CSV,
            _ => REVERSAL_CSV,
        };
        crate::csv::export(&sheet.headers, &sheet.rows, &dir.join(file))?;
    }
    info!(dir = %dir.display(), "wrote csv tables");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ageing_engine::model::{AgeingInput, InvoiceRecord, ReversalRecord};
    use std::fs;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn invoice(no: &str, invoice_date: Option<&str>, net: i64) -> InvoiceRecord {
        InvoiceRecord {
            location_desc: "Pune".into(),
            customer_code: "C1".into(),
            customer_name: "Acme".into(),
            invoice_no: no.into(),
            doc_amount: Decimal::from(net.abs()),
            invoice_date: invoice_date.map(date),
            order_location: "PUN".into(),
            os_days: Some(12),
            total_dr_bal: Decimal::ZERO,
            total_cr_bal: Decimal::ZERO,
            net_outstanding: Decimal::from(net),
            payment_term_days: Some(30),
        }
    }

    fn result() -> AgeingResult {
        let input = AgeingInput {
            ledger: vec![
                invoice("INV100", Some("2023-06-01"), 1000),
                invoice("CR1", Some("2023-06-01"), -50),
                invoice("NODATE", None, 10),
            ],
            reversal_log: vec![ReversalRecord::logged("OLD", None, Some(30), "NODATE")],
            ..Default::default()
        };
        ageing_engine::run(&input, date("2023-12-01"))
    }

    #[test]
    fn test_ageing_sheet_legacy_tokens() {
        let sheets = sheets(&result());
        let ageing = &sheets[0];
        assert_eq!(ageing.name, "Ageing");
        assert_eq!(ageing.headers.len(), ageing.rows[0].len());

        let col = |h: &str| AGEING_HEADERS.iter().position(|x| *x == h).unwrap();

        let inv100 = &ageing.rows[0];
        assert_eq!(inv100[col("Impacted Overdue Days")], Cell::Int(153));
        assert_eq!(inv100[col("Bucket")], Cell::text("91 to 180 days"));
        assert_eq!(inv100[col("Provision")], Cell::Amount(Decimal::from(300)));
        assert_eq!(inv100[col("Recoverable/Not Recoverable")], Cell::text("Recoverable"));

        let credit = &ageing.rows[1];
        assert_eq!(credit[col("Net Outstanding")], Cell::text("Not due"));
        assert_eq!(credit[col("Adjusted Bucket")], Cell::text("Not due"));

        let unknown = &ageing.rows[2];
        assert_eq!(unknown[col("Impacted Overdue Days")], Cell::Unknown);
        assert_eq!(unknown[col("Bucket")], Cell::Unknown);
        assert_eq!(unknown[col("Adjusted Bucket")], Cell::Unknown);
        assert_eq!(unknown[col("Invoice Date")], Cell::Blank);
    }

    #[test]
    fn test_reversal_sheet_columns() {
        let sheets = sheets(&result());
        let reversal = &sheets[1];
        assert_eq!(reversal.name, "Sales Reversal");
        let row = &reversal.rows[0];
        assert_eq!(row.len(), REVERSAL_HEADERS.len());
        assert_eq!(row[2], Cell::text("OLD"));
        assert_eq!(row[6], Cell::text("NODATE"));
        assert_eq!(row[9], Cell::Int(30));
        assert_eq!(row[11], Cell::Unknown);
    }

    #[test]
    fn test_amount_text_is_normalized() {
        assert_eq!(Cell::Amount(Decimal::new(30000, 2)).to_text(), "300");
        assert_eq!(Cell::Amount(Decimal::new(-12050, 2)).to_text(), "-120.5");
    }

    #[test]
    fn test_write_csv_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        write_csv_dir(&result(), &out).unwrap();

        let ageing = fs::read_to_string(out.join(AGEING_CSV)).unwrap();
        let mut lines = ageing.lines();
        assert!(lines.next().unwrap().starts_with("Location Desc,Cust Code"));
        let inv100 = lines.next().unwrap();
        assert!(inv100.contains(",2023-06-01,"));
        assert!(inv100.ends_with(",153,91 to 180 days,91 to 180 days,300"));

        let reversal = fs::read_to_string(out.join(REVERSAL_CSV)).unwrap();
        assert!(reversal.starts_with("Client,Name,OLDInvoice"));
        assert!(reversal.lines().nth(1).unwrap().ends_with(",Unknown,Unknown"));
    }

    #[test]
    fn test_write_xlsx() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("System_Ageing_Output.xlsx");
        write_xlsx(&result(), &path).unwrap();

        let ageing = crate::xlsx::import(&path, Some(AGEING_SHEET), 1).unwrap();
        assert_eq!(ageing.rows.len(), 3);
        let col = ageing.column("Net Outstanding").unwrap();
        assert_eq!(ageing.rows[1].get(col), "Not due");

        let reversal = crate::xlsx::import(&path, Some(REVERSAL_SHEET), 1).unwrap();
        assert_eq!(reversal.rows.len(), 1);
    }
}

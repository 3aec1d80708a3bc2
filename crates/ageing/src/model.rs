use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

use crate::bucket::AgeingBucket;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One open invoice from the ledger.
///
/// `invoice_no` is unique only within a (customer, location) scope.
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceRecord {
    pub location_desc: String,
    pub customer_code: String,
    pub customer_name: String,
    pub invoice_no: String,
    pub doc_amount: Decimal,
    pub invoice_date: Option<NaiveDate>,
    pub order_location: String,
    pub os_days: Option<i64>,
    pub total_dr_bal: Decimal,
    pub total_cr_bal: Decimal,
    pub net_outstanding: Decimal,
    /// Term in days with the unit character already stripped; `None` when
    /// the raw value could not be read.
    pub payment_term_days: Option<i64>,
}

/// Recoverability annotation from last period's ageing, keyed by
/// (customer, invoice, location).
#[derive(Debug, Clone)]
pub struct RecoverabilityRecord {
    pub order_location: String,
    pub customer_code: String,
    pub invoice_no: String,
    pub recoverability: Recoverability,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Recoverability {
    #[default]
    Recoverable,
    NotRecoverable,
    /// Any other annotation, kept verbatim.
    Other(String),
}

impl Recoverability {
    /// Lenient read of the annotation text. Blank means no known impairment.
    pub fn from_label(raw: &str) -> Self {
        let s = raw.trim();
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "" | "recoverable" => Self::Recoverable,
            "notrecoverable" | "nonrecoverable" | "irrecoverable" | "unrecoverable" => {
                Self::NotRecoverable
            }
            _ => Self::Other(s.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Recoverable => "Recoverable",
            Self::NotRecoverable => "Not Recoverable",
            Self::Other(s) => s,
        }
    }
}

impl fmt::Display for Recoverability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Recoverability {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Where a reversal row came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReversalSource {
    /// Pre-tabulated reversal log.
    Log,
    /// Manual reversal register.
    Manual,
}

/// One replacement edge: `old_invoice_no` was reversed and rebilled as
/// `new_invoice_no`. Equal ids mark a known root.
#[derive(Debug, Clone, Serialize)]
pub struct ReversalRecord {
    pub source: ReversalSource,
    pub old_invoice_no: String,
    pub old_invoice_date: Option<NaiveDate>,
    pub payment_term_days: Option<i64>,
    pub new_invoice_no: String,
    pub new_date: Option<NaiveDate>,
    pub new_amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_invoice_no: Option<String>,
}

impl ReversalRecord {
    /// A reversal-log row with only the chain columns filled in.
    pub fn logged(
        old_invoice_no: impl Into<String>,
        old_invoice_date: Option<NaiveDate>,
        payment_term_days: Option<i64>,
        new_invoice_no: impl Into<String>,
    ) -> Self {
        Self {
            source: ReversalSource::Log,
            old_invoice_no: old_invoice_no.into(),
            old_invoice_date,
            payment_term_days,
            new_invoice_no: new_invoice_no.into(),
            new_date: None,
            new_amount: None,
            client: None,
            client_name: None,
            original_amount: None,
            credit_invoice_no: None,
        }
    }

    pub fn is_root_marker(&self) -> bool {
        self.old_invoice_no == self.new_invoice_no
    }
}

/// A row of the manual reversal register. It carries no payment term; that
/// is looked up in the ledger by `new_invoice_no`.
#[derive(Debug, Clone)]
pub struct ManualReversalRecord {
    pub client: String,
    pub name: String,
    pub original_invoice_no: String,
    pub original_invoice_date: Option<NaiveDate>,
    pub invoice_amount: Option<Decimal>,
    pub credit_invoice_no: String,
    pub new_invoice_no: String,
    pub new_date: Option<NaiveDate>,
    pub new_amount: Option<Decimal>,
}

/// Pre-loaded tables for one ageing run.
#[derive(Debug, Clone, Default)]
pub struct AgeingInput {
    pub ledger: Vec<InvoiceRecord>,
    pub recoverability: Vec<RecoverabilityRecord>,
    pub reversal_log: Vec<ReversalRecord>,
    pub manual_reversals: Vec<ManualReversalRecord>,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Net outstanding as presented: credit balances are suppressed rather than
/// shown as negative amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Outstanding {
    Amount(Decimal),
    Suppressed,
}

impl Outstanding {
    pub fn from_net(net: Decimal) -> Self {
        if net < Decimal::ZERO {
            Self::Suppressed
        } else {
            Self::Amount(net)
        }
    }

    pub fn amount(&self) -> Option<Decimal> {
        match self {
            Self::Amount(a) => Some(*a),
            Self::Suppressed => None,
        }
    }
}

/// A ledger row after ageing and provisioning.
#[derive(Debug, Clone, Serialize)]
pub struct AgedInvoice {
    #[serde(flatten)]
    pub invoice: InvoiceRecord,
    pub recoverability: Recoverability,
    /// Days overdue on the invoice's own date and term; `None` when the
    /// invoice date is unknown.
    pub overdue_days: Option<i64>,
    /// Bucket on the invoice's own standing. Drives the provision.
    pub bucket: Option<AgeingBucket>,
    /// Bucket after inheriting the overdue clock of the chain's root invoice.
    pub adjusted_bucket: Option<AgeingBucket>,
    /// Root invoice of the reversal chain this invoice closes, if any.
    pub chain_root: Option<String>,
    pub provision: Decimal,
    pub outstanding: Outstanding,
}

/// A reversal row after lineage resolution.
#[derive(Debug, Clone, Serialize)]
pub struct AgedReversal {
    #[serde(flatten)]
    pub reversal: ReversalRecord,
    pub root_invoice_no: String,
    pub origin_date: Option<NaiveDate>,
    pub overdue_days: Option<i64>,
    pub ageing_bucket: Option<AgeingBucket>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgeingMeta {
    pub reference_date: NaiveDate,
    pub engine_version: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BucketTotal {
    pub bucket: AgeingBucket,
    pub invoices: usize,
    pub net_outstanding: Decimal,
    pub provision: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgeingSummary {
    pub invoices: usize,
    pub reversals: usize,
    pub chain_adjusted: usize,
    pub unknown_bucket: usize,
    pub unknown_reversal_bucket: usize,
    pub not_recoverable: usize,
    pub suppressed_credits: usize,
    pub incidental_roots: Vec<String>,
    pub total_outstanding: Decimal,
    pub total_provision: Decimal,
    pub by_bucket: Vec<BucketTotal>,
    pub by_adjusted_bucket: Vec<BucketTotal>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgeingResult {
    pub meta: AgeingMeta,
    pub summary: AgeingSummary,
    pub ledger: Vec<AgedInvoice>,
    pub reversals: Vec<AgedReversal>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recoverability_labels() {
        assert_eq!(Recoverability::from_label(""), Recoverability::Recoverable);
        assert_eq!(Recoverability::from_label(" recoverable "), Recoverability::Recoverable);
        assert_eq!(
            Recoverability::from_label("Not Recoverable"),
            Recoverability::NotRecoverable
        );
        assert_eq!(
            Recoverability::from_label("Non-Recoverable"),
            Recoverability::NotRecoverable
        );
        assert_eq!(
            Recoverability::from_label("Legal case"),
            Recoverability::Other("Legal case".into())
        );
        assert_eq!(Recoverability::NotRecoverable.to_string(), "Not Recoverable");
    }

    #[test]
    fn outstanding_suppresses_credits_only() {
        assert_eq!(Outstanding::from_net(Decimal::from(-1)), Outstanding::Suppressed);
        assert_eq!(Outstanding::from_net(Decimal::ZERO), Outstanding::Amount(Decimal::ZERO));
        assert_eq!(
            Outstanding::from_net(Decimal::from(250)).amount(),
            Some(Decimal::from(250))
        );
    }

    #[test]
    fn outstanding_serializes_tagged() {
        let json = serde_json::to_value(Outstanding::Suppressed).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "suppressed" }));
        let json = serde_json::to_value(Outstanding::Amount(Decimal::from(5))).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "amount", "value": "5" }));
    }

    #[test]
    fn root_marker() {
        assert!(ReversalRecord::logged("A", None, None, "A").is_root_marker());
        assert!(!ReversalRecord::logged("A", None, None, "B").is_root_marker());
    }
}

use rust_decimal::Decimal;

use crate::bucket::AgeingBucket;
use crate::lineage::LineageMap;
use crate::model::{AgedInvoice, AgedReversal, AgeingSummary, BucketTotal, Recoverability};

/// Compute summary statistics from aged rows.
pub fn compute_summary(
    ledger: &[AgedInvoice],
    reversals: &[AgedReversal],
    lineage: &LineageMap,
) -> AgeingSummary {
    let mut chain_adjusted = 0;
    let mut unknown_bucket = 0;
    let mut not_recoverable = 0;
    let mut suppressed_credits = 0;
    let mut total_outstanding = Decimal::ZERO;
    let mut total_provision = Decimal::ZERO;

    for row in ledger {
        if row.chain_root.is_some() {
            chain_adjusted += 1;
        }
        if row.bucket.is_none() {
            unknown_bucket += 1;
        }
        if row.recoverability == Recoverability::NotRecoverable {
            not_recoverable += 1;
        }
        if row.outstanding.amount().is_none() {
            suppressed_credits += 1;
        }
        total_outstanding += row.invoice.net_outstanding;
        total_provision += row.provision;
    }

    AgeingSummary {
        invoices: ledger.len(),
        reversals: reversals.len(),
        chain_adjusted,
        unknown_bucket,
        unknown_reversal_bucket: reversals.iter().filter(|r| r.ageing_bucket.is_none()).count(),
        not_recoverable,
        suppressed_credits,
        incidental_roots: lineage.incidental_roots().to_vec(),
        total_outstanding,
        total_provision,
        by_bucket: totals(ledger, |r| r.bucket),
        by_adjusted_bucket: totals(ledger, |r| r.adjusted_bucket),
    }
}

/// One entry per bucket, in bucket order. Rows with no bucket are left out.
fn totals<F>(ledger: &[AgedInvoice], pick: F) -> Vec<BucketTotal>
where
    F: Fn(&AgedInvoice) -> Option<AgeingBucket>,
{
    AgeingBucket::ALL
        .iter()
        .map(|&bucket| {
            let rows: Vec<&AgedInvoice> =
                ledger.iter().filter(|r| pick(r) == Some(bucket)).collect();
            BucketTotal {
                bucket,
                invoices: rows.len(),
                net_outstanding: rows.iter().map(|r| r.invoice.net_outstanding).sum(),
                provision: rows.iter().map(|r| r.provision).sum(),
            }
        })
        .collect()
}

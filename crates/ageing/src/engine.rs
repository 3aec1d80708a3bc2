use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::bucket::{bucket_for, provision_for, with_credit_override};
use crate::model::{
    AgedInvoice, AgedReversal, AgeingInput, AgeingMeta, AgeingResult, Outstanding,
    Recoverability, RecoverabilityRecord,
};
use crate::overdue::overdue_days;
use crate::reversal::{age_reversals, unify_reversals};
use crate::summary::compute_summary;

/// Run one ageing pass. Pure: identical input and reference date give
/// identical output.
pub fn run(input: &AgeingInput, reference_date: NaiveDate) -> AgeingResult {
    // Reversal chains
    let unified = unify_reversals(&input.reversal_log, &input.manual_reversals, &input.ledger);
    let (reversals, lineage) = age_reversals(unified, reference_date);

    let unknown_reversals = reversals.iter().filter(|r| r.ageing_bucket.is_none()).count();
    if unknown_reversals > 0 {
        warn!(rows = unknown_reversals, "reversal rows with unknown origin date");
    }

    // Ledger
    let annotations = index_recoverability(&input.recoverability);
    let chains = index_chains(&reversals);

    let ledger: Vec<AgedInvoice> = input
        .ledger
        .iter()
        .map(|inv| {
            let key = (
                inv.customer_code.trim(),
                inv.invoice_no.trim(),
                inv.order_location.trim(),
            );
            let recoverability = annotations.get(&key).cloned().unwrap_or_default();

            let overdue = overdue_days(reference_date, inv.invoice_date, inv.payment_term_days);
            let bucket = bucket_for(overdue, inv.net_outstanding);

            let chain = chains.get(inv.invoice_no.as_str());
            let adjusted_bucket = match chain {
                Some(c) => with_credit_override(c.ageing_bucket, inv.net_outstanding),
                None => bucket,
            };

            AgedInvoice {
                invoice: inv.clone(),
                recoverability,
                overdue_days: overdue,
                bucket,
                adjusted_bucket,
                chain_root: chain.map(|c| c.root_invoice_no.clone()),
                // Provision follows the invoice's own age, not the chain's.
                provision: provision_for(bucket, inv.net_outstanding),
                outstanding: Outstanding::from_net(inv.net_outstanding),
            }
        })
        .collect();

    debug!(
        invoices = ledger.len(),
        reversals = reversals.len(),
        chain_nodes = lineage.len(),
        "aged ledger"
    );

    let summary = compute_summary(&ledger, &reversals, &lineage);
    info!(
        invoices = summary.invoices,
        chain_adjusted = summary.chain_adjusted,
        unknown = summary.unknown_bucket,
        total_provision = %summary.total_provision,
        "ageing complete"
    );

    AgeingResult {
        meta: AgeingMeta {
            reference_date,
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
        },
        summary,
        ledger,
        reversals,
    }
}

/// First annotation per (customer, invoice, location) key.
fn index_recoverability(
    records: &[RecoverabilityRecord],
) -> HashMap<(&str, &str, &str), Recoverability> {
    let mut index = HashMap::new();
    for r in records {
        index
            .entry((
                r.customer_code.trim(),
                r.invoice_no.trim(),
                r.order_location.trim(),
            ))
            .or_insert_with(|| r.recoverability.clone());
    }
    index
}

/// First reversal row per rebilled invoice.
fn index_chains(reversals: &[AgedReversal]) -> HashMap<&str, &AgedReversal> {
    let mut index = HashMap::new();
    for r in reversals {
        index.entry(r.reversal.new_invoice_no.as_str()).or_insert(r);
    }
    index
}

//! Reversal chain table: merge the two sources, then age every row against
//! the original invoice at the root of its chain.

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::bucket::AgeingBucket;
use crate::lineage::{resolve_roots, LineageMap};
use crate::model::{
    AgedReversal, InvoiceRecord, ManualReversalRecord, ReversalRecord, ReversalSource,
};
use crate::overdue::overdue_days;

/// Append the manual register to the reversal log.
///
/// Manual rows carry no payment term; it is taken from the first ledger row
/// whose invoice number equals the rebilled invoice.
pub fn unify_reversals(
    log: &[ReversalRecord],
    manual: &[ManualReversalRecord],
    ledger: &[InvoiceRecord],
) -> Vec<ReversalRecord> {
    let mut terms: HashMap<&str, Option<i64>> = HashMap::new();
    for inv in ledger {
        terms.entry(inv.invoice_no.as_str()).or_insert(inv.payment_term_days);
    }

    let mut unified = Vec::with_capacity(log.len() + manual.len());
    unified.extend(log.iter().cloned());

    for m in manual {
        let payment_term_days = terms.get(m.new_invoice_no.as_str()).copied().flatten();
        unified.push(ReversalRecord {
            source: ReversalSource::Manual,
            old_invoice_no: m.original_invoice_no.clone(),
            old_invoice_date: m.original_invoice_date,
            payment_term_days,
            new_invoice_no: m.new_invoice_no.clone(),
            new_date: m.new_date,
            new_amount: m.new_amount,
            client: Some(m.client.clone()),
            client_name: Some(m.name.clone()),
            original_amount: m.invoice_amount,
            credit_invoice_no: Some(m.credit_invoice_no.clone()),
        });
    }

    debug!(
        logged = log.len(),
        manual = manual.len(),
        "merged reversal sources"
    );
    unified
}

/// Root-invoice date table: old invoice → its recorded date. When the same
/// old invoice appears on several rows, the last row wins.
fn origin_dates(records: &[ReversalRecord]) -> HashMap<&str, Option<NaiveDate>> {
    records
        .iter()
        .map(|r| (r.old_invoice_no.as_str(), r.old_invoice_date))
        .collect()
}

/// Resolve lineage over `records` and age each row from its root's date.
pub fn age_reversals(
    records: Vec<ReversalRecord>,
    reference_date: NaiveDate,
) -> (Vec<AgedReversal>, LineageMap) {
    let lineage = resolve_roots(
        records
            .iter()
            .map(|r| (r.old_invoice_no.as_str(), r.new_invoice_no.as_str())),
    );

    let aged = {
        let dates = origin_dates(&records);
        records
            .iter()
            .map(|r| {
                let root = lineage.resolve(&r.old_invoice_no).to_string();
                let origin_date = dates.get(root.as_str()).copied().flatten();
                let overdue = overdue_days(reference_date, origin_date, r.payment_term_days);
                AgedReversal {
                    reversal: r.clone(),
                    root_invoice_no: root,
                    origin_date,
                    overdue_days: overdue,
                    ageing_bucket: overdue.map(AgeingBucket::classify),
                }
            })
            .collect()
    };

    (aged, lineage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn invoice(no: &str, term: Option<i64>) -> InvoiceRecord {
        InvoiceRecord {
            location_desc: "North".into(),
            customer_code: "C1".into(),
            customer_name: "Acme".into(),
            invoice_no: no.into(),
            doc_amount: Decimal::from(100),
            invoice_date: Some(date("2023-06-01")),
            order_location: "L1".into(),
            os_days: None,
            total_dr_bal: Decimal::from(100),
            total_cr_bal: Decimal::ZERO,
            net_outstanding: Decimal::from(100),
            payment_term_days: term,
        }
    }

    fn manual(old: &str, new: &str) -> ManualReversalRecord {
        ManualReversalRecord {
            client: "C1".into(),
            name: "Acme".into(),
            original_invoice_no: old.into(),
            original_invoice_date: Some(date("2023-01-15")),
            invoice_amount: Some(Decimal::from(100)),
            credit_invoice_no: format!("CR-{old}"),
            new_invoice_no: new.into(),
            new_date: Some(date("2023-07-01")),
            new_amount: Some(Decimal::from(100)),
        }
    }

    #[test]
    fn manual_rows_follow_log_rows_and_take_ledger_term() {
        let log = vec![ReversalRecord::logged("A", Some(date("2023-01-01")), Some(15), "B")];
        let ledger = vec![invoice("N1", Some(45)), invoice("N1", Some(90))];
        let merged = unify_reversals(&log, &[manual("M0", "N1"), manual("M1", "N9")], &ledger);

        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].source, ReversalSource::Log);
        assert_eq!(merged[1].source, ReversalSource::Manual);
        assert_eq!(merged[1].old_invoice_no, "M0");
        assert_eq!(merged[1].payment_term_days, Some(45), "first ledger match wins");
        assert_eq!(merged[1].credit_invoice_no.as_deref(), Some("CR-M0"));
        assert_eq!(merged[2].payment_term_days, None, "no ledger match");
    }

    #[test]
    fn three_hop_chain_ages_from_root_date() {
        // A is a root marker; C is three rows downstream.
        let records = vec![
            ReversalRecord::logged("A", Some(date("2023-01-01")), Some(0), "A"),
            ReversalRecord::logged("A", Some(date("2023-01-01")), Some(0), "B"),
            ReversalRecord::logged("B", Some(date("2023-09-01")), Some(0), "C"),
            ReversalRecord::logged("C", Some(date("2023-11-01")), Some(20), "D"),
        ];
        let (aged, lineage) = age_reversals(records, date("2024-01-01"));

        assert_eq!(lineage.root_of("D"), Some("A"));
        assert_eq!(aged[2].root_invoice_no, "A");
        assert_eq!(aged[2].origin_date, Some(date("2023-01-01")));
        assert_eq!(aged[2].overdue_days, Some(365));
        assert_eq!(aged[2].ageing_bucket, Some(AgeingBucket::Days181To365));
        // Own term is still subtracted.
        assert_eq!(aged[3].overdue_days, Some(345));
    }

    #[test]
    fn unknown_root_date_stays_unknown() {
        let records = vec![
            ReversalRecord::logged("A", None, Some(0), "B"),
            ReversalRecord::logged("B", Some(date("2023-09-01")), Some(0), "C"),
        ];
        let (aged, _) = age_reversals(records, date("2024-01-01"));
        assert_eq!(aged[1].root_invoice_no, "A");
        assert_eq!(aged[1].overdue_days, None);
        assert_eq!(aged[1].ageing_bucket, None);
    }

    #[test]
    fn last_row_wins_for_repeated_old_invoice_date() {
        let records = vec![
            ReversalRecord::logged("A", Some(date("2023-01-01")), None, "B"),
            ReversalRecord::logged("A", Some(date("2023-03-01")), None, "B"),
        ];
        let (aged, _) = age_reversals(records, date("2023-04-01"));
        assert_eq!(aged[0].origin_date, Some(date("2023-03-01")));
        assert_eq!(aged[0].overdue_days, Some(31));
    }

    #[test]
    fn rootless_cycle_still_ages() {
        let records = vec![
            ReversalRecord::logged("X", Some(date("2023-10-01")), None, "Y"),
            ReversalRecord::logged("Y", Some(date("2023-11-01")), None, "X"),
        ];
        let (aged, lineage) = age_reversals(records, date("2023-12-01"));
        assert_eq!(lineage.incidental_roots(), ["X".to_string()]);
        assert_eq!(aged[1].root_invoice_no, "X");
        assert_eq!(aged[1].overdue_days, Some(61));
    }
}

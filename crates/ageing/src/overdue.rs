use chrono::NaiveDate;

/// Days past payment terms at `reference_date`.
///
/// `(reference_date - origin_date) - payment_term_days`. An unknown origin
/// gives an unknown result; an unknown term counts as zero. Saturates rather
/// than overflowing on out-of-range terms.
pub fn overdue_days(
    reference_date: NaiveDate,
    origin_date: Option<NaiveDate>,
    payment_term_days: Option<i64>,
) -> Option<i64> {
    let origin = origin_date?;
    let elapsed = (reference_date - origin).num_days();
    Some(elapsed.saturating_sub(payment_term_days.unwrap_or(0)))
}

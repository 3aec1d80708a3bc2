//! Ageing buckets and provision rates.
//!
//! Seven ordered tiers keyed on days overdue. Upper bounds are inclusive and
//! checked in ascending order, so the first tier whose bound is not exceeded
//! wins.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgeingBucket {
    #[serde(rename = "Not due")]
    NotDue,
    #[serde(rename = "8 to 30 days")]
    Days8To30,
    #[serde(rename = "31 to 60 days")]
    Days31To60,
    #[serde(rename = "61 to 90 days")]
    Days61To90,
    #[serde(rename = "91 to 180 days")]
    Days91To180,
    #[serde(rename = "181 to 365 days")]
    Days181To365,
    #[serde(rename = "more than 365 days")]
    Over365,
}

impl AgeingBucket {
    /// All buckets in ascending order.
    pub const ALL: [AgeingBucket; 7] = [
        Self::NotDue,
        Self::Days8To30,
        Self::Days31To60,
        Self::Days61To90,
        Self::Days91To180,
        Self::Days181To365,
        Self::Over365,
    ];

    /// Classify a day count. Total over all of `i64`.
    pub fn classify(days: i64) -> Self {
        match days {
            i64::MIN..=7 => Self::NotDue,
            8..=30 => Self::Days8To30,
            31..=60 => Self::Days31To60,
            61..=90 => Self::Days61To90,
            91..=180 => Self::Days91To180,
            181..=365 => Self::Days181To365,
            _ => Self::Over365,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::NotDue => "Not due",
            Self::Days8To30 => "8 to 30 days",
            Self::Days31To60 => "31 to 60 days",
            Self::Days61To90 => "61 to 90 days",
            Self::Days91To180 => "91 to 180 days",
            Self::Days181To365 => "181 to 365 days",
            Self::Over365 => "more than 365 days",
        }
    }

    /// Provision percentage held against an invoice in this bucket.
    pub fn provision_rate(&self) -> u32 {
        match self {
            Self::Days61To90 => 5,
            Self::Days91To180 => 30,
            Self::Days181To365 => 60,
            Self::Over365 => 100,
            Self::NotDue | Self::Days8To30 | Self::Days31To60 => 0,
        }
    }
}

impl fmt::Display for AgeingBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AgeingBucket {
    type Err = String;

    /// Case-insensitive, whitespace-tolerant match on the label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|b| b.label().to_ascii_lowercase() == wanted)
            .ok_or_else(|| format!("unknown ageing bucket '{s}'"))
    }
}

/// Bucket for an invoice given its (possibly unknown) days overdue.
///
/// A negative outstanding balance is a credit and is never overdue, so it
/// lands in `NotDue` even when the day count is unknown.
pub fn bucket_for(days: Option<i64>, net_outstanding: Decimal) -> Option<AgeingBucket> {
    with_credit_override(days.map(AgeingBucket::classify), net_outstanding)
}

/// Force `NotDue` on a credit balance, whatever the bucket was.
pub fn with_credit_override(
    bucket: Option<AgeingBucket>,
    net_outstanding: Decimal,
) -> Option<AgeingBucket> {
    if net_outstanding < Decimal::ZERO {
        Some(AgeingBucket::NotDue)
    } else {
        bucket
    }
}

/// `rate(bucket) / 100 * net_outstanding`. Unknown bucket provisions nothing.
pub fn provision_for(bucket: Option<AgeingBucket>, net_outstanding: Decimal) -> Decimal {
    let rate = bucket.map(|b| b.provision_rate()).unwrap_or(0);
    Decimal::from(rate) / Decimal::ONE_HUNDRED * net_outstanding
}

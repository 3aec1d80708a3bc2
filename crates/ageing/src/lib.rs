//! `ageing-engine`: Receivables ageing with reversal-chain lineage.
//!
//! Pure engine crate: receives pre-loaded ledger, recoverability and reversal
//! records plus a reference date, returns aged and provisioned rows.
//! No CLI or IO dependencies.

pub mod bucket;
pub mod config;
pub mod engine;
pub mod error;
pub mod lineage;
pub mod model;
pub mod overdue;
pub mod parse;
pub mod reversal;
pub mod summary;

pub use bucket::AgeingBucket;
pub use config::AgeingConfig;
pub use engine::run;
pub use error::AgeingError;
pub use lineage::{resolve_roots, LineageMap};
pub use model::{AgeingInput, AgeingResult, AgedInvoice, AgedReversal, InvoiceRecord, Outstanding};

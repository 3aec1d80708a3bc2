//! `ageing-io`: Adapters between the ageing engine and files on disk.
//!
//! Reads the ledger, recoverability, reversal log and manual register from
//! CSV or Excel into typed records, and writes results as XLSX, CSV or JSON
//! using the legacy column names and textual conventions.

pub mod csv;
pub mod error;
pub mod export;
pub mod json;
pub mod load;
pub mod table;
pub mod xlsx;

pub use error::{ExportError, LoadError};
pub use export::{write_csv_dir, write_xlsx};
pub use load::load_input;
pub use table::Table;

use thiserror::Error;

/// Failure reading one of the input tables.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read '{path}': {message}")]
    Read { path: String, message: String },

    #[error("'{path}': sheet '{sheet}' not found (available: {available})")]
    SheetNotFound {
        path: String,
        sheet: String,
        available: String,
    },

    #[error("'{path}': header row {row} is past the end of the data")]
    MissingHeader { path: String, row: usize },

    #[error("{table}: missing required column '{column}'")]
    MissingColumn { table: String, column: String },

    #[error("{table} row {row}: cannot parse amount '{value}' in column '{column}'")]
    Amount {
        table: String,
        row: usize,
        column: String,
        value: String,
    },
}

/// Failure writing an output file.
#[derive(Debug, Error)]
#[error("failed to write '{path}': {message}")]
pub struct ExportError {
    pub path: String,
    pub message: String,
}

impl ExportError {
    pub(crate) fn new(path: &std::path::Path, message: impl ToString) -> Self {
        Self {
            path: path.display().to_string(),
            message: message.to_string(),
        }
    }
}

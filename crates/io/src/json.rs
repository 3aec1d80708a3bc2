// JSON export

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use ageing_engine::AgeingResult;

use crate::error::ExportError;

/// Export the full result (meta, summary, both tables) as pretty JSON.
pub fn export(result: &AgeingResult, path: &Path) -> Result<(), ExportError> {
    let file = File::create(path).map_err(|e| ExportError::new(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, result).map_err(|e| ExportError::new(path, e))?;
    writer.flush().map_err(|e| ExportError::new(path, e))?;
    Ok(())
}

pub fn to_string(result: &AgeingResult) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(result)
}

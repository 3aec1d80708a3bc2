// CSV import/export

use std::io::Read;
use std::path::Path;

use crate::error::{ExportError, LoadError};
use crate::export::Cell;
use crate::table::Table;

/// Read a CSV file into a table whose headers sit on `header_row` (1-based).
pub fn import(path: &Path, header_row: usize) -> Result<Table, LoadError> {
    let content = read_file_as_utf8(path).map_err(|message| LoadError::Read {
        path: path.display().to_string(),
        message,
    })?;
    let grid = parse_grid(&content).map_err(|message| LoadError::Read {
        path: path.display().to_string(),
        message,
    })?;
    Table::from_grid(path.display().to_string(), grid, header_row)
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, String> {
    let mut file = std::fs::File::open(path).map_err(|e| e.to_string())?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| e.to_string())?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s.trim_start_matches('\u{feff}').to_string()),
        Err(e) => {
            let bytes = e.into_bytes();
            // Excel-exported CSVs are usually Windows-1252
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

fn parse_grid(content: &str) -> Result<Vec<Vec<String>>, String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut grid = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| e.to_string())?;
        grid.push(record.iter().map(str::to_string).collect());
    }
    Ok(grid)
}

/// Write one output sheet as CSV.
pub fn export(headers: &[&str], rows: &[Vec<Cell>], path: &Path) -> Result<(), ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .from_path(path)
        .map_err(|e| ExportError::new(path, e))?;

    writer
        .write_record(headers)
        .map_err(|e| ExportError::new(path, e))?;
    for row in rows {
        let record: Vec<String> = row.iter().map(Cell::to_text).collect();
        writer
            .write_record(&record)
            .map_err(|e| ExportError::new(path, e))?;
    }

    writer.flush().map_err(|e| ExportError::new(path, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_import_with_preamble() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("billage.csv");
        fs::write(
            &path,
            "Final Billage Systems\nPrinted 01/04/2024\nInvoice No,Net Outstanding\n INV1 ,\"1,200.50\"\n,\n",
        )
        .unwrap();

        let table = import(&path, 3).unwrap();
        assert_eq!(table.headers, vec!["Invoice No", "Net Outstanding"]);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].get(0), " INV1 ");
        assert_eq!(table.rows[0].get(1), "1,200.50");
    }

    #[test]
    fn test_windows_1252_fallback() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cp1252.csv");
        // "Café" with 0xE9 (é in Windows-1252, invalid UTF-8 on its own)
        fs::write(&path, b"Customer Name\nCaf\xe9\n").unwrap();

        let table = import(&path, 1).unwrap();
        assert_eq!(table.rows[0].get(0), "Café");
    }

    #[test]
    fn test_bom_stripped_from_first_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bom.csv");
        fs::write(&path, "\u{feff}Invoice No\nINV1\n").unwrap();

        let table = import(&path, 1).unwrap();
        assert_eq!(table.column("Invoice No"), Some(0));
    }

    #[test]
    fn test_missing_file() {
        let err = import(Path::new("/nonexistent/ledger.csv"), 1).unwrap_err();
        assert!(matches!(err, LoadError::Read { .. }));
    }

    #[test]
    fn test_export_writes_text_cells() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let rows = vec![vec![Cell::Text("INV1".into()), Cell::Unknown, Cell::Blank]];

        export(&["Invoice No", "Bucket", "Note"], &rows, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "Invoice No,Bucket,Note\nINV1,Unknown,\n");
    }
}

// In-memory tabular source: a header row and the data rows beneath it

use crate::error::LoadError;

/// One data row. `line` is the 1-based row number in the source file.
#[derive(Debug, Clone)]
pub struct Row {
    pub line: usize,
    pub cells: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Table {
    /// Display name used in error messages (file, plus sheet for workbooks).
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    /// Build a table from raw grid rows. Rows above `header_row` (1-based) are
    /// skipped; data rows that are entirely blank are dropped.
    pub fn from_grid(
        name: impl Into<String>,
        grid: Vec<Vec<String>>,
        header_row: usize,
    ) -> Result<Self, LoadError> {
        let name = name.into();
        let header_idx = header_row.saturating_sub(1);

        let mut lines = grid.into_iter().enumerate().skip(header_idx);
        let (_, headers) = lines.next().ok_or_else(|| LoadError::MissingHeader {
            path: name.clone(),
            row: header_row,
        })?;
        let headers = headers.into_iter().map(|h| h.trim().to_string()).collect();

        let rows = lines
            .filter(|(_, cells)| cells.iter().any(|c| !c.trim().is_empty()))
            .map(|(idx, cells)| Row { line: idx + 1, cells })
            .collect();

        Ok(Self { name, headers, rows })
    }

    /// Index of a column by header name, compared after trimming.
    pub fn column(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header.trim())
    }

    pub fn require(&self, header: &str) -> Result<usize, LoadError> {
        self.column(header).ok_or_else(|| LoadError::MissingColumn {
            table: self.name.clone(),
            column: header.to_string(),
        })
    }
}

impl Row {
    /// Cell text at `col`; short rows read as blank.
    pub fn get(&self, col: usize) -> &str {
        self.cells.get(col).map(String::as_str).unwrap_or("")
    }

    pub fn get_opt(&self, col: Option<usize>) -> &str {
        col.map(|c| self.get(c)).unwrap_or("")
    }
}

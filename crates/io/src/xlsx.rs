// Excel import (xlsx, xls, xlsb, ods) and XLSX export

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook as XlsxWorkbook, Worksheet};

use crate::error::{ExportError, LoadError};
use crate::export::{Cell, OutputSheet};
use crate::table::Table;

/// Read one worksheet (the first when `sheet` is `None`) into a table whose
/// headers sit on `header_row` (1-based, counted from the top of the sheet).
pub fn import(path: &Path, sheet: Option<&str>, header_row: usize) -> Result<Table, LoadError> {
    let display = path.display().to_string();

    let mut workbook: Sheets<_> = open_workbook_auto(path).map_err(|e| LoadError::Read {
        path: display.clone(),
        message: format!("failed to open Excel file: {e}"),
    })?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let sheet_name = match sheet {
        Some(wanted) => sheet_names
            .iter()
            .find(|n| n.as_str() == wanted)
            .cloned()
            .ok_or_else(|| LoadError::SheetNotFound {
                path: display.clone(),
                sheet: wanted.to_string(),
                available: sheet_names.join(", "),
            })?,
        None => sheet_names.first().cloned().ok_or_else(|| LoadError::Read {
            path: display.clone(),
            message: "Excel file contains no sheets".to_string(),
        })?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| LoadError::Read {
            path: display.clone(),
            message: format!("failed to read sheet '{sheet_name}': {e}"),
        })?;

    // Range start offset (data may not begin at A1)
    let (start_row, start_col) = range.start().unwrap_or((0, 0));

    let mut grid: Vec<Vec<String>> = vec![Vec::new(); start_row as usize];
    for row in range.rows() {
        let mut cells = vec![String::new(); start_col as usize];
        cells.extend(row.iter().map(cell_text));
        grid.push(cells);
    }

    Table::from_grid(format!("{display} [{sheet_name}]"), grid, header_row)
}

/// Cell value as the text a CSV export of the same sheet would carry.
/// Date cells become ISO dates.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(n) => {
            // Integers without decimals
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                format!("{n}")
            }
        }
        Data::Int(n) => n.to_string(),
        Data::Bool(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
        Data::Error(e) => format!("#{e:?}"),
        Data::DateTime(dt) => {
            // calamine does not expose the 1904 flag; assume the 1900 system
            let serial = dt.as_f64();
            match serial_to_date(serial) {
                Some(date) => date.format("%Y-%m-%d").to_string(),
                None => format!("{serial}"),
            }
        }
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}

/// Excel 1900-system serial to a calendar date. The time fraction is dropped.
fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    let days = serial.floor() as i64;
    // Serials below 60 predate Excel's phantom 1900-02-29
    let epoch = if days < 60 {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };
    epoch.checked_add_signed(Duration::days(days))
}

/// Write every sheet to one workbook, headers bold, dates formatted.
pub fn export(sheets: &[OutputSheet], path: &Path) -> Result<(), ExportError> {
    let mut workbook = XlsxWorkbook::new();
    let header_format = Format::new().set_bold();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");

    for sheet in sheets {
        let worksheet = workbook
            .add_worksheet()
            .set_name(sheet.name)
            .map_err(|e| ExportError::new(path, format!("sheet '{}': {e}", sheet.name)))?;

        for (col, header) in sheet.headers.iter().enumerate() {
            worksheet
                .write_string_with_format(0, col as u16, *header, &header_format)
                .map_err(|e| ExportError::new(path, e))?;
        }

        for (row_idx, row) in sheet.rows.iter().enumerate() {
            let row_num = (row_idx + 1) as u32;
            for (col, cell) in row.iter().enumerate() {
                write_cell(worksheet, row_num, col as u16, cell, &date_format)
                    .map_err(|e| ExportError::new(path, e))?;
            }
        }

        worksheet
            .set_freeze_panes(1, 0)
            .map_err(|e| ExportError::new(path, e))?;
    }

    workbook.save(path).map_err(|e| ExportError::new(path, e))?;
    Ok(())
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &Cell,
    date_format: &Format,
) -> Result<(), rust_xlsxwriter::XlsxError> {
    match cell {
        Cell::Blank => {}
        Cell::Text(s) => {
            worksheet.write_string(row, col, s)?;
        }
        Cell::Unknown => {
            worksheet.write_string(row, col, Cell::UNKNOWN)?;
        }
        Cell::Int(n) => {
            worksheet.write_number(row, col, *n as f64)?;
        }
        Cell::Amount(d) => match d.to_f64() {
            Some(n) => {
                worksheet.write_number(row, col, n)?;
            }
            None => {
                worksheet.write_string(row, col, d.to_string())?;
            }
        },
        Cell::Date(date) => {
            let dt = ExcelDateTime::from_ymd(date.year() as u16, date.month() as u8, date.day() as u8)?;
            worksheet.write_datetime_with_format(row, col, &dt, date_format)?;
        }
    }
    Ok(())
}

//! Export Module
//! Serializes the filtered view to CSV (via Polars) and XLSX (via rust_xlsxwriter).

use crate::data::{AbsenceTable, ALL_COLUMNS, COL_ABSENCE_DATE, COL_MONTH, COL_YEAR};
use polars::prelude::*;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use std::path::Path;
use thiserror::Error;
use tracing::info;

const SHEET_NAME: &str = "Faltas";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("XLSX error: {0}")]
    XlsxError(#[from] XlsxError),
    #[error("Chart rendering failed: {0}")]
    Chart(String),
    #[error("Failed to write file: {0}")]
    Io(#[from] std::io::Error),
}

/// Downloadable artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Csv,
    Xlsx,
    ReasonChart,
    MonthChart,
}

impl ExportKind {
    pub fn default_file_name(&self) -> &'static str {
        match self {
            ExportKind::Csv => "faltas_filtradas.csv",
            ExportKind::Xlsx => "faltas_filtradas.xlsx",
            ExportKind::ReasonChart => "faltas_por_motivo.png",
            ExportKind::MonthChart => "faltas_por_mes.png",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportKind::Csv => "csv",
            ExportKind::Xlsx => "xlsx",
            ExportKind::ReasonChart | ExportKind::MonthChart => "png",
        }
    }

    pub fn filter_name(&self) -> &'static str {
        match self {
            ExportKind::Csv => "CSV",
            ExportKind::Xlsx => "Excel",
            ExportKind::ReasonChart | ExportKind::MonthChart => "PNG",
        }
    }
}

/// Build a DataFrame mirroring the table view: source columns plus derived ones.
pub fn to_dataframe(table: &AbsenceTable) -> Result<DataFrame, ExportError> {
    let columns: Vec<Column> = ALL_COLUMNS
        .iter()
        .map(|&name| match name {
            COL_YEAR => {
                let years: Vec<Option<i32>> = table.iter().map(|r| r.year).collect();
                Column::new(name.into(), years)
            }
            COL_ABSENCE_DATE | COL_MONTH => {
                let values: Vec<Option<String>> = table
                    .iter()
                    .map(|r| Some(r.cell(name)).filter(|v| !v.is_empty()))
                    .collect();
                Column::new(name.into(), values)
            }
            _ => {
                let values: Vec<String> = table.iter().map(|r| r.cell(name)).collect();
                Column::new(name.into(), values)
            }
        })
        .collect();

    Ok(DataFrame::new(columns)?)
}

/// UTF-8 CSV with a header row; dates as `YYYY-MM-DD`, missing values empty.
pub fn to_csv(table: &AbsenceTable) -> Result<Vec<u8>, ExportError> {
    let mut df = to_dataframe(table)?;
    let mut buffer: Vec<u8> = Vec::new();
    CsvWriter::new(&mut buffer)
        .include_header(true)
        .finish(&mut df)?;
    Ok(buffer)
}

/// Single-sheet workbook with a bold header row.
pub fn to_xlsx(table: &AbsenceTable) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, name) in ALL_COLUMNS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *name, &header)?;
    }

    for (idx, record) in table.iter().enumerate() {
        let row = idx as u32 + 1;
        for (col, &name) in ALL_COLUMNS.iter().enumerate() {
            let col = col as u16;
            if name == COL_YEAR {
                if let Some(year) = record.year {
                    worksheet.write_number(row, col, f64::from(year))?;
                }
                continue;
            }

            let text = record.cell(name);
            if !text.is_empty() {
                worksheet.write_string(row, col, text)?;
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

/// Write export bytes to disk.
pub fn save_bytes(path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    std::fs::write(path, bytes)?;
    info!(path = %path.display(), bytes = bytes.len(), "Export written");
    Ok(())
}

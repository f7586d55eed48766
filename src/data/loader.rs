//! Spreadsheet Data Loader Module
//! Fetches the shared spreadsheet's CSV export over HTTP and parses it with Polars.

use crate::data::{AbsenceTable, NormalizeError, Normalizer};
use polars::prelude::*;
use reqwest::blocking::Client;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

const DEFAULT_SHEET_ID: &str = "1vf27HR8Pk-CiS_zT-1-0oskfsMlR6DPM63OX61SJzU0";
const DEFAULT_SHEET_NAME: &str = "Respostas ao formulário 1";

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Invalid export URL: {0}")]
    InvalidUrl(String),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Spreadsheet export returned HTTP {0}")]
    Status(u16),
    #[error("Failed to parse CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Spreadsheet export is empty")]
    Empty,
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}

/// Identifies the remote spreadsheet tab to read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetSource {
    pub sheet_id: String,
    pub sheet_name: String,
}

impl Default for SheetSource {
    fn default() -> Self {
        Self {
            sheet_id: DEFAULT_SHEET_ID.to_string(),
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
        }
    }
}

impl SheetSource {
    /// CSV export URL for this tab.
    pub fn export_url(&self) -> Result<Url, LoaderError> {
        let base = format!(
            "https://docs.google.com/spreadsheets/d/{}/gviz/tq",
            self.sheet_id.trim()
        );
        Url::parse_with_params(
            &base,
            &[("tqx", "out:csv"), ("sheet", self.sheet_name.as_str())],
        )
        .map_err(|e| LoaderError::InvalidUrl(e.to_string()))
    }
}

/// Fetches and parses the absence spreadsheet.
pub struct DataLoader {
    client: Client,
    source: SheetSource,
}

impl DataLoader {
    pub fn new(source: SheetSource, timeout: Duration) -> Result<Self, LoaderError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, source })
    }

    /// Download the export as text. Any non-success status is an error.
    pub fn fetch(&self) -> Result<String, LoaderError> {
        let url = self.source.export_url()?;
        info!(sheet = %self.source.sheet_name, "Fetching spreadsheet export");

        let response = self.client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(LoaderError::Status(status.as_u16()));
        }

        let body = response.text()?;
        info!(bytes = body.len(), "Spreadsheet export downloaded");
        Ok(body)
    }

    /// Parse delimited text with a header row. Every column is read as text.
    pub fn parse_csv(text: &str) -> Result<DataFrame, LoaderError> {
        if text.trim().is_empty() {
            return Err(LoaderError::Empty);
        }

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .into_reader_with_file_handle(Cursor::new(text.as_bytes().to_vec()))
            .finish()?;

        Ok(df)
    }

    /// Fetch, parse and normalize in one pass.
    pub fn load(&self) -> Result<AbsenceTable, LoaderError> {
        let text = self.fetch()?;
        let df = Self::parse_csv(&text)?;
        let table = Normalizer::normalize(&df)?;
        info!(
            rows = table.len(),
            sheet = %self.source.sheet_name,
            "Absence records loaded"
        );
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_url_encodes_sheet_name() {
        let url = SheetSource::default().export_url().unwrap();

        assert_eq!(url.host_str(), Some("docs.google.com"));
        assert_eq!(
            url.path(),
            "/spreadsheets/d/1vf27HR8Pk-CiS_zT-1-0oskfsMlR6DPM63OX61SJzU0/gviz/tq"
        );
        assert!(!url.as_str().contains(' '));

        let params: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            params,
            vec![
                ("tqx".to_string(), "out:csv".to_string()),
                ("sheet".to_string(), "Respostas ao formulário 1".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_csv_reads_everything_as_text() {
        let csv = "\"Data de Envio\",\"Nome\",\"Setor\",\"Data da Falta\",\"Motivo\",\"Obs\"\n\
                   \"01/03/2024 10:00:00\",\"Ana\",\"A\",\"01/03/2024\",\"Doença\",\"\"\n\
                   \"02/03/2024 10:00:00\",\"Bia\",\"B\",\"2024\",\"Consulta\",\"ok, volta\"\n";

        let df = DataLoader::parse_csv(csv).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 6);
        assert!(df
            .get_columns()
            .iter()
            .all(|c| c.dtype() == &DataType::String));
    }

    #[test]
    fn test_parse_csv_then_normalize() {
        let csv = "Carimbo de data/hora,Nome do Funcionário,Setor,\
                   Data da Falta,Motivo,Observações\n\
                   01/03/2024 10:00:00,Ana,A,01/03/2024,Doença,\n\
                   02/03/2024 10:00:00,Bia,B,sem data,Consulta,\"ok, volta amanhã\"\n";

        let df = DataLoader::parse_csv(csv).unwrap();
        let table = Normalizer::normalize(&df).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.records()[0].year, Some(2024));
        assert_eq!(table.records()[1].absence_date, None);
        assert_eq!(table.records()[1].note, "ok, volta amanhã");
    }

    #[test]
    fn test_parse_csv_rejects_empty_body() {
        assert!(matches!(DataLoader::parse_csv("  \n"), Err(LoaderError::Empty)));
    }
}

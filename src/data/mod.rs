//! Data module - spreadsheet loading, normalization and the record table

mod loader;
mod normalizer;
mod record;

pub use loader::{DataLoader, LoaderError, SheetSource};
pub use normalizer::{parse_date_lenient, NormalizeError, Normalizer};
pub use record::{
    month_number, AbsenceRecord, AbsenceTable, ALL_COLUMNS, COL_ABSENCE_DATE, COL_MONTH,
    COL_YEAR,
};

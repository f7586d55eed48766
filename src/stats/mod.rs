//! Stats module - summary metrics and grouped counts

mod summary;

pub use summary::{EmployeeTimeline, GroupedCounts, Summary};

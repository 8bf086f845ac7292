//! Flattening firewall rules into CSV.

pub mod row;
pub mod writer;

pub use row::{OutputRow, HEADER};
pub use writer::{export_to_file, write_rules, CsvExporter, ExportSummary};

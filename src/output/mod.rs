mod cli;
mod json;

pub use cli::{print_scan_table, print_scans_table};
pub use json::{print_json, print_json_list};

use crate::model::ScanResult;
use anyhow::Result;

/// Output format for scan results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// The raw service documents, for programmatic use
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use 'table' or 'json'", s)),
        }
    }
}

pub fn print_scan(result: &ScanResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => print_scan_table(result),
        OutputFormat::Json => print_json(result),
    }
}

pub fn print_scans(results: &[ScanResult], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => print_scans_table(results),
        OutputFormat::Json => print_json_list(results),
    }
}

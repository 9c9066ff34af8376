use crate::model::ScanResult;
use anyhow::Result;

/// Prints the document the result was decoded from.
pub fn print_json(result: &ScanResult) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(result.raw())?);
    Ok(())
}

/// Prints search hits as a JSON array, even when there is only one.
pub fn print_json_list(results: &[ScanResult]) -> Result<()> {
    let raws: Vec<_> = results.iter().map(ScanResult::raw).collect();
    println!("{}", serde_json::to_string_pretty(&raws)?);
    Ok(())
}

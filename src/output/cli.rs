use crate::model::{ScanResult, ScanStatus};
use anyhow::Result;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct ScanRow {
    #[tabled(rename = "UUID")]
    uuid: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "URL")]
    url: String,
    #[tabled(rename = "Verdict")]
    verdict: String,
    #[tabled(rename = "Time")]
    time: String,
}

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    field: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

pub fn print_scan_table(result: &ScanResult) -> Result<()> {
    println!("{}", scan_table(result));
    Ok(())
}

pub fn print_scans_table(results: &[ScanResult]) -> Result<()> {
    if results.is_empty() {
        println!("No scans found.");
        return Ok(());
    }

    println!("Found {} scans:", results.len());
    println!();
    println!("{}", scans_table(results));
    Ok(())
}

fn scan_table(result: &ScanResult) -> String {
    let categories = result.categories();
    let rows = vec![
        FieldRow {
            field: "UUID",
            value: result.uuid().to_string(),
        },
        FieldRow {
            field: "Status",
            value: format_status(result.status()),
        },
        FieldRow {
            field: "URL",
            value: result.url().unwrap_or("-").to_string(),
        },
        FieldRow {
            field: "Visibility",
            value: result
                .visibility()
                .map(|v| v.to_string())
                .unwrap_or_else(|| "-".to_string()),
        },
        FieldRow {
            field: "Time",
            value: format_time(result),
        },
        FieldRow {
            field: "Verdict",
            value: format_verdict(result),
        },
        FieldRow {
            field: "Categories",
            value: if categories.is_empty() {
                "-".to_string()
            } else {
                categories.join(", ")
            },
        },
    ];

    Table::new(rows).with(Style::rounded()).to_string()
}

fn scans_table(results: &[ScanResult]) -> String {
    let rows: Vec<ScanRow> = results
        .iter()
        .map(|r| ScanRow {
            uuid: r.uuid().to_string(),
            status: format_status(r.status()),
            url: truncate(r.url().unwrap_or("-"), 60),
            verdict: format_verdict(r),
            time: format_time(r),
        })
        .collect();

    Table::new(rows).with(Style::rounded()).to_string()
}

fn format_status(status: ScanStatus) -> String {
    match status {
        ScanStatus::Pending => "\x1b[33mPENDING\x1b[0m".to_string(),
        ScanStatus::Done => "\x1b[32mDONE\x1b[0m".to_string(),
        ScanStatus::Error => "\x1b[31mERROR\x1b[0m".to_string(),
    }
}

fn format_verdict(result: &ScanResult) -> String {
    match result.is_malicious() {
        Some(true) => "\x1b[31mMALICIOUS\x1b[0m".to_string(),
        Some(false) => "clean".to_string(),
        None => "-".to_string(),
    }
}

fn format_time(result: &ScanResult) -> String {
    result
        .time()
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("https://example.com/very/long", 12), "https://e...");
        assert_eq!(truncate("ééééé", 4), "é...");
    }

    #[test]
    fn test_scan_table_contains_fields() {
        let result = ScanResult::from_json(json!({
            "uuid": "abc-123",
            "status": "done",
            "url": "https://example.com",
            "verdict": {"overall": {"malicious": true, "categories": [{"name": "Phishing"}]}}
        }))
        .unwrap();

        let table = scan_table(&result);
        assert!(table.contains("abc-123"));
        assert!(table.contains("https://example.com"));
        assert!(table.contains("MALICIOUS"));
        assert!(table.contains("Phishing"));
    }

    #[test]
    fn test_scans_table_has_one_row_per_scan() {
        let results: Vec<ScanResult> = ["a-1", "b-2"]
            .iter()
            .map(|uuid| ScanResult::from_json(json!({"uuid": uuid, "success": true})).unwrap())
            .collect();

        let table = scans_table(&results);
        assert!(table.contains("a-1"));
        assert!(table.contains("b-2"));
    }
}

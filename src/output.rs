use crate::error::Result;
use crate::types::{AnalysisResult, ComplexReport, SimpleReport};
use serde::Serialize;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

pub fn write_text(path: &Path, text: &str) -> Result<()> {
    std::fs::write(path, text)?;
    Ok(())
}

/// Tab-separated tabulation of a result, ready to paste into a spreadsheet.
pub fn render_tsv(result: &AnalysisResult) -> String {
    match result {
        AnalysisResult::Complex(report) => render_complex_tsv(report),
        AnalysisResult::Simple(report) => render_simple_tsv(report),
    }
}

fn render_complex_tsv(report: &ComplexReport) -> String {
    let s = &report.summary;
    let mut lines: Vec<String> = vec![
        "Summary".to_string(),
        "Metric\tValue".to_string(),
        format!("Total ports CSV rows\t{}", s.total_ports_rows),
        format!("Total load ports\t{}", s.total_load_ports),
        format!("Total disch ports\t{}", s.total_disch_ports),
        format!("Total rules rows\t{}", s.total_rules_rows),
        format!("Total segments rows\t{}", s.total_segments_rows),
        format!("Expected complete distances\t{}", s.expected_complete),
        format!("Complete distances generated\t{}", s.generated_complete),
        format!("Missing distances (segments)\t{}", s.missing_segments),
        format!("Missing complete distances\t{}", s.missing_complete),
        String::new(),
        "Missing Distances ARW (segments)".to_string(),
        "From port name\tFrom port id\tTo port name\tTo port id\tRule name\tRule id".to_string(),
    ];
    for row in &report.missing_segments {
        lines.push(format!(
            "{}\t{}\t{}\t{}\t{}\t{}",
            row.from_name, row.from_id, row.to_name, row.to_id, row.rule_name, row.rule_id
        ));
    }
    lines.push(String::new());
    lines.push("Missing ARW Complete Distances".to_string());
    lines.push(
        "Disch port name\tDisch port id\tLoad port name\tLoad port id\tRule name\tPriority\tReason"
            .to_string(),
    );
    for row in &report.missing_complete {
        lines.push(format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            row.disch_name,
            row.disch_id,
            row.load_name,
            row.load_id,
            row.rule_name,
            crate::types::display_priority(&row.priority),
            row.reason
        ));
    }
    lines.join("\n")
}

fn render_simple_tsv(report: &SimpleReport) -> String {
    let s = &report.summary;
    let mut lines: Vec<String> = vec![
        "Summary".to_string(),
        "Metric\tValue".to_string(),
        format!("Total load ports\t{}", s.total_load_ports),
        format!("Total disch ports\t{}", s.total_disch_ports),
        format!("Total distance CSV rows\t{}", s.total_distance_rows),
        format!("Total distances (pairs)\t{}", s.total_distances),
        format!("Number of distances found\t{}", s.found),
        format!("Number of distances missing\t{}", s.missing),
        String::new(),
        "Missing distances".to_string(),
        "Load port name\tLoad port id\tDisch port name\tDisch port id".to_string(),
    ];
    for row in &report.missing {
        lines.push(format!(
            "{}\t{}\t{}\t{}",
            row.load_name, row.load_id, row.disch_name, row.disch_id
        ));
    }
    lines.join("\n")
}

pub fn preview_table<T>(title: &str, rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("{}", title);
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}", table_str);
    if rows.len() > max_rows {
        println!("({} more rows)", rows.len() - max_rows);
    }
    println!();
}

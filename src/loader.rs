use crate::error::{Error, Result};
use crate::segments::SegmentTable;
use crate::tables::{PairTable, PortTable, ReferenceTables, RuleTable};
use crate::types::{
    CompleteDistanceRow, DistanceRule, Port, PortRow, RuleRow, Segment, SegmentRow,
};
use crate::util::normalize_opt;
use csv::{ByteRecord, ReaderBuilder, StringRecord, Trim};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

pub const PORT_COLUMNS: [&str; 12] = [
    "id",
    "port",
    "load",
    "region_id",
    "mgo_at_port",
    "port_country_id",
    "port_code",
    "port_type",
    "is_active_port",
    "coordinates",
    "port_nickname",
    "updated_at",
];

pub const RULE_COLUMNS: [&str; 13] = [
    "id",
    "distance_rule_name",
    "order_of_priority",
    "zone_start_id",
    "zone_end_id",
    "waypoint1_id",
    "waypoint2_id",
    "waypoint3_id",
    "waypoint4_id",
    "waypoint5_id",
    "waypoint6_id",
    "discount_suez_ballast",
    "discount_suez_laden",
];

pub const SEGMENT_COLUMNS: [&str; 22] = [
    "id",
    "load_port_id",
    "disch_port_id",
    "total_distance",
    "total_seca_distance",
    "waypoint_data",
    "updated_at",
    "by_panama_canal_rp",
    "by_gibraltar_strait_rp",
    "by_cape_good_hope_rp",
    "by_magellan_strait_rp",
    "by_cape_horn_rp",
    "by_singapore_strait_rp",
    "by_torres_strait_rp",
    "by_vitiaz_strait_rp",
    "by_kiel_canal_rp",
    "by_skaw_area_rp",
    "by_suez_canal_rp",
    "by_gulf_of_aden_rp",
    "by_sunda_strait_rp",
    "by_bosporus_strait_rp",
    "by_malacca_strait_rp",
];

pub const COMPLETE_DISTANCE_COLUMNS: [&str; 22] = [
    "id",
    "load_port_id",
    "disch_port_id",
    "total_distance",
    "total_seca_distance",
    "by_panama_canal_rp",
    "by_gibraltar_strait_rp",
    "by_cape_good_hope_rp",
    "by_magellan_strait_rp",
    "by_cape_horn_rp",
    "by_singapore_strait_rp",
    "by_torres_strait_rp",
    "by_vitiaz_strait_rp",
    "by_malacca_strait_rp",
    "by_kiel_canal_rp",
    "by_skaw_area_rp",
    "by_suez_canal_rp",
    "by_gulf_of_aden_rp",
    "by_sunda_strait_rp",
    "discount_suez_ballast",
    "complete_distance_priority",
    "by_bosporus_strait_rp",
];

/// The four input tables the analyzers understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Ports,
    Rules,
    Segments,
    CompleteDistances,
}

impl TableKind {
    pub fn label(self) -> &'static str {
        match self {
            TableKind::Ports => "Ports CSV",
            TableKind::Rules => "Distance Rules CSV",
            TableKind::Segments => "Distances ARW (segments) CSV",
            TableKind::CompleteDistances => "Complete Distances CSV",
        }
    }

    pub fn columns(self) -> &'static [&'static str] {
        match self {
            TableKind::Ports => &PORT_COLUMNS,
            TableKind::Rules => &RULE_COLUMNS,
            TableKind::Segments => &SEGMENT_COLUMNS,
            TableKind::CompleteDistances => &COMPLETE_DISTANCE_COLUMNS,
        }
    }

    /// File looked up in the default CSV directory when no path is given.
    pub fn default_file_name(self) -> &'static str {
        match self {
            TableKind::Ports => "ports.csv",
            TableKind::Rules => "rules.csv",
            TableKind::Segments => "distances-arw.csv",
            TableKind::CompleteDistances => "complete-distances.csv",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub table: TableKind,
    /// Data rows read, whatever happened to them afterwards.
    pub total_rows: usize,
    /// Rows that made it into the table.
    pub kept_rows: usize,
    /// Rows the CSV decoder could not read at all.
    pub parse_errors: usize,
}

/// Compare a header row against the expected columns, cell by cell after trimming.
pub fn validate_headers(actual: &[String], kind: TableKind) -> Result<()> {
    if actual.is_empty() {
        return Err(Error::EmptyHeaders {
            table: kind.label(),
        });
    }
    let trimmed: Vec<String> = actual
        .iter()
        .map(|h| clean_header(h).to_string())
        .collect();
    let expected = kind.columns();
    if trimmed.len() != expected.len() || trimmed.iter().zip(expected).any(|(a, e)| a != e) {
        return Err(Error::HeaderMismatch {
            table: kind.label(),
            expected: expected.iter().map(|c| c.to_string()).collect(),
            actual: trimmed,
        });
    }
    Ok(())
}

/// Header cell as compared and as used for field names.
fn clean_header(cell: &str) -> &str {
    cell.trim_start_matches('\u{feff}').trim()
}

/// Decode each cell on its own; invalid UTF-8 only degrades the cell it is in.
fn lossy_record(record: &ByteRecord) -> StringRecord {
    record.iter().map(String::from_utf8_lossy).collect()
}

/// Read and decode every data row of a table after checking its header.
///
/// The header check is the only thing that fails the whole load. A row the
/// deserializer still rejects is counted and skipped.
fn read_rows<R, T>(reader: R, kind: TableKind) -> Result<(Vec<T>, usize, usize)>
where
    R: Read,
    T: DeserializeOwned,
{
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(reader);
    let raw: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    validate_headers(&raw, kind)?;
    let headers: StringRecord = raw.iter().map(|h| clean_header(h)).collect();

    let mut rows = Vec::new();
    let mut total_rows = 0usize;
    let mut parse_errors = 0usize;
    for result in rdr.byte_records() {
        total_rows += 1;
        let decoded: Result<T> = result.map_err(Error::from).and_then(|record| {
            lossy_record(&record)
                .deserialize(Some(&headers))
                .map_err(Error::from)
        });
        match decoded {
            Ok(row) => rows.push(row),
            Err(e) => {
                parse_errors += 1;
                warn!(
                    table = kind.label(),
                    row = total_rows,
                    error = %e,
                    "skipping unreadable row"
                );
            }
        }
    }
    Ok((rows, total_rows, parse_errors))
}

fn log_report(report: &LoadReport) {
    info!(
        table = report.table.label(),
        rows = report.total_rows,
        kept = report.kept_rows,
        parse_errors = report.parse_errors,
        "table loaded"
    );
}

pub fn read_ports<R: Read>(reader: R, include_inactive: bool) -> Result<(PortTable, LoadReport)> {
    let (rows, total_rows, parse_errors) = read_rows::<_, PortRow>(reader, TableKind::Ports)?;
    let table = PortTable::build(rows.iter().map(Port::from_row), total_rows, include_inactive);
    let report = LoadReport {
        table: TableKind::Ports,
        total_rows,
        kept_rows: table.len(),
        parse_errors,
    };
    log_report(&report);
    Ok((table, report))
}

pub fn read_rules<R: Read>(reader: R) -> Result<(RuleTable, LoadReport)> {
    let (rows, total_rows, parse_errors) = read_rows::<_, RuleRow>(reader, TableKind::Rules)?;
    let rules: Vec<DistanceRule> = rows.iter().map(DistanceRule::from_row).collect();
    let report = LoadReport {
        table: TableKind::Rules,
        total_rows,
        kept_rows: rules.len(),
        parse_errors,
    };
    log_report(&report);
    let mut table = RuleTable::new(rules);
    table.set_total_rows(total_rows);
    Ok((table, report))
}

pub fn read_segments<R: Read>(reader: R) -> Result<(SegmentTable, LoadReport)> {
    let (rows, total_rows, parse_errors) =
        read_rows::<_, SegmentRow>(reader, TableKind::Segments)?;
    let mut table = SegmentTable::new();
    let mut kept_rows = 0usize;
    for row in &rows {
        let load_id = normalize_opt(row.load_port_id.as_deref());
        let disch_id = normalize_opt(row.disch_port_id.as_deref());
        if table.insert(&load_id, &disch_id, Segment::from_row(row)) {
            kept_rows += 1;
        }
    }
    table.set_total_rows(total_rows);
    let report = LoadReport {
        table: TableKind::Segments,
        total_rows,
        kept_rows,
        parse_errors,
    };
    log_report(&report);
    Ok((table, report))
}

pub fn read_complete_distances<R: Read>(reader: R) -> Result<(PairTable, LoadReport)> {
    let (rows, total_rows, parse_errors) =
        read_rows::<_, CompleteDistanceRow>(reader, TableKind::CompleteDistances)?;
    let mut table = PairTable::new();
    let mut kept_rows = 0usize;
    for row in &rows {
        let load_id = normalize_opt(row.load_port_id.as_deref());
        let disch_id = normalize_opt(row.disch_port_id.as_deref());
        if table.insert(&load_id, &disch_id) {
            kept_rows += 1;
        }
    }
    table.set_total_rows(total_rows);
    let report = LoadReport {
        table: TableKind::CompleteDistances,
        total_rows,
        kept_rows,
        parse_errors,
    };
    log_report(&report);
    Ok((table, report))
}

pub fn open_table(path: &Path) -> Result<File> {
    Ok(File::open(path)?)
}

/// Build the three tables the rule-driven scan needs. Any header failure
/// aborts the whole build.
pub fn build_reference_tables<P, R, S>(
    ports: P,
    rules: R,
    segments: S,
    include_inactive: bool,
) -> Result<ReferenceTables>
where
    P: Read,
    R: Read,
    S: Read,
{
    let (ports, _) = read_ports(ports, include_inactive)?;
    let (rules, _) = read_rules(rules)?;
    let (segments, _) = read_segments(segments)?;
    Ok(ReferenceTables {
        ports: Arc::new(ports),
        rules: Arc::new(rules),
        segments: Arc::new(segments),
    })
}

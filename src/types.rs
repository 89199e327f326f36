use crate::util::{as_bool, as_number, normalize_opt, parse_datetime_safe, text};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use tabled::Tabled;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PortRow {
    pub id: Option<String>,
    pub port: Option<String>,
    pub load: Option<String>,
    pub region_id: Option<String>,
    pub mgo_at_port: Option<String>,
    pub port_country_id: Option<String>,
    pub port_code: Option<String>,
    pub port_type: Option<String>,
    pub is_active_port: Option<String>,
    pub coordinates: Option<String>,
    pub port_nickname: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RuleRow {
    pub id: Option<String>,
    pub distance_rule_name: Option<String>,
    pub order_of_priority: Option<String>,
    pub zone_start_id: Option<String>,
    pub zone_end_id: Option<String>,
    pub waypoint1_id: Option<String>,
    pub waypoint2_id: Option<String>,
    pub waypoint3_id: Option<String>,
    pub waypoint4_id: Option<String>,
    pub waypoint5_id: Option<String>,
    pub waypoint6_id: Option<String>,
    pub discount_suez_ballast: Option<String>,
    pub discount_suez_laden: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SegmentRow {
    pub id: Option<String>,
    pub load_port_id: Option<String>,
    pub disch_port_id: Option<String>,
    pub total_distance: Option<String>,
    pub total_seca_distance: Option<String>,
    pub waypoint_data: Option<String>,
    pub updated_at: Option<String>,
    pub by_panama_canal_rp: Option<String>,
    pub by_gibraltar_strait_rp: Option<String>,
    pub by_cape_good_hope_rp: Option<String>,
    pub by_magellan_strait_rp: Option<String>,
    pub by_cape_horn_rp: Option<String>,
    pub by_singapore_strait_rp: Option<String>,
    pub by_torres_strait_rp: Option<String>,
    pub by_vitiaz_strait_rp: Option<String>,
    pub by_kiel_canal_rp: Option<String>,
    pub by_skaw_area_rp: Option<String>,
    pub by_suez_canal_rp: Option<String>,
    pub by_gulf_of_aden_rp: Option<String>,
    pub by_sunda_strait_rp: Option<String>,
    pub by_bosporus_strait_rp: Option<String>,
    pub by_malacca_strait_rp: Option<String>,
}

/// Only the endpoints of a complete-distance row matter to the pair check;
/// the remaining columns are validated through the header but not read.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CompleteDistanceRow {
    pub id: Option<String>,
    pub load_port_id: Option<String>,
    pub disch_port_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Port {
    pub id: String,
    pub name: String,
    pub is_load: bool,
    pub zone_id: String,
    pub is_active: bool,
    pub mgo_at_port: bool,
    pub country_id: String,
    pub port_code: String,
    pub port_type: String,
    pub coordinates: String,
    pub nickname: String,
    pub updated_at: Option<NaiveDateTime>,
}

impl Port {
    pub fn from_row(row: &PortRow) -> Self {
        Port {
            id: normalize_opt(row.id.as_deref()),
            name: row.port.clone().unwrap_or_default(),
            is_load: as_bool(row.load.as_deref()),
            zone_id: normalize_opt(row.region_id.as_deref()),
            is_active: as_bool(row.is_active_port.as_deref()),
            mgo_at_port: as_bool(row.mgo_at_port.as_deref()),
            country_id: normalize_opt(row.port_country_id.as_deref()),
            port_code: text(row.port_code.as_deref()),
            port_type: text(row.port_type.as_deref()),
            coordinates: text(row.coordinates.as_deref()),
            nickname: text(row.port_nickname.as_deref()),
            updated_at: parse_datetime_safe(row.updated_at.as_deref()),
        }
    }
}

/// Priority given to rules whose `order_of_priority` cannot be read.
pub const DEFAULT_PRIORITY: i64 = 999;

#[derive(Debug, Clone, Serialize)]
pub struct DistanceRule {
    pub id: String,
    pub name: String,
    /// Lower runs first.
    pub priority: i64,
    pub zone_start: String,
    pub zone_end: String,
    /// Declared order, empty cells removed.
    pub waypoints: Vec<String>,
    pub discount_ballast: f64,
    pub discount_laden: f64,
}

impl DistanceRule {
    pub fn from_row(row: &RuleRow) -> Self {
        let waypoints = [
            &row.waypoint1_id,
            &row.waypoint2_id,
            &row.waypoint3_id,
            &row.waypoint4_id,
            &row.waypoint5_id,
            &row.waypoint6_id,
        ]
        .into_iter()
        .map(|cell| normalize_opt(cell.as_deref()))
        .filter(|id| !id.is_empty())
        .collect();

        let priority = crate::util::parse_f64_safe(row.order_of_priority.as_deref())
            .filter(|p| p.is_finite())
            .map(|p| p.trunc() as i64)
            .unwrap_or(DEFAULT_PRIORITY);

        DistanceRule {
            id: normalize_opt(row.id.as_deref()),
            name: row.distance_rule_name.clone().unwrap_or_default(),
            priority,
            zone_start: normalize_opt(row.zone_start_id.as_deref()),
            zone_end: normalize_opt(row.zone_end_id.as_deref()),
            waypoints,
            discount_ballast: as_number(row.discount_suez_ballast.as_deref()),
            discount_laden: as_number(row.discount_suez_laden.as_deref()),
        }
    }
}

/// Straits and canals a reported leg passes through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RouteFlags {
    pub panama: bool,
    pub gibraltar: bool,
    pub cape_good_hope: bool,
    pub magellan: bool,
    pub cape_horn: bool,
    pub singapore: bool,
    pub torres: bool,
    pub vitiaz: bool,
    pub kiel: bool,
    pub skaw: bool,
    pub suez: bool,
    pub gulf_of_aden: bool,
    pub sunda: bool,
    pub bosporus: bool,
    pub malacca: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Segment {
    pub id: String,
    pub total_distance: f64,
    pub seca_distance: f64,
    pub waypoint_data: String,
    pub updated_at: Option<NaiveDateTime>,
    pub flags: RouteFlags,
}

impl Segment {
    pub fn from_row(row: &SegmentRow) -> Self {
        let flag = |cell: &Option<String>| as_bool(cell.as_deref());
        Segment {
            id: normalize_opt(row.id.as_deref()),
            total_distance: as_number(row.total_distance.as_deref()),
            seca_distance: as_number(row.total_seca_distance.as_deref()),
            waypoint_data: text(row.waypoint_data.as_deref()),
            updated_at: parse_datetime_safe(row.updated_at.as_deref()),
            flags: RouteFlags {
                panama: flag(&row.by_panama_canal_rp),
                gibraltar: flag(&row.by_gibraltar_strait_rp),
                cape_good_hope: flag(&row.by_cape_good_hope_rp),
                magellan: flag(&row.by_magellan_strait_rp),
                cape_horn: flag(&row.by_cape_horn_rp),
                singapore: flag(&row.by_singapore_strait_rp),
                torres: flag(&row.by_torres_strait_rp),
                vitiaz: flag(&row.by_vitiaz_strait_rp),
                kiel: flag(&row.by_kiel_canal_rp),
                skaw: flag(&row.by_skaw_area_rp),
                suez: flag(&row.by_suez_canal_rp),
                gulf_of_aden: flag(&row.by_gulf_of_aden_rp),
                sunda: flag(&row.by_sunda_strait_rp),
                bosporus: flag(&row.by_bosporus_strait_rp),
                malacca: flag(&row.by_malacca_strait_rp),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingReason {
    NoRule,
    MissingSegments,
}

impl fmt::Display for MissingReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingReason::NoRule => f.write_str("no_rule"),
            MissingReason::MissingSegments => f.write_str("missing_segments"),
        }
    }
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct MissingSegmentRow {
    #[serde(rename = "From port name")]
    #[tabled(rename = "From port name")]
    pub from_name: String,
    #[serde(rename = "From port id")]
    #[tabled(rename = "From port id")]
    pub from_id: String,
    #[serde(rename = "To port name")]
    #[tabled(rename = "To port name")]
    pub to_name: String,
    #[serde(rename = "To port id")]
    #[tabled(rename = "To port id")]
    pub to_id: String,
    #[serde(rename = "Rule name")]
    #[tabled(rename = "Rule name")]
    pub rule_name: String,
    #[serde(rename = "Rule id")]
    #[tabled(rename = "Rule id")]
    pub rule_id: String,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct MissingCompleteRow {
    #[serde(rename = "Disch port name")]
    #[tabled(rename = "Disch port name")]
    pub disch_name: String,
    #[serde(rename = "Disch port id")]
    #[tabled(rename = "Disch port id")]
    pub disch_id: String,
    #[serde(rename = "Load port name")]
    #[tabled(rename = "Load port name")]
    pub load_name: String,
    #[serde(rename = "Load port id")]
    #[tabled(rename = "Load port id")]
    pub load_id: String,
    #[serde(rename = "Rule name")]
    #[tabled(rename = "Rule name")]
    pub rule_name: String,
    #[serde(rename = "Priority")]
    #[tabled(rename = "Priority", display_with = "display_priority")]
    pub priority: Option<i64>,
    #[serde(rename = "Reason")]
    #[tabled(rename = "Reason")]
    pub reason: MissingReason,
}

pub fn display_priority(priority: &Option<i64>) -> String {
    priority.map(|p| p.to_string()).unwrap_or_default()
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct MissingPairRow {
    #[serde(rename = "Load port name")]
    #[tabled(rename = "Load port name")]
    pub load_name: String,
    #[serde(rename = "Load port id")]
    #[tabled(rename = "Load port id")]
    pub load_id: String,
    #[serde(rename = "Disch port name")]
    #[tabled(rename = "Disch port name")]
    pub disch_name: String,
    #[serde(rename = "Disch port id")]
    #[tabled(rename = "Disch port id")]
    pub disch_id: String,
}

#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct ComplexSummary {
    pub total_ports_rows: usize,
    pub total_load_ports: usize,
    pub total_disch_ports: usize,
    pub total_rules_rows: usize,
    pub total_segments_rows: usize,
    pub expected_complete: usize,
    pub generated_complete: usize,
    pub missing_segments: usize,
    pub missing_complete: usize,
}

#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct SimpleSummary {
    pub total_ports_rows: usize,
    pub total_load_ports: usize,
    pub total_disch_ports: usize,
    pub total_distance_rows: usize,
    pub total_distances: usize,
    pub found: usize,
    pub missing: usize,
}

/// Rule-driven scan output.
#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct ComplexReport {
    pub summary: ComplexSummary,
    pub missing_segments: Vec<MissingSegmentRow>,
    pub missing_complete: Vec<MissingCompleteRow>,
}

/// Pair-existence scan output.
#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct SimpleReport {
    pub summary: SimpleSummary,
    pub missing: Vec<MissingPairRow>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AnalysisResult {
    Complex(ComplexReport),
    Simple(SimpleReport),
}

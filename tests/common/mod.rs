//! CSV fixture builders shared by the integration tests.
#![allow(dead_code)]

use port_distances::loader::{
    COMPLETE_DISTANCE_COLUMNS, PORT_COLUMNS, RULE_COLUMNS, SEGMENT_COLUMNS,
};
use port_distances::{build_reference_tables, ReferenceTables};

/// `(id, name, is_load, zone)`; every port is active.
pub type PortSpec<'a> = (&'a str, &'a str, bool, &'a str);

/// `(id, name, priority, zone_start, zone_end, waypoints)`.
pub type RuleSpec<'a> = (&'a str, &'a str, &'a str, &'a str, &'a str, &'a [&'a str]);

fn bool_cell(value: bool) -> &'static str {
    if value {
        "TRUE"
    } else {
        "FALSE"
    }
}

pub fn port_line(id: &str, name: &str, is_load: bool, zone: &str, active: bool) -> String {
    format!(
        "{id},{name},{},{zone},FALSE,58,CODE,P,{},\"6.3,2.4\",{name},2025-10-14 16:23:10",
        bool_cell(is_load),
        bool_cell(active)
    )
}

pub fn ports_csv(ports: &[PortSpec<'_>]) -> String {
    let mut out = PORT_COLUMNS.join(",");
    for (id, name, is_load, zone) in ports {
        out.push('\n');
        out.push_str(&port_line(id, name, *is_load, zone, true));
    }
    out.push('\n');
    out
}

pub fn rules_csv(rules: &[RuleSpec<'_>]) -> String {
    let mut out = RULE_COLUMNS.join(",");
    for (id, name, priority, start, end, waypoints) in rules {
        let mut cells: Vec<&str> = waypoints.to_vec();
        cells.resize(6, "");
        out.push_str(&format!(
            "\n{id},{name},{priority},{start},{end},{},0,0",
            cells.join(",")
        ));
    }
    out.push('\n');
    out
}

/// Legs as stored, `(load_port_id, disch_port_id)`.
pub fn segments_csv(legs: &[(&str, &str)]) -> String {
    let flags = vec!["FALSE"; 15].join(",");
    let mut out = SEGMENT_COLUMNS.join(",");
    for (i, (load, disch)) in legs.iter().enumerate() {
        out.push_str(&format!(
            "\n{},{load},{disch},1000.0,10.0,,2025-01-01 00:00:00,{flags}",
            i + 1
        ));
    }
    out.push('\n');
    out
}

/// Complete distances as stored, `(load_port_id, disch_port_id)`.
pub fn pairs_csv(pairs: &[(&str, &str)]) -> String {
    let flags = vec!["FALSE"; 14].join(",");
    let mut out = COMPLETE_DISTANCE_COLUMNS.join(",");
    for (i, (load, disch)) in pairs.iter().enumerate() {
        out.push_str(&format!(
            "\n{},{load},{disch},21400.290,1057.780,{flags},0.000,1,TRUE",
            i + 1
        ));
    }
    out.push('\n');
    out
}

pub fn tables(
    ports: &[PortSpec<'_>],
    rules: &[RuleSpec<'_>],
    legs: &[(&str, &str)],
) -> ReferenceTables {
    build_reference_tables(
        ports_csv(ports).as_bytes(),
        rules_csv(rules).as_bytes(),
        segments_csv(legs).as_bytes(),
        false,
    )
    .expect("fixture tables build")
}

use crate::error::{Error, Result};
use crate::matcher::find_rules_for_pair;
use crate::resolver::resolve_route;
use crate::segments::leg_key;
use crate::tables::{PairTable, PortTable, ReferenceTables, ScanMode};
use crate::types::{
    ComplexReport, ComplexSummary, MissingCompleteRow, MissingPairRow, MissingReason,
    MissingSegmentRow, SimpleReport, SimpleSummary,
};
use std::collections::HashSet;
use tracing::debug;

/// Pair checks between two progress reports (and cancellation checks).
pub const PROGRESS_CHUNK: usize = 200;

/// Receives progress from a running scan and may ask it to stop.
///
/// Both calls happen only at chunk boundaries, never inside route resolution.
pub trait ScanObserver {
    /// Percentage of pairs checked so far, `0..=100`, never decreasing.
    fn progress(&mut self, percent: u8);

    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Observer that ignores progress and never cancels.
impl ScanObserver for () {
    fn progress(&mut self, _percent: u8) {}
}

struct ProgressTracker {
    total: usize,
    checked: usize,
}

impl ProgressTracker {
    fn new(total_pairs: usize) -> Self {
        ProgressTracker {
            total: total_pairs.max(1),
            checked: 0,
        }
    }

    fn tick<O: ScanObserver + ?Sized>(&mut self, observer: &mut O) -> Result<()> {
        self.checked += 1;
        if self.checked % PROGRESS_CHUNK == 0 || self.checked == self.total {
            if observer.is_cancelled() {
                return Err(Error::Cancelled);
            }
            let percent = (self.checked * 100 / self.total).min(100) as u8;
            observer.progress(percent);
        }
        Ok(())
    }
}

/// Verify every discharge x load pair against the rules and segments.
///
/// Pairs are visited discharge-major. Every matched rule counts towards the
/// expected total; a pair with no rule at all gets one `no_rule` entry.
/// Missing legs are listed once, labelled with the first rule that needed them.
pub fn run_complex_analysis<O>(tables: &ReferenceTables, observer: &mut O) -> Result<ComplexReport>
where
    O: ScanObserver + ?Sized,
{
    let ports = &tables.ports;
    let load_ports = ports.load_ports();
    let disch_ports = ports.disch_ports(ScanMode::Complex);
    debug!(
        load_ports = load_ports.len(),
        disch_ports = disch_ports.len(),
        rules = tables.rules.len(),
        "starting complex analysis"
    );

    let mut seen_legs: HashSet<String> = HashSet::new();
    let mut missing_segments: Vec<MissingSegmentRow> = Vec::new();
    let mut missing_complete: Vec<MissingCompleteRow> = Vec::new();
    let mut expected_complete = 0usize;
    let mut generated_complete = 0usize;
    let mut tracker = ProgressTracker::new(load_ports.len() * disch_ports.len());

    for disch in &disch_ports {
        for load in &load_ports {
            let matches = find_rules_for_pair(&tables.rules, disch, load);
            if matches.is_empty() {
                missing_complete.push(MissingCompleteRow {
                    disch_name: disch.name.clone(),
                    disch_id: disch.id.clone(),
                    load_name: load.name.clone(),
                    load_id: load.id.clone(),
                    rule_name: String::new(),
                    priority: None,
                    reason: MissingReason::NoRule,
                });
            }
            for m in matches {
                expected_complete += 1;
                let resolution =
                    resolve_route(disch, load, m.rule, m.is_reversed, ports, &tables.segments);
                if resolution.resolved {
                    generated_complete += 1;
                    continue;
                }
                missing_complete.push(MissingCompleteRow {
                    disch_name: disch.name.clone(),
                    disch_id: disch.id.clone(),
                    load_name: load.name.clone(),
                    load_id: load.id.clone(),
                    rule_name: m.rule.name.clone(),
                    priority: Some(m.rule.priority),
                    reason: MissingReason::MissingSegments,
                });
                for (from_id, to_id) in resolution.missing_legs {
                    if !seen_legs.insert(leg_key(&from_id, &to_id)) {
                        continue;
                    }
                    missing_segments.push(MissingSegmentRow {
                        from_name: ports.name_of(&from_id).to_string(),
                        to_name: ports.name_of(&to_id).to_string(),
                        from_id,
                        to_id,
                        rule_name: m.rule.name.clone(),
                        rule_id: m.rule.id.clone(),
                    });
                }
            }
            tracker.tick(observer)?;
        }
    }

    let summary = ComplexSummary {
        total_ports_rows: ports.total_rows(),
        total_load_ports: load_ports.len(),
        total_disch_ports: disch_ports.len(),
        total_rules_rows: tables.rules.total_rows(),
        total_segments_rows: tables.segments.total_rows(),
        expected_complete,
        generated_complete,
        missing_segments: missing_segments.len(),
        missing_complete: missing_complete.len(),
    };
    debug!(?summary, "complex analysis finished");
    Ok(ComplexReport {
        summary,
        missing_segments,
        missing_complete,
    })
}

/// Check every load x non-load pair against the precomputed pair set.
///
/// Pairs are visited load-major; a port is never paired with itself.
pub fn run_simple_analysis<O>(
    ports: &PortTable,
    pairs: &PairTable,
    total_rows: usize,
    observer: &mut O,
) -> Result<SimpleReport>
where
    O: ScanObserver + ?Sized,
{
    let load_ports = ports.load_ports();
    let disch_ports = ports.disch_ports(ScanMode::Simple);
    debug!(
        load_ports = load_ports.len(),
        disch_ports = disch_ports.len(),
        pairs = pairs.len(),
        "starting simple analysis"
    );

    let mut missing: Vec<MissingPairRow> = Vec::new();
    let mut found = 0usize;
    let mut tracker = ProgressTracker::new(load_ports.len() * disch_ports.len());

    for load in &load_ports {
        for disch in &disch_ports {
            if load.id != disch.id {
                if pairs.contains_either(&load.id, &disch.id) {
                    found += 1;
                } else {
                    missing.push(MissingPairRow {
                        load_name: load.name.clone(),
                        load_id: load.id.clone(),
                        disch_name: disch.name.clone(),
                        disch_id: disch.id.clone(),
                    });
                }
            }
            tracker.tick(observer)?;
        }
    }

    let summary = SimpleSummary {
        total_ports_rows: ports.total_rows(),
        total_load_ports: load_ports.len(),
        total_disch_ports: disch_ports.len(),
        total_distance_rows: total_rows,
        total_distances: pairs.len(),
        found,
        missing: missing.len(),
    };
    debug!(?summary, "simple analysis finished");
    Ok(SimpleReport { summary, missing })
}

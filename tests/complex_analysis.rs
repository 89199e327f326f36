mod common;

use common::tables;
use port_distances::types::MissingReason;
use port_distances::{run_complex_analysis, ScanObserver};

#[test]
fn direct_rule_without_segment_is_reported_once() {
    // A is the load port (zone 1), B a discharge-only port (zone 2).
    let t = tables(
        &[("A", "ALPHA", true, "1"), ("B", "BRAVO", false, "2")],
        &[("1", "Direct", "1", "1", "2", &[])],
        &[],
    );
    let report = run_complex_analysis(&t, &mut ()).unwrap();

    // Pair (disch B, load A): zones (2, 1) match the rule reversed.
    let s = &report.summary;
    assert_eq!(s.expected_complete, 1);
    assert_eq!(s.generated_complete, 0);

    // Pair (disch A, load A) has zones (1, 1): no rule.
    let reasons: Vec<(&str, &str, MissingReason)> = report
        .missing_complete
        .iter()
        .map(|r| (r.disch_id.as_str(), r.load_id.as_str(), r.reason))
        .collect();
    assert_eq!(
        reasons,
        [
            ("A", "A", MissingReason::NoRule),
            ("B", "A", MissingReason::MissingSegments),
        ]
    );
    assert_eq!(report.missing_complete[1].rule_name, "Direct");
    assert_eq!(report.missing_complete[1].priority, Some(1));
    assert_eq!(report.missing_complete[0].priority, None);

    assert_eq!(report.missing_segments.len(), 1);
    let leg = &report.missing_segments[0];
    assert_eq!((leg.from_id.as_str(), leg.to_id.as_str()), ("A", "B"));
    assert_eq!((leg.from_name.as_str(), leg.to_name.as_str()), ("ALPHA", "BRAVO"));
    assert_eq!((leg.rule_name.as_str(), leg.rule_id.as_str()), ("Direct", "1"));
}

#[test]
fn direct_rule_resolves_from_either_stored_direction() {
    for legs in [[("A", "B")], [("B", "A")]] {
        let t = tables(
            &[("A", "ALPHA", true, "1"), ("B", "BRAVO", false, "2")],
            &[("1", "Direct", "1", "2", "1", &[])],
            &legs,
        );
        let report = run_complex_analysis(&t, &mut ()).unwrap();
        assert_eq!(report.summary.generated_complete, 1, "{legs:?}");
        assert!(report.missing_segments.is_empty());
    }
}

#[test]
fn waypoint_route_generates_a_complete_distance() {
    // Load port L in zone 2, discharge port D in zone 1, waypoint W in zone 9.
    let t = tables(
        &[
            ("L", "LOAD", true, "2"),
            ("D", "DISCH", false, "1"),
            ("W", "WAYPOINT", false, "9"),
        ],
        &[("5", "Via W", "1", "1", "2", &["W"])],
        &[("D", "W"), ("W", "L")],
    );
    let report = run_complex_analysis(&t, &mut ()).unwrap();
    assert_eq!(report.summary.expected_complete, 1);
    assert_eq!(report.summary.generated_complete, 1);
    assert!(report.missing_segments.is_empty());
    assert!(report
        .missing_complete
        .iter()
        .all(|r| r.reason == MissingReason::NoRule));
}

#[test]
fn shared_missing_leg_is_listed_once() {
    let t = tables(
        &[
            ("L", "LOAD", true, "2"),
            ("D", "DISCH", false, "1"),
            ("W", "WAYPOINT", false, "9"),
        ],
        &[
            ("10", "First", "1", "1", "2", &["W"]),
            ("11", "Second", "2", "1", "2", &["W"]),
        ],
        &[("W", "L")],
    );
    let report = run_complex_analysis(&t, &mut ()).unwrap();
    assert_eq!(report.summary.expected_complete, 2);
    assert_eq!(report.summary.generated_complete, 0);
    let failing: Vec<&str> = report
        .missing_complete
        .iter()
        .filter(|r| r.reason == MissingReason::MissingSegments)
        .map(|r| r.rule_name.as_str())
        .collect();
    assert_eq!(failing, ["First", "Second"]);

    assert_eq!(report.missing_segments.len(), 1);
    let leg = &report.missing_segments[0];
    assert_eq!((leg.from_id.as_str(), leg.to_id.as_str()), ("D", "W"));
    assert_eq!(leg.rule_name, "First");
    assert_eq!(report.summary.missing_segments, 1);
}

#[test]
fn reversed_rule_walks_waypoints_backwards() {
    // Rule declared zone 2 -> zone 1 with waypoints X, Y. For disch zone 1 /
    // load zone 2 it matches reversed, so the route is D -> Y -> X -> L.
    let t = tables(
        &[
            ("L", "LOAD", true, "2"),
            ("D", "DISCH", false, "1"),
            ("X", "X", false, "9"),
            ("Y", "Y", false, "9"),
        ],
        &[("1", "Reverse", "1", "2", "1", &["X", "Y"])],
        &[("D", "Y"), ("Y", "X")],
    );
    let report = run_complex_analysis(&t, &mut ()).unwrap();
    let leg = &report.missing_segments[0];
    assert_eq!((leg.from_id.as_str(), leg.to_id.as_str()), ("X", "L"));
}

#[test]
fn repeated_scan_gives_identical_results() {
    let t = tables(
        &[
            ("L1", "LOAD 1", true, "2"),
            ("L2", "LOAD 2", true, "3"),
            ("D", "DISCH", false, "1"),
            ("W", "WAYPOINT", false, "9"),
        ],
        &[
            ("1", "Via W", "1", "1", "2", &["W"]),
            ("2", "Direct", "3", "1", "3", &[]),
        ],
        &[("D", "W")],
    );
    let first = run_complex_analysis(&t, &mut ()).unwrap();
    let second = run_complex_analysis(&t, &mut ()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn summary_counts_every_table() {
    let t = tables(
        &[("A", "ALPHA", true, "1"), ("B", "BRAVO", false, "2")],
        &[("1", "Direct", "1", "1", "2", &[])],
        &[("A", "B"), ("", "B")],
    );
    let s = run_complex_analysis(&t, &mut ()).unwrap().summary;
    assert_eq!(s.total_ports_rows, 2);
    assert_eq!(s.total_load_ports, 1);
    assert_eq!(s.total_disch_ports, 2);
    assert_eq!(s.total_rules_rows, 1);
    assert_eq!(s.total_segments_rows, 2);
    assert_eq!(s.missing_complete, 1);
}

struct Collect(Vec<u8>);

impl ScanObserver for Collect {
    fn progress(&mut self, percent: u8) {
        self.0.push(percent);
    }
}

#[test]
fn progress_climbs_to_one_hundred() {
    let ports: Vec<(String, bool)> = (0..30).map(|i| (format!("P{i}"), i % 2 == 0)).collect();
    let specs: Vec<(&str, &str, bool, &str)> = ports
        .iter()
        .map(|(id, is_load)| (id.as_str(), id.as_str(), *is_load, "1"))
        .collect();
    let t = tables(&specs, &[], &[]);
    let mut observer = Collect(Vec::new());
    let report = run_complex_analysis(&t, &mut observer).unwrap();

    // 30 disch x 15 load = 450 pairs.
    assert_eq!(report.missing_complete.len(), 450);
    assert_eq!(observer.0, [44, 88, 100]);
}

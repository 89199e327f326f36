mod common;

use common::{pairs_csv, ports_csv};
use port_distances::loader::{read_complete_distances, read_ports};
use port_distances::run_simple_analysis;

#[test]
fn pairs_are_found_in_either_direction() {
    let (ports, _) = read_ports(
        ports_csv(&[
            ("1", "LOAD ONE", true, "1"),
            ("2", "LOAD TWO", true, "1"),
            ("10", "DISCH TEN", false, "2"),
            ("11", "DISCH ELEVEN", false, "2"),
        ])
        .as_bytes(),
        false,
    )
    .unwrap();
    let (pairs, load) = read_complete_distances(
        pairs_csv(&[("1", "10"), ("11", "2.0"), ("1", "10"), ("", "11")]).as_bytes(),
    )
    .unwrap();
    assert_eq!(load.total_rows, 4);
    assert_eq!(pairs.len(), 2);

    let report = run_simple_analysis(&ports, &pairs, load.total_rows, &mut ()).unwrap();
    let s = &report.summary;
    assert_eq!(s.total_load_ports, 2);
    assert_eq!(s.total_disch_ports, 2);
    assert_eq!(s.total_distance_rows, 4);
    assert_eq!(s.total_distances, 2);
    assert_eq!(s.found, 2);
    assert_eq!(s.missing, 2);

    // Load-major order.
    let missing: Vec<(&str, &str)> = report
        .missing
        .iter()
        .map(|r| (r.load_id.as_str(), r.disch_id.as_str()))
        .collect();
    assert_eq!(missing, [("1", "11"), ("2", "10")]);
    assert_eq!(report.missing[0].load_name, "LOAD ONE");
    assert_eq!(report.missing[0].disch_name, "DISCH ELEVEN");
}

#[test]
fn discharge_side_excludes_load_ports() {
    let (ports, _) = read_ports(
        ports_csv(&[("1", "LOAD", true, "1"), ("2", "LOAD TOO", true, "1")]).as_bytes(),
        false,
    )
    .unwrap();
    let (pairs, load) = read_complete_distances(pairs_csv(&[]).as_bytes()).unwrap();
    let report = run_simple_analysis(&ports, &pairs, load.total_rows, &mut ()).unwrap();
    assert_eq!(report.summary.total_disch_ports, 0);
    assert!(report.missing.is_empty());
}

struct Collect(Vec<u8>);

impl port_distances::ScanObserver for Collect {
    fn progress(&mut self, percent: u8) {
        self.0.push(percent);
    }
}

#[test]
fn a_port_listed_as_load_and_disch_is_never_paired_with_itself() {
    let (ports, _) = read_ports(
        ports_csv(&[
            ("1", "ONE", true, "1"),
            ("1", "ONE AGAIN", false, "1"),
            ("2", "TWO", false, "1"),
        ])
        .as_bytes(),
        false,
    )
    .unwrap();
    let (pairs, load) = read_complete_distances(pairs_csv(&[("1", "2")]).as_bytes()).unwrap();

    let mut observer = Collect(Vec::new());
    let report = run_simple_analysis(&ports, &pairs, load.total_rows, &mut observer).unwrap();
    assert_eq!(report.summary.total_load_ports, 1);
    assert_eq!(report.summary.total_disch_ports, 2);
    assert_eq!(report.summary.found, 1);
    assert_eq!(report.summary.missing, 0);
    assert!(report.missing.iter().all(|r| r.load_id != r.disch_id));
    assert_eq!(observer.0, [100]);
}

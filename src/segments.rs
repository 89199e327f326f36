//! Segment table and direction-agnostic leg lookup.

use crate::types::Segment;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Stand-in for a leg whose two ends are the same port: unit distance, no
/// SECA miles, no straits. It reports "segment exists" without implying a
/// free zero-length hop.
static SELF_LEG: Lazy<Segment> = Lazy::new(|| Segment {
    total_distance: 1.0,
    seca_distance: 0.0,
    ..Segment::default()
});

/// Key under which a leg is stored and deduplicated: `"{from}:{to}"`.
pub fn leg_key(from_id: &str, to_id: &str) -> String {
    format!("{}:{}", from_id, to_id)
}

#[derive(Debug, Clone, Default)]
pub struct SegmentTable {
    segments: HashMap<String, Segment>,
    total_rows: usize,
}

impl SegmentTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a leg in its construction direction (`load -> disch`).
    ///
    /// Returns `false` and stores nothing when either endpoint is empty.
    /// A later insert under the same key replaces the earlier one.
    pub fn insert(&mut self, load_id: &str, disch_id: &str, segment: Segment) -> bool {
        if load_id.is_empty() || disch_id.is_empty() {
            return false;
        }
        self.segments.insert(leg_key(load_id, disch_id), segment);
        true
    }

    pub(crate) fn set_total_rows(&mut self, total_rows: usize) {
        self.total_rows = total_rows;
    }

    /// Number of CSV rows read, including dropped ones.
    pub fn total_rows(&self) -> usize {
        self.total_rows
    }

    /// Number of distinct stored keys.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Resolve a leg, trying `from:to` and then `to:from`.
    ///
    /// A self-leg (`from == to`) always resolves to the unit segment, even
    /// when the port never appears in the table.
    pub fn lookup(&self, from_id: &str, to_id: &str) -> Option<&Segment> {
        if from_id == to_id {
            return Some(&*SELF_LEG);
        }
        self.segments
            .get(&leg_key(from_id, to_id))
            .or_else(|| self.segments.get(&leg_key(to_id, from_id)))
    }
}

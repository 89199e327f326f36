//! Typed reference tables shared by both analysis modes.

use crate::segments::SegmentTable;
use crate::types::{DistanceRule, Port};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Which analyzer a port list is being prepared for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// Rule-driven route verification; every kept port is a discharge port.
    Complex,
    /// Pair-existence check; discharge ports are the non-load ports.
    Simple,
}

#[derive(Debug, Clone, Default)]
pub struct PortTable {
    total_rows: usize,
    ports: Vec<Port>,
    by_id: HashMap<String, usize>,
}

impl PortTable {
    /// Keep ports with a non-empty id that are active, or all of them when
    /// `include_inactive` is set. `total_rows` counts every CSV row read.
    pub fn build<I>(ports: I, total_rows: usize, include_inactive: bool) -> Self
    where
        I: IntoIterator<Item = Port>,
    {
        let mut table = PortTable {
            total_rows,
            ..PortTable::default()
        };
        for port in ports {
            if port.id.is_empty() {
                continue;
            }
            if !include_inactive && !port.is_active {
                continue;
            }
            // Duplicate ids: the last row is the one lookups see.
            table.by_id.insert(port.id.clone(), table.ports.len());
            table.ports.push(port);
        }
        table
    }

    pub fn total_rows(&self) -> usize {
        self.total_rows
    }

    /// Kept ports in file order.
    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Port> {
        self.by_id.get(id).map(|&idx| &self.ports[idx])
    }

    pub fn name_of(&self, id: &str) -> &str {
        self.get(id).map(|p| p.name.as_str()).unwrap_or("")
    }

    pub fn load_ports(&self) -> Vec<&Port> {
        self.ports.iter().filter(|p| p.is_load).collect()
    }

    pub fn disch_ports(&self, mode: ScanMode) -> Vec<&Port> {
        match mode {
            ScanMode::Complex => self.ports.iter().collect(),
            ScanMode::Simple => self.ports.iter().filter(|p| !p.is_load).collect(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: Vec<DistanceRule>,
    total_rows: usize,
}

impl RuleTable {
    pub fn new(rules: Vec<DistanceRule>) -> Self {
        let total_rows = rules.len();
        RuleTable { rules, total_rows }
    }

    pub(crate) fn set_total_rows(&mut self, total_rows: usize) {
        self.total_rows = total_rows;
    }

    /// Number of CSV rows read, including any the decoder skipped.
    pub fn total_rows(&self) -> usize {
        self.total_rows
    }

    pub fn rules(&self) -> &[DistanceRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Precomputed complete-distance pairs, as stored (`load`, `disch`).
#[derive(Debug, Clone, Default)]
pub struct PairTable {
    /// load id -> disch ids.
    pairs: HashMap<String, HashSet<String>>,
    len: usize,
    total_rows: usize,
}

impl PairTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when either id is empty.
    pub fn insert(&mut self, load_id: &str, disch_id: &str) -> bool {
        if load_id.is_empty() || disch_id.is_empty() {
            return false;
        }
        if self
            .pairs
            .entry(load_id.to_string())
            .or_default()
            .insert(disch_id.to_string())
        {
            self.len += 1;
        }
        true
    }

    pub(crate) fn set_total_rows(&mut self, total_rows: usize) {
        self.total_rows = total_rows;
    }

    pub fn total_rows(&self) -> usize {
        self.total_rows
    }

    /// Distinct stored pairs.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn contains(&self, load_id: &str, disch_id: &str) -> bool {
        self.pairs
            .get(load_id)
            .is_some_and(|disch| disch.contains(disch_id))
    }

    /// True when the pair is stored in either direction.
    pub fn contains_either(&self, a: &str, b: &str) -> bool {
        self.contains(a, b) || self.contains(b, a)
    }
}

/// Everything the rule-driven scan reads. The tables are shared read-only
/// snapshots so a background scan can hold them while the caller moves on.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTables {
    pub ports: Arc<PortTable>,
    pub rules: Arc<RuleTable>,
    pub segments: Arc<SegmentTable>,
}

//! Caller-owned analysis state and the background scan task.
//!
//! An [`AnalysisSession`] holds the loaded tables and the last published
//! result. Tables are replaced wholesale; each replacement (or a reset) bumps
//! the session generation, cancels any scan in flight and drops the result.
//! A scan runs on tokio's blocking pool against a snapshot of the tables and
//! its outcome is only published if the generation has not moved meanwhile.

use crate::error::{Error, Result};
use crate::loader::{read_complete_distances, read_ports, read_rules, read_segments, LoadReport};
use crate::reports::{run_complex_analysis, run_simple_analysis, ScanObserver};
use crate::segments::SegmentTable;
use crate::tables::{PairTable, PortTable, ReferenceTables, RuleTable};
use crate::types::AnalysisResult;
use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionConfig {
    /// Keep ports whose `is_active_port` flag is false.
    pub include_inactive: bool,
}

/// Cooperative cancellation flag shared between a session and its scan.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Forwards progress to a watch channel and cancellation from a token.
struct ChannelObserver {
    progress: watch::Sender<u8>,
    cancel: CancelToken,
}

impl ScanObserver for ChannelObserver {
    fn progress(&mut self, percent: u8) {
        // Nobody listening is fine.
        let _ = self.progress.send(percent);
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

#[derive(Debug)]
struct ActiveScan {
    scan_id: u64,
    cancel: CancelToken,
    finished: Arc<AtomicBool>,
}

/// Handle to a scan running in the background.
#[derive(Debug)]
pub struct ScanTask {
    scan_id: u64,
    generation: u64,
    progress: watch::Receiver<u8>,
    cancel: CancelToken,
    handle: JoinHandle<Result<AnalysisResult>>,
}

impl ScanTask {
    /// Percent-complete updates, delivered at chunk boundaries.
    pub fn progress(&self) -> watch::Receiver<u8> {
        self.progress.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A token that cancels this scan, for handing to a signal handler.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Wait for the worker and pair its result with the generation it ran for.
    pub async fn wait(self) -> ScanOutcome {
        let result = match self.handle.await {
            Ok(result) => result,
            Err(e) => Err(Error::ScanAborted(e.to_string())),
        };
        ScanOutcome {
            scan_id: self.scan_id,
            generation: self.generation,
            result,
        }
    }
}

/// A finished scan, ready to hand back to [`AnalysisSession::publish`].
#[derive(Debug)]
pub struct ScanOutcome {
    pub scan_id: u64,
    pub generation: u64,
    pub result: Result<AnalysisResult>,
}

#[derive(Debug, Default)]
pub struct AnalysisSession {
    config: SessionConfig,
    ports: Option<Arc<PortTable>>,
    rules: Option<Arc<RuleTable>>,
    segments: Option<Arc<SegmentTable>>,
    pairs: Option<Arc<PairTable>>,
    result: Option<AnalysisResult>,
    generation: u64,
    next_scan_id: u64,
    active: Option<ActiveScan>,
}

impl AnalysisSession {
    pub fn new(config: SessionConfig) -> Self {
        AnalysisSession {
            config,
            ..AnalysisSession::default()
        }
    }

    pub fn config(&self) -> SessionConfig {
        self.config
    }

    /// Changing the config discards the current result; the ports table
    /// must be loaded again for the new inactive-port policy to apply.
    pub fn set_config(&mut self, config: SessionConfig) {
        if self.config != config {
            self.config = config;
            self.reset();
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    pub fn ports(&self) -> Option<&PortTable> {
        self.ports.as_deref()
    }

    pub fn rules(&self) -> Option<&RuleTable> {
        self.rules.as_deref()
    }

    pub fn segments(&self) -> Option<&SegmentTable> {
        self.segments.as_deref()
    }

    pub fn pairs(&self) -> Option<&PairTable> {
        self.pairs.as_deref()
    }

    /// True while a started scan has not finished running.
    pub fn is_scanning(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|scan| !scan.finished.load(Ordering::SeqCst))
    }

    /// Drop the result and invalidate any scan in flight.
    pub fn reset(&mut self) {
        if let Some(scan) = self.active.take() {
            scan.cancel.cancel();
        }
        self.result = None;
        self.generation += 1;
    }

    /// Replace the ports table. A failed read leaves the previous table and
    /// result untouched.
    pub fn load_ports<R: Read>(&mut self, reader: R) -> Result<LoadReport> {
        let (table, report) = read_ports(reader, self.config.include_inactive)?;
        self.reset();
        self.ports = Some(Arc::new(table));
        Ok(report)
    }

    pub fn load_rules<R: Read>(&mut self, reader: R) -> Result<LoadReport> {
        let (table, report) = read_rules(reader)?;
        self.reset();
        self.rules = Some(Arc::new(table));
        Ok(report)
    }

    pub fn load_segments<R: Read>(&mut self, reader: R) -> Result<LoadReport> {
        let (table, report) = read_segments(reader)?;
        self.reset();
        self.segments = Some(Arc::new(table));
        Ok(report)
    }

    pub fn load_complete_distances<R: Read>(&mut self, reader: R) -> Result<LoadReport> {
        let (table, report) = read_complete_distances(reader)?;
        self.reset();
        self.pairs = Some(Arc::new(table));
        Ok(report)
    }

    pub fn clear_ports(&mut self) {
        self.reset();
        self.ports = None;
    }

    pub fn clear_rules(&mut self) {
        self.reset();
        self.rules = None;
    }

    pub fn clear_segments(&mut self) {
        self.reset();
        self.segments = None;
    }

    pub fn clear_complete_distances(&mut self) {
        self.reset();
        self.pairs = None;
    }

    /// Start the rule-driven scan in the background.
    ///
    /// Returns `Ok(None)` without doing anything while another scan is running.
    pub fn start_complex_scan(&mut self) -> Result<Option<ScanTask>> {
        if self.is_scanning() {
            debug!("scan already running; ignoring request");
            return Ok(None);
        }
        let ports = require(&self.ports, "Ports CSV")?;
        let rules = require(&self.rules, "Distance Rules CSV")?;
        let segments = require(&self.segments, "Distances ARW (segments) CSV")?;
        let tables = ReferenceTables {
            ports,
            rules,
            segments,
        };
        Ok(Some(self.spawn(move |observer| {
            run_complex_analysis(&tables, observer).map(AnalysisResult::Complex)
        })))
    }

    /// Start the pair-existence scan in the background.
    ///
    /// Returns `Ok(None)` without doing anything while another scan is running.
    pub fn start_simple_scan(&mut self) -> Result<Option<ScanTask>> {
        if self.is_scanning() {
            debug!("scan already running; ignoring request");
            return Ok(None);
        }
        let ports = require(&self.ports, "Ports CSV")?;
        let pairs = require(&self.pairs, "Complete Distances CSV")?;
        Ok(Some(self.spawn(move |observer| {
            run_simple_analysis(&ports, &pairs, pairs.total_rows(), observer)
                .map(AnalysisResult::Simple)
        })))
    }

    fn spawn<F>(&mut self, job: F) -> ScanTask
    where
        F: FnOnce(&mut ChannelObserver) -> Result<AnalysisResult> + Send + 'static,
    {
        self.result = None;
        self.next_scan_id += 1;
        let scan_id = self.next_scan_id;
        let generation = self.generation;
        let cancel = CancelToken::new();
        let finished = Arc::new(AtomicBool::new(false));
        let (tx, rx) = watch::channel(0u8);

        let mut observer = ChannelObserver {
            progress: tx,
            cancel: cancel.clone(),
        };
        let done = Arc::clone(&finished);
        let handle = tokio::task::spawn_blocking(move || {
            let result = job(&mut observer);
            done.store(true, Ordering::SeqCst);
            result
        });

        self.active = Some(ActiveScan {
            scan_id,
            cancel: cancel.clone(),
            finished,
        });
        debug!(scan_id, generation, "scan started");
        ScanTask {
            scan_id,
            generation,
            progress: rx,
            cancel,
            handle,
        }
    }

    /// Publish a finished scan.
    ///
    /// Returns `Ok(true)` when the result became the session result and
    /// `Ok(false)` when it was discarded because the tables changed since the
    /// scan started or a newer scan has been started since. Scan errors are
    /// returned and publish nothing.
    pub fn publish(&mut self, outcome: ScanOutcome) -> Result<bool> {
        if outcome.generation != self.generation {
            warn!(
                scan_generation = outcome.generation,
                session_generation = self.generation,
                "discarding result of a stale scan"
            );
            return Ok(false);
        }
        if let Some(scan) = &self.active {
            if scan.scan_id != outcome.scan_id {
                warn!(
                    scan_id = outcome.scan_id,
                    active_scan_id = scan.scan_id,
                    "discarding result superseded by a newer scan"
                );
                return Ok(false);
            }
            self.active = None;
        }
        let result = outcome.result?;
        self.result = Some(result);
        Ok(true)
    }
}

fn require<T>(table: &Option<Arc<T>>, name: &'static str) -> Result<Arc<T>> {
    table
        .as_ref()
        .map(Arc::clone)
        .ok_or(Error::MissingTable { table: name })
}

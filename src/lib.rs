//! Coverage checks for maritime port distance tables.
//!
//! Given ports, zone-to-zone routing rules and leg segments, the rule-driven
//! analysis verifies that every discharge/load port pair can be routed and
//! lists the missing legs and pairs. The simple analysis only checks a table
//! of precomputed complete distances for each load/discharge pair.

pub mod error;
pub mod loader;
pub mod matcher;
pub mod output;
pub mod reports;
pub mod resolver;
pub mod segments;
pub mod session;
pub mod tables;
pub mod types;
pub mod util;

pub use error::{Error, Result};
pub use loader::{build_reference_tables, LoadReport, TableKind};
pub use matcher::{find_rules_for_pair, RuleMatch};
pub use reports::{run_complex_analysis, run_simple_analysis, ScanObserver, PROGRESS_CHUNK};
pub use resolver::{resolve_route, RouteResolution};
pub use segments::SegmentTable;
pub use session::{AnalysisSession, CancelToken, ScanOutcome, ScanTask, SessionConfig};
pub use tables::{PairTable, PortTable, ReferenceTables, RuleTable, ScanMode};
pub use types::{AnalysisResult, ComplexReport, MissingReason, SimpleReport};

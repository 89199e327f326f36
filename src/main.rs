// Entry point and high-level CLI flow.
//
// - `complex` verifies rule-driven routes against the segments table.
// - `simple` checks load/disch pairs against the complete distances table.
// - `info` prints the expected CSV headers.
// - With no subcommand an interactive menu drives one `AnalysisSession`.
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use port_distances::loader::{open_table, LoadReport, TableKind};
use port_distances::output;
use port_distances::util::{format_int, format_number, percentage};
use port_distances::{AnalysisResult, AnalysisSession, ScanTask, SessionConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "Ship port distance coverage analyzer")]
struct Cli {
    /// Keep ports flagged inactive.
    #[arg(long, global = true)]
    include_inactive: bool,

    /// Directory searched for default CSV files when a path is not given.
    #[arg(long, global = true, default_value = "csvFiles")]
    csv_dir: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Verify rule-driven routes (A-Z) against the segments table.
    Complex {
        #[arg(long)]
        ports: Option<PathBuf>,
        #[arg(long)]
        rules: Option<PathBuf>,
        #[arg(long)]
        segments: Option<PathBuf>,
        #[command(flatten)]
        export: ExportArgs,
    },
    /// Check load/disch pairs against precomputed complete distances.
    Simple {
        #[arg(long)]
        ports: Option<PathBuf>,
        #[arg(long)]
        pairs: Option<PathBuf>,
        #[command(flatten)]
        export: ExportArgs,
    },
    /// Print the exact header order expected for each CSV.
    Info,
}

#[derive(Args, Debug)]
struct ExportArgs {
    /// Save the tab-separated tabulation here instead of printing it.
    #[arg(long)]
    output: Option<PathBuf>,
    /// Write the summary as JSON.
    #[arg(long)]
    json: Option<PathBuf>,
    /// Write each missing list as a CSV file into this directory.
    #[arg(long)]
    export_dir: Option<PathBuf>,
    /// Rows shown per list in the console preview.
    #[arg(long, default_value_t = 5)]
    preview: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = SessionConfig {
        include_inactive: cli.include_inactive,
    };

    match cli.command {
        Some(Command::Complex {
            ports,
            rules,
            segments,
            export,
        }) => {
            let mut session = AnalysisSession::new(config);
            load_input(&mut session, ports, &cli.csv_dir, TableKind::Ports)?;
            load_input(&mut session, rules, &cli.csv_dir, TableKind::Rules)?;
            load_input(&mut session, segments, &cli.csv_dir, TableKind::Segments)?;
            let task = session.start_complex_scan()?;
            finish_scan(&mut session, task, &export).await
        }
        Some(Command::Simple {
            ports,
            pairs,
            export,
        }) => {
            let mut session = AnalysisSession::new(config);
            load_input(&mut session, ports, &cli.csv_dir, TableKind::Ports)?;
            load_input(&mut session, pairs, &cli.csv_dir, TableKind::CompleteDistances)?;
            let task = session.start_simple_scan()?;
            finish_scan(&mut session, task, &export).await
        }
        Some(Command::Info) => {
            print_info();
            Ok(())
        }
        None => run_menu(config, cli.csv_dir).await,
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Use the given path, or the table's default file in `csv_dir` if it exists.
fn resolve_input(path: Option<PathBuf>, csv_dir: &Path, kind: TableKind) -> Result<PathBuf> {
    if let Some(path) = path {
        return Ok(path);
    }
    let fallback = csv_dir.join(kind.default_file_name());
    if fallback.is_file() {
        return Ok(fallback);
    }
    bail!(
        "no {} given and {} does not exist",
        kind.label(),
        fallback.display()
    )
}

fn load_input(
    session: &mut AnalysisSession,
    path: Option<PathBuf>,
    csv_dir: &Path,
    kind: TableKind,
) -> Result<LoadReport> {
    let path = resolve_input(path, csv_dir, kind)?;
    load(session, &path, kind)
}

fn load(session: &mut AnalysisSession, path: &Path, kind: TableKind) -> Result<LoadReport> {
    let file = open_table(path).with_context(|| format!("failed to open {}", path.display()))?;
    let report = match kind {
        TableKind::Ports => session.load_ports(file),
        TableKind::Rules => session.load_rules(file),
        TableKind::Segments => session.load_segments(file),
        TableKind::CompleteDistances => session.load_complete_distances(file),
    }
    .with_context(|| format!("failed to load {} from {}", kind.label(), path.display()))?;
    print_load_report(&report);
    Ok(report)
}

fn print_load_report(report: &LoadReport) {
    println!(
        "{}: loaded ({} rows, {} kept)",
        report.table.label(),
        format_int(report.total_rows),
        format_int(report.kept_rows)
    );
    if report.parse_errors > 0 {
        println!(
            "Note: {} rows skipped due to parse errors.",
            format_int(report.parse_errors)
        );
    }
}

/// Drive a background scan to completion: progress on stderr, Ctrl-C cancels.
async fn run_scan(session: &mut AnalysisSession, task: ScanTask) -> Result<()> {
    let mut progress = task.progress();
    let printer = tokio::spawn(async move {
        while progress.changed().await.is_ok() {
            let percent = *progress.borrow_and_update();
            eprint!("\rProgress: {:>3}%", percent);
            let _ = io::stderr().flush();
        }
    });
    let token = task.cancel_token();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });

    let outcome = task.wait().await;
    interrupt.abort();
    let _ = printer.await;
    eprintln!();

    if !session.publish(outcome).context("analysis failed")? {
        bail!("analysis result was discarded because the inputs changed");
    }
    Ok(())
}

async fn finish_scan(
    session: &mut AnalysisSession,
    task: Option<ScanTask>,
    export: &ExportArgs,
) -> Result<()> {
    let Some(task) = task else {
        bail!("an analysis is already running");
    };
    run_scan(session, task).await?;
    let Some(result) = session.result() else {
        bail!("analysis produced no result");
    };
    export_result(result, export)
}

fn export_result(result: &AnalysisResult, export: &ExportArgs) -> Result<()> {
    let tsv = output::render_tsv(result);
    let Some(path) = &export.output else {
        println!("{}", tsv);
        write_side_exports(result, export)?;
        return Ok(());
    };

    print_summary(result);
    print_previews(result, export.preview);
    output::write_text(path, &tsv)
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("(Full table exported to {})", path.display());
    write_side_exports(result, export)
}

fn write_side_exports(result: &AnalysisResult, export: &ExportArgs) -> Result<()> {
    if let Some(path) = &export.json {
        match result {
            AnalysisResult::Complex(report) => output::write_json(path, &report.summary),
            AnalysisResult::Simple(report) => output::write_json(path, &report.summary),
        }
        .with_context(|| format!("failed to write {}", path.display()))?;
        eprintln!("Summary written to {}", path.display());
    }
    if let Some(dir) = &export.export_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
        match result {
            AnalysisResult::Complex(report) => {
                output::write_csv(&dir.join("missing_segments.csv"), &report.missing_segments)?;
                output::write_csv(&dir.join("missing_complete.csv"), &report.missing_complete)?;
            }
            AnalysisResult::Simple(report) => {
                output::write_csv(&dir.join("missing_distances.csv"), &report.missing)?;
            }
        }
        eprintln!("Missing lists written to {}", dir.display());
    }
    Ok(())
}

fn print_summary(result: &AnalysisResult) {
    println!("\nSummary");
    match result {
        AnalysisResult::Complex(report) => {
            let s = &report.summary;
            println!("Total ports CSV rows: {}", format_int(s.total_ports_rows));
            println!(
                "Load ports: {}, disch ports: {}",
                format_int(s.total_load_ports),
                format_int(s.total_disch_ports)
            );
            println!(
                "Complete distances generated: {} of {} expected ({}%)",
                format_int(s.generated_complete),
                format_int(s.expected_complete),
                format_number(percentage(s.generated_complete, s.expected_complete), 2)
            );
            println!(
                "Missing segments: {}, missing complete distances: {}\n",
                format_int(s.missing_segments),
                format_int(s.missing_complete)
            );
        }
        AnalysisResult::Simple(report) => {
            let s = &report.summary;
            let checked = s.found + s.missing;
            println!(
                "Load ports: {}, disch ports: {}",
                format_int(s.total_load_ports),
                format_int(s.total_disch_ports)
            );
            println!(
                "Distances found: {} of {} pairs ({}%)",
                format_int(s.found),
                format_int(checked),
                format_number(percentage(s.found, checked), 2)
            );
            println!("Distances missing: {}\n", format_int(s.missing));
        }
    }
}

fn print_previews(result: &AnalysisResult, max_rows: usize) {
    match result {
        AnalysisResult::Complex(report) => {
            output::preview_table(
                "Missing Distances ARW (segments)",
                &report.missing_segments,
                max_rows,
            );
            output::preview_table(
                "Missing ARW Complete Distances",
                &report.missing_complete,
                max_rows,
            );
        }
        AnalysisResult::Simple(report) => {
            output::preview_table("Missing distances", &report.missing, max_rows);
        }
    }
}

fn print_info() {
    for kind in [
        TableKind::Ports,
        TableKind::Rules,
        TableKind::Segments,
        TableKind::CompleteDistances,
    ] {
        println!("{} columns (exact header order):", kind.label());
        println!("{}\n", kind.columns().join("\t"));
    }
    println!("Analysis output:");
    println!("- Missing Distances ARW (segments): route legs required by rules that");
    println!("  are not found in the segments CSV (direct or reverse).");
    println!("- Missing ARW Complete Distances: complete distances that could not be");
    println!("  generated because there is no rule for the pair or required segments");
    println!("  are missing.");
}

/// Read a single line of input after printing the common "Enter choice:" prompt.
fn read_choice() -> String {
    prompt("Enter choice: ")
}

fn prompt(label: &str) -> String {
    print!("{}", label);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Ask the user whether to go back to the menu after an analysis.
///
/// Returns `true` if the user chose `Y`, `false` on `N` or end of input.
fn prompt_back_to_menu() -> bool {
    loop {
        let resp = prompt("Back to menu (Y/N): ").to_uppercase();
        match resp.as_str() {
            "Y" => return true,
            "N" | "" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Ask for a table path; a blank answer picks the default file.
fn prompt_path(csv_dir: &Path, kind: TableKind) -> Option<PathBuf> {
    let answer = prompt(&format!("{} path (blank for default): ", kind.label()));
    let path = if answer.is_empty() { None } else { Some(PathBuf::from(answer)) };
    match resolve_input(path, csv_dir, kind) {
        Ok(path) => Some(path),
        Err(e) => {
            eprintln!("{}\n", e);
            None
        }
    }
}

const MENU_PREVIEW_ROWS: usize = 5;

struct MenuState {
    session: AnalysisSession,
    csv_dir: PathBuf,
    ports_path: Option<PathBuf>,
}

impl MenuState {
    fn load_from_prompt(&mut self, kind: TableKind) {
        let Some(path) = prompt_path(&self.csv_dir, kind) else {
            return;
        };
        match load(&mut self.session, &path, kind) {
            Ok(_) => {
                if kind == TableKind::Ports {
                    self.ports_path = Some(path);
                }
                println!();
            }
            Err(e) => eprintln!("{:#}\n", e),
        }
    }

    fn toggle_inactive(&mut self) {
        let config = SessionConfig {
            include_inactive: !self.session.config().include_inactive,
        };
        self.session.set_config(config);
        println!(
            "Inactive ports are now {}.",
            if config.include_inactive { "included" } else { "excluded" }
        );
        if let Some(path) = self.ports_path.clone() {
            if let Err(e) = load(&mut self.session, &path, TableKind::Ports) {
                eprintln!("{:#}", e);
            }
        }
        println!();
    }

    async fn analyze(&mut self, simple: bool) -> bool {
        let task = if simple {
            self.session.start_simple_scan()
        } else {
            self.session.start_complex_scan()
        };
        let outcome = match task {
            Ok(Some(task)) => run_scan(&mut self.session, task).await,
            Ok(None) => Ok(()),
            Err(e) => {
                println!("Error: {}. Please load it first.\n", e);
                return true;
            }
        };
        if let Err(e) = outcome {
            eprintln!("{:#}\n", e);
            return true;
        }
        if let Some(result) = self.session.result() {
            print_summary(result);
            print_previews(result, MENU_PREVIEW_ROWS);
        }
        prompt_back_to_menu()
    }

    fn save(&self) {
        let Some(result) = self.session.result() else {
            println!("Error: No analysis to save. Run an analysis first.\n");
            return;
        };
        let answer = prompt("Save tabulation to (default analysis.tsv): ");
        let path = if answer.is_empty() {
            PathBuf::from("analysis.tsv")
        } else {
            PathBuf::from(answer)
        };
        match output::write_text(&path, &output::render_tsv(result)) {
            Ok(()) => println!("Saved analysis to {}\n", path.display()),
            Err(e) => eprintln!("Write error: {}\n", e),
        }
    }
}

async fn run_menu(config: SessionConfig, csv_dir: PathBuf) -> Result<()> {
    let mut state = MenuState {
        session: AnalysisSession::new(config),
        csv_dir,
        ports_path: None,
    };
    loop {
        println!("Ship Port Distance Helper");
        println!("[1] Load Ports CSV");
        println!("[2] Load Distance Rules CSV");
        println!("[3] Load Distances ARW (segments) CSV");
        println!("[4] Load Complete Distances CSV");
        println!("[5] Complex analysis: A-Z & segments");
        println!("[6] Simple analysis: load to disch");
        println!(
            "[7] Take inactive ports into account ({})",
            if state.session.config().include_inactive { "on" } else { "off" }
        );
        println!("[8] Save tabulation table");
        println!("[9] Reset analysis");
        println!("[0] Exit\n");
        let choice = read_choice();
        match choice.as_str() {
            "1" => state.load_from_prompt(TableKind::Ports),
            "2" => state.load_from_prompt(TableKind::Rules),
            "3" => state.load_from_prompt(TableKind::Segments),
            "4" => state.load_from_prompt(TableKind::CompleteDistances),
            "5" | "6" => {
                println!();
                if !state.analyze(choice == "6").await {
                    println!("Exiting the program.");
                    break;
                }
            }
            "7" => state.toggle_inactive(),
            "8" => state.save(),
            "9" => {
                state.session.reset();
                println!("Analysis reset.\n");
            }
            "0" | "" => {
                println!("Exiting the program.");
                break;
            }
            _ => println!("Invalid choice. Please enter 0-9.\n"),
        }
    }
    Ok(())
}

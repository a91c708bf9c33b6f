//! `protogen` command line entry point.
//!
//! Exit status: 0 when the generated files were already current, 1 when one
//! or both were rewritten, 2 when the run failed.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use protogen_core::{GeneratorConfig, GeneratorError, OutputWriter, WriteReport, generate};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

const EXIT_UNCHANGED: u8 = 0;
const EXIT_CHANGED: u8 = 1;
const EXIT_FAILED: u8 = 2;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "protogen",
    version,
    about = "Generate channel declarations and validators from a protocol schema"
)]
struct Cli {
    #[arg(
        long,
        value_name = "DIR",
        help = "Project root containing the schema. Defaults to current working directory"
    )]
    root: Option<PathBuf>,

    #[arg(long, help = "Print a unified diff for every rewritten file")]
    diff: bool,
}

fn main() -> ExitCode {
    init_tracing();
    ExitCode::from(run(Cli::parse()))
}

fn run(cli: Cli) -> u8 {
    match run_inner(&cli) {
        Ok(report) => {
            print_report(&report, cli.diff);
            if report.any_changed() {
                EXIT_CHANGED
            } else {
                EXIT_UNCHANGED
            }
        }
        Err(err) => {
            eprintln!("❌ {err}");
            EXIT_FAILED
        }
    }
}

fn run_inner(cli: &Cli) -> Result<WriteReport, GeneratorError> {
    let root = cli
        .root
        .clone()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
    let config = GeneratorConfig::load(&root)?;
    debug!(?config, "Resolved generator config.");
    generate(&config, &OutputWriter::new().with_diffs(cli.diff))
}

fn print_report(report: &WriteReport, show_diff: bool) {
    if !report.any_changed() {
        println!("✅ Generated protocol sources are up to date");
        return;
    }
    for file in report.files.iter().filter(|file| file.changed) {
        println!("📝 Updated {}", file.path.display());
        if show_diff && let Some(diff) = &file.diff {
            print!("{diff}");
        }
    }
}

fn init_tracing() {
    // PROTOGEN_LOG takes a plain level ("debug") or a full filter spec
    // like "protogen_core=trace"
    let filter = match std::env::var("PROTOGEN_LOG") {
        Ok(level) if is_plain_level(&level) => {
            format!("protogen={level},protogen_core={level}")
        }
        Ok(spec) => spec,
        Err(_) => "protogen=info,protogen_core=info".to_string(),
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_filter(EnvFilter::new(filter));

    if tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}

fn is_plain_level(s: &str) -> bool {
    matches!(
        s.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    )
}

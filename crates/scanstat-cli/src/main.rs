use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use glob::glob;
use scanstat_core::{IngestOptions, SessionReport};

#[derive(Parser, Debug)]
#[command(name = "scanstat")]
#[command(version)]
#[command(
    about = "Offline decoder for line-scan sensor buffer captures.",
    long_about = None,
    after_help = "Examples:\n  scanstat capture decode camera0.json -o report.json\n  scanstat capture decode 'captures/*.json' --stdout --format text\n  scanstat capture analyze camera0.json --report report.json --mark-name Mark"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Operations on buffer capture files.
    Capture {
        #[command(subcommand)]
        command: CaptureCommands,
    },
}

#[derive(Subcommand, Debug)]
enum CaptureCommands {
    /// Decode one capture file per device and write a versioned report.
    #[command(alias = "analyze")]
    #[command(
        after_help = "Examples:\n  scanstat capture decode camera0.json -o report.json\n  scanstat capture decode camera0.json camera1.json --stdout --pretty"
    )]
    Decode(DecodeArgs),
}

#[derive(Args, Debug)]
struct DecodeArgs {
    /// Capture files (.json) or glob patterns, one file per device
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output report path
    #[arg(short = 'o', long, required_unless_present = "stdout")]
    report: Option<PathBuf>,

    /// Write the report to stdout
    #[arg(long, conflicts_with = "report")]
    stdout: bool,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long, conflicts_with = "compact")]
    pretty: bool,

    /// Compact JSON output (default)
    #[arg(long)]
    compact: bool,

    /// Name of the mark (control) sub-channel
    #[arg(long, default_value = "Mark")]
    mark_name: String,

    /// Suppress non-error output
    #[arg(long)]
    quiet: bool,

    /// Exit with a non-zero code if any sub-channel failed to decode
    #[arg(long)]
    strict: bool,

    /// List failed sub-channels after decoding
    #[arg(long)]
    list_failures: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    let result = match cli.command {
        Commands::Capture { command } => match command {
            CaptureCommands::Decode(args) => cmd_capture_decode(args),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{:#}", err), None)
    }
}

fn cmd_capture_decode(args: DecodeArgs) -> Result<(), CliError> {
    if args.pretty && args.compact {
        return Err(CliError::new(
            "cannot use --pretty and --compact together",
            Some("choose one output format".to_string()),
        ));
    }

    let inputs = resolve_input_paths(&args.inputs)?;
    for input in &inputs {
        validate_input_file(input)?;
    }

    let report = if args.stdout {
        None
    } else {
        Some(args.report.clone().ok_or_else(|| {
            CliError::new(
                "missing output path",
                Some("use -o/--report or --stdout".to_string()),
            )
        })?)
    };

    if let Some(report_path) = report.as_ref() {
        ensure_report_differs_from_inputs(report_path, &inputs)?;
    }

    let options = IngestOptions {
        control_name: args.mark_name.clone(),
    };
    log::info!("decoding {} capture file(s)", inputs.len());
    let session = scanstat_core::analyze_capture_files(&inputs, &options)
        .context("capture decoding failed")?;
    let rendered = render_session(&session, args.format, args.pretty)?;

    match report {
        None => print!("{}", rendered),
        Some(report) => {
            if let Some(parent) = report.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create output directory: {}", parent.display())
                    })?;
                }
            }
            fs::write(&report, rendered)
                .with_context(|| format!("Failed to write report: {}", report.display()))?;
            if !args.quiet {
                eprintln!("OK: report written -> {}", report.display());
            }
        }
    }

    if args.list_failures && !args.quiet {
        print_failures(&session);
    }
    if args.strict && !session.failures().is_empty() {
        return Err(CliError::new(
            "decode failures detected",
            Some("use --list-failures to inspect".to_string()),
        ));
    }
    Ok(())
}

fn render_session(
    session: &SessionReport,
    format: OutputFormat,
    pretty: bool,
) -> Result<String, CliError> {
    match format {
        OutputFormat::Text => Ok(scanstat_core::render_session_text(session)),
        OutputFormat::Json if pretty => serde_json::to_string_pretty(session)
            .context("JSON serialization failed")
            .map_err(Into::into),
        OutputFormat::Json => serde_json::to_string(session)
            .context("JSON serialization failed")
            .map_err(Into::into),
    }
}

fn print_failures(session: &SessionReport) {
    eprintln!("Decode failures:");
    for failure in session.failures() {
        eprintln!(
            "  {} #{} {}/{} {}",
            failure.device, failure.sequence, failure.channel, failure.subchannel, failure.code
        );
    }
}

fn ensure_report_differs_from_inputs(
    report_path: &Path,
    inputs: &[PathBuf],
) -> Result<(), CliError> {
    let parent = match report_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    // A missing output directory is created later; it cannot hold an input.
    let Ok(report_dir) = fs::canonicalize(parent) else {
        return Ok(());
    };
    let report_target = report_dir.join(
        report_path
            .file_name()
            .ok_or_else(|| anyhow::anyhow!("Invalid report path"))?,
    );
    for input in inputs {
        let input_abs = fs::canonicalize(input)
            .with_context(|| format!("Failed to resolve input path: {}", input.display()))?;
        if report_target == input_abs {
            return Err(CliError::new(
                format!(
                    "report path must differ from input: {}",
                    report_path.display()
                ),
                Some("choose a different output path".to_string()),
            ));
        }
    }
    Ok(())
}

fn validate_input_file(input: &Path) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("use a .json capture file".to_string()),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("use a .json capture file".to_string()),
        ));
    }
    let ext = input
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if ext != "json" {
        return Err(CliError::new(
            format!("unsupported input format '{}'", input.display()),
            Some("expected a .json capture file".to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_paths(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, CliError> {
    let mut resolved = Vec::new();
    for input in inputs {
        let pattern = input.to_string_lossy();
        if !is_glob_pattern(&pattern) {
            resolved.push(input.clone());
            continue;
        }

        let paths = glob(&pattern).map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err.msg)),
            )
        })?;
        let mut matches = Vec::new();
        for entry in paths {
            let path = entry.map_err(|err| {
                CliError::new(
                    format!("invalid input pattern '{}'", pattern),
                    Some(format!("pattern error: {}", err)),
                )
            })?;
            if path.is_file() {
                matches.push(path);
            }
        }

        if matches.is_empty() {
            return Err(CliError::new(
                format!("no files match pattern '{}'", pattern),
                Some("check the path or quote the pattern; expected .json".to_string()),
            ));
        }
        resolved.extend(matches);
    }
    Ok(resolved)
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}

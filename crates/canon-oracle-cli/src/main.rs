// crates/canon-oracle-cli/src/main.rs
// ============================================================================
// Module: Canon Oracle CLI Entry Point
// Description: Command dispatcher for oracle evaluations and baseline tooling.
// Purpose: Run one oracle evaluation per invocation and inspect baselines.
// Dependencies: canon-oracle-config, canon-oracle-core, clap, serde_jcs, thiserror
// ============================================================================

//! ## Overview
//! `canon-oracle check` evaluates one run directory in the given mode and
//! maps the final magnitude to the exit code: `0` clean, `1` violations,
//! `2` validation failure. Baseline and mask subcommands inspect the oracle
//! directory without evaluating anything. Operational errors exit with `3`.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use canon_oracle_config::OracleConfig;
use canon_oracle_config::config_toml_example;
use canon_oracle_core::Evaluator;
use canon_oracle_core::FsArtifactStore;
use canon_oracle_core::Mask;
use canon_oracle_core::RunMode;
use canon_oracle_core::TestContext;
use canon_oracle_core::Verdict;
use canon_oracle_core::interfaces::ArtifactLocation;
use canon_oracle_core::runtime::DEFAULT_MAX_ARTIFACT_BYTES;
use canon_oracle_core::runtime::VerificationReport;
use canon_oracle_core::runtime::VerificationStatus;
use canon_oracle_core::runtime::baseline::MASK_ARTIFACT;
use canon_oracle_core::runtime::baseline::read_json;
use canon_oracle_core::runtime::baseline::verify_baseline;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use thiserror::Error;

// ============================================================================
// SECTION: Exit Codes
// ============================================================================

/// Exit status for a clean verdict.
const EXIT_CLEAN: u8 = 0;
/// Exit status for a verdict with violations.
const EXIT_VIOLATIONS: u8 = 1;
/// Exit status for a validation failure.
const EXIT_VALIDATION: u8 = 2;
/// Exit status for operational errors.
const EXIT_ERROR: u8 = 3;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "canon-oracle", version, disable_help_subcommand = true)]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate one run against the oracle directory.
    Check(CheckCommand),
    /// Canonical baseline utilities.
    Baseline {
        /// Selected baseline subcommand.
        #[command(subcommand)]
        command: BaselineCommand,
    },
    /// Learned mask utilities.
    Mask {
        /// Selected mask subcommand.
        #[command(subcommand)]
        command: MaskCommand,
    },
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Arguments for `check`.
#[derive(Args, Debug)]
struct CheckCommand {
    /// Run mode: learn-once, learn-twice, test, or obs-gap.
    #[arg(long, value_parser = parse_run_mode)]
    mode: RunMode,
    /// Directory holding this run's raw artifacts.
    #[arg(long, value_name = "DIR")]
    result_dir: PathBuf,
    /// Directory holding the scenario's canonical artifacts.
    #[arg(long, value_name = "DIR")]
    oracle_dir: PathBuf,
    /// Configuration file (overrides `CANON_ORACLE_CONFIG`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

/// Baseline subcommands.
#[derive(Subcommand, Debug)]
enum BaselineCommand {
    /// Verify the canonical baseline manifest hashes.
    Verify(OracleDirCommand),
}

/// Mask subcommands.
#[derive(Subcommand, Debug)]
enum MaskCommand {
    /// Print the learned mask patterns.
    Show(OracleDirCommand),
}

/// Arguments for commands that only read the oracle directory.
#[derive(Args, Debug)]
struct OracleDirCommand {
    /// Directory holding the scenario's canonical artifacts.
    #[arg(long, value_name = "DIR")]
    oracle_dir: PathBuf,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a configuration file.
    Validate {
        /// Configuration file (overrides `CANON_ORACLE_CONFIG`).
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
    },
    /// Print an example configuration.
    Example,
}

/// Output formats.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable text.
    Text,
    /// Canonical JSON.
    Json,
}

/// Parses a run mode argument.
fn parse_run_mode(value: &str) -> Result<RunMode, String> {
    value.parse().map_err(|err: canon_oracle_core::ContextError| err.to_string())
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Commands::Check(command) => command_check(&command),
        Commands::Baseline {
            command: BaselineCommand::Verify(command),
        } => command_baseline_verify(&command),
        Commands::Mask {
            command: MaskCommand::Show(command),
        } => command_mask_show(&command),
        Commands::Config {
            command,
        } => command_config(command),
    }
}

// ============================================================================
// SECTION: Check Command
// ============================================================================

/// Executes the `check` command.
fn command_check(command: &CheckCommand) -> CliResult<ExitCode> {
    let config = OracleConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    let evaluator_config = config
        .evaluator_config()
        .map_err(|err| CliError::new(format!("invalid config: {err}")))?;
    let audit = config
        .audit_sink()
        .map_err(|err| CliError::new(format!("failed to open audit sink: {err}")))?;
    let context = TestContext::new(
        command.mode,
        command.result_dir.clone(),
        command.oracle_dir.clone(),
        &config.checks,
    )
    .map_err(|err| CliError::new(format!("invalid run context: {err}")))?;
    let store = FsArtifactStore::for_context(&context, evaluator_config.max_artifact_bytes)
        .map_err(|err| CliError::new(format!("invalid artifact directories: {err}")))?;

    let evaluator = Evaluator::new(evaluator_config).with_audit_sink(audit);
    let verdict = evaluator
        .evaluate(&context, &store)
        .map_err(|err| CliError::new(format!("evaluation aborted: {err}")))?;

    let output = match command.format {
        OutputFormat::Text => render_verdict_text(&verdict),
        OutputFormat::Json => render_json(&verdict)?,
    };
    write_stdout(&output)?;
    Ok(ExitCode::from(exit_status(verdict.result.violation_count)))
}

/// Maps a final magnitude to the process exit status.
const fn exit_status(magnitude: i64) -> u8 {
    if magnitude < 0 {
        EXIT_VALIDATION
    } else if magnitude == 0 {
        EXIT_CLEAN
    } else {
        EXIT_VIOLATIONS
    }
}

/// Renders a verdict as text.
fn render_verdict_text(verdict: &Verdict) -> String {
    let mut output = format!(
        "mode: {}\nmagnitude: {}\nalarms: {}\nwarnings: {}\n",
        verdict.mode,
        verdict.result.violation_count,
        verdict.result.messages.len(),
        verdict.warnings
    );
    if verdict.validation_failed {
        output.push_str("validation failed: comparisons were skipped\n");
    }
    for line in verdict.result.render_messages() {
        output.push_str(&line);
        output.push('\n');
    }
    if let Some(hint) = &verdict.hint {
        output.push_str("hint: ");
        output.push_str(hint);
        output.push('\n');
    }
    output
}

// ============================================================================
// SECTION: Baseline Commands
// ============================================================================

/// Opens a store rooted at the oracle directory.
fn oracle_store(command: &OracleDirCommand) -> CliResult<FsArtifactStore> {
    FsArtifactStore::new(
        command.oracle_dir.clone(),
        command.oracle_dir.clone(),
        DEFAULT_MAX_ARTIFACT_BYTES,
    )
    .map_err(|err| CliError::new(format!("invalid oracle directory: {err}")))
}

/// Executes `baseline verify`.
fn command_baseline_verify(command: &OracleDirCommand) -> CliResult<ExitCode> {
    let store = oracle_store(command)?;
    let (_, report) = verify_baseline(&store)
        .map_err(|err| CliError::new(format!("baseline verification failed: {err}")))?;
    let output = match command.format {
        OutputFormat::Text => render_verification_text(&report),
        OutputFormat::Json => render_json(&report)?,
    };
    write_stdout(&output)?;
    Ok(match report.status {
        VerificationStatus::Pass => ExitCode::SUCCESS,
        VerificationStatus::Fail => ExitCode::FAILURE,
    })
}

/// Renders a verification report as text.
fn render_verification_text(report: &VerificationReport) -> String {
    let status = match report.status {
        VerificationStatus::Pass => "pass",
        VerificationStatus::Fail => "fail",
    };
    let mut output = format!("status: {status}\nchecked files: {}\n", report.checked_files);
    for error in &report.errors {
        output.push_str("error: ");
        output.push_str(error);
        output.push('\n');
    }
    output
}

/// Executes `mask show`.
fn command_mask_show(command: &OracleDirCommand) -> CliResult<ExitCode> {
    let store = oracle_store(command)?;
    let mask: Mask = read_json(&store, ArtifactLocation::Oracle, MASK_ARTIFACT)
        .map_err(|err| CliError::new(format!("failed to read mask: {err}")))?
        .ok_or_else(|| {
            CliError::new(format!(
                "no learned mask in {}; run learn-twice first",
                command.oracle_dir.display()
            ))
        })?;
    let output = match command.format {
        OutputFormat::Text => render_mask_text(&mask),
        OutputFormat::Json => render_json(&mask)?,
    };
    write_stdout(&output)?;
    Ok(ExitCode::SUCCESS)
}

/// Renders mask patterns one per line.
fn render_mask_text(mask: &Mask) -> String {
    if mask.is_empty() {
        return "(empty mask)\n".to_string();
    }
    mask.patterns().map(|pattern| format!("{pattern}\n")).collect()
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(command: ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate {
            config,
        } => {
            OracleConfig::load(config.as_deref())
                .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
            write_stdout("config ok\n")?;
        }
        ConfigCommand::Example => write_stdout(&config_toml_example())?,
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Renders a value as canonical JSON with a trailing newline.
fn render_json<T: serde::Serialize>(value: &T) -> CliResult<String> {
    let bytes = serde_jcs::to_vec(value)
        .map_err(|err| CliError::new(format!("failed to render json: {err}")))?;
    let mut text = String::from_utf8(bytes)
        .map_err(|err| CliError::new(format!("failed to render json: {err}")))?;
    text.push('\n');
    Ok(text)
}

/// Writes text to stdout.
fn write_stdout(text: &str) -> CliResult<()> {
    let mut stdout = std::io::stdout();
    stdout
        .write_all(text.as_bytes())
        .map_err(|err| CliError::new(format!("failed to write stdout: {err}")))
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Emits an error message to stderr and returns the error exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::from(EXIT_ERROR)
}

// crates/complexity-bench-cli/src/main.rs
// ============================================================================
// Module: Complexity Bench CLI Entry Point
// Description: Command dispatcher for benchmark sweeps and store utilities.
// Purpose: Wire discovery, the result cache, and the run session to a toolchain.
// Dependencies: clap, complexity-bench-config, complexity-bench-core, ctrlc, thiserror.
// ============================================================================

//! ## Overview
//! `complexity-bench run` discovers config units, reuses every still-valid
//! record from the previous result store, builds and runs the rest, and
//! writes a fresh store. `run-all` repeats that for every profile and keeps
//! a results index. All user-facing strings are routed through the i18n
//! catalog.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use complexity_bench_cli::console::ConsoleSink;
use complexity_bench_cli::console::LogFormat;
use complexity_bench_cli::environment;
use complexity_bench_cli::index::IndexEntry;
use complexity_bench_cli::index::ResultsIndex;
use complexity_bench_cli::index::output_file_name;
use complexity_bench_cli::synthetic::SyntheticBuilder;
use complexity_bench_cli::synthetic::SyntheticRunner;
use complexity_bench_cli::t;
use complexity_bench_cli::toolchain::Prelude;
use complexity_bench_cli::toolchain::ProcessRunner;
use complexity_bench_cli::toolchain::ToolchainBuilder;
use complexity_bench_config::DiscoveredPlan;
use complexity_bench_config::DiscoveryOptions;
use complexity_bench_config::ProfileCatalog;
use complexity_bench_config::TestFilter;
use complexity_bench_config::discover;
use complexity_bench_core::BenchPlan;
use complexity_bench_core::BenchSession;
use complexity_bench_core::CachePlan;
use complexity_bench_core::CancellationToken;
use complexity_bench_core::Profile;
use complexity_bench_core::ProgramRunner;
use complexity_bench_core::RunEvent;
use complexity_bench_core::RunEventSink;
use complexity_bench_core::SessionOptions;
use complexity_bench_core::SessionOutcome;
use complexity_bench_core::SourceBuilder;
use complexity_bench_core::runtime::FanoutEventSink;
use complexity_bench_core::runtime::FileEventSink;
use complexity_bench_core::runtime::assemble_store;
use complexity_bench_core::runtime::load_store;
use complexity_bench_core::runtime::write_store;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Define set by `--high-priority`.
const DEFINE_HIGH_PRIORITY: &str = "BENCHMARK_HIGH_PRIORITY";
/// Define carrying the calibrated TSC frequency in GHz.
const DEFINE_TSC_FREQ: &str = "BENCHMARK_TSC_FREQ";
/// Exit status after an interrupt.
const INTERRUPTED_EXIT_CODE: u8 = 130;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "complexity-bench", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run every planned benchmark under one profile.
    Run(RunCommand),
    /// Run every planned benchmark under every profile in file order.
    RunAll(RunAllCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Result store utilities.
    Store {
        /// Selected store subcommand.
        #[command(subcommand)]
        command: StoreCommand,
    },
}

/// Config discovery arguments.
#[derive(Args, Debug, Clone)]
struct DiscoveryArgs {
    /// Config unit file or directory searched recursively for `*.json`.
    #[arg(short = 's', long = "source", value_name = "PATH", default_value = "benchmarks")]
    source: PathBuf,
    /// Keep only test ids matching this regex at their start.
    #[arg(long = "test-filter", value_name = "REGEX")]
    test_filter: Option<String>,
    /// Header inlined wherever a source includes it by file name.
    #[arg(long, value_name = "PATH")]
    prelude: Option<PathBuf>,
    /// Let later config units override earlier declarations of a test id.
    #[arg(long = "allow-overrides", action = ArgAction::SetTrue)]
    allow_overrides: bool,
}

/// Arguments shared by `run` and `run-all`.
#[derive(Args, Debug, Clone)]
struct SweepArgs {
    /// Config discovery arguments.
    #[command(flatten)]
    discovery: DiscoveryArgs,
    /// Profiles file (overrides `COMPLEXITY_BENCH_PROFILES`).
    #[arg(long, value_name = "PATH")]
    profiles: Option<PathBuf>,
    /// Ignore the previous result store.
    #[arg(short = 'f', long, action = ArgAction::SetTrue)]
    rerun: bool,
    /// Fabricate output instead of compiling and running.
    #[arg(long = "dry-run", action = ArgAction::SetTrue)]
    dry_run: bool,
    /// Define `BENCHMARK_HIGH_PRIORITY=1` for every build.
    #[arg(short = 'p', long = "high-priority", action = ArgAction::SetTrue)]
    high_priority: bool,
    /// Calibrated TSC frequency file in GHz; ignored when absent.
    #[arg(long = "tsc-freq-file", value_name = "PATH", default_value = "tsc_freq.txt")]
    tsc_freq_file: PathBuf,
    /// Continue with the next source after a build or run failure.
    #[arg(long = "keep-going", action = ArgAction::SetTrue)]
    keep_going: bool,
    /// Skip the environment probe commands.
    #[arg(long = "no-probe", action = ArgAction::SetTrue)]
    no_probe: bool,
    /// Stderr log format.
    #[arg(long = "log-format", value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
    /// Also append JSON event lines to this file.
    #[arg(long = "log-file", value_name = "PATH")]
    log_file: Option<PathBuf>,
    /// Do not echo benchmark program output.
    #[arg(long = "quiet-output", action = ArgAction::SetTrue)]
    quiet_output: bool,
}

/// Arguments for `run`.
#[derive(Args, Debug)]
struct RunCommand {
    /// Shared sweep arguments.
    #[command(flatten)]
    sweep: SweepArgs,
    /// Result store to reuse and rewrite.
    #[arg(short = 'o', long, value_name = "PATH", default_value = "results.json")]
    output: PathBuf,
    /// Profile key; defaults to the first profile.
    #[arg(long, value_name = "KEY")]
    profile: Option<String>,
}

/// Arguments for `run-all`.
#[derive(Args, Debug)]
struct RunAllCommand {
    /// Shared sweep arguments.
    #[command(flatten)]
    sweep: SweepArgs,
    /// Device name used in output file names and index entries.
    #[arg(long, value_name = "NAME")]
    device: String,
    /// Directory receiving one result store per profile.
    #[arg(long = "output-dir", value_name = "DIR", default_value = "results")]
    output_dir: PathBuf,
    /// Results index file.
    #[arg(long = "results-index", value_name = "PATH", default_value = "results_index.json")]
    results_index: PathBuf,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Discover and validate config units without running anything.
    Validate(ConfigValidateCommand),
}

/// Arguments for `config validate`.
#[derive(Args, Debug)]
struct ConfigValidateCommand {
    /// Config discovery arguments.
    #[command(flatten)]
    discovery: DiscoveryArgs,
}

/// Store subcommands.
#[derive(Subcommand, Debug)]
enum StoreCommand {
    /// Print the profile and per-test size counts of a result store.
    Summary(StoreSummaryCommand),
}

/// Arguments for `store summary`.
#[derive(Args, Debug)]
struct StoreSummaryCommand {
    /// Result store file.
    #[arg(value_name = "FILE")]
    path: PathBuf,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for localized error messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a localized message.
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
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Run(command) => command_run(&command),
        Commands::RunAll(command) => command_run_all(&command),
        Commands::Config {
            command,
        } => command_config(command),
        Commands::Store {
            command,
        } => command_store(command),
    }
}

/// Emits the top-level help message for the CLI.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

// ============================================================================
// SECTION: Run Commands
// ============================================================================

/// Executes the `run` command.
fn command_run(command: &RunCommand) -> CliResult<ExitCode> {
    let args = &command.sweep;
    let sink = build_sink(args)?;
    let catalog = load_profiles(args)?;
    let (_, profile) = catalog
        .select(command.profile.as_deref())
        .map_err(|err| CliError::new(t!("profiles.load_failed", error = err)))?;
    let discovered = discover_plan(&args.discovery)?;
    report_plan(&discovered, &sink);
    let context = SweepContext::prepare(args)?;

    let report = run_profile(args, &context, &discovered.plan, profile, &command.output, &sink)?;
    report.exit_code()
}

/// Executes the `run-all` command.
fn command_run_all(command: &RunAllCommand) -> CliResult<ExitCode> {
    let args = &command.sweep;
    let sink = build_sink(args)?;
    let catalog = load_profiles(args)?;
    let discovered = discover_plan(&args.discovery)?;
    report_plan(&discovered, &sink);
    let context = SweepContext::prepare(args)?;
    let mut index = ResultsIndex::load(&command.results_index).map_err(|err| {
        CliError::new(t!(
            "run_all.index_failed",
            path = command.results_index.display(),
            error = err
        ))
    })?;

    let mut combined = SweepReport::default();
    for (key, profile) in catalog.iter() {
        if context.cancel.is_cancelled() {
            combined.interrupted = true;
            break;
        }
        let output = command.output_dir.join(output_file_name(&command.device, key));
        notice(args.log_format, &t!("run_all.profile", key = key, path = output.display()))?;
        let report = run_profile(args, &context, &discovered.plan, profile, &output, &sink)?;
        index.upsert(IndexEntry {
            name: format!("{} {key}", command.device),
            path: output.display().to_string(),
        });
        combined.failures += report.failures;
        combined.interrupted |= report.interrupted;
        if report.interrupted || (report.failures > 0 && !args.keep_going) {
            break;
        }
    }

    index.write(&command.results_index).map_err(|err| {
        CliError::new(t!(
            "run_all.index_failed",
            path = command.results_index.display(),
            error = err
        ))
    })?;
    notice(
        args.log_format,
        &t!(
            "run_all.index_written",
            path = command.results_index.display(),
            entries = index.entries().len()
        ),
    )?;
    combined.exit_code()
}

/// Runs one profile and writes its result store.
fn run_profile(
    args: &SweepArgs,
    context: &SweepContext,
    plan: &BenchPlan,
    profile: &Profile,
    output: &Path,
    sink: &dyn RunEventSink,
) -> CliResult<SweepReport> {
    notice(args.log_format, &t!("run.profile", name = profile.name))?;
    let previous = if args.rerun {
        None
    } else {
        load_store(output).map_err(|err| CliError::new(t!("store.load_failed", error = err)))?
    };
    let cache = CachePlan::compute(previous, profile, plan)
        .map_err(|err| CliError::new(t!("store.load_failed", error = err)))?;
    if cache.had_previous() {
        sink.record(&RunEvent::CacheLoaded {
            path: output.display().to_string(),
            records: cache.previous_records(),
            profile_matches: cache.profile_matches(),
        });
    }

    let options = SessionOptions {
        keep_going: args.keep_going,
    };
    let outcome = if args.dry_run {
        execute(plan, cache, SyntheticBuilder, SyntheticRunner::new(), sink, context, options)
    } else {
        let builder = ToolchainBuilder::new(profile.build_command.clone())
            .map_err(|err| CliError::new(t!("run.builder_failed", error = err)))?
            .with_prelude(context.prelude.clone())
            .with_session_defines(context.defines.clone());
        execute(plan, cache, builder, ProcessRunner, sink, context, options)
    };

    let report = SweepReport {
        failures: outcome.failures.len(),
        interrupted: outcome.interrupted,
    };
    let snapshot = environment::snapshot(context.tsc_freq, !args.no_probe);
    let store = assemble_store(profile.clone(), snapshot, outcome.reused, outcome.fresh);
    write_store(output, &store)
        .map_err(|err| CliError::new(t!("store.write_failed", error = err)))?;
    sink.record(&RunEvent::StoreWritten {
        path: output.display().to_string(),
        results: store.results.len(),
    });
    Ok(report)
}

/// Runs one session with the given collaborators.
fn execute<B, R>(
    plan: &BenchPlan,
    cache: CachePlan,
    builder: B,
    runner: R,
    sink: &dyn RunEventSink,
    context: &SweepContext,
    options: SessionOptions,
) -> SessionOutcome
where
    B: SourceBuilder,
    R: ProgramRunner,
{
    BenchSession::new(plan, cache, builder, runner, sink)
        .with_cancellation(context.cancel.clone())
        .with_options(options)
        .run()
}

/// Emits discovery events.
fn report_plan(discovered: &DiscoveredPlan, sink: &dyn RunEventSink) {
    for entry in &discovered.overrides {
        sink.record(&RunEvent::DuplicateTestOverridden {
            test: entry.test.clone(),
            previous: entry.previous.clone(),
            replacement: entry.replacement.clone(),
        });
    }
    sink.record(&RunEvent::PlanLoaded {
        sources: discovered.plan.sources.len(),
        tests: discovered.plan.tests.len(),
    });
}

// ============================================================================
// SECTION: Sweep Context
// ============================================================================

/// Inputs shared by every profile of one invocation.
struct SweepContext {
    /// Defines applied to every build.
    defines: BTreeMap<String, String>,
    /// Calibrated TSC frequency, when available.
    tsc_freq: Option<f64>,
    /// Shared header inlined into sources.
    prelude: Option<Prelude>,
    /// Interrupt flag set by Ctrl-C.
    cancel: CancellationToken,
}

impl SweepContext {
    /// Reads the TSC file and prelude and installs the interrupt handler.
    fn prepare(args: &SweepArgs) -> CliResult<Self> {
        let tsc_freq = environment::read_tsc_freq(&args.tsc_freq_file).map_err(|err| {
            CliError::new(t!("run.tsc_failed", path = args.tsc_freq_file.display(), error = err))
        })?;
        let mut defines = BTreeMap::new();
        if args.high_priority {
            defines.insert(DEFINE_HIGH_PRIORITY.to_string(), "1".to_string());
        }
        if let Some(freq) = tsc_freq {
            defines.insert(DEFINE_TSC_FREQ.to_string(), environment::format_tsc_freq(freq));
        }
        let prelude = args
            .discovery
            .prelude
            .as_deref()
            .map(Prelude::load)
            .transpose()
            .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;

        let cancel = CancellationToken::new();
        let handler = cancel.clone();
        if let Err(err) = ctrlc::set_handler(move || handler.cancel()) {
            write_stderr_line(&t!("run.cancel_handler_failed", error = err))
                .map_err(|err| CliError::new(output_error("stderr", &err)))?;
        }
        Ok(Self {
            defines,
            tsc_freq,
            prelude,
            cancel,
        })
    }
}

/// Summary of one or more profile sweeps.
#[derive(Debug, Default, Clone, Copy)]
struct SweepReport {
    /// Sources that failed.
    failures: usize,
    /// True when an interrupt stopped the sweep.
    interrupted: bool,
}

impl SweepReport {
    /// Maps the sweep result to an exit code.
    fn exit_code(self) -> CliResult<ExitCode> {
        if self.interrupted {
            return Ok(ExitCode::from(INTERRUPTED_EXIT_CODE));
        }
        if self.failures > 0 {
            write_stderr_line(&t!("run.failed", count = self.failures))
                .map_err(|err| CliError::new(output_error("stderr", &err)))?;
            return Ok(ExitCode::FAILURE);
        }
        Ok(ExitCode::SUCCESS)
    }
}

// ============================================================================
// SECTION: Shared Loaders
// ============================================================================

/// Builds the event fan-out for a sweep.
fn build_sink(args: &SweepArgs) -> CliResult<FanoutEventSink> {
    let mut sink = FanoutEventSink::new().with(ConsoleSink::new(args.log_format, args.quiet_output));
    if let Some(path) = &args.log_file {
        let file = FileEventSink::new(path).map_err(|err| {
            CliError::new(t!("run.log_file_failed", path = path.display(), error = err))
        })?;
        sink = sink.with(file);
    }
    Ok(sink)
}

/// Loads the profile catalog.
fn load_profiles(args: &SweepArgs) -> CliResult<ProfileCatalog> {
    ProfileCatalog::load(args.profiles.as_deref())
        .map_err(|err| CliError::new(t!("profiles.load_failed", error = err)))
}

/// Discovers and validates config units.
fn discover_plan(args: &DiscoveryArgs) -> CliResult<DiscoveredPlan> {
    let test_filter = args
        .test_filter
        .as_deref()
        .map(TestFilter::new)
        .transpose()
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    let options = DiscoveryOptions {
        allow_overrides: args.allow_overrides,
        test_filter,
        prelude: args.prelude.clone(),
    };
    discover(&args.source, &options)
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(command: ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate(command) => {
            let discovered = discover_plan(&command.discovery)?;
            write_stdout_line(&t!(
                "config.validate.ok",
                units = discovered.units.len(),
                sources = discovered.plan.sources.len(),
                tests = discovered.plan.tests.len()
            ))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

// ============================================================================
// SECTION: Store Commands
// ============================================================================

/// Dispatches store subcommands.
fn command_store(command: StoreCommand) -> CliResult<ExitCode> {
    match command {
        StoreCommand::Summary(command) => {
            let store = load_store(&command.path)
                .map_err(|err| CliError::new(t!("store.load_failed", error = err)))?
                .ok_or_else(|| {
                    CliError::new(t!("store.missing", path = command.path.display()))
                })?;
            write_stdout_line(&t!("store.summary.profile", name = store.profile.name))
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
            for (id, record) in &store.results {
                write_stdout_line(&t!(
                    "store.summary.entry",
                    test = id,
                    sizes = record.stats.len(),
                    max_c = record.max_c
                ))
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a progress line when the text log format is active.
fn notice(format: LogFormat, message: &str) -> CliResult<()> {
    if format != LogFormat::Text {
        return Ok(());
    }
    write_stderr_line(message).map_err(|err| CliError::new(output_error("stderr", &err)))
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats a localized output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}

//! CLI entrypoint for the ferrolibc conformance harness.

use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};
use ferrolibc_core::escape::{UnescapeMode, escape, unescape_bytes};
use ferrolibc_core::mode::{HumanModeStyle, humanmode, machinemode};
use ferrolibc_core::path::{ProcessDirectory, abspath, cleanname_str, relpath};
use ferrolibc_core::size::{SizeMode, humansize, machinesize, machinesize_default};
use ferrolibc_core::{config, errno};
use ferrolibc_harness::structured_log::{
    ArtifactIndex, LogEmitter, LogLevel, now_utc, validate_log_file,
};
use ferrolibc_harness::{ConformanceReport, FixtureSet, TestRunner, VerificationSummary};

/// Conformance tooling for ferrolibc.
#[derive(Debug, Parser)]
#[command(name = "ferrolibc-harness")]
#[command(about = "Conformance testing harness and codec tools for ferrolibc")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Units {
    Decimal,
    Binary,
}

impl From<Units> for SizeMode {
    fn from(units: Units) -> Self {
        match units {
            Units::Decimal => SizeMode::Decimal,
            Units::Binary => SizeMode::Binary,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeStyle {
    Symbolic,
    WithType,
    Clauses,
}

impl From<ModeStyle> for HumanModeStyle {
    fn from(style: ModeStyle) -> Self {
        match style {
            ModeStyle::Symbolic => HumanModeStyle::Symbolic,
            ModeStyle::WithType => HumanModeStyle::WithType,
            ModeStyle::Clauses => HumanModeStyle::Clauses,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Verify the implementation against fixture files.
    Verify {
        /// Fixture JSON file, or a directory of them.
        #[arg(long, default_value = "tests/conformance/fixtures")]
        fixture: PathBuf,
        /// Output report path (markdown).
        #[arg(long)]
        report: Option<PathBuf>,
        /// Output report path (JSON).
        #[arg(long)]
        json: Option<PathBuf>,
        /// Structured JSONL log path.
        #[arg(long)]
        log: Option<PathBuf>,
        /// Artifact index path; records digests of the reports and log.
        #[arg(long)]
        artifact_index: Option<PathBuf>,
        /// Optional fixed timestamp string for deterministic report generation.
        #[arg(long)]
        timestamp: Option<String>,
    },
    /// Parse a file mode, or render one with --render.
    Mode {
        /// Mode text (`755`, `u+x,go-w`, `-rwxr-xr-x`), or octal bits with --render.
        input: String,
        /// Treat the input as octal bits and print a human form.
        #[arg(long)]
        render: bool,
        /// Output style for --render.
        #[arg(long, value_enum, default_value = "symbolic")]
        style: ModeStyle,
        /// Apply the parsed update to this octal base mode.
        #[arg(long)]
        base: Option<String>,
    },
    /// Parse a byte size, or render one with --render.
    Size {
        /// Size text (`1.5 GiB`, `2M + 512K`), or a byte count with --render.
        input: String,
        /// Treat the input as a byte count and print a human form.
        #[arg(long)]
        render: bool,
        /// Unit interpretation; defaults to FERROLIBC_SIZE_UNITS.
        #[arg(long, value_enum)]
        units: Option<Units>,
    },
    /// Lexically clean a path.
    Clean {
        path: String,
    },
    /// Make a path absolute against the working directory.
    Abspath {
        file: String,
        /// Directory a relative path is resolved under.
        #[arg(long)]
        reference: Option<String>,
    },
    /// Express a path relative to a directory.
    Relpath {
        file: String,
        /// Directory to be relative to; defaults to the working directory.
        #[arg(long)]
        reference: Option<String>,
    },
    /// Backslash-escape a string.
    Escape {
        input: String,
        /// Punctuation byte to escape as well, e.g. '"'.
        #[arg(long)]
        quote: Option<char>,
    },
    /// Decode backslash escapes; writes raw bytes to stdout.
    Unescape {
        input: String,
        /// Keep unknown escapes verbatim.
        #[arg(long)]
        keep: bool,
        /// Drop the backslash of unknown escapes.
        #[arg(long)]
        drop: bool,
        /// Write decoded values as single bytes instead of UTF-8.
        #[arg(long)]
        raw: bool,
    },
    /// Validate a structured JSONL log file.
    ValidateLog {
        path: PathBuf,
    },
}

fn core_error(err: ferrolibc_core::Error) -> Box<dyn std::error::Error> {
    let name = errno::errno_name(err.errno()).unwrap_or("EUNKNOWN");
    format!("{name}: {err}").into()
}

fn run_verify(
    fixture: PathBuf,
    report: Option<PathBuf>,
    json: Option<PathBuf>,
    log: Option<PathBuf>,
    artifact_index: Option<PathBuf>,
    timestamp: Option<String>,
) -> Result<bool, Box<dyn std::error::Error>> {
    eprintln!("Verifying against fixtures in {}", fixture.display());
    let sets = FixtureSet::load_all(&fixture)?;
    if sets.is_empty() {
        return Err(format!("No fixture JSON files found in {}", fixture.display()).into());
    }

    let run_id = format!("run-{}", std::process::id());
    let runner = TestRunner::new("fixture-verify");
    let started = Instant::now();
    let mut emitter = match &log {
        Some(path) => Some(LogEmitter::to_file(path, &runner.campaign, &run_id)?),
        None => None,
    };

    let mut results = Vec::new();
    for (path, set) in &sets {
        eprintln!("  {} ({} cases)", path.display(), set.cases.len());
        match emitter.as_mut() {
            Some(emitter) => results.extend(runner.run_logged(set, emitter)?),
            None => results.extend(runner.run(set)),
        }
    }

    // Stabilize report ordering for reproducible golden-output hashing.
    results.sort_by(|a, b| {
        a.family
            .cmp(&b.family)
            .then_with(|| a.case_name.cmp(&b.case_name))
    });

    let summary = VerificationSummary::from_results(results);
    let all_passed = summary.all_passed();
    let conformance = ConformanceReport {
        title: String::from("ferrolibc conformance report"),
        timestamp: timestamp.unwrap_or_else(now_utc),
        summary,
    };

    let mut written = Vec::new();
    if let Some(path) = &report {
        std::fs::write(path, conformance.to_markdown())?;
        written.push((path.clone(), "report_markdown"));
    }
    if let Some(path) = &json {
        std::fs::write(path, conformance.to_json())?;
        written.push((path.clone(), "report_json"));
    }
    if report.is_none() && json.is_none() {
        print!("{}", conformance.to_markdown());
    }

    if let Some(mut emitter) = emitter {
        let entry = emitter
            .entry(
                if all_passed { LogLevel::Info } else { LogLevel::Error },
                "verify_complete",
            )
            .with_duration_ms(u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX))
            .with_artifacts(written.iter().map(|(p, _)| p.display().to_string()).collect());
        emitter.emit_entry(entry)?;
        emitter.flush()?;
    }
    if let Some(path) = &log {
        written.push((path.clone(), "log_jsonl"));
    }

    if let Some(index_path) = &artifact_index {
        let mut index = ArtifactIndex::new(&run_id, &runner.campaign);
        for (path, kind) in &written {
            index.add_file(path, *kind)?;
        }
        std::fs::write(index_path, index.to_json()?)?;
    }

    eprintln!(
        "{} passed, {} failed",
        conformance.summary.passed, conformance.summary.failed
    );
    Ok(all_passed)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Verify {
            fixture,
            report,
            json,
            log,
            artifact_index,
            timestamp,
        } => {
            if !run_verify(fixture, report, json, log, artifact_index, timestamp)? {
                std::process::exit(1);
            }
        }
        Command::Mode {
            input,
            render,
            style,
            base,
        } => {
            if render {
                let bits = u32::from_str_radix(input.trim_start_matches("0o"), 8)?;
                println!("{}", humanmode(bits, style.into()));
            } else {
                let update = machinemode(&input).map_err(core_error)?;
                match base {
                    Some(base) => {
                        let base = u32::from_str_radix(base.trim_start_matches("0o"), 8)?;
                        println!("{:04o}", update.apply(base));
                    }
                    None => println!("{update}"),
                }
            }
        }
        Command::Size {
            input,
            render,
            units,
        } => {
            let mode = units.map_or_else(config::size_units, SizeMode::from);
            if render {
                println!("{}", humansize(input.trim().parse()?, mode));
            } else {
                let bytes = match units {
                    Some(units) => machinesize(&input, units.into()),
                    None => machinesize_default(&input),
                }
                .map_err(core_error)?;
                println!("{bytes}");
            }
        }
        Command::Clean { path } => println!("{}", cleanname_str(&path)),
        Command::Abspath { file, reference } => {
            let path = abspath(
                file.as_bytes(),
                reference.as_deref().map(str::as_bytes),
                &ProcessDirectory,
            )
            .map_err(core_error)?;
            println!("{}", String::from_utf8_lossy(&path));
        }
        Command::Relpath { file, reference } => {
            let path = relpath(
                file.as_bytes(),
                reference.as_deref().map(str::as_bytes),
                &ProcessDirectory,
            )
            .map_err(core_error)?;
            println!("{}", String::from_utf8_lossy(&path));
        }
        Command::Escape { input, quote } => {
            let quote = match quote {
                Some(c) if c.is_ascii() => c as u8,
                Some(c) => return Err(format!("quote must be ASCII, got {c:?}").into()),
                None => 0,
            };
            let out = escape(input.as_bytes(), quote).map_err(core_error)?;
            println!("{}", String::from_utf8_lossy(&out));
        }
        Command::Unescape {
            input,
            keep,
            drop,
            raw,
        } => {
            // Explicit flags replace the FERROLIBC_ESCAPE_UNKNOWN policy.
            let mut mode = if keep || drop {
                let mut mode = UnescapeMode::empty();
                mode.set(UnescapeMode::KEEP_UNKNOWN, keep);
                mode.set(UnescapeMode::DROP_UNKNOWN, drop);
                mode
            } else {
                config::escape_unknown().mode()
            };
            mode.set(UnescapeMode::RAW, raw);
            let out = unescape_bytes(input.as_bytes(), mode).map_err(core_error)?;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&out)?;
            stdout.write_all(b"\n")?;
        }
        Command::ValidateLog { path } => {
            let (lines, errors) = validate_log_file(&path)?;
            for err in &errors {
                eprintln!("{err}");
            }
            println!("{lines} lines, {} errors", errors.len());
            if !errors.is_empty() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

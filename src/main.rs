// logtriage - main.rs
//
// CLI entry point. Handles:
// 1. Argument parsing
// 2. Logging initialisation (debug mode support)
// 3. Config loading
// 4. Dispatch into the engine (clean / split / follow)
//
// All classification, cleaning, splitting, and tailing logic lives in
// the library; this file only wires arguments to engine calls and
// reports results.

use clap::Parser;
use logtriage::app::pipeline::{self, AnalyzeOptions};
use logtriage::app::tail::{TailManager, TailProgress};
use logtriage::core::classify::RuleSet;
use logtriage::core::split::NamingMode;
use logtriage::platform::config::{self, AppConfig};
use logtriage::platform::fs;
use logtriage::util::error::{Result, TriageError};
use logtriage::util::{constants, logging};
use std::path::PathBuf;
use std::time::Duration;

/// logtriage - boot-diagnostic log classifier.
///
/// Classifies each line of a log file by severity, optionally removes
/// junk lines (blank, NUL-heavy, low-information), and writes one
/// output file per category. Can follow a growing file, printing newly
/// appended lines with their categories.
#[derive(Parser, Debug)]
#[command(name = "logtriage", version, about)]
struct Cli {
    /// Log file to process.
    file: PathBuf,

    /// Remove junk lines before classification. Writes a
    /// `<stem>_cleaned<ext>` copy unless --in-place is given.
    #[arg(short, long)]
    clean: bool,

    /// With --clean: overwrite the input file instead of writing a copy.
    #[arg(long, requires = "clean")]
    in_place: bool,

    /// Output directory for split files (defaults to the input's directory).
    #[arg(short, long)]
    outdir: Option<PathBuf>,

    /// Output filename prefix for extended naming (defaults to the
    /// input's base name).
    #[arg(short, long)]
    prefix: Option<String>,

    /// Use legacy bare filenames: error.txt, warning.txt, success.txt,
    /// other.txt.
    #[arg(long)]
    legacy: bool,

    /// With --legacy: fold info/debug/platform-info lines into
    /// other.txt instead of dropping them.
    #[arg(long, requires = "legacy")]
    fold_other: bool,

    /// After splitting, follow the file and print newly appended lines
    /// with their categories until interrupted.
    #[arg(short = 'F', long)]
    follow: bool,

    /// Write a JSON run summary to this path.
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short, long)]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    // Config is loaded before logging so the configured level can feed
    // the filter; warnings collected during the load are replayed once
    // the subscriber is up.
    let platform_paths = config::PlatformPaths::resolve();
    let (app_config, config_warnings) = config::load_config(&platform_paths.config_dir);

    logging::init(cli.debug, app_config.log_level.as_deref());

    for warning in &config_warnings {
        tracing::warn!("{warning}");
    }

    tracing::info!(
        version = constants::APP_VERSION,
        debug = cli.debug,
        "logtriage starting"
    );

    if let Err(e) = run(&cli, &app_config) {
        tracing::error!(error = %e, "Run failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli, config: &AppConfig) -> Result<()> {
    if !fs::exists(&cli.file) {
        return Err(TriageError::io(
            &cli.file,
            "open input file",
            std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
        ));
    }

    let naming = if cli.legacy {
        NamingMode::Legacy {
            fold_extra: cli.fold_other,
        }
    } else {
        config.naming_mode
    };

    let options = AnalyzeOptions {
        clean: false, // handled at the file level by clean_and_analyze
        junk: config.junk,
        rules: RuleSet::builtin(),
        output_dir: cli.outdir.clone(),
        prefix: cli.prefix.clone(),
        naming,
    };

    // Cleaning happens at the file level first, so the split (and any
    // follow) operates on the cleaned content, matching the historical
    // workflow. The summary's line counts describe the original input.
    let (input, summary) = if cli.clean {
        pipeline::clean_and_analyze(&cli.file, cli.in_place, &options)?
    } else {
        (cli.file.clone(), pipeline::analyze_file(&cli.file, &options)?)
    };

    for path in &summary.files_written {
        println!("{}", path.display());
    }

    if let Some(ref out) = cli.summary {
        let json = serde_json::to_string_pretty(&summary).map_err(|e| {
            TriageError::io(
                out,
                "encode summary JSON",
                std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            )
        })?;
        fs::write_atomic(out, json.as_bytes())
            .map_err(|e| TriageError::io(out, "write summary JSON", e))?;
        tracing::info!(path = %out.display(), "Run summary written");
    }

    if cli.follow {
        follow(input, config);
    }

    Ok(())
}

/// Follow loop: stream classified lines to stdout until interrupted.
/// Transient file errors are reported and retried by the watcher.
fn follow(input: PathBuf, config: &AppConfig) {
    tracing::info!(file = %input.display(), "Entering follow mode, press Ctrl+C to exit");

    let mut manager = TailManager::new();
    manager.start(input, RuleSet::builtin(), config.tail_poll_interval_ms);

    loop {
        match manager.recv_progress_timeout(Duration::from_secs(1)) {
            Some(TailProgress::NewLines { lines }) => {
                for line in lines {
                    println!("[{}] {}", line.category, line.text);
                }
            }
            Some(TailProgress::FileError { path, message }) => {
                tracing::warn!(file = %path.display(), "Tail error (will retry): {message}");
            }
            Some(TailProgress::Stopped) => break,
            Some(TailProgress::Started) | None => {}
        }
    }
}

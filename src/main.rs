//! CLI entry point for wedge-scan
//!
//! Provides commands for capturing scans from a keyboard-wedge scanner,
//! replaying recorded key scripts, and inspecting or clearing the history.

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::*;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use wedge_scan::{
    config::{expand_path, DeviceProfile, DEFAULT_HISTORY_DIR},
    dispatch::{ScanDispatcher, TerminalBell, TerminalView},
    history::{FileStorage, HistoryStore},
    input::{self, KeyboardCapture},
};

#[derive(Parser)]
#[command(name = "wedge-scan")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Capture scans typed into this terminal (Ctrl+C or Esc to stop)
    Listen {
        /// Device profile (JSON) with timing thresholds and terminator keys
        #[arg(short, long)]
        profile: Option<PathBuf>,

        /// Directory holding the scan history
        #[arg(long, default_value = DEFAULT_HISTORY_DIR)]
        history_dir: PathBuf,

        /// Do not ring the terminal bell after each scan
        #[arg(long)]
        no_beep: bool,
    },

    /// Feed a recorded key script through the segmenter
    Replay {
        /// JSON-lines key script
        script: PathBuf,

        /// Device profile (JSON) with timing thresholds and terminator keys
        #[arg(short, long)]
        profile: Option<PathBuf>,

        /// Directory holding the scan history
        #[arg(long, default_value = DEFAULT_HISTORY_DIR)]
        history_dir: PathBuf,
    },

    /// Show the scan history, newest first
    History {
        /// Directory holding the scan history
        #[arg(long, default_value = DEFAULT_HISTORY_DIR)]
        history_dir: PathBuf,

        /// Show at most this many scans
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Delete every scan from the history
    Clear {
        /// Directory holding the scan history
        #[arg(long, default_value = DEFAULT_HISTORY_DIR)]
        history_dir: PathBuf,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Listen {
            profile,
            history_dir,
            no_beep,
        } => listen(profile.as_deref(), &history_dir, no_beep)?,
        Commands::Replay {
            script,
            profile,
            history_dir,
        } => replay(&script, profile.as_deref(), &history_dir)?,
        Commands::History { history_dir, limit } => show_history(&history_dir, limit)?,
        Commands::Clear { history_dir, yes } => clear_history(&history_dir, yes)?,
    }

    Ok(())
}

/// Logs go to stderr so they never mix with scan output
fn init_tracing() {
    // RUST_LOG=wedge_scan=debug
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}

fn load_profile(path: Option<&Path>) -> anyhow::Result<DeviceProfile> {
    match path {
        Some(path) => Ok(DeviceProfile::load(path)?),
        None => Ok(DeviceProfile::default()),
    }
}

fn open_store(history_dir: &Path) -> anyhow::Result<HistoryStore<FileStorage>> {
    let dir = expand_path(history_dir)?;
    Ok(HistoryStore::open(FileStorage::new(dir)))
}

/// Interactive capture session
fn listen(profile: Option<&Path>, history_dir: &Path, no_beep: bool) -> anyhow::Result<()> {
    let profile = load_profile(profile)?;
    let store = open_store(history_dir)?;

    println!("{} Device profile: {}", "→".cyan(), profile.name.bold());
    println!(
        "{} {} scans on record. Ready to scan (Ctrl+C or Esc to stop)\n",
        "✓".green(),
        store.size()
    );

    let mut dispatcher =
        ScanDispatcher::new(&profile, store).with_observer(Box::new(TerminalView::raw()));
    if !no_beep {
        dispatcher = dispatcher.with_tone(Box::new(TerminalBell));
    }

    let recorded = {
        let mut capture = KeyboardCapture::start().context("Failed to capture the terminal")?;
        capture.run(&mut dispatcher)?
    };

    println!(
        "\n{} {} scan{} recorded this session, {} on record",
        "✓".green(),
        recorded,
        if recorded == 1 { "" } else { "s" },
        dispatcher.history().size()
    );

    Ok(())
}

/// Deterministic replay of a recorded key script
fn replay(script: &Path, profile: Option<&Path>, history_dir: &Path) -> anyhow::Result<()> {
    let profile = load_profile(profile)?;
    let script_path = expand_path(script)?;
    let keys = input::load_script(&script_path)
        .with_context(|| format!("Failed to load script {}", script_path.display()))?;

    println!(
        "{} Replaying {} key events from {}",
        "→".cyan(),
        keys.len(),
        script_path.display()
    );

    let store = open_store(history_dir)?;
    let mut dispatcher =
        ScanDispatcher::new(&profile, store).with_observer(Box::new(TerminalView::new()));

    let records = input::replay(&keys, &mut dispatcher, Instant::now());

    println!("\n{} {} scans recovered", "✓".green(), records.len());
    Ok(())
}

/// Print the stored history with summary figures
fn show_history(history_dir: &Path, limit: Option<usize>) -> anyhow::Result<()> {
    let store = open_store(history_dir)?;
    let stats = store.stats();

    if stats.total == 0 {
        println!("{}", "Waiting for the first scan…".dimmed());
        return Ok(());
    }

    println!(
        "{} Total: {}   Last: {}\n",
        "✓".green(),
        stats.total.to_string().bold(),
        stats.last_time.as_deref().unwrap_or("--:--:--")
    );

    for (i, record) in store.iter().take(limit.unwrap_or(usize::MAX)).enumerate() {
        let code = if i == 0 {
            record.code().green().bold()
        } else {
            record.code().normal()
        };

        println!(
            "{} {}  {}",
            format!("{:>4}.", record.sequence_id()).dimmed(),
            code,
            record.full_time().dimmed()
        );
    }

    Ok(())
}

/// Clear the history after confirmation
fn clear_history(history_dir: &Path, yes: bool) -> anyhow::Result<()> {
    let store = open_store(history_dir)?;

    if store.is_empty() {
        println!("{} History is already empty", "✓".green());
        return Ok(());
    }

    if !yes && !confirm(&format!("Clear scan history ({} scans)? [y/N] ", store.size()))? {
        println!("{}", "Aborted".yellow());
        return Ok(());
    }

    let mut dispatcher = ScanDispatcher::new(&DeviceProfile::default(), store);
    dispatcher
        .clear_history()
        .context("History cleared in memory but could not be saved")?;

    println!("{} History cleared", "✓".green());
    Ok(())
}

fn confirm(prompt: &str) -> anyhow::Result<bool> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;

    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

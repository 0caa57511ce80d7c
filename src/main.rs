//! Keyline - keyword-classified notes in the terminal.
//!
//! # Usage
//!
//! ```bash
//! keyline show
//! keyline import notes.txt
//! keyline classify "todo buy milk"
//! keyline indent 3
//! ```

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use keyline::config::{
    ConfigFlags, IndentStyle, clear_config_flags, global_config_path, load_config_flags,
    local_override_path, parse_flag_tokens, save_config_flags,
};
use keyline::editor::{Session, ShiftDirection};
use keyline::normalize::normalize;
use keyline::perf;
use keyline::store::{FileStore, SnapshotStore};
use keyline::style::{Classifier, StyleTable};
use keyline::ui::{ColorMode, render_lines};

/// Keyword-classified line notes
#[derive(Parser, Debug)]
#[command(name = "keyline", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Directory holding the saved snapshot
    #[arg(long, global = true, value_name = "PATH")]
    store_dir: Option<PathBuf>,

    /// JSON file with a custom style rule table
    #[arg(long, global = true, value_name = "PATH")]
    rules: Option<PathBuf>,

    /// Character used for indentation
    #[arg(long, global = true, value_enum)]
    indent: Option<IndentStyle>,

    /// Number of characters per indentation step
    #[arg(long, global = true, value_name = "N")]
    indent_width: Option<usize>,

    /// Print plain text without terminal styling
    #[arg(long, global = true)]
    no_color: bool,

    /// Enable performance logging
    #[arg(long, global = true)]
    perf: bool,

    /// Append every change batch to a log file
    #[arg(long, global = true, value_name = "PATH")]
    debug_log: Option<PathBuf>,

    /// Save current command-line flags as defaults
    #[arg(long, global = true)]
    save: bool,

    /// Clear saved defaults
    #[arg(long, global = true)]
    clear: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the saved lines with their styles (default)
    Show,
    /// Replace the saved lines with the contents of a text file
    Import {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Print the saved lines as plain text
    Export,
    /// Show the attributes a line of text gets and which rules matched
    Classify {
        #[arg(value_name = "TEXT")]
        text: String,
    },
    /// Indent (or outdent) a saved line, numbered from 1
    Indent {
        #[arg(value_name = "LINE")]
        line: usize,
        #[arg(long)]
        outdent: bool,
    },
    /// Remove the saved lines
    Reset,
}

fn load_classifier(rules: Option<&Path>) -> Result<Classifier> {
    let Some(path) = rules else {
        return Ok(Classifier::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read rules {}", path.display()))?;
    let table = StyleTable::from_json(&json)
        .with_context(|| format!("Invalid rules in {}", path.display()))?;
    Ok(Classifier::new(table))
}

fn open_session(effective: &ConfigFlags, store: SnapshotStore<FileStore>) -> Result<Session> {
    let classifier = load_classifier(effective.rules.as_deref())?;
    Ok(Session::open(store, classifier).with_indent_unit(effective.indent_unit()))
}

fn run(command: Command, effective: &ConfigFlags) -> Result<()> {
    let store = SnapshotStore::new(FileStore::new(effective.store_dir()));
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match command {
        Command::Show => {
            let session = open_session(effective, store)?;
            render_lines(
                &mut out,
                session.buffer().lines(),
                ColorMode::detect(effective.no_color),
            )
            .context("Failed to write output")?;
        }
        Command::Export => {
            let session = open_session(effective, store)?;
            for text in session.buffer().texts() {
                writeln!(out, "{text}")?;
            }
        }
        Command::Import { file } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let lines = normalize(&raw);
            let mut store = store;
            store
                .save(&lines)
                .with_context(|| format!("Failed to save lines from {}", file.display()))?;
            writeln!(out, "imported {} lines", lines.len())?;
        }
        Command::Classify { text } => {
            let classifier = load_classifier(effective.rules.as_deref())?;
            let attributes = classifier.classify(&text)?;
            writeln!(out, "{attributes}")?;
            for rule in classifier.explain(&text) {
                writeln!(out, "  {:<8} /{}/", rule.tier().to_string(), rule.pattern())?;
            }
        }
        Command::Indent { line, outdent } => {
            let mut session = open_session(effective, store)?;
            let index = line.checked_sub(1).context("Line numbers start at 1")?;
            if session.place_cursor(index, 0).is_none() {
                anyhow::bail!("No line {line} (have {})", session.buffer().len());
            }
            let direction = if outdent {
                ShiftDirection::Outdent
            } else {
                ShiftDirection::Indent
            };
            session.shift(direction)?;
            let mode = ColorMode::detect(effective.no_color);
            render_lines(&mut out, session.buffer().line_at(index), mode)
                .context("Failed to write output")?;
        }
        Command::Reset => {
            let mut store = store;
            store.clear().context("Failed to clear saved lines")?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    perf::set_enabled(effective.perf);
    let debug_log_path = effective
        .debug_log
        .clone()
        .or_else(|| std::env::var_os("KEYLINE_DEBUG_LOG").map(PathBuf::from));
    if let Err(err) = perf::open_event_log(debug_log_path.as_deref()) {
        tracing::warn!(
            path = %debug_log_path
                .as_ref()
                .map_or_else(|| "<unset>".to_string(), |p| p.display().to_string()),
            %err,
            "failed to open change log"
        );
    }

    let _scope = perf::scope("main.run");
    run(cli.command.unwrap_or(Command::Show), &effective).context("keyline error")
}

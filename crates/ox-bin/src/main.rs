//! oxbuf entrypoint: a headless driver that loads a file, runs searches, replacements and
//! highlighting through the buffer engine, and optionally writes the result.
use anyhow::{Context, Result};
use clap::Parser;
use core_buffer::{Buffer, EditorContext, Position, TokenKind};
use core_config::load_from;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

const LOG_FILE: &str = "oxbuf.log";

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "oxbuf", version, about = "Headless text buffer driver")]
struct Args {
    /// File to load (UTF-8 text). A missing file starts as an empty buffer.
    pub path: PathBuf,
    /// Configuration file path (overrides discovery of `oxbuf.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Print the first match of TERM as `row:column` (1-based). Repeatable.
    #[arg(long = "find", value_name = "TERM")]
    pub find: Vec<String>,
    /// Replace every OLD with NEW. Repeatable; applied in order before any search.
    #[arg(long = "replace", num_args = 2, value_names = ["OLD", "NEW"])]
    pub replace: Vec<String>,
    /// Print the highlight tokens of every line.
    #[arg(long)]
    pub highlight: bool,
    /// Print the resulting text after all edits.
    #[arg(long)]
    pub print: bool,
    /// Save the result to FILE.
    #[arg(long, value_name = "FILE", conflicts_with = "write")]
    pub output: Option<PathBuf>,
    /// Save the result back to PATH.
    #[arg(long)]
    pub write: bool,
}

struct AppStartup {
    log_guard: Option<WorkerGuard>,
}

impl AppStartup {
    fn new() -> Self {
        Self { log_guard: None }
    }

    fn configure_logging(&mut self) -> Result<()> {
        let log_dir = Path::new(".");
        let log_path = log_dir.join(LOG_FILE);
        if log_path.exists() {
            let _ = std::fs::remove_file(&log_path);
        }

        let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
        let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
        if tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_ansi(false)
            .with_writer(nb_writer)
            .try_init()
            .is_ok()
        {
            self.log_guard = Some(guard);
        }
        // Otherwise a subscriber is already installed and the guard drops here.
        Ok(())
    }

    fn install_panic_hook() {
        static HOOK: Once = Once::new();
        HOOK.call_once(|| {
            let default_panic = std::panic::take_hook();
            std::panic::set_hook(Box::new(move |info| {
                tracing::error!(target: "runtime.panic", ?info, "panic");
                default_panic(info);
            }));
        });
    }
}

fn kind_name(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::Keyword => "keyword",
        TokenKind::String => "string",
        TokenKind::Comment => "comment",
        TokenKind::Default => "default",
    }
}

/// `row:column` with both counted from 1.
fn format_position(pos: Option<Position>) -> String {
    match pos {
        Some(p) => format!("{}:{}", p.row + 1, p.column + 1),
        None => "not found".to_string(),
    }
}

fn print_highlight(buffer: &mut Buffer, out: &mut impl Write) -> Result<()> {
    for row in 0..buffer.line_count() {
        let tokens = buffer.highlight(row)?;
        write!(out, "{}:", row + 1)?;
        for t in tokens {
            write!(out, " {}@{}..{}", kind_name(t.kind), t.start, t.end)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Everything after startup: load, edit, report, save.
fn execute(args: &Args, out: &mut impl Write) -> Result<()> {
    let config = load_from(args.config.clone())?;
    let mut ctx = EditorContext::new(config);
    let config_source = ctx.config().source.clone();
    let id = ctx
        .open(&args.path)
        .with_context(|| format!("opening {}", args.path.display()))?;
    let buffer = ctx.buffer_mut(id)?;
    info!(
        target: "runtime.startup",
        file = %args.path.display(),
        lines = buffer.line_count(),
        language = buffer.language().name(),
        config_override = args.config.is_some(),
        config_source = ?config_source,
        "bootstrap_complete"
    );

    for pair in args.replace.chunks_exact(2) {
        let count = buffer.replace_all(&pair[0], &pair[1])?;
        writeln!(out, "replaced {count}")?;
    }
    for term in &args.find {
        let found = buffer.find_next(term, Position::origin())?;
        writeln!(out, "{}", format_position(found))?;
    }
    if args.highlight {
        print_highlight(buffer, out)?;
    }
    if args.print {
        writeln!(out, "{}", buffer.text())?;
    }

    if let Some(target) = &args.output {
        buffer.save_file(target)?;
        info!(target: "runtime", file = %target.display(), "saved_output");
    } else if args.write {
        buffer.save()?;
        info!(target: "runtime", file = %args.path.display(), "saved_in_place");
    }
    Ok(())
}

fn main() -> Result<()> {
    let mut startup = AppStartup::new();
    startup.configure_logging()?;
    AppStartup::install_panic_hook();
    info!(target: "runtime", "startup");

    let args = Args::parse();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let result = execute(&args, &mut out);
    if let Err(e) = &result {
        tracing::error!(target: "runtime", error = %e, "run_failed");
    }
    info!(target: "runtime", ok = result.is_ok(), "shutdown");
    result
}

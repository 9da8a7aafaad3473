//! termline - interactive line editor demo
//!
//! Reads lines with history, completion and colors from the configuration
//! file, or dumps decoded keys in inspector mode.
//!
//! # Quick Start
//!
//! ```text
//! termline                 # Edit lines, `exit` or Ctrl+D to quit
//! termline -p "db> "       # Custom prompt
//! termline -k              # Show what each key press decodes to
//! ```
//!
//! # Keys
//!
//! | Key | Action |
//! |-----|--------|
//! | Left/Right | Move within the line |
//! | Home/End | Jump to start/end |
//! | Up/Down | Walk the history |
//! | Tab | Complete the line |
//! | Ctrl+C / Ctrl+D | Exit |

use std::env;
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use termline::config::{data_dir, Config};
use termline::{Completion, History, Io, Key, Session, StandardIo, Status};

/// Version string from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Options given on the command line
#[derive(Debug, Default)]
struct Args {
    prompt: Option<String>,
    inspect_keys: bool,
    no_history: bool,
}

fn print_version() {
    eprintln!("termline {}", VERSION);
}

fn print_help() {
    eprintln!("termline {} - interactive line editor", VERSION);
    eprintln!();
    eprintln!("Usage: termline [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -p, --prompt <TEXT>   Prompt shown before each line");
    eprintln!("  -k, --keys            Print each decoded key until Ctrl+C");
    eprintln!("  --no-history          Do not load or save the history file");
    eprintln!("  -v, --version         Show version");
    eprintln!("  -h, --help            Show this help");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  help                  List commands");
    eprintln!("  history               List previous lines");
    eprintln!("  exit, quit            Leave");
    eprintln!();
    eprintln!("Configuration: ~/.termline/config.toml");
    eprintln!("Logging:       ~/.termline/termline.log (filter with TERMLINE_LOG)");
}

fn parse_args() -> std::result::Result<Args, String> {
    let args: Vec<String> = env::args().collect();
    let mut parsed = Args::default();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-v" | "--version" => {
                print_version();
                std::process::exit(0);
            }
            "-p" | "--prompt" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing prompt argument".to_string());
                }
                parsed.prompt = Some(args[i].clone());
            }
            "-k" | "--keys" => {
                parsed.inspect_keys = true;
            }
            "--no-history" => {
                parsed.no_history = true;
            }
            arg => {
                return Err(format!("Unknown argument: {}", arg));
            }
        }
        i += 1;
    }

    Ok(parsed)
}

/// Log to `~/.termline/termline.log`, never to the terminal being edited
fn init_logging(level: &str) {
    let log_path = data_dir()
        .map(|dir| dir.join("termline.log"))
        .unwrap_or_else(|| Path::new("termline.log").to_path_buf());

    if let Some(parent) = log_path.parent() {
        let _ = fs::create_dir_all(parent);
    }

    let Ok(file) = OpenOptions::new().create(true).append(true).open(&log_path) else {
        return;
    };

    let filter = EnvFilter::try_from_env("TERMLINE_LOG")
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Print the decoded form of every key until Ctrl+C
fn inspect_keys(io: &mut dyn Io) -> Result<()> {
    io.write("Press keys to see their codes, Ctrl+C to stop\n")?;
    loop {
        let key = io.get_key()?;
        io.write(&format!("{}\n", key.describe()))?;
        if key == Key::ctrl('c') {
            return Ok(());
        }
    }
}

fn build_session(config: &Config, history: History) -> Session {
    let mut completion = Completion::new();
    completion.extend(&config.completion.words);
    completion.insert("help");

    let mut session = Session::with_parts(StandardIo::new(), history, completion);
    session.set_prompt_style(config.style.prompt_style());
    session.set_line_style(config.style.line_style());

    session.on_line_entered(|line, session| {
        if line != "help" {
            return Ok(Status::Ok);
        }
        session.write_text("Commands:\n")?;
        session.write_text("  help       List commands\n")?;
        session.write_text("  history    List previous lines\n")?;
        session.write_text("  exit       Leave\n")?;
        Ok(Status::Continue)
    });

    session
}

fn main() -> Result<()> {
    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Use --help for usage information");
            std::process::exit(1);
        }
    };

    let config = Config::load();
    init_logging(&config.log.level);
    info!("termline {} starting", VERSION);

    if args.inspect_keys {
        return inspect_keys(&mut StandardIo::new()).context("Key inspector failed");
    }

    let history_path = if args.no_history { None } else { config.history_path() };
    let mut history = match &history_path {
        Some(path) => History::with_file(path, config.history.limit),
        None => History::new(config.history.limit),
    };
    if let Err(e) = history.load() {
        warn!("{}", e);
        eprintln!("Warning: {}", e);
    }

    let mut session = build_session(&config, history);
    session
        .set_cursor_style(config.style.cursor_style())
        .context("Failed to set cursor color")?;

    let prompt = args.prompt.unwrap_or_else(|| config.prompt.clone());
    let outcome = session.run(&prompt).context("Line editing session failed");

    session.reset_style().context("Failed to reset terminal colors")?;
    session.history().save().context("Failed to save history")?;
    info!("termline exiting");
    outcome
}

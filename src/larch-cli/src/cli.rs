//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, ValueEnum};
use larch_motion::LineEnding;

/// Log verbosity level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// Only show errors
    Error,
    /// Show warnings and errors (default)
    #[default]
    Warn,
    /// Show progress messages, warnings, and errors
    Info,
    /// Show debug messages and above
    Debug,
    /// Show every chunk
    Trace,
}

impl LogLevel {
    /// Convert to tracing filter string.
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    /// Parse from string (case-insensitive).
    pub fn from_str_loose(s: &str) -> Option<LogLevel> {
        match s.to_lowercase().as_str() {
            "error" => Some(LogLevel::Error),
            "warn" | "warning" => Some(LogLevel::Warn),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            "trace" => Some(LogLevel::Trace),
            _ => None,
        }
    }
}

/// Line ending used for inserted text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LineEndingArg {
    /// Detect from the file's content
    #[default]
    Auto,
    Lf,
    Crlf,
}

impl LineEndingArg {
    /// The forced line ending, or `None` to detect.
    pub fn forced(&self) -> Option<LineEnding> {
        match self {
            LineEndingArg::Auto => None,
            LineEndingArg::Lf => Some(LineEnding::Lf),
            LineEndingArg::Crlf => Some(LineEnding::CrLf),
        }
    }
}

/// Where the new content comes from.
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct SourceArgs {
    /// File holding the target text
    #[arg(long, value_name = "PATH")]
    pub target: Option<PathBuf>,

    /// Saved generation response; its first choice is the target
    #[arg(long, value_name = "PATH")]
    pub response: Option<PathBuf>,
}

/// Larch - type a new version of a file into it at human speed.
#[derive(Parser, Debug)]
#[command(name = "larch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// File to animate
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    #[clap(flatten)]
    pub source: SourceArgs,

    /// JSON edit script turning FILE into the target
    #[arg(long, value_name = "PATH", requires = "target", conflicts_with = "response")]
    pub edits: Option<PathBuf>,

    /// Typing speed in words per minute
    #[arg(long, env = "LARCH_WPM", value_name = "N")]
    pub wpm: Option<f64>,

    /// Config file (defaults to ./larch.toml when present)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Stop animating after this many seconds and write the target
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Do not keep a numbered backup of FILE
    #[arg(long)]
    pub no_backup: bool,

    /// Write FILE after every edit instead of once at the end
    #[arg(long)]
    pub live: bool,

    /// Line ending for inserted text
    #[arg(long, value_enum, default_value_t = LineEndingArg::Auto)]
    pub line_ending: LineEndingArg,

    /// Log verbosity
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    /// Enable verbose output (same as --log-level debug)
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

impl Cli {
    /// Level from `-v`, then `LARCH_LOG_LEVEL`, then `--log-level`.
    pub fn effective_log_level(&self) -> LogLevel {
        if self.verbose {
            return LogLevel::Debug;
        }
        std::env::var("LARCH_LOG_LEVEL")
            .ok()
            .and_then(|level| LogLevel::from_str_loose(&level))
            .unwrap_or(self.log_level)
    }
}

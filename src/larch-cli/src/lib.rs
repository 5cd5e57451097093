//! Larch CLI - play a new version of a file into it at typing speed.
//!
//! The target comes either from a text file (optionally with a JSON edit
//! script against the current content) or from a saved generation response.

pub mod backup;
pub mod cli;
pub mod config;
pub mod file_buffer;
pub mod generation;
pub mod run;

pub use cli::{Cli, LineEndingArg, LogLevel, SourceArgs};
pub use config::LarchConfig;
pub use file_buffer::FileBuffer;
pub use generation::{Generation, GenerationError, GenerationResponse};
pub use run::{init_logging, run};

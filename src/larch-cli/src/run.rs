//! The `larch` command.

use std::path::Path;

use anyhow::{Context, Result, bail};
use larch_motion::{LineEnding, ReconcileReport, Script, animate_and_reconcile};
use tracing::{debug, info, warn};

use crate::backup::backup_file;
use crate::cli::Cli;
use crate::config::LarchConfig;
use crate::file_buffer::FileBuffer;
use crate::generation::GenerationResponse;

/// Install the global tracing subscriber for `cli`'s log level.
///
/// `RUST_LOG` takes precedence when set.
pub fn init_logging(cli: &Cli) {
    let level = cli.effective_log_level();
    let filter_str = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        format!(
            "warn,larch={},larch_cli={},larch_motion={}",
            level.as_filter_str(),
            level.as_filter_str(),
            level.as_filter_str()
        )
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter_str)
        .with_writer(std::io::stderr)
        .init();
}

/// Animate `cli.file` to its new content and save it.
///
/// An animation that stops early is not an error: the file still ends up
/// holding the target, and the returned report says what went wrong.
pub async fn run(cli: Cli) -> Result<ReconcileReport> {
    let mut config = LarchConfig::load(cli.config.as_deref())?;
    if let Some(wpm) = cli.wpm {
        config.animation.words_per_minute = wpm;
    }
    if let Some(timeout) = cli.timeout {
        config.animation.timeout_secs = Some(timeout);
    }
    debug!(?config, "Loaded configuration");

    let (target, script) = load_source(&cli)?;

    if !cli.no_backup
        && let Some(backup) = backup_file(&cli.file)?
    {
        info!(backup = %backup.display(), "Backed up original");
    }

    let mut buffer = FileBuffer::open(&cli.file, cli.live)
        .await
        .with_context(|| format!("Failed to open {}", cli.file.display()))?;
    // nothing to detect from in a new or empty file, so follow the target
    let line_ending = match cli.line_ending.forced() {
        Some(line_ending) => Some(line_ending),
        None if buffer.content().is_empty() => Some(LineEnding::detect(&target)),
        None => None,
    };
    if let Some(line_ending) = line_ending {
        buffer = buffer.with_line_ending(line_ending);
    }

    let report = animate_and_reconcile(&mut buffer, &target, script.as_ref(), &config.animation)
        .await
        .with_context(|| format!("Failed to write target into {}", cli.file.display()))?;

    buffer
        .save()
        .await
        .with_context(|| format!("Failed to save {}", cli.file.display()))?;

    match &report.animation_error {
        None => info!(file = %cli.file.display(), "Animation complete"),
        Some(err) => warn!(
            file = %cli.file.display(),
            error = %err,
            "Animation stopped early; file holds the target anyway"
        ),
    }

    Ok(report)
}

fn load_source(cli: &Cli) -> Result<(String, Option<Script>)> {
    if let Some(response) = &cli.source.response {
        if cli.edits.is_some() {
            bail!("--edits cannot be combined with --response");
        }
        let json = read(response)?;
        let response = GenerationResponse::from_json(&json)?;
        return Ok(response.into_target()?);
    }

    let target_path = cli
        .source
        .target
        .as_deref()
        .context("Either --target or --response is required")?;
    let target = read(target_path)?;

    let script = match &cli.edits {
        Some(edits) => {
            let json = read(edits)?;
            let script = Script::from_json(&json)
                .with_context(|| format!("Invalid edit script in {}", edits.display()))?;
            Some(script)
        }
        None => None,
    };

    Ok((target, script))
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

//! Replaying edit scripts against a live buffer.
//!
//! Opcodes are positioned against the text the buffer held when the run
//! started. As the run edits the buffer, a drift term maps those original
//! positions onto the current document.

use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, trace, warn};

use crate::buffer::{EditBuffer, StorageEncoding};
use crate::config::AnimationConfig;
use crate::error::{AnimateError, AnimateResult};
use crate::index::IndexConverter;
use crate::normalize::normalize;
use crate::opcode::{Opcode, Script};
use crate::pace::{Clock, PaceController, TokioClock};
use crate::split::{ChunkSplitter, split_text};

/// Lifecycle of an executor's most recent run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Completed,
    Failed,
}

/// Outcome of [`AnimationExecutor::run_and_reconcile`].
#[derive(Debug)]
pub struct ReconcileReport {
    /// Why the animation stopped early, if it did. The buffer holds the
    /// target text either way.
    pub animation_error: Option<AnimateError>,
}

impl ReconcileReport {
    /// Returns `true` if the animation itself ran to completion.
    pub fn is_clean(&self) -> bool {
        self.animation_error.is_none()
    }
}

/// Plays edit animations at a configured speed.
pub struct AnimationExecutor {
    config: AnimationConfig,
    clock: Arc<dyn Clock>,
    seed: Option<u64>,
    state: RunState,
}

impl AnimationExecutor {
    pub fn new(config: AnimationConfig) -> Self {
        Self {
            config,
            clock: Arc::new(TokioClock::new()),
            seed: None,
            state: RunState::Idle,
        }
    }

    /// Use `clock` for pacing instead of tokio's.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Draw chunk sizes from a generator seeded with `seed`.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Animate `buffer` towards `target`.
    ///
    /// With a script, each opcode is replayed in order of position. Without
    /// one, the buffer is cleared and `target` is typed from scratch. The
    /// first error stops the run and nothing is rolled back.
    pub async fn run<B>(
        &mut self,
        buffer: &mut B,
        target: &str,
        script: Option<&Script>,
    ) -> AnimateResult<()>
    where
        B: EditBuffer + ?Sized,
    {
        self.state = RunState::Running;

        let result = match script {
            Some(script) => self.run_script(buffer, script).await,
            None => self.run_whole(buffer, target).await,
        };

        self.state = match result {
            Ok(()) => RunState::Completed,
            Err(_) => RunState::Failed,
        };
        result
    }

    /// Animate, then force the buffer to hold exactly `target`.
    ///
    /// Chunked editing is best effort, so the final full replace happens
    /// whether the animation succeeded, failed, or hit the configured
    /// timeout. Only a failure of that replace is returned as an error.
    pub async fn run_and_reconcile<B>(
        &mut self,
        buffer: &mut B,
        target: &str,
        script: Option<&Script>,
    ) -> AnimateResult<ReconcileReport>
    where
        B: EditBuffer + ?Sized,
    {
        let outcome = match self.config.timeout() {
            Some(limit) => {
                match tokio::time::timeout(limit, self.run(&mut *buffer, target, script)).await {
                    Ok(result) => result,
                    Err(_) => {
                        self.state = RunState::Failed;
                        Err(AnimateError::TimedOut(limit))
                    }
                }
            }
            None => self.run(&mut *buffer, target, script).await,
        };

        if let Err(err) = &outcome {
            warn!(error = %err, "Animation stopped early, replacing content with target");
        }

        buffer.replace_all(target).await?;

        Ok(ReconcileReport {
            animation_error: outcome.err(),
        })
    }

    fn pace(&self) -> PaceController {
        let pace = PaceController::from_config(&self.config, self.clock.clone());
        match self.seed {
            Some(seed) => pace.with_rng(StdRng::seed_from_u64(seed)),
            None => pace,
        }
    }

    async fn run_script<B>(&self, buffer: &mut B, script: &Script) -> AnimateResult<()>
    where
        B: EditBuffer + ?Sized,
    {
        let original = buffer.text();
        let original_chars: Vec<char> = original.chars().collect();
        let script = normalize(script, buffer.line_ending(), &original_chars);

        let mut run = ScriptRun {
            encoding: buffer.encoding(),
            index: IndexConverter::new(&original, buffer.encoding()),
            buffer,
            pace: self.pace(),
            drift: 0,
            deleted_until: 0,
        };

        for opcode in &script {
            debug!(?opcode, drift = run.drift, "Applying opcode");
            match opcode {
                Opcode::Insert { start, text } => run.insert(*start, text).await?,
                Opcode::Delete { start, end } => run.delete(*start, *end).await?,
            }
        }

        Ok(())
    }

    async fn run_whole<B>(&self, buffer: &mut B, target: &str) -> AnimateResult<()>
    where
        B: EditBuffer + ?Sized,
    {
        let started = self.clock.elapsed();
        let mut pace = self.pace();

        buffer.replace_all("").await?;

        let mut splitter = ChunkSplitter::new(target);
        while let Some(chunk) = splitter.next_chunk(pace.next_chunk_len()) {
            // the buffer may commit more units than requested, so ask it
            // where the end is instead of counting
            let end = buffer.end_offset();
            buffer.reveal(end..end);
            buffer.insert(end, chunk).await?;
            trace!(len = chunk.len(), "Appended chunk");

            pace.advance(chunk.chars().count()).await;
        }

        info!(
            words = target.split_whitespace().count(),
            chars = target.chars().count(),
            duration_secs = self.clock.elapsed().saturating_sub(started).as_secs_f64(),
            "Finished whole-text animation"
        );

        Ok(())
    }
}

/// Animate `buffer` from its current content to `target` with `config`.
pub async fn animate<B>(
    buffer: &mut B,
    target: &str,
    script: Option<&Script>,
    config: &AnimationConfig,
) -> AnimateResult<()>
where
    B: EditBuffer + ?Sized,
{
    AnimationExecutor::new(config.clone())
        .run(buffer, target, script)
        .await
}

/// [`animate`], followed by a full replace with `target` whatever happened.
pub async fn animate_and_reconcile<B>(
    buffer: &mut B,
    target: &str,
    script: Option<&Script>,
    config: &AnimationConfig,
) -> AnimateResult<ReconcileReport>
where
    B: EditBuffer + ?Sized,
{
    AnimationExecutor::new(config.clone())
        .run_and_reconcile(buffer, target, script)
        .await
}

/// State of one scripted run.
struct ScriptRun<'b, B: ?Sized> {
    buffer: &'b mut B,
    pace: PaceController,
    index: IndexConverter,
    encoding: StorageEncoding,
    /// Storage units to add to an original offset to find it in the buffer.
    drift: isize,
    /// Original storage offset up to which text has been deleted.
    deleted_until: usize,
}

impl<B> ScriptRun<'_, B>
where
    B: EditBuffer + ?Sized,
{
    /// Map an original storage offset onto the current buffer.
    ///
    /// An offset inside an already deleted range maps to where that range
    /// used to start.
    fn resolve(&self, position: usize) -> AnimateResult<usize> {
        let swallowed = self.deleted_until.saturating_sub(position) as isize;
        let shifted = position as isize + self.drift + swallowed;
        usize::try_from(shifted).map_err(|_| AnimateError::NegativePosition {
            position,
            drift: self.drift,
        })
    }

    async fn insert(&mut self, start: usize, text: &str) -> AnimateResult<()> {
        let (storage_start, _) = self.index.to_storage_offsets(start, start)?;
        let at = self.resolve(storage_start)?;
        self.buffer.set_cursor(at);

        let mut committed = 0;
        let mut splitter = ChunkSplitter::new(text);
        while let Some(chunk) = splitter.next_chunk(self.pace.next_chunk_len()) {
            let cursor = self.buffer.cursor();
            self.buffer.reveal(cursor..cursor);

            let inserted = self.buffer.insert(cursor, chunk).await?;
            committed += self.encoding.len(&inserted);
            trace!(cursor, len = inserted.len(), "Inserted chunk");

            self.pace.advance(chunk.chars().count()).await;
        }

        self.drift += committed as isize;
        Ok(())
    }

    async fn delete(&mut self, start: usize, end: usize) -> AnimateResult<()> {
        let (storage_start, storage_end) = self.index.to_storage_offsets(start, end)?;
        let from = self.resolve(storage_start)?;
        let to = self.resolve(storage_end)?;

        let current = self.buffer.text();
        let doomed = self.encoding.slice(&current, from..to)?;
        let chunks: Vec<&str> = split_text(doomed, self.pace.chunk_lengths()).collect();

        // erase back to front, like holding backspace
        self.buffer.set_cursor(to);
        for chunk in chunks.into_iter().rev() {
            let cursor = self.buffer.cursor();
            let width = self.encoding.len(chunk) as isize;
            let chunk_start =
                usize::try_from(cursor as isize - width).map_err(|_| {
                    AnimateError::NegativePosition {
                        position: cursor,
                        drift: -width,
                    }
                })?;

            self.buffer.reveal(chunk_start..cursor);
            self.buffer.delete(chunk_start..cursor).await?;
            trace!(from = chunk_start, to = cursor, "Deleted chunk");

            self.pace.advance(chunk.chars().count()).await;
        }

        let removed = storage_end.saturating_sub(storage_start.max(self.deleted_until));
        self.drift -= removed as isize;
        self.deleted_until = self.deleted_until.max(storage_end);
        Ok(())
    }
}

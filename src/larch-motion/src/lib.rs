//! Larch Motion - human-paced edit animation.
//!
//! Turns a change from one text to another into a stream of small, timed
//! insertions and deletions against a live buffer, so generated text looks
//! typed into the document rather than pasted:
//! - Chunking that never separates a `\r\n` pair
//! - Pacing at a target words-per-minute with a measured warm-up
//! - Character to storage-unit offset conversion (UTF-16, UTF-8, codepoints)
//! - Repair and ordering of externally supplied edit scripts
//! - Replay with drift tracking, and a final reconciling replace
//!
//! # Example
//!
//! ```no_run
//! use larch_motion::{AnimationConfig, Opcode, Script, TextBuffer, animate};
//!
//! # async fn demo() -> larch_motion::AnimateResult<()> {
//! let mut buffer = TextBuffer::new("abc");
//! let script = Script::new(vec![Opcode::delete(1, 2), Opcode::insert(1, "x")]);
//! animate(&mut buffer, "axc", Some(&script), &AnimationConfig::default()).await?;
//! assert_eq!(buffer.as_str(), "axc");
//! # Ok(())
//! # }
//! ```

mod buffer;
mod config;
mod error;
mod executor;
mod index;
mod normalize;
mod opcode;
mod pace;
mod split;

pub use buffer::{EditBuffer, LineEnding, StorageEncoding, TextBuffer};
pub use config::{
    AnimationConfig, DEFAULT_AVERAGE_WORD_LENGTH, DEFAULT_WARMUP_CHUNKS, DEFAULT_WORDS_PER_MINUTE,
};
pub use error::{AnimateError, AnimateResult, BufferError};
pub use executor::{
    AnimationExecutor, ReconcileReport, RunState, animate, animate_and_reconcile,
};
pub use index::{IndexConverter, to_storage_offsets};
pub use normalize::normalize;
pub use opcode::{Opcode, RawOpcode, Script};
pub use pace::{ChunkLengths, Clock, PaceController, TokioClock, words_to_chars_per_second};
pub use split::{ChunkSplitter, SplitText, split_text};

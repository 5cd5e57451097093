//! Making an externally supplied edit script safe to replay.

use crate::buffer::LineEnding;
use crate::opcode::{Opcode, Script};

/// Repair and order `script` for replay against `original`.
///
/// Under [`LineEnding::CrLf`] a non-empty deletion that ends between a `\r`
/// and its `\n` gives up the `\r`, so the buffer is never asked to leave a
/// dangling `\n` behind. Opcodes are then stable-sorted by start position.
///
/// Only that one boundary case is repaired. An insertion between `\r` and
/// `\n`, or a deletion starting between them, passes through unchanged.
pub fn normalize(script: &Script, line_ending: LineEnding, original: &[char]) -> Script {
    let mut opcodes: Vec<Opcode> = match line_ending {
        LineEnding::CrLf => script
            .iter()
            .map(|opcode| keep_crlf_together(opcode, original))
            .collect(),
        LineEnding::Lf => script.opcodes().to_vec(),
    };

    opcodes.sort_by_key(Opcode::start);
    Script::new(opcodes)
}

fn keep_crlf_together(opcode: &Opcode, original: &[char]) -> Opcode {
    if let Opcode::Delete { start, end } = *opcode
        && start < end
        && original.get(end - 1) == Some(&'\r')
        && original.get(end) == Some(&'\n')
    {
        return Opcode::delete(start, end - 1);
    }
    opcode.clone()
}

//! Character index to storage offset conversion.

use crate::buffer::StorageEncoding;
use crate::error::{AnimateError, AnimateResult};

/// Convert the character range `start..end` of `text` into storage offsets.
///
/// Walks at most `end` characters.
pub fn to_storage_offsets(
    text: &str,
    start: usize,
    end: usize,
    encoding: StorageEncoding,
) -> AnimateResult<(usize, usize)> {
    if start > end {
        return Err(AnimateError::out_of_range(start, end, text.chars().count()));
    }

    let mut chars = text.chars();
    let mut sum = 0;

    for _ in 0..start {
        match chars.next() {
            Some(c) => sum += encoding.width(c),
            None => return Err(AnimateError::out_of_range(start, end, text.chars().count())),
        }
    }
    let storage_start = sum;

    for _ in start..end {
        match chars.next() {
            Some(c) => sum += encoding.width(c),
            None => return Err(AnimateError::out_of_range(start, end, text.chars().count())),
        }
    }

    Ok((storage_start, sum))
}

/// Prefix sums of storage widths over one text snapshot.
///
/// Answers every lookup in constant time after a single pass.
#[derive(Debug, Clone)]
pub struct IndexConverter {
    prefix: Vec<usize>,
}

impl IndexConverter {
    pub fn new(text: &str, encoding: StorageEncoding) -> Self {
        let mut prefix = Vec::with_capacity(text.len() + 1);
        let mut sum = 0;
        prefix.push(sum);
        for c in text.chars() {
            sum += encoding.width(c);
            prefix.push(sum);
        }
        Self { prefix }
    }

    /// Number of characters in the snapshot.
    pub fn char_len(&self) -> usize {
        self.prefix.len() - 1
    }

    /// Storage length of the snapshot.
    pub fn storage_len(&self) -> usize {
        self.prefix[self.char_len()]
    }

    /// Storage offsets of the character range `start..end`.
    pub fn to_storage_offsets(&self, start: usize, end: usize) -> AnimateResult<(usize, usize)> {
        if start > end || end > self.char_len() {
            return Err(AnimateError::out_of_range(start, end, self.char_len()));
        }
        Ok((self.prefix[start], self.prefix[end]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TEXT: &str = "0𝟘1👍🏽2\r\n3";

    #[test]
    fn test_ascii_is_identity() {
        let (s, e) = to_storage_offsets("hello", 1, 4, StorageEncoding::Utf16).unwrap();
        assert_eq!((s, e), (1, 4));
    }

    #[test]
    fn test_surrogate_pairs_count_twice() {
        // '𝟘' and '👍' and '🏽' are outside the BMP
        let (s, e) = to_storage_offsets(TEXT, 2, 5, StorageEncoding::Utf16).unwrap();
        assert_eq!((s, e), (3, 8));
    }

    #[test]
    fn test_table_matches_direct_walk() {
        for encoding in [
            StorageEncoding::Utf8,
            StorageEncoding::Utf16,
            StorageEncoding::Codepoint,
        ] {
            let table = IndexConverter::new(TEXT, encoding);
            let len = table.char_len();
            for start in 0..=len {
                for end in start..=len {
                    assert_eq!(
                        table.to_storage_offsets(start, end).unwrap(),
                        to_storage_offsets(TEXT, start, end, encoding).unwrap()
                    );
                }
            }
        }
    }

    #[test]
    fn test_difference_is_slice_width() {
        let chars: Vec<char> = TEXT.chars().collect();
        let table = IndexConverter::new(TEXT, StorageEncoding::Utf16);
        for start in 0..=chars.len() {
            for end in start..=chars.len() {
                let (s, e) = table.to_storage_offsets(start, end).unwrap();
                let width: usize = chars[start..end].iter().map(|c| c.len_utf16()).sum();
                assert_eq!(e - s, width);
            }
        }
    }

    #[test]
    fn test_monotonic() {
        let table = IndexConverter::new(TEXT, StorageEncoding::Utf16);
        let mut prev = 0;
        for i in 0..=table.char_len() {
            let (offset, _) = table.to_storage_offsets(i, i).unwrap();
            assert!(offset >= prev);
            prev = offset;
        }
        assert_eq!(prev, table.storage_len());
    }

    #[test]
    fn test_out_of_range() {
        let err = to_storage_offsets("abc", 1, 4, StorageEncoding::Utf16).unwrap_err();
        assert!(matches!(
            err,
            AnimateError::OutOfRangeIndex {
                start: 1,
                end: 4,
                len: 3
            }
        ));

        let table = IndexConverter::new("abc", StorageEncoding::Utf16);
        assert!(table.to_storage_offsets(2, 1).is_err());
        assert!(table.to_storage_offsets(0, 4).is_err());
        assert_eq!(table.to_storage_offsets(3, 3).unwrap(), (3, 3));
    }
}

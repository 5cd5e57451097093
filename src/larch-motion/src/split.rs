//! Splitting text into animation chunks.

/// Cuts text into successive chunks of requested lengths.
///
/// Lengths are counted in characters. A `\r\n` pair is never separated, so a
/// chunk may run one character past the requested length when it would end
/// between the two.
#[derive(Debug, Clone)]
pub struct ChunkSplitter<'a> {
    rest: &'a str,
}

impl<'a> ChunkSplitter<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { rest: text }
    }

    /// Returns `true` once every character has been handed out.
    pub fn is_done(&self) -> bool {
        self.rest.is_empty()
    }

    /// Take the next chunk of at least `len` characters (or whatever is left).
    ///
    /// A `len` of zero is treated as one.
    pub fn next_chunk(&mut self, len: usize) -> Option<&'a str> {
        if self.rest.is_empty() {
            return None;
        }

        let want = len.max(1);
        let mut taken = 0;
        let mut end = 0;
        let bytes = self.rest.as_bytes();

        while end < self.rest.len() && taken < want {
            if bytes[end] == b'\r' && bytes.get(end + 1) == Some(&b'\n') {
                end += 2;
                taken += 2;
            } else {
                let c = self.rest[end..].chars().next().unwrap_or_default();
                end += c.len_utf8();
                taken += 1;
            }
        }

        let (chunk, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(chunk)
    }

    /// Hand out everything that is left as one chunk.
    pub fn remainder(&mut self) -> Option<&'a str> {
        if self.rest.is_empty() {
            return None;
        }
        Some(std::mem::take(&mut self.rest))
    }
}

/// Lazy iterator of chunks, see [`split_text`].
#[derive(Debug, Clone)]
pub struct SplitText<'a, I> {
    splitter: ChunkSplitter<'a>,
    lengths: I,
}

impl<'a, I> Iterator for SplitText<'a, I>
where
    I: Iterator<Item = usize>,
{
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        match self.lengths.next() {
            Some(len) => self.splitter.next_chunk(len),
            None => self.splitter.remainder(),
        }
    }
}

/// Split `text` into chunks whose lengths are drawn from `lengths`.
///
/// Concatenating the chunks always gives back `text`: if `lengths` runs out
/// first, whatever is left comes out as one last chunk.
pub fn split_text<I>(text: &str, lengths: I) -> SplitText<'_, I::IntoIter>
where
    I: IntoIterator<Item = usize>,
{
    SplitText {
        splitter: ChunkSplitter::new(text),
        lengths: lengths.into_iter(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::iter;

    fn chunks(text: &str, lengths: &[usize]) -> Vec<String> {
        split_text(text, lengths.iter().copied().cycle())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_fixed_lengths() {
        assert_eq!(chunks("abcdefg", &[3]), vec!["abc", "def", "g"]);
    }

    #[test]
    fn test_crlf_is_never_split() {
        let text = "ab\r\ncd\r\n\r\ne";
        for len in 1..6 {
            for chunk in chunks(text, &[len]) {
                assert!(!chunk.ends_with('\r'), "len {len} split a CRLF: {chunk:?}");
                assert!(!chunk.starts_with('\n'), "len {len} split a CRLF: {chunk:?}");
            }
        }
        assert_eq!(chunks("a\r\nb", &[2]), vec!["a\r\n", "b"]);
    }

    #[test]
    fn test_lone_cr_and_lf_are_ordinary() {
        assert_eq!(chunks("\n\r", &[1]), vec!["\n", "\r"]);
    }

    #[test]
    fn test_concatenation_reproduces_text() {
        let text = "héllo 𝟘𝟙 wörld\r\n👍🏽 end\r\n";
        for pattern in [&[1usize][..], &[2, 5, 1], &[7, 3], &[100]] {
            let joined: String = chunks(text, pattern).concat();
            assert_eq!(joined, text);
        }
    }

    #[test]
    fn test_lengths_count_characters() {
        assert_eq!(chunks("𝟘𝟙𝟚", &[2]), vec!["𝟘𝟙", "𝟚"]);
    }

    #[test]
    fn test_zero_length_is_one() {
        assert_eq!(chunks("abc", &[0]), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_exhausted_lengths_flush_remainder() {
        let out: Vec<&str> = split_text("abcdef", [2]).collect();
        assert_eq!(out, vec!["ab", "cdef"]);

        let out: Vec<&str> = split_text("abc", iter::empty()).collect();
        assert_eq!(out, vec!["abc"]);
    }

    #[test]
    fn test_empty_text() {
        assert!(split_text("", iter::repeat(1)).next().is_none());
    }

    #[test]
    fn test_splitter_state() {
        let mut splitter = ChunkSplitter::new("abcd");
        assert_eq!(splitter.next_chunk(3), Some("abc"));
        assert!(!splitter.is_done());
        assert_eq!(splitter.next_chunk(3), Some("d"));
        assert!(splitter.is_done());
        assert_eq!(splitter.next_chunk(3), None);
    }
}

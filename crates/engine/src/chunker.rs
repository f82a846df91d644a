//! Requirement text chunker.
//!
//! Splits text into overlapping chunks measured in whitespace-delimited
//! words. Paragraph and sentence boundaries are preferred; a sentence longer
//! than a whole chunk is split between words. The last `overlap` words of a
//! chunk are repeated at the start of the next one, except that the carry
//! shrinks (down to nothing) when the next sentence would otherwise no longer
//! fit in one chunk.

/// Chunk sizing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunker {
    pub size: usize,
    pub overlap: usize,
}

impl Chunker {
    pub fn new(size: usize, overlap: usize) -> Self {
        Self { size, overlap }
    }

    /// Split `text` into chunks. Empty input yields no chunks.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        chunk(text, self.size, self.overlap)
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self::new(50, 10)
    }
}

/// Split `text` into chunks of at most `size` words.
///
/// With `size == 0` or `overlap >= size` no bounded split exists, so the
/// trimmed input comes back as one chunk.
pub fn chunk(text: &str, size: usize, overlap: usize) -> Vec<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    if size == 0 || overlap >= size {
        return vec![trimmed.to_string()];
    }

    let mut chunks: Vec<Vec<&str>> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    // Words in `current` that were not carried over from the previous chunk.
    let mut fresh = 0usize;

    for sentence in sentences(trimmed) {
        let mut rest: &[&str] = &sentence;
        while !rest.is_empty() {
            if current.len() + rest.len() <= size {
                current.extend_from_slice(rest);
                fresh += rest.len();
                break;
            }

            if fresh > 0 {
                // Close the chunk at the sentence boundary. Shrink the carry
                // so a sentence that fits a chunk on its own is not split.
                let carry = if rest.len() <= size {
                    overlap.min(size - rest.len())
                } else {
                    overlap
                };
                current = emit(&mut chunks, current, carry);
                fresh = 0;
                continue;
            }

            // Only carried words so far and the sentence still does not fit:
            // split it between words. `current.len() <= overlap < size`, so
            // at least one word is consumed per pass.
            let room = size - current.len();
            current.extend_from_slice(&rest[..room]);
            rest = &rest[room..];
            current = emit(&mut chunks, current, overlap);
            fresh = 0;
        }
    }

    if fresh > 0 {
        chunks.push(current);
    }

    chunks.into_iter().map(|words| words.join(" ")).collect()
}

/// Push `words` as a finished chunk and return the carry for the next one.
fn emit<'a>(chunks: &mut Vec<Vec<&'a str>>, words: Vec<&'a str>, carry: usize) -> Vec<&'a str> {
    let start = words.len().saturating_sub(carry);
    let next = words[start..].to_vec();
    chunks.push(words);
    next
}

/// Sentences as word lists. Blank lines end paragraphs; a word ending in
/// `.`, `!` or `?` ends a sentence.
fn sentences(text: &str) -> Vec<Vec<&str>> {
    let mut out = Vec::new();
    let mut sentence: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !sentence.is_empty() {
                out.push(std::mem::take(&mut sentence));
            }
            continue;
        }
        for word in line.split_whitespace() {
            sentence.push(word);
            if word.ends_with(['.', '!', '?']) {
                out.push(std::mem::take(&mut sentence));
            }
        }
    }
    if !sentence.is_empty() {
        out.push(sentence);
    }
    out
}

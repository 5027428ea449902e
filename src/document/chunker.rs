use serde::Serialize;

/// A window of source text. Offsets are character (not byte) positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    pub text: String,
    pub source: String,
    pub index: usize,
}

/// Fixed-stride character window splitter: every window is at most `size`
/// characters and begins `overlap` characters before the previous one ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSplitter {
    size: usize,
    overlap: usize,
}

impl Default for TextSplitter {
    fn default() -> Self {
        Self {
            size: 1000,
            overlap: 100,
        }
    }
}

impl TextSplitter {
    /// Returns `None` when `overlap >= size`, which would never advance.
    pub fn new(size: usize, overlap: usize) -> Option<Self> {
        (size > 0 && overlap < size).then_some(Self { size, overlap })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    pub fn split(&self, text: &str, source: &str) -> Vec<Chunk> {
        // byte offset of every char boundary, plus the end of the string
        let boundaries: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let char_count = boundaries.len() - 1;

        let stride = self.size - self.overlap;
        let mut chunks = Vec::new();
        let mut start = 0;

        while start < char_count {
            let end = (start + self.size).min(char_count);
            chunks.push(Chunk {
                text: text[boundaries[start]..boundaries[end]].to_string(),
                source: source.to_string(),
                index: chunks.len(),
            });
            if end == char_count {
                break;
            }
            start += stride;
        }

        chunks
    }
}

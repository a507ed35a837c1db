//! Program images.
//!
//! The assembler front end produces an ordered sequence of 32-bit
//! little-endian instruction words, an optional data blob, and a mapping from
//! instruction index to source line for display. The loader side of the
//! simulator only needs to copy those into memory at the configured section
//! starts.

/// An assembled program ready to load.
#[derive(Clone, Debug, Default)]
pub struct ProgramImage {
    /// Instruction words in text-section order.
    pub text: Vec<u32>,
    /// Data-section blob, loaded at `data_section_start`.
    pub data: Vec<u8>,
    /// Source line per instruction index, for display.
    pub line_map: Vec<u32>,
}

impl ProgramImage {
    /// Builds an image from instruction words alone.
    pub fn from_words(words: &[u32]) -> Self {
        Self {
            text: words.to_vec(),
            data: Vec::new(),
            line_map: Vec::new(),
        }
    }

    /// Builds an image from raw little-endian bytes (e.g. an assembled
    /// binary file). Trailing bytes that do not fill a word are dropped.
    pub fn from_le_bytes(bytes: &[u8]) -> Self {
        let text = bytes
            .chunks_exact(4)
            .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect();
        Self {
            text,
            data: Vec::new(),
            line_map: Vec::new(),
        }
    }

    /// Attaches a data-section blob.
    pub fn with_data(mut self, data: Vec<u8>) -> Self {
        self.data = data;
        self
    }

    /// Attaches the instruction-index to source-line mapping.
    pub fn with_line_map(mut self, line_map: Vec<u32>) -> Self {
        self.line_map = line_map;
        self
    }

    /// Text-section size in bytes.
    pub fn size_bytes(&self) -> u64 {
        self.text.len() as u64 * 4
    }

    /// Source line of the instruction at `index`, if the map covers it.
    pub fn source_line(&self, index: usize) -> Option<u32> {
        self.line_map.get(index).copied()
    }
}

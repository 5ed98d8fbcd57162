//! Probe options

pub const DEFAULT_CHUNK_SIZE: usize = 4 * 1024;

/// Options for a single probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOptions {
    /// Size of each read issued against an async reader
    pub chunk_size: usize,
    /// Maximum number of input bytes the scan may consume (None = unbounded)
    pub max_input: Option<u64>,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_input: None,
        }
    }
}

impl ProbeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the read chunk size; zero is bumped to one byte
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size.max(1);
        self
    }

    /// Caps the number of bytes the scan may consume
    pub fn with_max_input(mut self, limit: u64) -> Self {
        self.max_input = Some(limit);
        self
    }
}

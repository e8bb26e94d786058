//! Line-framed stream decoding
//!
//! The position feed arrives as newline-delimited UTF-8 records over a
//! stream socket. A single read may contain several records, a fraction of
//! one, or both; the decoder accumulates bytes and emits only complete
//! records, keeping any trailing partial record for the next read.

/// Incremental newline framer over a raw byte stream.
#[derive(Debug, Default)]
pub struct LineDecoder {
    buffer: Vec<u8>,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Append `bytes` and return every complete record they finish.
    ///
    /// Records are trimmed of surrounding whitespace (covering `\r\n`
    /// producers); records that trim to nothing are dropped. A completed
    /// record that is not valid UTF-8 is logged and dropped without
    /// disturbing the rest of the stream.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);

        let mut records = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            match std::str::from_utf8(&line[..pos]) {
                Ok(text) => {
                    let trimmed = text.trim();
                    if !trimmed.is_empty() {
                        records.push(trimmed.to_string());
                    }
                }
                Err(e) => log::warn!("dropping record with invalid utf-8: {}", e),
            }
        }
        records
    }

    /// Number of buffered bytes still waiting for a delimiter.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

//! Byte-at-a-time tokenizer for the framing lines of a chunked body.
//!
//! The tokenizer handles everything of a chunked body except the chunk data
//! itself: the hexadecimal size line (with optional whitespace and ignored
//! extensions), the CRLF that terminates each chunk's data, and the trailer
//! section after the last chunk, which is skipped up to the empty line.
//!
//! After reporting a non-zero [`ChunkEvent::Size`] the tokenizer expects the
//! caller to consume that many data bytes itself; the next byte it is given
//! must be the CR that ends the chunk data.

use tracing::trace;

/// Result of classifying one byte of chunk framing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkEvent {
    /// More framing bytes are needed
    Continue,
    /// A size line is complete. `Size(0)` is reported once the trailer section
    /// after the last chunk has been consumed as well.
    Size(u64),
    /// The framing is malformed or the size overflowed
    Invalid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChunkState {
    /// Read the chunk size in hex, `true` once at least one digit was seen
    Size(bool),
    /// Whitespace after size
    SizeLws,
    /// Skip chunk extensions
    Extension,
    /// LF after chunk size
    SizeLf,
    /// CR after chunk data
    DataCr,
    /// LF after chunk data
    DataLf,
    /// Start of a trailer line, or the final CRLF
    TrailerStart,
    /// Inside a trailer field
    Trailer,
    /// LF after a trailer field
    TrailerLf,
    /// Final LF
    EndLf,
    End,
    Failed,
}

/// Tokenizer state for the framing of one chunked body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkTokenizer {
    state: ChunkState,
    size: u64,
}

impl Default for ChunkTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkTokenizer {
    /// Creates a tokenizer positioned at the first size line.
    pub fn new() -> Self {
        Self { state: ChunkState::Size(false), size: 0 }
    }

    /// Returns true once the last chunk and the trailer section were consumed.
    pub fn is_end(&self) -> bool {
        self.state == ChunkState::End
    }

    /// Classifies the next framing byte.
    pub fn classify(&mut self, byte: u8) -> ChunkEvent {
        use ChunkState::*;

        let next = match (self.state, byte) {
            (Size(_), b) if b.is_ascii_hexdigit() => {
                let Some(size) = self.size.checked_mul(16).and_then(|s| s.checked_add(hex_value(b))) else {
                    trace!("chunk size overflow");
                    return self.fail();
                };
                self.size = size;
                Size(true)
            }
            (Size(true), b'\t' | b' ') | (SizeLws, b'\t' | b' ') => SizeLws,
            (Size(true) | SizeLws, b';') => Extension,
            (Size(true) | SizeLws | Extension, b'\r') => SizeLf,
            (Extension, b'\n') => return self.fail(),
            (Extension, _) => Extension,

            (SizeLf, b'\n') => {
                if self.size == 0 {
                    TrailerStart
                } else {
                    self.state = DataCr;
                    return ChunkEvent::Size(self.size);
                }
            }

            (DataCr, b'\r') => DataLf,
            (DataLf, b'\n') => {
                self.size = 0;
                Size(false)
            }

            (TrailerStart, b'\r') => EndLf,
            (Trailer, b'\r') => TrailerLf,
            (TrailerStart | Trailer, _) => Trailer,
            (TrailerLf, b'\n') => TrailerStart,

            (EndLf, b'\n') => {
                self.state = End;
                return ChunkEvent::Size(0);
            }

            _ => return self.fail(),
        };

        self.state = next;
        ChunkEvent::Continue
    }

    fn fail(&mut self) -> ChunkEvent {
        self.state = ChunkState::Failed;
        ChunkEvent::Invalid
    }
}

fn hex_value(b: u8) -> u64 {
    let value = match b {
        b'0'..=b'9' => b - b'0',
        b'a'..=b'f' => b - b'a' + 10,
        _ => b - b'A' + 10,
    };
    u64::from(value)
}

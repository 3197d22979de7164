//! Push based HTTP/1.x response parser.
//!
//! [`ResponseParser`] consumes the bytes of one response in pieces of any size
//! and reports what it finds to a [`ResponseHandler`]. Feeding the response one
//! byte at a time produces exactly the same events as feeding it in one call.
//!
//! # State Machine
//!
//! ```text
//! Header --(block complete, chunked)---------> ChunkHeader
//! Header --(block complete, length > 0)------> RawData
//! Header --(block complete, length == 0)-----> Close
//! Header --(no framing, malformed header)----> Error
//! ChunkHeader --(size > 0)-------------------> ChunkData
//! ChunkHeader --(size == 0)------------------> Close
//! ChunkHeader --(malformed size line)--------> Error
//! ChunkData --(chunk consumed)---------------> ChunkHeader
//! RawData --(content-length consumed)--------> Close
//! ```
//!
//! `Close` and `Error` are terminal. Once there, [`ResponseParser::feed`]
//! consumes nothing and the scratch buffer has been released.

use tracing::{debug, trace};

use crate::ensure;
use crate::parser::ResponseHandler;
use crate::parser::scratch::{ScratchAllocator, ScratchBuffer, SystemAllocator};
use crate::protocol::ParseError;
use crate::tokenizer::{ChunkEvent, ChunkTokenizer, HeaderTokenizer, TokenEvent};

/// Maximum size in bytes of a single header name plus its value
pub const MAX_HEADER_LINE_BYTES: usize = 8 * 1024;

/// Parse phase of a [`ResponseParser`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Status line and header block
    Header,
    /// Chunk size line, chunk terminator or trailer section
    ChunkHeader,
    /// Data of the current chunk
    ChunkData,
    /// Body framed by content-length
    RawData,
    /// The response is complete
    Close,
    /// The response is malformed
    Error,
}

impl State {
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, State::Close | State::Error)
    }
}

/// Outcome of one [`ResponseParser::feed`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedStatus {
    /// Number of input bytes consumed. Bytes after the end of the response
    /// are left for the caller.
    pub consumed: usize,
    /// Whether more input is needed to complete the response
    pub needs_more: bool,
}

/// Incremental parser for one HTTP/1.x response.
///
/// # Example
///
/// ```
/// use micro_http_response::parser::ResponseParser;
/// use micro_http_response::protocol::Response;
///
/// let mut parser = ResponseParser::new(Response::default());
///
/// let status = parser.feed(b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nhel");
/// assert!(status.needs_more);
///
/// let status = parser.feed(b"lo\r\n0\r\n\r\n");
/// assert!(!status.needs_more);
/// assert!(!parser.is_error());
///
/// let response = parser.into_handler();
/// assert_eq!(response.code(), 200);
/// assert_eq!(&response.body()[..], b"hello");
/// ```
#[derive(Debug)]
pub struct ResponseParser<H, A: ScratchAllocator = SystemAllocator> {
    handler: H,
    state: State,
    header_tokenizer: HeaderTokenizer,
    chunk_tokenizer: ChunkTokenizer,
    status_code: u16,
    status_sent: bool,
    /// Declared content-length, `None` while unknown
    content_length: Option<u64>,
    /// Body bytes still owed in `ChunkData` or `RawData`
    remaining: u64,
    chunked: bool,
    /// Holds `[key][value]` of the header line being parsed
    scratch: ScratchBuffer<A>,
    key_len: usize,
    value_len: usize,
    max_header_bytes: usize,
    failure: Option<ParseError>,
}

impl<H: ResponseHandler> ResponseParser<H> {
    pub fn new(handler: H) -> Self {
        Self::with_allocator(handler, SystemAllocator)
    }
}

impl<H: ResponseHandler, A: ScratchAllocator> ResponseParser<H, A> {
    /// Creates a parser whose scratch buffer is served by `allocator`.
    pub fn with_allocator(handler: H, allocator: A) -> Self {
        Self {
            handler,
            state: State::Header,
            header_tokenizer: HeaderTokenizer::new(),
            chunk_tokenizer: ChunkTokenizer::new(),
            status_code: 0,
            status_sent: false,
            content_length: None,
            remaining: 0,
            chunked: false,
            scratch: ScratchBuffer::new(allocator),
            key_len: 0,
            value_len: 0,
            max_header_bytes: MAX_HEADER_LINE_BYTES,
            failure: None,
        }
    }

    /// Overrides the limit on a single header name plus value, [`MAX_HEADER_LINE_BYTES`] by default.
    #[must_use]
    pub fn with_max_header_bytes(mut self, max_header_bytes: usize) -> Self {
        self.max_header_bytes = max_header_bytes;
        self
    }

    /// Feeds the next piece of the response.
    ///
    /// Bytes are consumed until the input is exhausted or the response reaches
    /// `Close` or `Error`. When `needs_more` is true the caller must call
    /// `feed` again with further bytes. Feeding an empty slice changes nothing.
    pub fn feed(&mut self, data: &[u8]) -> FeedStatus {
        let mut consumed = 0;

        while consumed < data.len() {
            let rest = &data[consumed..];
            let step = match self.state {
                State::Header => self.step_header(rest[0]).map(|()| 1),
                State::ChunkHeader => self.step_chunk_header(rest[0]).map(|()| 1),
                State::ChunkData | State::RawData => Ok(self.step_body(rest)),
                State::Close | State::Error => break,
            };

            match step {
                Ok(n) => consumed += n,
                Err(e) => {
                    consumed += 1;
                    self.fail(e);
                }
            }
        }

        FeedStatus { consumed, needs_more: !self.state.is_terminal() }
    }

    fn step_header(&mut self, byte: u8) -> Result<(), ParseError> {
        match self.header_tokenizer.classify(byte) {
            TokenEvent::None => {}
            TokenEvent::StatusDigit(digit) => {
                self.status_code = self
                    .status_code
                    .checked_mul(10)
                    .and_then(|code| code.checked_add(u16::from(digit)))
                    .ok_or(ParseError::InvalidStatusCode)?;
            }
            TokenEvent::KeyChar => {
                self.push_header_byte(byte)?;
                self.key_len += 1;
            }
            TokenEvent::ValueChar => {
                self.push_header_byte(byte)?;
                self.value_len += 1;
            }
            TokenEvent::PairComplete => self.dispatch_header(),
            TokenEvent::BlockComplete => self.finish_header()?,
        }
        Ok(())
    }

    fn push_header_byte(&mut self, byte: u8) -> Result<(), ParseError> {
        let len = self.key_len + self.value_len;
        ensure!(len < self.max_header_bytes, ParseError::too_large_header(len + 1, self.max_header_bytes));

        self.scratch.push(byte.to_ascii_lowercase());
        Ok(())
    }

    /// Hands the status code to the handler once, before any header.
    fn emit_status(&mut self) {
        if !self.status_sent {
            self.status_sent = true;
            self.handler.on_status(self.status_code);
        }
    }

    /// Interprets the accumulated pair, then hands it to the handler.
    fn dispatch_header(&mut self) {
        self.emit_status();

        let (key, value) = self.scratch.as_slice().split_at(self.key_len);
        let value = value.trim_ascii_end();

        if key.eq_ignore_ascii_case(b"transfer-encoding") {
            self.chunked = value.eq_ignore_ascii_case(b"chunked");
        } else if key.eq_ignore_ascii_case(b"content-length") {
            self.content_length = parse_content_length(value);
            if self.content_length.is_none() {
                debug!("ignore unparsable content-length header");
            }
        }

        self.handler.on_header(key, value);

        self.scratch.clear();
        self.key_len = 0;
        self.value_len = 0;
    }

    fn finish_header(&mut self) -> Result<(), ParseError> {
        self.emit_status();

        if let Some(e) = self.header_tokenizer.error() {
            return Err(e);
        }

        if self.chunked {
            self.remaining = 0;
            self.enter(State::ChunkHeader);
            return Ok(());
        }

        match self.content_length {
            Some(0) => self.enter(State::Close),
            Some(length) => {
                self.remaining = length;
                self.enter(State::RawData);
            }
            None => return Err(ParseError::UnknownBodyLength),
        }
        Ok(())
    }

    fn step_chunk_header(&mut self, byte: u8) -> Result<(), ParseError> {
        match self.chunk_tokenizer.classify(byte) {
            ChunkEvent::Continue => {}
            ChunkEvent::Size(0) => self.enter(State::Close),
            ChunkEvent::Size(size) => {
                trace!(size, "read chunk size");
                self.remaining = size;
                self.enter(State::ChunkData);
            }
            ChunkEvent::Invalid => return Err(ParseError::InvalidChunk),
        }
        Ok(())
    }

    /// Forwards up to `remaining` bytes of body, returning how many were used.
    fn step_body(&mut self, data: &[u8]) -> usize {
        let len = usize::try_from(self.remaining).map_or(data.len(), |remaining| remaining.min(data.len()));

        self.handler.on_body(&data[..len]);
        self.remaining -= len as u64;

        if self.remaining == 0 {
            match self.state {
                State::ChunkData => self.enter(State::ChunkHeader),
                _ => self.enter(State::Close),
            }
        }
        len
    }

    fn enter(&mut self, state: State) {
        trace!(from = ?self.state, to = ?state, "response parser transition");
        self.state = state;
        if state.is_terminal() {
            self.scratch.release();
        }
    }

    fn fail(&mut self, error: ParseError) {
        debug!(cause = %error, "failed to parse response");
        if self.state == State::Header {
            self.emit_status();
        }
        self.failure = Some(error);
        self.enter(State::Error);
    }

    /// Returns the parser to its initial state, keeping the handler.
    pub fn reset(&mut self) {
        self.scratch.release();
        self.state = State::Header;
        self.header_tokenizer = HeaderTokenizer::new();
        self.chunk_tokenizer = ChunkTokenizer::new();
        self.status_code = 0;
        self.status_sent = false;
        self.content_length = None;
        self.remaining = 0;
        self.chunked = false;
        self.key_len = 0;
        self.value_len = 0;
        self.failure = None;
    }

    /// Releases the scratch buffer of a parser that is abandoned mid-response.
    pub fn release(&mut self) {
        self.scratch.release();
    }
}

impl<H, A: ScratchAllocator> ResponseParser<H, A> {
    #[inline]
    pub fn state(&self) -> State {
        self.state
    }

    /// Returns true once the response is complete or malformed.
    #[inline]
    pub fn is_done(&self) -> bool {
        self.state.is_terminal()
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        self.state == State::Error
    }

    /// The reason the parser entered its error state.
    pub fn error(&self) -> Option<ParseError> {
        self.failure
    }

    /// The status code accumulated so far.
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    /// Whether a `transfer-encoding: chunked` header was seen.
    pub fn is_chunked(&self) -> bool {
        self.chunked
    }

    /// The declared content-length, if one was seen and could be parsed.
    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    /// Capacity of the header scratch buffer, 0 once released.
    pub fn scratch_capacity(&self) -> usize {
        self.scratch.capacity()
    }

    pub fn allocator(&self) -> &A {
        self.scratch.allocator()
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    /// Consumes the parser, releasing its scratch buffer, and returns the handler.
    pub fn into_handler(self) -> H {
        self.handler
    }
}

/// Parses a decimal content-length, `None` when it is not a valid `u64`.
fn parse_content_length(value: &[u8]) -> Option<u64> {
    if value.is_empty() {
        return None;
    }

    value.iter().try_fold(0u64, |length, b| {
        let digit = match b {
            b'0'..=b'9' => u64::from(b - b'0'),
            _ => return None,
        };
        length.checked_mul(10)?.checked_add(digit)
    })
}

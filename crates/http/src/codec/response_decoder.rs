//! HTTP response decoder module
//!
//! Adapts the push based [`ResponseParser`] to the pull based
//! [`tokio_util::codec::Decoder`] interface, so a response can be read with
//! [`FramedRead`](tokio_util::codec::FramedRead) as a stream of [`Message`]s.
//!
//! # Example
//!
//! ```no_run
//! use micro_http_response::codec::ResponseDecoder;
//! use tokio_util::codec::Decoder;
//! use bytes::BytesMut;
//!
//! let mut decoder = ResponseDecoder::new();
//! let mut buffer = BytesMut::from(&b"HTTP/1.1 204 No Content\r\nContent-Length: 0\r\n\r\n"[..]);
//! while let Some(message) = decoder.decode(&mut buffer).unwrap() {
//!     println!("{message:?}");
//! }
//! ```

use std::collections::VecDeque;

use bytes::{Buf, Bytes, BytesMut};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::parser::{ResponseHandler, ResponseParser};
use crate::protocol::{HttpError, Message, ParseError, PayloadItem};

/// Queues parser events until the decoder hands them out.
#[derive(Debug, Default)]
struct MessageQueue {
    messages: VecDeque<Message>,
}

impl ResponseHandler for MessageQueue {
    fn on_status(&mut self, code: u16) {
        self.messages.push_back(Message::Status(code));
    }

    fn on_header(&mut self, key: &[u8], value: &[u8]) {
        self.messages.push_back(Message::Header(Bytes::copy_from_slice(key), Bytes::copy_from_slice(value)));
    }

    fn on_body(&mut self, data: &[u8]) {
        self.messages.push_back(Message::Payload(PayloadItem::Chunk(Bytes::copy_from_slice(data))));
    }
}

/// A decoder for one HTTP response.
///
/// Produces [`Message::Status`], then one [`Message::Header`] per header, then
/// the body as [`PayloadItem::Chunk`]s followed by a single
/// [`PayloadItem::Eof`]. After that the decoder yields nothing more and leaves
/// any further bytes in the buffer.
#[derive(Debug)]
pub struct ResponseDecoder {
    parser: ResponseParser<MessageQueue>,
    eof_sent: bool,
}

impl ResponseDecoder {
    pub fn new() -> Self {
        Default::default()
    }

    /// Returns true once the response has been fully decoded.
    pub fn is_finished(&self) -> bool {
        self.eof_sent
    }

    /// Prepares the decoder for the next response.
    pub fn reset(&mut self) {
        self.parser.reset();
        self.parser.handler_mut().messages.clear();
        self.eof_sent = false;
    }
}

impl Default for ResponseDecoder {
    fn default() -> Self {
        Self { parser: ResponseParser::new(MessageQueue::default()), eof_sent: false }
    }
}

impl Decoder for ResponseDecoder {
    type Item = Message;
    type Error = HttpError;

    /// Attempts to decode the next response event from the provided buffer
    ///
    /// # Returns
    ///
    /// - `Ok(Some(_))`: the next event
    /// - `Ok(None)`: need more data, or the response is finished
    /// - `Err(_)`: the response is malformed
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            if let Some(message) = self.parser.handler_mut().messages.pop_front() {
                return Ok(Some(message));
            }

            if let Some(e) = self.parser.error() {
                return Err(e.into());
            }

            if self.parser.is_done() {
                if self.eof_sent {
                    return Ok(None);
                }
                trace!("finished decoding response");
                self.eof_sent = true;
                return Ok(Some(Message::Payload(PayloadItem::Eof)));
            }

            if src.is_empty() {
                return Ok(None);
            }

            let status = self.parser.feed(src);
            src.advance(status.consumed);
        }
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(buf)? {
            Some(message) => Ok(Some(message)),
            None if self.parser.is_done() => Ok(None),
            None => Err(ParseError::Incomplete.into()),
        }
    }
}

//! An incremental HTTP/1.x response parser
//!
//! This crate parses HTTP responses as their bytes arrive. Bytes are pushed
//! into a [`parser::ResponseParser`] in pieces of any size, down to a single
//! byte, and the parser reports the status code, each header and the decoded
//! body to a [`parser::ResponseHandler`]. Parsing never blocks and never
//! performs I/O; when more input is needed the parser says so and the caller
//! decides when to read again.
//!
//! # Features
//!
//! - Push based, resumable at any byte boundary
//! - Content-Length and chunked transfer encoding
//! - One reusable scratch buffer per response, grown geometrically
//! - Pluggable allocation hooks for the scratch buffer
//! - `tokio-util` codec adapter and an async connection driver
//!
//! # Example
//!
//! ```
//! use micro_http_response::parser::{ResponseHandler, ResponseParser};
//!
//! #[derive(Default)]
//! struct Collect {
//!     code: u16,
//!     body: Vec<u8>,
//! }
//!
//! impl ResponseHandler for Collect {
//!     fn on_status(&mut self, code: u16) {
//!         self.code = code;
//!     }
//!
//!     fn on_body(&mut self, data: &[u8]) {
//!         self.body.extend_from_slice(data);
//!     }
//! }
//!
//! let response = b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\nhello";
//! let mut parser = ResponseParser::new(Collect::default());
//!
//! // one byte at a time yields the same result as the whole buffer
//! for byte in response {
//!     parser.feed(std::slice::from_ref(byte));
//! }
//!
//! assert!(parser.is_done() && !parser.is_error());
//! assert_eq!(parser.handler().code, 200);
//! assert_eq!(parser.handler().body, b"hello");
//! ```
//!
//! # Architecture
//!
//! The crate is organized into several key modules:
//!
//! - [`tokenizer`]: byte classifiers for the header block and chunk framing
//! - [`parser`]: the response state machine and its scratch buffer
//! - [`protocol`]: messages, the collected [`protocol::Response`] and errors
//! - [`codec`]: a `tokio_util::codec::Decoder` over the parser
//! - [`connection`]: an async driver that sends a request and reads the response
//!
//! # Error Handling
//!
//! - [`protocol::ParseError`]: why a response was rejected; reported by
//!   [`parser::ResponseParser::error`] once the parser is in its error state
//! - [`protocol::HttpError`]: top-level error of the codec and the connection,
//!   covering connect, send and receive failures as well
//!
//! # Limitations
//!
//! - Responses only, HTTP/1.0 and HTTP/1.1
//! - No TLS, no connection reuse
//! - Header names and values are delivered lowercased
//! - Chunk trailers are skipped
//! - Maximum size of one header line: 8KB by default

pub mod codec;
pub mod connection;
pub mod parser;
pub mod protocol;
pub mod tokenizer;

mod utils;
pub(crate) use utils::ensure;

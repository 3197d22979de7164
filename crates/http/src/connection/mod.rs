//! Client side connection handling
//!
//! This module drives a [`ResponseParser`](crate::parser::ResponseParser) from an
//! async byte stream. It is the transport side of the parser: it owns the
//! socket, performs the reads and decides when to feed more bytes.
//!
//! # Components
//!
//! - [`HttpConnection`]: writes a request and loop-feeds the response into a
//!   parser, or exposes the read side as a stream of decoded events
//! - [`connect`]: opens a TCP connection and wraps it in an [`HttpConnection`]
//!
//! The parser itself never blocks; suspension happens here, between reads.

mod http_connection;

pub use http_connection::{DEFAULT_READ_BUFFER_SIZE, HttpConnection, SIMPLE_GET_REQUEST, connect};

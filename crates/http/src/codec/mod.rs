//! Stream decoding of HTTP responses
//!
//! This module bridges the push based [`ResponseParser`](crate::parser::ResponseParser)
//! and `tokio-util`'s codec framework:
//!
//! - [`ResponseDecoder`]: decodes a response into [`Message`](crate::protocol::Message)
//!   events, usable with `FramedRead`
//!
//! # Example
//!
//! ```no_run
//! use futures::StreamExt;
//! use micro_http_response::codec::ResponseDecoder;
//! use tokio::net::TcpStream;
//! use tokio_util::codec::FramedRead;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let stream = TcpStream::connect("127.0.0.1:8080").await?;
//! let mut framed = FramedRead::new(stream, ResponseDecoder::new());
//! while let Some(message) = framed.next().await {
//!     println!("{:?}", message?);
//! }
//! # Ok(())
//! # }
//! ```

mod response_decoder;

pub use response_decoder::ResponseDecoder;

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("response error: {source}")]
    ResponseError {
        #[from]
        source: ParseError,
    },

    #[error("failed to connect {host}:{port}, cause: {source}")]
    ConnectError { host: String, port: u16, source: io::Error },

    #[error("failed to send request: {source}")]
    SendError { source: io::Error },

    #[error("failed to receive response: {source}")]
    ReceiveError { source: io::Error },

    #[error("connection closed before the response was complete")]
    UnexpectedEof,

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl HttpError {
    pub fn connect<S: ToString>(host: S, port: u16, source: io::Error) -> Self {
        Self::ConnectError { host: host.to_string(), port, source }
    }

    pub fn send(source: io::Error) -> Self {
        Self::SendError { source }
    }

    pub fn receive(source: io::Error) -> Self {
        Self::ReceiveError { source }
    }
}

/// Reasons a [`ResponseParser`](crate::parser::ResponseParser) enters its error state.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid status line")]
    InvalidStatusLine,

    #[error("invalid status code")]
    InvalidStatusCode,

    #[error("invalid header line")]
    InvalidHeader,

    #[error("header size too large, current: {current_size} exceed the limit {max_size}")]
    TooLargeHeader { current_size: usize, max_size: usize },

    #[error("response has neither content-length nor chunked transfer-encoding")]
    UnknownBodyLength,

    #[error("invalid chunked body")]
    InvalidChunk,

    #[error("response is incomplete")]
    Incomplete,
}

impl ParseError {
    pub fn too_large_header(current_size: usize, max_size: usize) -> Self {
        Self::TooLargeHeader { current_size, max_size }
    }
}

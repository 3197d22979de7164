//! Core protocol types shared by the parser, the codec and the connection.
//!
//! - **Messages** ([`Message`], [`PayloadItem`]): the events a response is
//!   decoded into when it is read as a stream
//! - **Response collection** ([`Response`]): a handler that gathers status,
//!   headers and body into one value
//! - **Errors** ([`HttpError`], [`ParseError`]): transport failures and the
//!   reasons a response is rejected

mod message;
pub use message::Message;
pub use message::PayloadItem;

mod response;
pub use response::Response;

mod error;
pub use error::HttpError;
pub use error::ParseError;

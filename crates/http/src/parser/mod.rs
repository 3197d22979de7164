//! The response state machine and its header scratch buffer.
//!
//! - [`ResponseParser`]: drives the tokenizers over pushed bytes and reports
//!   status, headers and body to a [`ResponseHandler`]
//! - [`ScratchBuffer`]: accumulates the header line being parsed, with
//!   allocation hooks through [`ScratchAllocator`]

mod handler;
mod response_parser;
mod scratch;

pub use handler::{IgnoreHandler, ResponseHandler};
pub use response_parser::{FeedStatus, MAX_HEADER_LINE_BYTES, ResponseParser, State};
pub use scratch::{MIN_SCRATCH_CAPACITY, ScratchAllocator, ScratchBuffer, SystemAllocator};

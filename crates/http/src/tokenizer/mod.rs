//! Byte classifiers driven by the response parser.
//!
//! - [`HeaderTokenizer`]: status line and header block
//! - [`ChunkTokenizer`]: chunk size lines, chunk terminators and trailers
//!
//! Both look at a single byte per call and never buffer input, so they can be
//! resumed at any byte boundary.

mod chunk_tokenizer;
mod header_tokenizer;

pub use chunk_tokenizer::{ChunkEvent, ChunkTokenizer};
pub use header_tokenizer::{HeaderTokenizer, TokenEvent};

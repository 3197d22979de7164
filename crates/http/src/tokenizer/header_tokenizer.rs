//! Byte-at-a-time tokenizer for the response status line and header block.
//!
//! The tokenizer keeps no text of its own. Each call to
//! [`HeaderTokenizer::classify`] looks at exactly one byte and reports what
//! that byte means, leaving accumulation to the caller:
//!
//! ```text
//! HTTP/1.1 200 OK\r\n          version, status digits, reason
//! Content-Length: 5\r\n        key chars, value chars, pair complete
//! \r\n                         block complete
//! ```
//!
//! Lines may end with CRLF or a bare LF. Header values may be empty; leading
//! whitespace before a value is skipped, while trailing whitespace is reported
//! as value characters. Folded header lines (a line starting with whitespace)
//! are rejected.
//!
//! Errors are folded into [`TokenEvent::BlockComplete`]: once a malformed byte
//! is seen the tokenizer reports the block as complete and keeps the reason in
//! [`HeaderTokenizer::error`].

use crate::protocol::ParseError;

const VERSION_PREFIX: &[u8] = b"HTTP/";

/// Classification of a single byte of the header block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenEvent {
    /// The byte carries no information for the caller (separators, CR, reason text)
    None,
    /// A status code digit, with its numeric value
    StatusDigit(u8),
    /// A byte of a header name
    KeyChar,
    /// A byte of a header value
    ValueChar,
    /// The current header line is complete
    PairComplete,
    /// The header block is complete, or the tokenizer failed
    BlockComplete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeaderState {
    /// Matching the literal `HTTP/` prefix, holding the number of bytes matched
    VersionPrefix(u8),
    /// Version number digits and dots, `true` once a digit was seen
    Version(bool),
    /// Spaces between the version and the status code
    CodeStart,
    Code,
    Reason,
    StatusLf,
    LineStart,
    Key,
    /// Optional whitespace between the colon and the value
    ValueLws,
    Value,
    ValueLf,
    EndLf,
    Done,
    Failed(ParseError),
}

/// Tokenizer state for one response header block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderTokenizer {
    state: HeaderState,
}

impl Default for HeaderTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl HeaderTokenizer {
    pub fn new() -> Self {
        Self { state: HeaderState::VersionPrefix(0) }
    }

    /// Returns the failure reason once the tokenizer has rejected a byte.
    pub fn error(&self) -> Option<ParseError> {
        match self.state {
            HeaderState::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Returns true once the empty line ending the header block was consumed.
    pub fn is_done(&self) -> bool {
        self.state == HeaderState::Done
    }

    /// Classifies the next byte of the header block.
    pub fn classify(&mut self, byte: u8) -> TokenEvent {
        use HeaderState::*;

        let (next, event) = match (self.state, byte) {
            (VersionPrefix(matched), b) => {
                if VERSION_PREFIX.get(usize::from(matched)) == Some(&b) {
                    let matched = matched + 1;
                    if usize::from(matched) == VERSION_PREFIX.len() {
                        (Version(false), TokenEvent::None)
                    } else {
                        (VersionPrefix(matched), TokenEvent::None)
                    }
                } else {
                    return self.fail(ParseError::InvalidStatusLine);
                }
            }

            (Version(_), b'0'..=b'9') => (Version(true), TokenEvent::None),
            (Version(seen), b'.') => (Version(seen), TokenEvent::None),
            (Version(true), b' ') => (CodeStart, TokenEvent::None),

            (CodeStart, b' ') => (CodeStart, TokenEvent::None),
            (CodeStart | Code, b @ b'0'..=b'9') => (Code, TokenEvent::StatusDigit(b - b'0')),

            (Code, b' ' | b'\t') => (Reason, TokenEvent::None),
            (Code, b'\r') => (StatusLf, TokenEvent::None),
            (Code, b'\n') => (LineStart, TokenEvent::None),

            (Reason, b'\r') => (StatusLf, TokenEvent::None),
            (Reason, b'\n') => (LineStart, TokenEvent::None),
            (Reason, _) => (Reason, TokenEvent::None),

            (StatusLf, b'\n') => (LineStart, TokenEvent::None),

            (LineStart, b'\r') => (EndLf, TokenEvent::None),
            (LineStart, b'\n') | (EndLf, b'\n') => (Done, TokenEvent::BlockComplete),
            (LineStart | Key, b) if is_token(b) => (Key, TokenEvent::KeyChar),

            (Key, b':') => (ValueLws, TokenEvent::None),

            (ValueLws, b' ' | b'\t') => (ValueLws, TokenEvent::None),
            (ValueLws | Value, b'\r') => (ValueLf, TokenEvent::None),
            (ValueLws | Value, b'\n') | (ValueLf, b'\n') => (LineStart, TokenEvent::PairComplete),
            (ValueLws | Value, b) if is_value_byte(b) => (Value, TokenEvent::ValueChar),

            (Failed(_), _) => return TokenEvent::BlockComplete,

            (Version(_) | CodeStart | Code | StatusLf, _) => return self.fail(ParseError::InvalidStatusLine),
            (LineStart | Key | ValueLws | Value | ValueLf | EndLf | Done, _) => {
                return self.fail(ParseError::InvalidHeader);
            }
        };

        self.state = next;
        event
    }

    fn fail(&mut self, error: ParseError) -> TokenEvent {
        self.state = HeaderState::Failed(error);
        TokenEvent::BlockComplete
    }
}

/// `tchar` from RFC 9110, the bytes allowed in a header name.
fn is_token(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}

/// Visible ASCII, obs-text, space and horizontal tab.
fn is_value_byte(b: u8) -> bool {
    b == b'\t' || b == b' ' || b.is_ascii_graphic() || b >= 0x80
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify_all(tokenizer: &mut HeaderTokenizer, bytes: &[u8]) -> Vec<TokenEvent> {
        bytes.iter().map(|b| tokenizer.classify(*b)).filter(|e| *e != TokenEvent::None).collect()
    }

    #[test]
    fn test_status_line() {
        let mut tokenizer = HeaderTokenizer::new();
        let events = classify_all(&mut tokenizer, b"HTTP/1.1 204 No Content\r\n\r\n");

        assert_eq!(
            events,
            vec![
                TokenEvent::StatusDigit(2),
                TokenEvent::StatusDigit(0),
                TokenEvent::StatusDigit(4),
                TokenEvent::BlockComplete
            ]
        );
        assert!(tokenizer.is_done());
        assert_eq!(tokenizer.error(), None);
    }

    #[test]
    fn test_status_line_without_reason() {
        let mut tokenizer = HeaderTokenizer::new();
        let events = classify_all(&mut tokenizer, b"HTTP/1.0 200\r\n\r\n");

        assert_eq!(events.len(), 4);
        assert!(tokenizer.is_done());
    }

    #[test]
    fn test_header_pair() {
        let mut tokenizer = HeaderTokenizer::new();
        classify_all(&mut tokenizer, b"HTTP/1.1 200 OK\r\n");

        let events = classify_all(&mut tokenizer, b"Ab:  xy\r\n");
        assert_eq!(
            events,
            vec![
                TokenEvent::KeyChar,
                TokenEvent::KeyChar,
                TokenEvent::ValueChar,
                TokenEvent::ValueChar,
                TokenEvent::PairComplete
            ]
        );
    }

    #[test]
    fn test_bare_lf_line_endings() {
        let mut tokenizer = HeaderTokenizer::new();
        let events = classify_all(&mut tokenizer, b"HTTP/1.1 200 OK\nA: b\n\n");

        assert_eq!(events.last(), Some(&TokenEvent::BlockComplete));
        assert!(events.contains(&TokenEvent::PairComplete));
        assert_eq!(tokenizer.error(), None);
    }

    #[test]
    fn test_empty_value() {
        let mut tokenizer = HeaderTokenizer::new();
        classify_all(&mut tokenizer, b"HTTP/1.1 200 OK\r\n");

        let events = classify_all(&mut tokenizer, b"X-Empty:\r\n");
        assert_eq!(events.iter().filter(|e| **e == TokenEvent::ValueChar).count(), 0);
        assert_eq!(events.last(), Some(&TokenEvent::PairComplete));
    }

    #[test]
    fn test_invalid_version() {
        let mut tokenizer = HeaderTokenizer::new();
        assert_eq!(tokenizer.classify(b'H'), TokenEvent::None);
        assert_eq!(tokenizer.classify(b'X'), TokenEvent::BlockComplete);
        assert_eq!(tokenizer.error(), Some(ParseError::InvalidStatusLine));

        // stays failed
        assert_eq!(tokenizer.classify(b'P'), TokenEvent::BlockComplete);
    }

    #[test]
    fn test_empty_version() {
        let lines: [&[u8]; 2] = [b"HTTP/ 200 OK\r\n", b"HTTP/. 200 OK\r\n"];
        for line in lines {
            let mut tokenizer = HeaderTokenizer::new();
            let events = classify_all(&mut tokenizer, line);

            assert_eq!(events.first(), Some(&TokenEvent::BlockComplete));
            assert_eq!(tokenizer.error(), Some(ParseError::InvalidStatusLine));
        }
    }

    #[test]
    fn test_single_digit_version() {
        let mut tokenizer = HeaderTokenizer::new();
        let events = classify_all(&mut tokenizer, b"HTTP/2 200\r\n\r\n");

        assert_eq!(events.len(), 4);
        assert_eq!(tokenizer.error(), None);
    }

    #[test]
    fn test_missing_status_code() {
        let mut tokenizer = HeaderTokenizer::new();
        let events = classify_all(&mut tokenizer, b"HTTP/1.1 OK\r\n");

        assert_eq!(events.first(), Some(&TokenEvent::BlockComplete));
        assert_eq!(tokenizer.error(), Some(ParseError::InvalidStatusLine));
    }

    #[test]
    fn test_space_before_colon() {
        let mut tokenizer = HeaderTokenizer::new();
        classify_all(&mut tokenizer, b"HTTP/1.1 200 OK\r\n");

        let events = classify_all(&mut tokenizer, b"Host : a\r\n");
        assert_eq!(events.last(), Some(&TokenEvent::BlockComplete));
        assert_eq!(tokenizer.error(), Some(ParseError::InvalidHeader));
    }

    #[test]
    fn test_folded_line_rejected() {
        let mut tokenizer = HeaderTokenizer::new();
        classify_all(&mut tokenizer, b"HTTP/1.1 200 OK\r\nA: b\r\n");

        assert_eq!(tokenizer.classify(b' '), TokenEvent::BlockComplete);
        assert_eq!(tokenizer.error(), Some(ParseError::InvalidHeader));
    }

    #[test]
    fn test_cr_without_lf() {
        let mut tokenizer = HeaderTokenizer::new();
        classify_all(&mut tokenizer, b"HTTP/1.1 200 OK\r\nA: b\r");

        assert_eq!(tokenizer.classify(b'x'), TokenEvent::BlockComplete);
        assert_eq!(tokenizer.error(), Some(ParseError::InvalidHeader));
    }
}

//! A [`ResponseHandler`] that collects the whole response.
//!
//! [`Response`] keeps the status code, the headers in an [`http::HeaderMap`]
//! and the body in a single buffer. It can be turned into an
//! [`http::Response`] once the parser has reached `Close`.

use bytes::{Bytes, BytesMut};
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use tracing::warn;

use crate::parser::{ResponseHandler, ResponseParser};
use crate::protocol::ParseError;

/// The collected status, headers and body of one response.
#[derive(Debug, Default, Clone)]
pub struct Response {
    code: u16,
    headers: HeaderMap,
    body: BytesMut,
}

impl Response {
    /// Parses a complete response held in memory.
    ///
    /// Returns the response and the number of bytes it occupied; bytes after
    /// the end of the response are not looked at.
    pub fn parse(data: &[u8]) -> Result<(Response, usize), ParseError> {
        let mut parser = ResponseParser::new(Response::default());
        let status = parser.feed(data);

        if let Some(e) = parser.error() {
            return Err(e);
        }
        if status.needs_more {
            return Err(ParseError::Incomplete);
        }
        Ok((parser.into_handler(), status.consumed))
    }

    /// The raw status code as received.
    pub fn code(&self) -> u16 {
        self.code
    }

    /// The status code, if it is a valid HTTP status.
    pub fn status(&self) -> Option<StatusCode> {
        StatusCode::from_u16(self.code).ok()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &BytesMut {
        &self.body
    }

    /// Converts into an [`http::Response`] carrying the body as [`Bytes`].
    pub fn into_http(self) -> Result<http::Response<Bytes>, ParseError> {
        let Ok(status) = StatusCode::from_u16(self.code) else {
            return Err(ParseError::InvalidStatusCode);
        };

        let mut response = http::Response::new(self.body.freeze());
        *response.status_mut() = status;
        *response.headers_mut() = self.headers;
        Ok(response)
    }
}

impl ResponseHandler for Response {
    fn on_status(&mut self, code: u16) {
        self.code = code;
    }

    fn on_header(&mut self, key: &[u8], value: &[u8]) {
        let name = match HeaderName::from_bytes(key) {
            Ok(name) => name,
            Err(e) => {
                warn!(cause = %e, "skip header with invalid name");
                return;
            }
        };

        match HeaderValue::from_bytes(value) {
            Ok(value) => {
                self.headers.append(name, value);
            }
            Err(e) => warn!(cause = %e, header = %name, "skip header with invalid value"),
        }
    }

    fn on_body(&mut self, data: &[u8]) {
        self.body.extend_from_slice(data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header;
    use indoc::indoc;

    #[test]
    fn test_collect_response() {
        let str = indoc! {"
            HTTP/1.1 200 OK
            Content-Type: text/html
            Set-Cookie: a=1
            Set-Cookie: b=2
            Content-Length: 13

            <html></html>"};

        let (response, consumed) = Response::parse(str.as_bytes()).unwrap();

        assert_eq!(consumed, str.len());
        assert_eq!(response.status(), Some(StatusCode::OK));
        assert_eq!(response.headers().get(header::CONTENT_TYPE), Some(&HeaderValue::from_static("text/html")));
        assert_eq!(response.headers().get_all(header::SET_COOKIE).iter().count(), 2);
        assert_eq!(&response.body()[..], b"<html></html>");
    }

    #[test]
    fn test_into_http() {
        let (response, _) = Response::parse(b"HTTP/1.1 404 Not Found\r\nContent-Length: 4\r\n\r\nnope").unwrap();
        let response = response.into_http().unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers().get(header::CONTENT_LENGTH), Some(&HeaderValue::from_static("4")));
        assert_eq!(response.body(), &Bytes::from_static(b"nope"));
    }

    #[test]
    fn test_invalid_status_for_http() {
        let (response, _) = Response::parse(b"HTTP/1.1 1000 Odd\r\nContent-Length: 0\r\n\r\n").unwrap();

        assert_eq!(response.code(), 1000);
        assert_eq!(response.status(), None);
        assert_eq!(response.into_http().unwrap_err(), ParseError::InvalidStatusCode);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Response::parse(b"HTTP/1.1 200 OK\r\n\r\n").unwrap_err(), ParseError::UnknownBodyLength);
        assert_eq!(
            Response::parse(b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\nab").unwrap_err(),
            ParseError::Incomplete
        );
    }
}

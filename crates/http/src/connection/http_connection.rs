use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio_util::codec::FramedRead;
use tracing::{debug, info, trace};

use crate::codec::ResponseDecoder;
use crate::parser::{ResponseHandler, ResponseParser, ScratchAllocator};
use crate::protocol::HttpError;

/// Size of the buffer each socket read lands in
pub const DEFAULT_READ_BUFFER_SIZE: usize = 1024;

/// The request sent by [`HttpConnection::send_simple_get`]
pub const SIMPLE_GET_REQUEST: &[u8] = b"GET / HTTP/1.0\r\nContent-Length: 0\r\n\r\n";

/// A client side HTTP connection that writes a request and feeds the response
/// into a [`ResponseParser`].
///
/// The connection owns the scheduling loop: it reads into a fixed-size buffer
/// and re-invokes [`ResponseParser::feed`] with the unconsumed remainder until
/// the parser needs no more input.
///
/// # Type Parameters
///
/// * `R`: The async readable stream type
/// * `W`: The async writable stream type
#[derive(Debug)]
pub struct HttpConnection<R, W> {
    reader: R,
    writer: W,
    read_buffer_size: usize,
}

/// Opens a TCP connection to `host:port`.
pub async fn connect(host: &str, port: u16) -> Result<HttpConnection<OwnedReadHalf, OwnedWriteHalf>, HttpError> {
    let stream = TcpStream::connect((host, port)).await.map_err(|e| HttpError::connect(host, port, e))?;
    info!(host, port, "connected");

    let (reader, writer) = stream.into_split();
    Ok(HttpConnection::new(reader, writer))
}

impl<R, W> HttpConnection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer, read_buffer_size: DEFAULT_READ_BUFFER_SIZE }
    }

    #[must_use]
    pub fn with_read_buffer_size(mut self, read_buffer_size: usize) -> Self {
        self.read_buffer_size = read_buffer_size.max(1);
        self
    }

    /// Writes the raw request bytes and flushes them.
    pub async fn send_request(&mut self, request: &[u8]) -> Result<(), HttpError> {
        self.writer.write_all(request).await.map_err(HttpError::send)?;
        self.writer.flush().await.map_err(HttpError::send)?;
        debug!(len = request.len(), "sent request");
        Ok(())
    }

    /// Sends `GET / HTTP/1.0` with an empty body.
    pub async fn send_simple_get(&mut self) -> Result<(), HttpError> {
        self.send_request(SIMPLE_GET_REQUEST).await
    }

    /// Reads until `parser` has seen a complete response.
    ///
    /// Bytes read past the end of the response are dropped, since the
    /// connection is not reused.
    ///
    /// # Errors
    ///
    /// Returns `HttpError` if:
    /// - reading from the stream fails
    /// - the stream ends before the response is complete
    /// - the parser rejects the response
    pub async fn read_response<H, A>(&mut self, parser: &mut ResponseParser<H, A>) -> Result<(), HttpError>
    where
        H: ResponseHandler,
        A: ScratchAllocator,
    {
        let mut buffer = vec![0u8; self.read_buffer_size];
        let mut needs_more = !parser.is_done();

        while needs_more {
            let read = self.reader.read(&mut buffer).await.map_err(HttpError::receive)?;
            if read == 0 {
                debug!(state = ?parser.state(), "connection closed mid response");
                return Err(HttpError::UnexpectedEof);
            }
            trace!(read, "received response bytes");

            let mut data = &buffer[..read];
            while needs_more && !data.is_empty() {
                let status = parser.feed(data);
                needs_more = status.needs_more;
                data = &data[status.consumed..];
            }
        }

        if let Some(e) = parser.error() {
            return Err(e.into());
        }
        Ok(())
    }

    /// Turns the read side into a stream of decoded response events.
    pub fn into_message_stream(self) -> FramedRead<R, ResponseDecoder> {
        FramedRead::with_capacity(self.reader, ResponseDecoder::new(), self.read_buffer_size)
    }

    pub fn into_parts(self) -> (R, W) {
        (self.reader, self.writer)
    }
}

/// Receives the events of a [`ResponseParser`](super::ResponseParser).
///
/// Every method is called synchronously from within
/// [`feed`](super::ResponseParser::feed), in the order the bytes appear on the
/// wire: the status code once, then each header, then the body pieces.
#[allow(unused_variables, reason = "default implementations ignore their arguments")]
pub trait ResponseHandler {
    /// Called once with the status code, right before the first header, or at
    /// the end of the header block when there are no headers.
    ///
    /// This also runs when the parser fails before the end of the header
    /// block, right before it enters its error state. The code is then the one
    /// accumulated so far, which may be partial.
    fn on_status(&mut self, code: u16) {}

    /// Called for every header line. Name and value are lowercased and the
    /// value has its surrounding whitespace removed.
    fn on_header(&mut self, key: &[u8], value: &[u8]) {}

    /// Called with a piece of the decoded body.
    ///
    /// This may be executed multiple times in order to supply the entire body;
    /// chunk boundaries and read boundaries are not preserved.
    fn on_body(&mut self, data: &[u8]) {}
}

impl<H: ResponseHandler + ?Sized> ResponseHandler for &mut H {
    fn on_status(&mut self, code: u16) {
        (**self).on_status(code);
    }

    fn on_header(&mut self, key: &[u8], value: &[u8]) {
        (**self).on_header(key, value);
    }

    fn on_body(&mut self, data: &[u8]) {
        (**self).on_body(data);
    }
}

/// A handler that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct IgnoreHandler;

impl ResponseHandler for IgnoreHandler {}

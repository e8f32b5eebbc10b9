//! Response capture and envelope finalization.
//!
//! A handler does not write to a socket here — it writes into a
//! [`ResponseRecorder`], which buffers status, headers and body until the
//! invocation is over, then folds everything into the platform's response
//! envelope. One recorder per invocation; finalization consumes it, so a
//! finalized recorder cannot be touched again.

use std::collections::HashMap;
use std::io;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use http::{HeaderMap, HeaderValue, StatusCode, header};
use tokio::sync::oneshot;
use tracing::warn;

use crate::error::Error;
use crate::event::HttpResponseEvent;
use crate::headers::canonical_name;
use crate::sniff;

/// Buffers a handler's response and materializes the platform envelope.
///
/// The write side mirrors a conventional HTTP response writer:
///
/// ```rust
/// use fnbridge::ResponseRecorder;
/// use http::StatusCode;
///
/// let mut res = ResponseRecorder::new();
/// res.headers_mut()
///     .insert("content-type", "application/json".parse().unwrap());
/// res.write_header(StatusCode::OK);
/// res.write(br#"{"ok":true}"#);
///
/// let envelope = res.into_event_response().unwrap();
/// assert_eq!(envelope.status_code, 200);
/// ```
///
/// Writing without an explicit status defaults it to `200 OK`; writing
/// without a `Content-Type` header sniffs one from the first written bytes.
/// Finalizing without any status at all is an error — a handler that never
/// responded is a bug, and the envelope has no honest way to express it.
pub struct ResponseRecorder {
    headers: HeaderMap,
    body: Vec<u8>,
    status: Option<StatusCode>,
    observers: Vec<oneshot::Sender<()>>,
}

impl ResponseRecorder {
    /// A fresh recorder: no headers, empty body, status unset.
    pub fn new() -> Self {
        Self {
            headers: HeaderMap::new(),
            body: Vec::new(),
            status: None,
            observers: Vec::new(),
        }
    }

    /// The response headers recorded so far.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The live header collection. Populate it before or between writes.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Records the response status. The last call before finalization wins.
    pub fn write_header(&mut self, status: StatusCode) {
        self.status = Some(status);
    }

    /// Appends `chunk` to the body.
    ///
    /// If no status has been recorded yet this sets `200 OK`. If no
    /// `Content-Type` header is present one is sniffed from `chunk` — set
    /// the header first if you know better.
    pub fn write(&mut self, chunk: &[u8]) {
        if self.status.is_none() {
            self.status = Some(StatusCode::OK);
        }
        if !self.headers.contains_key(header::CONTENT_TYPE) {
            self.headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static(sniff::detect_content_type(chunk)),
            );
        }
        self.body.extend_from_slice(chunk);
    }

    /// Registers an observer that is notified exactly once when the
    /// response is finalized, even when finalization fails.
    ///
    /// The channel is a buffered one-shot: finalization never blocks on a
    /// slow or dropped receiver. Observers fire in registration order.
    pub fn close_notify(&mut self) -> oneshot::Receiver<()> {
        let (tx, rx) = oneshot::channel();
        self.observers.push(tx);
        rx
    }

    /// Finalizes the response into the platform envelope.
    ///
    /// Body bytes become UTF-8 text when they are valid UTF-8, otherwise
    /// base64 — decided once, on the final accumulated bytes. Multi-value
    /// headers are flattened by joining with commas. `Set-Cookie` cannot be
    /// represented in the envelope's single-valued map and is dropped with
    /// a warning.
    ///
    /// Fails with [`Error::StatusNotSet`] when the handler never recorded a
    /// status; observers are notified before that check runs.
    pub fn into_event_response(mut self) -> Result<HttpResponseEvent, Error> {
        for observer in self.observers.drain(..) {
            // a dropped receiver just stopped listening
            let _ = observer.send(());
        }

        let status = self.status.ok_or(Error::StatusNotSet)?;

        let body = match String::from_utf8(self.body) {
            Ok(text) => text,
            Err(raw) => BASE64.encode(raw.into_bytes()),
        };

        let mut headers = HashMap::new();
        let mut dropped_cookies = 0usize;
        for name in self.headers.keys() {
            if *name == header::SET_COOKIE {
                dropped_cookies += self.headers.get_all(name).iter().count();
                continue;
            }
            let joined = self
                .headers
                .get_all(name)
                .iter()
                .filter_map(|value| match value.to_str() {
                    Ok(v) => Some(v),
                    Err(_) => {
                        warn!(header = %name, "skipping non-UTF-8 response header value");
                        None
                    }
                })
                .collect::<Vec<_>>()
                .join(",");
            headers.insert(canonical_name(name.as_str()), joined);
        }
        if dropped_cookies > 0 {
            warn!(
                count = dropped_cookies,
                "set-cookie headers cannot be carried in the response envelope and were dropped"
            );
        }

        Ok(HttpResponseEvent {
            status_code: status.as_u16(),
            headers,
            body,
        })
    }
}

impl Default for ResponseRecorder {
    fn default() -> Self {
        Self::new()
    }
}

/// Lets handlers drive the body with `write!` and friends.
impl io::Write for ResponseRecorder {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        ResponseRecorder::write(self, buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

//! Handler trait — the boundary between the bridge and your code.
//!
//! A handler receives the reconstructed `http::Request` and writes its
//! response into the invocation's [`ResponseRecorder`]. That is the whole
//! contract: request in, writes out. Routing, middleware and business logic
//! live on your side of the line.
//!
//! Two ways to satisfy it:
//!
//! 1. **[`handler_fn`]** wraps a plain async function returning an
//!    `http::Response<Bytes>` and pipes the finished response into the
//!    recorder for you. This is the right default.
//!
//! ```rust
//! use bytes::Bytes;
//! use fnbridge::{Proxy, handler_fn};
//! use http::{Request, Response};
//!
//! async fn hello(_req: Request<Bytes>) -> Response<Bytes> {
//!     Response::new(Bytes::from_static(b"hello"))
//! }
//!
//! let proxy = Proxy::new(handler_fn(hello));
//! ```
//!
//! 2. **Implementing [`Handler`] directly** when you want incremental
//!    writes, content-type control per chunk, or close notification.

use std::future::Future;

use bytes::Bytes;
use http::{Request, Response};

use crate::response::ResponseRecorder;

/// A request handler driven by the [`Proxy`](crate::Proxy).
///
/// `serve` futures must be `Send` so the local dev server can run handlers
/// on tokio worker threads; on the platform itself everything runs in one
/// task and the bound costs nothing.
pub trait Handler: Send + Sync {
    /// Handles one request, writing the response into `res`.
    ///
    /// A handler that returns without recording any status will fail the
    /// invocation at finalization time.
    fn serve(
        &self,
        req: Request<Bytes>,
        res: &mut ResponseRecorder,
    ) -> impl Future<Output = ()> + Send;
}

/// Wraps an `async fn(Request<Bytes>) -> Response<Bytes>` as a [`Handler`].
///
/// The buffered-response convenience: headers, status and body of the
/// returned response are drained into the recorder in that order, so an
/// explicit `Content-Type` always wins over sniffing.
pub fn handler_fn<F, Fut>(f: F) -> HandlerFn<F>
where
    F: Fn(Request<Bytes>) -> Fut + Send + Sync,
    Fut: Future<Output = Response<Bytes>> + Send,
{
    HandlerFn(f)
}

/// A [`Handler`] backed by a plain async function; built by [`handler_fn`].
pub struct HandlerFn<F>(F);

impl<F, Fut> Handler for HandlerFn<F>
where
    F: Fn(Request<Bytes>) -> Fut + Send + Sync,
    Fut: Future<Output = Response<Bytes>> + Send,
{
    async fn serve(&self, req: Request<Bytes>, res: &mut ResponseRecorder) {
        let (parts, body) = (self.0)(req).await.into_parts();
        for (name, value) in parts.headers.iter() {
            res.headers_mut().append(name.clone(), value.clone());
        }
        res.write_header(parts.status);
        if !body.is_empty() {
            res.write(&body);
        }
    }
}

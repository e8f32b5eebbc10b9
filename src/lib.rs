//! # fnbridge
//!
//! Run ordinary Rust HTTP handlers on DigitalOcean Functions.
//! Nothing more. Nothing less.
//!
//! ## The contract
//!
//! The platform invokes your function with a JSON event: a flattened header
//! map, a path, a method, a possibly base64-encoded body. Your handler
//! wants a real `http::Request`. fnbridge is the translation layer between
//! the two — it rebuilds the request, hands it to your handler, captures
//! everything the handler writes, and folds it back into the response
//! envelope the platform expects.
//!
//! What the platform already owns — fnbridge intentionally ignores:
//!
//! - **Routing to your function** — the platform maps URLs to functions
//! - **TLS, rate limiting, body limits** — the platform's edge
//! - **Retries and timeouts** — the invocation controller
//!
//! What's left for fnbridge — the only part with real semantics:
//!
//! - **Request reconstruction** — base64 body decoding, base-path
//!   stripping, namespace-aware URL rewriting, and header un-collapsing
//!   (comma-splitting only the headers where commas are legal, RFC 7230)
//! - **Response capture** — a buffered response sink with status
//!   defaulting, content-type sniffing, close notification, and UTF-8 /
//!   base64 body selection
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use bytes::Bytes;
//! use fnbridge::{EventParams, Proxy, handler_fn};
//! use http::{Request, Response};
//!
//! async fn app(req: Request<Bytes>) -> Response<Bytes> {
//!     match req.uri().path() {
//!         p if p.ends_with("/ping") => Response::builder()
//!             .header("content-type", "application/json")
//!             .body(Bytes::from_static(br#"{"ok":true}"#))
//!             .unwrap(),
//!         _ => Response::new(Bytes::from_static(b"Hello, World!")),
//!     }
//! }
//!
//! /// The function entry point: deserialize the envelope, bridge, reply.
//! async fn main_entry(function_name: &str, raw: serde_json::Value) -> serde_json::Value {
//!     let params: EventParams = serde_json::from_value(raw).unwrap_or_default();
//!     let response = Proxy::new(handler_fn(app)).handle(function_name, &params).await;
//!     serde_json::to_value(response).expect("response envelope is serializable")
//! }
//! ```
//!
//! `Proxy::handle` reads `BASE_URL` and `FUNCTION_NAMESPACE` from the
//! environment; set both in your deployment manifest. For handlers that
//! stream, sniff, or watch for completion, implement
//! [`Handler`] directly and write into the [`ResponseRecorder`].

mod config;
mod context;
mod error;
mod event;
mod handler;
mod headers;
mod local;
mod proxy;
mod request;
mod response;
mod sniff;

pub use config::ProxyConfig;
pub use context::InvocationContext;
pub use error::Error;
pub use event::{EventParams, HttpRequestEvent, HttpResponseEvent};
pub use handler::{Handler, HandlerFn, handler_fn};
pub use headers::is_singleton;
pub use local::LocalServer;
pub use proxy::Proxy;
pub use request::{RemoteAddr, RequestBuilder, RequestUri};
pub use response::ResponseRecorder;

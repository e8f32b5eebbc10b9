//! fnbridge dev loop — the ping handler behind a local HTTP server.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example local
//!
//! Try:
//!   curl http://localhost:3000/ns/demo/ping
//!   curl http://localhost:3000/ns/demo
//!
//! Every request goes through the full production translation path:
//! request → event envelope → handler → response envelope → response.

use bytes::Bytes;
use fnbridge::{InvocationContext, LocalServer, Proxy, handler_fn};
use http::{Request, Response};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    // Locally we stand in for the platform: pick the identity the function
    // would have in production. The platform delivers paths relative to the
    // function base, so strip the prefix the curl URLs carry.
    let ctx = InvocationContext::new("/ns/demo", "ns", "http://localhost:3000/ns");

    LocalServer::bind("127.0.0.1:3000")
        .serve(Proxy::new(handler_fn(app)).strip_base_path("/ns/demo"), ctx)
        .await
        .expect("server error");
}

async fn app(req: Request<Bytes>) -> Response<Bytes> {
    match req.uri().path() {
        p if p.ends_with("/ping") => Response::builder()
            .header("content-type", "application/json")
            .body(Bytes::from_static(br#"{"ok":true}"#))
            .expect("static response"),
        _ => Response::new(Bytes::from_static(b"Hello, World!")),
    }
}

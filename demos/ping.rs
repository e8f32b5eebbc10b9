//! Minimal fnbridge walkthrough — one synthetic invocation, no network.
//!
//! Run with:
//!   BASE_URL=https://x.example/ns FUNCTION_NAMESPACE=ns \
//!     cargo run --example ping
//!
//! Prints the request the handler saw and the envelope the platform would
//! receive back.

use bytes::Bytes;
use fnbridge::{EventParams, Proxy, handler_fn};
use http::{Request, Response};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let proxy = Proxy::new(handler_fn(app));

    // The envelope the platform would deliver for GET /ping.
    let params: EventParams = serde_json::from_value(serde_json::json!({
        "__ow_method": "get",
        "__ow_path": "/ping",
        "http": {
            "method": "get",
            "path": "/ping",
            "headers": {
                "accept": "application/json, text/plain",
                "do-connecting-ip": "203.0.113.9"
            },
            "queryString": "",
            "isBase64Encoded": false
        }
    }))
    .expect("valid envelope");

    let response = proxy.handle("/ns/demo", &params).await;

    println!(
        "{}",
        serde_json::to_string_pretty(&response).expect("response envelope is serializable")
    );
}

// GET <base>/ping -> {"ok":true}; anything else -> plain-text greeting.
async fn app(req: Request<Bytes>) -> Response<Bytes> {
    match req.uri().path() {
        p if p.ends_with("/ping") => Response::builder()
            .header("content-type", "application/json")
            .body(Bytes::from_static(br#"{"ok":true}"#))
            .expect("static response"),
        _ => Response::new(Bytes::from_static(b"Hello, World!")),
    }
}

//! Local development server.
//!
//! Runs a deployed-function handler on your own machine by driving the
//! exact production translation path: every inbound HTTP request is folded
//! into the platform's event envelope (headers collapsed, body
//! base64-encoded, peer address in `do-connecting-ip`), pushed through
//! [`Proxy::proxy`], and the resulting envelope rendered back to HTTP.
//! What you see locally is what the platform will see — including sniffed
//! content types, flattened headers and dropped `Set-Cookie`s.
//!
//! Shuts down gracefully on SIGTERM or Ctrl-C, draining in-flight
//! connections first.

use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::context::InvocationContext;
use crate::error::Error;
use crate::event::{EventParams, HttpRequestEvent, HttpResponseEvent};
use crate::handler::Handler;
use crate::proxy::Proxy;

/// The dev-loop HTTP server.
pub struct LocalServer {
    addr: SocketAddr,
}

impl LocalServer {
    /// Configures the server to bind to `addr` when
    /// [`serve`](LocalServer::serve) is called.
    ///
    /// # Panics
    ///
    /// Panics if `addr` is not a valid `host:port` string.
    pub fn bind(addr: &str) -> Self {
        let addr: SocketAddr = addr.parse().expect("invalid socket address");
        Self { addr }
    }

    /// Serves `proxy` under the given invocation context until shutdown.
    ///
    /// The context plays the role the platform normally fills: one function
    /// name, one namespace, one rewrite target for every request.
    pub async fn serve<H>(self, proxy: Proxy<H>, ctx: InvocationContext) -> Result<(), Error>
    where
        H: Handler + 'static,
    {
        let listener = TcpListener::bind(self.addr).await?;
        let proxy = Arc::new(proxy);
        let ctx = Arc::new(ctx);

        info!(addr = %self.addr, function = %ctx.function_name, "fnbridge dev server listening");

        // Track connection tasks so shutdown can drain them.
        let mut tasks = tokio::task::JoinSet::new();

        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                // Check shutdown first so a signal stops accepting even
                // when connections are queued.
                biased;

                () = &mut shutdown => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let proxy = Arc::clone(&proxy);
                    let ctx = Arc::clone(&ctx);
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        let svc = service_fn(move |req| {
                            let proxy = Arc::clone(&proxy);
                            let ctx = Arc::clone(&ctx);
                            async move { dispatch(proxy, ctx, req, remote_addr).await }
                        });

                        if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                            .serve_connection(io, svc)
                            .await
                        {
                            error!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                // Reap finished tasks so the set stays bounded.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        while tasks.join_next().await.is_some() {}

        info!("fnbridge dev server stopped");
        Ok(())
    }
}

/// Folds one inbound request into the event envelope, runs the proxy, and
/// renders the response envelope back to HTTP. Never errors — failures
/// come back as status codes, the same way the platform reports them.
async fn dispatch<H: Handler>(
    proxy: Arc<Proxy<H>>,
    ctx: Arc<InvocationContext>,
    req: hyper::Request<hyper::body::Incoming>,
    remote_addr: SocketAddr,
) -> Result<http::Response<Full<Bytes>>, Infallible> {
    let (parts, body) = req.into_parts();
    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            error!(error = %e, "failed to read request body");
            return Ok(plain_status(http::StatusCode::BAD_REQUEST));
        }
    };

    let params = synthesize_event(&parts, &body, remote_addr);
    let response = proxy.proxy(&ctx, &params).await;

    Ok(render_response(response))
}

/// Builds the envelope the platform would deliver for this request:
/// repeated headers collapsed into comma-joined strings, body always
/// base64-encoded, client address under `do-connecting-ip`.
fn synthesize_event(
    parts: &http::request::Parts,
    body: &Bytes,
    remote_addr: SocketAddr,
) -> EventParams {
    let mut headers: HashMap<String, String> = HashMap::new();
    for (name, value) in parts.headers.iter() {
        let Ok(value) = value.to_str() else { continue };
        headers
            .entry(name.as_str().to_owned())
            .and_modify(|joined| {
                joined.push_str(", ");
                joined.push_str(value);
            })
            .or_insert_with(|| value.to_owned());
    }
    headers.insert("do-connecting-ip".to_owned(), remote_addr.ip().to_string());

    let event = HttpRequestEvent {
        headers,
        path: parts.uri.path().to_owned(),
        method: parts.method.as_str().to_owned(),
        body: BASE64.encode(body),
        query_string: parts.uri.query().unwrap_or("").to_owned(),
        is_base64_encoded: true,
    };

    EventParams {
        headers: event.headers.clone(),
        path: event.path.clone(),
        method: event.method.clone(),
        body: event.body.clone(),
        query: event.query_string.clone(),
        http: event,
    }
}

/// Renders the response envelope as HTTP. The envelope body is passed
/// through verbatim — the platform applies the same treatment.
fn render_response(envelope: HttpResponseEvent) -> http::Response<Full<Bytes>> {
    let mut response = http::Response::new(Full::from(Bytes::from(envelope.body.into_bytes())));
    *response.status_mut() = http::StatusCode::from_u16(envelope.status_code)
        .unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR);

    for (name, value) in &envelope.headers {
        if let (Ok(name), Ok(value)) = (
            http::HeaderName::from_bytes(name.as_bytes()),
            http::HeaderValue::from_str(value),
        ) {
            response.headers_mut().append(name, value);
        }
    }

    response
}

fn plain_status(status: http::StatusCode) -> http::Response<Full<Bytes>> {
    let mut response = http::Response::new(Full::default());
    *response.status_mut() = status;
    response
}

/// Resolves on the first shutdown signal: SIGTERM or Ctrl-C on Unix,
/// Ctrl-C only elsewhere.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let sigterm = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthesized_event_collapses_repeated_headers() {
        let mut req = http::Request::builder()
            .method("POST")
            .uri("http://localhost/api/ping?x=1")
            .body(())
            .unwrap();
        req.headers_mut()
            .append("accept", "text/html".parse().unwrap());
        req.headers_mut()
            .append("accept", "application/json".parse().unwrap());
        let (parts, ()) = req.into_parts();

        let addr: SocketAddr = "203.0.113.9:4242".parse().unwrap();
        let params = synthesize_event(&parts, &Bytes::from_static(b"body"), addr);

        assert_eq!(params.http.method, "POST");
        assert_eq!(params.http.path, "/api/ping");
        assert_eq!(params.http.query_string, "x=1");
        assert!(params.http.is_base64_encoded);
        assert_eq!(BASE64.decode(&params.http.body).unwrap(), b"body");
        assert_eq!(params.http.headers["accept"], "text/html, application/json");
        assert_eq!(params.http.headers["do-connecting-ip"], "203.0.113.9");
    }

    #[test]
    fn rendered_response_keeps_status_and_headers() {
        let envelope = HttpResponseEvent {
            status_code: 201,
            headers: HashMap::from([("Location".to_owned(), "/things/9".to_owned())]),
            body: "made".to_owned(),
        };

        let response = render_response(envelope);
        assert_eq!(response.status(), http::StatusCode::CREATED);
        assert_eq!(response.headers()["location"], "/things/9");
    }

    #[test]
    fn out_of_range_status_renders_as_500() {
        let envelope = HttpResponseEvent {
            status_code: 0,
            ..HttpResponseEvent::default()
        };
        let response = render_response(envelope);
        assert_eq!(response.status(), http::StatusCode::INTERNAL_SERVER_ERROR);
    }
}

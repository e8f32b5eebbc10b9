//! The invocation pipeline.
//!
//! Glues the pieces together for one invocation: event → request →
//! handler → recorder → response envelope. The pipeline never panics and
//! never retries — every failure is logged and collapsed into the fixed
//! envelope the platform expects (`504` for translation failures, `500`
//! for missing configuration).

use tracing::error;

use crate::config::ProxyConfig;
use crate::context::InvocationContext;
use crate::error::Error;
use crate::event::{EventParams, HttpResponseEvent};
use crate::handler::Handler;
use crate::request::RequestBuilder;
use crate::response::ResponseRecorder;

/// Bridges invocation events to a [`Handler`].
///
/// Holds only immutable configuration and the handler itself, so a single
/// `Proxy` is safe to share across concurrent invocations; every call gets
/// its own [`ResponseRecorder`] and its own request.
///
/// ```rust
/// use bytes::Bytes;
/// use fnbridge::{EventParams, InvocationContext, Proxy, handler_fn};
/// use http::{Request, Response};
///
/// async fn hello(_req: Request<Bytes>) -> Response<Bytes> {
///     Response::new(Bytes::from_static(b"hello"))
/// }
///
/// # tokio_test::block_on(async {
/// let proxy = Proxy::new(handler_fn(hello));
/// let ctx = InvocationContext::new("/ns/greet", "ns", "https://x.example/ns");
/// let params = EventParams::default();
/// let response = proxy.proxy(&ctx, &params).await;
/// # });
/// ```
pub struct Proxy<H> {
    request: RequestBuilder,
    handler: H,
}

impl<H: Handler> Proxy<H> {
    pub fn new(handler: H) -> Self {
        Self { request: RequestBuilder::new(), handler }
    }

    /// Strips a base path from every event path; see
    /// [`RequestBuilder::strip_base_path`].
    pub fn strip_base_path(mut self, prefix: impl Into<String>) -> Self {
        self.request = self.request.strip_base_path(prefix);
        self
    }

    /// Runs one invocation against an already-resolved context.
    ///
    /// Infallible from the caller's point of view: translation errors are
    /// logged and become the `504` envelope.
    pub async fn proxy(&self, ctx: &InvocationContext, params: &EventParams) -> HttpResponseEvent {
        match self.try_proxy(ctx, params).await {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, function = %ctx.function_name, "invocation failed");
                HttpResponseEvent::gateway_timeout()
            }
        }
    }

    /// The invocation entry point: resolves configuration and context,
    /// then delegates to [`proxy`](Self::proxy).
    ///
    /// `function_name` is the platform-reported name of the invoked
    /// function (`/<namespace>/<path...>`). Missing configuration
    /// short-circuits to the fixed `500` envelope before any translation
    /// work.
    pub async fn handle(&self, function_name: &str, params: &EventParams) -> HttpResponseEvent {
        let config = match ProxyConfig::from_env() {
            Ok(config) => config,
            Err(e) => {
                error!(error = %e, "refusing invocation without configuration");
                return HttpResponseEvent::internal_server_error();
            }
        };

        let ctx = InvocationContext::new(function_name, &config.namespace, &config.base_url);
        self.proxy(&ctx, params).await
    }

    async fn try_proxy(
        &self,
        ctx: &InvocationContext,
        params: &EventParams,
    ) -> Result<HttpResponseEvent, Error> {
        let request = self.request.build(ctx, &params.http)?;

        let mut recorder = ResponseRecorder::new();
        self.handler.serve(request, &mut recorder).await;

        recorder.into_event_response()
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use http::{Request, Response, StatusCode};

    use super::*;
    use crate::event::HttpRequestEvent;
    use crate::handler::handler_fn;

    fn ctx() -> InvocationContext {
        InvocationContext::new("/ns/echo", "ns", "https://x.example/ns")
    }

    fn get(path: &str) -> EventParams {
        EventParams {
            http: HttpRequestEvent {
                method: "get".to_owned(),
                path: path.to_owned(),
                ..HttpRequestEvent::default()
            },
            ..EventParams::default()
        }
    }

    async fn echo_path(req: Request<Bytes>) -> Response<Bytes> {
        Response::new(Bytes::from(req.uri().path().to_owned()))
    }

    #[tokio::test]
    async fn pipeline_reaches_the_handler_with_the_rewritten_path() {
        let proxy = Proxy::new(handler_fn(echo_path));
        let response = proxy.proxy(&ctx(), &get("/ping")).await;
        assert_eq!(response.status_code, 200);
        assert_eq!(response.body, "/ns/echo/ping");
    }

    #[tokio::test]
    async fn translation_failure_maps_to_gateway_timeout() {
        let proxy = Proxy::new(handler_fn(echo_path));
        let mut params = get("/ping");
        params.http.body = "!!".to_owned();
        params.http.is_base64_encoded = true;

        let response = proxy.proxy(&ctx(), &params).await;
        assert_eq!(response.status_code, 504);
        assert!(response.body.is_empty());
    }

    #[tokio::test]
    async fn silent_handler_maps_to_gateway_timeout() {
        struct Mute;
        impl Handler for Mute {
            async fn serve(&self, _req: Request<Bytes>, _res: &mut ResponseRecorder) {}
        }

        let proxy = Proxy::new(Mute);
        let response = proxy.proxy(&ctx(), &get("/ping")).await;
        assert_eq!(response.status_code, 504);
    }

    #[tokio::test]
    async fn sink_handlers_can_stream_and_observe_close() {
        struct Chunked;
        impl Handler for Chunked {
            async fn serve(&self, _req: Request<Bytes>, res: &mut ResponseRecorder) {
                let closed = res.close_notify();
                res.write_header(StatusCode::OK);
                res.write(b"one,");
                res.write(b"two");
                tokio::spawn(async move {
                    let _ = closed.await;
                });
            }
        }

        let proxy = Proxy::new(Chunked);
        let response = proxy.proxy(&ctx(), &get("/ping")).await;
        assert_eq!(response.body, "one,two");
    }
}

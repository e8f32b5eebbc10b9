//! Event-to-request translation.
//!
//! Rebuilds a real `http::Request` from the flattened invocation event:
//! decodes the body, rewrites the path onto the invocation's
//! [`app_host`](crate::InvocationContext::app_host), and un-collapses the
//! header map (see [`crate::headers`] for the single- vs multi-value rules).

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use bytes::Bytes;
use http::{HeaderName, HeaderValue, Request, header};
use tracing::{error, warn};

use crate::context::InvocationContext;
use crate::error::Error;
use crate::event::HttpRequestEvent;
use crate::headers::is_singleton;

/// Event header carrying the client IP, filled in by the platform's edge.
const CONNECTING_IP_HEADER: &str = "do-connecting-ip";

/// The client address the platform saw, carried as a request extension.
///
/// The `http` crate has no notion of a peer address; handlers that care
/// read it back with `req.extensions().get::<RemoteAddr>()`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteAddr(pub String);

/// The request's origin-form URI (path + query), carried as an extension
/// for adapters that need it after the absolute target URL is gone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestUri(pub String);

/// Translates invocation events into `http::Request` values.
///
/// Stateless apart from optional configuration; build one next to your
/// [`Proxy`](crate::Proxy) and reuse it across invocations.
#[derive(Clone, Debug, Default)]
pub struct RequestBuilder {
    strip_base_path: Option<String>,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Strips `prefix` from the front of every event path before rewriting.
    ///
    /// Useful when the deployment mounts the function under an extra path
    /// segment the handler should never see. Prefixes of one character or
    /// less are ignored, as is any path the prefix does not match.
    pub fn strip_base_path(mut self, prefix: impl Into<String>) -> Self {
        self.strip_base_path = Some(prefix.into());
        self
    }

    /// Builds the outbound request for one invocation.
    ///
    /// Fails with [`Error::Decode`] when a base64 body does not decode and
    /// [`Error::MalformedRequest`] when the method or assembled URL is
    /// invalid. Both failures are logged here before returning.
    pub fn build(
        &self,
        ctx: &InvocationContext,
        event: &HttpRequestEvent,
    ) -> Result<Request<Bytes>, Error> {
        let body = if event.is_base64_encoded {
            BASE64.decode(&event.body).map_err(|e| {
                error!(error = %e, "request body is not valid base64");
                Error::from(e)
            })?
        } else {
            event.body.clone().into_bytes()
        };

        let mut path = event.path.as_str();
        if let Some(prefix) = self.strip_base_path.as_deref() {
            if prefix.len() > 1 {
                if let Some(stripped) = path.strip_prefix(prefix) {
                    path = stripped;
                }
            }
        }

        let mut target = String::with_capacity(ctx.app_host.len() + path.len() + 1);
        target.push_str(&ctx.app_host);
        if !path.starts_with('/') {
            target.push('/');
        }
        target.push_str(path);
        if !event.query_string.is_empty() {
            target.push('?');
            target.push_str(&event.query_string);
        }

        let mut request = Request::builder()
            .method(event.method.to_uppercase().as_str())
            .uri(target)
            .body(Bytes::from(body))
            .map_err(|e| {
                error!(
                    method = %event.method,
                    path = %event.path,
                    error = %e,
                    "could not convert event to http request"
                );
                Error::from(e)
            })?;

        if let Some(ip) = event.headers.get(CONNECTING_IP_HEADER) {
            request.extensions_mut().insert(RemoteAddr(ip.clone()));
        }

        // Cookies bypass the splitting logic below: a comma is not a cookie
        // separator, so the header goes through verbatim and exactly once.
        if let Some(cookie) = event.headers.get("cookie").filter(|v| !v.is_empty()) {
            if let Ok(value) = HeaderValue::from_str(cookie) {
                request.headers_mut().append(header::COOKIE, value);
            } else {
                warn!("skipping cookie header with invalid value");
            }
        }

        for (key, value) in &event.headers {
            if key.eq_ignore_ascii_case("cookie") {
                continue;
            }
            let Ok(name) = HeaderName::from_bytes(key.as_bytes()) else {
                warn!(header = %key, "skipping invalid header name");
                continue;
            };
            if is_singleton(&name) {
                match HeaderValue::from_str(value) {
                    Ok(v) => {
                        request.headers_mut().append(name, v);
                    }
                    Err(_) => warn!(header = %key, "skipping invalid header value"),
                }
            } else {
                for part in value.split(',') {
                    match HeaderValue::from_str(part.trim()) {
                        Ok(v) => {
                            request.headers_mut().append(name.clone(), v);
                        }
                        Err(_) => warn!(header = %key, "skipping invalid header value"),
                    }
                }
            }
        }

        let uri = request
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str().to_owned())
            .unwrap_or_else(|| "/".to_owned());
        request.extensions_mut().insert(RequestUri(uri));

        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn ctx() -> InvocationContext {
        InvocationContext::new("/ns/echo", "ns", "https://x.example/ns")
    }

    fn event(path: &str) -> HttpRequestEvent {
        HttpRequestEvent {
            method: "get".to_owned(),
            path: path.to_owned(),
            ..HttpRequestEvent::default()
        }
    }

    #[test]
    fn rewrites_path_onto_app_host() {
        let req = RequestBuilder::new().build(&ctx(), &event("/ping")).unwrap();
        assert_eq!(req.method(), http::Method::GET);
        assert_eq!(req.uri(), "https://x.example/ns/echo/ping");
    }

    #[test]
    fn appends_query_string() {
        let mut ev = event("/ping");
        ev.query_string = "a=1&b=2".to_owned();
        let req = RequestBuilder::new().build(&ctx(), &ev).unwrap();
        assert_eq!(req.uri(), "https://x.example/ns/echo/ping?a=1&b=2");
        assert_eq!(
            req.extensions().get::<RequestUri>().unwrap().0,
            "/ns/echo/ping?a=1&b=2"
        );
    }

    #[test]
    fn strips_configured_base_path() {
        let builder = RequestBuilder::new().strip_base_path("/api");
        let req = builder.build(&ctx(), &event("/api/users")).unwrap();
        assert_eq!(req.uri().path(), "/ns/echo/users");

        let req = builder.build(&ctx(), &event("/other")).unwrap();
        assert_eq!(req.uri().path(), "/ns/echo/other");
    }

    #[test]
    fn trivial_base_path_is_ignored() {
        let builder = RequestBuilder::new().strip_base_path("/");
        let req = builder.build(&ctx(), &event("/users")).unwrap();
        assert_eq!(req.uri().path(), "/ns/echo/users");
    }

    #[test]
    fn relative_path_gains_leading_slash() {
        let req = RequestBuilder::new().build(&ctx(), &event("ping")).unwrap();
        assert_eq!(req.uri().path(), "/ns/echo/ping");
    }

    #[test]
    fn decodes_base64_body() {
        let mut ev = event("/ping");
        ev.method = "post".to_owned();
        ev.body = BASE64.encode(b"hello");
        ev.is_base64_encoded = true;
        let req = RequestBuilder::new().build(&ctx(), &ev).unwrap();
        assert_eq!(req.method(), http::Method::POST);
        assert_eq!(req.body().as_ref(), b"hello");
    }

    #[test]
    fn bad_base64_body_is_a_decode_error() {
        let mut ev = event("/ping");
        ev.body = "not!!base64".to_owned();
        ev.is_base64_encoded = true;
        assert!(matches!(
            RequestBuilder::new().build(&ctx(), &ev),
            Err(Error::Decode(_))
        ));
    }

    #[test]
    fn bad_method_is_a_malformed_request() {
        let mut ev = event("/ping");
        ev.method = "GE T".to_owned();
        assert!(matches!(
            RequestBuilder::new().build(&ctx(), &ev),
            Err(Error::MalformedRequest(_))
        ));
    }

    #[test]
    fn multi_value_header_splits_into_entries() {
        let mut ev = event("/ping");
        ev.headers =
            HashMap::from([("accept".to_owned(), "text/html, application/json".to_owned())]);
        let req = RequestBuilder::new().build(&ctx(), &ev).unwrap();
        let values: Vec<_> = req.headers().get_all(header::ACCEPT).iter().collect();
        assert_eq!(values, ["text/html", "application/json"]);
    }

    #[test]
    fn singleton_header_keeps_its_commas() {
        let stamp = "Sat, 01 Jan 2022 00:00:00 GMT";
        let mut ev = event("/ping");
        ev.headers = HashMap::from([("if-modified-since".to_owned(), stamp.to_owned())]);
        let req = RequestBuilder::new().build(&ctx(), &ev).unwrap();
        let values: Vec<_> = req
            .headers()
            .get_all(header::IF_MODIFIED_SINCE)
            .iter()
            .collect();
        assert_eq!(values, [stamp]);
    }

    #[test]
    fn cookie_passes_through_verbatim_exactly_once() {
        let mut ev = event("/ping");
        ev.headers = HashMap::from([("cookie".to_owned(), "a=1; b=2,3".to_owned())]);
        let req = RequestBuilder::new().build(&ctx(), &ev).unwrap();
        let values: Vec<_> = req.headers().get_all(header::COOKIE).iter().collect();
        assert_eq!(values, ["a=1; b=2,3"]);
    }

    #[test]
    fn connecting_ip_becomes_remote_addr() {
        let mut ev = event("/ping");
        ev.headers = HashMap::from([(CONNECTING_IP_HEADER.to_owned(), "203.0.113.9".to_owned())]);
        let req = RequestBuilder::new().build(&ctx(), &ev).unwrap();
        assert_eq!(
            req.extensions().get::<RemoteAddr>(),
            Some(&RemoteAddr("203.0.113.9".to_owned()))
        );
    }
}

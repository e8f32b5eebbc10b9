//! Platform wire types.
//!
//! The function runtime invokes a deployed function with a JSON envelope and
//! expects a JSON response envelope back. These are the only two shapes that
//! cross the platform boundary; everything in between is ordinary `http`
//! crate data.
//!
//! Inbound, the envelope carries the raw `__ow_*` web-action fields plus a
//! nested `http` object with the collapsed request — that nested object is
//! what the bridge consumes. Outbound, the platform accepts
//! `{statusCode, headers, body}` with empty members omitted.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The inbound HTTP request as the platform delivers it.
///
/// Header keys arrive as sent by the platform (lowercased); multi-value
/// headers are collapsed into one comma-joined string per key. The body is
/// plain text unless `is_base64_encoded` is set.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HttpRequestEvent {
    pub headers: HashMap<String, String>,
    pub path: String,
    pub method: String,
    pub body: String,
    pub query_string: String,
    pub is_base64_encoded: bool,
}

/// The response envelope the platform expects back.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HttpResponseEvent {
    pub status_code: u16,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub body: String,
}

impl HttpResponseEvent {
    /// `504 Gateway Timeout`, no body — the envelope returned for any
    /// unrecoverable translation failure.
    pub fn gateway_timeout() -> Self {
        Self {
            status_code: http::StatusCode::GATEWAY_TIMEOUT.as_u16(),
            ..Self::default()
        }
    }

    /// `500 Internal Server Error` with a generic body — the envelope
    /// returned when required configuration is absent.
    pub fn internal_server_error() -> Self {
        Self {
            status_code: http::StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            body: "Internal server error".to_owned(),
            ..Self::default()
        }
    }
}

/// The full invocation envelope for a web action.
///
/// The raw `__ow_*` members mirror the nested [`http`](EventParams::http)
/// object; the bridge reads the nested object and leaves the rest for
/// functions that want the raw view.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct EventParams {
    #[serde(rename = "__ow_headers")]
    pub headers: HashMap<String, String>,
    #[serde(rename = "__ow_path")]
    pub path: String,
    #[serde(rename = "__ow_method")]
    pub method: String,
    #[serde(rename = "__ow_body")]
    pub body: String,
    #[serde(rename = "__ow_query")]
    pub query: String,
    pub http: HttpRequestEvent,
}

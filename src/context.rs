//! Per-invocation path context.
//!
//! Every deployed function lives behind a per-function namespace prefix:
//! the platform reports the function's name as `/<namespace>/<path...>`,
//! while the public base URL already ends in `/<namespace>`. Handlers want
//! to think in ordinary root-relative paths, so the bridge resolves the two
//! into a single rewrite target once per invocation and threads it through
//! explicitly — there is no ambient context bag to fish values out of.

/// Resolved invocation metadata, constructed once per invocation.
///
/// `function_name` and `namespace` come from the platform; `trailing_path`
/// and `app_host` are derived here and consumed by
/// [`RequestBuilder`](crate::RequestBuilder).
#[derive(Clone, Debug)]
pub struct InvocationContext {
    pub function_name: String,
    pub namespace: String,
    /// `function_name` with the leading `/<namespace>` prefix removed.
    pub trailing_path: String,
    /// `base_url` + [`trailing_path`](Self::trailing_path) — the absolute
    /// prefix every rewritten request URL starts with.
    pub app_host: String,
}

impl InvocationContext {
    /// Resolves the rewrite target for one invocation.
    ///
    /// A `function_name` that does not carry the `/<namespace>` prefix is
    /// used unchanged.
    pub fn new(function_name: &str, namespace: &str, base_url: &str) -> Self {
        let prefix = format!("/{namespace}");
        let trailing_path = function_name
            .strip_prefix(&prefix)
            .unwrap_or(function_name)
            .to_owned();

        Self {
            function_name: function_name.to_owned(),
            namespace: namespace.to_owned(),
            app_host: format!("{base_url}{trailing_path}"),
            trailing_path,
        }
    }
}

//! Environment configuration.
//!
//! Two values come from the deployment environment rather than the event:
//! the function's public base URL and its namespace. Both are set in the
//! project manifest at deploy time; a function running without them is
//! misconfigured, and [`Proxy::handle`](crate::Proxy::handle) answers with
//! a fixed `500` envelope instead of attempting any translation.

use std::env;

use crate::error::Error;

/// `https://<host>/<namespace>` — the public prefix requests are rewritten
/// onto.
pub const BASE_URL_VAR: &str = "BASE_URL";
/// The function namespace, matching the first segment of the function name.
pub const NAMESPACE_VAR: &str = "FUNCTION_NAMESPACE";

/// Deployment configuration read from the environment.
#[derive(Clone, Debug)]
pub struct ProxyConfig {
    pub base_url: String,
    pub namespace: String,
}

impl ProxyConfig {
    /// Reads `BASE_URL` and `FUNCTION_NAMESPACE`.
    ///
    /// An unset or empty variable fails with [`Error::ConfigMissing`].
    pub fn from_env() -> Result<Self, Error> {
        Ok(Self {
            base_url: require(BASE_URL_VAR)?,
            namespace: require(NAMESPACE_VAR)?,
        })
    }
}

fn require(name: &'static str) -> Result<String, Error> {
    match env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(Error::ConfigMissing(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Environment mutation is process-global, so the from_env paths are
    // covered end to end in tests/proxy.rs where the suite controls the
    // variables; here we only pin the error shape.
    #[test]
    fn missing_variable_names_itself() {
        let err = require("FNBRIDGE_TEST_UNSET_VARIABLE").unwrap_err();
        assert!(matches!(err, Error::ConfigMissing("FNBRIDGE_TEST_UNSET_VARIABLE")));
        assert!(err.to_string().contains("FNBRIDGE_TEST_UNSET_VARIABLE"));
    }
}

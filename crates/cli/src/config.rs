//! Runtime configuration for `orgchart serve`.
//!
//! Command-line flags win over environment variables, which win over the
//! built-in defaults.

/// Default request body limit: 1 MiB.
pub(crate) const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Environment variable holding the API key. Unset or empty disables auth.
pub(crate) const API_KEY_VAR: &str = "ORGCHART_API_KEY";

/// Environment variable consulted when `--max-body-bytes` is not given.
pub(crate) const MAX_BODY_BYTES_VAR: &str = "ORGCHART_MAX_BODY_BYTES";

/// Settings the HTTP server is started with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ServeConfig {
    pub(crate) host: String,
    pub(crate) port: u16,
    pub(crate) max_body_bytes: usize,
    pub(crate) api_key: Option<String>,
}

impl ServeConfig {
    /// Combine flags with the process environment.
    pub(crate) fn from_env(host: String, port: u16, max_body_bytes: Option<usize>) -> Self {
        Self::resolve(host, port, max_body_bytes, |name| std::env::var(name).ok())
    }

    /// Combine flags with values produced by `lookup`.
    ///
    /// An unparseable `ORGCHART_MAX_BODY_BYTES` falls back to the default.
    pub(crate) fn resolve<F>(
        host: String,
        port: u16,
        max_body_bytes: Option<usize>,
        lookup: F,
    ) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let max_body_bytes = max_body_bytes
            .or_else(|| lookup(MAX_BODY_BYTES_VAR).and_then(|v| v.trim().parse().ok()))
            .unwrap_or(DEFAULT_MAX_BODY_BYTES);
        let api_key = lookup(API_KEY_VAR).filter(|k| !k.is_empty());

        ServeConfig {
            host,
            port,
            max_body_bytes,
            api_key,
        }
    }

    pub(crate) fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

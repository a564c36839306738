//! Application state shared across request handlers.

use orgchart_storage::OrgStorage;

pub(crate) struct AppState<S: OrgStorage> {
    /// Where accepted hierarchies are persisted.
    pub(crate) storage: S,
    /// Optional API key for authentication. None = no auth required.
    pub(crate) api_key: Option<String>,
}

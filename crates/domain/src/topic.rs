//! Bus topic grammar shared by adapters and the orchestrator.
//!
//! | Topic | Meaning |
//! |-------|---------|
//! | `/{id}/getdata{path}` | request for the current value of a data path |
//! | `/{id}{path}` | command, or an adapter publication on `path` |
//! | `/{id}/error` | error notices from the adapter |
//! | `/orchestrator/integration/{id}/online` | presence, `"true"` / `"false"` |
//! | `/orchestrator/integration/{id}/stop` | orchestrator request to stop an adapter |
//! | `/orchestrator/integration/start` | orchestrator request to start an adapter |

/// Segment that marks a data-fetch request.
pub const GETDATA_SEGMENT: &str = "getdata";

/// Relative path of the error channel.
pub const ERROR_PATH: &str = "/error";

/// Root of the orchestrator control namespace.
pub const ORCHESTRATOR_INTEGRATION_ROOT: &str = "/orchestrator/integration";

/// Topic on which the orchestrator is asked to start an integration by id.
pub const START: &str = "/orchestrator/integration/start";

/// `/{id}{path}`
#[must_use]
pub fn in_scope(id: &str, path: &str) -> String {
    format!("/{id}{path}")
}

/// `/{id}/getdata{path}`
#[must_use]
pub fn getdata(id: &str, path: &str) -> String {
    format!("/{id}/{GETDATA_SEGMENT}{path}")
}

/// `/{id}/error`
#[must_use]
pub fn error(id: &str) -> String {
    in_scope(id, ERROR_PATH)
}

/// `/orchestrator/integration/{id}/online`
#[must_use]
pub fn presence(id: &str) -> String {
    format!("{ORCHESTRATOR_INTEGRATION_ROOT}/{id}/online")
}

/// `/orchestrator/integration/{id}/stop`
#[must_use]
pub fn stop(id: &str) -> String {
    format!("{ORCHESTRATOR_INTEGRATION_ROOT}/{id}/stop")
}

/// Where an in-scope message should be routed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InScopeRoute {
    /// A `getdata` request.
    Fetch {
        /// Fetcher key, e.g. `/lightState/color`.
        lookup_path: String,
        /// Relative response path: only the first segment after `getdata`.
        response_path: String,
    },
    /// Anything else: a command keyed by the stripped path.
    Command {
        /// Command-handler key, e.g. `/power/on`.
        key: String,
    },
}

/// Classify an inbound topic that did not match an out-of-scope listener.
///
/// The leading `/{id}/` is dropped without comparing it to the adapter id.
/// A fetch responds on the first segment of the requested path only, so
/// `/{id}/getdata/a/b` is answered on `/{id}/a`.
#[must_use]
pub fn classify(topic: &str) -> InScopeRoute {
    let stripped = strip_namespace(topic);
    let mut segments = stripped.split('/');
    if segments.next() == Some(GETDATA_SEGMENT) {
        let rest: Vec<&str> = segments.collect();
        let first = rest.first().copied().unwrap_or_default();
        return InScopeRoute::Fetch {
            lookup_path: format!("/{}", rest.join("/")),
            response_path: format!("/{first}"),
        };
    }
    InScopeRoute::Command {
        key: format!("/{stripped}"),
    }
}

/// Drop the empty leading level and the namespace level of a topic.
fn strip_namespace(topic: &str) -> &str {
    let mut parts = topic.splitn(3, '/');
    let _leading = parts.next();
    let _namespace = parts.next();
    parts.next().unwrap_or_default()
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

/// HTTP method of a queued mutation. Only POST and PUT are recorded: the
/// backend treats both as idempotent upserts, which is what makes
/// at-least-once replay safe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Post,
    Put,
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpMethod::Post => write!(f, "POST"),
            HttpMethod::Put => write!(f, "PUT"),
        }
    }
}

/// A queued, not-yet-confirmed mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxEntry {
    /// Locally generated id, unique within the queue.
    pub id: String,

    /// Target endpoint as recorded at submission time.
    pub url: String,

    pub method: HttpMethod,

    /// Opaque payload matching the target endpoint's contract.
    pub body: JsonValue,

    /// Human-readable description shown in the sync center.
    pub label: String,

    /// Optional category tag (e.g. a form kind).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Input for a new entry; `id` and `createdAt` are assigned on enqueue.
#[derive(Debug, Clone)]
pub struct OutboxRequest {
    pub url: String,
    pub method: HttpMethod,
    pub body: JsonValue,
    pub label: String,
    pub kind: Option<String>,
}

//! HTTP client construction and target-URL resolution.
//!
//! The client is built once and handed to the components that need it so
//! connection pooling is shared; nothing here holds global state.

use std::time::Duration;

use url::Url;

use crate::error::{SyncError, SyncResult};

/// Build the shared pooled client with a per-request timeout. Elapsed
/// timeouts surface as [`SyncError::Timeout`] and count as retryable.
pub fn build_client(timeout: Duration) -> SyncResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| SyncError::Network(e.to_string()))
}

/// Resolve a recorded request URL against the configured API base.
///
/// Entries recorded in the field can carry absolute URLs pointing at
/// whatever host the app was reached through at the time. With a base
/// configured, absolute URLs are rebased onto it keeping path and query, and
/// relative URLs are joined. Without a base, absolute URLs pass through
/// unchanged and relative ones are rejected.
pub fn resolve_url(base: Option<&Url>, raw: &str) -> SyncResult<Url> {
    match Url::parse(raw) {
        Ok(absolute) => match base {
            Some(base) => {
                let mut target = base.join(absolute.path())?;
                target.set_query(absolute.query());
                Ok(target)
            }
            None => Ok(absolute),
        },
        Err(url::ParseError::RelativeUrlWithoutBase) => match base {
            Some(base) => Ok(base.join(raw)?),
            None => Err(SyncError::InvalidUrl(format!(
                "relative URL '{}' requires a configured base",
                raw
            ))),
        },
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://api.example.org").unwrap()
    }

    #[test]
    fn absolute_url_rebased_onto_base() {
        let target = resolve_url(
            Some(&base()),
            "http://old-host.local/api/update-project/p1?dry=1",
        )
        .unwrap();
        assert_eq!(
            target.as_str(),
            "https://api.example.org/api/update-project/p1?dry=1"
        );
    }

    #[test]
    fn relative_url_joined_with_base() {
        let target = resolve_url(Some(&base()), "/api/projects").unwrap();
        assert_eq!(target.as_str(), "https://api.example.org/api/projects");
    }

    #[test]
    fn absolute_url_passes_through_without_base() {
        let target = resolve_url(None, "https://api.example.org/api/projects").unwrap();
        assert_eq!(target.as_str(), "https://api.example.org/api/projects");
    }

    #[test]
    fn relative_url_without_base_is_rejected() {
        let err = resolve_url(None, "/api/projects").unwrap_err();
        assert!(matches!(err, SyncError::InvalidUrl(_)));
    }
}

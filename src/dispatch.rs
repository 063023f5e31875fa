//! Write dispatch: direct network calls when reachable, outbox otherwise.
//!
//! Binary attachments are inlined as base64 before either path is chosen, so
//! a queued payload is byte-identical to the one a direct call would have
//! sent. When offline, the caller applies the change optimistically and
//! tells the user it is pending; queued optimistic state is never rolled
//! back on a later failure — the next successful revalidation of the
//! affected resource reconciles it.

use std::sync::Arc;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde_json::Value as JsonValue;
use tracing::info;
use url::Url;

use crate::error::{SyncError, SyncResult};
use crate::http;
use crate::outbox::{HttpMethod, OutboxManager, OutboxRequest};
use crate::reachability::Reachability;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A binary attachment uploaded alongside a write (e.g. a site photo).
#[derive(Debug, Clone)]
pub struct Attachment {
    /// Upload endpoint; always POSTed.
    pub url: String,
    /// Human-readable description for the sync center.
    pub label: String,
    /// JSON field the encoded bytes are stored under (e.g. `imageData`).
    pub field: String,
    /// Payload fields sent alongside the encoded data. Must be a JSON
    /// object (or null).
    pub metadata: JsonValue,
    pub bytes: Vec<u8>,
}

impl Attachment {
    /// Inline the binary as base64 so queued and direct payloads are
    /// identical.
    fn into_request(self) -> SyncResult<OutboxRequest> {
        let mut body = match self.metadata {
            JsonValue::Object(map) => map,
            JsonValue::Null => serde_json::Map::new(),
            other => {
                return Err(SyncError::InvalidRequest(format!(
                    "attachment metadata must be a JSON object, got {}",
                    other
                )))
            }
        };
        body.insert(self.field, JsonValue::String(BASE64.encode(&self.bytes)));

        Ok(OutboxRequest {
            url: self.url,
            method: HttpMethod::Post,
            body: JsonValue::Object(body),
            label: self.label,
            kind: Some("attachment".to_string()),
        })
    }
}

/// A user-initiated write plus its attachments.
#[derive(Debug, Clone)]
pub struct WriteRequest {
    pub url: String,
    pub method: HttpMethod,
    pub body: JsonValue,
    pub label: String,
    pub kind: Option<String>,
    pub attachments: Vec<Attachment>,
}

/// What happened to a submitted write.
#[derive(Debug)]
pub enum Disposition {
    /// Every request reached the backend.
    Sent { delivered: usize },
    /// Offline: everything was queued. The caller applies the change
    /// optimistically and informs the user it is pending.
    Queued { entry_ids: Vec<String> },
}

/// Routes user writes to the network or the outbox.
pub struct Dispatcher {
    outbox: Arc<OutboxManager>,
    reachability: Reachability,
    client: reqwest::Client,
    base_url: Option<Url>,
}

impl Dispatcher {
    pub fn new(outbox: Arc<OutboxManager>, reachability: Reachability) -> SyncResult<Self> {
        Ok(Self {
            outbox,
            reachability,
            client: http::build_client(DEFAULT_TIMEOUT)?,
            base_url: None,
        })
    }

    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Submit a write. Reachable: send directly, surfacing any failure to
    /// the caller — this path never silently falls back to the queue.
    /// Unreachable: enqueue everything and return the entry ids.
    pub async fn submit(&self, request: WriteRequest) -> SyncResult<Disposition> {
        let WriteRequest {
            url,
            method,
            body,
            label,
            kind,
            attachments,
        } = request;

        // Encode attachments up front so both paths carry identical shapes
        let mut requests = Vec::with_capacity(1 + attachments.len());
        requests.push(OutboxRequest {
            url,
            method,
            body,
            label,
            kind,
        });
        for attachment in attachments {
            requests.push(attachment.into_request()?);
        }

        if self.reachability.is_online() {
            for request in &requests {
                self.send(request).await?;
            }
            info!("Delivered {} request(s) directly", requests.len());
            Ok(Disposition::Sent {
                delivered: requests.len(),
            })
        } else {
            let mut entry_ids = Vec::with_capacity(requests.len());
            for request in requests {
                entry_ids.push(self.outbox.enqueue(request).await?);
            }
            info!("Offline: queued {} request(s)", entry_ids.len());
            Ok(Disposition::Queued { entry_ids })
        }
    }

    async fn send(&self, request: &OutboxRequest) -> SyncResult<()> {
        let target = http::resolve_url(self.base_url.as_ref(), &request.url)?;
        let response = self
            .client
            .request(request.method.into(), target)
            .json(&request.body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(SyncError::Http {
                status: status.as_u16(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn attachment_encodes_bytes_under_field() {
        let attachment = Attachment {
            url: "/api/upload-image".to_string(),
            label: "Photo: Mabini Elementary".to_string(),
            field: "imageData".to_string(),
            metadata: json!({"projectId": "p1", "uploadedBy": "u1"}),
            bytes: vec![0xde, 0xad, 0xbe, 0xef],
        };

        let request = attachment.into_request().unwrap();
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.kind.as_deref(), Some("attachment"));
        assert_eq!(request.body["projectId"], "p1");
        assert_eq!(request.body["imageData"], BASE64.encode([0xde, 0xad, 0xbe, 0xef]));
    }

    #[test]
    fn attachment_with_null_metadata_gets_bare_payload() {
        let attachment = Attachment {
            url: "/api/upload-image".to_string(),
            label: "Photo".to_string(),
            field: "imageData".to_string(),
            metadata: JsonValue::Null,
            bytes: vec![1, 2, 3],
        };

        let request = attachment.into_request().unwrap();
        assert_eq!(request.body.as_object().unwrap().len(), 1);
    }

    #[test]
    fn non_object_metadata_is_rejected() {
        let attachment = Attachment {
            url: "/api/upload-image".to_string(),
            label: "Photo".to_string(),
            field: "imageData".to_string(),
            metadata: json!([1, 2]),
            bytes: vec![],
        };

        let err = attachment.into_request().unwrap_err();
        assert!(matches!(err, SyncError::InvalidRequest(_)));
    }
}

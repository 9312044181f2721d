//! Submission orchestrator
//!
//! A [`SubmissionRequest`] can only be built from a complete form: a title, a
//! fresh location, and the text or binary payload its kind calls for. Each
//! request is sent as one multipart POST to the endpoint of its kind. Failed
//! submissions are never retried; the user resubmits.

use auth::SessionHandle;
use common::config::ClientConfig;
use common::error::ClientError;
use common::http::BackendClient;
use media::{ContentKind, Geolocation, MediaBlob};
use reqwest::multipart::{Form, Part};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use crate::error::{SubmissionResult, ValidationError};
use crate::models::SubmissionReceipt;

/// Form state at the moment the user presses submit
#[derive(Debug, Clone)]
pub struct SubmissionDraft {
    pub category_id: String,
    pub kind: ContentKind,
    pub title: String,
    pub text: String,
    pub payload: Option<Arc<MediaBlob>>,
    pub location: Option<Geolocation>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContentPayload {
    Text(String),
    Binary(Arc<MediaBlob>),
}

/// A complete submission, ready to send
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionRequest {
    category_id: String,
    kind: ContentKind,
    title: String,
    payload: ContentPayload,
    latitude: f64,
    longitude: f64,
}

impl SubmissionRequest {
    /// Validate a draft
    ///
    /// Checks run in a fixed order (title, location presence, location age,
    /// then the payload) and the first failure is returned.
    pub fn build(
        draft: SubmissionDraft,
        max_location_age: Duration,
    ) -> Result<Self, ValidationError> {
        let title = draft.title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }

        let location = draft.location.ok_or(ValidationError::MissingLocation)?;
        if !location.is_fresh(max_location_age) {
            return Err(ValidationError::StaleLocation);
        }

        let payload = if draft.kind.is_binary() {
            match draft.payload {
                Some(blob) if !blob.is_empty() => ContentPayload::Binary(blob),
                _ => return Err(ValidationError::MissingPayload),
            }
        } else {
            if draft.text.trim().is_empty() {
                return Err(ValidationError::EmptyText);
            }
            ContentPayload::Text(draft.text)
        };

        Ok(Self {
            category_id: draft.category_id,
            kind: draft.kind,
            title: title.to_string(),
            payload,
            latitude: location.latitude(),
            longitude: location.longitude(),
        })
    }

    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    pub fn payload(&self) -> &ContentPayload {
        &self.payload
    }

    /// Plain form fields in the order they are sent; `file` is not listed
    pub fn multipart_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("title", self.title.clone()),
            ("category_id", self.category_id.clone()),
            ("content_type", self.kind.as_str().to_string()),
            ("latitude", self.latitude.to_string()),
            ("longitude", self.longitude.to_string()),
        ];
        if let ContentPayload::Text(text) = &self.payload {
            fields.push(("content", text.clone()));
        }
        fields
    }

    fn to_form(&self) -> Result<Form, ClientError> {
        let mut form = Form::new();
        for (name, value) in self.multipart_fields() {
            form = form.text(name, value);
        }

        if let ContentPayload::Binary(blob) = &self.payload {
            let part = Part::bytes(blob.data.clone())
                .file_name(blob.file_name.clone())
                .mime_str(&blob.mime_type)
                .map_err(|e| {
                    ClientError::Validation(format!("Invalid media type {}: {}", blob.mime_type, e))
                })?;
            form = form.part("file", part);
        }

        Ok(form)
    }
}

#[derive(Clone)]
pub struct SubmissionOrchestrator {
    client: BackendClient,
    session: SessionHandle,
    content_path_prefix: String,
    max_location_age: Duration,
}

impl SubmissionOrchestrator {
    pub fn new(client: BackendClient, session: SessionHandle, config: &ClientConfig) -> Self {
        Self {
            client,
            session,
            content_path_prefix: config.content_path_prefix.trim_end_matches('/').to_string(),
            max_location_age: config.geolocation_max_age(),
        }
    }

    /// Endpoint path for a content kind
    pub fn endpoint(&self, kind: ContentKind) -> String {
        format!("{}/{}", self.content_path_prefix, kind.as_str())
    }

    pub fn prepare(&self, draft: SubmissionDraft) -> Result<SubmissionRequest, ValidationError> {
        SubmissionRequest::build(draft, self.max_location_age)
    }

    /// Send one submission attempt
    pub async fn submit(&self, request: &SubmissionRequest) -> SubmissionResult<SubmissionReceipt> {
        let token = self.session.require_token().await?;
        let endpoint = self.endpoint(request.kind);
        let form = request.to_form()?;

        info!(kind = %request.kind, category = %request.category_id, "Submitting content");

        let response = self
            .client
            .send(self.client.post(&endpoint, Some(&token)).multipart(form))
            .await
            .map_err(|e| {
                error!("Submission to {} failed: {}", endpoint, e);
                e
            })?;

        let body = response.bytes().await.map_err(ClientError::Network)?;
        let receipt = serde_json::from_slice(&body).unwrap_or_else(|_| {
            serde_json::Value::String(String::from_utf8_lossy(&body).into_owned())
        });

        info!("{} content submitted", request.kind);
        Ok(SubmissionReceipt(receipt))
    }

    /// Validate a draft and send it
    pub async fn submit_draft(
        &self,
        draft: SubmissionDraft,
    ) -> SubmissionResult<SubmissionReceipt> {
        let request = self.prepare(draft)?;
        self.submit(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use media::LocationSource;

    fn draft(kind: ContentKind) -> SubmissionDraft {
        SubmissionDraft {
            category_id: "7".to_string(),
            kind,
            title: "  Temple bells ".to_string(),
            text: String::new(),
            payload: None,
            location: Some(Geolocation::new(17.385, 78.4867, LocationSource::Manual).unwrap()),
        }
    }

    const MAX_AGE: Duration = Duration::from_secs(300);

    #[test]
    fn test_validation_order() {
        let mut empty = draft(ContentKind::Text);
        empty.title = " ".to_string();
        empty.location = None;
        assert_eq!(
            SubmissionRequest::build(empty.clone(), MAX_AGE),
            Err(ValidationError::EmptyTitle)
        );

        empty.title = "T".to_string();
        assert_eq!(
            SubmissionRequest::build(empty, MAX_AGE),
            Err(ValidationError::MissingLocation)
        );

        assert_eq!(
            SubmissionRequest::build(draft(ContentKind::Text), MAX_AGE),
            Err(ValidationError::EmptyText)
        );
        assert_eq!(
            SubmissionRequest::build(draft(ContentKind::Audio), MAX_AGE),
            Err(ValidationError::MissingPayload)
        );

        let mut empty_blob = draft(ContentKind::Image);
        empty_blob.payload = Some(Arc::new(MediaBlob::new(Vec::new(), "image/jpeg", "a.jpg")));
        assert_eq!(
            SubmissionRequest::build(empty_blob, MAX_AGE),
            Err(ValidationError::MissingPayload)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_device_location_is_refused() {
        let mut text = draft(ContentKind::Text);
        text.text = "hello".to_string();
        text.location = Some(Geolocation::new(10.0, 20.0, LocationSource::Device).unwrap());

        assert!(SubmissionRequest::build(text.clone(), MAX_AGE).is_ok());

        tokio::time::advance(MAX_AGE + Duration::from_secs(1)).await;
        assert_eq!(
            SubmissionRequest::build(text, MAX_AGE),
            Err(ValidationError::StaleLocation)
        );
    }

    #[test]
    fn test_text_fields() {
        let mut text = draft(ContentKind::Text);
        text.text = "hello".to_string();
        let request = SubmissionRequest::build(text, MAX_AGE).unwrap();

        assert_eq!(
            request.multipart_fields(),
            vec![
                ("title", "Temple bells".to_string()),
                ("category_id", "7".to_string()),
                ("content_type", "text".to_string()),
                ("latitude", "17.385".to_string()),
                ("longitude", "78.4867".to_string()),
                ("content", "hello".to_string()),
            ]
        );
    }

    #[test]
    fn test_binary_request_has_no_content_field() {
        let mut audio = draft(ContentKind::Audio);
        audio.text = "ignored".to_string();
        audio.payload = Some(Arc::new(MediaBlob::new(vec![1, 2, 3], "audio/webm", "a.webm")));
        let request = SubmissionRequest::build(audio, MAX_AGE).unwrap();

        assert!(matches!(request.payload(), ContentPayload::Binary(_)));
        assert!(request.multipart_fields().iter().all(|(name, _)| *name != "content"));
    }
}

//! Categories and submissions against a mocked backend

use api::{AppState, SubmissionError, ValidationError};
use async_trait::async_trait;
use auth::session::{TOKEN_KEY, USER_KEY};
use common::{ClientConfig, ClientError, KeyValueStore, MemoryStore};
use media::{
    CapabilityError, CaptureState, ContentKind, Coordinates, GeolocationProvider, LocationError,
    MediaDevices, MediaStream, NoGeolocation, PositionOptions, RawFrame, StreamConstraints,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Microphone;

struct ChunkStream {
    remaining: Vec<Vec<u8>>,
}

#[async_trait]
impl MediaStream for ChunkStream {
    async fn next_chunk(&mut self) -> Option<Vec<u8>> {
        if self.remaining.is_empty() {
            std::future::pending().await
        } else {
            Some(self.remaining.remove(0))
        }
    }

    async fn grab_frame(&mut self) -> Result<RawFrame, CapabilityError> {
        Err(CapabilityError::Unsupported(media::Capability::Camera))
    }

    fn stop(&mut self) {}
}

#[async_trait]
impl MediaDevices for Microphone {
    async fn open_stream(
        &self,
        _constraints: StreamConstraints,
    ) -> Result<Box<dyn MediaStream>, CapabilityError> {
        Ok(Box::new(ChunkStream {
            remaining: vec![b"webm-".to_vec(), b"audio".to_vec()],
        }))
    }
}

/// Positioning that never answers
struct HangingGeolocation;

#[async_trait]
impl GeolocationProvider for HangingGeolocation {
    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> Result<Coordinates, LocationError> {
        std::future::pending().await
    }
}

async fn signed_in_state(server: &MockServer, devices: Arc<dyn MediaDevices>) -> AppState {
    signed_in_state_at(server.uri(), devices, Arc::new(NoGeolocation)).await
}

async fn signed_in_state_at(
    base_url: String,
    devices: Arc<dyn MediaDevices>,
    geolocation: Arc<dyn GeolocationProvider>,
) -> AppState {
    let store = Arc::new(MemoryStore::new());
    store.set(TOKEN_KEY, "tok-9").await.unwrap();
    store
        .set(USER_KEY, &json!({"id": 9, "name": "Anitha"}).to_string())
        .await
        .unwrap();

    let config = ClientConfig::default().with_base_url(base_url);
    let state = AppState::new(config, store, devices, geolocation).unwrap();
    state.sessions.restore().await.unwrap();
    state
}

#[tokio::test]
async fn test_categories_are_published_and_ranked() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/categories/"))
        .and(header("authorization", "Bearer tok-9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "name": "music", "title": "Music", "rank": 2, "published": true},
            {"id": 2, "name": "food", "title": "Food", "rank": 1, "published": true},
            {"id": 3, "name": "places", "title": "Places", "rank": 1, "published": false}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let state = signed_in_state(&server, Arc::new(Microphone)).await;
    let listing = state.categories.list_categories().await;

    assert!(listing.error.is_none());
    let ids: Vec<&str> = listing.categories.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["2", "1"]);
}

#[tokio::test]
async fn test_category_failure_yields_empty_listing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/categories/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
        .mount(&server)
        .await;

    let state = signed_in_state(&server, Arc::new(Microphone)).await;
    let listing = state.categories.list_categories().await;

    assert!(listing.categories.is_empty());
    assert!(matches!(
        listing.error,
        Some(ClientError::UnknownServer { status: 500 })
    ));
    assert_eq!(listing.notice().as_deref(), Some("Failed to fetch categories"));
}

#[tokio::test]
async fn test_unreachable_backend_yields_network_notice() {
    let server = MockServer::start().await;
    let base_url = server.uri();
    drop(server);

    let state = signed_in_state_at(base_url, Arc::new(Microphone), Arc::new(NoGeolocation)).await;
    let listing = state.categories.list_categories().await;

    assert!(listing.categories.is_empty());
    assert!(matches!(listing.error, Some(ClientError::Network(_))));
    assert_eq!(
        listing.notice().as_deref(),
        Some("Network error. Please try again.")
    );
}

#[tokio::test]
async fn test_recording_starts_while_location_is_pending() {
    let server = MockServer::start().await;
    let state = signed_in_state_at(
        server.uri(),
        Arc::new(Microphone),
        Arc::new(HangingGeolocation),
    )
    .await;

    let mut upload = state.upload("4", ContentKind::Audio).unwrap();
    {
        let (location, capture) = upload.parts_mut();
        let capture = capture.expect("audio capture");
        let locating = location.acquire_location();
        tokio::pin!(locating);

        tokio::select! {
            started = capture.start_recording() => started.unwrap(),
            _ = &mut locating => panic!("location resolved before recording started"),
        }
        assert_eq!(capture.state(), CaptureState::Recording);
    }

    assert!(upload.location().location().is_none());
    upload.stop_recording().await.unwrap();
    assert_eq!(upload.capture().unwrap().state(), CaptureState::Stopped);
    upload.leave().await;
}

#[tokio::test]
async fn test_incomplete_forms_never_reach_the_backend() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let state = signed_in_state(&server, Arc::new(Microphone)).await;

    let mut text = state.upload("4", ContentKind::Text).unwrap();
    let err = text.submit().await.unwrap_err();
    assert!(matches!(err, SubmissionError::Invalid(ValidationError::EmptyTitle)));

    text.set_title("Festival");
    let err = text.submit().await.unwrap_err();
    assert!(matches!(err, SubmissionError::Invalid(ValidationError::MissingLocation)));

    text.enter_location("12.97", "77.59").unwrap();
    let err = text.submit().await.unwrap_err();
    assert!(matches!(err, SubmissionError::Invalid(ValidationError::EmptyText)));

    let mut video = state.upload("4", ContentKind::Video).unwrap();
    video.set_title("Festival");
    video.enter_location("12.97", "77.59").unwrap();
    let err = video.submit().await.unwrap_err();
    assert!(matches!(err, SubmissionError::Invalid(ValidationError::MissingPayload)));
}

#[tokio::test]
async fn test_server_rejection_keeps_the_form() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/content/text"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"detail": "Category is closed"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let state = signed_in_state(&server, Arc::new(Microphone)).await;
    let mut upload = state.upload("4", ContentKind::Text).unwrap();
    upload.set_title("Harvest song");
    upload.set_text("paddy fields at dawn");
    upload.enter_location("17.385", "78.4867").unwrap();

    let err = upload.submit().await.unwrap_err();
    assert_eq!(err.user_message(), "Category is closed");
    assert_eq!(upload.title(), "Harvest song");
    assert_eq!(upload.text(), "paddy fields at dawn");
    assert!(upload.location().location().is_some());
}

#[tokio::test]
async fn test_discarded_recording_then_text_submission() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/content/text"))
        .and(header("authorization", "Bearer tok-9"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "c-1"})))
        .expect(1)
        .mount(&server)
        .await;

    let state = signed_in_state(&server, Arc::new(Microphone)).await;
    let mut upload = state.upload("4", ContentKind::Audio).unwrap();
    upload.enter_location("17.385", "78.4867").unwrap();

    tokio::time::pause();
    upload.start_recording().await.unwrap();
    tokio::time::sleep(Duration::from_millis(5_500)).await;
    upload.stop_recording().await.unwrap();
    tokio::time::resume();

    let capture = upload.capture().unwrap();
    assert_eq!(capture.state(), CaptureState::Stopped);
    assert_eq!(capture.elapsed_seconds(), 5);
    assert_eq!(capture.blob().unwrap().data, b"webm-audio".to_vec());
    let preview = capture.preview().unwrap();

    assert!(upload.discard());
    assert!(!state.previews.is_live(preview));

    upload.switch_kind(ContentKind::Text).await.unwrap();
    upload.set_title("T");
    upload.set_text("hello");
    let receipt = upload.submit().await.unwrap();
    assert_eq!(receipt.0, json!({"id": "c-1"}));

    assert_eq!(upload.title(), "");
    assert!(upload.location().location().is_none());

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("name=\"content_type\"\r\n\r\ntext\r\n"));
    assert!(body.contains("name=\"content\"\r\n\r\nhello\r\n"));
    assert!(body.contains("name=\"title\"\r\n\r\nT\r\n"));
    assert!(body.contains("name=\"latitude\"\r\n\r\n17.385\r\n"));
    assert!(!body.contains("name=\"file\""));
}

#[tokio::test]
async fn test_image_file_submission() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/content/image"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let photo = dir.path().join("stepwell.png");
    std::fs::write(&photo, b"png-bytes").unwrap();

    let state = signed_in_state(&server, Arc::new(Microphone)).await;
    let mut upload = state.upload("11", ContentKind::Image).unwrap();
    upload.set_title("Stepwell");
    upload.select_file(&photo).await.unwrap();
    upload.enter_location("-8.4", "115.2").unwrap();

    upload.submit().await.unwrap();
    assert_eq!(upload.capture().unwrap().state(), CaptureState::Submitted);
    assert_eq!(state.previews.live_count(), 0);

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("name=\"file\"; filename=\"stepwell.png\""));
    assert!(body.contains("Content-Type: image/png"));
    assert!(body.contains("png-bytes"));
    assert!(!body.contains("name=\"content\"\r\n"));

    upload.leave().await;
}

#[tokio::test]
async fn test_stats_and_export() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/me/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"recordings": 12})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/users/me/export"))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({
            "task_id": "exp-3",
            "status": "queued",
            "message": "We will email you"
        })))
        .mount(&server)
        .await;

    let state = signed_in_state(&server, Arc::new(Microphone)).await;

    let stats = state.profile.stats().await.unwrap();
    assert_eq!(stats.0["recordings"], 12);

    let job = state.profile.request_export().await.unwrap();
    assert_eq!(job.task_id, "exp-3");
    assert_eq!(job.status, "queued");

    let contact = state.profile.contact_details(false).await.unwrap();
    assert_eq!(contact.name, "Anitha");
    assert_eq!(contact.phone, None);
}

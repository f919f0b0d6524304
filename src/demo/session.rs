//! Per-visitor Live Demo state.
//!
//! A [`DemoSession`] owns the loaded content, the view mode, the cached AI
//! result, and any narration clip. Its methods are synchronous state changes;
//! the async flows at the bottom of this module drive them against
//! [`DemoServices`] and never hold the session lock across a network call.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::ai::{AiResult, EnhanceRequest, Enhancer};
use crate::config::Config;
use crate::demo::content::ContentItem;
use crate::demo::toggle::{ToggleAction, ViewMode, plan_toggle};
use crate::error::{DemoError, Error, ErrorKind, InputError};
use crate::media::{
    Classification, HttpMediaProbe, MediaKind, MediaProbe, OpenAiSpeech, PreviewHandle,
    PreviewStore, SpeechClip, SpeechSynthesizer, UploadHandler, UploadOutcome, UploadedFile,
    UrlClassifier, extract_url, parse_media_url,
};

/// A session shared between request handlers.
pub type SharedSession = Arc<Mutex<DemoSession>>;

/// Serializable view of a session for the demo page.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub mode: ViewMode,
    pub is_generating: bool,
    pub media_kind: MediaKind,
    pub text_body: String,
    pub preview_url: Option<String>,
    pub url_input: String,
    pub generated_text: Option<String>,
    pub generated_image_url: Option<String>,
    pub is_speaking: bool,
    pub narration_url: Option<String>,
    pub last_error: Option<String>,
    pub error_kind: Option<ErrorKind>,
    pub created_at: DateTime<Utc>,
}

/// Outcome of pressing the toggle.
#[derive(Debug)]
pub enum ToggleStart {
    /// Mode changed without any network call.
    Switched(ViewMode),
    /// An enhancement must run; hand the ticket back to `finish_generation`.
    Generate(GenerationTicket),
}

/// Work detached from the session for the duration of one enhancement.
#[derive(Debug)]
pub struct GenerationTicket {
    pub request: EnhanceRequest,
    started: Instant,
}

/// Outcome of pressing play/stop.
#[derive(Debug, PartialEq, Eq)]
pub enum SpeechStart {
    /// Playback was running and has been stopped.
    Stopped,
    /// Synthesize this text and hand the clip to `finish_speech`.
    Speak(String),
}

/// One visitor's demo state.
#[derive(Debug)]
pub struct DemoSession {
    id: Uuid,
    content: ContentItem,
    url_input: String,
    mode: ViewMode,
    result: Option<AiResult>,
    narration: Option<PreviewHandle>,
    last_error: Option<(ErrorKind, String)>,
    created_at: DateTime<Utc>,
    last_activity: Instant,
}

impl Default for DemoSession {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            content: ContentItem::empty(),
            url_input: String::new(),
            mode: ViewMode::Original,
            result: None,
            narration: None,
            last_error: None,
            created_at: Utc::now(),
            last_activity: Instant::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn is_generating(&self) -> bool {
        self.mode.is_generating()
    }

    pub fn content(&self) -> &ContentItem {
        &self.content
    }

    /// The last successful enhancement for the current content.
    pub fn cached_result(&self) -> Option<&AiResult> {
        self.result.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_ref().map(|(_, msg)| msg.as_str())
    }

    pub fn is_speaking(&self) -> bool {
        self.narration.is_some()
    }

    /// Time since the last state change.
    pub fn idle_for(&self) -> Duration {
        self.last_activity.elapsed()
    }

    fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    fn transition_to(&mut self, target: ViewMode) -> Result<(), DemoError> {
        if !self.mode.can_transition_to(target) {
            return Err(DemoError::InvalidTransition {
                from: self.mode.to_string(),
                to: target.to_string(),
            });
        }
        tracing::debug!(session = %self.id, from = %self.mode, to = %target, "View mode change");
        if target == ViewMode::Original {
            self.stop_speech();
        }
        self.mode = target;
        self.touch();
        Ok(())
    }

    fn ensure_idle(&self) -> Result<(), DemoError> {
        if self.is_generating() {
            return Err(DemoError::GenerationInProgress);
        }
        Ok(())
    }

    /// Record a failure for display.
    pub fn record_error(&mut self, error: &Error) {
        self.last_error = Some((error.kind(), error.user_message()));
        self.touch();
    }

    /// Swap in new content. The old content (and any preview it holds) is
    /// released first; the cached result no longer applies.
    fn replace_content(&mut self, content: ContentItem) {
        drop(std::mem::take(&mut self.content));
        self.content = content;
        self.result = None;
        self.last_error = None;
        if self.mode == ViewMode::AiEnhanced {
            self.mode = ViewMode::Original;
        }
        self.stop_speech();
        self.touch();
    }

    /// Typed text replaces whatever was loaded.
    pub fn set_text(&mut self, text: impl Into<String>) -> Result<(), DemoError> {
        self.ensure_idle()?;
        self.replace_content(ContentItem::text(text));
        Ok(())
    }

    /// Install an accepted upload.
    pub fn install_upload(&mut self, file_name: &str, outcome: UploadOutcome) -> Result<(), DemoError> {
        self.ensure_idle()?;
        self.replace_content(ContentItem::from_upload(file_name, outcome));
        Ok(())
    }

    /// Install a classified URL.
    pub fn install_classification(&mut self, classification: Classification) -> Result<(), DemoError> {
        self.ensure_idle()?;
        self.replace_content(ContentItem::from_classification(classification));
        Ok(())
    }

    /// Clear content after a failed load.
    pub fn clear_content(&mut self) {
        if !self.is_generating() {
            self.replace_content(ContentItem::empty());
        }
    }

    pub fn set_url_input(&mut self, input: impl Into<String>) {
        self.url_input = input.into();
        self.touch();
    }

    pub fn url_input(&self) -> &str {
        &self.url_input
    }

    /// Handle a toggle press.
    pub fn begin_toggle(&mut self) -> Result<ToggleStart, Error> {
        let action =
            plan_toggle(self.mode, self.result.is_some()).ok_or(DemoError::GenerationInProgress)?;

        match action {
            ToggleAction::ShowCached => {
                self.transition_to(ViewMode::AiEnhanced)?;
                Ok(ToggleStart::Switched(ViewMode::AiEnhanced))
            }
            ToggleAction::ShowOriginal => {
                self.transition_to(ViewMode::Original)?;
                Ok(ToggleStart::Switched(ViewMode::Original))
            }
            ToggleAction::Generate => Ok(ToggleStart::Generate(self.start_generation()?)),
        }
    }

    /// Handle an explicit regenerate request.
    pub fn begin_regenerate(&mut self) -> Result<GenerationTicket, Error> {
        self.ensure_idle()?;
        if !self.content.has_content() {
            return Err(InputError::EmptyContent.into());
        }
        self.start_generation()
    }

    fn start_generation(&mut self) -> Result<GenerationTicket, Error> {
        let request = self.content.enhance_request()?;
        self.transition_to(ViewMode::Generating)?;
        self.stop_speech();
        self.last_error = None;
        Ok(GenerationTicket {
            request,
            started: Instant::now(),
        })
    }

    /// Apply the outcome of an enhancement started by `begin_toggle` or
    /// `begin_regenerate`. A failure leaves any earlier result untouched.
    pub fn finish_generation(
        &mut self,
        ticket: GenerationTicket,
        outcome: Result<AiResult, Error>,
    ) -> Result<ViewMode, Error> {
        if !self.is_generating() {
            tracing::debug!(session = %self.id, mode = %self.mode, "Discarding stale enhancement");
            return Err(DemoError::InvalidTransition {
                from: self.mode.to_string(),
                to: ViewMode::AiEnhanced.to_string(),
            }
            .into());
        }

        let elapsed_ms = ticket.started.elapsed().as_millis() as u64;
        match outcome {
            Ok(result) => {
                self.result = Some(result);
                self.last_error = None;
                self.transition_to(ViewMode::AiEnhanced)?;
                tracing::info!(session = %self.id, elapsed_ms, "Enhancement ready");
                Ok(ViewMode::AiEnhanced)
            }
            Err(e) => {
                self.transition_to(ViewMode::Original)?;
                self.record_error(&e);
                tracing::warn!(session = %self.id, elapsed_ms, kind = %e.kind(), "Enhancement failed: {}", e);
                Err(e)
            }
        }
    }

    /// Handle a play/stop press.
    pub fn begin_speech(&mut self) -> Result<SpeechStart, DemoError> {
        if self.is_speaking() {
            self.stop_speech();
            self.touch();
            return Ok(SpeechStart::Stopped);
        }

        if self.mode != ViewMode::AiEnhanced {
            return Err(DemoError::NothingToNarrate);
        }
        self.result
            .as_ref()
            .and_then(|r| r.generated_text.as_deref())
            .filter(|t| !t.trim().is_empty())
            .map(|t| SpeechStart::Speak(t.to_string()))
            .ok_or(DemoError::NothingToNarrate)
    }

    /// Hold a synthesized clip for playback. Dropped if the AI view was left
    /// while synthesizing.
    pub fn finish_speech(&mut self, previews: &PreviewStore, clip: SpeechClip) -> bool {
        if self.mode != ViewMode::AiEnhanced {
            return false;
        }
        self.narration = Some(previews.acquire(clip.data, clip.mime_type));
        self.touch();
        true
    }

    /// Stop narration if it is playing, releasing the clip.
    pub fn stop_speech(&mut self) {
        self.narration = None;
    }

    /// Release everything this session holds.
    pub fn teardown(&mut self) {
        tracing::debug!(session = %self.id, "Tearing down demo session");
        self.stop_speech();
        self.content = ContentItem::empty();
        self.result = None;
        self.mode = ViewMode::Original;
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id,
            mode: self.mode,
            is_generating: self.is_generating(),
            media_kind: self.content.media_kind(),
            text_body: self.content.text_body().to_string(),
            preview_url: self.content.preview_href(),
            url_input: self.url_input.clone(),
            generated_text: self.result.as_ref().and_then(|r| r.generated_text.clone()),
            generated_image_url: self
                .result
                .as_ref()
                .and_then(|r| r.generated_image_url.clone()),
            is_speaking: self.narration.is_some(),
            narration_url: self.narration.as_ref().map(PreviewHandle::href),
            last_error: self.last_error.as_ref().map(|(_, msg)| msg.clone()),
            error_kind: self.last_error.as_ref().map(|(kind, _)| *kind),
            created_at: self.created_at,
        }
    }
}

impl Drop for DemoSession {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Everything the async flows need besides the session itself.
pub struct DemoServices {
    pub previews: PreviewStore,
    pub classifier: UrlClassifier,
    pub uploads: UploadHandler,
    pub enhancer: Enhancer,
    pub speech: Option<Arc<dyn SpeechSynthesizer>>,
}

impl DemoServices {
    pub fn new(
        previews: PreviewStore,
        probe: Arc<dyn MediaProbe>,
        enhancer: Enhancer,
        speech: Option<Arc<dyn SpeechSynthesizer>>,
    ) -> Self {
        Self {
            classifier: UrlClassifier::new(probe, previews.clone()),
            uploads: UploadHandler::new(previews.clone()),
            previews,
            enhancer,
            speech,
        }
    }

    /// Real network-backed services.
    pub fn from_config(config: &Config) -> Self {
        let timeout = config.ai.request_timeout;
        let probe: Arc<dyn MediaProbe> = Arc::new(HttpMediaProbe::new(timeout));
        let enhancer = Enhancer::from_config(&config.ai, Arc::clone(&probe));
        let speech = OpenAiSpeech::from_config(&config.ai.openai, timeout)
            .map(|s| Arc::new(s) as Arc<dyn SpeechSynthesizer>);

        if !enhancer.is_configured() {
            tracing::warn!("AI credentials incomplete; the Live Demo will report a configuration error");
        }
        Self::new(PreviewStore::new(), probe, enhancer, speech)
    }
}

async fn record_failure<T>(session: &Mutex<DemoSession>, result: Result<T, Error>) -> Result<T, Error> {
    if let Err(e) = &result {
        session.lock().await.record_error(e);
    }
    result
}

/// Press the toggle.
pub async fn toggle(session: &Mutex<DemoSession>, services: &DemoServices) -> Result<ViewMode, Error> {
    let start = session.lock().await.begin_toggle();
    match record_failure(session, start).await? {
        ToggleStart::Switched(mode) => Ok(mode),
        ToggleStart::Generate(ticket) => run_generation(session, services, ticket).await,
    }
}

/// Press "Generate AI".
pub async fn regenerate(session: &Mutex<DemoSession>, services: &DemoServices) -> Result<ViewMode, Error> {
    let start = session.lock().await.begin_regenerate();
    let ticket = record_failure(session, start).await?;
    run_generation(session, services, ticket).await
}

async fn run_generation(
    session: &Mutex<DemoSession>,
    services: &DemoServices,
    ticket: GenerationTicket,
) -> Result<ViewMode, Error> {
    let outcome = services.enhancer.enhance(&ticket.request).await;
    session.lock().await.finish_generation(ticket, outcome)
}

/// Replace content with typed text.
pub async fn set_text(session: &Mutex<DemoSession>, text: String) -> Result<(), Error> {
    let mut guard = session.lock().await;
    guard.set_text(text)?;
    Ok(())
}

/// Submit the URL field: extract the first URL from the input and load it.
/// A URL that fails to load leaves the pane empty.
pub async fn submit_url(
    session: &Mutex<DemoSession>,
    services: &DemoServices,
    input: &str,
) -> Result<MediaKind, Error> {
    {
        let mut guard = session.lock().await;
        guard.set_url_input(input);
        guard.ensure_idle()?;
    }

    let url = record_failure(session, extract_url(input).map_err(Error::from)).await?;
    match services.classifier.classify_url(url).await {
        Ok(classification) => {
            let kind = classification.kind;
            session.lock().await.install_classification(classification)?;
            Ok(kind)
        }
        Err(e) => {
            let mut guard = session.lock().await;
            if e.kind() == ErrorKind::MediaLoadError {
                guard.clear_content();
            }
            guard.record_error(&e);
            Err(e)
        }
    }
}

/// The URL field changed. Loads only once the whole value is a valid URL and
/// still matches the field when classification completes. Failures while
/// typing are not reported; returns `None` whenever nothing was loaded.
pub async fn url_changed(
    session: &Mutex<DemoSession>,
    services: &DemoServices,
    input: &str,
) -> Result<Option<MediaKind>, Error> {
    {
        let mut guard = session.lock().await;
        guard.set_url_input(input);
        if guard.is_generating() {
            return Ok(None);
        }
    }

    let Ok(url) = parse_media_url(input) else {
        return Ok(None);
    };

    let classification = match services.classifier.classify_url(url).await {
        Ok(classification) => classification,
        Err(e) => {
            tracing::debug!(input, "URL not loadable yet: {}", e);
            return Ok(None);
        }
    };

    let mut guard = session.lock().await;
    if guard.url_input() != input || guard.is_generating() {
        tracing::debug!(input, "Discarding classification for superseded URL input");
        return Ok(None);
    }
    let kind = classification.kind;
    guard.install_classification(classification)?;
    Ok(Some(kind))
}

/// Accept an uploaded file. A failed load leaves the pane empty.
pub async fn upload(
    session: &Mutex<DemoSession>,
    services: &DemoServices,
    file: UploadedFile,
) -> Result<MediaKind, Error> {
    session.lock().await.ensure_idle()?;

    let name = file.name.clone();
    match services.uploads.accept(file) {
        Ok(outcome) => {
            let kind = match &outcome {
                UploadOutcome::Text { .. } => MediaKind::Text,
                UploadOutcome::Media { kind, .. } => *kind,
            };
            session.lock().await.install_upload(&name, outcome)?;
            Ok(kind)
        }
        Err(e) => {
            let e = Error::from(e);
            let mut guard = session.lock().await;
            guard.clear_content();
            guard.record_error(&e);
            Err(e)
        }
    }
}

/// Press play/stop on the narration control. Returns whether narration is
/// now playing.
pub async fn toggle_speech(session: &Mutex<DemoSession>, services: &DemoServices) -> Result<bool, Error> {
    let text = match session.lock().await.begin_speech()? {
        SpeechStart::Stopped => return Ok(false),
        SpeechStart::Speak(text) => text,
    };

    let synthesizer = services.speech.as_ref().ok_or(DemoError::SpeechUnavailable)?;
    let clip = synthesizer.synthesize(&text).await.map_err(Error::from);
    let clip = record_failure(session, clip).await?;

    Ok(session.lock().await.finish_speech(&services.previews, clip))
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use url::Url;

    use super::*;
    use crate::media::MediaSource;

    fn result(text: &str) -> AiResult {
        AiResult {
            generated_text: Some(text.to_string()),
            generated_image_url: Some("https://images.example.com/1.png".to_string()),
        }
    }

    fn generate(session: &mut DemoSession, outcome: Result<AiResult, Error>) -> Result<ViewMode, Error> {
        match session.begin_toggle()? {
            ToggleStart::Generate(ticket) => session.finish_generation(ticket, outcome),
            other => panic!("expected generation, got {:?}", other),
        }
    }

    #[test]
    fn test_new_session_is_original_and_empty() {
        let session = DemoSession::new();
        let snapshot = session.snapshot();
        assert_eq!(snapshot.mode, ViewMode::Original);
        assert!(!snapshot.is_generating);
        assert_eq!(snapshot.media_kind, MediaKind::None);
        assert!(snapshot.generated_text.is_none());
        assert!(snapshot.last_error.is_none());
    }

    #[test]
    fn test_toggle_without_cache_generates() {
        let mut session = DemoSession::new();
        session.set_text("Photosynthesis").unwrap();

        let ticket = match session.begin_toggle().unwrap() {
            ToggleStart::Generate(ticket) => ticket,
            other => panic!("expected generation, got {:?}", other),
        };
        assert!(session.is_generating());
        assert_eq!(ticket.request, EnhanceRequest::Text("Photosynthesis".to_string()));

        let mode = session.finish_generation(ticket, Ok(result("done"))).unwrap();
        assert_eq!(mode, ViewMode::AiEnhanced);
        assert_eq!(session.snapshot().generated_text.as_deref(), Some("done"));
    }

    #[test]
    fn test_toggle_with_cache_does_not_generate() {
        let mut session = DemoSession::new();
        session.set_text("Photosynthesis").unwrap();
        generate(&mut session, Ok(result("done"))).unwrap();

        assert!(matches!(
            session.begin_toggle().unwrap(),
            ToggleStart::Switched(ViewMode::Original)
        ));
        assert!(matches!(
            session.begin_toggle().unwrap(),
            ToggleStart::Switched(ViewMode::AiEnhanced)
        ));
        assert_eq!(session.cached_result(), Some(&result("done")));
    }

    #[test]
    fn test_reentry_refused_while_generating() {
        let mut session = DemoSession::new();
        session.set_text("Photosynthesis").unwrap();
        let _ticket = session.begin_toggle().unwrap();

        assert!(matches!(
            session.begin_toggle(),
            Err(Error::Demo(DemoError::GenerationInProgress))
        ));
        assert!(matches!(
            session.begin_regenerate(),
            Err(Error::Demo(DemoError::GenerationInProgress))
        ));
        assert!(matches!(
            session.set_text("other"),
            Err(DemoError::GenerationInProgress)
        ));
    }

    #[test]
    fn test_failure_reverts_and_keeps_previous_result() {
        let mut session = DemoSession::new();
        session.set_text("Photosynthesis").unwrap();
        generate(&mut session, Ok(result("first"))).unwrap();

        let ticket = session.begin_regenerate().unwrap();
        let err = session
            .finish_generation(
                ticket,
                Err(crate::error::AiError::AuthFailed {
                    provider: "openai".to_string(),
                }
                .into()),
            )
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::AiServiceError);
        assert_eq!(session.mode(), ViewMode::Original);
        assert_eq!(session.cached_result(), Some(&result("first")));
        assert!(session.last_error().unwrap().starts_with("Failed to generate AI content"));
        assert_eq!(session.snapshot().error_kind, Some(ErrorKind::AiServiceError));
    }

    #[test]
    fn test_content_change_invalidates_cache() {
        let mut session = DemoSession::new();
        session.set_text("Photosynthesis").unwrap();
        generate(&mut session, Ok(result("done"))).unwrap();

        session.set_text("Mitosis").unwrap();
        assert_eq!(session.mode(), ViewMode::Original);
        assert!(session.cached_result().is_none());
        assert!(matches!(
            session.begin_toggle().unwrap(),
            ToggleStart::Generate(_)
        ));
    }

    #[test]
    fn test_regenerate_requires_content() {
        let mut session = DemoSession::new();
        assert!(matches!(
            session.begin_regenerate(),
            Err(Error::Input(InputError::EmptyContent))
        ));
        session.set_text("   ").unwrap();
        assert!(session.begin_regenerate().is_err());
    }

    #[test]
    fn test_replacing_upload_releases_previous_preview() {
        let store = PreviewStore::new();
        let mut session = DemoSession::new();

        let first = store.acquire(vec![1u8], "image/png");
        let first_id = first.id();
        session
            .install_upload(
                "a.png",
                UploadOutcome::Media {
                    kind: MediaKind::Image,
                    handle: first,
                },
            )
            .unwrap();
        assert!(store.get(first_id).is_some());

        session
            .install_upload(
                "b.png",
                UploadOutcome::Media {
                    kind: MediaKind::Image,
                    handle: store.acquire(vec![2u8], "image/png"),
                },
            )
            .unwrap();
        assert!(store.get(first_id).is_none());
        assert_eq!(store.active_count(), 1);

        session.teardown();
        assert_eq!(store.active_count(), 0);
    }

    #[test]
    fn test_classification_installs_url_as_text_body() {
        let mut session = DemoSession::new();
        let url = Url::parse("https://example.com/lesson.mp4").unwrap();
        session
            .install_classification(Classification {
                url: url.clone(),
                kind: MediaKind::Video,
                source: MediaSource::Remote(url),
            })
            .unwrap();

        let snapshot = session.snapshot();
        assert_eq!(snapshot.media_kind, MediaKind::Video);
        assert_eq!(snapshot.text_body, "https://example.com/lesson.mp4");
        assert_eq!(
            snapshot.preview_url.as_deref(),
            Some("https://example.com/lesson.mp4")
        );
    }

    #[test]
    fn test_speech_only_in_ai_view() {
        let store = PreviewStore::new();
        let mut session = DemoSession::new();
        session.set_text("Photosynthesis").unwrap();
        assert_eq!(session.begin_speech(), Err(DemoError::NothingToNarrate));

        generate(&mut session, Ok(result("Plants make sugar."))).unwrap();
        assert_eq!(
            session.begin_speech().unwrap(),
            SpeechStart::Speak("Plants make sugar.".to_string())
        );

        let clip = SpeechClip {
            data: Bytes::from_static(b"ID3"),
            mime_type: "audio/mpeg".to_string(),
        };
        assert!(session.finish_speech(&store, clip));
        assert!(session.is_speaking());
        assert_eq!(store.active_count(), 1);

        assert_eq!(session.begin_speech().unwrap(), SpeechStart::Stopped);
        assert_eq!(store.active_count(), 0);
    }

    #[test]
    fn test_leaving_ai_view_stops_speech() {
        let store = PreviewStore::new();
        let mut session = DemoSession::new();
        session.set_text("Photosynthesis").unwrap();
        generate(&mut session, Ok(result("Plants make sugar."))).unwrap();

        session.begin_speech().unwrap();
        session.finish_speech(
            &store,
            SpeechClip {
                data: Bytes::from_static(b"ID3"),
                mime_type: "audio/mpeg".to_string(),
            },
        );
        session.begin_toggle().unwrap();

        assert_eq!(session.mode(), ViewMode::Original);
        assert!(!session.is_speaking());
        assert_eq!(store.active_count(), 0);
    }

    #[test]
    fn test_stop_and_teardown_release_narration() {
        let store = PreviewStore::new();
        let clip = || SpeechClip {
            data: Bytes::from_static(b"ID3"),
            mime_type: "audio/mpeg".to_string(),
        };
        let mut session = DemoSession::new();
        session.set_text("Photosynthesis").unwrap();
        generate(&mut session, Ok(result("Plants make sugar."))).unwrap();

        session.begin_speech().unwrap();
        session.finish_speech(&store, clip());
        session.stop_speech();
        assert!(!session.is_speaking());
        assert_eq!(store.active_count(), 0);

        session.begin_speech().unwrap();
        session.finish_speech(&store, clip());
        assert_eq!(store.active_count(), 1);
        session.teardown();
        assert!(!session.is_speaking());
        assert_eq!(store.active_count(), 0);
    }

    #[test]
    fn test_finish_after_teardown_is_discarded() {
        let mut session = DemoSession::new();
        session.set_text("Photosynthesis").unwrap();
        let ticket = match session.begin_toggle().unwrap() {
            ToggleStart::Generate(ticket) => ticket,
            other => panic!("expected generation, got {:?}", other),
        };

        session.teardown();
        assert!(session.finish_generation(ticket, Ok(result("late"))).is_err());
        assert!(session.cached_result().is_none());
    }
}

//! Provider implementations for VisuLearn.
//!
//! This crate provides concrete implementations of the `ContentModel`,
//! `ImageModel` and `SpeechModel` traits.
//!
//! # Supported Providers
//!
//! - **Mock**: Scripted outcomes for tests and offline runs
//! - **Gemini**: Google's Gemini models for text and images (API key required)
//! - **ElevenLabs**: Narration (API key required)

pub mod elevenlabs;
pub mod factory;
pub mod gemini;

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tracing::debug;
use visulearn_abstraction::{
    AudioPayload, ContentModel, ImageModel, ImagePayload, ImageRequest, ProviderError, SpeechModel,
};

pub use elevenlabs::ElevenLabsSpeech;
pub use factory::{ProviderConfig, ProviderFactory, ProviderMode, ProviderSet};
pub use gemini::{GeminiModel, GenerationSettings};

/// A transparent 1x1 PNG returned when no image outcome is scripted.
pub const PLACEHOLDER_PNG_BASE64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

/// A call observed by [`MockModel`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    /// A `ContentModel::generate_content` call.
    Content {
        /// The prompt sent.
        prompt: String,
        /// Whether an image was attached.
        with_image: bool,
    },
    /// An `ImageModel::generate_image` call.
    Image {
        /// The fully rendered prompt sent.
        prompt: String,
        /// The reference image sent, if any.
        reference: Option<ImagePayload>,
    },
    /// A `SpeechModel::synthesize` call.
    Speech {
        /// The narrated text.
        text: String,
    },
}

/// A scripted implementation of every provider trait.
///
/// Each trait has its own queue of outcomes, consumed one per call. When a
/// queue runs dry the mock falls back to a default: the configured default
/// content (or an error if none is set), a placeholder PNG, or a short MP3
/// header.
#[derive(Debug, Default)]
pub struct MockModel {
    id: String,
    default_content: Option<String>,
    content: Mutex<VecDeque<Result<String, ProviderError>>>,
    images: Mutex<VecDeque<Result<ImagePayload, ProviderError>>>,
    speech: Mutex<VecDeque<Result<AudioPayload, ProviderError>>>,
    calls: Mutex<Vec<MockCall>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockModel {
    /// Creates a new `MockModel` with the given ID and empty scripts.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), ..Self::default() }
    }

    /// Sets the content returned once the content script is exhausted.
    #[must_use]
    pub fn with_default_content(mut self, content: impl Into<String>) -> Self {
        self.default_content = Some(content.into());
        self
    }

    /// Queues the outcome of the next unscripted content call.
    pub fn push_content(&self, outcome: Result<String, ProviderError>) -> &Self {
        lock(&self.content).push_back(outcome);
        self
    }

    /// Queues the outcome of the next unscripted image call.
    pub fn push_image(&self, outcome: Result<ImagePayload, ProviderError>) -> &Self {
        lock(&self.images).push_back(outcome);
        self
    }

    /// Queues the outcome of the next unscripted speech call.
    pub fn push_speech(&self, outcome: Result<AudioPayload, ProviderError>) -> &Self {
        lock(&self.speech).push_back(outcome);
        self
    }

    /// Returns every call observed so far, in order.
    pub fn calls(&self) -> Vec<MockCall> {
        lock(&self.calls).clone()
    }

    /// Returns the number of image calls observed so far.
    pub fn image_calls(&self) -> usize {
        lock(&self.calls).iter().filter(|c| matches!(c, MockCall::Image { .. })).count()
    }

    /// Returns the number of speech calls observed so far.
    pub fn speech_calls(&self) -> usize {
        lock(&self.calls).iter().filter(|c| matches!(c, MockCall::Speech { .. })).count()
    }

    fn record(&self, call: MockCall) {
        lock(&self.calls).push(call);
    }
}

#[async_trait]
impl ContentModel for MockModel {
    async fn generate_content(
        &self,
        prompt: &str,
        image: Option<&ImagePayload>,
    ) -> Result<String, ProviderError> {
        debug!(model_id = %self.id, prompt_len = prompt.len(), "MockModel generating content");
        self.record(MockCall::Content { prompt: prompt.to_string(), with_image: image.is_some() });

        let scripted = lock(&self.content).pop_front();
        scripted.unwrap_or_else(|| {
            self.default_content.clone().ok_or_else(|| {
                ProviderError::MalformedResponse("MockModel has no scripted content".to_string())
            })
        })
    }

    fn model_id(&self) -> &str {
        &self.id
    }
}

#[async_trait]
impl ImageModel for MockModel {
    async fn generate_image(&self, request: &ImageRequest) -> Result<ImagePayload, ProviderError> {
        debug!(model_id = %self.id, prompt = %request.prompt, "MockModel generating image");
        self.record(MockCall::Image {
            prompt: request.prompt.clone(),
            reference: request.reference.clone(),
        });

        let scripted = lock(&self.images).pop_front();
        scripted.unwrap_or_else(|| Ok(ImagePayload::new("image/png", PLACEHOLDER_PNG_BASE64)))
    }

    fn model_id(&self) -> &str {
        &self.id
    }
}

#[async_trait]
impl SpeechModel for MockModel {
    async fn synthesize(&self, text: &str) -> Result<AudioPayload, ProviderError> {
        debug!(model_id = %self.id, text_len = text.len(), "MockModel synthesizing narration");
        self.record(MockCall::Speech { text: text.to_string() });

        let scripted = lock(&self.speech).pop_front();
        scripted.unwrap_or_else(|| Ok(AudioPayload::new("audio/mpeg", b"ID3\x03\x00\x00\x00\x00\x00\x00".to_vec())))
    }

    fn voice_id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_consumes_script_in_order() {
        let mock = MockModel::new("mock");
        mock.push_content(Ok("first".to_string()))
            .push_content(Err(ProviderError::from_status("gemini", 429, "")));

        assert_eq!(mock.generate_content("a", None).await.unwrap(), "first");
        assert!(mock.generate_content("b", None).await.is_err());
        // Exhausted with no default content.
        assert!(matches!(
            mock.generate_content("c", None).await,
            Err(ProviderError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_mock_defaults_after_script() {
        let mock = MockModel::new("mock").with_default_content("[]");
        assert_eq!(mock.generate_content("a", None).await.unwrap(), "[]");

        let image = mock.generate_image(&ImageRequest::new("a cat")).await.unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert!(image.decode().is_ok());

        let audio = mock.synthesize("hello").await.unwrap();
        assert!(audio.bytes.starts_with(b"ID3"));
    }

    #[tokio::test]
    async fn test_mock_records_calls() {
        let mock = MockModel::new("mock");
        let reference = ImagePayload::new("image/jpeg", "aGVsbG8=");
        mock.generate_image(&ImageRequest::new("Mia the Explorer").with_reference(Some(reference.clone())))
            .await
            .unwrap();
        mock.synthesize("Once upon a time").await.unwrap();

        assert_eq!(
            mock.calls(),
            vec![
                MockCall::Image { prompt: "Mia the Explorer".to_string(), reference: Some(reference) },
                MockCall::Speech { text: "Once upon a time".to_string() },
            ]
        );
        assert_eq!(mock.image_calls(), 1);
        assert_eq!(mock.speech_calls(), 1);
    }
}

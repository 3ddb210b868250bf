//! Google Gemini provider implementation.
//!
//! This module provides the `ContentModel` and `ImageModel` implementations
//! backed by the Gemini `generateContent` REST endpoint. The same client type
//! serves both roles; only the model ID and generation settings differ.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use tracing::{debug, error};
use visulearn_abstraction::{ContentModel, ImageModel, ImagePayload, ImageRequest, ProviderError};

pub use visulearn_abstraction::{DEFAULT_CONTENT_MODEL, DEFAULT_IMAGE_MODEL};

/// Provider name used in errors and logs.
const PROVIDER: &str = "gemini";

/// Default Gemini REST endpoint.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Sampling settings sent as `generationConfig`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationSettings {
    /// Sampling temperature.
    pub temperature: f32,
    /// Top-k sampling cutoff.
    pub top_k: u32,
    /// Nucleus sampling mass.
    pub top_p: f32,
    /// Maximum number of output tokens.
    pub max_output_tokens: u32,
}

impl GenerationSettings {
    /// Settings used for story and comic scripts.
    pub const fn for_content() -> Self {
        Self { temperature: 0.7, top_k: 40, top_p: 0.95, max_output_tokens: 4096 }
    }

    /// Settings used for image generation; low temperature keeps characters consistent.
    pub const fn for_images() -> Self {
        Self { temperature: 0.3, top_k: 32, top_p: 0.95, max_output_tokens: 1024 }
    }
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self::for_content()
    }
}

/// Google Gemini model implementation.
#[derive(Debug, Clone)]
pub struct GeminiModel {
    /// The model ID (e.g., "gemini-2.0-flash-exp").
    model_id: String,
    /// The API key for authentication.
    api_key: String,
    /// The base URL for the Gemini API.
    base_url: String,
    /// Sampling settings for every request.
    settings: GenerationSettings,
    /// HTTP client for making requests.
    client: Client,
}

impl GeminiModel {
    /// Creates a new `GeminiModel` with the key from `GEMINI_API_KEY`.
    ///
    /// # Errors
    /// Returns `ProviderError::Configuration` if the variable is not set or blank.
    pub fn new(model_id: impl Into<String>) -> Result<Self, ProviderError> {
        let api_key = env::var("GEMINI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                ProviderError::Configuration("GEMINI_API_KEY environment variable not set".to_string())
            })?;

        Ok(Self::with_api_key(model_id, api_key))
    }

    /// Creates a new `GeminiModel` with an explicit API key.
    #[must_use]
    pub fn with_api_key(model_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            api_key: api_key.into(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            settings: GenerationSettings::default(),
            client: Client::new(),
        }
    }

    /// Overrides the API base URL (used for proxies and tests).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Overrides the sampling settings.
    #[must_use]
    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    fn generation_config(&self, image_output: bool) -> GeminiGenerationConfig {
        GeminiGenerationConfig {
            temperature: self.settings.temperature,
            top_k: self.settings.top_k,
            top_p: self.settings.top_p,
            max_output_tokens: self.settings.max_output_tokens,
            response_modalities: image_output.then(|| vec!["TEXT".to_string(), "IMAGE".to_string()]),
        }
    }

    fn user_content(prompt: &str, image: Option<&ImagePayload>) -> GeminiContent {
        let mut parts = vec![GeminiPart::text(prompt)];
        if let Some(image) = image {
            parts.push(GeminiPart::inline(image));
        }
        GeminiContent { role: "user".to_string(), parts }
    }

    /// Sends one `generateContent` request and decodes the response body.
    async fn send(&self, request: &GeminiRequest) -> Result<GeminiResponse, ProviderError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model_id);

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(request)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, model_id = %self.model_id, "Failed to send request to Gemini API");
                ProviderError::Request(format!("Network error: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            error!(
                status = %status,
                error = %error_text,
                model_id = %self.model_id,
                "Gemini API returned error status"
            );
            return Err(ProviderError::from_status(PROVIDER, status.as_u16(), error_text));
        }

        response.json::<GeminiResponse>().await.map_err(|e| {
            error!(error = %e, "Failed to parse Gemini API response");
            ProviderError::MalformedResponse(format!("Failed to parse response: {}", e))
        })
    }
}

#[async_trait]
impl ContentModel for GeminiModel {
    async fn generate_content(
        &self,
        prompt: &str,
        image: Option<&ImagePayload>,
    ) -> Result<String, ProviderError> {
        debug!(
            model_id = %self.model_id,
            prompt_len = prompt.len(),
            with_image = image.is_some(),
            "GeminiModel generating content"
        );

        let request = GeminiRequest {
            contents: vec![Self::user_content(prompt, image)],
            generation_config: Some(self.generation_config(false)),
        };
        let response = self.send(&request).await?;

        let candidate = response.candidates.first().ok_or_else(|| {
            error!("No candidates in Gemini API response");
            ProviderError::MalformedResponse("No candidate returned from Gemini API".to_string())
        })?;

        let text: String = candidate
            .content
            .as_ref()
            .map(|content| content.parts.iter().filter_map(|p| p.text.as_deref()).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            error!("No text content in Gemini API response");
            return Err(ProviderError::MalformedResponse(
                "No content generated by Gemini API".to_string(),
            ));
        }

        Ok(text)
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

#[async_trait]
impl ImageModel for GeminiModel {
    async fn generate_image(&self, request: &ImageRequest) -> Result<ImagePayload, ProviderError> {
        debug!(
            model_id = %self.model_id,
            prompt_len = request.prompt.len(),
            with_reference = request.reference.is_some(),
            "GeminiModel generating image"
        );

        let body = GeminiRequest {
            contents: vec![Self::user_content(&request.prompt, request.reference.as_ref())],
            generation_config: Some(self.generation_config(true)),
        };
        let response = self.send(&body).await?;

        let candidate = response.candidates.first().ok_or_else(|| {
            error!("No candidates in Gemini Image API response");
            ProviderError::MalformedResponse("No candidate returned from Gemini Image API".to_string())
        })?;

        candidate
            .content
            .as_ref()
            .and_then(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.inline_data.as_ref())
                    .find(|data| !data.data.is_empty())
            })
            .map(|data| {
                let mime_type = data.mime_type.clone().unwrap_or_else(|| "image/png".to_string());
                ImagePayload::new(mime_type, data.data.clone())
            })
            .ok_or_else(|| {
                error!(model_id = %self.model_id, "No image part in Gemini Image API response");
                ProviderError::MalformedResponse("No image part found in response".to_string())
            })
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", alias = "inline_data")]
    inline_data: Option<GeminiInlineData>,
}

impl GeminiPart {
    fn text(text: &str) -> Self {
        Self { text: Some(text.to_string()), inline_data: None }
    }

    fn inline(image: &ImagePayload) -> Self {
        Self {
            text: None,
            inline_data: Some(GeminiInlineData {
                mime_type: Some(image.mime_type.clone()),
                data: image.data.clone(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    #[serde(alias = "mime_type", skip_serializing_if = "Option::is_none")]
    mime_type: Option<String>,
    #[serde(default)]
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

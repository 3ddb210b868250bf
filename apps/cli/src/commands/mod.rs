//! Subcommand implementations and the setup they share.

pub mod comic;
pub mod offline;
pub mod output;
pub mod progress;
pub mod snap;
pub mod story;

use anyhow::Context;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::path::{Path, PathBuf};
use visulearn_abstraction::ImagePayload;
use visulearn_core::{BatchResult, Credentials, RetryPolicy, VisuLearnConfig};
use visulearn_models::{ProviderConfig, ProviderFactory, ProviderMode, ProviderSet};

/// Settings every subcommand runs with.
#[derive(Debug)]
pub struct RunContext {
    /// Loaded configuration.
    pub config: VisuLearnConfig,
    /// Live or mock providers.
    pub mode: ProviderMode,
    /// Where results are written.
    pub output_dir: PathBuf,
}

impl RunContext {
    /// Loads the configuration file, if any.
    pub fn load(config_path: Option<&Path>, mode: ProviderMode, output_dir: PathBuf) -> anyhow::Result<Self> {
        let config = VisuLearnConfig::load(config_path).context("Failed to load configuration")?;
        Ok(Self { config, mode, output_dir })
    }

    /// Retry policy for every provider call.
    pub fn retry_policy(&self) -> RetryPolicy {
        self.config.retry_policy()
    }

    /// Builds the providers.
    ///
    /// Live providers need both API keys up front; mock providers answer
    /// every content call with `offline_content`.
    pub fn providers(&self, offline_content: impl FnOnce() -> String) -> anyhow::Result<ProviderSet> {
        let models = &self.config.models;
        let mut provider_config = ProviderConfig {
            mode: self.mode,
            content_model: models.content_model.clone(),
            image_model: models.image_model.clone(),
            voice_id: models.voice_id.clone(),
            tts_model: models.tts_model.clone(),
            gemini_base_url: self.config.providers.gemini_base_url.clone(),
            elevenlabs_base_url: self.config.providers.elevenlabs_base_url.clone(),
            ..ProviderConfig::default()
        };

        match self.mode {
            ProviderMode::Live => {
                let credentials = Credentials::from_env().context("API keys are required for live providers")?;
                provider_config = provider_config
                    .with_api_keys(credentials.gemini_api_key(), credentials.elevenlabs_api_key());
            }
            ProviderMode::Mock => {
                provider_config = provider_config.with_mock_content(offline_content());
            }
        }

        ProviderFactory::create(provider_config).context("Failed to create providers")
    }
}

/// Writes the results of a finished request and prints the summary.
pub fn finish<T: serde::Serialize>(context: &RunContext, output: &T, batch: &BatchResult) -> anyhow::Result<()> {
    let written = output::write_result(&context.output_dir, output, batch)?;
    tracing::info!(files = written.len(), dir = %context.output_dir.display(), "Results written");
    progress::render_summary(batch, &context.output_dir);
    Ok(())
}

/// Reads an image file, or a file holding a data URL, into a payload.
pub fn load_image(path: &Path) -> anyhow::Result<ImagePayload> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read image: {}", path.display()))?;

    if bytes.starts_with(b"data:") {
        let text = String::from_utf8_lossy(&bytes);
        return ImagePayload::from_data_url(text.trim())
            .with_context(|| format!("Invalid data URL in {}", path.display()));
    }

    let mime_type = mime_guess::from_path(path).first_or(mime_guess::mime::IMAGE_JPEG);
    if mime_type.type_() != mime_guess::mime::IMAGE {
        anyhow::bail!("Not an image file: {} ({})", path.display(), mime_type);
    }
    Ok(ImagePayload::new(mime_type.essence_str(), STANDARD.encode(bytes)))
}

//! `visulearn story`.

use super::{RunContext, finish, load_image, offline, progress};
use anyhow::Context;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use visulearn_core::StoryRequest;
use visulearn_orchestrator::{ProgressReporter, StoryPipeline};

/// Arguments for `visulearn story`.
#[derive(Args, Debug)]
pub struct StoryArgs {
    /// Name of the child, who is the hero
    #[arg(long)]
    pub name: String,

    /// School subject to teach (e.g. biology, physics, math)
    #[arg(long)]
    pub subject: String,

    /// Genre: adventure, fantasy, sci-fi or mystery
    #[arg(long = "type", default_value = "adventure")]
    pub story_type: String,

    /// Narration length in minutes
    #[arg(long, default_value_t = 1)]
    pub minutes: u32,

    /// Age of the child
    #[arg(long, default_value_t = 7)]
    pub age: u32,

    /// Role the child plays
    #[arg(long, default_value = "Brave Explorer")]
    pub role: String,

    /// Concept to teach (defaults per subject)
    #[arg(long)]
    pub concept: Option<String>,

    /// Where the story happens (defaults per genre)
    #[arg(long)]
    pub setting: Option<String>,

    /// Photo or drawing of the character, used as the image reference
    #[arg(long, value_name = "PATH")]
    pub character_image: Option<PathBuf>,
}

impl StoryArgs {
    fn into_request(self) -> anyhow::Result<StoryRequest> {
        let character_image = self.character_image.as_deref().map(load_image).transpose()?;
        Ok(StoryRequest {
            story_type: self.story_type,
            subject: self.subject,
            duration_minutes: self.minutes,
            age: self.age,
            child_name: self.name,
            child_role: self.role,
            learning_concept: self.concept,
            story_setting: self.setting,
            character_image,
        })
    }
}

/// Execute story command.
pub async fn execute(args: StoryArgs, context: &RunContext) -> anyhow::Result<()> {
    let request = args.into_request()?;
    request.validate()?;
    println!("{}", "visulearn story".bold().cyan());

    let providers = context.providers(|| offline::story_plan(&request))?;
    let reporter = Arc::new(ProgressReporter::new());
    let renderer = progress::spawn_renderer(reporter.subscribe(), "Story");

    let pipeline = StoryPipeline::new(&providers, context.retry_policy()).with_reporter(Arc::clone(&reporter));
    let result = pipeline.run(&request).await;
    drop(pipeline);
    drop(reporter);
    let _ = renderer.await;

    let output = result.context("Story generation failed")?;
    finish(context, &output, &output.batch)
}

//! `visulearn comic`.

use super::{RunContext, finish, load_image, offline, progress};
use anyhow::Context;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use visulearn_core::{ComicRequest, Pronouns};
use visulearn_orchestrator::{ComicPipeline, ProgressReporter};

/// Arguments for `visulearn comic`.
#[derive(Args, Debug)]
pub struct ComicArgs {
    /// Name of the child, who is the hero
    #[arg(long)]
    pub name: String,

    /// School subject to teach
    #[arg(long)]
    pub subject: String,

    /// Concept to teach
    #[arg(long)]
    pub concept: String,

    /// Genre (e.g. superhero, adventure)
    #[arg(long = "type", default_value = "superhero")]
    pub comic_type: String,

    /// Where the comic happens
    #[arg(long, default_value = "a bright, busy city")]
    pub setting: String,

    /// Exact number of panels
    #[arg(long, default_value_t = 6)]
    pub panels: usize,

    /// Age of the child
    #[arg(long, default_value_t = 8)]
    pub age: u32,

    /// Role the child plays
    #[arg(long, default_value = "Superhero")]
    pub role: String,

    /// Pronouns for dialogue: he, she, it or they
    #[arg(long, default_value = "they")]
    pub pronouns: Pronouns,

    /// Photo or drawing of the character, used as the image reference
    #[arg(long, value_name = "PATH")]
    pub character_image: Option<PathBuf>,
}

impl ComicArgs {
    fn into_request(self) -> anyhow::Result<ComicRequest> {
        let character_image = self.character_image.as_deref().map(load_image).transpose()?;
        Ok(ComicRequest {
            comic_type: self.comic_type,
            subject: self.subject,
            learning_concept: self.concept,
            comic_setting: self.setting,
            panels: self.panels,
            age: self.age,
            child_name: self.name,
            child_role: self.role,
            pronouns: self.pronouns,
            character_image,
        })
    }
}

/// Execute comic command.
pub async fn execute(args: ComicArgs, context: &RunContext) -> anyhow::Result<()> {
    let request = args.into_request()?;
    request.validate()?;
    println!("{}", "visulearn comic".bold().cyan());

    let providers = context.providers(|| offline::comic_plan(&request))?;
    let reporter = Arc::new(ProgressReporter::new());
    let renderer = progress::spawn_renderer(reporter.subscribe(), "Comic");

    let pipeline = ComicPipeline::new(&providers, context.retry_policy()).with_reporter(Arc::clone(&reporter));
    let result = pipeline.run(&request).await;
    drop(pipeline);
    drop(reporter);
    let _ = renderer.await;

    let output = result.context("Comic generation failed")?;
    println!("  {} {}", "Title:".bold(), output.title);
    finish(context, &output, &output.batch)
}

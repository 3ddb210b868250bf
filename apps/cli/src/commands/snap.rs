//! `visulearn snap`.

use super::{RunContext, finish, load_image, offline, progress};
use anyhow::Context;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use visulearn_core::SnapLearnRequest;
use visulearn_orchestrator::{ProgressReporter, SnapLearnPipeline};

/// Arguments for `visulearn snap`.
#[derive(Args, Debug)]
pub struct SnapArgs {
    /// Photo to explain (image file, or a text file holding a data URL)
    #[arg(long, value_name = "PATH")]
    pub photo: PathBuf,

    /// School subject to find a concept from
    #[arg(long, default_value = "science")]
    pub subject: String,

    /// Concept already explained for this photo (repeatable)
    #[arg(long = "previous", value_name = "CONCEPT")]
    pub previous_concepts: Vec<String>,
}

/// Execute snap command.
pub async fn execute(args: SnapArgs, context: &RunContext) -> anyhow::Result<()> {
    let request = SnapLearnRequest {
        photo: load_image(&args.photo)?,
        subject: args.subject,
        previous_concepts: args.previous_concepts,
    };
    println!("{}", "visulearn snap".bold().cyan());

    let providers = context.providers(|| offline::snap_analysis(&request))?;
    let reporter = Arc::new(ProgressReporter::new());
    let renderer = progress::spawn_renderer(reporter.subscribe(), "Explanation");

    let pipeline = SnapLearnPipeline::new(&providers, context.retry_policy()).with_reporter(Arc::clone(&reporter));
    let result = pipeline.run(&request).await;
    drop(pipeline);
    drop(reporter);
    let _ = renderer.await;

    let output = result.context("Photo explanation failed")?;
    println!("  {} {}", "Concept:".bold(), output.analysis.concept.name);
    println!("  {}", output.analysis.concept.explanation);
    finish(context, &output, &output.batch)
}

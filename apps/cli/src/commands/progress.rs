//! Terminal rendering of batch progress.

use colored::Colorize;
use std::io::{self, Write};
use std::path::Path;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use visulearn_core::{BatchProgress, BatchResult, format_duration};
use visulearn_orchestrator::ProgressEvent;

const BAR_WIDTH: usize = 40;

/// Draws a progress bar from batch events until the batch completes or the
/// reporter goes away.
pub fn spawn_renderer(mut events: broadcast::Receiver<ProgressEvent>, label: &'static str) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(ProgressEvent::BatchStarted { total, .. }) => {
                    println!("{} {} ({} units)", "▶".cyan(), label.bold(), total);
                    let _ = render_bar(&BatchProgress::new(total), 0);
                }
                Ok(ProgressEvent::UnitCompleted { progress, failed_sub_tasks, .. }) => {
                    let _ = render_bar(&progress, failed_sub_tasks);
                }
                Ok(ProgressEvent::BatchCompleted { .. }) => {
                    println!();
                    break;
                }
                Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            }
        }
    })
}

fn render_bar(progress: &BatchProgress, failed_sub_tasks: usize) -> io::Result<()> {
    let percentage = progress.percentage();
    let filled = ((BAR_WIDTH as f64 * percentage / 100.0) as usize).min(BAR_WIDTH);
    let empty = BAR_WIDTH - filled;

    // Clear current line and move to beginning
    print!("\r\x1B[K");
    print!(
        "{}{} {}/{} ({:.1}%)",
        "━".repeat(filled).green(),
        "─".repeat(empty).dimmed(),
        progress.completed(),
        progress.total(),
        percentage
    );
    if failed_sub_tasks > 0 {
        print!("  {}", format!("{} failed in last unit", failed_sub_tasks).yellow());
    }
    io::stdout().flush()
}

/// Prints what the batch produced and where it was written.
pub fn render_summary(batch: &BatchResult, output_dir: &Path) {
    let summary = &batch.summary;

    println!();
    println!("{}", "Summary".bold());
    println!("  Units:     {}", summary.total_units);
    println!("  Images:    {}", summary.units_with_image);
    println!("  Narration: {}", summary.units_with_audio);
    println!("  Elapsed:   {}", format_duration(summary.elapsed));

    if summary.is_complete_success() {
        println!("  {} Every unit is complete", "✓".green());
    } else {
        println!("  {} {} sub-task(s) failed:", "⚠".yellow(), summary.failed_sub_tasks);
        for unit in &batch.units {
            for failure in &unit.failures {
                println!(
                    "    unit {} {}: {} after {} attempt(s): {}",
                    unit.id,
                    failure.sub_task,
                    failure.kind.to_string().red(),
                    failure.attempts,
                    failure.message.dimmed()
                );
            }
        }
    }

    println!();
    println!("  {} Results written to {}", "✓".green(), output_dir.display().to_string().cyan());
}

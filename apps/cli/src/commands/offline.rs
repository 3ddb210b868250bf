//! Canned content for `--provider mock` runs.
//!
//! The mock content provider answers every planning call with one of these,
//! so a whole request can run without network access.

use serde_json::json;
use visulearn_core::{ComicRequest, SnapLearnRequest, StoryRequest};

/// A story plan with one segment per expected segment.
pub fn story_plan(request: &StoryRequest) -> String {
    let segments: Vec<_> = (1..=request.segment_count())
        .map(|id| {
            json!({
                "segment_id": id,
                "narrative_text": format!(
                    "{} the {} discovers something new about {} (part {}).",
                    request.child_name, request.child_role, request.subject, id
                ),
                "image_generation_prompt": format!(
                    "[CHARACTER] exploring {} in {}, scene {}. Vibrant cartoon style.",
                    request.subject,
                    request.resolved_setting(),
                    id
                ),
            })
        })
        .collect();
    json!(segments).to_string()
}

/// A comic plan with exactly the requested panels.
pub fn comic_plan(request: &ComicRequest) -> String {
    let panels: Vec<_> = (1..=request.panels)
        .map(|id| {
            json!({
                "panel_id": id,
                "panel_text": format!("{}: \"Panel {} of our {} adventure!\"", request.child_name, id, request.subject),
                "image_generation_prompt": format!(
                    "Comic book style illustration of {} the {} in {}, consistent character design, panel {}",
                    request.child_name, request.child_role, request.comic_setting, id
                ),
            })
        })
        .collect();
    json!({
        "title": format!("{} and the {} Mystery", request.child_name, request.subject),
        "description": request.learning_concept,
        "panels": panels,
    })
    .to_string()
}

/// An analysis naming a generic concept of the subject.
pub fn snap_analysis(request: &SnapLearnRequest) -> String {
    json!({
        "concept": {
            "name": format!("Everyday {}", request.subject),
            "explanation": format!(
                "This photo shows {} all around us. Look closely and you can spot it in everyday things!",
                request.subject
            ),
        },
        "visual_edits": {
            "arrows": [],
            "highlights": [{"area": "the main object", "color": "yellow", "style": "circle", "purpose": "show where to look"}],
            "labels": [{"text": request.subject, "position": "top center", "color": "white", "purpose": "name the subject"}],
        }
    })
    .to_string()
}

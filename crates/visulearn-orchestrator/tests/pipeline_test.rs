//! End-to-end pipeline tests with a scripted provider.

use serde_json::json;
use std::sync::Arc;
use visulearn_abstraction::{ImagePayload, ProviderError};
use visulearn_core::{
    ComicRequest, Pronouns, RetryPolicy, SnapLearnRequest, StoryRequest, UnitKind, VisuLearnError,
};
use visulearn_models::{MockCall, MockModel, ProviderSet};
use visulearn_orchestrator::{ComicPipeline, SnapLearnPipeline, StoryPipeline};

fn providers(mock: &Arc<MockModel>) -> ProviderSet {
    ProviderSet::from_mock(Arc::clone(mock))
}

fn story_request(minutes: u32, character_image: Option<ImagePayload>) -> StoryRequest {
    StoryRequest {
        story_type: "adventure".to_string(),
        subject: "biology".to_string(),
        duration_minutes: minutes,
        age: 7,
        child_name: "Mia".to_string(),
        child_role: "Brave Explorer".to_string(),
        learning_concept: None,
        story_setting: None,
        character_image,
    }
}

fn comic_request(panels: usize) -> ComicRequest {
    ComicRequest {
        comic_type: "superhero".to_string(),
        subject: "physics".to_string(),
        learning_concept: "Gravity pulls things down".to_string(),
        comic_setting: "a rooftop".to_string(),
        panels,
        age: 9,
        child_name: "Sam".to_string(),
        child_role: "Inventor".to_string(),
        pronouns: Pronouns::He,
        character_image: None,
    }
}

fn story_plan(count: u32) -> String {
    let segments: Vec<_> = (1..=count)
        .map(|id| {
            json!({
                "segment_id": id,
                "narrative_text": format!("Part {} of the jungle walk.", id),
                "image_generation_prompt": format!("[CHARACTER] looks at leaves, scene {}", id),
            })
        })
        .collect();
    format!("Here is your story:\n```json\n{}\n```", serde_json::to_string_pretty(&segments).unwrap())
}

fn comic_plan(count: u32) -> String {
    let panels: Vec<_> = (1..=count)
        .map(|id| {
            json!({
                "panel_id": id,
                "panel_text": format!("Sam: \"Panel {}!\"", id),
                "image_generation_prompt": format!("Comic book style, consistent character design, Sam on a rooftop {}", id),
            })
        })
        .collect();
    json!({"title": "Sam and the Falling Apple", "description": "Gravity", "panels": panels}).to_string()
}

#[tokio::test]
async fn test_story_renders_character_and_narrates_every_segment() {
    let mock = Arc::new(MockModel::new("mock"));
    mock.push_content(Ok(story_plan(4)));
    let photo = ImagePayload::new("image/png", "aGVsbG8=");

    let pipeline = StoryPipeline::new(&providers(&mock), RetryPolicy::default());
    let output = pipeline.run(&story_request(1, Some(photo.clone()))).await.unwrap();

    let units = &output.batch.units;
    assert_eq!(units.len(), 4);
    assert!(units.iter().all(|u| u.kind == UnitKind::Story && u.is_complete()));
    assert_eq!(units[3].source_text, "Part 4 of the jungle walk.");

    let calls = mock.calls();
    assert!(matches!(&calls[0], MockCall::Content { with_image: false, .. }));
    assert_eq!(
        calls[1],
        MockCall::Image {
            prompt: "Mia the Brave Explorer looks at leaves, scene 1".to_string(),
            reference: Some(photo),
        }
    );
    assert_eq!(calls[2], MockCall::Speech { text: "Part 1 of the jungle walk.".to_string() });
    assert_eq!(mock.image_calls(), 4);
    assert_eq!(mock.speech_calls(), 4);
}

#[tokio::test]
async fn test_story_pads_short_plan_to_segment_count() {
    let mock = Arc::new(MockModel::new("mock"));
    mock.push_content(Ok(story_plan(5)));

    let pipeline = StoryPipeline::new(&providers(&mock), RetryPolicy::default());
    let output = pipeline.run(&story_request(2, None)).await.unwrap();

    let ids: Vec<u32> = output.batch.units.iter().map(|u| u.id).collect();
    assert_eq!(ids, (1..=8).collect::<Vec<_>>());
    assert_eq!(pipeline.reporter().snapshot().completed(), 8);
}

#[tokio::test]
async fn test_unreadable_plan_aborts_before_any_unit() {
    let mock = Arc::new(MockModel::new("mock"));
    mock.push_content(Ok("Once upon a time, there was no JSON.".to_string()));

    let pipeline = StoryPipeline::new(&providers(&mock), RetryPolicy::default());
    let err = pipeline.run(&story_request(1, None)).await.unwrap_err();

    assert!(matches!(err, VisuLearnError::Precondition(_)));
    assert_eq!(mock.image_calls(), 0);
    assert_eq!(mock.speech_calls(), 0);
    assert_eq!(pipeline.reporter().snapshot().completed(), 0);
}

#[tokio::test]
async fn test_failed_planning_call_is_precondition_failure() {
    let mock = Arc::new(MockModel::new("mock"));
    mock.push_content(Err(ProviderError::from_status("gemini", 401, "bad key")));

    let pipeline = ComicPipeline::new(&providers(&mock), RetryPolicy::default());
    let err = pipeline.run(&comic_request(3)).await.unwrap_err();

    assert!(matches!(err, VisuLearnError::Precondition(_)));
    assert!(err.to_string().contains("authentication failed"));
    assert_eq!(mock.calls().len(), 1);
}

#[tokio::test]
async fn test_story_planning_server_error_aborts_before_any_unit() {
    let mock = Arc::new(MockModel::new("mock"));
    mock.push_content(Err(ProviderError::from_status("gemini", 500, "boom")));

    let pipeline = StoryPipeline::new(&providers(&mock), RetryPolicy::default());
    let err = pipeline.run(&story_request(1, None)).await.unwrap_err();

    assert!(matches!(err, VisuLearnError::Precondition(_)));
    assert!(err.to_string().contains("boom"));
    assert_eq!(mock.image_calls(), 0);
    assert_eq!(mock.speech_calls(), 0);
    assert_eq!(pipeline.reporter().snapshot().completed(), 0);
}

#[tokio::test]
async fn test_invalid_request_makes_no_calls() {
    let mock = Arc::new(MockModel::new("mock"));

    let pipeline = ComicPipeline::new(&providers(&mock), RetryPolicy::default());
    let err = pipeline.run(&comic_request(0)).await.unwrap_err();

    assert!(matches!(err, VisuLearnError::Configuration(_)));
    assert!(mock.calls().is_empty());
}

#[tokio::test]
async fn test_overlong_story_makes_no_calls() {
    let mock = Arc::new(MockModel::new("mock"));

    let pipeline = StoryPipeline::new(&providers(&mock), RetryPolicy::default());
    let err = pipeline.run(&story_request(u32::MAX, None)).await.unwrap_err();

    assert!(matches!(err, VisuLearnError::Configuration(_)));
    assert!(mock.calls().is_empty());
}

#[tokio::test]
async fn test_comic_truncates_extra_panels() {
    let mock = Arc::new(MockModel::new("mock"));
    mock.push_content(Ok(comic_plan(8)));

    let pipeline = ComicPipeline::new(&providers(&mock), RetryPolicy::default());
    let output = pipeline.run(&comic_request(6)).await.unwrap();

    assert_eq!(output.title, "Sam and the Falling Apple");
    assert_eq!(output.batch.units.len(), 6);
    assert_eq!(output.batch.units.iter().map(|u| u.id).collect::<Vec<_>>(), vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(mock.image_calls(), 6);
    assert_eq!(mock.speech_calls(), 0);
}

#[tokio::test]
async fn test_comic_pads_missing_panels() {
    let mock = Arc::new(MockModel::new("mock"));
    mock.push_content(Ok(comic_plan(4)));

    let pipeline = ComicPipeline::new(&providers(&mock), RetryPolicy::default());
    let output = pipeline.run(&comic_request(6)).await.unwrap();

    let units = &output.batch.units;
    assert_eq!(units.len(), 6);
    assert_eq!(units[4].source_text, "Sam: \"Let's continue our adventure!\"");
    assert_eq!(units[5].id, 6);
    assert!(units.iter().all(|u| u.has_image()));
    assert_eq!(output.batch.summary.units_with_image, 6);
}

#[tokio::test]
async fn test_snap_learn_annotates_photo_and_narrates_concept() {
    let mock = Arc::new(MockModel::new("mock"));
    let analysis = json!({
        "concept": {
            "name": "Light and Shadows",
            "explanation": "Light travels in straight lines, so objects block it and make shadows."
        },
        "visual_edits": {
            "arrows": [{"direction": "from lamp to cup", "position": "top left", "color": "yellow", "purpose": "show light"}],
            "highlights": [],
            "labels": [{"text": "Shadow", "position": "under the cup", "color": "white", "purpose": "name it"}]
        }
    });
    mock.push_content(Ok(analysis.to_string()));
    let photo = ImagePayload::new("image/jpeg", "aGVsbG8=");

    let pipeline = SnapLearnPipeline::new(&providers(&mock), RetryPolicy::default());
    let request = SnapLearnRequest {
        photo: photo.clone(),
        subject: "physics".to_string(),
        previous_concepts: Vec::new(),
    };
    let output = pipeline.run(&request).await.unwrap();

    assert_eq!(output.analysis.concept.name, "Light and Shadows");
    assert_eq!(output.batch.units.len(), 1);
    let unit = &output.batch.units[0];
    assert_eq!(unit.kind, UnitKind::Explanation);
    assert!(unit.is_complete());

    let calls = mock.calls();
    assert!(matches!(&calls[0], MockCall::Content { with_image: true, .. }));
    match &calls[1] {
        MockCall::Image { prompt, reference } => {
            assert_eq!(reference.as_ref(), Some(&photo));
            assert!(prompt.contains("Shadow"));
        }
        other => panic!("expected image call, got {:?}", other),
    }
    assert_eq!(
        calls[2],
        MockCall::Speech {
            text: "Light travels in straight lines, so objects block it and make shadows.".to_string()
        }
    );
}

//! Retry behaviour against a provider trait object, on a paused clock.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;
use visulearn_abstraction::{AudioPayload, ProviderError, SpeechModel};
use visulearn_core::{CallOutcome, RetryPolicy, RetryingCaller};

/// Speech provider that replays a fixed list of HTTP statuses.
struct ScriptedSpeech {
    statuses: Mutex<VecDeque<u16>>,
    calls: Mutex<Vec<Duration>>,
    start: Instant,
}

impl ScriptedSpeech {
    fn new(statuses: &[u16]) -> Self {
        Self {
            statuses: Mutex::new(statuses.iter().copied().collect()),
            calls: Mutex::new(Vec::new()),
            start: Instant::now(),
        }
    }

    fn call_times(&self) -> Vec<Duration> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechModel for ScriptedSpeech {
    async fn synthesize(&self, _text: &str) -> Result<AudioPayload, ProviderError> {
        self.calls.lock().unwrap().push(self.start.elapsed());
        let status = self.statuses.lock().unwrap().pop_front().unwrap_or(200);
        if status == 200 {
            Ok(AudioPayload::new("audio/mpeg", b"ID3".to_vec()))
        } else {
            Err(ProviderError::from_status("elevenlabs", status, ""))
        }
    }

    fn voice_id(&self) -> &str {
        "scripted"
    }
}

#[tokio::test(start_paused = true)]
async fn test_three_rate_limits_then_success() {
    let speech = ScriptedSpeech::new(&[429, 429, 429, 200]);
    let caller = RetryingCaller::new(RetryPolicy::new(3, Duration::from_millis(2000)));

    let report = caller.call_counted(|| speech.synthesize("Hello")).await;

    assert!(report.result.is_ok());
    assert_eq!(report.attempts, 4);
    assert_eq!(
        speech.call_times(),
        vec![
            Duration::ZERO,
            Duration::from_millis(2000),
            Duration::from_millis(6000),
            Duration::from_millis(14000),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_unauthorized_fails_fast() {
    let speech = ScriptedSpeech::new(&[401, 200]);
    let caller = RetryingCaller::default();

    let outcome = caller.call_outcome(|| speech.synthesize("Hello")).await;

    assert!(matches!(outcome, CallOutcome::Failure { retryable: false, .. }));
    assert_eq!(speech.call_times().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_server_error_after_rate_limit_stops_retrying() {
    let speech = ScriptedSpeech::new(&[429, 500, 200]);
    let caller = RetryingCaller::default();

    let result = caller.call(|| speech.synthesize("Hello")).await;

    assert_eq!(result.unwrap_err().status(), Some(500));
    assert_eq!(speech.call_times(), vec![Duration::ZERO, Duration::from_millis(2000)]);
}

#[tokio::test(start_paused = true)]
async fn test_exhaustion_returns_last_error() {
    let speech = ScriptedSpeech::new(&[429, 429, 429]);
    let caller = RetryingCaller::new(RetryPolicy::new(2, Duration::from_millis(100)));

    let report = caller.call_counted(|| speech.synthesize("Hello")).await;

    assert_eq!(report.attempts, 3);
    assert!(matches!(report.result, Err(ProviderError::RateLimited { .. })));
    assert_eq!(
        speech.call_times(),
        vec![Duration::ZERO, Duration::from_millis(100), Duration::from_millis(300)]
    );
}

mod common;

use std::{
    sync::{Arc, atomic::AtomicUsize, atomic::Ordering},
    time::{Duration, Instant},
};

use spectro_backend::message::ReplyOrigin;
use spectro_backend::services::chatbot::ChatService;
use spectro_backend::services::knowledge::KnowledgeBase;
use spectro_backend::services::matcher::KeywordMatcher;
use spectro_backend::services::provider::ProviderClient;

use common::{completion_body, sample_lessons, spawn_provider_stub, spawn_stalled_provider_stub};

fn service(provider: Option<ProviderClient>) -> ChatService {
    ChatService::new(
        Arc::new(KnowledgeBase::new(sample_lessons())),
        Box::new(KeywordMatcher::new()),
        provider,
    )
}

fn client_for(addr: std::net::SocketAddr, timeout: Duration) -> ProviderClient {
    ProviderClient::new(
        format!("http://{addr}/v1"),
        "test-key".to_string(),
        "gpt-4".to_string(),
        timeout,
    )
    .unwrap()
}

#[tokio::test]
async fn provider_reply_is_used_when_the_call_succeeds() {
    let hits = Arc::new(AtomicUsize::new(0));
    let addr = spawn_provider_stub(
        200,
        &completion_body("Calibration ties spectra to lab reference values."),
        Arc::clone(&hits),
    )
    .await;

    let svc = service(Some(client_for(addr, Duration::from_secs(2))));
    let outcome = svc.answer("how do I build a calibration model?", &[]).await;

    assert_eq!(outcome.origin, ReplyOrigin::Provider);
    assert_eq!(outcome.reply, "Calibration ties spectra to lab reference values.");
    assert!(outcome.sources.contains(&"Calibration Model Development".to_string()));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn provider_error_degrades_to_the_local_answer() {
    let hits = Arc::new(AtomicUsize::new(0));
    let addr = spawn_provider_stub(500, r#"{"error": "boom"}"#, Arc::clone(&hits)).await;

    let svc = service(Some(client_for(addr, Duration::from_secs(2))));
    let outcome = svc.answer("how do I build a calibration model?", &[]).await;

    assert_eq!(outcome.origin, ReplyOrigin::KnowledgeBase);
    assert!(outcome.reply.contains("PLS regression"));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn garbage_provider_payload_degrades_to_the_local_answer() {
    let hits = Arc::new(AtomicUsize::new(0));
    let addr = spawn_provider_stub(200, "not json at all", Arc::clone(&hits)).await;

    let svc = service(Some(client_for(addr, Duration::from_secs(2))));
    let outcome = svc.answer("tell me about the detector", &[]).await;

    assert_eq!(outcome.origin, ReplyOrigin::KnowledgeBase);
    assert!(outcome.reply.contains("signal-to-noise"));
}

#[tokio::test]
async fn stalled_provider_times_out_and_falls_back() {
    let hits = Arc::new(AtomicUsize::new(0));
    let addr = spawn_stalled_provider_stub(Arc::clone(&hits)).await;

    let svc = service(Some(client_for(addr, Duration::from_secs(1))));

    let started = Instant::now();
    let outcome = svc.answer("how do I build a calibration model?", &[]).await;
    let elapsed = started.elapsed();

    assert_eq!(outcome.origin, ReplyOrigin::KnowledgeBase);
    assert!(
        elapsed < Duration::from_secs(5),
        "fallback took too long: {elapsed:?}"
    );
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn disabled_provider_is_fully_deterministic() {
    let svc = service(None);

    let first = svc.answer("what detector should I pick?", &[]).await;
    let second = svc.answer("what detector should I pick?", &[]).await;

    assert_eq!(first.origin, ReplyOrigin::KnowledgeBase);
    assert_eq!(first.reply, second.reply);
    assert_eq!(first.sources, second.sources);
    assert_eq!(first.matched_score, second.matched_score);
}

#[tokio::test]
async fn week_query_answers_from_that_week() {
    let svc = service(None);

    let outcome = svc.answer("what do we learn in week 3?", &[]).await;
    assert_eq!(outcome.origin, ReplyOrigin::KnowledgeBase);
    assert_eq!(outcome.sources[0], "Calibration Model Development");
    // The matched lesson carries a video, which the fallback surfaces.
    assert!(outcome.reply.contains("https://cdn.example.com/intro.mp4"));
}

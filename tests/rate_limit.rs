//! Admission rate under concurrent load.

mod integration;

use integration::mock_server::{MockServerFixture, GENERATE_OK};
use ollama_lib_rust::types::GenerateRequest;
use ollama_lib_rust::{CallContext, RateLimiter};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[tokio::test(start_paused = true)]
async fn test_concurrent_admissions_respect_rate_and_burst() {
    const RPS: f64 = 10.0;
    const CALLERS: usize = 50;

    let limiter = Arc::new(RateLimiter::from_rps(RPS).unwrap());
    let start = tokio::time::Instant::now();

    let mut handles = Vec::new();
    for _ in 0..CALLERS {
        let limiter = limiter.clone();
        handles.push(tokio::spawn(async move {
            limiter.acquire(&CallContext::new()).await.unwrap();
            start.elapsed()
        }));
    }

    let mut admitted = Vec::new();
    for h in handles {
        admitted.push(h.await.unwrap());
    }
    admitted.sort();

    // the k-th admission (1-based) cannot precede (k - burst) / rps
    for (i, at) in admitted.iter().enumerate() {
        let earliest = ((i + 1) as f64 - RPS).max(0.0) / RPS;
        assert!(
            at.as_secs_f64() + 1e-3 >= earliest,
            "admission {} at {:?}, earliest {}",
            i + 1,
            at,
            earliest
        );
    }

    // the limiter does not hold callers back much beyond the rate either
    let last = admitted.last().unwrap().as_secs_f64();
    let ideal = (CALLERS as f64 - RPS) / RPS;
    assert!(last >= ideal - 1e-3 && last <= ideal + 0.5, "last admission at {last}s");
}

#[tokio::test]
async fn test_client_calls_share_one_limiter() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_json("POST", "/api/generate", 200, GENERATE_OK, 30)
        .await;

    let client = fixture.builder().rate_limit(20.0).build().unwrap();
    let start = Instant::now();

    let calls = (0..30).map(|_| {
        let client = client.clone();
        tokio::spawn(async move { client.generate(GenerateRequest::new("llama2", "hi")).await })
    });
    for call in futures::future::join_all(calls).await {
        call.unwrap().unwrap();
    }

    // 20 from the burst, 10 more at 50ms apiece
    assert!(start.elapsed() >= Duration::from_millis(450));
    mock.assert_async().await;
}

mod common;

use blastari_client::{BlastariClient, MemoryStorage, SubredditRequest};
use blastari_server::router;
use common::test_app;
use std::collections::HashSet;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::net::TcpListener;

/// Drives a served router through the client the way the dashboard does:
/// analyze a new site, then ask for subreddits twice more with forced
/// regeneration.
#[tokio::test]
async fn test_new_site_campaign_flow() {
    let app = test_app().await;
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let service = router(app.state.clone());
    tokio::spawn(async move {
        axum::serve(listener, service).await.unwrap();
    });

    let mut client = BlastariClient::new(
        &format!("http://{addr}"),
        MemoryStorage::new(),
        Duration::from_secs(10),
    )
    .unwrap();

    let analysis = client.analyze_website("example.com").await.unwrap();
    assert!(!analysis.cached);
    assert_eq!(analysis.analysis.url, "https://example.com");
    client.analyze_website("example.com").await.unwrap();
    assert_eq!(
        app.state
            .db
            .count_website_analyses("https://example.com")
            .await
            .unwrap(),
        1
    );
    assert_eq!(app.llm.analysis_calls.load(Ordering::SeqCst), 1);

    let mut request = SubredditRequest {
        website_url: "example.com".to_string(),
        ..SubredditRequest::default()
    };
    let initial = client.analyze_subreddits(&request).await.unwrap();
    assert!(!initial.subreddits.is_empty());
    assert!(initial.subreddits.len() <= 15);
    assert!(initial.subreddits.iter().all(|s| !s.name.starts_with("r/")));

    request.force_regenerate = true;
    let first: HashSet<String> = client
        .analyze_subreddits(&request)
        .await
        .unwrap()
        .subreddits
        .into_iter()
        .map(|s| s.name)
        .collect();
    let second: HashSet<String> = client
        .analyze_subreddits(&request)
        .await
        .unwrap()
        .subreddits
        .into_iter()
        .map(|s| s.name)
        .collect();
    let initial: HashSet<String> = initial.subreddits.into_iter().map(|s| s.name).collect();

    assert!(!first.is_empty() && !second.is_empty());
    assert!(first.is_disjoint(&second));
    assert!(first.is_disjoint(&initial));
    assert!(second.is_disjoint(&initial));
}

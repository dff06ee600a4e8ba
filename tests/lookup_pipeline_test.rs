//! End-to-end lookup tests.
//!
//! Content is loaded from a stubbed forum, looked up against stubbed catalog
//! APIs, and the reply posted back is checked.

mod common;

use assert_matches::assert_matches;
use common::{
    mount_iron_claw, mount_no_results, mount_reply, mount_topic, next_event, posted_replies,
    TestHarness, TVDB_KEY,
};
use mediabot::jobs::LookupOutcome;
use mediabot_common::{ContentRef, Error, LookupRequest, MediaType};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn tagged_topic_gets_movie_reply() {
    let harness = TestHarness::new().await;
    mount_iron_claw(&harness.catalog, 1).await;
    mount_topic(&harness.forum, 12, "The Iron Claw (2023)", &["movie"]).await;
    mount_reply(&harness.forum, 1).await;

    let mut events = harness.events();
    harness.ctx.queue.submit(ContentRef::topic(12u64)).await.unwrap();

    let event = next_event(&mut events).await;
    assert_eq!(event.outcome, LookupOutcome::Replied { found: true });

    let replies = posted_replies(&harness.forum).await;
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0]["topic_id"], 12);
    assert!(replies[0].get("reply_to_post_number").is_none());

    let raw = replies[0]["raw"].as_str().unwrap();
    assert!(raw.contains("**The Iron Claw (2023)**"));
    assert!(raw.contains("https://image.tmdb.org/t/p/w500/ironclaw.jpg"));
    assert!(raw.contains("Zac Efron"));
    assert!(!raw.contains("Maura Tierney"), "cast is capped at three");
    assert!(raw.contains("Drama"));
}

#[tokio::test]
async fn inline_command_in_reply_post_answers_that_post() {
    let harness = TestHarness::new().await;

    Mock::given(method("GET"))
        .and(path("/posts/40.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 40, "topic_id": 7, "post_number": 3,
            "raw": "Has anyone seen this?\n!tv Severance", "username": "bob"
        })))
        .mount(&harness.forum)
        .await;
    Mock::given(method("GET"))
        .and(path("/t/7.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 7, "tags": []})))
        .mount(&harness.forum)
        .await;
    mount_reply(&harness.forum, 1).await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("query", "Severance"))
        .and(query_param("type", "series"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": [{"id": "series-371980", "tvdb_id": "371980"}]})),
        )
        .expect(1)
        .mount(&harness.catalog)
        .await;
    Mock::given(method("GET"))
        .and(path("/series/371980/extended"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {
            "id": 371980,
            "name": "Severance",
            "firstAired": "2022-02-18",
            "overview": "Mark leads a team of office workers.",
            "score": 8.7,
            "genres": [{"name": "Drama"}, {"name": "Thriller"}],
            "characters": [{"personName": "Adam Scott", "name": "Mark Scout"}],
            "averageRuntime": 55
        }})))
        .expect(1)
        .mount(&harness.catalog)
        .await;

    let mut events = harness.events();
    harness.ctx.queue.submit(ContentRef::post(40u64)).await.unwrap();

    let event = next_event(&mut events).await;
    assert_eq!(event.outcome, LookupOutcome::Replied { found: true });

    let replies = posted_replies(&harness.forum).await;
    assert_eq!(replies[0]["topic_id"], 7);
    assert_eq!(replies[0]["reply_to_post_number"], 3);
    let raw = replies[0]["raw"].as_str().unwrap();
    assert!(raw.contains("**Severance (2022)**"));
    assert!(raw.contains("Adam Scott"));
}

#[tokio::test]
async fn repeated_lookup_is_served_from_cache() {
    let harness = TestHarness::new().await;
    mount_iron_claw(&harness.catalog, 1).await;
    mount_topic(&harness.forum, 12, "The Iron Claw (2023)", &["movie"]).await;
    mount_topic(&harness.forum, 13, "the iron claw", &["movie"]).await;
    mount_reply(&harness.forum, 2).await;

    let mut events = harness.events();
    harness.ctx.queue.submit(ContentRef::topic(12u64)).await.unwrap();
    assert_eq!(
        next_event(&mut events).await.outcome,
        LookupOutcome::Replied { found: true }
    );

    harness.ctx.queue.submit(ContentRef::topic(13u64)).await.unwrap();
    assert_eq!(
        next_event(&mut events).await.outcome,
        LookupOutcome::Replied { found: true }
    );

    let replies = posted_replies(&harness.forum).await;
    assert_eq!(replies[0]["raw"], replies[1]["raw"]);
}

#[tokio::test]
async fn empty_search_replies_not_found_and_is_not_cached() {
    let harness = TestHarness::new().await;
    mount_no_results(&harness.catalog, "Nonexistent Film", 2).await;
    mount_topic(&harness.forum, 20, "!movie Nonexistent Film", &[]).await;
    mount_reply(&harness.forum, 2).await;

    let mut events = harness.events();
    for _ in 0..2 {
        harness.ctx.queue.submit(ContentRef::topic(20u64)).await.unwrap();
        assert_eq!(
            next_event(&mut events).await.outcome,
            LookupOutcome::Replied { found: false }
        );
    }

    let replies = posted_replies(&harness.forum).await;
    assert_eq!(
        replies[0]["raw"],
        "Sorry, I couldn't find any information about that title."
    );
}

#[tokio::test]
async fn exhausted_budget_fails_without_network_call() {
    let harness = TestHarness::with_config(|config| {
        config.services.tmdb.budget = Some(1);
        config.services.tmdb.window_secs = Some(3600);
    })
    .await;
    mount_iron_claw(&harness.catalog, 1).await;
    Mock::given(method("GET"))
        .and(path("/search/movie"))
        .and(query_param("query", "Heat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .expect(0)
        .mount(&harness.catalog)
        .await;

    let fetcher = &harness.ctx.fetcher;
    let first = fetcher
        .fetch(&LookupRequest::new(MediaType::Movie, "The Iron Claw", Some(2023), "en-US"))
        .await
        .unwrap();
    assert!(first.is_some());

    let err = fetcher
        .fetch(&LookupRequest::new(MediaType::Movie, "Heat", None, "en-US"))
        .await
        .unwrap_err();
    assert_matches!(err, Error::RateLimit { ref service, .. } if service == "tmdb");

    // Cached results stay available once the budget is spent.
    let cached = fetcher
        .fetch(&LookupRequest::new(MediaType::Movie, "The Iron Claw", None, "en-US"))
        .await
        .unwrap();
    assert_eq!(cached, first);
}

#[tokio::test]
async fn untagged_topic_is_ignored() {
    let harness = TestHarness::new().await;
    mount_topic(&harness.forum, 30, "The Iron Claw (2023)", &["music"]).await;
    mount_reply(&harness.forum, 0).await;

    let mut events = harness.events();
    harness.ctx.queue.submit(ContentRef::topic(30u64)).await.unwrap();
    assert_eq!(next_event(&mut events).await.outcome, LookupOutcome::Ignored);
}

#[tokio::test]
async fn catalog_failure_drops_lookup_and_records_error() {
    let harness = TestHarness::new().await;
    Mock::given(method("GET"))
        .and(path("/search/movie"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "status_message": "Invalid API key: You must be granted a valid key."
        })))
        .mount(&harness.catalog)
        .await;
    mount_topic(&harness.forum, 40, "!movie Heat", &[]).await;
    mount_reply(&harness.forum, 0).await;

    let mut events = harness.events();
    harness.ctx.queue.submit(ContentRef::topic(40u64)).await.unwrap();
    assert_eq!(
        next_event(&mut events).await.outcome,
        LookupOutcome::Dropped {
            kind: mediabot_common::ErrorKind::Api
        }
    );

    let errors = harness.ctx.errors.recent(10);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, mediabot_common::ErrorKind::Api);
    assert_eq!(errors[0].context.get("title").map(String::as_str), Some("Heat"));
}

#[tokio::test]
async fn detail_server_error_drops_lookup_without_caching() {
    let harness = TestHarness::new().await;
    Mock::given(method("GET"))
        .and(path("/search/movie"))
        .and(query_param("query", "The Iron Claw"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"results": [{"id": 850165}]})),
        )
        .expect(2)
        .mount(&harness.catalog)
        .await;
    Mock::given(method("GET"))
        .and(path("/movie/850165"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .expect(2)
        .mount(&harness.catalog)
        .await;
    mount_topic(&harness.forum, 50, "!movie The Iron Claw", &[]).await;
    mount_reply(&harness.forum, 0).await;

    let mut events = harness.events();
    harness.ctx.queue.submit(ContentRef::topic(50u64)).await.unwrap();
    assert_eq!(
        next_event(&mut events).await.outcome,
        LookupOutcome::Dropped {
            kind: mediabot_common::ErrorKind::Api
        }
    );
    assert!(posted_replies(&harness.forum).await.is_empty());

    // The failed lookup left no cache entry: asking again goes upstream.
    let err = harness
        .ctx
        .fetcher
        .fetch(&LookupRequest::new(MediaType::Movie, "The Iron Claw", None, "en-US"))
        .await
        .unwrap_err();
    assert_matches!(
        err,
        Error::Api { ref service, status: Some(503), .. } if service == "tmdb"
    );
}

#[tokio::test]
async fn tvdb_search_unauthorized_is_api_error() {
    let harness = TestHarness::new().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(header("Authorization", format!("Bearer {TVDB_KEY}").as_str()))
        .and(query_param("type", "series"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "status": "failure", "message": "Unauthorized"
        })))
        .expect(1)
        .mount(&harness.catalog)
        .await;

    let err = harness
        .ctx
        .fetcher
        .fetch(&LookupRequest::new(MediaType::Tv, "Severance", None, "en-US"))
        .await
        .unwrap_err();
    assert_matches!(
        err,
        Error::Api { ref service, status: Some(401), .. } if service == "tvdb"
    );
}

#[tokio::test]
async fn tvdb_missing_series_detail_is_api_error() {
    let harness = TestHarness::new().await;
    let bearer = format!("Bearer {TVDB_KEY}");
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(header("Authorization", bearer.as_str()))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": [{"tvdb_id": "371980"}]})),
        )
        .expect(1)
        .mount(&harness.catalog)
        .await;
    Mock::given(method("GET"))
        .and(path("/series/371980/extended"))
        .and(header("Authorization", bearer.as_str()))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&harness.catalog)
        .await;

    let err = harness
        .ctx
        .fetcher
        .fetch(&LookupRequest::new(MediaType::Tv, "Severance", None, "en-US"))
        .await
        .unwrap_err();
    assert_matches!(
        err,
        Error::Api { ref service, status: Some(404), .. } if service == "tvdb"
    );
}

#[tokio::test]
async fn non_json_success_body_is_api_error() {
    let harness = TestHarness::new().await;
    Mock::given(method("GET"))
        .and(path("/search/movie"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string("<html><body>Maintenance</body></html>"),
        )
        .expect(1)
        .mount(&harness.catalog)
        .await;

    let err = harness
        .ctx
        .fetcher
        .fetch(&LookupRequest::new(MediaType::Movie, "Heat", None, "en-US"))
        .await
        .unwrap_err();
    assert_matches!(
        err,
        Error::Api { ref service, status: None, ref message } if service == "tmdb" && message.contains("invalid JSON")
    );
}

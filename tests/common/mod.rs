//! Shared test harness for integration tests.
//!
//! [`TestHarness`] starts two wiremock servers, one standing in for the
//! catalog APIs (TMDB and TVDB share it) and one for the forum, and builds a
//! full [`AppContext`] pointed at them. [`TestHarness::serve`] starts Axum on
//! a random port for HTTP-level testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use mediabot::config::Config;
use mediabot::forum::DiscourseForum;
use mediabot::jobs::LookupEvent;
use mediabot::server::{create_router, AppContext};
use mediabot_common::SystemClock;
use serde_json::{json, Value};
use tokio::sync::broadcast;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TMDB_KEY: &str = "tmdb-test-key";
pub const TVDB_KEY: &str = "tvdb-test-key";
pub const FORUM_KEY: &str = "forum-test-key";

pub struct TestHarness {
    pub ctx: AppContext,
    pub catalog: MockServer,
    pub forum: MockServer,
}

impl TestHarness {
    /// Harness with default settings and no reply or retry delay.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Harness whose config is adjusted by `customize` before the context is
    /// built.
    pub async fn with_config(customize: impl FnOnce(&mut Config)) -> Self {
        Self::with_options(customize, None).await
    }

    /// Like [`with_config`](Self::with_config), persisting admin settings
    /// changes to `config_path`.
    pub async fn with_options(
        customize: impl FnOnce(&mut Config),
        config_path: Option<PathBuf>,
    ) -> Self {
        let catalog = MockServer::start().await;
        let forum = MockServer::start().await;

        let mut config = Config::default();
        config.services.tmdb.api_key = Some(TMDB_KEY.into());
        config.services.tmdb.base_url = Some(catalog.uri());
        config.services.tvdb.api_key = Some(TVDB_KEY.into());
        config.services.tvdb.base_url = Some(catalog.uri());
        config.forum.base_url = forum.uri();
        config.forum.api_key = Some(FORUM_KEY.into());
        config.forum.timeout_secs = 5;
        config.bot.retry_delay_secs = 0;
        customize(&mut config);

        let discourse = DiscourseForum::new(&config.forum).expect("forum client");
        let ctx = AppContext::build(config, config_path, Arc::new(discourse), Arc::new(SystemClock))
            .expect("failed to build app context");

        Self {
            ctx,
            catalog,
            forum,
        }
    }

    pub fn router(&self) -> Router {
        create_router(self.ctx.clone())
    }

    /// Start an Axum server on a random port and return its address.
    pub async fn serve(&self) -> SocketAddr {
        let app = self.router();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        addr
    }

    pub fn events(&self) -> broadcast::Receiver<LookupEvent> {
        self.ctx.queue.subscribe()
    }
}

/// Wait for the next finished lookup attempt.
pub async fn next_event(events: &mut broadcast::Receiver<LookupEvent>) -> LookupEvent {
    tokio::time::timeout(Duration::from_secs(10), events.recv())
        .await
        .expect("timed out waiting for lookup")
        .expect("event channel closed")
}

// ---------------------------------------------------------------------------
// Catalog fixtures
// ---------------------------------------------------------------------------

pub fn iron_claw_detail() -> Value {
    json!({
        "id": 850165,
        "title": "The Iron Claw",
        "release_date": "2023-12-22",
        "overview": "The true story of the inseparable Von Erich brothers.",
        "poster_path": "/ironclaw.jpg",
        "vote_average": 7.4,
        "runtime": 132,
        "genres": [{"id": 18, "name": "Drama"}, {"id": 36, "name": "History"}],
        "credits": {"cast": [
            {"name": "Zac Efron", "character": "Kevin Von Erich"},
            {"name": "Jeremy Allen White", "character": "Kerry Von Erich"},
            {"name": "Harris Dickinson", "character": "David Von Erich"},
            {"name": "Maura Tierney", "character": "Doris Adkisson"}
        ]}
    })
}

/// Mount TMDB search and detail responses for "The Iron Claw", each
/// expected `times` times.
pub async fn mount_iron_claw(catalog: &MockServer, times: u64) {
    Mock::given(method("GET"))
        .and(path("/search/movie"))
        .and(query_param("api_key", TMDB_KEY))
        .and(query_param("query", "The Iron Claw"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"results": [{"id": 850165}]})),
        )
        .expect(times)
        .mount(catalog)
        .await;

    Mock::given(method("GET"))
        .and(path("/movie/850165"))
        .and(query_param("append_to_response", "credits"))
        .respond_with(ResponseTemplate::new(200).set_body_json(iron_claw_detail()))
        .expect(times)
        .mount(catalog)
        .await;
}

/// Mount an empty TMDB search for `title`.
pub async fn mount_no_results(catalog: &MockServer, title: &str, times: u64) {
    Mock::given(method("GET"))
        .and(path("/search/movie"))
        .and(query_param("query", title))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .expect(times)
        .mount(catalog)
        .await;
}

// ---------------------------------------------------------------------------
// Forum fixtures
// ---------------------------------------------------------------------------

/// Mount a topic whose first post (id `topic_id * 10`) is `raw`.
pub async fn mount_topic(forum: &MockServer, topic_id: u64, raw: &str, tags: &[&str]) {
    let post_id = topic_id * 10;
    Mock::given(method("GET"))
        .and(path(format!("/t/{topic_id}.json")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": topic_id,
            "category_id": 1,
            "tags": tags,
            "post_stream": {"posts": [{"id": post_id, "post_number": 1}]}
        })))
        .mount(forum)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/posts/{post_id}.json")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": post_id,
            "topic_id": topic_id,
            "post_number": 1,
            "raw": raw,
            "username": "alice"
        })))
        .mount(forum)
        .await;
}

/// Accept replies, answering with post id 900.
pub async fn mount_reply(forum: &MockServer, times: u64) {
    Mock::given(method("POST"))
        .and(path("/posts.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 900})))
        .expect(times)
        .mount(forum)
        .await;
}

/// Bodies of every reply the forum received.
pub async fn posted_replies(forum: &MockServer) -> Vec<Value> {
    forum
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.method.as_str() == "POST" && r.url.path() == "/posts.json")
        .map(|r| serde_json::from_slice(&r.body).expect("reply body is JSON"))
        .collect()
}

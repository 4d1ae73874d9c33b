//! Shared mock-server harness for business command tests.
//!
//! Mirrors the app wiring: every state, compute and command registered, the
//! backend replaced by a wiremock server, and the retry delay shrunk so the
//! retry suites finish in milliseconds while exercising the same loop.

use std::time::Duration;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use streams_business::{
    BusinessConfig, CreateTagCommand, CreateTagCompute, FetchTagsCommand, NewstreamInput,
    SubmitNewstreamCommand, SubmitNewstreamCompute, Tag, TagAddInput, TagDirectoryCompute,
    TagDirectoryStatus,
};
use streams_states::StateCtx;

/// Token fragment pinned for tests so header expectations stay deterministic
/// regardless of build-time configuration.
#[allow(unused)]
pub const TEST_TOKEN_FRAGMENT: &str = "TOKEN";

pub struct TestContext {
    pub mock_server: MockServer,
    pub ctx: StateCtx,
}

impl TestContext {
    /// Harness with the production retry delay. Use for tests that never
    /// enter the retry path.
    #[allow(unused)]
    pub async fn new() -> Self {
        Self::with_retry_delay(streams_business::newstream::RETRY_DELAY).await
    }

    /// Harness with a shrunk retry delay for the retry suites.
    pub async fn with_retry_delay(retry_delay: Duration) -> Self {
        let mock_server = MockServer::start().await;
        let config =
            BusinessConfig::new(mock_server.uri()).with_token_fragment(TEST_TOKEN_FRAGMENT);

        let mut ctx = StateCtx::new();
        ctx.add_state(config);
        ctx.add_state(NewstreamInput::default());
        ctx.add_state(TagAddInput::default());
        ctx.record_compute(TagDirectoryCompute::default());
        ctx.record_compute(SubmitNewstreamCompute::default());
        ctx.record_compute(CreateTagCompute::default());
        ctx.record_command(FetchTagsCommand);
        ctx.record_command(SubmitNewstreamCommand { retry_delay });
        ctx.record_command(CreateTagCommand { retry_delay });

        Self { mock_server, ctx }
    }

    /// Seed the tag directory as if a fetch had completed.
    pub fn set_directory(&mut self, tags: Vec<Tag>) {
        self.ctx.updater().set(TagDirectoryCompute {
            status: TagDirectoryStatus::Loaded(tags),
        });
        self.ctx.sync_computes();
    }

    /// Flush queued commands and wait for every spawned task, syncing updates
    /// as they land.
    pub async fn flush_and_wait(&mut self) {
        self.ctx.sync_computes();
        self.ctx.flush_commands();

        let timeout = Duration::from_secs(10);
        let start = std::time::Instant::now();

        while self.ctx.task_count() > 0 {
            assert!(
                start.elapsed() < timeout,
                "timed out with {} tasks still pending",
                self.ctx.task_count()
            );
            if self.ctx.task_set_mut().join_next().await.is_some() {
                self.ctx.sync_computes();
            }
        }

        self.ctx.sync_computes();
    }

    pub async fn shutdown(&mut self) {
        self.ctx.shutdown().await;
    }

    // =========================================================================
    // Mock endpoint helpers
    // =========================================================================

    #[allow(unused)]
    pub async fn mock_tags(&self, tags: Vec<Tag>) {
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": tags })),
            )
            .mount(&self.mock_server)
            .await;
    }

    #[allow(unused)]
    pub async fn mock_tags_error(&self, status: u16) {
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.mock_server)
            .await;
    }

    /// Successful entry creation answering with the given id.
    #[allow(unused)]
    pub async fn mock_create_entry(&self, id: i64) {
        Mock::given(method("POST"))
            .and(path("/api/newstreams"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": { "id": id } })),
            )
            .mount(&self.mock_server)
            .await;
    }

    /// Entry creation failing with `status`, `times` times (then unmatched).
    #[allow(unused)]
    pub async fn mock_create_entry_error_n_times(&self, status: u16, times: u64) {
        Mock::given(method("POST"))
            .and(path("/api/newstreams"))
            .respond_with(ResponseTemplate::new(status))
            .up_to_n_times(times)
            .mount(&self.mock_server)
            .await;
    }

    /// Entry creation failing with `status` on every call.
    #[allow(unused)]
    pub async fn mock_create_entry_error(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path("/api/newstreams"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.mock_server)
            .await;
    }

    /// Tag linking on the created entry.
    #[allow(unused)]
    pub async fn mock_link_tags(&self, id: i64, status: u16) {
        Mock::given(method("PUT"))
            .and(path(format!("/api/newstreams/{id}")))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.mock_server)
            .await;
    }

    /// Tag creation answering 200 with the given body.
    #[allow(unused)]
    pub async fn mock_create_tag(&self, body: serde_json::Value) {
        Mock::given(method("POST"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.mock_server)
            .await;
    }

    #[allow(unused)]
    pub async fn mock_create_tag_error_n_times(&self, status: u16, times: u64) {
        Mock::given(method("POST"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(status))
            .up_to_n_times(times)
            .mount(&self.mock_server)
            .await;
    }

    #[allow(unused)]
    pub async fn mock_create_tag_error(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.mock_server)
            .await;
    }

    /// All requests the backend saw, in arrival order.
    pub async fn received(&self) -> Vec<wiremock::Request> {
        self.mock_server
            .received_requests()
            .await
            .unwrap_or_default()
    }
}

/// Valid entry form state pointing at nothing in particular.
#[allow(unused)]
pub fn valid_entry_input() -> NewstreamInput {
    NewstreamInput {
        title: "Launch day".to_owned(),
        url: "https://example.com/launch".to_owned(),
        content: "It happened.".to_owned(),
        pass_phrase_1: "p1".to_owned(),
        pass_phrase_2: "p2".to_owned(),
        ..NewstreamInput::default()
    }
}

/// Valid tag form state.
#[allow(unused)]
pub fn valid_tag_input() -> TagAddInput {
    TagAddInput {
        name: "astronomy".to_owned(),
        count: 0,
        description: "sky things".to_owned(),
        pass_phrase_1: "p1".to_owned(),
        pass_phrase_2: "p2".to_owned(),
        ..TagAddInput::default()
    }
}

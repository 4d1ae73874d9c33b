//! Shared harness for UI integration tests: a wiremock backend serving a
//! small tag directory, a wired `State`, and an egui_kittest harness.

use egui_kittest::Harness;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use streams_business::analytics::AnalyticsConfig;
use streams_states::StateCtx;
use streams_ui::StreamsApp;
use streams_ui::state::State;

pub struct TestCtx<'a, T = State> {
    pub mock_server: MockServer,
    harness: Harness<'a, T>,
}

impl<'a, T> TestCtx<'a, T> {
    pub fn harness_mut(&mut self) -> &mut Harness<'a, T> {
        &mut self.harness
    }

    #[allow(unused)]
    pub fn harness(&self) -> &Harness<'a, T> {
        &self.harness
    }
}

impl<'a> TestCtx<'a, State> {
    #[allow(unused)]
    pub async fn new(app: impl FnMut(&mut egui::Ui, &mut State) + 'a) -> Self {
        let (mock_server, state) = setup_test_state().await;
        let harness = Harness::new_ui_state(app, state);

        Self {
            mock_server,
            harness,
        }
    }
}

impl<'a> TestCtx<'a, StreamsApp> {
    /// Full app against the mock backend; the analytics beacon also points at
    /// the mock server so tests never touch a real collector.
    #[allow(unused)]
    pub async fn new_app() -> Self {
        let (mock_server, state) = setup_test_state().await;

        let analytics = AnalyticsConfig {
            tracker_url: format!("{}/gga", mock_server.uri()),
            site_id: "1".to_owned(),
        };
        let app = StreamsApp::with_analytics(state, analytics);
        let harness = Harness::new_eframe(|_| app);

        Self {
            mock_server,
            harness,
        }
    }
}

async fn setup_test_state() -> (MockServer, State) {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [
                { "id": 1, "attributes": { "name": "News" } },
                { "id": 2, "attributes": { "name": "sport" } },
            ]
        })))
        .mount(&mock_server)
        .await;

    let state = State::test(mock_server.uri());

    (mock_server, state)
}

/// Await every outstanding command task, applying updates as they land.
#[allow(unused)]
pub async fn settle(ctx: &mut StateCtx) {
    let timeout = std::time::Duration::from_secs(10);
    let start = std::time::Instant::now();

    while ctx.task_count() > 0 {
        assert!(
            start.elapsed() < timeout,
            "timed out with {} tasks still pending",
            ctx.task_count()
        );
        if ctx.task_set_mut().join_next().await.is_some() {
            ctx.sync_computes();
        }
    }
    ctx.sync_computes();
}

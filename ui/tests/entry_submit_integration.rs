//! Driving the entry form through the full create-then-link flow.

mod common;

use common::{TestCtx, settle};
use kittest::Queryable;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use streams_business::{NewstreamInput, SubmitNewstreamCompute, SubmitStatus};

#[tokio::test]
async fn clicking_submit_creates_and_links() {
    let mut test_ctx = TestCtx::new_app().await;

    Mock::given(method("POST"))
        .and(path("/api/newstreams"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": { "id": 42 } })),
        )
        .mount(&test_ctx.mock_server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/newstreams/42"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&test_ctx.mock_server)
        .await;

    // Let the startup tag fetch finish so the directory holds ids 1 and 2.
    let harness = test_ctx.harness_mut();
    settle(harness.state_mut().ctx_mut()).await;

    harness
        .state_mut()
        .ctx_mut()
        .update::<NewstreamInput>(|input| {
            input.title = "Launch day".to_owned();
            input.url = "https://example.com/launch".to_owned();
            input.pass_phrase_1 = "p1".to_owned();
            input.pass_phrase_2 = "p2".to_owned();
            // 7 is not in the directory and must be dropped from the link.
            input.tags = vec![1, 7];
        });
    harness.step();

    harness.get_by_label("Submit").click();
    harness.step();

    settle(harness.state_mut().ctx_mut()).await;

    assert_eq!(
        harness
            .state_mut()
            .ctx_mut()
            .compute::<SubmitNewstreamCompute>()
            .status,
        SubmitStatus::Success { id: 42 }
    );

    let link = test_ctx
        .mock_server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .find(|r| r.url.path() == "/api/newstreams/42")
        .expect("the link request was sent");
    let body: serde_json::Value = serde_json::from_slice(&link.body).expect("link body");
    assert_eq!(
        body["data"]["tags"]["connect"],
        serde_json::json!([{ "id": 1 }]),
        "only directory-known ids are linked"
    );
}

#[tokio::test]
async fn validation_failure_keeps_the_form_usable() {
    let mut test_ctx = TestCtx::new_app().await;

    let harness = test_ctx.harness_mut();
    settle(harness.state_mut().ctx_mut()).await;

    // Empty form: validation rejects before any request is attempted.
    harness.get_by_label("Submit").click();
    harness.step();
    settle(harness.state_mut().ctx_mut()).await;
    harness.step();

    assert!(matches!(
        harness
            .state_mut()
            .ctx_mut()
            .compute::<SubmitNewstreamCompute>()
            .status,
        SubmitStatus::Failed(_)
    ));
    // The form is still there; nothing crashed or got disabled.
    assert!(harness.query_by_label("Submit").is_some());

    // No entry creation reached the backend (only the startup tag fetch did).
    let entry_calls = test_ctx
        .mock_server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.url.path().starts_with("/api/newstreams"))
        .count();
    assert_eq!(entry_calls, 0);
}

//! End-to-end tests of the tag creation command against a mock backend.

mod common;

use std::time::Duration;

use common::{TestContext, valid_tag_input};
use streams_business::{CreateTagCommand, CreateTagCompute, CreateTagStatus, TagAddInput};

const FAST_RETRY: Duration = Duration::from_millis(10);

fn set_input(test_ctx: &mut TestContext, input: TagAddInput) {
    test_ctx.ctx.update::<TagAddInput>(|state| *state = input);
}

#[tokio::test]
async fn missing_credentials_makes_no_network_calls() {
    let mut test_ctx = TestContext::new().await;

    let mut input = valid_tag_input();
    input.pass_phrase_1 = String::new();
    set_input(&mut test_ctx, input);

    test_ctx.ctx.enqueue_command::<CreateTagCommand>();
    test_ctx.flush_and_wait().await;

    assert!(matches!(
        test_ctx.ctx.compute::<CreateTagCompute>().status,
        CreateTagStatus::Failed(_)
    ));
    assert!(test_ctx.received().await.is_empty());

    test_ctx.shutdown().await;
}

#[tokio::test]
async fn missing_name_makes_no_network_calls() {
    let mut test_ctx = TestContext::new().await;

    let mut input = valid_tag_input();
    input.name = String::new();
    set_input(&mut test_ctx, input);

    test_ctx.ctx.enqueue_command::<CreateTagCommand>();
    test_ctx.flush_and_wait().await;

    match &test_ctx.ctx.compute::<CreateTagCompute>().status {
        CreateTagStatus::Failed(message) => assert!(message.contains("required")),
        other => panic!("expected Failed, got {other:?}"),
    }
    assert!(test_ctx.received().await.is_empty());

    test_ctx.shutdown().await;
}

#[tokio::test]
async fn create_succeeds_with_assigned_id() {
    let mut test_ctx = TestContext::new().await;
    test_ctx
        .mock_create_tag(serde_json::json!({ "data": { "id": 11, "name": "astronomy" } }))
        .await;

    set_input(&mut test_ctx, valid_tag_input());

    test_ctx.ctx.enqueue_command::<CreateTagCommand>();
    test_ctx.flush_and_wait().await;

    assert_eq!(
        test_ctx.ctx.compute::<CreateTagCompute>().status,
        CreateTagStatus::Created {
            id: 11,
            name: "astronomy".to_owned()
        }
    );

    let requests = test_ctx.received().await;
    assert_eq!(requests.len(), 1, "a single create, no linking request");
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).expect("create body");
    assert_eq!(body["data"]["name"], "astronomy");
    assert_eq!(body["data"]["count"], 0);
    assert_eq!(body["data"]["locale"], "zh-Hant-HK");
    assert!(
        body["data"].get("publishedAt").is_some(),
        "tags are published on creation"
    );

    test_ctx.shutdown().await;
}

#[tokio::test]
async fn ok_response_without_id_is_terminal_failure() {
    let mut test_ctx = TestContext::with_retry_delay(FAST_RETRY).await;
    test_ctx
        .mock_create_tag(serde_json::json!({ "data": {} }))
        .await;

    set_input(&mut test_ctx, valid_tag_input());

    test_ctx.ctx.enqueue_command::<CreateTagCommand>();
    test_ctx.flush_and_wait().await;

    assert!(matches!(
        test_ctx.ctx.compute::<CreateTagCompute>().status,
        CreateTagStatus::Failed(_)
    ));
    assert_eq!(
        test_ctx.received().await.len(),
        1,
        "a 200 without an id is not retried"
    );

    test_ctx.shutdown().await;
}

#[tokio::test]
async fn four_failures_then_give_up() {
    let mut test_ctx = TestContext::with_retry_delay(FAST_RETRY).await;
    test_ctx.mock_create_tag_error(503).await;

    set_input(&mut test_ctx, valid_tag_input());

    test_ctx.ctx.enqueue_command::<CreateTagCommand>();
    test_ctx.flush_and_wait().await;

    match &test_ctx.ctx.compute::<CreateTagCompute>().status {
        CreateTagStatus::Failed(message) => assert!(message.contains("503"), "got: {message}"),
        other => panic!("expected Failed, got {other:?}"),
    }
    assert_eq!(test_ctx.received().await.len(), 4);

    test_ctx.shutdown().await;
}

#[tokio::test]
async fn succeeds_on_second_attempt() {
    let mut test_ctx = TestContext::with_retry_delay(FAST_RETRY).await;
    test_ctx.mock_create_tag_error_n_times(500, 1).await;
    test_ctx
        .mock_create_tag(serde_json::json!({ "data": { "id": 5, "name": "astronomy" } }))
        .await;

    set_input(&mut test_ctx, valid_tag_input());

    test_ctx.ctx.enqueue_command::<CreateTagCommand>();
    test_ctx.flush_and_wait().await;

    assert_eq!(
        test_ctx.ctx.compute::<CreateTagCompute>().status,
        CreateTagStatus::Created {
            id: 5,
            name: "astronomy".to_owned()
        }
    );
    assert_eq!(test_ctx.received().await.len(), 2);

    test_ctx.shutdown().await;
}

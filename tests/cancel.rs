use screener_chat::controller::{ChatController, Phase, SubmitOutcome, STREAM_FAILED_TEXT};

mod support;

use support::ScriptedBackend;

#[tokio::test]
async fn voluntary_cancellation_keeps_partial_content_without_error_text() {
    // The signal trips after "pon" and "g" streamed, before the final.
    let backend = ScriptedBackend::ping_pong().with_cancel_after(2);
    let mut controller = ChatController::new();

    let outcome = controller
        .submit(&backend, Some("t-1"), "ping", &mut |_| {})
        .await;

    assert_eq!(outcome, SubmitOutcome::Cancelled);
    assert_eq!(controller.phase(), Phase::Idle);

    let assistant = &controller.messages()[2];
    assert_eq!(assistant.content, "pong");
    assert_ne!(assistant.content, STREAM_FAILED_TEXT);
    assert!(controller.last_error().is_none());
}

#[tokio::test]
async fn voluntary_cancellation_issues_a_server_side_cancel() {
    let backend = ScriptedBackend::ping_pong().with_cancel_after(1);
    let mut controller = ChatController::new();

    controller
        .submit(&backend, Some("t-1"), "ping", &mut |_| {})
        .await;

    let log = backend.log.lock().expect("log");
    assert_eq!(log.cancelled_runs, vec!["r1".to_string()]);
}

#[tokio::test]
async fn cancellation_before_any_token_leaves_the_placeholder_empty() {
    let backend = ScriptedBackend::ping_pong().with_cancel_after(0);
    let mut controller = ChatController::new();

    let outcome = controller
        .submit(&backend, Some("t-1"), "ping", &mut |_| {})
        .await;

    assert_eq!(outcome, SubmitOutcome::Cancelled);
    assert_eq!(controller.messages()[2].content, "");
}

#[test]
fn cancel_active_is_idempotent_with_and_without_an_exchange() {
    let mut controller = ChatController::new();
    controller.cancel_active();
    controller.cancel_active();

    controller.begin_submit(Some("t-1"), "hi").expect("accepted");
    controller.cancel_active();
    controller.cancel_active();
    assert_eq!(controller.phase(), Phase::Sending);
}

#[test]
fn reset_terminates_the_exchange_and_restores_the_welcome_transcript() {
    let mut controller = ChatController::new();
    controller.begin_submit(Some("t-1"), "hi").expect("accepted");

    controller.reset_transcript();

    assert_eq!(controller.phase(), Phase::Idle);
    assert_eq!(controller.messages().len(), 1);
    assert_eq!(
        controller.messages()[0].id,
        screener_chat::transcript::WELCOME_MESSAGE_ID
    );
}

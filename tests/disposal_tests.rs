use rust_janus_session::*;
mod test_utils;
use test_utils::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Disposal Tests
/// Teardown of outstanding transactions, listeners and timers

#[tokio::test]
async fn test_session_transactions_are_properly_disposed_of() {
    let (session, _transport, _diagnostics) =
        create_test_session(SessionConfig::without_timers().with_timeout(Some(Duration::from_millis(5))));

    let message1 = session.send("message", Some(msg(json!({ "transaction": "message1" }))));
    let message2 = session.send("message", Some(msg(json!({ "transaction": "message2" }))));

    session.receive(msg(json!({ "transaction": "message1", "value": "test" })));
    session.dispose();

    let (message1, message2) = tokio::join!(message1, message2);
    assert_eq!(message1.unwrap(), msg(json!({ "transaction": "message1", "value": "test" })));
    assert!(matches!(message2, Err(SessionError::Disposed)));
    assert_eq!(session.pending_count(), 0);
}

#[test]
fn test_dispose_is_idempotent() {
    let (session, _transport, _diagnostics) = create_quiet_session();
    let mut pending = session.send("attach", None);

    session.dispose();
    session.dispose();

    assert!(session.is_disposed());
    assert!(matches!(pending.try_result(), Some(Err(SessionError::Disposed))));
}

#[test]
fn test_dispose_clears_listeners() {
    let (session, _transport, _diagnostics) = create_quiet_session();
    let count = Arc::new(AtomicUsize::new(0));
    let count_clone = count.clone();
    session.on("event", move |_| {
        count_clone.fetch_add(1, Ordering::SeqCst);
    });

    session.dispose();
    session.receive(msg(json!({ "janus": "event" })));

    assert_eq!(count.load(Ordering::SeqCst), 0);
    assert_eq!(session.listener_count("event"), 0);
}

#[test]
fn test_send_after_dispose_transmits_nothing() {
    let (session, transport, _diagnostics) = create_quiet_session();
    session.dispose();

    let mut pending = session.send("message", Some(msg(json!({ "body": {} }))));

    assert!(matches!(pending.try_result(), Some(Err(SessionError::Disposed))));
    assert_eq!(transport.sent_count(), 0);
    assert_eq!(session.pending_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_no_keepalive_after_dispose() {
    let (session, transport, _diagnostics) = create_test_session(
        SessionConfig::without_timers().with_keepalive(Some(Duration::from_secs(1))),
    );

    let _ = session.send("message", None);
    assert!(session.is_keepalive_armed());
    session.dispose();
    assert!(!session.is_keepalive_armed());

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(transport.sent_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_dispose_cancels_transaction_timers() {
    let (session, _transport, diagnostics) = create_test_session(
        SessionConfig::without_timers()
            .with_timeout(Some(Duration::from_millis(5)))
            .with_verbose(true),
    );

    let pending = session.send("attach", None);
    session.dispose();
    assert!(matches!(pending.await, Err(SessionError::Disposed)));

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(diagnostics.containing("timed out").is_empty());
}

#[tokio::test]
async fn test_dispose_during_await_from_another_task() {
    let (session, _transport, _diagnostics) = create_quiet_session();
    let pending = session.send("attach", None);

    let disposer = {
        let session = session.clone();
        tokio::spawn(async move {
            tokio::task::yield_now().await;
            session.dispose();
        })
    };

    assert!(pending.await.unwrap_err().is_disposed());
    disposer.await.unwrap();
}

use rust_janus_session::*;
use ::core;
mod test_utils;
use test_utils::*;

/// Transaction Tests
/// Request stamping, response correlation, ack suppression and orphan tolerance

#[tokio::test]
async fn test_transactions_are_detected_and_matched_up() {
    let (session, _transport, _diagnostics) = create_quiet_session();

    let trickle = session.send("trickle", Some(msg(json!({ "transaction": "bigs" }))));
    let aq = session.send("message", Some(msg(json!({ "transaction": "figs" }))));
    let bq = session.send("message", Some(msg(json!({ "transaction": "wigs" }))));
    let cq = session.send("message", Some(msg(json!({ "transaction": "pigs" }))));
    let dq = session.send("attach", Some(msg(json!({ "transaction": "digs" }))));

    session.receive(msg(json!({ "transaction": "???" })));
    session.receive(msg(json!({ "transaction": "bigs", "janus": "ack" })));
    session.receive(msg(json!({ "transaction": "figs", "janus": "ack" })));
    session.receive(msg(json!({ "transaction": "wigs", "janus": "ack" })));
    session.receive(msg(json!({
        "transaction": "pigs",
        "janus": "ack",
        "hint": "Asynchronously processing some pigs."
    })));

    session.receive(msg(json!({ "transaction": "pigs", "rats": "pats" })));
    session.receive(msg(json!({ "just": "kidding" })));
    session.receive(msg(json!({})));
    session.receive(msg(json!({
        "transaction": "digs",
        "janus": "error",
        "error": { "code": 460, "reason": "No such plugin" },
        "unrelated": [1, 2, 3]
    })));
    session.receive(msg(json!({ "transaction": "figs", "cats": "hats" })));
    session.receive(msg(json!({ "transaction": "wigs" })));

    let (trickle, aq, bq, cq, dq) = futures::join!(trickle, aq, bq, cq, dq);

    assert_eq!(trickle.unwrap(), msg(json!({ "transaction": "bigs", "janus": "ack" })));
    assert_eq!(aq.unwrap(), msg(json!({ "transaction": "figs", "cats": "hats" })));
    assert_eq!(bq.unwrap(), msg(json!({ "transaction": "wigs" })));
    assert_eq!(cq.unwrap(), msg(json!({ "transaction": "pigs", "rats": "pats" })));

    match dq {
        Err(SessionError::Protocol(response)) => {
            assert_eq!(response.get("unrelated"), Some(&json!([1, 2, 3])));
            assert_eq!(response.error_body().unwrap().error_code(), Some(JanusErrorCode::PluginNotFound));
        }
        other => panic!("Expected protocol error, got: {:?}", other),
    }

    assert_eq!(session.pending_count(), 0);
    assert!(session.pending_transactions().is_empty());
}

#[test]
fn test_ack_keeps_message_transaction_open() {
    let (session, _transport, _diagnostics) = create_quiet_session();
    let mut pending = session.send("message", Some(msg(json!({ "transaction": "T" }))));

    session.receive(msg(json!({ "transaction": "T", "janus": "ack" })));
    assert!(pending.try_result().is_none());
    assert_eq!(session.pending_count(), 1);

    session.receive(msg(json!({ "transaction": "T", "janus": "event", "plugindata": { "data": {} } })));
    let response = pending.try_result().unwrap().unwrap();
    assert_eq!(response.janus(), Some("event"));
    assert_eq!(session.pending_count(), 0);
}

#[test]
fn test_ack_resolves_other_request_kinds() {
    let (session, _transport, _diagnostics) = create_quiet_session();
    let mut keepalive = session.send("keepalive", None);
    let transaction = keepalive.transaction().to_string();

    session.receive(msg(json!({ "janus": "ack", "transaction": transaction })));
    assert_eq!(keepalive.try_result().unwrap().unwrap().janus(), Some("ack"));
}

#[test]
fn test_pending_response_wakes_when_answered() {
    let (session, _transport, _diagnostics) = create_quiet_session();
    let mut pending = tokio_test::task::spawn(session.send("attach", Some(msg(json!({ "transaction": "poll" })))));

    tokio_test::assert_pending!(pending.poll());
    session.receive(msg(json!({ "janus": "success", "transaction": "poll" })));

    assert!(pending.is_woken());
    let response = tokio_test::assert_ready_ok!(pending.poll());
    assert_eq!(response.janus(), Some("success"));
}

#[test]
fn test_orphan_responses_are_ignored() {
    let (session, _transport, _diagnostics) = create_quiet_session();
    let mut pending = session.send("attach", None);

    session.receive(msg(json!({ "janus": "success", "transaction": "unknown" })));
    session.receive(msg(json!({ "janus": "success" })));
    session.receive(msg(json!({ "janus": "success", "transaction": null })));

    assert!(pending.try_result().is_none());
    assert_eq!(session.pending_count(), 1);
}

#[test]
fn test_duplicate_response_after_resolution_is_orphan() {
    let (session, _transport, _diagnostics) = create_quiet_session();
    let mut pending = session.send("attach", Some(msg(json!({ "transaction": "once" }))));

    session.receive(msg(json!({ "janus": "success", "transaction": "once", "n": 1 })));
    session.receive(msg(json!({ "janus": "success", "transaction": "once", "n": 2 })));

    let response = pending.try_result().unwrap().unwrap();
    assert_eq!(response.get("n"), Some(&json!(1)));
}

#[test]
fn test_request_wire_format() {
    let (session, transport, _diagnostics) = create_test_session(
        SessionConfig::without_timers().with_apisecret("janusrocks"),
    );

    let pending = session.send("message", Some(msg(json!({ "body": { "request": "list" } }))));

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["janus"], "message");
    assert_eq!(sent[0]["transaction"], pending.transaction());
    assert_eq!(sent[0]["apisecret"], "janusrocks");
    assert_eq!(sent[0]["body"]["request"], "list");
    assert!(sent[0].get("session_id").is_none());
}

#[test]
fn test_transaction_ids_are_unique_uuids() {
    let (session, _transport, _diagnostics) = create_quiet_session();
    let mut ids = std::collections::HashSet::new();

    for _ in 0..50 {
        let pending = session.send("trickle", None);
        let id = pending.transaction().to_string();
        assert_eq!(id.len(), 36);
        assert_eq!(id.chars().filter(|&c| c == '-').count(), 4);
        assert!(ids.insert(id));
    }

    assert_eq!(session.pending_count(), 50);
}

#[tokio::test]
async fn test_create_binds_session_id() {
    let (session, outgoing, _diagnostics) = create_channel_session(SessionConfig::without_timers());
    spawn_fake_server(&session, outgoing, |request| match request["janus"].as_str() {
        Some("create") => {
            assert!(request.get("session_id").is_none());
            Some(success_with_id(request, 1234))
        }
        _ => {
            assert_eq!(request["session_id"], 1234);
            Some(json!({ "janus": "success", "transaction": request["transaction"], "session_id": 1234 }))
        }
    });

    assert!(session.id().is_none());
    let response = session.create().await.unwrap();
    assert_eq!(response.janus(), Some("success"));
    assert_eq!(session.id(), Some(JanusId::Number(1234)));

    let info = session.send("info", None).await.unwrap();
    assert_eq!(info.session_id(), Some(&json!(1234)));

    match session.create().await {
        Err(SessionError::AlreadyCreated(id)) => assert_eq!(id, JanusId::Number(1234)),
        other => panic!("Expected AlreadyCreated, got: {:?}", other),
    }
}

#[tokio::test]
async fn test_create_without_id_is_malformed() {
    let (session, outgoing, _diagnostics) = create_channel_session(SessionConfig::without_timers());
    spawn_fake_server(&session, outgoing, |request| {
        Some(json!({ "janus": "success", "transaction": request["transaction"], "data": {} }))
    });

    let result = session.create().await;
    assert!(matches!(result, Err(SessionError::MalformedResponse { .. })));
    assert!(session.id().is_none());
}

#[tokio::test]
async fn test_destroy_disposes_session() {
    let (session, outgoing, _diagnostics) = create_channel_session(SessionConfig::without_timers());
    spawn_fake_server(&session, outgoing, |request| match request["janus"].as_str() {
        Some("create") => Some(success_with_id(request, 77)),
        Some("destroy") => Some(json!({ "janus": "success", "transaction": request["transaction"], "session_id": 77 })),
        _ => None,
    });

    session.create().await.unwrap();
    let lingering = session.send("message", Some(msg(json!({ "body": {} }))));

    session.destroy().await.unwrap();

    assert!(session.is_disposed());
    assert!(matches!(lingering.await, Err(SessionError::Disposed)));
}

#[tokio::test]
async fn test_concurrent_senders() {
    let (session, outgoing, _diagnostics) = create_channel_session(SessionConfig::without_timers());
    spawn_fake_server(&session, outgoing, |request| {
        Some(json!({
            "janus": "success",
            "transaction": request["transaction"],
            "echo": request["body"]["n"]
        }))
    });

    let mut tasks = Vec::new();
    for n in 0..100 {
        let session = session.clone();
        tasks.push(tokio::spawn(async move {
            let response = session
                .send("message", Some(msg(json!({ "body": { "n": n } }))))
                .await
                .unwrap();
            assert_eq!(response.get("echo"), Some(&json!(n)));
        }));
    }

    for task in tasks {
        task.await.unwrap();
    }
    assert_eq!(session.pending_count(), 0);
}

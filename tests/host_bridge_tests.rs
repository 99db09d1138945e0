mod utils;

use geoscene::{Bubbler, EventManager, HandlerSource, HostApi, HostMessage};
use serde_json::{json, Value};
use utils::{CallLog, Chain};

#[test]
fn publish_reaches_extern_handlers_only() {
    let api = HostApi::new(EventManager::new());
    let log = CallLog::new();
    log.handler(api.manager(), HandlerSource::Extern, "camera/zoomTo", "extern");
    log.handler(api.manager(), HandlerSource::Intern, "camera/zoomTo", "intern");

    api.publish("camera/zoomTo", json!({ "level": 12 })).unwrap();

    assert_eq!(log.calls(), vec!["extern"]);
}

#[test]
fn subscribe_listens_on_intern_registry() {
    let api = HostApi::new(EventManager::new());
    let seen = CallLog::new();
    let log = seen.clone();
    let subscription = api.subscribe("entity/select", move |payload| {
        log.record(payload["entity"].as_str().unwrap_or_default());
        Ok(())
    });

    api.manager()
        .handle_internal_event("entity/select", &json!({ "entity": "parcel-3" }))
        .unwrap();
    subscription.cancel();
    api.manager()
        .handle_internal_event("entity/select", &json!({ "entity": "parcel-4" }))
        .unwrap();

    assert_eq!(seen.calls(), vec!["parcel-3"]);
    assert_eq!(
        api.manager().handler_count(HandlerSource::Intern, "entity/select"),
        0
    );
}

#[test]
fn subscription_sees_dispatched_events() {
    let chain = Chain::new();
    let api = HostApi::new(chain.manager.clone());
    let log = CallLog::new();
    let seen = log.clone();
    api.subscribe("entity/select", move |_| {
        seen.record("subscriber");
        Ok(())
    });
    let seen = log.clone();
    api.register_host(move |event| {
        seen.record(format!("host:{}", event.kind()));
        Ok(())
    });

    chain
        .origin
        .emit("entity/select", json!({ "entity": "origin" }))
        .unwrap();

    assert_eq!(log.calls(), vec!["host:entity/select", "subscriber"]);
}

#[tokio::test]
async fn channel_host_forwards_every_visible_event() {
    let chain = Chain::new();
    let api = HostApi::new(chain.manager.clone());
    let (host, mut messages) = api.attach_channel();
    chain
        .parent
        .add_event_listener("input/secret", |event| {
            event.cancel(true);
            Ok(None)
        });

    chain.origin.emit("input/leftdown", json!({ "x": 3 })).unwrap();
    chain.origin.emit("input/secret", Value::Null).unwrap();
    chain.parent.emit("entity/hover", Value::Null).unwrap();
    host.cancel();

    let mut received = Vec::new();
    while let Some(message) = messages.recv().await {
        received.push(message);
    }

    assert_eq!(
        received,
        vec![
            HostMessage {
                kind: "input/leftdown".to_string(),
                origin: Some("origin".to_string()),
                payload: json!({ "x": 3 }),
            },
            HostMessage {
                kind: "entity/hover".to_string(),
                origin: Some("parent".to_string()),
                payload: Value::Null,
            },
        ]
    );
}

#[tokio::test]
async fn channel_message_serializes_to_json() {
    let chain = Chain::new();
    let api = HostApi::new(chain.manager.clone());
    let (_host, mut messages) = api.attach_channel();

    chain
        .grandparent
        .emit("entity/select", json!({ "id": 9 }))
        .unwrap();

    let message = messages.recv().await.expect("message should be forwarded");
    let value: Value = serde_json::from_str(&message.to_json().unwrap()).unwrap();

    assert_eq!(
        value,
        json!({ "kind": "entity/select", "origin": "grandparent", "payload": { "id": 9 } })
    );
}

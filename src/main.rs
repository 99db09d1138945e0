use geoscene::{Bubbler, EventManager, EventTarget, EventsConfig, HandlerSource, HostApi};
use serde_json::json;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Minimal scene node used to drive the event subsystem
struct SceneNode {
    id: String,
    target: EventTarget,
}

impl SceneNode {
    fn new(id: &str, manager: &EventManager, parent: Option<&SceneNode>) -> Self {
        Self {
            id: id.to_string(),
            target: EventTarget::named(id, Some(manager.clone()), parent.map(|p| &p.target)),
        }
    }
}

impl Bubbler for SceneNode {
    fn event_target(&self) -> &EventTarget {
        &self.target
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = EventsConfig::from_env()?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.log_filter))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(max_bubble_depth = ?config.max_bubble_depth, "Starting geoscene event demo");

    let manager = EventManager::with_config(&config);
    let api = HostApi::new(manager.clone());
    let (host, mut messages) = api.attach_channel();

    let layer = SceneNode::new("parcels", &manager, None);
    let parcel = SceneNode::new("parcel-12", &manager, Some(&layer));

    // The layer turns raw clicks on any child into a selection
    let selection = manager.clone();
    layer.add_event_listener("input/leftdown", move |event| {
        let entity = event.origin().label().unwrap_or_default().to_string();
        selection.handle_internal_event("entity/select", &json!({ "entity": entity }))?;
        Ok(None)
    });

    let _selected = api.subscribe("entity/select", |payload| {
        info!(%payload, "Host saw selection");
        Ok(())
    });

    let _bulk_show = manager.on(HandlerSource::Extern, "entity/bulk/show", |payload| {
        info!(%payload, "Showing entities");
        Ok(())
    });

    parcel.emit("input/leftdown", json!({ "x": 120, "y": 48 }))?;
    api.publish("entity/bulk/show", json!({ "ids": [parcel.id.as_str()] }))?;

    host.cancel();
    while let Some(message) = messages.recv().await {
        info!(json = %message.to_json()?, "Host message");
    }

    Ok(())
}

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use tracing::{debug, info, instrument, warn};

use crate::services::{ChangeBroadcaster, Subscription};

/// Upgrade to a WebSocket that streams catalog change events as JSON text
/// frames. The subscription is taken before the upgrade completes, so no
/// event published after the request arrives is missed.
#[instrument(name = "product_events", skip(ws, broadcaster))]
pub async fn product_events(
    ws: WebSocketUpgrade,
    State(broadcaster): State<ChangeBroadcaster>,
) -> Response {
    let subscription = broadcaster.subscribe();
    ws.on_upgrade(move |socket| stream_catalog_events(socket, subscription))
}

async fn stream_catalog_events(mut socket: WebSocket, mut subscription: Subscription) {
    let subscription_id = subscription.id();
    info!(subscription_id = %subscription_id, "Catalog event stream opened");

    loop {
        tokio::select! {
            event = subscription.recv() => {
                let Some(event) = event else { break };
                let frame = match serde_json::to_string(&event) {
                    Ok(frame) => frame,
                    Err(e) => {
                        warn!(error = %e, "Failed to encode catalog event");
                        continue;
                    }
                };
                if socket.send(Message::Text(frame)).await.is_err() {
                    debug!(subscription_id = %subscription_id, "Observer went away mid-send");
                    break;
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    // Observers only listen; anything they send is ignored
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    info!(subscription_id = %subscription_id, "Catalog event stream closed");
}

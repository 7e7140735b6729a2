use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};

use crate::state::{AppState, RunEvent};

pub async fn events_socket(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| stream_events(socket, state))
}

async fn stream_events(mut socket: WebSocket, state: AppState) {
    // subscribe first so nothing published after `connected` is missed
    let mut events = state.subscribe_events();

    let connected = RunEvent::connected();
    if send_event(&mut socket, &connected).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            inbound = socket.recv() => {
                match inbound {
                    Some(Ok(Message::Close(_))) | None => return,
                    Some(Ok(_)) => {}
                    Some(Err(_)) => return,
                }
            }
            event = events.recv() => {
                match event {
                    Ok(event) => {
                        if send_event(&mut socket, &event).await.is_err() {
                            return;
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "event subscriber lagged");
                        continue;
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => return,
                }
            }
        }
    }
}

async fn send_event(socket: &mut WebSocket, event: &RunEvent) -> Result<(), ()> {
    let payload = event_json(event)?;
    socket.send(Message::Text(payload)).await.map_err(|_| ())
}

fn event_json(event: &RunEvent) -> Result<String, ()> {
    serde_json::to_string(event).map_err(|_| ())
}

#[cfg(test)]
mod tests {
    use super::event_json;
    use crate::state::RunEvent;

    #[test]
    fn connected_event_has_null_run_id() {
        assert_eq!(
            event_json(&RunEvent::connected()).unwrap(),
            r#"{"event_type":"connected","run_id":null}"#
        );
    }
}

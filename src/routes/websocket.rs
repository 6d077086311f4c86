use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::{
    middleware::auth::decode_access_token, models::auth::Session, services::feed::FeedError,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct WsQueryParams {
    pub token: String,
}

/// GET /ws?token=… — live feed of both stores. Browsers cannot set an
/// Authorization header on a WebSocket, so the token rides in the query.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(params): Query<WsQueryParams>,
) -> Response {
    let jwt_secret = state.config.jwt_secret.clone();
    let session = decode_access_token(&params.token, &jwt_secret);

    ws.on_upgrade(move |socket| async move {
        match session {
            Ok(session) => {
                info!("WebSocket connected: principal={}", session.actor());
                handle_socket(socket, state, session).await;
            }
            Err(e) => {
                error!("WebSocket auth failed: {e}");
            }
        }
    })
}

fn frame<T: serde::Serialize>(kind: &str, payload: &Result<Arc<T>, FeedError>) -> String {
    let value = match payload {
        Ok(snapshot) => json!({ "type": kind, "payload": &**snapshot }),
        Err(e) => json!({ "type": "error", "feed": kind, "message": e.to_string() }),
    };
    value.to_string()
}

async fn handle_socket(socket: WebSocket, state: AppState, session: Session) {
    let (mut sender, mut receiver) = socket.split();

    let mut announcements = state.announcements.subscribe();
    let mut maintenance = state.maintenance.subscribe();

    // Feeds → WebSocket. Each subscription already delivers the current
    // snapshot first, so the client renders without a separate fetch.
    let mut feed_task = tokio::spawn(async move {
        loop {
            let text = tokio::select! {
                item = announcements.next() => match item {
                    Some(payload) => frame("announcements", &payload),
                    None => break,
                },
                item = maintenance.next() => match item {
                    Some(payload) => frame("maintenance", &payload),
                    None => break,
                },
            };
            if sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
        announcements.unsubscribe();
        maintenance.unsubscribe();
    });

    // Drain the client side; the console never sends meaningful frames.
    let mut client_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = (&mut feed_task) => client_task.abort(),
        _ = (&mut client_task) => feed_task.abort(),
    }

    info!("WebSocket disconnected: principal={}", session.actor());
}

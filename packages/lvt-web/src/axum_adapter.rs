//! The `axum` backend adapter (spec §4 supplemented features: "the
//! teacher's primary supported backend"). Everything session-shaped lives
//! in [`crate::session_task`]; this module only translates an
//! [`axum::extract::ws::WebSocket`] into a [`LiveViewSocket`] and wires up
//! the two HTTP routes a live view needs.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::{Html, IntoResponse};

use crate::app::LiveViewApp;
use crate::glue::interpreter_glue;
use crate::pool::LiveViewPool;
use crate::session_task::run_session;
use crate::socket::{LiveViewSocket, SocketError};

pub struct AxumSocket(WebSocket);

#[async_trait::async_trait]
impl LiveViewSocket for AxumSocket {
    async fn recv(&mut self) -> Option<Result<String, SocketError>> {
        loop {
            return match self.0.recv().await? {
                Ok(Message::Text(text)) => Some(Ok(text.to_string())),
                Ok(Message::Close(_)) => None,
                Ok(_) => continue,
                Err(e) => Some(Err(SocketError(e.to_string()))),
            };
        }
    }

    async fn send(&mut self, message: String) -> Result<(), SocketError> {
        self.0.send(Message::Text(message.into())).await.map_err(|e| SocketError(e.to_string()))
    }
}

/// `GET /` — a static shell with the live root placeholder and the glue
/// script; populated once the first WS message arrives (spec §6, "first
/// WebSocket message after connect carries the full tree" branch).
pub async fn liveview_shell(ws_path: &str) -> Html<String> {
    Html(format!(
        r#"<!doctype html><html><body><div id="lvt-root"></div>{}</body></html>"#,
        interpreter_glue(ws_path)
    ))
}

/// `GET /ws` — upgrades to a WebSocket and hands it to [`run_session`].
pub async fn liveview_ws<A: LiveViewApp>(
    ws: WebSocketUpgrade,
    State(pool): State<Arc<LiveViewPool<A>>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| async move {
        run_session(AxumSocket(socket), pool).await;
    })
}

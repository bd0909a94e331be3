//! The per-session pump (spec §5 "one logical task per session"): reads
//! actions off the socket, serializes them through the application's
//! `Change`, re-renders, and writes back the payload. Written once against
//! [`LiveViewSocket`] so every backend adapter shares it.

use std::sync::Arc;

use lvt_server::{ActionMessage, ErrorMessage, UpdateMessage, UpdateMeta};
use serde_json::json;

use crate::app::LiveViewApp;
use crate::pool::LiveViewPool;
use crate::socket::LiveViewSocket;

/// Drives one connection end to end: mints a session, sends the full tree
/// as the first message (spec §6, "the first WebSocket message after
/// connect carries the full tree" branch), then loops on actions until the
/// socket closes. Removes the session from the registry on exit — no
/// partial payload is ever left in flight (spec §5 "Cancellation").
pub async fn run_session<A, Sock>(mut socket: Sock, pool: Arc<LiveViewPool<A>>)
where
    A: LiveViewApp,
    Sock: LiveViewSocket,
{
    let mut renderer = pool.new_renderer();
    let mut state = A::init();

    let id = renderer.id().clone();
    match renderer.render_initial(&state) {
        Ok(_) => {
            let fp = renderer.last_fingerprint().expect("render_initial sets the fingerprint");
            let tree = renderer.retained_tree().expect("render_initial sets the tree").clone();
            let full = lvt_core::RenderPayload::Full(tree).to_json(fp);
            let msg = UpdateMessage { tree: full, meta: None };
            if socket.send(serde_json::to_string(&msg).unwrap_or_default()).await.is_err() {
                return;
            }
        }
        Err(e) => {
            tracing::warn!(session = %id, error = %e, "initial render failed");
            let err = ErrorMessage::from_session_error(&e);
            let _ = socket.send(serde_json::to_string(&err).unwrap_or_default()).await;
            return;
        }
    }

    let handle = pool.registry().insert(renderer);
    tracing::debug!(session = %id, "session connected");

    loop {
        let Some(received) = socket.recv().await else { break };
        let Ok(text) = received else { break };
        let Ok(action) = serde_json::from_str::<ActionMessage>(&text) else {
            tracing::warn!(session = %id, "dropped malformed action message");
            continue;
        };

        let (success, errors) = match A::change(&mut state, &action.action, action.data) {
            Ok(()) => (true, Default::default()),
            Err(e) => (false, e.field_errors),
        };

        let outcome = {
            let mut guard = handle.lock();
            guard.render_update(&state).map(|payload| (payload, guard.last_fingerprint().unwrap()))
        };

        let response = match outcome {
            Ok((payload, fp)) => {
                let tree = payload.to_json(fp);
                serde_json::to_string(&UpdateMessage {
                    tree,
                    meta: Some(UpdateMeta { success, errors, action: Some(action.action.clone()) }),
                })
                .unwrap_or_else(|_| json!({"error": {"kind": "internal", "message": "encode failure"}}).to_string())
            }
            Err(e) => serde_json::to_string(&ErrorMessage::from_session_error(&e)).unwrap_or_default(),
        };

        if socket.send(response).await.is_err() {
            break;
        }
    }

    pool.registry().remove(&id);
    tracing::debug!(session = %id, "session disconnected");
}

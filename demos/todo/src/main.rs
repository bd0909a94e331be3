//! The spec's keyed-range scenarios (§8.3/§8.5) served live: adding items
//! exercises bulk append, toggling exercises per-item update, removing
//! exercises remove + insert-after, all through one todo list.

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use lvt::prelude::*;
use serde::Serialize;

#[derive(Clone, Serialize)]
struct Item {
    id: String,
    text: String,
    done: bool,
}

#[derive(Clone, Serialize)]
struct State {
    items: Vec<Item>,
    next_id: u64,
}

struct Todo;

impl LiveViewApp for Todo {
    type State = State;

    fn init() -> State {
        State { items: Vec::new(), next_id: 0 }
    }

    fn change(state: &mut State, action: &str, data: serde_json::Value) -> Result<(), ValidationError> {
        match action {
            "add" => {
                let text = data.get("text").and_then(|v| v.as_str()).unwrap_or_default().trim().to_string();
                if text.is_empty() {
                    return Err(ValidationError {
                        message: "text cannot be empty".to_string(),
                        field_errors: [("text".to_string(), "required".to_string())].into(),
                    });
                }
                let id = format!("t{}", state.next_id);
                state.next_id += 1;
                state.items.push(Item { id, text, done: false });
                Ok(())
            }
            "toggle" => {
                let id = data.get("id").and_then(|v| v.as_str()).unwrap_or_default();
                match state.items.iter_mut().find(|i| i.id == id) {
                    Some(item) => {
                        item.done = !item.done;
                        Ok(())
                    }
                    None => Err(ValidationError { message: format!("no item `{id}`"), field_errors: Default::default() }),
                }
            }
            "remove" => {
                let id = data.get("id").and_then(|v| v.as_str()).unwrap_or_default();
                state.items.retain(|i| i.id != id);
                Ok(())
            }
            other => Err(ValidationError { message: format!("unknown action `{other}`"), field_errors: Default::default() }),
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let template = compile(include_str!("../templates/index.html.lvt"), &[])
        .expect("todo template compiles");
    let pool: Arc<LiveViewPool<Todo>> = Arc::new(LiveViewPool::new(template));

    let app = Router::new()
        .route("/", get(|| async { liveview_shell("/ws").await }))
        .route("/ws", get(liveview_ws::<Todo>))
        .with_state(pool);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:3031").await.unwrap();
    tracing::info!("listening on http://127.0.0.1:3031");
    axum::serve(listener, app).await.unwrap();
}

//! The spec's "Counter" scenario (§8.1) served over a real WebSocket:
//! `<p>count: {{.n}}</p>` with `{n:0}→{n:1}` driven by two click actions.

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use lvt::prelude::*;
use serde::Serialize;

#[derive(Clone, Serialize)]
struct State {
    n: i64,
}

struct Counter;

impl LiveViewApp for Counter {
    type State = State;

    fn init() -> State {
        State { n: 0 }
    }

    fn change(state: &mut State, action: &str, _data: serde_json::Value) -> Result<(), ValidationError> {
        match action {
            "increment" => state.n += 1,
            "decrement" => state.n -= 1,
            other => return Err(ValidationError {
                message: format!("unknown action `{other}`"),
                field_errors: Default::default(),
            }),
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let template = compile(include_str!("../templates/index.html.lvt"), &[])
        .expect("counter template compiles");
    let pool: Arc<LiveViewPool<Counter>> = Arc::new(LiveViewPool::new(template));

    let app = Router::new()
        .route("/", get(|| async { liveview_shell("/ws").await }))
        .route("/ws", get(liveview_ws::<Counter>))
        .with_state(pool);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:3030").await.unwrap();
    tracing::info!("listening on http://127.0.0.1:3030");
    axum::serve(listener, app).await.unwrap();
}

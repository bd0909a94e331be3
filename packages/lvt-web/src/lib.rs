//! Transport glue around [`lvt_server`]: an `axum` adapter, a
//! backend-agnostic session pump, and the client bootstrap script (spec
//! §6 "External Interfaces").

mod app;
mod axum_adapter;
mod glue;
mod pool;
mod session_task;
mod socket;

pub use app::LiveViewApp;
pub use axum_adapter::{liveview_shell, liveview_ws, AxumSocket};
pub use glue::interpreter_glue;
pub use pool::{LiveViewPool, LiveViewPoolConfig};
pub use session_task::run_session;
pub use socket::{LiveViewSocket, SocketError};

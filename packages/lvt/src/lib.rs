//! `lvt`: a server-side live HTML templating engine in the Phoenix-LiveView
//! lineage. This crate is a thin facade over the four layers this
//! workspace is split into — compile the template once with
//! [`lvt_template::compile`], serve it with [`lvt_web::LiveViewPool`],
//! implement [`lvt_web::LiveViewApp`] for your state, and everything in
//! between (hydration, fingerprinting, diffing, range-op planning,
//! per-session retained state) happens automatically.
//!
//! ```no_run
//! use lvt::prelude::*;
//!
//! #[derive(Clone, serde::Serialize)]
//! struct State { count: i64 }
//!
//! struct Counter;
//!
//! impl LiveViewApp for Counter {
//!     type State = State;
//!
//!     fn init() -> State { State { count: 0 } }
//!
//!     fn change(state: &mut State, action: &str, _data: serde_json::Value) -> Result<(), ValidationError> {
//!         if action == "increment" { state.count += 1; }
//!         Ok(())
//!     }
//! }
//! ```

pub use lvt_core::{
    diff_trees, fingerprint, hydrate, Dynamic, Fingerprint, Func, FuncMap, KeyRegistry,
    RangeItem, RangeWrapper, RenderError, RenderPayload, TreeNode,
};
pub use lvt_server::{
    ActionMessage, ErrorMessage, SessionHandle, SessionId, SessionRegistry, SessionRenderError,
    SessionRenderer, UpdateMessage, ValidationError,
};
pub use lvt_template::{compile, CompiledTemplate, TemplateSyntaxError};
pub use lvt_web::{interpreter_glue, liveview_shell, liveview_ws, LiveViewApp, LiveViewPool, LiveViewPoolConfig};

/// Everything a typical app needs in scope, grouped for a single `use`.
pub mod prelude {
    pub use crate::{
        compile, fingerprint, liveview_shell, liveview_ws, CompiledTemplate, LiveViewApp,
        LiveViewPool, LiveViewPoolConfig, RenderPayload, SessionId, ValidationError,
    };
}

//! The per-connection façade over the template differencing engine (spec
//! §4.7, C7) plus the process-wide session registry (spec §5).
//!
//! Everything in `lvt-core` is a pure function over its inputs; this crate
//! adds the one piece of retained, owned state the spec calls for: the
//! last tree, last fingerprint, and key registry per session.

mod error;
mod payload;
mod registry;
mod renderer;
mod session_id;

pub use error::{SessionRenderError, ValidationError};
pub use payload::{ActionMessage, ErrorBody, ErrorMessage, UpdateMessage, UpdateMeta};
pub use registry::{SessionHandle, SessionRegistry};
pub use renderer::{SessionRenderer, DEFAULT_RENDER_BUDGET};
pub use session_id::SessionId;

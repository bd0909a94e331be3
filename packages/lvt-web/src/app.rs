//! The application contract (spec §3 "State"): a serializable state value
//! plus a `Change(action)` method. The core treats state as opaque; this
//! trait is the thin seam `lvt-web` uses to construct and mutate it without
//! knowing its shape.

use lvt_server::ValidationError;

pub trait LiveViewApp: Send + Sync + 'static {
    type State: serde::Serialize + Clone + Send + 'static;

    /// The state a freshly connected session starts from.
    fn init() -> Self::State;

    /// Applies a client action to `state` in place. Returning `Err` rejects
    /// the action (spec §7 "ValidationError") without discarding the tree
    /// update — the session renderer still re-renders `state` as it stands
    /// and the rejection surfaces via `meta`.
    fn change(state: &mut Self::State, action: &str, data: serde_json::Value) -> Result<(), ValidationError>;
}

//! Process-wide session registry (spec §5 "Shared resources"): the only
//! shared mutable state in the core. Each entry is independently locked so
//! distinct sessions never contend with one another; only insert/remove of
//! the map itself takes the outer lock, and only briefly.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;

use crate::renderer::SessionRenderer;
use crate::session_id::SessionId;

/// A registered session: its renderer behind a per-entry lock so one
/// session's in-flight render never blocks another's registry lookup.
pub type SessionHandle<S> = Arc<Mutex<SessionRenderer<S>>>;

/// Maps opaque session identifiers to their renderer (spec §5). Sessions
/// are inserted once at connect and removed at disconnect; the map itself
/// is read far more often than written, hence the `RwLock`.
pub struct SessionRegistry<S> {
    sessions: RwLock<FxHashMap<SessionId, SessionHandle<S>>>,
}

impl<S> Default for SessionRegistry<S> {
    fn default() -> Self {
        Self { sessions: RwLock::new(FxHashMap::default()) }
    }
}

impl<S> SessionRegistry<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, renderer: SessionRenderer<S>) -> SessionHandle<S> {
        let id = renderer.id().clone();
        tracing::debug!(session = %id, "session registered");
        let handle = Arc::new(Mutex::new(renderer));
        self.sessions.write().insert(id, Arc::clone(&handle));
        handle
    }

    pub fn get(&self, id: &SessionId) -> Option<SessionHandle<S>> {
        self.sessions.read().get(id).cloned()
    }

    pub fn remove(&self, id: &SessionId) -> Option<SessionHandle<S>> {
        let removed = self.sessions.write().remove(id);
        if removed.is_some() {
            tracing::debug!(session = %id, "session removed");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lvt_core::FuncMap;
    use std::sync::Arc as StdArc;

    #[test]
    fn insert_then_get_round_trips() {
        let registry: SessionRegistry<serde_json::Value> = SessionRegistry::new();
        let tpl = StdArc::new(lvt_template::compile("{{.n}}", &[]).unwrap());
        let renderer = SessionRenderer::new(SessionId::generate(), tpl, StdArc::new(FuncMap::new()));
        let id = renderer.id().clone();
        registry.insert(renderer);
        assert!(registry.get(&id).is_some());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn remove_drops_the_entry() {
        let registry: SessionRegistry<serde_json::Value> = SessionRegistry::new();
        let tpl = StdArc::new(lvt_template::compile("{{.n}}", &[]).unwrap());
        let renderer = SessionRenderer::new(SessionId::generate(), tpl, StdArc::new(FuncMap::new()));
        let id = renderer.id().clone();
        registry.insert(renderer);
        registry.remove(&id);
        assert!(registry.get(&id).is_none());
        assert!(registry.is_empty());
    }
}

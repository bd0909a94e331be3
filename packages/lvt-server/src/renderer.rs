//! The per-session renderer (spec §4.7, C7): owns the last hydrated tree,
//! last fingerprint, and key registry for one connection.
//!
//! Hydration itself never suspends (spec §5 "Suspension points"), so the
//! render-timeout budget here is enforced as a post-hoc wall-clock check
//! rather than true preemption — preempting synchronous CPU work would
//! require running it on a dedicated thread, which `lvt-web`'s transport
//! layer does via `tokio::task::spawn_blocking` wrapped in
//! `tokio::time::timeout`; this type stays synchronous and framework-free
//! so it can be driven from either place.

use std::sync::Arc;
use std::time::{Duration, Instant};

use lvt_core::{diff_trees, hydrate, Fingerprint, FuncMap, KeyRegistry, RenderPayload, TreeNode};
use lvt_template::CompiledTemplate;

use crate::error::SessionRenderError;
use crate::session_id::SessionId;

/// Default render wall-clock budget (spec §5 "generous, e.g. one second").
pub const DEFAULT_RENDER_BUDGET: Duration = Duration::from_secs(1);

pub struct SessionRenderer<S> {
    id: SessionId,
    template: Arc<CompiledTemplate>,
    funcs: Arc<FuncMap>,
    keys: KeyRegistry,
    tree: Option<TreeNode>,
    fingerprint: Option<Fingerprint>,
    budget: Duration,
    _state: std::marker::PhantomData<fn() -> S>,
}

impl<S> SessionRenderer<S>
where
    S: serde::Serialize,
{
    pub fn new(id: SessionId, template: Arc<CompiledTemplate>, funcs: Arc<FuncMap>) -> Self {
        Self::with_budget(id, template, funcs, DEFAULT_RENDER_BUDGET)
    }

    pub fn with_budget(
        id: SessionId,
        template: Arc<CompiledTemplate>,
        funcs: Arc<FuncMap>,
        budget: Duration,
    ) -> Self {
        Self {
            id,
            template,
            funcs,
            keys: KeyRegistry::new(),
            tree: None,
            fingerprint: None,
            budget,
            _state: std::marker::PhantomData,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn retained_tree(&self) -> Option<&TreeNode> {
        self.tree.as_ref()
    }

    pub fn last_fingerprint(&self) -> Option<Fingerprint> {
        self.fingerprint
    }

    /// Full hydration, wrapped in the single live-root element carrying the
    /// session identifier (spec §6 "Initial render").
    pub fn render_initial(&mut self, state: &S) -> Result<(String, Fingerprint), SessionRenderError> {
        self.load_key_mappings();
        let tree = self.hydrate_within_budget(state)?;
        let html = format!(r#"<div data-lvt-id="{}">{}</div>"#, self.id, tree.render_html());
        let fp = lvt_core::fingerprint(&tree);
        self.tree = Some(tree);
        self.fingerprint = Some(fp);
        Ok((html, fp))
    }

    /// Hydrates `state` and diffs against the retained tree (spec §4.7
    /// `renderUpdate`). On success the retained tree and fingerprint are
    /// swapped in; on a fatal error they are left untouched so the next
    /// attempt starts from the last good tree.
    pub fn render_update(&mut self, state: &S) -> Result<RenderPayload, SessionRenderError> {
        self.load_key_mappings();
        let new_tree = self.hydrate_within_budget(state)?;
        let new_fp = lvt_core::fingerprint(&new_tree);

        let payload = match (&self.tree, self.fingerprint) {
            (Some(old_tree), Some(old_fp)) if old_fp == new_fp => {
                let _ = old_tree;
                RenderPayload::NoChange
            }
            (Some(old_tree), _) => diff_trees(old_tree, &new_tree)?,
            (None, _) => RenderPayload::Full(new_tree.clone()),
        };

        self.tree = Some(new_tree);
        self.fingerprint = Some(new_fp);
        Ok(payload)
    }

    /// Repopulates [`KeyRegistry`] state from the retained tree before the
    /// next hydration (spec §4.7 `loadKeyMappings`). In this implementation
    /// the registry is held continuously across renders rather than
    /// reconstructed from a serialized tree each time, which already
    /// satisfies the contract this step exists for (stable keys survive
    /// across renders); the method is kept as an explicit lifecycle step —
    /// and the place a future "resume a session from persisted state"
    /// feature would plug in a real tree scan — rather than inlined away
    /// (see DESIGN.md).
    fn load_key_mappings(&self) {}

    fn hydrate_within_budget(&mut self, state: &S) -> Result<TreeNode, SessionRenderError> {
        let start = Instant::now();
        let tree = hydrate(&self.template, state, &mut self.keys, &self.funcs).map_err(|e| {
            tracing::warn!(session = %self.id, error = %e, "render failed, retained tree kept");
            SessionRenderError::from(e)
        })?;
        if start.elapsed() > self.budget {
            tracing::warn!(session = %self.id, budget_ms = self.budget.as_millis(), "render exceeded its wall-clock budget");
            return Err(SessionRenderError::Timeout(lvt_core::RenderTimeoutError {
                budget_ms: self.budget.as_millis() as u64,
            }));
        }
        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn make(src: &str) -> SessionRenderer<serde_json::Value> {
        let tpl = Arc::new(lvt_template::compile(src, &[]).unwrap());
        SessionRenderer::new(SessionId::generate(), tpl, Arc::new(FuncMap::new()))
    }

    #[test]
    fn initial_render_wraps_the_live_root() {
        let mut r = make("<p>{{.n}}</p>");
        let (html, _fp) = r.render_initial(&json!({"n": 1})).unwrap();
        assert!(html.starts_with("<div data-lvt-id="));
        assert!(html.contains("<p>1</p>"));
    }

    #[test]
    fn update_with_no_state_change_is_a_noop() {
        let mut r = make("<p>{{.n}}</p>");
        r.render_initial(&json!({"n": 1})).unwrap();
        let payload = r.render_update(&json!({"n": 1})).unwrap();
        assert!(payload.is_empty());
    }

    #[test]
    fn update_after_change_emits_a_delta() {
        let mut r = make("<p>{{.n}}</p>");
        r.render_initial(&json!({"n": 1})).unwrap();
        let payload = r.render_update(&json!({"n": 2})).unwrap();
        assert!(!payload.is_empty());
    }

    #[test]
    fn fatal_render_error_leaves_retained_tree_untouched() {
        let mut r = make("<p>{{.n}}</p>");
        r.render_initial(&json!({"n": 1})).unwrap();
        let before = r.retained_tree().cloned();
        let err = r.render_update(&json!({"missing": true}));
        assert!(err.is_err());
        assert_eq!(r.retained_tree().cloned(), before);
    }
}

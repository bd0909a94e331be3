//! Process-wide configuration and shared state for one compiled template
//! (spec §5 "Shared resources"), analogous to the teacher's
//! `dioxus_liveview::LiveViewPool` builder.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use lvt_core::FuncMap;
use lvt_server::{SessionId, SessionRegistry, SessionRenderError, SessionRenderer, DEFAULT_RENDER_BUDGET};
use lvt_template::CompiledTemplate;

use crate::app::LiveViewApp;

/// Per-pool tuning knobs (spec §3 "Config" ambient-stack addition).
#[derive(Debug, Clone)]
pub struct LiveViewPoolConfig {
    /// Wall-clock budget for a single render (spec §5 "Timeouts").
    pub render_budget: Duration,
}

impl Default for LiveViewPoolConfig {
    fn default() -> Self {
        Self { render_budget: DEFAULT_RENDER_BUDGET }
    }
}

/// Everything one template needs to serve live sessions: the compiled
/// template, registered functions, the session registry, and config.
/// Cheap to clone (wrap in `Arc`) since every field it owns directly is
/// itself already reference-counted or `Copy`.
pub struct LiveViewPool<A: LiveViewApp> {
    template: Arc<CompiledTemplate>,
    funcs: Arc<FuncMap>,
    registry: SessionRegistry<A::State>,
    config: LiveViewPoolConfig,
    _app: PhantomData<fn() -> A>,
}

impl<A: LiveViewApp> LiveViewPool<A> {
    pub fn new(template: CompiledTemplate) -> Self {
        Self::with_config(template, FuncMap::new(), LiveViewPoolConfig::default())
    }

    pub fn with_config(template: CompiledTemplate, funcs: FuncMap, config: LiveViewPoolConfig) -> Self {
        Self {
            template: Arc::new(template),
            funcs: Arc::new(funcs),
            registry: SessionRegistry::new(),
            config,
            _app: PhantomData,
        }
    }

    pub fn template(&self) -> &Arc<CompiledTemplate> {
        &self.template
    }

    pub fn funcs(&self) -> &Arc<FuncMap> {
        &self.funcs
    }

    pub fn registry(&self) -> &SessionRegistry<A::State> {
        &self.registry
    }

    pub fn config(&self) -> &LiveViewPoolConfig {
        &self.config
    }

    /// Builds a fresh renderer for a new session. Does not insert it into
    /// the registry — the caller decides when the session becomes visible
    /// (the axum adapter inserts it once `renderInitial` has succeeded).
    pub fn new_renderer(&self) -> SessionRenderer<A::State> {
        SessionRenderer::with_budget(
            SessionId::generate(),
            Arc::clone(&self.template),
            Arc::clone(&self.funcs),
            self.config.render_budget,
        )
    }

    /// Renders a fully server-side initial HTML document (the "full tree
    /// embedded as a JSON island" branch of spec §6, as opposed to the
    /// "first WS message carries the tree" branch `session_task` uses).
    /// Useful for a plain HTTP GET that must work with JavaScript
    /// disabled, or for tests that don't want a socket at all.
    pub fn render_initial_html(&self) -> Result<(SessionId, String), SessionRenderError> {
        let mut renderer = self.new_renderer();
        let id = renderer.id().clone();
        let state = A::init();
        let (html, _fp) = renderer.render_initial(&state)?;
        self.registry.insert(renderer);
        Ok((id, html))
    }
}

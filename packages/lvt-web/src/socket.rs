//! Transport abstraction over one live connection (spec §6 "Transport
//! (WebSocket or HTTP fallback)"). Backends adapt their native primitive to
//! this trait once; the session pump (`session_task`) is written against
//! the trait and never against a specific web framework, mirroring the
//! teacher's per-backend socket adapters (`axum_socket`, `warp_socket`, …)
//! behind one shared pump.

#[derive(Debug, Clone, thiserror::Error)]
#[error("transport error: {0}")]
pub struct SocketError(pub String);

#[async_trait::async_trait]
pub trait LiveViewSocket: Send {
    /// The next client message, or `None` on a clean close.
    async fn recv(&mut self) -> Option<Result<String, SocketError>>;
    async fn send(&mut self, message: String) -> Result<(), SocketError>;
}

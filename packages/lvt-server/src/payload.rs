//! Wire message shapes (spec §6 "External Interfaces"). All JSON, exchanged
//! over whatever transport `lvt-web` provides.

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

/// `{action: string, data: object}` sent by the client.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionMessage {
    pub action: String,
    #[serde(default)]
    pub data: Json,
}

/// `{tree: <payload>, meta?: {...}}` sent to the client after an action or
/// on initial mount.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateMessage {
    pub tree: Json,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<UpdateMeta>,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct UpdateMeta {
    pub success: bool,
    #[serde(skip_serializing_if = "std::collections::BTreeMap::is_empty", default)]
    pub errors: std::collections::BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

/// `{error: {kind, message, position?}}` sent when a render is fatally
/// rejected (spec §7).
#[derive(Debug, Clone, Serialize)]
pub struct ErrorMessage {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub kind: &'static str,
    pub message: String,
}

impl ErrorMessage {
    pub fn from_session_error(err: &crate::error::SessionRenderError) -> Self {
        let kind = match err {
            crate::error::SessionRenderError::Template(_) => "TemplateSyntaxError",
            crate::error::SessionRenderError::Render(lvt_core::RenderError::DuplicateKey(_)) => "DuplicateKeyError",
            crate::error::SessionRenderError::Render(_) => "RenderError",
            crate::error::SessionRenderError::RangeInvariant(_) => "RangeInvariantError",
            crate::error::SessionRenderError::Timeout(_) => "RenderTimeoutError",
        };
        ErrorMessage { error: ErrorBody { kind, message: err.to_string() } }
    }
}

//! View rendering seam.
//!
//! Admin handlers never build pages themselves; they hand a view name and a
//! JSON payload to the [`ViewRenderer`] held in [`crate::state::AppState`].

use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

/// Turns a view name plus data into an HTTP response.
pub trait ViewRenderer: Send + Sync {
    fn render(&self, view: &str, data: Value) -> Response;
}

/// Renders views as `{"view": name, "data": payload}` JSON for a client-side
/// front end.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonViewRenderer;

impl ViewRenderer for JsonViewRenderer {
    fn render(&self, view: &str, data: Value) -> Response {
        Json(json!({
            "view": view,
            "data": data,
        }))
        .into_response()
    }
}

use std::time::Instant;

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use tracing::{debug, error};

use terminus_core::render;

use crate::state::AppState;

const TEMPLATE_ERROR: &str = "Can't process template string";
const ENCODE_ERROR: &str = "Error processing facts";

// ============================================================
// Health
// ============================================================

pub(crate) async fn handle_health() -> &'static str {
    "ok"
}

// ============================================================
// Facts
// ============================================================

/// Runs one collection per request.
///
/// An empty body returns the document as JSON; anything else is treated as a
/// template and rendered against the document.
pub(crate) async fn handle_facts(State(state): State<AppState>, body: String) -> Response {
    let start = Instant::now();
    let source = state.source.clone();

    let result = tokio::task::spawn_blocking(move || {
        let doc = source.collect_document();
        if body.is_empty() {
            render::to_json_pretty(&doc)
                .map(|json| ("application/json", json))
                .map_err(|e| (ENCODE_ERROR, e))
        } else {
            render::render_template(&body, &doc)
                .map(|text| ("text/plain; charset=utf-8", text))
                .map_err(|e| (TEMPLATE_ERROR, e))
        }
    })
    .await;

    match result {
        Ok(Ok((content_type, text))) => {
            debug!(
                elapsed_ms = start.elapsed().as_millis() as u64,
                bytes = text.len(),
                "facts served"
            );
            ([(header::CONTENT_TYPE, content_type)], text).into_response()
        }
        Ok(Err((message, e))) => {
            error!(error = %e, "cannot render facts");
            (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
        }
        Err(e) => {
            error!(error = %e, "collection task failed");
            (StatusCode::INTERNAL_SERVER_ERROR, ENCODE_ERROR).into_response()
        }
    }
}

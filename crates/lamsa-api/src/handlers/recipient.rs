//! Recipient preference management.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// PUT /api/recipients/{id}/preferences — replace a recipient's
/// notification preferences.
///
/// The body is stored as-is; unknown fields are preserved and missing
/// fields fall back to the permissive defaults at read time.
pub async fn update_preferences(
    State(state): State<AppState>,
    Path(recipient_id): Path<Uuid>,
    Json(preferences): Json<serde_json::Value>,
) -> Result<StatusCode, ApiError> {
    state
        .directory
        .upsert_preferences(recipient_id, &preferences)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

//! Notification intake and delivery queries.

use axum::extract::{Path, State};
use axum::Json;
use uuid::Uuid;

use lamsa_core::error::AppError;
use lamsa_entity::notification::{DeliveryRecord, DeliveryStats, NotificationRequest};

use crate::dto::{ApiResponse, DispatchRequestBody, DispatchResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/notifications — dispatch one notification.
pub async fn dispatch(
    State(state): State<AppState>,
    Json(body): Json<DispatchRequestBody>,
) -> Result<Json<ApiResponse<DispatchResponse>>, ApiError> {
    if body.channels.is_empty() {
        return Err(AppError::validation("At least one channel is required").into());
    }

    let recipient = state
        .directory
        .find(body.recipient_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Recipient {} not found", body.recipient_id)))?;

    let mut request = NotificationRequest::new(body.event, recipient, body.channels)
        .with_data(body.data)
        .with_priority(body.priority);
    request.expires_at = body.expires_at;

    let result = state.dispatcher.dispatch(request).await?;

    Ok(Json(ApiResponse::ok(DispatchResponse {
        success: result.success,
        notification_id: result.notification_id,
        error: result.error,
        deliveries: result.deliveries,
    })))
}

/// GET /api/notifications/{id}/deliveries — per-channel delivery rows.
pub async fn deliveries(
    State(state): State<AppState>,
    Path(notification_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<DeliveryRecord>>>, ApiError> {
    let rows = state.store.find_by_notification(notification_id).await?;
    Ok(Json(ApiResponse::ok(rows)))
}

/// GET /api/notifications/{id}/stats — counts by status.
pub async fn stats(
    State(state): State<AppState>,
    Path(notification_id): Path<Uuid>,
) -> Result<Json<ApiResponse<DeliveryStats>>, ApiError> {
    let stats = state.store.stats(notification_id).await?;
    Ok(Json(ApiResponse::ok(stats)))
}

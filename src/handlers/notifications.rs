// src/handlers/notifications.rs

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::base::Entity,
    models::notifications::Notification,
};

/// Notificações do próprio chamador, da mais recente para a mais antiga.
#[utoipa::path(
    get,
    path = "/api/notifications",
    tag = "Notifications",
    security(("api_jwt" = [])),
    responses((status = 200, body = [Notification]))
)]
pub async fn list(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Vec<Notification>>, AppError> {
    let mut notifications: Vec<Notification> = app_state
        .storage
        .get_all::<Notification>(false)?
        .into_iter()
        .filter(|n| n.user_id == user.id())
        .collect();
    notifications.sort_by(|a, b| b.base.created_at.cmp(&a.base.created_at));
    Ok(Json(notifications))
}

#[utoipa::path(
    post,
    path = "/api/notifications/{id}/read",
    tag = "Notifications",
    security(("api_jwt" = [])),
    responses(
        (status = 200, body = Notification),
        (status = 403, description = "Notificação de outro usuário"),
    )
)]
pub async fn mark_read(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Notification>, AppError> {
    let updated = app_state
        .storage
        .update_with::<Notification>(id, |notification| {
            if notification.user_id != user.id() {
                return Err(AppError::PermissionDenied("ler notificações de outra pessoa"));
            }
            notification.read = true;
            Ok(())
        })?
        .ok_or(AppError::NotFound(Notification::LABEL))?;
    Ok(Json(updated))
}

#[utoipa::path(
    post,
    path = "/api/notifications/read-all",
    tag = "Notifications",
    security(("api_jwt" = [])),
    responses((status = 200, description = "Todas as notificações do chamador marcadas como lidas"))
)]
pub async fn mark_all_read(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Value>, AppError> {
    let mine: Vec<Uuid> = app_state
        .storage
        .get_all::<Notification>(false)?
        .into_iter()
        .filter(|n| n.user_id == user.id() && !n.read)
        .map(|n| n.id())
        .collect();

    for id in &mine {
        app_state.storage.update_with::<Notification>(*id, |n| {
            n.read = true;
            Ok(())
        })?;
    }
    Ok(Json(json!({ "success": true, "updated": mine.len() })))
}

// src/handlers/ratings.rs

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
    models::auth::UserRole,
    models::finance::{CreateRatingPayload, Rating},
};

#[utoipa::path(
    get,
    path = "/api/ratings",
    tag = "Ratings",
    security(("api_jwt" = [])),
    responses((status = 200, body = [Rating]))
)]
pub async fn list(
    State(app_state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
) -> Result<Json<Vec<Rating>>, AppError> {
    Ok(Json(app_state.rating_service.list()?))
}

#[utoipa::path(
    get,
    path = "/api/scales/{id}/ratings",
    tag = "Ratings",
    security(("api_jwt" = [])),
    responses((status = 200, description = "Avaliações da escala", body = [Rating]))
)]
pub async fn for_scale(
    State(app_state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Path(scale_id): Path<Uuid>,
) -> Result<Json<Vec<Rating>>, AppError> {
    Ok(Json(app_state.rating_service.for_scale(scale_id)?))
}

/// Registra a avaliação e recompõe a média do avaliado.
#[utoipa::path(
    post,
    path = "/api/ratings",
    tag = "Ratings",
    security(("api_jwt" = [])),
    request_body = CreateRatingPayload,
    responses((status = 200, body = Rating))
)]
pub async fn create(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Json(payload): Json<CreateRatingPayload>,
) -> Result<Json<Rating>, AppError> {
    Ok(Json(app_state.rating_service.create(&actor, payload)?))
}

#[utoipa::path(
    delete,
    path = "/api/ratings/{id}",
    tag = "Ratings",
    security(("api_jwt" = [])),
    responses(
        (status = 200, description = "Avaliação excluída (lógico)"),
        (status = 403, description = "Somente administradores"),
    )
)]
pub async fn delete(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    if actor.role != UserRole::Admin {
        return Err(AppError::PermissionDenied("excluir avaliações"));
    }
    if !app_state.rating_service.delete(&actor, id)? {
        return Err(AppError::NotFound("Avaliação"));
    }
    Ok(Json(json!({ "success": true })))
}

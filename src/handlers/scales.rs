// src/handlers/scales.rs

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{RequirePermission, ScalesCreate, ScalesDelete, ScalesEdit, ScalesView},
    },
    models::auth::UserRole,
    models::base::Entity,
    models::rbac::Module,
    models::scales::{CancellationOutcome, CheckPayload, Scale, UpsertScalePayload},
};

#[utoipa::path(
    get,
    path = "/api/scales",
    tag = "Scales",
    security(("api_jwt" = [])),
    responses((status = 200, description = "Escalas visíveis ao chamador", body = [Scale]))
)]
pub async fn list(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _perm: RequirePermission<ScalesView>,
) -> Result<Json<Vec<Scale>>, AppError> {
    let view_all = app_state
        .permission_service
        .scope_is_all(user.role, Module::Scales)?;
    Ok(Json(app_state.scale_service.list(&user, view_all)?))
}

#[utoipa::path(
    get,
    path = "/api/scales/{id}",
    tag = "Scales",
    security(("api_jwt" = [])),
    responses((status = 200, body = Scale), (status = 404, description = "Escala não encontrada"))
)]
pub async fn get(
    State(app_state): State<AppState>,
    _perm: RequirePermission<ScalesView>,
    Path(id): Path<Uuid>,
) -> Result<Json<Scale>, AppError> {
    Ok(Json(app_state.scale_service.get(id)?))
}

#[utoipa::path(
    post,
    path = "/api/scales",
    tag = "Scales",
    security(("api_jwt" = [])),
    request_body = UpsertScalePayload,
    responses((status = 200, description = "Escala criada como rascunho", body = Scale))
)]
pub async fn create(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    _perm: RequirePermission<ScalesCreate>,
    Json(payload): Json<UpsertScalePayload>,
) -> Result<Json<Scale>, AppError> {
    Ok(Json(app_state.scale_service.create(&actor, payload)?))
}

#[utoipa::path(
    put,
    path = "/api/scales/{id}",
    tag = "Scales",
    security(("api_jwt" = [])),
    request_body = UpsertScalePayload,
    responses((status = 200, body = Scale))
)]
pub async fn update(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    _perm: RequirePermission<ScalesEdit>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpsertScalePayload>,
) -> Result<Json<Scale>, AppError> {
    Ok(Json(app_state.scale_service.update(&actor, id, payload)?))
}

#[utoipa::path(
    post,
    path = "/api/scales/{id}/publish",
    tag = "Scales",
    security(("api_jwt" = [])),
    responses(
        (status = 200, body = Scale),
        (status = 422, description = "Só rascunhos podem ser publicados"),
    )
)]
pub async fn publish(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    _perm: RequirePermission<ScalesEdit>,
    Path(id): Path<Uuid>,
) -> Result<Json<Scale>, AppError> {
    Ok(Json(app_state.scale_service.publish(&actor, id)?))
}

#[utoipa::path(
    post,
    path = "/api/scales/{id}/start",
    tag = "Scales",
    security(("api_jwt" = [])),
    responses((status = 200, body = Scale))
)]
pub async fn start(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    _perm: RequirePermission<ScalesEdit>,
    Path(id): Path<Uuid>,
) -> Result<Json<Scale>, AppError> {
    Ok(Json(app_state.scale_service.start(&actor, id)?))
}

#[utoipa::path(
    post,
    path = "/api/scales/{id}/complete",
    tag = "Scales",
    security(("api_jwt" = [])),
    responses((status = 200, body = Scale))
)]
pub async fn complete(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    _perm: RequirePermission<ScalesEdit>,
    Path(id): Path<Uuid>,
) -> Result<Json<Scale>, AppError> {
    Ok(Json(app_state.scale_service.complete(&actor, id)?))
}

/// O cancelamento sempre acontece; `withinDeadline` diz se ainda estava
/// no prazo livre de penalidade.
#[utoipa::path(
    post,
    path = "/api/scales/{id}/cancel",
    tag = "Scales",
    security(("api_jwt" = [])),
    responses(
        (status = 200, body = CancellationOutcome),
        (status = 422, description = "Escala em andamento ou concluída não cancela"),
    )
)]
pub async fn cancel(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    _perm: RequirePermission<ScalesEdit>,
    Path(id): Path<Uuid>,
) -> Result<Json<CancellationOutcome>, AppError> {
    let today = Utc::now().date_naive();
    Ok(Json(app_state.scale_service.cancel(&actor, id, today)?))
}

/// Check-in do médico designado. Posição fora do raio é registrada como
/// não verificada, nunca rejeitada.
#[utoipa::path(
    post,
    path = "/api/scales/{id}/check-in",
    tag = "Scales",
    security(("api_jwt" = [])),
    request_body = CheckPayload,
    responses((status = 200, body = Scale))
)]
pub async fn check_in(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CheckPayload>,
) -> Result<Json<Scale>, AppError> {
    Ok(Json(
        app_state
            .scale_service
            .check_in(&actor, id, payload.coordinates)?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/scales/{id}/check-out",
    tag = "Scales",
    security(("api_jwt" = [])),
    request_body = CheckPayload,
    responses((status = 200, body = Scale))
)]
pub async fn check_out(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CheckPayload>,
) -> Result<Json<Scale>, AppError> {
    Ok(Json(
        app_state
            .scale_service
            .check_out(&actor, id, payload.coordinates)?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/scales/{id}",
    tag = "Scales",
    security(("api_jwt" = [])),
    responses((status = 200, description = "Escala excluída (lógico)"))
)]
pub async fn delete(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    _perm: RequirePermission<ScalesDelete>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    if !app_state.scale_service.delete(&actor, id)? {
        return Err(AppError::NotFound(Scale::LABEL));
    }
    Ok(Json(json!({ "success": true })))
}

#[utoipa::path(
    delete,
    path = "/api/scales/{id}/hard",
    tag = "Scales",
    security(("api_jwt" = [])),
    responses((status = 403, description = "Apenas administradores"))
)]
pub async fn hard_delete(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    _perm: RequirePermission<ScalesDelete>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    if actor.role != UserRole::Admin {
        return Err(AppError::PermissionDenied("excluir registros definitivamente"));
    }
    if !app_state.scale_service.hard_delete(&actor, id)? {
        return Err(AppError::NotFound(Scale::LABEL));
    }
    Ok(Json(json!({ "success": true })))
}

// src/handlers/candidatures.rs

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{RequirePermission, ScalesEdit, ScalesView},
    },
    models::candidatures::{AdvanceWorkflowPayload, ApplyPayload, Candidature},
    models::rbac::Module,
};

#[utoipa::path(
    get,
    path = "/api/candidatures",
    tag = "Candidatures",
    security(("api_jwt" = [])),
    responses((status = 200, description = "Candidaturas visíveis ao chamador", body = [Candidature]))
)]
pub async fn list(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _perm: RequirePermission<ScalesView>,
) -> Result<Json<Vec<Candidature>>, AppError> {
    let view_all = app_state
        .permission_service
        .scope_is_all(user.role, Module::Scales)?;
    Ok(Json(app_state.candidature_service.list(&user, view_all)?))
}

#[utoipa::path(
    get,
    path = "/api/scales/{id}/candidatures",
    tag = "Candidatures",
    security(("api_jwt" = [])),
    responses((status = 200, body = [Candidature]))
)]
pub async fn for_scale(
    State(app_state): State<AppState>,
    _perm: RequirePermission<ScalesView>,
    Path(scale_id): Path<Uuid>,
) -> Result<Json<Vec<Candidature>>, AppError> {
    Ok(Json(app_state.candidature_service.for_scale(scale_id)?))
}

/// O próprio médico se candidata.
#[utoipa::path(
    post,
    path = "/api/candidatures",
    tag = "Candidatures",
    security(("api_jwt" = [])),
    request_body = ApplyPayload,
    responses(
        (status = 200, body = Candidature),
        (status = 409, description = "Já candidatado ou escala já designada"),
        (status = 422, description = "Escala não está aberta"),
    )
)]
pub async fn apply(
    State(app_state): State<AppState>,
    AuthenticatedUser(doctor): AuthenticatedUser,
    Json(payload): Json<ApplyPayload>,
) -> Result<Json<Candidature>, AppError> {
    Ok(Json(
        app_state.candidature_service.apply(&doctor, payload.scale_id)?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/candidatures/{id}/waiting",
    tag = "Candidatures",
    security(("api_jwt" = [])),
    responses((status = 200, body = Candidature))
)]
pub async fn mark_waiting(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    _perm: RequirePermission<ScalesEdit>,
    Path(id): Path<Uuid>,
) -> Result<Json<Candidature>, AppError> {
    Ok(Json(app_state.candidature_service.mark_waiting(&actor, id)?))
}

/// Aceita a candidatura: designa o médico e nega as concorrentes.
#[utoipa::path(
    post,
    path = "/api/candidatures/{id}/accept",
    tag = "Candidatures",
    security(("api_jwt" = [])),
    responses(
        (status = 200, body = Candidature),
        (status = 409, description = "Escala já designada ou candidatura já respondida"),
    )
)]
pub async fn accept(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    _perm: RequirePermission<ScalesEdit>,
    Path(id): Path<Uuid>,
) -> Result<Json<Candidature>, AppError> {
    Ok(Json(app_state.candidature_service.accept(&actor, id)?))
}

#[utoipa::path(
    post,
    path = "/api/candidatures/{id}/deny",
    tag = "Candidatures",
    security(("api_jwt" = [])),
    responses((status = 200, body = Candidature))
)]
pub async fn deny(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    _perm: RequirePermission<ScalesEdit>,
    Path(id): Path<Uuid>,
) -> Result<Json<Candidature>, AppError> {
    Ok(Json(app_state.candidature_service.deny(&actor, id)?))
}

/// Avança o fluxo pós-aceite (1 a 6). Nunca regride; a etapa 6 registra o
/// pagamento do plantão.
#[utoipa::path(
    post,
    path = "/api/candidatures/{id}/workflow",
    tag = "Candidatures",
    security(("api_jwt" = [])),
    request_body = AdvanceWorkflowPayload,
    responses(
        (status = 200, body = Candidature),
        (status = 422, description = "Regressão ou etapa inválida"),
    )
)]
pub async fn advance_workflow(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    _perm: RequirePermission<ScalesEdit>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AdvanceWorkflowPayload>,
) -> Result<Json<Candidature>, AppError> {
    Ok(Json(
        app_state
            .candidature_service
            .advance_workflow(&actor, id, payload.step)?,
    ))
}

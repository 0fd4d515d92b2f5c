// src/handlers/rbac.rs

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{RequirePermission, SettingsEdit, SettingsView},
    },
    models::rbac::{ResolvedPermissions, RoleProfile, UpsertRoleProfilePayload},
    services::PermissionService,
};

#[utoipa::path(
    get,
    path = "/api/profiles",
    tag = "RBAC",
    security(("api_jwt" = [])),
    responses((status = 200, body = [RoleProfile]))
)]
pub async fn list_profiles(
    State(app_state): State<AppState>,
    _perm: RequirePermission<SettingsView>,
) -> Result<Json<Vec<RoleProfile>>, AppError> {
    Ok(Json(app_state.permission_service.list_profiles()?))
}

/// Cópia para edição, com a matriz totalmente resolvida.
#[utoipa::path(
    get,
    path = "/api/profiles/{id}",
    tag = "RBAC",
    security(("api_jwt" = [])),
    responses((status = 200, body = RoleProfile))
)]
pub async fn get_profile(
    State(app_state): State<AppState>,
    _perm: RequirePermission<SettingsView>,
    Path(id): Path<Uuid>,
) -> Result<Json<RoleProfile>, AppError> {
    Ok(Json(app_state.permission_service.open_for_edit(id)?))
}

/// Matriz resolvida do próprio chamador, para o cliente montar a UI.
#[utoipa::path(
    get,
    path = "/api/profiles/me/permissions",
    tag = "RBAC",
    security(("api_jwt" = [])),
    responses((status = 200, body = ResolvedPermissions))
)]
pub async fn my_permissions(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<ResolvedPermissions>, AppError> {
    Ok(Json(
        app_state.permission_service.resolved_for_role(user.role)?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/profiles",
    tag = "RBAC",
    security(("api_jwt" = [])),
    request_body = UpsertRoleProfilePayload,
    responses((status = 200, body = RoleProfile))
)]
pub async fn create_profile(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    _perm: RequirePermission<SettingsEdit>,
    Json(payload): Json<UpsertRoleProfilePayload>,
) -> Result<Json<RoleProfile>, AppError> {
    payload.validate()?;
    Ok(Json(
        app_state.permission_service.create_profile(&actor, payload)?,
    ))
}

#[utoipa::path(
    put,
    path = "/api/profiles/{id}",
    tag = "RBAC",
    security(("api_jwt" = [])),
    request_body = UpsertRoleProfilePayload,
    responses((status = 200, body = RoleProfile))
)]
pub async fn update_profile(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    _perm: RequirePermission<SettingsEdit>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpsertRoleProfilePayload>,
) -> Result<Json<RoleProfile>, AppError> {
    payload.validate()?;
    Ok(Json(
        app_state
            .permission_service
            .update_profile(&actor, id, payload)?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/profiles/{id}",
    tag = "RBAC",
    security(("api_jwt" = [])),
    responses((status = 200, description = "Perfil excluído (lógico)"))
)]
pub async fn delete_profile(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    _perm: RequirePermission<SettingsEdit>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    if !app_state.permission_service.delete_profile(&actor, id)? {
        return Err(AppError::NotFound("Perfil"));
    }
    Ok(Json(json!({ "success": true })))
}

/// Referência para clientes: a matriz resolvida de um payload qualquer,
/// sem gravar nada.
#[utoipa::path(
    post,
    path = "/api/profiles/preview",
    tag = "RBAC",
    security(("api_jwt" = [])),
    request_body = UpsertRoleProfilePayload,
    responses((status = 200, body = ResolvedPermissions))
)]
pub async fn preview_resolution(
    _perm: RequirePermission<SettingsView>,
    Json(payload): Json<UpsertRoleProfilePayload>,
) -> Json<ResolvedPermissions> {
    Json(PermissionService::resolve(&payload.permissions))
}

// src/handlers/catalog.rs
//
// Cadastros de referência: especialidades e tipos de escala.

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
        rbac::{RequirePermission, SettingsEdit},
    },
    models::base::Entity,
    models::catalog::{ScaleType, Specialty, UpsertScaleTypePayload, UpsertSpecialtyPayload},
};

#[utoipa::path(
    get,
    path = "/api/specialties",
    tag = "Catalog",
    security(("api_jwt" = [])),
    responses((status = 200, body = [Specialty]))
)]
pub async fn list_specialties(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<Specialty>>, AppError> {
    Ok(Json(app_state.storage.get_all(false)?))
}

#[utoipa::path(
    post,
    path = "/api/specialties",
    tag = "Catalog",
    security(("api_jwt" = [])),
    request_body = UpsertSpecialtyPayload,
    responses((status = 200, body = Specialty))
)]
pub async fn create_specialty(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    _perm: RequirePermission<SettingsEdit>,
    Json(payload): Json<UpsertSpecialtyPayload>,
) -> Result<Json<Specialty>, AppError> {
    payload.validate()?;

    let created = app_state.storage.create(Specialty {
        base: Default::default(),
        name: payload.name,
        description: payload.description,
        scale_type_ids: payload.scale_type_ids,
    })?;

    app_state.storage.log_audit(
        actor.id(),
        &actor.name,
        "CREATE",
        Specialty::LABEL,
        created.id(),
        Some(json!({ "name": created.name })),
    )?;
    Ok(Json(created))
}

#[utoipa::path(
    put,
    path = "/api/specialties/{id}",
    tag = "Catalog",
    security(("api_jwt" = [])),
    request_body = UpsertSpecialtyPayload,
    responses((status = 200, body = Specialty))
)]
pub async fn update_specialty(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    _perm: RequirePermission<SettingsEdit>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpsertSpecialtyPayload>,
) -> Result<Json<Specialty>, AppError> {
    payload.validate()?;

    let updated = app_state
        .storage
        .update_with::<Specialty>(id, |specialty| {
            specialty.name = payload.name.clone();
            specialty.description = payload.description.clone();
            specialty.scale_type_ids = payload.scale_type_ids.clone();
            Ok(())
        })?
        .ok_or(AppError::NotFound(Specialty::LABEL))?;

    app_state
        .storage
        .log_audit(actor.id(), &actor.name, "UPDATE", Specialty::LABEL, id, None)?;
    Ok(Json(updated))
}

#[utoipa::path(
    delete,
    path = "/api/specialties/{id}",
    tag = "Catalog",
    security(("api_jwt" = [])),
    responses((status = 200, description = "Especialidade excluída (lógico)"))
)]
pub async fn delete_specialty(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    _perm: RequirePermission<SettingsEdit>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    if !app_state.storage.soft_delete::<Specialty>(id)? {
        return Err(AppError::NotFound(Specialty::LABEL));
    }
    app_state
        .storage
        .log_audit(actor.id(), &actor.name, "DELETE", Specialty::LABEL, id, None)?;
    Ok(Json(json!({ "success": true })))
}

#[utoipa::path(
    get,
    path = "/api/scale-types",
    tag = "Catalog",
    security(("api_jwt" = [])),
    responses((status = 200, body = [ScaleType]))
)]
pub async fn list_scale_types(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<ScaleType>>, AppError> {
    Ok(Json(app_state.storage.get_all(false)?))
}

#[utoipa::path(
    post,
    path = "/api/scale-types",
    tag = "Catalog",
    security(("api_jwt" = [])),
    request_body = UpsertScaleTypePayload,
    responses((status = 200, body = ScaleType))
)]
pub async fn create_scale_type(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    _perm: RequirePermission<SettingsEdit>,
    Json(payload): Json<UpsertScaleTypePayload>,
) -> Result<Json<ScaleType>, AppError> {
    payload.validate()?;

    let created = app_state.storage.create(ScaleType {
        base: Default::default(),
        name: payload.name,
        description: payload.description,
        default_duration_hours: payload.default_duration_hours,
        default_shift: payload.default_shift,
    })?;

    app_state.storage.log_audit(
        actor.id(),
        &actor.name,
        "CREATE",
        ScaleType::LABEL,
        created.id(),
        Some(json!({ "name": created.name })),
    )?;
    Ok(Json(created))
}

#[utoipa::path(
    put,
    path = "/api/scale-types/{id}",
    tag = "Catalog",
    security(("api_jwt" = [])),
    request_body = UpsertScaleTypePayload,
    responses((status = 200, body = ScaleType))
)]
pub async fn update_scale_type(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    _perm: RequirePermission<SettingsEdit>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpsertScaleTypePayload>,
) -> Result<Json<ScaleType>, AppError> {
    payload.validate()?;

    let updated = app_state
        .storage
        .update_with::<ScaleType>(id, |scale_type| {
            scale_type.name = payload.name.clone();
            scale_type.description = payload.description.clone();
            scale_type.default_duration_hours = payload.default_duration_hours;
            scale_type.default_shift = payload.default_shift;
            Ok(())
        })?
        .ok_or(AppError::NotFound(ScaleType::LABEL))?;

    app_state
        .storage
        .log_audit(actor.id(), &actor.name, "UPDATE", ScaleType::LABEL, id, None)?;
    Ok(Json(updated))
}

#[utoipa::path(
    delete,
    path = "/api/scale-types/{id}",
    tag = "Catalog",
    security(("api_jwt" = [])),
    responses((status = 200, description = "Tipo de escala excluído (lógico)"))
)]
pub async fn delete_scale_type(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    _perm: RequirePermission<SettingsEdit>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    if !app_state.storage.soft_delete::<ScaleType>(id)? {
        return Err(AppError::NotFound(ScaleType::LABEL));
    }
    app_state
        .storage
        .log_audit(actor.id(), &actor.name, "DELETE", ScaleType::LABEL, id, None)?;
    Ok(Json(json!({ "success": true })))
}

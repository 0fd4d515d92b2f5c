// src/handlers/locations.rs

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    common::geo::Coordinates,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{LocationsCreate, LocationsDelete, LocationsEdit, LocationsView, RequirePermission},
    },
    models::base::Entity,
    models::locations::{Location, UpsertLocationPayload},
    services::cep_service::CepAddress,
};

#[utoipa::path(
    get,
    path = "/api/locations",
    tag = "Locations",
    security(("api_jwt" = [])),
    responses((status = 200, body = [Location]))
)]
pub async fn list(
    State(app_state): State<AppState>,
    _perm: RequirePermission<LocationsView>,
) -> Result<Json<Vec<Location>>, AppError> {
    Ok(Json(app_state.storage.get_all(false)?))
}

#[utoipa::path(
    get,
    path = "/api/locations/{id}",
    tag = "Locations",
    security(("api_jwt" = [])),
    responses((status = 200, body = Location), (status = 404, description = "Local não encontrado"))
)]
pub async fn get(
    State(app_state): State<AppState>,
    _perm: RequirePermission<LocationsView>,
    Path(id): Path<Uuid>,
) -> Result<Json<Location>, AppError> {
    let location = app_state
        .storage
        .get_by_id::<Location>(id)?
        .ok_or(AppError::NotFound(Location::LABEL))?;
    Ok(Json(location))
}

#[utoipa::path(
    post,
    path = "/api/locations",
    tag = "Locations",
    security(("api_jwt" = [])),
    request_body = UpsertLocationPayload,
    responses((status = 200, body = Location))
)]
pub async fn create(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    _perm: RequirePermission<LocationsCreate>,
    Json(payload): Json<UpsertLocationPayload>,
) -> Result<Json<Location>, AppError> {
    payload.validate()?;

    let coordinates = match (payload.lat, payload.lng) {
        (Some(lat), Some(lng)) => Some(Coordinates { lat, lng }),
        _ => None,
    };

    let created = app_state.storage.create(Location {
        base: Default::default(),
        name: payload.name,
        kind: payload.kind,
        address: payload.address.into(),
        coordinates,
        phone: payload.phone,
        email: payload.email,
        average_rating: None,
    })?;

    app_state.storage.log_audit(
        actor.id(),
        &actor.name,
        "CREATE",
        Location::LABEL,
        created.id(),
        Some(json!({ "name": created.name })),
    )?;
    Ok(Json(created))
}

#[utoipa::path(
    put,
    path = "/api/locations/{id}",
    tag = "Locations",
    security(("api_jwt" = [])),
    request_body = UpsertLocationPayload,
    responses((status = 200, body = Location))
)]
pub async fn update(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    _perm: RequirePermission<LocationsEdit>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpsertLocationPayload>,
) -> Result<Json<Location>, AppError> {
    payload.validate()?;

    let coordinates = match (payload.lat, payload.lng) {
        (Some(lat), Some(lng)) => Some(Coordinates { lat, lng }),
        _ => None,
    };

    let updated = app_state
        .storage
        .update_with::<Location>(id, |location| {
            location.name = payload.name.clone();
            location.kind = payload.kind;
            location.address = payload.address.clone().into();
            location.coordinates = coordinates;
            location.phone = payload.phone.clone();
            location.email = payload.email.clone();
            Ok(())
        })?
        .ok_or(AppError::NotFound(Location::LABEL))?;

    app_state.storage.log_audit(
        actor.id(),
        &actor.name,
        "UPDATE",
        Location::LABEL,
        id,
        Some(json!({ "name": updated.name })),
    )?;
    Ok(Json(updated))
}

#[utoipa::path(
    delete,
    path = "/api/locations/{id}",
    tag = "Locations",
    security(("api_jwt" = [])),
    responses((status = 200, description = "Local excluído (lógico)"))
)]
pub async fn delete(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    _perm: RequirePermission<LocationsDelete>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    if !app_state.storage.soft_delete::<Location>(id)? {
        return Err(AppError::NotFound(Location::LABEL));
    }
    app_state
        .storage
        .log_audit(actor.id(), &actor.name, "DELETE", Location::LABEL, id, None)?;
    Ok(Json(json!({ "success": true })))
}

/// Consulta de endereço por CEP. Falha de rede nunca vira erro HTTP: o
/// resultado só vem vazio.
#[utoipa::path(
    get,
    path = "/api/locations/cep/{cep}",
    tag = "Locations",
    security(("api_jwt" = [])),
    responses((status = 200, description = "Endereço encontrado, ou nulo", body = CepAddress))
)]
pub async fn lookup_cep(
    State(app_state): State<AppState>,
    Path(cep): Path<String>,
) -> Result<Json<Option<CepAddress>>, AppError> {
    Ok(Json(app_state.cep_service.lookup(&cep).await))
}

// src/handlers/users.rs

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
        rbac::{RequirePermission, UsersCreate, UsersDelete, UsersEdit, UsersView},
    },
    models::auth::{UpsertUserPayload, UserProfile, UserRole},
    models::base::Entity,
    models::rbac::Module,
};

/// Sem `viewAll`, a listagem se restringe ao próprio usuário e aos seus
/// subordinados diretos.
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    security(("api_jwt" = [])),
    responses((status = 200, description = "Usuários visíveis ao chamador", body = [UserProfile]))
)]
pub async fn list(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _perm: RequirePermission<UsersView>,
) -> Result<Json<Vec<UserProfile>>, AppError> {
    let view_all = app_state
        .permission_service
        .scope_is_all(user.role, Module::Users)?;

    let users = app_state.user_repo.all(false)?;
    let visible: Vec<UserProfile> = if view_all {
        users
    } else {
        let mut visible_ids = vec![user.id()];
        if let Some(subordinates) = &user.subordinate_ids {
            visible_ids.extend(subordinates.iter().copied());
        }
        users
            .into_iter()
            .filter(|u| visible_ids.contains(&u.id()))
            .collect()
    };

    Ok(Json(visible.into_iter().map(UserProfile::sanitized).collect()))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "Users",
    security(("api_jwt" = [])),
    responses(
        (status = 200, body = UserProfile),
        (status = 404, description = "Usuário não encontrado"),
    )
)]
pub async fn get(
    State(app_state): State<AppState>,
    _perm: RequirePermission<UsersView>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserProfile>, AppError> {
    let user = app_state
        .user_repo
        .find_by_id(id)?
        .ok_or(AppError::NotFound(UserProfile::LABEL))?;
    Ok(Json(user.sanitized()))
}

/// Criação administrativa: o usuário entra sem senha e define a sua pelo
/// fluxo de recuperação.
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "Users",
    security(("api_jwt" = [])),
    request_body = UpsertUserPayload,
    responses(
        (status = 200, body = UserProfile),
        (status = 409, description = "Email ou CPF já cadastrado"),
    )
)]
pub async fn create(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    _perm: RequirePermission<UsersCreate>,
    Json(payload): Json<UpsertUserPayload>,
) -> Result<Json<UserProfile>, AppError> {
    payload.validate()?;

    let user = UserProfile {
        base: Default::default(),
        name: payload.name,
        email: payload.email,
        phone: payload.phone,
        cpf: payload.cpf,
        role: payload.role,
        status: payload.status,
        password_hash: String::new(),
        avatar_url: None,
        address: None,
        crm: payload.crm,
        crm_state: payload.crm_state,
        crm_valid: None,
        specialties: payload.specialties,
        manager_id: payload.manager_id,
        subordinate_ids: None,
        average_rating: None,
        completed_scales: Some(0),
        cancellation_rate: Some(0.0),
    };

    let created = app_state.user_repo.create_user(user)?;
    app_state.storage.log_audit(
        actor.id(),
        &actor.name,
        "CREATE",
        UserProfile::LABEL,
        created.id(),
        Some(json!({ "email": created.email })),
    )?;
    Ok(Json(created.sanitized()))
}

#[utoipa::path(
    put,
    path = "/api/users/{id}",
    tag = "Users",
    security(("api_jwt" = [])),
    request_body = UpsertUserPayload,
    responses((status = 200, body = UserProfile))
)]
pub async fn update(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    _perm: RequirePermission<UsersEdit>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpsertUserPayload>,
) -> Result<Json<UserProfile>, AppError> {
    payload.validate()?;

    // unicidade contra os demais registros não excluídos
    if let Some(other) = app_state.user_repo.find_by_email(&payload.email)? {
        if other.id() != id {
            return Err(AppError::EmailAlreadyExists);
        }
    }
    if let Some(other) = app_state.user_repo.find_by_cpf(&payload.cpf)? {
        if other.id() != id {
            return Err(AppError::CpfAlreadyExists);
        }
    }

    let updated = app_state
        .storage
        .update_with::<UserProfile>(id, |user| {
            user.name = payload.name.clone();
            user.email = payload.email.clone();
            user.phone = payload.phone.clone();
            user.cpf = payload.cpf.clone();
            user.role = payload.role;
            user.status = payload.status;
            user.crm = payload.crm.clone();
            user.crm_state = payload.crm_state.clone();
            user.specialties = payload.specialties.clone();
            user.manager_id = payload.manager_id;
            Ok(())
        })?
        .ok_or(AppError::NotFound(UserProfile::LABEL))?;

    app_state.storage.log_audit(
        actor.id(),
        &actor.name,
        "UPDATE",
        UserProfile::LABEL,
        id,
        Some(json!({ "email": updated.email })),
    )?;
    Ok(Json(updated.sanitized()))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "Users",
    security(("api_jwt" = [])),
    responses((status = 200, description = "Usuário excluído (lógico)"))
)]
pub async fn delete(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    _perm: RequirePermission<UsersDelete>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let deleted = app_state.storage.soft_delete::<UserProfile>(id)?;
    if !deleted {
        return Err(AppError::NotFound(UserProfile::LABEL));
    }
    app_state
        .storage
        .log_audit(actor.id(), &actor.name, "DELETE", UserProfile::LABEL, id, None)?;
    Ok(Json(json!({ "success": true })))
}

/// Remoção física. Além da permissão de exclusão, exige o papel de
/// administrador.
#[utoipa::path(
    delete,
    path = "/api/users/{id}/hard",
    tag = "Users",
    security(("api_jwt" = [])),
    responses(
        (status = 200, description = "Usuário removido definitivamente"),
        (status = 403, description = "Apenas administradores"),
    )
)]
pub async fn hard_delete(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    _perm: RequirePermission<UsersDelete>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    if actor.role != UserRole::Admin {
        return Err(AppError::PermissionDenied("excluir registros definitivamente"));
    }

    let removed = app_state.storage.hard_delete::<UserProfile>(id)?;
    if !removed {
        return Err(AppError::NotFound(UserProfile::LABEL));
    }
    app_state.storage.log_audit(
        actor.id(),
        &actor.name,
        "HARD_DELETE",
        UserProfile::LABEL,
        id,
        None,
    )?;
    Ok(Json(json!({ "success": true })))
}

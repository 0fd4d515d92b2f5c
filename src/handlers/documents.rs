// src/handlers/documents.rs

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{DocumentsCreate, DocumentsDelete, DocumentsEdit, DocumentsView, RequirePermission},
    },
    models::base::Entity,
    models::documents::{
        CreateDocumentPayload, Document, DocumentStatus, ReviewDocumentPayload,
    },
    models::notifications::{Notification, NotificationType},
    models::rbac::Module,
};

/// Sem `viewAll`, cada um enxerga os próprios documentos.
#[utoipa::path(
    get,
    path = "/api/documents",
    tag = "Documents",
    security(("api_jwt" = [])),
    responses((status = 200, description = "Documentos visíveis ao chamador", body = [Document]))
)]
pub async fn list(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _perm: RequirePermission<DocumentsView>,
) -> Result<Json<Vec<Document>>, AppError> {
    let view_all = app_state
        .permission_service
        .scope_is_all(user.role, Module::Documents)?;

    let documents = app_state.storage.get_all::<Document>(false)?;
    if view_all {
        return Ok(Json(documents));
    }

    let mut visible_ids = vec![user.id()];
    if let Some(subordinates) = &user.subordinate_ids {
        visible_ids.extend(subordinates.iter().copied());
    }
    Ok(Json(
        documents
            .into_iter()
            .filter(|d| visible_ids.contains(&d.user_id))
            .collect(),
    ))
}

#[utoipa::path(
    post,
    path = "/api/documents",
    tag = "Documents",
    security(("api_jwt" = [])),
    request_body = CreateDocumentPayload,
    responses((status = 200, description = "Documento enviado, pendente de revisão", body = Document))
)]
pub async fn create(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    _perm: RequirePermission<DocumentsCreate>,
    Json(payload): Json<CreateDocumentPayload>,
) -> Result<Json<Document>, AppError> {
    payload.validate()?;

    let created = app_state.storage.create(Document {
        base: Default::default(),
        user_id: payload.user_id,
        name: payload.name,
        category: payload.category,
        file_url: payload.file_url,
        expiration_date: payload.expiration_date,
        status: DocumentStatus::Pendente,
        reviewed_by: None,
        reviewed_at: None,
        review_notes: None,
    })?;

    app_state.storage.log_audit(
        actor.id(),
        &actor.name,
        "CREATE",
        Document::LABEL,
        created.id(),
        Some(json!({ "name": created.name })),
    )?;
    Ok(Json(created))
}

/// Revisão: aprova ou rejeita, com os metadados do revisor.
#[utoipa::path(
    post,
    path = "/api/documents/{id}/review",
    tag = "Documents",
    security(("api_jwt" = [])),
    request_body = ReviewDocumentPayload,
    responses((status = 200, body = Document))
)]
pub async fn review(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    _perm: RequirePermission<DocumentsEdit>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReviewDocumentPayload>,
) -> Result<Json<Document>, AppError> {
    payload.validate()?;

    let status = if payload.approve {
        DocumentStatus::Aprovado
    } else {
        DocumentStatus::Rejeitado
    };

    let reviewed = app_state
        .storage
        .update_with::<Document>(id, |document| {
            document.status = status;
            document.reviewed_by = Some(actor.id());
            document.reviewed_at = Some(Utc::now());
            document.review_notes = payload.review_notes.clone();
            Ok(())
        })?
        .ok_or(AppError::NotFound(Document::LABEL))?;

    let (kind, title, message) = if payload.approve {
        (
            NotificationType::Success,
            "Documento aprovado",
            format!("Seu documento \"{}\" foi aprovado.", reviewed.name),
        )
    } else {
        (
            NotificationType::Warning,
            "Documento rejeitado",
            format!("Seu documento \"{}\" foi rejeitado. Verifique as observações.", reviewed.name),
        )
    };
    app_state
        .storage
        .create(Notification::new(reviewed.user_id, kind, title, &message))?;

    app_state.storage.log_audit(
        actor.id(),
        &actor.name,
        "REVIEW",
        Document::LABEL,
        id,
        Some(json!({ "status": status })),
    )?;
    Ok(Json(reviewed))
}

#[utoipa::path(
    delete,
    path = "/api/documents/{id}",
    tag = "Documents",
    security(("api_jwt" = [])),
    responses((status = 200, description = "Documento excluído (lógico)"))
)]
pub async fn delete(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    _perm: RequirePermission<DocumentsDelete>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    if !app_state.storage.soft_delete::<Document>(id)? {
        return Err(AppError::NotFound(Document::LABEL));
    }
    app_state
        .storage
        .log_audit(actor.id(), &actor.name, "DELETE", Document::LABEL, id, None)?;
    Ok(Json(json!({ "success": true })))
}

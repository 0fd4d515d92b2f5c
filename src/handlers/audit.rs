// src/handlers/audit.rs

use axum::{extract::State, Json};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::audit::AuditLog,
    models::auth::UserRole,
};

/// Trilha de auditoria, do registro mais novo para o mais antigo.
/// Exclusiva de administradores.
#[utoipa::path(
    get,
    path = "/api/audit",
    tag = "Audit",
    security(("api_jwt" = [])),
    responses(
        (status = 200, body = [AuditLog]),
        (status = 403, description = "Apenas administradores"),
    )
)]
pub async fn list(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Vec<AuditLog>>, AppError> {
    if user.role != UserRole::Admin {
        return Err(AppError::PermissionDenied("consultar a auditoria"));
    }
    Ok(Json(app_state.storage.audit_logs()?))
}

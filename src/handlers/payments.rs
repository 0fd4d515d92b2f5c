// src/handlers/payments.rs

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
        rbac::{PaymentsCreate, PaymentsDelete, PaymentsEdit, PaymentsView, RequirePermission},
    },
    models::finance::{CreatePaymentPayload, Payment},
    models::rbac::Module,
};

#[utoipa::path(
    get,
    path = "/api/payments",
    tag = "Payments",
    security(("api_jwt" = [])),
    responses((status = 200, description = "Pagamentos visíveis ao chamador", body = [Payment]))
)]
pub async fn list(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _perm: RequirePermission<PaymentsView>,
) -> Result<Json<Vec<Payment>>, AppError> {
    let view_all = app_state
        .permission_service
        .scope_is_all(user.role, Module::Payments)?;
    Ok(Json(app_state.payment_service.list(&user, view_all)?))
}

#[utoipa::path(
    post,
    path = "/api/payments",
    tag = "Payments",
    security(("api_jwt" = [])),
    request_body = CreatePaymentPayload,
    responses((status = 200, body = Payment))
)]
pub async fn create(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    _perm: RequirePermission<PaymentsCreate>,
    Json(payload): Json<CreatePaymentPayload>,
) -> Result<Json<Payment>, AppError> {
    Ok(Json(app_state.payment_service.create(&actor, payload)?))
}

/// Reclassifica os pendentes vencidos como atrasados.
#[utoipa::path(
    post,
    path = "/api/payments/refresh-overdue",
    tag = "Payments",
    security(("api_jwt" = [])),
    responses((status = 200, description = "Quantos pagamentos mudaram de status"))
)]
pub async fn refresh_overdue(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PaymentsEdit>,
) -> Result<Json<Value>, AppError> {
    let today = Utc::now().date_naive();
    let reclassified = app_state.payment_service.refresh_overdue(today)?;
    Ok(Json(json!({ "success": true, "reclassified": reclassified })))
}

#[utoipa::path(
    post,
    path = "/api/payments/{id}/pay",
    tag = "Payments",
    security(("api_jwt" = [])),
    responses((status = 200, body = Payment))
)]
pub async fn mark_paid(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    _perm: RequirePermission<PaymentsEdit>,
    Path(id): Path<Uuid>,
) -> Result<Json<Payment>, AppError> {
    let today = Utc::now().date_naive();
    Ok(Json(app_state.payment_service.mark_paid(&actor, id, today)?))
}

/// O médico confirma o recebimento do próprio pagamento.
#[utoipa::path(
    post,
    path = "/api/payments/{id}/confirm",
    tag = "Payments",
    security(("api_jwt" = [])),
    responses(
        (status = 200, body = Payment),
        (status = 403, description = "O pagamento não é do chamador"),
    )
)]
pub async fn confirm_receipt(
    State(app_state): State<AppState>,
    AuthenticatedUser(doctor): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Payment>, AppError> {
    Ok(Json(app_state.payment_service.confirm_receipt(&doctor, id)?))
}

#[utoipa::path(
    delete,
    path = "/api/payments/{id}",
    tag = "Payments",
    security(("api_jwt" = [])),
    responses((status = 200, description = "Pagamento excluído (lógico)"))
)]
pub async fn delete(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    _perm: RequirePermission<PaymentsDelete>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    if !app_state.payment_service.delete(&actor, id)? {
        return Err(AppError::NotFound("Pagamento"));
    }
    Ok(Json(json!({ "success": true })))
}

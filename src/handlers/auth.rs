// src/handlers/auth.rs

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::auth::{AuthResponse, ForgotPasswordPayload, LoginPayload, RegisterPayload, UserProfile},
};

// Handler de registro
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterPayload,
    responses(
        (status = 200, description = "Conta criada e sessão aberta", body = AuthResponse),
        (status = 400, description = "Campos inválidos"),
        (status = 409, description = "Email ou CPF já cadastrado"),
    )
)]
pub async fn register(
    State(app_state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<Json<AuthResponse>, AppError> {
    let response = app_state.auth_service.register(payload).await?;
    Ok(Json(response))
}

// Handler de login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Sessão aberta", body = AuthResponse),
        (status = 401, description = "Credenciais inválidas ou usuário inativo"),
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<AuthResponse>, AppError> {
    let response = app_state.auth_service.login(payload).await?;
    Ok(Json(response))
}

/// A resposta é a mesma com ou sem conta cadastrada.
#[utoipa::path(
    post,
    path = "/api/auth/forgot-password",
    tag = "Auth",
    request_body = ForgotPasswordPayload,
    responses((status = 200, description = "Instruções enviadas, se a conta existir"))
)]
pub async fn forgot_password(
    State(app_state): State<AppState>,
    Json(payload): Json<ForgotPasswordPayload>,
) -> Result<Json<Value>, AppError> {
    app_state.auth_service.forgot_password(payload).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Se o email estiver cadastrado, enviaremos as instruções."
    })))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    security(("api_jwt" = [])),
    responses((status = 200, description = "Sessão encerrada"))
)]
pub async fn logout(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Value>, AppError> {
    app_state.auth_service.logout(&user)?;
    Ok(Json(json!({ "success": true })))
}

// Handler da rota protegida /me
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    security(("api_jwt" = [])),
    responses((status = 200, description = "Perfil autenticado", body = UserProfile))
)]
pub async fn get_me(AuthenticatedUser(user): AuthenticatedUser) -> Json<UserProfile> {
    Json(user.sanitized())
}

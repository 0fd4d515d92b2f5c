// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::scales::ScaleStatus;

// Nosso tipo de erro central, com `thiserror` para melhor ergonomia.
// Toda falha vira um `{"success": false, "error": mensagem}` na borda HTTP.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Este email já está cadastrado")]
    EmailAlreadyExists,

    #[error("Este CPF já está cadastrado")]
    CpfAlreadyExists,

    #[error("Email ou senha inválidos")]
    InvalidCredentials,

    #[error("Usuário inativo. Contate o administrador.")]
    UserInactive,

    #[error("Token de autenticação inválido ou ausente.")]
    InvalidToken,

    #[error("{0} não encontrado(a)")]
    NotFound(&'static str),

    #[error("Você não tem permissão para {0}.")]
    PermissionDenied(&'static str),

    #[error("Transição de status inválida: {from} -> {to}")]
    InvalidTransition { from: ScaleStatus, to: ScaleStatus },

    #[error("Esta escala já possui um médico designado.")]
    ScaleAlreadyAssigned,

    #[error("A escala não está aberta para candidaturas.")]
    ScaleNotOpen,

    #[error("Você já se candidatou a esta escala.")]
    AlreadyApplied,

    #[error("Esta candidatura já foi respondida.")]
    CandidatureAlreadyResolved,

    #[error("A candidatura ainda não foi aceita.")]
    CandidatureNotAccepted,

    #[error("Etapa de fluxo inválida: {0}")]
    InvalidWorkflowStep(u8),

    #[error("Etapa {requested} não pode ser registrada: o fluxo já está na etapa {current}.")]
    WorkflowRegression { current: u8, requested: u8 },

    // Variante genérica para qualquer outro erro inesperado (I/O do storage etc).
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de serialização no storage: {0}")]
    StorageError(#[from] serde_json::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "success": false,
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }

            AppError::EmailAlreadyExists
            | AppError::CpfAlreadyExists
            | AppError::ScaleAlreadyAssigned
            | AppError::AlreadyApplied
            | AppError::CandidatureAlreadyResolved => (StatusCode::CONFLICT, self.to_string()),

            AppError::InvalidCredentials | AppError::UserInactive | AppError::InvalidToken => {
                (StatusCode::UNAUTHORIZED, self.to_string())
            }

            AppError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),

            AppError::PermissionDenied(_) => (StatusCode::FORBIDDEN, self.to_string()),

            AppError::InvalidTransition { .. }
            | AppError::ScaleNotOpen
            | AppError::CandidatureNotAccepted
            | AppError::InvalidWorkflowStep(_)
            | AppError::WorkflowRegression { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, self.to_string())
            }

            // Todos os outros erros viram 500. O `tracing` loga a mensagem
            // detalhada; o cliente recebe só o genérico.
            e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocorreu um erro inesperado.".to_string(),
                )
            }
        };

        let body = Json(json!({ "success": false, "error": error_message }));
        (status, body).into_response()
    }
}

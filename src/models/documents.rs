// src/models/documents.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::base::{BaseFields, Entity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DocumentCategory {
    Identidade,
    Crm,
    Diploma,
    Comprovante,
    Contrato,
    Outro,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Pendente,
    Aprovado,
    Rejeitado,
}

// Documento enviado por um usuário (coleção `documents`).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(flatten)]
    pub base: BaseFields,

    pub user_id: Uuid,
    #[schema(example = "Diploma de Medicina")]
    pub name: String,
    pub category: DocumentCategory,
    pub file_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = Date)]
    pub expiration_date: Option<NaiveDate>,
    pub status: DocumentStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_notes: Option<String>,
}

impl Entity for Document {
    const COLLECTION: &'static str = "documents";
    const LABEL: &'static str = "Documento";

    fn base(&self) -> &BaseFields {
        &self.base
    }
    fn base_mut(&mut self) -> &mut BaseFields {
        &mut self.base
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDocumentPayload {
    pub user_id: Uuid,
    #[validate(length(min = 1, max = 200, message = "Nome é obrigatório"))]
    pub name: String,
    pub category: DocumentCategory,
    #[validate(url(message = "URL do arquivo inválida"))]
    pub file_url: String,
    #[schema(value_type = Option<String>, format = Date)]
    pub expiration_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDocumentPayload {
    pub approve: bool,
    #[validate(length(max = 500))]
    pub review_notes: Option<String>,
}

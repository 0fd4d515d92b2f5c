// src/models/audit.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

// Trilha de auditoria (coleção `audit_logs`). Append-only: não segue o
// contrato de soft-delete das demais entidades e fica limitada aos 1000
// registros mais recentes, do mais novo para o mais antigo.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub user_id: Uuid,
    pub user_name: String,
    #[schema(example = "PUBLISH")]
    pub action: String,
    #[schema(example = "Escala")]
    pub entity: String,
    pub entity_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
}

/// Limite da trilha: ao inserir o 1001º registro, o mais antigo sai.
pub const AUDIT_LOG_CAP: usize = 1000;

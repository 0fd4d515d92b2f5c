// src/models/base.rs

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

// Contrato comum de toda entidade persistida: id, timestamps e exclusão
// lógica. `deletedAt` preenchido marca o registro como excluído; ele some
// das listagens padrão, mas permanece no storage para auditoria.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BaseFields {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl BaseFields {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

impl Default for BaseFields {
    fn default() -> Self {
        Self::new()
    }
}

/// Vínculo entre um tipo Rust e sua coleção no storage.
pub trait Entity: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Nome da coleção persistida (ex: "scales").
    const COLLECTION: &'static str;
    /// Rótulo humano para logs de auditoria e mensagens de erro.
    const LABEL: &'static str;

    fn base(&self) -> &BaseFields;
    fn base_mut(&mut self) -> &mut BaseFields;

    fn id(&self) -> Uuid {
        self.base().id
    }
}

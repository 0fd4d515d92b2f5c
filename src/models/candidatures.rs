// src/models/candidatures.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::base::{BaseFields, Entity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CandidatureStatus {
    Interessado,
    Aceito,
    Negado,
    Aguardando,
}

/// Etapas do fluxo pós-aceite (1 a 6). O contador só existe enquanto a
/// candidatura está `aceito` e nunca regride.
pub const WORKFLOW_STEPS: [(u8, &str); 6] = [
    (1, "Envio de informações"),
    (2, "Aceite da empresa"),
    (3, "Documentos assinados"),
    (4, "Validação pendente"),
    (5, "Aprovado"),
    (6, "NF enviada"),
];

pub const WORKFLOW_FINAL_STEP: u8 = 6;

pub fn workflow_step_label(step: u8) -> Option<&'static str> {
    WORKFLOW_STEPS
        .iter()
        .find(|(n, _)| *n == step)
        .map(|(_, label)| *label)
}

// Candidatura de um médico a uma escala (coleção `candidatures`). Guarda
// apenas referências fracas: escala e médico são resolvidos por consulta.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Candidature {
    #[serde(flatten)]
    pub base: BaseFields,

    pub scale_id: Uuid,
    pub doctor_id: Uuid,
    pub status: CandidatureStatus,
    pub applied_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub responded_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responded_by: Option<Uuid>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(minimum = 1, maximum = 6)]
    pub workflow_step: Option<u8>,
}

impl Entity for Candidature {
    const COLLECTION: &'static str = "candidatures";
    const LABEL: &'static str = "Candidatura";

    fn base(&self) -> &BaseFields {
        &self.base
    }
    fn base_mut(&mut self) -> &mut BaseFields {
        &mut self.base
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplyPayload {
    pub scale_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdvanceWorkflowPayload {
    #[schema(minimum = 1, maximum = 6)]
    pub step: u8,
}

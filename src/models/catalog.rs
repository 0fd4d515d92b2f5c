// src/models/catalog.rs
//
// Entidades de referência: especialidades e tipos de escala.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::base::{BaseFields, Entity};
use crate::models::scales::Shift;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Specialty {
    #[serde(flatten)]
    pub base: BaseFields,

    #[schema(example = "Cardiologia")]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale_type_ids: Option<Vec<Uuid>>,
}

impl Entity for Specialty {
    const COLLECTION: &'static str = "specialties";
    const LABEL: &'static str = "Especialidade";

    fn base(&self) -> &BaseFields {
        &self.base
    }
    fn base_mut(&mut self) -> &mut BaseFields {
        &mut self.base
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScaleType {
    #[serde(flatten)]
    pub base: BaseFields,

    #[schema(example = "Plantão 12h Diurno")]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[schema(example = 12)]
    pub default_duration_hours: u32,
    pub default_shift: Shift,
}

impl Entity for ScaleType {
    const COLLECTION: &'static str = "scale_types";
    const LABEL: &'static str = "Tipo de escala";

    fn base(&self) -> &BaseFields {
        &self.base
    }
    fn base_mut(&mut self) -> &mut BaseFields {
        &mut self.base
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpsertSpecialtyPayload {
    #[validate(length(min = 1, max = 100, message = "Nome é obrigatório"))]
    pub name: String,
    pub description: Option<String>,
    pub scale_type_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpsertScaleTypePayload {
    #[validate(length(min = 1, max = 100, message = "Nome é obrigatório"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(range(min = 1, max = 48, message = "Duração deve ficar entre 1 e 48 horas"))]
    pub default_duration_hours: u32,
    pub default_shift: Shift,
}

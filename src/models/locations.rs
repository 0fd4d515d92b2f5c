// src/models/locations.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::common::geo::Coordinates;
use crate::models::auth::{Address, AddressPayload};
use crate::models::base::{BaseFields, Entity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LocationType {
    Upa,
    Ubs,
    Hospital,
    Clinica,
    ProntoSocorro,
    Outro,
}

// Unidade de saúde onde as escalas acontecem (coleção `locations`).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(flatten)]
    pub base: BaseFields,

    #[schema(example = "Hospital São Lucas")]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: LocationType,
    pub address: Address,

    // Coordenadas cadastradas, usadas na verificação de check-in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f64>,
}

impl Entity for Location {
    const COLLECTION: &'static str = "locations";
    const LABEL: &'static str = "Local";

    fn base(&self) -> &BaseFields {
        &self.base
    }
    fn base_mut(&mut self) -> &mut BaseFields {
        &mut self.base
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpsertLocationPayload {
    #[validate(length(min = 1, max = 100, message = "Nome é obrigatório"))]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: LocationType,
    #[validate(nested)]
    pub address: AddressPayload,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub phone: Option<String>,
    #[validate(email(message = "Email inválido"))]
    pub email: Option<String>,
}

// src/models/scales.rs

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::geo::Coordinates;
use crate::models::base::{BaseFields, Entity};
use crate::models::finance::PaymentStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Shift {
    Manha,
    Tarde,
    Noite,
    #[serde(rename = "plantao_12h")]
    Plantao12h,
    #[serde(rename = "plantao_24h")]
    Plantao24h,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ScaleStatus {
    Rascunho,
    Publicada,
    EmAndamento,
    Concluida,
    Cancelada,
}

impl ScaleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScaleStatus::Rascunho => "rascunho",
            ScaleStatus::Publicada => "publicada",
            ScaleStatus::EmAndamento => "em_andamento",
            ScaleStatus::Concluida => "concluida",
            ScaleStatus::Cancelada => "cancelada",
        }
    }
}

impl std::fmt::Display for ScaleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// Registro de check-in/check-out: sub-registro de propriedade da escala.
// `verified` indica que as coordenadas caíram dentro do raio aceito em
// torno do local; fora do raio o registro entra mesmo assim, só que
// marcado como não verificado.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckRecord {
    pub timestamp: DateTime<Utc>,
    pub coordinates: Coordinates,
    pub verified: bool,
}

// A vaga de plantão publicada (coleção `scales`).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Scale {
    #[serde(flatten)]
    pub base: BaseFields,

    pub location_id: Uuid,
    pub scale_type_id: Uuid,
    pub specialty_id: Uuid,

    #[schema(example = "Plantão UTI - Hospital São Lucas")]
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[schema(value_type = String, format = Date, example = "2026-02-22")]
    pub date: NaiveDate,
    #[schema(value_type = String, example = "07:00:00")]
    pub start_time: NaiveTime,
    #[schema(value_type = String, example = "19:00:00")]
    pub end_time: NaiveTime,
    pub shift: Shift,
    pub status: ScaleStatus,

    // Regras de cancelamento/transferência (dias antes da data)
    pub cancellation_deadline_days: i64,
    pub transfer_deadline_days: i64,

    // Pagamento
    #[schema(example = "1500.00")]
    pub payment_value: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = Date)]
    pub payment_date: Option<NaiveDate>,
    pub payment_status: PaymentStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_patients: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_patients: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meal_break_minutes: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_documents: Option<Vec<String>>,

    // Designação: no modelo de vaga única há no máximo um médico designado
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_doctor_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidate_ids: Option<Vec<Uuid>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_in: Option<CheckRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_out: Option<CheckRecord>,
}

impl Scale {
    /// Duração do plantão. Término igual ou anterior ao início significa
    /// virada de meia-noite (plantões de 24h terminam no dia seguinte), por
    /// isso o cálculo é aritmético sobre durações e nunca comparação
    /// textual de horários.
    pub fn duration(&self) -> Duration {
        let d = self.end_time - self.start_time;
        if d <= Duration::zero() {
            d + Duration::hours(24)
        } else {
            d
        }
    }

    /// Cancelamento "gratuito" exige `(data - hoje) >= prazo em dias`.
    pub fn within_cancellation_deadline(&self, today: NaiveDate) -> bool {
        (self.date - today).num_days() >= self.cancellation_deadline_days
    }
}

impl Entity for Scale {
    const COLLECTION: &'static str = "scales";
    const LABEL: &'static str = "Escala";

    fn base(&self) -> &BaseFields {
        &self.base
    }
    fn base_mut(&mut self) -> &mut BaseFields {
        &mut self.base
    }
}

// --- Payloads ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpsertScalePayload {
    pub location_id: Uuid,
    pub scale_type_id: Uuid,
    pub specialty_id: Uuid,
    #[validate(length(min = 1, max = 200, message = "Título é obrigatório"))]
    pub title: String,
    pub description: Option<String>,
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    #[schema(value_type = String)]
    pub start_time: NaiveTime,
    #[schema(value_type = String)]
    pub end_time: NaiveTime,
    pub shift: Shift,
    #[validate(range(min = 0, max = 30))]
    pub cancellation_deadline_days: i64,
    #[validate(range(min = 0, max = 30))]
    pub transfer_deadline_days: i64,
    #[schema(example = "1500.00")]
    pub payment_value: Decimal,
    #[schema(value_type = Option<String>, format = Date)]
    pub payment_date: Option<NaiveDate>,
    pub min_patients: Option<u32>,
    pub max_patients: Option<u32>,
    #[validate(range(min = 0, max = 180))]
    pub meal_break_minutes: Option<u32>,
    pub required_documents: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckPayload {
    pub coordinates: Coordinates,
}

/// Resultado de um cancelamento: sempre cancela, mas informa se o prazo
/// livre de penalidade já tinha passado.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CancellationOutcome {
    pub scale: Scale,
    pub within_deadline: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hora(h: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, 0, 0).unwrap()
    }

    fn plantao(inicio: NaiveTime, fim: NaiveTime) -> Scale {
        Scale {
            base: BaseFields::new(),
            location_id: Uuid::new_v4(),
            scale_type_id: Uuid::new_v4(),
            specialty_id: Uuid::new_v4(),
            title: "Plantão UTI".to_string(),
            description: None,
            date: NaiveDate::from_ymd_opt(2026, 2, 22).unwrap(),
            start_time: inicio,
            end_time: fim,
            shift: Shift::Plantao12h,
            status: ScaleStatus::Rascunho,
            cancellation_deadline_days: 3,
            transfer_deadline_days: 3,
            payment_value: Decimal::new(1500, 0),
            payment_date: None,
            payment_status: PaymentStatus::Pendente,
            min_patients: None,
            max_patients: None,
            meal_break_minutes: None,
            required_documents: None,
            assigned_doctor_id: None,
            candidate_ids: None,
            check_in: None,
            check_out: None,
        }
    }

    #[test]
    fn duracao_diurna_nao_vira_a_meia_noite() {
        assert_eq!(plantao(hora(7), hora(19)).duration(), Duration::hours(12));
    }

    #[test]
    fn duracao_noturna_vira_a_meia_noite() {
        // 19h às 7h do dia seguinte: 12 horas, nunca um valor negativo
        assert_eq!(plantao(hora(19), hora(7)).duration(), Duration::hours(12));
    }

    #[test]
    fn termino_igual_ao_inicio_e_plantao_de_24_horas() {
        assert_eq!(plantao(hora(8), hora(8)).duration(), Duration::hours(24));
    }
}

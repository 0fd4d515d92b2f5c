// src/models/finance.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::base::{BaseFields, Entity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pendente,
    Pago,
    Atrasado,
}

// Pagamento de um plantão a um médico (coleção `payments`).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    #[serde(flatten)]
    pub base: BaseFields,

    pub scale_id: Uuid,
    pub doctor_id: Uuid,
    #[schema(example = "1500.00")]
    pub amount: Decimal,
    #[schema(value_type = String, format = Date, example = "2026-03-10")]
    pub due_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = Date)]
    pub paid_date: Option<NaiveDate>,
    pub status: PaymentStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmed_by_doctor: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmed_at: Option<DateTime<Utc>>,
}

impl Payment {
    /// Regra pura de atraso: pendente com vencimento anterior a `today`.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status == PaymentStatus::Pendente && self.due_date < today
    }
}

impl Entity for Payment {
    const COLLECTION: &'static str = "payments";
    const LABEL: &'static str = "Pagamento";

    fn base(&self) -> &BaseFields {
        &self.base
    }
    fn base_mut(&mut self) -> &mut BaseFields {
        &mut self.base
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RatingType {
    DoctorToLocation,
    LocationToDoctor,
}

// Avaliação entre médico e local, sempre vinculada a uma escala concluída.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    #[serde(flatten)]
    pub base: BaseFields,

    pub scale_id: Uuid,
    pub from_user_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_user_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_location_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub kind: RatingType,

    #[schema(minimum = 1, maximum = 5)]
    pub overall_score: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub punctuality_score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality_score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub professionalism_score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Entity for Rating {
    const COLLECTION: &'static str = "ratings";
    const LABEL: &'static str = "Avaliação";

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
pub struct CreatePaymentPayload {
    pub scale_id: Uuid,
    pub doctor_id: Uuid,
    #[schema(example = "1500.00")]
    pub amount: Decimal,
    #[schema(value_type = String, format = Date)]
    pub due_date: NaiveDate,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRatingPayload {
    pub scale_id: Uuid,
    pub to_user_id: Option<Uuid>,
    pub to_location_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub kind: RatingType,
    #[validate(range(min = 1, max = 5))]
    pub overall_score: u8,
    #[validate(range(min = 1, max = 5))]
    pub punctuality_score: Option<u8>,
    #[validate(range(min = 1, max = 5))]
    pub quality_score: Option<u8>,
    #[validate(range(min = 1, max = 5))]
    pub professionalism_score: Option<u8>,
    #[validate(length(max = 500))]
    pub comment: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn payment(status: PaymentStatus, due: NaiveDate) -> Payment {
        Payment {
            base: BaseFields::new(),
            scale_id: Uuid::new_v4(),
            doctor_id: Uuid::new_v4(),
            amount: Decimal::from(1500),
            due_date: due,
            paid_date: None,
            status,
            proof_url: None,
            notes: None,
            confirmed_by_doctor: None,
            confirmed_at: None,
        }
    }

    #[test]
    fn pendente_vencido_e_classificavel_como_atrasado() {
        let hoje = NaiveDate::from_ymd_opt(2026, 2, 10).unwrap();
        let vencido = payment(PaymentStatus::Pendente, hoje - chrono::Duration::days(1));
        let em_dia = payment(PaymentStatus::Pendente, hoje);
        let pago = payment(PaymentStatus::Pago, hoje - chrono::Duration::days(30));

        assert!(vencido.is_overdue(hoje));
        assert!(!em_dia.is_overdue(hoje));
        assert!(!pago.is_overdue(hoje));
    }
}

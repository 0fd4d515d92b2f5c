// src/services/payment_service.rs

use chrono::{NaiveDate, Utc};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::common::error::AppError;
use crate::db::store::Storage;
use crate::models::auth::UserProfile;
use crate::models::base::{BaseFields, Entity};
use crate::models::finance::{CreatePaymentPayload, Payment, PaymentStatus};
use crate::models::notifications::{Notification, NotificationType};
use crate::models::scales::Scale;

#[derive(Clone)]
pub struct PaymentService {
    storage: Storage,
}

impl PaymentService {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Sem `view_all`, cada um enxerga os próprios pagamentos (um gestor,
    /// também os dos subordinados).
    pub fn list(&self, viewer: &UserProfile, view_all: bool) -> Result<Vec<Payment>, AppError> {
        let payments = self.storage.get_all::<Payment>(false)?;
        if view_all {
            return Ok(payments);
        }

        let mut visible_ids: Vec<Uuid> = vec![viewer.id()];
        if let Some(subordinates) = &viewer.subordinate_ids {
            visible_ids.extend(subordinates.iter().copied());
        }

        Ok(payments
            .into_iter()
            .filter(|p| visible_ids.contains(&p.doctor_id))
            .collect())
    }

    pub fn get(&self, id: Uuid) -> Result<Payment, AppError> {
        self.storage
            .get_by_id(id)?
            .ok_or(AppError::NotFound(Payment::LABEL))
    }

    pub fn create(
        &self,
        actor: &UserProfile,
        payload: CreatePaymentPayload,
    ) -> Result<Payment, AppError> {
        payload.validate()?;

        let created = self.storage.create(Payment {
            base: BaseFields::new(),
            scale_id: payload.scale_id,
            doctor_id: payload.doctor_id,
            amount: payload.amount,
            due_date: payload.due_date,
            paid_date: None,
            status: PaymentStatus::Pendente,
            proof_url: None,
            notes: payload.notes,
            confirmed_by_doctor: None,
            confirmed_at: None,
        })?;

        self.storage.create(Notification::new(
            created.doctor_id,
            NotificationType::Info,
            "Pagamento registrado",
            "Um pagamento de plantão foi registrado em seu nome.",
        ))?;
        self.storage.log_audit(
            actor.id(),
            &actor.name,
            "CREATE",
            Payment::LABEL,
            created.id(),
            Some(json!({ "scaleId": created.scale_id })),
        )?;
        Ok(created)
    }

    /// Reclassifica como `atrasado` todo pagamento pendente com o
    /// vencimento já passado. Devolve quantos mudaram.
    pub fn refresh_overdue(&self, today: NaiveDate) -> Result<usize, AppError> {
        let mut reclassified = 0;
        for payment in self.storage.get_all::<Payment>(false)? {
            if payment.is_overdue(today) {
                self.storage.update_with::<Payment>(payment.id(), |p| {
                    p.status = PaymentStatus::Atrasado;
                    Ok(())
                })?;
                reclassified += 1;
            }
        }
        Ok(reclassified)
    }

    /// Quita o pagamento e espelha o status na escala correspondente.
    pub fn mark_paid(
        &self,
        actor: &UserProfile,
        id: Uuid,
        paid_date: NaiveDate,
    ) -> Result<Payment, AppError> {
        let paid = self
            .storage
            .update_with::<Payment>(id, |p| {
                p.status = PaymentStatus::Pago;
                p.paid_date = Some(paid_date);
                Ok(())
            })?
            .ok_or(AppError::NotFound(Payment::LABEL))?;

        self.storage.update_with::<Scale>(paid.scale_id, |scale| {
            scale.payment_status = PaymentStatus::Pago;
            Ok(())
        })?;

        self.storage.create(Notification::new(
            paid.doctor_id,
            NotificationType::Success,
            "Pagamento efetuado",
            "O pagamento do seu plantão foi quitado.",
        ))?;
        self.storage
            .log_audit(actor.id(), &actor.name, "MARK_PAID", Payment::LABEL, id, None)?;
        Ok(paid)
    }

    /// O médico confirma que recebeu o valor. Só vale para o próprio
    /// pagamento.
    pub fn confirm_receipt(&self, doctor: &UserProfile, id: Uuid) -> Result<Payment, AppError> {
        let confirmed = self
            .storage
            .update_with::<Payment>(id, |p| {
                if p.doctor_id != doctor.id() {
                    return Err(AppError::PermissionDenied("confirmar este pagamento"));
                }
                p.confirmed_by_doctor = Some(true);
                p.confirmed_at = Some(Utc::now());
                Ok(())
            })?
            .ok_or(AppError::NotFound(Payment::LABEL))?;

        self.storage.log_audit(
            doctor.id(),
            &doctor.name,
            "CONFIRM_RECEIPT",
            Payment::LABEL,
            id,
            None,
        )?;
        Ok(confirmed)
    }

    pub fn delete(&self, actor: &UserProfile, id: Uuid) -> Result<bool, AppError> {
        let deleted = self.storage.soft_delete::<Payment>(id)?;
        if deleted {
            self.storage
                .log_audit(actor.id(), &actor.name, "DELETE", Payment::LABEL, id, None)?;
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::{UserRole, UserStatus};
    use chrono::Duration;
    use rust_decimal::Decimal;

    fn usuario(storage: &Storage, role: UserRole) -> UserProfile {
        storage
            .create(UserProfile {
                base: BaseFields::new(),
                name: "Dra. Ana Souza".to_string(),
                email: format!("{}@medly.com.br", Uuid::new_v4()),
                phone: "(11) 98888-0000".to_string(),
                cpf: Uuid::new_v4().to_string(),
                role,
                status: UserStatus::Ativo,
                password_hash: String::new(),
                avatar_url: None,
                address: None,
                crm: None,
                crm_state: None,
                crm_valid: None,
                specialties: None,
                manager_id: None,
                subordinate_ids: None,
                average_rating: None,
                completed_scales: None,
                cancellation_rate: None,
            })
            .unwrap()
    }

    fn pagamento(storage: &Storage, doctor_id: Uuid, due: NaiveDate) -> Payment {
        storage
            .create(Payment {
                base: BaseFields::new(),
                scale_id: Uuid::new_v4(),
                doctor_id,
                amount: Decimal::new(1500, 0),
                due_date: due,
                paid_date: None,
                status: PaymentStatus::Pendente,
                proof_url: None,
                notes: None,
                confirmed_by_doctor: None,
                confirmed_at: None,
            })
            .unwrap()
    }

    #[test]
    fn refresh_reclassifica_so_os_pendentes_vencidos() {
        let storage = Storage::in_memory();
        let service = PaymentService::new(storage.clone());
        let hoje = Utc::now().date_naive();

        let vencido = pagamento(&storage, Uuid::new_v4(), hoje - Duration::days(5));
        let em_dia = pagamento(&storage, Uuid::new_v4(), hoje + Duration::days(5));

        assert_eq!(service.refresh_overdue(hoje).unwrap(), 1);
        assert_eq!(
            service.get(vencido.id()).unwrap().status,
            PaymentStatus::Atrasado
        );
        assert_eq!(
            service.get(em_dia.id()).unwrap().status,
            PaymentStatus::Pendente
        );

        // rodar de novo não reclassifica nada
        assert_eq!(service.refresh_overdue(hoje).unwrap(), 0);
    }

    #[test]
    fn confirmacao_de_recebimento_so_pelo_proprio_medico() {
        let storage = Storage::in_memory();
        let service = PaymentService::new(storage.clone());
        let dona = usuario(&storage, UserRole::Medico);
        let outra = usuario(&storage, UserRole::Medico);
        let hoje = Utc::now().date_naive();
        let criado = pagamento(&storage, dona.id(), hoje);

        assert!(matches!(
            service.confirm_receipt(&outra, criado.id()),
            Err(AppError::PermissionDenied(_))
        ));

        let confirmado = service.confirm_receipt(&dona, criado.id()).unwrap();
        assert_eq!(confirmado.confirmed_by_doctor, Some(true));
        assert!(confirmado.confirmed_at.is_some());
    }

    #[test]
    fn listagem_sem_view_all_filtra_pelo_medico() {
        let storage = Storage::in_memory();
        let service = PaymentService::new(storage.clone());
        let dona = usuario(&storage, UserRole::Medico);
        let hoje = Utc::now().date_naive();

        let meu = pagamento(&storage, dona.id(), hoje);
        pagamento(&storage, Uuid::new_v4(), hoje);

        let restrita = service.list(&dona, false).unwrap();
        assert_eq!(restrita.len(), 1);
        assert_eq!(restrita[0].id(), meu.id());

        assert_eq!(service.list(&dona, true).unwrap().len(), 2);
    }
}

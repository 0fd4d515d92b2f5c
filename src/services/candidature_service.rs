// src/services/candidature_service.rs

use chrono::{Duration, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::db::store::Storage;
use crate::models::auth::UserProfile;
use crate::models::base::{BaseFields, Entity};
use crate::models::candidatures::{
    workflow_step_label, Candidature, CandidatureStatus, WORKFLOW_FINAL_STEP,
};
use crate::models::finance::{Payment, PaymentStatus};
use crate::models::notifications::{Notification, NotificationType};
use crate::models::scales::{Scale, ScaleStatus};

// Candidaturas: interessado -> aguardando -> aceito | negado. O aceite
// designa o médico na escala, nega as concorrentes e abre o fluxo de
// etapas pós-aceite (1 a 6); a etapa final registra o pagamento.
#[derive(Clone)]
pub struct CandidatureService {
    storage: Storage,
}

impl CandidatureService {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Sem `view_all`, o médico enxerga apenas as próprias candidaturas
    /// (e um gestor, também as dos subordinados).
    pub fn list(
        &self,
        viewer: &UserProfile,
        view_all: bool,
    ) -> Result<Vec<Candidature>, AppError> {
        let candidatures = self.storage.get_all::<Candidature>(false)?;
        if view_all {
            return Ok(candidatures);
        }

        let mut visible_ids: Vec<Uuid> = vec![viewer.id()];
        if let Some(subordinates) = &viewer.subordinate_ids {
            visible_ids.extend(subordinates.iter().copied());
        }

        Ok(candidatures
            .into_iter()
            .filter(|c| visible_ids.contains(&c.doctor_id))
            .collect())
    }

    pub fn for_scale(&self, scale_id: Uuid) -> Result<Vec<Candidature>, AppError> {
        Ok(self
            .storage
            .get_all::<Candidature>(false)?
            .into_iter()
            .filter(|c| c.scale_id == scale_id)
            .collect())
    }

    pub fn get(&self, id: Uuid) -> Result<Candidature, AppError> {
        self.storage
            .get_by_id(id)?
            .ok_or(AppError::NotFound(Candidature::LABEL))
    }

    /// Candidatar-se exige escala publicada, sem médico designado e sem
    /// candidatura anterior do mesmo médico.
    pub fn apply(&self, doctor: &UserProfile, scale_id: Uuid) -> Result<Candidature, AppError> {
        let scale = self
            .storage
            .get_by_id::<Scale>(scale_id)?
            .ok_or(AppError::NotFound(Scale::LABEL))?;

        if scale.status != ScaleStatus::Publicada {
            return Err(AppError::ScaleNotOpen);
        }
        if scale.assigned_doctor_id.is_some() {
            return Err(AppError::ScaleAlreadyAssigned);
        }
        if self
            .for_scale(scale_id)?
            .iter()
            .any(|c| c.doctor_id == doctor.id())
        {
            return Err(AppError::AlreadyApplied);
        }

        let candidature = self.storage.create(Candidature {
            base: BaseFields::new(),
            scale_id,
            doctor_id: doctor.id(),
            status: CandidatureStatus::Interessado,
            applied_at: Utc::now(),
            responded_at: None,
            responded_by: None,
            workflow_step: None,
        })?;

        self.storage.update_with::<Scale>(scale_id, |scale| {
            scale
                .candidate_ids
                .get_or_insert_with(Vec::new)
                .push(doctor.id());
            Ok(())
        })?;

        self.storage.log_audit(
            doctor.id(),
            &doctor.name,
            "APPLY",
            Candidature::LABEL,
            candidature.id(),
            Some(json!({ "scaleId": scale_id })),
        )?;
        Ok(candidature)
    }

    /// Sinaliza ao médico que a candidatura entrou em análise.
    pub fn mark_waiting(&self, actor: &UserProfile, id: Uuid) -> Result<Candidature, AppError> {
        let updated = self
            .storage
            .update_with::<Candidature>(id, |c| {
                if c.status != CandidatureStatus::Interessado {
                    return Err(AppError::CandidatureAlreadyResolved);
                }
                c.status = CandidatureStatus::Aguardando;
                Ok(())
            })?
            .ok_or(AppError::NotFound(Candidature::LABEL))?;

        self.storage.log_audit(
            actor.id(),
            &actor.name,
            "MARK_WAITING",
            Candidature::LABEL,
            id,
            None,
        )?;
        Ok(updated)
    }

    /// Aceite: designa o médico na escala, abre o fluxo na etapa 1 e nega
    /// todas as candidaturas concorrentes ainda pendentes, tudo na mesma
    /// operação síncrona.
    pub fn accept(&self, actor: &UserProfile, id: Uuid) -> Result<Candidature, AppError> {
        let candidature = self.get(id)?;
        if !matches!(
            candidature.status,
            CandidatureStatus::Interessado | CandidatureStatus::Aguardando
        ) {
            return Err(AppError::CandidatureAlreadyResolved);
        }

        // A designação valida dentro do lock de escrita: se outro aceite
        // chegou antes, este falha sem tocar em nada.
        self.storage
            .update_with::<Scale>(candidature.scale_id, |scale| {
                if scale.assigned_doctor_id.is_some() {
                    return Err(AppError::ScaleAlreadyAssigned);
                }
                if scale.status != ScaleStatus::Publicada {
                    return Err(AppError::ScaleNotOpen);
                }
                scale.assigned_doctor_id = Some(candidature.doctor_id);
                Ok(())
            })?
            .ok_or(AppError::NotFound(Scale::LABEL))?;

        let now = Utc::now();
        let accepted = self
            .storage
            .update_with::<Candidature>(id, |c| {
                c.status = CandidatureStatus::Aceito;
                c.workflow_step = Some(1);
                c.responded_at = Some(now);
                c.responded_by = Some(actor.id());
                Ok(())
            })?
            .ok_or(AppError::NotFound(Candidature::LABEL))?;

        // Concorrentes pendentes da mesma escala são negadas em bloco.
        for competitor in self.for_scale(candidature.scale_id)? {
            if competitor.id() == id
                || !matches!(
                    competitor.status,
                    CandidatureStatus::Interessado | CandidatureStatus::Aguardando
                )
            {
                continue;
            }
            self.storage.update_with::<Candidature>(competitor.id(), |c| {
                c.status = CandidatureStatus::Negado;
                c.responded_at = Some(now);
                c.responded_by = Some(actor.id());
                Ok(())
            })?;
            self.storage.create(Notification::new(
                competitor.doctor_id,
                NotificationType::Warning,
                "Candidatura negada",
                "A vaga foi preenchida por outro profissional.",
            ))?;
        }

        self.storage.create(Notification::new(
            accepted.doctor_id,
            NotificationType::Success,
            "Candidatura aceita",
            "Sua candidatura foi aceita. Acompanhe as próximas etapas.",
        ))?;
        self.storage.log_audit(
            actor.id(),
            &actor.name,
            "ACCEPT",
            Candidature::LABEL,
            id,
            Some(json!({ "scaleId": candidature.scale_id })),
        )?;
        Ok(accepted)
    }

    /// Negativa terminal para a candidatura; a escala segue aberta.
    pub fn deny(&self, actor: &UserProfile, id: Uuid) -> Result<Candidature, AppError> {
        let denied = self
            .storage
            .update_with::<Candidature>(id, |c| {
                if !matches!(
                    c.status,
                    CandidatureStatus::Interessado | CandidatureStatus::Aguardando
                ) {
                    return Err(AppError::CandidatureAlreadyResolved);
                }
                c.status = CandidatureStatus::Negado;
                c.responded_at = Some(Utc::now());
                c.responded_by = Some(actor.id());
                Ok(())
            })?
            .ok_or(AppError::NotFound(Candidature::LABEL))?;

        self.storage.create(Notification::new(
            denied.doctor_id,
            NotificationType::Warning,
            "Candidatura negada",
            "Sua candidatura não foi aceita desta vez.",
        ))?;
        self.storage
            .log_audit(actor.id(), &actor.name, "DENY", Candidature::LABEL, id, None)?;
        Ok(denied)
    }

    /// Avança o fluxo pós-aceite. O contador é estritamente crescente:
    /// pular etapas é permitido, voltar nunca. A etapa final registra o
    /// pagamento pendente do plantão.
    pub fn advance_workflow(
        &self,
        actor: &UserProfile,
        id: Uuid,
        step: u8,
    ) -> Result<Candidature, AppError> {
        if !(1..=WORKFLOW_FINAL_STEP).contains(&step) {
            return Err(AppError::InvalidWorkflowStep(step));
        }

        let updated = self
            .storage
            .update_with::<Candidature>(id, |c| {
                if c.status != CandidatureStatus::Aceito {
                    return Err(AppError::CandidatureNotAccepted);
                }
                let current = c.workflow_step.unwrap_or(1);
                if step <= current {
                    return Err(AppError::WorkflowRegression {
                        current,
                        requested: step,
                    });
                }
                c.workflow_step = Some(step);
                Ok(())
            })?
            .ok_or(AppError::NotFound(Candidature::LABEL))?;

        self.storage.log_audit(
            actor.id(),
            &actor.name,
            "ADVANCE_WORKFLOW",
            Candidature::LABEL,
            id,
            Some(json!({
                "step": step,
                "label": workflow_step_label(step),
            })),
        )?;

        if step == WORKFLOW_FINAL_STEP {
            self.register_payment(actor, &updated)?;
        }
        Ok(updated)
    }

    // NF enviada: o pagamento nasce pendente, com vencimento na data de
    // pagamento da escala ou, na falta dela, 30 dias após o plantão.
    fn register_payment(
        &self,
        actor: &UserProfile,
        candidature: &Candidature,
    ) -> Result<(), AppError> {
        let scale = self
            .storage
            .get_by_id::<Scale>(candidature.scale_id)?
            .ok_or(AppError::NotFound(Scale::LABEL))?;

        let payment = self.storage.create(Payment {
            base: BaseFields::new(),
            scale_id: scale.id(),
            doctor_id: candidature.doctor_id,
            amount: scale.payment_value,
            due_date: scale.payment_date.unwrap_or(scale.date + Duration::days(30)),
            paid_date: None,
            status: PaymentStatus::Pendente,
            proof_url: None,
            notes: None,
            confirmed_by_doctor: None,
            confirmed_at: None,
        })?;

        self.storage.create(Notification::new(
            candidature.doctor_id,
            NotificationType::Info,
            "Pagamento registrado",
            "O pagamento do seu plantão foi registrado e aguarda quitação.",
        ))?;
        self.storage.log_audit(
            actor.id(),
            &actor.name,
            "CREATE",
            Payment::LABEL,
            payment.id(),
            Some(json!({ "scaleId": scale.id() })),
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::{UserRole, UserStatus};
    use crate::models::scales::Shift;
    use chrono::NaiveTime;
    use rust_decimal::Decimal;

    fn usuario(storage: &Storage, nome: &str, role: UserRole) -> UserProfile {
        storage
            .create(UserProfile {
                base: BaseFields::new(),
                name: nome.to_string(),
                email: format!("{}@medly.com.br", nome.to_lowercase().replace(' ', ".")),
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

    fn escala_publicada(storage: &Storage) -> Scale {
        storage
            .create(Scale {
                base: BaseFields::new(),
                location_id: Uuid::new_v4(),
                scale_type_id: Uuid::new_v4(),
                specialty_id: Uuid::new_v4(),
                title: "Plantão UTI".to_string(),
                description: None,
                date: Utc::now().date_naive() + Duration::days(14),
                start_time: NaiveTime::from_hms_opt(7, 0, 0).unwrap(),
                end_time: NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
                shift: Shift::Plantao12h,
                status: ScaleStatus::Publicada,
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
            })
            .unwrap()
    }

    #[test]
    fn candidatura_dupla_do_mesmo_medico_e_conflito() {
        let storage = Storage::in_memory();
        let service = CandidatureService::new(storage.clone());
        let doutora = usuario(&storage, "Ana Souza", UserRole::Medico);
        let escala = escala_publicada(&storage);

        service.apply(&doutora, escala.id()).unwrap();
        let repetida = service.apply(&doutora, escala.id());

        assert!(matches!(repetida, Err(AppError::AlreadyApplied)));
    }

    #[test]
    fn escala_em_rascunho_nao_recebe_candidaturas() {
        let storage = Storage::in_memory();
        let service = CandidatureService::new(storage.clone());
        let doutora = usuario(&storage, "Ana Souza", UserRole::Medico);

        let escala = escala_publicada(&storage);
        storage
            .update_with::<Scale>(escala.id(), |s| {
                s.status = ScaleStatus::Rascunho;
                Ok(())
            })
            .unwrap();

        assert!(matches!(
            service.apply(&doutora, escala.id()),
            Err(AppError::ScaleNotOpen)
        ));
    }

    #[test]
    fn aceite_designa_o_medico_e_nega_as_concorrentes() {
        let storage = Storage::in_memory();
        let service = CandidatureService::new(storage.clone());
        let gestor = usuario(&storage, "Marina Lima", UserRole::Gestor);
        let ana = usuario(&storage, "Ana Souza", UserRole::Medico);
        let joao = usuario(&storage, "Joao Reis", UserRole::Medico);
        let escala = escala_publicada(&storage);

        let da_ana = service.apply(&ana, escala.id()).unwrap();
        let do_joao = service.apply(&joao, escala.id()).unwrap();

        let aceita = service.accept(&gestor, da_ana.id()).unwrap();
        assert_eq!(aceita.status, CandidatureStatus::Aceito);
        assert_eq!(aceita.workflow_step, Some(1));
        assert_eq!(aceita.responded_by, Some(gestor.id()));

        let escala = storage.get_by_id::<Scale>(escala.id()).unwrap().unwrap();
        assert_eq!(escala.assigned_doctor_id, Some(ana.id()));

        let concorrente = service.get(do_joao.id()).unwrap();
        assert_eq!(concorrente.status, CandidatureStatus::Negado);

        // cada médico foi notificado do desfecho
        let notificacoes = storage.get_all::<Notification>(false).unwrap();
        assert!(notificacoes
            .iter()
            .any(|n| n.user_id == ana.id() && n.kind == NotificationType::Success));
        assert!(notificacoes
            .iter()
            .any(|n| n.user_id == joao.id() && n.kind == NotificationType::Warning));
    }

    #[test]
    fn aceite_em_escala_ja_designada_e_conflito() {
        let storage = Storage::in_memory();
        let service = CandidatureService::new(storage.clone());
        let gestor = usuario(&storage, "Marina Lima", UserRole::Gestor);
        let ana = usuario(&storage, "Ana Souza", UserRole::Medico);
        let joao = usuario(&storage, "Joao Reis", UserRole::Medico);
        let escala = escala_publicada(&storage);

        let da_ana = service.apply(&ana, escala.id()).unwrap();
        let do_joao = service.apply(&joao, escala.id()).unwrap();
        service.accept(&gestor, da_ana.id()).unwrap();

        // a do João já foi negada pelo aceite da Ana
        assert!(matches!(
            service.accept(&gestor, do_joao.id()),
            Err(AppError::CandidatureAlreadyResolved)
        ));
    }

    #[test]
    fn fluxo_pos_aceite_nunca_regride_e_pode_pular_etapas() {
        let storage = Storage::in_memory();
        let service = CandidatureService::new(storage.clone());
        let gestor = usuario(&storage, "Marina Lima", UserRole::Gestor);
        let ana = usuario(&storage, "Ana Souza", UserRole::Medico);
        let escala = escala_publicada(&storage);

        let candidatura = service.apply(&ana, escala.id()).unwrap();
        service.accept(&gestor, candidatura.id()).unwrap();

        // pular da 1 para a 4 é permitido
        let avancada = service.advance_workflow(&gestor, candidatura.id(), 4).unwrap();
        assert_eq!(avancada.workflow_step, Some(4));

        // voltar para a 3 nunca
        assert!(matches!(
            service.advance_workflow(&gestor, candidatura.id(), 3),
            Err(AppError::WorkflowRegression {
                current: 4,
                requested: 3,
            })
        ));

        // fora do intervalo 1..=6
        assert!(matches!(
            service.advance_workflow(&gestor, candidatura.id(), 7),
            Err(AppError::InvalidWorkflowStep(7))
        ));
    }

    #[test]
    fn fluxo_so_anda_em_candidatura_aceita() {
        let storage = Storage::in_memory();
        let service = CandidatureService::new(storage.clone());
        let gestor = usuario(&storage, "Marina Lima", UserRole::Gestor);
        let ana = usuario(&storage, "Ana Souza", UserRole::Medico);
        let escala = escala_publicada(&storage);

        let candidatura = service.apply(&ana, escala.id()).unwrap();

        assert!(matches!(
            service.advance_workflow(&gestor, candidatura.id(), 2),
            Err(AppError::CandidatureNotAccepted)
        ));
    }

    #[test]
    fn etapa_final_registra_o_pagamento_do_plantao() {
        let storage = Storage::in_memory();
        let service = CandidatureService::new(storage.clone());
        let gestor = usuario(&storage, "Marina Lima", UserRole::Gestor);
        let ana = usuario(&storage, "Ana Souza", UserRole::Medico);
        let escala = escala_publicada(&storage);

        let candidatura = service.apply(&ana, escala.id()).unwrap();
        service.accept(&gestor, candidatura.id()).unwrap();
        service
            .advance_workflow(&gestor, candidatura.id(), WORKFLOW_FINAL_STEP)
            .unwrap();

        let pagamentos = storage.get_all::<Payment>(false).unwrap();
        assert_eq!(pagamentos.len(), 1);
        assert_eq!(pagamentos[0].doctor_id, ana.id());
        assert_eq!(pagamentos[0].status, PaymentStatus::Pendente);
        // sem data de pagamento na escala, vence 30 dias após o plantão
        assert_eq!(pagamentos[0].due_date, escala.date + Duration::days(30));
    }
}

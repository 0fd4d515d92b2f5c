// src/services/scale_service.rs

use chrono::{NaiveDate, Utc};
use serde_json::json;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::common::error::AppError;
use crate::common::geo::{is_within_radius, Coordinates};
use crate::db::store::Storage;
use crate::models::auth::UserProfile;
use crate::models::base::Entity;
use crate::models::finance::PaymentStatus;
use crate::models::locations::Location;
use crate::models::scales::{
    CancellationOutcome, CheckRecord, Scale, ScaleStatus, UpsertScalePayload,
};

// Ciclo de vida da escala: rascunho -> publicada -> em_andamento ->
// concluida, com cancelamento permitido só antes do plantão começar.
// Toda transição valida e grava dentro de um único `update_with`.
#[derive(Clone)]
pub struct ScaleService {
    storage: Storage,
    checkin_radius_m: f64,
}

impl ScaleService {
    pub fn new(storage: Storage, checkin_radius_m: f64) -> Self {
        Self {
            storage,
            checkin_radius_m,
        }
    }

    /// Listagem com escopo: sem `view_all`, o usuário enxerga as escalas em
    /// que está designado ou candidatado, mais as dos seus subordinados.
    pub fn list(&self, viewer: &UserProfile, view_all: bool) -> Result<Vec<Scale>, AppError> {
        let scales = self.storage.get_all::<Scale>(false)?;
        if view_all {
            return Ok(scales);
        }

        let mut visible_ids: Vec<Uuid> = vec![viewer.id()];
        if let Some(subordinates) = &viewer.subordinate_ids {
            visible_ids.extend(subordinates.iter().copied());
        }

        Ok(scales
            .into_iter()
            .filter(|scale| {
                scale
                    .assigned_doctor_id
                    .is_some_and(|id| visible_ids.contains(&id))
                    || scale
                        .candidate_ids
                        .as_ref()
                        .is_some_and(|ids| ids.iter().any(|id| visible_ids.contains(id)))
            })
            .collect())
    }

    pub fn get(&self, id: Uuid) -> Result<Scale, AppError> {
        self.storage
            .get_by_id(id)?
            .ok_or(AppError::NotFound(Scale::LABEL))
    }

    /// Toda escala nasce como rascunho com pagamento pendente.
    pub fn create(
        &self,
        actor: &UserProfile,
        payload: UpsertScalePayload,
    ) -> Result<Scale, AppError> {
        payload.validate()?;

        let scale = Scale {
            base: Default::default(),
            location_id: payload.location_id,
            scale_type_id: payload.scale_type_id,
            specialty_id: payload.specialty_id,
            title: payload.title,
            description: payload.description,
            date: payload.date,
            start_time: payload.start_time,
            end_time: payload.end_time,
            shift: payload.shift,
            status: ScaleStatus::Rascunho,
            cancellation_deadline_days: payload.cancellation_deadline_days,
            transfer_deadline_days: payload.transfer_deadline_days,
            payment_value: payload.payment_value,
            payment_date: payload.payment_date,
            payment_status: PaymentStatus::Pendente,
            min_patients: payload.min_patients,
            max_patients: payload.max_patients,
            meal_break_minutes: payload.meal_break_minutes,
            required_documents: payload.required_documents,
            assigned_doctor_id: None,
            candidate_ids: None,
            check_in: None,
            check_out: None,
        };
        Self::validate_meal_break(&scale)?;

        let created = self.storage.create(scale)?;
        self.storage.log_audit(
            actor.id(),
            &actor.name,
            "CREATE",
            Scale::LABEL,
            created.id(),
            Some(json!({ "title": created.title })),
        )?;
        Ok(created)
    }

    /// Edição dos dados da vaga, permitida enquanto o plantão não começou.
    pub fn update(
        &self,
        actor: &UserProfile,
        id: Uuid,
        payload: UpsertScalePayload,
    ) -> Result<Scale, AppError> {
        payload.validate()?;

        let updated = self
            .storage
            .update_with::<Scale>(id, |scale| {
                if !matches!(scale.status, ScaleStatus::Rascunho | ScaleStatus::Publicada) {
                    return Err(AppError::InvalidTransition {
                        from: scale.status,
                        to: scale.status,
                    });
                }
                scale.location_id = payload.location_id;
                scale.scale_type_id = payload.scale_type_id;
                scale.specialty_id = payload.specialty_id;
                scale.title = payload.title.clone();
                scale.description = payload.description.clone();
                scale.date = payload.date;
                scale.start_time = payload.start_time;
                scale.end_time = payload.end_time;
                scale.shift = payload.shift;
                scale.cancellation_deadline_days = payload.cancellation_deadline_days;
                scale.transfer_deadline_days = payload.transfer_deadline_days;
                scale.payment_value = payload.payment_value;
                scale.payment_date = payload.payment_date;
                scale.min_patients = payload.min_patients;
                scale.max_patients = payload.max_patients;
                scale.meal_break_minutes = payload.meal_break_minutes;
                scale.required_documents = payload.required_documents.clone();
                Self::validate_meal_break(scale)
            })?
            .ok_or(AppError::NotFound(Scale::LABEL))?;

        self.storage.log_audit(
            actor.id(),
            &actor.name,
            "UPDATE",
            Scale::LABEL,
            id,
            Some(json!({ "title": updated.title })),
        )?;
        Ok(updated)
    }

    pub fn publish(&self, actor: &UserProfile, id: Uuid) -> Result<Scale, AppError> {
        let published = self
            .storage
            .update_with::<Scale>(id, |scale| {
                if scale.status != ScaleStatus::Rascunho {
                    return Err(AppError::InvalidTransition {
                        from: scale.status,
                        to: ScaleStatus::Publicada,
                    });
                }
                scale.status = ScaleStatus::Publicada;
                Ok(())
            })?
            .ok_or(AppError::NotFound(Scale::LABEL))?;

        self.storage
            .log_audit(actor.id(), &actor.name, "PUBLISH", Scale::LABEL, id, None)?;
        Ok(published)
    }

    /// Transição administrativa publicada -> em_andamento, sem check-in.
    pub fn start(&self, actor: &UserProfile, id: Uuid) -> Result<Scale, AppError> {
        let started = self
            .storage
            .update_with::<Scale>(id, |scale| {
                if scale.status != ScaleStatus::Publicada {
                    return Err(AppError::InvalidTransition {
                        from: scale.status,
                        to: ScaleStatus::EmAndamento,
                    });
                }
                if scale.assigned_doctor_id.is_none() {
                    return Err(AppError::ScaleNotOpen);
                }
                scale.status = ScaleStatus::EmAndamento;
                Ok(())
            })?
            .ok_or(AppError::NotFound(Scale::LABEL))?;

        self.storage
            .log_audit(actor.id(), &actor.name, "START", Scale::LABEL, id, None)?;
        Ok(started)
    }

    /// Transição administrativa em_andamento -> concluida, sem check-out.
    pub fn complete(&self, actor: &UserProfile, id: Uuid) -> Result<Scale, AppError> {
        let completed = self
            .storage
            .update_with::<Scale>(id, |scale| {
                if scale.status != ScaleStatus::EmAndamento {
                    return Err(AppError::InvalidTransition {
                        from: scale.status,
                        to: ScaleStatus::Concluida,
                    });
                }
                scale.status = ScaleStatus::Concluida;
                Ok(())
            })?
            .ok_or(AppError::NotFound(Scale::LABEL))?;

        if let Some(doctor_id) = completed.assigned_doctor_id {
            self.bump_completed_scales(doctor_id)?;
        }
        self.storage
            .log_audit(actor.id(), &actor.name, "COMPLETE", Scale::LABEL, id, None)?;
        Ok(completed)
    }

    /// Cancela a escala (só de rascunho ou publicada) e informa se o
    /// cancelamento ainda caiu dentro do prazo livre de penalidade. A
    /// política de penalidade fica com o chamador.
    pub fn cancel(
        &self,
        actor: &UserProfile,
        id: Uuid,
        today: NaiveDate,
    ) -> Result<CancellationOutcome, AppError> {
        let cancelled = self
            .storage
            .update_with::<Scale>(id, |scale| {
                if !matches!(scale.status, ScaleStatus::Rascunho | ScaleStatus::Publicada) {
                    return Err(AppError::InvalidTransition {
                        from: scale.status,
                        to: ScaleStatus::Cancelada,
                    });
                }
                scale.status = ScaleStatus::Cancelada;
                Ok(())
            })?
            .ok_or(AppError::NotFound(Scale::LABEL))?;

        let within_deadline = cancelled.within_cancellation_deadline(today);
        self.storage.log_audit(
            actor.id(),
            &actor.name,
            "CANCEL",
            Scale::LABEL,
            id,
            Some(json!({ "withinDeadline": within_deadline })),
        )?;
        Ok(CancellationOutcome {
            scale: cancelled,
            within_deadline,
        })
    }

    /// Check-in do médico designado: registra as coordenadas (dentro ou
    /// fora do raio aceito) e inicia o plantão. Posição fora do raio nunca
    /// bloqueia, só entra marcada como não verificada.
    pub fn check_in(
        &self,
        actor: &UserProfile,
        id: Uuid,
        coordinates: Coordinates,
    ) -> Result<Scale, AppError> {
        let scale = self.get(id)?;
        let verified = self.verify_position(&scale, &coordinates)?;

        let updated = self
            .storage
            .update_with::<Scale>(id, |scale| {
                if scale.assigned_doctor_id != Some(actor.id()) {
                    return Err(AppError::PermissionDenied("realizar o check-in desta escala"));
                }
                if scale.status != ScaleStatus::Publicada {
                    return Err(AppError::InvalidTransition {
                        from: scale.status,
                        to: ScaleStatus::EmAndamento,
                    });
                }
                scale.check_in = Some(CheckRecord {
                    timestamp: Utc::now(),
                    coordinates,
                    verified,
                });
                scale.status = ScaleStatus::EmAndamento;
                Ok(())
            })?
            .ok_or(AppError::NotFound(Scale::LABEL))?;

        self.storage.log_audit(
            actor.id(),
            &actor.name,
            "CHECK_IN",
            Scale::LABEL,
            id,
            Some(json!({ "verified": verified })),
        )?;
        Ok(updated)
    }

    /// Check-out do médico designado: encerra o plantão e credita a escala
    /// concluída nas métricas do médico.
    pub fn check_out(
        &self,
        actor: &UserProfile,
        id: Uuid,
        coordinates: Coordinates,
    ) -> Result<Scale, AppError> {
        let scale = self.get(id)?;
        let verified = self.verify_position(&scale, &coordinates)?;

        let updated = self
            .storage
            .update_with::<Scale>(id, |scale| {
                if scale.assigned_doctor_id != Some(actor.id()) {
                    return Err(AppError::PermissionDenied("realizar o check-out desta escala"));
                }
                if scale.status != ScaleStatus::EmAndamento {
                    return Err(AppError::InvalidTransition {
                        from: scale.status,
                        to: ScaleStatus::Concluida,
                    });
                }
                scale.check_out = Some(CheckRecord {
                    timestamp: Utc::now(),
                    coordinates,
                    verified,
                });
                scale.status = ScaleStatus::Concluida;
                Ok(())
            })?
            .ok_or(AppError::NotFound(Scale::LABEL))?;

        self.bump_completed_scales(actor.id())?;
        self.storage.log_audit(
            actor.id(),
            &actor.name,
            "CHECK_OUT",
            Scale::LABEL,
            id,
            Some(json!({ "verified": verified })),
        )?;
        Ok(updated)
    }

    pub fn delete(&self, actor: &UserProfile, id: Uuid) -> Result<bool, AppError> {
        let deleted = self.storage.soft_delete::<Scale>(id)?;
        if deleted {
            self.storage
                .log_audit(actor.id(), &actor.name, "DELETE", Scale::LABEL, id, None)?;
        }
        Ok(deleted)
    }

    pub fn hard_delete(&self, actor: &UserProfile, id: Uuid) -> Result<bool, AppError> {
        let removed = self.storage.hard_delete::<Scale>(id)?;
        if removed {
            self.storage.log_audit(
                actor.id(),
                &actor.name,
                "HARD_DELETE",
                Scale::LABEL,
                id,
                None,
            )?;
        }
        Ok(removed)
    }

    // O intervalo de refeição precisa caber dentro do plantão. A duração já
    // trata a virada de meia-noite, então um plantão noturno de 19h às 7h
    // conta 12 horas e não um intervalo negativo.
    fn validate_meal_break(scale: &Scale) -> Result<(), AppError> {
        let duration_minutes = scale.duration().num_minutes();
        if scale
            .meal_break_minutes
            .is_some_and(|minutes| i64::from(minutes) >= duration_minutes)
        {
            let mut errors = ValidationErrors::new();
            errors.add(
                "mealBreakMinutes".into(),
                ValidationError::new("range")
                    .with_message("Intervalo de refeição não cabe na duração do plantão".into()),
            );
            return Err(AppError::ValidationError(errors));
        }
        Ok(())
    }

    // Posição verificada quando cai dentro do raio aceito em torno das
    // coordenadas cadastradas do local. Local sem coordenadas não tem como
    // verificar: registra como não verificado.
    fn verify_position(&self, scale: &Scale, position: &Coordinates) -> Result<bool, AppError> {
        let location = self
            .storage
            .get_by_id::<Location>(scale.location_id)?
            .ok_or(AppError::NotFound(Location::LABEL))?;

        Ok(location
            .coordinates
            .as_ref()
            .is_some_and(|registered| {
                is_within_radius(*registered, *position, self.checkin_radius_m)
            }))
    }

    fn bump_completed_scales(&self, doctor_id: Uuid) -> Result<(), AppError> {
        self.storage.update_with::<UserProfile>(doctor_id, |user| {
            user.completed_scales = Some(user.completed_scales.unwrap_or(0) + 1);
            Ok(())
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::geo::MOCK_COORDINATES;
    use crate::models::auth::{Address, UserRole, UserStatus};
    use crate::models::base::BaseFields;
    use crate::models::locations::LocationType;
    use crate::models::scales::Shift;
    use chrono::{Duration, NaiveTime};
    use rust_decimal::Decimal;

    fn admin() -> UserProfile {
        UserProfile {
            base: BaseFields::new(),
            name: "Carlos Pereira".to_string(),
            email: "carlos@medly.com.br".to_string(),
            phone: "(11) 98888-0000".to_string(),
            cpf: "529.982.247-25".to_string(),
            role: UserRole::Admin,
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
        }
    }

    fn medica(storage: &Storage) -> UserProfile {
        let mut user = admin();
        user.name = "Dra. Ana Souza".to_string();
        user.email = "ana@medly.com.br".to_string();
        user.cpf = "987.654.321-00".to_string();
        user.role = UserRole::Medico;
        user.completed_scales = Some(0);
        storage.create(user).unwrap()
    }

    fn hospital(storage: &Storage) -> Location {
        storage
            .create(Location {
                base: BaseFields::new(),
                name: "Hospital São Lucas".to_string(),
                kind: LocationType::Hospital,
                address: Address {
                    cep: "01310-100".to_string(),
                    street: "Avenida Paulista".to_string(),
                    number: "1000".to_string(),
                    complement: None,
                    neighborhood: "Bela Vista".to_string(),
                    city: "São Paulo".to_string(),
                    state: "SP".to_string(),
                },
                coordinates: Some(MOCK_COORDINATES),
                phone: None,
                email: None,
                average_rating: None,
            })
            .unwrap()
    }

    fn escala(storage: &Storage, location: &Location, status: ScaleStatus) -> Scale {
        storage
            .create(Scale {
                base: BaseFields::new(),
                location_id: location.id(),
                scale_type_id: Uuid::new_v4(),
                specialty_id: Uuid::new_v4(),
                title: "Plantão UTI".to_string(),
                description: None,
                date: Utc::now().date_naive() + Duration::days(14),
                start_time: NaiveTime::from_hms_opt(7, 0, 0).unwrap(),
                end_time: NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
                shift: Shift::Plantao12h,
                status,
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
    fn publicar_so_a_partir_de_rascunho() {
        let storage = Storage::in_memory();
        let service = ScaleService::new(storage.clone(), 500.0);
        let actor = admin();
        let local = hospital(&storage);
        let criada = escala(&storage, &local, ScaleStatus::Rascunho);

        let publicada = service.publish(&actor, criada.id()).unwrap();
        assert_eq!(publicada.status, ScaleStatus::Publicada);

        // publicar de novo é transição inválida
        let repetida = service.publish(&actor, criada.id());
        assert!(matches!(
            repetida,
            Err(AppError::InvalidTransition {
                from: ScaleStatus::Publicada,
                to: ScaleStatus::Publicada,
            })
        ));
    }

    #[test]
    fn transicao_invalida_nao_grava_nada() {
        let storage = Storage::in_memory();
        let service = ScaleService::new(storage.clone(), 500.0);
        let actor = admin();
        let local = hospital(&storage);
        let concluida = escala(&storage, &local, ScaleStatus::Concluida);

        assert!(service.publish(&actor, concluida.id()).is_err());

        let relida = service.get(concluida.id()).unwrap();
        assert_eq!(relida.status, ScaleStatus::Concluida);
        assert_eq!(relida.base.updated_at, concluida.base.updated_at);
    }

    #[test]
    fn cancelamento_informa_se_o_prazo_livre_ja_passou() {
        let storage = Storage::in_memory();
        let service = ScaleService::new(storage.clone(), 500.0);
        let actor = admin();
        let local = hospital(&storage);

        // plantão daqui a 14 dias, prazo de 3: ainda dentro do prazo livre
        let folgada = escala(&storage, &local, ScaleStatus::Publicada);
        let hoje = Utc::now().date_naive();
        let resultado = service.cancel(&actor, folgada.id(), hoje).unwrap();
        assert_eq!(resultado.scale.status, ScaleStatus::Cancelada);
        assert!(resultado.within_deadline);

        // a dois dias do plantão, o prazo de 3 já estourou
        let apertada = escala(&storage, &local, ScaleStatus::Publicada);
        let resultado = service
            .cancel(&actor, apertada.id(), apertada.date - Duration::days(2))
            .unwrap();
        assert!(!resultado.within_deadline);

        // cancelar o que já está em andamento é transição inválida
        let andando = escala(&storage, &local, ScaleStatus::EmAndamento);
        assert!(service.cancel(&actor, andando.id(), hoje).is_err());
    }

    #[test]
    fn check_in_dentro_do_raio_verifica_e_inicia_o_plantao() {
        let storage = Storage::in_memory();
        let service = ScaleService::new(storage.clone(), 500.0);
        let doutora = medica(&storage);
        let local = hospital(&storage);

        let criada = escala(&storage, &local, ScaleStatus::Publicada);
        storage
            .update_with::<Scale>(criada.id(), |scale| {
                scale.assigned_doctor_id = Some(doutora.id());
                Ok(())
            })
            .unwrap();

        let atualizada = service
            .check_in(&doutora, criada.id(), MOCK_COORDINATES)
            .unwrap();

        assert_eq!(atualizada.status, ScaleStatus::EmAndamento);
        let registro = atualizada.check_in.expect("check-in gravado");
        assert!(registro.verified);
    }

    #[test]
    fn check_in_fora_do_raio_registra_sem_verificar() {
        let storage = Storage::in_memory();
        let service = ScaleService::new(storage.clone(), 500.0);
        let doutora = medica(&storage);
        let local = hospital(&storage);

        let criada = escala(&storage, &local, ScaleStatus::Publicada);
        storage
            .update_with::<Scale>(criada.id(), |scale| {
                scale.assigned_doctor_id = Some(doutora.id());
                Ok(())
            })
            .unwrap();

        // ~2,2 km do hospital
        let longe = Coordinates {
            lat: MOCK_COORDINATES.lat + 0.02,
            lng: MOCK_COORDINATES.lng,
        };
        let atualizada = service.check_in(&doutora, criada.id(), longe).unwrap();

        assert_eq!(atualizada.status, ScaleStatus::EmAndamento);
        assert!(!atualizada.check_in.unwrap().verified);
    }

    #[test]
    fn check_in_de_quem_nao_esta_designado_e_negado() {
        let storage = Storage::in_memory();
        let service = ScaleService::new(storage.clone(), 500.0);
        let doutora = medica(&storage);
        let local = hospital(&storage);
        let criada = escala(&storage, &local, ScaleStatus::Publicada);

        let resultado = service.check_in(&doutora, criada.id(), MOCK_COORDINATES);
        assert!(matches!(resultado, Err(AppError::PermissionDenied(_))));
    }

    #[test]
    fn check_out_conclui_e_credita_a_escala_na_medica() {
        let storage = Storage::in_memory();
        let service = ScaleService::new(storage.clone(), 500.0);
        let doutora = medica(&storage);
        let local = hospital(&storage);

        let criada = escala(&storage, &local, ScaleStatus::EmAndamento);
        storage
            .update_with::<Scale>(criada.id(), |scale| {
                scale.assigned_doctor_id = Some(doutora.id());
                Ok(())
            })
            .unwrap();

        let concluida = service
            .check_out(&doutora, criada.id(), MOCK_COORDINATES)
            .unwrap();

        assert_eq!(concluida.status, ScaleStatus::Concluida);
        assert!(concluida.check_out.unwrap().verified);

        let perfil = storage.get_by_id::<UserProfile>(doutora.id()).unwrap().unwrap();
        assert_eq!(perfil.completed_scales, Some(1));
    }

    #[test]
    fn listagem_sem_view_all_mostra_so_o_proprio_escopo() {
        let storage = Storage::in_memory();
        let service = ScaleService::new(storage.clone(), 500.0);
        let doutora = medica(&storage);
        let local = hospital(&storage);

        let minha = escala(&storage, &local, ScaleStatus::Publicada);
        storage
            .update_with::<Scale>(minha.id(), |scale| {
                scale.assigned_doctor_id = Some(doutora.id());
                Ok(())
            })
            .unwrap();
        // escala de outra pessoa
        escala(&storage, &local, ScaleStatus::Publicada);

        let restrita = service.list(&doutora, false).unwrap();
        assert_eq!(restrita.len(), 1);
        assert_eq!(restrita[0].id(), minha.id());

        let completa = service.list(&doutora, true).unwrap();
        assert_eq!(completa.len(), 2);
    }

    fn payload(
        local: &Location,
        inicio: NaiveTime,
        fim: NaiveTime,
        intervalo: Option<u32>,
    ) -> UpsertScalePayload {
        UpsertScalePayload {
            location_id: local.id(),
            scale_type_id: Uuid::new_v4(),
            specialty_id: Uuid::new_v4(),
            title: "Plantão Noturno".to_string(),
            description: None,
            date: Utc::now().date_naive() + Duration::days(14),
            start_time: inicio,
            end_time: fim,
            shift: Shift::Plantao12h,
            cancellation_deadline_days: 3,
            transfer_deadline_days: 3,
            payment_value: Decimal::new(1500, 0),
            payment_date: None,
            min_patients: None,
            max_patients: None,
            meal_break_minutes: intervalo,
            required_documents: None,
        }
    }

    #[test]
    fn intervalo_de_refeicao_respeita_a_duracao_com_virada_de_meia_noite() {
        let storage = Storage::in_memory();
        let service = ScaleService::new(storage.clone(), 500.0);
        let actor = admin();
        let local = hospital(&storage);
        let hora = |h| NaiveTime::from_hms_opt(h, 0, 0).unwrap();

        // plantão noturno de 19h às 7h dura 12 horas: 1h de intervalo cabe
        let noturna = service
            .create(&actor, payload(&local, hora(19), hora(7), Some(60)))
            .unwrap();
        assert_eq!(noturna.duration(), Duration::hours(12));

        // de 23h à 1h são só 2 horas; 150 minutos de intervalo não cabem
        let curta = service.create(&actor, payload(&local, hora(23), hora(1), Some(150)));
        assert!(matches!(curta, Err(AppError::ValidationError(_))));
    }
}

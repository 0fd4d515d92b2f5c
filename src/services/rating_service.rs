// src/services/rating_service.rs

use serde_json::json;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::common::error::AppError;
use crate::db::store::Storage;
use crate::models::auth::UserProfile;
use crate::models::base::{BaseFields, Entity};
use crate::models::finance::{CreateRatingPayload, Rating, RatingType};
use crate::models::locations::Location;
use crate::models::scales::Scale;

// Avaliações cruzadas entre médico e local. Cada avaliação nova recompõe
// a média do avaliado sobre as avaliações não excluídas.
#[derive(Clone)]
pub struct RatingService {
    storage: Storage,
}

impl RatingService {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    pub fn list(&self) -> Result<Vec<Rating>, AppError> {
        self.storage.get_all(false)
    }

    pub fn for_scale(&self, scale_id: Uuid) -> Result<Vec<Rating>, AppError> {
        Ok(self
            .storage
            .get_all::<Rating>(false)?
            .into_iter()
            .filter(|r| r.scale_id == scale_id)
            .collect())
    }

    pub fn create(
        &self,
        actor: &UserProfile,
        payload: CreateRatingPayload,
    ) -> Result<Rating, AppError> {
        payload.validate()?;

        // O alvo tem que bater com o sentido da avaliação.
        match payload.kind {
            RatingType::DoctorToLocation if payload.to_location_id.is_none() => {
                return Err(missing_target("toLocationId"));
            }
            RatingType::LocationToDoctor if payload.to_user_id.is_none() => {
                return Err(missing_target("toUserId"));
            }
            _ => {}
        }

        self.storage
            .get_by_id::<Scale>(payload.scale_id)?
            .ok_or(AppError::NotFound(Scale::LABEL))?;

        let created = self.storage.create(Rating {
            base: BaseFields::new(),
            scale_id: payload.scale_id,
            from_user_id: actor.id(),
            to_user_id: payload.to_user_id,
            to_location_id: payload.to_location_id,
            kind: payload.kind,
            overall_score: payload.overall_score,
            punctuality_score: payload.punctuality_score,
            quality_score: payload.quality_score,
            professionalism_score: payload.professionalism_score,
            comment: payload.comment,
        })?;

        match created.kind {
            RatingType::LocationToDoctor => {
                if let Some(doctor_id) = created.to_user_id {
                    self.refresh_doctor_average(doctor_id)?;
                }
            }
            RatingType::DoctorToLocation => {
                if let Some(location_id) = created.to_location_id {
                    self.refresh_location_average(location_id)?;
                }
            }
        }

        self.storage.log_audit(
            actor.id(),
            &actor.name,
            "CREATE",
            Rating::LABEL,
            created.id(),
            Some(json!({ "overallScore": created.overall_score })),
        )?;
        Ok(created)
    }

    pub fn delete(&self, actor: &UserProfile, id: Uuid) -> Result<bool, AppError> {
        let rating = self.storage.get_by_id::<Rating>(id)?;
        let deleted = self.storage.soft_delete::<Rating>(id)?;
        if deleted {
            // a exclusão também mexe na média do avaliado
            if let Some(rating) = rating {
                match rating.kind {
                    RatingType::LocationToDoctor => {
                        if let Some(doctor_id) = rating.to_user_id {
                            self.refresh_doctor_average(doctor_id)?;
                        }
                    }
                    RatingType::DoctorToLocation => {
                        if let Some(location_id) = rating.to_location_id {
                            self.refresh_location_average(location_id)?;
                        }
                    }
                }
            }
            self.storage
                .log_audit(actor.id(), &actor.name, "DELETE", Rating::LABEL, id, None)?;
        }
        Ok(deleted)
    }

    fn average(scores: &[u8]) -> Option<f64> {
        if scores.is_empty() {
            return None;
        }
        let sum: u32 = scores.iter().map(|&s| u32::from(s)).sum();
        Some(f64::from(sum) / scores.len() as f64)
    }

    fn refresh_doctor_average(&self, doctor_id: Uuid) -> Result<(), AppError> {
        let scores: Vec<u8> = self
            .storage
            .get_all::<Rating>(false)?
            .into_iter()
            .filter(|r| r.kind == RatingType::LocationToDoctor && r.to_user_id == Some(doctor_id))
            .map(|r| r.overall_score)
            .collect();

        let average = Self::average(&scores);
        self.storage.update_with::<UserProfile>(doctor_id, |user| {
            user.average_rating = average;
            Ok(())
        })?;
        Ok(())
    }

    fn refresh_location_average(&self, location_id: Uuid) -> Result<(), AppError> {
        let scores: Vec<u8> = self
            .storage
            .get_all::<Rating>(false)?
            .into_iter()
            .filter(|r| {
                r.kind == RatingType::DoctorToLocation && r.to_location_id == Some(location_id)
            })
            .map(|r| r.overall_score)
            .collect();

        let average = Self::average(&scores);
        self.storage.update_with::<Location>(location_id, |location| {
            location.average_rating = average;
            Ok(())
        })?;
        Ok(())
    }
}

fn missing_target(field: &'static str) -> AppError {
    let mut errors = ValidationErrors::new();
    errors.add(
        field.into(),
        ValidationError::new("required").with_message("Informe o avaliado".into()),
    );
    AppError::ValidationError(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::geo::MOCK_COORDINATES;
    use crate::models::auth::{Address, UserRole, UserStatus};
    use crate::models::finance::PaymentStatus;
    use crate::models::locations::LocationType;
    use crate::models::scales::{ScaleStatus, Shift};
    use chrono::{NaiveTime, Utc};
    use rust_decimal::Decimal;

    fn medica(storage: &Storage) -> UserProfile {
        storage
            .create(UserProfile {
                base: BaseFields::new(),
                name: "Dra. Ana Souza".to_string(),
                email: format!("{}@medly.com.br", Uuid::new_v4()),
                phone: "(11) 98888-0000".to_string(),
                cpf: Uuid::new_v4().to_string(),
                role: UserRole::Medico,
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

    fn local(storage: &Storage) -> Location {
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

    fn escala(storage: &Storage, location_id: Uuid) -> Scale {
        storage
            .create(Scale {
                base: BaseFields::new(),
                location_id,
                scale_type_id: Uuid::new_v4(),
                specialty_id: Uuid::new_v4(),
                title: "Plantão UTI".to_string(),
                description: None,
                date: Utc::now().date_naive(),
                start_time: NaiveTime::from_hms_opt(7, 0, 0).unwrap(),
                end_time: NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
                shift: Shift::Plantao12h,
                status: ScaleStatus::Concluida,
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

    fn avaliacao_do_local(scale_id: Uuid, doctor_id: Uuid, score: u8) -> CreateRatingPayload {
        CreateRatingPayload {
            scale_id,
            to_user_id: Some(doctor_id),
            to_location_id: None,
            kind: RatingType::LocationToDoctor,
            overall_score: score,
            punctuality_score: None,
            quality_score: None,
            professionalism_score: None,
            comment: None,
        }
    }

    #[test]
    fn nova_avaliacao_recompoe_a_media_do_medico() {
        let storage = Storage::in_memory();
        let service = RatingService::new(storage.clone());
        let doutora = medica(&storage);
        let gestor = medica(&storage);
        let unidade = local(&storage);
        let plantao = escala(&storage, unidade.id());

        service
            .create(&gestor, avaliacao_do_local(plantao.id(), doutora.id(), 5))
            .unwrap();
        service
            .create(&gestor, avaliacao_do_local(plantao.id(), doutora.id(), 4))
            .unwrap();

        let perfil = storage.get_by_id::<UserProfile>(doutora.id()).unwrap().unwrap();
        assert_eq!(perfil.average_rating, Some(4.5));
    }

    #[test]
    fn excluir_avaliacao_tambem_recompoe_a_media() {
        let storage = Storage::in_memory();
        let service = RatingService::new(storage.clone());
        let doutora = medica(&storage);
        let gestor = medica(&storage);
        let unidade = local(&storage);
        let plantao = escala(&storage, unidade.id());

        service
            .create(&gestor, avaliacao_do_local(plantao.id(), doutora.id(), 5))
            .unwrap();
        let baixa = service
            .create(&gestor, avaliacao_do_local(plantao.id(), doutora.id(), 1))
            .unwrap();

        service.delete(&gestor, baixa.id()).unwrap();

        let perfil = storage.get_by_id::<UserProfile>(doutora.id()).unwrap().unwrap();
        assert_eq!(perfil.average_rating, Some(5.0));
    }

    #[test]
    fn avaliacao_de_medico_para_local_atualiza_a_media_da_unidade() {
        let storage = Storage::in_memory();
        let service = RatingService::new(storage.clone());
        let doutora = medica(&storage);
        let unidade = local(&storage);
        let plantao = escala(&storage, unidade.id());

        service
            .create(
                &doutora,
                CreateRatingPayload {
                    scale_id: plantao.id(),
                    to_user_id: None,
                    to_location_id: Some(unidade.id()),
                    kind: RatingType::DoctorToLocation,
                    overall_score: 3,
                    punctuality_score: None,
                    quality_score: None,
                    professionalism_score: None,
                    comment: Some("Estrutura razoável".to_string()),
                },
            )
            .unwrap();

        let relida = storage.get_by_id::<Location>(unidade.id()).unwrap().unwrap();
        assert_eq!(relida.average_rating, Some(3.0));
    }

    #[test]
    fn avaliacao_sem_alvo_e_erro_de_validacao() {
        let storage = Storage::in_memory();
        let service = RatingService::new(storage.clone());
        let doutora = medica(&storage);
        let unidade = local(&storage);
        let plantao = escala(&storage, unidade.id());

        let resultado = service.create(
            &doutora,
            CreateRatingPayload {
                scale_id: plantao.id(),
                to_user_id: None,
                to_location_id: None,
                kind: RatingType::LocationToDoctor,
                overall_score: 5,
                punctuality_score: None,
                quality_score: None,
                professionalism_score: None,
                comment: None,
            },
        );

        assert!(matches!(resultado, Err(AppError::ValidationError(_))));
    }
}

// src/db/user_repo.rs

use uuid::Uuid;

use crate::common::error::AppError;
use crate::db::store::Storage;
use crate::models::auth::UserProfile;
use crate::models::base::Entity;

// Consultas sobre a coleção `users`: e-mail é comparado sem diferenciar
// maiúsculas e registros excluídos logicamente ficam de fora.
#[derive(Clone)]
pub struct UserRepository {
    storage: Storage,
}

impl UserRepository {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    pub fn find_by_id(&self, id: Uuid) -> Result<Option<UserProfile>, AppError> {
        self.storage.get_by_id(id)
    }

    pub fn find_by_email(&self, email: &str) -> Result<Option<UserProfile>, AppError> {
        let needle = email.to_lowercase();
        Ok(self
            .storage
            .get_all::<UserProfile>(false)?
            .into_iter()
            .find(|user| user.email.to_lowercase() == needle))
    }

    pub fn find_by_cpf(&self, cpf: &str) -> Result<Option<UserProfile>, AppError> {
        Ok(self
            .storage
            .get_all::<UserProfile>(false)?
            .into_iter()
            .find(|user| user.cpf == cpf))
    }

    /// Insere um usuário novo aplicando as regras de unicidade: e-mail e
    /// CPF duplicados entre os não excluídos são conflitos.
    pub fn create_user(&self, user: UserProfile) -> Result<UserProfile, AppError> {
        if self.find_by_email(&user.email)?.is_some() {
            return Err(AppError::EmailAlreadyExists);
        }
        if self.find_by_cpf(&user.cpf)?.is_some() {
            return Err(AppError::CpfAlreadyExists);
        }
        self.storage.create(user)
    }

    pub fn all(&self, include_deleted: bool) -> Result<Vec<UserProfile>, AppError> {
        self.storage.get_all(include_deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::{UserRole, UserStatus};
    use crate::models::base::BaseFields;

    fn medico(email: &str, cpf: &str) -> UserProfile {
        UserProfile {
            base: BaseFields::new(),
            name: "Dra. Ana Souza".to_string(),
            email: email.to_string(),
            phone: "(11) 99999-9999".to_string(),
            cpf: cpf.to_string(),
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
        }
    }

    #[test]
    fn email_duplicado_nao_cria_registro() {
        let storage = Storage::in_memory();
        let repo = UserRepository::new(storage.clone());

        repo.create_user(medico("ana@medly.com.br", "529.982.247-25"))
            .unwrap();
        let resultado = repo.create_user(medico("ANA@medly.com.br", "111.444.777-35"));

        assert!(matches!(resultado, Err(AppError::EmailAlreadyExists)));
        assert_eq!(storage.get_all::<UserProfile>(false).unwrap().len(), 1);
    }

    #[test]
    fn cpf_duplicado_e_conflito() {
        let repo = UserRepository::new(Storage::in_memory());

        repo.create_user(medico("ana@medly.com.br", "529.982.247-25"))
            .unwrap();
        let resultado = repo.create_user(medico("outra@medly.com.br", "529.982.247-25"));

        assert!(matches!(resultado, Err(AppError::CpfAlreadyExists)));
    }

    #[test]
    fn email_de_usuario_excluido_pode_ser_reutilizado() {
        let repo = UserRepository::new(Storage::in_memory());

        let criada = repo
            .create_user(medico("ana@medly.com.br", "529.982.247-25"))
            .unwrap();
        repo.storage.soft_delete::<UserProfile>(criada.id()).unwrap();

        assert!(repo
            .create_user(medico("ana@medly.com.br", "111.444.777-35"))
            .is_ok());
    }
}

// src/services/auth_service.rs

use std::ops::RangeInclusive;

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::common::error::AppError;
use crate::db::{Storage, UserRepository};
use crate::models::auth::{
    AuthResponse, Claims, ForgotPasswordPayload, LoginPayload, RegisterPayload, UserProfile,
    UserRole, UserStatus,
};
use crate::models::base::{BaseFields, Entity};

#[derive(Clone)]
pub struct AuthService {
    storage: Storage,
    user_repo: UserRepository,
    jwt_secret: String,
}

impl AuthService {
    pub fn new(storage: Storage, user_repo: UserRepository, jwt_secret: String) -> Self {
        Self {
            storage,
            user_repo,
            jwt_secret,
        }
    }

    // Latência artificial dos fluxos de autenticação. O sorteio acontece
    // antes do await: o gerador do rand não atravessa pontos de suspensão.
    async fn simulate_latency(range: RangeInclusive<u64>) {
        let delay = rand::rng().random_range(range);
        tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
    }

    pub async fn register(&self, payload: RegisterPayload) -> Result<AuthResponse, AppError> {
        payload.validate()?;
        Self::simulate_latency(500..=1000).await;

        let password = payload.password.clone();
        let password_hash =
            tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        let user = UserProfile {
            base: BaseFields::new(),
            name: payload.name.clone(),
            email: payload.email,
            phone: payload.phone,
            cpf: payload.cpf,
            // Autocadastro entra sempre como médico pendente de aprovação.
            role: UserRole::Medico,
            status: UserStatus::Pendente,
            password_hash,
            avatar_url: Some(format!(
                "https://api.dicebear.com/7.x/avataaars/svg?seed={}",
                payload.name.replace(' ', "%20")
            )),
            address: Some(payload.address.into()),
            crm: None,
            crm_state: None,
            crm_valid: None,
            specialties: None,
            manager_id: None,
            subordinate_ids: None,
            average_rating: None,
            completed_scales: Some(0),
            cancellation_rate: Some(0.0),
        };

        let created = self.user_repo.create_user(user)?;
        self.storage.log_audit(
            created.id(),
            &created.name,
            "REGISTER",
            UserProfile::LABEL,
            created.id(),
            Some(json!({ "email": created.email })),
        )?;
        self.storage.set_current_user(created.id())?;

        let token = self.create_token(created.id())?;
        Ok(AuthResponse {
            success: true,
            token,
            user: created.sanitized(),
        })
    }

    pub async fn login(&self, payload: LoginPayload) -> Result<AuthResponse, AppError> {
        payload.validate()?;
        Self::simulate_latency(300..=800).await;

        let user = self
            .user_repo
            .find_by_email(&payload.email)?
            .ok_or(AppError::InvalidCredentials)?;

        let password = payload.password;
        let password_hash = user.password_hash.clone();
        let is_valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_valid {
            return Err(AppError::InvalidCredentials);
        }
        if user.status == UserStatus::Inativo {
            return Err(AppError::UserInactive);
        }

        self.storage.set_current_user(user.id())?;
        self.storage.log_audit(
            user.id(),
            &user.name,
            "LOGIN",
            UserProfile::LABEL,
            user.id(),
            None,
        )?;

        let token = self.create_token(user.id())?;
        Ok(AuthResponse {
            success: true,
            token,
            user: user.sanitized(),
        })
    }

    /// Sempre responde sucesso, exista ou não a conta. A trilha de
    /// auditoria só registra quando o e-mail é conhecido.
    pub async fn forgot_password(&self, payload: ForgotPasswordPayload) -> Result<(), AppError> {
        payload.validate()?;
        Self::simulate_latency(500..=1000).await;

        if let Some(user) = self.user_repo.find_by_email(&payload.email)? {
            self.storage.log_audit(
                user.id(),
                &user.name,
                "FORGOT_PASSWORD",
                UserProfile::LABEL,
                user.id(),
                None,
            )?;
        }
        Ok(())
    }

    pub fn logout(&self, actor: &UserProfile) -> Result<(), AppError> {
        self.storage.log_audit(
            actor.id(),
            &actor.name,
            "LOGOUT",
            UserProfile::LABEL,
            actor.id(),
            None,
        )?;
        self.storage.clear_session()
    }

    pub fn validate_token(&self, token: &str) -> Result<UserProfile, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        self.user_repo
            .find_by_id(token_data.claims.sub)?
            .ok_or(AppError::InvalidToken)
    }

    fn create_token(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(7);

        let claims = Claims {
            sub: user_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::AddressPayload;

    fn service() -> (AuthService, Storage) {
        let storage = Storage::in_memory();
        let repo = UserRepository::new(storage.clone());
        (
            AuthService::new(storage.clone(), repo, "segredo-de-teste".to_string()),
            storage,
        )
    }

    fn cadastro(email: &str, cpf: &str) -> RegisterPayload {
        RegisterPayload {
            name: "Dra. Ana Souza".to_string(),
            email: email.to_string(),
            phone: "(11) 99999-9999".to_string(),
            cpf: cpf.to_string(),
            password: "Senha123".to_string(),
            confirm_password: "Senha123".to_string(),
            address: AddressPayload {
                cep: "01310-100".to_string(),
                street: "Avenida Paulista".to_string(),
                number: "1000".to_string(),
                complement: None,
                neighborhood: "Bela Vista".to_string(),
                city: "São Paulo".to_string(),
                state: "SP".to_string(),
            },
        }
    }

    #[tokio::test(start_paused = true)]
    async fn cadastro_cria_medico_pendente_e_abre_sessao() {
        let (service, storage) = service();

        let resposta = service
            .register(cadastro("ana@medly.com.br", "529.982.247-25"))
            .await
            .unwrap();

        assert!(resposta.success);
        assert_eq!(resposta.user.role, UserRole::Medico);
        assert_eq!(resposta.user.status, UserStatus::Pendente);
        // hash nunca sai na resposta
        assert!(resposta.user.password_hash.is_empty());
        assert_eq!(
            storage.current_user_id().unwrap(),
            Some(resposta.user.id())
        );

        let logs = storage.audit_logs().unwrap();
        assert_eq!(logs[0].action, "REGISTER");
    }

    #[tokio::test(start_paused = true)]
    async fn cadastro_com_senhas_diferentes_e_erro_de_validacao() {
        let (service, _) = service();

        let mut payload = cadastro("ana@medly.com.br", "529.982.247-25");
        payload.confirm_password = "Outra123".to_string();

        assert!(matches!(
            service.register(payload).await,
            Err(AppError::ValidationError(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn login_com_senha_errada_ou_email_desconhecido_nao_vaza_qual_falhou() {
        let (service, _) = service();
        service
            .register(cadastro("ana@medly.com.br", "529.982.247-25"))
            .await
            .unwrap();

        let errada = service
            .login(LoginPayload {
                email: "ana@medly.com.br".to_string(),
                password: "Errada123".to_string(),
            })
            .await;
        let desconhecido = service
            .login(LoginPayload {
                email: "ninguem@medly.com.br".to_string(),
                password: "Senha123".to_string(),
            })
            .await;

        assert!(matches!(errada, Err(AppError::InvalidCredentials)));
        assert!(matches!(desconhecido, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test(start_paused = true)]
    async fn login_de_usuario_inativo_e_rejeitado() {
        let (service, storage) = service();
        let resposta = service
            .register(cadastro("ana@medly.com.br", "529.982.247-25"))
            .await
            .unwrap();

        storage
            .update::<UserProfile>(resposta.user.id(), json!({ "status": "inativo" }))
            .unwrap();

        let resultado = service
            .login(LoginPayload {
                email: "ana@medly.com.br".to_string(),
                password: "Senha123".to_string(),
            })
            .await;

        assert!(matches!(resultado, Err(AppError::UserInactive)));
    }

    #[tokio::test(start_paused = true)]
    async fn token_emitido_no_login_identifica_o_usuario() {
        let (service, _) = service();
        let cadastrada = service
            .register(cadastro("ana@medly.com.br", "529.982.247-25"))
            .await
            .unwrap();

        let sessao = service
            .login(LoginPayload {
                email: "ANA@medly.com.br".to_string(),
                password: "Senha123".to_string(),
            })
            .await
            .unwrap();

        let perfil = service.validate_token(&sessao.token).unwrap();
        assert_eq!(perfil.id(), cadastrada.user.id());

        assert!(matches!(
            service.validate_token("token-invalido"),
            Err(AppError::InvalidToken)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn esqueci_a_senha_nao_enumera_contas() {
        let (service, storage) = service();
        service
            .register(cadastro("ana@medly.com.br", "529.982.247-25"))
            .await
            .unwrap();

        // conta existente e inexistente respondem igual
        service
            .forgot_password(ForgotPasswordPayload {
                email: "ana@medly.com.br".to_string(),
            })
            .await
            .unwrap();
        service
            .forgot_password(ForgotPasswordPayload {
                email: "ninguem@medly.com.br".to_string(),
            })
            .await
            .unwrap();

        // mas só a existente deixa rastro na auditoria
        let auditadas: Vec<_> = storage
            .audit_logs()
            .unwrap()
            .into_iter()
            .filter(|log| log.action == "FORGOT_PASSWORD")
            .collect();
        assert_eq!(auditadas.len(), 1);
    }
}

// src/models/auth.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::validation::{validate_cep, validate_cpf, validate_senha, validate_telefone};
use crate::models::base::{BaseFields, Entity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Gestor,
    Escalista,
    Medico,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Ativo,
    Inativo,
    Pendente,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[schema(example = "01310-100")]
    pub cep: String,
    #[schema(example = "Avenida Paulista")]
    pub street: String,
    #[schema(example = "1000")]
    pub number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complement: Option<String>,
    #[schema(example = "Bela Vista")]
    pub neighborhood: String,
    #[schema(example = "São Paulo")]
    pub city: String,
    #[schema(example = "SP")]
    pub state: String,
}

// Perfil persistido na coleção `users`. A senha nunca sai na serialização.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(flatten)]
    pub base: BaseFields,

    #[schema(example = "Dra. Ana Souza")]
    pub name: String,
    #[schema(example = "ana.souza@medly.com.br")]
    pub email: String,
    #[schema(example = "(11) 99999-9999")]
    pub phone: String,
    #[schema(example = "529.982.247-25")]
    pub cpf: String,
    pub role: UserRole,
    pub status: UserStatus,

    // Persistido junto com o restante do perfil; as respostas HTTP passam
    // por `sanitized()` antes de sair, o que zera o campo e o omite do JSON.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    #[schema(ignore)]
    pub password_hash: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,

    // Campos específicos de médicos
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "123456")]
    pub crm: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "SP")]
    pub crm_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crm_valid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialties: Option<Vec<Uuid>>,

    // Gestão: referência fraca ao gestor e aos subordinados
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subordinate_ids: Option<Vec<Uuid>>,

    // Métricas agregadas
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_scales: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellation_rate: Option<f64>,
}

impl UserProfile {
    /// Remove o hash de senha antes de devolver o perfil numa resposta HTTP.
    pub fn sanitized(mut self) -> Self {
        self.password_hash.clear();
        self
    }
}

impl Entity for UserProfile {
    const COLLECTION: &'static str = "users";
    const LABEL: &'static str = "Usuário";

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
pub struct RegisterPayload {
    #[validate(length(min = 3, max = 100, message = "Nome deve ter entre 3 e 100 caracteres"))]
    pub name: String,
    #[validate(email(message = "Email inválido"))]
    pub email: String,
    #[validate(custom(function = validate_telefone))]
    pub phone: String,
    #[validate(custom(function = validate_cpf))]
    pub cpf: String,
    #[validate(length(min = 6, message = "Senha deve ter no mínimo 6 caracteres"))]
    #[validate(custom(function = validate_senha))]
    pub password: String,
    #[validate(must_match(other = password, message = "As senhas não coincidem"))]
    pub confirm_password: String,
    #[validate(nested)]
    pub address: AddressPayload,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddressPayload {
    #[validate(custom(function = validate_cep))]
    pub cep: String,
    #[validate(length(min = 1, message = "Rua é obrigatória"))]
    pub street: String,
    #[validate(length(min = 1, message = "Número é obrigatório"))]
    pub number: String,
    pub complement: Option<String>,
    #[validate(length(min = 1, message = "Bairro é obrigatório"))]
    pub neighborhood: String,
    #[validate(length(min = 1, message = "Cidade é obrigatória"))]
    pub city: String,
    #[validate(length(equal = 2, message = "Use a sigla do estado"))]
    pub state: String,
}

impl From<AddressPayload> for Address {
    fn from(p: AddressPayload) -> Self {
        Address {
            cep: p.cep,
            street: p.street,
            number: p.number,
            complement: p.complement,
            neighborhood: p.neighborhood,
            city: p.city,
            state: p.state,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginPayload {
    #[validate(email(message = "Email inválido"))]
    pub email: String,
    #[validate(length(min = 6, message = "Senha deve ter no mínimo 6 caracteres"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ForgotPasswordPayload {
    #[validate(email(message = "Email inválido"))]
    pub email: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
    pub user: UserProfile,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // ID do usuário
    pub exp: usize, // quando o token expira
    pub iat: usize, // quando o token foi criado
}

// Criação/edição de usuários pela administração
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpsertUserPayload {
    #[validate(length(min = 1, max = 100, message = "Nome é obrigatório"))]
    pub name: String,
    #[validate(email(message = "Email inválido"))]
    pub email: String,
    #[validate(custom(function = validate_telefone))]
    pub phone: String,
    #[validate(custom(function = validate_cpf))]
    pub cpf: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub crm: Option<String>,
    pub crm_state: Option<String>,
    pub specialties: Option<Vec<Uuid>>,
    pub manager_id: Option<Uuid>,
}

// src/middleware/rbac.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use std::marker::PhantomData;

use crate::{
    common::error::AppError,
    config::AppState,
    models::auth::UserProfile,
    models::rbac::{Module, PermissionAction},
};

/// 1. O trait que define o que é uma permissão
pub trait PermissionDef: Send + Sync + 'static {
    fn module() -> Module;
    fn action() -> PermissionAction;
    /// Complemento da mensagem de recusa ("Você não tem permissão para ...")
    fn describe() -> &'static str;
}

/// 2. O extractor (guardião): barra a requisição antes do handler rodar
pub struct RequirePermission<T>(pub PhantomData<T>);

// 3. Implementação do FromRequestParts

impl<T, S> FromRequestParts<S> for RequirePermission<T>
where
    T: PermissionDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let user = parts
            .extensions
            .get::<UserProfile>()
            .ok_or(AppError::InvalidToken)?;

        let allowed =
            app_state
                .permission_service
                .can_perform(user.role, T::module(), T::action())?;
        if !allowed {
            return Err(AppError::PermissionDenied(T::describe()));
        }

        Ok(RequirePermission(PhantomData))
    }
}

// ---
// DEFINIÇÃO DAS PERMISSÕES (TIPOS)
// ---

pub struct UsersView;
impl PermissionDef for UsersView {
    fn module() -> Module { Module::Users }
    fn action() -> PermissionAction { PermissionAction::View }
    fn describe() -> &'static str { "visualizar usuários" }
}

pub struct UsersCreate;
impl PermissionDef for UsersCreate {
    fn module() -> Module { Module::Users }
    fn action() -> PermissionAction { PermissionAction::Create }
    fn describe() -> &'static str { "criar usuários" }
}

pub struct UsersEdit;
impl PermissionDef for UsersEdit {
    fn module() -> Module { Module::Users }
    fn action() -> PermissionAction { PermissionAction::Edit }
    fn describe() -> &'static str { "editar usuários" }
}

pub struct UsersDelete;
impl PermissionDef for UsersDelete {
    fn module() -> Module { Module::Users }
    fn action() -> PermissionAction { PermissionAction::Delete }
    fn describe() -> &'static str { "excluir usuários" }
}

pub struct ScalesView;
impl PermissionDef for ScalesView {
    fn module() -> Module { Module::Scales }
    fn action() -> PermissionAction { PermissionAction::View }
    fn describe() -> &'static str { "visualizar escalas" }
}

pub struct ScalesCreate;
impl PermissionDef for ScalesCreate {
    fn module() -> Module { Module::Scales }
    fn action() -> PermissionAction { PermissionAction::Create }
    fn describe() -> &'static str { "criar escalas" }
}

pub struct ScalesEdit;
impl PermissionDef for ScalesEdit {
    fn module() -> Module { Module::Scales }
    fn action() -> PermissionAction { PermissionAction::Edit }
    fn describe() -> &'static str { "editar escalas" }
}

pub struct ScalesDelete;
impl PermissionDef for ScalesDelete {
    fn module() -> Module { Module::Scales }
    fn action() -> PermissionAction { PermissionAction::Delete }
    fn describe() -> &'static str { "excluir escalas" }
}

pub struct LocationsView;
impl PermissionDef for LocationsView {
    fn module() -> Module { Module::Locations }
    fn action() -> PermissionAction { PermissionAction::View }
    fn describe() -> &'static str { "visualizar locais" }
}

pub struct LocationsCreate;
impl PermissionDef for LocationsCreate {
    fn module() -> Module { Module::Locations }
    fn action() -> PermissionAction { PermissionAction::Create }
    fn describe() -> &'static str { "criar locais" }
}

pub struct LocationsEdit;
impl PermissionDef for LocationsEdit {
    fn module() -> Module { Module::Locations }
    fn action() -> PermissionAction { PermissionAction::Edit }
    fn describe() -> &'static str { "editar locais" }
}

pub struct LocationsDelete;
impl PermissionDef for LocationsDelete {
    fn module() -> Module { Module::Locations }
    fn action() -> PermissionAction { PermissionAction::Delete }
    fn describe() -> &'static str { "excluir locais" }
}

pub struct PaymentsView;
impl PermissionDef for PaymentsView {
    fn module() -> Module { Module::Payments }
    fn action() -> PermissionAction { PermissionAction::View }
    fn describe() -> &'static str { "visualizar pagamentos" }
}

pub struct PaymentsCreate;
impl PermissionDef for PaymentsCreate {
    fn module() -> Module { Module::Payments }
    fn action() -> PermissionAction { PermissionAction::Create }
    fn describe() -> &'static str { "registrar pagamentos" }
}

pub struct PaymentsEdit;
impl PermissionDef for PaymentsEdit {
    fn module() -> Module { Module::Payments }
    fn action() -> PermissionAction { PermissionAction::Edit }
    fn describe() -> &'static str { "editar pagamentos" }
}

pub struct PaymentsDelete;
impl PermissionDef for PaymentsDelete {
    fn module() -> Module { Module::Payments }
    fn action() -> PermissionAction { PermissionAction::Delete }
    fn describe() -> &'static str { "excluir pagamentos" }
}

pub struct DocumentsView;
impl PermissionDef for DocumentsView {
    fn module() -> Module { Module::Documents }
    fn action() -> PermissionAction { PermissionAction::View }
    fn describe() -> &'static str { "visualizar documentos" }
}

pub struct DocumentsCreate;
impl PermissionDef for DocumentsCreate {
    fn module() -> Module { Module::Documents }
    fn action() -> PermissionAction { PermissionAction::Create }
    fn describe() -> &'static str { "enviar documentos" }
}

pub struct DocumentsEdit;
impl PermissionDef for DocumentsEdit {
    fn module() -> Module { Module::Documents }
    fn action() -> PermissionAction { PermissionAction::Edit }
    fn describe() -> &'static str { "revisar documentos" }
}

pub struct DocumentsDelete;
impl PermissionDef for DocumentsDelete {
    fn module() -> Module { Module::Documents }
    fn action() -> PermissionAction { PermissionAction::Delete }
    fn describe() -> &'static str { "excluir documentos" }
}

pub struct ReportsView;
impl PermissionDef for ReportsView {
    fn module() -> Module { Module::Reports }
    fn action() -> PermissionAction { PermissionAction::View }
    fn describe() -> &'static str { "visualizar relatórios" }
}

pub struct SettingsView;
impl PermissionDef for SettingsView {
    fn module() -> Module { Module::Settings }
    fn action() -> PermissionAction { PermissionAction::View }
    fn describe() -> &'static str { "visualizar configurações" }
}

pub struct SettingsEdit;
impl PermissionDef for SettingsEdit {
    fn module() -> Module { Module::Settings }
    fn action() -> PermissionAction { PermissionAction::Edit }
    fn describe() -> &'static str { "alterar configurações" }
}

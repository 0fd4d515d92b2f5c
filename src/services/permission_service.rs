// src/services/permission_service.rs

use serde_json::json;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::db::store::Storage;
use crate::models::auth::{UserProfile, UserRole};
use crate::models::base::Entity;
use crate::models::rbac::{
    DashboardPermission, Module, ModulePermission, PermissionAction, ProfilePermissions,
    ResolvedPermissions, RoleProfile, UpsertRoleProfilePayload,
};

// Resolve a matriz de permissões de um papel. Dados parciais (perfis
// antigos sem o bloco do dashboard, por exemplo) nunca derrubam a
// resolução: o que falta vira tudo-negado.
#[derive(Clone)]
pub struct PermissionService {
    storage: Storage,
}

impl PermissionService {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Preenche os buracos da matriz com o default (tudo falso).
    pub fn resolve(permissions: &ProfilePermissions) -> ResolvedPermissions {
        ResolvedPermissions {
            dashboard: permissions.dashboard.unwrap_or_default(),
            users: permissions.users.unwrap_or_default(),
            scales: permissions.scales.unwrap_or_default(),
            locations: permissions.locations.unwrap_or_default(),
            payments: permissions.payments.unwrap_or_default(),
            documents: permissions.documents.unwrap_or_default(),
            reports: permissions.reports.unwrap_or_default(),
            settings: permissions.settings.unwrap_or_default(),
        }
    }

    pub fn profile_for_role(&self, role: UserRole) -> Result<Option<RoleProfile>, AppError> {
        Ok(self
            .storage
            .get_all::<RoleProfile>(false)?
            .into_iter()
            .find(|profile| profile.role == role))
    }

    /// Matriz resolvida do papel; sem perfil cadastrado, tudo negado.
    pub fn resolved_for_role(&self, role: UserRole) -> Result<ResolvedPermissions, AppError> {
        Ok(self
            .profile_for_role(role)?
            .map(|profile| Self::resolve(&profile.permissions))
            .unwrap_or_default())
    }

    pub fn can_perform(
        &self,
        role: UserRole,
        module: Module,
        action: PermissionAction,
    ) -> Result<bool, AppError> {
        Ok(self.resolved_for_role(role)?.module(module).allows(action))
    }

    /// `true` quando o papel enxerga todos os registros do módulo;
    /// `false` restringe ao escopo do próprio usuário.
    pub fn scope_is_all(&self, role: UserRole, module: Module) -> Result<bool, AppError> {
        Ok(self.resolved_for_role(role)?.module(module).view_all)
    }

    pub fn dashboard_for_role(&self, role: UserRole) -> Result<DashboardPermission, AppError> {
        Ok(self.resolved_for_role(role)?.dashboard)
    }

    pub fn module_permission(
        &self,
        role: UserRole,
        module: Module,
    ) -> Result<ModulePermission, AppError> {
        Ok(self.resolved_for_role(role)?.module(module))
    }

    // --- CRUD dos perfis ---

    pub fn list_profiles(&self) -> Result<Vec<RoleProfile>, AppError> {
        self.storage.get_all(false)
    }

    /// Abre um perfil para edição: devolve uma cópia própria com a matriz
    /// totalmente resolvida. Mudanças nessa cópia não tocam o storage até
    /// o save (`update_profile`).
    pub fn open_for_edit(&self, id: Uuid) -> Result<RoleProfile, AppError> {
        let mut profile = self
            .storage
            .get_by_id::<RoleProfile>(id)?
            .ok_or(AppError::NotFound(RoleProfile::LABEL))?;
        profile.permissions = Self::resolve(&profile.permissions).into();
        Ok(profile)
    }

    pub fn create_profile(
        &self,
        actor: &UserProfile,
        payload: UpsertRoleProfilePayload,
    ) -> Result<RoleProfile, AppError> {
        let profile = RoleProfile {
            base: Default::default(),
            name: payload.name,
            role: payload.role,
            description: payload.description,
            permissions: Self::resolve(&payload.permissions).into(),
        };
        let created = self.storage.create(profile)?;
        self.storage.log_audit(
            actor.id(),
            &actor.name,
            "CREATE",
            RoleProfile::LABEL,
            created.id(),
            None,
        )?;
        Ok(created)
    }

    /// Commit da edição: a matriz gravada é substituída integralmente pela
    /// do payload (resolvida). Nunca há merge parcial com o que estava no
    /// storage, então uma edição abandonada não deixa rastro.
    pub fn update_profile(
        &self,
        actor: &UserProfile,
        id: Uuid,
        payload: UpsertRoleProfilePayload,
    ) -> Result<RoleProfile, AppError> {
        let resolved: ProfilePermissions = Self::resolve(&payload.permissions).into();
        let updated = self
            .storage
            .update_with::<RoleProfile>(id, |profile| {
                profile.name = payload.name.clone();
                profile.role = payload.role;
                profile.description = payload.description.clone();
                profile.permissions = resolved.clone();
                Ok(())
            })?
            .ok_or(AppError::NotFound(RoleProfile::LABEL))?;

        self.storage.log_audit(
            actor.id(),
            &actor.name,
            "UPDATE",
            RoleProfile::LABEL,
            id,
            Some(json!({ "name": updated.name })),
        )?;
        Ok(updated)
    }

    pub fn delete_profile(&self, actor: &UserProfile, id: Uuid) -> Result<bool, AppError> {
        let deleted = self.storage.soft_delete::<RoleProfile>(id)?;
        if deleted {
            self.storage.log_audit(
                actor.id(),
                &actor.name,
                "DELETE",
                RoleProfile::LABEL,
                id,
                None,
            )?;
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matriz_parcial_resolve_sem_quebrar() {
        // perfil antigo: só o módulo de escalas, sem dashboard
        let raw = json!({
            "scales": { "view": true, "viewAll": true }
        });
        let partial: ProfilePermissions = serde_json::from_value(raw).unwrap();
        let resolved = PermissionService::resolve(&partial);

        assert!(resolved.scales.view);
        assert!(resolved.scales.view_all);
        assert!(!resolved.scales.delete);

        // dashboard ausente: tudo falso, card a card
        assert!(!resolved.dashboard.view);
        assert!(!resolved.dashboard.cards.total_users);
        assert!(!resolved.dashboard.cards.active_scales);
        assert!(!resolved.dashboard.cards.pending_payments);
        assert!(!resolved.dashboard.cards.occupancy_rate);
        assert!(!resolved.dashboard.charts.users_by_role);
    }

    #[test]
    fn dashboard_sem_cards_resolve_cards_falsos() {
        let raw = json!({
            "dashboard": { "view": true, "viewAll": false }
        });
        let partial: ProfilePermissions = serde_json::from_value(raw).unwrap();
        let resolved = PermissionService::resolve(&partial);

        assert!(resolved.dashboard.view);
        assert!(!resolved.dashboard.view_all);
        assert!(!resolved.dashboard.cards.total_users);
        assert!(!resolved.dashboard.charts.scales_trend);
    }

    #[test]
    fn papel_sem_perfil_cadastrado_nega_tudo() {
        let service = PermissionService::new(Storage::in_memory());

        assert!(!service
            .can_perform(UserRole::Medico, Module::Scales, PermissionAction::View)
            .unwrap());
        assert!(!service.scope_is_all(UserRole::Medico, Module::Scales).unwrap());
    }

    #[test]
    fn consulta_a_matriz_gravada() {
        let storage = Storage::in_memory();
        crate::db::seed::initialize(&storage).unwrap();
        let service = PermissionService::new(storage);

        assert!(service
            .can_perform(UserRole::Admin, Module::Users, PermissionAction::Delete)
            .unwrap());
        assert!(service
            .can_perform(UserRole::Medico, Module::Scales, PermissionAction::View)
            .unwrap());
        assert!(!service
            .can_perform(UserRole::Medico, Module::Scales, PermissionAction::Create)
            .unwrap());
        // médico vê apenas os próprios registros
        assert!(!service.scope_is_all(UserRole::Medico, Module::Payments).unwrap());
        assert!(service.scope_is_all(UserRole::Gestor, Module::Payments).unwrap());
    }
}

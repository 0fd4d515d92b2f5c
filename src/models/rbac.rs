// src/models/rbac.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::auth::UserRole;
use crate::models::base::{BaseFields, Entity};

/// Módulos controlados pela matriz de permissões.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Module {
    Users,
    Scales,
    Locations,
    Payments,
    Documents,
    Reports,
    Settings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum PermissionAction {
    View,
    Create,
    Edit,
    Delete,
    ViewAll,
}

// Uma célula da matriz: o que o perfil pode fazer num módulo. `view_all`
// distingue "ver tudo" de "ver apenas os próprios registros".
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ModulePermission {
    pub view: bool,
    pub create: bool,
    pub edit: bool,
    pub delete: bool,
    pub view_all: bool,
}

impl ModulePermission {
    pub const fn all() -> Self {
        Self {
            view: true,
            create: true,
            edit: true,
            delete: true,
            view_all: true,
        }
    }

    pub const fn read_only(view_all: bool) -> Self {
        Self {
            view: true,
            create: false,
            edit: false,
            delete: false,
            view_all,
        }
    }

    pub fn allows(&self, action: PermissionAction) -> bool {
        match action {
            PermissionAction::View => self.view,
            PermissionAction::Create => self.create,
            PermissionAction::Edit => self.edit,
            PermissionAction::Delete => self.delete,
            PermissionAction::ViewAll => self.view_all,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardCards {
    pub total_users: bool,
    pub active_scales: bool,
    pub pending_payments: bool,
    pub occupancy_rate: bool,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardCharts {
    pub users_by_role: bool,
    pub scales_trend: bool,
    pub location_ratings: bool,
}

// Visibilidade do dashboard em dois eixos: acesso geral e escopo dos dados,
// replicados por card de KPI e por gráfico.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardPermission {
    pub view: bool,
    pub view_all: bool,
    pub cards: DashboardCards,
    pub charts: DashboardCharts,
}

// Cada campo é opcional na desserialização: dados antigos podem não ter
// todos os módulos. O resolvedor em `services/permission_service.rs`
// preenche o que faltar com tudo-negado antes de qualquer consulta.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfilePermissions {
    pub dashboard: Option<DashboardPermission>,
    pub users: Option<ModulePermission>,
    pub scales: Option<ModulePermission>,
    pub locations: Option<ModulePermission>,
    pub payments: Option<ModulePermission>,
    pub documents: Option<ModulePermission>,
    pub reports: Option<ModulePermission>,
    pub settings: Option<ModulePermission>,
}

/// A mesma matriz, com todos os campos garantidamente presentes.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ResolvedPermissions {
    pub dashboard: DashboardPermission,
    pub users: ModulePermission,
    pub scales: ModulePermission,
    pub locations: ModulePermission,
    pub payments: ModulePermission,
    pub documents: ModulePermission,
    pub reports: ModulePermission,
    pub settings: ModulePermission,
}

impl ResolvedPermissions {
    pub fn module(&self, module: Module) -> ModulePermission {
        match module {
            Module::Users => self.users,
            Module::Scales => self.scales,
            Module::Locations => self.locations,
            Module::Payments => self.payments,
            Module::Documents => self.documents,
            Module::Reports => self.reports,
            Module::Settings => self.settings,
        }
    }
}

impl From<ResolvedPermissions> for ProfilePermissions {
    fn from(r: ResolvedPermissions) -> Self {
        ProfilePermissions {
            dashboard: Some(r.dashboard),
            users: Some(r.users),
            scales: Some(r.scales),
            locations: Some(r.locations),
            payments: Some(r.payments),
            documents: Some(r.documents),
            reports: Some(r.reports),
            settings: Some(r.settings),
        }
    }
}

// Perfil de permissões nomeado, um por papel (coleção `role_profiles`).
// A matriz é propriedade exclusiva do perfil: edições trabalham sobre uma
// cópia e só voltam para o storage no save.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleProfile {
    #[serde(flatten)]
    pub base: BaseFields,

    #[schema(example = "Administrador")]
    pub name: String,
    pub role: UserRole,
    #[schema(example = "Acesso completo a todos os módulos")]
    pub description: String,
    #[serde(default)]
    pub permissions: ProfilePermissions,
}

impl Entity for RoleProfile {
    const COLLECTION: &'static str = "role_profiles";
    const LABEL: &'static str = "Perfil";

    fn base(&self) -> &BaseFields {
        &self.base
    }
    fn base_mut(&mut self) -> &mut BaseFields {
        &mut self.base
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpsertRoleProfilePayload {
    #[validate(length(min = 1, max = 100, message = "Nome é obrigatório"))]
    pub name: String,
    pub role: UserRole,
    #[validate(length(max = 500))]
    pub description: String,
    #[serde(default)]
    pub permissions: ProfilePermissions,
}

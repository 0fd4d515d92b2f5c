// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::forgot_password,
        handlers::auth::logout,
        handlers::auth::get_me,

        // --- Users ---
        handlers::users::list,
        handlers::users::get,
        handlers::users::create,
        handlers::users::update,
        handlers::users::delete,
        handlers::users::hard_delete,

        // --- Scales ---
        handlers::scales::list,
        handlers::scales::get,
        handlers::scales::create,
        handlers::scales::update,
        handlers::scales::publish,
        handlers::scales::start,
        handlers::scales::complete,
        handlers::scales::cancel,
        handlers::scales::check_in,
        handlers::scales::check_out,
        handlers::scales::delete,
        handlers::scales::hard_delete,

        // --- Candidatures ---
        handlers::candidatures::list,
        handlers::candidatures::for_scale,
        handlers::candidatures::apply,
        handlers::candidatures::mark_waiting,
        handlers::candidatures::accept,
        handlers::candidatures::deny,
        handlers::candidatures::advance_workflow,

        // --- Locations ---
        handlers::locations::list,
        handlers::locations::get,
        handlers::locations::create,
        handlers::locations::update,
        handlers::locations::delete,
        handlers::locations::lookup_cep,

        // --- Catalog ---
        handlers::catalog::list_specialties,
        handlers::catalog::create_specialty,
        handlers::catalog::update_specialty,
        handlers::catalog::delete_specialty,
        handlers::catalog::list_scale_types,
        handlers::catalog::create_scale_type,
        handlers::catalog::update_scale_type,
        handlers::catalog::delete_scale_type,

        // --- RBAC ---
        handlers::rbac::list_profiles,
        handlers::rbac::get_profile,
        handlers::rbac::my_permissions,
        handlers::rbac::preview_resolution,
        handlers::rbac::create_profile,
        handlers::rbac::update_profile,
        handlers::rbac::delete_profile,

        // --- Payments ---
        handlers::payments::list,
        handlers::payments::create,
        handlers::payments::refresh_overdue,
        handlers::payments::mark_paid,
        handlers::payments::confirm_receipt,
        handlers::payments::delete,

        // --- Ratings ---
        handlers::ratings::list,
        handlers::ratings::for_scale,
        handlers::ratings::create,
        handlers::ratings::delete,

        // --- Documents ---
        handlers::documents::list,
        handlers::documents::create,
        handlers::documents::review,
        handlers::documents::delete,

        // --- Notifications ---
        handlers::notifications::list,
        handlers::notifications::mark_read,
        handlers::notifications::mark_all_read,

        // --- Dashboard ---
        handlers::dashboard::get_summary,

        // --- Audit ---
        handlers::audit::list,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserRole,
            models::auth::UserStatus,
            models::auth::Address,
            models::auth::UserProfile,
            models::auth::RegisterPayload,
            models::auth::AddressPayload,
            models::auth::LoginPayload,
            models::auth::ForgotPasswordPayload,
            models::auth::AuthResponse,
            models::auth::UpsertUserPayload,

            // --- RBAC ---
            models::rbac::Module,
            models::rbac::PermissionAction,
            models::rbac::ModulePermission,
            models::rbac::DashboardCards,
            models::rbac::DashboardCharts,
            models::rbac::DashboardPermission,
            models::rbac::ProfilePermissions,
            models::rbac::ResolvedPermissions,
            models::rbac::RoleProfile,
            models::rbac::UpsertRoleProfilePayload,

            // --- Locations ---
            models::locations::LocationType,
            models::locations::Location,
            models::locations::UpsertLocationPayload,

            // --- Catalog ---
            models::catalog::Specialty,
            models::catalog::ScaleType,
            models::catalog::UpsertSpecialtyPayload,
            models::catalog::UpsertScaleTypePayload,

            // --- Scales ---
            models::scales::Shift,
            models::scales::ScaleStatus,
            models::scales::CheckRecord,
            models::scales::Scale,
            models::scales::UpsertScalePayload,
            models::scales::CheckPayload,
            models::scales::CancellationOutcome,

            // --- Candidatures ---
            models::candidatures::CandidatureStatus,
            models::candidatures::Candidature,
            models::candidatures::ApplyPayload,
            models::candidatures::AdvanceWorkflowPayload,

            // --- Finance ---
            models::finance::PaymentStatus,
            models::finance::Payment,
            models::finance::RatingType,
            models::finance::Rating,
            models::finance::CreatePaymentPayload,
            models::finance::CreateRatingPayload,

            // --- Documents ---
            models::documents::DocumentCategory,
            models::documents::DocumentStatus,
            models::documents::Document,
            models::documents::CreateDocumentPayload,
            models::documents::ReviewDocumentPayload,

            // --- Notifications / Audit ---
            models::notifications::NotificationType,
            models::notifications::Notification,
            models::audit::AuditLog,

            // --- Misc ---
            crate::common::geo::Coordinates,
            crate::services::cep_service::CepAddress,
            handlers::dashboard::DashboardSummary,
            handlers::dashboard::TrendEntry,
            handlers::dashboard::LocationRatingEntry,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Gestão de Usuários"),
        (name = "Scales", description = "Escalas e Plantões"),
        (name = "Candidatures", description = "Candidaturas e Fluxo Pós-Aceite"),
        (name = "Locations", description = "Unidades de Saúde"),
        (name = "Catalog", description = "Especialidades e Tipos de Escala"),
        (name = "RBAC", description = "Perfis e Permissões"),
        (name = "Payments", description = "Pagamentos de Plantões"),
        (name = "Ratings", description = "Avaliações"),
        (name = "Documents", description = "Documentos e Revisão"),
        (name = "Notifications", description = "Notificações do Usuário"),
        (name = "Dashboard", description = "Indicadores Gerenciais"),
        (name = "Audit", description = "Trilha de Auditoria"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

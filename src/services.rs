pub mod auth_service;
pub mod candidature_service;
pub mod cep_service;
pub mod payment_service;
pub mod permission_service;
pub mod rating_service;
pub mod scale_service;

pub use auth_service::AuthService;
pub use candidature_service::CandidatureService;
pub use cep_service::CepService;
pub use payment_service::PaymentService;
pub use permission_service::PermissionService;
pub use rating_service::RatingService;
pub use scale_service::ScaleService;

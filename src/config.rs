// src/config.rs

use std::env;

use crate::{
    db::{seed, Storage, UserRepository},
    services::{
        AuthService, CandidatureService, CepService, PaymentService, PermissionService,
        RatingService, ScaleService,
    },
};

const DEFAULT_DATA_PATH: &str = "data/medly.json";
const DEFAULT_CHECKIN_RADIUS_M: f64 = 500.0;

#[derive(Clone)]
pub struct AppState {
    pub storage: Storage,
    pub user_repo: UserRepository,
    pub auth_service: AuthService,
    pub permission_service: PermissionService,
    pub scale_service: ScaleService,
    pub candidature_service: CandidatureService,
    pub payment_service: PaymentService,
    pub rating_service: RatingService,
    pub cep_service: CepService,
}

impl AppState {
    pub fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");
        let data_path =
            env::var("MEDLY_DATA_PATH").unwrap_or_else(|_| DEFAULT_DATA_PATH.to_string());
        let checkin_radius_m = env::var("MEDLY_CHECKIN_RADIUS_M")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(DEFAULT_CHECKIN_RADIUS_M);

        let storage = Storage::open(&data_path)?;
        tracing::info!("✅ Storage aberto em {}", data_path);

        seed::initialize(&storage)?;

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(storage.clone());
        let auth_service = AuthService::new(storage.clone(), user_repo.clone(), jwt_secret);
        let permission_service = PermissionService::new(storage.clone());
        let scale_service = ScaleService::new(storage.clone(), checkin_radius_m);
        let candidature_service = CandidatureService::new(storage.clone());
        let payment_service = PaymentService::new(storage.clone());
        let rating_service = RatingService::new(storage.clone());
        let cep_service = CepService::new();

        Ok(Self {
            storage,
            user_repo,
            auth_service,
            permission_service,
            scale_service,
            candidature_service,
            payment_service,
            rating_service,
            cep_service,
        })
    }
}

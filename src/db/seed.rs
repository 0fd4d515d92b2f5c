// src/db/seed.rs
//
// Dados iniciais do ambiente de demonstração e a política destrutiva de
// upgrade: mudou a versão do formato, o estado inteiro é apagado e
// semeado de novo. Não existe caminho de migração entre versões.

use chrono::{Duration, Utc};
use rust_decimal::Decimal;

use crate::common::error::AppError;
use crate::common::geo::MOCK_COORDINATES;
use crate::db::store::Storage;
use crate::models::auth::{Address, UserProfile, UserRole, UserStatus};
use crate::models::base::BaseFields;
use crate::models::catalog::{ScaleType, Specialty};
use crate::models::finance::PaymentStatus;
use crate::models::locations::{Location, LocationType};
use crate::models::rbac::{
    DashboardCards, DashboardCharts, DashboardPermission, ModulePermission, ResolvedPermissions,
    RoleProfile,
};
use crate::models::scales::{Scale, ScaleStatus, Shift};

/// Versão do formato persistido. Incrementar força o reseed.
pub const DATA_VERSION: &str = "1";

const SEED_PASSWORD: &str = "Medly123";

/// Garante que o storage está utilizável: versão divergente apaga tudo;
/// coleções vazias recebem os dados de demonstração.
pub fn initialize(storage: &Storage) -> Result<(), AppError> {
    if storage.data_version()?.as_deref() != Some(DATA_VERSION) {
        tracing::info!("Versão de dados divergente: limpando e resemeando o storage");
        storage.wipe()?;
        storage.set_data_version(DATA_VERSION)?;
    }

    if storage.is_collection_empty("users")? {
        seed(storage)?;
        tracing::info!("🌱 Dados de demonstração semeados");
    }

    Ok(())
}

fn seed(storage: &Storage) -> Result<(), AppError> {
    let password_hash = bcrypt::hash(SEED_PASSWORD, bcrypt::DEFAULT_COST)?;

    // --- Perfis de permissão ---
    for profile in role_profiles() {
        storage.seed_insert(&profile)?;
    }

    // --- Usuários ---
    let admin = user(
        "Carlos Pereira",
        "admin@medly.com.br",
        "(11) 98888-0001",
        "529.982.247-25",
        UserRole::Admin,
        &password_hash,
    );
    let gestor = user(
        "Marina Lima",
        "gestor@medly.com.br",
        "(11) 98888-0002",
        "111.444.777-35",
        UserRole::Gestor,
        &password_hash,
    );
    let escalista = user(
        "João Reis",
        "escalista@medly.com.br",
        "(11) 98888-0003",
        "123.456.789-09",
        UserRole::Escalista,
        &password_hash,
    );
    let mut medico = user(
        "Dra. Ana Souza",
        "medico@medly.com.br",
        "(11) 98888-0004",
        "987.654.321-00",
        UserRole::Medico,
        &password_hash,
    );
    medico.crm = Some("123456".to_string());
    medico.crm_state = Some("SP".to_string());
    medico.crm_valid = Some(true);
    medico.manager_id = Some(gestor.base.id);

    let mut gestor = gestor;
    gestor.subordinate_ids = Some(vec![medico.base.id]);

    for u in [&admin, &gestor, &escalista, &medico] {
        storage.seed_insert(u)?;
    }

    // --- Catálogo ---
    let clinica_geral = specialty("Clínica Geral", "Atendimento geral de urgência");
    let cardiologia = specialty("Cardiologia", "Plantões de especialidade cardiológica");
    storage.seed_insert(&clinica_geral)?;
    storage.seed_insert(&cardiologia)?;

    let plantao_diurno = scale_type("Plantão 12h Diurno", 12, Shift::Plantao12h);
    let plantao_noturno = scale_type("Plantão 12h Noturno", 12, Shift::Noite);
    storage.seed_insert(&plantao_diurno)?;
    storage.seed_insert(&plantao_noturno)?;

    // --- Locais ---
    let hospital = location(
        "Hospital São Lucas",
        LocationType::Hospital,
        "01310-100",
        "Avenida Paulista",
        "1000",
        MOCK_COORDINATES.lat,
        MOCK_COORDINATES.lng,
    );
    let upa = location(
        "UPA Centro",
        LocationType::Upa,
        "01015-100",
        "Avenida Central",
        "500",
        MOCK_COORDINATES.lat + 0.02,
        MOCK_COORDINATES.lng + 0.01,
    );
    storage.seed_insert(&hospital)?;
    storage.seed_insert(&upa)?;

    // --- Escalas ---
    let hoje = Utc::now().date_naive();
    let publicada = scale(
        "Plantão UTI - Hospital São Lucas",
        &hospital,
        &plantao_diurno,
        &clinica_geral,
        hoje + Duration::days(14),
        ScaleStatus::Publicada,
        Decimal::from(1500),
    );
    let rascunho = scale(
        "Plantão PS - UPA Centro",
        &upa,
        &plantao_noturno,
        &clinica_geral,
        hoje + Duration::days(30),
        ScaleStatus::Rascunho,
        Decimal::from(1800),
    );
    storage.seed_insert(&publicada)?;
    storage.seed_insert(&rascunho)?;

    Ok(())
}

fn user(
    name: &str,
    email: &str,
    phone: &str,
    cpf: &str,
    role: UserRole,
    password_hash: &str,
) -> UserProfile {
    UserProfile {
        base: BaseFields::new(),
        name: name.to_string(),
        email: email.to_string(),
        phone: phone.to_string(),
        cpf: cpf.to_string(),
        role,
        status: UserStatus::Ativo,
        password_hash: password_hash.to_string(),
        avatar_url: None,
        address: Some(Address {
            cep: "01310-100".to_string(),
            street: "Avenida Paulista".to_string(),
            number: "1000".to_string(),
            complement: None,
            neighborhood: "Bela Vista".to_string(),
            city: "São Paulo".to_string(),
            state: "SP".to_string(),
        }),
        crm: None,
        crm_state: None,
        crm_valid: None,
        specialties: None,
        manager_id: None,
        subordinate_ids: None,
        average_rating: Some(0.0),
        completed_scales: Some(0),
        cancellation_rate: Some(0.0),
    }
}

fn role_profiles() -> Vec<RoleProfile> {
    let full_dashboard = DashboardPermission {
        view: true,
        view_all: true,
        cards: DashboardCards {
            total_users: true,
            active_scales: true,
            pending_payments: true,
            occupancy_rate: true,
        },
        charts: DashboardCharts {
            users_by_role: true,
            scales_trend: true,
            location_ratings: true,
        },
    };

    let admin = RoleProfile {
        base: BaseFields::new(),
        name: "Administrador".to_string(),
        role: UserRole::Admin,
        description: "Acesso completo a todos os módulos".to_string(),
        permissions: ResolvedPermissions {
            dashboard: full_dashboard,
            users: ModulePermission::all(),
            scales: ModulePermission::all(),
            locations: ModulePermission::all(),
            payments: ModulePermission::all(),
            documents: ModulePermission::all(),
            reports: ModulePermission::all(),
            settings: ModulePermission::all(),
        }
        .into(),
    };

    let gestor = RoleProfile {
        base: BaseFields::new(),
        name: "Gestor".to_string(),
        role: UserRole::Gestor,
        description: "Gestão da equipe e acompanhamento das escalas".to_string(),
        permissions: ResolvedPermissions {
            dashboard: DashboardPermission {
                view: true,
                view_all: true,
                cards: DashboardCards {
                    total_users: false,
                    active_scales: true,
                    pending_payments: true,
                    occupancy_rate: true,
                },
                charts: DashboardCharts {
                    users_by_role: false,
                    scales_trend: true,
                    location_ratings: true,
                },
            },
            users: ModulePermission {
                view: true,
                create: true,
                edit: true,
                delete: false,
                view_all: false,
            },
            scales: ModulePermission {
                view: true,
                create: true,
                edit: true,
                delete: false,
                view_all: true,
            },
            locations: ModulePermission::read_only(true),
            payments: ModulePermission {
                view: true,
                create: true,
                edit: true,
                delete: false,
                view_all: true,
            },
            documents: ModulePermission {
                view: true,
                create: false,
                edit: true,
                delete: false,
                view_all: true,
            },
            reports: ModulePermission::read_only(true),
            settings: ModulePermission::default(),
        }
        .into(),
    };

    let escalista = RoleProfile {
        base: BaseFields::new(),
        name: "Escalista".to_string(),
        role: UserRole::Escalista,
        description: "Publicação e operação diária das escalas".to_string(),
        permissions: ResolvedPermissions {
            dashboard: DashboardPermission {
                view: true,
                view_all: false,
                cards: DashboardCards {
                    total_users: false,
                    active_scales: true,
                    pending_payments: false,
                    occupancy_rate: true,
                },
                charts: DashboardCharts {
                    users_by_role: false,
                    scales_trend: true,
                    location_ratings: false,
                },
            },
            users: ModulePermission::read_only(true),
            scales: ModulePermission {
                view: true,
                create: true,
                edit: true,
                delete: true,
                view_all: true,
            },
            locations: ModulePermission::read_only(true),
            payments: ModulePermission::default(),
            documents: ModulePermission::read_only(true),
            reports: ModulePermission::default(),
            settings: ModulePermission::default(),
        }
        .into(),
    };

    let medico = RoleProfile {
        base: BaseFields::new(),
        name: "Médico".to_string(),
        role: UserRole::Medico,
        description: "Área do médico: candidaturas, plantões e pagamentos próprios".to_string(),
        permissions: ResolvedPermissions {
            dashboard: DashboardPermission {
                view: true,
                view_all: false,
                cards: DashboardCards {
                    total_users: false,
                    active_scales: true,
                    pending_payments: true,
                    occupancy_rate: false,
                },
                charts: DashboardCharts::default(),
            },
            users: ModulePermission::default(),
            scales: ModulePermission::read_only(false),
            locations: ModulePermission::read_only(false),
            payments: ModulePermission::read_only(false),
            documents: ModulePermission {
                view: true,
                create: true,
                edit: false,
                delete: false,
                view_all: false,
            },
            reports: ModulePermission::default(),
            settings: ModulePermission::default(),
        }
        .into(),
    };

    vec![admin, gestor, escalista, medico]
}

fn specialty(name: &str, description: &str) -> Specialty {
    Specialty {
        base: BaseFields::new(),
        name: name.to_string(),
        description: Some(description.to_string()),
        scale_type_ids: None,
    }
}

fn scale_type(name: &str, hours: u32, shift: Shift) -> ScaleType {
    ScaleType {
        base: BaseFields::new(),
        name: name.to_string(),
        description: None,
        default_duration_hours: hours,
        default_shift: shift,
    }
}

fn location(
    name: &str,
    kind: LocationType,
    cep: &str,
    street: &str,
    number: &str,
    lat: f64,
    lng: f64,
) -> Location {
    Location {
        base: BaseFields::new(),
        name: name.to_string(),
        kind,
        address: Address {
            cep: cep.to_string(),
            street: street.to_string(),
            number: number.to_string(),
            complement: None,
            neighborhood: "Centro".to_string(),
            city: "São Paulo".to_string(),
            state: "SP".to_string(),
        },
        coordinates: Some(crate::common::geo::Coordinates { lat, lng }),
        phone: None,
        email: None,
        average_rating: None,
    }
}

fn scale(
    title: &str,
    location: &Location,
    scale_type: &ScaleType,
    specialty: &Specialty,
    date: chrono::NaiveDate,
    status: ScaleStatus,
    payment_value: Decimal,
) -> Scale {
    Scale {
        base: BaseFields::new(),
        location_id: location.base.id,
        scale_type_id: scale_type.base.id,
        specialty_id: specialty.base.id,
        title: title.to_string(),
        description: None,
        date,
        start_time: chrono::NaiveTime::from_hms_opt(7, 0, 0).expect("hora fixa válida"),
        end_time: chrono::NaiveTime::from_hms_opt(19, 0, 0).expect("hora fixa válida"),
        shift: scale_type.default_shift,
        status,
        cancellation_deadline_days: 3,
        transfer_deadline_days: 5,
        payment_value,
        payment_date: Some(date + Duration::days(15)),
        payment_status: PaymentStatus::Pendente,
        min_patients: None,
        max_patients: None,
        meal_break_minutes: Some(60),
        required_documents: None,
        assigned_doctor_id: None,
        candidate_ids: None,
        check_in: None,
        check_out: None,
    }
}

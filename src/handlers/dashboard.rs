// src/handlers/dashboard.rs

use std::collections::BTreeMap;

use axum::{extract::State, Json};
use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::auth::UserRole,
    models::base::Entity,
    models::finance::{Payment, PaymentStatus},
    models::locations::Location,
    models::scales::{Scale, ScaleStatus},
};

// O resumo só carrega os cards e gráficos que a permissão de dashboard do
// chamador concede; o resto nem aparece no JSON.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_users: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_scales: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_payments: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occupancy_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub users_by_role: Option<BTreeMap<String, usize>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scales_trend: Option<Vec<TrendEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_ratings: Option<Vec<LocationRatingEntry>>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrendEntry {
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    pub count: usize,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocationRatingEntry {
    pub location_id: Uuid,
    pub name: String,
    pub average_rating: f64,
}

fn role_key(role: UserRole) -> &'static str {
    match role {
        UserRole::Admin => "admin",
        UserRole::Gestor => "gestor",
        UserRole::Escalista => "escalista",
        UserRole::Medico => "medico",
    }
}

#[utoipa::path(
    get,
    path = "/api/dashboard/summary",
    tag = "Dashboard",
    security(("api_jwt" = [])),
    responses(
        (status = 200, description = "Indicadores concedidos ao chamador", body = DashboardSummary),
        (status = 403, description = "Sem acesso ao dashboard"),
    )
)]
pub async fn get_summary(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<DashboardSummary>, AppError> {
    let dashboard = app_state.permission_service.dashboard_for_role(user.role)?;
    if !dashboard.view {
        return Err(AppError::PermissionDenied("visualizar o dashboard"));
    }

    // Sem viewAll, os números se restringem ao chamador e aos subordinados.
    let mut visible_ids = vec![user.id()];
    if let Some(subordinates) = &user.subordinate_ids {
        visible_ids.extend(subordinates.iter().copied());
    }
    let in_scope = |doctor_id: Option<Uuid>| {
        dashboard.view_all || doctor_id.is_some_and(|id| visible_ids.contains(&id))
    };

    let users = app_state.user_repo.all(false)?;
    let scales: Vec<Scale> = app_state
        .storage
        .get_all::<Scale>(false)?
        .into_iter()
        .filter(|s| in_scope(s.assigned_doctor_id))
        .collect();
    let payments: Vec<Payment> = app_state
        .storage
        .get_all::<Payment>(false)?
        .into_iter()
        .filter(|p| dashboard.view_all || visible_ids.contains(&p.doctor_id))
        .collect();

    let total_users = dashboard.cards.total_users.then(|| {
        if dashboard.view_all {
            users.len()
        } else {
            users.iter().filter(|u| visible_ids.contains(&u.id())).count()
        }
    });

    let active_scales = dashboard.cards.active_scales.then(|| {
        scales
            .iter()
            .filter(|s| matches!(s.status, ScaleStatus::Publicada | ScaleStatus::EmAndamento))
            .count()
    });

    let pending_payments = dashboard.cards.pending_payments.then(|| {
        payments
            .iter()
            .filter(|p| matches!(p.status, PaymentStatus::Pendente | PaymentStatus::Atrasado))
            .count()
    });

    // Taxa de ocupação: escalas com médico designado sobre as escalas
    // ativas (rascunhos e canceladas ficam de fora).
    let occupancy_rate = dashboard.cards.occupancy_rate.then(|| {
        let open: Vec<&Scale> = scales
            .iter()
            .filter(|s| !matches!(s.status, ScaleStatus::Rascunho | ScaleStatus::Cancelada))
            .collect();
        if open.is_empty() {
            0.0
        } else {
            let assigned = open.iter().filter(|s| s.assigned_doctor_id.is_some()).count();
            (assigned as f64 / open.len() as f64) * 100.0
        }
    });

    let users_by_role = dashboard.charts.users_by_role.then(|| {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for u in &users {
            *counts.entry(role_key(u.role).to_string()).or_default() += 1;
        }
        counts
    });

    let scales_trend = dashboard.charts.scales_trend.then(|| {
        let mut per_date: BTreeMap<NaiveDate, usize> = BTreeMap::new();
        for s in scales.iter().filter(|s| s.status != ScaleStatus::Cancelada) {
            *per_date.entry(s.date).or_default() += 1;
        }
        per_date
            .into_iter()
            .map(|(date, count)| TrendEntry { date, count })
            .collect()
    });

    let location_ratings = match dashboard.charts.location_ratings {
        true => Some(
            app_state
                .storage
                .get_all::<Location>(false)?
                .into_iter()
                .filter_map(|l| {
                    l.average_rating.map(|average_rating| LocationRatingEntry {
                        location_id: l.id(),
                        name: l.name,
                        average_rating,
                    })
                })
                .collect(),
        ),
        false => None,
    };

    Ok(Json(DashboardSummary {
        total_users,
        active_scales,
        pending_payments,
        occupancy_rate,
        users_by_role,
        scales_trend,
        location_ratings,
    }))
}

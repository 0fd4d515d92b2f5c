//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Json, Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_middleware;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new().expect("Falha ao inicializar o estado da aplicação.");

    // Rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/forgot-password", post(handlers::auth::forgot_password));

    // Sessão do usuário autenticado
    let session_routes = Router::new()
        .route("/logout", post(handlers::auth::logout))
        .route("/me", get(handlers::auth::get_me))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    let user_routes = Router::new()
        .route(
            "/",
            get(handlers::users::list).post(handlers::users::create),
        )
        .route(
            "/{id}",
            get(handlers::users::get)
                .put(handlers::users::update)
                .delete(handlers::users::delete),
        )
        .route("/{id}/hard", axum::routing::delete(handlers::users::hard_delete))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    let scale_routes = Router::new()
        .route(
            "/",
            get(handlers::scales::list).post(handlers::scales::create),
        )
        .route(
            "/{id}",
            get(handlers::scales::get)
                .put(handlers::scales::update)
                .delete(handlers::scales::delete),
        )
        .route("/{id}/hard", axum::routing::delete(handlers::scales::hard_delete))
        .route("/{id}/publish", post(handlers::scales::publish))
        .route("/{id}/start", post(handlers::scales::start))
        .route("/{id}/complete", post(handlers::scales::complete))
        .route("/{id}/cancel", post(handlers::scales::cancel))
        .route("/{id}/check-in", post(handlers::scales::check_in))
        .route("/{id}/check-out", post(handlers::scales::check_out))
        .route("/{id}/candidatures", get(handlers::candidatures::for_scale))
        .route("/{id}/ratings", get(handlers::ratings::for_scale))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    let candidature_routes = Router::new()
        .route(
            "/",
            get(handlers::candidatures::list).post(handlers::candidatures::apply),
        )
        .route("/{id}/waiting", post(handlers::candidatures::mark_waiting))
        .route("/{id}/accept", post(handlers::candidatures::accept))
        .route("/{id}/deny", post(handlers::candidatures::deny))
        .route("/{id}/workflow", post(handlers::candidatures::advance_workflow))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    let location_routes = Router::new()
        .route(
            "/",
            get(handlers::locations::list).post(handlers::locations::create),
        )
        .route(
            "/{id}",
            get(handlers::locations::get)
                .put(handlers::locations::update)
                .delete(handlers::locations::delete),
        )
        .route("/cep/{cep}", get(handlers::locations::lookup_cep))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    let specialty_routes = Router::new()
        .route(
            "/",
            get(handlers::catalog::list_specialties).post(handlers::catalog::create_specialty),
        )
        .route(
            "/{id}",
            put(handlers::catalog::update_specialty).delete(handlers::catalog::delete_specialty),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    let scale_type_routes = Router::new()
        .route(
            "/",
            get(handlers::catalog::list_scale_types).post(handlers::catalog::create_scale_type),
        )
        .route(
            "/{id}",
            put(handlers::catalog::update_scale_type).delete(handlers::catalog::delete_scale_type),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    let profile_routes = Router::new()
        .route(
            "/",
            get(handlers::rbac::list_profiles).post(handlers::rbac::create_profile),
        )
        .route("/me/permissions", get(handlers::rbac::my_permissions))
        .route("/preview", post(handlers::rbac::preview_resolution))
        .route(
            "/{id}",
            get(handlers::rbac::get_profile)
                .put(handlers::rbac::update_profile)
                .delete(handlers::rbac::delete_profile),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    let payment_routes = Router::new()
        .route(
            "/",
            get(handlers::payments::list).post(handlers::payments::create),
        )
        .route("/refresh-overdue", post(handlers::payments::refresh_overdue))
        .route("/{id}/pay", post(handlers::payments::mark_paid))
        .route("/{id}/confirm", post(handlers::payments::confirm_receipt))
        .route("/{id}", axum::routing::delete(handlers::payments::delete))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    let rating_routes = Router::new()
        .route(
            "/",
            get(handlers::ratings::list).post(handlers::ratings::create),
        )
        .route("/{id}", axum::routing::delete(handlers::ratings::delete))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    let document_routes = Router::new()
        .route(
            "/",
            get(handlers::documents::list).post(handlers::documents::create),
        )
        .route("/{id}/review", post(handlers::documents::review))
        .route("/{id}", axum::routing::delete(handlers::documents::delete))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    let notification_routes = Router::new()
        .route("/", get(handlers::notifications::list))
        .route("/read-all", post(handlers::notifications::mark_all_read))
        .route("/{id}/read", post(handlers::notifications::mark_read))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    let dashboard_routes = Router::new()
        .route("/summary", get(handlers::dashboard::get_summary))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    let audit_routes = Router::new()
        .route("/", get(handlers::audit::list))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route(
            "/api/docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .nest("/api/auth", auth_routes.merge(session_routes))
        .nest("/api/users", user_routes)
        .nest("/api/scales", scale_routes)
        .nest("/api/candidatures", candidature_routes)
        .nest("/api/locations", location_routes)
        .nest("/api/specialties", specialty_routes)
        .nest("/api/scale-types", scale_type_routes)
        .nest("/api/profiles", profile_routes)
        .nest("/api/payments", payment_routes)
        .nest("/api/ratings", rating_routes)
        .nest("/api/documents", document_routes)
        .nest("/api/notifications", notification_routes)
        .nest("/api/dashboard", dashboard_routes)
        .nest("/api/audit", audit_routes)
        .with_state(app_state);

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.expect("Erro no servidor Axum");
}

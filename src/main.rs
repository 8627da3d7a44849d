//src/main.rs

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{get, post},
};
use tokio::net::TcpListener;

mod common;
mod config;
mod db;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::middleware::auth_middleware;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas de autenticação (o logout lê o cookie diretamente; apenas o
    // /me exige sessão válida)
    let auth_routes = Router::new()
        .route("/yandex", post(handlers::auth::login_with_yandex))
        .route("/logout", post(handlers::auth::logout))
        .route(
            "/me",
            get(handlers::auth::get_current_user).layer(axum_middleware::from_fn_with_state(
                app_state.clone(),
                auth_middleware,
            )),
        );

    // Tudo abaixo exige sessão válida
    let session_routes = Router::new()
        .route(
            "/orgs",
            post(handlers::tenancy::create_organization)
                .get(handlers::tenancy::list_organizations),
        )
        .route(
            "/orgs/{id}",
            get(handlers::tenancy::get_organization)
                .patch(handlers::tenancy::patch_organization)
                .delete(handlers::tenancy::delete_organization),
        )
        .route(
            "/units",
            post(handlers::tenancy::create_unit).get(handlers::tenancy::list_units),
        )
        .route(
            "/units/{id}",
            get(handlers::tenancy::get_unit)
                .patch(handlers::tenancy::patch_unit)
                .delete(handlers::tenancy::delete_unit),
        )
        .route(
            "/storage-groups",
            post(handlers::storage::create_storage_group)
                .get(handlers::storage::list_storage_groups),
        )
        .route(
            "/storage-groups/{id}",
            get(handlers::storage::get_storage_group)
                .patch(handlers::storage::patch_storage_group)
                .delete(handlers::storage::delete_storage_group),
        )
        .route(
            "/cells-groups",
            post(handlers::storage::create_cells_group).get(handlers::storage::list_cells_groups),
        )
        .route(
            "/cells-groups/{id}",
            get(handlers::storage::get_cells_group)
                .patch(handlers::storage::patch_cells_group)
                .delete(handlers::storage::delete_cells_group),
        )
        .route("/cells-groups/{id}/cells", get(handlers::storage::list_cells))
        .route("/cells", post(handlers::storage::create_cell))
        .route(
            "/cells/{id}",
            get(handlers::storage::get_cell)
                .patch(handlers::storage::patch_cell)
                .delete(handlers::storage::delete_cell),
        )
        .route(
            "/items",
            post(handlers::catalog::create_item).get(handlers::catalog::list_items),
        )
        .route(
            "/items/{id}",
            get(handlers::catalog::get_item)
                .put(handlers::catalog::update_item)
                .delete(handlers::catalog::delete_item),
        )
        .route("/roles", get(handlers::rbac::list_roles))
        .route(
            "/roles/permissions",
            get(handlers::rbac::list_role_permissions),
        )
        .route(
            "/members",
            post(handlers::rbac::grant_role).get(handlers::rbac::list_members),
        )
        .route("/audit/changes", get(handlers::audit::list_object_changes))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api", session_routes)
        .with_state(app_state);

    let addr = std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", addr);
    axum::serve(listener, app).await.expect("Erro no servidor Axum");
}

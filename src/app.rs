use axum::{
    extract::FromRef,
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::handlers::{
    add_to_cart, cart_page, create_session_layer, health_check, index, login, login_page, logout,
    menu_page, metrics_handler, register, register_page, remove_from_cart,
    request_validation_middleware, security_headers_middleware, update_quantity,
};
use crate::models::RepositoryResult;
use crate::observability::{observability_middleware, BusinessTracingMiddleware, Metrics};
use crate::repositories::{SchemaManager, SqliteCatalogRepository, SqliteUserRepository};
use crate::services::{CartService, MenuService, UserService};

/// Shared, read-only state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub menu_service: Arc<MenuService>,
    pub cart_service: Arc<CartService>,
    pub user_service: Arc<UserService>,
    pub business_tracer: Arc<BusinessTracingMiddleware>,
    pub metrics: Arc<Metrics>,
    pub pool: SqlitePool,
}

impl FromRef<AppState> for Arc<Metrics> {
    fn from_ref(state: &AppState) -> Self {
        state.metrics.clone()
    }
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl AppState {
    /// Wire repositories and services over an open pool
    pub fn new(pool: SqlitePool, metrics: Arc<Metrics>) -> Self {
        let catalog = Arc::new(SqliteCatalogRepository::new(pool.clone(), metrics.clone()));
        let users = Arc::new(SqliteUserRepository::new(pool.clone(), metrics.clone()));

        Self {
            menu_service: Arc::new(MenuService::new(catalog.clone(), metrics.clone())),
            cart_service: Arc::new(CartService::new(catalog)),
            user_service: Arc::new(UserService::new(users, metrics.clone())),
            business_tracer: Arc::new(BusinessTracingMiddleware::new(metrics.clone())),
            metrics,
            pool,
        }
    }
}

/// Create the schema and, when enabled, seed the menu
pub async fn prepare_database(
    pool: &SqlitePool,
    metrics: Arc<Metrics>,
    seed: bool,
) -> RepositoryResult<()> {
    let schema = SchemaManager::new(pool.clone());
    schema.create_tables().await?;

    if seed {
        let catalog = SqliteCatalogRepository::new(pool.clone(), metrics);
        let inserted = schema.seed_menu(&catalog).await?;
        info!("Seed inserted {} menu items", inserted);
    }

    Ok(())
}

/// Build the router with every route and middleware layer
pub fn create_app(state: AppState, config: &Config) -> Router {
    let metrics = state.metrics.clone();
    let max_request_size = config.server.max_request_size;

    Router::new()
        .route("/", get(index))
        .route("/login", get(login_page).post(login))
        .route("/register", get(register_page).post(register))
        .route("/logout", get(logout))
        .route("/menu", get(menu_page))
        .route("/carrito", get(cart_page))
        .route("/agregar_al_carrito", post(add_to_cart))
        .route("/quitar_del_carrito", post(remove_from_cart))
        .route("/actualizar_cantidad", post(update_quantity))
        .route("/health/status", get(health_check))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
        // layers run outermost-last: observability sees every request first
        .layer(create_session_layer(&config.session))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(middleware::from_fn(move |req, next| {
            request_validation_middleware(max_request_size, req, next)
        }))
        .layer(TimeoutLayer::new(config.server.request_timeout()))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(move |req, next| {
            observability_middleware(metrics.clone(), req, next)
        }))
}

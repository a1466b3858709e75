use axum::{
    http::{header, Method},
    middleware,
    routing::{get, post},
    Router,
};
use diesel::prelude::*;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

mod auth;
mod config;
mod db;
mod error;
mod handlers;
mod issuance;
mod models;
mod schema;
mod storage;
mod store;

#[cfg(test)]
mod tests;

#[derive(Clone)]
pub struct AppState {
    pub config: config::AppConfig,
    pub store: Arc<dyn store::ListingStore>,
}

fn app(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(|| async { "Hello, Property Marketplace!" }))
        .route("/api/properties", get(handlers::list_listings))
        .route("/api/properties/:id", get(handlers::get_listing));

    let submitter_routes = Router::new()
        .route("/api/properties", post(handlers::create_listing))
        .route("/api/upload-image", post(handlers::upload_image))
        .route("/api/users", post(handlers::save_user))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::authenticate,
        ));

    let admin_routes = Router::new()
        .route("/api/admin/properties", get(handlers::admin_listings))
        .route("/api/admin/verify", post(handlers::verify_listing))
        .route("/api/admin/delete", post(handlers::delete_listing))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_admin,
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::authenticate,
        ));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .merge(public_routes)
        .merge(submitter_routes)
        .merge(admin_routes)
        .nest_service("/uploads", ServeDir::new(&state.config.upload_dir))
        .layer(cors)
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let config = config::AppConfig::load()?;
    log::info!("Loaded config, serving on port {}", config.port);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));

    let pool = db::build_pool(&config.database_url)
        .map_err(|e| format!("Failed to connect to database: {}", e))?;
    db::run_migrations(&pool)?;

    let mut conn = pool.get()?;
    let test_query: i32 = diesel::select(diesel::dsl::sql::<diesel::sql_types::Integer>("1"))
        .get_result(&mut conn)?;
    log::info!("Database test query result: {}", test_query);
    drop(conn);

    log::info!("Starting server on {}", addr);

    let state = AppState {
        config,
        store: Arc::new(store::PgListingStore::new(pool)),
    };

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state).into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

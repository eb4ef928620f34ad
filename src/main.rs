//! Hackathon Team Backend
//!
//! REST backend for team registration, invitations with optional SMS OTP
//! verification, and membership, persisted in SQLite.

mod api;
mod clock;
mod config;
mod db;
mod errors;
mod invitations;
mod models;
mod notify;
mod tokens;

use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use api::MessageResponse;
use clock::{Clock, SystemClock};
use config::Config;
use db::Repository;
use invitations::{InvitationService, InvitationSettings};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub invitations: Arc<InvitationService>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Hackathon Team Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);
    tracing::info!("Invite links point to {}", config.base_url);

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let repo = Arc::new(Repository::new(pool, clock.clone()));

    // OTP delivery
    let sender = notify::sender_from_config(&config.sms_provider, config.otp_ttl)?;
    let invitations = Arc::new(InvitationService::new(
        repo.clone(),
        sender,
        clock,
        InvitationSettings::from_config(&config),
    ));

    // Create application state
    let state = AppState { repo, invitations };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Collection routes answer with and without a trailing slash
    let api_routes = Router::new()
        // Teams
        .route("/teams", post(api::create_team).get(api::list_teams))
        .route("/teams/", post(api::create_team).get(api::list_teams))
        .route(
            "/teams/{id}",
            get(api::get_team)
                .put(api::update_team)
                .delete(api::delete_team),
        )
        // Invitations
        .route(
            "/teams/{id}/invitations",
            post(api::create_invitation).get(api::list_invitations),
        )
        .route(
            "/teams/{id}/invitations/",
            post(api::create_invitation).get(api::list_invitations),
        )
        .route("/invitations/verify-otp", post(api::verify_otp))
        .route("/invitations/{token}", get(api::get_invitation))
        .route("/invitations/{token}/resend-otp", post(api::resend_otp))
        .route("/invitations/{token}/join", post(api::join_team))
        // Members
        .route(
            "/teams/{id}/members",
            post(api::add_member).get(api::list_members),
        )
        .route(
            "/teams/{id}/members/",
            post(api::add_member).get(api::list_members),
        )
        .route(
            "/teams/{id}/members/{member_id}",
            delete(api::remove_member),
        );

    Router::new()
        .nest("/api", api_routes)
        .route("/", get(root))
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Service banner.
async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Hackathon Team Registration API".to_string(),
    })
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

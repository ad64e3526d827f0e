use std::sync::{Arc, Mutex};

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use stayhub::config::AppConfig;
use stayhub::db;
use stayhub::handlers;
use stayhub::services::embeddings::openai::OpenAiEmbeddings;
use stayhub::services::identity::clerk::ClerkProvider;
use stayhub::services::payments::stripe::StripeGateway;
use stayhub::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;

    if config.stripe_secret_key.is_empty() {
        tracing::warn!("STRIPE_SECRET_KEY not set, checkout will fail");
    }
    if config.stripe_webhook_secret.is_empty() {
        tracing::warn!("STRIPE_WEBHOOK_SECRET not set, webhooks will be rejected");
    }

    let payments = StripeGateway::new(config.stripe_secret_key.clone());
    let embeddings = OpenAiEmbeddings::new(
        config.openai_api_key.clone(),
        config.embedding_model.clone(),
    );
    let identity = ClerkProvider::new(
        config.identity_api_url.clone(),
        config.identity_api_key.clone(),
    );

    let cors = CorsLayer::new()
        .allow_origin(config.frontend_url.parse::<HeaderValue>()?)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true);

    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: config.clone(),
        payments: Box::new(payments),
        embeddings: Box::new(embeddings),
        identity: Box::new(identity),
    });

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route(
            "/api/hotels",
            get(handlers::hotels::get_all_hotels).post(handlers::hotels::create_hotel),
        )
        .route("/api/hotels/search", get(handlers::hotels::search_hotels))
        .route(
            "/api/hotels/:id",
            get(handlers::hotels::get_hotel_by_id)
                .put(handlers::hotels::update_hotel)
                .patch(handlers::hotels::patch_hotel)
                .delete(handlers::hotels::delete_hotel),
        )
        .route("/api/bookings", post(handlers::bookings::create_booking))
        .route("/api/bookings/me", get(handlers::bookings::my_bookings))
        .route(
            "/api/payments/create-checkout-session",
            post(handlers::payments::create_checkout_session),
        )
        .route(
            "/api/payments/session-status",
            get(handlers::payments::session_status),
        )
        // Raw-body route: signature verification needs the exact bytes.
        .route("/api/stripe/webhook", post(handlers::webhook::stripe_webhook))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

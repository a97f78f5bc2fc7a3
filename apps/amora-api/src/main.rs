use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use axum::http::HeaderValue;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use amora_api::services::payment::paystack::PaystackGateway;
use amora_api::{AppConfig, AppState, auth, handlers, ws};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "amora_api=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;
    tracing::info!("Starting amora-api ({})", config.app_env);

    let pool = amora_db::connect(&config.database_url).await?;
    tracing::info!("Database connected, migrations applied");

    let gateway = Arc::new(PaystackGateway::new(config.paystack_secret_key.clone())?);

    let cors = match config.allowed_origin.as_deref() {
        Some(origin) => {
            let origin = origin
                .parse::<HeaderValue>()
                .context("Invalid ALLOWED_ORIGIN")?;
            CorsLayer::new()
                .allow_origin(origin)
                .allow_methods(Any)
                .allow_headers(Any)
        }
        None => CorsLayer::permissive(),
    };

    let listen_port = config.listen_port;
    let state = AppState::new(pool, config, gateway);

    // Chat endpoints sit behind the access gate on top of authentication.
    let chat_routes = Router::new()
        .route("/chats", get(handlers::chat::list_conversations))
        .route(
            "/chats/{match_id}/messages",
            get(handlers::chat::list_messages).post(handlers::chat::send_message),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_chat_access,
        ));

    let protected_routes = Router::new()
        .route("/users/me", get(handlers::profiles::me).put(handlers::profiles::update_me))
        .route("/users/discover", get(handlers::profiles::discover))
        .route("/users/{user_id}", get(handlers::profiles::get_profile))
        .route("/swipes", post(handlers::swipes::swipe))
        .route("/matches", get(handlers::swipes::list_matches))
        .route("/notifications", get(handlers::notifications::list_notifications))
        .route("/notifications/read", post(handlers::notifications::mark_read))
        .route("/orders", post(handlers::orders::create_order))
        .route("/payments/plans", get(handlers::subscriptions::list_plans))
        .route(
            "/payments/chat/initialize",
            post(handlers::payments::initialize_chat_payment),
        )
        .route("/payments/chat/verify", post(handlers::payments::verify_chat_payment))
        .route("/payments/chat/access", get(handlers::payments::chat_access))
        .route(
            "/payments/subscription/initialize",
            post(handlers::subscriptions::initialize_subscription),
        )
        .route(
            "/payments/subscription/cancel",
            post(handlers::subscriptions::cancel_subscription),
        )
        .route("/payments/subscriptions", get(handlers::subscriptions::list_subscriptions))
        .merge(chat_routes)
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::authenticate));

    let app = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route(
            "/payments/subscription/webhook",
            post(handlers::webhooks::payment_webhook),
        )
        .route("/ws", get(ws::ws_handler))
        .merge(protected_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], listen_port));
    tracing::info!("API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

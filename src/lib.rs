use axum::{
    extract::FromRef,
    http::{header, HeaderValue, Method},
    routing::{get, patch, post},
    Router,
};
use sqlx::PgPool;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

pub mod auth;
pub mod config;
pub mod conversations;
pub mod error;
pub mod extract;
pub mod follows;
pub mod notifications;
pub mod posts;
pub mod response;
pub mod users;

use config::settings::Settings;

/// Shared by every handler. The pool is opened once in `main` and closed on shutdown.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub settings: Settings,
}

impl FromRef<AppState> for PgPool {
    fn from_ref(app_state: &AppState) -> PgPool {
        app_state.pool.clone()
    }
}

impl FromRef<AppState> for Settings {
    fn from_ref(app_state: &AppState) -> Settings {
        app_state.settings.clone()
    }
}

fn cors_layer(settings: &Settings) -> CorsLayer {
    if settings.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = settings
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

pub fn app(state: AppState) -> Router {
    let auth_router = Router::new()
        .route("/signup", post(auth::handler::signup))
        .route("/login", post(auth::handler::login))
        .route("/profile", get(auth::handler::get_me));

    // `:user` is a username on the profile route and an id under `/follow`.
    let user_router = Router::new()
        .route("/profile", patch(users::handler::update_profile))
        .route("/:user", get(users::handler::get_profile))
        .route(
            "/:user/follow",
            post(follows::handler::follow_user).delete(follows::handler::unfollow_user),
        );

    let post_router = Router::new()
        .route(
            "/",
            post(posts::handler::create_post).get(posts::handler::list_posts),
        )
        .route(
            "/:id",
            get(posts::handler::get_post)
                .patch(posts::handler::update_post)
                .delete(posts::handler::delete_post),
        )
        .route("/:id/like", post(posts::handler::toggle_like));

    let notification_router = Router::new()
        .route("/", get(notifications::handler::list_notifications))
        .route("/unread-count", get(notifications::handler::unread_count))
        .route("/:id/read", patch(notifications::handler::mark_read));

    let conversation_router = Router::new()
        .route(
            "/",
            post(conversations::handler::create_or_get)
                .get(conversations::handler::list_conversations),
        )
        .route(
            "/:id/messages",
            get(conversations::handler::list_messages).post(conversations::handler::send_message),
        );

    let cors = cors_layer(&state.settings);

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .nest("/api/auth", auth_router)
        .nest("/api/users", user_router)
        .nest("/api/posts", post_router)
        .nest("/api/notifications", notification_router)
        .nest("/api/conversations", conversation_router)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

use axum::{
    middleware,
    routing::{get, patch, post, put},
    Router,
};
use shared::jwt::JwtConfig;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, rate_limit_middleware, security_headers_middleware,
    trace_id, RateLimiterState,
};
use crate::routes::{admin, auth, comments, health, polls, preview, shares, stats, votes};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub jwt: Arc<JwtConfig>,
    pub rate_limiter: Option<Arc<RateLimiterState>>,
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// JSON API mounted under `/api/v1`.
///
/// Handlers authenticate through the `UserAuth`/`OptionalUserAuth` extractors,
/// so public reads and authenticated writes can share a path.
fn api_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        // Auth
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/me", get(auth::me))
        // Polls
        .route(
            "/polls",
            get(polls::list_public_polls).post(polls::create_poll),
        )
        .route("/users/me/polls", get(polls::list_my_polls))
        .route(
            "/polls/:poll_id",
            get(polls::get_poll)
                .put(polls::update_poll)
                .delete(polls::delete_poll),
        )
        // Votes
        .route("/polls/:poll_id/votes", post(votes::cast_vote))
        .route("/polls/:poll_id/votes/me", get(votes::get_my_votes))
        .route("/polls/:poll_id/results", get(votes::get_results))
        // Comments
        .route(
            "/polls/:poll_id/comments",
            get(comments::list_comments).post(comments::create_comment),
        )
        .route(
            "/comments/:comment_id",
            patch(comments::update_comment).delete(comments::delete_comment),
        )
        .route(
            "/comments/:comment_id/visibility",
            patch(comments::set_comment_visibility),
        )
        .route("/comments/:comment_id/reports", post(comments::report_comment))
        .route("/comments/:comment_id/reaction", put(comments::react_to_comment))
        // Shares
        .route("/polls/:poll_id/shares", post(shares::create_share))
        .route("/polls/:poll_id/shares/stats", get(shares::share_stats))
        .route(
            "/shares/:code",
            get(shares::resolve_share).delete(shares::delete_share),
        )
        .route("/shares/:code/validate", get(shares::validate_share))
        // Preview and public totals
        .route("/polls/:poll_id/preview", get(preview::poll_preview))
        .route("/stats", get(stats::site_stats))
        // Admin
        .route(
            "/admin/users",
            get(admin::list_users).patch(admin::update_user_role),
        )
        .route("/admin/stats", get(admin::admin_stats))
        .route(
            "/admin/comments/reported",
            get(admin::list_reported_comments),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
}

pub fn create_app(config: Config, pool: PgPool, jwt: JwtConfig) -> Router {
    let config = Arc::new(config);

    let rate_limiter = RateLimiterState::new(config.security.rate_limit_per_minute).map(Arc::new);

    let state = AppState {
        pool,
        config: config.clone(),
        jwt: Arc::new(jwt),
        rate_limiter,
    };

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler))
        .route("/share/:code", get(shares::share_redirect));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes(&state))
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            security_headers_middleware,
        ))
        .layer(RequestBodyLimitLayer::new(config.server.max_body_size))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware)) // Prometheus metrics
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id)) // Request ID and logging
        .layer(cors_layer(&config))
        .with_state(state)
}

/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskdesk_api::{app::{build_router, AppState}, config::Config};
/// use taskdesk_shared::{db::pool::create_pool, store::postgres::PgStore};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(config.pool_config()).await?;
/// let state = AppState::new(Arc::new(PgStore::new(pool)), config);
/// let app = build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, middleware::security::SecurityHeadersLayer};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use taskdesk_shared::{auth::middleware::authenticate, store::Store};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned per request by Axum's `State` extractor; both fields are `Arc`s.
#[derive(Clone)]
pub struct AppState {
    /// Storage backend (PostgreSQL in production, in-memory in tests)
    pub store: Arc<dyn Store>,

    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET /health
/// └── /api/
///     ├── /auth/
///     │   ├── POST /register
///     │   ├── POST /login
///     │   ├── PUT  /password        (auth)
///     │   └── GET  /me              (auth)
///     ├── /tasks/                   (auth)
///     │   ├── GET    /
///     │   ├── POST   /
///     │   ├── PUT    /:id
///     │   └── DELETE /:id
///     ├── /admin/                   (auth)
///     │   ├── GET    /check
///     │   ├── GET    /users
///     │   ├── DELETE /users/:id
///     │   ├── PUT    /users/:id/role
///     │   ├── PUT    /users/:id/active
///     │   └── GET    /export
///     └── /meta/
///         ├── GET /statuses
///         └── GET /priorities
/// ```
///
/// Role checks happen in the services, not in the router, so every
/// protected route only requires a valid token here.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let require_auth = || middleware::from_fn_with_state(state.clone(), jwt_auth_layer);

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let auth_routes = Router::new()
        .route("/password", put(routes::auth::change_password))
        .route("/me", get(routes::auth::me))
        .layer(require_auth())
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login));

    let task_routes = Router::new()
        .route(
            "/",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/:id",
            put(routes::tasks::update_task).delete(routes::tasks::delete_task),
        )
        .layer(require_auth());

    let admin_routes = Router::new()
        .route("/check", get(routes::admin::admin_check))
        .route("/users", get(routes::admin::list_users))
        .route("/users/:id", delete(routes::admin::delete_user))
        .route("/users/:id/role", put(routes::admin::change_role))
        .route("/users/:id/active", put(routes::admin::set_active))
        .route("/export", get(routes::admin::export_database))
        .layer(require_auth());

    let meta_routes = Router::new()
        .route("/statuses", get(routes::meta::statuses))
        .route("/priorities", get(routes::meta::priorities));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/tasks", task_routes)
        .nest("/admin", admin_routes)
        .nest("/meta", meta_routes);

    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config))
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.api.cors_origins.iter().any(|o| o == "*") {
        // Development mode: permissive CORS
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}

/// Bearer-token layer
///
/// Validates the token and injects an
/// [`AuthContext`](taskdesk_shared::auth::middleware::AuthContext) into the
/// request extensions.
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_context = authenticate(req.headers(), state.jwt_secret())?;

    tracing::debug!(
        user_id = auth_context.user_id,
        role = %auth_context.role,
        "Authenticated request"
    );

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}

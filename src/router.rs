use axum::{
    Router,
    extract::{DefaultBodyLimit, FromRef},
    middleware::from_extractor_with_state,
    routing::{delete, get, post},
};

use crate::config::Config;
use crate::db::UsersStorage;
use crate::handlers::{data, databases, tables, users};
use crate::middleware::RequireAuth;
use crate::service::gateway::SchemaGateway;
use crate::service::registry::DatabaseRegistry;
use crate::service::token::TokenIssuer;

/// Shared, cheaply clonable handles. Nothing here caches connections.
#[derive(Clone)]
pub struct GatewayState {
    pub users: UsersStorage,
    pub tokens: TokenIssuer,
    pub registry: DatabaseRegistry,
    pub gateway: SchemaGateway,
    pub max_upload_bytes: usize,
}

impl GatewayState {
    pub fn new(cfg: &Config) -> Self {
        let registry = DatabaseRegistry::new(cfg.data_dir());
        Self {
            users: UsersStorage::new(cfg.users_db_path()),
            tokens: TokenIssuer::from_config(cfg),
            gateway: SchemaGateway::new(registry.clone()),
            registry,
            max_upload_bytes: cfg.max_upload_bytes,
        }
    }
}

impl FromRef<GatewayState> for TokenIssuer {
    fn from_ref(state: &GatewayState) -> Self {
        state.tokens.clone()
    }
}

pub fn gateway_router(state: GatewayState) -> Router {
    let protected = Router::new()
        .route("/user/register", post(users::register))
        .route("/user/{username}", delete(users::delete_user))
        .route("/database/create", post(databases::create))
        .route("/database/download", get(databases::download))
        .route(
            "/database/upload",
            post(databases::upload).layer(DefaultBodyLimit::max(state.max_upload_bytes)),
        )
        .route("/tables", get(tables::list_tables))
        .route("/table", post(tables::create_table))
        .route("/table/{table}", delete(tables::delete_table))
        .route("/table/{table}/columns", get(tables::list_columns))
        .route(
            "/data/{table}",
            post(data::insert)
                .get(data::select)
                .put(data::update)
                .delete(data::delete),
        )
        .route_layer(from_extractor_with_state::<RequireAuth, GatewayState>(
            state.clone(),
        ));

    Router::new()
        .route("/", get(|| async { "sqlite-gateway is running" }))
        .route("/user/login", post(users::login))
        .merge(protected)
        .with_state(state)
}

use std::sync::Arc;
use axum::{routing::post, Router, Json};
use axum::extract::State;
use axum::http::StatusCode;
use tower_http::cors::{CorsLayer, Any};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use crate::error::QueryError;
use crate::translate::{EntitySearch, GraphSearch, RelationshipSearch, TextSearch, Translator};

pub struct AppState {
    pub translator: Translator,
}

impl AppState {
    pub fn new(translator: Translator) -> Self {
        Self { translator }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct QueryResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

type Reply = (StatusCode, Json<QueryResponse>);

fn reply(route: &str, translated: Result<String, QueryError>) -> Reply {
    match translated {
        Ok(query) => {
            info!(route, "query translated");
            (StatusCode::OK, Json(QueryResponse { status: "ok".into(), query: Some(query), error: None }))
        }
        Err(e) => {
            // a request that cannot be expressed is the caller's problem
            let status = match e {
                QueryError::InvalidCondition(_) | QueryError::InvalidValue(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            let msg = format!("{e}");
            warn!(route, %msg, code=%status.as_u16(), "translation error");
            (status, Json(QueryResponse { status: "error".into(), query: None, error: Some(msg) }))
        }
    }
}

pub async fn entities(State(state): State<Arc<AppState>>, Json(req): Json<EntitySearch>) -> Reply {
    reply("entities", state.translator.entities(&req).map(|q| q.to_edn()))
}

pub async fn relationships(State(state): State<Arc<AppState>>, Json(req): Json<RelationshipSearch>) -> Reply {
    reply("relationships", state.translator.relationships(&req).map(|q| q.to_edn()))
}

pub async fn text(State(state): State<Arc<AppState>>, Json(req): Json<TextSearch>) -> Reply {
    reply("text", state.translator.text(&req).map(|q| q.to_edn()))
}

pub async fn graph(State(state): State<Arc<AppState>>, Json(req): Json<GraphSearch>) -> Reply {
    reply("graph", Ok(state.translator.graph(&req).to_edn()))
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::POST])
        .allow_headers(Any);
    Router::new()
        .route("/v1/query/entities", post(entities))
        .route("/v1/query/relationships", post(relationships))
        .route("/v1/query/text", post(text))
        .route("/v1/query/graph", post(graph))
        .with_state(state)
        .layer(cors)
}

//! Protocol-engine seam
//!
//! The engine's token, authorize, and consent endpoints are mounted as
//! an opaque router by the assembler; startup owns only the discovery
//! metadata document advertised from the configured issuer.

use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use crate::http::AppState;

/// Routes for the discovery metadata document.
pub fn discovery_router() -> Router<AppState> {
    Router::new().route(
        "/.well-known/openid-configuration",
        get(discovery_document),
    )
}

async fn discovery_document(State(state): State<AppState>) -> Json<Value> {
    let issuer = state
        .registry
        .config
        .server
        .issuer
        .trim_end_matches('/')
        .to_string();

    Json(json!({
        "issuer": issuer,
        "jwks_uri": format!("{issuer}/.well-known/openid-configuration/jwks"),
        "authorization_endpoint": format!("{issuer}/connect/authorize"),
        "token_endpoint": format!("{issuer}/connect/token"),
        "userinfo_endpoint": format!("{issuer}/connect/userinfo"),
        "end_session_endpoint": format!("{issuer}/connect/endsession"),
        "scopes_supported": ["openid", "profile"],
        "response_types_supported": ["code", "token", "id_token", "code id_token"],
        "subject_types_supported": ["public"],
        "id_token_signing_alg_values_supported": ["RS256"],
    }))
}

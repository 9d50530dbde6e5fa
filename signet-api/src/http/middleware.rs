//! Request-pipeline stage middleware
//!
//! Each function here is one stage of the assembled chain; the order
//! they are wired in is owned by `pipeline::PipelineAssembler`.

use std::net::IpAddr;

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::http::{error::AppError, pages, AppState};

/// `Strict-Transport-Security` value stamped in production. 30 days,
/// matching the framework default the original deployment relied on.
const HSTS_VALUE: &str = "max-age=2592000";

/// Client-address and scheme fields rewritten from trusted forwarding
/// headers, available to downstream endpoints as a request extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardedClient {
    pub address: Option<IpAddr>,
    pub scheme: Option<String>,
}

/// Error-reporting stage (first in the chain).
///
/// Development passes verbose error bodies through untouched. In
/// production every response carries HSTS and server faults are
/// rendered as the generic error page, so request failures never leak
/// detail and never escape to terminate the process.
pub async fn error_reporting(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let mode = state.registry.config.server.environment;
    let mut response = next.run(req).await;

    if mode.is_development() {
        return response;
    }

    response.headers_mut().insert(
        header::STRICT_TRANSPORT_SECURITY,
        HeaderValue::from_static(HSTS_VALUE),
    );

    if response.status().is_server_error() {
        let status = response.status();
        let mut generic =
            (status, axum::response::Html(pages::generic_error_page())).into_response();
        generic.headers_mut().insert(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static(HSTS_VALUE),
        );
        return generic;
    }

    response
}

/// Transport-redirect stage: upgrades insecure transport.
///
/// Runs before proxy trust, so it reads the forwarding-protocol header
/// directly to avoid redirect loops behind a TLS-terminating proxy.
pub async fn transport_redirect(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    if !state.registry.config.server.require_https {
        return next.run(req).await;
    }

    if forwarded_proto(&req).as_deref() == Some("https") {
        return next.run(req).await;
    }

    if let Some(host) = req
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
    {
        let path_and_query = req
            .uri()
            .path_and_query()
            .map_or("/", |pq| pq.as_str());
        let location = format!("https://{host}{path_and_query}");
        return Redirect::temporary(&location).into_response();
    }

    // Cannot build a redirect without a host; let the request through
    next.run(req).await
}

/// Localization stage: resolves the request's cultures using the
/// configured policy and exposes them as an extension.
pub async fn localization(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let resolved = state.registry.localization.resolve(req.headers());
    req.extensions_mut().insert(resolved);
    next.run(req).await
}

/// Proxy-trust stage: rewrites client address and scheme from the
/// trusted forwarding headers (client-address and protocol forwarding
/// only). Wired as a route layer so it runs after the routing match
/// and before endpoint execution.
pub async fn proxy_trust(mut req: Request, next: Next) -> Response {
    let address = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .and_then(|v| v.parse::<IpAddr>().ok());

    let scheme = forwarded_proto(&req);

    req.extensions_mut().insert(ForwardedClient { address, scheme });
    next.run(req).await
}

/// Endpoints reachable without credentials when pipeline enforcement
/// is enabled: the protocol engine's surface, static assets, probes,
/// and the public pages.
const PUBLIC_PREFIXES: &[&str] = &["/.well-known", "/connect", "/assets", "/health", "/home"];

/// Access-control stage, present only under
/// `AccessControlPolicy::Pipeline`.
///
/// Rejects anonymous requests to non-public endpoints. Credential
/// validation itself stays with the protocol engine; this stage only
/// enforces that one was presented.
pub async fn access_control(req: Request, next: Next) -> Response {
    let path = req.uri().path();
    let public = path == "/" || PUBLIC_PREFIXES.iter().any(|p| path.starts_with(p));

    if public || req.headers().contains_key(header::AUTHORIZATION) {
        next.run(req).await
    } else {
        AppError::unauthorized("Authentication required").into_response()
    }
}

fn forwarded_proto(req: &Request) -> Option<String> {
    req.headers()
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|s| s.trim().to_ascii_lowercase())
}

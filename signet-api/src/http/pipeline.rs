//! Request pipeline assembly
//!
//! Builds the middleware chain in its fixed order and returns the
//! assembled router together with the ordered stage list. Assembly is
//! pure wiring: no I/O, no network binding, and the same inputs always
//! produce the same chain.

use std::fmt;

use axum::{middleware::from_fn, middleware::from_fn_with_state, Router};
use signet_core::{bootstrap::RegistryHandle, config::AccessControlPolicy};
use tower_http::{catch_panic::CatchPanicLayer, services::ServeDir, trace::TraceLayer};
use tracing::info;

use crate::http::{health, middleware, pages, protocol, AppState};

/// One stage of the assembled chain, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    /// Error surfacing: verbose in development, generic page plus
    /// transport-security header in production
    ErrorReporting,
    /// Insecure-transport redirect
    TransportRedirect,
    /// Static asset serving
    StaticAssets,
    /// The token/consent protocol engine and its discovery metadata
    ProtocolEngine,
    /// Culture negotiation
    Localization,
    /// Endpoint routing match
    Routing,
    /// Client address and scheme rewriting from forwarding headers
    ProxyTrust,
    /// Anonymous-request rejection, present only under the pipeline
    /// access-control policy
    AccessControl,
    /// Matched endpoint execution
    EndpointDispatch,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ErrorReporting => "error_reporting",
            Self::TransportRedirect => "transport_redirect",
            Self::StaticAssets => "static_assets",
            Self::ProtocolEngine => "protocol_engine",
            Self::Localization => "localization",
            Self::Routing => "routing",
            Self::ProxyTrust => "proxy_trust",
            Self::AccessControl => "access_control",
            Self::EndpointDispatch => "endpoint_dispatch",
        };
        f.write_str(name)
    }
}

/// Ordered record of the stages an assembly produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineStageList(Vec<PipelineStage>);

impl PipelineStageList {
    #[must_use]
    pub fn stages(&self) -> &[PipelineStage] {
        &self.0
    }

    #[must_use]
    pub fn contains(&self, stage: PipelineStage) -> bool {
        self.0.contains(&stage)
    }
}

impl fmt::Display for PipelineStageList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, stage) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" -> ")?;
            }
            write!(f, "{stage}")?;
        }
        Ok(())
    }
}

/// Assembles the request pipeline from the published service registry.
pub struct PipelineAssembler {
    registry: RegistryHandle,
}

impl PipelineAssembler {
    #[must_use]
    pub fn new(registry: RegistryHandle) -> Self {
        Self { registry }
    }

    /// Build the full chain around the protocol engine's routes.
    ///
    /// The engine router is opaque to assembly; only its position in
    /// the chain is owned here. Stage order is fixed and the returned
    /// list reflects exactly what was wired.
    #[must_use]
    pub fn assemble(self, protocol_routes: Router<AppState>) -> (Router, PipelineStageList) {
        let server = &self.registry.config.server;
        let access_control = server.access_control;
        let static_dir = server.static_dir.clone();

        let state = AppState {
            registry: self.registry,
        };

        let mut stages = vec![
            PipelineStage::ErrorReporting,
            PipelineStage::TransportRedirect,
            PipelineStage::StaticAssets,
            PipelineStage::ProtocolEngine,
            PipelineStage::Localization,
            PipelineStage::Routing,
            PipelineStage::ProxyTrust,
        ];
        if access_control == AccessControlPolicy::Pipeline {
            stages.push(PipelineStage::AccessControl);
        }
        stages.push(PipelineStage::EndpointDispatch);

        // Route layers run after the routing match and before the
        // endpoint. Later additions wrap earlier ones, so access
        // control goes on first to keep proxy trust ahead of it.
        let route_layers = |mut router: Router<AppState>| {
            if access_control == AccessControlPolicy::Pipeline {
                router = router.route_layer(from_fn(middleware::access_control));
            }
            router.route_layer(from_fn(middleware::proxy_trust))
        };

        // Protocol endpoints sit before the localization stage: they
        // never see a resolved culture. Only the pages behind them do.
        let engine = route_layers(
            Router::new()
                .merge(protocol::discovery_router())
                .merge(protocol_routes),
        );
        let localized = route_layers(
            Router::new()
                .merge(pages::router())
                .merge(health::router()),
        )
        .layer(from_fn_with_state(state.clone(), middleware::localization));

        let endpoints = Router::new().merge(engine).merge(localized);

        // Static assets sit outside localization, inside the transport
        // and error stages.
        let router = endpoints
            .nest_service("/assets", ServeDir::new(static_dir))
            .layer(CatchPanicLayer::new())
            .layer(from_fn_with_state(
                state.clone(),
                middleware::transport_redirect,
            ))
            .layer(from_fn_with_state(
                state.clone(),
                middleware::error_reporting,
            ))
            .layer(TraceLayer::new_for_http())
            .with_state(state);

        let list = PipelineStageList(stages);
        info!(stages = %list, "Request pipeline assembled");

        (router, list)
    }
}

//! Interactive pages
//!
//! Conventional controller/action dispatch for the small HTML surface
//! the provider serves itself: the home page and the error page.
//! Everything else on this surface is a 404.

use axum::{
    extract::Path,
    response::{Html, IntoResponse, Response},
    routing::get,
    Extension, Router,
};
use signet_core::localization::ResolvedCulture;

use crate::http::{error::AppError, AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(default_route))
        .route("/{controller}", get(dispatch))
        .route("/{controller}/{action}", get(dispatch))
        .route("/{controller}/{action}/{id}", get(dispatch))
}

/// `/` maps to the default controller and action.
async fn default_route(culture: Option<Extension<ResolvedCulture>>) -> Response {
    home_index(culture.map(|Extension(c)| c))
}

async fn dispatch(
    Path(params): Path<std::collections::HashMap<String, String>>,
    culture: Option<Extension<ResolvedCulture>>,
) -> Response {
    let controller = params
        .get("controller")
        .map(|v| v.to_ascii_lowercase())
        .unwrap_or_else(|| "home".to_string());
    let action = params
        .get("action")
        .map(|v| v.to_ascii_lowercase())
        .unwrap_or_else(|| "index".to_string());

    match (controller.as_str(), action.as_str()) {
        ("home", "index") => home_index(culture.map(|Extension(c)| c)),
        ("home", "error") => (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            Html(generic_error_page()),
        )
            .into_response(),
        _ => AppError::not_found(format!("No route for {controller}/{action}")).into_response(),
    }
}

fn home_index(culture: Option<ResolvedCulture>) -> Response {
    let culture_line = culture.map_or_else(String::new, |c| {
        format!(
            "<p>Culture: <code>{}</code> &middot; UI culture: <code>{}</code></p>",
            c.culture, c.ui_culture
        )
    });

    Html(format!(
        "<!DOCTYPE html>\n<html>\n<head><title>Signet</title></head>\n<body>\n\
         <h1>Signet identity provider</h1>\n\
         <p>Discovery document: <a href=\"/.well-known/openid-configuration\">\
         /.well-known/openid-configuration</a></p>\n\
         {culture_line}\n</body>\n</html>"
    ))
    .into_response()
}

/// Generic error page served in production instead of error detail.
#[must_use]
pub fn generic_error_page() -> String {
    "<!DOCTYPE html>\n<html>\n<head><title>Error</title></head>\n<body>\n\
     <h1>An error occurred</h1>\n\
     <p>Something went wrong while processing your request. Please try again later.</p>\n\
     </body>\n</html>"
        .to_string()
}

//! Culture negotiation policy consumed by the localization stage.
//!
//! A `LocalizationPolicy` is pure configuration: it resolves, per
//! request, the culture used for value formatting and the UI culture
//! used for translated strings by walking an ordered provider chain
//! and falling back to the configured defaults.

use http::header::COOKIE;
use http::HeaderMap;

use crate::config::LocalizationConfig;

/// Cookie consulted by the default provider chain. The value keeps the
/// `c=<culture>|uic=<ui-culture>` wire format.
pub const CULTURE_COOKIE: &str = "culture";

/// Culture pair resolved for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCulture {
    pub culture: String,
    pub ui_culture: String,
}

/// Candidate cultures extracted from a request by one provider. Either
/// half may be missing; resolution treats them independently.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CultureCandidates {
    pub culture: Option<String>,
    pub ui_culture: Option<String>,
}

/// One source of culture candidates, consulted in order until the
/// request's cultures are resolved.
pub trait CultureProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Extract candidates from the request, or `None` when this
    /// provider has nothing to say about it.
    fn candidates(&self, headers: &HeaderMap) -> Option<CultureCandidates>;
}

/// Reads the culture cookie (`c=<culture>|uic=<ui-culture>`).
pub struct CookieCultureProvider {
    cookie_name: String,
}

impl CookieCultureProvider {
    #[must_use]
    pub fn new(cookie_name: impl Into<String>) -> Self {
        Self {
            cookie_name: cookie_name.into(),
        }
    }
}

impl Default for CookieCultureProvider {
    fn default() -> Self {
        Self::new(CULTURE_COOKIE)
    }
}

impl CultureProvider for CookieCultureProvider {
    fn name(&self) -> &'static str {
        "cookie"
    }

    fn candidates(&self, headers: &HeaderMap) -> Option<CultureCandidates> {
        let value = cookie_value(headers, &self.cookie_name)?;

        let mut candidates = CultureCandidates::default();
        for part in value.split('|') {
            if let Some(culture) = part.strip_prefix("c=") {
                candidates.culture = Some(culture.to_string());
            } else if let Some(ui) = part.strip_prefix("uic=") {
                candidates.ui_culture = Some(ui.to_string());
            }
        }

        if candidates.culture.is_none() && candidates.ui_culture.is_none() {
            None
        } else {
            Some(candidates)
        }
    }
}

/// Find a cookie's value across all `Cookie` headers. Headers that are
/// not valid UTF-8 are skipped, not fatal to the scan.
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    for header in headers.get_all(COOKIE) {
        let Ok(raw) = header.to_str() else {
            continue;
        };
        for pair in raw.split(';') {
            let mut parts = pair.trim().splitn(2, '=');
            if parts.next() == Some(name) {
                return parts.next().map(str::to_string);
            }
        }
    }
    None
}

/// Configured culture negotiation: defaults, supported sets, and the
/// ordered provider chain.
pub struct LocalizationPolicy {
    default_culture: String,
    default_ui_culture: String,
    supported_cultures: Vec<String>,
    supported_ui_cultures: Vec<String>,
    providers: Vec<Box<dyn CultureProvider>>,
}

impl LocalizationPolicy {
    /// Build the policy with the default provider chain (cookie only).
    #[must_use]
    pub fn from_config(config: &LocalizationConfig) -> Self {
        Self::with_providers(config, vec![Box::<CookieCultureProvider>::default()])
    }

    #[must_use]
    pub fn with_providers(
        config: &LocalizationConfig,
        providers: Vec<Box<dyn CultureProvider>>,
    ) -> Self {
        Self {
            default_culture: config.default_culture.clone(),
            default_ui_culture: config.default_ui_culture.clone(),
            supported_cultures: config.supported_cultures.clone(),
            supported_ui_cultures: config.supported_ui_cultures.clone(),
            providers,
        }
    }

    #[must_use]
    pub fn default_culture(&self) -> &str {
        &self.default_culture
    }

    #[must_use]
    pub fn default_ui_culture(&self) -> &str {
        &self.default_ui_culture
    }

    /// Resolve the request's cultures. Providers are consulted in
    /// order; an unsupported candidate is skipped rather than taken,
    /// and each half falls back to its default independently.
    #[must_use]
    pub fn resolve(&self, headers: &HeaderMap) -> ResolvedCulture {
        let mut culture: Option<&str> = None;
        let mut ui_culture: Option<&str> = None;

        for provider in &self.providers {
            let Some(candidates) = provider.candidates(headers) else {
                continue;
            };

            if culture.is_none() {
                if let Some(c) = candidates.culture.as_deref() {
                    culture = supported(&self.supported_cultures, c);
                }
            }
            if ui_culture.is_none() {
                if let Some(c) = candidates.ui_culture.as_deref() {
                    ui_culture = supported(&self.supported_ui_cultures, c);
                }
            }
            if culture.is_some() && ui_culture.is_some() {
                break;
            }
        }

        ResolvedCulture {
            culture: culture.unwrap_or(&self.default_culture).to_string(),
            ui_culture: ui_culture.unwrap_or(&self.default_ui_culture).to_string(),
        }
    }
}

/// Match a candidate against a supported set, returning the canonical
/// (configured) spelling on a case-insensitive hit.
fn supported<'a>(set: &'a [String], candidate: &str) -> Option<&'a str> {
    set.iter()
        .find(|s| s.eq_ignore_ascii_case(candidate))
        .map(String::as_str)
}

//! Hyperlink resolution: process-wide route templates plus a per-request routing context.
//!
//! The route table is built once at startup from the same path constants the router mounts.
//! The request context (scheme, host, optional path prefix) is extracted per request and
//! borrowed into a [`UrlResolver`] for the duration of one mapping call.

use crate::mapping::MappingError;
use crate::model::{Camp, Speaker};
use std::collections::HashMap;
use url::Url;

/// Action id of the single-camp endpoint.
pub const CAMP_GET: &str = "camp-get";
/// Action id of the single-speaker endpoint.
pub const SPEAKER_GET: &str = "speaker-get";

/// An entity that can be addressed by a route template.
pub trait ResourceLink {
    /// Route values keyed by template parameter name.
    fn route_values(&self) -> Vec<(&'static str, String)>;
}

impl ResourceLink for Camp {
    fn route_values(&self) -> Vec<(&'static str, String)> {
        vec![("moniker", self.moniker.clone())]
    }
}

impl ResourceLink for Speaker {
    fn route_values(&self) -> Vec<(&'static str, String)> {
        vec![
            ("moniker", self.camp.moniker.clone()),
            ("id", self.id.to_string()),
        ]
    }
}

/// Action id -> path template (axum syntax, e.g. `/api/camps/:moniker`).
#[derive(Clone, Debug, Default)]
pub struct RouteTable {
    templates: HashMap<String, String>,
}

impl RouteTable {
    pub fn new() -> Self {
        RouteTable {
            templates: HashMap::new(),
        }
    }

    pub fn register(mut self, action: &str, template: impl Into<String>) -> Self {
        self.templates.insert(action.to_string(), template.into());
        self
    }

    pub fn template(&self, action: &str) -> Option<&str> {
        self.templates.get(action).map(String::as_str)
    }
}

/// Routing data for the request currently being served.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestContext {
    base: Url,
}

impl RequestContext {
    /// Context from the scheme and `Host` value of an inbound request. Only `http` and
    /// `https` are accepted, and the host must be a bare authority with no path, query,
    /// fragment or credentials.
    pub fn new(scheme: &str, host: &str) -> Result<Self, MappingError> {
        let invalid = || MappingError::InvalidBaseUrl(format!("{}://{}", scheme, host));
        if !scheme.eq_ignore_ascii_case("http") && !scheme.eq_ignore_ascii_case("https") {
            return Err(invalid());
        }
        if host
            .chars()
            .any(|c| matches!(c, '/' | '\\' | '?' | '#' | '@') || c.is_whitespace())
        {
            return Err(invalid());
        }
        Self::from_base_url(&format!("{}://{}/", scheme, host))
    }

    /// Context from a configured public base URL, which may carry a path prefix.
    pub fn from_base_url(base: &str) -> Result<Self, MappingError> {
        let base = Url::parse(base).map_err(|_| MappingError::InvalidBaseUrl(base.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(MappingError::InvalidBaseUrl(base.to_string()));
        }
        Ok(RequestContext { base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }
}

/// Resolves canonical resource URLs. Built per request; cheap to construct.
#[derive(Clone, Copy, Debug)]
pub struct UrlResolver<'a> {
    routes: &'a RouteTable,
    context: Option<&'a RequestContext>,
}

impl<'a> UrlResolver<'a> {
    pub fn new(routes: &'a RouteTable, context: Option<&'a RequestContext>) -> Self {
        UrlResolver { routes, context }
    }

    /// A resolver with no request context; every `resolve` fails with `MissingContext`.
    pub fn detached(routes: &'a RouteTable) -> Self {
        UrlResolver { routes, context: None }
    }

    pub fn has_context(&self) -> bool {
        self.context.is_some()
    }

    /// Absolute URL of `entity` under the route registered for `action`.
    pub fn resolve<E: ResourceLink + ?Sized>(&self, entity: &E, action: &str) -> Result<String, MappingError> {
        let context = self.context.ok_or_else(|| MappingError::MissingContext {
            action: action.to_string(),
        })?;
        let template = self
            .routes
            .template(action)
            .ok_or_else(|| MappingError::UnknownRoute(action.to_string()))?;
        let values = entity.route_values();

        let mut url = context.base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| MappingError::InvalidBaseUrl(context.base.to_string()))?;
            segments.pop_if_empty();
            for part in template.split('/').filter(|p| !p.is_empty()) {
                match part.strip_prefix(':') {
                    Some(param) => {
                        let value = values
                            .iter()
                            .find(|(name, _)| *name == param)
                            .map(|(_, v)| v.as_str())
                            .ok_or_else(|| MappingError::MissingRouteValue {
                                action: action.to_string(),
                                param: param.to_string(),
                            })?;
                        segments.push(value);
                    }
                    None => {
                        segments.push(part);
                    }
                }
            }
        }
        url.set_query(None);
        url.set_fragment(None);
        Ok(url.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CampRef, Location, SpeakerProfile};
    use chrono::NaiveDate;

    fn routes() -> RouteTable {
        RouteTable::new()
            .register(CAMP_GET, "/api/camps/:moniker")
            .register(SPEAKER_GET, "/api/camps/:moniker/speakers/:id")
    }

    fn camp(id: i64, moniker: &str) -> Camp {
        Camp {
            id,
            moniker: moniker.into(),
            name: "Architecture Camp".into(),
            event_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            length: 3,
            description: "Three days of software architecture talks".into(),
            location: Location::default(),
            speakers: None,
        }
    }

    #[test]
    fn camp_url_uses_moniker_not_id() {
        let routes = routes();
        let ctx = RequestContext::new("http", "localhost:3000").unwrap();
        let resolver = UrlResolver::new(&routes, Some(&ctx));
        let url = resolver.resolve(&camp(42, "ARC2024"), CAMP_GET).unwrap();
        assert_eq!(url, "http://localhost:3000/api/camps/ARC2024");
        assert!(!url.contains("42"));
    }

    #[test]
    fn speaker_url_uses_camp_moniker_and_speaker_id() {
        let routes = routes();
        let ctx = RequestContext::new("https", "camps.example.com").unwrap();
        let resolver = UrlResolver::new(&routes, Some(&ctx));
        let speaker = Speaker {
            id: 7,
            camp: CampRef {
                id: 42,
                moniker: "ARC2024".into(),
            },
            profile: SpeakerProfile {
                name: "Ada".into(),
                ..Default::default()
            },
        };
        let url = resolver.resolve(&speaker, SPEAKER_GET).unwrap();
        assert_eq!(url, "https://camps.example.com/api/camps/ARC2024/speakers/7");
    }

    #[test]
    fn base_url_prefix_is_kept() {
        let routes = routes();
        let ctx = RequestContext::from_base_url("https://gateway.example.com/events/").unwrap();
        let url = UrlResolver::new(&routes, Some(&ctx))
            .resolve(&camp(1, "ARC2024"), CAMP_GET)
            .unwrap();
        assert_eq!(url, "https://gateway.example.com/events/api/camps/ARC2024");
    }

    #[test]
    fn route_values_are_percent_encoded() {
        let routes = routes();
        let ctx = RequestContext::new("http", "localhost").unwrap();
        let url = UrlResolver::new(&routes, Some(&ctx))
            .resolve(&camp(1, "a b/c"), CAMP_GET)
            .unwrap();
        assert_eq!(url, "http://localhost/api/camps/a%20b%2Fc");
    }

    #[test]
    fn detached_resolver_reports_missing_context() {
        let routes = routes();
        let err = UrlResolver::detached(&routes)
            .resolve(&camp(1, "ARC2024"), CAMP_GET)
            .unwrap_err();
        assert_eq!(
            err,
            MappingError::MissingContext {
                action: CAMP_GET.into()
            }
        );
    }

    #[test]
    fn unregistered_action_is_an_error() {
        let routes = routes();
        let ctx = RequestContext::new("http", "localhost").unwrap();
        let err = UrlResolver::new(&routes, Some(&ctx))
            .resolve(&camp(1, "ARC2024"), "camp-delete")
            .unwrap_err();
        assert_eq!(err, MappingError::UnknownRoute("camp-delete".into()));
    }

    #[test]
    fn template_parameter_without_value_is_an_error() {
        let routes = RouteTable::new().register(CAMP_GET, "/api/camps/:slug");
        let ctx = RequestContext::new("http", "localhost").unwrap();
        let err = UrlResolver::new(&routes, Some(&ctx))
            .resolve(&camp(1, "ARC2024"), CAMP_GET)
            .unwrap_err();
        assert!(matches!(err, MappingError::MissingRouteValue { ref param, .. } if param == "slug"));
    }

    #[test]
    fn malformed_host_is_rejected() {
        assert!(RequestContext::new("http", "bad host").is_err());
        assert!(RequestContext::from_base_url("mailto:someone@example.com").is_err());
    }

    #[test]
    fn request_context_accepts_only_web_schemes_and_bare_hosts() {
        assert!(RequestContext::new("HTTPS", "camps.example.com").is_ok());
        assert!(RequestContext::new("javascript", "camps.example.com").is_err());
        assert!(RequestContext::new("ftp", "camps.example.com").is_err());
        assert!(RequestContext::new("http", "evil.example.com/phish").is_err());
        assert!(RequestContext::new("http", "user@camps.example.com").is_err());
        assert!(RequestContext::new("http", "camps.example.com?x=1").is_err());
    }
}

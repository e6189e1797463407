//! Extract the routing context (scheme + host) used to build absolute resource links.

use crate::mapping::RequestContext;
use crate::state::AppState;
use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};

pub const FORWARDED_HOST_HEADER: &str = "X-Forwarded-Host";
pub const FORWARDED_PROTO_HEADER: &str = "X-Forwarded-Proto";

/// Routing context for the current request, or `None` when the request carries no usable host.
/// A configured public base URL always wins over request headers. The forwarded headers are
/// taken at face value, so set `PUBLIC_BASE_URL` when clients can reach the service without
/// going through a trusted proxy.
#[derive(Clone, Debug)]
pub struct RoutingContext(pub Option<RequestContext>);

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.split(',').next().unwrap_or("").trim())
        .filter(|s| !s.is_empty())
}

fn is_web_scheme(scheme: &str) -> bool {
    scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https")
}

fn from_parts(parts: &Parts) -> Option<RequestContext> {
    let scheme = header(&parts.headers, FORWARDED_PROTO_HEADER)
        .filter(|s| is_web_scheme(s))
        .or_else(|| parts.uri.scheme_str())
        .unwrap_or("http");
    let candidates = [
        header(&parts.headers, FORWARDED_HOST_HEADER),
        header(&parts.headers, axum::http::header::HOST.as_str()),
        parts.uri.authority().map(|a| a.as_str()),
    ];
    for host in candidates.into_iter().flatten() {
        match RequestContext::new(scheme, host) {
            Ok(ctx) => return Some(ctx),
            Err(e) => tracing::warn!(host, scheme, error = %e, "unusable host for link generation"),
        }
    }
    None
}

#[async_trait]
impl FromRequestParts<AppState> for RoutingContext {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(base) = &state.public_base {
            return Ok(RoutingContext(Some(base.as_ref().clone())));
        }
        Ok(RoutingContext(from_parts(parts)))
    }
}

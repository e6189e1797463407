//! Entity <-> wire model mapping and resource link resolution.

mod links;
mod profile;

pub use links::{RequestContext, ResourceLink, RouteTable, UrlResolver, CAMP_GET, SPEAKER_GET};
pub use profile::{end_date, length_between, CampMapper};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MappingError {
    #[error("no request context available to resolve '{action}'")]
    MissingContext { action: String },
    #[error("no route registered for action '{0}'")]
    UnknownRoute(String),
    #[error("route for '{action}' needs a value for '{param}'")]
    MissingRouteValue { action: String, param: String },
    #[error("invalid base url '{0}'")]
    InvalidBaseUrl(String),
}

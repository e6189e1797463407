//! Request extractors.

pub mod routing;

pub use routing::RoutingContext;

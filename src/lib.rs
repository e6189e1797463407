//! Camp API: REST service for code camps and their speakers.
//!
//! Entities are stored through a [`CampRepository`]; handlers expose them as wire models
//! built by the [`CampMapper`], which also produces each resource's canonical URL.

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod mapping;
pub mod model;
pub mod repository;
pub mod response;
pub mod routes;
pub mod seed;
pub mod service;
pub mod state;

pub use config::{AppConfig, StorageBackend};
pub use error::{AppError, ConfigError};
pub use mapping::{CampMapper, MappingError, RequestContext, UrlResolver};
pub use repository::{
    ensure_database_exists, CampRepository, InMemoryCampRepository, PgCampRepository, RepositoryError,
};
pub use response::error_body;
pub use routes::{app, camp_routes, common_routes, route_table};
pub use seed::seed_sample_data;
pub use state::AppState;

//! Shared application state for all routes. Everything here is immutable after startup.

use crate::mapping::{CampMapper, RequestContext};
use crate::repository::CampRepository;
use crate::routes::route_table;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn CampRepository>,
    /// Process-wide mapping profile, including the route table used for links.
    pub mapper: Arc<CampMapper>,
    /// When set, links use this base instead of the request's own scheme and host.
    pub public_base: Option<Arc<RequestContext>>,
}

impl AppState {
    pub fn new(repo: Arc<dyn CampRepository>) -> Self {
        AppState {
            repo,
            mapper: Arc::new(CampMapper::new(route_table())),
            public_base: None,
        }
    }

    pub fn with_public_base(mut self, base: RequestContext) -> Self {
        self.public_base = Some(Arc::new(base));
        self
    }
}

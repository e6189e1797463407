//! Data access for camps and speakers.
//!
//! Handlers only see the [`CampRepository`] trait. Each write method is one unit of work:
//! it either persists completely or not at all.

mod memory;
mod postgres;

pub use memory::InMemoryCampRepository;
pub use postgres::{ensure_database_exists, PgCampRepository};

use crate::model::{Camp, CampRef, Speaker, SpeakerProfile};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("moniker '{key}' is already in use")]
    Duplicate { key: String },
    #[error("record no longer exists: {0}")]
    Missing(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait CampRepository: Send + Sync {
    /// Cheap liveness check for readiness probes.
    async fn ping(&self) -> Result<(), RepositoryError>;

    /// Every camp, ordered by event date, without speakers.
    async fn all_camps(&self) -> Result<Vec<Camp>, RepositoryError>;

    async fn camp_by_moniker(
        &self,
        moniker: &str,
        include_speakers: bool,
    ) -> Result<Option<Camp>, RepositoryError>;

    /// Store a new camp and return it with its assigned id.
    async fn add_camp(&self, camp: Camp) -> Result<Camp, RepositoryError>;

    /// Persist the scalar fields and location of an existing camp. Speakers are not touched.
    async fn update_camp(&self, camp: &Camp) -> Result<Camp, RepositoryError>;

    /// Remove a camp and its speakers. Returns false when no such camp exists.
    async fn delete_camp(&self, id: i64) -> Result<bool, RepositoryError>;

    /// Speakers of the camp with this moniker; empty when the camp does not exist.
    async fn speakers_by_moniker(&self, moniker: &str) -> Result<Vec<Speaker>, RepositoryError>;

    async fn speaker(&self, id: i64) -> Result<Option<Speaker>, RepositoryError>;

    async fn add_speaker(&self, camp: &CampRef, profile: SpeakerProfile) -> Result<Speaker, RepositoryError>;

    /// Persist the profile of an existing speaker. The owning camp never changes.
    async fn update_speaker(&self, speaker: &Speaker) -> Result<Speaker, RepositoryError>;

    async fn delete_speaker(&self, id: i64) -> Result<bool, RepositoryError>;
}

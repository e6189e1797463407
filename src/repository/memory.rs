//! In-memory repository. Used by tests and when no DATABASE_URL is configured.

use crate::model::{Camp, CampRef, Speaker, SpeakerProfile};
use crate::repository::{CampRepository, RepositoryError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
struct Tables {
    /// Stored without speakers; they live in `speakers`.
    camps: BTreeMap<i64, Camp>,
    /// speaker id -> (camp id, profile)
    speakers: BTreeMap<i64, (i64, SpeakerProfile)>,
    next_camp_id: i64,
    next_speaker_id: i64,
}

impl Tables {
    fn moniker_taken(&self, moniker: &str, except_id: i64) -> bool {
        self.camps
            .values()
            .any(|c| c.id != except_id && c.moniker == moniker)
    }

    fn speaker(&self, id: i64) -> Option<Speaker> {
        let (camp_id, profile) = self.speakers.get(&id)?;
        let camp = self.camps.get(camp_id)?;
        Some(Speaker {
            id,
            camp: camp.camp_ref(),
            profile: profile.clone(),
        })
    }

    fn speakers_of(&self, camp: &Camp) -> Vec<Speaker> {
        self.speakers
            .iter()
            .filter(|(_, (camp_id, _))| *camp_id == camp.id)
            .map(|(id, (_, profile))| Speaker {
                id: *id,
                camp: camp.camp_ref(),
                profile: profile.clone(),
            })
            .collect()
    }
}

/// Thread-safe in-memory store guarded by one RwLock.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCampRepository {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryCampRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, RepositoryError> {
        self.tables
            .read()
            .map_err(|_| RepositoryError::Unavailable("failed to acquire read lock".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, RepositoryError> {
        self.tables
            .write()
            .map_err(|_| RepositoryError::Unavailable("failed to acquire write lock".into()))
    }
}

#[async_trait]
impl CampRepository for InMemoryCampRepository {
    async fn ping(&self) -> Result<(), RepositoryError> {
        self.read().map(|_| ())
    }

    async fn all_camps(&self) -> Result<Vec<Camp>, RepositoryError> {
        let tables = self.read()?;
        let mut camps: Vec<Camp> = tables.camps.values().cloned().collect();
        camps.sort_by(|a, b| a.event_date.cmp(&b.event_date).then(a.id.cmp(&b.id)));
        Ok(camps)
    }

    async fn camp_by_moniker(
        &self,
        moniker: &str,
        include_speakers: bool,
    ) -> Result<Option<Camp>, RepositoryError> {
        let tables = self.read()?;
        let Some(camp) = tables.camps.values().find(|c| c.moniker == moniker) else {
            return Ok(None);
        };
        let mut camp = camp.clone();
        if include_speakers {
            camp.speakers = Some(tables.speakers_of(&camp));
        }
        Ok(Some(camp))
    }

    async fn add_camp(&self, mut camp: Camp) -> Result<Camp, RepositoryError> {
        let mut tables = self.write()?;
        if tables.moniker_taken(&camp.moniker, 0) {
            return Err(RepositoryError::Duplicate { key: camp.moniker });
        }
        tables.next_camp_id += 1;
        camp.id = tables.next_camp_id;
        camp.speakers = None;
        tables.camps.insert(camp.id, camp.clone());
        Ok(camp)
    }

    async fn update_camp(&self, camp: &Camp) -> Result<Camp, RepositoryError> {
        let mut tables = self.write()?;
        if tables.moniker_taken(&camp.moniker, camp.id) {
            return Err(RepositoryError::Duplicate {
                key: camp.moniker.clone(),
            });
        }
        let stored = tables
            .camps
            .get_mut(&camp.id)
            .ok_or_else(|| RepositoryError::Missing(format!("camp #{}", camp.id)))?;
        let speakers = stored.speakers.take();
        *stored = Camp {
            speakers,
            ..camp.clone()
        };
        let mut out = stored.clone();
        out.speakers = camp.speakers.clone();
        Ok(out)
    }

    async fn delete_camp(&self, id: i64) -> Result<bool, RepositoryError> {
        let mut tables = self.write()?;
        if tables.camps.remove(&id).is_none() {
            return Ok(false);
        }
        tables.speakers.retain(|_, (camp_id, _)| *camp_id != id);
        Ok(true)
    }

    async fn speakers_by_moniker(&self, moniker: &str) -> Result<Vec<Speaker>, RepositoryError> {
        let tables = self.read()?;
        Ok(tables
            .camps
            .values()
            .find(|c| c.moniker == moniker)
            .map(|camp| tables.speakers_of(camp))
            .unwrap_or_default())
    }

    async fn speaker(&self, id: i64) -> Result<Option<Speaker>, RepositoryError> {
        Ok(self.read()?.speaker(id))
    }

    async fn add_speaker(&self, camp: &CampRef, profile: SpeakerProfile) -> Result<Speaker, RepositoryError> {
        let mut tables = self.write()?;
        if !tables.camps.contains_key(&camp.id) {
            return Err(RepositoryError::Missing(format!("camp #{}", camp.id)));
        }
        tables.next_speaker_id += 1;
        let id = tables.next_speaker_id;
        tables.speakers.insert(id, (camp.id, profile));
        tables
            .speaker(id)
            .ok_or_else(|| RepositoryError::Missing(format!("speaker #{}", id)))
    }

    async fn update_speaker(&self, speaker: &Speaker) -> Result<Speaker, RepositoryError> {
        let mut tables = self.write()?;
        let (_, profile) = tables
            .speakers
            .get_mut(&speaker.id)
            .ok_or_else(|| RepositoryError::Missing(format!("speaker #{}", speaker.id)))?;
        *profile = speaker.profile.clone();
        tables
            .speaker(speaker.id)
            .ok_or_else(|| RepositoryError::Missing(format!("speaker #{}", speaker.id)))
    }

    async fn delete_speaker(&self, id: i64) -> Result<bool, RepositoryError> {
        Ok(self.write()?.speakers.remove(&id).is_some())
    }
}

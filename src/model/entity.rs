//! Persisted domain entities. These never go over the wire directly; see `model::wire`.

use chrono::NaiveDate;

/// Embedded value object; every part is optional.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Location {
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub address3: Option<String>,
    pub city_town: Option<String>,
    pub state_province: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Camp {
    /// Surrogate key assigned by the repository. Zero until the camp is stored.
    pub id: i64,
    /// Public, unique key used in every external URL.
    pub moniker: String,
    pub name: String,
    pub event_date: NaiveDate,
    /// Duration in days, at least 1.
    pub length: i32,
    pub description: String,
    pub location: Location,
    /// `None` when the camp was loaded without its speakers.
    pub speakers: Option<Vec<Speaker>>,
}

impl Camp {
    pub fn camp_ref(&self) -> CampRef {
        CampRef {
            id: self.id,
            moniker: self.moniker.clone(),
        }
    }
}

/// Back-reference from a speaker to the camp that owns it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CampRef {
    pub id: i64,
    pub moniker: String,
}

/// Speaker fields that a client may edit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpeakerProfile {
    pub name: String,
    pub bio: Option<String>,
    pub company_name: Option<String>,
    pub phone_number: Option<String>,
    pub website_url: Option<String>,
    pub twitter_name: Option<String>,
    pub github_name: Option<String>,
    pub head_shot_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Speaker {
    pub id: i64,
    /// Fixed at creation.
    pub camp: CampRef,
    pub profile: SpeakerProfile,
}

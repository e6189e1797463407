//! Sample data for a fresh store.

use crate::model::{Camp, Location, SpeakerProfile};
use crate::repository::{CampRepository, RepositoryError};
use chrono::NaiveDate;

fn sample_camp() -> Camp {
    Camp {
        id: 0,
        moniker: "ATL2016".into(),
        name: "Atlanta Code Camp".into(),
        event_date: NaiveDate::from_ymd_opt(2016, 10, 1).unwrap_or(NaiveDate::MIN),
        length: 1,
        description: "This is the first code camp held in Atlanta for developers.".into(),
        location: Location {
            address1: Some("123 Main Street".into()),
            city_town: Some("Atlanta".into()),
            state_province: Some("GA".into()),
            postal_code: Some("30303".into()),
            country: Some("USA".into()),
            ..Location::default()
        },
        speakers: None,
    }
}

fn sample_speakers() -> Vec<SpeakerProfile> {
    vec![
        SpeakerProfile {
            name: "Shawn Wildermuth".into(),
            bio: Some("I'm a speaker".into()),
            company_name: Some("Wilder Minds LLC".into()),
            github_name: Some("shawnwildermuth".into()),
            twitter_name: Some("shawnwildermuth".into()),
            phone_number: Some("555-1212".into()),
            head_shot_url: Some("http://wilderminds.com/images/minds/shawnwildermuth.jpg".into()),
            website_url: Some("http://wildermuth.com".into()),
        },
        SpeakerProfile {
            name: "Resa Wildermuth".into(),
            bio: Some("I'm a speaker".into()),
            company_name: Some("Wilder Minds LLC".into()),
            github_name: Some("resawildermuth".into()),
            twitter_name: Some("resawildermuth".into()),
            phone_number: Some("555-1212".into()),
            head_shot_url: Some("http://wilderminds.com/images/minds/resawildermuth.jpg".into()),
            website_url: Some("http://wildermuth.com".into()),
        },
    ]
}

/// Insert one sample camp with two speakers when the store holds no camps.
/// Returns whether anything was written.
pub async fn seed_sample_data(repo: &dyn CampRepository) -> Result<bool, RepositoryError> {
    if !repo.all_camps().await?.is_empty() {
        tracing::debug!("store already has camps; skipping sample data");
        return Ok(false);
    }
    let camp = repo.add_camp(sample_camp()).await?;
    let owner = camp.camp_ref();
    for profile in sample_speakers() {
        repo.add_speaker(&owner, profile).await?;
    }
    tracing::info!(moniker = %camp.moniker, "inserted sample data");
    Ok(true)
}

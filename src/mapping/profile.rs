//! The camp mapping profile: one immutable instance per process, shared by every request.

use crate::mapping::links::{RequestContext, RouteTable, UrlResolver, CAMP_GET, SPEAKER_GET};
use crate::mapping::MappingError;
use crate::model::{Camp, CampModel, Location, Speaker, SpeakerModel, SpeakerProfile};
use chrono::{Datelike, Duration, NaiveDate};

/// Last day of an event that starts on `start` and runs for `length` days.
/// `None` when that day falls outside the `YYYY-MM-DD` range.
pub fn end_date(start: NaiveDate, length: i32) -> Option<NaiveDate> {
    let extra_days = i64::from(length.max(1)) - 1;
    start
        .checked_add_signed(Duration::try_days(extra_days)?)
        .filter(|end| (0..=9999).contains(&end.year()))
}

/// Inclusive day count from `start` to `end`, never less than 1.
pub fn length_between(start: NaiveDate, end: NaiveDate) -> i32 {
    let days = (end - start).num_days() + 1;
    i32::try_from(days.max(1)).unwrap_or(i32::MAX)
}

fn overlay<T: Clone>(target: &mut T, value: &Option<T>) {
    if let Some(v) = value {
        *target = v.clone();
    }
}

fn overlay_opt<T: Clone>(target: &mut Option<T>, value: &Option<T>) {
    if value.is_some() {
        *target = value.clone();
    }
}

#[derive(Clone, Debug)]
pub struct CampMapper {
    routes: RouteTable,
}

impl CampMapper {
    pub fn new(routes: RouteTable) -> Self {
        CampMapper { routes }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Resolver bound to the given request context (or detached when there is none).
    pub fn resolver<'a>(&'a self, context: Option<&'a RequestContext>) -> UrlResolver<'a> {
        UrlResolver::new(&self.routes, context)
    }

    pub fn camp_to_model(&self, camp: &Camp, links: &UrlResolver<'_>) -> Result<CampModel, MappingError> {
        let mut model = self.camp_fields(camp);
        model.url = Some(links.resolve(camp, CAMP_GET)?);
        if let Some(speakers) = &camp.speakers {
            model.speakers = Some(self.speakers_to_models(speakers, links)?);
        }
        Ok(model)
    }

    /// Same as `camp_to_model` but without links, for use outside a request.
    pub fn camp_to_model_unlinked(&self, camp: &Camp) -> CampModel {
        let mut model = self.camp_fields(camp);
        if let Some(speakers) = &camp.speakers {
            model.speakers = Some(speakers.iter().map(|s| self.speaker_fields(s)).collect());
        }
        model
    }

    pub fn camps_to_models(&self, camps: &[Camp], links: &UrlResolver<'_>) -> Result<Vec<CampModel>, MappingError> {
        camps.iter().map(|c| self.camp_to_model(c, links)).collect()
    }

    fn camp_fields(&self, camp: &Camp) -> CampModel {
        let loc = &camp.location;
        CampModel {
            url: None,
            moniker: Some(camp.moniker.clone()),
            name: Some(camp.name.clone()),
            start_date: Some(camp.event_date),
            end_date: end_date(camp.event_date, camp.length),
            length: Some(camp.length),
            description: Some(camp.description.clone()),
            location_address1: loc.address1.clone(),
            location_address2: loc.address2.clone(),
            location_address3: loc.address3.clone(),
            location_city_town: loc.city_town.clone(),
            location_state_province: loc.state_province.clone(),
            location_postal_code: loc.postal_code.clone(),
            location_country: loc.country.clone(),
            speakers: None,
        }
    }

    /// New, unsaved camp from a create body. `url` and `speakers` are ignored.
    pub fn model_to_camp(&self, model: &CampModel) -> Camp {
        let event_date = model.start_date.unwrap_or_default();
        let length = match (model.start_date, model.end_date, model.length) {
            (Some(start), Some(end), _) => length_between(start, end),
            (_, None, Some(length)) => length.max(1),
            _ => 1,
        };
        Camp {
            id: 0,
            moniker: model.moniker.clone().unwrap_or_default(),
            name: model.name.clone().unwrap_or_default(),
            event_date,
            length,
            description: model.description.clone().unwrap_or_default(),
            location: Location {
                address1: model.location_address1.clone(),
                address2: model.location_address2.clone(),
                address3: model.location_address3.clone(),
                city_town: model.location_city_town.clone(),
                state_province: model.location_state_province.clone(),
                postal_code: model.location_postal_code.clone(),
                country: model.location_country.clone(),
            },
            speakers: None,
        }
    }

    /// Copy the fields present in `model` onto `camp`. Id and speakers are left alone.
    pub fn merge_camp(&self, model: &CampModel, camp: &mut Camp) {
        overlay(&mut camp.moniker, &model.moniker);
        overlay(&mut camp.name, &model.name);
        overlay(&mut camp.description, &model.description);

        match (model.start_date, model.end_date) {
            (Some(start), Some(end)) => {
                camp.event_date = start;
                camp.length = length_between(start, end);
            }
            (Some(start), None) => {
                camp.event_date = start;
                if let Some(length) = model.length {
                    camp.length = length.max(1);
                }
            }
            (None, Some(end)) => camp.length = length_between(camp.event_date, end),
            (None, None) => {
                if let Some(length) = model.length {
                    camp.length = length.max(1);
                }
            }
        }

        let loc = &mut camp.location;
        overlay_opt(&mut loc.address1, &model.location_address1);
        overlay_opt(&mut loc.address2, &model.location_address2);
        overlay_opt(&mut loc.address3, &model.location_address3);
        overlay_opt(&mut loc.city_town, &model.location_city_town);
        overlay_opt(&mut loc.state_province, &model.location_state_province);
        overlay_opt(&mut loc.postal_code, &model.location_postal_code);
        overlay_opt(&mut loc.country, &model.location_country);
    }

    pub fn speaker_to_model(&self, speaker: &Speaker, links: &UrlResolver<'_>) -> Result<SpeakerModel, MappingError> {
        let mut model = self.speaker_fields(speaker);
        model.url = Some(links.resolve(speaker, SPEAKER_GET)?);
        Ok(model)
    }

    pub fn speaker_to_model_unlinked(&self, speaker: &Speaker) -> SpeakerModel {
        self.speaker_fields(speaker)
    }

    pub fn speakers_to_models(
        &self,
        speakers: &[Speaker],
        links: &UrlResolver<'_>,
    ) -> Result<Vec<SpeakerModel>, MappingError> {
        speakers.iter().map(|s| self.speaker_to_model(s, links)).collect()
    }

    fn speaker_fields(&self, speaker: &Speaker) -> SpeakerModel {
        let p = &speaker.profile;
        SpeakerModel {
            url: None,
            id: Some(speaker.id),
            name: Some(p.name.clone()),
            bio: p.bio.clone(),
            company_name: p.company_name.clone(),
            phone_number: p.phone_number.clone(),
            website_url: p.website_url.clone(),
            twitter_name: p.twitter_name.clone(),
            github_name: p.github_name.clone(),
            head_shot_url: p.head_shot_url.clone(),
        }
    }

    /// Editable speaker fields from a create body. The owning camp is attached by the caller.
    pub fn model_to_speaker_profile(&self, model: &SpeakerModel) -> SpeakerProfile {
        SpeakerProfile {
            name: model.name.clone().unwrap_or_default(),
            bio: model.bio.clone(),
            company_name: model.company_name.clone(),
            phone_number: model.phone_number.clone(),
            website_url: model.website_url.clone(),
            twitter_name: model.twitter_name.clone(),
            github_name: model.github_name.clone(),
            head_shot_url: model.head_shot_url.clone(),
        }
    }

    /// Copy the fields present in `model` onto `speaker`. Id and camp are left alone.
    pub fn merge_speaker(&self, model: &SpeakerModel, speaker: &mut Speaker) {
        let p = &mut speaker.profile;
        overlay(&mut p.name, &model.name);
        overlay_opt(&mut p.bio, &model.bio);
        overlay_opt(&mut p.company_name, &model.company_name);
        overlay_opt(&mut p.phone_number, &model.phone_number);
        overlay_opt(&mut p.website_url, &model.website_url);
        overlay_opt(&mut p.twitter_name, &model.twitter_name);
        overlay_opt(&mut p.github_name, &model.github_name);
        overlay_opt(&mut p.head_shot_url, &model.head_shot_url);
    }
}

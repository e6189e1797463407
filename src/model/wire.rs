//! Wire models (camelCase JSON). Built fresh for every response and never stored.
//!
//! Every field is optional so the same type serves as create body, update overlay and response.
//! Responses always carry the scalar fields; `url` and `speakers` are omitted when not resolved.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CampModel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub moniker: Option<String>,
    pub name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub length: Option<i32>,
    pub description: Option<String>,
    pub location_address1: Option<String>,
    pub location_address2: Option<String>,
    pub location_address3: Option<String>,
    pub location_city_town: Option<String>,
    pub location_state_province: Option<String>,
    pub location_postal_code: Option<String>,
    pub location_country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speakers: Option<Vec<SpeakerModel>>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpeakerModel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub company_name: Option<String>,
    pub phone_number: Option<String>,
    pub website_url: Option<String>,
    pub twitter_name: Option<String>,
    #[serde(rename = "gitHubName")]
    pub github_name: Option<String>,
    pub head_shot_url: Option<String>,
}

//! PostgreSQL repository. Tables live in a schema chosen by configuration (default `camp`).

use crate::model::{Camp, CampRef, Location, Speaker, SpeakerProfile};
use crate::repository::{CampRepository, RepositoryError};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{ConnectOptions, PgPool};
use std::str::FromStr;

const UNIQUE_VIOLATION: &str = "23505";

#[derive(sqlx::FromRow)]
struct CampRow {
    id: i64,
    moniker: String,
    name: String,
    event_date: NaiveDate,
    length: i32,
    description: String,
    location_address1: Option<String>,
    location_address2: Option<String>,
    location_address3: Option<String>,
    location_city_town: Option<String>,
    location_state_province: Option<String>,
    location_postal_code: Option<String>,
    location_country: Option<String>,
}

impl From<CampRow> for Camp {
    fn from(r: CampRow) -> Self {
        Camp {
            id: r.id,
            moniker: r.moniker,
            name: r.name,
            event_date: r.event_date,
            length: r.length,
            description: r.description,
            location: Location {
                address1: r.location_address1,
                address2: r.location_address2,
                address3: r.location_address3,
                city_town: r.location_city_town,
                state_province: r.location_state_province,
                postal_code: r.location_postal_code,
                country: r.location_country,
            },
            speakers: None,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SpeakerRow {
    id: i64,
    camp_id: i64,
    camp_moniker: String,
    name: String,
    bio: Option<String>,
    company_name: Option<String>,
    phone_number: Option<String>,
    website_url: Option<String>,
    twitter_name: Option<String>,
    github_name: Option<String>,
    head_shot_url: Option<String>,
}

impl From<SpeakerRow> for Speaker {
    fn from(r: SpeakerRow) -> Self {
        Speaker {
            id: r.id,
            camp: CampRef {
                id: r.camp_id,
                moniker: r.camp_moniker,
            },
            profile: SpeakerProfile {
                name: r.name,
                bio: r.bio,
                company_name: r.company_name,
                phone_number: r.phone_number,
                website_url: r.website_url,
                twitter_name: r.twitter_name,
                github_name: r.github_name,
                head_shot_url: r.head_shot_url,
            },
        }
    }
}

const CAMP_COLUMNS: &str = "id, moniker, name, event_date, length, description, \
    location_address1, location_address2, location_address3, location_city_town, \
    location_state_province, location_postal_code, location_country";

/// Map a unique-constraint violation on the moniker to `Duplicate`.
fn map_write_error(e: sqlx::Error, moniker: &str) -> RepositoryError {
    let is_unique = e
        .as_database_error()
        .and_then(|d| d.code())
        .map(|c| c == UNIQUE_VIOLATION)
        .unwrap_or(false);
    if is_unique {
        RepositoryError::Duplicate {
            key: moniker.to_string(),
        }
    } else {
        RepositoryError::Db(e)
    }
}

#[derive(Clone)]
pub struct PgCampRepository {
    pool: PgPool,
    camps: String,
    speakers: String,
}

impl PgCampRepository {
    /// `schema` must already be a valid identifier (see `AppConfig`).
    pub fn new(pool: PgPool, schema: &str) -> Self {
        PgCampRepository {
            pool,
            camps: format!("{}.camps", schema),
            speakers: format!("{}.speakers", schema),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the schema and tables if they do not exist. Idempotent.
    pub async fn ensure_tables(&self, schema: &str) -> Result<(), RepositoryError> {
        sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {}", schema))
            .execute(&self.pool)
            .await?;
        let camps_ddl = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id BIGSERIAL PRIMARY KEY,
                moniker TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                event_date DATE NOT NULL,
                length INTEGER NOT NULL CHECK (length >= 1),
                description TEXT NOT NULL,
                location_address1 TEXT,
                location_address2 TEXT,
                location_address3 TEXT,
                location_city_town TEXT,
                location_state_province TEXT,
                location_postal_code TEXT,
                location_country TEXT
            )
            "#,
            self.camps
        );
        sqlx::query(&camps_ddl).execute(&self.pool).await?;
        let speakers_ddl = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id BIGSERIAL PRIMARY KEY,
                camp_id BIGINT NOT NULL REFERENCES {}(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                bio TEXT,
                company_name TEXT,
                phone_number TEXT,
                website_url TEXT,
                twitter_name TEXT,
                github_name TEXT,
                head_shot_url TEXT
            )
            "#,
            self.speakers, self.camps
        );
        sqlx::query(&speakers_ddl).execute(&self.pool).await?;
        sqlx::query(&format!(
            "CREATE INDEX IF NOT EXISTS speakers_camp_id_idx ON {} (camp_id)",
            self.speakers
        ))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    fn speaker_select(&self) -> String {
        format!(
            "SELECT s.id, s.camp_id, c.moniker AS camp_moniker, s.name, s.bio, s.company_name, \
             s.phone_number, s.website_url, s.twitter_name, s.github_name, s.head_shot_url \
             FROM {} s JOIN {} c ON c.id = s.camp_id",
            self.speakers, self.camps
        )
    }

    async fn fetch_speaker(&self, id: i64) -> Result<Option<Speaker>, RepositoryError> {
        let sql = format!("{} WHERE s.id = $1", self.speaker_select());
        tracing::debug!(sql = %sql, id, "query");
        let row: Option<SpeakerRow> = sqlx::query_as(&sql).bind(id).fetch_optional(&self.pool).await?;
        Ok(row.map(Speaker::from))
    }
}

#[async_trait]
impl CampRepository for PgCampRepository {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }

    async fn all_camps(&self) -> Result<Vec<Camp>, RepositoryError> {
        let sql = format!("SELECT {} FROM {} ORDER BY event_date, id", CAMP_COLUMNS, self.camps);
        tracing::debug!(sql = %sql, "query");
        let rows: Vec<CampRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Camp::from).collect())
    }

    async fn camp_by_moniker(
        &self,
        moniker: &str,
        include_speakers: bool,
    ) -> Result<Option<Camp>, RepositoryError> {
        let sql = format!("SELECT {} FROM {} WHERE moniker = $1", CAMP_COLUMNS, self.camps);
        tracing::debug!(sql = %sql, moniker, "query");
        let row: Option<CampRow> = sqlx::query_as(&sql)
            .bind(moniker)
            .fetch_optional(&self.pool)
            .await?;
        let Some(mut camp) = row.map(Camp::from) else {
            return Ok(None);
        };
        if include_speakers {
            camp.speakers = Some(self.speakers_by_moniker(moniker).await?);
        }
        Ok(Some(camp))
    }

    async fn add_camp(&self, camp: Camp) -> Result<Camp, RepositoryError> {
        let sql = format!(
            "INSERT INTO {} (moniker, name, event_date, length, description, \
             location_address1, location_address2, location_address3, location_city_town, \
             location_state_province, location_postal_code, location_country) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) RETURNING {}",
            self.camps, CAMP_COLUMNS
        );
        tracing::debug!(sql = %sql, moniker = %camp.moniker, "query (tx)");
        let mut tx = self.pool.begin().await?;
        let loc = &camp.location;
        let row: CampRow = sqlx::query_as(&sql)
            .bind(&camp.moniker)
            .bind(&camp.name)
            .bind(camp.event_date)
            .bind(camp.length)
            .bind(&camp.description)
            .bind(&loc.address1)
            .bind(&loc.address2)
            .bind(&loc.address3)
            .bind(&loc.city_town)
            .bind(&loc.state_province)
            .bind(&loc.postal_code)
            .bind(&loc.country)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_write_error(e, &camp.moniker))?;
        tx.commit().await?;
        Ok(row.into())
    }

    async fn update_camp(&self, camp: &Camp) -> Result<Camp, RepositoryError> {
        let sql = format!(
            "UPDATE {} SET moniker = $2, name = $3, event_date = $4, length = $5, description = $6, \
             location_address1 = $7, location_address2 = $8, location_address3 = $9, \
             location_city_town = $10, location_state_province = $11, location_postal_code = $12, \
             location_country = $13 WHERE id = $1 RETURNING {}",
            self.camps, CAMP_COLUMNS
        );
        tracing::debug!(sql = %sql, id = camp.id, "query (tx)");
        let mut tx = self.pool.begin().await?;
        let loc = &camp.location;
        let row: Option<CampRow> = sqlx::query_as(&sql)
            .bind(camp.id)
            .bind(&camp.moniker)
            .bind(&camp.name)
            .bind(camp.event_date)
            .bind(camp.length)
            .bind(&camp.description)
            .bind(&loc.address1)
            .bind(&loc.address2)
            .bind(&loc.address3)
            .bind(&loc.city_town)
            .bind(&loc.state_province)
            .bind(&loc.postal_code)
            .bind(&loc.country)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_write_error(e, &camp.moniker))?;
        let row = row.ok_or_else(|| RepositoryError::Missing(format!("camp #{}", camp.id)))?;
        tx.commit().await?;
        let mut updated = Camp::from(row);
        updated.speakers = camp.speakers.clone();
        Ok(updated)
    }

    async fn delete_camp(&self, id: i64) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(&format!("DELETE FROM {} WHERE camp_id = $1", self.speakers))
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", self.camps))
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn speakers_by_moniker(&self, moniker: &str) -> Result<Vec<Speaker>, RepositoryError> {
        let sql = format!("{} WHERE c.moniker = $1 ORDER BY s.id", self.speaker_select());
        tracing::debug!(sql = %sql, moniker, "query");
        let rows: Vec<SpeakerRow> = sqlx::query_as(&sql).bind(moniker).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Speaker::from).collect())
    }

    async fn speaker(&self, id: i64) -> Result<Option<Speaker>, RepositoryError> {
        self.fetch_speaker(id).await
    }

    async fn add_speaker(&self, camp: &CampRef, profile: SpeakerProfile) -> Result<Speaker, RepositoryError> {
        let sql = format!(
            "INSERT INTO {} (camp_id, name, bio, company_name, phone_number, website_url, \
             twitter_name, github_name, head_shot_url) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING id",
            self.speakers
        );
        tracing::debug!(sql = %sql, camp_id = camp.id, "query (tx)");
        let mut tx = self.pool.begin().await?;
        let id: i64 = sqlx::query_scalar(&sql)
            .bind(camp.id)
            .bind(&profile.name)
            .bind(&profile.bio)
            .bind(&profile.company_name)
            .bind(&profile.phone_number)
            .bind(&profile.website_url)
            .bind(&profile.twitter_name)
            .bind(&profile.github_name)
            .bind(&profile.head_shot_url)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(Speaker {
            id,
            camp: camp.clone(),
            profile,
        })
    }

    async fn update_speaker(&self, speaker: &Speaker) -> Result<Speaker, RepositoryError> {
        let sql = format!(
            "UPDATE {} SET name = $2, bio = $3, company_name = $4, phone_number = $5, \
             website_url = $6, twitter_name = $7, github_name = $8, head_shot_url = $9 \
             WHERE id = $1",
            self.speakers
        );
        tracing::debug!(sql = %sql, id = speaker.id, "query (tx)");
        let p = &speaker.profile;
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(&sql)
            .bind(speaker.id)
            .bind(&p.name)
            .bind(&p.bio)
            .bind(&p.company_name)
            .bind(&p.phone_number)
            .bind(&p.website_url)
            .bind(&p.twitter_name)
            .bind(&p.github_name)
            .bind(&p.head_shot_url)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::Missing(format!("speaker #{}", speaker.id)));
        }
        tx.commit().await?;
        self.fetch_speaker(speaker.id)
            .await?
            .ok_or_else(|| RepositoryError::Missing(format!("speaker #{}", speaker.id)))
    }

    async fn delete_speaker(&self, id: i64) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", self.speakers))
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Ensure the database in `database_url` exists; create it if not. Connects to the
/// default `postgres` database to run CREATE DATABASE. Call before creating the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), RepositoryError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

fn parse_db_name_from_url(url: &str) -> Result<(String, String), RepositoryError> {
    let path_start = url
        .rfind('/')
        .ok_or_else(|| RepositoryError::Unavailable("DATABASE_URL: no path".into()))?
        + 1;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let db_name = path_and_query.split('?').next().unwrap_or("").trim();
    let base = url.get(..path_start).unwrap_or(url);
    Ok((format!("{}postgres", base), db_name.to_string()))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

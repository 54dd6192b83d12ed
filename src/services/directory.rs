use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryOrder};
use serde::Serialize;

use crate::database::Database;
use crate::entities;
use crate::error::{BookingError, BookingResult, EntityKind};
use crate::services::genre::{GenreOwner, genres_on};
use crate::services::show::{ShowListing, count_upcoming, load_listings};

/// A venue or artist row annotated with its upcoming show count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryEntry {
    pub id: i64,
    pub name: String,
    pub num_upcoming_shows: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResults {
    pub count: usize,
    pub data: Vec<DirectoryEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CityVenues {
    pub city: String,
    pub state: String,
    pub venues: Vec<DirectoryEntry>,
}

/// Shows split around a reference time. Shows exactly at the reference time
/// belong to neither side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShowPartition<T> {
    pub past: Vec<T>,
    pub upcoming: Vec<T>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VenueDetail {
    pub id: i64,
    pub name: String,
    pub genres: Vec<String>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub phone: Option<String>,
    pub website_link: Option<String>,
    pub facebook_link: Option<String>,
    pub seeking_talent: bool,
    pub seeking_description: Option<String>,
    pub image_link: Option<String>,
    pub past_shows: Vec<ShowListing>,
    pub upcoming_shows: Vec<ShowListing>,
    pub past_shows_count: usize,
    pub upcoming_shows_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtistDetail {
    pub id: i64,
    pub name: String,
    pub genres: Vec<String>,
    pub city: String,
    pub state: String,
    pub phone: Option<String>,
    pub website_link: Option<String>,
    pub facebook_link: Option<String>,
    pub seeking_venue: bool,
    pub seeking_description: Option<String>,
    pub image_link: Option<String>,
    pub past_shows: Vec<ShowListing>,
    pub upcoming_shows: Vec<ShowListing>,
    pub past_shows_count: usize,
    pub upcoming_shows_count: usize,
}

pub fn partition_shows<T, F>(shows: Vec<T>, now: DateTime<Utc>, start_time: F) -> ShowPartition<T>
where
    F: Fn(&T) -> DateTime<Utc>,
{
    let mut partition = ShowPartition {
        past: Vec::new(),
        upcoming: Vec::new(),
    };
    for show in shows {
        let at = start_time(&show);
        if at < now {
            partition.past.push(show);
        } else if at > now {
            partition.upcoming.push(show);
        }
    }
    partition
}

/// Group venues by exact (city, state). Groups keep the order of their first
/// venue; venues keep their input order.
pub fn group_by_city(
    venues: Vec<entities::venue::Model>,
    upcoming: &HashMap<i64, usize>,
) -> Vec<CityVenues> {
    let mut groups: Vec<CityVenues> = Vec::new();
    let mut positions: HashMap<(String, String), usize> = HashMap::new();

    for venue in venues {
        let key = (venue.city.clone(), venue.state.clone());
        let position = *positions.entry(key).or_insert_with(|| {
            groups.push(CityVenues {
                city: venue.city.clone(),
                state: venue.state.clone(),
                venues: Vec::new(),
            });
            groups.len() - 1
        });

        groups[position].venues.push(DirectoryEntry {
            id: venue.id,
            name: venue.name,
            num_upcoming_shows: upcoming.get(&venue.id).copied().unwrap_or(0),
        });
    }
    groups
}

/// Keep rows whose name contains `term`, ignoring case across all of Unicode.
/// An empty term keeps every row; row order is preserved.
pub(crate) fn filter_by_name<T, F>(rows: Vec<T>, term: &str, name: F) -> Vec<T>
where
    F: Fn(&T) -> &str,
{
    if term.is_empty() {
        return rows;
    }

    let needle = term.to_lowercase();
    rows.into_iter()
        .filter(|row| name(row).to_lowercase().contains(&needle))
        .collect()
}

pub(crate) fn search_results(entries: Vec<DirectoryEntry>) -> SearchResults {
    SearchResults {
        count: entries.len(),
        data: entries,
    }
}

pub struct DirectoryService {
    db: Arc<Database>,
}

impl DirectoryService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// All venues grouped by (city, state), with upcoming show counts taken
    /// against the single reference time `now`.
    pub async fn venues_by_city(&self, now: DateTime<Utc>) -> BookingResult<Vec<CityVenues>> {
        let venues = entities::venue::Entity::find()
            .order_by_asc(entities::venue::Column::Id)
            .all(&self.db.conn)
            .await?;
        let shows = entities::show::Entity::find().all(&self.db.conn).await?;

        let upcoming = count_upcoming(&shows, now, |show| show.venue_id);
        Ok(group_by_city(venues, &upcoming))
    }

    pub async fn venue_detail(&self, id: i64, now: DateTime<Utc>) -> BookingResult<VenueDetail> {
        let venue = entities::venue::Entity::find_by_id(id)
            .one(&self.db.conn)
            .await?
            .ok_or_else(|| BookingError::not_found(EntityKind::Venue, id))?;

        let genres = genres_on(&self.db.conn, GenreOwner::Venue(id)).await?;
        let listings = load_listings(
            &self.db.conn,
            Condition::all().add(entities::show::Column::VenueId.eq(id)),
        )
        .await?;
        let shows = partition_shows(listings, now, |listing| listing.start_time);

        Ok(VenueDetail {
            id: venue.id,
            name: venue.name,
            genres,
            address: venue.address,
            city: venue.city,
            state: venue.state,
            phone: venue.phone,
            website_link: venue.website_link,
            facebook_link: venue.facebook_link,
            seeking_talent: venue.seeking_talent,
            seeking_description: venue.seeking_description,
            image_link: venue.image_link,
            past_shows_count: shows.past.len(),
            upcoming_shows_count: shows.upcoming.len(),
            past_shows: shows.past,
            upcoming_shows: shows.upcoming,
        })
    }

    pub async fn artist_detail(&self, id: i64, now: DateTime<Utc>) -> BookingResult<ArtistDetail> {
        let artist = entities::artist::Entity::find_by_id(id)
            .one(&self.db.conn)
            .await?
            .ok_or_else(|| BookingError::not_found(EntityKind::Artist, id))?;

        let genres = genres_on(&self.db.conn, GenreOwner::Artist(id)).await?;
        let listings = load_listings(
            &self.db.conn,
            Condition::all().add(entities::show::Column::ArtistId.eq(id)),
        )
        .await?;
        let shows = partition_shows(listings, now, |listing| listing.start_time);

        Ok(ArtistDetail {
            id: artist.id,
            name: artist.name,
            genres,
            city: artist.city,
            state: artist.state,
            phone: artist.phone,
            website_link: artist.website_link,
            facebook_link: artist.facebook_link,
            seeking_venue: artist.seeking_venue,
            seeking_description: artist.seeking_description,
            image_link: artist.image_link,
            past_shows_count: shows.past.len(),
            upcoming_shows_count: shows.upcoming.len(),
            past_shows: shows.past,
            upcoming_shows: shows.upcoming,
        })
    }
}

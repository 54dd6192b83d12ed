use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Query, SelectStatement};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::Serialize;

use crate::database::Database;
use crate::entities;
use crate::error::{BookingError, BookingResult, EntityKind};

/// A show with the venue and artist fields needed for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShowListing {
    pub show_id: i64,
    pub venue_id: i64,
    pub venue_name: String,
    pub venue_image_link: Option<String>,
    pub artist_id: i64,
    pub artist_name: String,
    pub artist_image_link: Option<String>,
    pub start_time: DateTime<Utc>,
}

/// `SELECT DISTINCT column FROM shows WHERE condition`, bound once whatever the row count.
fn show_column(column: entities::show::Column, condition: Condition) -> SelectStatement {
    Query::select()
        .distinct()
        .column(column)
        .from(entities::show::Entity)
        .cond_where(condition)
        .to_owned()
}

/// Load shows matching `condition` (id order) and denormalize their venue and artist.
pub(crate) async fn load_listings<C: ConnectionTrait>(
    conn: &C,
    condition: Condition,
) -> BookingResult<Vec<ShowListing>> {
    let shows = entities::show::Entity::find()
        .filter(condition.clone())
        .order_by_asc(entities::show::Column::Id)
        .all(conn)
        .await?;

    if shows.is_empty() {
        return Ok(Vec::new());
    }

    let venues: HashMap<i64, entities::venue::Model> = entities::venue::Entity::find()
        .filter(
            entities::venue::Column::Id
                .in_subquery(show_column(entities::show::Column::VenueId, condition.clone())),
        )
        .all(conn)
        .await?
        .into_iter()
        .map(|v| (v.id, v))
        .collect();
    let artists: HashMap<i64, entities::artist::Model> = entities::artist::Entity::find()
        .filter(
            entities::artist::Column::Id
                .in_subquery(show_column(entities::show::Column::ArtistId, condition)),
        )
        .all(conn)
        .await?
        .into_iter()
        .map(|a| (a.id, a))
        .collect();

    shows
        .into_iter()
        .map(|show| {
            let venue = venues
                .get(&show.venue_id)
                .ok_or_else(|| BookingError::not_found(EntityKind::Venue, show.venue_id))?;
            let artist = artists
                .get(&show.artist_id)
                .ok_or_else(|| BookingError::not_found(EntityKind::Artist, show.artist_id))?;

            Ok(ShowListing {
                show_id: show.id,
                venue_id: venue.id,
                venue_name: venue.name.clone(),
                venue_image_link: venue.image_link.clone(),
                artist_id: artist.id,
                artist_name: artist.name.clone(),
                artist_image_link: artist.image_link.clone(),
                start_time: show.show_date,
            })
        })
        .collect()
}

/// Count shows strictly after `now`, keyed by the owner selected with `key`.
pub(crate) fn count_upcoming<K, F>(
    shows: &[entities::show::Model],
    now: DateTime<Utc>,
    key: F,
) -> HashMap<K, usize>
where
    K: std::hash::Hash + Eq,
    F: Fn(&entities::show::Model) -> K,
{
    let mut counts = HashMap::new();
    for show in shows.iter().filter(|show| show.show_date > now) {
        *counts.entry(key(show)).or_insert(0) += 1;
    }
    counts
}

pub struct ShowService {
    db: Arc<Database>,
}

impl ShowService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Schedule `artist_id` at `venue_id`. Overlapping or duplicate shows are
    /// accepted as-is.
    pub async fn create(
        &self,
        artist_id: i64,
        venue_id: i64,
        start_time: DateTime<Utc>,
    ) -> BookingResult<entities::show::Model> {
        log::debug!(
            "Creating show: artist_id={}, venue_id={}, start_time={}",
            artist_id,
            venue_id,
            start_time
        );

        let show = self
            .db
            .conn
            .transaction::<_, entities::show::Model, BookingError>(|txn| {
                Box::pin(async move {
                    entities::artist::Entity::find_by_id(artist_id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| BookingError::not_found(EntityKind::Artist, artist_id))?;
                    entities::venue::Entity::find_by_id(venue_id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| BookingError::not_found(EntityKind::Venue, venue_id))?;

                    let show = entities::show::ActiveModel {
                        venue_id: Set(venue_id),
                        artist_id: Set(artist_id),
                        show_date: Set(start_time),
                        ..Default::default()
                    };
                    Ok(show.insert(txn).await?)
                })
            })
            .await
            .inspect_err(|e| log::warn!("Show could not be listed: {}", e))?;

        log::info!("Show was successfully listed (ID: {})", show.id);
        Ok(show)
    }

    pub async fn list_all(&self) -> BookingResult<Vec<ShowListing>> {
        load_listings(&self.db.conn, Condition::all()).await
    }
}

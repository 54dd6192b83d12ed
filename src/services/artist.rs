use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

use crate::database::Database;
use crate::entities;
use crate::error::{BookingError, BookingResult, EntityKind};
use crate::services::directory::{DirectoryEntry, SearchResults, filter_by_name, search_results};
use crate::services::genre::{GenreOwner, clear_genres, replace_genres_on};
use crate::services::show::count_upcoming;
use crate::services::validation::ArtistForm;

/// Split a validated form into the row to write and its genre names.
pub(crate) fn into_active_model(form: ArtistForm) -> (entities::artist::ActiveModel, Vec<String>) {
    let model = entities::artist::ActiveModel {
        name: Set(form.name),
        city: Set(form.city),
        state: Set(form.state),
        phone: Set(form.phone),
        image_link: Set(form.image_link),
        facebook_link: Set(form.facebook_link),
        website_link: Set(form.website_link),
        seeking_venue: Set(form.seeking_venue),
        seeking_description: Set(form.seeking_description),
        ..Default::default()
    };
    (model, form.genres)
}

pub struct ArtistService {
    db: Arc<Database>,
}

impl ArtistService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub async fn create(&self, form: ArtistForm) -> BookingResult<entities::artist::Model> {
        let form = form.validate()?;
        let name = form.name.clone();
        log::debug!("Creating artist: '{}'", name);

        let artist = self
            .db
            .conn
            .transaction::<_, entities::artist::Model, BookingError>(|txn| {
                Box::pin(async move {
                    let (model, genres) = into_active_model(form);
                    let artist = model.insert(txn).await?;
                    replace_genres_on(txn, GenreOwner::Artist(artist.id), &genres).await?;
                    Ok(artist)
                })
            })
            .await
            .inspect_err(|e| log::warn!("Artist '{}' could not be listed: {}", name, e))?;

        log::info!("Artist '{}' was successfully listed (ID: {})", artist.name, artist.id);
        Ok(artist)
    }

    /// Overwrite every field of artist `id`, including its genre set.
    pub async fn update(&self, id: i64, form: ArtistForm) -> BookingResult<entities::artist::Model> {
        let form = form.validate()?;
        let name = form.name.clone();
        log::debug!("Updating artist {}: '{}'", id, name);

        let artist = self
            .db
            .conn
            .transaction::<_, entities::artist::Model, BookingError>(|txn| {
                Box::pin(async move {
                    entities::artist::Entity::find_by_id(id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| BookingError::not_found(EntityKind::Artist, id))?;

                    let (mut model, genres) = into_active_model(form);
                    model.id = Set(id);
                    let artist = model.update(txn).await?;
                    replace_genres_on(txn, GenreOwner::Artist(id), &genres).await?;
                    Ok(artist)
                })
            })
            .await
            .inspect_err(|e| log::warn!("Artist '{}' could not be updated: {}", name, e))?;

        log::info!("Artist '{}' was successfully updated", artist.name);
        Ok(artist)
    }

    /// Delete artist `id` with its genre associations. Rejected while any show
    /// still references the artist.
    pub async fn delete(&self, id: i64) -> BookingResult<entities::artist::Model> {
        log::debug!("Deleting artist {}", id);

        let artist = self
            .db
            .conn
            .transaction::<_, entities::artist::Model, BookingError>(|txn| {
                Box::pin(async move {
                    let artist = entities::artist::Entity::find_by_id(id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| BookingError::not_found(EntityKind::Artist, id))?;

                    let shows = entities::show::Entity::find()
                        .filter(entities::show::Column::ArtistId.eq(id))
                        .count(txn)
                        .await?;
                    if shows > 0 {
                        return Err(BookingError::ReferentialIntegrity {
                            entity: EntityKind::Artist,
                            id,
                            shows,
                        });
                    }

                    clear_genres(txn, GenreOwner::Artist(id)).await?;
                    entities::artist::Entity::delete_by_id(id).exec(txn).await?;
                    Ok(artist)
                })
            })
            .await
            .inspect_err(|e| log::warn!("Artist {} could not be deleted: {}", id, e))?;

        log::info!("Artist '{}' was successfully deleted", artist.name);
        Ok(artist)
    }

    pub async fn get(&self, id: i64) -> BookingResult<entities::artist::Model> {
        entities::artist::Entity::find_by_id(id)
            .one(&self.db.conn)
            .await?
            .ok_or_else(|| BookingError::not_found(EntityKind::Artist, id))
    }

    pub async fn list(&self) -> BookingResult<Vec<entities::artist::Model>> {
        Ok(entities::artist::Entity::find()
            .order_by_asc(entities::artist::Column::Id)
            .all(&self.db.conn)
            .await?)
    }

    /// Case-insensitive substring search on the artist name, in storage order.
    pub async fn search(&self, term: &str, now: DateTime<Utc>) -> BookingResult<SearchResults> {
        let artists = entities::artist::Entity::find()
            .order_by_asc(entities::artist::Column::Id)
            .all(&self.db.conn)
            .await?;
        let artists = filter_by_name(artists, term, |artist| artist.name.as_str());

        // No id list: a broad match would exceed SQLite's bound-variable limit
        let shows = entities::show::Entity::find().all(&self.db.conn).await?;
        let upcoming = count_upcoming(&shows, now, |show| show.artist_id);

        log::debug!("Artist search '{}' matched {} artist(s)", term, artists.len());
        Ok(search_results(
            artists
                .into_iter()
                .map(|artist| DirectoryEntry {
                    num_upcoming_shows: upcoming.get(&artist.id).copied().unwrap_or(0),
                    id: artist.id,
                    name: artist.name,
                })
                .collect(),
        ))
    }
}

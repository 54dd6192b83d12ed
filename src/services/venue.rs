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
use crate::services::validation::VenueForm;

/// Split a validated form into the row to write and its genre names.
pub(crate) fn into_active_model(form: VenueForm) -> (entities::venue::ActiveModel, Vec<String>) {
    let model = entities::venue::ActiveModel {
        name: Set(form.name),
        city: Set(form.city),
        state: Set(form.state),
        address: Set(form.address),
        phone: Set(form.phone),
        image_link: Set(form.image_link),
        facebook_link: Set(form.facebook_link),
        website_link: Set(form.website_link),
        seeking_talent: Set(form.seeking_talent),
        seeking_description: Set(form.seeking_description),
        ..Default::default()
    };
    (model, form.genres)
}

pub struct VenueService {
    db: Arc<Database>,
}

impl VenueService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub async fn create(&self, form: VenueForm) -> BookingResult<entities::venue::Model> {
        let form = form.validate()?;
        let name = form.name.clone();
        log::debug!("Creating venue: '{}'", name);

        let venue = self
            .db
            .conn
            .transaction::<_, entities::venue::Model, BookingError>(|txn| {
                Box::pin(async move {
                    let (model, genres) = into_active_model(form);
                    let venue = model.insert(txn).await?;
                    replace_genres_on(txn, GenreOwner::Venue(venue.id), &genres).await?;
                    Ok(venue)
                })
            })
            .await
            .inspect_err(|e| log::warn!("Venue '{}' could not be listed: {}", name, e))?;

        log::info!("Venue '{}' was successfully listed (ID: {})", venue.name, venue.id);
        Ok(venue)
    }

    /// Overwrite every field of venue `id`, including its genre set.
    pub async fn update(&self, id: i64, form: VenueForm) -> BookingResult<entities::venue::Model> {
        let form = form.validate()?;
        let name = form.name.clone();
        log::debug!("Updating venue {}: '{}'", id, name);

        let venue = self
            .db
            .conn
            .transaction::<_, entities::venue::Model, BookingError>(|txn| {
                Box::pin(async move {
                    entities::venue::Entity::find_by_id(id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| BookingError::not_found(EntityKind::Venue, id))?;

                    let (mut model, genres) = into_active_model(form);
                    model.id = Set(id);
                    let venue = model.update(txn).await?;
                    replace_genres_on(txn, GenreOwner::Venue(id), &genres).await?;
                    Ok(venue)
                })
            })
            .await
            .inspect_err(|e| log::warn!("Venue '{}' could not be updated: {}", name, e))?;

        log::info!("Venue '{}' was successfully updated", venue.name);
        Ok(venue)
    }

    /// Delete venue `id` with its genre associations. Rejected while any show
    /// still references the venue.
    pub async fn delete(&self, id: i64) -> BookingResult<entities::venue::Model> {
        log::debug!("Deleting venue {}", id);

        let venue = self
            .db
            .conn
            .transaction::<_, entities::venue::Model, BookingError>(|txn| {
                Box::pin(async move {
                    let venue = entities::venue::Entity::find_by_id(id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| BookingError::not_found(EntityKind::Venue, id))?;

                    let shows = entities::show::Entity::find()
                        .filter(entities::show::Column::VenueId.eq(id))
                        .count(txn)
                        .await?;
                    if shows > 0 {
                        return Err(BookingError::ReferentialIntegrity {
                            entity: EntityKind::Venue,
                            id,
                            shows,
                        });
                    }

                    clear_genres(txn, GenreOwner::Venue(id)).await?;
                    entities::venue::Entity::delete_by_id(id).exec(txn).await?;
                    Ok(venue)
                })
            })
            .await
            .inspect_err(|e| log::warn!("Venue {} could not be deleted: {}", id, e))?;

        log::info!("Venue '{}' was successfully deleted", venue.name);
        Ok(venue)
    }

    pub async fn get(&self, id: i64) -> BookingResult<entities::venue::Model> {
        entities::venue::Entity::find_by_id(id)
            .one(&self.db.conn)
            .await?
            .ok_or_else(|| BookingError::not_found(EntityKind::Venue, id))
    }

    pub async fn list(&self) -> BookingResult<Vec<entities::venue::Model>> {
        Ok(entities::venue::Entity::find()
            .order_by_asc(entities::venue::Column::Id)
            .all(&self.db.conn)
            .await?)
    }

    /// Case-insensitive substring search on the venue name, in storage order.
    pub async fn search(&self, term: &str, now: DateTime<Utc>) -> BookingResult<SearchResults> {
        let venues = entities::venue::Entity::find()
            .order_by_asc(entities::venue::Column::Id)
            .all(&self.db.conn)
            .await?;
        let venues = filter_by_name(venues, term, |venue| venue.name.as_str());

        // No id list: a broad match would exceed SQLite's bound-variable limit
        let shows = entities::show::Entity::find().all(&self.db.conn).await?;
        let upcoming = count_upcoming(&shows, now, |show| show.venue_id);

        log::debug!("Venue search '{}' matched {} venue(s)", term, venues.len());
        Ok(search_results(
            venues
                .into_iter()
                .map(|venue| DirectoryEntry {
                    num_upcoming_shows: upcoming.get(&venue.id).copied().unwrap_or(0),
                    id: venue.id,
                    name: venue.name,
                })
                .collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::genre::GenreService;
    use crate::services::show::ShowService;
    use crate::test_utils::{reference_now, seeded_db, test_db};

    fn form(name: &str) -> VenueForm {
        VenueForm {
            name: name.into(),
            city: "Chicago".into(),
            state: "IL".into(),
            address: "2 Lake Shore Dr".into(),
            phone: Some("312-555-0100".into()),
            website_link: Some("https://example.com/venue".into()),
            seeking_talent: true,
            seeking_description: Some("Weekly jazz nights".into()),
            genres: vec!["Jazz".into(), "Blues".into()],
            ..Default::default()
        }
    }

    fn names(results: &SearchResults) -> Vec<&str> {
        results.data.iter().map(|d| d.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let db = seeded_db().await;
        let service = VenueService::new(db.clone());
        let genres = GenreService::new(db);

        let venue = service.create(form("Green Mill")).await.unwrap();
        assert_eq!(venue.name, "Green Mill");
        assert!(venue.seeking_talent);
        assert_eq!(venue.image_link, None);

        let fetched = service.get(venue.id).await.unwrap();
        assert_eq!(fetched, venue);
        assert_eq!(
            genres.genres_for(GenreOwner::Venue(venue.id)).await.unwrap(),
            vec!["Blues", "Jazz"]
        );
    }

    #[tokio::test]
    async fn test_create_validation_touches_nothing() {
        let db = test_db().await;
        let service = VenueService::new(db);

        let mut bad = form("Green Mill");
        bad.website_link = Some("not a url".into());
        let err = service.create(bad).await.unwrap_err();
        assert!(matches!(
            err,
            BookingError::Validation {
                field: "website_link",
                ..
            }
        ));
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_with_unknown_genre_rolls_back() {
        let db = seeded_db().await;
        let service = VenueService::new(db);
        let before = service.list().await.unwrap().len();

        let mut bad = form("Green Mill");
        bad.genres = vec!["Jazz".into(), "Polka".into()];
        let err = service.create(bad).await.unwrap_err();
        assert!(matches!(err, BookingError::NotFound { .. }));
        assert_eq!(service.list().await.unwrap().len(), before);
    }

    #[tokio::test]
    async fn test_update_overwrites_all_fields() {
        let db = seeded_db().await;
        let service = VenueService::new(db.clone());
        let genres = GenreService::new(db);

        let updated = service
            .update(
                2,
                VenueForm {
                    name: "The Dueling Pianos".into(),
                    city: "New York".into(),
                    state: "NY".into(),
                    address: "335 Delancey Street".into(),
                    genres: vec!["Pop".into()],
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.id, 2);
        assert_eq!(updated.name, "The Dueling Pianos");
        // Full overwrite: fields absent from the form are cleared
        assert_eq!(updated.phone, None);
        assert_eq!(updated.website_link, None);
        assert_eq!(
            genres.genres_for(GenreOwner::Venue(2)).await.unwrap(),
            vec!["Pop"]
        );
    }

    #[tokio::test]
    async fn test_update_with_unknown_genre_changes_nothing() {
        let db = seeded_db().await;
        let service = VenueService::new(db.clone());
        let genres = GenreService::new(db);

        let before = service.get(1).await.unwrap();
        let before_genres = genres.genres_for(GenreOwner::Venue(1)).await.unwrap();

        let mut bad = form("Renamed");
        bad.genres = vec!["Polka".into()];
        assert!(service.update(1, bad).await.is_err());

        assert_eq!(service.get(1).await.unwrap(), before);
        assert_eq!(
            genres.genres_for(GenreOwner::Venue(1)).await.unwrap(),
            before_genres
        );
    }

    #[tokio::test]
    async fn test_update_missing() {
        let db = seeded_db().await;
        let service = VenueService::new(db);

        let err = service.update(404, form("Nowhere")).await.unwrap_err();
        assert!(matches!(
            err,
            BookingError::NotFound {
                entity: EntityKind::Venue,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_delete_with_shows_is_rejected() {
        let db = seeded_db().await;
        let service = VenueService::new(db.clone());
        let genres = GenreService::new(db);

        let err = service.delete(3).await.unwrap_err();
        assert!(matches!(
            err,
            BookingError::ReferentialIntegrity {
                entity: EntityKind::Venue,
                id: 3,
                shows: 4,
            }
        ));

        // Nothing removed
        assert!(service.get(3).await.is_ok());
        assert_eq!(genres.genres_for(GenreOwner::Venue(3)).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_delete_removes_genre_associations() {
        let db = seeded_db().await;
        let service = VenueService::new(db.clone());

        let deleted = service.delete(2).await.unwrap();
        assert_eq!(deleted.name, "The Dueling Pianos Bar");

        let err = service.get(2).await.unwrap_err();
        assert!(matches!(err, BookingError::NotFound { .. }));
        let rows = entities::venue_genre::Entity::find()
            .filter(entities::venue_genre::Column::VenueId.eq(2))
            .count(&db.conn)
            .await
            .unwrap();
        assert_eq!(rows, 0);

        let err = service.delete(2).await.unwrap_err();
        assert!(matches!(err, BookingError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_search() {
        let db = seeded_db().await;
        let service = VenueService::new(db);
        let now = reference_now();

        let results = service.search("Hop", now).await.unwrap();
        assert_eq!(results.count, 1);
        assert_eq!(names(&results), vec!["The Musical Hop"]);

        let results = service.search("Music", now).await.unwrap();
        assert_eq!(results.count, 2);
        assert_eq!(
            names(&results),
            vec!["The Musical Hop", "Park Square Live Music & Coffee"]
        );
        assert_eq!(results.data[1].num_upcoming_shows, 3);

        assert_eq!(service.search("hop", now).await.unwrap(), service.search("Hop", now).await.unwrap());
        assert_eq!(service.search("", now).await.unwrap().count, 3);
        assert_eq!(service.search("Opera", now).await.unwrap().count, 0);
    }

    #[tokio::test]
    async fn test_search_matches_wildcards_literally() {
        let db = seeded_db().await;
        let service = VenueService::new(db);
        let now = reference_now();

        assert_eq!(service.search("%", now).await.unwrap().count, 0);
        assert_eq!(service.search("_", now).await.unwrap().count, 0);

        service.create(form("100% Jazz")).await.unwrap();
        let results = service.search("0%", now).await.unwrap();
        assert_eq!(names(&results), vec!["100% Jazz"]);
    }

    #[tokio::test]
    async fn test_search_folds_non_ascii_case() {
        let db = seeded_db().await;
        let service = VenueService::new(db);
        let now = reference_now();

        let venue = service.create(form("Café Éclair")).await.unwrap();

        for term in ["éclair", "Éclair", "ÉCLAIR", "café"] {
            let results = service.search(term, now).await.unwrap();
            assert_eq!(results.count, 1, "term {term}");
            assert_eq!(results.data[0].id, venue.id);
        }
    }

    #[tokio::test]
    async fn test_search_counts_new_upcoming_shows() {
        let db = seeded_db().await;
        let service = VenueService::new(db.clone());
        let shows = ShowService::new(db);
        let now = reference_now();

        shows
            .create(1, 1, now + chrono::Duration::days(7))
            .await
            .unwrap();
        let results = service.search("Hop", now).await.unwrap();
        assert_eq!(results.data[0].num_upcoming_shows, 1);
    }
}

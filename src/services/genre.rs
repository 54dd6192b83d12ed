use std::sync::Arc;

use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::database::Database;
use crate::entities;
use crate::error::{BookingError, BookingResult, EntityKind};
use crate::services::lookup::resolve_genre_ids;

/// The record a genre association set belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenreOwner {
    Venue(i64),
    Artist(i64),
}

impl GenreOwner {
    pub fn kind(self) -> EntityKind {
        match self {
            GenreOwner::Venue(_) => EntityKind::Venue,
            GenreOwner::Artist(_) => EntityKind::Artist,
        }
    }

    pub fn id(self) -> i64 {
        match self {
            GenreOwner::Venue(id) | GenreOwner::Artist(id) => id,
        }
    }
}

async fn ensure_owner_exists<C: ConnectionTrait>(conn: &C, owner: GenreOwner) -> BookingResult<()> {
    let exists = match owner {
        GenreOwner::Venue(id) => entities::venue::Entity::find_by_id(id)
            .one(conn)
            .await?
            .is_some(),
        GenreOwner::Artist(id) => entities::artist::Entity::find_by_id(id)
            .one(conn)
            .await?
            .is_some(),
    };

    if exists {
        Ok(())
    } else {
        Err(BookingError::not_found(owner.kind(), owner.id()))
    }
}

/// Remove every association of `owner`.
pub(crate) async fn clear_genres<C: ConnectionTrait>(conn: &C, owner: GenreOwner) -> BookingResult<()> {
    match owner {
        GenreOwner::Venue(id) => {
            entities::venue_genre::Entity::delete_many()
                .filter(entities::venue_genre::Column::VenueId.eq(id))
                .exec(conn)
                .await?;
        }
        GenreOwner::Artist(id) => {
            entities::artist_genre::Entity::delete_many()
                .filter(entities::artist_genre::Column::ArtistId.eq(id))
                .exec(conn)
                .await?;
        }
    }
    Ok(())
}

/// Delete-all-then-reinsert on the given connection. Callers provide the
/// transaction so the swap is observed as one unit.
pub(crate) async fn replace_genres_on<C: ConnectionTrait>(
    conn: &C,
    owner: GenreOwner,
    genre_names: &[String],
) -> BookingResult<()> {
    let genre_ids = resolve_genre_ids(conn, genre_names).await?;

    clear_genres(conn, owner).await?;
    if genre_ids.is_empty() {
        return Ok(());
    }

    match owner {
        GenreOwner::Venue(venue_id) => {
            let rows = genre_ids
                .into_iter()
                .map(|genre_id| entities::venue_genre::ActiveModel {
                    venue_id: Set(venue_id),
                    genre_id: Set(genre_id),
                });
            entities::venue_genre::Entity::insert_many(rows)
                .exec(conn)
                .await?;
        }
        GenreOwner::Artist(artist_id) => {
            let rows = genre_ids
                .into_iter()
                .map(|genre_id| entities::artist_genre::ActiveModel {
                    artist_id: Set(artist_id),
                    genre_id: Set(genre_id),
                });
            entities::artist_genre::Entity::insert_many(rows)
                .exec(conn)
                .await?;
        }
    }
    Ok(())
}

/// Genre descriptions associated with `owner`, sorted by description.
pub(crate) async fn genres_on<C: ConnectionTrait>(
    conn: &C,
    owner: GenreOwner,
) -> BookingResult<Vec<String>> {
    let lookups = match owner {
        GenreOwner::Venue(id) => {
            entities::lookup::Entity::find()
                .inner_join(entities::venue_genre::Entity)
                .filter(entities::venue_genre::Column::VenueId.eq(id))
                .order_by_asc(entities::lookup::Column::Description)
                .all(conn)
                .await?
        }
        GenreOwner::Artist(id) => {
            entities::lookup::Entity::find()
                .inner_join(entities::artist_genre::Entity)
                .filter(entities::artist_genre::Column::ArtistId.eq(id))
                .order_by_asc(entities::lookup::Column::Description)
                .all(conn)
                .await?
        }
    };

    Ok(lookups.into_iter().map(|lookup| lookup.description).collect())
}

pub struct GenreService {
    db: Arc<Database>,
}

impl GenreService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Atomically replace the full association set of `owner` with the
    /// genres named in `genre_names`.
    pub async fn replace_genres(
        &self,
        owner: GenreOwner,
        genre_names: Vec<String>,
    ) -> BookingResult<()> {
        log::debug!("Replacing genres for {:?}: {:?}", owner, genre_names);

        self.db
            .conn
            .transaction::<_, (), BookingError>(|txn| {
                Box::pin(async move {
                    ensure_owner_exists(txn, owner).await?;
                    replace_genres_on(txn, owner, &genre_names).await
                })
            })
            .await?;

        Ok(())
    }

    pub async fn genres_for(&self, owner: GenreOwner) -> BookingResult<Vec<String>> {
        ensure_owner_exists(&self.db.conn, owner).await?;
        genres_on(&self.db.conn, owner).await
    }
}

use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, DatabaseTransaction, EntityTrait, PaginatorTrait, Set, TransactionTrait};

use crate::database::Database;
use crate::entities;
use crate::error::{BookingError, BookingResult, EntityKind};
use crate::services::genre::{GenreOwner, replace_genres_on};
use crate::services::lookup::{GENRES_ROOT, insert_lookup};
use crate::services::validation::{ArtistForm, VenueForm};
use crate::services::{artist, venue};

const GENRES: [&str; 19] = [
    "Alternative",
    "Blues",
    "Classical",
    "Country",
    "Electronic",
    "Folk",
    "Funk",
    "Hip-Hop",
    "Heavy Metal",
    "Instrumental",
    "Jazz",
    "Musical Theatre",
    "Pop",
    "Punk",
    "R&B",
    "Reggae",
    "Rock n Roll",
    "Soul",
    "Other",
];

fn genres(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

fn sample_artists() -> Vec<ArtistForm> {
    vec![
        ArtistForm {
            name: "Guns N Petals".into(),
            city: "San Francisco".into(),
            state: "CA".into(),
            phone: Some("326-123-5000".into()),
            website_link: Some("https://www.gunsnpetalsband.com".into()),
            facebook_link: Some("https://www.facebook.com/GunsNPetals".into()),
            seeking_venue: true,
            seeking_description: Some(
                "Looking for shows to perform at in the San Francisco Bay Area!".into(),
            ),
            image_link: Some("https://images.unsplash.com/photo-1549213783-8284d0336c4f?ixlib=rb-1.2.1&ixid=eyJhcHBfaWQiOjEyMDd9&auto=format&fit=crop&w=300&q=80".into()),
            genres: genres(&["Rock n Roll"]),
        },
        ArtistForm {
            name: "Matt Quevedo".into(),
            city: "New York".into(),
            state: "NY".into(),
            phone: Some("300-400-5000".into()),
            facebook_link: Some("https://www.facebook.com/mattquevedo923251523".into()),
            seeking_venue: false,
            image_link: Some("https://images.unsplash.com/photo-1495223153807-b916f75de8c5?ixlib=rb-1.2.1&ixid=eyJhcHBfaWQiOjEyMDd9&auto=format&fit=crop&w=334&q=80".into()),
            ..Default::default()
        },
        ArtistForm {
            name: "The Wild Sax Band".into(),
            city: "San Francisco".into(),
            state: "CA".into(),
            phone: Some("432-325-5432".into()),
            seeking_venue: false,
            seeking_description: Some(
                "Looking for shows to perform at in the San Francisco Bay Area!".into(),
            ),
            image_link: Some("https://images.unsplash.com/photo-1558369981-f9ca78462e61?ixlib=rb-1.2.1&ixid=eyJhcHBfaWQiOjEyMDd9&auto=format&fit=crop&w=794&q=80".into()),
            genres: genres(&["Jazz"]),
            ..Default::default()
        },
    ]
}

fn sample_venues() -> Vec<VenueForm> {
    vec![
        VenueForm {
            name: "The Musical Hop".into(),
            address: "1015 Folsom Street".into(),
            city: "San Francisco".into(),
            state: "CA".into(),
            phone: Some("123-123-1234".into()),
            website_link: Some("https://www.themusicalhop.com".into()),
            facebook_link: Some("https://www.facebook.com/TheMusicalHop".into()),
            seeking_talent: true,
            seeking_description: Some(
                "We are on the lookout for a local artist to play every two weeks. Please call us."
                    .into(),
            ),
            image_link: Some("https://images.unsplash.com/photo-1543900694-133f37abaaa5?ixlib=rb-1.2.1&ixid=eyJhcHBfaWQiOjEyMDd9&auto=format&fit=crop&w=400&q=60".into()),
            genres: genres(&["Jazz", "Reggae", "Classical", "Folk"]),
        },
        VenueForm {
            name: "The Dueling Pianos Bar".into(),
            address: "335 Delancey Street".into(),
            city: "New York".into(),
            state: "NY".into(),
            phone: Some("914-003-1132".into()),
            website_link: Some("https://www.theduelingpianos.com".into()),
            facebook_link: Some("https://www.facebook.com/theduelingpianos".into()),
            seeking_talent: false,
            image_link: Some("https://images.unsplash.com/photo-1497032205916-ac775f0649ae?ixlib=rb-1.2.1&ixid=eyJhcHBfaWQiOjEyMDd9&auto=format&fit=crop&w=750&q=80".into()),
            genres: genres(&["Classical", "R&B", "Hip-Hop"]),
            ..Default::default()
        },
        VenueForm {
            name: "Park Square Live Music & Coffee".into(),
            address: "34 Whiskey Moore Ave".into(),
            city: "San Francisco".into(),
            state: "CA".into(),
            phone: Some("415-000-1234".into()),
            website_link: Some("https://www.parksquarelivemusicandcoffee.com".into()),
            facebook_link: Some("https://www.facebook.com/ParkSquareLiveMusicAndCoffee".into()),
            seeking_talent: false,
            image_link: Some("https://images.unsplash.com/photo-1485686531765-ba63b07845a7?ixlib=rb-1.2.1&ixid=eyJhcHBfaWQiOjEyMDd9&auto=format&fit=crop&w=747&q=80".into()),
            genres: genres(&["Rock n Roll", "Jazz", "Classical", "Folk"]),
            ..Default::default()
        },
    ]
}

/// (venue index, artist index, start time), indices into the sample lists.
const SAMPLE_SHOWS: [(usize, usize, &str); 5] = [
    (0, 0, "2019-05-21T21:30:00.000Z"),
    (2, 1, "2019-06-15T23:00:00.000Z"),
    (2, 2, "2035-04-01T20:00:00.000Z"),
    (2, 2, "2035-04-08T20:00:00.000Z"),
    (2, 2, "2035-04-15T20:00:00.000Z"),
];

async fn seed_in(txn: &DatabaseTransaction) -> BookingResult<()> {
    let root = insert_lookup(txn, GENRES_ROOT, None).await?;
    for genre in GENRES {
        insert_lookup(txn, genre, Some(root.id)).await?;
    }

    let mut artist_ids = Vec::new();
    for form in sample_artists() {
        let (model, genres) = artist::into_active_model(form.validate()?);
        let artist = model.insert(txn).await?;
        replace_genres_on(txn, GenreOwner::Artist(artist.id), &genres).await?;
        artist_ids.push(artist.id);
    }

    let mut venue_ids = Vec::new();
    for form in sample_venues() {
        let (model, genres) = venue::into_active_model(form.validate()?);
        let venue = model.insert(txn).await?;
        replace_genres_on(txn, GenreOwner::Venue(venue.id), &genres).await?;
        venue_ids.push(venue.id);
    }

    for (venue_index, artist_index, start_time) in SAMPLE_SHOWS {
        let show_date = DateTime::parse_from_rfc3339(start_time)
            .map_err(|e| BookingError::validation(EntityKind::Show, "start_time", e.to_string()))?
            .with_timezone(&Utc);
        let show = entities::show::ActiveModel {
            venue_id: Set(venue_ids[venue_index]),
            artist_id: Set(artist_ids[artist_index]),
            show_date: Set(show_date),
            ..Default::default()
        };
        show.insert(txn).await?;
    }

    Ok(())
}

/// Load the sample directory. Returns `false` without writing anything when
/// the lookup table is already populated.
pub async fn seed(db: &Database) -> BookingResult<bool> {
    let existing = entities::lookup::Entity::find().count(&db.conn).await?;
    if existing > 0 {
        log::warn!("Database already holds {} lookup(s); skipping seed", existing);
        return Ok(false);
    }

    db.conn
        .transaction::<_, (), BookingError>(|txn| Box::pin(async move { seed_in(txn).await }))
        .await?;

    log::info!(
        "Seeded {} genres, {} artists, {} venues and {} shows",
        GENRES.len(),
        sample_artists().len(),
        sample_venues().len(),
        SAMPLE_SHOWS.len()
    );
    Ok(true)
}

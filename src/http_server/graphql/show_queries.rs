use async_graphql::{Context, Object, SimpleObject};
use chrono::{DateTime, Utc};

use crate::http_server::graphql::context::get_app_state;
use crate::http_server::graphql_error::GraphqlResult;
use crate::services::lookup::LookupService;
use crate::services::show::{ShowListing, ShowService};

#[derive(Debug, Clone, SimpleObject)]
pub struct Show {
    pub id: i64,
    pub venue_id: i64,
    pub venue_name: String,
    pub venue_image_link: Option<String>,
    pub artist_id: i64,
    pub artist_name: String,
    pub artist_image_link: Option<String>,
    pub start_time: DateTime<Utc>,
}

impl From<ShowListing> for Show {
    fn from(listing: ShowListing) -> Self {
        Self {
            id: listing.show_id,
            venue_id: listing.venue_id,
            venue_name: listing.venue_name,
            venue_image_link: listing.venue_image_link,
            artist_id: listing.artist_id,
            artist_name: listing.artist_name,
            artist_image_link: listing.artist_image_link,
            start_time: listing.start_time,
        }
    }
}

pub(crate) fn map_shows(listings: Vec<ShowListing>) -> Vec<Show> {
    listings.into_iter().map(Show::from).collect()
}

#[derive(Default)]
pub struct ShowQuery;

#[Object]
impl ShowQuery {
    /// Every show, past and upcoming, in listing order.
    async fn shows(&self, ctx: &Context<'_>) -> GraphqlResult<Vec<Show>> {
        let db = &get_app_state(ctx)?.db;
        let service = ShowService::new(db.clone());
        Ok(map_shows(service.list_all().await?))
    }

    /// Genre names offered when listing a venue or artist.
    async fn genres(&self, ctx: &Context<'_>) -> GraphqlResult<Vec<String>> {
        let db = &get_app_state(ctx)?.db;
        let service = LookupService::new(db.clone());
        Ok(service.genre_choices().await?)
    }
}

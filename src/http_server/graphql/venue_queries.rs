use async_graphql::{Context, Object, SimpleObject};

use crate::entities;
use crate::http_server::graphql::context::{get_app_state, now};
use crate::http_server::graphql::search::{DirectoryEntry, SearchResults};
use crate::http_server::graphql::show_queries::{Show, map_shows};
use crate::http_server::graphql_error::GraphqlResult;
use crate::services::directory::{self, DirectoryService};
use crate::services::genre::{GenreOwner, GenreService};
use crate::services::venue::VenueService;

#[derive(Debug, Clone, SimpleObject)]
pub struct Venue {
    pub id: i64,
    pub name: String,
    pub city: String,
    pub state: String,
    pub address: String,
    pub phone: Option<String>,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
    pub website_link: Option<String>,
    pub seeking_talent: bool,
    pub seeking_description: Option<String>,
}

impl From<entities::venue::Model> for Venue {
    fn from(model: entities::venue::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            city: model.city,
            state: model.state,
            address: model.address,
            phone: model.phone,
            image_link: model.image_link,
            facebook_link: model.facebook_link,
            website_link: model.website_link,
            seeking_talent: model.seeking_talent,
            seeking_description: model.seeking_description,
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
pub struct CityVenues {
    pub city: String,
    pub state: String,
    pub venues: Vec<DirectoryEntry>,
}

#[derive(Debug, Clone, SimpleObject)]
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
    pub past_shows: Vec<Show>,
    pub upcoming_shows: Vec<Show>,
    pub past_shows_count: i64,
    pub upcoming_shows_count: i64,
}

impl From<directory::VenueDetail> for VenueDetail {
    fn from(detail: directory::VenueDetail) -> Self {
        Self {
            id: detail.id,
            name: detail.name,
            genres: detail.genres,
            address: detail.address,
            city: detail.city,
            state: detail.state,
            phone: detail.phone,
            website_link: detail.website_link,
            facebook_link: detail.facebook_link,
            seeking_talent: detail.seeking_talent,
            seeking_description: detail.seeking_description,
            image_link: detail.image_link,
            past_shows: map_shows(detail.past_shows),
            upcoming_shows: map_shows(detail.upcoming_shows),
            past_shows_count: detail.past_shows_count as i64,
            upcoming_shows_count: detail.upcoming_shows_count as i64,
        }
    }
}

#[derive(Default)]
pub struct VenueQuery;

#[Object]
impl VenueQuery {
    /// Venues grouped by city and state.
    async fn venues(&self, ctx: &Context<'_>) -> GraphqlResult<Vec<CityVenues>> {
        let db = &get_app_state(ctx)?.db;
        let service = DirectoryService::new(db.clone());
        let groups = service.venues_by_city(now(ctx)?).await?;

        Ok(groups
            .into_iter()
            .map(|group| CityVenues {
                city: group.city,
                state: group.state,
                venues: group.venues.into_iter().map(Into::into).collect(),
            })
            .collect())
    }

    async fn venue(&self, ctx: &Context<'_>, id: i64) -> GraphqlResult<VenueDetail> {
        let db = &get_app_state(ctx)?.db;
        let service = DirectoryService::new(db.clone());
        Ok(service.venue_detail(id, now(ctx)?).await?.into())
    }

    /// Genres of venue `id`, sorted by name.
    async fn venue_genres(&self, ctx: &Context<'_>, id: i64) -> GraphqlResult<Vec<String>> {
        let db = &get_app_state(ctx)?.db;
        let service = GenreService::new(db.clone());
        Ok(service.genres_for(GenreOwner::Venue(id)).await?)
    }

    /// Case-insensitive partial match on venue name.
    async fn search_venues(&self, ctx: &Context<'_>, term: String) -> GraphqlResult<SearchResults> {
        let db = &get_app_state(ctx)?.db;
        let service = VenueService::new(db.clone());
        Ok(service.search(&term, now(ctx)?).await?.into())
    }
}

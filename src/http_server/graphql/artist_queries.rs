use async_graphql::{Context, Object, SimpleObject};

use crate::entities;
use crate::http_server::graphql::context::{get_app_state, now};
use crate::http_server::graphql::search::SearchResults;
use crate::http_server::graphql::show_queries::{Show, map_shows};
use crate::http_server::graphql_error::GraphqlResult;
use crate::services::artist::ArtistService;
use crate::services::directory::{self, DirectoryService};
use crate::services::genre::{GenreOwner, GenreService};

#[derive(Debug, Clone, SimpleObject)]
pub struct Artist {
    pub id: i64,
    pub name: String,
    pub city: String,
    pub state: String,
    pub phone: Option<String>,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
    pub website_link: Option<String>,
    pub seeking_venue: bool,
    pub seeking_description: Option<String>,
}

impl From<entities::artist::Model> for Artist {
    fn from(model: entities::artist::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            city: model.city,
            state: model.state,
            phone: model.phone,
            image_link: model.image_link,
            facebook_link: model.facebook_link,
            website_link: model.website_link,
            seeking_venue: model.seeking_venue,
            seeking_description: model.seeking_description,
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
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
    pub past_shows: Vec<Show>,
    pub upcoming_shows: Vec<Show>,
    pub past_shows_count: i64,
    pub upcoming_shows_count: i64,
}

impl From<directory::ArtistDetail> for ArtistDetail {
    fn from(detail: directory::ArtistDetail) -> Self {
        Self {
            id: detail.id,
            name: detail.name,
            genres: detail.genres,
            city: detail.city,
            state: detail.state,
            phone: detail.phone,
            website_link: detail.website_link,
            facebook_link: detail.facebook_link,
            seeking_venue: detail.seeking_venue,
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
pub struct ArtistQuery;

#[Object]
impl ArtistQuery {
    async fn artists(&self, ctx: &Context<'_>) -> GraphqlResult<Vec<Artist>> {
        let db = &get_app_state(ctx)?.db;
        let service = ArtistService::new(db.clone());
        let artists = service.list().await?;
        Ok(artists.into_iter().map(Into::into).collect())
    }

    async fn artist(&self, ctx: &Context<'_>, id: i64) -> GraphqlResult<ArtistDetail> {
        let db = &get_app_state(ctx)?.db;
        let service = DirectoryService::new(db.clone());
        Ok(service.artist_detail(id, now(ctx)?).await?.into())
    }

    async fn artist_genres(&self, ctx: &Context<'_>, id: i64) -> GraphqlResult<Vec<String>> {
        let db = &get_app_state(ctx)?.db;
        let service = GenreService::new(db.clone());
        Ok(service.genres_for(GenreOwner::Artist(id)).await?)
    }

    async fn search_artists(
        &self,
        ctx: &Context<'_>,
        term: String,
    ) -> GraphqlResult<SearchResults> {
        let db = &get_app_state(ctx)?.db;
        let service = ArtistService::new(db.clone());
        Ok(service.search(&term, now(ctx)?).await?.into())
    }
}

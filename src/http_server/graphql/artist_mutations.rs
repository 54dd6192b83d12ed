use async_graphql::{Context, InputObject, Object};

use crate::http_server::graphql::artist_queries::Artist;
use crate::http_server::graphql::context::get_app_state;
use crate::http_server::graphql_error::GraphqlResult;
use crate::services::artist::ArtistService;
use crate::services::genre::{GenreOwner, GenreService};
use crate::services::validation::ArtistForm;

#[derive(Debug, Clone, InputObject)]
pub struct ArtistInput {
    pub name: String,
    pub city: String,
    pub state: String,
    pub phone: Option<String>,
    pub image_link: Option<String>,
    pub website_link: Option<String>,
    pub facebook_link: Option<String>,
    #[graphql(default)]
    pub seeking_venue: bool,
    pub seeking_description: Option<String>,
    #[graphql(default)]
    pub genres: Vec<String>,
}

impl From<ArtistInput> for ArtistForm {
    fn from(input: ArtistInput) -> Self {
        Self {
            name: input.name,
            city: input.city,
            state: input.state,
            phone: input.phone,
            image_link: input.image_link,
            website_link: input.website_link,
            facebook_link: input.facebook_link,
            seeking_venue: input.seeking_venue,
            seeking_description: input.seeking_description,
            genres: input.genres,
        }
    }
}

#[derive(Default)]
pub struct ArtistMutation;

#[Object]
impl ArtistMutation {
    async fn create_artist(&self, ctx: &Context<'_>, input: ArtistInput) -> GraphqlResult<Artist> {
        let db = &get_app_state(ctx)?.db;
        let service = ArtistService::new(db.clone());
        Ok(service.create(input.into()).await?.into())
    }

    async fn update_artist(
        &self,
        ctx: &Context<'_>,
        id: i64,
        input: ArtistInput,
    ) -> GraphqlResult<Artist> {
        let db = &get_app_state(ctx)?.db;
        let service = ArtistService::new(db.clone());
        Ok(service.update(id, input.into()).await?.into())
    }

    async fn set_artist_genres(
        &self,
        ctx: &Context<'_>,
        id: i64,
        genres: Vec<String>,
    ) -> GraphqlResult<Artist> {
        let db = &get_app_state(ctx)?.db;
        GenreService::new(db.clone())
            .replace_genres(GenreOwner::Artist(id), genres)
            .await?;
        Ok(ArtistService::new(db.clone()).get(id).await?.into())
    }

    async fn delete_artist(&self, ctx: &Context<'_>, id: i64) -> GraphqlResult<Artist> {
        let db = &get_app_state(ctx)?.db;
        let service = ArtistService::new(db.clone());
        Ok(service.delete(id).await?.into())
    }
}

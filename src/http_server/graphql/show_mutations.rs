use async_graphql::{Context, Object};
use chrono::{DateTime, Utc};

use crate::entities;
use crate::http_server::graphql::context::get_app_state;
use crate::http_server::graphql_error::GraphqlResult;
use crate::services::show::ShowService;

#[derive(Debug, Clone, async_graphql::SimpleObject)]
pub struct ScheduledShow {
    pub id: i64,
    pub artist_id: i64,
    pub venue_id: i64,
    pub start_time: DateTime<Utc>,
}

impl From<entities::show::Model> for ScheduledShow {
    fn from(model: entities::show::Model) -> Self {
        Self {
            id: model.id,
            artist_id: model.artist_id,
            venue_id: model.venue_id,
            start_time: model.show_date,
        }
    }
}

#[derive(Default)]
pub struct ShowMutation;

#[Object]
impl ShowMutation {
    async fn create_show(
        &self,
        ctx: &Context<'_>,
        artist_id: i64,
        venue_id: i64,
        start_time: DateTime<Utc>,
    ) -> GraphqlResult<ScheduledShow> {
        let db = &get_app_state(ctx)?.db;
        let service = ShowService::new(db.clone());
        let show = service.create(artist_id, venue_id, start_time).await?;
        Ok(show.into())
    }
}

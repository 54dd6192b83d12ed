use std::sync::Arc;

use async_graphql::http::GraphiQLSource;
use async_graphql::{EmptySubscription, MergedObject, Schema};
use axum::response::{Html, IntoResponse};

use crate::http_server::state::AppState;

pub mod artist_mutations;
pub mod artist_queries;
mod context;
pub mod search;
pub mod show_mutations;
pub mod show_queries;
pub mod venue_mutations;
pub mod venue_queries;

use artist_mutations::ArtistMutation;
use artist_queries::ArtistQuery;
use show_mutations::ShowMutation;
use show_queries::ShowQuery;
use venue_mutations::VenueMutation;
use venue_queries::VenueQuery;

#[derive(Default, MergedObject)]
pub struct Query(VenueQuery, ArtistQuery, ShowQuery);

#[derive(Default, MergedObject)]
pub struct Mutation(VenueMutation, ArtistMutation, ShowMutation);

pub type BookingSchema = Schema<Query, Mutation, EmptySubscription>;

pub async fn graphql() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}

pub fn create_schema(app_state: Arc<AppState>) -> BookingSchema {
    Schema::build(Query::default(), Mutation::default(), EmptySubscription)
        .data(app_state)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::clock::MockClock;
    use crate::test_utils::{reference_now, seeded_db};
    use serde_json::{Value, json};

    async fn schema() -> BookingSchema {
        let mut clock = MockClock::new();
        clock.expect_now().return_const(reference_now());

        create_schema(Arc::new(AppState {
            db: seeded_db().await,
            clock: Arc::new(clock),
        }))
    }

    async fn execute(schema: &BookingSchema, query: &str) -> Value {
        let response = schema.execute(query).await;
        serde_json::to_value(&response).unwrap()
    }

    fn first_error(response: &Value) -> &Value {
        &response["errors"][0]["extensions"]
    }

    #[tokio::test]
    async fn test_venues_grouped_by_city() {
        let schema = schema().await;
        let response = execute(
            &schema,
            "{ venues { city state venues { id name numUpcomingShows } } }",
        )
        .await;

        assert_eq!(
            response["data"]["venues"],
            json!([
                {
                    "city": "San Francisco",
                    "state": "CA",
                    "venues": [
                        { "id": 1, "name": "The Musical Hop", "numUpcomingShows": 0 },
                        { "id": 3, "name": "Park Square Live Music & Coffee", "numUpcomingShows": 3 },
                    ]
                },
                {
                    "city": "New York",
                    "state": "NY",
                    "venues": [
                        { "id": 2, "name": "The Dueling Pianos Bar", "numUpcomingShows": 0 },
                    ]
                },
            ])
        );
    }

    #[tokio::test]
    async fn test_venue_detail() {
        let schema = schema().await;
        let response = execute(
            &schema,
            "{ venue(id: 3) { name genres pastShowsCount upcomingShowsCount pastShows { artistName } } }",
        )
        .await;

        let venue = &response["data"]["venue"];
        assert_eq!(venue["name"], "Park Square Live Music & Coffee");
        assert_eq!(venue["genres"], json!(["Classical", "Folk", "Jazz", "Rock n Roll"]));
        assert_eq!(venue["pastShowsCount"], 1);
        assert_eq!(venue["upcomingShowsCount"], 3);
        assert_eq!(venue["pastShows"][0]["artistName"], "Matt Quevedo");
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive() {
        let schema = schema().await;
        let response = execute(
            &schema,
            r#"{ searchVenues(term: "music") { count data { name } } searchArtists(term: "A") { count } }"#,
        )
        .await;

        assert_eq!(response["data"]["searchVenues"]["count"], 2);
        assert_eq!(
            response["data"]["searchVenues"]["data"],
            json!([
                { "name": "The Musical Hop" },
                { "name": "Park Square Live Music & Coffee" },
            ])
        );
        assert_eq!(response["data"]["searchArtists"]["count"], 3);
    }

    #[tokio::test]
    async fn test_genres() {
        let schema = schema().await;
        let response = execute(&schema, "{ genres }").await;

        let genres = response["data"]["genres"].as_array().unwrap();
        assert_eq!(genres.len(), 19);
        assert_eq!(genres[0], "Alternative");
    }

    #[tokio::test]
    async fn test_create_venue_and_read_back() {
        let schema = schema().await;
        let response = execute(
            &schema,
            r#"mutation {
                createVenue(input: {
                    name: "The Blue Note"
                    city: "New York"
                    state: "NY"
                    address: "131 W 3rd St"
                    genres: ["Jazz", "Blues"]
                }) { id name seekingTalent }
            }"#,
        )
        .await;

        assert!(response["errors"].is_null(), "{response}");
        let created = &response["data"]["createVenue"];
        assert_eq!(created["name"], "The Blue Note");
        assert_eq!(created["seekingTalent"], false);

        let id = created["id"].as_i64().unwrap();
        let response = execute(&schema, &format!("{{ venue(id: {id}) {{ genres }} }}")).await;
        assert_eq!(response["data"]["venue"]["genres"], json!(["Blues", "Jazz"]));
    }

    #[tokio::test]
    async fn test_set_genres_replaces_whole_set() {
        let schema = schema().await;
        let response = execute(
            &schema,
            r#"mutation { setVenueGenres(id: 2, genres: ["Soul", "Jazz", "Soul"]) { name } }"#,
        )
        .await;
        assert_eq!(
            response["data"]["setVenueGenres"]["name"],
            "The Dueling Pianos Bar"
        );

        let response = execute(
            &schema,
            r#"mutation { setArtistGenres(id: 1, genres: []) { id } }"#,
        )
        .await;
        assert_eq!(response["data"]["setArtistGenres"]["id"], 1);

        let response = execute(&schema, "{ venueGenres(id: 2) artistGenres(id: 1) }").await;
        assert_eq!(response["data"]["venueGenres"], json!(["Jazz", "Soul"]));
        assert_eq!(response["data"]["artistGenres"], json!([]));
    }

    #[tokio::test]
    async fn test_set_genres_failures_keep_previous_set() {
        let schema = schema().await;

        let response = execute(
            &schema,
            r#"mutation { setVenueGenres(id: 1, genres: ["Jazz", "Polka"]) { id } }"#,
        )
        .await;
        let extensions = first_error(&response);
        assert_eq!(extensions["code"], "NOT_FOUND");
        assert_eq!(extensions["entity"], "Genre");

        let response = execute(&schema, "{ venueGenres(id: 1) }").await;
        assert_eq!(
            response["data"]["venueGenres"],
            json!(["Classical", "Folk", "Jazz", "Reggae"])
        );

        let response = execute(
            &schema,
            r#"mutation { setArtistGenres(id: 404, genres: ["Jazz"]) { id } }"#,
        )
        .await;
        let extensions = first_error(&response);
        assert_eq!(extensions["code"], "NOT_FOUND");
        assert_eq!(extensions["entity"], "Artist");
    }

    #[tokio::test]
    async fn test_validation_error_extensions() {
        let schema = schema().await;
        let response = execute(
            &schema,
            r#"mutation {
                createArtist(input: { name: "Nobody", city: "Austin", state: "TX", phone: "call me" }) { id }
            }"#,
        )
        .await;

        let extensions = first_error(&response);
        assert_eq!(extensions["code"], "VALIDATION");
        assert_eq!(extensions["entity"], "Artist");
        assert_eq!(extensions["field"], "phone");
    }

    #[tokio::test]
    async fn test_create_show_with_unknown_artist() {
        let schema = schema().await;
        let response = execute(
            &schema,
            r#"mutation { createShow(artistId: 404, venueId: 1, startTime: "2030-07-04T20:00:00Z") { id } }"#,
        )
        .await;

        let extensions = first_error(&response);
        assert_eq!(extensions["code"], "NOT_FOUND");
        assert_eq!(extensions["entity"], "Artist");

        let response = execute(&schema, "{ shows { id } }").await;
        assert_eq!(response["data"]["shows"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_create_show() {
        let schema = schema().await;
        let response = execute(
            &schema,
            r#"mutation { createShow(artistId: 2, venueId: 1, startTime: "2030-07-04T20:00:00Z") { artistId venueId } }"#,
        )
        .await;

        assert_eq!(
            response["data"]["createShow"],
            json!({ "artistId": 2, "venueId": 1 })
        );

        let response = execute(&schema, "{ artist(id: 2) { upcomingShowsCount } }").await;
        assert_eq!(response["data"]["artist"]["upcomingShowsCount"], 1);
    }

    #[tokio::test]
    async fn test_delete_blocked_by_shows() {
        let schema = schema().await;
        let response = execute(&schema, "mutation { deleteVenue(id: 3) { id } }").await;

        let extensions = first_error(&response);
        assert_eq!(extensions["code"], "REFERENTIAL_INTEGRITY");
        assert_eq!(extensions["entity"], "Venue");
        assert_eq!(extensions["shows"], 4);

        let response = execute(&schema, "mutation { deleteVenue(id: 2) { name } }").await;
        assert_eq!(
            response["data"]["deleteVenue"]["name"],
            "The Dueling Pianos Bar"
        );
    }
}

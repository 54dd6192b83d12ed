use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use sea_orm::{ConnectionTrait, Database as SeaDatabase};

use crate::database::Database;
use crate::services::seed::seed;

pub async fn test_db() -> Arc<Database> {
    let conn = SeaDatabase::connect("sqlite::memory:?mode=rwc")
        .await
        .unwrap();

    // Enable foreign keys
    conn.execute_unprepared("PRAGMA foreign_keys = ON")
        .await
        .unwrap();

    let db = Database::migrate(conn)
        .await
        .unwrap_or_else(|e| panic!("Failed to migrate test database: {e:?}"));

    Arc::new(db)
}

/// A migrated database holding the sample directory (3 venues, 3 artists, 5 shows).
pub async fn seeded_db() -> Arc<Database> {
    let db = test_db().await;
    seed(&db).await.unwrap();
    db
}

/// Fixed reference time between the 2019 and the 2035 sample shows.
pub fn reference_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()
}

use async_graphql::SimpleObject;

use crate::services::directory;

#[derive(Debug, Clone, SimpleObject)]
pub struct DirectoryEntry {
    pub id: i64,
    pub name: String,
    pub num_upcoming_shows: i64,
}

impl From<directory::DirectoryEntry> for DirectoryEntry {
    fn from(entry: directory::DirectoryEntry) -> Self {
        Self {
            id: entry.id,
            name: entry.name,
            num_upcoming_shows: entry.num_upcoming_shows as i64,
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
pub struct SearchResults {
    pub count: i64,
    pub data: Vec<DirectoryEntry>,
}

impl From<directory::SearchResults> for SearchResults {
    fn from(results: directory::SearchResults) -> Self {
        Self {
            count: results.count as i64,
            data: results.data.into_iter().map(Into::into).collect(),
        }
    }
}

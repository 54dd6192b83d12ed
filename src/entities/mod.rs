pub mod artist;
pub mod artist_genre;
pub mod lookup;
pub mod show;
pub mod venue;
pub mod venue_genre;

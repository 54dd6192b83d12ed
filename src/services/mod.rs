pub mod artist;
pub mod directory;
pub mod genre;
pub mod lookup;
pub mod seed;
pub mod show;
pub mod validation;
pub mod venue;

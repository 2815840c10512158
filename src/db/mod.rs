//! Persistence module split across logical submodules.

mod artists;
mod connection;
mod error;
mod fields;
mod shows;
mod venues;

pub use artists::{
    artist_detail, create_artist, delete_artist, fetch_artists, search_artists, update_artist,
};
pub use connection::ensure_schema;
pub use error::{StoreError, StoreResult};
pub use fields::{ArtistFields, VenueFields};
pub use shows::{create_show, delete_show, fetch_shows};
pub use venues::{
    create_venue, delete_venue, fetch_venue_groups, search_venues, update_venue, venue_detail,
};

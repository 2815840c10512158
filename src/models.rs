//! Domain models that mirror the SQLite schema and get passed throughout the
//! TUI. The intent is that these types stay light-weight data holders so other
//! layers can focus on presentation and persistence logic. Optional columns
//! are plain `String`s with the empty string meaning "not provided", which
//! keeps row mapping and form round-trips trivial.

use std::fmt;

use chrono::NaiveDateTime;

/// Fixed genre vocabulary offered by the profile forms. Tags are stored
/// comma-joined, so none of these may contain a comma.
pub const GENRES: &[&str] = &[
    "Alternative",
    "Blues",
    "Classical",
    "Country",
    "Electronic",
    "Folk",
    "Funk",
    "Hip-Hop",
    "Heavy Metal",
    "Instrumental",
    "Jazz",
    "Musical Theatre",
    "Pop",
    "Punk",
    "R&B",
    "Reggae",
    "Rock n Roll",
    "Soul",
    "Other",
];

/// US state codes accepted by the profile forms.
pub const STATES: &[&str] = &[
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "DC", "FL", "GA", "HI", "ID", "IL", "IN",
    "IA", "KS", "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH",
    "NJ", "NM", "NY", "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT",
    "VT", "VA", "WA", "WV", "WI", "WY",
];

/// Join a tag list into the comma-separated form stored in the database.
pub fn join_genres(genres: &[String]) -> String {
    genres.join(",")
}

/// Split a stored genre column back into its tag list. An empty column yields
/// an empty list rather than one empty tag.
pub fn split_genres(stored: &str) -> Vec<String> {
    if stored.is_empty() {
        Vec::new()
    } else {
        stored.split(',').map(str::to_string).collect()
    }
}

#[derive(Debug, Clone)]
/// A place that hosts shows. Mirrors a row in the `venue` table.
pub struct Venue {
    /// Primary key from the database. Kept around even when the UI only needs
    /// display information because edit/delete flows bubble the id back to
    /// the persistence layer.
    pub id: i64,
    pub name: String,
    /// Tags drawn from [`GENRES`], order preserved from form input.
    pub genres: Vec<String>,
    pub address: String,
    pub city: String,
    /// Two-letter code drawn from [`STATES`].
    pub state: String,
    pub phone: String,
    pub website: String,
    pub facebook_link: String,
    /// Whether the venue is currently looking for performers.
    pub seeking_talent: bool,
    /// Pitch shown to artists; required whenever `seeking_talent` is set.
    pub seeking_description: String,
    pub image_link: String,
}

impl Venue {
    /// `City, ST` rendering shared by the board headers and detail view.
    pub fn location(&self) -> String {
        format!("{}, {}", self.city, self.state)
    }
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone)]
/// A performer that can be booked into shows. Identical shape to [`Venue`]
/// except there is no street address and the seeking flag points the other
/// way (an artist seeks venues).
pub struct Artist {
    pub id: i64,
    pub name: String,
    pub genres: Vec<String>,
    pub city: String,
    pub state: String,
    pub phone: String,
    pub website: String,
    pub facebook_link: String,
    pub seeking_venue: bool,
    pub seeking_description: String,
    pub image_link: String,
}

impl Artist {
    pub fn location(&self) -> String {
        format!("{}, {}", self.city, self.state)
    }
}

impl fmt::Display for Artist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone)]
/// A scheduled pairing of one artist and one venue at a specific time. A show
/// has no identity beyond that pairing plus the timestamp.
pub struct Show {
    pub id: i64,
    /// Naive wall-clock time; the directory never normalizes timezones.
    pub start_time: NaiveDateTime,
    pub artist_id: i64,
    pub venue_id: i64,
}

/// Minimal `{id, name}` row used by the grouped venue board, the artist list,
/// and both search result sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub id: i64,
    pub name: String,
}

/// One (city, state) bucket of the venue board.
#[derive(Debug, Clone)]
pub struct CityGroup {
    pub city: String,
    pub state: String,
    pub venues: Vec<DirectoryEntry>,
}

/// Result of a name search: the match count plus the matching rows.
#[derive(Debug, Clone)]
pub struct SearchResults {
    pub count: usize,
    pub matches: Vec<DirectoryEntry>,
}

/// Which side of the evaluation instant a show falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowTiming {
    Past,
    Upcoming,
}

impl ShowTiming {
    /// Classify a show against an explicit evaluation instant: strictly
    /// before `now` is past, everything else (including a show starting at
    /// exactly `now`) is upcoming. Callers supply `now` so a detail query
    /// uses one consistent instant and tests can pin the boundary.
    pub fn classify(start_time: NaiveDateTime, now: NaiveDateTime) -> Self {
        if start_time < now {
            ShowTiming::Past
        } else {
            ShowTiming::Upcoming
        }
    }
}

/// A show as it appears on a venue's detail page: the booked artist plus the
/// start time.
#[derive(Debug, Clone)]
pub struct VenueShowEntry {
    pub artist_id: i64,
    pub artist_name: String,
    pub artist_image_link: String,
    pub start_time: NaiveDateTime,
}

/// A show as it appears on an artist's detail page: the hosting venue plus
/// the start time.
#[derive(Debug, Clone)]
pub struct ArtistShowEntry {
    pub venue_id: i64,
    pub venue_name: String,
    pub venue_image_link: String,
    pub start_time: NaiveDateTime,
}

/// Everything the venue detail screen renders: the full record plus its shows
/// split around the evaluation instant.
#[derive(Debug, Clone)]
pub struct VenueDetail {
    pub venue: Venue,
    pub past_shows: Vec<VenueShowEntry>,
    pub upcoming_shows: Vec<VenueShowEntry>,
}

impl VenueDetail {
    pub fn past_shows_count(&self) -> usize {
        self.past_shows.len()
    }

    pub fn upcoming_shows_count(&self) -> usize {
        self.upcoming_shows.len()
    }
}

/// Mirror of [`VenueDetail`] for the artist side.
#[derive(Debug, Clone)]
pub struct ArtistDetail {
    pub artist: Artist,
    pub past_shows: Vec<ArtistShowEntry>,
    pub upcoming_shows: Vec<ArtistShowEntry>,
}

impl ArtistDetail {
    pub fn past_shows_count(&self) -> usize {
        self.past_shows.len()
    }

    pub fn upcoming_shows_count(&self) -> usize {
        self.upcoming_shows.len()
    }
}

/// A show joined with both endpoints for the all-shows screen.
#[derive(Debug, Clone)]
pub struct ShowListing {
    pub id: i64,
    pub start_time: NaiveDateTime,
    pub venue_id: i64,
    pub venue_name: String,
    pub artist_id: i64,
    pub artist_name: String,
    pub artist_image_link: String,
}

impl ShowListing {
    /// `Artist @ Venue` rendering used by show rows and the cancel dialog.
    pub fn billing(&self) -> String {
        format!("{} @ {}", self.artist_name, self.venue_name)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn classify_is_strict_around_the_instant() {
        let now = at(12, 0);
        assert_eq!(ShowTiming::classify(at(11, 59), now), ShowTiming::Past);
        assert_eq!(ShowTiming::classify(at(12, 1), now), ShowTiming::Upcoming);
    }

    #[test]
    fn show_starting_at_the_evaluation_instant_is_upcoming() {
        let now = at(12, 0);
        assert_eq!(ShowTiming::classify(now, now), ShowTiming::Upcoming);
    }

    #[test]
    fn genre_round_trip_preserves_order() {
        let tags = vec!["Jazz".to_string(), "Classical".to_string()];
        assert_eq!(split_genres(&join_genres(&tags)), tags);
        assert!(split_genres("").is_empty());
    }
}

use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use directories::BaseDirs;
use rusqlite::{params, Connection};

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".gigbook";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "directory.sqlite";

/// Ensure the database file exists, run lazy migrations, and return a live
/// connection. The function also toggles `PRAGMA foreign_keys = ON` so the
/// referential integrity checks in our schema behave the same during tests
/// and production runs. A brand-new database is seeded with a small sample
/// directory so the boards are not empty on first launch.
pub fn ensure_schema() -> Result<Connection> {
    let db_path = db_path()?;

    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent).context("failed to create data directory")?;
    }

    let conn = Connection::open(&db_path).context("failed to open SQLite database")?;
    init_schema(&conn).context("failed to initialize schema")?;
    seed_if_empty(&conn).context("failed to seed sample directory")?;

    Ok(conn)
}

/// Create the three directory tables if they are missing. Kept separate from
/// [`ensure_schema`] so tests can run against `Connection::open_in_memory()`.
pub(crate) fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute("PRAGMA foreign_keys = ON", [])?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS venue (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            genres TEXT NOT NULL,
            address TEXT NOT NULL,
            city TEXT NOT NULL,
            state TEXT NOT NULL,
            phone TEXT NOT NULL,
            website TEXT NOT NULL,
            facebook_link TEXT NOT NULL,
            seeking_talent INTEGER NOT NULL,
            seeking_description TEXT NOT NULL,
            image_link TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS artist (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            genres TEXT NOT NULL,
            city TEXT NOT NULL,
            state TEXT NOT NULL,
            phone TEXT NOT NULL,
            website TEXT NOT NULL,
            facebook_link TEXT NOT NULL,
            seeking_venue INTEGER NOT NULL,
            seeking_description TEXT NOT NULL,
            image_link TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS show (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            start_time TEXT NOT NULL,
            artist_id INTEGER NOT NULL REFERENCES artist(id),
            venue_id INTEGER NOT NULL REFERENCES venue(id)
        )",
        [],
    )?;

    Ok(())
}

/// Populate a fresh database with the sample directory: three venues, three
/// artists, and their shows (two already played, three booked far out).
fn seed_if_empty(conn: &Connection) -> rusqlite::Result<()> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM venue", [], |row| row.get(0))?;
    if count > 0 {
        return Ok(());
    }

    let hop = insert_venue(
        conn,
        SeedVenue {
            name: "The Musical Hop",
            genres: "Jazz,Reggae,Classical,Folk",
            address: "1015 Folsom Street",
            city: "San Francisco",
            state: "CA",
            phone: "123-123-1234",
            website: "https://www.themusicalhop.com",
            facebook_link: "https://www.facebook.com/TheMusicalHop",
            seeking_talent: true,
            seeking_description:
                "We are on the lookout for a local artist to play every two weeks. Please call us.",
            image_link:
                "https://images.unsplash.com/photo-1543900694-133f37abaaa5?ixlib=rb-1.2.1&auto=format&fit=crop&w=400&q=60",
        },
    )?;

    let park_square = insert_venue(
        conn,
        SeedVenue {
            name: "Park Square Live Music & Coffee",
            genres: "Rock n Roll,Jazz,Classical,Folk",
            address: "34 Whiskey Moore Ave",
            city: "San Francisco",
            state: "CA",
            phone: "415-000-1234",
            website: "https://www.parksquarelivemusicandcoffee.com",
            facebook_link: "https://www.facebook.com/ParkSquareLiveMusicAndCoffee",
            seeking_talent: false,
            seeking_description: "",
            image_link:
                "https://images.unsplash.com/photo-1485686531765-ba63b07845a7?ixlib=rb-1.2.1&auto=format&fit=crop&w=747&q=80",
        },
    )?;

    insert_venue(
        conn,
        SeedVenue {
            name: "The Dueling Pianos Bar",
            genres: "Classical,R&B,Hip-Hop",
            address: "335 Delancey Street",
            city: "New York",
            state: "NY",
            phone: "914-003-1132",
            website: "https://www.theduelingpianos.com",
            facebook_link: "https://www.facebook.com/theduelingpianos",
            seeking_talent: false,
            seeking_description: "",
            image_link:
                "https://images.unsplash.com/photo-1497032205916-ac775f0649ae?ixlib=rb-1.2.1&auto=format&fit=crop&w=750&q=80",
        },
    )?;

    let guns_n_petals = insert_artist(
        conn,
        SeedArtist {
            name: "Guns N Petals",
            genres: "Rock n Roll",
            city: "San Francisco",
            state: "CA",
            phone: "326-123-5000",
            website: "https://www.gunsnpetalsband.com",
            facebook_link: "https://www.facebook.com/GunsNPetals",
            seeking_venue: true,
            seeking_description:
                "Looking for shows to perform at in the San Francisco Bay Area!",
            image_link:
                "https://images.unsplash.com/photo-1549213783-8284d0336c4f?ixlib=rb-1.2.1&auto=format&fit=crop&w=300&q=80",
        },
    )?;

    let matt_quevedo = insert_artist(
        conn,
        SeedArtist {
            name: "Matt Quevedo",
            genres: "Jazz",
            city: "New York",
            state: "NY",
            phone: "300-400-5000",
            website: "",
            facebook_link: "https://www.facebook.com/mattquevedo923251523",
            seeking_venue: false,
            seeking_description: "",
            image_link:
                "https://images.unsplash.com/photo-1495223153807-b916f75de8c5?ixlib=rb-1.2.1&auto=format&fit=crop&w=334&q=80",
        },
    )?;

    let wild_sax_band = insert_artist(
        conn,
        SeedArtist {
            name: "The Wild Sax Band",
            genres: "Jazz,Classical",
            city: "San Francisco",
            state: "CA",
            phone: "432-325-5432",
            website: "",
            facebook_link: "",
            seeking_venue: false,
            seeking_description: "",
            image_link:
                "https://images.unsplash.com/photo-1558369981-f9ca78462e61?ixlib=rb-1.2.1&auto=format&fit=crop&w=794&q=80",
        },
    )?;

    let shows = [
        (guns_n_petals, hop, seed_time(2019, 5, 21, 21, 30)),
        (matt_quevedo, park_square, seed_time(2019, 6, 15, 23, 0)),
        (wild_sax_band, park_square, seed_time(2035, 4, 1, 20, 0)),
        (wild_sax_band, park_square, seed_time(2035, 4, 8, 20, 0)),
        (wild_sax_band, park_square, seed_time(2035, 4, 15, 20, 0)),
    ];
    for (artist_id, venue_id, start_time) in shows {
        conn.execute(
            "INSERT INTO show (start_time, artist_id, venue_id) VALUES (?1, ?2, ?3)",
            params![start_time, artist_id, venue_id],
        )?;
    }

    Ok(())
}

/// Literal seed row for a venue. A dedicated struct keeps the insert calls
/// readable next to eleven positional columns.
struct SeedVenue {
    name: &'static str,
    genres: &'static str,
    address: &'static str,
    city: &'static str,
    state: &'static str,
    phone: &'static str,
    website: &'static str,
    facebook_link: &'static str,
    seeking_talent: bool,
    seeking_description: &'static str,
    image_link: &'static str,
}

struct SeedArtist {
    name: &'static str,
    genres: &'static str,
    city: &'static str,
    state: &'static str,
    phone: &'static str,
    website: &'static str,
    facebook_link: &'static str,
    seeking_venue: bool,
    seeking_description: &'static str,
    image_link: &'static str,
}

fn insert_venue(conn: &Connection, venue: SeedVenue) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO venue (name, genres, address, city, state, phone, website,
             facebook_link, seeking_talent, seeking_description, image_link)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            venue.name,
            venue.genres,
            venue.address,
            venue.city,
            venue.state,
            venue.phone,
            venue.website,
            venue.facebook_link,
            venue.seeking_talent,
            venue.seeking_description,
            venue.image_link,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn insert_artist(conn: &Connection, artist: SeedArtist) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO artist (name, genres, city, state, phone, website,
             facebook_link, seeking_venue, seeking_description, image_link)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            artist.name,
            artist.genres,
            artist.city,
            artist.state,
            artist.phone,
            artist.website,
            artist.facebook_link,
            artist.seeking_venue,
            artist.seeking_description,
            artist.image_link,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn seed_time(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .expect("seed date is valid")
        .and_hms_opt(hour, minute, 0)
        .expect("seed time is valid")
}

/// Resolve the absolute path to the SQLite database inside the user's home.
fn db_path() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME).join(DB_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_creation_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();

        let venues: i64 = conn
            .query_row("SELECT COUNT(*) FROM venue", [], |row| row.get(0))
            .unwrap();
        assert_eq!(venues, 0);
    }

    #[test]
    fn seeding_runs_once() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        seed_if_empty(&conn).unwrap();
        seed_if_empty(&conn).unwrap();

        let venues: i64 = conn
            .query_row("SELECT COUNT(*) FROM venue", [], |row| row.get(0))
            .unwrap();
        let shows: i64 = conn
            .query_row("SELECT COUNT(*) FROM show", [], |row| row.get(0))
            .unwrap();
        assert_eq!(venues, 3);
        assert_eq!(shows, 5);
    }
}

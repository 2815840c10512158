use chrono::NaiveDateTime;
use rusqlite::{params, Connection};

use crate::db::error::{StoreError, StoreResult};
use crate::models::{Show, ShowListing};

/// Every show joined with both endpoints, in table order. Feeds the
/// all-shows screen.
pub fn fetch_shows(conn: &Connection) -> StoreResult<Vec<ShowListing>> {
    let mut stmt = conn.prepare(
        "SELECT s.id, s.start_time, v.id, v.name, a.id, a.name, a.image_link
         FROM show s
         INNER JOIN venue v ON v.id = s.venue_id
         INNER JOIN artist a ON a.id = s.artist_id",
    )?;
    let shows = stmt
        .query_map([], |row| {
            Ok(ShowListing {
                id: row.get(0)?,
                start_time: row.get(1)?,
                venue_id: row.get(2)?,
                venue_name: row.get(3)?,
                artist_id: row.get(4)?,
                artist_name: row.get(5)?,
                artist_image_link: row.get(6)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(shows)
}

/// Book an artist into a venue at a start time. Both endpoints are checked
/// before the insert; a missing one surfaces as a validation failure naming
/// it, and nothing persists. The check and the insert share one transaction
/// so a failure can never leave a half-written booking behind.
pub fn create_show(
    conn: &mut Connection,
    artist_id: i64,
    venue_id: i64,
    start_time: NaiveDateTime,
) -> StoreResult<Show> {
    let tx = conn.transaction()?;

    let artist_exists: bool = tx.query_row(
        "SELECT EXISTS(SELECT 1 FROM artist WHERE id = ?1)",
        [artist_id],
        |row| row.get(0),
    )?;
    if !artist_exists {
        return Err(StoreError::validation(format!(
            "Artist {artist_id} does not exist."
        )));
    }

    let venue_exists: bool = tx.query_row(
        "SELECT EXISTS(SELECT 1 FROM venue WHERE id = ?1)",
        [venue_id],
        |row| row.get(0),
    )?;
    if !venue_exists {
        return Err(StoreError::validation(format!(
            "Venue {venue_id} does not exist."
        )));
    }

    tx.execute(
        "INSERT INTO show (start_time, artist_id, venue_id) VALUES (?1, ?2, ?3)",
        params![start_time, artist_id, venue_id],
    )?;
    let id = tx.last_insert_rowid();
    tx.commit()?;

    Ok(Show {
        id,
        start_time,
        artist_id,
        venue_id,
    })
}

/// Cancel a show. Zero touched rows means the id is gone.
pub fn delete_show(conn: &Connection, id: i64) -> StoreResult<()> {
    let deleted = conn.execute("DELETE FROM show WHERE id = ?1", [id])?;

    if deleted == 0 {
        Err(StoreError::NotFound("Show"))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::db::artists::create_artist;
    use crate::db::connection::init_schema;
    use crate::db::fields::{ArtistFields, VenueFields};
    use crate::db::venues::create_venue;

    use super::*;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    fn sample_pair(conn: &Connection) -> (i64, i64) {
        let artist = create_artist(
            conn,
            &ArtistFields {
                name: "Guns N Petals".to_string(),
                genres: vec!["Rock n Roll".to_string()],
                city: "San Francisco".to_string(),
                state: "CA".to_string(),
                image_link: "https://example.com/artist.jpg".to_string(),
                ..ArtistFields::default()
            },
        )
        .unwrap();
        let venue = create_venue(
            conn,
            &VenueFields {
                name: "The Musical Hop".to_string(),
                genres: vec!["Jazz".to_string()],
                address: "1015 Folsom Street".to_string(),
                city: "San Francisco".to_string(),
                state: "CA".to_string(),
                ..VenueFields::default()
            },
        )
        .unwrap();
        (artist.id, venue.id)
    }

    fn at(year: i32, month: u32, day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(21, 30, 0)
            .unwrap()
    }

    #[test]
    fn booking_round_trips_through_the_listing() {
        let mut conn = test_conn();
        let (artist_id, venue_id) = sample_pair(&conn);

        let show = create_show(&mut conn, artist_id, venue_id, at(2035, 4, 1)).unwrap();
        assert_eq!(show.artist_id, artist_id);

        let listings = fetch_shows(&conn).unwrap();
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].billing(), "Guns N Petals @ The Musical Hop");
        assert_eq!(listings[0].start_time, at(2035, 4, 1));
        assert_eq!(
            listings[0].artist_image_link,
            "https://example.com/artist.jpg"
        );
    }

    #[test]
    fn booking_a_missing_artist_persists_nothing() {
        let mut conn = test_conn();
        let (_, venue_id) = sample_pair(&conn);

        let result = create_show(&mut conn, 999, venue_id, at(2035, 4, 1));
        match result {
            Err(StoreError::Validation(message)) => {
                assert!(message.contains("Artist 999"));
            }
            other => panic!("expected validation failure, got {other:?}"),
        }

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM show", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn booking_a_missing_venue_persists_nothing() {
        let mut conn = test_conn();
        let (artist_id, _) = sample_pair(&conn);

        assert!(matches!(
            create_show(&mut conn, artist_id, 999, at(2035, 4, 1)),
            Err(StoreError::Validation(_))
        ));
    }

    #[test]
    fn cancelling_a_show_checks_existence() {
        let mut conn = test_conn();
        let (artist_id, venue_id) = sample_pair(&conn);
        let show = create_show(&mut conn, artist_id, venue_id, at(2035, 4, 1)).unwrap();

        delete_show(&conn, show.id).unwrap();
        assert!(matches!(
            delete_show(&conn, show.id),
            Err(StoreError::NotFound("Show"))
        ));
    }
}

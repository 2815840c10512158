use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};

use crate::db::error::{StoreError, StoreResult};
use crate::db::fields::ArtistFields;
use crate::db::venues::escape_like;
use crate::models::{
    join_genres, split_genres, Artist, ArtistDetail, ArtistShowEntry, DirectoryEntry,
    SearchResults, ShowTiming,
};

/// Every artist as a flat `{id, name}` listing, in table order.
pub fn fetch_artists(conn: &Connection) -> StoreResult<Vec<DirectoryEntry>> {
    let mut stmt = conn.prepare("SELECT id, name FROM artist")?;
    let artists = stmt
        .query_map([], |row| {
            Ok(DirectoryEntry {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(artists)
}

/// Case-insensitive substring search over artist names, same semantics as
/// the venue search.
pub fn search_artists(conn: &Connection, fragment: &str) -> StoreResult<SearchResults> {
    let mut stmt = conn.prepare(
        "SELECT id, name FROM artist WHERE name LIKE '%' || ?1 || '%' ESCAPE '\\'",
    )?;
    let matches = stmt
        .query_map([escape_like(fragment)], |row| {
            Ok(DirectoryEntry {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SearchResults {
        count: matches.len(),
        matches,
    })
}

/// Load one artist with their bookings split around the supplied evaluation
/// instant. Each show entry names the hosting venue.
pub fn artist_detail(conn: &Connection, id: i64, now: NaiveDateTime) -> StoreResult<ArtistDetail> {
    let artist = conn
        .query_row(
            "SELECT id, name, genres, city, state, phone, website, facebook_link,
                    seeking_venue, seeking_description, image_link
             FROM artist WHERE id = ?1",
            [id],
            row_to_artist,
        )
        .optional()?
        .ok_or(StoreError::NotFound("Artist"))?;

    let mut stmt = conn.prepare(
        "SELECT v.id, v.name, v.image_link, s.start_time
         FROM show s
         INNER JOIN venue v ON v.id = s.venue_id
         WHERE s.artist_id = ?1",
    )?;
    let entries = stmt
        .query_map([id], |row| {
            Ok(ArtistShowEntry {
                venue_id: row.get(0)?,
                venue_name: row.get(1)?,
                venue_image_link: row.get(2)?,
                start_time: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut past_shows = Vec::new();
    let mut upcoming_shows = Vec::new();
    for entry in entries {
        match ShowTiming::classify(entry.start_time, now) {
            ShowTiming::Past => past_shows.push(entry),
            ShowTiming::Upcoming => upcoming_shows.push(entry),
        }
    }

    Ok(ArtistDetail {
        artist,
        past_shows,
        upcoming_shows,
    })
}

/// Validate and insert a new artist, echoing the hydrated record.
pub fn create_artist(conn: &Connection, fields: &ArtistFields) -> StoreResult<Artist> {
    fields.validate()?;

    conn.execute(
        "INSERT INTO artist (name, genres, city, state, phone, website,
             facebook_link, seeking_venue, seeking_description, image_link)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            fields.name,
            join_genres(&fields.genres),
            fields.city,
            fields.state,
            fields.phone,
            fields.website,
            fields.facebook_link,
            fields.seeking_venue,
            fields.seeking_description,
            fields.image_link,
        ],
    )?;

    Ok(hydrate_artist(conn.last_insert_rowid(), fields))
}

/// Replace every submitted field on an existing artist.
pub fn update_artist(conn: &Connection, id: i64, fields: &ArtistFields) -> StoreResult<Artist> {
    fields.validate()?;

    let updated = conn.execute(
        "UPDATE artist SET name = ?1, genres = ?2, city = ?3, state = ?4,
             phone = ?5, website = ?6, facebook_link = ?7, seeking_venue = ?8,
             seeking_description = ?9, image_link = ?10
         WHERE id = ?11",
        params![
            fields.name,
            join_genres(&fields.genres),
            fields.city,
            fields.state,
            fields.phone,
            fields.website,
            fields.facebook_link,
            fields.seeking_venue,
            fields.seeking_description,
            fields.image_link,
            id,
        ],
    )?;

    if updated == 0 {
        Err(StoreError::NotFound("Artist"))
    } else {
        Ok(hydrate_artist(id, fields))
    }
}

/// Delete an artist and every show booking them as one atomic unit. Returns
/// the deleted artist's name for the confirmation notice.
pub fn delete_artist(conn: &mut Connection, id: i64) -> StoreResult<String> {
    let tx = conn.transaction()?;
    let name = delete_artist_tx(&tx, id)?;
    tx.commit()?;
    Ok(name)
}

fn delete_artist_tx(tx: &Transaction<'_>, id: i64) -> StoreResult<String> {
    let name: String = tx
        .query_row("SELECT name FROM artist WHERE id = ?1", [id], |row| {
            row.get(0)
        })
        .optional()?
        .ok_or(StoreError::NotFound("Artist"))?;

    tx.execute("DELETE FROM show WHERE artist_id = ?1", [id])?;
    tx.execute("DELETE FROM artist WHERE id = ?1", [id])?;
    Ok(name)
}

fn row_to_artist(row: &Row<'_>) -> rusqlite::Result<Artist> {
    Ok(Artist {
        id: row.get(0)?,
        name: row.get(1)?,
        genres: split_genres(&row.get::<_, String>(2)?),
        city: row.get(3)?,
        state: row.get(4)?,
        phone: row.get(5)?,
        website: row.get(6)?,
        facebook_link: row.get(7)?,
        seeking_venue: row.get(8)?,
        seeking_description: row.get(9)?,
        image_link: row.get(10)?,
    })
}

fn hydrate_artist(id: i64, fields: &ArtistFields) -> Artist {
    Artist {
        id,
        name: fields.name.clone(),
        genres: fields.genres.clone(),
        city: fields.city.clone(),
        state: fields.state.clone(),
        phone: fields.phone.clone(),
        website: fields.website.clone(),
        facebook_link: fields.facebook_link.clone(),
        seeking_venue: fields.seeking_venue,
        seeking_description: fields.seeking_description.clone(),
        image_link: fields.image_link.clone(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};
    use rusqlite::Connection;

    use crate::db::connection::init_schema;
    use crate::db::fields::VenueFields;
    use crate::db::shows::create_show;
    use crate::db::venues::create_venue;

    use super::*;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    fn artist_fields(name: &str) -> ArtistFields {
        ArtistFields {
            name: name.to_string(),
            genres: vec!["Jazz".to_string()],
            city: "San Francisco".to_string(),
            state: "CA".to_string(),
            ..ArtistFields::default()
        }
    }

    fn venue_fields(name: &str) -> VenueFields {
        VenueFields {
            name: name.to_string(),
            genres: vec!["Jazz".to_string()],
            address: "1 Main St".to_string(),
            city: "San Francisco".to_string(),
            state: "CA".to_string(),
            image_link: "https://example.com/venue.jpg".to_string(),
            ..VenueFields::default()
        }
    }

    fn at(year: i32, month: u32, day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(20, 0, 0)
            .unwrap()
    }

    #[test]
    fn listing_returns_every_artist() {
        let conn = test_conn();
        create_artist(&conn, &artist_fields("Guns N Petals")).unwrap();
        create_artist(&conn, &artist_fields("Matt Quevedo")).unwrap();

        let artists = fetch_artists(&conn).unwrap();
        assert_eq!(artists.len(), 2);
        assert_eq!(artists[0].name, "Guns N Petals");
    }

    #[test]
    fn search_matches_any_case_of_the_fragment() {
        let conn = test_conn();
        create_artist(&conn, &artist_fields("Guns N Petals")).unwrap();
        create_artist(&conn, &artist_fields("Matt Quevedo")).unwrap();
        create_artist(&conn, &artist_fields("The Wild Sax Band")).unwrap();

        // Every sample name contains an "a" in some case.
        let results = search_artists(&conn, "A").unwrap();
        assert_eq!(results.count, 3);

        let results = search_artists(&conn, "band").unwrap();
        assert_eq!(results.count, 1);
        assert_eq!(results.matches[0].name, "The Wild Sax Band");
    }

    #[test]
    fn detail_names_the_hosting_venue_on_each_entry() {
        let mut conn = test_conn();
        let artist = create_artist(&conn, &artist_fields("The Wild Sax Band")).unwrap();
        let venue = create_venue(&conn, &venue_fields("Park Square")).unwrap();

        let now = at(2024, 6, 1);
        create_show(&mut conn, artist.id, venue.id, at(2019, 6, 15)).unwrap();
        create_show(&mut conn, artist.id, venue.id, at(2035, 4, 1)).unwrap();

        let detail = artist_detail(&conn, artist.id, now).unwrap();
        assert_eq!(detail.past_shows_count(), 1);
        assert_eq!(detail.upcoming_shows_count(), 1);
        assert_eq!(detail.upcoming_shows[0].venue_name, "Park Square");
        assert_eq!(
            detail.upcoming_shows[0].venue_image_link,
            "https://example.com/venue.jpg"
        );
    }

    #[test]
    fn detail_of_missing_artist_is_not_found() {
        let conn = test_conn();
        assert!(matches!(
            artist_detail(&conn, 7, at(2024, 6, 1)),
            Err(StoreError::NotFound("Artist"))
        ));
    }

    #[test]
    fn update_is_idempotent_and_checks_existence() {
        let conn = test_conn();
        let artist = create_artist(&conn, &artist_fields("Old Name")).unwrap();

        let fields = artist_fields("New Name");
        update_artist(&conn, artist.id, &fields).unwrap();
        update_artist(&conn, artist.id, &fields).unwrap();

        let detail = artist_detail(&conn, artist.id, at(2024, 6, 1)).unwrap();
        assert_eq!(detail.artist.name, "New Name");

        assert!(matches!(
            update_artist(&conn, 404, &fields),
            Err(StoreError::NotFound("Artist"))
        ));
    }

    #[test]
    fn delete_cascades_to_the_artists_shows() {
        let mut conn = test_conn();
        let artist = create_artist(&conn, &artist_fields("Guns N Petals")).unwrap();
        let keeper = create_artist(&conn, &artist_fields("Matt Quevedo")).unwrap();
        let venue = create_venue(&conn, &venue_fields("Musical Hop")).unwrap();
        create_show(&mut conn, artist.id, venue.id, at(2035, 4, 1)).unwrap();
        create_show(&mut conn, keeper.id, venue.id, at(2035, 4, 8)).unwrap();

        let name = delete_artist(&mut conn, artist.id).unwrap();
        assert_eq!(name, "Guns N Petals");

        let shows: i64 = conn
            .query_row("SELECT COUNT(*) FROM show", [], |row| row.get(0))
            .unwrap();
        assert_eq!(shows, 1);
        assert!(matches!(
            delete_artist(&mut conn, artist.id),
            Err(StoreError::NotFound("Artist"))
        ));
    }
}

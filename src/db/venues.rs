use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};

use crate::db::error::{StoreError, StoreResult};
use crate::db::fields::VenueFields;
use crate::models::{
    join_genres, split_genres, CityGroup, DirectoryEntry, SearchResults, ShowTiming, Venue,
    VenueDetail, VenueShowEntry,
};

/// Group every venue by its distinct (city, state) pair, pairs sorted
/// ascending. Within a group venues keep the order the table yields them in.
/// An empty store produces an empty list.
pub fn fetch_venue_groups(conn: &Connection) -> StoreResult<Vec<CityGroup>> {
    let mut stmt = conn.prepare("SELECT id, name, city, state FROM venue")?;
    let venues = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    // BTreeSet gives the ascending (city, state) ordering for free. The
    // quadratic filter pass is deliberate; the directory has no pagination
    // and stays small.
    let locations: BTreeSet<(String, String)> = venues
        .iter()
        .map(|(_, _, city, state)| (city.clone(), state.clone()))
        .collect();

    let groups = locations
        .into_iter()
        .map(|(city, state)| {
            let members = venues
                .iter()
                .filter(|(_, _, c, s)| *c == city && *s == state)
                .map(|(id, name, _, _)| DirectoryEntry {
                    id: *id,
                    name: name.clone(),
                })
                .collect();
            CityGroup {
                city,
                state,
                venues: members,
            }
        })
        .collect();

    Ok(groups)
}

/// Case-insensitive substring search over venue names. An empty fragment
/// matches every venue; no match yields a zero count, never an error.
pub fn search_venues(conn: &Connection, fragment: &str) -> StoreResult<SearchResults> {
    let mut stmt = conn.prepare(
        "SELECT id, name FROM venue WHERE name LIKE '%' || ?1 || '%' ESCAPE '\\'",
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

/// Escape LIKE metacharacters so a search fragment always means a literal
/// substring, even when a name or query contains `%` or `_`.
pub(crate) fn escape_like(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len());
    for ch in fragment.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Load one venue with its shows split around the supplied evaluation
/// instant. `now` is explicit so one call uses one consistent instant and
/// tests can pin the past/upcoming boundary.
pub fn venue_detail(conn: &Connection, id: i64, now: NaiveDateTime) -> StoreResult<VenueDetail> {
    let venue = conn
        .query_row(
            "SELECT id, name, genres, address, city, state, phone, website,
                    facebook_link, seeking_talent, seeking_description, image_link
             FROM venue WHERE id = ?1",
            [id],
            row_to_venue,
        )
        .optional()?
        .ok_or(StoreError::NotFound("Venue"))?;

    let mut stmt = conn.prepare(
        "SELECT a.id, a.name, a.image_link, s.start_time
         FROM show s
         INNER JOIN artist a ON a.id = s.artist_id
         WHERE s.venue_id = ?1",
    )?;
    let entries = stmt
        .query_map([id], |row| {
            Ok(VenueShowEntry {
                artist_id: row.get(0)?,
                artist_name: row.get(1)?,
                artist_image_link: row.get(2)?,
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

    Ok(VenueDetail {
        venue,
        past_shows,
        upcoming_shows,
    })
}

/// Validate and insert a new venue, echoing the hydrated record so callers
/// can update screen state without re-querying.
pub fn create_venue(conn: &Connection, fields: &VenueFields) -> StoreResult<Venue> {
    fields.validate()?;

    conn.execute(
        "INSERT INTO venue (name, genres, address, city, state, phone, website,
             facebook_link, seeking_talent, seeking_description, image_link)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            fields.name,
            join_genres(&fields.genres),
            fields.address,
            fields.city,
            fields.state,
            fields.phone,
            fields.website,
            fields.facebook_link,
            fields.seeking_talent,
            fields.seeking_description,
            fields.image_link,
        ],
    )?;

    Ok(hydrate_venue(conn.last_insert_rowid(), fields))
}

/// Replace every submitted field on an existing venue. Zero touched rows
/// means the id is gone and surfaces as `NotFound`.
pub fn update_venue(conn: &Connection, id: i64, fields: &VenueFields) -> StoreResult<Venue> {
    fields.validate()?;

    let updated = conn.execute(
        "UPDATE venue SET name = ?1, genres = ?2, address = ?3, city = ?4,
             state = ?5, phone = ?6, website = ?7, facebook_link = ?8,
             seeking_talent = ?9, seeking_description = ?10, image_link = ?11
         WHERE id = ?12",
        params![
            fields.name,
            join_genres(&fields.genres),
            fields.address,
            fields.city,
            fields.state,
            fields.phone,
            fields.website,
            fields.facebook_link,
            fields.seeking_talent,
            fields.seeking_description,
            fields.image_link,
            id,
        ],
    )?;

    if updated == 0 {
        Err(StoreError::NotFound("Venue"))
    } else {
        Ok(hydrate_venue(id, fields))
    }
}

/// Delete a venue and every show booked there as one atomic unit. Returns
/// the deleted venue's name for the confirmation notice.
pub fn delete_venue(conn: &mut Connection, id: i64) -> StoreResult<String> {
    let tx = conn.transaction()?;
    let name = delete_venue_tx(&tx, id)?;
    tx.commit()?;
    Ok(name)
}

/// Cascade body shared by [`delete_venue`] and the rollback tests. Anything
/// that fails here leaves the transaction uncommitted, so dropping it
/// restores the pre-delete state.
fn delete_venue_tx(tx: &Transaction<'_>, id: i64) -> StoreResult<String> {
    let name: String = tx
        .query_row("SELECT name FROM venue WHERE id = ?1", [id], |row| {
            row.get(0)
        })
        .optional()?
        .ok_or(StoreError::NotFound("Venue"))?;

    tx.execute("DELETE FROM show WHERE venue_id = ?1", [id])?;
    tx.execute("DELETE FROM venue WHERE id = ?1", [id])?;
    Ok(name)
}

fn row_to_venue(row: &Row<'_>) -> rusqlite::Result<Venue> {
    Ok(Venue {
        id: row.get(0)?,
        name: row.get(1)?,
        genres: split_genres(&row.get::<_, String>(2)?),
        address: row.get(3)?,
        city: row.get(4)?,
        state: row.get(5)?,
        phone: row.get(6)?,
        website: row.get(7)?,
        facebook_link: row.get(8)?,
        seeking_talent: row.get(9)?,
        seeking_description: row.get(10)?,
        image_link: row.get(11)?,
    })
}

fn hydrate_venue(id: i64, fields: &VenueFields) -> Venue {
    Venue {
        id,
        name: fields.name.clone(),
        genres: fields.genres.clone(),
        address: fields.address.clone(),
        city: fields.city.clone(),
        state: fields.state.clone(),
        phone: fields.phone.clone(),
        website: fields.website.clone(),
        facebook_link: fields.facebook_link.clone(),
        seeking_talent: fields.seeking_talent,
        seeking_description: fields.seeking_description.clone(),
        image_link: fields.image_link.clone(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rusqlite::Connection;

    use crate::db::artists::create_artist;
    use crate::db::connection::init_schema;
    use crate::db::fields::ArtistFields;
    use crate::db::shows::create_show;

    use super::*;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    fn venue_fields(name: &str, city: &str, state: &str) -> VenueFields {
        VenueFields {
            name: name.to_string(),
            genres: vec!["Jazz".to_string()],
            address: "1 Main St".to_string(),
            city: city.to_string(),
            state: state.to_string(),
            ..VenueFields::default()
        }
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

    fn at(year: i32, month: u32, day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(20, 0, 0)
            .unwrap()
    }

    #[test]
    fn groups_venues_by_sorted_location_pairs() {
        let conn = test_conn();
        create_venue(&conn, &venue_fields("Dueling Pianos", "New York", "NY")).unwrap();
        create_venue(&conn, &venue_fields("Musical Hop", "San Francisco", "CA")).unwrap();
        create_venue(&conn, &venue_fields("Park Square", "San Francisco", "CA")).unwrap();
        create_venue(&conn, &venue_fields("Broken Spoke", "Austin", "TX")).unwrap();

        let groups = fetch_venue_groups(&conn).unwrap();
        let pairs: Vec<(&str, &str)> = groups
            .iter()
            .map(|g| (g.city.as_str(), g.state.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("Austin", "TX"),
                ("New York", "NY"),
                ("San Francisco", "CA"),
            ]
        );

        let total: usize = groups.iter().map(|g| g.venues.len()).sum();
        assert_eq!(total, 4);
        let sf = groups
            .iter()
            .find(|g| g.city == "San Francisco")
            .unwrap();
        assert_eq!(sf.venues.len(), 2);
    }

    #[test]
    fn empty_store_yields_no_groups() {
        let conn = test_conn();
        assert!(fetch_venue_groups(&conn).unwrap().is_empty());
    }

    #[test]
    fn search_is_a_case_insensitive_substring_match() {
        let conn = test_conn();
        create_venue(&conn, &venue_fields("The Musical Hop", "San Francisco", "CA")).unwrap();
        create_venue(
            &conn,
            &venue_fields("Park Square Live Music & Coffee", "San Francisco", "CA"),
        )
        .unwrap();

        let results = search_venues(&conn, "Hop").unwrap();
        assert_eq!(results.count, 1);
        assert_eq!(results.matches[0].name, "The Musical Hop");

        let results = search_venues(&conn, "Music").unwrap();
        assert_eq!(results.count, 2);

        let results = search_venues(&conn, "music").unwrap();
        assert_eq!(results.count, 2);

        let results = search_venues(&conn, "").unwrap();
        assert_eq!(results.count, 2);

        let results = search_venues(&conn, "zebra").unwrap();
        assert_eq!(results.count, 0);
        assert!(results.matches.is_empty());
    }

    #[test]
    fn search_treats_like_metacharacters_literally() {
        let conn = test_conn();
        create_venue(&conn, &venue_fields("100% Jazz", "Austin", "TX")).unwrap();
        create_venue(&conn, &venue_fields("Plain Hall", "Austin", "TX")).unwrap();

        let results = search_venues(&conn, "%").unwrap();
        assert_eq!(results.count, 1);
        assert_eq!(results.matches[0].name, "100% Jazz");
    }

    #[test]
    fn detail_partitions_shows_around_the_instant() {
        let mut conn = test_conn();
        let venue = create_venue(&conn, &venue_fields("Musical Hop", "San Francisco", "CA")).unwrap();
        let artist = create_artist(&conn, &artist_fields("Guns N Petals")).unwrap();

        let now = at(2024, 6, 1);
        create_show(&mut conn, artist.id, venue.id, at(2019, 5, 21)).unwrap();
        create_show(&mut conn, artist.id, venue.id, at(2035, 4, 1)).unwrap();
        create_show(&mut conn, artist.id, venue.id, now).unwrap();

        let detail = venue_detail(&conn, venue.id, now).unwrap();
        assert_eq!(
            detail.past_shows_count() + detail.upcoming_shows_count(),
            3
        );
        assert_eq!(detail.past_shows_count(), 1);
        // The boundary show lands in upcoming, never both buckets.
        assert_eq!(detail.upcoming_shows_count(), 2);
        assert_eq!(detail.past_shows[0].artist_name, "Guns N Petals");
    }

    #[test]
    fn detail_of_missing_venue_is_not_found() {
        let conn = test_conn();
        assert!(matches!(
            venue_detail(&conn, 99, at(2024, 6, 1)),
            Err(StoreError::NotFound("Venue"))
        ));
    }

    #[test]
    fn create_rejects_invalid_fields_without_writing() {
        let conn = test_conn();
        let mut fields = venue_fields("Bad Venue", "Austin", "TX");
        fields.state = "XX".to_string();
        assert!(matches!(
            create_venue(&conn, &fields),
            Err(StoreError::Validation(_))
        ));

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM venue", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn update_replaces_fields_and_is_idempotent() {
        let conn = test_conn();
        let venue = create_venue(&conn, &venue_fields("Old Name", "Austin", "TX")).unwrap();

        let mut fields = venue_fields("New Name", "Austin", "TX");
        fields.phone = "512-555-0100".to_string();
        update_venue(&conn, venue.id, &fields).unwrap();
        update_venue(&conn, venue.id, &fields).unwrap();

        let detail = venue_detail(&conn, venue.id, at(2024, 6, 1)).unwrap();
        assert_eq!(detail.venue.name, "New Name");
        assert_eq!(detail.venue.phone, "512-555-0100");

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM venue", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn update_of_missing_venue_is_not_found() {
        let conn = test_conn();
        assert!(matches!(
            update_venue(&conn, 404, &venue_fields("Ghost", "Austin", "TX")),
            Err(StoreError::NotFound("Venue"))
        ));
    }

    #[test]
    fn delete_cascades_to_shows() {
        let mut conn = test_conn();
        let venue = create_venue(&conn, &venue_fields("Musical Hop", "San Francisco", "CA")).unwrap();
        let other = create_venue(&conn, &venue_fields("Park Square", "San Francisco", "CA")).unwrap();
        let artist = create_artist(&conn, &artist_fields("Guns N Petals")).unwrap();
        create_show(&mut conn, artist.id, venue.id, at(2035, 4, 1)).unwrap();
        create_show(&mut conn, artist.id, venue.id, at(2035, 4, 8)).unwrap();
        create_show(&mut conn, artist.id, other.id, at(2035, 4, 15)).unwrap();

        let name = delete_venue(&mut conn, venue.id).unwrap();
        assert_eq!(name, "Musical Hop");

        let venues: i64 = conn
            .query_row("SELECT COUNT(*) FROM venue", [], |row| row.get(0))
            .unwrap();
        let shows: i64 = conn
            .query_row("SELECT COUNT(*) FROM show", [], |row| row.get(0))
            .unwrap();
        assert_eq!(venues, 1);
        // Only the other venue's booking survives.
        assert_eq!(shows, 1);
    }

    #[test]
    fn unfinished_cascade_rolls_back_whole() {
        let mut conn = test_conn();
        let venue = create_venue(&conn, &venue_fields("Musical Hop", "San Francisco", "CA")).unwrap();
        let artist = create_artist(&conn, &artist_fields("Guns N Petals")).unwrap();
        create_show(&mut conn, artist.id, venue.id, at(2035, 4, 1)).unwrap();

        {
            let tx = conn.transaction().unwrap();
            delete_venue_tx(&tx, venue.id).unwrap();
            // Simulated failure after the cascade: the transaction drops
            // without commit.
        }

        let venues: i64 = conn
            .query_row("SELECT COUNT(*) FROM venue", [], |row| row.get(0))
            .unwrap();
        let shows: i64 = conn
            .query_row("SELECT COUNT(*) FROM show", [], |row| row.get(0))
            .unwrap();
        assert_eq!(venues, 1);
        assert_eq!(shows, 1);

        // Retrying after the "fix" completes the cascade.
        delete_venue(&mut conn, venue.id).unwrap();
        let shows: i64 = conn
            .query_row("SELECT COUNT(*) FROM show", [], |row| row.get(0))
            .unwrap();
        assert_eq!(shows, 0);
    }

    #[test]
    fn delete_of_missing_venue_is_not_found() {
        let mut conn = test_conn();
        assert!(matches!(
            delete_venue(&mut conn, 5),
            Err(StoreError::NotFound("Venue"))
        ));
    }
}

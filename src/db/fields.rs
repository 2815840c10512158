//! Typed field bags for profile creation and edits. The forms hand the store
//! one of these instead of a loose key/value map, so every check runs here at
//! the boundary and nothing is written unless the whole bag passes.

use url::Url;

use crate::db::error::{StoreError, StoreResult};
use crate::models::{GENRES, STATES};

/// Column widths inherited from the directory schema.
const SHORT_TEXT_MAX: usize = 120;
const LONG_TEXT_MAX: usize = 500;

/// Everything a venue form submits. Used verbatim for both create and edit;
/// an edit replaces all of these on the stored row.
#[derive(Debug, Clone, Default)]
pub struct VenueFields {
    pub name: String,
    pub genres: Vec<String>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub phone: String,
    pub website: String,
    pub facebook_link: String,
    pub image_link: String,
    pub seeking_talent: bool,
    pub seeking_description: String,
}

impl VenueFields {
    /// Run every boundary check. The first failure wins; the store calls
    /// this before touching the database.
    pub fn validate(&self) -> StoreResult<()> {
        require("Name", &self.name)?;
        require("City", &self.city)?;
        require("Address", &self.address)?;
        check_state(&self.state)?;
        check_genres(&self.genres)?;
        check_len("City", &self.city, SHORT_TEXT_MAX)?;
        check_len("Address", &self.address, SHORT_TEXT_MAX)?;
        check_len("Phone", &self.phone, SHORT_TEXT_MAX)?;
        check_url("Website", &self.website, LONG_TEXT_MAX)?;
        check_url("Facebook link", &self.facebook_link, SHORT_TEXT_MAX)?;
        check_url("Image link", &self.image_link, LONG_TEXT_MAX)?;
        check_seeking_description(self.seeking_talent, &self.seeking_description)
    }
}

/// Everything an artist form submits. Same shape as [`VenueFields`] minus
/// the street address, with the seeking flag pointing at venues.
#[derive(Debug, Clone, Default)]
pub struct ArtistFields {
    pub name: String,
    pub genres: Vec<String>,
    pub city: String,
    pub state: String,
    pub phone: String,
    pub website: String,
    pub facebook_link: String,
    pub image_link: String,
    pub seeking_venue: bool,
    pub seeking_description: String,
}

impl ArtistFields {
    pub fn validate(&self) -> StoreResult<()> {
        require("Name", &self.name)?;
        require("City", &self.city)?;
        check_state(&self.state)?;
        check_genres(&self.genres)?;
        check_len("City", &self.city, SHORT_TEXT_MAX)?;
        check_len("Phone", &self.phone, SHORT_TEXT_MAX)?;
        check_url("Website", &self.website, LONG_TEXT_MAX)?;
        check_url("Facebook link", &self.facebook_link, SHORT_TEXT_MAX)?;
        check_url("Image link", &self.image_link, LONG_TEXT_MAX)?;
        check_seeking_description(self.seeking_venue, &self.seeking_description)
    }
}

fn require(label: &str, value: &str) -> StoreResult<()> {
    if value.trim().is_empty() {
        Err(StoreError::validation(format!("{label} is required.")))
    } else {
        Ok(())
    }
}

fn check_len(label: &str, value: &str, max: usize) -> StoreResult<()> {
    if value.chars().count() > max {
        Err(StoreError::validation(format!(
            "{label} must be at most {max} characters."
        )))
    } else {
        Ok(())
    }
}

/// Link fields stay optional, but a non-empty value must parse as an
/// absolute URL.
fn check_url(label: &str, value: &str, max: usize) -> StoreResult<()> {
    check_len(label, value, max)?;
    if value.is_empty() {
        return Ok(());
    }
    match Url::parse(value) {
        Ok(_) => Ok(()),
        Err(_) => Err(StoreError::validation(format!(
            "{label} must be a valid URL."
        ))),
    }
}

fn check_state(state: &str) -> StoreResult<()> {
    require("State", state)?;
    if STATES.contains(&state) {
        Ok(())
    } else {
        Err(StoreError::validation(format!(
            "State '{state}' is not a recognized code."
        )))
    }
}

fn check_genres(genres: &[String]) -> StoreResult<()> {
    if genres.is_empty() {
        return Err(StoreError::validation("At least one genre is required."));
    }
    for genre in genres {
        if !GENRES.contains(&genre.as_str()) {
            return Err(StoreError::validation(format!(
                "Genre '{genre}' is not in the directory vocabulary."
            )));
        }
    }
    Ok(())
}

/// The seeking pitch is required exactly when the seeking flag is set;
/// otherwise it may be left blank (and is stored as submitted).
fn check_seeking_description(seeking: bool, description: &str) -> StoreResult<()> {
    check_len("Seeking description", description, LONG_TEXT_MAX)?;
    if seeking && description.trim().is_empty() {
        Err(StoreError::validation(
            "Seeking description is required when the seeking flag is set.",
        ))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_venue() -> VenueFields {
        VenueFields {
            name: "The Musical Hop".to_string(),
            genres: vec!["Jazz".to_string(), "Folk".to_string()],
            address: "1015 Folsom Street".to_string(),
            city: "San Francisco".to_string(),
            state: "CA".to_string(),
            phone: "123-123-1234".to_string(),
            website: "https://www.themusicalhop.com".to_string(),
            facebook_link: "https://www.facebook.com/TheMusicalHop".to_string(),
            image_link: String::new(),
            seeking_talent: false,
            seeking_description: String::new(),
        }
    }

    #[test]
    fn accepts_a_complete_venue() {
        assert!(valid_venue().validate().is_ok());
    }

    #[test]
    fn rejects_blank_required_fields() {
        let mut fields = valid_venue();
        fields.name = "   ".to_string();
        assert!(fields.validate().is_err());

        let mut fields = valid_venue();
        fields.address = String::new();
        assert!(fields.validate().is_err());
    }

    #[test]
    fn rejects_unknown_state_and_genre() {
        let mut fields = valid_venue();
        fields.state = "XX".to_string();
        assert!(fields.validate().is_err());

        let mut fields = valid_venue();
        fields.genres = vec!["Skiffle".to_string()];
        assert!(fields.validate().is_err());

        let mut fields = valid_venue();
        fields.genres.clear();
        assert!(fields.validate().is_err());
    }

    #[test]
    fn link_fields_must_parse_as_urls_when_present() {
        let mut fields = valid_venue();
        fields.website = "not a url".to_string();
        assert!(fields.validate().is_err());

        let mut fields = valid_venue();
        fields.website = String::new();
        assert!(fields.validate().is_ok());
    }

    #[test]
    fn seeking_description_required_only_with_the_flag() {
        let mut fields = valid_venue();
        fields.seeking_talent = true;
        fields.seeking_description = String::new();
        assert!(fields.validate().is_err());

        fields.seeking_description = "Looking for a local act.".to_string();
        assert!(fields.validate().is_ok());
    }

    #[test]
    fn enforces_column_widths() {
        let mut fields = valid_venue();
        fields.phone = "9".repeat(121);
        assert!(fields.validate().is_err());
    }

    #[test]
    fn artist_bag_mirrors_the_venue_rules_without_address() {
        let fields = ArtistFields {
            name: "Guns N Petals".to_string(),
            genres: vec!["Rock n Roll".to_string()],
            city: "San Francisco".to_string(),
            state: "CA".to_string(),
            phone: String::new(),
            website: "https://www.gunsnpetalsband.com".to_string(),
            facebook_link: String::new(),
            image_link: String::new(),
            seeking_venue: true,
            seeking_description: "Looking for shows to perform at.".to_string(),
        };
        assert!(fields.validate().is_ok());
    }
}

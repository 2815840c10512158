use anyhow::{anyhow, Context, Result};
use chrono::NaiveDateTime;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::db::{ArtistFields, VenueFields};
use crate::models::{Artist, Venue, GENRES};

/// Accepted format for typed show start times.
pub(crate) const START_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Which entity a profile form edits. Venues carry a street address and seek
/// talent; artists carry no address and seek venues.
#[derive(Copy, Clone, PartialEq, Eq)]
pub(crate) enum ProfileKind {
    Venue,
    Artist,
}

impl ProfileKind {
    pub(crate) fn noun(&self) -> &'static str {
        match self {
            ProfileKind::Venue => "Venue",
            ProfileKind::Artist => "Artist",
        }
    }

    pub(crate) fn seeking_label(&self) -> &'static str {
        match self {
            ProfileKind::Venue => "Seeking talent",
            ProfileKind::Artist => "Seeking venues",
        }
    }

    fn has_address(&self) -> bool {
        matches!(self, ProfileKind::Venue)
    }
}

/// Fields available within the profile form, in traversal order.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum ProfileField {
    Name,
    City,
    State,
    Address,
    Phone,
    Genres,
    Website,
    FacebookLink,
    ImageLink,
    SeekingFlag,
    SeekingDescription,
}

/// Traversal order shared by Tab and Shift-Tab. Address is skipped for
/// artists at navigation time.
const FIELD_ORDER: &[ProfileField] = &[
    ProfileField::Name,
    ProfileField::City,
    ProfileField::State,
    ProfileField::Address,
    ProfileField::Phone,
    ProfileField::Genres,
    ProfileField::Website,
    ProfileField::FacebookLink,
    ProfileField::ImageLink,
    ProfileField::SeekingFlag,
    ProfileField::SeekingDescription,
];

/// Modal form state shared by venue and artist creation/editing. Text fields
/// hold raw input; the genre vocabulary is toggled in place; validation runs
/// in the store's typed field bags on submit.
#[derive(Clone)]
pub(crate) struct ProfileForm {
    pub(crate) kind: ProfileKind,
    pub(crate) name: String,
    pub(crate) city: String,
    pub(crate) state: String,
    pub(crate) address: String,
    pub(crate) phone: String,
    pub(crate) website: String,
    pub(crate) facebook_link: String,
    pub(crate) image_link: String,
    /// One flag per entry of [`GENRES`], toggled with Space.
    pub(crate) genre_selected: Vec<bool>,
    /// Vocabulary entry the genre cursor currently sits on.
    pub(crate) genre_cursor: usize,
    pub(crate) seeking: bool,
    pub(crate) seeking_description: String,
    pub(crate) active: ProfileField,
    pub(crate) error: Option<String>,
}

impl ProfileForm {
    pub(crate) fn new(kind: ProfileKind) -> Self {
        Self {
            kind,
            name: String::new(),
            city: String::new(),
            state: String::new(),
            address: String::new(),
            phone: String::new(),
            website: String::new(),
            facebook_link: String::new(),
            image_link: String::new(),
            genre_selected: vec![false; GENRES.len()],
            genre_cursor: 0,
            seeking: false,
            seeking_description: String::new(),
            active: ProfileField::Name,
            error: None,
        }
    }

    /// Populate the form from an existing venue when entering edit mode.
    pub(crate) fn from_venue(venue: &Venue) -> Self {
        let mut form = Self::new(ProfileKind::Venue);
        form.name = venue.name.clone();
        form.city = venue.city.clone();
        form.state = venue.state.clone();
        form.address = venue.address.clone();
        form.phone = venue.phone.clone();
        form.website = venue.website.clone();
        form.facebook_link = venue.facebook_link.clone();
        form.image_link = venue.image_link.clone();
        form.seeking = venue.seeking_talent;
        form.seeking_description = venue.seeking_description.clone();
        form.select_genres(&venue.genres);
        form
    }

    /// Populate the form from an existing artist when entering edit mode.
    pub(crate) fn from_artist(artist: &Artist) -> Self {
        let mut form = Self::new(ProfileKind::Artist);
        form.name = artist.name.clone();
        form.city = artist.city.clone();
        form.state = artist.state.clone();
        form.phone = artist.phone.clone();
        form.website = artist.website.clone();
        form.facebook_link = artist.facebook_link.clone();
        form.image_link = artist.image_link.clone();
        form.seeking = artist.seeking_venue;
        form.seeking_description = artist.seeking_description.clone();
        form.select_genres(&artist.genres);
        form
    }

    fn select_genres(&mut self, genres: &[String]) {
        for genre in genres {
            if let Some(idx) = GENRES.iter().position(|g| g == genre) {
                self.genre_selected[idx] = true;
            }
        }
    }

    fn field_visible(&self, field: ProfileField) -> bool {
        field != ProfileField::Address || self.kind.has_address()
    }

    /// Move focus to the next visible field.
    pub(crate) fn next_field(&mut self) {
        self.step_field(1);
    }

    /// Move focus to the previous visible field.
    pub(crate) fn prev_field(&mut self) {
        self.step_field(-1);
    }

    fn step_field(&mut self, direction: isize) {
        let len = FIELD_ORDER.len() as isize;
        let mut idx = FIELD_ORDER
            .iter()
            .position(|f| *f == self.active)
            .unwrap_or(0) as isize;
        loop {
            idx = (idx + direction).rem_euclid(len);
            let candidate = FIELD_ORDER[idx as usize];
            if self.field_visible(candidate) {
                self.active = candidate;
                return;
            }
        }
    }

    /// Append a character to the active text field. State codes are kept
    /// upper-case as typed; toggle fields ignore character input (Space is
    /// routed to [`ProfileForm::toggle`] by the caller).
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.active {
            ProfileField::Name => self.name.push(ch),
            ProfileField::City => self.city.push(ch),
            ProfileField::State => {
                if ch.is_ascii_alphabetic() && self.state.chars().count() < 2 {
                    self.state.push(ch.to_ascii_uppercase());
                } else {
                    return false;
                }
            }
            ProfileField::Address => self.address.push(ch),
            ProfileField::Phone => self.phone.push(ch),
            ProfileField::Website => self.website.push(ch),
            ProfileField::FacebookLink => self.facebook_link.push(ch),
            ProfileField::ImageLink => self.image_link.push(ch),
            ProfileField::SeekingDescription => self.seeking_description.push(ch),
            ProfileField::Genres | ProfileField::SeekingFlag => return false,
        }
        true
    }

    /// Remove the last character from the active text field.
    pub(crate) fn backspace(&mut self) {
        match self.active {
            ProfileField::Name => {
                self.name.pop();
            }
            ProfileField::City => {
                self.city.pop();
            }
            ProfileField::State => {
                self.state.pop();
            }
            ProfileField::Address => {
                self.address.pop();
            }
            ProfileField::Phone => {
                self.phone.pop();
            }
            ProfileField::Website => {
                self.website.pop();
            }
            ProfileField::FacebookLink => {
                self.facebook_link.pop();
            }
            ProfileField::ImageLink => {
                self.image_link.pop();
            }
            ProfileField::SeekingDescription => {
                self.seeking_description.pop();
            }
            ProfileField::Genres | ProfileField::SeekingFlag => {}
        }
    }

    /// Space on the genre list toggles the cursor entry; on the seeking flag
    /// it flips the flag.
    pub(crate) fn toggle(&mut self) -> bool {
        match self.active {
            ProfileField::Genres => {
                self.genre_selected[self.genre_cursor] = !self.genre_selected[self.genre_cursor];
                true
            }
            ProfileField::SeekingFlag => {
                self.seeking = !self.seeking;
                true
            }
            _ => false,
        }
    }

    /// Left/Right moves the genre cursor while the genre list has focus.
    pub(crate) fn move_genre_cursor(&mut self, direction: isize) -> bool {
        if self.active != ProfileField::Genres {
            return false;
        }
        let len = GENRES.len() as isize;
        self.genre_cursor = (self.genre_cursor as isize + direction).rem_euclid(len) as usize;
        true
    }

    /// Tags currently toggled on, in vocabulary order.
    pub(crate) fn chosen_genres(&self) -> Vec<String> {
        GENRES
            .iter()
            .zip(&self.genre_selected)
            .filter(|(_, selected)| **selected)
            .map(|(genre, _)| genre.to_string())
            .collect()
    }

    /// Assemble the trimmed venue field bag for the store. Validation runs in
    /// the store at the boundary; any failure comes back for `error`.
    pub(crate) fn venue_fields(&self) -> VenueFields {
        VenueFields {
            name: self.name.trim().to_string(),
            genres: self.chosen_genres(),
            address: self.address.trim().to_string(),
            city: self.city.trim().to_string(),
            state: self.state.trim().to_string(),
            phone: self.phone.trim().to_string(),
            website: self.website.trim().to_string(),
            facebook_link: self.facebook_link.trim().to_string(),
            image_link: self.image_link.trim().to_string(),
            seeking_talent: self.seeking,
            seeking_description: self.seeking_description.trim().to_string(),
        }
    }

    /// Assemble the trimmed artist field bag for the store.
    pub(crate) fn artist_fields(&self) -> ArtistFields {
        ArtistFields {
            name: self.name.trim().to_string(),
            genres: self.chosen_genres(),
            city: self.city.trim().to_string(),
            state: self.state.trim().to_string(),
            phone: self.phone.trim().to_string(),
            website: self.website.trim().to_string(),
            facebook_link: self.facebook_link.trim().to_string(),
            image_link: self.image_link.trim().to_string(),
            seeking_venue: self.seeking,
            seeking_description: self.seeking_description.trim().to_string(),
        }
    }

    /// Lines rendered inside the modal, one per visible field.
    pub(crate) fn build_lines(&self) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        for field in FIELD_ORDER {
            if !self.field_visible(*field) {
                continue;
            }
            lines.push(self.build_line(*field));
        }
        lines
    }

    fn build_line(&self, field: ProfileField) -> Line<'static> {
        let is_active = self.active == field;
        match field {
            ProfileField::Genres => self.genre_line(is_active),
            ProfileField::SeekingFlag => {
                let mark = if self.seeking { "[x]" } else { "[ ]" };
                let style = if is_active {
                    Style::default().fg(Color::Yellow)
                } else {
                    Style::default()
                };
                Line::from(vec![
                    Span::raw(format!("{}: ", self.kind.seeking_label())),
                    Span::styled(mark.to_string(), style),
                ])
            }
            _ => {
                let (label, value, required) = self.text_field(field);
                let display = if value.is_empty() {
                    if required { "<required>" } else { "<optional>" }.to_string()
                } else {
                    value.to_string()
                };
                let style = if is_active {
                    Style::default().fg(Color::Yellow)
                } else if value.is_empty() {
                    Style::default().fg(Color::DarkGray)
                } else {
                    Style::default()
                };
                Line::from(vec![
                    Span::raw(format!("{label}: ")),
                    Span::styled(display, style),
                ])
            }
        }
    }

    fn genre_line(&self, is_active: bool) -> Line<'static> {
        let mut spans = vec![Span::raw("Genres: ")];
        if is_active {
            let genre = GENRES[self.genre_cursor];
            let mark = if self.genre_selected[self.genre_cursor] {
                "[x]"
            } else {
                "[ ]"
            };
            spans.push(Span::styled(
                format!("◀ {mark} {genre} ▶  "),
                Style::default().fg(Color::Yellow),
            ));
        }
        let chosen = self.chosen_genres();
        let summary = if chosen.is_empty() {
            "<none selected>".to_string()
        } else {
            chosen.join(", ")
        };
        let style = if chosen.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::Cyan)
        };
        spans.push(Span::styled(summary, style));
        Line::from(spans)
    }

    /// Label, current value, and required flag for a plain text field.
    pub(crate) fn text_field(&self, field: ProfileField) -> (&'static str, &str, bool) {
        match field {
            ProfileField::Name => ("Name", &self.name, true),
            ProfileField::City => ("City", &self.city, true),
            ProfileField::State => ("State", &self.state, true),
            ProfileField::Address => ("Address", &self.address, true),
            ProfileField::Phone => ("Phone", &self.phone, false),
            ProfileField::Website => ("Website", &self.website, false),
            ProfileField::FacebookLink => ("Facebook link", &self.facebook_link, false),
            ProfileField::ImageLink => ("Image link", &self.image_link, false),
            ProfileField::SeekingDescription => {
                ("Seeking description", &self.seeking_description, self.seeking)
            }
            ProfileField::Genres | ProfileField::SeekingFlag => ("", "", false),
        }
    }

    /// Row index of the active field inside the rendered modal, for cursor
    /// positioning.
    pub(crate) fn active_row(&self) -> usize {
        FIELD_ORDER
            .iter()
            .filter(|f| self.field_visible(**f))
            .position(|f| *f == self.active)
            .unwrap_or(0)
    }
}

/// Form state for booking a show: two endpoint ids plus a start time.
#[derive(Default, Clone)]
pub(crate) struct ShowForm {
    pub(crate) artist_id: String,
    pub(crate) venue_id: String,
    pub(crate) start_time: String,
    pub(crate) active: ShowField,
    pub(crate) error: Option<String>,
}

/// Fields within the show form, driving focus management.
#[derive(Copy, Clone, PartialEq, Eq)]
pub(crate) enum ShowField {
    ArtistId,
    VenueId,
    StartTime,
}

impl Default for ShowField {
    fn default() -> Self {
        ShowField::ArtistId
    }
}

impl ShowForm {
    /// Seed the start time so the user edits a valid template instead of
    /// typing the full format from scratch.
    pub(crate) fn with_start_time(start_time: String) -> Self {
        Self {
            start_time,
            ..Self::default()
        }
    }

    /// Cycle focus across the three fields.
    pub(crate) fn toggle_field(&mut self) {
        self.active = match self.active {
            ShowField::ArtistId => ShowField::VenueId,
            ShowField::VenueId => ShowField::StartTime,
            ShowField::StartTime => ShowField::ArtistId,
        };
    }

    /// Append a character to the active field, validating allowed input.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        match self.active {
            ShowField::ArtistId => {
                if ch.is_ascii_digit() {
                    self.artist_id.push(ch);
                    true
                } else {
                    false
                }
            }
            ShowField::VenueId => {
                if ch.is_ascii_digit() {
                    self.venue_id.push(ch);
                    true
                } else {
                    false
                }
            }
            ShowField::StartTime => {
                if ch.is_ascii_digit() || matches!(ch, '-' | ':' | ' ') {
                    self.start_time.push(ch);
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Remove the last character from the active field.
    pub(crate) fn backspace(&mut self) {
        match self.active {
            ShowField::ArtistId => {
                self.artist_id.pop();
            }
            ShowField::VenueId => {
                self.venue_id.pop();
            }
            ShowField::StartTime => {
                self.start_time.pop();
            }
        }
    }

    /// Validate the inputs and return typed values ready for persistence.
    pub(crate) fn parse_inputs(&self) -> Result<(i64, i64, NaiveDateTime)> {
        let artist_raw = self.artist_id.trim();
        if artist_raw.is_empty() {
            return Err(anyhow!("Artist id is required."));
        }
        let artist_id = artist_raw
            .parse::<i64>()
            .context("Artist id must be an integer.")?;

        let venue_raw = self.venue_id.trim();
        if venue_raw.is_empty() {
            return Err(anyhow!("Venue id is required."));
        }
        let venue_id = venue_raw
            .parse::<i64>()
            .context("Venue id must be an integer.")?;

        let start_time = NaiveDateTime::parse_from_str(self.start_time.trim(), START_TIME_FORMAT)
            .context("Start time must look like 2035-04-01 20:00.")?;

        Ok((artist_id, venue_id, start_time))
    }

    /// Render a single line for the form widget.
    pub(crate) fn build_line(&self, field_name: &str, field: ShowField) -> Line<'static> {
        let (value, is_active) = match field {
            ShowField::ArtistId => (&self.artist_id, self.active == ShowField::ArtistId),
            ShowField::VenueId => (&self.venue_id, self.active == ShowField::VenueId),
            ShowField::StartTime => (&self.start_time, self.active == ShowField::StartTime),
        };

        let display = if value.is_empty() {
            "<required>".to_string()
        } else {
            value.clone()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{field_name}: ")),
            Span::styled(display, style),
        ])
    }

    /// Return the character count for the requested field.
    pub(crate) fn value_len(&self, field: ShowField) -> usize {
        match field {
            ShowField::ArtistId => self.artist_id.chars().count(),
            ShowField::VenueId => self.venue_id.chars().count(),
            ShowField::StartTime => self.start_time.chars().count(),
        }
    }
}

/// State for confirming a venue removal, including its cascade warning.
#[derive(Clone)]
pub(crate) struct ConfirmVenueDelete {
    pub(crate) id: i64,
    pub(crate) name: String,
}

/// State for confirming an artist removal.
#[derive(Clone)]
pub(crate) struct ConfirmArtistDelete {
    pub(crate) id: i64,
    pub(crate) name: String,
}

/// State for confirming a show cancellation.
#[derive(Clone)]
pub(crate) struct ConfirmShowCancel {
    pub(crate) id: i64,
    pub(crate) billing: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tab_skips_the_address_field_for_artists() {
        let mut form = ProfileForm::new(ProfileKind::Artist);
        form.active = ProfileField::State;
        form.next_field();
        assert_eq!(form.active, ProfileField::Phone);

        let mut form = ProfileForm::new(ProfileKind::Venue);
        form.active = ProfileField::State;
        form.next_field();
        assert_eq!(form.active, ProfileField::Address);
    }

    #[test]
    fn state_input_is_uppercased_and_capped() {
        let mut form = ProfileForm::new(ProfileKind::Venue);
        form.active = ProfileField::State;
        assert!(form.push_char('c'));
        assert!(form.push_char('a'));
        assert!(!form.push_char('x'));
        assert_eq!(form.state, "CA");
    }

    #[test]
    fn genre_toggling_round_trips_through_the_field_bag() {
        let mut form = ProfileForm::new(ProfileKind::Venue);
        form.active = ProfileField::Genres;
        form.toggle();
        form.move_genre_cursor(1);
        form.toggle();

        let chosen = form.chosen_genres();
        assert_eq!(chosen, vec!["Alternative".to_string(), "Blues".to_string()]);
        assert_eq!(form.venue_fields().genres, chosen);
    }

    #[test]
    fn edit_form_restores_every_venue_field() {
        let venue = Venue {
            id: 3,
            name: "The Musical Hop".to_string(),
            genres: vec!["Jazz".to_string(), "Folk".to_string()],
            address: "1015 Folsom Street".to_string(),
            city: "San Francisco".to_string(),
            state: "CA".to_string(),
            phone: "123-123-1234".to_string(),
            website: "https://www.themusicalhop.com".to_string(),
            facebook_link: String::new(),
            seeking_talent: true,
            seeking_description: "Call us.".to_string(),
            image_link: String::new(),
        };

        let form = ProfileForm::from_venue(&venue);
        let fields = form.venue_fields();
        assert_eq!(fields.name, venue.name);
        assert_eq!(fields.genres, venue.genres);
        assert!(fields.seeking_talent);
        assert_eq!(fields.seeking_description, venue.seeking_description);
    }

    #[test]
    fn show_form_parses_ids_and_start_time() {
        let mut form = ShowForm::default();
        form.artist_id = "2".to_string();
        form.venue_id = "5".to_string();
        form.start_time = "2035-04-01 20:00".to_string();

        let (artist_id, venue_id, start_time) = form.parse_inputs().unwrap();
        assert_eq!((artist_id, venue_id), (2, 5));
        assert_eq!(
            start_time.format(START_TIME_FORMAT).to_string(),
            "2035-04-01 20:00"
        );
    }

    #[test]
    fn show_form_rejects_blank_and_malformed_input() {
        let form = ShowForm::default();
        assert!(form.parse_inputs().is_err());

        let mut form = ShowForm::default();
        form.artist_id = "1".to_string();
        form.venue_id = "1".to_string();
        form.start_time = "April 1st".to_string();
        assert!(form.parse_inputs().is_err());
    }
}

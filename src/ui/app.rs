use std::mem;

use anyhow::Result;
use chrono::{Local, NaiveDateTime};
use crossterm::event::KeyCode;
use open::that as open_link;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;
use rusqlite::Connection;

use crate::db::{
    artist_detail, create_artist, create_show, create_venue, delete_artist, delete_show,
    delete_venue, fetch_artists, fetch_shows, fetch_venue_groups, search_artists, search_venues,
    update_artist, update_venue, venue_detail, StoreError,
};
use crate::models::{CityGroup, SearchResults};

use super::forms::{
    ConfirmArtistDelete, ConfirmShowCancel, ConfirmVenueDelete, ProfileForm, ProfileKind,
    ShowField, ShowForm, START_TIME_FORMAT,
};
use super::helpers::{centered_rect, format_start_time, surface_error};
use super::screens::{
    ArtistBoard, ArtistDetailScreen, BoardRow, ShowBoard, VenueBoard, VenueDetailScreen,
};

/// Footer space reserved for status messages and key hints.
const FOOTER_HEIGHT: u16 = 3;

/// High-level navigation states. Keeping this explicit makes it easy to
/// reason about which rendering path runs and what keyboard shortcuts do.
enum Screen {
    Venues(VenueBoard),
    Artists(ArtistBoard),
    Shows(ShowBoard),
    VenueDetail(VenueDetailScreen),
    ArtistDetail(ArtistDetailScreen),
}

/// Fine-grained modes scoped to the current screen.
enum Mode {
    Normal,
    AddingProfile(ProfileForm),
    EditingProfile { id: i64, form: ProfileForm },
    ConfirmVenueDelete(ConfirmVenueDelete),
    ConfirmArtistDelete(ConfirmArtistDelete),
    BookingShow(ShowForm),
    ConfirmShowCancel(ConfirmShowCancel),
    Searching(SearchState),
}

/// Which directory the search is targeting.
enum SearchTarget {
    Venues,
    Artists,
}

/// State for an active name search: the typed fragment plus the live result
/// set, re-queried on every keystroke.
struct SearchState {
    target: SearchTarget,
    query: String,
    results: SearchResults,
    selected: usize,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI.
pub struct App {
    conn: Connection,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(conn: Connection, groups: Vec<CityGroup>) -> Self {
        Self {
            conn,
            screen: Screen::Venues(VenueBoard::new(groups)),
            mode: Mode::Normal,
            status: None,
        }
    }

    /// One consistent evaluation instant per detail query.
    fn now() -> NaiveDateTime {
        Local::now().naive_local()
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mut mode = mem::replace(&mut self.mode, Mode::Normal);

        mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::AddingProfile(form) => self.handle_add_profile(code, form)?,
            Mode::EditingProfile { id, form } => self.handle_edit_profile(code, id, form)?,
            Mode::ConfirmVenueDelete(confirm) => self.handle_confirm_venue_delete(code, confirm)?,
            Mode::ConfirmArtistDelete(confirm) => {
                self.handle_confirm_artist_delete(code, confirm)?
            }
            Mode::BookingShow(form) => self.handle_booking(code, form)?,
            Mode::ConfirmShowCancel(confirm) => self.handle_confirm_show_cancel(code, confirm)?,
            Mode::Searching(state) => self.handle_search(code, state)?,
        };

        self.mode = mode;
        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match self.screen {
            Screen::Venues(_) => self.venues_key(code, exit),
            Screen::Artists(_) => self.artists_key(code, exit),
            Screen::Shows(_) => self.shows_key(code, exit),
            Screen::VenueDetail(_) => self.venue_detail_key(code, exit),
            Screen::ArtistDetail(_) => self.artist_detail_key(code, exit),
        }
    }

    fn venues_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                *exit = true;
            }
            KeyCode::Up => self.with_venue_board(|b| b.move_selection(-1)),
            KeyCode::Down => self.with_venue_board(|b| b.move_selection(1)),
            KeyCode::PageUp => self.with_venue_board(|b| b.move_selection(-5)),
            KeyCode::PageDown => self.with_venue_board(|b| b.move_selection(5)),
            KeyCode::Home => self.with_venue_board(VenueBoard::select_first),
            KeyCode::End => self.with_venue_board(VenueBoard::select_last),
            KeyCode::Enter => {
                if let Some(id) = self.selected_venue_id() {
                    self.clear_status();
                    self.open_venue_detail(id)?;
                } else {
                    self.set_status("No venue selected.", StatusKind::Error);
                }
            }
            KeyCode::Char('a') | KeyCode::Char('A') => {
                self.clear_status();
                self.open_artist_board()?;
            }
            KeyCode::Char('s') | KeyCode::Char('S') => {
                self.clear_status();
                self.open_show_board()?;
            }
            KeyCode::Char('/') => {
                self.clear_status();
                return self.start_search(SearchTarget::Venues);
            }
            KeyCode::Char('+') => {
                self.clear_status();
                return Ok(Mode::AddingProfile(ProfileForm::new(ProfileKind::Venue)));
            }
            KeyCode::Char('e') | KeyCode::Char('E') => {
                if let Some(id) = self.selected_venue_id() {
                    self.clear_status();
                    return self.start_venue_edit(id);
                }
                self.set_status("No venue selected to edit.", StatusKind::Error);
            }
            KeyCode::Char('-') => {
                if let Some((id, name)) = self.selected_venue_entry() {
                    self.clear_status();
                    return Ok(Mode::ConfirmVenueDelete(ConfirmVenueDelete { id, name }));
                }
                self.set_status("No venue selected to remove.", StatusKind::Error);
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn artists_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Char('q') => {
                *exit = true;
            }
            KeyCode::Esc => {
                self.clear_status();
                self.open_venue_board()?;
            }
            KeyCode::Up => self.with_artist_board(|b| b.move_selection(-1)),
            KeyCode::Down => self.with_artist_board(|b| b.move_selection(1)),
            KeyCode::PageUp => self.with_artist_board(|b| b.move_selection(-5)),
            KeyCode::PageDown => self.with_artist_board(|b| b.move_selection(5)),
            KeyCode::Home => self.with_artist_board(ArtistBoard::select_first),
            KeyCode::End => self.with_artist_board(ArtistBoard::select_last),
            KeyCode::Enter => {
                if let Some(id) = self.selected_artist_id() {
                    self.clear_status();
                    self.open_artist_detail(id)?;
                } else {
                    self.set_status("No artist selected.", StatusKind::Error);
                }
            }
            KeyCode::Char('v') | KeyCode::Char('V') => {
                self.clear_status();
                self.open_venue_board()?;
            }
            KeyCode::Char('s') | KeyCode::Char('S') => {
                self.clear_status();
                self.open_show_board()?;
            }
            KeyCode::Char('/') => {
                self.clear_status();
                return self.start_search(SearchTarget::Artists);
            }
            KeyCode::Char('+') => {
                self.clear_status();
                return Ok(Mode::AddingProfile(ProfileForm::new(ProfileKind::Artist)));
            }
            KeyCode::Char('e') | KeyCode::Char('E') => {
                if let Some(id) = self.selected_artist_id() {
                    self.clear_status();
                    return self.start_artist_edit(id);
                }
                self.set_status("No artist selected to edit.", StatusKind::Error);
            }
            KeyCode::Char('-') => {
                if let Some((id, name)) = self.selected_artist_entry() {
                    self.clear_status();
                    return Ok(Mode::ConfirmArtistDelete(ConfirmArtistDelete { id, name }));
                }
                self.set_status("No artist selected to remove.", StatusKind::Error);
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn shows_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Char('q') => {
                *exit = true;
            }
            KeyCode::Esc => {
                self.clear_status();
                self.open_venue_board()?;
            }
            KeyCode::Up => self.with_show_board(|b| b.move_selection(-1)),
            KeyCode::Down => self.with_show_board(|b| b.move_selection(1)),
            KeyCode::PageUp => self.with_show_board(|b| b.move_selection(-5)),
            KeyCode::PageDown => self.with_show_board(|b| b.move_selection(5)),
            KeyCode::Home => self.with_show_board(ShowBoard::select_first),
            KeyCode::End => self.with_show_board(ShowBoard::select_last),
            KeyCode::Enter => {
                let target = self.selected_show().map(|s| s.venue_id);
                if let Some(venue_id) = target {
                    self.clear_status();
                    self.open_venue_detail(venue_id)?;
                } else {
                    self.set_status("No show selected.", StatusKind::Error);
                }
            }
            KeyCode::Char('v') | KeyCode::Char('V') => {
                self.clear_status();
                self.open_venue_board()?;
            }
            KeyCode::Char('a') | KeyCode::Char('A') => {
                self.clear_status();
                self.open_artist_board()?;
            }
            KeyCode::Char('+') => {
                self.clear_status();
                let start = Self::now().format(START_TIME_FORMAT).to_string();
                return Ok(Mode::BookingShow(ShowForm::with_start_time(start)));
            }
            KeyCode::Char('-') => {
                let target = self
                    .selected_show()
                    .map(|s| (s.id, s.billing(), s.start_time));
                if let Some((id, billing, start_time)) = target {
                    self.clear_status();
                    return Ok(Mode::ConfirmShowCancel(ConfirmShowCancel {
                        id,
                        billing: format!("{billing} on {}", format_start_time(start_time)),
                    }));
                }
                self.set_status("No show selected to cancel.", StatusKind::Error);
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn venue_detail_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Char('q') => {
                *exit = true;
            }
            KeyCode::Esc => {
                self.clear_status();
                self.open_venue_board()?;
            }
            KeyCode::Up => self.with_venue_detail(|s| s.scroll_by(-1)),
            KeyCode::Down => self.with_venue_detail(|s| s.scroll_by(1)),
            KeyCode::PageUp => self.with_venue_detail(|s| s.scroll_by(-5)),
            KeyCode::PageDown => self.with_venue_detail(|s| s.scroll_by(5)),
            KeyCode::Char('o') | KeyCode::Char('O') => {
                let link = self.current_venue_link(|v| v.website.clone());
                self.open_profile_link(link, "website");
            }
            KeyCode::Char('f') | KeyCode::Char('F') => {
                let link = self.current_venue_link(|v| v.facebook_link.clone());
                self.open_profile_link(link, "facebook page");
            }
            KeyCode::Char('e') | KeyCode::Char('E') => {
                if let Screen::VenueDetail(screen) = &self.screen {
                    let venue = screen.detail.venue.clone();
                    self.clear_status();
                    return Ok(Mode::EditingProfile {
                        id: venue.id,
                        form: ProfileForm::from_venue(&venue),
                    });
                }
            }
            KeyCode::Char('-') => {
                if let Screen::VenueDetail(screen) = &self.screen {
                    let confirm = ConfirmVenueDelete {
                        id: screen.detail.venue.id,
                        name: screen.detail.venue.name.clone(),
                    };
                    self.clear_status();
                    return Ok(Mode::ConfirmVenueDelete(confirm));
                }
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn artist_detail_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Char('q') => {
                *exit = true;
            }
            KeyCode::Esc => {
                self.clear_status();
                self.open_artist_board()?;
            }
            KeyCode::Up => self.with_artist_detail(|s| s.scroll_by(-1)),
            KeyCode::Down => self.with_artist_detail(|s| s.scroll_by(1)),
            KeyCode::PageUp => self.with_artist_detail(|s| s.scroll_by(-5)),
            KeyCode::PageDown => self.with_artist_detail(|s| s.scroll_by(5)),
            KeyCode::Char('o') | KeyCode::Char('O') => {
                let link = self.current_artist_link(|a| a.website.clone());
                self.open_profile_link(link, "website");
            }
            KeyCode::Char('f') | KeyCode::Char('F') => {
                let link = self.current_artist_link(|a| a.facebook_link.clone());
                self.open_profile_link(link, "facebook page");
            }
            KeyCode::Char('e') | KeyCode::Char('E') => {
                if let Screen::ArtistDetail(screen) = &self.screen {
                    let artist = screen.detail.artist.clone();
                    self.clear_status();
                    return Ok(Mode::EditingProfile {
                        id: artist.id,
                        form: ProfileForm::from_artist(&artist),
                    });
                }
            }
            KeyCode::Char('-') => {
                if let Screen::ArtistDetail(screen) = &self.screen {
                    let confirm = ConfirmArtistDelete {
                        id: screen.detail.artist.id,
                        name: screen.detail.artist.name.clone(),
                    };
                    self.clear_status();
                    return Ok(Mode::ConfirmArtistDelete(confirm));
                }
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    // Selection helpers. Each clones the little it needs so the screen borrow
    // ends before a mutating call starts.

    fn with_venue_board(&mut self, action: impl FnOnce(&mut VenueBoard)) {
        if let Screen::Venues(board) = &mut self.screen {
            action(board);
        }
    }

    fn with_artist_board(&mut self, action: impl FnOnce(&mut ArtistBoard)) {
        if let Screen::Artists(board) = &mut self.screen {
            action(board);
        }
    }

    fn with_show_board(&mut self, action: impl FnOnce(&mut ShowBoard)) {
        if let Screen::Shows(board) = &mut self.screen {
            action(board);
        }
    }

    fn with_venue_detail(&mut self, action: impl FnOnce(&mut VenueDetailScreen)) {
        if let Screen::VenueDetail(screen) = &mut self.screen {
            action(screen);
        }
    }

    fn with_artist_detail(&mut self, action: impl FnOnce(&mut ArtistDetailScreen)) {
        if let Screen::ArtistDetail(screen) = &mut self.screen {
            action(screen);
        }
    }

    fn selected_venue_entry(&self) -> Option<(i64, String)> {
        if let Screen::Venues(board) = &self.screen {
            board
                .current_venue()
                .map(|entry| (entry.id, entry.name.clone()))
        } else {
            None
        }
    }

    fn selected_venue_id(&self) -> Option<i64> {
        self.selected_venue_entry().map(|(id, _)| id)
    }

    fn selected_artist_entry(&self) -> Option<(i64, String)> {
        if let Screen::Artists(board) = &self.screen {
            board
                .current_artist()
                .map(|entry| (entry.id, entry.name.clone()))
        } else {
            None
        }
    }

    fn selected_artist_id(&self) -> Option<i64> {
        self.selected_artist_entry().map(|(id, _)| id)
    }

    fn selected_show(&self) -> Option<&crate::models::ShowListing> {
        if let Screen::Shows(board) = &self.screen {
            board.current_show()
        } else {
            None
        }
    }

    fn current_venue_link(
        &self,
        pick: impl FnOnce(&crate::models::Venue) -> String,
    ) -> Option<String> {
        if let Screen::VenueDetail(screen) = &self.screen {
            Some(pick(&screen.detail.venue))
        } else {
            None
        }
    }

    fn current_artist_link(
        &self,
        pick: impl FnOnce(&crate::models::Artist) -> String,
    ) -> Option<String> {
        if let Screen::ArtistDetail(screen) = &self.screen {
            Some(pick(&screen.detail.artist))
        } else {
            None
        }
    }

    /// Launch a profile link in the system browser, mirroring the status
    /// feedback for missing or unopenable links.
    fn open_profile_link(&mut self, link: Option<String>, label: &str) {
        let Some(link) = link else {
            return;
        };
        let link = link.trim().to_string();
        if link.is_empty() {
            self.set_status(
                format!("This profile does not have a {label}."),
                StatusKind::Error,
            );
        } else if let Err(err) = open_link(&link) {
            self.set_status(format!("Failed to open link: {err}"), StatusKind::Error);
        } else {
            self.set_status(format!("Opened {link}."), StatusKind::Info);
        }
    }

    // Screen transitions. Each reloads from the store so boards always show
    // committed state.

    fn open_venue_board(&mut self) -> Result<()> {
        let groups = fetch_venue_groups(&self.conn)?;
        self.screen = Screen::Venues(VenueBoard::new(groups));
        Ok(())
    }

    fn open_artist_board(&mut self) -> Result<()> {
        let artists = fetch_artists(&self.conn)?;
        self.screen = Screen::Artists(ArtistBoard::new(artists));
        Ok(())
    }

    fn open_show_board(&mut self) -> Result<()> {
        let shows = fetch_shows(&self.conn)?;
        self.screen = Screen::Shows(ShowBoard::new(shows));
        Ok(())
    }

    fn open_venue_detail(&mut self, id: i64) -> Result<()> {
        match venue_detail(&self.conn, id, Self::now()) {
            Ok(detail) => {
                self.screen = Screen::VenueDetail(VenueDetailScreen::new(detail));
            }
            Err(StoreError::NotFound(_)) => {
                self.set_status("That venue is no longer listed.", StatusKind::Error);
            }
            Err(err) => return Err(err.into()),
        }
        Ok(())
    }

    fn open_artist_detail(&mut self, id: i64) -> Result<()> {
        match artist_detail(&self.conn, id, Self::now()) {
            Ok(detail) => {
                self.screen = Screen::ArtistDetail(ArtistDetailScreen::new(detail));
            }
            Err(StoreError::NotFound(_)) => {
                self.set_status("That artist is no longer listed.", StatusKind::Error);
            }
            Err(err) => return Err(err.into()),
        }
        Ok(())
    }

    fn start_venue_edit(&mut self, id: i64) -> Result<Mode> {
        match venue_detail(&self.conn, id, Self::now()) {
            Ok(detail) => Ok(Mode::EditingProfile {
                id,
                form: ProfileForm::from_venue(&detail.venue),
            }),
            Err(StoreError::NotFound(_)) => {
                self.set_status("That venue is no longer listed.", StatusKind::Error);
                Ok(Mode::Normal)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn start_artist_edit(&mut self, id: i64) -> Result<Mode> {
        match artist_detail(&self.conn, id, Self::now()) {
            Ok(detail) => Ok(Mode::EditingProfile {
                id,
                form: ProfileForm::from_artist(&detail.artist),
            }),
            Err(StoreError::NotFound(_)) => {
                self.set_status("That artist is no longer listed.", StatusKind::Error);
                Ok(Mode::Normal)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn start_search(&mut self, target: SearchTarget) -> Result<Mode> {
        let results = match target {
            SearchTarget::Venues => search_venues(&self.conn, "")?,
            SearchTarget::Artists => search_artists(&self.conn, "")?,
        };
        Ok(Mode::Searching(SearchState {
            target,
            query: String::new(),
            results,
            selected: 0,
        }))
    }

    // Modal handlers.

    fn handle_add_profile(&mut self, code: KeyCode, mut form: ProfileForm) -> Result<Mode> {
        match code {
            KeyCode::Esc => return Ok(Mode::Normal),
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.prev_field(),
            KeyCode::Left => {
                form.move_genre_cursor(-1);
            }
            KeyCode::Right => {
                form.move_genre_cursor(1);
            }
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => {
                return self.submit_new_profile(form);
            }
            KeyCode::Char(' ') => {
                if !form.toggle() {
                    form.push_char(' ');
                }
            }
            KeyCode::Char(ch) => {
                form.push_char(ch);
            }
            _ => {}
        }
        Ok(Mode::AddingProfile(form))
    }

    fn submit_new_profile(&mut self, mut form: ProfileForm) -> Result<Mode> {
        let outcome = match form.kind {
            ProfileKind::Venue => {
                create_venue(&self.conn, &form.venue_fields()).map(|venue| venue.name)
            }
            ProfileKind::Artist => {
                create_artist(&self.conn, &form.artist_fields()).map(|artist| artist.name)
            }
        };

        match outcome {
            Ok(name) => {
                self.set_status(
                    format!("{} '{name}' was successfully listed!", form.kind.noun()),
                    StatusKind::Info,
                );
                match form.kind {
                    ProfileKind::Venue => self.open_venue_board()?,
                    ProfileKind::Artist => self.open_artist_board()?,
                }
                Ok(Mode::Normal)
            }
            Err(err) => {
                form.error = Some(err.to_string());
                Ok(Mode::AddingProfile(form))
            }
        }
    }

    fn handle_edit_profile(
        &mut self,
        code: KeyCode,
        id: i64,
        mut form: ProfileForm,
    ) -> Result<Mode> {
        match code {
            KeyCode::Esc => return Ok(Mode::Normal),
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.prev_field(),
            KeyCode::Left => {
                form.move_genre_cursor(-1);
            }
            KeyCode::Right => {
                form.move_genre_cursor(1);
            }
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => {
                return self.submit_profile_edit(id, form);
            }
            KeyCode::Char(' ') => {
                if !form.toggle() {
                    form.push_char(' ');
                }
            }
            KeyCode::Char(ch) => {
                form.push_char(ch);
            }
            _ => {}
        }
        Ok(Mode::EditingProfile { id, form })
    }

    fn submit_profile_edit(&mut self, id: i64, mut form: ProfileForm) -> Result<Mode> {
        let outcome = match form.kind {
            ProfileKind::Venue => {
                update_venue(&self.conn, id, &form.venue_fields()).map(|venue| venue.name)
            }
            ProfileKind::Artist => {
                update_artist(&self.conn, id, &form.artist_fields()).map(|artist| artist.name)
            }
        };

        match outcome {
            Ok(name) => {
                self.set_status(
                    format!("{} '{name}' was successfully updated!", form.kind.noun()),
                    StatusKind::Info,
                );
                self.reload_after_profile_change(form.kind, id)?;
                Ok(Mode::Normal)
            }
            Err(err) => {
                form.error = Some(err.to_string());
                Ok(Mode::EditingProfile { id, form })
            }
        }
    }

    /// After an edit, stay where the user was: a detail screen reloads in
    /// place, a board refreshes.
    fn reload_after_profile_change(&mut self, kind: ProfileKind, id: i64) -> Result<()> {
        let on_own_detail = match &self.screen {
            Screen::VenueDetail(screen) => {
                kind == ProfileKind::Venue && screen.detail.venue.id == id
            }
            Screen::ArtistDetail(screen) => {
                kind == ProfileKind::Artist && screen.detail.artist.id == id
            }
            _ => false,
        };

        match (on_own_detail, kind) {
            (true, ProfileKind::Venue) => self.open_venue_detail(id),
            (true, ProfileKind::Artist) => self.open_artist_detail(id),
            (false, ProfileKind::Venue) => self.open_venue_board(),
            (false, ProfileKind::Artist) => self.open_artist_board(),
        }
    }

    fn handle_confirm_venue_delete(
        &mut self,
        code: KeyCode,
        confirm: ConfirmVenueDelete,
    ) -> Result<Mode> {
        match code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                match delete_venue(&mut self.conn, confirm.id) {
                    Ok(name) => {
                        self.set_status(
                            format!("Venue '{name}' was successfully removed!"),
                            StatusKind::Info,
                        );
                    }
                    Err(err) => {
                        self.set_status(
                            format!("An error occurred. Venue could not be removed: {err}"),
                            StatusKind::Error,
                        );
                    }
                }
                self.open_venue_board()?;
                Ok(Mode::Normal)
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Ok(Mode::Normal),
            _ => Ok(Mode::ConfirmVenueDelete(confirm)),
        }
    }

    fn handle_confirm_artist_delete(
        &mut self,
        code: KeyCode,
        confirm: ConfirmArtistDelete,
    ) -> Result<Mode> {
        match code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                match delete_artist(&mut self.conn, confirm.id) {
                    Ok(name) => {
                        self.set_status(
                            format!("Artist '{name}' was successfully removed!"),
                            StatusKind::Info,
                        );
                    }
                    Err(err) => {
                        self.set_status(
                            format!("An error occurred. Artist could not be removed: {err}"),
                            StatusKind::Error,
                        );
                    }
                }
                self.open_artist_board()?;
                Ok(Mode::Normal)
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Ok(Mode::Normal),
            _ => Ok(Mode::ConfirmArtistDelete(confirm)),
        }
    }

    fn handle_booking(&mut self, code: KeyCode, mut form: ShowForm) -> Result<Mode> {
        match code {
            KeyCode::Esc => return Ok(Mode::Normal),
            KeyCode::Tab | KeyCode::Down => form.toggle_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => {
                let (artist_id, venue_id, start_time) = match form.parse_inputs() {
                    Ok(parsed) => parsed,
                    Err(err) => {
                        form.error = Some(surface_error(&err));
                        return Ok(Mode::BookingShow(form));
                    }
                };
                match create_show(&mut self.conn, artist_id, venue_id, start_time) {
                    Ok(_) => {
                        self.set_status("Show was successfully listed!", StatusKind::Info);
                        self.open_show_board()?;
                        return Ok(Mode::Normal);
                    }
                    Err(err) => {
                        form.error = Some(err.to_string());
                        return Ok(Mode::BookingShow(form));
                    }
                }
            }
            KeyCode::Char(ch) => {
                form.push_char(ch);
            }
            _ => {}
        }
        Ok(Mode::BookingShow(form))
    }

    fn handle_confirm_show_cancel(
        &mut self,
        code: KeyCode,
        confirm: ConfirmShowCancel,
    ) -> Result<Mode> {
        match code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                match delete_show(&self.conn, confirm.id) {
                    Ok(()) => {
                        self.set_status("Show was successfully canceled!", StatusKind::Info);
                    }
                    Err(err) => {
                        self.set_status(
                            format!("An error occurred. Show could not be canceled: {err}"),
                            StatusKind::Error,
                        );
                    }
                }
                self.open_show_board()?;
                Ok(Mode::Normal)
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Ok(Mode::Normal),
            _ => Ok(Mode::ConfirmShowCancel(confirm)),
        }
    }

    fn handle_search(&mut self, code: KeyCode, mut state: SearchState) -> Result<Mode> {
        match code {
            KeyCode::Esc => return Ok(Mode::Normal),
            KeyCode::Up => {
                state.selected = state.selected.saturating_sub(1);
            }
            KeyCode::Down => {
                if state.selected + 1 < state.results.count {
                    state.selected += 1;
                }
            }
            KeyCode::Enter => {
                let target = state.results.matches.get(state.selected).map(|m| m.id);
                if let Some(id) = target {
                    self.clear_status();
                    match state.target {
                        SearchTarget::Venues => self.open_venue_detail(id)?,
                        SearchTarget::Artists => self.open_artist_detail(id)?,
                    }
                    return Ok(Mode::Normal);
                }
            }
            KeyCode::Backspace => {
                state.query.pop();
                self.rerun_search(&mut state)?;
            }
            KeyCode::Char(ch) => {
                if !ch.is_control() {
                    state.query.push(ch);
                    self.rerun_search(&mut state)?;
                }
            }
            _ => {}
        }
        Ok(Mode::Searching(state))
    }

    fn rerun_search(&self, state: &mut SearchState) -> Result<()> {
        state.results = match state.target {
            SearchTarget::Venues => search_venues(&self.conn, &state.query)?,
            SearchTarget::Artists => search_artists(&self.conn, &state.query)?,
        };
        if state.selected >= state.results.count {
            state.selected = state.results.count.saturating_sub(1);
        }
        Ok(())
    }

    fn set_status(&mut self, text: impl Into<String>, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    // Rendering.

    pub fn draw(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(FOOTER_HEIGHT)])
            .split(frame.area());

        match &self.screen {
            Screen::Venues(board) => self.draw_venue_board(frame, chunks[0], board),
            Screen::Artists(board) => self.draw_artist_board(frame, chunks[0], board),
            Screen::Shows(board) => self.draw_show_board(frame, chunks[0], board),
            Screen::VenueDetail(screen) => self.draw_venue_detail(frame, chunks[0], screen),
            Screen::ArtistDetail(screen) => self.draw_artist_detail(frame, chunks[0], screen),
        }

        self.draw_footer(frame, chunks[1]);

        match &self.mode {
            Mode::Normal => {}
            Mode::AddingProfile(form) => {
                let title = format!("New {}", form.kind.noun());
                self.draw_profile_form(frame, chunks[0], &title, form);
            }
            Mode::EditingProfile { form, .. } => {
                let title = format!("Edit {}", form.kind.noun());
                self.draw_profile_form(frame, chunks[0], &title, form);
            }
            Mode::ConfirmVenueDelete(confirm) => self.draw_confirm_venue(frame, chunks[0], confirm),
            Mode::ConfirmArtistDelete(confirm) => {
                self.draw_confirm_artist(frame, chunks[0], confirm)
            }
            Mode::BookingShow(form) => self.draw_show_form(frame, chunks[0], form),
            Mode::ConfirmShowCancel(confirm) => {
                self.draw_confirm_show_cancel(frame, chunks[0], confirm)
            }
            Mode::Searching(state) => self.draw_search(frame, chunks[0], state),
        }
    }

    fn draw_venue_board(&self, frame: &mut Frame, area: Rect, board: &VenueBoard) {
        let block = Block::default().title("Venues by city").borders(Borders::ALL);

        if board.is_empty() {
            let paragraph = Paragraph::new("No venues listed yet. Press + to add the first one.")
                .block(block)
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(paragraph, area);
            return;
        }

        let items: Vec<ListItem> = board
            .rows
            .iter()
            .map(|row| match row {
                BoardRow::Header { city, state } => ListItem::new(Line::from(Span::styled(
                    format!("{city}, {state}"),
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ))),
                BoardRow::Venue(entry) => {
                    ListItem::new(Line::from(format!("    {}", entry.name)))
                }
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().fg(Color::Yellow))
            .highlight_symbol("▶ ");

        let mut state = ListState::default();
        state.select(Some(board.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_artist_board(&self, frame: &mut Frame, area: Rect, board: &ArtistBoard) {
        let block = Block::default().title("Artists").borders(Borders::ALL);

        if board.artists.is_empty() {
            let paragraph = Paragraph::new("No artists listed yet. Press + to add the first one.")
                .block(block)
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(paragraph, area);
            return;
        }

        let items: Vec<ListItem> = board
            .artists
            .iter()
            .map(|artist| ListItem::new(Line::from(artist.name.clone())))
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().fg(Color::Yellow))
            .highlight_symbol("▶ ");

        let mut state = ListState::default();
        state.select(Some(board.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_show_board(&self, frame: &mut Frame, area: Rect, board: &ShowBoard) {
        let block = Block::default().title("Shows").borders(Borders::ALL);

        if board.shows.is_empty() {
            let paragraph = Paragraph::new("No shows booked yet. Press + to list one.")
                .block(block)
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(paragraph, area);
            return;
        }

        let items: Vec<ListItem> = board
            .shows
            .iter()
            .map(|show| {
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format_start_time(show.start_time),
                        Style::default().fg(Color::Gray),
                    ),
                    Span::raw("  "),
                    Span::raw(show.billing()),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().fg(Color::Yellow))
            .highlight_symbol("▶ ");

        let mut state = ListState::default();
        state.select(Some(board.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_venue_detail(&self, frame: &mut Frame, area: Rect, screen: &VenueDetailScreen) {
        let detail = &screen.detail;
        let venue = &detail.venue;

        let mut lines = vec![
            Line::from(Span::styled(
                venue.name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(format!("{} · {}", venue.location(), venue.address)),
        ];
        push_profile_lines(
            &mut lines,
            &venue.genres,
            &venue.phone,
            &venue.website,
            &venue.facebook_link,
        );
        push_seeking_lines(
            &mut lines,
            venue.seeking_talent,
            "Seeking talent",
            &venue.seeking_description,
        );

        lines.push(Line::from(""));
        lines.push(section_header("Past Shows", detail.past_shows_count()));
        for entry in &detail.past_shows {
            lines.push(Line::from(format!(
                "  {}  {}",
                format_start_time(entry.start_time),
                entry.artist_name
            )));
        }
        lines.push(Line::from(""));
        lines.push(section_header(
            "Upcoming Shows",
            detail.upcoming_shows_count(),
        ));
        for entry in &detail.upcoming_shows {
            lines.push(Line::from(format!(
                "  {}  {}",
                format_start_time(entry.start_time),
                entry.artist_name
            )));
        }

        let block = Block::default().title("Venue").borders(Borders::ALL);
        let paragraph = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((screen.scroll, 0));
        frame.render_widget(paragraph, area);
    }

    fn draw_artist_detail(&self, frame: &mut Frame, area: Rect, screen: &ArtistDetailScreen) {
        let detail = &screen.detail;
        let artist = &detail.artist;

        let mut lines = vec![
            Line::from(Span::styled(
                artist.name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(artist.location()),
        ];
        push_profile_lines(
            &mut lines,
            &artist.genres,
            &artist.phone,
            &artist.website,
            &artist.facebook_link,
        );
        push_seeking_lines(
            &mut lines,
            artist.seeking_venue,
            "Seeking venues",
            &artist.seeking_description,
        );

        lines.push(Line::from(""));
        lines.push(section_header("Past Shows", detail.past_shows_count()));
        for entry in &detail.past_shows {
            lines.push(Line::from(format!(
                "  {}  at {}",
                format_start_time(entry.start_time),
                entry.venue_name
            )));
        }
        lines.push(Line::from(""));
        lines.push(section_header(
            "Upcoming Shows",
            detail.upcoming_shows_count(),
        ));
        for entry in &detail.upcoming_shows {
            lines.push(Line::from(format!(
                "  {}  at {}",
                format_start_time(entry.start_time),
                entry.venue_name
            )));
        }

        let block = Block::default().title("Artist").borders(Borders::ALL);
        let paragraph = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((screen.scroll, 0));
        frame.render_widget(paragraph, area);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let hint = match (&self.mode, &self.screen) {
            (Mode::Normal, Screen::Venues(_)) => {
                "Enter detail · + add · e edit · - remove · / search · a artists · s shows · q quit"
            }
            (Mode::Normal, Screen::Artists(_)) => {
                "Enter detail · + add · e edit · - remove · / search · v venues · s shows · q quit"
            }
            (Mode::Normal, Screen::Shows(_)) => {
                "Enter venue · + book · - cancel · v venues · a artists · q quit"
            }
            (Mode::Normal, Screen::VenueDetail(_)) | (Mode::Normal, Screen::ArtistDetail(_)) => {
                "e edit · - remove · o website · f facebook · ↑/↓ scroll · Esc back"
            }
            _ => "Enter confirm · Tab next field · Esc cancel",
        };

        let mut lines = Vec::new();
        if let Some(status) = &self.status {
            lines.push(Line::from(Span::styled(
                status.text.clone(),
                status.kind.style(),
            )));
        } else {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(
            hint,
            Style::default().fg(Color::Gray),
        )));

        let paragraph = Paragraph::new(lines).block(Block::default().borders(Borders::TOP));
        frame.render_widget(paragraph, area);
    }

    fn draw_profile_form(&self, frame: &mut Frame, area: Rect, title: &str, form: &ProfileForm) {
        let popup_area = centered_rect(80, 80, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title.to_string()).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = form.build_lines();
        lines.push(Line::from(""));
        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save · Tab to switch · Space toggles · ←/→ pick genre · Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let (label, value, _) = form.text_field(form.active);
        if !label.is_empty() {
            let prefix = label.chars().count() as u16 + 2;
            let row = form.active_row() as u16;
            frame.set_cursor_position((
                inner.x + prefix + value.chars().count() as u16,
                inner.y + row,
            ));
        }
    }

    fn draw_show_form(&self, frame: &mut Frame, area: Rect, form: &ShowForm) {
        let popup_area = centered_rect(70, 50, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Book Show").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let artist_line = form.build_line("Artist id", ShowField::ArtistId);
        let venue_line = form.build_line("Venue id", ShowField::VenueId);
        let time_line = form.build_line("Start time", ShowField::StartTime);

        let mut lines = vec![artist_line, venue_line, time_line, Line::from("")];

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save · Tab to switch · Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let (cursor_x, cursor_y) = match form.active {
            ShowField::ArtistId => {
                let prefix = "Artist id: ".len() as u16;
                (
                    inner.x + prefix + form.value_len(ShowField::ArtistId) as u16,
                    inner.y,
                )
            }
            ShowField::VenueId => {
                let prefix = "Venue id: ".len() as u16;
                (
                    inner.x + prefix + form.value_len(ShowField::VenueId) as u16,
                    inner.y + 1,
                )
            }
            ShowField::StartTime => {
                let prefix = "Start time: ".len() as u16;
                (
                    inner.x + prefix + form.value_len(ShowField::StartTime) as u16,
                    inner.y + 2,
                )
            }
        };
        frame.set_cursor_position((cursor_x, cursor_y));
    }

    fn draw_confirm_venue(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmVenueDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Confirm Removal")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!("Remove Venue '{}'?", confirm.name)),
            Line::from("This will also cancel every show booked there."),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_confirm_artist(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmArtistDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Confirm Removal")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!("Remove Artist '{}'?", confirm.name)),
            Line::from("This will also cancel every show booking them."),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_confirm_show_cancel(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmShowCancel) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Cancel Show").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!("Cancel {}?", confirm.billing)),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_search(&self, frame: &mut Frame, area: Rect, state: &SearchState) {
        let popup_area = centered_rect(70, 60, area);
        frame.render_widget(Clear, popup_area);

        let title = match state.target {
            SearchTarget::Venues => "Search Venues",
            SearchTarget::Artists => "Search Artists",
        };
        let block = Block::default().title(title).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![
            Line::from(vec![
                Span::raw("Search: "),
                Span::styled(state.query.clone(), Style::default().fg(Color::Yellow)),
            ]),
            Line::from(Span::styled(
                format!("{} result(s).", state.results.count),
                Style::default().fg(Color::Gray),
            )),
            Line::from(""),
        ];

        for (idx, entry) in state.results.matches.iter().enumerate() {
            let pointer = if idx == state.selected { "▶ " } else { "  " };
            let style = if idx == state.selected {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            lines.push(Line::from(Span::styled(
                format!("{pointer}{}", entry.name),
                style,
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        frame.set_cursor_position((
            inner.x + "Search: ".len() as u16 + state.query.chars().count() as u16,
            inner.y,
        ));
    }
}

/// Shared scalar lines for both detail pages: genres, phone, and links.
fn push_profile_lines(
    lines: &mut Vec<Line<'static>>,
    genres: &[String],
    phone: &str,
    website: &str,
    facebook_link: &str,
) {
    if !genres.is_empty() {
        lines.push(Line::from(Span::styled(
            genres.join(" · "),
            Style::default().fg(Color::Cyan),
        )));
    }
    if !phone.is_empty() {
        lines.push(Line::from(format!("Phone: {phone}")));
    }
    if !website.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("Website: {website}"),
            Style::default().fg(Color::Cyan),
        )));
    }
    if !facebook_link.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("Facebook: {facebook_link}"),
            Style::default().fg(Color::Cyan),
        )));
    }
}

/// Seeking banner for both detail pages.
fn push_seeking_lines(lines: &mut Vec<Line<'static>>, seeking: bool, label: &str, description: &str) {
    if seeking {
        lines.push(Line::from(Span::styled(
            format!("{label}: yes"),
            Style::default().fg(Color::Green),
        )));
        if !description.is_empty() {
            lines.push(Line::from(Span::styled(
                format!("  {description}"),
                Style::default().fg(Color::Green),
            )));
        }
    } else {
        lines.push(Line::from(Span::styled(
            format!("{label}: no"),
            Style::default().fg(Color::DarkGray),
        )));
    }
}

fn section_header(title: &str, count: usize) -> Line<'static> {
    Line::from(Span::styled(
        format!("{title} ({count})"),
        Style::default().add_modifier(Modifier::BOLD),
    ))
}

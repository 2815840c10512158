use crate::models::{ArtistDetail, CityGroup, DirectoryEntry, ShowListing, VenueDetail};

/// One rendered row of the venue board: either a (city, state) header or a
/// selectable venue beneath it.
pub(crate) enum BoardRow {
    Header { city: String, state: String },
    Venue(DirectoryEntry),
}

/// The home screen: every venue grouped by location, flattened into rows so
/// rendering and selection share one index space. Selection only ever rests
/// on venue rows; headers are skipped while moving.
pub(crate) struct VenueBoard {
    pub(crate) rows: Vec<BoardRow>,
    pub(crate) selected: usize,
}

impl VenueBoard {
    pub(crate) fn new(groups: Vec<CityGroup>) -> Self {
        let mut rows = Vec::new();
        for group in groups {
            rows.push(BoardRow::Header {
                city: group.city,
                state: group.state,
            });
            for venue in group.venues {
                rows.push(BoardRow::Venue(venue));
            }
        }

        let mut board = Self { rows, selected: 0 };
        board.snap_to_venue(1);
        board
    }

    /// The venue row the cursor currently rests on.
    pub(crate) fn current_venue(&self) -> Option<&DirectoryEntry> {
        match self.rows.get(self.selected) {
            Some(BoardRow::Venue(entry)) => Some(entry),
            _ => None,
        }
    }

    /// Move the cursor by `offset` selectable rows, skipping headers.
    pub(crate) fn move_selection(&mut self, offset: isize) {
        if offset == 0 {
            return;
        }
        let step = if offset < 0 { -1 } else { 1 };
        for _ in 0..offset.unsigned_abs() {
            if !self.step_once(step) {
                break;
            }
        }
    }

    /// Advance one venue row in `direction`, staying put at either edge.
    fn step_once(&mut self, direction: isize) -> bool {
        let mut idx = self.selected as isize;
        loop {
            idx += direction;
            if idx < 0 || idx >= self.rows.len() as isize {
                return false;
            }
            if matches!(self.rows[idx as usize], BoardRow::Venue(_)) {
                self.selected = idx as usize;
                return true;
            }
        }
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
        self.snap_to_venue(1);
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.rows.len().saturating_sub(1);
        self.snap_to_venue(-1);
    }

    /// Settle the cursor on the nearest venue row in `direction`, accepting
    /// the current row if it already is one.
    fn snap_to_venue(&mut self, direction: isize) {
        if matches!(self.rows.get(self.selected), Some(BoardRow::Venue(_))) {
            return;
        }
        if !self.step_once(direction) {
            self.step_once(-direction);
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        !self.rows.iter().any(|row| matches!(row, BoardRow::Venue(_)))
    }
}

/// Flat artist listing with a clamped selection cursor.
pub(crate) struct ArtistBoard {
    pub(crate) artists: Vec<DirectoryEntry>,
    pub(crate) selected: usize,
}

impl ArtistBoard {
    pub(crate) fn new(artists: Vec<DirectoryEntry>) -> Self {
        Self {
            artists,
            selected: 0,
        }
    }

    pub(crate) fn current_artist(&self) -> Option<&DirectoryEntry> {
        self.artists.get(self.selected)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        move_clamped(&mut self.selected, offset, self.artists.len());
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.artists.len().saturating_sub(1);
    }
}

/// Every show in the directory with a clamped selection cursor.
pub(crate) struct ShowBoard {
    pub(crate) shows: Vec<ShowListing>,
    pub(crate) selected: usize,
}

impl ShowBoard {
    pub(crate) fn new(shows: Vec<ShowListing>) -> Self {
        Self { shows, selected: 0 }
    }

    pub(crate) fn current_show(&self) -> Option<&ShowListing> {
        self.shows.get(self.selected)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        move_clamped(&mut self.selected, offset, self.shows.len());
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.shows.len().saturating_sub(1);
    }
}

/// A loaded venue detail plus its vertical scroll offset.
pub(crate) struct VenueDetailScreen {
    pub(crate) detail: VenueDetail,
    pub(crate) scroll: u16,
}

impl VenueDetailScreen {
    pub(crate) fn new(detail: VenueDetail) -> Self {
        Self { detail, scroll: 0 }
    }

    pub(crate) fn scroll_by(&mut self, delta: i16) {
        self.scroll = self.scroll.saturating_add_signed(delta);
    }
}

/// A loaded artist detail plus its vertical scroll offset.
pub(crate) struct ArtistDetailScreen {
    pub(crate) detail: ArtistDetail,
    pub(crate) scroll: u16,
}

impl ArtistDetailScreen {
    pub(crate) fn new(detail: ArtistDetail) -> Self {
        Self { detail, scroll: 0 }
    }

    pub(crate) fn scroll_by(&mut self, delta: i16) {
        self.scroll = self.scroll.saturating_add_signed(delta);
    }
}

/// Clamp-style cursor movement shared by the flat boards.
fn move_clamped(selected: &mut usize, offset: isize, len: usize) {
    if len == 0 {
        *selected = 0;
        return;
    }
    let max = len as isize - 1;
    let mut new = *selected as isize + offset;
    if new < 0 {
        new = 0;
    }
    if new > max {
        new = max;
    }
    *selected = new as usize;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_board() -> VenueBoard {
        VenueBoard::new(vec![
            CityGroup {
                city: "Austin".to_string(),
                state: "TX".to_string(),
                venues: vec![DirectoryEntry {
                    id: 1,
                    name: "Broken Spoke".to_string(),
                }],
            },
            CityGroup {
                city: "San Francisco".to_string(),
                state: "CA".to_string(),
                venues: vec![
                    DirectoryEntry {
                        id: 2,
                        name: "The Musical Hop".to_string(),
                    },
                    DirectoryEntry {
                        id: 3,
                        name: "Park Square".to_string(),
                    },
                ],
            },
        ])
    }

    #[test]
    fn cursor_starts_on_the_first_venue_row() {
        let board = sample_board();
        assert_eq!(board.current_venue().unwrap().id, 1);
    }

    #[test]
    fn movement_skips_headers_in_both_directions() {
        let mut board = sample_board();
        board.move_selection(1);
        assert_eq!(board.current_venue().unwrap().id, 2);
        board.move_selection(-1);
        assert_eq!(board.current_venue().unwrap().id, 1);
    }

    #[test]
    fn movement_clamps_at_the_edges() {
        let mut board = sample_board();
        board.move_selection(-5);
        assert_eq!(board.current_venue().unwrap().id, 1);
        board.move_selection(99);
        assert_eq!(board.current_venue().unwrap().id, 3);
    }

    #[test]
    fn empty_board_has_no_current_venue() {
        let board = VenueBoard::new(Vec::new());
        assert!(board.is_empty());
        assert!(board.current_venue().is_none());
    }
}

//! Song management: the admin table's search, filter and sort, plus the
//! song form and the error messages for catalogue writes.

mod form;

pub use form::{FormError, SongForm, SongFormMode, MAX_UPLOAD_BYTES};

use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::api::models::Song;
use crate::api::ApiError;
use crate::controller::Forbidden;
use crate::error::ClientError;

/// Free-text search plus an exact artist filter. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SongFilter {
    pub search: String,
    pub artist: String,
}

impl SongFilter {
    pub fn matches(&self, song: &Song) -> bool {
        let needle = self.search.trim().to_lowercase();
        let text_match = needle.is_empty()
            || song.title.to_lowercase().contains(&needle)
            || song.artist.to_lowercase().contains(&needle)
            || song
                .album
                .as_deref()
                .is_some_and(|album| album.to_lowercase().contains(&needle));
        let artist_match = self.artist.is_empty() || song.artist == self.artist;
        text_match && artist_match
    }

    pub fn apply<'a>(&self, songs: &'a [Song]) -> Vec<&'a Song> {
        songs.iter().filter(|song| self.matches(song)).collect()
    }
}

/// Every artist in the catalogue once, alphabetically, for the filter dropdown.
pub fn distinct_artists(songs: &[Song]) -> Vec<String> {
    songs
        .iter()
        .map(|song| song.artist.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Title,
    Artist,
    Album,
    Duration,
}

impl SortKey {
    pub const ALL: [SortKey; 4] = [
        SortKey::Title,
        SortKey::Artist,
        SortKey::Album,
        SortKey::Duration,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SortKey::Title => "Title",
            SortKey::Artist => "Artist",
            SortKey::Album => "Album",
            SortKey::Duration => "Duration",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortConfig {
    pub key: SortKey,
    pub order: SortOrder,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            key: SortKey::Title,
            order: SortOrder::Ascending,
        }
    }
}

impl SortConfig {
    /// Clicking the active column flips its order; another column starts ascending.
    pub fn toggle(self, key: SortKey) -> Self {
        let order = if self.key == key && self.order == SortOrder::Ascending {
            SortOrder::Descending
        } else {
            SortOrder::Ascending
        };
        Self { key, order }
    }

    /// Arrow shown next to a column header.
    pub fn indicator(&self, key: SortKey) -> &'static str {
        match (self.key == key, self.order) {
            (false, _) => "",
            (true, SortOrder::Ascending) => "▲",
            (true, SortOrder::Descending) => "▼",
        }
    }
}

fn compare(a: &Song, b: &Song, key: SortKey) -> Ordering {
    match key {
        SortKey::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        SortKey::Artist => a.artist.to_lowercase().cmp(&b.artist.to_lowercase()),
        SortKey::Album => a
            .album_label()
            .to_lowercase()
            .cmp(&b.album_label().to_lowercase()),
        SortKey::Duration => a.duration_seconds.cmp(&b.duration_seconds),
    }
}

/// Stable sort, so equal keys keep catalogue order.
pub fn sort_songs(songs: &mut [&Song], config: SortConfig) {
    songs.sort_by(|a, b| {
        let ordering = compare(a, b, config.key);
        match config.order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    });
}

/// Filter then sort, the rows the admin table renders.
pub fn visible_songs<'a>(songs: &'a [Song], filter: &SongFilter, sort: SortConfig) -> Vec<&'a Song> {
    let mut rows = filter.apply(songs);
    sort_songs(&mut rows, sort);
    rows
}

pub fn showing_label(shown: usize, total: usize) -> String {
    format!("Showing {shown} of {total} songs")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Upload,
    Update,
    Delete,
}

impl Mutation {
    /// A 403 on upload means "not an admin"; on other writes the token is gone.
    pub fn forbidden(self) -> Forbidden {
        match self {
            Mutation::Upload => Forbidden::Report,
            Mutation::Update | Mutation::Delete => Forbidden::Expire,
        }
    }
}

/// Message for a failed catalogue write. Session-ending failures are handled
/// through [`AppController::handle_api_error`](crate::controller::AppController::handle_api_error).
pub fn mutation_error(mutation: Mutation, err: ApiError) -> ClientError {
    if mutation == Mutation::Upload && err.status() == Some(403) {
        return ClientError::MutationFailed("Access denied! Only ADMIN can upload songs.".to_string());
    }
    let action = match mutation {
        Mutation::Upload => "Upload",
        Mutation::Update => "Update",
        Mutation::Delete => "Delete",
    };
    let message = match err.backend_message() {
        Some(message) => format!("{action} failed: {message}"),
        None => format!("{action} failed: {err}"),
    };
    ClientError::MutationFailed(message)
}

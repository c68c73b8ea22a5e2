//! Playback cursor and transport controls over a single media output.

mod media;

pub use media::{HeadlessMedia, MediaError, MediaEvent, MediaResource};

#[cfg(test)]
pub use media::MediaCall;

use crate::api::models::Song;
use crate::error::ClientError;

pub const DEFAULT_VOLUME: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    /// No current song.
    Idle,
    Paused,
    Playing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Forward,
    Back,
}

/// Owns the playlist, the playback cursor and the media output. All mutation
/// goes through the transport methods or [`PlaybackController::handle_media_event`].
#[derive(Debug)]
pub struct PlaybackController<M> {
    media: M,
    playlist: Vec<Song>,
    loaded: bool,
    current: Option<usize>,
    state: TransportState,
    position: f64,
    duration: Option<f64>,
    volume: f64,
    restore_volume: f64,
    muted: bool,
    /// Set by a swap while playing; the new source starts once the media
    /// reports it is loaded.
    pending_start: bool,
    error: Option<String>,
}

impl<M: MediaResource> PlaybackController<M> {
    pub fn new(mut media: M) -> Self {
        media.set_volume(DEFAULT_VOLUME);
        Self {
            media,
            playlist: Vec::new(),
            loaded: false,
            current: None,
            state: TransportState::Idle,
            position: 0.0,
            duration: None,
            volume: DEFAULT_VOLUME,
            restore_volume: DEFAULT_VOLUME,
            muted: false,
            pending_start: false,
            error: None,
        }
    }

    /// Install a freshly fetched playlist. The first song becomes current but
    /// does not start.
    pub fn replace_playlist(&mut self, songs: Vec<Song>) {
        self.media.pause();
        self.playlist = songs;
        self.loaded = true;
        self.pending_start = false;
        self.error = None;
        self.reset_position();

        if self.playlist.is_empty() {
            self.current = None;
            self.state = TransportState::Idle;
            self.media.unload();
        } else {
            self.current = Some(0);
            self.state = TransportState::Paused;
            self.media.load(&self.playlist[0].file_url);
        }
    }

    /// Back to an empty, not-yet-loaded player. Volume settings are kept.
    pub fn reset(&mut self) {
        self.media.pause();
        self.media.unload();
        self.playlist.clear();
        self.loaded = false;
        self.current = None;
        self.state = TransportState::Idle;
        self.pending_start = false;
        self.error = None;
        self.reset_position();
    }

    pub fn play(&mut self) -> Result<(), ClientError> {
        if self.current.is_none() || self.state == TransportState::Playing {
            return Ok(());
        }
        self.start()
    }

    pub fn pause(&mut self) {
        self.pending_start = false;
        if self.state == TransportState::Playing {
            self.media.pause();
            self.state = TransportState::Paused;
        }
    }

    pub fn toggle_play(&mut self) -> Result<(), ClientError> {
        if self.state == TransportState::Playing {
            self.pause();
            Ok(())
        } else {
            self.play()
        }
    }

    /// Jump to `target` seconds, clamped to the known duration (0 while unknown).
    pub fn seek(&mut self, target: f64) {
        if self.current.is_none() {
            return;
        }
        let max = self.duration.unwrap_or(0.0);
        let target = if target.is_finite() {
            target.clamp(0.0, max)
        } else {
            0.0
        };
        self.position = target;
        self.media.seek(target);
    }

    /// Seek to a fraction of the track, as a click on the progress bar does.
    /// Ignored until the media has reported a duration.
    pub fn seek_fraction(&mut self, fraction: f64) {
        if let Some(duration) = self.duration {
            let fraction = if fraction.is_finite() {
                fraction.clamp(0.0, 1.0)
            } else {
                0.0
            };
            self.seek(fraction * duration);
        }
    }

    pub fn next(&mut self) {
        self.step(Step::Forward);
    }

    pub fn previous(&mut self) {
        self.step(Step::Back);
    }

    /// Start the song at `index` from the list, whatever the current state.
    pub fn select(&mut self, index: usize) {
        if index < self.playlist.len() {
            self.swap_to(index, true);
        }
    }

    pub fn set_volume(&mut self, volume: f64) {
        let volume = if volume.is_finite() {
            volume.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.volume = volume;
        if volume > 0.0 {
            self.restore_volume = volume;
            self.muted = false;
        } else {
            self.muted = true;
        }
        self.media.set_volume(volume);
    }

    pub fn toggle_mute(&mut self) {
        if self.is_muted() {
            self.volume = self.restore_volume;
            self.muted = false;
        } else {
            self.restore_volume = self.volume;
            self.volume = 0.0;
            self.muted = true;
        }
        self.media.set_volume(self.volume);
    }

    pub fn handle_media_event(&mut self, event: MediaEvent) -> Result<(), ClientError> {
        match event {
            MediaEvent::Loaded { duration } => {
                self.duration = duration.filter(|d| d.is_finite() && *d > 0.0);
                self.position = 0.0;
                if self.pending_start {
                    self.pending_start = false;
                    return self.start();
                }
                Ok(())
            }
            MediaEvent::TimeUpdate(seconds) => {
                if self.current.is_some() && seconds.is_finite() {
                    let upper = self.duration.unwrap_or(f64::MAX);
                    self.position = seconds.clamp(0.0, upper);
                }
                Ok(())
            }
            // A swap pauses the old source itself; that is not a user pause.
            MediaEvent::Paused => {
                if self.state == TransportState::Playing && !self.pending_start {
                    self.state = TransportState::Paused;
                }
                Ok(())
            }
            MediaEvent::Resumed => {
                if self.state == TransportState::Paused && !self.pending_start {
                    self.state = TransportState::Playing;
                    self.error = None;
                }
                Ok(())
            }
            MediaEvent::Ended => {
                self.step(Step::Forward);
                Ok(())
            }
            MediaEvent::Failed(reason) => {
                self.pending_start = false;
                if self.current.is_some() {
                    self.state = TransportState::Paused;
                }
                tracing::warn!("playback failed: {reason}");
                self.error = Some(reason.clone());
                Err(ClientError::PlaybackFailed(reason))
            }
        }
    }

    fn start(&mut self) -> Result<(), ClientError> {
        self.pending_start = false;
        match self.media.play() {
            Ok(()) => {
                self.state = TransportState::Playing;
                self.error = None;
                Ok(())
            }
            Err(err) => {
                self.state = TransportState::Paused;
                let message = err.to_string();
                tracing::warn!("could not start playback: {message}");
                self.error = Some(message.clone());
                Err(ClientError::PlaybackFailed(message))
            }
        }
    }

    fn step(&mut self, step: Step) {
        let len = self.playlist.len();
        if len == 0 {
            return;
        }
        let index = self.current.unwrap_or(0);
        let target = match step {
            Step::Forward => (index + 1) % len,
            Step::Back if index == 0 => len - 1,
            Step::Back => index - 1,
        };
        let resume = self.state == TransportState::Playing;
        self.swap_to(target, resume);
    }

    /// Swap the source, then (optionally) start once the media is ready.
    /// A newer swap simply replaces the source of an older one, so under rapid
    /// input only the last requested song gets started.
    fn swap_to(&mut self, index: usize, start: bool) {
        self.current = Some(index);
        self.reset_position();
        self.media.load(&self.playlist[index].file_url);
        if start {
            self.state = TransportState::Playing;
            self.pending_start = true;
        } else {
            self.state = TransportState::Paused;
            self.pending_start = false;
        }
    }

    fn reset_position(&mut self) {
        self.position = 0.0;
        self.duration = None;
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == TransportState::Playing
    }

    /// True between a swap and the media reporting the new source loaded.
    pub fn awaiting_start(&self) -> bool {
        self.pending_start
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn playlist(&self) -> &[Song] {
        &self.playlist
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_song(&self) -> Option<&Song> {
        self.current.and_then(|index| self.playlist.get(index))
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    /// Duration reported by the media, if any.
    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    /// Duration for display: the media's if known, otherwise the catalogue's.
    pub fn display_duration(&self) -> f64 {
        self.duration.unwrap_or_else(|| {
            self.current_song()
                .map(|song| f64::from(song.duration_seconds))
                .unwrap_or(0.0)
        })
    }

    /// Progress bar fill in percent. Never divides by zero.
    pub fn progress_percent(&self) -> f64 {
        let total = self.display_duration();
        let denominator = if total > 0.0 { total } else { 1.0 };
        (self.position / denominator * 100.0).clamp(0.0, 100.0)
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn is_muted(&self) -> bool {
        self.muted || self.volume == 0.0
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    pub fn media_mut(&mut self) -> &mut M {
        &mut self.media
    }
}

/// `m:ss`, with `0:00` for anything that is not a real time.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

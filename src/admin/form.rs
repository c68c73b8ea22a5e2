use thiserror::Error;

use crate::api::models::{AudioFile, Song, SongMetadata};
use crate::error::ClientError;

pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Title is required")]
    MissingTitle,
    #[error("Artist is required")]
    MissingArtist,
    #[error("Please choose an audio file to upload")]
    MissingFile,
    #[error("Please select an audio file ({0} is not audio)")]
    NotAudio(String),
    #[error("File size must be less than 50MB")]
    TooLarge,
    #[error("Duration must be a whole number of seconds")]
    InvalidDuration,
}

impl From<FormError> for ClientError {
    fn from(err: FormError) -> Self {
        ClientError::Validation(err.to_string())
    }
}

/// Create a new song, or edit the metadata of the song with this id.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SongFormMode {
    #[default]
    Create,
    Edit(String),
}

/// Raw input of the admin song form. Duration is kept as typed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SongForm {
    pub mode: SongFormMode,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub duration: String,
    pub file: Option<AudioFile>,
}

impl SongForm {
    pub fn create() -> Self {
        Self::default()
    }

    /// Pre-filled from an existing song. The file stays empty: editing
    /// changes metadata only.
    pub fn edit(song: &Song) -> Self {
        Self {
            mode: SongFormMode::Edit(song.id.clone()),
            title: song.title.clone(),
            artist: song.artist.clone(),
            album: song.album.clone().unwrap_or_default(),
            duration: if song.duration_seconds > 0 {
                song.duration_seconds.to_string()
            } else {
                String::new()
            },
            file: None,
        }
    }

    pub fn is_edit(&self) -> bool {
        matches!(self.mode, SongFormMode::Edit(_))
    }

    /// Accept a picked file only if it is audio and within the upload limit.
    pub fn attach(&mut self, file: AudioFile) -> Result<(), FormError> {
        check_file(&file)?;
        self.file = Some(file);
        Ok(())
    }

    pub fn validate(&self) -> Result<(SongMetadata, Option<AudioFile>), FormError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(FormError::MissingTitle);
        }
        let artist = self.artist.trim();
        if artist.is_empty() {
            return Err(FormError::MissingArtist);
        }

        let duration = self.duration.trim();
        let duration_seconds = if duration.is_empty() {
            0
        } else {
            duration
                .parse::<u32>()
                .map_err(|_| FormError::InvalidDuration)?
        };

        match (&self.mode, &self.file) {
            (SongFormMode::Create, None) => return Err(FormError::MissingFile),
            (_, Some(file)) => check_file(file)?,
            _ => {}
        }

        let metadata = SongMetadata {
            title: title.to_string(),
            artist: artist.to_string(),
            album: self.album.trim().to_string(),
            duration_seconds,
        };
        Ok((metadata, self.file.clone()))
    }
}

fn check_file(file: &AudioFile) -> Result<(), FormError> {
    if !file.mime.starts_with("audio/") {
        let kind = if file.mime.is_empty() {
            file.name.clone()
        } else {
            file.mime.clone()
        };
        return Err(FormError::NotAudio(kind));
    }
    if file.bytes.len() > MAX_UPLOAD_BYTES {
        return Err(FormError::TooLarge);
    }
    Ok(())
}

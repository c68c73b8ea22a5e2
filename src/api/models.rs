use serde::{Deserialize, Serialize};

use crate::api::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Role {
    #[default]
    #[serde(rename = "USER")]
    Listener,
    #[serde(rename = "ADMIN")]
    Admin,
}

impl Role {
    /// Accepts `ADMIN`, `admin` and Spring-style `ROLE_ADMIN`. Anything else is a listener.
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        let bare = trimmed
            .strip_prefix("ROLE_")
            .or_else(|| trimmed.strip_prefix("role_"))
            .unwrap_or(trimmed);
        if bare.eq_ignore_ascii_case("admin") {
            Role::Admin
        } else {
            Role::Listener
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Role::Listener => "USER",
            Role::Admin => "ADMIN",
        }
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Role::parse).unwrap_or_default())
    }
}

/// A catalogue entry. Built only through [`RawSong`] so that records without a
/// title or artist never reach the playlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSong", rename_all = "camelCase")]
pub struct Song {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    pub duration_seconds: u32,
    pub file_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSong {
    #[serde(default)]
    id: serde_json::Value,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    artist: Option<String>,
    #[serde(default)]
    album: Option<String>,
    #[serde(default)]
    duration_seconds: Option<f64>,
    #[serde(default, alias = "url", alias = "streamUrl")]
    file_url: Option<String>,
}

impl TryFrom<RawSong> for Song {
    type Error = String;

    fn try_from(raw: RawSong) -> Result<Self, Self::Error> {
        let id = match raw.id {
            serde_json::Value::String(id) if !id.trim().is_empty() => id,
            serde_json::Value::Number(id) => id.to_string(),
            _ => return Err("song is missing an id".to_string()),
        };
        let title = required(raw.title)
            .ok_or_else(|| format!("song {id} is missing a title"))?;
        let artist = required(raw.artist)
            .ok_or_else(|| format!("song {id} is missing an artist"))?;

        Ok(Song {
            id,
            title,
            artist,
            album: raw
                .album
                .map(|album| album.trim().to_string())
                .filter(|album| !album.is_empty()),
            duration_seconds: raw
                .duration_seconds
                .filter(|seconds| seconds.is_finite() && *seconds > 0.0)
                .map(|seconds| seconds.round() as u32)
                .unwrap_or(0),
            file_url: raw.file_url.unwrap_or_default(),
        })
    }
}

fn required(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

impl Song {
    /// Decode a list response, dropping (and logging) records that fail validation.
    pub fn list_from_json(body: &str) -> Result<Vec<Song>, ApiError> {
        let values: Vec<serde_json::Value> =
            serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))?;

        let mut songs = Vec::with_capacity(values.len());
        for value in values {
            match serde_json::from_value::<Song>(value) {
                Ok(song) => songs.push(song),
                Err(err) => tracing::warn!("skipping invalid song record: {err}"),
            }
        }
        Ok(songs)
    }

    pub fn from_json(body: &str) -> Result<Song, ApiError> {
        serde_json::from_str(body).map_err(|e| ApiError::InvalidRecord(e.to_string()))
    }

    pub fn album_label(&self) -> &str {
        self.album.as_deref().unwrap_or("")
    }

    /// First letter of the artist, used as album-art placeholder.
    pub fn initial(&self) -> String {
        self.artist
            .chars()
            .next()
            .map(|c| c.to_uppercase().to_string())
            .unwrap_or_else(|| "A".to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Body of a successful login. Stored verbatim as the `user` credential entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub id: Option<serde_json::Value>,
}

/// The profile fields the backend returns after a profile update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct UserProfile {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

/// Editable song fields, sent as JSON on update and as multipart fields on upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SongMetadata {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub duration_seconds: u32,
}

/// An audio file picked for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

pub fn format_duration(seconds: u32) -> String {
    if seconds == 0 {
        return "-".to_string();
    }
    let mins = seconds / 60;
    let secs = seconds % 60;
    format!("{}:{:02}", mins, secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn songs_accept_numeric_ids_and_camel_case_fields() {
        let song = Song::from_json(
            r#"{"id":7,"title":"Blue","artist":"Joni","album":"Blue","durationSeconds":181,"fileUrl":"https://cdn/blue.mp3"}"#,
        )
        .unwrap();
        assert_eq!(song.id, "7");
        assert_eq!(song.duration_seconds, 181);
        assert_eq!(song.file_url, "https://cdn/blue.mp3");
        assert_eq!(song.album.as_deref(), Some("Blue"));
    }

    #[test]
    fn list_decoding_skips_records_without_title_or_artist() {
        let body = r#"[
            {"id":"a","title":"One","artist":"U2","fileUrl":"/one.mp3"},
            {"id":"b","title":"  ","artist":"Nobody"},
            {"id":"c","title":"Orphan"},
            {"id":"d","title":"Two","artist":"Blur","album":"","durationSeconds":null}
        ]"#;
        let songs = Song::list_from_json(body).unwrap();
        let ids: Vec<&str> = songs.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "d"]);
        assert_eq!(songs[1].album, None);
        assert_eq!(songs[1].duration_seconds, 0);
    }

    #[test]
    fn single_record_without_artist_is_rejected() {
        let err = Song::from_json(r#"{"id":1,"title":"Lonely"}"#).unwrap_err();
        assert!(matches!(err, ApiError::InvalidRecord(_)));
    }

    #[test]
    fn roles_parse_common_spellings() {
        assert_eq!(Role::parse("ADMIN"), Role::Admin);
        assert_eq!(Role::parse("admin"), Role::Admin);
        assert_eq!(Role::parse("ROLE_ADMIN"), Role::Admin);
        assert_eq!(Role::parse("USER"), Role::Listener);
        assert_eq!(Role::parse(""), Role::Listener);

        let login: LoginResponse =
            serde_json::from_str(r#"{"token":"t","username":"u","role":null}"#).unwrap();
        assert_eq!(login.role, Role::Listener);
    }

    #[test]
    fn durations_render_like_the_song_table() {
        assert_eq!(format_duration(0), "-");
        assert_eq!(format_duration(65), "1:05");
        assert_eq!(format_duration(600), "10:00");
    }
}

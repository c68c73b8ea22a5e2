use crate::api::models::{AudioFile, Song, SongMetadata};
use crate::api::transport::{ApiRequest, HttpTransport, Method};
use crate::api::ApiError;
use crate::config::ClientConfig;
use crate::diagnostics::{log_perf, perf_start};

/// CRUD calls against the song catalogue. Every call takes the bearer token
/// explicitly; the client itself holds no session.
#[derive(Debug, Clone)]
pub struct CatalogueClient<T> {
    config: ClientConfig,
    transport: T,
}

impl<T: HttpTransport> CatalogueClient<T> {
    pub fn new(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub async fn list_songs(&self, token: &str) -> Result<Vec<Song>, ApiError> {
        self.fetch_list("/api/songs", token).await
    }

    pub async fn admin_list_songs(&self, token: &str) -> Result<Vec<Song>, ApiError> {
        self.fetch_list("/api/admin/songs", token).await
    }

    pub async fn upload_song(
        &self,
        token: &str,
        metadata: &SongMetadata,
        file: AudioFile,
    ) -> Result<Song, ApiError> {
        let fields = vec![
            ("title".to_string(), metadata.title.clone()),
            ("artist".to_string(), metadata.artist.clone()),
            ("album".to_string(), metadata.album.clone()),
            (
                "durationSeconds".to_string(),
                metadata.duration_seconds.to_string(),
            ),
        ];
        let request = ApiRequest::new(Method::Post, self.config.endpoint("/api/admin/upload"))
            .bearer(token)
            .multipart(fields, file);

        let response = self.transport.send(request).await?.ensure_success()?;
        let song = Song::from_json(&response.body)?;
        tracing::info!("uploaded song {} ({})", song.id, song.title);
        Ok(song)
    }

    pub async fn update_song(
        &self,
        token: &str,
        id: &str,
        metadata: &SongMetadata,
    ) -> Result<Song, ApiError> {
        let request = ApiRequest::new(Method::Put, self.song_url(id))
            .bearer(token)
            .json(metadata)?;

        let response = self.transport.send(request).await?.ensure_success()?;
        Song::from_json(&response.body)
    }

    pub async fn delete_song(&self, token: &str, id: &str) -> Result<(), ApiError> {
        let request = ApiRequest::new(Method::Delete, self.song_url(id)).bearer(token);
        self.transport.send(request).await?.ensure_success()?;
        tracing::info!("deleted song {id}");
        Ok(())
    }

    fn song_url(&self, id: &str) -> String {
        self.config
            .endpoint(&format!("/api/admin/songs/{}", urlencoding::encode(id)))
    }

    async fn fetch_list(&self, path: &str, token: &str) -> Result<Vec<Song>, ApiError> {
        let started_at = perf_start();
        let request = ApiRequest::new(Method::Get, self.config.endpoint(path)).bearer(token);
        let response = self.transport.send(request).await?.ensure_success()?;
        let songs = Song::list_from_json(&response.body)?;
        log_perf(path, started_at, &format!("{} songs", songs.len()));
        Ok(songs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::transport::testing::{FakeBackend, OfflineTransport};
    use crate::api::transport::RequestBody;

    fn client(backend: &FakeBackend) -> CatalogueClient<FakeBackend> {
        CatalogueClient::new(ClientConfig::new("http://backend.test"), backend.clone())
    }

    fn mp3(name: &str) -> AudioFile {
        AudioFile {
            name: name.to_string(),
            mime: "audio/mpeg".to_string(),
            bytes: vec![0xff, 0xfb, 0x90],
        }
    }

    #[tokio::test]
    async fn list_songs_sends_bearer_token() {
        let backend = FakeBackend::new()
            .with_user("ann", "pw", "USER", "tok-ann")
            .with_song("Heroes", "Bowie", 371);
        let songs = client(&backend).list_songs("tok-ann").await.unwrap();

        assert_eq!(songs.len(), 1);
        let request = backend.last_request().unwrap();
        assert_eq!(request.url, "http://backend.test/api/songs");
        assert_eq!(request.authorization().as_deref(), Some("Bearer tok-ann"));
    }

    #[tokio::test]
    async fn listener_cannot_reach_admin_listing() {
        let backend = FakeBackend::new().with_user("ann", "pw", "USER", "tok-ann");
        let err = client(&backend).admin_list_songs("tok-ann").await.unwrap_err();
        assert_eq!(err.status(), Some(403));
        assert!(err.is_auth_failure());
    }

    #[tokio::test]
    async fn uploaded_song_shows_up_in_the_next_listing() {
        let backend = FakeBackend::new().with_user("root", "pw", "ADMIN", "tok-admin");
        let catalogue = client(&backend);
        let metadata = SongMetadata {
            title: "Teardrop".to_string(),
            artist: "Massive Attack".to_string(),
            album: "Mezzanine".to_string(),
            duration_seconds: 330,
        };

        let created = catalogue
            .upload_song("tok-admin", &metadata, mp3("teardrop.mp3"))
            .await
            .unwrap();
        let listed = catalogue.admin_list_songs("tok-admin").await.unwrap();

        let found = listed.iter().find(|song| song.id == created.id).unwrap();
        assert_eq!(found.title, "Teardrop");
        assert_eq!(found.artist, "Massive Attack");

        let upload = backend.requests()[0].clone();
        let RequestBody::Multipart { fields, file } = upload.body else {
            panic!("upload must be multipart");
        };
        assert!(fields.contains(&("durationSeconds".to_string(), "330".to_string())));
        assert_eq!(file.name, "teardrop.mp3");
    }

    #[tokio::test]
    async fn update_and_delete_address_the_song_by_id() {
        let backend = FakeBackend::new()
            .with_user("root", "pw", "ADMIN", "tok-admin")
            .with_song("Old Title", "Someone", 100);
        let catalogue = client(&backend);
        let metadata = SongMetadata {
            title: "New Title".to_string(),
            artist: "Someone".to_string(),
            album: String::new(),
            duration_seconds: 101,
        };

        let updated = catalogue.update_song("tok-admin", "1", &metadata).await.unwrap();
        assert_eq!(updated.title, "New Title");
        assert_eq!(updated.duration_seconds, 101);
        assert_eq!(
            backend.last_request().unwrap().url,
            "http://backend.test/api/admin/songs/1"
        );

        catalogue.delete_song("tok-admin", "1").await.unwrap();
        assert!(catalogue.admin_list_songs("tok-admin").await.unwrap().is_empty());

        let err = catalogue.delete_song("tok-admin", "1").await.unwrap_err();
        assert_eq!(err.status(), Some(404));
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_transport_error() {
        let catalogue = CatalogueClient::new(ClientConfig::default(), OfflineTransport);
        let err = catalogue.list_songs("tok").await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }
}

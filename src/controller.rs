//! Session lifecycle and playlist loading around a [`PlaybackController`].

use crate::api::models::{LoginResponse, Song, UserProfile};
use crate::api::ApiError;
use crate::error::ClientError;
use crate::player::{MediaResource, PlaybackController};
use crate::session::{Session, SessionStore, StoredCredential};

/// Issued by [`AppController::begin_playlist_load`]. A ticket from before a
/// logout is stale and its result is thrown away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub epoch: u64,
    pub token: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded(usize),
    Discarded,
}

/// What a 403 from the backend means for a given call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Forbidden {
    /// The token is no longer accepted.
    Expire,
    /// The user lacks a permission; the session stays.
    Report,
}

#[derive(Debug)]
pub struct AppController<S, M> {
    store: S,
    session: Option<Session>,
    epoch: u64,
    player: PlaybackController<M>,
}

impl<S: SessionStore, M: MediaResource> AppController<S, M> {
    pub fn new(store: S, media: M) -> Self {
        Self {
            store,
            session: None,
            epoch: 0,
            player: PlaybackController::new(media),
        }
    }

    /// Restore the session from the credential store.
    pub fn start(&mut self) -> Result<Session, ClientError> {
        if let Some(session) = &self.session {
            return Ok(session.clone());
        }

        let credential = self.store.get().ok_or(ClientError::Unauthenticated)?;
        match credential.session() {
            Ok(session) => {
                tracing::info!("restored session for {}", session.username);
                self.session = Some(session.clone());
                Ok(session)
            }
            Err(err) => {
                tracing::warn!("discarding stored credential: {err}");
                self.store.clear();
                Err(ClientError::InvalidCredential(err.to_string()))
            }
        }
    }

    /// Persist a successful login and make it the active session.
    pub fn complete_login(&mut self, response: LoginResponse) -> Result<Session, ClientError> {
        // Resolved exactly as `start` will resolve it after a reload.
        let credential = StoredCredential::from_login(&response);
        let session = credential.session().map_err(|err| {
            tracing::warn!("login response carries no usable identity: {err}");
            ClientError::AuthFailed(
                "Login failed: the server returned an unusable session".to_string(),
            )
        })?;
        self.store.set(&credential).map_err(|err| {
            tracing::error!("{err}");
            ClientError::AuthFailed(format!("Could not save your login: {err}"))
        })?;

        self.epoch += 1;
        self.player.reset();
        self.session = Some(session.clone());
        Ok(session)
    }

    pub fn begin_playlist_load(&self) -> Option<LoadTicket> {
        self.session.as_ref().map(|session| LoadTicket {
            epoch: self.epoch,
            token: session.token.clone(),
        })
    }

    /// Ticket for the first fetch of this session's playlist. `None` once a
    /// playlist is installed, so remounting the player view keeps playback going.
    pub fn initial_playlist_load(&self) -> Option<LoadTicket> {
        if self.player.is_loaded() {
            return None;
        }
        self.begin_playlist_load()
    }

    pub fn finish_playlist_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Vec<Song>, ApiError>,
    ) -> Result<LoadOutcome, ClientError> {
        if !self.is_current(&ticket) {
            tracing::debug!("discarding playlist response from epoch {}", ticket.epoch);
            return Ok(LoadOutcome::Discarded);
        }

        match result {
            Ok(songs) => {
                let count = songs.len();
                self.player.replace_playlist(songs);
                Ok(LoadOutcome::Loaded(count))
            }
            Err(err) => Err(self
                .handle_api_error(err, Forbidden::Expire, |err| {
                    tracing::warn!("playlist load failed: {err}");
                    ClientError::LoadFailed(format!("Failed to load songs: {err}"))
                })
                .unwrap_or(ClientError::SessionExpired)),
        }
    }

    /// Whether a ticket still belongs to the active session.
    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        self.session.is_some() && ticket.epoch == self.epoch
    }

    /// Log out after the backend rejected the token. Returns the error to show
    /// only for the first rejection of a session; later ones return `None`.
    pub fn expire_session(&mut self) -> Option<ClientError> {
        if self.session.is_none() {
            return None;
        }
        tracing::warn!("backend rejected the session token");
        self.logout();
        Some(ClientError::SessionExpired)
    }

    /// Translate an API failure from a session-scoped call. A 401 always ends
    /// the session; a 403 does too unless the call reports it as a permission
    /// answer. `None` means the session was already gone.
    pub fn handle_api_error(
        &mut self,
        err: ApiError,
        forbidden: Forbidden,
        describe: impl FnOnce(ApiError) -> ClientError,
    ) -> Option<ClientError> {
        let expires = match err.status() {
            Some(401) => true,
            Some(403) => forbidden == Forbidden::Expire,
            _ => false,
        };
        if expires {
            self.expire_session()
        } else {
            Some(describe(err))
        }
    }

    pub fn logout(&mut self) {
        if let Some(session) = self.session.take() {
            tracing::info!("logging out {}", session.username);
        }
        self.store.clear();
        self.epoch += 1;
        self.player.reset();
    }

    /// Apply a confirmed profile change to the stored user and the session.
    pub fn update_profile(&mut self, profile: &UserProfile) -> Result<Session, ClientError> {
        let session = self.session.as_mut().ok_or(ClientError::Unauthenticated)?;
        session.username = profile.username.clone();
        session.email = profile.email.clone();

        let credential = self
            .store
            .get()
            .unwrap_or_else(|| StoredCredential {
                token: session.token.clone(),
                user: None,
            })
            .with_profile(profile);
        if let Err(err) = self.store.set(&credential) {
            tracing::warn!("profile change not persisted: {err}");
        }
        Ok(session.clone())
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.session.as_ref().map(|session| session.token.as_str())
    }

    pub fn player(&self) -> &PlaybackController<M> {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut PlaybackController<M> {
        &mut self.player
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

pub fn login_error(err: ApiError) -> ClientError {
    match err.status() {
        Some(401) => ClientError::AuthFailed("Invalid username or password".to_string()),
        _ => ClientError::AuthFailed(format!("Login failed: {err}")),
    }
}

pub fn register_error(err: ApiError) -> ClientError {
    match err.status() {
        Some(409) => ClientError::AuthFailed(
            "An account with that username or email already exists".to_string(),
        ),
        Some(400) | Some(422) => ClientError::Validation(
            err.backend_message()
                .unwrap_or("Registration details were rejected")
                .to_string(),
        ),
        _ => ClientError::AuthFailed(format!("Registration failed: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::{mutation_error, Mutation};
    use crate::api::models::{AudioFile, Role, SongMetadata};
    use crate::api::transport::testing::FakeBackend;
    use crate::api::{AuthClient, CatalogueClient};
    use crate::config::ClientConfig;
    use crate::player::{HeadlessMedia, MediaEvent, TransportState};
    use crate::session::{make_token, MemorySessionStore};
    use serde_json::json;

    type TestController = AppController<MemorySessionStore, HeadlessMedia>;

    fn controller(store: &MemorySessionStore) -> TestController {
        AppController::new(store.clone(), HeadlessMedia::new())
    }

    fn song(id: &str) -> Song {
        Song {
            id: id.to_string(),
            title: format!("Song {id}"),
            artist: "Artist".to_string(),
            album: None,
            duration_seconds: 180,
            file_url: format!("https://cdn/{id}.mp3"),
        }
    }

    fn logged_in(store: &MemorySessionStore) -> TestController {
        store
            .set(&StoredCredential {
                token: make_token(json!({"username": "ann", "role": "USER"})),
                user: None,
            })
            .unwrap();
        let mut app = controller(store);
        app.start().unwrap();
        app
    }

    #[test]
    fn start_without_credential_is_unauthenticated() {
        let store = MemorySessionStore::new();
        let mut app = controller(&store);
        assert_eq!(app.start().unwrap_err(), ClientError::Unauthenticated);
        assert!(app.begin_playlist_load().is_none());
    }

    #[test]
    fn malformed_stored_token_is_cleared() {
        let store = MemorySessionStore::with_credential(StoredCredential {
            token: "not-a-jwt".into(),
            user: Some("{}".into()),
        });
        let mut app = controller(&store);
        let err = app.start().unwrap_err();
        assert!(matches!(err, ClientError::InvalidCredential(_)));
        assert!(err.requires_login());
        assert!(store.get().is_none());
    }

    #[test]
    fn start_is_idempotent_once_active() {
        let store = MemorySessionStore::new();
        let mut app = logged_in(&store);
        store.clear();
        assert_eq!(app.start().unwrap().username, "ann");
    }

    #[tokio::test]
    async fn login_token_is_stored_and_used_as_bearer() {
        let backend = FakeBackend::new()
            .with_user("admin", "admin123", "ADMIN", "abc")
            .with_song("Heroes", "Bowie", 371);
        let config = ClientConfig::new("http://backend.test");
        let auth = AuthClient::new(config.clone(), backend.clone());
        let catalogue = CatalogueClient::new(config, backend.clone());
        let store = MemorySessionStore::new();
        let mut app = controller(&store);

        let response = auth.login("admin", "admin123").await.unwrap();
        let session = app.complete_login(response).unwrap();
        assert_eq!(session.username, "admin");
        assert_eq!(session.role, Role::Admin);
        assert_eq!(store.get().unwrap().token, "abc");

        let ticket = app.begin_playlist_load().unwrap();
        let result = catalogue.list_songs(&ticket.token).await;
        assert_eq!(
            app.finish_playlist_load(ticket, result).unwrap(),
            LoadOutcome::Loaded(1)
        );
        assert_eq!(
            backend.last_request().unwrap().authorization().as_deref(),
            Some("Bearer abc")
        );
        assert_eq!(app.player().state(), TransportState::Paused);
    }

    #[test]
    fn reload_fills_claims_missing_from_the_token() {
        let store = MemorySessionStore::new();
        let mut app = controller(&store);
        app.complete_login(LoginResponse {
            token: make_token(json!({"sub": "bo"})),
            username: "bo".into(),
            email: "bo@example.com".into(),
            role: Role::Listener,
            id: None,
        })
        .unwrap();

        let mut reloaded = controller(&store);
        let session = reloaded.start().unwrap();
        assert_eq!(session.username, "bo");
        assert_eq!(session.email, "bo@example.com");
    }

    #[test]
    fn opaque_token_login_survives_a_reload() {
        let store = MemorySessionStore::new();
        let mut app = controller(&store);
        app.complete_login(LoginResponse {
            token: "abc".into(),
            username: "admin".into(),
            email: "admin@example.com".into(),
            role: Role::Admin,
            id: Some(json!(1)),
        })
        .unwrap();

        let mut reloaded = controller(&store);
        let session = reloaded.start().unwrap();
        assert_eq!(session.token, "abc");
        assert_eq!(session.username, "admin");
        assert!(session.is_admin());
        assert_eq!(store.get().unwrap().token, "abc");
        assert_eq!(reloaded.begin_playlist_load().unwrap().token, "abc");
    }

    #[test]
    fn login_without_a_usable_identity_is_not_stored() {
        let store = MemorySessionStore::new();
        let mut app = controller(&store);
        let err = app
            .complete_login(LoginResponse {
                token: "abc".into(),
                username: String::new(),
                email: String::new(),
                role: Role::Listener,
                id: None,
            })
            .unwrap_err();
        assert!(matches!(err, ClientError::AuthFailed(_)));
        assert!(store.get().is_none());
        assert!(app.session().is_none());
    }

    #[test]
    fn forbidden_playlist_expires_session_exactly_once() {
        let store = MemorySessionStore::new();
        let mut app = logged_in(&store);
        let first = app.begin_playlist_load().unwrap();
        let second = app.begin_playlist_load().unwrap();

        let err = app
            .finish_playlist_load(first, Err(ApiError::from_status(403, "")))
            .unwrap_err();
        assert_eq!(err, ClientError::SessionExpired);
        assert!(app.session().is_none());
        assert!(store.get().is_none());

        let late = app.finish_playlist_load(second, Err(ApiError::from_status(401, "")));
        assert_eq!(late, Ok(LoadOutcome::Discarded));
        assert_eq!(app.expire_session(), None);
    }

    #[test]
    fn response_arriving_after_logout_is_discarded() {
        let store = MemorySessionStore::new();
        let mut app = logged_in(&store);
        let ticket = app.begin_playlist_load().unwrap();

        app.logout();
        let outcome = app
            .finish_playlist_load(ticket, Ok(vec![song("1"), song("2")]))
            .unwrap();
        assert_eq!(outcome, LoadOutcome::Discarded);
        assert!(app.player().playlist().is_empty());
        assert_eq!(app.player().state(), TransportState::Idle);
    }

    #[test]
    fn ticket_from_before_a_relogin_is_stale() {
        let store = MemorySessionStore::new();
        let mut app = logged_in(&store);
        let ticket = app.begin_playlist_load().unwrap();
        app.logout();
        app.complete_login(LoginResponse {
            token: "fresh".into(),
            username: "ann".into(),
            email: String::new(),
            role: Role::Listener,
            id: None,
        })
        .unwrap();
        assert!(!app.is_current(&ticket));
    }

    #[test]
    fn installed_playlist_is_not_fetched_again() {
        let store = MemorySessionStore::new();
        let mut app = logged_in(&store);
        let ticket = app.initial_playlist_load().unwrap();
        app.finish_playlist_load(ticket, Ok(vec![song("1"), song("2"), song("3")]))
            .unwrap();

        let player = app.player_mut();
        player.select(2);
        player
            .handle_media_event(MediaEvent::Loaded { duration: Some(180.0) })
            .unwrap();
        assert!(player.is_playing());

        assert!(app.initial_playlist_load().is_none());
        assert_eq!(app.player().state(), TransportState::Playing);
        assert_eq!(app.player().current_index(), Some(2));
        assert!(app.player().media().is_playing());

        // An explicit refresh still goes out.
        assert!(app.begin_playlist_load().is_some());
    }

    #[test]
    fn failed_first_load_is_fetched_again_on_the_next_visit() {
        let store = MemorySessionStore::new();
        let mut app = logged_in(&store);
        let ticket = app.initial_playlist_load().unwrap();
        app.finish_playlist_load(ticket, Err(ApiError::from_status(500, "")))
            .unwrap_err();
        assert!(app.initial_playlist_load().is_some());

        app.logout();
        assert!(app.initial_playlist_load().is_none());
    }

    #[test]
    fn other_failures_keep_the_session_for_a_retry() {
        let store = MemorySessionStore::new();
        let mut app = logged_in(&store);
        let ticket = app.begin_playlist_load().unwrap();
        let err = app
            .finish_playlist_load(ticket, Err(ApiError::Transport("connection refused".into())))
            .unwrap_err();
        assert!(matches!(err, ClientError::LoadFailed(_)));
        assert!(app.session().is_some());

        let retry = app.begin_playlist_load().unwrap();
        assert_eq!(
            app.finish_playlist_load(retry, Ok(vec![song("1")])),
            Ok(LoadOutcome::Loaded(1))
        );
    }

    #[test]
    fn logout_stops_playback_and_clears_everything() {
        let store = MemorySessionStore::new();
        let mut app = logged_in(&store);
        let ticket = app.begin_playlist_load().unwrap();
        app.finish_playlist_load(ticket, Ok(vec![song("1"), song("2")]))
            .unwrap();
        app.player_mut().play().unwrap();

        app.logout();
        assert!(store.get().is_none());
        assert!(app.session().is_none());
        assert_eq!(app.player().state(), TransportState::Idle);
        assert!(!app.player().media().is_playing());
        assert_eq!(app.player().media().src(), None);
    }

    #[test]
    fn last_track_ending_loops_to_the_first() {
        let store = MemorySessionStore::new();
        let mut app = logged_in(&store);
        let ticket = app.begin_playlist_load().unwrap();
        app.finish_playlist_load(ticket, Ok(vec![song("1"), song("2"), song("3")]))
            .unwrap();

        let player = app.player_mut();
        player.select(2);
        player
            .handle_media_event(MediaEvent::Loaded { duration: Some(180.0) })
            .unwrap();
        player.handle_media_event(MediaEvent::Ended).unwrap();
        assert_eq!(player.current_index(), Some(0));
        player
            .handle_media_event(MediaEvent::Loaded { duration: Some(180.0) })
            .unwrap();
        assert!(player.media().is_playing());
        assert_eq!(player.media().src(), Some("https://cdn/1.mp3"));
    }

    #[test]
    fn profile_update_rewrites_session_and_store() {
        let store = MemorySessionStore::new();
        let mut app = controller(&store);
        app.complete_login(LoginResponse {
            token: "opaque".into(),
            username: "ann".into(),
            email: "ann@x.io".into(),
            role: Role::Admin,
            id: Some(json!(7)),
        })
        .unwrap();

        let session = app
            .update_profile(&UserProfile {
                username: "anne".into(),
                email: "anne@x.io".into(),
            })
            .unwrap();
        assert_eq!(session.username, "anne");
        assert!(session.is_admin());

        let stored = store.get().unwrap();
        assert_eq!(stored.token, "opaque");
        let profile = stored.profile().unwrap();
        assert_eq!(profile.username, "anne");
        assert_eq!(profile.email, "anne@x.io");
    }

    #[test]
    fn api_errors_are_translated_for_the_ui() {
        assert_eq!(
            login_error(ApiError::from_status(401, "")),
            ClientError::AuthFailed("Invalid username or password".into())
        );
        assert!(matches!(
            register_error(ApiError::from_status(409, "")),
            ClientError::AuthFailed(msg) if msg.contains("already exists")
        ));
        assert_eq!(
            register_error(ApiError::from_status(400, r#"{"message":"Email is invalid"}"#)),
            ClientError::Validation("Email is invalid".into())
        );

        let store = MemorySessionStore::new();
        let mut app = logged_in(&store);
        let shown = app.handle_api_error(ApiError::from_status(500, ""), Forbidden::Expire, |err| {
            ClientError::MutationFailed(err.to_string())
        });
        assert!(matches!(shown, Some(ClientError::MutationFailed(_))));
        let shown = app.handle_api_error(ApiError::from_status(401, ""), Forbidden::Report, |_| {
            unreachable!("a 401 always ends the session")
        });
        assert_eq!(shown, Some(ClientError::SessionExpired));
        assert!(app.session().is_none());
        assert_eq!(
            app.handle_api_error(ApiError::from_status(401, ""), Forbidden::Expire, |err| {
                ClientError::MutationFailed(err.to_string())
            }),
            None
        );
    }

    #[tokio::test]
    async fn listener_upload_is_refused_without_ending_the_session() {
        let backend = FakeBackend::new().with_user("ann", "secret1", "USER", "listener-token");
        let catalogue = CatalogueClient::new(ClientConfig::new("http://backend.test"), backend);
        let store = MemorySessionStore::new();
        let mut app = controller(&store);
        app.complete_login(LoginResponse {
            token: "listener-token".into(),
            username: "ann".into(),
            email: "ann@example.com".into(),
            role: Role::Listener,
            id: None,
        })
        .unwrap();

        let metadata = SongMetadata {
            title: "Heroes".into(),
            artist: "Bowie".into(),
            album: String::new(),
            duration_seconds: 371,
        };
        let file = AudioFile {
            name: "heroes.mp3".into(),
            mime: "audio/mpeg".into(),
            bytes: vec![1, 2, 3],
        };
        let err = catalogue
            .upload_song("listener-token", &metadata, file)
            .await
            .unwrap_err();
        let shown = app.handle_api_error(err, Mutation::Upload.forbidden(), |err| {
            mutation_error(Mutation::Upload, err)
        });
        assert_eq!(
            shown,
            Some(ClientError::MutationFailed(
                "Access denied! Only ADMIN can upload songs.".into()
            ))
        );
        assert!(app.session().is_some());

        let err = catalogue.delete_song("listener-token", "1").await.unwrap_err();
        let shown = app.handle_api_error(err, Mutation::Delete.forbidden(), |err| {
            mutation_error(Mutation::Delete, err)
        });
        assert_eq!(shown, Some(ClientError::SessionExpired));
        assert!(store.get().is_none());
    }

    #[test]
    fn forbidden_is_reported_or_expires_per_call() {
        let store = MemorySessionStore::new();
        let mut app = logged_in(&store);
        let shown = app.handle_api_error(ApiError::from_status(403, ""), Forbidden::Report, |_| {
            ClientError::MutationFailed("Access denied! Only ADMIN can upload songs.".into())
        });
        assert_eq!(
            shown,
            Some(ClientError::MutationFailed(
                "Access denied! Only ADMIN can upload songs.".into()
            ))
        );
        assert!(app.session().is_some());

        let shown = app.handle_api_error(ApiError::from_status(403, ""), Forbidden::Expire, |err| {
            ClientError::MutationFailed(err.to_string())
        });
        assert_eq!(shown, Some(ClientError::SessionExpired));
        assert!(store.get().is_none());
    }
}

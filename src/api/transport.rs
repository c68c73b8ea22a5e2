//! The HTTP seam. Clients build [`ApiRequest`] values and hand them to an
//! [`HttpTransport`]; the reqwest implementation talks to the real backend and
//! tests plug in an in-memory one.

use std::future::Future;

use once_cell::sync::Lazy;

use crate::api::models::AudioFile;
use crate::api::ApiError;

static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(reqwest::Client::new);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(serde_json::Value),
    Multipart {
        fields: Vec<(String, String)>,
        file: AudioFile,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub bearer: Option<String>,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            bearer: None,
            body: RequestBody::Empty,
        }
    }

    pub fn bearer(mut self, token: &str) -> Self {
        self.bearer = Some(token.to_string());
        self
    }

    pub fn json<T: serde::Serialize>(mut self, body: &T) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body).map_err(|e| ApiError::Decode(e.to_string()))?;
        self.body = RequestBody::Json(value);
        Ok(self)
    }

    pub fn multipart(mut self, fields: Vec<(String, String)>, file: AudioFile) -> Self {
        self.body = RequestBody::Multipart { fields, file };
        self
    }

    /// The `Authorization` header value this request carries.
    pub fn authorization(&self) -> Option<String> {
        self.bearer.as_ref().map(|token| format!("Bearer {token}"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn a non-2xx response into an [`ApiError::Status`].
    pub fn ensure_success(self) -> Result<Self, ApiError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ApiError::from_status(self.status, &self.body))
        }
    }
}

pub trait HttpTransport {
    /// Send one request. Non-2xx statuses are returned as responses, not errors;
    /// only failures to reach the server or read the body are `Err`.
    fn send(&self, request: ApiRequest) -> impl Future<Output = Result<ApiResponse, ApiError>>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReqwestTransport;

impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = HTTP_CLIENT.request(method, &request.url);
        if let Some(token) = request.bearer.as_deref() {
            builder = builder.bearer_auth(token);
        }

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart { fields, file } => {
                let mut form = reqwest::multipart::Form::new();
                for (name, value) in fields {
                    form = form.text(name, value);
                }
                let part = reqwest::multipart::Part::bytes(file.bytes)
                    .file_name(file.name)
                    .mime_str(&file.mime)
                    .map_err(|e| ApiError::Transport(e.to_string()))?;
                builder.multipart(form.part("file", part))
            }
        };

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! A small in-memory stand-in for the backend: it stores songs, checks bearer
    //! tokens and records every request it sees.

    use super::*;
    use std::cell::RefCell;
    use std::collections::{HashMap, VecDeque};
    use std::rc::Rc;

    #[derive(Default)]
    struct BackendState {
        songs: Vec<serde_json::Value>,
        next_id: u64,
        /// token -> role
        tokens: HashMap<String, String>,
        /// username -> (password, email, role)
        users: HashMap<String, (String, String, String)>,
        requests: Vec<ApiRequest>,
        forced: VecDeque<(String, u16)>,
    }

    #[derive(Clone, Default)]
    pub struct FakeBackend {
        state: Rc<RefCell<BackendState>>,
    }

    impl FakeBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_user(self, username: &str, password: &str, role: &str, token: &str) -> Self {
            {
                let mut state = self.state.borrow_mut();
                state.users.insert(
                    username.to_string(),
                    (
                        password.to_string(),
                        format!("{username}@example.com"),
                        role.to_string(),
                    ),
                );
                state.tokens.insert(token.to_string(), role.to_string());
            }
            self
        }

        pub fn with_song(self, title: &str, artist: &str, duration: u32) -> Self {
            {
                let mut state = self.state.borrow_mut();
                state.next_id += 1;
                let id = state.next_id;
                state.songs.push(serde_json::json!({
                    "id": id,
                    "title": title,
                    "artist": artist,
                    "album": null,
                    "durationSeconds": duration,
                    "fileUrl": format!("https://cdn.example.com/{id}.mp3"),
                }));
            }
            self
        }

        /// Answer the next request whose path contains `path_fragment` with `status`.
        pub fn fail_next(&self, path_fragment: &str, status: u16) {
            self.state
                .borrow_mut()
                .forced
                .push_back((path_fragment.to_string(), status));
        }

        pub fn revoke(&self, token: &str) {
            self.state.borrow_mut().tokens.remove(token);
        }

        pub fn requests(&self) -> Vec<ApiRequest> {
            self.state.borrow().requests.clone()
        }

        pub fn last_request(&self) -> Option<ApiRequest> {
            self.state.borrow().requests.last().cloned()
        }

        fn respond(&self, request: &ApiRequest) -> ApiResponse {
            let mut state = self.state.borrow_mut();
            state.requests.push(request.clone());

            let path = request
                .url
                .split_once("/api/")
                .map(|(_, rest)| format!("/api/{rest}"))
                .unwrap_or_else(|| request.url.clone());

            if let Some(pos) = state
                .forced
                .iter()
                .position(|(fragment, _)| path.contains(fragment.as_str()))
            {
                let (_, status) = state.forced.remove(pos).unwrap_or_default();
                return reply(status, serde_json::json!({ "message": "forced failure" }));
            }

            let role = request
                .bearer
                .as_ref()
                .and_then(|token| state.tokens.get(token).cloned());

            match (request.method, path.as_str()) {
                (Method::Post, "/api/auth/login") => {
                    let RequestBody::Json(body) = &request.body else {
                        return reply(400, serde_json::json!({}));
                    };
                    let username = body["username"].as_str().unwrap_or_default();
                    let password = body["password"].as_str().unwrap_or_default();
                    match state.users.get(username) {
                        Some((pw, email, role)) if pw == password => {
                            let token = state
                                .tokens
                                .iter()
                                .find(|(_, r)| *r == role)
                                .map(|(t, _)| t.clone())
                                .unwrap_or_default();
                            reply(
                                200,
                                serde_json::json!({
                                    "token": token,
                                    "username": username,
                                    "email": email,
                                    "role": role,
                                    "id": 1,
                                }),
                            )
                        }
                        _ => reply(401, serde_json::json!({ "message": "Bad credentials" })),
                    }
                }
                (Method::Post, "/api/auth/register") => {
                    let RequestBody::Json(body) = &request.body else {
                        return reply(400, serde_json::json!({}));
                    };
                    let username = body["username"].as_str().unwrap_or_default().to_string();
                    if state.users.contains_key(&username) {
                        return reply(409, serde_json::json!({ "message": "User exists" }));
                    }
                    let password = body["password"].as_str().unwrap_or_default().to_string();
                    let email = body["email"].as_str().unwrap_or_default().to_string();
                    state
                        .users
                        .insert(username, (password, email, "USER".to_string()));
                    reply(201, serde_json::Value::Null)
                }
                (_, p) if role.is_none() && (p.starts_with("/api/songs") || p.starts_with("/api/admin") || p.starts_with("/api/auth/")) => {
                    reply(401, serde_json::json!({ "message": "Unauthorized" }))
                }
                (Method::Put, "/api/auth/profile") => {
                    let RequestBody::Json(body) = &request.body else {
                        return reply(400, serde_json::json!({}));
                    };
                    reply(200, body.clone())
                }
                (Method::Put, "/api/auth/change-password") => reply(200, serde_json::Value::Null),
                (Method::Get, "/api/songs") => reply(200, serde_json::Value::Array(state.songs.clone())),
                (_, p) if p.starts_with("/api/admin") && role.as_deref() != Some("ADMIN") => {
                    reply(403, serde_json::json!({ "message": "Forbidden" }))
                }
                (Method::Get, "/api/admin/songs") => {
                    reply(200, serde_json::Value::Array(state.songs.clone()))
                }
                (Method::Post, "/api/admin/upload") => {
                    let RequestBody::Multipart { fields, file } = &request.body else {
                        return reply(400, serde_json::json!({}));
                    };
                    let field = |name: &str| {
                        fields
                            .iter()
                            .find(|(k, _)| k == name)
                            .map(|(_, v)| v.clone())
                            .unwrap_or_default()
                    };
                    state.next_id += 1;
                    let id = state.next_id;
                    let song = serde_json::json!({
                        "id": id,
                        "title": field("title"),
                        "artist": field("artist"),
                        "album": field("album"),
                        "durationSeconds": field("durationSeconds").parse::<u32>().unwrap_or(0),
                        "fileUrl": format!("https://cdn.example.com/{}", file.name),
                    });
                    state.songs.push(song.clone());
                    reply(201, song)
                }
                (Method::Put, p) if p.starts_with("/api/admin/songs/") => {
                    let id = p.trim_start_matches("/api/admin/songs/").to_string();
                    let RequestBody::Json(body) = &request.body else {
                        return reply(400, serde_json::json!({}));
                    };
                    let Some(song) = state
                        .songs
                        .iter_mut()
                        .find(|song| song["id"].to_string().trim_matches('"') == id)
                    else {
                        return reply(404, serde_json::json!({ "message": "Song not found" }));
                    };
                    for key in ["title", "artist", "album", "durationSeconds"] {
                        song[key] = body[key].clone();
                    }
                    reply(200, song.clone())
                }
                (Method::Delete, p) if p.starts_with("/api/admin/songs/") => {
                    let id = p.trim_start_matches("/api/admin/songs/").to_string();
                    let before = state.songs.len();
                    state
                        .songs
                        .retain(|song| song["id"].to_string().trim_matches('"') != id);
                    if state.songs.len() == before {
                        reply(404, serde_json::json!({ "message": "Song not found" }))
                    } else {
                        reply(204, serde_json::Value::Null)
                    }
                }
                _ => reply(404, serde_json::json!({ "message": "Not found" })),
            }
        }
    }

    fn reply(status: u16, body: serde_json::Value) -> ApiResponse {
        let body = if body.is_null() {
            String::new()
        } else {
            body.to_string()
        };
        ApiResponse { status, body }
    }

    impl HttpTransport for FakeBackend {
        async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
            Ok(self.respond(&request))
        }
    }

    /// A transport that cannot reach anything.
    #[derive(Clone, Copy, Default)]
    pub struct OfflineTransport;

    impl HttpTransport for OfflineTransport {
        async fn send(&self, _request: ApiRequest) -> Result<ApiResponse, ApiError> {
            Err(ApiError::Transport("connection refused".to_string()))
        }
    }
}

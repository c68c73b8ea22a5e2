//! Session values, bearer-token decoding and the credential store seam.

use std::cell::RefCell;
use std::rc::Rc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Deserialize;
use thiserror::Error;

use crate::api::models::{LoginResponse, Role, UserProfile};

/// Storage keys, shared by every persistent store.
pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub username: String,
    pub email: String,
    pub role: Role,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Upper-cased first letter of the username, for the avatar bubble.
    pub fn initial(&self) -> String {
        self.username
            .chars()
            .next()
            .map(|c| c.to_uppercase().to_string())
            .unwrap_or_else(|| "U".to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TokenError {
    #[error("token is not a three-part JWT")]
    Shape,
    #[error("token payload is not valid base64: {0}")]
    Encoding(String),
    #[error("token payload is not valid JSON: {0}")]
    Payload(String),
    #[error("token carries no username")]
    MissingUsername,
}

#[derive(Debug, Default, Deserialize)]
struct Claims {
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    role: Option<serde_json::Value>,
    #[serde(default)]
    roles: Option<serde_json::Value>,
}

impl Claims {
    fn role(&self) -> Role {
        let pick = |value: &serde_json::Value| match value {
            serde_json::Value::String(role) => Role::parse(role),
            serde_json::Value::Array(items) => items
                .iter()
                .filter_map(|item| item.as_str())
                .map(Role::parse)
                .find(|role| *role == Role::Admin)
                .unwrap_or_default(),
            _ => Role::Listener,
        };
        self.role
            .as_ref()
            .or(self.roles.as_ref())
            .map(pick)
            .unwrap_or_default()
    }
}

/// Read the profile claims out of a bearer token. No signature check: the
/// backend verifies the token on every call.
pub fn decode_token(token: &str) -> Result<Session, TokenError> {
    let mut parts = token.trim().split('.');
    let (Some(_header), Some(payload), Some(_signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(TokenError::Shape);
    };

    // Accept standard-alphabet and padded payloads too.
    let normalized: String = payload
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();
    let bytes = URL_SAFE_NO_PAD
        .decode(normalized.as_bytes())
        .map_err(|e| TokenError::Encoding(e.to_string()))?;
    let claims: Claims =
        serde_json::from_slice(&bytes).map_err(|e| TokenError::Payload(e.to_string()))?;

    let role = claims.role();
    let username = claims
        .username
        .or(claims.sub)
        .filter(|name| !name.trim().is_empty())
        .ok_or(TokenError::MissingUsername)?;

    Ok(Session {
        token: token.trim().to_string(),
        username,
        email: claims.email.unwrap_or_default(),
        role,
    })
}

/// The identity fields of the stored login response.
#[derive(Debug, Default, Deserialize)]
struct RecordedUser {
    #[serde(default)]
    username: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    role: Role,
}

/// What survives a page reload: the token and the login response JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredCredential {
    pub token: String,
    pub user: Option<String>,
}

impl StoredCredential {
    pub fn from_login(response: &LoginResponse) -> Self {
        Self {
            token: response.token.clone(),
            user: serde_json::to_string(response).ok(),
        }
    }

    /// The profile recorded at login, if the stored JSON is readable.
    pub fn profile(&self) -> Option<UserProfile> {
        self.user
            .as_deref()
            .and_then(|json| serde_json::from_str(json).ok())
    }

    /// Build the session, filling gaps in the token claims from the stored profile.
    /// A token without readable claims falls back to the user recorded at login.
    pub fn session(&self) -> Result<Session, TokenError> {
        match decode_token(&self.token) {
            Ok(mut session) => {
                if let Some(profile) = self.profile() {
                    if session.email.is_empty() {
                        session.email = profile.email;
                    }
                }
                Ok(session)
            }
            Err(err) => self.recorded_session().ok_or(err),
        }
    }

    fn recorded_session(&self) -> Option<Session> {
        let token = self.token.trim();
        if token.is_empty() {
            return None;
        }
        let user: RecordedUser = serde_json::from_str(self.user.as_deref()?).ok()?;
        let username = user.username.trim();
        if username.is_empty() {
            return None;
        }
        Some(Session {
            token: token.to_string(),
            username: username.to_string(),
            email: user.email,
            role: user.role,
        })
    }

    /// Merge new profile fields into the stored user JSON.
    pub fn with_profile(&self, profile: &UserProfile) -> Self {
        let mut user = self
            .user
            .as_deref()
            .and_then(|json| serde_json::from_str::<serde_json::Value>(json).ok())
            .filter(|value| value.is_object())
            .unwrap_or_else(|| serde_json::json!({}));
        user["username"] = serde_json::Value::String(profile.username.clone());
        user["email"] = serde_json::Value::String(profile.email.clone());
        Self {
            token: self.token.clone(),
            user: Some(user.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("credential store error: {0}")]
pub struct StoreError(pub String);

impl StoreError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Persists the credential across reloads. `set` and `clear` always touch both
/// entries together.
pub trait SessionStore {
    fn get(&self) -> Option<StoredCredential>;
    fn set(&self, credential: &StoredCredential) -> Result<(), StoreError>;
    fn clear(&self);
}

/// In-memory store. Clones share the same slot, so a test can keep a handle
/// after giving one to a controller.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    slot: Rc<RefCell<Option<StoredCredential>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(credential: StoredCredential) -> Self {
        let store = Self::default();
        *store.slot.borrow_mut() = Some(credential);
        store
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self) -> Option<StoredCredential> {
        self.slot.borrow().clone()
    }

    fn set(&self, credential: &StoredCredential) -> Result<(), StoreError> {
        *self.slot.borrow_mut() = Some(credential.clone());
        Ok(())
    }

    fn clear(&self) {
        *self.slot.borrow_mut() = None;
    }
}

#[cfg(test)]
pub(crate) fn make_token(claims: serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string().as_bytes());
    format!("{header}.{payload}.signature")
}

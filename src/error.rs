use thiserror::Error;

/// What the UI shows when something goes wrong. Every network or media failure
/// is translated into one of these at the call site.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClientError {
    /// No stored credential. The caller redirects to login without a message.
    #[error("not logged in")]
    Unauthenticated,
    /// A stored credential exists but cannot be decoded.
    #[error("your saved login is invalid, please log in again ({0})")]
    InvalidCredential(String),
    #[error("your session has expired, please log in again")]
    SessionExpired,
    #[error("{0}")]
    LoadFailed(String),
    #[error("{0}")]
    MutationFailed(String),
    #[error("{0}")]
    PlaybackFailed(String),
    #[error("{0}")]
    AuthFailed(String),
    #[error("{0}")]
    Validation(String),
}

impl ClientError {
    /// Failures that end the session and send the user back to login.
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            ClientError::Unauthenticated
                | ClientError::InvalidCredential(_)
                | ClientError::SessionExpired
        )
    }
}

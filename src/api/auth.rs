use crate::api::models::{
    LoginRequest, LoginResponse, PasswordChange, RegisterRequest, UserProfile,
};
use crate::api::transport::{ApiRequest, HttpTransport, Method};
use crate::api::ApiError;
use crate::config::ClientConfig;

/// Calls against the authentication service.
#[derive(Debug, Clone)]
pub struct AuthClient<T> {
    config: ClientConfig,
    transport: T,
}

impl<T: HttpTransport> AuthClient<T> {
    pub fn new(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let request =
            ApiRequest::new(Method::Post, self.config.endpoint("/api/auth/login")).json(&body)?;
        let response = self.transport.send(request).await?.ensure_success()?;

        let login: LoginResponse = serde_json::from_str(&response.body)
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        if login.token.trim().is_empty() {
            return Err(ApiError::Decode("login response carried no token".to_string()));
        }
        tracing::info!("logged in as {}", login.username);
        Ok(login)
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<(), ApiError> {
        let request = ApiRequest::new(Method::Post, self.config.endpoint("/api/auth/register"))
            .json(request)?;
        self.transport.send(request).await?.ensure_success()?;
        Ok(())
    }

    pub async fn update_profile(
        &self,
        token: &str,
        profile: &UserProfile,
    ) -> Result<UserProfile, ApiError> {
        let request = ApiRequest::new(Method::Put, self.config.endpoint("/api/auth/profile"))
            .bearer(token)
            .json(profile)?;
        let response = self.transport.send(request).await?.ensure_success()?;

        // Some backends answer 204; keep what was sent in that case.
        if response.body.trim().is_empty() {
            return Ok(profile.clone());
        }
        serde_json::from_str(&response.body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    pub async fn change_password(&self, token: &str, change: &PasswordChange) -> Result<(), ApiError> {
        let request =
            ApiRequest::new(Method::Put, self.config.endpoint("/api/auth/change-password"))
                .bearer(token)
                .json(change)?;
        self.transport.send(request).await?.ensure_success()?;
        Ok(())
    }
}

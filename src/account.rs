//! Client-side checks for the registration, profile and password forms.

use crate::api::models::{PasswordChange, RegisterRequest, UserProfile};
use crate::api::ApiError;
use crate::error::ClientError;

pub const MIN_PASSWORD_LEN: usize = 6;

fn invalid(message: &str) -> ClientError {
    ClientError::Validation(message.to_string())
}

fn looks_like_email(email: &str) -> bool {
    let email = email.trim();
    !email.is_empty() && email.contains('@')
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<RegisterRequest, ClientError> {
        let username = self.username.trim();
        if username.is_empty() || self.email.trim().is_empty() || self.password.is_empty() {
            return Err(invalid("Please fill in all fields"));
        }
        if !looks_like_email(&self.email) {
            return Err(invalid("Please enter a valid email address"));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(invalid("Password must be at least 6 characters long"));
        }
        Ok(RegisterRequest {
            username: username.to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileForm {
    pub username: String,
    pub email: String,
}

impl ProfileForm {
    pub fn from_profile(username: &str, email: &str) -> Self {
        Self {
            username: username.to_string(),
            email: email.to_string(),
        }
    }

    pub fn validate(&self) -> Result<UserProfile, ClientError> {
        let username = self.username.trim();
        if username.is_empty() {
            return Err(invalid("Username cannot be empty"));
        }
        if !looks_like_email(&self.email) {
            return Err(invalid("Please enter a valid email address"));
        }
        Ok(UserProfile {
            username: username.to_string(),
            email: self.email.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PasswordForm {
    pub current: String,
    pub new: String,
    pub confirm: String,
}

impl PasswordForm {
    /// `None` until something is typed in the confirmation box.
    pub fn confirmation_matches(&self) -> Option<bool> {
        if self.confirm.is_empty() {
            None
        } else {
            Some(self.new == self.confirm)
        }
    }

    pub fn validate(&self) -> Result<PasswordChange, ClientError> {
        if self.current.is_empty() {
            return Err(invalid("Please enter your current password"));
        }
        if self.new.chars().count() < MIN_PASSWORD_LEN {
            return Err(invalid("New password must be at least 6 characters long"));
        }
        if self.new != self.confirm {
            return Err(invalid("New passwords do not match"));
        }
        if self.current == self.new {
            return Err(invalid("New password cannot be the same as current password"));
        }
        Ok(PasswordChange {
            current_password: self.current.clone(),
            new_password: self.new.clone(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordStrength {
    pub score: u8,
    pub label: &'static str,
}

impl PasswordStrength {
    pub fn percent(&self) -> u8 {
        self.score * 25
    }
}

/// One point each for length, mixed case, a digit and a symbol. `None` for
/// an empty password.
pub fn password_strength(password: &str) -> Option<PasswordStrength> {
    if password.is_empty() {
        return None;
    }
    let checks = [
        password.chars().count() >= MIN_PASSWORD_LEN,
        password.chars().any(|c| c.is_ascii_lowercase())
            && password.chars().any(|c| c.is_ascii_uppercase()),
        password.chars().any(|c| c.is_ascii_digit()),
        password.chars().any(|c| !c.is_ascii_alphanumeric()),
    ];
    let score = checks.iter().filter(|passed| **passed).count() as u8;
    let label = match score {
        0 => "Very Weak",
        1 => "Weak",
        2 => "Fair",
        3 => "Good",
        _ => "Strong",
    };
    Some(PasswordStrength { score, label })
}

pub fn profile_error(err: ApiError) -> ClientError {
    match err.status() {
        Some(409) => ClientError::MutationFailed("Username or email already exists".to_string()),
        _ => {
            tracing::warn!("profile update failed: {err}");
            ClientError::MutationFailed("Failed to update profile".to_string())
        }
    }
}

pub fn password_error(err: ApiError) -> ClientError {
    match err.status() {
        Some(400) => ClientError::MutationFailed("Current password is incorrect".to_string()),
        _ => {
            tracing::warn!("password change failed: {err}");
            ClientError::MutationFailed("Failed to change password".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(err: ClientError) -> String {
        err.to_string()
    }

    #[test]
    fn registration_checks_fields_before_calling_out() {
        let mut form = RegisterForm {
            username: "newbie".into(),
            email: "newbie@example.com".into(),
            password: "secret1".into(),
        };
        assert_eq!(form.validate().unwrap().username, "newbie");

        form.email = "newbie.example.com".into();
        assert_eq!(
            message(form.validate().unwrap_err()),
            "Please enter a valid email address"
        );
        form.email = "newbie@example.com".into();
        form.password = "12345".into();
        assert!(message(form.validate().unwrap_err()).contains("at least 6"));
        form.username = " ".into();
        assert_eq!(message(form.validate().unwrap_err()), "Please fill in all fields");
    }

    #[test]
    fn profile_needs_username_and_email() {
        let form = ProfileForm::from_profile("  ", "a@x.io");
        assert_eq!(message(form.validate().unwrap_err()), "Username cannot be empty");

        let form = ProfileForm::from_profile("ann", "ann");
        assert!(form.validate().is_err());

        let profile = ProfileForm::from_profile(" ann ", " ann@x.io ").validate().unwrap();
        assert_eq!(profile.username, "ann");
        assert_eq!(profile.email, "ann@x.io");
    }

    #[test]
    fn password_rules() {
        let mut form = PasswordForm {
            current: "oldpass".into(),
            new: "short".into(),
            confirm: "short".into(),
        };
        assert!(message(form.validate().unwrap_err()).contains("at least 6"));

        form.new = "newpass1".into();
        form.confirm = "newpass2".into();
        assert_eq!(form.confirmation_matches(), Some(false));
        assert_eq!(message(form.validate().unwrap_err()), "New passwords do not match");

        form.new = "oldpass".into();
        form.confirm = "oldpass".into();
        assert!(message(form.validate().unwrap_err()).contains("cannot be the same"));

        form.new = "newpass1".into();
        form.confirm = "newpass1".into();
        let change = form.validate().unwrap();
        assert_eq!(change.current_password, "oldpass");
        assert_eq!(change.new_password, "newpass1");
    }

    #[test]
    fn strength_scores() {
        assert_eq!(password_strength(""), None);
        let score = |pw: &str| password_strength(pw).unwrap();
        assert_eq!(score("abc").score, 0);
        assert_eq!(score("abc").label, "Very Weak");
        assert_eq!(score("abcdef").label, "Weak");
        assert_eq!(score("abcDEF").label, "Fair");
        assert_eq!(score("abcDEF1").label, "Good");
        assert_eq!(score("abcDEF1!").label, "Strong");
        assert_eq!(score("abcDEF1!").percent(), 100);
    }

    #[test]
    fn backend_rejections_have_friendly_messages() {
        assert_eq!(
            message(profile_error(ApiError::from_status(409, ""))),
            "Username or email already exists"
        );
        assert_eq!(
            message(password_error(ApiError::from_status(400, ""))),
            "Current password is incorrect"
        );
        assert_eq!(
            message(password_error(ApiError::Transport("offline".into()))),
            "Failed to change password"
        );
    }
}

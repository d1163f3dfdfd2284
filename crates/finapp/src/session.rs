//! Identity collaborator and the user info derived from it.

use async_trait::async_trait;
use serde::Serialize;

use crate::config::SessionConfig;

/// The signed-in user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub id: String,
    pub login_email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("no authenticated session")]
    NotAuthenticated,
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn current_identity(&self) -> Result<Identity, IdentityError>;
}

/// Identity taken from the configured session (`APP_SESSION_*`).
#[derive(Debug, Clone, Default)]
pub struct SessionIdentityProvider {
    identity: Option<Identity>,
}

impl SessionIdentityProvider {
    pub fn from_config(config: &SessionConfig) -> Self {
        let identity = match (&config.user_id, &config.email) {
            (Some(id), Some(email)) if !email.trim().is_empty() => Some(Identity {
                id: id.clone(),
                login_email: email.trim().to_string(),
            }),
            _ => None,
        };
        Self { identity }
    }

    pub fn signed_in(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
        }
    }

    pub fn signed_out() -> Self {
        Self { identity: None }
    }
}

#[async_trait]
impl IdentityProvider for SessionIdentityProvider {
    async fn current_identity(&self) -> Result<Identity, IdentityError> {
        self.identity.clone().ok_or(IdentityError::NotAuthenticated)
    }
}

pub const DEFAULT_ROLE: &str = "User";

/// What the dashboard and sidebar show about the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserInfo {
    pub id: String,
    pub email: String,
    pub role: String,
}

impl From<&Identity> for UserInfo {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id.clone(),
            email: identity.login_email.clone(),
            role: DEFAULT_ROLE.to_string(),
        }
    }
}

pub fn dashboard_title(user: Option<&UserInfo>) -> String {
    match user {
        Some(user) if !user.role.is_empty() => format!("{} Dashboard", user.role),
        _ => "Dashboard".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn session_requires_both_id_and_email() {
        let partial = SessionConfig {
            user_id: Some("u-1".to_string()),
            email: None,
        };
        let provider = SessionIdentityProvider::from_config(&partial);
        assert_eq!(
            provider.current_identity().await,
            Err(IdentityError::NotAuthenticated)
        );

        let full = SessionConfig {
            user_id: Some("u-1".to_string()),
            email: Some(" jane@x.com ".to_string()),
        };
        let identity = SessionIdentityProvider::from_config(&full)
            .current_identity()
            .await
            .expect("identity resolves");
        assert_eq!(identity.login_email, "jane@x.com");
    }

    #[test]
    fn dashboard_title_falls_back_without_user() {
        let user = UserInfo::from(&Identity {
            id: "u-1".to_string(),
            login_email: "jane@x.com".to_string(),
        });
        assert_eq!(dashboard_title(Some(&user)), "User Dashboard");
        assert_eq!(dashboard_title(None), "Dashboard");
    }
}

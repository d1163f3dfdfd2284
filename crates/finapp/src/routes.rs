use std::fmt;

use tracing::debug;

use crate::applications::ApplicationId;
use crate::session::{Identity, IdentityError, IdentityProvider};

/// Pages of the application.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Home,
    Applications,
    CreateApplication,
    Application { id: ApplicationId },
    Assets,
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Login => "/".to_string(),
            Route::Home => "/home".to_string(),
            Route::Applications => "/applications".to_string(),
            Route::CreateApplication => "/create-application".to_string(),
            Route::Application { id } => {
                // A single pair of strings always serializes.
                let query =
                    serde_urlencoded::to_string(&[("id", id.0.as_str())]).unwrap_or_default();
                format!("/application?{query}")
            }
            Route::Assets => "/assets".to_string(),
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let (path, query) = match raw.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (raw, None),
        };

        match path {
            "/" => Some(Route::Login),
            "/home" => Some(Route::Home),
            "/applications" => Some(Route::Applications),
            "/create-application" => Some(Route::CreateApplication),
            "/assets" => Some(Route::Assets),
            "/application" => serde_urlencoded::from_str::<Vec<(String, String)>>(query?)
                .ok()?
                .into_iter()
                .find_map(|(key, id)| (key == "id" && !id.is_empty()).then_some(id))
                .map(|id| Route::Application {
                    id: ApplicationId(id),
                }),
            _ => None,
        }
    }

    pub fn is_protected(&self) -> bool {
        !matches!(self, Route::Login)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Outcome of checking a route against the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Public,
    Granted(Identity),
    Redirect(Route),
}

/// Protected routes need a signed-in user; everyone else is sent to the login page.
pub async fn guard<I>(route: &Route, provider: &I) -> Access
where
    I: IdentityProvider + ?Sized,
{
    if !route.is_protected() {
        return Access::Public;
    }

    match provider.current_identity().await {
        Ok(identity) => Access::Granted(identity),
        Err(IdentityError::NotAuthenticated) => {
            debug!(route = %route, "user not logged in");
            Access::Redirect(Route::Login)
        }
        Err(err) => {
            debug!(route = %route, error = %err, "identity lookup failed");
            Access::Redirect(Route::Login)
        }
    }
}

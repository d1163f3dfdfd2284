use tracing::error;

use super::domain::{ApplicationId, ApplicationRecord, ApplicationSummary};
use super::repository::ApplicationStorage;
use crate::routes::Route;
use crate::session::{IdentityError, IdentityProvider};

pub const LIST_FAILED_MESSAGE: &str = "Failed to fetch data";
pub const DELETE_FAILED_MESSAGE: &str = "Failed to delete application";

/// State behind the `/applications` page.
#[derive(Debug, Clone, Default)]
pub struct ApplicationsPage {
    applications: Vec<ApplicationRecord>,
    error: Option<String>,
}

impl ApplicationsPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the signed-in user's applications. Returns a redirect when nobody is signed in.
    pub async fn load<I, S>(&mut self, identity: &I, storage: &S) -> Option<Route>
    where
        I: IdentityProvider + ?Sized,
        S: ApplicationStorage + ?Sized,
    {
        let email = match identity.current_identity().await {
            Ok(identity) => identity.login_email,
            Err(IdentityError::NotAuthenticated) => return Some(Route::Login),
            Err(err) => {
                error!(error = %err, "failed to resolve identity");
                self.error = Some(LIST_FAILED_MESSAGE.to_string());
                return None;
            }
        };

        match storage.list_applications(&email).await {
            Ok(applications) => {
                self.applications = applications;
                self.error = None;
            }
            Err(err) => {
                error!(error = %err, "failed to list applications");
                self.error = Some(LIST_FAILED_MESSAGE.to_string());
            }
        }
        None
    }

    pub fn applications(&self) -> &[ApplicationRecord] {
        &self.applications
    }

    pub fn summaries(&self) -> Vec<ApplicationSummary> {
        self.applications
            .iter()
            .map(ApplicationRecord::summary)
            .collect()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Delete remotely, then drop the card locally. The list is untouched on failure.
    pub async fn delete<S>(&mut self, id: &ApplicationId, storage: &S) -> bool
    where
        S: ApplicationStorage + ?Sized,
    {
        match storage.delete_application(id).await {
            Ok(()) => {
                self.applications.retain(|record| &record.id != id);
                self.error = None;
                true
            }
            Err(err) => {
                error!(application_id = %id, error = %err, "error deleting application");
                self.error = Some(DELETE_FAILED_MESSAGE.to_string());
                false
            }
        }
    }

    pub fn open(id: &ApplicationId) -> Route {
        Route::Application { id: id.clone() }
    }
}

use std::sync::Arc;

use tracing::{error, info, warn};

use super::domain::{ApplicationId, ApplicationPayload, Draft};
use super::draft::DraftPersistence;
use super::repository::ApplicationStorage;
use crate::routes::Route;
use crate::session::{IdentityError, IdentityProvider};
use crate::storage::KeyValueStore;

pub const SUBMIT_FAILED_MESSAGE: &str = "Failed to submit application";

/// Result of handing a draft to the storage backend.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Stored; the caller should move on to `redirect`.
    Submitted { id: ApplicationId, redirect: Route },
    /// The last step did not validate; nothing was sent.
    Invalid(Vec<String>),
    /// Sending failed; the draft is kept for a retry.
    Failed(String),
    /// No signed-in user; the caller should go to the login page.
    Unauthenticated { redirect: Route },
}

/// Normalize the draft and stamp it with the signed-in user's email.
pub fn prepare_payload(draft: &Draft, login_email: &str) -> ApplicationPayload {
    let mut payload = ApplicationPayload::from_draft(draft);
    payload.personal_details.email = login_email.to_string();
    payload
}

/// Sends finished drafts to the storage collaborator.
pub struct SubmissionAdapter<S: ?Sized, I: ?Sized> {
    storage: Arc<S>,
    identity: Arc<I>,
}

impl<S, I> SubmissionAdapter<S, I>
where
    S: ApplicationStorage + ?Sized,
    I: IdentityProvider + ?Sized,
{
    pub fn new(storage: Arc<S>, identity: Arc<I>) -> Self {
        Self { storage, identity }
    }

    /// Create the application. The persisted draft is cleared only once the backend accepted it.
    pub async fn submit<K>(&self, draft: &Draft, drafts: &DraftPersistence<K>) -> SubmitOutcome
    where
        K: KeyValueStore + ?Sized,
    {
        let identity = match self.identity.current_identity().await {
            Ok(identity) => identity,
            Err(IdentityError::NotAuthenticated) => {
                warn!("submission attempted without a session");
                return SubmitOutcome::Unauthenticated {
                    redirect: Route::Login,
                };
            }
            Err(err) => {
                error!(error = %err, "failed to resolve identity for submission");
                return SubmitOutcome::Failed(SUBMIT_FAILED_MESSAGE.to_string());
            }
        };

        let payload = prepare_payload(draft, &identity.login_email);
        match self.storage.create_application(payload).await {
            Ok(created) => {
                info!(application_id = %created.id, "application submitted");
                drafts.clear();
                SubmitOutcome::Submitted {
                    id: created.id,
                    redirect: Route::Applications,
                }
            }
            Err(err) => {
                error!(error = %err, "error submitting application");
                SubmitOutcome::Failed(SUBMIT_FAILED_MESSAGE.to_string())
            }
        }
    }
}

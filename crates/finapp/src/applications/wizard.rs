//! Five-step creation wizard.
//!
//! The controller owns the draft for the whole session. Forward moves are gated on the
//! current step's validator, backward moves are free, and jumps ahead are only allowed to
//! steps that already validate. Every accepted edit is mirrored to the draft store.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use super::domain::{Draft, FieldValue, ItemField, PersonalField, Section, Step};
use super::draft::DraftPersistence;
use super::repository::ApplicationStorage;
use super::store::{FormError, FormStateStore, FormUpdate};
use super::submission::{SubmissionAdapter, SubmitOutcome};
use super::validation::{is_step_complete, validate_step};
use crate::session::{Identity, IdentityProvider};
use crate::storage::KeyValueStore;

pub const SUBMIT_NOT_READY_MESSAGE: &str = "Complete every step before submitting";

/// The single result of the one-shot identity lookup at mount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityEvent {
    Resolved(Identity),
    Unavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Current,
    Completed,
    Pending,
}

/// Progress-bar entry for one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepView {
    pub step: u8,
    pub label: &'static str,
    pub status: StepStatus,
    pub reachable: bool,
}

pub struct WizardController<K: ?Sized> {
    form: FormStateStore,
    errors: Vec<String>,
    drafts: DraftPersistence<K>,
    identity: Option<IdentityEvent>,
}

impl<K> WizardController<K>
where
    K: KeyValueStore + ?Sized,
{
    /// Seed the wizard from a persisted draft, or start blank.
    pub fn mount(store: Arc<K>) -> Self {
        let drafts = DraftPersistence::new(store);
        let draft = match drafts.load() {
            Some(draft) => draft,
            None => {
                debug!("starting a new application draft");
                Draft::default()
            }
        };

        Self {
            form: FormStateStore::new(draft),
            errors: Vec::new(),
            drafts,
            identity: None,
        }
    }

    pub fn draft(&self) -> &Draft {
        self.form.draft()
    }

    pub fn current_step(&self) -> Step {
        self.form.wizard().current_step
    }

    /// Messages published by the last rejected transition.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn identity(&self) -> Option<&IdentityEvent> {
        self.identity.as_ref()
    }

    pub fn apply(&mut self, update: &FormUpdate) -> Result<&Draft, FormError> {
        self.form.apply(update)?;
        self.drafts.save(self.form.draft());
        Ok(self.form.draft())
    }

    pub fn set_personal_field(
        &mut self,
        field: PersonalField,
        value: FieldValue,
    ) -> Result<&Draft, FormError> {
        self.apply(&FormUpdate::Personal { field, value })
    }

    pub fn set_item_field(
        &mut self,
        section: Section,
        index: usize,
        field: ItemField,
        value: FieldValue,
    ) -> Result<&Draft, FormError> {
        self.apply(&FormUpdate::Item {
            section,
            index,
            field,
            value,
        })
    }

    pub fn add_item(&mut self, section: Section) -> &Draft {
        self.form.add_item(section);
        self.drafts.save(self.form.draft());
        self.form.draft()
    }

    pub fn remove_item(&mut self, section: Section, index: usize) -> Result<&Draft, FormError> {
        self.apply(&FormUpdate::Remove { section, index })
    }

    pub fn is_step_complete(&self, step: Step) -> bool {
        is_step_complete(step, self.form.draft())
    }

    /// Advance when the current step validates; otherwise publish its errors and stay.
    /// Returns whether the step changed.
    pub fn next(&mut self) -> bool {
        let current = self.current_step();
        let errors = validate_step(current, self.form.draft());
        if !errors.is_empty() {
            debug!(step = current.index(), errors = errors.len(), "step rejected");
            self.errors = errors;
            return false;
        }

        self.errors.clear();
        let next = current.next();
        self.form.set_step(next);
        debug!(from = current.index(), to = next.index(), "advanced wizard step");
        next != current
    }

    pub fn previous(&mut self) {
        self.errors.clear();
        self.form.set_step(self.current_step().previous());
    }

    /// Jump back to any earlier step, or ahead to a step that already validates.
    pub fn jump_to(&mut self, step: Step) -> bool {
        if step > self.current_step() && !self.is_step_complete(step) {
            return false;
        }

        self.errors.clear();
        self.form.set_step(step);
        true
    }

    pub fn progress_percent(&self) -> u8 {
        let done = u32::from(self.current_step().index() - Step::FIRST.index());
        let total = u32::from(Step::LAST.index() - Step::FIRST.index());
        (done * 100 / total) as u8
    }

    pub fn steps(&self) -> Vec<StepView> {
        let current = self.current_step();
        Step::ALL
            .into_iter()
            .map(|step| {
                let complete = self.is_step_complete(step);
                let status = if step == current {
                    StepStatus::Current
                } else if complete {
                    StepStatus::Completed
                } else {
                    StepStatus::Pending
                };
                StepView {
                    step: step.index(),
                    label: step.label(),
                    status,
                    reachable: step <= current || complete,
                }
            })
            .collect()
    }

    /// Look up the signed-in user once; later calls replay the first result.
    pub async fn resolve_identity<I>(&mut self, provider: &I) -> IdentityEvent
    where
        I: IdentityProvider + ?Sized,
    {
        if let Some(event) = &self.identity {
            return event.clone();
        }

        let event = match provider.current_identity().await {
            Ok(identity) => {
                let email = FieldValue::Text(identity.login_email.clone());
                if let Err(err) = self.set_personal_field(PersonalField::Email, email) {
                    debug!(error = %err, "could not prefill email");
                }
                IdentityEvent::Resolved(identity)
            }
            Err(err) => {
                debug!(error = %err, "identity unavailable");
                IdentityEvent::Unavailable(err.to_string())
            }
        };

        self.identity = Some(event.clone());
        event
    }

    /// Validate the last step and hand the draft to `adapter`.
    ///
    /// Only available on the last step. A failed send keeps the draft, the step and the
    /// persisted copy so the user can retry.
    pub async fn submit<S, I>(&mut self, adapter: &SubmissionAdapter<S, I>) -> SubmitOutcome
    where
        S: ApplicationStorage + ?Sized,
        I: IdentityProvider + ?Sized,
    {
        if self.current_step() != Step::LAST {
            let errors = vec![SUBMIT_NOT_READY_MESSAGE.to_string()];
            self.errors = errors.clone();
            return SubmitOutcome::Invalid(errors);
        }

        let errors = validate_step(Step::LAST, self.form.draft());
        if !errors.is_empty() {
            self.errors = errors.clone();
            return SubmitOutcome::Invalid(errors);
        }

        let outcome = adapter.submit(self.form.draft(), &self.drafts).await;
        match &outcome {
            SubmitOutcome::Submitted { id, .. } => {
                info!(application_id = %id, "wizard completed");
                self.errors.clear();
            }
            SubmitOutcome::Failed(message) => self.errors = vec![message.clone()],
            SubmitOutcome::Invalid(errors) => self.errors = errors.clone(),
            SubmitOutcome::Unauthenticated { .. } => {}
        }
        outcome
    }

    /// Leaving the wizard discards the unsubmitted draft.
    pub fn teardown(self) {
        debug!("discarding application draft");
        self.drafts.clear();
    }
}

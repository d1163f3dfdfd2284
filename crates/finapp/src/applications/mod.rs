//! Financial application drafting, submission and management.
//!
//! The creation wizard is built leaves-first: step validators, the draft persistence adapter,
//! the copy-on-write form store, the wizard controller and finally the submission adapter.
//! The list and detail pages sit beside it and share the storage collaborator.

pub mod detail;
pub mod domain;
pub mod draft;
pub mod listing;
pub mod memory;
pub mod remote;
pub mod repository;
pub mod router;
pub mod store;
pub mod submission;
pub mod validation;
pub mod wizard;

#[cfg(test)]
mod tests;

pub use detail::{format_currency, format_date, ApplicationDetail, ApplicationTotals};
pub use domain::{
    parse_age, ApplicationId, ApplicationPayload, ApplicationRecord, ApplicationSummary,
    AssetEntry, AssetPayload, Draft, ExpenseEntry, ExpensePayload, FieldValue, IncomeEntry,
    IncomePayload, ItemField, LiabilityEntry, LiabilityPayload, NumericField, PersonalDetails,
    PersonalDetailsPayload, PersonalField, Section, Step,
};
pub use draft::{DraftPersistence, DRAFT_KEY};
pub use listing::ApplicationsPage;
pub use memory::InMemoryApplicationStorage;
pub use remote::HttpApplicationStorage;
pub use repository::{ApplicationStorage, Created, StorageError};
pub use router::storage_router;
pub use store::{FormError, FormStateStore, FormUpdate, WizardState};
pub use submission::{prepare_payload, SubmissionAdapter, SubmitOutcome, SUBMIT_FAILED_MESSAGE};
pub use validation::{is_step_complete, validate_step};
pub use wizard::{
    IdentityEvent, StepStatus, StepView, WizardController, SUBMIT_NOT_READY_MESSAGE,
};

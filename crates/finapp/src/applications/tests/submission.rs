use std::sync::Arc;

use super::common::*;
use crate::applications::domain::{Draft, NumericField, Step};
use crate::applications::draft::DraftPersistence;
use crate::applications::memory::InMemoryApplicationStorage;
use crate::applications::repository::ApplicationStorage;
use crate::applications::submission::{
    prepare_payload, SubmissionAdapter, SubmitOutcome, SUBMIT_FAILED_MESSAGE,
};
use crate::applications::wizard::{WizardController, SUBMIT_NOT_READY_MESSAGE};
use crate::routes::Route;

#[test]
fn prepare_payload_coerces_unset_numbers_and_stamps_login_email() {
    let mut draft = complete_draft();
    draft.personal_details.age = None;
    draft.personal_details.email = "typed@elsewhere.com".to_string();
    draft.expenses[0].amount = NumericField::Unset;

    let payload = prepare_payload(&draft, "jane@x.com");
    assert_eq!(payload.personal_details.age, 0);
    assert_eq!(payload.personal_details.email, "jane@x.com");
    assert_eq!(payload.expenses[0].amount, 0.0);
    assert_eq!(payload.income[0].amount, 5200.0);
}

#[tokio::test]
async fn valid_submission_creates_and_clears_the_draft() {
    let store = memory_store();
    let mut draft = complete_draft();
    draft.income[0].amount = NumericField::Unset;
    DraftPersistence::new(Arc::clone(&store)).save(&draft);

    let storage = Arc::new(InMemoryApplicationStorage::new());
    let adapter = SubmissionAdapter::new(Arc::clone(&storage), signed_in());
    let mut wizard = WizardController::mount(Arc::clone(&store));
    assert!(wizard.jump_to(Step::LAST));

    let outcome = wizard.submit(&adapter).await;
    let SubmitOutcome::Submitted { id, redirect } = outcome else {
        panic!("expected submission, got {outcome:?}");
    };
    assert_eq!(redirect, Route::Applications);
    assert!(wizard.errors().is_empty());
    assert!(DraftPersistence::new(store).load().is_none());

    let stored = storage.get_application(&id).await.expect("stored");
    assert_eq!(stored.body.income[0].amount, 0.0);
    assert_eq!(stored.body.personal_details.email, "jane@x.com");
}

#[tokio::test]
async fn failed_create_keeps_everything_for_a_retry() {
    let store = memory_store();
    DraftPersistence::new(Arc::clone(&store)).save(&complete_draft());

    let storage = Arc::new(UnavailableStorage::default());
    let adapter = SubmissionAdapter::new(Arc::clone(&storage), signed_in());
    let mut wizard = WizardController::mount(Arc::clone(&store));
    assert!(wizard.jump_to(Step::LAST));

    let outcome = wizard.submit(&adapter).await;
    assert_eq!(outcome, SubmitOutcome::Failed(SUBMIT_FAILED_MESSAGE.to_string()));
    assert_eq!(storage.calls(), 1);
    assert_eq!(wizard.errors(), [SUBMIT_FAILED_MESSAGE.to_string()]);
    assert_eq!(wizard.current_step(), Step::LAST);
    assert_eq!(wizard.draft(), &complete_draft());
    assert_eq!(
        DraftPersistence::new(store).load(),
        Some(complete_draft())
    );
}

#[tokio::test]
async fn invalid_liabilities_are_never_sent() {
    let store = memory_store();
    let mut draft = complete_draft();
    draft.liabilities[0].description = " ".to_string();
    draft.liabilities[0].amount = NumericField::Unset;
    DraftPersistence::new(Arc::clone(&store)).save(&draft);

    let storage = Arc::new(UnavailableStorage::default());
    let adapter = SubmissionAdapter::new(Arc::clone(&storage), signed_in());
    let mut wizard = WizardController::mount(store);
    while wizard.next() {}
    assert_eq!(wizard.current_step(), Step::LAST);

    let outcome = wizard.submit(&adapter).await;
    assert_eq!(
        outcome,
        SubmitOutcome::Invalid(vec![
            "Liability #1: description is required".to_string(),
            "Liability #1: amount must be greater than 0".to_string(),
        ])
    );
    assert_eq!(storage.calls(), 0);
    assert_eq!(wizard.errors().len(), 2);
}

#[tokio::test]
async fn submit_is_refused_before_the_last_step() {
    let store = memory_store();
    let mut draft = Draft::default();
    draft.liabilities = complete_draft().liabilities;
    DraftPersistence::new(Arc::clone(&store)).save(&draft);

    let storage = Arc::new(InMemoryApplicationStorage::new());
    let adapter = SubmissionAdapter::new(Arc::clone(&storage), signed_in());
    let mut wizard = WizardController::mount(Arc::clone(&store));
    assert_eq!(wizard.current_step(), Step::Personal);

    let outcome = wizard.submit(&adapter).await;
    assert_eq!(
        outcome,
        SubmitOutcome::Invalid(vec![SUBMIT_NOT_READY_MESSAGE.to_string()])
    );
    assert!(storage.is_empty());
    assert_eq!(wizard.errors(), [SUBMIT_NOT_READY_MESSAGE.to_string()]);
    assert_eq!(wizard.current_step(), Step::Personal);
    assert_eq!(DraftPersistence::new(store).load(), Some(draft));
}

#[tokio::test]
async fn signed_out_submission_redirects_to_login() {
    let store = memory_store();
    DraftPersistence::new(Arc::clone(&store)).save(&complete_draft());
    let storage = Arc::new(InMemoryApplicationStorage::new());
    let adapter = SubmissionAdapter::new(Arc::clone(&storage), signed_out());

    let outcome = adapter
        .submit(&complete_draft(), &DraftPersistence::new(Arc::clone(&store)))
        .await;
    assert_eq!(
        outcome,
        SubmitOutcome::Unauthenticated {
            redirect: Route::Login
        }
    );
    assert!(storage.is_empty());
    assert!(DraftPersistence::new(store).load().is_some());
}

#[tokio::test]
async fn identity_outage_fails_the_submission() {
    let store = memory_store();
    let storage = Arc::new(InMemoryApplicationStorage::new());
    let adapter = SubmissionAdapter::new(Arc::clone(&storage), Arc::new(BrokenIdentity));

    let outcome = adapter
        .submit(&complete_draft(), &DraftPersistence::new(store))
        .await;
    assert_eq!(outcome, SubmitOutcome::Failed(SUBMIT_FAILED_MESSAGE.to_string()));
    assert!(storage.is_empty());
}

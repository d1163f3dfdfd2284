//! End-to-end checks of the creation wizard, list and detail pages against the HTTP storage
//! client talking to the development router on an ephemeral port.

mod common {
    use std::sync::Arc;

    use finapp::applications::{
        storage_router, Draft, FieldValue, HttpApplicationStorage, InMemoryApplicationStorage,
        ItemField, PersonalField, Section, WizardController,
    };
    use finapp::session::{Identity, SessionIdentityProvider};
    use finapp::storage::KeyValueStore;
    use tokio::net::TcpListener;

    pub(super) struct Backend {
        pub(super) storage: Arc<InMemoryApplicationStorage>,
        pub(super) client: Arc<HttpApplicationStorage>,
    }

    pub(super) async fn spawn_backend() -> Backend {
        let storage = Arc::new(InMemoryApplicationStorage::new());
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("ephemeral port");
        let addr = listener.local_addr().expect("bound address");
        let router = storage_router(Arc::clone(&storage));
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("server runs");
        });

        Backend {
            storage,
            client: Arc::new(HttpApplicationStorage::new(format!("http://{addr}"))),
        }
    }

    pub(super) fn jane() -> Arc<SessionIdentityProvider> {
        Arc::new(SessionIdentityProvider::signed_in(Identity {
            id: "user-7".to_string(),
            login_email: "jane@x.com".to_string(),
        }))
    }

    pub(super) fn text(value: &str) -> FieldValue {
        FieldValue::Text(value.to_string())
    }

    /// Fill every step the way a user typing into the form would.
    pub(super) fn fill<K>(wizard: &mut WizardController<K>)
    where
        K: KeyValueStore + ?Sized,
    {
        wizard
            .set_personal_field(PersonalField::Name, text("Jane"))
            .expect("name");
        wizard
            .set_personal_field(PersonalField::Age, PersonalField::Age.parse_value("34"))
            .expect("age");

        let rows: [(Section, &[(ItemField, &str)]); 4] = [
            (
                Section::Income,
                &[
                    (ItemField::Source, "Salary"),
                    (ItemField::Amount, "5200"),
                    (ItemField::Date, "2025-01-31"),
                ],
            ),
            (
                Section::Expenses,
                &[
                    (ItemField::Description, "Rent"),
                    (ItemField::Amount, "1800"),
                    (ItemField::Date, "2025-01-03"),
                ],
            ),
            (
                Section::Assets,
                &[(ItemField::Description, "Savings"), (ItemField::Value, "25000")],
            ),
            (
                Section::Liabilities,
                &[(ItemField::Description, "Car loan"), (ItemField::Amount, "12000")],
            ),
        ];

        for (section, fields) in rows {
            for (field, raw) in fields {
                wizard
                    .set_item_field(section, 0, *field, field.parse_value(raw))
                    .expect("field accepted");
            }
        }
    }

    pub(super) fn blank() -> Draft {
        Draft::default()
    }
}

use std::sync::Arc;

use common::*;
use finapp::applications::{
    ApplicationDetail, ApplicationStorage, ApplicationsPage, DraftPersistence, FormUpdate,
    SubmissionAdapter, SubmitOutcome, WizardController,
};
use finapp::routes::Route;
use finapp::storage::FileKeyValueStore;

#[tokio::test]
async fn wizard_submits_through_http_and_clears_the_draft() {
    let backend = spawn_backend().await;
    let dir = tempfile::tempdir().expect("temp dir");
    let store = Arc::new(FileKeyValueStore::in_dir(dir.path()));

    let mut wizard = WizardController::mount(Arc::clone(&store));
    wizard.resolve_identity(jane().as_ref()).await;
    fill(&mut wizard);

    while wizard.next() {}
    assert!(wizard.errors().is_empty(), "{:?}", wizard.errors());
    assert_eq!(wizard.progress_percent(), 100);

    let adapter = SubmissionAdapter::new(Arc::clone(&backend.client), jane());
    let outcome = wizard.submit(&adapter).await;
    let SubmitOutcome::Submitted { id, redirect } = outcome else {
        panic!("expected submission, got {outcome:?}");
    };
    assert_eq!(redirect, Route::Applications);
    assert!(DraftPersistence::new(store).load().is_none());

    let stored = backend.storage.get_application(&id).await.expect("stored");
    assert_eq!(stored.body.personal_details.email, "jane@x.com");
    assert_eq!(stored.body.income[0].amount, 5200.0);
}

#[test]
fn unsubmitted_draft_survives_a_remount() {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = Arc::new(FileKeyValueStore::in_dir(dir.path()));

    let mut wizard = WizardController::mount(Arc::clone(&store));
    fill(&mut wizard);
    let typed = wizard.draft().clone();
    drop(wizard);

    let reopened = Arc::new(FileKeyValueStore::in_dir(dir.path()));
    let wizard = WizardController::mount(reopened);
    assert_eq!(wizard.draft(), &typed);
    assert_ne!(wizard.draft(), &blank());
}

#[tokio::test]
async fn list_and_detail_pages_round_trip_over_http() {
    let backend = spawn_backend().await;
    let dir = tempfile::tempdir().expect("temp dir");
    let store = Arc::new(FileKeyValueStore::in_dir(dir.path()));

    let mut wizard = WizardController::mount(store);
    fill(&mut wizard);
    while wizard.next() {}
    let adapter = SubmissionAdapter::new(Arc::clone(&backend.client), jane());
    assert!(matches!(
        wizard.submit(&adapter).await,
        SubmitOutcome::Submitted { .. }
    ));

    let mut page = ApplicationsPage::new();
    assert_eq!(page.load(jane().as_ref(), backend.client.as_ref()).await, None);
    let summaries = page.summaries();
    assert_eq!(summaries.len(), 1);
    let id = summaries[0].id.clone();

    let mut detail = ApplicationDetail::load(id.clone(), backend.client.as_ref()).await;
    assert!(detail.error().is_none());
    assert!(detail.begin_edit());
    detail
        .edit(&FormUpdate::Personal {
            field: finapp::applications::PersonalField::Name,
            value: text("Jane Doe"),
        })
        .expect("name edit");
    assert!(detail.save(backend.client.as_ref()).await);
    assert_eq!(
        detail.record().map(|record| record.body.personal_details.name.as_str()),
        Some("Jane Doe")
    );

    assert_eq!(
        detail.delete(backend.client.as_ref()).await,
        Some(Route::Applications)
    );
    assert!(backend.storage.is_empty());
}

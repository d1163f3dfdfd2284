use std::sync::Arc;

use chrono::NaiveDate;

use super::common::*;
use crate::applications::detail::{
    format_currency, format_date, ApplicationDetail, ApplicationTotals, DELETE_FAILED_MESSAGE,
    FETCH_FAILED_MESSAGE, UPDATE_FAILED_MESSAGE,
};
use crate::applications::domain::{ApplicationId, FieldValue, ItemField, PersonalField, Section};
use crate::applications::memory::InMemoryApplicationStorage;
use crate::applications::repository::{ApplicationStorage, StorageError};
use crate::applications::store::FormUpdate;
use crate::routes::Route;

async fn seeded() -> (Arc<InMemoryApplicationStorage>, ApplicationId) {
    let storage = Arc::new(InMemoryApplicationStorage::new());
    let created = storage
        .create_application(stored_record("ignored").body)
        .await
        .expect("created");
    (storage, created.id)
}

#[test]
fn currency_uses_grouping_and_two_decimals() {
    assert_eq!(format_currency(1234.5), "$1,234.50");
    assert_eq!(format_currency(0.0), "$0.00");
    assert_eq!(format_currency(650000.0), "$650,000.00");
    assert_eq!(format_currency(-12.0), "-$12.00");
}

#[test]
fn dates_render_day_first() {
    assert_eq!(format_date("2025-01-31"), "31/01/2025");
    assert_eq!(format_date("2025-01-31T10:00:00.000Z"), "31/01/2025");
    assert_eq!(format_date("soon"), "soon");
}

#[test]
fn totals_sum_each_section() {
    let totals = ApplicationTotals::from_payload(&stored_record("a").body);
    assert_eq!(totals.income, 5200.0);
    assert_eq!(totals.expenses, 1800.0);
    assert_eq!(totals.net_worth(), 13000.0);
}

#[tokio::test]
async fn load_reports_fetch_failures() {
    let detail = ApplicationDetail::load(
        ApplicationId("missing".to_string()),
        &InMemoryApplicationStorage::new(),
    )
    .await;

    assert!(detail.record().is_none());
    assert_eq!(detail.error(), Some(FETCH_FAILED_MESSAGE));
    assert!(detail.totals().is_none());
}

#[tokio::test]
async fn edits_are_ignored_outside_edit_mode() {
    let (storage, id) = seeded().await;
    let mut detail = ApplicationDetail::load(id, storage.as_ref()).await;

    detail
        .edit(&FormUpdate::Add(Section::Income))
        .expect("no-op edit");
    assert!(!detail.is_editing());
    assert!(detail.edited().is_none());
}

#[tokio::test]
async fn added_dated_rows_are_stamped_with_today() {
    let (storage, id) = seeded().await;
    let today = NaiveDate::from_ymd_opt(2025, 3, 14).expect("valid date");
    let mut detail = ApplicationDetail::load(id, storage.as_ref())
        .await
        .with_today(today);

    assert!(detail.begin_edit());
    detail
        .edit(&FormUpdate::Add(Section::Expenses))
        .expect("expense added");
    detail
        .edit(&FormUpdate::Add(Section::Assets))
        .expect("asset added");

    let edited = detail.edited().expect("editing");
    assert_eq!(edited.expenses[1].date, "2025-03-14");
    assert_eq!(edited.assets.len(), 2);
}

#[tokio::test]
async fn save_replaces_the_record_and_leaves_edit_mode() {
    let (storage, id) = seeded().await;
    let mut detail = ApplicationDetail::load(id.clone(), storage.as_ref()).await;

    assert!(detail.begin_edit());
    detail
        .edit(&FormUpdate::Personal {
            field: PersonalField::Name,
            value: FieldValue::Text("Jane Doe".to_string()),
        })
        .expect("name edit");
    detail
        .edit(&FormUpdate::Item {
            section: Section::Liabilities,
            index: 0,
            field: ItemField::Amount,
            value: ItemField::Amount.parse_value(""),
        })
        .expect("amount cleared");

    assert!(detail.save(storage.as_ref()).await);
    assert!(!detail.is_editing());

    let stored = storage.get_application(&id).await.expect("stored");
    assert_eq!(stored.body.personal_details.name, "Jane Doe");
    assert_eq!(stored.body.liabilities[0].amount, 0.0);
    assert_eq!(detail.record(), Some(&stored));
}

#[tokio::test]
async fn failed_save_stays_in_edit_mode() {
    let (storage, id) = seeded().await;
    let mut detail = ApplicationDetail::load(id, storage.as_ref()).await;
    assert!(detail.begin_edit());

    let failing = UnavailableStorage::default();
    assert!(!detail.save(&failing).await);
    assert!(detail.is_editing());
    assert_eq!(detail.error(), Some(UPDATE_FAILED_MESSAGE));

    detail.cancel_edit();
    assert!(!detail.is_editing());
}

#[tokio::test]
async fn delete_returns_to_the_list() {
    let (storage, id) = seeded().await;
    let mut detail = ApplicationDetail::load(id.clone(), storage.as_ref()).await;

    assert_eq!(
        detail.delete(storage.as_ref()).await,
        Some(Route::Applications)
    );
    assert_eq!(
        storage.get_application(&id).await,
        Err(StorageError::NotFound)
    );

    assert_eq!(detail.delete(storage.as_ref()).await, None);
    assert_eq!(detail.error(), Some(DELETE_FAILED_MESSAGE));
}

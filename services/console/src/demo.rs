use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use clap::Args;

use crate::prompt::{mount, render_step};
use finapp::applications::{
    format_currency, format_date, ApplicationDetail, ApplicationId, ApplicationPayload,
    ApplicationRecord, ApplicationStorage, ApplicationsPage, Created, FieldValue, FormUpdate,
    InMemoryApplicationStorage, ItemField, PersonalField, Section, StorageError,
    SubmissionAdapter, SubmitOutcome, WizardController,
};
use finapp::error::AppError;
use finapp::session::{dashboard_title, Identity, SessionIdentityProvider, UserInfo};
use finapp::storage::{KeyValueStore, MemoryKeyValueStore, UiPreferences};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Email of the simulated signed-in user.
    #[arg(long, default_value = "jane@x.com")]
    pub(crate) email: String,
    /// Make the first submission fail to show that the draft survives for a retry.
    #[arg(long)]
    pub(crate) simulate_outage: bool,
    /// Date stamped onto rows added while editing (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Leave the demo application in place instead of deleting it at the end.
    #[arg(long)]
    pub(crate) keep: bool,
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

/// In-memory storage that refuses creates while the outage flag is up.
struct FlakyStorage {
    inner: InMemoryApplicationStorage,
    down: AtomicBool,
}

impl FlakyStorage {
    fn new(down: bool) -> Self {
        Self {
            inner: InMemoryApplicationStorage::new(),
            down: AtomicBool::new(down),
        }
    }

    fn recover(&self) {
        self.down.store(false, Ordering::Release);
    }
}

#[async_trait]
impl ApplicationStorage for FlakyStorage {
    async fn create_application(
        &self,
        payload: ApplicationPayload,
    ) -> Result<Created, StorageError> {
        if self.down.load(Ordering::Acquire) {
            return Err(StorageError::Network("simulated outage".to_string()));
        }
        self.inner.create_application(payload).await
    }

    async fn list_applications(
        &self,
        email: &str,
    ) -> Result<Vec<ApplicationRecord>, StorageError> {
        self.inner.list_applications(email).await
    }

    async fn get_application(&self, id: &ApplicationId) -> Result<ApplicationRecord, StorageError> {
        self.inner.get_application(id).await
    }

    async fn update_application(
        &self,
        id: &ApplicationId,
        payload: ApplicationPayload,
    ) -> Result<ApplicationRecord, StorageError> {
        self.inner.update_application(id, payload).await
    }

    async fn delete_application(&self, id: &ApplicationId) -> Result<(), StorageError> {
        self.inner.delete_application(id).await
    }
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        email,
        simulate_outage,
        today,
        keep,
    } = args;

    let identity = Identity {
        id: "demo-user".to_string(),
        login_email: email,
    };
    let user = UserInfo::from(&identity);
    let identity = Arc::new(SessionIdentityProvider::signed_in(identity));
    let storage = Arc::new(FlakyStorage::new(simulate_outage));
    let local = Arc::new(MemoryKeyValueStore::new());

    println!("{}", dashboard_title(Some(&user)));
    println!("Signed in as {} ({})", user.email, user.role);

    let mut wizard = mount(&local);
    wizard.resolve_identity(identity.as_ref()).await;

    println!("\nCreating an application");
    fill_personal(&mut wizard, "17")?;
    if !wizard.next() {
        println!("Step rejected:");
        print_indented(wizard.errors());
    }
    fill_personal(&mut wizard, "34")?;
    fill_sections(&mut wizard)?;

    while wizard.next() {
        print_indented(&render_step(&wizard)[..1]);
    }

    let adapter = SubmissionAdapter::new(Arc::clone(&storage), Arc::clone(&identity));
    let mut outcome = wizard.submit(&adapter).await;
    if let SubmitOutcome::Failed(message) = &outcome {
        println!("Submission failed: {message}");
        println!(
            "Draft kept at step {} with {} liabilities; retrying",
            wizard.current_step(),
            wizard.draft().liabilities.len()
        );
        storage.recover();
        outcome = wizard.submit(&adapter).await;
    }

    let id = match outcome {
        SubmitOutcome::Submitted { id, redirect } => {
            println!("Submitted application {id}; continuing at {redirect}");
            id
        }
        other => {
            println!("Submission did not complete: {other:?}");
            return Ok(());
        }
    };

    let mut page = ApplicationsPage::new();
    page.load(identity.as_ref(), storage.as_ref()).await;
    println!("\nApplications");
    for summary in page.summaries() {
        println!(
            "  {} | {} | age {} | {}",
            summary.id, summary.name, summary.age, summary.email
        );
    }

    let mut detail = ApplicationDetail::load(id, storage.as_ref()).await;
    if let Some(today) = today {
        detail = detail.with_today(today);
    }
    print_detail(&detail);

    println!("\nEditing: adding an expense row");
    detail.begin_edit();
    detail.edit(&FormUpdate::Add(Section::Expenses))?;
    detail.edit(&FormUpdate::Item {
        section: Section::Expenses,
        index: 1,
        field: ItemField::Description,
        value: FieldValue::Text("Groceries".to_string()),
    })?;
    detail.edit(&FormUpdate::Item {
        section: Section::Expenses,
        index: 1,
        field: ItemField::Amount,
        value: ItemField::Amount.parse_value("640"),
    })?;
    if detail.save(storage.as_ref()).await {
        print_detail(&detail);
    } else if let Some(error) = detail.error() {
        println!("{error}");
    }

    let preferences = UiPreferences::new(Arc::clone(&local));
    let collapsed = preferences.toggle_sidebar();
    println!("\nSidebar collapsed: {collapsed}");

    if !keep {
        if let Some(route) = detail.delete(storage.as_ref()).await {
            println!("Deleted application; back to {route}");
        }
    }

    Ok(())
}

fn fill_personal<K>(wizard: &mut WizardController<K>, age: &str) -> Result<(), AppError>
where
    K: KeyValueStore + ?Sized,
{
    wizard.set_personal_field(PersonalField::Name, FieldValue::Text("Jane".to_string()))?;
    wizard.set_personal_field(PersonalField::Age, PersonalField::Age.parse_value(age))?;
    Ok(())
}

fn fill_sections<K>(wizard: &mut WizardController<K>) -> Result<(), AppError>
where
    K: KeyValueStore + ?Sized,
{
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
        for &(field, raw) in fields {
            wizard.set_item_field(section, 0, field, field.parse_value(raw))?;
        }
    }
    Ok(())
}

fn print_detail(detail: &ApplicationDetail) {
    let Some(record) = detail.record() else {
        if let Some(error) = detail.error() {
            println!("{error}");
        }
        return;
    };

    let details = &record.body.personal_details;
    println!("\n{} ({}, {})", details.name, details.age, details.email);
    for entry in &record.body.income {
        println!(
            "  income   {:<12} {:>14} {}",
            entry.source,
            format_currency(entry.amount),
            format_date(&entry.date)
        );
    }
    for entry in &record.body.expenses {
        println!(
            "  expense  {:<12} {:>14} {}",
            entry.description,
            format_currency(entry.amount),
            format_date(&entry.date)
        );
    }
    if let Some(totals) = detail.totals() {
        println!(
            "  totals   income {} | expenses {} | net worth {}",
            format_currency(totals.income),
            format_currency(totals.expenses),
            format_currency(totals.net_worth())
        );
    }
}

fn print_indented(lines: &[String]) {
    for line in lines {
        println!("  {line}");
    }
}

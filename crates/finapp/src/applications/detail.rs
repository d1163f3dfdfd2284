//! Single-application view with in-place editing.

use chrono::{DateTime, Local, NaiveDate};
use serde::Serialize;
use tracing::{error, info};

use super::domain::{
    ApplicationId, ApplicationPayload, ApplicationRecord, Draft, FieldValue, ItemField, Section,
};
use super::repository::ApplicationStorage;
use super::store::{FormError, FormUpdate};
use crate::routes::Route;

pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch application details";
pub const UPDATE_FAILED_MESSAGE: &str = "Failed to update application";
pub const DELETE_FAILED_MESSAGE: &str = "Failed to delete application";

/// Sums shown in the detail header.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ApplicationTotals {
    pub income: f64,
    pub expenses: f64,
    pub assets: f64,
    pub liabilities: f64,
}

impl ApplicationTotals {
    pub fn from_payload(payload: &ApplicationPayload) -> Self {
        Self {
            income: payload.income.iter().map(|entry| entry.amount).sum(),
            expenses: payload.expenses.iter().map(|entry| entry.amount).sum(),
            assets: payload.assets.iter().map(|entry| entry.value).sum(),
            liabilities: payload.liabilities.iter().map(|entry| entry.amount).sum(),
        }
    }

    pub fn net_worth(&self) -> f64 {
        self.assets - self.liabilities
    }
}

/// Format an amount the way the en-AU locale prints AUD (`$1,234.50`).
pub fn format_currency(amount: f64) -> String {
    if !amount.is_finite() {
        return "$0.00".to_string();
    }

    let cents = (amount.abs() * 100.0).round() as u64;
    let dollars = (cents / 100).to_string();
    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (position, digit) in dollars.chars().enumerate() {
        if position > 0 && (dollars.len() - position) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${grouped}.{:02}", cents % 100)
}

/// Render a stored date as `DD/MM/YYYY`; unparseable input is returned as-is.
pub fn format_date(raw: &str) -> String {
    let raw = raw.trim();
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().or_else(|| {
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|timestamp| timestamp.date_naive())
    });

    match date {
        Some(date) => date.format("%d/%m/%Y").to_string(),
        None => raw.to_string(),
    }
}

/// State behind the `/application?id=` page.
#[derive(Debug, Clone)]
pub struct ApplicationDetail {
    id: ApplicationId,
    record: Option<ApplicationRecord>,
    editing: Option<Draft>,
    error: Option<String>,
    today: NaiveDate,
}

impl ApplicationDetail {
    pub fn new(id: ApplicationId) -> Self {
        Self {
            id,
            record: None,
            editing: None,
            error: None,
            today: Local::now().date_naive(),
        }
    }

    /// Override the date stamped onto rows added while editing.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub async fn load<S>(id: ApplicationId, storage: &S) -> Self
    where
        S: ApplicationStorage + ?Sized,
    {
        let mut detail = Self::new(id);
        detail.refresh(storage).await;
        detail
    }

    pub async fn refresh<S>(&mut self, storage: &S)
    where
        S: ApplicationStorage + ?Sized,
    {
        match storage.get_application(&self.id).await {
            Ok(record) => {
                self.record = Some(record);
                self.error = None;
            }
            Err(err) => {
                error!(application_id = %self.id, error = %err, "failed to fetch application");
                self.error = Some(FETCH_FAILED_MESSAGE.to_string());
            }
        }
    }

    pub fn id(&self) -> &ApplicationId {
        &self.id
    }

    pub fn record(&self) -> Option<&ApplicationRecord> {
        self.record.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn totals(&self) -> Option<ApplicationTotals> {
        self.record
            .as_ref()
            .map(|record| ApplicationTotals::from_payload(&record.body))
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn edited(&self) -> Option<&Draft> {
        self.editing.as_ref()
    }

    /// Copy the loaded record into an editable draft. Returns false when nothing is loaded.
    pub fn begin_edit(&mut self) -> bool {
        match &self.record {
            Some(record) => {
                self.editing = Some(Draft::from(&record.body));
                true
            }
            None => false,
        }
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Apply an edit to the working copy; a no-op outside edit mode.
    pub fn edit(&mut self, update: &FormUpdate) -> Result<(), FormError> {
        let Some(current) = self.editing.as_ref() else {
            return Ok(());
        };

        let mut next = update.apply(current)?;
        if let FormUpdate::Add(section) = update {
            next = self.stamp_today(next, *section)?;
        }
        self.editing = Some(next);
        Ok(())
    }

    fn stamp_today(&self, draft: Draft, section: Section) -> Result<Draft, FormError> {
        if !section.has_dates() {
            return Ok(draft);
        }
        let index = draft.section_len(section).saturating_sub(1);
        let today = FieldValue::Text(self.today.format("%Y-%m-%d").to_string());
        FormUpdate::Item {
            section,
            index,
            field: ItemField::Date,
            value: today,
        }
        .apply(&draft)
    }

    /// Send the working copy. On failure the copy stays in edit mode for another try.
    pub async fn save<S>(&mut self, storage: &S) -> bool
    where
        S: ApplicationStorage + ?Sized,
    {
        let Some(edited) = self.editing.as_ref() else {
            return false;
        };

        let payload = ApplicationPayload::from_draft(edited);
        match storage.update_application(&self.id, payload).await {
            Ok(record) => {
                info!(application_id = %self.id, "application updated");
                self.record = Some(record);
                self.editing = None;
                self.error = None;
                true
            }
            Err(err) => {
                error!(application_id = %self.id, error = %err, "error updating application");
                self.error = Some(UPDATE_FAILED_MESSAGE.to_string());
                false
            }
        }
    }

    /// Delete the application; on success the caller should go back to the list.
    pub async fn delete<S>(&mut self, storage: &S) -> Option<Route>
    where
        S: ApplicationStorage + ?Sized,
    {
        match storage.delete_application(&self.id).await {
            Ok(()) => {
                info!(application_id = %self.id, "application deleted");
                self.error = None;
                Some(Route::Applications)
            }
            Err(err) => {
                error!(application_id = %self.id, error = %err, "error deleting application");
                self.error = Some(DELETE_FAILED_MESSAGE.to_string());
                None
            }
        }
    }
}

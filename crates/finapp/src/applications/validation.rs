use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use super::domain::{
    AssetEntry, Draft, ExpenseEntry, IncomeEntry, LiabilityEntry, NumericField, PersonalDetails,
    Section, Step,
};

pub const MINIMUM_AGE: u32 = 18;

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
const DATE_FORMAT: &str = "%Y-%m-%d";

// The pattern is a constant; `email_pattern_compiles` pins it.
fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern compiles"))
}

/// Run the validator belonging to `step` against the current draft.
pub fn validate_step(step: Step, draft: &Draft) -> Vec<String> {
    match step {
        Step::Personal => validate_personal(&draft.personal_details),
        Step::Income => validate_income(&draft.income),
        Step::Expenses => validate_expenses(&draft.expenses),
        Step::Assets => validate_assets(&draft.assets),
        Step::Liabilities => validate_liabilities(&draft.liabilities),
    }
}

pub fn is_step_complete(step: Step, draft: &Draft) -> bool {
    validate_step(step, draft).is_empty()
}

pub fn validate_personal(details: &PersonalDetails) -> Vec<String> {
    let mut errors = Vec::new();

    if details.name.trim().is_empty() {
        errors.push("Name is required".to_string());
    }

    match details.age {
        None => errors.push("Age is required".to_string()),
        Some(age) if age < MINIMUM_AGE => {
            errors.push(format!("Age must be {MINIMUM_AGE} or older"))
        }
        Some(_) => {}
    }

    if !email_pattern().is_match(details.email.trim()) {
        errors.push("A valid email address is required".to_string());
    }

    errors
}

pub fn validate_income(entries: &[IncomeEntry]) -> Vec<String> {
    let mut errors = Vec::new();
    require_entries(Section::Income, entries.len(), &mut errors);
    for (index, entry) in entries.iter().enumerate() {
        let mut check = EntryCheck::new(Section::Income, index, &mut errors);
        check.text("source", &entry.source);
        check.positive("amount", entry.amount);
        check.date(&entry.date);
    }
    errors
}

pub fn validate_expenses(entries: &[ExpenseEntry]) -> Vec<String> {
    let mut errors = Vec::new();
    require_entries(Section::Expenses, entries.len(), &mut errors);
    for (index, entry) in entries.iter().enumerate() {
        let mut check = EntryCheck::new(Section::Expenses, index, &mut errors);
        check.text("description", &entry.description);
        check.positive("amount", entry.amount);
        check.date(&entry.date);
    }
    errors
}

pub fn validate_assets(entries: &[AssetEntry]) -> Vec<String> {
    let mut errors = Vec::new();
    require_entries(Section::Assets, entries.len(), &mut errors);
    for (index, entry) in entries.iter().enumerate() {
        let mut check = EntryCheck::new(Section::Assets, index, &mut errors);
        check.text("description", &entry.description);
        check.positive("value", entry.value);
    }
    errors
}

pub fn validate_liabilities(entries: &[LiabilityEntry]) -> Vec<String> {
    let mut errors = Vec::new();
    require_entries(Section::Liabilities, entries.len(), &mut errors);
    for (index, entry) in entries.iter().enumerate() {
        let mut check = EntryCheck::new(Section::Liabilities, index, &mut errors);
        check.text("description", &entry.description);
        check.positive("amount", entry.amount);
    }
    errors
}

fn require_entries(section: Section, len: usize, errors: &mut Vec<String>) {
    if len == 0 {
        errors.push(format!("Add at least one {} entry", section.entry_label().to_lowercase()));
    }
}

/// Collects messages for one numbered entry (`Income #2: ...`).
struct EntryCheck<'a> {
    prefix: String,
    errors: &'a mut Vec<String>,
}

impl<'a> EntryCheck<'a> {
    fn new(section: Section, index: usize, errors: &'a mut Vec<String>) -> Self {
        Self {
            prefix: format!("{} #{}", section.entry_label(), index + 1),
            errors,
        }
    }

    fn text(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.errors.push(format!("{}: {field} is required", self.prefix));
        }
    }

    fn positive(&mut self, field: &str, value: NumericField) {
        match value.value() {
            Some(amount) if amount > 0.0 => {}
            _ => self
                .errors
                .push(format!("{}: {field} must be greater than 0", self.prefix)),
        }
    }

    fn date(&mut self, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            self.errors.push(format!("{}: date is required", self.prefix));
        } else if NaiveDate::parse_from_str(value, DATE_FORMAT).is_err() {
            self.errors.push(format!(
                "{}: date must be a valid date (YYYY-MM-DD)",
                self.prefix
            ));
        }
    }
}

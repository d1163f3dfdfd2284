use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier wrapper for stored applications.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Numeric form value: a finite number or an explicit unset marker.
///
/// Serialized as `null` when unset so persisted drafts keep the distinction between
/// "nothing typed yet" and zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Option<f64>", into = "Option<f64>")]
pub enum NumericField {
    #[default]
    Unset,
    Value(f64),
}

impl NumericField {
    pub fn new(value: f64) -> Self {
        if value.is_finite() {
            Self::Value(value)
        } else {
            Self::Unset
        }
    }

    /// Convert raw text from an input box. Blank, non-numeric and non-finite input is unset.
    pub fn parse_input(raw: &str) -> Self {
        raw.trim()
            .parse::<f64>()
            .map(Self::new)
            .unwrap_or(Self::Unset)
    }

    pub fn value(self) -> Option<f64> {
        match self {
            Self::Unset => None,
            Self::Value(value) => Some(value),
        }
    }

    pub fn is_set(self) -> bool {
        matches!(self, Self::Value(_))
    }

    pub fn or_zero(self) -> f64 {
        self.value().unwrap_or(0.0)
    }
}

impl From<Option<f64>> for NumericField {
    fn from(value: Option<f64>) -> Self {
        value.map(Self::new).unwrap_or(Self::Unset)
    }
}

impl From<NumericField> for Option<f64> {
    fn from(value: NumericField) -> Self {
        value.value()
    }
}

/// Parse an age typed by the user. Anything that is not a whole non-negative number is unset.
pub fn parse_age(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok()
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PersonalDetails {
    pub name: String,
    pub age: Option<u32>,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IncomeEntry {
    pub source: String,
    pub amount: NumericField,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExpenseEntry {
    pub description: String,
    pub amount: NumericField,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AssetEntry {
    pub description: String,
    pub value: NumericField,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LiabilityEntry {
    pub description: String,
    pub amount: NumericField,
}

/// The unsaved application being assembled by the creation wizard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    pub personal_details: PersonalDetails,
    pub income: Vec<IncomeEntry>,
    pub expenses: Vec<ExpenseEntry>,
    pub assets: Vec<AssetEntry>,
    pub liabilities: Vec<LiabilityEntry>,
}

impl Default for Draft {
    /// A fresh draft starts with one blank row per repeatable section.
    fn default() -> Self {
        Self {
            personal_details: PersonalDetails::default(),
            income: vec![IncomeEntry::default()],
            expenses: vec![ExpenseEntry::default()],
            assets: vec![AssetEntry::default()],
            liabilities: vec![LiabilityEntry::default()],
        }
    }
}

impl Draft {
    pub fn section_len(&self, section: Section) -> usize {
        match section {
            Section::Income => self.income.len(),
            Section::Expenses => self.expenses.len(),
            Section::Assets => self.assets.len(),
            Section::Liabilities => self.liabilities.len(),
        }
    }
}

/// Repeatable collections of a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Income,
    Expenses,
    Assets,
    Liabilities,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::Income,
        Section::Expenses,
        Section::Assets,
        Section::Liabilities,
    ];

    pub const fn key(self) -> &'static str {
        match self {
            Section::Income => "income",
            Section::Expenses => "expenses",
            Section::Assets => "assets",
            Section::Liabilities => "liabilities",
        }
    }

    /// Singular label used when numbering entries in messages.
    pub const fn entry_label(self) -> &'static str {
        match self {
            Section::Income => "Income",
            Section::Expenses => "Expense",
            Section::Assets => "Asset",
            Section::Liabilities => "Liability",
        }
    }

    pub const fn fields(self) -> &'static [ItemField] {
        match self {
            Section::Income => &[ItemField::Source, ItemField::Amount, ItemField::Date],
            Section::Expenses => &[ItemField::Description, ItemField::Amount, ItemField::Date],
            Section::Assets => &[ItemField::Description, ItemField::Value],
            Section::Liabilities => &[ItemField::Description, ItemField::Amount],
        }
    }

    pub fn has_dates(self) -> bool {
        self.fields().contains(&ItemField::Date)
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Section {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" | "expenses" => Ok(Self::Expenses),
            "asset" | "assets" => Ok(Self::Assets),
            "liability" | "liabilities" => Ok(Self::Liabilities),
            other => Err(format!("unknown section '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PersonalField {
    Name,
    Age,
    Email,
}

impl PersonalField {
    pub const fn key(self) -> &'static str {
        match self {
            PersonalField::Name => "name",
            PersonalField::Age => "age",
            PersonalField::Email => "email",
        }
    }

    /// Convert raw input into the value this field stores.
    pub fn parse_value(self, raw: &str) -> FieldValue {
        match self {
            PersonalField::Age => FieldValue::Integer(parse_age(raw)),
            PersonalField::Name | PersonalField::Email => FieldValue::Text(raw.to_string()),
        }
    }
}

impl fmt::Display for PersonalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for PersonalField {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "age" => Ok(Self::Age),
            "email" => Ok(Self::Email),
            other => Err(format!("unknown personal field '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemField {
    Source,
    Description,
    Amount,
    Value,
    Date,
}

impl ItemField {
    pub const fn key(self) -> &'static str {
        match self {
            ItemField::Source => "source",
            ItemField::Description => "description",
            ItemField::Amount => "amount",
            ItemField::Value => "value",
            ItemField::Date => "date",
        }
    }

    pub const fn is_numeric(self) -> bool {
        matches!(self, ItemField::Amount | ItemField::Value)
    }

    pub fn parse_value(self, raw: &str) -> FieldValue {
        if self.is_numeric() {
            FieldValue::Number(NumericField::parse_input(raw))
        } else {
            FieldValue::Text(raw.to_string())
        }
    }
}

impl fmt::Display for ItemField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ItemField {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "source" => Ok(Self::Source),
            "description" => Ok(Self::Description),
            "amount" => Ok(Self::Amount),
            "value" => Ok(Self::Value),
            "date" => Ok(Self::Date),
            other => Err(format!("unknown item field '{other}'")),
        }
    }
}

/// Typed value handed to the form store.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(NumericField),
    Integer(Option<u32>),
}

impl FieldValue {
    pub const fn kind(&self) -> &'static str {
        match self {
            FieldValue::Text(_) => "text",
            FieldValue::Number(_) => "number",
            FieldValue::Integer(_) => "integer",
        }
    }
}

/// The five wizard steps in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Step {
    Personal = 1,
    Income = 2,
    Expenses = 3,
    Assets = 4,
    Liabilities = 5,
}

impl Step {
    pub const ALL: [Step; 5] = [
        Step::Personal,
        Step::Income,
        Step::Expenses,
        Step::Assets,
        Step::Liabilities,
    ];

    pub const FIRST: Step = Step::Personal;
    pub const LAST: Step = Step::Liabilities;

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|step| step.index() == index)
    }

    pub const fn index(self) -> u8 {
        self as u8
    }

    pub const fn label(self) -> &'static str {
        match self {
            Step::Personal => "Personal",
            Step::Income => "Income",
            Step::Expenses => "Expenses",
            Step::Assets => "Assets",
            Step::Liabilities => "Liabilities",
        }
    }

    /// Following step, saturating at the last one.
    pub fn next(self) -> Self {
        Self::from_index(self.index() + 1).unwrap_or(Self::LAST)
    }

    /// Preceding step, saturating at the first one.
    pub fn previous(self) -> Self {
        Self::from_index(self.index().saturating_sub(1)).unwrap_or(Self::FIRST)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.index(), self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalDetailsPayload {
    pub name: String,
    pub age: u32,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomePayload {
    pub source: String,
    pub amount: f64,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpensePayload {
    pub description: String,
    pub amount: f64,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetPayload {
    pub description: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiabilityPayload {
    pub description: String,
    pub amount: f64,
}

/// Body sent to the storage backend when creating or updating an application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationPayload {
    pub personal_details: PersonalDetailsPayload,
    pub income: Vec<IncomePayload>,
    pub expenses: Vec<ExpensePayload>,
    pub assets: Vec<AssetPayload>,
    pub liabilities: Vec<LiabilityPayload>,
}

impl ApplicationPayload {
    /// Coerce every unset number in the draft to zero.
    pub fn from_draft(draft: &Draft) -> Self {
        let details = &draft.personal_details;
        Self {
            personal_details: PersonalDetailsPayload {
                name: details.name.clone(),
                age: details.age.unwrap_or(0),
                email: details.email.clone(),
            },
            income: draft
                .income
                .iter()
                .map(|entry| IncomePayload {
                    source: entry.source.clone(),
                    amount: entry.amount.or_zero(),
                    date: entry.date.clone(),
                })
                .collect(),
            expenses: draft
                .expenses
                .iter()
                .map(|entry| ExpensePayload {
                    description: entry.description.clone(),
                    amount: entry.amount.or_zero(),
                    date: entry.date.clone(),
                })
                .collect(),
            assets: draft
                .assets
                .iter()
                .map(|entry| AssetPayload {
                    description: entry.description.clone(),
                    value: entry.value.or_zero(),
                })
                .collect(),
            liabilities: draft
                .liabilities
                .iter()
                .map(|entry| LiabilityPayload {
                    description: entry.description.clone(),
                    amount: entry.amount.or_zero(),
                })
                .collect(),
        }
    }
}

impl From<&ApplicationPayload> for Draft {
    fn from(payload: &ApplicationPayload) -> Self {
        let details = &payload.personal_details;
        Self {
            personal_details: PersonalDetails {
                name: details.name.clone(),
                age: Some(details.age),
                email: details.email.clone(),
            },
            income: payload
                .income
                .iter()
                .map(|entry| IncomeEntry {
                    source: entry.source.clone(),
                    amount: NumericField::new(entry.amount),
                    date: entry.date.clone(),
                })
                .collect(),
            expenses: payload
                .expenses
                .iter()
                .map(|entry| ExpenseEntry {
                    description: entry.description.clone(),
                    amount: NumericField::new(entry.amount),
                    date: entry.date.clone(),
                })
                .collect(),
            assets: payload
                .assets
                .iter()
                .map(|entry| AssetEntry {
                    description: entry.description.clone(),
                    value: NumericField::new(entry.value),
                })
                .collect(),
            liabilities: payload
                .liabilities
                .iter()
                .map(|entry| LiabilityEntry {
                    description: entry.description.clone(),
                    amount: NumericField::new(entry.amount),
                })
                .collect(),
        }
    }
}

/// Application as returned by the storage backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    #[serde(rename = "_id")]
    pub id: ApplicationId,
    #[serde(flatten)]
    pub body: ApplicationPayload,
}

impl ApplicationRecord {
    pub fn summary(&self) -> ApplicationSummary {
        let details = &self.body.personal_details;
        ApplicationSummary {
            id: self.id.clone(),
            name: details.name.clone(),
            age: details.age,
            email: details.email.clone(),
        }
    }
}

/// One card in the applications list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationSummary {
    pub id: ApplicationId,
    pub name: String,
    pub age: u32,
    pub email: String,
}

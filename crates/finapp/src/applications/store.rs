//! Copy-on-write edits over a [`Draft`].
//!
//! Every operation takes the current draft by reference and hands back a new one; a failed
//! edit leaves the caller's draft as it was.

use super::domain::{
    AssetEntry, Draft, ExpenseEntry, FieldValue, IncomeEntry, ItemField, LiabilityEntry,
    NumericField, PersonalField, Section, Step,
};

/// Rejected form edits.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormError {
    #[error("{section} has no entry at index {index} (length {len})")]
    IndexOutOfRange {
        section: Section,
        index: usize,
        len: usize,
    },
    #[error("{section} entries have no '{field}' field")]
    UnknownField { section: Section, field: ItemField },
    #[error("'{field}' does not accept a {found} value")]
    TypeMismatch {
        field: &'static str,
        found: &'static str,
    },
}

/// Single edit applied through the store.
#[derive(Debug, Clone, PartialEq)]
pub enum FormUpdate {
    Personal {
        field: PersonalField,
        value: FieldValue,
    },
    Item {
        section: Section,
        index: usize,
        field: ItemField,
        value: FieldValue,
    },
    Add(Section),
    Remove {
        section: Section,
        index: usize,
    },
}

impl FormUpdate {
    pub fn apply(&self, draft: &Draft) -> Result<Draft, FormError> {
        match self {
            FormUpdate::Personal { field, value } => set_personal_field(draft, *field, value),
            FormUpdate::Item {
                section,
                index,
                field,
                value,
            } => set_item_field(draft, *section, *index, *field, value),
            FormUpdate::Add(section) => Ok(add_item(draft, *section)),
            FormUpdate::Remove { section, index } => remove_item(draft, *section, *index),
        }
    }
}

pub fn set_personal_field(
    draft: &Draft,
    field: PersonalField,
    value: &FieldValue,
) -> Result<Draft, FormError> {
    let mut next = draft.clone();
    let details = &mut next.personal_details;
    match (field, value) {
        (PersonalField::Name, FieldValue::Text(text)) => details.name = text.clone(),
        (PersonalField::Email, FieldValue::Text(text)) => details.email = text.clone(),
        (PersonalField::Age, FieldValue::Integer(age)) => details.age = *age,
        (field, value) => {
            return Err(FormError::TypeMismatch {
                field: field.key(),
                found: value.kind(),
            })
        }
    }
    Ok(next)
}

pub fn set_item_field(
    draft: &Draft,
    section: Section,
    index: usize,
    field: ItemField,
    value: &FieldValue,
) -> Result<Draft, FormError> {
    let mut next = draft.clone();
    match section {
        Section::Income => next.income = edit_entry(&draft.income, index, field, value)?,
        Section::Expenses => next.expenses = edit_entry(&draft.expenses, index, field, value)?,
        Section::Assets => next.assets = edit_entry(&draft.assets, index, field, value)?,
        Section::Liabilities => {
            next.liabilities = edit_entry(&draft.liabilities, index, field, value)?
        }
    }
    Ok(next)
}

/// Append a blank template row to `section`.
pub fn add_item(draft: &Draft, section: Section) -> Draft {
    let mut next = draft.clone();
    match section {
        Section::Income => next.income = appended(&draft.income),
        Section::Expenses => next.expenses = appended(&draft.expenses),
        Section::Assets => next.assets = appended(&draft.assets),
        Section::Liabilities => next.liabilities = appended(&draft.liabilities),
    }
    next
}

/// Drop the row at `index`; later rows shift down by one.
pub fn remove_item(draft: &Draft, section: Section, index: usize) -> Result<Draft, FormError> {
    let mut next = draft.clone();
    match section {
        Section::Income => next.income = without(&draft.income, index)?,
        Section::Expenses => next.expenses = without(&draft.expenses, index)?,
        Section::Assets => next.assets = without(&draft.assets, index)?,
        Section::Liabilities => next.liabilities = without(&draft.liabilities, index)?,
    }
    Ok(next)
}

/// Where the wizard currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WizardState {
    pub current_step: Step,
}

impl Default for WizardState {
    fn default() -> Self {
        Self {
            current_step: Step::FIRST,
        }
    }
}

/// Holds the draft and wizard position; edits swap in a freshly built draft.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormStateStore {
    draft: Draft,
    wizard: WizardState,
}

impl FormStateStore {
    pub fn new(draft: Draft) -> Self {
        Self {
            draft,
            wizard: WizardState::default(),
        }
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn wizard(&self) -> WizardState {
        self.wizard
    }

    pub fn apply(&mut self, update: &FormUpdate) -> Result<&Draft, FormError> {
        self.draft = update.apply(&self.draft)?;
        Ok(&self.draft)
    }

    pub fn add_item(&mut self, section: Section) -> &Draft {
        self.draft = add_item(&self.draft, section);
        &self.draft
    }

    pub(crate) fn set_step(&mut self, step: Step) {
        self.wizard.current_step = step;
    }
}

trait SectionEntry: Clone + Default {
    const SECTION: Section;

    fn set(&mut self, field: ItemField, value: &FieldValue) -> Result<(), FormError>;
}

fn text_of(field: ItemField, value: &FieldValue) -> Result<String, FormError> {
    match value {
        FieldValue::Text(text) => Ok(text.clone()),
        other => Err(FormError::TypeMismatch {
            field: field.key(),
            found: other.kind(),
        }),
    }
}

fn number_of(field: ItemField, value: &FieldValue) -> Result<NumericField, FormError> {
    match value {
        FieldValue::Number(number) => Ok(*number),
        other => Err(FormError::TypeMismatch {
            field: field.key(),
            found: other.kind(),
        }),
    }
}

impl SectionEntry for IncomeEntry {
    const SECTION: Section = Section::Income;

    fn set(&mut self, field: ItemField, value: &FieldValue) -> Result<(), FormError> {
        match field {
            ItemField::Source => self.source = text_of(field, value)?,
            ItemField::Amount => self.amount = number_of(field, value)?,
            ItemField::Date => self.date = text_of(field, value)?,
            field => {
                return Err(FormError::UnknownField {
                    section: Self::SECTION,
                    field,
                })
            }
        }
        Ok(())
    }
}

impl SectionEntry for ExpenseEntry {
    const SECTION: Section = Section::Expenses;

    fn set(&mut self, field: ItemField, value: &FieldValue) -> Result<(), FormError> {
        match field {
            ItemField::Description => self.description = text_of(field, value)?,
            ItemField::Amount => self.amount = number_of(field, value)?,
            ItemField::Date => self.date = text_of(field, value)?,
            field => {
                return Err(FormError::UnknownField {
                    section: Self::SECTION,
                    field,
                })
            }
        }
        Ok(())
    }
}

impl SectionEntry for AssetEntry {
    const SECTION: Section = Section::Assets;

    fn set(&mut self, field: ItemField, value: &FieldValue) -> Result<(), FormError> {
        match field {
            ItemField::Description => self.description = text_of(field, value)?,
            ItemField::Value => self.value = number_of(field, value)?,
            field => {
                return Err(FormError::UnknownField {
                    section: Self::SECTION,
                    field,
                })
            }
        }
        Ok(())
    }
}

impl SectionEntry for LiabilityEntry {
    const SECTION: Section = Section::Liabilities;

    fn set(&mut self, field: ItemField, value: &FieldValue) -> Result<(), FormError> {
        match field {
            ItemField::Description => self.description = text_of(field, value)?,
            ItemField::Amount => self.amount = number_of(field, value)?,
            field => {
                return Err(FormError::UnknownField {
                    section: Self::SECTION,
                    field,
                })
            }
        }
        Ok(())
    }
}

fn edit_entry<T: SectionEntry>(
    entries: &[T],
    index: usize,
    field: ItemField,
    value: &FieldValue,
) -> Result<Vec<T>, FormError> {
    let mut next = entries.to_vec();
    let entry = next.get_mut(index).ok_or(FormError::IndexOutOfRange {
        section: T::SECTION,
        index,
        len: entries.len(),
    })?;
    entry.set(field, value)?;
    Ok(next)
}

fn appended<T: SectionEntry>(entries: &[T]) -> Vec<T> {
    let mut next = Vec::with_capacity(entries.len() + 1);
    next.extend_from_slice(entries);
    next.push(T::default());
    next
}

fn without<T: SectionEntry>(entries: &[T], index: usize) -> Result<Vec<T>, FormError> {
    if index >= entries.len() {
        return Err(FormError::IndexOutOfRange {
            section: T::SECTION,
            index,
            len: entries.len(),
        });
    }
    Ok(entries
        .iter()
        .enumerate()
        .filter(|(position, _)| *position != index)
        .map(|(_, entry)| entry.clone())
        .collect())
}

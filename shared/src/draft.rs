//! Editable working copy of a journal, shared by the edit panel and the
//! create form.

use serde::{Deserialize, Serialize};

use crate::record::{JournalDate, JournalEntry, JournalRecord, SpeciesTally, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftField {
    Date,
    Place,
    Notes,
    Species,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DraftEdit {
    SetDate { value: String },
    SetPlace { value: String },
    SetNotes { value: String },
    AddSpecies { name: String, count: u32 },
    RenameSpecies { from: String, to: String },
    SetSpeciesCount { species: String, count: u32 },
    RemoveSpecies { species: String },
}

impl DraftEdit {
    #[must_use]
    pub const fn field(&self) -> DraftField {
        match self {
            Self::SetDate { .. } => DraftField::Date,
            Self::SetPlace { .. } => DraftField::Place,
            Self::SetNotes { .. } => DraftField::Notes,
            Self::AddSpecies { .. }
            | Self::RenameSpecies { .. }
            | Self::SetSpeciesCount { .. }
            | Self::RemoveSpecies { .. } => DraftField::Species,
        }
    }
}

/// Inline error attached to one form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: DraftField,
    pub message: String,
}

impl FieldError {
    #[must_use]
    pub fn new(field: DraftField, error: &ValidationError) -> Self {
        Self {
            field,
            message: error.to_string(),
        }
    }
}

/// The date is held as typed so an invalid value can sit in the form until
/// it is corrected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalDraft {
    pub date: String,
    pub place: String,
    pub notes: String,
    pub species: SpeciesTally,
}

impl JournalDraft {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_record(record: &JournalRecord) -> Self {
        Self {
            date: record.date().to_string(),
            place: record.place().to_string(),
            notes: record.notes().to_string(),
            species: record.species().clone(),
        }
    }

    /// Applies one edit. On error the draft is left untouched.
    pub fn apply(&mut self, edit: &DraftEdit) -> Result<(), FieldError> {
        let result = match edit {
            DraftEdit::SetDate { value } => {
                self.date.clone_from(value);
                Ok(())
            }
            DraftEdit::SetPlace { value } => {
                self.place.clone_from(value);
                Ok(())
            }
            DraftEdit::SetNotes { value } => {
                self.notes.clone_from(value);
                Ok(())
            }
            DraftEdit::AddSpecies { name, count } => self.species.add(name, *count),
            DraftEdit::RenameSpecies { from, to } => self.species.rename(from, to),
            DraftEdit::SetSpeciesCount { species, count } => self.species.set_count(species, *count),
            DraftEdit::RemoveSpecies { species } => self.species.remove(species).map(|_| ()),
        };
        result.map_err(|e| FieldError::new(edit.field(), &e))
    }

    /// Validates every field and reports all failures at once.
    pub fn to_entry(&self) -> Result<JournalEntry, Vec<FieldError>> {
        let mut errors = Vec::new();

        let date = match JournalDate::parse(&self.date) {
            Ok(date) => Some(date),
            Err(e) => {
                errors.push(FieldError::new(DraftField::Date, &e));
                None
            }
        };
        if self.place.trim().is_empty() {
            errors.push(FieldError::new(DraftField::Place, &ValidationError::MissingPlace));
        }

        match date {
            Some(date) if errors.is_empty() => Ok(JournalEntry {
                date,
                place: self.place.clone(),
                species_observed: self.species.clone(),
                notes: self.notes.clone(),
            }),
            _ => Err(errors),
        }
    }
}

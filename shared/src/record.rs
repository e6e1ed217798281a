use chrono::NaiveDate;
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::DISPLAY_DATE_FORMAT;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Date is required")]
    MissingDate,
    #[error("Date must be a calendar date in YYYY-MM-DD form, got '{0}'")]
    InvalidDate(String),
    #[error("Place is required")]
    MissingPlace,
    #[error("Species name cannot be empty")]
    EmptySpeciesName,
    #[error("Species '{0}' is already recorded")]
    DuplicateSpecies(String),
    #[error("Species '{0}' is not in this journal")]
    UnknownSpecies(String),
}

/// Backend-assigned identifier. The wire may carry it as a number or a string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JournalId(String);

impl JournalId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JournalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JournalId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl Serialize for JournalId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for JournalId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IdVisitor;

        impl Visitor<'_> for IdVisitor {
            type Value = JournalId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a journal id as a string or integer")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<JournalId, E> {
                if v.is_empty() {
                    return Err(E::custom("journal id cannot be empty"));
                }
                Ok(JournalId::new(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<JournalId, E> {
                Ok(JournalId(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<JournalId, E> {
                Ok(JournalId(v.to_string()))
            }
        }

        deserializer.deserialize_any(IdVisitor)
    }
}

/// Calendar date exchanged as `YYYY-MM-DD`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JournalDate(NaiveDate);

impl JournalDate {
    pub const ISO_FORMAT: &'static str = "%Y-%m-%d";

    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::MissingDate);
        }
        NaiveDate::parse_from_str(trimmed, Self::ISO_FORMAT)
            .map(Self)
            .map_err(|_| ValidationError::InvalidDate(trimmed.to_string()))
    }

    /// Human form used by list rows and the detail card, e.g. `12 Mar 2024`.
    #[must_use]
    pub fn display(self) -> String {
        self.0.format(DISPLAY_DATE_FORMAT).to_string()
    }
}

impl fmt::Display for JournalDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(Self::ISO_FORMAT))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpeciesCount {
    pub name: String,
    pub count: u32,
}

/// Species name to observation count, unique by name, in insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpeciesTally(Vec<SpeciesCount>);

impl SpeciesTally {
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<u32> {
        self.position(name).map(|i| self.0[i].count)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpeciesCount> {
        self.0.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|s| s.name.as_str())
    }

    pub fn add(&mut self, name: &str, count: u32) -> Result<(), ValidationError> {
        let name = Self::normalize(name)?;
        if self.contains(&name) {
            return Err(ValidationError::DuplicateSpecies(name));
        }
        self.0.push(SpeciesCount { name, count });
        Ok(())
    }

    /// Renames in place; the entry keeps its position and count.
    pub fn rename(&mut self, from: &str, to: &str) -> Result<(), ValidationError> {
        let index = self
            .position(from)
            .ok_or_else(|| ValidationError::UnknownSpecies(from.to_string()))?;
        let to = Self::normalize(to)?;
        if to == from {
            return Ok(());
        }
        if self.contains(&to) {
            return Err(ValidationError::DuplicateSpecies(to));
        }
        self.0[index].name = to;
        Ok(())
    }

    pub fn set_count(&mut self, name: &str, count: u32) -> Result<(), ValidationError> {
        let index = self
            .position(name)
            .ok_or_else(|| ValidationError::UnknownSpecies(name.to_string()))?;
        self.0[index].count = count;
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Result<u32, ValidationError> {
        let index = self
            .position(name)
            .ok_or_else(|| ValidationError::UnknownSpecies(name.to_string()))?;
        Ok(self.0.remove(index).count)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.0.iter().position(|s| s.name == name)
    }

    fn normalize(name: &str) -> Result<String, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptySpeciesName);
        }
        Ok(name.to_string())
    }
}

impl Serialize for SpeciesTally {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for entry in &self.0 {
            map.serialize_entry(&entry.name, &entry.count)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SpeciesTally {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TallyVisitor;

        impl<'de> Visitor<'de> for TallyVisitor {
            type Value = SpeciesTally;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of species name to count")
            }

            fn visit_unit<E: de::Error>(self) -> Result<SpeciesTally, E> {
                Ok(SpeciesTally::new())
            }

            fn visit_none<E: de::Error>(self) -> Result<SpeciesTally, E> {
                Ok(SpeciesTally::new())
            }

            fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<SpeciesTally, D::Error> {
                d.deserialize_map(self)
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<SpeciesTally, A::Error> {
                let mut tally = SpeciesTally(Vec::with_capacity(access.size_hint().unwrap_or(0)));
                while let Some((name, count)) = access.next_entry::<String, u32>()? {
                    // Repeated keys keep their first position and the last count.
                    match tally.position(&name) {
                        Some(i) => tally.0[i].count = count,
                        None => tally.0.push(SpeciesCount { name, count }),
                    }
                }
                Ok(tally)
            }
        }

        deserializer.deserialize_option(TallyVisitor)
    }
}

impl<S: Into<String>> FromIterator<(S, u32)> for SpeciesTally {
    fn from_iter<I: IntoIterator<Item = (S, u32)>>(iter: I) -> Self {
        let mut tally = SpeciesTally::new();
        for (name, count) in iter {
            let name = name.into();
            match tally.position(&name) {
                Some(i) => tally.0[i].count = count,
                None => tally.0.push(SpeciesCount { name, count }),
            }
        }
        tally
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Journal content without an identifier; the body of a create request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub date: JournalDate,
    pub place: String,
    #[serde(default)]
    pub species_observed: SpeciesTally,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub notes: String,
}

impl JournalEntry {
    pub fn new(
        date: JournalDate,
        place: impl Into<String>,
        species_observed: SpeciesTally,
        notes: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let entry = Self {
            date,
            place: place.into(),
            species_observed,
            notes: notes.into(),
        };
        entry.validate()?;
        Ok(entry)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.place.trim().is_empty() {
            return Err(ValidationError::MissingPlace);
        }
        Ok(())
    }

    #[must_use]
    pub fn with_id(self, id: JournalId) -> JournalRecord {
        JournalRecord { id, entry: self }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalRecord {
    pub id: JournalId,
    #[serde(flatten)]
    pub entry: JournalEntry,
}

impl JournalRecord {
    #[must_use]
    pub fn date(&self) -> JournalDate {
        self.entry.date
    }

    #[must_use]
    pub fn place(&self) -> &str {
        &self.entry.place
    }

    #[must_use]
    pub fn notes(&self) -> &str {
        &self.entry.notes
    }

    #[must_use]
    pub fn species(&self) -> &SpeciesTally {
        &self.entry.species_observed
    }
}

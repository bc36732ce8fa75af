// src/models/scope.rs

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use validator::ValidationError;

/// Exact-match filter for one subject inside one section.
/// Missing keys deserialize as empty strings so the engine can report which one is absent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubjectScope {
    pub school_id: String,
    pub class_id: String,
    pub section_id: String,
    pub subject_id: String,
}

/// Exact-match filter for one section, spanning every subject.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SectionScope {
    pub school_id: String,
    pub class_id: String,
    pub section_id: String,
}

impl SubjectScope {
    pub fn new(
        school_id: impl Into<String>,
        class_id: impl Into<String>,
        section_id: impl Into<String>,
        subject_id: impl Into<String>,
    ) -> Self {
        Self {
            school_id: school_id.into(),
            class_id: class_id.into(),
            section_id: section_id.into(),
            subject_id: subject_id.into(),
        }
    }

    /// Name of the first blank identifier, in wire spelling.
    pub fn missing_field(&self) -> Option<&'static str> {
        self.section()
            .missing_field()
            .or_else(|| blank(&self.subject_id).then_some("subjectId"))
    }

    pub fn section(&self) -> SectionScope {
        SectionScope {
            school_id: self.school_id.clone(),
            class_id: self.class_id.clone(),
            section_id: self.section_id.clone(),
        }
    }
}

impl SectionScope {
    pub fn new(
        school_id: impl Into<String>,
        class_id: impl Into<String>,
        section_id: impl Into<String>,
    ) -> Self {
        Self {
            school_id: school_id.into(),
            class_id: class_id.into(),
            section_id: section_id.into(),
        }
    }

    pub fn missing_field(&self) -> Option<&'static str> {
        [
            ("schoolId", &self.school_id),
            ("classId", &self.class_id),
            ("sectionId", &self.section_id),
        ]
        .into_iter()
        .find(|(_, value)| blank(value))
        .map(|(name, _)| name)
    }
}

/// Whitespace-only identifiers count as absent.
pub fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Field validator for request DTOs, sharing the rule the scopes use.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if blank(value) {
        return Err(ValidationError::new("blank").with_message(Cow::Borrowed("must not be blank")));
    }
    Ok(())
}

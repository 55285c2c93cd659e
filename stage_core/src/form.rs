//! Scalar fields of the destination form and their inline errors.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const NAME_REQUIRED: &str = "Destination name is required.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormField {
    Name,
    Description,
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormField::Name => f.write_str("name"),
            FormField::Description => f.write_str("description"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct FieldState {
    value: String,
    error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFieldSet {
    name: FieldState,
    description: FieldState,
}

impl FormFieldSet {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: FieldState {
                value: name.into(),
                error: None,
            },
            description: FieldState {
                value: description.into(),
                error: None,
            },
        }
    }

    fn field(&self, field: FormField) -> &FieldState {
        match field {
            FormField::Name => &self.name,
            FormField::Description => &self.description,
        }
    }

    fn field_mut(&mut self, field: FormField) -> &mut FieldState {
        match field {
            FormField::Name => &mut self.name,
            FormField::Description => &mut self.description,
        }
    }

    pub fn value(&self, field: FormField) -> &str {
        &self.field(field).value
    }

    /// Set a value. Any error on that field is cleared.
    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        let state = self.field_mut(field);
        state.value = value.into();
        state.error = None;
    }

    pub fn error(&self, field: FormField) -> Option<&str> {
        self.field(field).error.as_deref()
    }

    pub fn set_error(&mut self, field: FormField, message: impl Into<String>) {
        self.field_mut(field).error = Some(message.into());
    }

    pub fn clear_error(&mut self, field: FormField) {
        self.field_mut(field).error = None;
    }

    /// Fields that currently carry an error.
    pub fn errors(&self) -> Vec<(FormField, &str)> {
        [FormField::Name, FormField::Description]
            .into_iter()
            .filter_map(|f| self.error(f).map(|e| (f, e)))
            .collect()
    }

    /// Check required fields, attaching errors in place. Returns true when valid.
    pub fn validate(&mut self) -> bool {
        if self.name.value.is_empty() {
            self.set_error(FormField::Name, NAME_REQUIRED);
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_requires_name() {
        let mut form = FormFieldSet::new("", "details");
        assert!(!form.validate());
        assert_eq!(form.errors(), vec![(FormField::Name, NAME_REQUIRED)]);

        // Validating twice does not stack errors
        assert!(!form.validate());
        assert_eq!(form.errors().len(), 1);
    }

    #[test]
    fn test_set_clears_error() {
        let mut form = FormFieldSet::new("", "");
        form.validate();
        form.set(FormField::Name, "Orders");
        assert_eq!(form.error(FormField::Name), None);
        assert!(form.validate());
    }

    #[test]
    fn test_description_is_optional() {
        let mut form = FormFieldSet::new("Orders", "");
        assert!(form.validate());
        assert_eq!(form.value(FormField::Description), "");
    }
}

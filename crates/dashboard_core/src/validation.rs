//! Required-field checks for forms submitted from the dashboard.

use serde::Serialize;

pub const REQUIRED_FIELD_MESSAGE: &str = "Trường này là bắt buộc";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormField {
    pub name: String,
    pub value: String,
    pub required: bool,
    invalid: bool,
    error: Option<String>,
}

impl FormField {
    pub fn required(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            required: true,
            invalid: false,
            error: None,
        }
    }

    pub fn optional(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            required: false,
            ..Self::required(name, value)
        }
    }

    pub fn is_invalid(&self) -> bool {
        self.invalid
    }

    /// The annotation shown under the field, if it failed validation.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn clear_error(&mut self) {
        self.invalid = false;
        self.error = None;
    }

    fn show_error(&mut self, message: &str) {
        self.invalid = true;
        self.error = Some(message.to_string());
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Form {
    fields: Vec<FormField>,
}

impl Form {
    pub fn new(fields: Vec<FormField>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Returns `false` if the named field does not exist.
    pub fn set_value(&mut self, name: &str, value: impl Into<String>) -> bool {
        match self.fields.iter_mut().find(|field| field.name == name) {
            Some(field) => {
                field.value = value.into();
                true
            }
            None => false,
        }
    }

    /// Re-checks every required field, replacing any previous annotations.
    /// The caller must not submit the form when this returns `false`.
    pub fn validate(&mut self) -> bool {
        let mut valid = true;
        for field in self.fields.iter_mut().filter(|field| field.required) {
            field.clear_error();
            if field.value.trim().is_empty() {
                field.show_error(REQUIRED_FIELD_MESSAGE);
                valid = false;
            }
        }
        valid
    }

    pub fn error_count(&self) -> usize {
        self.fields.iter().filter(|field| field.error.is_some()).count()
    }
}

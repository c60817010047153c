use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::SongForm;

/// Validation errors collected for a submitted form, keyed by field name.
///
/// A payload is valid exactly when no error has been recorded. The HTTP layer
/// fills it from [`ModelState::validate`]; callers are free to add their own.
#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct ModelState {
    errors: BTreeMap<String, Vec<String>>,
}

impl ModelState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the required-field checks for a song form.
    pub fn validate(form: &SongForm) -> Self {
        let mut state = ModelState::new();
        if form.title.trim().is_empty() {
            state.add_error("title", "The Title field is required.");
        }
        if form.artist.trim().is_empty() {
            state.add_error("artist", "The Artist field is required.");
        }
        state
    }

    pub fn add_error(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.errors.entry(key.into()).or_default().push(message.into());
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors_for(&self, key: &str) -> &[String] {
        self.errors.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn error_count(&self) -> usize {
        self.errors.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_state_is_valid() {
        assert!(ModelState::new().is_valid());
        assert_eq!(ModelState::new().error_count(), 0);
    }

    #[test]
    fn test_added_error_invalidates() {
        let mut state = ModelState::new();
        state.add_error("Error", "Model error");
        assert!(!state.is_valid());
        assert_eq!(state.errors_for("Error"), ["Model error".to_string()]);
    }

    #[test]
    fn test_validate_requires_title_and_artist() {
        let state = ModelState::validate(&SongForm::new("  ", ""));
        assert!(!state.is_valid());
        assert_eq!(state.errors_for("title").len(), 1);
        assert_eq!(state.errors_for("artist").len(), 1);
        assert!(state.errors_for("id").is_empty());
    }

    #[test]
    fn test_validate_accepts_filled_form() {
        let state = ModelState::validate(&SongForm::new("New Song", "New Artist"));
        assert!(state.is_valid());
    }

    #[test]
    fn test_serializes_as_field_map() {
        let mut state = ModelState::new();
        state.add_error("title", "required");
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json, serde_json::json!({ "title": ["required"] }));
    }
}

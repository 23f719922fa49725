//! Autocomplete suggestion entity

use serde::{Deserialize, Serialize};

/// A single autocomplete suggestion
///
/// `place_ref` is an opaque provider token; it is only meaningful to the
/// place-details lookup of the same provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceSuggestion {
    /// Human-readable label shown in the suggestion list
    pub label: String,
    /// Opaque provider reference used to resolve the suggestion
    pub place_ref: String,
}

impl PlaceSuggestion {
    /// Create a new suggestion
    #[must_use]
    pub fn new(label: impl Into<String>, place_ref: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            place_ref: place_ref.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_accepts_str_and_string() {
        let s = PlaceSuggestion::new("Santa Ana Maya, Mich., México", String::from("ChIJ123"));
        assert_eq!(s.label, "Santa Ana Maya, Mich., México");
        assert_eq!(s.place_ref, "ChIJ123");
    }
}

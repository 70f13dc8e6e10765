//! Errors surfaced by a weather lookup.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LookupError {
    #[error("Location query is empty")]
    EmptyQuery,

    #[error("No location found matching '{0}'")]
    LocationNotFound(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Insufficient forecast data: {available} hourly sample(s), at least {required} required")]
    InsufficientData { available: usize, required: usize },
}

impl LookupError {
    /// User-friendly error message for display.
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyQuery => "Please enter a city name.".to_string(),
            Self::LocationNotFound(query) => format!(
                "City '{query}' not found. Check the spelling or add a country/state, e.g. 'Paris, France'."
            ),
            Self::Network(_) => {
                "Could not reach the weather service. Please try again shortly.".to_string()
            }
            Self::MalformedResponse(_) => {
                "Failed to read weather data from the service. Please try again later.".to_string()
            }
            Self::InsufficientData { .. } => {
                "Forecast unavailable for this location.".to_string()
            }
        }
    }

    /// Whether re-running the same search may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_suggests_adding_country() {
        let msg = LookupError::LocationNotFound("Zzzqqxyz123".into()).user_message();
        assert!(msg.contains("Zzzqqxyz123"));
        assert!(msg.contains("add a country"));
    }

    #[test]
    fn only_network_errors_are_transient() {
        assert!(LookupError::Network("timeout".into()).is_transient());
        assert!(!LookupError::LocationNotFound("x".into()).is_transient());
        assert!(!LookupError::MalformedResponse("x".into()).is_transient());
        assert!(!LookupError::InsufficientData { available: 1, required: 2 }.is_transient());
    }

    #[test]
    fn insufficient_data_display_reports_counts() {
        let err = LookupError::InsufficientData { available: 1, required: 2 };
        assert_eq!(
            err.to_string(),
            "Insufficient forecast data: 1 hourly sample(s), at least 2 required"
        );
    }
}

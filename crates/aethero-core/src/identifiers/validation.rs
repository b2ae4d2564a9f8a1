//! Identifier validation rules

use thiserror::Error;

/// Maximum length for all identifier types
pub const MAX_ID_LENGTH: usize = 128;

/// Suffix appended to an agent id to name its output topic
pub const OUTPUT_TOPIC_SUFFIX: &str = "_output";

/// Longest agent id whose output topic still fits in [`MAX_ID_LENGTH`]
pub const MAX_AGENT_ID_LENGTH: usize = MAX_ID_LENGTH - OUTPUT_TOPIC_SUFFIX.len();

/// Error type for identifier validation failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdValidationError {
    /// The identifier string is empty
    #[error("Identifier cannot be empty")]
    Empty,
    /// The identifier contains only whitespace
    #[error("Identifier cannot be whitespace-only")]
    WhitespaceOnly,
    /// The identifier has leading or trailing whitespace
    #[error("Identifier cannot have leading or trailing whitespace")]
    LeadingTrailingWhitespace,
    /// The identifier contains invalid characters
    #[error(
        "Identifier can only contain alphanumeric characters, hyphens, underscores, and dots"
    )]
    InvalidCharacters,
    /// The identifier exceeds the maximum length
    #[error("Identifier too long ({length} chars, max {max})")]
    TooLong { length: usize, max: usize },
}

/// Validator for identifier strings
pub struct IdValidator;

impl IdValidator {
    /// Validate a routing identifier (agent ids, topic names).
    ///
    /// Routing identifiers are non-empty, at most [`MAX_ID_LENGTH`] bytes, carry
    /// no surrounding whitespace and only contain alphanumerics, `-`, `_` and `.`.
    ///
    /// ```rust
    /// use aethero_core::identifiers::IdValidator;
    ///
    /// assert!(IdValidator::validate("agent-1").is_ok());
    /// assert!(IdValidator::validate("agent_1_output").is_ok());
    /// assert!(IdValidator::validate("").is_err());
    /// assert!(IdValidator::validate("agent/path").is_err());
    /// ```
    pub fn validate(id: &str) -> Result<&str, IdValidationError> {
        let id = Self::validate_label(id)?;

        if !id
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '.')
        {
            return Err(IdValidationError::InvalidCharacters);
        }

        Ok(id)
    }

    /// Validate an agent id: a routing identifier short enough that
    /// `{id}_output` is itself a valid routing identifier.
    pub fn validate_agent(id: &str) -> Result<&str, IdValidationError> {
        let id = Self::validate(id)?;

        if id.len() > MAX_AGENT_ID_LENGTH {
            return Err(IdValidationError::TooLong {
                length: id.len(),
                max: MAX_AGENT_ID_LENGTH,
            });
        }

        Ok(id)
    }

    /// Validate a correlation label (task ids, pipeline ids).
    ///
    /// Labels come from caller payloads, so only emptiness, surrounding
    /// whitespace and length are checked.
    pub fn validate_label(id: &str) -> Result<&str, IdValidationError> {
        if id.is_empty() {
            return Err(IdValidationError::Empty);
        }

        if id.trim().is_empty() {
            return Err(IdValidationError::WhitespaceOnly);
        }

        if id != id.trim() {
            return Err(IdValidationError::LeadingTrailingWhitespace);
        }

        if id.len() > MAX_ID_LENGTH {
            return Err(IdValidationError::TooLong {
                length: id.len(),
                max: MAX_ID_LENGTH,
            });
        }

        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routing_ids() {
        assert_eq!(IdValidator::validate("agent.1"), Ok("agent.1"));
        assert_eq!(
            IdValidator::validate(" agent"),
            Err(IdValidationError::LeadingTrailingWhitespace)
        );
        assert_eq!(
            IdValidator::validate("a b"),
            Err(IdValidationError::InvalidCharacters)
        );
        assert_eq!(
            IdValidator::validate("   "),
            Err(IdValidationError::WhitespaceOnly)
        );
    }

    #[test]
    fn test_labels_accept_free_text() {
        assert!(IdValidator::validate_label("task 1 / retry").is_ok());
        assert!(IdValidator::validate_label("").is_err());

        let long = "x".repeat(MAX_ID_LENGTH + 1);
        assert!(matches!(
            IdValidator::validate_label(&long),
            Err(IdValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn test_agent_id_leaves_room_for_output_suffix() {
        let longest = "a".repeat(MAX_AGENT_ID_LENGTH);
        assert!(IdValidator::validate_agent(&longest).is_ok());
        assert!(IdValidator::validate(&format!("{longest}{OUTPUT_TOPIC_SUFFIX}")).is_ok());

        let too_long = "a".repeat(MAX_AGENT_ID_LENGTH + 1);
        assert!(matches!(
            IdValidator::validate_agent(&too_long),
            Err(IdValidationError::TooLong { max: MAX_AGENT_ID_LENGTH, .. })
        ));
        assert!(IdValidator::validate(&too_long).is_ok());
    }
}

//! Error types for the match simulation.

use thiserror::Error;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all match simulation errors.
///
/// Everything here is a setup-time or API-misuse failure. Conditions that
/// occur during normal play (a target dying mid-swing, not enough mana,
/// nothing eligible for the opponent to summon) are not errors and never
/// surface through this type.
#[derive(Debug, Error)]
pub enum GameError {
    /// A combat entity was built without one of its required parts.
    #[error("Entity is missing required component: {0}")]
    MissingComponent(&'static str),

    /// A numeric setting was outside its allowed range.
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue {
        /// Name of the offending setting.
        field: String,
        /// What was wrong with it.
        message: String,
    },

    /// A summon event was declared with a zero weight.
    #[error("Summon event '{0}' has a non-positive weight")]
    InvalidWeight(String),

    /// A summon event's enrage window is inverted or outside the enrage domain.
    #[error("Summon event '{name}' has invalid enrage range [{min}, {max}]")]
    InvalidEnrageRange {
        /// Summon event name.
        name: String,
        /// Lower bound as written.
        min: String,
        /// Upper bound as written.
        max: String,
    },

    /// The deck does not contain exactly the required number of cards.
    #[error("Deck must contain {expected} cards, found {found}")]
    DeckSizeMismatch {
        /// Required deck size.
        expected: usize,
        /// Actual number of cards supplied.
        found: usize,
    },

    /// A unit template name was not found in the registry.
    #[error("Unknown unit template: {0}")]
    UnknownTemplate(String),

    /// A card type was not found in the registry.
    #[error("Unknown card type: {0}")]
    UnknownCard(String),

    /// The match configuration failed validation.
    #[error("Invalid match configuration:\n  {}", .0.join("\n  "))]
    InvalidConfig(Vec<String>),

    /// Data file parsing error.
    #[error("Failed to parse match data: {0}")]
    DataParseError(String),

    /// Invalid game state.
    #[error("Invalid game state: {0}")]
    InvalidState(String),
}

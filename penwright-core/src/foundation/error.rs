/// Convenience result type used across Penwright.
pub type PenwrightResult<T> = Result<T, PenwrightError>;

/// Top-level error taxonomy used by pipeline APIs.
///
/// Every fatal kind is raised before motion code is emitted; a stream that reaches a
/// [`crate::CommandSink`] is always complete and pen-state safe.
#[derive(thiserror::Error, Debug)]
pub enum PenwrightError {
    /// No glyph library exists for the requested user.
    #[error("library not found: no glyph library for user '{user}'")]
    LibraryNotFound {
        /// Requested user id.
        user: String,
    },

    /// The content safeguard refused the request.
    #[error("content rejected: {reason}")]
    ContentRejected {
        /// Matched rule and label.
        reason: String,
    },

    /// A requested character has no captured sample.
    #[error("missing glyph: no sample for {character:?}")]
    MissingGlyph {
        /// The unresolved character.
        character: char,
    },

    /// Geometry falls outside the page or the machine travel limits.
    #[error("out of bounds: {0}")]
    OutOfBounds(String),

    /// Page, machine or encoding configuration violates basic constraints.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A command stream breaks the pen state machine.
    #[error("pen state violation: {0}")]
    PenState(String),

    /// Textual motion code could not be decoded.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PenwrightError {
    /// Build a [`PenwrightError::LibraryNotFound`] value.
    pub fn library_not_found(user: impl Into<String>) -> Self {
        Self::LibraryNotFound { user: user.into() }
    }

    /// Build a [`PenwrightError::ContentRejected`] value.
    pub fn content_rejected(reason: impl Into<String>) -> Self {
        Self::ContentRejected {
            reason: reason.into(),
        }
    }

    /// Build a [`PenwrightError::MissingGlyph`] value.
    pub fn missing_glyph(character: char) -> Self {
        Self::MissingGlyph { character }
    }

    /// Build a [`PenwrightError::OutOfBounds`] value.
    pub fn out_of_bounds(msg: impl Into<String>) -> Self {
        Self::OutOfBounds(msg.into())
    }

    /// Build a [`PenwrightError::InvalidConfiguration`] value.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Build a [`PenwrightError::PenState`] value.
    pub fn pen_state(msg: impl Into<String>) -> Self {
        Self::PenState(msg.into())
    }

    /// Build a [`PenwrightError::Encoding`] value.
    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    /// Build a [`PenwrightError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;

/// Convenience result type used across Portico.
pub type PorticoResult<T> = Result<T, PorticoError>;

/// Top-level error taxonomy used by configurator and visualizer APIs.
#[derive(thiserror::Error, Debug)]
pub enum PorticoError {
    /// Required upstream configuration missing or unreadable. Fatal to session start.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Invalid step-definition data or surface parameters.
    #[error("validation error: {0}")]
    Validation(String),

    /// A layer (or watermark) image could not be fetched or decoded.
    #[error("Failed to load image: {url}")]
    ImageLoad {
        /// Fully expanded image URL that failed.
        url: String,
    },

    /// Serialization or delivery of an exported artifact failed.
    #[error("export error: {0}")]
    Export(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PorticoError {
    /// Build a [`PorticoError::Configuration`] value.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Build a [`PorticoError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PorticoError::ImageLoad`] value.
    pub fn image_load(url: impl Into<String>) -> Self {
        Self::ImageLoad { url: url.into() }
    }

    /// Build a [`PorticoError::Export`] value.
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    /// Build a [`PorticoError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for PorticoError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;

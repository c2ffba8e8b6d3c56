/// Convenience result type used across the collage pipeline.
pub type CollageResult<T> = Result<T, CollageError>;

/// Top-level error taxonomy used by pipeline APIs.
///
/// None of these are retried internally. Any of them ends the run before an image is saved.
#[derive(thiserror::Error, Debug)]
pub enum CollageError {
    /// Structurally invalid document data (bad lengths, transforms, missing containers).
    #[error("validation error: {0}")]
    Validation(String),

    /// A clip reference resolved to more than one rectangle.
    #[error("clip too complicated for image: {source_url}")]
    AmbiguousClip {
        /// Source locator of the image whose clip was rejected.
        source_url: String,
    },

    /// A `clip-path` value that is not a usable `url(#id)` reference.
    #[error("invalid clip for image: {source_url} ({reason})")]
    InvalidClipReference {
        /// Source locator of the image whose clip was rejected.
        source_url: String,
        /// What was wrong with the reference.
        reason: String,
    },

    /// Fetching an external raster asset failed.
    #[error("asset fetch failed: {url}: {reason}")]
    AssetFetch {
        /// Locator that was requested.
        url: String,
        /// Underlying failure.
        reason: String,
    },

    /// The processed document could not be drawn or encoded.
    #[error("rasterization error: {0}")]
    Rasterization(String),

    /// Errors when serializing or deserializing configuration.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CollageError {
    /// Build a [`CollageError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`CollageError::AmbiguousClip`] value.
    pub fn ambiguous_clip(source_url: impl Into<String>) -> Self {
        Self::AmbiguousClip {
            source_url: source_url.into(),
        }
    }

    /// Build a [`CollageError::InvalidClipReference`] value.
    pub fn invalid_clip(source_url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidClipReference {
            source_url: source_url.into(),
            reason: reason.into(),
        }
    }

    /// Build a [`CollageError::AssetFetch`] value.
    pub fn asset_fetch(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::AssetFetch {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Build a [`CollageError::Rasterization`] value.
    pub fn rasterization(msg: impl Into<String>) -> Self {
        Self::Rasterization(msg.into())
    }

    /// Build a [`CollageError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;

//! Error type shared by the raster types, the effect pipeline and the
//! fetch/export collaborators.

/// Errors produced by the effects crate.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum EffectError {
    /// The byte buffer does not describe a `width * height` RGBA raster.
    #[error("invalid buffer: {width}x{height} RGBA needs {expected} bytes, got {actual}")]
    InvalidBuffer {
        /// Declared width in pixels.
        width: u32,
        /// Declared height in pixels.
        height: u32,
        /// Byte count implied by the dimensions.
        expected: usize,
        /// Byte count actually supplied.
        actual: usize,
    },

    /// A pixel coordinate fell outside the raster.
    #[error("pixel ({x}, {y}) is outside a {width}x{height} raster")]
    OutOfBounds {
        /// Requested column.
        x: u32,
        /// Requested row.
        y: u32,
        /// Raster width.
        width: u32,
        /// Raster height.
        height: u32,
    },

    /// The image source refused pixel-level access (cross-origin policy).
    ///
    /// Retrying the same request will fail again; switch to a relay transport.
    #[error("pixel access to {url} was blocked; retry through a relay")]
    FetchBlocked {
        /// The resource that could not be read.
        url: String,
    },

    /// The image source could not deliver the resource.
    #[error("fetch failed for {url}: {reason}")]
    FetchFailed {
        /// The resource that was requested.
        url: String,
        /// Collaborator-supplied description.
        reason: String,
    },

    /// Encoding or saving the result failed.
    #[error("export failed: {0}")]
    ExportFailed(String),
}

impl EffectError {
    /// Whether the error comes from an I/O collaborator and can be
    /// recovered by the caller (as opposed to a caller or pipeline bug).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::FetchBlocked { .. } | Self::FetchFailed { .. } | Self::ExportFailed(_)
        )
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, EffectError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collaborator_errors_are_recoverable() {
        let blocked = EffectError::FetchBlocked {
            url: "https://mars.nasa.gov/a.jpg".into(),
        };
        assert!(blocked.is_recoverable());
        assert!(EffectError::ExportFailed("disk full".into()).is_recoverable());

        let bounds = EffectError::OutOfBounds { x: 4, y: 0, width: 4, height: 4 };
        assert!(!bounds.is_recoverable());
    }

    #[test]
    fn test_invalid_buffer_message() {
        let err = EffectError::InvalidBuffer { width: 2, height: 2, expected: 16, actual: 15 };
        assert_eq!(
            err.to_string(),
            "invalid buffer: 2x2 RGBA needs 16 bytes, got 15"
        );
    }
}

//! Error types for registry loading

use std::path::PathBuf;

/// Errors raised while building or reloading the registry
///
/// Fatal at startup, recoverable on an explicit reload (the previous index
/// stays in place).
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Mapping source could not be read
    #[error("io error reading mappings from {path}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Mapping source is not a valid mapping document
    #[error("malformed mappings from {origin}: {source}")]
    Malformed {
        /// Source description
        origin: String,
        /// Parse error
        #[source]
        source: serde_json::Error,
    },

    /// Document parsed but violates a registry invariant
    #[error("invalid mapping entry: {0}")]
    InvalidEntry(String),

    /// Document contains no assets at all
    #[error("mapping source {0} contains no assets")]
    NoAssets(String),
}

impl LoadError {
    /// Create IO error for path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create malformed-document error for a source description
    pub fn malformed(origin: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Malformed {
            origin: origin.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_error_display() {
        let err = LoadError::NoAssets("inline".to_string());
        assert_eq!(err.to_string(), "mapping source inline contains no assets");

        let io = LoadError::io(
            "config/mappings.json",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert!(io.to_string().contains("config/mappings.json"));
    }
}

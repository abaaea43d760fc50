//! Error types for the replay binary.
//!
//! [`ReplayError`] wraps every failure the CLI can hit so `main` can
//! propagate with `?` and exit non-zero.

use std::path::PathBuf;

/// Top-level error for the replay binary.
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    /// An input file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// The file that failed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// An input file is not valid JSON for the expected type.
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        /// The file that failed.
        path: PathBuf,
        /// The underlying JSON error.
        source: serde_json::Error,
    },

    /// Serialising the result failed.
    #[error("failed to encode output: {source}")]
    Encode {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: skirmish_core::ConfigError,
    },

    /// The transition could not be applied.
    #[error("transition error: {source}")]
    Transition {
        /// The underlying transition error.
        #[from]
        source: skirmish_core::TransitionError,
    },

    /// The claimed transition does not match the re-derived one.
    #[error("verification failed: {source}")]
    Verification {
        /// The first divergence found.
        #[from]
        source: skirmish_core::VerificationError,
    },

    /// The battle could not be resolved.
    #[error("battle error: {source}")]
    Battle {
        /// The underlying battle error.
        #[from]
        source: skirmish_core::BattleError,
    },
}

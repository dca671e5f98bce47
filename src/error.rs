//! Unified error handling for the crate.

use std::fmt::Display;
use thiserror::Error;

/// Errors produced by clustering, mining, and the analysis pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// No usable points remained after dropping rows with missing or
    /// non-finite coordinates.
    #[error("no usable data points to cluster")]
    EmptyInput,

    /// A parameter was outside its valid range.
    #[error("invalid parameter {name}={value}: {requirement}")]
    InvalidParameter {
        name: &'static str,
        value: String,
        requirement: &'static str,
    },

    /// Centroid computation was asked to summarize a clustering with no
    /// non-noise points. The pipeline screens this case out beforehand, so
    /// hitting it indicates a caller-side logic error.
    #[error("cannot compute centroids: clustering contains no non-noise points")]
    EmptyCluster,
}

impl AnalysisError {
    /// Build an [`AnalysisError::InvalidParameter`] from any displayable value.
    pub fn invalid_parameter(
        name: &'static str,
        value: impl Display,
        requirement: &'static str,
    ) -> Self {
        Self::InvalidParameter {
            name,
            value: value.to_string(),
            requirement,
        }
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, AnalysisError>;

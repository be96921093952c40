//! Planning errors

/// Result alias used across the planning core
pub type PlanResult<T> = Result<T, PlanError>;

/// Errors that abort a planning job
///
/// Recoverable situations (degenerate bounds, unknown light rig presets)
/// are handled with fallbacks and never surface here.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlanError {
    /// Nothing to plan
    #[error("No assets to plan: at least one asset hierarchy is required")]
    NoAssets,

    /// A required job option is absent
    #[error("Missing required configuration value: {0}")]
    MissingConfig(String),

    /// A job option is out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Hierarchy id not in the session
    #[error("Unknown hierarchy: {0}")]
    UnknownHierarchy(usize),

    /// Node index not in the hierarchy
    #[error("Unknown node {node} in hierarchy '{hierarchy}'")]
    UnknownNode {
        /// Hierarchy name
        hierarchy: String,
        /// Requested node index
        node: usize,
    },

    /// Lineup spacing is not a positive finite number
    #[error("Invalid lineup spacing: {0} (must be finite and > 0)")]
    InvalidSpacing(f32),

    /// Keys are empty or out of order
    #[error("Invalid keyframes: {0}")]
    InvalidKeyframes(String),

    /// Reading or writing a file failed
    #[error("IO error: {0}")]
    Io(String),

    /// Writing RON or JSON failed
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Parsing RON failed
    #[error("Deserialization error: {0}")]
    Deserialize(String),
}

impl PlanError {
    /// Build a [`PlanError::InvalidConfig`] value
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

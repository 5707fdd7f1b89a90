//! Error types and handling for Outflight

/// Result type alias for Outflight operations
pub type Result<T> = std::result::Result<T, OutflightError>;

/// Error types for the publish-tracking queue
///
/// The core never panics across the public boundary; every failure mode
/// surfaces as one of these variants or as a diagnostics counter bump.
#[derive(Debug, thiserror::Error)]
pub enum OutflightError {
    /// Invalid call arguments (empty topic, malformed message)
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Invalid configuration value
    #[error("Invalid parameter: {parameter} - {message}")]
    InvalidParameter { parameter: String, message: String },

    /// No slot could be produced by the allocator
    ///
    /// Reserved for hard-limit modes; the default admission policy always
    /// degrades to eviction instead of failing.
    #[error("No slot available for tracking")]
    NoCapacity,

    /// The transport rejected the publish
    #[error("Transport publish failed with code {code}")]
    Transport { code: i32 },

    /// Control ring rejected the message
    #[error("Control ring error: {message}")]
    ControlRing { message: String },
}

impl OutflightError {
    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Create a transport error from a negative transport return code
    pub fn transport(code: i32) -> Self {
        Self::Transport { code }
    }

    /// Create a control ring error
    pub fn control_ring(message: impl Into<String>) -> Self {
        Self::ControlRing {
            message: message.into(),
        }
    }
}

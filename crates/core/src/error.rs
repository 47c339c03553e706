/// Result alias that carries the custom [`FlowTextError`] type.
pub type Result<T> = std::result::Result<T, FlowTextError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum FlowTextError {
    /// Free-form failure surfaced to the caller as a readable message.
    #[error("{0}")]
    Message(String),
    /// Input rejected before it could reach the animation.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// A text set that cannot be laid out.
    #[error("invalid text set `{title}`: {reason}")]
    InvalidTextSet { title: String, reason: &'static str },
    /// Configuration that failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Failure reported by the MIDI backend.
    #[error("MIDI error: {0}")]
    Midi(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FlowTextError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }
}

impl From<&str> for FlowTextError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for FlowTextError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}

#[cfg(feature = "midi")]
impl From<midir::InitError> for FlowTextError {
    fn from(value: midir::InitError) -> Self {
        Self::Midi(value.to_string())
    }
}

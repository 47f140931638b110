/// Convenience result type used across pixelcast.
pub type PixelcastResult<T> = Result<T, PixelcastError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Render-loop code never treats any of these as fatal; they surface to the
/// HTTP layer or are logged and counted.
#[derive(thiserror::Error, Debug)]
pub enum PixelcastError {
    /// Missing or invalid startup configuration; terminates the process.
    #[error("startup error: {0}")]
    Startup(String),

    /// Invalid user-provided or layout data.
    #[error("validation error: {0}")]
    Validation(String),

    /// An inbound update whose shape doesn't match the target's parameters.
    #[error("parameter type error: {0}")]
    ParameterType(String),

    /// A parameter value outside its declared bounds.
    #[error("parameter range error: {0}")]
    ParameterRange(String),

    /// Pattern, color mask, or option name not found.
    #[error("unknown name: {0}")]
    UnknownName(String),

    /// Change-request backpressure; the caller may retry, latest intent wins.
    #[error("channel full: {0}")]
    ChannelFull(String),

    /// A pixel's DMX slot range exceeds the universe.
    #[error("dmx overflow: {0}")]
    DmxOverflow(String),

    /// Network transmit failure.
    #[error("send error: {0}")]
    Send(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PixelcastError {
    /// Build a [`PixelcastError::Startup`] value.
    pub fn startup(msg: impl Into<String>) -> Self {
        Self::Startup(msg.into())
    }

    /// Build a [`PixelcastError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PixelcastError::ParameterType`] value.
    pub fn parameter_type(msg: impl Into<String>) -> Self {
        Self::ParameterType(msg.into())
    }

    /// Build a [`PixelcastError::ParameterRange`] value.
    pub fn parameter_range(msg: impl Into<String>) -> Self {
        Self::ParameterRange(msg.into())
    }

    /// Build a [`PixelcastError::UnknownName`] value.
    pub fn unknown_name(msg: impl Into<String>) -> Self {
        Self::UnknownName(msg.into())
    }

    /// Build a [`PixelcastError::ChannelFull`] value.
    pub fn channel_full(msg: impl Into<String>) -> Self {
        Self::ChannelFull(msg.into())
    }

    /// Build a [`PixelcastError::Send`] value.
    pub fn send(msg: impl Into<String>) -> Self {
        Self::Send(msg.into())
    }
}
